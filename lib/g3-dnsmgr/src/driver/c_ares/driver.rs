/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crate::driver::ResolverChannel;
use crate::error::LookupChannelError;
use crate::message::{DnsReply, ReplyPayload, ReplySender, ReplyStatus, SocketEvent};
use crate::query::{DnsQuery, QueryKey, RR_TYPE_A, RR_TYPE_AAAA, RR_TYPE_PTR, RR_TYPE_TXT};

pub(super) struct CAresChannel {
    pub(super) inner: c_ares::Channel,
    pub(super) each_timeout: u32,
    pub(super) negative_ttl: u32,
    pub(super) positive_min_ttl: u32,
    pub(super) positive_max_ttl: u32,
    pub(super) unreported_ttl: u32,
    pub(super) socket_rx: mpsc::Receiver<SocketEvent>,
    pub(super) read_fds: Arc<Mutex<BTreeSet<RawFd>>>,
    pub(super) write_fds: Arc<Mutex<BTreeSet<RawFd>>>,
    pub(super) outstanding: Arc<AtomicUsize>,
}

fn failure_reply(query: DnsQuery, e: &c_ares::Error, negative_ttl: u32) -> DnsReply {
    match e {
        c_ares::Error::ENOTFOUND | c_ares::Error::ENODATA => {
            DnsReply::no_such_record(query, negative_ttl)
        }
        c_ares::Error::ETIMEOUT => DnsReply::timed_out(query),
        _ => DnsReply::channel_error(query),
    }
}

struct Completion {
    query: DnsQuery,
    replies: ReplySender,
    outstanding: Arc<AtomicUsize>,
}

impl Completion {
    fn deliver(self, reply: DnsReply) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        if self.replies.send(reply).is_err() {
            log::debug!("reply receiver is gone, dropped answer for {}", self.query.key);
        }
    }
}

impl CAresChannel {
    fn start_completion(&self, query: &DnsQuery, replies: &ReplySender) -> Completion {
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        Completion {
            query: query.clone(),
            replies: replies.clone(),
            outstanding: self.outstanding.clone(),
        }
    }

    fn drive(&mut self, timeout: Duration) {
        let read_fds: Vec<RawFd> = self
            .read_fds
            .lock()
            .expect("socket state lock")
            .iter()
            .copied()
            .collect();
        let write_fds: Vec<RawFd> = self
            .write_fds
            .lock()
            .expect("socket state lock")
            .iter()
            .copied()
            .collect();

        if read_fds.is_empty() && write_fds.is_empty() {
            if !timeout.is_zero() {
                std::thread::sleep(timeout);
            }
            // let the library run its retransmit timers
            self.inner.process_fd(c_ares::SOCKET_BAD, c_ares::SOCKET_BAD);
            return;
        }

        let mut pollfds = Vec::with_capacity(read_fds.len() + write_fds.len());
        for fd in read_fds.iter() {
            let mut events = libc::POLLIN;
            if write_fds.contains(fd) {
                events |= libc::POLLOUT;
            }
            pollfds.push(libc::pollfd {
                fd: *fd,
                events,
                revents: 0,
            });
        }
        for fd in write_fds.iter() {
            if !read_fds.contains(fd) {
                pollfds.push(libc::pollfd {
                    fd: *fd,
                    events: libc::POLLOUT,
                    revents: 0,
                });
            }
        }

        let timeout_ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let ready = unsafe {
            libc::poll(
                pollfds.as_mut_ptr(),
                pollfds.len() as libc::nfds_t,
                timeout_ms,
            )
        };
        if ready <= 0 {
            self.inner.process_fd(c_ares::SOCKET_BAD, c_ares::SOCKET_BAD);
            return;
        }
        for pfd in pollfds.iter() {
            let readable = pfd.revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0;
            let writable = pfd.revents & libc::POLLOUT != 0;
            if !readable && !writable {
                continue;
            }
            let read_sock = if readable {
                pfd.fd as c_ares::Socket
            } else {
                c_ares::SOCKET_BAD
            };
            let write_sock = if writable {
                pfd.fd as c_ares::Socket
            } else {
                c_ares::SOCKET_BAD
            };
            self.inner.process_fd(read_sock, write_sock);
        }
    }
}

impl ResolverChannel for CAresChannel {
    fn submit(
        &mut self,
        query: DnsQuery,
        replies: &ReplySender,
    ) -> Result<(), LookupChannelError> {
        let wire_name = query.wire_name();
        if wire_name.is_empty() {
            return Err(LookupChannelError::Rejected);
        }

        match (&query.key, query.rr_type) {
            (QueryKey::Name(_), RR_TYPE_A) => {
                let done = self.start_completion(&query, replies);
                let min_ttl = self.positive_min_ttl;
                let max_ttl = self.positive_max_ttl;
                let negative_ttl = self.negative_ttl;
                self.inner.query_a(&wire_name, move |result| {
                    let reply = match result {
                        Ok(results) => {
                            let mut ttl = 0i32;
                            let mut addrs = Vec::new();
                            for r in results.iter() {
                                ttl = r.ttl();
                                addrs.push(std::net::IpAddr::V4(r.ipv4()));
                            }
                            let ttl = u32::try_from(ttl).unwrap_or_default();
                            DnsReply::answered(
                                done.query.clone(),
                                ttl.clamp(min_ttl, max_ttl),
                                ReplyPayload::Addrs(addrs),
                            )
                        }
                        Err(e) => failure_reply(done.query.clone(), &e, negative_ttl),
                    };
                    done.deliver(reply);
                });
            }
            (QueryKey::Name(_), RR_TYPE_AAAA) => {
                let done = self.start_completion(&query, replies);
                let min_ttl = self.positive_min_ttl;
                let max_ttl = self.positive_max_ttl;
                let negative_ttl = self.negative_ttl;
                self.inner.query_aaaa(&wire_name, move |result| {
                    let reply = match result {
                        Ok(results) => {
                            let mut ttl = 0i32;
                            let mut addrs = Vec::new();
                            for r in results.iter() {
                                ttl = r.ttl();
                                addrs.push(std::net::IpAddr::V6(r.ipv6()));
                            }
                            let ttl = u32::try_from(ttl).unwrap_or_default();
                            DnsReply::answered(
                                done.query.clone(),
                                ttl.clamp(min_ttl, max_ttl),
                                ReplyPayload::Addrs(addrs),
                            )
                        }
                        Err(e) => failure_reply(done.query.clone(), &e, negative_ttl),
                    };
                    done.deliver(reply);
                });
            }
            (QueryKey::Addr(ip), RR_TYPE_PTR) => {
                let done = self.start_completion(&query, replies);
                let ttl = self.unreported_ttl;
                let negative_ttl = self.negative_ttl;
                self.inner.get_host_by_address(ip, move |result| {
                    let reply = match result {
                        Ok(results) => DnsReply::answered(
                            done.query.clone(),
                            ttl,
                            ReplyPayload::Names(vec![results.hostname().to_string()]),
                        ),
                        Err(e) => failure_reply(done.query.clone(), &e, negative_ttl),
                    };
                    done.deliver(reply);
                });
            }
            (QueryKey::Name(_), RR_TYPE_TXT) => {
                let done = self.start_completion(&query, replies);
                let ttl = self.unreported_ttl;
                let negative_ttl = self.negative_ttl;
                self.inner.query_txt(&wire_name, move |result| {
                    let reply = match result {
                        Ok(results) => {
                            let texts = results
                                .iter()
                                .map(|r| String::from_utf8_lossy(r.text()).into_owned())
                                .collect();
                            DnsReply::answered(done.query.clone(), ttl, ReplyPayload::Texts(texts))
                        }
                        Err(e) => failure_reply(done.query.clone(), &e, negative_ttl),
                    };
                    done.deliver(reply);
                });
            }
            _ => return Err(LookupChannelError::UnsupportedRecordType(query.rr_type)),
        }
        Ok(())
    }

    fn process(&mut self) {
        self.drive(Duration::ZERO);
    }

    fn wait_and_process(&mut self, timeout: Duration) {
        self.drive(timeout);
    }

    fn next_timeout(&self) -> Option<Duration> {
        if self.outstanding.load(Ordering::Relaxed) == 0 {
            None
        } else {
            Some(Duration::from_millis(u64::from(self.each_timeout)))
        }
    }

    fn poll_socket_events(&mut self) -> Vec<SocketEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = self.socket_rx.try_recv() {
            events.push(ev);
        }
        events
    }
}
