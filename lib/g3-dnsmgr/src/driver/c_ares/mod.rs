/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::net::{IpAddr, SocketAddr};
use std::os::fd::RawFd;
use std::str::FromStr;
use std::sync::atomic::AtomicUsize;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::anyhow;
use indexmap::IndexSet;

use super::BoxResolverChannel;
use crate::message::SocketEvent;

mod driver;
use driver::CAresChannel;

const CARES_MINIMUM_CACHE_TTL: u32 = 30;
const CARES_MAXIMUM_CACHE_TTL: u32 = 3600;
const CARES_UNREPORTED_TTL: u32 = 1800;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CAresChannelConfig {
    each_timeout: u32,
    each_tries: u32,
    servers: IndexSet<SocketAddr>,
    negative_ttl: u32,
    positive_min_ttl: u32,
    positive_max_ttl: u32,
    /// used for record types the library reports no ttl for
    unreported_ttl: u32,
}

impl Default for CAresChannelConfig {
    fn default() -> Self {
        CAresChannelConfig {
            each_timeout: 2000,
            each_tries: 3,
            servers: IndexSet::new(),
            negative_ttl: CARES_MINIMUM_CACHE_TTL,
            positive_min_ttl: CARES_MINIMUM_CACHE_TTL,
            positive_max_ttl: CARES_MAXIMUM_CACHE_TTL,
            unreported_ttl: CARES_UNREPORTED_TTL,
        }
    }
}

impl CAresChannelConfig {
    pub fn check(&mut self) {
        if self.positive_max_ttl < self.positive_min_ttl {
            self.positive_max_ttl = self.positive_min_ttl;
        }
    }

    fn parse_socket_addr(addr: &str) -> anyhow::Result<SocketAddr> {
        if let Ok(sock_addr) = SocketAddr::from_str(addr) {
            Ok(sock_addr)
        } else if let Ok(ip) = IpAddr::from_str(addr) {
            Ok(SocketAddr::new(ip, 53))
        } else {
            Err(anyhow!("invalid SocketAddr / IpAddr string {addr}"))
        }
    }

    pub fn add_server(&mut self, addr: &str) -> anyhow::Result<()> {
        let sock_addr = Self::parse_socket_addr(addr)?;
        let ip = sock_addr.ip();
        if ip.is_unspecified() {
            return Err(anyhow!("dns server address should not be unspecified"));
        }
        if ip.is_multicast() {
            return Err(anyhow!("dns server address should not be multicast"));
        }
        self.servers.insert(sock_addr);
        Ok(())
    }

    pub(crate) fn spawn_channel(&self) -> anyhow::Result<BoxResolverChannel> {
        let (socket_tx, socket_rx) = mpsc::channel();
        let read_fds = Arc::new(Mutex::new(BTreeSet::<RawFd>::new()));
        let write_fds = Arc::new(Mutex::new(BTreeSet::<RawFd>::new()));

        let cb_read_fds = read_fds.clone();
        let cb_write_fds = write_fds.clone();
        let mut opts = c_ares::Options::new();
        opts.set_socket_state_callback(move |socket: c_ares::Socket, readable, writable| {
            let fd = socket as RawFd;
            {
                let mut set = cb_read_fds.lock().expect("socket state lock");
                if readable {
                    set.insert(fd);
                } else {
                    set.remove(&fd);
                }
            }
            {
                let mut set = cb_write_fds.lock().expect("socket state lock");
                if writable {
                    set.insert(fd);
                } else {
                    set.remove(&fd);
                }
            }
            let _ = socket_tx.send(SocketEvent {
                fd,
                active: readable || writable,
            });
        });
        opts.set_flags(c_ares::Flags::STAYOPEN)
            .set_timeout(self.each_timeout)
            .set_tries(self.each_tries);

        let mut channel = c_ares::Channel::with_options(opts)
            .map_err(|e| anyhow!("failed to create channel: {e}"))?;
        if !self.servers.is_empty() {
            let servers: Vec<String> = self.servers.iter().map(|s| s.to_string()).collect();
            let refs: Vec<&str> = servers.iter().map(|s| s.as_str()).collect();
            channel
                .set_servers(&refs)
                .map_err(|e| anyhow!("failed to set servers for channel: {e}"))?;
        }

        Ok(Box::new(CAresChannel {
            inner: channel,
            each_timeout: self.each_timeout,
            negative_ttl: self.negative_ttl,
            positive_min_ttl: self.positive_min_ttl,
            positive_max_ttl: self.positive_max_ttl,
            unreported_ttl: self.unreported_ttl,
            socket_rx,
            read_fds,
            write_fds,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }))
    }
}
