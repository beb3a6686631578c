/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::net::IpAddr;
use std::time::{Duration, Instant};

use ahash::AHashMap;

use crate::bridge::ResolverBridge;
use crate::callback::LookupCallback;
use crate::query::{DnsQuery, RR_TYPE_A, RR_TYPE_AAAA};

/// Routing key of a pending asynchronous request, one entry per table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum PendingKey {
    Addr(IpAddr),
    Name(String),
    Text(String),
}

impl std::fmt::Display for PendingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingKey::Addr(ip) => write!(f, "{ip}"),
            PendingKey::Name(name) | PendingKey::Text(name) => f.write_str(name),
        }
    }
}

/// One outstanding, possibly coalesced, asynchronous lookup. Owned by the
/// coordinator from registration until completion or timeout.
pub(crate) struct AsyncRequest {
    pub(crate) key: PendingKey,
    pub(crate) callbacks: Vec<Box<dyn LookupCallback>>,
    /// record type of a text-table request, TXT unless a generic lookup
    /// asked for something else
    pub(crate) rr_type: u16,
    /// whether the first answer of this logical query was installed, the
    /// sibling family answer then merges instead of replacing
    pub(crate) answered: bool,
    /// sub-queries still on the wire; a host request issues two, the
    /// callbacks fire only once the last one came back
    pub(crate) outstanding: usize,
    /// at least one sub-query returned records
    pub(crate) got_answer: bool,
    /// at least one sub-query returned an authoritative no-such-record
    pub(crate) got_nodata: bool,
    submit_time: Option<Instant>,
    heap_seq: Option<u64>,
}

impl AsyncRequest {
    fn is_issued(&self) -> bool {
        self.submit_time.is_some()
    }
}

struct TimeoutEntry {
    deadline: Instant,
    seq: u64,
    key: PendingKey,
}

impl PartialEq for TimeoutEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimeoutEntry {}

impl PartialOrd for TimeoutEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeoutEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Bookkeeping for asynchronous lookups: deduplication tables, the FIFO
/// admission queue, the inflight slot counter, and the timeout heap.
pub(crate) struct AsyncCoordinator {
    max_inflight: usize,
    timeout: Duration,
    addr_pending: AHashMap<IpAddr, AsyncRequest>,
    name_pending: AHashMap<String, AsyncRequest>,
    text_pending: AHashMap<String, AsyncRequest>,
    queue: VecDeque<PendingKey>,
    timeout_heap: BinaryHeap<Reverse<TimeoutEntry>>,
    next_seq: u64,
    inflight: usize,
    requests: u64,
    successful: u64,
    failed: u64,
}

impl AsyncCoordinator {
    pub(crate) fn new(max_inflight: usize, timeout: Duration) -> Self {
        AsyncCoordinator {
            max_inflight,
            timeout,
            addr_pending: AHashMap::new(),
            name_pending: AHashMap::new(),
            text_pending: AHashMap::new(),
            queue: VecDeque::new(),
            timeout_heap: BinaryHeap::new(),
            next_seq: 0,
            inflight: 0,
            requests: 0,
            successful: 0,
            failed: 0,
        }
    }

    fn request(&self, key: &PendingKey) -> Option<&AsyncRequest> {
        match key {
            PendingKey::Addr(ip) => self.addr_pending.get(ip),
            PendingKey::Name(name) => self.name_pending.get(name),
            PendingKey::Text(name) => self.text_pending.get(name),
        }
    }

    pub(crate) fn request_mut(&mut self, key: &PendingKey) -> Option<&mut AsyncRequest> {
        match key {
            PendingKey::Addr(ip) => self.addr_pending.get_mut(ip),
            PendingKey::Name(name) => self.name_pending.get_mut(name),
            PendingKey::Text(name) => self.text_pending.get_mut(name),
        }
    }

    pub(crate) fn name_request_mut(&mut self, name: &str) -> Option<&mut AsyncRequest> {
        self.name_pending.get_mut(name)
    }

    /// Remove a pending request, releasing its slot if it was issued.
    pub(crate) fn take(&mut self, key: &PendingKey) -> Option<AsyncRequest> {
        let req = match key {
            PendingKey::Addr(ip) => self.addr_pending.remove(ip),
            PendingKey::Name(name) => self.name_pending.remove(name),
            PendingKey::Text(name) => self.text_pending.remove(name),
        }?;
        if req.is_issued() {
            self.inflight -= 1;
        }
        Some(req)
    }

    /// Register a lookup for `key`. A request already pending for the key
    /// absorbs the callback, otherwise a new request joins the admission
    /// queue. Cache priming passes no callback, it only wants the answer
    /// installed. Returns whether a new request was created.
    pub(crate) fn enqueue(
        &mut self,
        key: PendingKey,
        rr_type: u16,
        callback: Option<Box<dyn LookupCallback>>,
    ) -> bool {
        if let Some(req) = self.request_mut(&key) {
            if let Some(cb) = callback {
                req.callbacks.push(cb);
            }
            return false;
        }
        let req = AsyncRequest {
            key: key.clone(),
            callbacks: callback.into_iter().collect(),
            rr_type,
            answered: false,
            outstanding: 0,
            got_answer: false,
            got_nodata: false,
            submit_time: None,
            heap_seq: None,
        };
        match &key {
            PendingKey::Addr(ip) => {
                self.addr_pending.insert(*ip, req);
            }
            PendingKey::Name(name) => {
                self.name_pending.insert(name.clone(), req);
            }
            PendingKey::Text(name) => {
                self.text_pending.insert(name.clone(), req);
            }
        }
        self.queue.push_back(key);
        self.requests += 1;
        true
    }

    fn queries_for(key: &PendingKey, rr_type: u16) -> Vec<DnsQuery> {
        match key {
            PendingKey::Name(name) => vec![
                DnsQuery::forward(name, RR_TYPE_A),
                DnsQuery::forward(name, RR_TYPE_AAAA),
            ],
            PendingKey::Addr(ip) => vec![DnsQuery::reverse(*ip)],
            PendingKey::Text(name) => vec![DnsQuery::raw(name, rr_type)],
        }
    }

    /// Move queued requests to the bridge while slots are available.
    /// Requests the channel refuses come back so the caller can fire
    /// their timeout notifications.
    pub(crate) fn issue_pending(&mut self, bridge: &mut ResolverBridge) -> Vec<AsyncRequest> {
        let mut rejected = Vec::new();
        while self.inflight < self.max_inflight {
            let Some(key) = self.queue.pop_front() else {
                break;
            };
            // flushed while queued
            if self.request(&key).is_none() {
                continue;
            }
            let rr_type = self.request(&key).map(|r| r.rr_type).unwrap_or_default();
            let queries = Self::queries_for(&key, rr_type);
            let query_count = queries.len();
            let mut submit_failed = false;
            for query in queries {
                if let Err(e) = bridge.submit(query) {
                    log::warn!("channel rejected query for {key}: {e}");
                    submit_failed = true;
                    break;
                }
            }
            if submit_failed {
                if let Some(req) = self.take(&key) {
                    self.failed += 1;
                    rejected.push(req);
                }
                continue;
            }
            let now = Instant::now();
            let seq = self.next_seq;
            self.next_seq += 1;
            if let Some(req) = self.request_mut(&key) {
                req.submit_time = Some(now);
                req.heap_seq = Some(seq);
                req.outstanding = query_count;
            }
            self.timeout_heap.push(Reverse(TimeoutEntry {
                deadline: now + self.timeout,
                seq,
                key,
            }));
            self.inflight += 1;
        }
        rejected
    }

    fn heap_entry_is_live(&self, entry: &TimeoutEntry) -> bool {
        self.request(&entry.key)
            .map(|req| req.heap_seq == Some(entry.seq))
            .unwrap_or(false)
    }

    /// Pop every request whose deadline has passed, releasing slots.
    pub(crate) fn due_timeouts(&mut self, now: Instant) -> Vec<AsyncRequest> {
        let mut out = Vec::new();
        while let Some(Reverse(top)) = self.timeout_heap.peek() {
            if top.deadline > now {
                break;
            }
            let entry = match self.timeout_heap.pop() {
                Some(Reverse(e)) => e,
                None => break,
            };
            if !self.heap_entry_is_live(&entry) {
                continue;
            }
            if let Some(req) = self.take(&entry.key) {
                self.failed += 1;
                out.push(req);
            }
        }
        out
    }

    /// Time until the earliest live deadline. Entries for requests that
    /// already completed are discarded along the way.
    pub(crate) fn next_timeout(&mut self, now: Instant) -> Option<Duration> {
        loop {
            let (deadline, live) = {
                let Reverse(top) = self.timeout_heap.peek()?;
                (top.deadline, self.heap_entry_is_live(top))
            };
            if live {
                return Some(deadline.saturating_duration_since(now));
            }
            self.timeout_heap.pop();
        }
    }

    pub(crate) fn note_success(&mut self) {
        self.successful += 1;
    }

    pub(crate) fn note_failure(&mut self) {
        self.failed += 1;
    }

    pub(crate) fn pending_count(&self) -> usize {
        self.addr_pending.len() + self.name_pending.len() + self.text_pending.len()
    }

    #[allow(dead_code)]
    pub(crate) fn inflight_count(&self) -> usize {
        self.inflight
    }

    pub(crate) fn counters(&self) -> (u64, u64, u64) {
        (self.requests, self.successful, self.failed)
    }

    /// Drain every pending request, queued or inflight. The caller owes
    /// each of them a timeout notification.
    pub(crate) fn flush_all(&mut self) -> Vec<AsyncRequest> {
        let mut out = Vec::new();
        out.extend(self.addr_pending.drain().map(|(_, v)| v));
        out.extend(self.name_pending.drain().map(|(_, v)| v));
        out.extend(self.text_pending.drain().map(|(_, v)| v));
        self.queue.clear();
        self.timeout_heap.clear();
        self.inflight = 0;
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::ResolverChannel;
    use crate::error::LookupChannelError;
    use crate::message::{ReplySender, SocketEvent};

    struct NopCallback;

    impl LookupCallback for NopCallback {
        fn timed_out(&mut self) {}
    }

    struct AcceptChannel;

    impl ResolverChannel for AcceptChannel {
        fn submit(
            &mut self,
            _query: DnsQuery,
            _replies: &ReplySender,
        ) -> Result<(), LookupChannelError> {
            Ok(())
        }

        fn process(&mut self) {}

        fn wait_and_process(&mut self, _timeout: Duration) {}

        fn next_timeout(&self) -> Option<Duration> {
            None
        }

        fn poll_socket_events(&mut self) -> Vec<SocketEvent> {
            Vec::new()
        }
    }

    fn name_key(name: &str) -> PendingKey {
        PendingKey::Name(name.to_string())
    }

    #[test]
    fn duplicate_keys_coalesce() {
        let mut c = AsyncCoordinator::new(10, Duration::from_secs(5));
        assert!(c.enqueue(name_key("foo.test"), RR_TYPE_A, Some(Box::new(NopCallback))));
        assert!(!c.enqueue(name_key("foo.test"), RR_TYPE_A, Some(Box::new(NopCallback))));
        assert!(!c.enqueue(name_key("foo.test"), RR_TYPE_A, Some(Box::new(NopCallback))));
        assert_eq!(c.pending_count(), 1);
        let (requests, _, _) = c.counters();
        assert_eq!(requests, 1);
        let req = c.take(&name_key("foo.test")).unwrap();
        assert_eq!(req.callbacks.len(), 3);
    }

    #[test]
    fn take_unknown_key() {
        let mut c = AsyncCoordinator::new(10, Duration::from_secs(5));
        assert!(c.take(&name_key("missing.test")).is_none());
    }

    #[test]
    fn flush_drains_everything() {
        let mut c = AsyncCoordinator::new(10, Duration::from_secs(5));
        c.enqueue(name_key("a.test"), RR_TYPE_A, Some(Box::new(NopCallback)));
        c.enqueue(
            PendingKey::Addr("10.0.0.1".parse().unwrap()),
            crate::query::RR_TYPE_PTR,
            Some(Box::new(NopCallback)),
        );
        let drained = c.flush_all();
        assert_eq!(drained.len(), 2);
        assert_eq!(c.pending_count(), 0);
        assert_eq!(c.inflight_count(), 0);
    }

    #[test]
    fn host_request_issues_two_sub_queries() {
        let mut c = AsyncCoordinator::new(10, Duration::from_secs(5));
        c.enqueue(name_key("a.test"), RR_TYPE_A, Some(Box::new(NopCallback)));
        let mut bridge = ResolverBridge::new(Box::new(AcceptChannel));
        let rejected = c.issue_pending(&mut bridge);
        assert!(rejected.is_empty());
        assert_eq!(c.inflight_count(), 1);
        let req = c.take(&name_key("a.test")).unwrap();
        assert_eq!(req.outstanding, 2);
        assert_eq!(c.inflight_count(), 0);
    }

    #[test]
    fn no_deadline_without_issued_requests() {
        let mut c = AsyncCoordinator::new(10, Duration::from_secs(5));
        c.enqueue(name_key("a.test"), RR_TYPE_A, Some(Box::new(NopCallback)));
        assert!(c.next_timeout(Instant::now()).is_none());
        assert!(c.due_timeouts(Instant::now()).is_empty());
    }
}
