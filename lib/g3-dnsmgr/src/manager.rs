/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::os::fd::RawFd;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::bridge::ResolverBridge;
use crate::cache::{persist, DnsCache, InsertOutcome};
use crate::callback::LookupCallback;
use crate::config::{DnsManagerConfig, DnsManagerMode};
use crate::coordinator::{AsyncCoordinator, AsyncRequest, PendingKey};
use crate::driver::{AnyChannelConfig, BoxResolverChannel};
use crate::error::DnsMgrError;
use crate::events::{addr_list_delta, DnsEvent, EventSink};
use crate::mapping::{AddrSet, Mapping, MappingKind};
use crate::message::{DnsReply, ReplyPayload, ReplyStatus};
use crate::query::{DnsQuery, QueryKey, RR_TYPE_A, RR_TYPE_AAAA, RR_TYPE_PTR, RR_TYPE_TXT};
use crate::stats::Stats;

/// Address set used for error cases and cache priming.
pub fn empty_addr_set() -> AddrSet {
    AddrSet::new()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The contract the host runtime event loop drives the manager through.
/// `next_timeout` never reports a negative interval, a past-due deadline
/// comes back as zero meaning "ready now".
pub trait IoSource {
    fn init_source(&mut self);
    fn next_timeout(&mut self) -> Option<Duration>;
    fn process(&mut self);
    fn tag(&self) -> &'static str;
}

enum ImmediateValue {
    Addrs(AddrSet),
    Name(String),
    Values(Vec<String>, u16),
}

/// A lookup answered from the cache or faked, scheduled to notify on the
/// next tick so callbacks always fire from inside `process()`.
struct Immediate {
    value: ImmediateValue,
    callback: Box<dyn LookupCallback>,
}

struct SyncForward {
    host: String,
    answered: bool,
}

/// The DNS resolution manager.
///
/// One instance per host runtime. Lifecycle: construct, `init()` once
/// configuration is settled, tick through the [`IoSource`] contract,
/// `flush()` at teardown.
pub struct DnsManager {
    config: DnsManagerConfig,
    cache: DnsCache,
    coordinator: AsyncCoordinator,
    bridge: ResolverBridge,
    event_sink: Option<Box<dyn EventSink>>,
    socket_fds: BTreeSet<RawFd>,
    did_init: bool,
    immediates: Vec<Immediate>,
    /// merge bookkeeping for the one blocking forward lookup that can be
    /// in progress at a time
    sync_forward: Option<SyncForward>,
}

impl DnsManager {
    pub fn new(mut config: DnsManagerConfig, channel: BoxResolverChannel) -> Self {
        config.check();
        let coordinator = AsyncCoordinator::new(config.max_inflight, config.async_timeout);
        DnsManager {
            config,
            cache: DnsCache::new(),
            coordinator,
            bridge: ResolverBridge::new(channel),
            event_sink: None,
            socket_fds: BTreeSet::new(),
            did_init: false,
            immediates: Vec::new(),
            sync_forward: None,
        }
    }

    pub fn with_channel_config(
        config: DnsManagerConfig,
        channel: &AnyChannelConfig,
    ) -> anyhow::Result<Self> {
        let channel = channel.spawn_channel()?;
        Ok(DnsManager::new(config, channel))
    }

    pub fn set_event_sink(&mut self, sink: Box<dyn EventSink>) {
        self.event_sink = Some(sink);
    }

    /// Change the directory the cache file lives in. Only meaningful
    /// before `init()`.
    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config.dir = dir.into();
    }

    /// Full path of the persistent cache file.
    pub fn cache_file(&self) -> PathBuf {
        self.config.dir.join(&self.config.cache_name)
    }

    pub fn mode(&self) -> DnsManagerMode {
        self.config.mode
    }

    /// Sockets the host runtime should currently poll for the channel.
    pub fn socket_fds(&self) -> &BTreeSet<RawFd> {
        &self.socket_fds
    }

    /// Load the persisted cache. Called once, after the host finished its
    /// own configuration phase.
    pub fn init(&mut self) {
        if self.did_init {
            return;
        }
        self.did_init = true;
        let path = self.cache_file();
        let restored = persist::load(&mut self.cache, &path, unix_now());
        if restored > 0 {
            log::debug!("restored {restored} entries from {}", path.display());
        }
    }

    /// Write the current caches to disk. Returns whether the file was
    /// written.
    pub fn save(&mut self) -> bool {
        let path = self.cache_file();
        match persist::save(&self.cache, &path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("failed to save dns cache: {e:#}");
                false
            }
        }
    }

    pub fn stats(&self) -> Stats {
        let (requests, successful, failed) = self.coordinator.counters();
        Stats {
            requests,
            successful,
            failed,
            pending: self.coordinator.pending_count() as u64,
            cached_hosts: self.cache.host_count() as u64,
            cached_addresses: self.cache.addr_count() as u64,
            cached_texts: self.cache.text_count() as u64,
        }
    }

    /*
     * synchronous API
     */

    /// Resolve the addresses of `host`, blocking until the answer arrives
    /// or the synchronous timeout passes. Returns an empty set on failure.
    pub fn lookup_host(&mut self, host: &str) -> Result<AddrSet, DnsMgrError> {
        if self.config.mode == DnsManagerMode::Fake {
            return Ok(empty_addr_set());
        }
        let now = unix_now();
        // an expired entry stays in place so that the answer superseding
        // it can be compared against it
        if let Some(m) = self.cache.lookup_host(host, false, true, now) {
            if self.stale_ok() || !m.is_expired(now) {
                return Ok(m.addrs().clone());
            }
        }
        match self.config.mode {
            DnsManagerMode::Force => Err(DnsMgrError::AuthoritativeMiss(host.to_string())),
            DnsManagerMode::Prime => {
                self.prime_host(host, now);
                Ok(empty_addr_set())
            }
            _ => {
                self.sync_resolve_host(host);
                let now = unix_now();
                Ok(self
                    .cache
                    .lookup_host(host, false, true, now)
                    .map(|m| m.addrs().clone())
                    .unwrap_or_default())
            }
        }
    }

    /// Resolve the hostname of `addr`, blocking as `lookup_host` does.
    pub fn lookup_addr(&mut self, addr: IpAddr) -> Result<Option<String>, DnsMgrError> {
        if self.config.mode == DnsManagerMode::Fake {
            return Ok(Some(self.config.fake_hostname.clone()));
        }
        let now = unix_now();
        if let Some(m) = self.cache.lookup_addr(addr, false, true, now) {
            if self.stale_ok() || !m.is_expired(now) {
                return Ok(m.canonical_name().map(|s| s.to_string()));
            }
        }
        match self.config.mode {
            DnsManagerMode::Force => Err(DnsMgrError::AuthoritativeMiss(addr.to_string())),
            DnsManagerMode::Prime => {
                self.prime_addr(addr, now);
                Ok(None)
            }
            _ => {
                let query = DnsQuery::reverse(addr);
                let submitted = self.submit_queries(vec![query.clone()]);
                self.sync_wait(submitted, |q| *q == query);
                let now = unix_now();
                Ok(self
                    .cache
                    .lookup_addr(addr, false, true, now)
                    .and_then(|m| m.canonical_name().map(|s| s.to_string())))
            }
        }
    }

    /// Generic blocking lookup. `name` must already be in arpa format for
    /// PTR queries. Answers come back in presentation form; only TXT
    /// answers are cached.
    pub fn lookup(&mut self, name: &str, rr_type: u16) -> Result<Vec<String>, DnsMgrError> {
        if self.config.mode == DnsManagerMode::Fake {
            return Ok(Vec::new());
        }
        if rr_type == RR_TYPE_A || rr_type == RR_TYPE_AAAA {
            let addrs = self.lookup_host(name)?;
            return Ok(addrs.iter().map(|ip| ip.to_string()).collect());
        }
        let now = unix_now();
        if rr_type == RR_TYPE_TXT {
            if let Some(m) = self.cache.lookup_text(name, false, now) {
                if self.stale_ok() || !m.is_expired(now) {
                    return Ok(m.texts().to_vec());
                }
            }
        }
        match self.config.mode {
            DnsManagerMode::Force => Err(DnsMgrError::AuthoritativeMiss(name.to_string())),
            DnsManagerMode::Prime if rr_type == RR_TYPE_TXT => {
                self.prime_text(name, now);
                Ok(Vec::new())
            }
            _ => {
                let query = DnsQuery::raw(name, rr_type);
                let submitted = self.submit_queries(vec![query.clone()]);
                let replies = self.sync_wait(submitted, |q| *q == query);
                if rr_type == RR_TYPE_TXT {
                    let now = unix_now();
                    return Ok(self
                        .cache
                        .lookup_text(name, false, now)
                        .map(|m| m.texts().to_vec())
                        .unwrap_or_default());
                }
                for reply in replies {
                    if let Some(values) = reply_values(&reply) {
                        return Ok(values);
                    }
                }
                Ok(Vec::new())
            }
        }
    }

    /*
     * asynchronous API
     */

    /// Resolve the addresses of `host` without blocking. The callback is
    /// notified exactly once, from inside a later `process()` tick.
    pub fn lookup_host_async(
        &mut self,
        host: &str,
        callback: Box<dyn LookupCallback>,
    ) -> Result<(), DnsMgrError> {
        if self.config.mode == DnsManagerMode::Fake {
            self.immediates.push(Immediate {
                value: ImmediateValue::Addrs(empty_addr_set()),
                callback,
            });
            return Ok(());
        }
        let now = unix_now();
        // a cached authoritative failure is a hit here just as it is for
        // the blocking variant; it re-resolves once its negative ttl is up
        if let Some(m) = self.cache.lookup_host(host, false, true, now) {
            if self.stale_ok() || !m.is_expired(now) {
                self.immediates.push(Immediate {
                    value: ImmediateValue::Addrs(m.addrs().clone()),
                    callback,
                });
                return Ok(());
            }
        }
        if self.config.mode == DnsManagerMode::Force {
            return Err(DnsMgrError::AuthoritativeMiss(host.to_string()));
        }
        self.coordinator.enqueue(
            PendingKey::Name(host.to_string()),
            RR_TYPE_A,
            Some(callback),
        );
        self.kick_queue();
        Ok(())
    }

    /// Resolve the hostname of `addr` without blocking.
    pub fn lookup_addr_async(
        &mut self,
        addr: IpAddr,
        callback: Box<dyn LookupCallback>,
    ) -> Result<(), DnsMgrError> {
        if self.config.mode == DnsManagerMode::Fake {
            self.immediates.push(Immediate {
                value: ImmediateValue::Name(self.config.fake_hostname.clone()),
                callback,
            });
            return Ok(());
        }
        let now = unix_now();
        if let Some(m) = self.cache.lookup_addr(addr, false, true, now) {
            if self.stale_ok() || !m.is_expired(now) {
                let name = m.canonical_name().unwrap_or_default().to_string();
                self.immediates.push(Immediate {
                    value: ImmediateValue::Name(name),
                    callback,
                });
                return Ok(());
            }
        }
        if self.config.mode == DnsManagerMode::Force {
            return Err(DnsMgrError::AuthoritativeMiss(addr.to_string()));
        }
        self.coordinator
            .enqueue(PendingKey::Addr(addr), RR_TYPE_PTR, Some(callback));
        self.kick_queue();
        Ok(())
    }

    /// Generic non-blocking lookup, see [`DnsManager::lookup`] for the
    /// name and caching rules.
    pub fn lookup_async(
        &mut self,
        name: &str,
        rr_type: u16,
        callback: Box<dyn LookupCallback>,
    ) -> Result<(), DnsMgrError> {
        if rr_type == RR_TYPE_A || rr_type == RR_TYPE_AAAA {
            return self.lookup_host_async(name, callback);
        }
        if self.config.mode == DnsManagerMode::Fake {
            self.immediates.push(Immediate {
                value: ImmediateValue::Values(Vec::new(), rr_type),
                callback,
            });
            return Ok(());
        }
        let now = unix_now();
        if rr_type == RR_TYPE_TXT {
            if let Some(m) = self.cache.lookup_text(name, false, now) {
                if self.stale_ok() || !m.is_expired(now) {
                    self.immediates.push(Immediate {
                        value: ImmediateValue::Values(m.texts().to_vec(), rr_type),
                        callback,
                    });
                    return Ok(());
                }
            }
        }
        if self.config.mode == DnsManagerMode::Force {
            return Err(DnsMgrError::AuthoritativeMiss(name.to_string()));
        }
        self.coordinator
            .enqueue(PendingKey::Text(name.to_string()), rr_type, Some(callback));
        self.kick_queue();
        Ok(())
    }

    /// Wait for every pending asynchronous request to complete or time
    /// out, bounded by the synchronous timeout. Used after priming.
    pub fn resolve_all_pending(&mut self) {
        let deadline = Instant::now() + self.config.sync_timeout;
        while self.coordinator.pending_count() > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let slice = self.config.sync_poll_interval.min(deadline - now);
            self.pump(Some(slice));
        }
    }

    /// One more processing pass, then drop every cached mapping and every
    /// pending request. Outstanding callbacks get a timeout notification.
    pub fn flush(&mut self) {
        self.pump(None);
        let drained = self.coordinator.flush_all();
        self.fire_timeouts(drained);
        for imm in std::mem::take(&mut self.immediates) {
            let mut cb = imm.callback;
            cb.timed_out();
        }
        self.cache.clear();
        self.sync_forward = None;
    }

    /*
     * internals
     */

    /// In the modes that never re-resolve on their own, a stale cache
    /// entry is still an answer.
    fn stale_ok(&self) -> bool {
        matches!(
            self.config.mode,
            DnsManagerMode::Force | DnsManagerMode::Prime
        )
    }

    fn emit(&mut self, event: DnsEvent) {
        if let Some(sink) = self.event_sink.as_mut() {
            sink.dispatch(event);
        }
    }

    fn emit_host_events(&mut self, outcome: &InsertOutcome) {
        if outcome.merged || outcome.mapping.kind() != MappingKind::Forward {
            return;
        }
        let new = outcome.mapping.clone();
        match &outcome.previous {
            None => {
                if new.failed() {
                    self.emit(DnsEvent::MappingUnverified(new));
                } else {
                    self.emit(DnsEvent::MappingNewName(new));
                }
            }
            Some(old) => {
                let old = old.clone();
                if old.failed() && new.failed() {
                    self.emit(DnsEvent::MappingUnverified(new));
                } else if old.failed() {
                    self.emit(DnsEvent::MappingNewName(new));
                } else if new.failed() {
                    self.emit(DnsEvent::MappingLostName { old, new });
                } else if old.same_addrs(&new) {
                    self.emit(DnsEvent::MappingValid(new));
                } else {
                    let (added, lost) = addr_list_delta(old.addrs(), new.addrs());
                    self.emit(DnsEvent::MappingAltered {
                        old: old.clone(),
                        new: new.clone(),
                    });
                    self.emit(DnsEvent::MappingNameChanged {
                        old,
                        new,
                        added,
                        lost,
                    });
                }
            }
        }
    }

    /// Whether this completion merges into the current mapping or
    /// replaces it. The first answer a logical query installs replaces,
    /// its A/AAAA sibling merges; a sibling outliving its request merges
    /// only if there is still a mapping to merge into.
    fn decide_merge(&mut self, query: &DnsQuery) -> bool {
        let QueryKey::Name(name) = &query.key else {
            return false;
        };
        if query.rr_type != RR_TYPE_A && query.rr_type != RR_TYPE_AAAA {
            return false;
        }
        if let Some(t) = self.sync_forward.as_mut() {
            if t.host == *name {
                let merge = t.answered;
                t.answered = true;
                return merge;
            }
        }
        if let Some(req) = self.coordinator.name_request_mut(name) {
            let merge = req.answered;
            req.answered = true;
            return merge;
        }
        self.cache.peek_host(name).is_some()
    }

    fn add_result(&mut self, reply: &DnsReply, merge: bool) {
        let now = unix_now();
        if let Some(mapping) = Mapping::from_reply(reply, now) {
            let outcome = self.cache.insert(mapping, merge, now);
            self.emit_host_events(&outcome);
        }
    }

    fn pending_key_of(query: &DnsQuery) -> PendingKey {
        match (&query.key, query.rr_type) {
            (QueryKey::Name(n), RR_TYPE_A | RR_TYPE_AAAA) => PendingKey::Name(n.clone()),
            (QueryKey::Addr(ip), _) => PendingKey::Addr(*ip),
            (QueryKey::Name(n), _) => PendingKey::Text(n.clone()),
        }
    }

    /// Account one reply against the pending request for its key. The
    /// request is released and its callbacks fired only once every
    /// sub-query of the logical request has come back, so a host lookup
    /// reports the union of its A and AAAA answers rather than whichever
    /// family happened to arrive first.
    fn complete_async(&mut self, reply: &DnsReply) {
        let key = Self::pending_key_of(&reply.query);
        let finished = match self.coordinator.request_mut(&key) {
            Some(req) => {
                match reply.status {
                    ReplyStatus::Answered => req.got_answer = true,
                    ReplyStatus::NoSuchRecord => req.got_nodata = true,
                    ReplyStatus::TimedOut | ReplyStatus::ChannelError => {}
                }
                req.outstanding = req.outstanding.saturating_sub(1);
                req.outstanding == 0
            }
            None => return,
        };
        if !finished {
            return;
        }
        let Some(req) = self.coordinator.take(&key) else {
            return;
        };
        if req.got_answer {
            self.coordinator.note_success();
        } else {
            self.coordinator.note_failure();
        }
        if !req.got_answer && !req.got_nodata {
            // transient failures only, nothing was learned
            self.fire_timeouts(vec![req]);
            return;
        }
        let now = unix_now();
        match &key {
            PendingKey::Name(name) => {
                let addrs = self
                    .cache
                    .lookup_host(name, false, false, now)
                    .map(|m| m.addrs().clone())
                    .unwrap_or_default();
                for mut cb in req.callbacks {
                    cb.resolved_addrs(&addrs);
                }
            }
            PendingKey::Addr(ip) => {
                let name = self
                    .cache
                    .lookup_addr(*ip, false, false, now)
                    .and_then(|m| m.canonical_name().map(|s| s.to_string()))
                    .unwrap_or_default();
                for mut cb in req.callbacks {
                    cb.resolved_name(&name);
                }
            }
            PendingKey::Text(_) => {
                let values = reply_values(reply).unwrap_or_default();
                for mut cb in req.callbacks {
                    cb.resolved_value(&values, req.rr_type);
                }
            }
        }
    }

    fn handle_reply(&mut self, reply: &DnsReply) {
        if matches!(
            reply.status,
            ReplyStatus::Answered | ReplyStatus::NoSuchRecord
        ) {
            let merge = self.decide_merge(&reply.query);
            self.add_result(reply, merge);
        }
        self.complete_async(reply);
    }

    fn fire_timeouts(&mut self, requests: Vec<AsyncRequest>) {
        for req in requests {
            log::debug!("no answer for {}", req.key);
            for mut cb in req.callbacks {
                cb.timed_out();
            }
        }
    }

    fn apply_socket_events(&mut self) {
        for ev in self.bridge.poll_socket_events() {
            if ev.active {
                self.socket_fds.insert(ev.fd);
            } else {
                self.socket_fds.remove(&ev.fd);
            }
        }
    }

    fn kick_queue(&mut self) {
        let rejected = self.coordinator.issue_pending(&mut self.bridge);
        self.fire_timeouts(rejected);
        self.apply_socket_events();
    }

    /// One service pass: drive the channel, handle completions, expire
    /// overdue requests, admit queued ones.
    fn pump(&mut self, wait: Option<Duration>) -> Vec<DnsReply> {
        let replies = match wait {
            Some(timeout) => self.bridge.wait_and_process(timeout),
            None => self.bridge.process(),
        };
        for reply in replies.iter() {
            self.handle_reply(reply);
        }
        let due = self.coordinator.due_timeouts(Instant::now());
        self.fire_timeouts(due);
        self.kick_queue();
        replies
    }

    fn submit_queries(&mut self, queries: Vec<DnsQuery>) -> usize {
        let mut submitted = 0;
        for query in queries {
            match self.bridge.submit(query) {
                Ok(()) => submitted += 1,
                Err(e) => log::warn!("channel rejected synchronous query: {e}"),
            }
        }
        self.apply_socket_events();
        submitted
    }

    /// Block until `outstanding` matching replies were processed or the
    /// synchronous timeout passes, servicing everything else as usual.
    fn sync_wait<F>(&mut self, mut outstanding: usize, is_mine: F) -> Vec<DnsReply>
    where
        F: Fn(&DnsQuery) -> bool,
    {
        let mut mine = Vec::new();
        if outstanding == 0 {
            return mine;
        }
        let deadline = Instant::now() + self.config.sync_timeout;
        while outstanding > 0 {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let slice = self.config.sync_poll_interval.min(deadline - now);
            for reply in self.pump(Some(slice)) {
                if is_mine(&reply.query) {
                    outstanding = outstanding.saturating_sub(1);
                    mine.push(reply);
                }
            }
        }
        mine
    }

    fn sync_resolve_host(&mut self, host: &str) {
        self.sync_forward = Some(SyncForward {
            host: host.to_string(),
            answered: false,
        });
        let submitted = self.submit_queries(vec![
            DnsQuery::forward(host, RR_TYPE_A),
            DnsQuery::forward(host, RR_TYPE_AAAA),
        ]);
        let host = host.to_string();
        self.sync_wait(submitted, |q| {
            matches!(&q.key, QueryKey::Name(n) if *n == host)
                && (q.rr_type == RR_TYPE_A || q.rr_type == RR_TYPE_AAAA)
        });
        self.sync_forward = None;
    }

    fn prime_host(&mut self, host: &str, now: u64) {
        let placeholder = Mapping::restored(
            MappingKind::Forward,
            Some(host.to_string()),
            None,
            Vec::new(),
            0,
            now,
            true,
        );
        self.cache.insert(placeholder, false, now);
        self.coordinator
            .enqueue(PendingKey::Name(host.to_string()), RR_TYPE_A, None);
        self.kick_queue();
    }

    fn prime_addr(&mut self, addr: IpAddr, now: u64) {
        let placeholder = Mapping::restored(
            MappingKind::Reverse,
            None,
            Some(addr),
            Vec::new(),
            0,
            now,
            true,
        );
        self.cache.insert(placeholder, false, now);
        self.coordinator
            .enqueue(PendingKey::Addr(addr), RR_TYPE_PTR, None);
        self.kick_queue();
    }

    fn prime_text(&mut self, name: &str, now: u64) {
        let placeholder = Mapping::restored(
            MappingKind::Text,
            Some(name.to_string()),
            None,
            Vec::new(),
            0,
            now,
            true,
        );
        self.cache.insert(placeholder, false, now);
        self.coordinator
            .enqueue(PendingKey::Text(name.to_string()), RR_TYPE_TXT, None);
        self.kick_queue();
    }

    fn drain_immediates(&mut self) {
        for imm in std::mem::take(&mut self.immediates) {
            let mut cb = imm.callback;
            match imm.value {
                ImmediateValue::Addrs(addrs) => cb.resolved_addrs(&addrs),
                ImmediateValue::Name(name) => cb.resolved_name(&name),
                ImmediateValue::Values(values, rr_type) => cb.resolved_value(&values, rr_type),
            }
        }
    }
}

fn reply_values(reply: &DnsReply) -> Option<Vec<String>> {
    match &reply.payload {
        Some(ReplyPayload::Texts(texts)) => Some(texts.clone()),
        Some(ReplyPayload::Names(names)) => Some(names.clone()),
        Some(ReplyPayload::Addrs(addrs)) => {
            Some(addrs.iter().map(|ip| ip.to_string()).collect())
        }
        None => None,
    }
}

impl IoSource for DnsManager {
    fn init_source(&mut self) {
        self.init();
    }

    fn next_timeout(&mut self) -> Option<Duration> {
        if !self.immediates.is_empty() {
            return Some(Duration::ZERO);
        }
        let coordinator = self.coordinator.next_timeout(Instant::now());
        self.bridge.next_timeout(coordinator)
    }

    fn process(&mut self) {
        self.drain_immediates();
        self.pump(None);
    }

    fn tag(&self) -> &'static str {
        "DNS_Mgr"
    }
}

impl Drop for DnsManager {
    fn drop(&mut self) {
        self.bridge.shutdown();
    }
}
