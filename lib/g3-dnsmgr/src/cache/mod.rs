/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use ahash::AHashMap;

use crate::mapping::{ArcMapping, Mapping, MappingKind};

pub(crate) mod persist;

struct HostEntry {
    current: ArcMapping,
    /// the mapping that was displaced by `current`, kept so a change event
    /// can be fired exactly once
    previous: Option<ArcMapping>,
}

/// What an insert did, enough for the manager to decide which events to
/// emit.
pub(crate) struct InsertOutcome {
    pub(crate) mapping: ArcMapping,
    pub(crate) previous: Option<ArcMapping>,
    pub(crate) merged: bool,
}

/// The three mapping tables: hostname keyed, address keyed, and
/// text-query-name keyed. A mapping lives in exactly one of them.
#[derive(Default)]
pub(crate) struct DnsCache {
    hosts: AHashMap<String, HostEntry>,
    addrs: AHashMap<IpAddr, ArcMapping>,
    texts: AHashMap<String, ArcMapping>,
}

impl DnsCache {
    pub(crate) fn new() -> Self {
        DnsCache::default()
    }

    /// The canonical mutation. With `merge` set the new values are unioned
    /// into the existing entry, otherwise the new mapping displaces it and
    /// the displaced one is remembered as `previous` for host entries.
    pub(crate) fn insert(&mut self, mapping: Mapping, merge: bool, now: u64) -> InsertOutcome {
        match mapping.kind() {
            MappingKind::Forward => {
                let key = mapping.key_host().unwrap_or_default().to_string();
                match self.hosts.get_mut(&key) {
                    Some(entry) if merge => {
                        let merged = Arc::new(Mapping::merged(&entry.current, &mapping, now));
                        entry.current = merged.clone();
                        InsertOutcome {
                            mapping: merged,
                            previous: None,
                            merged: true,
                        }
                    }
                    Some(entry) => {
                        let old = entry.current.clone();
                        let new = Arc::new(mapping);
                        entry.previous = Some(old.clone());
                        entry.current = new.clone();
                        InsertOutcome {
                            mapping: new,
                            previous: Some(old),
                            merged: false,
                        }
                    }
                    None => {
                        let new = Arc::new(mapping);
                        self.hosts.insert(
                            key,
                            HostEntry {
                                current: new.clone(),
                                previous: None,
                            },
                        );
                        InsertOutcome {
                            mapping: new,
                            previous: None,
                            merged: false,
                        }
                    }
                }
            }
            MappingKind::Reverse => {
                let key = mapping.key_addr().expect("reverse mapping without address");
                let outcome = match self.addrs.get(&key) {
                    Some(current) if merge => {
                        let merged = Arc::new(Mapping::merged(current, &mapping, now));
                        InsertOutcome {
                            mapping: merged,
                            previous: None,
                            merged: true,
                        }
                    }
                    _ => InsertOutcome {
                        mapping: Arc::new(mapping),
                        previous: None,
                        merged: false,
                    },
                };
                self.addrs.insert(key, outcome.mapping.clone());
                outcome
            }
            MappingKind::Text => {
                let key = mapping.key_host().unwrap_or_default().to_string();
                let outcome = match self.texts.get(&key) {
                    Some(current) if merge => {
                        let merged = Arc::new(Mapping::merged(current, &mapping, now));
                        InsertOutcome {
                            mapping: merged,
                            previous: None,
                            merged: true,
                        }
                    }
                    _ => InsertOutcome {
                        mapping: Arc::new(mapping),
                        previous: None,
                        merged: false,
                    },
                };
                self.texts.insert(key, outcome.mapping.clone());
                outcome
            }
        }
    }

    pub(crate) fn lookup_host(
        &mut self,
        host: &str,
        cleanup_expired: bool,
        check_failed: bool,
        now: u64,
    ) -> Option<ArcMapping> {
        let entry = self.hosts.get(host)?;
        if cleanup_expired && entry.current.is_expired(now) {
            self.hosts.remove(host);
            return None;
        }
        if entry.current.failed() && !check_failed {
            return None;
        }
        Some(self.hosts.get(host)?.current.clone())
    }

    pub(crate) fn lookup_addr(
        &mut self,
        addr: IpAddr,
        cleanup_expired: bool,
        check_failed: bool,
        now: u64,
    ) -> Option<ArcMapping> {
        let mapping = self.addrs.get(&addr)?;
        if cleanup_expired && mapping.is_expired(now) {
            self.addrs.remove(&addr);
            return None;
        }
        if mapping.failed() && !check_failed {
            return None;
        }
        self.addrs.get(&addr).cloned()
    }

    pub(crate) fn lookup_text(
        &mut self,
        name: &str,
        cleanup_expired: bool,
        now: u64,
    ) -> Option<ArcMapping> {
        let mapping = self.texts.get(name)?;
        if cleanup_expired && mapping.is_expired(now) {
            self.texts.remove(name);
            return None;
        }
        if mapping.failed() {
            return None;
        }
        self.texts.get(name).cloned()
    }

    /// Presence check without expiry cleanup or failure filtering, used to
    /// decide whether a late sibling answer still has something to merge
    /// into.
    pub(crate) fn peek_host(&self, host: &str) -> Option<&ArcMapping> {
        self.hosts.get(host).map(|e| &e.current)
    }

    pub(crate) fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub(crate) fn addr_count(&self) -> usize {
        self.addrs.len()
    }

    pub(crate) fn text_count(&self) -> usize {
        self.texts.len()
    }

    pub(crate) fn clear(&mut self) {
        self.hosts.clear();
        self.addrs.clear();
        self.texts.clear();
    }

    pub(crate) fn iter_hosts(&self) -> impl Iterator<Item = &ArcMapping> {
        self.hosts.values().map(|e| &e.current)
    }

    pub(crate) fn iter_addrs(&self) -> impl Iterator<Item = &ArcMapping> {
        self.addrs.values()
    }

    pub(crate) fn iter_texts(&self) -> impl Iterator<Item = &ArcMapping> {
        self.texts.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DnsReply, ReplyPayload};
    use crate::query::{DnsQuery, RR_TYPE_A, RR_TYPE_AAAA};

    fn forward(host: &str, addrs: &[&str], ttl: u32, now: u64) -> Mapping {
        let addrs = addrs.iter().map(|s| s.parse().unwrap()).collect();
        let reply = DnsReply::answered(
            DnsQuery::forward(host, RR_TYPE_A),
            ttl,
            ReplyPayload::Addrs(addrs),
        );
        Mapping::from_reply(&reply, now).unwrap()
    }

    fn reverse(ip: &str, name: &str, ttl: u32, now: u64) -> Mapping {
        let reply = DnsReply::answered(
            DnsQuery::reverse(ip.parse().unwrap()),
            ttl,
            ReplyPayload::Names(vec![name.to_string()]),
        );
        Mapping::from_reply(&reply, now).unwrap()
    }

    #[test]
    fn hit_within_ttl() {
        let mut cache = DnsCache::new();
        cache.insert(forward("example.org", &["93.184.216.34"], 3600, 1000), false, 1000);
        let m = cache.lookup_host("example.org", true, false, 1100).unwrap();
        assert_eq!(m.addrs().len(), 1);
        assert_eq!(cache.host_count(), 1);
    }

    #[test]
    fn expired_entry_is_removed_on_cleanup() {
        let mut cache = DnsCache::new();
        cache.insert(forward("example.org", &["93.184.216.34"], 3600, 1000), false, 1000);
        assert!(cache.lookup_host("example.org", true, false, 4601).is_none());
        assert_eq!(cache.host_count(), 0);
    }

    #[test]
    fn expired_entry_survives_stale_lookup() {
        let mut cache = DnsCache::new();
        cache.insert(forward("example.org", &["93.184.216.34"], 60, 1000), false, 1000);
        assert!(cache.lookup_host("example.org", false, false, 5000).is_some());
        assert_eq!(cache.host_count(), 1);
    }

    #[test]
    fn failed_entry_needs_check_failed() {
        let mut cache = DnsCache::new();
        let reply = DnsReply::no_such_record(DnsQuery::forward("gone.test", RR_TYPE_A), 30);
        cache.insert(Mapping::from_reply(&reply, 1000).unwrap(), false, 1000);
        assert!(cache.lookup_host("gone.test", false, false, 1001).is_none());
        assert!(cache.lookup_host("gone.test", false, true, 1001).is_some());
    }

    #[test]
    fn replace_keeps_previous() {
        let mut cache = DnsCache::new();
        cache.insert(forward("x.test", &["1.1.1.1"], 60, 1000), false, 1000);
        let outcome = cache.insert(forward("x.test", &["1.1.1.1", "2.2.2.2"], 60, 1010), false, 1010);
        assert!(!outcome.merged);
        let prev = outcome.previous.expect("previous mapping");
        assert_eq!(prev.addrs().len(), 1);
        assert_eq!(outcome.mapping.addrs().len(), 2);
    }

    #[test]
    fn merge_unions_and_reports_no_previous() {
        let mut cache = DnsCache::new();
        cache.insert(forward("dual.test", &["10.0.0.1"], 60, 1000), false, 1000);
        let reply6 = DnsReply::answered(
            DnsQuery::forward("dual.test", RR_TYPE_AAAA),
            600,
            ReplyPayload::Addrs(vec!["2001:db8::1".parse().unwrap()]),
        );
        let v6 = Mapping::from_reply(&reply6, 1005).unwrap();
        let outcome = cache.insert(v6, true, 1005);
        assert!(outcome.merged);
        assert!(outcome.previous.is_none());
        assert_eq!(outcome.mapping.addrs().len(), 2);
        let m = cache.lookup_host("dual.test", true, false, 1005).unwrap();
        assert_eq!(m.addrs().len(), 2);
    }

    #[test]
    fn reverse_lookup_roundtrip() {
        let mut cache = DnsCache::new();
        cache.insert(reverse("93.184.216.34", "example.org", 3600, 1000), false, 1000);
        let m = cache
            .lookup_addr("93.184.216.34".parse().unwrap(), true, false, 1100)
            .unwrap();
        assert_eq!(m.canonical_name(), Some("example.org"));
    }

    #[test]
    fn clear_empties_all_tables() {
        let mut cache = DnsCache::new();
        cache.insert(forward("a.test", &["1.1.1.1"], 60, 0), false, 0);
        cache.insert(reverse("1.1.1.1", "a.test", 60, 0), false, 0);
        cache.clear();
        assert_eq!(cache.host_count() + cache.addr_count() + cache.text_count(), 0);
    }
}
