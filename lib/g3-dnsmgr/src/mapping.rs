/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::message::{DnsReply, ReplyPayload, ReplyStatus};
use crate::query::{QueryKey, RR_TYPE_A, RR_TYPE_AAAA, RR_TYPE_PTR, RR_TYPE_TXT};

pub type AddrSet = IndexSet<IpAddr>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MappingKind {
    /// hostname to addresses
    Forward,
    /// address to hostname
    Reverse,
    /// text-record query name to strings
    Text,
}

impl MappingKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MappingKind::Forward => "forward",
            MappingKind::Reverse => "reverse",
            MappingKind::Text => "text",
        }
    }

    pub(crate) const fn code(&self) -> char {
        match self {
            MappingKind::Forward => 'H',
            MappingKind::Reverse => 'A',
            MappingKind::Text => 'T',
        }
    }

    pub(crate) fn from_code(c: &str) -> Option<Self> {
        match c {
            "H" => Some(MappingKind::Forward),
            "A" => Some(MappingKind::Reverse),
            "T" => Some(MappingKind::Text),
            _ => None,
        }
    }
}

/// Record of one resolved query's outcome. Immutable once built, owned by
/// the cache and shared out as [`ArcMapping`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mapping {
    kind: MappingKind,
    host: Option<String>,
    addr: Option<IpAddr>,
    names: Vec<String>,
    addrs: AddrSet,
    texts: Vec<String>,
    ttl: u32,
    created: u64,
    failed: bool,
}

pub type ArcMapping = Arc<Mapping>;

impl Mapping {
    /// Build a mapping from a channel reply. Returns `None` for replies the
    /// cache has no table for (raw record types other than TXT).
    pub(crate) fn from_reply(reply: &DnsReply, now: u64) -> Option<Mapping> {
        let kind = match (&reply.query.key, reply.query.rr_type) {
            (QueryKey::Name(_), RR_TYPE_A | RR_TYPE_AAAA) => MappingKind::Forward,
            (QueryKey::Addr(_), RR_TYPE_PTR) => MappingKind::Reverse,
            (QueryKey::Name(_), RR_TYPE_TXT) => MappingKind::Text,
            _ => return None,
        };

        let failed = reply.status == ReplyStatus::NoSuchRecord;
        let mut mapping = Mapping {
            kind,
            host: None,
            addr: None,
            names: Vec::new(),
            addrs: AddrSet::new(),
            texts: Vec::new(),
            ttl: reply.ttl,
            created: now,
            failed,
        };
        match &reply.query.key {
            QueryKey::Name(name) => mapping.host = Some(name.clone()),
            QueryKey::Addr(ip) => mapping.addr = Some(*ip),
        }
        match &reply.payload {
            Some(ReplyPayload::Addrs(addrs)) => mapping.addrs.extend(addrs.iter().copied()),
            Some(ReplyPayload::Names(names)) => mapping.names.extend(names.iter().cloned()),
            Some(ReplyPayload::Texts(texts)) => mapping.texts.extend(texts.iter().cloned()),
            None => {}
        }
        Some(mapping)
    }

    pub(crate) fn restored(
        kind: MappingKind,
        host: Option<String>,
        addr: Option<IpAddr>,
        values: Vec<String>,
        ttl: u32,
        created: u64,
        failed: bool,
    ) -> Mapping {
        let mut mapping = Mapping {
            kind,
            host,
            addr,
            names: Vec::new(),
            addrs: AddrSet::new(),
            texts: Vec::new(),
            ttl,
            created,
            failed,
        };
        match kind {
            MappingKind::Forward => {
                for v in values {
                    if let Ok(ip) = v.parse::<IpAddr>() {
                        mapping.addrs.insert(ip);
                    }
                }
            }
            MappingKind::Reverse => mapping.names = values,
            MappingKind::Text => mapping.texts = values,
        }
        mapping
    }

    /// Union of two mappings for the same key. Values are merged, the
    /// larger TTL wins, the creation time restarts, and the result is
    /// non-failed if either side is.
    pub(crate) fn merged(current: &Mapping, update: &Mapping, now: u64) -> Mapping {
        let mut merged = current.clone();
        for ip in update.addrs.iter() {
            merged.addrs.insert(*ip);
        }
        for name in update.names.iter() {
            if !merged.names.contains(name) {
                merged.names.push(name.clone());
            }
        }
        for text in update.texts.iter() {
            if !merged.texts.contains(text) {
                merged.texts.push(text.clone());
            }
        }
        merged.ttl = merged.ttl.max(update.ttl);
        merged.created = now;
        merged.failed = current.failed && update.failed;
        merged
    }

    pub fn kind(&self) -> MappingKind {
        self.kind
    }

    /// The query key for forward and text mappings.
    pub fn key_host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The query key for reverse mappings.
    pub fn key_addr(&self) -> Option<IpAddr> {
        self.addr
    }

    pub fn addrs(&self) -> &AddrSet {
        &self.addrs
    }

    /// Canonical hostname of a reverse mapping.
    pub fn canonical_name(&self) -> Option<&str> {
        self.names.first().map(|s| s.as_str())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    pub fn created(&self) -> u64 {
        self.created
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// A TTL of zero means the entry never expires by the clock, it lives
    /// until the cache is flushed.
    pub fn is_expired(&self, now: u64) -> bool {
        self.ttl > 0 && now.saturating_sub(self.created) >= u64::from(self.ttl)
    }

    pub(crate) fn same_addrs(&self, other: &Mapping) -> bool {
        self.addrs == other.addrs
    }

    pub(crate) fn persisted_values(&self) -> Vec<String> {
        match self.kind {
            MappingKind::Forward => self.addrs.iter().map(|ip| ip.to_string()).collect(),
            MappingKind::Reverse => self.names.clone(),
            MappingKind::Text => self.texts.clone(),
        }
    }
}
