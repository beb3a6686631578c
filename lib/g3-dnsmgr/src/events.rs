/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::mapping::{AddrSet, ArcMapping};

/// Events raised towards the host runtime when a hostname mapping is
/// installed or displaced.
#[derive(Clone, Debug)]
pub enum DnsEvent {
    /// re-resolution confirmed the cached addresses
    MappingValid(ArcMapping),
    /// first answer for a name was an authoritative failure
    MappingUnverified(ArcMapping),
    /// a name resolved for the first time, or resolved again after failing
    MappingNewName(ArcMapping),
    /// a previously resolved name stopped resolving
    MappingLostName {
        old: ArcMapping,
        new: ArcMapping,
    },
    /// re-resolution produced a different address set
    MappingAltered {
        old: ArcMapping,
        new: ArcMapping,
    },
    /// companion to `MappingAltered` carrying the computed deltas
    MappingNameChanged {
        old: ArcMapping,
        new: ArcMapping,
        added: AddrSet,
        lost: AddrSet,
    },
}

impl DnsEvent {
    /// The event name as registered with the host runtime.
    pub const fn name(&self) -> &'static str {
        match self {
            DnsEvent::MappingValid(_) => "dns_mapping_valid",
            DnsEvent::MappingUnverified(_) => "dns_mapping_unverified",
            DnsEvent::MappingNewName(_) => "dns_mapping_new_name",
            DnsEvent::MappingLostName { .. } => "dns_mapping_lost_name",
            DnsEvent::MappingAltered { .. } => "dns_mapping_altered",
            DnsEvent::MappingNameChanged { .. } => "dns_mapping_name_changed",
        }
    }
}

/// Host runtime side of event emission. Dispatch happens on the manager
/// thread, inside a `process()` tick or a blocking lookup.
pub trait EventSink {
    fn dispatch(&mut self, event: DnsEvent);
}

/// Set differences between two address sets: what `new` gained over `old`
/// and what it lost.
pub fn addr_list_delta(old: &AddrSet, new: &AddrSet) -> (AddrSet, AddrSet) {
    let added = new.difference(old).copied().collect();
    let lost = old.difference(new).copied().collect();
    (added, lost)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(addrs: &[&str]) -> AddrSet {
        addrs.iter().map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn delta_added_and_lost() {
        let old = set(&["1.1.1.1", "2.2.2.2"]);
        let new = set(&["2.2.2.2", "3.3.3.3"]);
        let (added, lost) = addr_list_delta(&old, &new);
        assert_eq!(added, set(&["3.3.3.3"]));
        assert_eq!(lost, set(&["1.1.1.1"]));
    }

    #[test]
    fn delta_identical_sets() {
        let old = set(&["1.1.1.1"]);
        let (added, lost) = addr_list_delta(&old, &old.clone());
        assert!(added.is_empty());
        assert!(lost.is_empty());
    }

    #[test]
    fn set_equality_ignores_order() {
        let a = set(&["1.1.1.1", "2.2.2.2"]);
        let b = set(&["2.2.2.2", "1.1.1.1"]);
        assert_eq!(a, b);
    }
}
