/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::mapping::AddrSet;

/// Receiver for asynchronous lookup results.
///
/// The manager owns the boxed callback from registration until exactly one
/// of the notifications has fired, then drops it. An authoritative
/// no-such-record answer is delivered through the resolved arm with empty
/// values, `timed_out` means no answer will ever arrive.
pub trait LookupCallback {
    /// An address lookup finished. The name is empty when the lookup
    /// failed authoritatively.
    fn resolved_name(&mut self, _name: &str) {}

    /// A host lookup finished with a set of addresses.
    fn resolved_addrs(&mut self, _addrs: &AddrSet) {}

    /// A generic lookup finished with the presentation form of the
    /// returned records.
    fn resolved_value(&mut self, _values: &[String], _rr_type: u16) {}

    /// No response will arrive for this lookup.
    fn timed_out(&mut self);
}
