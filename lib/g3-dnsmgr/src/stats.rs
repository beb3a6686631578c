/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Point-in-time counters for the manager. All values are monotonic
/// except `pending`, which tracks the current inflight plus queued
/// asynchronous requests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    pub requests: u64,
    pub successful: u64,
    pub failed: u64,
    pub pending: u64,
    pub cached_hosts: u64,
    pub cached_addresses: u64,
    pub cached_texts: u64,
}
