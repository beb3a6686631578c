/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::time::Duration;

const DNS_MGR_MAX_INFLIGHT: usize = 1000;
const DNS_MGR_ASYNC_TIMEOUT: Duration = Duration::from_secs(5);
const DNS_MGR_SYNC_TIMEOUT: Duration = Duration::from_secs(20);
const DNS_MGR_SYNC_POLL_INTERVAL: Duration = Duration::from_millis(100);
const DNS_MGR_FAKE_HOSTNAME: &str = "<fake>";
const DNS_MGR_CACHE_FILE: &str = "dns-mgr.cache";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DnsManagerMode {
    /// populate the cache, misses still issue queries
    Prime,
    /// the cache is authoritative, a miss is a hard error
    Force,
    /// normal operation
    Default,
    /// never issue queries, return canned results
    Fake,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DnsManagerConfig {
    pub mode: DnsManagerMode,
    /// directory holding the persistent cache file
    pub dir: PathBuf,
    /// cache file name, fixed once the manager is built
    pub cache_name: String,
    pub max_inflight: usize,
    pub async_timeout: Duration,
    pub sync_timeout: Duration,
    /// wall-clock slice for each pass of the blocking wait loop
    pub sync_poll_interval: Duration,
    pub fake_hostname: String,
}

impl Default for DnsManagerConfig {
    fn default() -> Self {
        DnsManagerConfig {
            mode: DnsManagerMode::Default,
            dir: PathBuf::from("."),
            cache_name: DNS_MGR_CACHE_FILE.to_string(),
            max_inflight: DNS_MGR_MAX_INFLIGHT,
            async_timeout: DNS_MGR_ASYNC_TIMEOUT,
            sync_timeout: DNS_MGR_SYNC_TIMEOUT,
            sync_poll_interval: DNS_MGR_SYNC_POLL_INTERVAL,
            fake_hostname: DNS_MGR_FAKE_HOSTNAME.to_string(),
        }
    }
}

impl DnsManagerConfig {
    pub fn with_mode(mode: DnsManagerMode) -> Self {
        DnsManagerConfig {
            mode,
            ..Default::default()
        }
    }

    pub fn check(&mut self) {
        if self.max_inflight < 1 {
            self.max_inflight = 1;
        }
        if self.sync_poll_interval > self.sync_timeout {
            self.sync_poll_interval = self.sync_timeout;
        }
        if self.cache_name.is_empty() {
            self.cache_name = DNS_MGR_CACHE_FILE.to_string();
        }
    }
}
