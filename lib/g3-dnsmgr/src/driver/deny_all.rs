/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use super::{BoxResolverChannel, ResolverChannel};
use crate::error::LookupChannelError;
use crate::message::{ReplySender, SocketEvent};
use crate::query::DnsQuery;

/// A channel that refuses every query. Useful for hosts that must run
/// with resolution disabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DenyAllChannelConfig {}

impl DenyAllChannelConfig {
    pub(crate) fn spawn_channel(&self) -> BoxResolverChannel {
        Box::new(DenyAllChannel {})
    }
}

struct DenyAllChannel {}

impl ResolverChannel for DenyAllChannel {
    fn submit(
        &mut self,
        _query: DnsQuery,
        _replies: &ReplySender,
    ) -> Result<(), LookupChannelError> {
        Err(LookupChannelError::Rejected)
    }

    fn process(&mut self) {}

    fn wait_and_process(&mut self, timeout: Duration) {
        // nothing will ever be ready
        std::thread::sleep(timeout);
    }

    fn next_timeout(&self) -> Option<Duration> {
        None
    }

    fn poll_socket_events(&mut self) -> Vec<SocketEvent> {
        Vec::new()
    }
}
