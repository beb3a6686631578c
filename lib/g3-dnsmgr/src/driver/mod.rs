/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use crate::error::LookupChannelError;
use crate::message::{ReplySender, SocketEvent};
use crate::query::DnsQuery;

pub mod deny_all;

#[cfg(feature = "c-ares")]
pub mod c_ares;

#[derive(Clone, Debug, PartialEq)]
pub enum AnyChannelConfig {
    DenyAll(deny_all::DenyAllChannelConfig),
    #[cfg(feature = "c-ares")]
    CAres(c_ares::CAresChannelConfig),
}

impl AnyChannelConfig {
    pub fn spawn_channel(&self) -> anyhow::Result<BoxResolverChannel> {
        match self {
            AnyChannelConfig::DenyAll(c) => Ok(c.spawn_channel()),
            #[cfg(feature = "c-ares")]
            AnyChannelConfig::CAres(c) => c.spawn_channel(),
        }
    }
}

/// The asynchronous resolver library behind the bridge.
///
/// Implementations never block outside of `wait_and_process` and never
/// call back into the manager: completions are pushed through the
/// [`ReplySender`] handed over at submit time, socket activation changes
/// are queued and drained with `poll_socket_events`. All methods are
/// called from the manager thread.
pub trait ResolverChannel {
    /// Hand one query to the resolver. Exactly one reply must eventually
    /// be sent on `replies` unless this returns an error.
    fn submit(&mut self, query: DnsQuery, replies: &ReplySender)
        -> Result<(), LookupChannelError>;

    /// Service ready sockets without blocking, firing completions.
    fn process(&mut self);

    /// Block up to `timeout` for socket readiness, then service. Only the
    /// synchronous lookup path uses this.
    fn wait_and_process(&mut self, timeout: Duration);

    /// Time until the earliest channel-internal deadline, `None` when the
    /// channel has nothing pending.
    fn next_timeout(&self) -> Option<Duration>;

    /// Socket activation changes recorded since the last call.
    fn poll_socket_events(&mut self) -> Vec<SocketEvent>;

    /// Drop all in-flight queries. Replies for them may never arrive.
    fn shutdown(&mut self) {}
}

pub type BoxResolverChannel = Box<dyn ResolverChannel>;
