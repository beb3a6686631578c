/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::mpsc;
use std::time::Duration;

use crate::driver::BoxResolverChannel;
use crate::error::LookupChannelError;
use crate::message::{DnsReply, ReplyReceiver, ReplySender, SocketEvent};
use crate::query::DnsQuery;

/// Adapter between the manager and a resolver channel. Owns the reply
/// pipe so completions fired inside the channel surface as plain values
/// instead of re-entering the manager.
pub(crate) struct ResolverBridge {
    channel: BoxResolverChannel,
    reply_tx: ReplySender,
    reply_rx: ReplyReceiver,
}

impl ResolverBridge {
    pub(crate) fn new(channel: BoxResolverChannel) -> Self {
        let (reply_tx, reply_rx) = mpsc::channel();
        ResolverBridge {
            channel,
            reply_tx,
            reply_rx,
        }
    }

    pub(crate) fn submit(&mut self, query: DnsQuery) -> Result<(), LookupChannelError> {
        self.channel.submit(query, &self.reply_tx)
    }

    fn drain(&mut self) -> Vec<DnsReply> {
        let mut replies = Vec::new();
        while let Ok(reply) = self.reply_rx.try_recv() {
            replies.push(reply);
        }
        replies
    }

    /// Service ready sockets and collect whatever completed.
    pub(crate) fn process(&mut self) -> Vec<DnsReply> {
        self.channel.process();
        self.drain()
    }

    /// Block up to `timeout` for readiness, service, and collect.
    pub(crate) fn wait_and_process(&mut self, timeout: Duration) -> Vec<DnsReply> {
        self.channel.wait_and_process(timeout);
        self.drain()
    }

    pub(crate) fn poll_socket_events(&mut self) -> Vec<SocketEvent> {
        self.channel.poll_socket_events()
    }

    /// The earlier of the channel's own deadline and the coordinator's
    /// timeout deadline.
    pub(crate) fn next_timeout(&self, coordinator: Option<Duration>) -> Option<Duration> {
        match (self.channel.next_timeout(), coordinator) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, b) => b,
        }
    }

    pub(crate) fn shutdown(&mut self) {
        self.channel.shutdown();
    }
}
