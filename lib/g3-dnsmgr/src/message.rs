/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::os::fd::RawFd;
use std::sync::mpsc;

use crate::query::DnsQuery;

/// Outcome class of one channel reply.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReplyStatus {
    /// records were returned
    Answered,
    /// authoritative no-such-record, NXDOMAIN and NODATA collapsed
    NoSuchRecord,
    /// the channel gave up waiting for the server
    TimedOut,
    /// transient channel or network failure
    ChannelError,
}

impl ReplyStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReplyStatus::Answered => "answered",
            ReplyStatus::NoSuchRecord => "no_such_record",
            ReplyStatus::TimedOut => "timed_out",
            ReplyStatus::ChannelError => "channel_error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyPayload {
    /// A/AAAA answers
    Addrs(Vec<IpAddr>),
    /// PTR answers, canonical name first
    Names(Vec<String>),
    /// TXT strings, or the presentation form of other record types
    Texts(Vec<String>),
}

/// One completion delivered by a resolver channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsReply {
    pub query: DnsQuery,
    pub status: ReplyStatus,
    pub ttl: u32,
    pub payload: Option<ReplyPayload>,
}

impl DnsReply {
    pub fn answered(query: DnsQuery, ttl: u32, payload: ReplyPayload) -> Self {
        DnsReply {
            query,
            status: ReplyStatus::Answered,
            ttl,
            payload: Some(payload),
        }
    }

    pub fn no_such_record(query: DnsQuery, ttl: u32) -> Self {
        DnsReply {
            query,
            status: ReplyStatus::NoSuchRecord,
            ttl,
            payload: None,
        }
    }

    pub fn timed_out(query: DnsQuery) -> Self {
        DnsReply {
            query,
            status: ReplyStatus::TimedOut,
            ttl: 0,
            payload: None,
        }
    }

    pub fn channel_error(query: DnsQuery) -> Self {
        DnsReply {
            query,
            status: ReplyStatus::ChannelError,
            ttl: 0,
            payload: None,
        }
    }
}

/// Sender half handed to a channel at submit time, completions come back
/// through it and are drained by the bridge on the manager thread.
pub type ReplySender = mpsc::Sender<DnsReply>;
pub(crate) type ReplyReceiver = mpsc::Receiver<DnsReply>;

/// Socket activation change reported by the channel. Active sockets are
/// the ones the host runtime should poll for readiness.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SocketEvent {
    pub fd: RawFd,
    pub active: bool,
}
