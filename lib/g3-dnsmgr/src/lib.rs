/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

pub mod driver;
pub use driver::{AnyChannelConfig, BoxResolverChannel, ResolverChannel};

mod bridge;
mod cache;
mod callback;
mod config;
mod coordinator;
mod error;
mod events;
mod manager;
mod mapping;
mod message;
mod query;
mod stats;

pub use callback::LookupCallback;
pub use config::{DnsManagerConfig, DnsManagerMode};
pub use error::{DnsMgrError, LookupChannelError};
pub use events::{addr_list_delta, DnsEvent, EventSink};
pub use manager::{empty_addr_set, DnsManager, IoSource};
pub use mapping::{AddrSet, ArcMapping, Mapping, MappingKind};
pub use message::{DnsReply, ReplyPayload, ReplySender, ReplyStatus, SocketEvent};
pub use query::{
    ptr_arpa_name, DnsQuery, QueryKey, RR_TYPE_A, RR_TYPE_AAAA, RR_TYPE_PTR, RR_TYPE_TXT,
};
pub use stats::Stats;
