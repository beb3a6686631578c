/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupChannelError {
    #[error("timeout while waiting for reply")]
    Timeout,
    #[error("channel refused the query")]
    Rejected,
    #[error("unsupported record type {0}")]
    UnsupportedRecordType(u16),
    #[error("malformed reply from server")]
    BadResp,
    #[error("internal channel error: {0}")]
    Internal(String),
}

impl LookupChannelError {
    pub fn get_type(&self) -> &str {
        match self {
            LookupChannelError::Timeout => "Timeout",
            LookupChannelError::Rejected => "Rejected",
            LookupChannelError::UnsupportedRecordType(_) => "UnsupportedRecordType",
            LookupChannelError::BadResp => "BadResp",
            LookupChannelError::Internal(_) => "InternalError",
        }
    }
}

/// Errors surfaced across the manager's public lookup API.
///
/// Normal lookup failures never show up here, they come back as empty
/// results or timeout notifications. The only hard error is a cache miss
/// while the cache is expected to be authoritative.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsMgrError {
    #[error("no cached entry for {0} while the cache is authoritative")]
    AuthoritativeMiss(String),
}

impl DnsMgrError {
    pub fn get_type(&self) -> &str {
        match self {
            DnsMgrError::AuthoritativeMiss(_) => "AuthoritativeMiss",
        }
    }
}
