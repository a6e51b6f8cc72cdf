// Copyright 2024 The MQMaster Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;

use thiserror::Error;

use crate::error_code::ErrorCode;

/// Error returned by every metadata and authorization operation.
#[derive(Debug, Error)]
pub enum MetaError {
    /// The referenced entity is absent
    #[error("Record not exist: {0}")]
    NotExist(String),

    /// Uniqueness violation on add
    #[error("Record has existed: {0}")]
    AlreadyExists(String),

    /// The operation is not permitted in the current lifecycle state
    #[error("Illegal status: {0}")]
    IllegalStatus(String),

    /// The supplied value is semantically invalid
    #[error("Illegal value: {0}")]
    IllegalValue(String),

    /// The update carried no change and was not applied
    #[error("Data not changed: {0}")]
    Unchanged(String),

    /// Malformed authorization query
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Consumer group denied access to a topic
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Consumer group denied the requested filter conditions
    #[error("Content forbidden: {0}")]
    ContentForbidden(String),

    /// The store is not writable or not reachable from this node
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl MetaError {
    #[inline]
    pub fn not_exist(detail: impl Into<String>) -> Self {
        Self::NotExist(detail.into())
    }

    #[inline]
    pub fn already_exists(detail: impl Into<String>) -> Self {
        Self::AlreadyExists(detail.into())
    }

    #[inline]
    pub fn illegal_status(detail: impl Into<String>) -> Self {
        Self::IllegalStatus(detail.into())
    }

    #[inline]
    pub fn illegal_value(detail: impl Into<String>) -> Self {
        Self::IllegalValue(detail.into())
    }

    #[inline]
    pub fn unchanged(detail: impl Into<String>) -> Self {
        Self::Unchanged(detail.into())
    }

    #[inline]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    #[inline]
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden(detail.into())
    }

    #[inline]
    pub fn content_forbidden(detail: impl Into<String>) -> Self {
        Self::ContentForbidden(detail.into())
    }

    #[inline]
    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable(detail.into())
    }

    #[inline]
    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config(detail.into())
    }

    /// Numeric code of this error's kind
    pub fn code(&self) -> ErrorCode {
        match self {
            MetaError::NotExist(_) => ErrorCode::NotExist,
            MetaError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            MetaError::IllegalStatus(_) => ErrorCode::IllegalStatus,
            MetaError::IllegalValue(_) => ErrorCode::IllegalValue,
            MetaError::Unchanged(_) => ErrorCode::Unchanged,
            MetaError::BadRequest(_) => ErrorCode::BadRequest,
            MetaError::Forbidden(_) => ErrorCode::Forbidden,
            MetaError::ContentForbidden(_) => ErrorCode::ContentForbidden,
            MetaError::Unavailable(_) => ErrorCode::Unavailable,
            MetaError::Config(_) | MetaError::Io(_) => ErrorCode::InternalError,
        }
    }

    /// Human-readable detail without the kind prefix
    pub fn detail(&self) -> String {
        match self {
            MetaError::NotExist(detail)
            | MetaError::AlreadyExists(detail)
            | MetaError::IllegalStatus(detail)
            | MetaError::IllegalValue(detail)
            | MetaError::Unchanged(detail)
            | MetaError::BadRequest(detail)
            | MetaError::Forbidden(detail)
            | MetaError::ContentForbidden(detail)
            | MetaError::Unavailable(detail)
            | MetaError::Config(detail) => detail.clone(),
            MetaError::Io(e) => e.to_string(),
        }
    }

    /// A no-op update is reported but is not a failure of the caller's intent.
    #[inline]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, MetaError::Unchanged(_))
    }
}

/// Result type alias for metadata operations
pub type MetaResult<T> = std::result::Result<T, MetaError>;
