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

//! Token separators, sentinels and built-in cluster defaults.

/// Placeholder for an integer that was never set
pub const META_VALUE_UNDEFINED: i32 = -2;

/// Separator between the fields of a configuration line
pub const ATTR_SEP: &str = ":";

/// Separator between the items of a list value
pub const ARRAY_SEP: &str = ",";

/// Rendered in place of a field value that equals its default
pub const BLANK_TOKEN: &str = " ";

/// Allowed-filter-condition string meaning "no condition is allowed"
pub const BLANK_FILTER_ITEM_STR: &str = ",,";

/// Header reserve added on top of the configured max message size
pub const MSG_HEADER_RESERVE_BYTES: i32 = 1024;

pub const BYTES_PER_MB: i32 = 1024 * 1024;

pub const DEFAULT_BROKER_PORT: i32 = 8123;
pub const DEFAULT_BROKER_TLS_PORT: i32 = 8124;
pub const DEFAULT_BROKER_WEB_PORT: i32 = 8081;
pub const DEFAULT_MAX_MSG_SIZE_MB: i32 = 1;
pub const MAX_ALLOWED_MSG_SIZE_MB: i32 = 20;
pub const DEFAULT_QRY_PRIORITY_ID: i32 = 301;

pub const DEFAULT_NUM_TOPIC_STORES: i32 = 1;
pub const DEFAULT_NUM_PARTITIONS: i32 = 3;
pub const DEFAULT_UNFLUSH_THRESHOLD: i32 = 1000;
pub const DEFAULT_UNFLUSH_INTERVAL: i32 = 10000;
pub const DEFAULT_UNFLUSH_DATA_HOLD: i32 = 0;
pub const DEFAULT_MEM_CACHE_MSG_SIZE_MB: i32 = 3;
pub const DEFAULT_MEM_CACHE_MSG_CNT_K: i32 = 10;
pub const DEFAULT_MEM_CACHE_FLUSH_INTVL: i32 = 20000;
pub const DEFAULT_DELETE_POLICY: &str = "delete,168h";

pub const DEFAULT_REP_STATUS_CHECK_INTERVAL_MS: u64 = 10_000;

/// Converts a max message size in MB into the byte limit handed to brokers.
#[inline]
pub const fn max_msg_size_in_bytes(size_in_mb: i32) -> i32 {
    size_in_mb * BYTES_PER_MB + MSG_HEADER_RESERVE_BYTES
}
