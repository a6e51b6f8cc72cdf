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

//! # MQMaster Error Handling
//!
//! Every failure the master's control plane can report belongs to one closed
//! taxonomy. Administrative callers receive the kind as a numeric
//! [`ErrorCode`] together with a human-readable detail.
//!
//! ```rust
//! use mqmaster_error::ErrorCode;
//! use mqmaster_error::MetaError;
//! use mqmaster_error::MetaResult;
//!
//! fn find_broker(broker_id: i32) -> MetaResult<()> {
//!     Err(MetaError::not_exist(format!("brokerId={broker_id}")))
//! }
//!
//! let err = find_broker(12).unwrap_err();
//! assert_eq!(err.code(), ErrorCode::NotExist);
//! ```

pub mod error_code;
pub mod meta_error;

pub use error_code::ErrorCode;
pub use meta_error::MetaError;
pub use meta_error::MetaResult;
