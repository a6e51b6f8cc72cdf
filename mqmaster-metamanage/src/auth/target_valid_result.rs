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

use std::fmt::Display;
use std::fmt::Formatter;

use mqmaster_error::ErrorCode;
use serde::Serialize;

/// Verdict of a consume authorization check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetValidResult {
    pub result: bool,
    pub err_code: i32,
    pub err_info: String,
}

impl TargetValidResult {
    pub fn ok() -> Self {
        Self {
            result: true,
            err_code: ErrorCode::Success.into(),
            err_info: "Ok!".to_string(),
        }
    }

    pub fn fail(code: ErrorCode, err_info: impl Into<String>) -> Self {
        Self {
            result: false,
            err_code: code.into(),
            err_info: err_info.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from(self.err_code)
    }
}

impl Display for TargetValidResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TargetValidResult [result={}, errCode={}, errInfo={}]",
            self.result, self.err_code, self.err_info
        )
    }
}
