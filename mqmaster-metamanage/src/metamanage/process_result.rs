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

use mqmaster_common::GroupName;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;
use serde::Serialize;

/// Outcome of one administrative operation on one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub success: bool,
    pub err_code: i32,
    pub err_info: String,
}

impl Default for ProcessResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl ProcessResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            err_code: ErrorCode::Success.into(),
            err_info: "Ok!".to_string(),
        }
    }

    pub fn from_error(error: &MetaError) -> Self {
        Self {
            success: false,
            err_code: error.code().into(),
            err_info: error.detail(),
        }
    }

    pub fn from_result<T>(result: &MetaResult<T>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(error) => Self::from_error(error),
        }
    }

    #[inline]
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from(self.err_code)
    }

    /// The update was valid but changed nothing.
    #[inline]
    pub fn is_unchanged(&self) -> bool {
        self.code() == ErrorCode::Unchanged
    }
}

impl Display for ProcessResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ProcessResult [success={}, errCode={}, errInfo={}]",
            self.success, self.err_code, self.err_info
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerProcessResult {
    pub broker_id: i32,
    pub broker_ip: String,
    pub result: ProcessResult,
}

impl BrokerProcessResult {
    pub fn new(broker_id: i32, broker_ip: impl Into<String>, result: ProcessResult) -> Self {
        Self {
            broker_id,
            broker_ip: broker_ip.into(),
            result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicProcessResult {
    pub broker_id: i32,
    pub topic_name: TopicName,
    pub result: ProcessResult,
}

impl TopicProcessResult {
    pub fn new(broker_id: i32, topic_name: impl Into<TopicName>, result: ProcessResult) -> Self {
        Self {
            broker_id,
            topic_name: topic_name.into(),
            result,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.result.success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupProcessResult {
    pub group_name: GroupName,
    pub topic_name: Option<TopicName>,
    pub result: ProcessResult,
}

impl GroupProcessResult {
    pub fn new(group_name: impl Into<GroupName>, topic_name: Option<TopicName>, result: ProcessResult) -> Self {
        Self {
            group_name: group_name.into(),
            topic_name,
            result,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.result.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_from_error_keeps_code_and_detail() {
        let result = ProcessResult::from_error(&MetaError::illegal_value("Partition value is less than before"));
        assert!(!result.success);
        assert_eq!(result.code(), ErrorCode::IllegalValue);
        assert_eq!(result.err_info, "Partition value is less than before");
    }

    #[test]
    fn test_unchanged_is_not_success() {
        let result = ProcessResult::from_result::<()>(&Err(MetaError::unchanged("Data not changed")));
        assert!(!result.success);
        assert!(result.is_unchanged());
        assert!(ProcessResult::from_result(&Ok(1)).success);
    }
}
