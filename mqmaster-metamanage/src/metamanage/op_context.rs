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

use cheetah_string::CheetahString;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;

/// Operator recorded for writes the master issues on its own
pub const SYSTEM_OPERATOR: &str = "system";

/// Who is changing metadata and the version of the record they read.
///
/// Writes that carry a whole entity take the read version from the entity
/// itself; writes that carry only changed fields must name it here.
#[derive(Debug, Clone)]
pub struct OpContext {
    pub operator: CheetahString,
    pub data_version: Option<i64>,
}

impl OpContext {
    pub fn new(operator: impl Into<CheetahString>) -> Self {
        Self {
            operator: operator.into(),
            data_version: None,
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_OPERATOR)
    }

    pub fn with_data_version(mut self, data_version: i64) -> Self {
        self.data_version = Some(data_version);
        self
    }

    /// Read version of a field-level write against a record stored at
    /// `current`. A missing version is rejected.
    pub fn require_version(&self, current: i64, target: &str) -> MetaResult<i64> {
        let Some(version) = self.data_version else {
            return Err(MetaError::illegal_value(format!(
                "data version is required to modify {target}"
            )));
        };
        check_version(version, current, target)
    }

    /// Read version of a write carrying an entity read at `read_version`.
    /// A version in the context must agree with it.
    pub fn check_entity_version(&self, read_version: i64, current: i64, target: &str) -> MetaResult<i64> {
        check_version(read_version, current, target)?;
        match self.data_version {
            Some(version) => check_version(version, current, target),
            None => Ok(read_version),
        }
    }
}

fn check_version(supplied: i64, current: i64, target: &str) -> MetaResult<i64> {
    if supplied != current {
        return Err(MetaError::illegal_status(format!(
            "data version mismatch for {target}: supplied {supplied}, current {current}"
        )));
    }
    Ok(supplied)
}
