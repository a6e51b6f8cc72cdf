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
use serde::Deserialize;
use serde::Serialize;

use crate::time_utils::get_current_millis;

/// Version and audit columns shared by every stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEntity {
    /// The version the caller read; the store rejects a write whose version
    /// differs from the stored one and bumps it on success.
    pub data_version: i64,
    pub create_user: CheetahString,
    pub create_date: i64,
    pub modify_user: CheetahString,
    pub modify_date: i64,
}

impl Default for BaseEntity {
    fn default() -> Self {
        let now = get_current_millis();
        Self {
            data_version: 0,
            create_user: CheetahString::empty(),
            create_date: now,
            modify_user: CheetahString::empty(),
            modify_date: now,
        }
    }
}

impl BaseEntity {
    pub fn new(operator: impl Into<CheetahString>) -> Self {
        let operator = operator.into();
        Self {
            create_user: operator.clone(),
            modify_user: operator,
            ..Self::default()
        }
    }

    /// Records a modification by `operator` against the version it read.
    pub fn touch(&mut self, operator: impl Into<CheetahString>, read_version: i64) {
        self.modify_user = operator.into();
        self.modify_date = get_current_millis();
        self.data_version = read_version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_both_users() {
        let base = BaseEntity::new("admin");
        assert_eq!(base.create_user.as_str(), "admin");
        assert_eq!(base.modify_user.as_str(), "admin");
        assert_eq!(base.data_version, 0);
    }

    #[test]
    fn test_touch_keeps_creator() {
        let mut base = BaseEntity::new("admin");
        base.touch("ops", 3);
        assert_eq!(base.create_user.as_str(), "admin");
        assert_eq!(base.modify_user.as_str(), "ops");
        assert_eq!(base.data_version, 3);
    }
}
