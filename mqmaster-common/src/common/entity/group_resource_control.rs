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

use crate::common::constant;
use crate::common::entity::BaseEntity;
use crate::common::entity::MetaEntity;
use crate::common::GroupName;

/// Resource and flow-control policy of one consumer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResourceControl {
    pub base: BaseEntity,
    pub group_name: GroupName,
    pub consume_enable: bool,
    pub disable_reason: CheetahString,
    pub resource_check_enable: bool,
    pub allowed_broker_client_rate: i32,
    pub qry_priority_id: i32,
    pub flow_ctrl_enable: bool,
    pub flow_ctrl_rule_count: i32,
    pub flow_ctrl_info: CheetahString,
}

impl GroupResourceControl {
    /// A record filled with the defaults used when a policy first references the group.
    pub fn with_defaults(base: BaseEntity, group_name: impl Into<GroupName>) -> Self {
        Self {
            base,
            group_name: group_name.into(),
            consume_enable: true,
            disable_reason: CheetahString::empty(),
            resource_check_enable: false,
            allowed_broker_client_rate: 0,
            qry_priority_id: constant::DEFAULT_QRY_PRIORITY_ID,
            flow_ctrl_enable: false,
            flow_ctrl_rule_count: 0,
            flow_ctrl_info: CheetahString::empty(),
        }
    }
}

impl MetaEntity for GroupResourceControl {
    type Key = GroupName;

    fn record_key(&self) -> Self::Key {
        self.group_name.clone()
    }

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn same_content(&self, other: &Self) -> bool {
        self.group_name == other.group_name
            && self.consume_enable == other.consume_enable
            && self.disable_reason == other.disable_reason
            && self.resource_check_enable == other.resource_check_enable
            && self.allowed_broker_client_rate == other.allowed_broker_client_rate
            && self.qry_priority_id == other.qry_priority_id
            && self.flow_ctrl_enable == other.flow_ctrl_enable
            && self.flow_ctrl_rule_count == other.flow_ctrl_rule_count
            && self.flow_ctrl_info == other.flow_ctrl_info
    }
}
