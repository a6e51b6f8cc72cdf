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

use serde::Deserialize;
use serde::Serialize;

use crate::common::constant::max_msg_size_in_bytes;
use crate::common::entity::BaseEntity;
use crate::common::entity::MetaEntity;
use crate::common::TopicName;

/// Cluster-wide access control of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicControl {
    pub base: BaseEntity,
    pub topic_name: TopicName,
    /// Consumers need a consume-control record to subscribe
    pub auth_ctrl_enable: bool,
    /// Overrides the cluster default when set
    #[serde(alias = "maxMsgSizeInMB")]
    pub max_msg_size_in_mb: Option<i32>,
}

impl TopicControl {
    pub fn new(base: BaseEntity, topic_name: impl Into<TopicName>) -> Self {
        Self {
            base,
            topic_name: topic_name.into(),
            auth_ctrl_enable: false,
            max_msg_size_in_mb: None,
        }
    }

    pub fn with_auth_ctrl_enable(mut self, enable: bool) -> Self {
        self.auth_ctrl_enable = enable;
        self
    }

    pub fn with_max_msg_size_in_mb(mut self, size_in_mb: i32) -> Self {
        self.max_msg_size_in_mb = Some(size_in_mb);
        self
    }

    pub fn max_msg_size_in_b(&self) -> Option<i32> {
        self.max_msg_size_in_mb.map(max_msg_size_in_bytes)
    }
}

impl MetaEntity for TopicControl {
    type Key = TopicName;

    fn record_key(&self) -> Self::Key {
        self.topic_name.clone()
    }

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn same_content(&self, other: &Self) -> bool {
        self.topic_name == other.topic_name
            && self.auth_ctrl_enable == other.auth_ctrl_enable
            && self.max_msg_size_in_mb == other.max_msg_size_in_mb
    }
}
