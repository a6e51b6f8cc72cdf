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

use crate::common::entity::BaseEntity;
use crate::common::entity::MetaEntity;
use crate::common::GroupName;
use crate::common::TopicName;

/// Marks a group as forbidden from consuming a topic, or every topic when
/// `topic_name` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupBlacklist {
    pub base: BaseEntity,
    pub group_name: GroupName,
    pub topic_name: Option<TopicName>,
    pub reason: CheetahString,
}

impl GroupBlacklist {
    pub fn new(base: BaseEntity, group_name: impl Into<GroupName>, topic_name: Option<TopicName>) -> Self {
        Self {
            base,
            group_name: group_name.into(),
            topic_name,
            reason: CheetahString::empty(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<CheetahString>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Whether this record forbids `topic`
    pub fn covers(&self, topic: &str) -> bool {
        match &self.topic_name {
            Some(name) => name.as_str() == topic,
            None => true,
        }
    }
}

impl MetaEntity for GroupBlacklist {
    type Key = (GroupName, Option<TopicName>);

    fn record_key(&self) -> Self::Key {
        (self.group_name.clone(), self.topic_name.clone())
    }

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn same_content(&self, other: &Self) -> bool {
        self.group_name == other.group_name && self.topic_name == other.topic_name && self.reason == other.reason
    }
}
