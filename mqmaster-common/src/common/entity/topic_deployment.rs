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
use crate::common::entity::BrokerConfig;
use crate::common::entity::MetaEntity;
use crate::common::topic_conf_line::TopicConfLine;
use crate::common::topic_prop_group::TopicPropGroup;
use crate::common::topic_status::TopicStatus;
use crate::common::TopicName;

/// A topic deployed on one broker, keyed by `(brokerId, topicName)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDeployment {
    pub base: BaseEntity,
    pub broker_id: i32,
    pub broker_ip: CheetahString,
    pub broker_port: i32,
    pub topic_name: TopicName,
    pub topic_props: TopicPropGroup,
    pub topic_status: TopicStatus,
}

impl TopicDeployment {
    /// Seeds a deployment from the broker's default topic properties.
    pub fn from_broker(base: BaseEntity, broker: &BrokerConfig, topic_name: impl Into<TopicName>) -> Self {
        Self {
            base,
            broker_id: broker.broker_id,
            broker_ip: broker.broker_ip.clone(),
            broker_port: broker.broker_port,
            topic_name: topic_name.into(),
            topic_props: broker.topic_props.clone(),
            topic_status: TopicStatus::Normal,
        }
    }

    #[inline]
    pub fn is_valid_status(&self) -> bool {
        self.topic_status.is_valid()
    }

    #[inline]
    pub fn is_in_removing(&self) -> bool {
        self.topic_status.is_in_removing()
    }

    /// Only a soft-removed deployment with both accept flags off may be hard deleted.
    #[inline]
    pub fn is_hard_deletable(&self) -> bool {
        self.topic_status == TopicStatus::SoftRemove && self.topic_props.is_closed()
    }

    pub fn to_conf_line(&self, max_msg_size_in_b: i32) -> TopicConfLine {
        TopicConfLine {
            topic_name: self.topic_name.clone(),
            props: self.topic_props.clone(),
            status: self.topic_status,
            max_msg_size_in_b,
        }
    }
}

impl MetaEntity for TopicDeployment {
    type Key = (i32, TopicName);

    fn record_key(&self) -> Self::Key {
        (self.broker_id, self.topic_name.clone())
    }

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn same_content(&self, other: &Self) -> bool {
        self.broker_id == other.broker_id
            && self.broker_ip == other.broker_ip
            && self.broker_port == other.broker_port
            && self.topic_name == other.topic_name
            && self.topic_props == other.topic_props
            && self.topic_status == other.topic_status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_broker_copies_defaults() {
        let mut broker = BrokerConfig::new(BaseEntity::new("admin"), 3, "10.0.0.3");
        broker.topic_props.num_partitions = 6;
        let deploy = TopicDeployment::from_broker(BaseEntity::new("admin"), &broker, "t1");
        assert_eq!(deploy.topic_props.num_partitions, 6);
        assert_eq!(deploy.record_key(), (3, CheetahString::from("t1")));
        assert!(deploy.is_valid_status());
    }

    #[test]
    fn test_hard_deletable_requires_soft_remove_and_closed() {
        let broker = BrokerConfig::new(BaseEntity::new("admin"), 3, "10.0.0.3");
        let mut deploy = TopicDeployment::from_broker(BaseEntity::new("admin"), &broker, "t1");
        deploy.topic_status = TopicStatus::SoftRemove;
        assert!(!deploy.is_hard_deletable());
        deploy.topic_props.accept_publish = false;
        deploy.topic_props.accept_subscribe = false;
        assert!(deploy.is_hard_deletable());
    }
}
