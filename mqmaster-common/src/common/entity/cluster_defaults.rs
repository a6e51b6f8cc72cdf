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
use crate::common::constant::max_msg_size_in_bytes;
use crate::common::entity::BaseEntity;
use crate::common::entity::MetaEntity;
use crate::common::topic_prop_group::TopicPropGroup;

/// Key of the single cluster defaults row
pub const CLUSTER_DEFAULTS_KEY: &str = "clusterDefaults";

/// Cluster-wide defaults used to fill unset fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDefaults {
    pub base: BaseEntity,
    pub broker_port: i32,
    pub broker_tls_port: i32,
    pub broker_web_port: i32,
    #[serde(alias = "maxMsgSizeInMB")]
    pub max_msg_size_in_mb: i32,
    pub qry_priority_id: i32,
    pub flow_ctrl_enable: bool,
    pub flow_ctrl_rule_count: i32,
    pub flow_ctrl_info: CheetahString,
    pub default_topic_props: TopicPropGroup,
}

impl Default for ClusterDefaults {
    fn default() -> Self {
        Self {
            base: BaseEntity::default(),
            broker_port: constant::DEFAULT_BROKER_PORT,
            broker_tls_port: constant::DEFAULT_BROKER_TLS_PORT,
            broker_web_port: constant::DEFAULT_BROKER_WEB_PORT,
            max_msg_size_in_mb: constant::DEFAULT_MAX_MSG_SIZE_MB,
            qry_priority_id: constant::DEFAULT_QRY_PRIORITY_ID,
            flow_ctrl_enable: false,
            flow_ctrl_rule_count: 0,
            flow_ctrl_info: CheetahString::empty(),
            default_topic_props: TopicPropGroup::default(),
        }
    }
}

impl ClusterDefaults {
    #[inline]
    pub fn max_msg_size_in_b(&self) -> i32 {
        max_msg_size_in_bytes(self.max_msg_size_in_mb)
    }
}

impl MetaEntity for ClusterDefaults {
    type Key = &'static str;

    fn record_key(&self) -> Self::Key {
        CLUSTER_DEFAULTS_KEY
    }

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn same_content(&self, other: &Self) -> bool {
        self.broker_port == other.broker_port
            && self.broker_tls_port == other.broker_tls_port
            && self.broker_web_port == other.broker_web_port
            && self.max_msg_size_in_mb == other.max_msg_size_in_mb
            && self.qry_priority_id == other.qry_priority_id
            && self.flow_ctrl_enable == other.flow_ctrl_enable
            && self.flow_ctrl_rule_count == other.flow_ctrl_rule_count
            && self.flow_ctrl_info == other.flow_ctrl_info
            && self.default_topic_props == other.default_topic_props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_defaults() {
        let defaults = ClusterDefaults::default();
        assert_eq!(defaults.broker_port, 8123);
        assert_eq!(defaults.broker_tls_port, 8124);
        assert_eq!(defaults.broker_web_port, 8081);
        assert_eq!(defaults.max_msg_size_in_b(), 1_049_600);
        assert_eq!(defaults.default_topic_props.num_partitions, 3);
    }
}
