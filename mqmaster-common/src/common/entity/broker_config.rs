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
use crate::common::constant::ATTR_SEP;
use crate::common::entity::BaseEntity;
use crate::common::entity::MetaEntity;
use crate::common::manage_status::ManageStatus;
use crate::common::topic_prop_group::TopicPropGroup;

/// Administrator-owned configuration of one broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerConfig {
    pub base: BaseEntity,
    pub broker_id: i32,
    pub broker_ip: CheetahString,
    pub broker_port: i32,
    pub broker_tls_port: i32,
    pub broker_web_port: i32,
    pub region_id: i32,
    pub group_id: i32,
    pub manage_status: ManageStatus,
    /// Default properties of topics deployed on this broker
    pub topic_props: TopicPropGroup,
    /// Configuration changed since the broker last loaded it
    pub conf_data_updated: bool,
    /// The broker has loaded the current configuration
    pub broker_loaded: bool,
}

impl BrokerConfig {
    pub fn new(base: BaseEntity, broker_id: i32, broker_ip: impl Into<CheetahString>) -> Self {
        Self {
            base,
            broker_id,
            broker_ip: broker_ip.into(),
            broker_port: constant::DEFAULT_BROKER_PORT,
            broker_tls_port: constant::DEFAULT_BROKER_TLS_PORT,
            broker_web_port: constant::DEFAULT_BROKER_WEB_PORT,
            region_id: constant::META_VALUE_UNDEFINED,
            group_id: constant::META_VALUE_UNDEFINED,
            manage_status: ManageStatus::New,
            topic_props: TopicPropGroup::default(),
            conf_data_updated: false,
            broker_loaded: false,
        }
    }

    pub fn with_ports(mut self, port: i32, tls_port: i32, web_port: i32) -> Self {
        self.broker_port = port;
        self.broker_tls_port = tls_port;
        self.broker_web_port = web_port;
        self
    }

    pub fn with_manage_status(mut self, manage_status: ManageStatus) -> Self {
        self.manage_status = manage_status;
        self
    }

    pub fn with_topic_props(mut self, topic_props: TopicPropGroup) -> Self {
        self.topic_props = topic_props;
        self
    }

    /// `brokerId:brokerIp:brokerPort`
    pub fn simple_broker_info(&self) -> CheetahString {
        CheetahString::from_string(format!(
            "{}{ATTR_SEP}{}{ATTR_SEP}{}",
            self.broker_id, self.broker_ip, self.broker_port
        ))
    }

    /// `brokerId:brokerIp:brokerTlsPort`
    pub fn simple_tls_broker_info(&self) -> CheetahString {
        CheetahString::from_string(format!(
            "{}{ATTR_SEP}{}{ATTR_SEP}{}",
            self.broker_id, self.broker_ip, self.broker_tls_port
        ))
    }

    #[inline]
    pub fn broker_default_conf(&self) -> String {
        self.topic_props.to_broker_default_conf()
    }

    pub fn mark_conf_data_updated(&mut self) {
        self.conf_data_updated = true;
        self.broker_loaded = false;
    }

    pub fn mark_broker_loaded(&mut self) {
        self.conf_data_updated = false;
        self.broker_loaded = true;
    }
}

impl MetaEntity for BrokerConfig {
    type Key = i32;

    fn record_key(&self) -> Self::Key {
        self.broker_id
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
            && self.broker_tls_port == other.broker_tls_port
            && self.broker_web_port == other.broker_web_port
            && self.region_id == other.region_id
            && self.group_id == other.group_id
            && self.manage_status == other.manage_status
            && self.topic_props == other.topic_props
            && self.conf_data_updated == other.conf_data_updated
            && self.broker_loaded == other.broker_loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_broker_info() {
        let broker = BrokerConfig::new(BaseEntity::new("admin"), 5, "10.0.0.5").with_ports(8123, 8124, 8081);
        assert_eq!(broker.simple_broker_info().as_str(), "5:10.0.0.5:8123");
        assert_eq!(broker.simple_tls_broker_info().as_str(), "5:10.0.0.5:8124");
    }

    #[test]
    fn test_dirty_flags_are_exclusive() {
        let mut broker = BrokerConfig::new(BaseEntity::new("admin"), 1, "10.0.0.1");
        broker.mark_conf_data_updated();
        assert!(broker.conf_data_updated);
        assert!(!broker.broker_loaded);
        broker.mark_broker_loaded();
        assert!(!broker.conf_data_updated);
        assert!(broker.broker_loaded);
    }

    #[test]
    fn test_same_content_ignores_audit_columns() {
        let broker = BrokerConfig::new(BaseEntity::new("admin"), 1, "10.0.0.1");
        let mut other = broker.clone();
        other.base.touch("ops", 7);
        assert!(broker.same_content(&other));
        other.broker_port = 9000;
        assert!(!broker.same_content(&other));
    }
}
