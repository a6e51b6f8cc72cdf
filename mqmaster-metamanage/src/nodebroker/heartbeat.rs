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

//! Broker side of the synchronization protocol: what a broker reports in its
//! heartbeat and the directive the master answers with.

use cheetah_string::CheetahString;
use mqmaster_common::common::manage_status::ManageStatus;
use mqmaster_common::TopicName;
use serde::Serialize;

use crate::nodebroker::broker_sync_state::BrokerRunStatus;

/// Live information about one topic as reported by the broker hosting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInfo {
    pub broker_id: i32,
    pub topic_name: TopicName,
    pub partition_num: i32,
    pub topic_store_num: i32,
    pub accept_publish: bool,
    pub accept_subscribe: bool,
}

impl TopicInfo {
    pub fn new(broker_id: i32, topic_name: impl Into<TopicName>, partition_num: i32, topic_store_num: i32) -> Self {
        Self {
            broker_id,
            topic_name: topic_name.into(),
            partition_num,
            topic_store_num,
            accept_publish: true,
            accept_subscribe: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BrokerHeartbeat {
    pub broker_id: i32,
    /// Manage status the broker currently runs with
    pub manage_status: ManageStatus,
    pub broker_default_conf: String,
    pub topic_conf_lines: Vec<String>,
    /// The broker holds a configuration it has not applied yet
    pub conf_changed: bool,
    /// The broker finished applying the configuration it was given
    pub conf_loaded: bool,
    pub fast_start_requested: bool,
    pub topic_infos: Vec<TopicInfo>,
}

impl BrokerHeartbeat {
    pub fn new(broker_id: i32, manage_status: ManageStatus) -> Self {
        Self {
            broker_id,
            manage_status,
            ..Default::default()
        }
    }

    pub fn with_config(mut self, broker_default_conf: impl Into<String>, topic_conf_lines: Vec<String>) -> Self {
        self.broker_default_conf = broker_default_conf.into();
        self.topic_conf_lines = topic_conf_lines;
        self
    }

    pub fn with_ack(mut self, conf_changed: bool, conf_loaded: bool, fast_start_requested: bool) -> Self {
        self.conf_changed = conf_changed;
        self.conf_loaded = conf_loaded;
        self.fast_start_requested = fast_start_requested;
        self
    }

    pub fn with_topic_infos(mut self, topic_infos: Vec<TopicInfo>) -> Self {
        self.topic_infos = topic_infos;
        self
    }

    #[inline]
    pub fn carries_ack(&self) -> bool {
        self.conf_changed || self.conf_loaded
    }
}

/// Configuration pushed to a broker that has to reload it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPayload {
    pub broker_default_conf: CheetahString,
    pub topic_conf_lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub broker_id: i32,
    pub manage_status: i32,
    pub accept_publish: bool,
    pub accept_subscribe: bool,
    pub run_status: BrokerRunStatus,
    pub fast_start: bool,
    pub conf_version: i64,
    pub conf_checksum: u32,
    pub conf_payload: Option<ConfigPayload>,
}

impl HeartbeatResponse {
    #[inline]
    pub fn requires_reload(&self) -> bool {
        self.conf_payload.is_some()
    }
}
