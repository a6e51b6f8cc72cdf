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

use std::collections::BTreeMap;

use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::entity::ClusterDefaults;
use mqmaster_common::common::entity::GroupBlacklist;
use mqmaster_common::common::entity::GroupConsumeControl;
use mqmaster_common::common::entity::GroupResourceControl;
use mqmaster_common::common::entity::TopicControl;
use mqmaster_common::common::entity::TopicDeployment;
use mqmaster_common::GroupName;
use mqmaster_common::TopicName;
use mqmaster_error::MetaResult;
use serde::Serialize;

/// Role and availability flags of the local store node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterGroupStatus {
    pub is_master: bool,
    pub is_writable: bool,
    pub is_readable: bool,
}

impl MasterGroupStatus {
    pub const fn new(is_master: bool, is_writable: bool, is_readable: bool) -> Self {
        Self {
            is_master,
            is_writable,
            is_readable,
        }
    }
}

/// Replicated, versioned metadata store consumed by the manager.
///
/// Every `add_*` rejects an existing key with `AlreadyExists` and stores the
/// record at version 1. Every `update_*` requires the version the caller
/// read and rejects a stale one with `IllegalStatus`. Writes fail with
/// `Unavailable` when the node is not the writable master.
pub trait MetaStoreService: Send + Sync {
    fn start(&self) -> MetaResult<()>;

    fn stop(&self) -> MetaResult<()>;

    fn is_master_now(&self) -> bool;

    fn is_primary_node_active(&self) -> bool;

    fn transfer_master(&self) -> MetaResult<()>;

    /// Returns the current role flags; `refresh` re-reads them from the
    /// replication group instead of the last observed value.
    fn get_master_group_status(&self, refresh: bool) -> MetaResult<MasterGroupStatus>;

    fn check_store_status(&self, require_writable: bool) -> MetaResult<()>;

    // cluster defaults
    fn add_cluster_defaults(&self, entity: ClusterDefaults) -> MetaResult<ClusterDefaults>;

    fn update_cluster_defaults(&self, entity: ClusterDefaults) -> MetaResult<ClusterDefaults>;

    fn get_cluster_defaults(&self) -> Option<ClusterDefaults>;

    // broker configuration
    fn add_broker_config(&self, entity: BrokerConfig) -> MetaResult<BrokerConfig>;

    fn update_broker_config(&self, entity: BrokerConfig) -> MetaResult<BrokerConfig>;

    fn delete_broker_config(&self, broker_id: i32) -> MetaResult<BrokerConfig>;

    fn get_broker_config(&self, broker_id: i32) -> Option<BrokerConfig>;

    fn get_broker_config_by_ip(&self, broker_ip: &str) -> Option<BrokerConfig>;

    fn query_broker_configs(&self, filter: &dyn Fn(&BrokerConfig) -> bool) -> BTreeMap<i32, BrokerConfig>;

    // topic deployment
    fn add_topic_deployment(&self, entity: TopicDeployment) -> MetaResult<TopicDeployment>;

    fn update_topic_deployment(&self, entity: TopicDeployment) -> MetaResult<TopicDeployment>;

    fn delete_topic_deployment(&self, broker_id: i32, topic_name: &str) -> MetaResult<TopicDeployment>;

    fn get_topic_deployment(&self, broker_id: i32, topic_name: &str) -> Option<TopicDeployment>;

    fn query_topic_deployments(
        &self,
        filter: &dyn Fn(&TopicDeployment) -> bool,
    ) -> BTreeMap<(i32, TopicName), TopicDeployment>;

    // topic control
    fn add_topic_control(&self, entity: TopicControl) -> MetaResult<TopicControl>;

    fn update_topic_control(&self, entity: TopicControl) -> MetaResult<TopicControl>;

    fn delete_topic_control(&self, topic_name: &str) -> MetaResult<TopicControl>;

    fn get_topic_control(&self, topic_name: &str) -> Option<TopicControl>;

    fn query_topic_controls(&self, filter: &dyn Fn(&TopicControl) -> bool) -> BTreeMap<TopicName, TopicControl>;

    // group resource control
    fn add_group_resource_control(&self, entity: GroupResourceControl) -> MetaResult<GroupResourceControl>;

    fn update_group_resource_control(&self, entity: GroupResourceControl) -> MetaResult<GroupResourceControl>;

    fn delete_group_resource_control(&self, group_name: &str) -> MetaResult<GroupResourceControl>;

    fn get_group_resource_control(&self, group_name: &str) -> Option<GroupResourceControl>;

    fn query_group_resource_controls(
        &self,
        filter: &dyn Fn(&GroupResourceControl) -> bool,
    ) -> BTreeMap<GroupName, GroupResourceControl>;

    // group consume control
    fn add_group_consume_control(&self, entity: GroupConsumeControl) -> MetaResult<GroupConsumeControl>;

    fn update_group_consume_control(&self, entity: GroupConsumeControl) -> MetaResult<GroupConsumeControl>;

    fn delete_group_consume_control(&self, group_name: &str, topic_name: &str) -> MetaResult<GroupConsumeControl>;

    fn get_group_consume_control(&self, group_name: &str, topic_name: &str) -> Option<GroupConsumeControl>;

    fn query_group_consume_controls(
        &self,
        filter: &dyn Fn(&GroupConsumeControl) -> bool,
    ) -> BTreeMap<(GroupName, TopicName), GroupConsumeControl>;

    // group blacklist
    fn add_group_blacklist(&self, entity: GroupBlacklist) -> MetaResult<GroupBlacklist>;

    /// Deletes every blacklist row matching the given group and/or topic and
    /// returns how many were removed.
    fn delete_group_blacklist(&self, group_name: Option<&str>, topic_name: Option<&str>) -> MetaResult<usize>;

    fn query_group_blacklist(
        &self,
        filter: &dyn Fn(&GroupBlacklist) -> bool,
    ) -> BTreeMap<(GroupName, Option<TopicName>), GroupBlacklist>;
}
