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
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use cheetah_string::CheetahString;
use mqmaster_common::common::entity::cluster_defaults::CLUSTER_DEFAULTS_KEY;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::entity::ClusterDefaults;
use mqmaster_common::common::entity::GroupBlacklist;
use mqmaster_common::common::entity::GroupConsumeControl;
use mqmaster_common::common::entity::GroupResourceControl;
use mqmaster_common::common::entity::TopicControl;
use mqmaster_common::common::entity::TopicDeployment;
use mqmaster_common::GroupName;
use mqmaster_common::TopicName;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;
use parking_lot::Mutex;
use tracing::info;
use tracing::warn;

use crate::metastore::meta_store_service::MasterGroupStatus;
use crate::metastore::meta_store_service::MetaStoreService;
use crate::metastore::versioned_table::VersionedTable;

/// Single-node store keeping every table in memory.
///
/// The role switches let a node be demoted, made read-only or cut off from
/// its replication group at runtime.
pub struct MemoryMetaStore {
    is_master: AtomicBool,
    writable: AtomicBool,
    readable: AtomicBool,
    primary_active: AtomicBool,
    reachable: AtomicBool,
    started: AtomicBool,
    // serializes broker writes so the ip stays unique across ids
    broker_write_lock: Mutex<()>,
    cluster_defaults: VersionedTable<ClusterDefaults>,
    brokers: VersionedTable<BrokerConfig>,
    topic_deployments: VersionedTable<TopicDeployment>,
    topic_controls: VersionedTable<TopicControl>,
    group_resource_controls: VersionedTable<GroupResourceControl>,
    group_consume_controls: VersionedTable<GroupConsumeControl>,
    group_blacklist: VersionedTable<GroupBlacklist>,
}

impl Default for MemoryMetaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetaStore {
    /// Creates a writable master node.
    pub fn new() -> Self {
        Self {
            is_master: AtomicBool::new(true),
            writable: AtomicBool::new(true),
            readable: AtomicBool::new(true),
            primary_active: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            started: AtomicBool::new(false),
            broker_write_lock: Mutex::new(()),
            cluster_defaults: VersionedTable::new("cluster defaults"),
            brokers: VersionedTable::new("broker configure"),
            topic_deployments: VersionedTable::new("topic deploy"),
            topic_controls: VersionedTable::new("topic control"),
            group_resource_controls: VersionedTable::new("group resource control"),
            group_consume_controls: VersionedTable::new("group consume control"),
            group_blacklist: VersionedTable::new("group blacklist"),
        }
    }

    pub fn set_master(&self, is_master: bool) {
        self.is_master.store(is_master, Ordering::Release);
    }

    pub fn set_writable(&self, writable: bool) {
        self.writable.store(writable, Ordering::Release);
    }

    pub fn set_readable(&self, readable: bool) {
        self.readable.store(readable, Ordering::Release);
    }

    pub fn set_primary_node_active(&self, active: bool) {
        self.primary_active.store(active, Ordering::Release);
    }

    /// An unreachable node cannot report its group status at all.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Release);
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn check_writable(&self) -> MetaResult<()> {
        self.check_store_status(true)
    }

    fn check_ip_unique(&self, broker_id: i32, broker_ip: &str) -> MetaResult<()> {
        let conflicts = self
            .brokers
            .query(&|broker| broker.broker_ip.as_str() == broker_ip && broker.broker_id != broker_id);
        match conflicts.values().next() {
            Some(other) => Err(MetaError::already_exists(format!(
                "broker ip {} is already used by brokerId={}",
                broker_ip, other.broker_id
            ))),
            None => Ok(()),
        }
    }
}

impl MetaStoreService for MemoryMetaStore {
    fn start(&self) -> MetaResult<()> {
        if !self.started.swap(true, Ordering::AcqRel) {
            info!("memory meta store started");
        }
        Ok(())
    }

    fn stop(&self) -> MetaResult<()> {
        if self.started.swap(false, Ordering::AcqRel) {
            info!("memory meta store stopped");
        }
        Ok(())
    }

    fn is_master_now(&self) -> bool {
        self.is_master.load(Ordering::Acquire)
    }

    fn is_primary_node_active(&self) -> bool {
        self.primary_active.load(Ordering::Acquire)
    }

    fn transfer_master(&self) -> MetaResult<()> {
        if !self.is_master_now() {
            return Err(MetaError::illegal_status("current node is not master, cannot transfer master"));
        }
        if self.is_primary_node_active() {
            return Err(MetaError::illegal_status(
                "primary node is active, master transfer is not required",
            ));
        }
        warn!("transfer master role to the primary node");
        self.set_master(false);
        self.set_primary_node_active(true);
        Ok(())
    }

    fn get_master_group_status(&self, _refresh: bool) -> MetaResult<MasterGroupStatus> {
        if !self.reachable.load(Ordering::Acquire) {
            return Err(MetaError::unavailable("meta store replication group is unreachable"));
        }
        let is_master = self.is_master_now();
        Ok(MasterGroupStatus::new(
            is_master,
            is_master && self.writable.load(Ordering::Acquire),
            self.readable.load(Ordering::Acquire),
        ))
    }

    fn check_store_status(&self, require_writable: bool) -> MetaResult<()> {
        let status = self.get_master_group_status(false)?;
        if !status.is_master {
            return Err(MetaError::unavailable("current node is not active master"));
        }
        if require_writable && !status.is_writable {
            return Err(MetaError::unavailable("current node is not writable"));
        }
        if !require_writable && !status.is_readable {
            return Err(MetaError::unavailable("current node is not readable"));
        }
        Ok(())
    }

    fn add_cluster_defaults(&self, entity: ClusterDefaults) -> MetaResult<ClusterDefaults> {
        self.check_writable()?;
        self.cluster_defaults.add(entity)
    }

    fn update_cluster_defaults(&self, entity: ClusterDefaults) -> MetaResult<ClusterDefaults> {
        self.check_writable()?;
        self.cluster_defaults.update(entity)
    }

    fn get_cluster_defaults(&self) -> Option<ClusterDefaults> {
        self.cluster_defaults.get(&CLUSTER_DEFAULTS_KEY)
    }

    fn add_broker_config(&self, entity: BrokerConfig) -> MetaResult<BrokerConfig> {
        self.check_writable()?;
        let _guard = self.broker_write_lock.lock();
        self.check_ip_unique(entity.broker_id, entity.broker_ip.as_str())?;
        self.brokers.add(entity)
    }

    fn update_broker_config(&self, entity: BrokerConfig) -> MetaResult<BrokerConfig> {
        self.check_writable()?;
        let _guard = self.broker_write_lock.lock();
        self.check_ip_unique(entity.broker_id, entity.broker_ip.as_str())?;
        self.brokers.update(entity)
    }

    fn delete_broker_config(&self, broker_id: i32) -> MetaResult<BrokerConfig> {
        self.check_writable()?;
        let _guard = self.broker_write_lock.lock();
        self.brokers.remove(&broker_id)
    }

    fn get_broker_config(&self, broker_id: i32) -> Option<BrokerConfig> {
        self.brokers.get(&broker_id)
    }

    fn get_broker_config_by_ip(&self, broker_ip: &str) -> Option<BrokerConfig> {
        self.brokers
            .query(&|broker| broker.broker_ip.as_str() == broker_ip)
            .into_values()
            .next()
    }

    fn query_broker_configs(&self, filter: &dyn Fn(&BrokerConfig) -> bool) -> BTreeMap<i32, BrokerConfig> {
        self.brokers.query(filter)
    }

    fn add_topic_deployment(&self, entity: TopicDeployment) -> MetaResult<TopicDeployment> {
        self.check_writable()?;
        self.topic_deployments.add(entity)
    }

    fn update_topic_deployment(&self, entity: TopicDeployment) -> MetaResult<TopicDeployment> {
        self.check_writable()?;
        self.topic_deployments.update(entity)
    }

    fn delete_topic_deployment(&self, broker_id: i32, topic_name: &str) -> MetaResult<TopicDeployment> {
        self.check_writable()?;
        self.topic_deployments
            .remove(&(broker_id, CheetahString::from(topic_name)))
    }

    fn get_topic_deployment(&self, broker_id: i32, topic_name: &str) -> Option<TopicDeployment> {
        self.topic_deployments
            .get(&(broker_id, CheetahString::from(topic_name)))
    }

    fn query_topic_deployments(
        &self,
        filter: &dyn Fn(&TopicDeployment) -> bool,
    ) -> BTreeMap<(i32, TopicName), TopicDeployment> {
        self.topic_deployments.query(filter)
    }

    fn add_topic_control(&self, entity: TopicControl) -> MetaResult<TopicControl> {
        self.check_writable()?;
        self.topic_controls.add(entity)
    }

    fn update_topic_control(&self, entity: TopicControl) -> MetaResult<TopicControl> {
        self.check_writable()?;
        self.topic_controls.update(entity)
    }

    fn delete_topic_control(&self, topic_name: &str) -> MetaResult<TopicControl> {
        self.check_writable()?;
        self.topic_controls.remove(&CheetahString::from(topic_name))
    }

    fn get_topic_control(&self, topic_name: &str) -> Option<TopicControl> {
        self.topic_controls.get(&CheetahString::from(topic_name))
    }

    fn query_topic_controls(&self, filter: &dyn Fn(&TopicControl) -> bool) -> BTreeMap<TopicName, TopicControl> {
        self.topic_controls.query(filter)
    }

    fn add_group_resource_control(&self, entity: GroupResourceControl) -> MetaResult<GroupResourceControl> {
        self.check_writable()?;
        self.group_resource_controls.add(entity)
    }

    fn update_group_resource_control(&self, entity: GroupResourceControl) -> MetaResult<GroupResourceControl> {
        self.check_writable()?;
        self.group_resource_controls.update(entity)
    }

    fn delete_group_resource_control(&self, group_name: &str) -> MetaResult<GroupResourceControl> {
        self.check_writable()?;
        self.group_resource_controls
            .remove(&CheetahString::from(group_name))
    }

    fn get_group_resource_control(&self, group_name: &str) -> Option<GroupResourceControl> {
        self.group_resource_controls
            .get(&CheetahString::from(group_name))
    }

    fn query_group_resource_controls(
        &self,
        filter: &dyn Fn(&GroupResourceControl) -> bool,
    ) -> BTreeMap<GroupName, GroupResourceControl> {
        self.group_resource_controls.query(filter)
    }

    fn add_group_consume_control(&self, entity: GroupConsumeControl) -> MetaResult<GroupConsumeControl> {
        self.check_writable()?;
        self.group_consume_controls.add(entity)
    }

    fn update_group_consume_control(&self, entity: GroupConsumeControl) -> MetaResult<GroupConsumeControl> {
        self.check_writable()?;
        self.group_consume_controls.update(entity)
    }

    fn delete_group_consume_control(&self, group_name: &str, topic_name: &str) -> MetaResult<GroupConsumeControl> {
        self.check_writable()?;
        self.group_consume_controls.remove(&(
            CheetahString::from(group_name),
            CheetahString::from(topic_name),
        ))
    }

    fn get_group_consume_control(&self, group_name: &str, topic_name: &str) -> Option<GroupConsumeControl> {
        self.group_consume_controls.get(&(
            CheetahString::from(group_name),
            CheetahString::from(topic_name),
        ))
    }

    fn query_group_consume_controls(
        &self,
        filter: &dyn Fn(&GroupConsumeControl) -> bool,
    ) -> BTreeMap<(GroupName, TopicName), GroupConsumeControl> {
        self.group_consume_controls.query(filter)
    }

    fn add_group_blacklist(&self, entity: GroupBlacklist) -> MetaResult<GroupBlacklist> {
        self.check_writable()?;
        self.group_blacklist.add(entity)
    }

    fn delete_group_blacklist(&self, group_name: Option<&str>, topic_name: Option<&str>) -> MetaResult<usize> {
        self.check_writable()?;
        if group_name.is_none() && topic_name.is_none() {
            return Ok(0);
        }
        let matched = self.group_blacklist.query(&|record| {
            group_name.is_none_or(|group| record.group_name.as_str() == group)
                && topic_name.is_none_or(|topic| {
                    record.topic_name.as_ref().map(|name| name.as_str()) == Some(topic)
                })
        });
        let mut removed = 0;
        for key in matched.keys() {
            if self.group_blacklist.remove(key).is_ok() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn query_group_blacklist(
        &self,
        filter: &dyn Fn(&GroupBlacklist) -> bool,
    ) -> BTreeMap<(GroupName, Option<TopicName>), GroupBlacklist> {
        self.group_blacklist.query(filter)
    }
}

#[cfg(test)]
mod tests {
    use mqmaster_common::common::entity::BaseEntity;
    use mqmaster_error::ErrorCode;

    use super::*;

    fn broker(id: i32, ip: &str) -> BrokerConfig {
        BrokerConfig::new(BaseEntity::new("admin"), id, ip)
    }

    #[test]
    fn test_broker_ip_must_be_unique() {
        let store = MemoryMetaStore::new();
        store.add_broker_config(broker(1, "10.0.0.1")).unwrap();
        let err = store.add_broker_config(broker(2, "10.0.0.1")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadyExists);
        assert!(store.get_broker_config(2).is_none());
        assert_eq!(store.get_broker_config_by_ip("10.0.0.1").unwrap().broker_id, 1);
    }

    #[test]
    fn test_writes_rejected_when_not_master() {
        let store = MemoryMetaStore::new();
        store.set_master(false);
        let err = store.add_broker_config(broker(1, "10.0.0.1")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unavailable);

        store.set_master(true);
        store.set_writable(false);
        let err = store.add_broker_config(broker(1, "10.0.0.1")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unavailable);
        assert!(store.check_store_status(false).is_ok());
    }

    #[test]
    fn test_unreachable_group_has_no_status() {
        let store = MemoryMetaStore::new();
        store.set_reachable(false);
        assert!(store.get_master_group_status(true).is_err());
        store.set_reachable(true);
        assert_eq!(
            store.get_master_group_status(true).unwrap(),
            MasterGroupStatus::new(true, true, true)
        );
    }

    #[test]
    fn test_transfer_master_requires_inactive_primary() {
        let store = MemoryMetaStore::new();
        assert_eq!(store.transfer_master().unwrap_err().code(), ErrorCode::IllegalStatus);
        store.set_primary_node_active(false);
        store.transfer_master().unwrap();
        assert!(!store.is_master_now());
    }

    #[test]
    fn test_delete_blacklist_by_group_or_topic() {
        let store = MemoryMetaStore::new();
        store
            .add_group_blacklist(GroupBlacklist::new(BaseEntity::new("admin"), "g1", Some("t1".into())))
            .unwrap();
        store
            .add_group_blacklist(GroupBlacklist::new(BaseEntity::new("admin"), "g1", Some("t2".into())))
            .unwrap();
        store
            .add_group_blacklist(GroupBlacklist::new(BaseEntity::new("admin"), "g2", Some("t1".into())))
            .unwrap();

        assert_eq!(store.delete_group_blacklist(None, None).unwrap(), 0);
        assert_eq!(store.delete_group_blacklist(None, Some("t1")).unwrap(), 2);
        assert_eq!(store.delete_group_blacklist(Some("g1"), None).unwrap(), 1);
        assert!(store.query_group_blacklist(&|_| true).is_empty());
    }
}
