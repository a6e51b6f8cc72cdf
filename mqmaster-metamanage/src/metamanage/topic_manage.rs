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

//! Topic deployment, topic control and cluster default operations.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use mqmaster_common::common::constant::MAX_ALLOWED_MSG_SIZE_MB;
use mqmaster_common::common::constant::META_VALUE_UNDEFINED;
use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::ClusterDefaults;
use mqmaster_common::common::entity::MetaEntity;
use mqmaster_common::common::entity::TopicControl;
use mqmaster_common::common::entity::TopicDeployment;
use mqmaster_common::common::topic_prop_group::TopicPropGroup;
use mqmaster_common::common::topic_prop_group::TopicPropUpdate;
use mqmaster_common::common::topic_status::TopicStatus;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;
use tracing::info;
use tracing::warn;

use crate::metamanage::meta_data_manager::log_result;
use crate::metamanage::meta_data_manager::MetaDataManager;
use crate::metamanage::op_context::OpContext;
use crate::metamanage::process_result::ProcessResult;
use crate::metamanage::process_result::TopicProcessResult;

impl MetaDataManager {
    // ----------------------------------------------------------------------
    // topic deployment
    // ----------------------------------------------------------------------

    /// Deploys every topic on every broker, one result per pair.
    pub fn add_topic_deploy_info(
        &self,
        ctx: &OpContext,
        broker_ids: &[i32],
        topic_names: &[&str],
        props: &TopicPropUpdate,
    ) -> Vec<TopicProcessResult> {
        self.for_each_topic_target(broker_ids, topic_names, |broker_id, topic_name| {
            self.add_topic_deployment(ctx, broker_id, topic_name, props)
        })
    }

    fn add_topic_deployment(
        &self,
        ctx: &OpContext,
        broker_id: i32,
        topic_name: &str,
        props: &TopicPropUpdate,
    ) -> MetaResult<TopicDeployment> {
        self.check_writable()?;
        let op_lock = self.broker_op_lock(broker_id);
        let _op_guard = op_lock.lock();
        let broker = self.store.get_broker_config(broker_id).ok_or_else(|| {
            MetaError::not_exist(format!("Not found broker configure by brokerId={broker_id}"))
        })?;
        if let Some(current) = self.store.get_topic_deployment(broker_id, topic_name) {
            return Err(if current.is_valid_status() {
                MetaError::already_exists(format!(
                    "Topic configure already exists! brokerId={broker_id}, topicName={topic_name}"
                ))
            } else {
                MetaError::illegal_status(format!(
                    "Topic configure is in {} status, please restore or clear it first! brokerId={}, topicName={}",
                    current.topic_status, broker_id, topic_name
                ))
            });
        }
        let mut entity = TopicDeployment::from_broker(BaseEntity::new(ctx.operator.clone()), &broker, topic_name);
        props.apply_to(&mut entity.topic_props);
        validate_topic_props(&entity.topic_props)?;
        self.add_if_absent_topic_control(ctx, topic_name)?;
        self.store.add_topic_deployment(entity)
    }

    /// Changes topic properties; partition and store counts never shrink.
    pub fn modify_topic_deploy_info(
        &self,
        ctx: &OpContext,
        broker_ids: &[i32],
        topic_names: &[&str],
        props: &TopicPropUpdate,
    ) -> Vec<TopicProcessResult> {
        self.for_each_topic_target(broker_ids, topic_names, |broker_id, topic_name| {
            self.modify_topic_deployment(ctx, broker_id, topic_name, props)
        })
    }

    fn modify_topic_deployment(
        &self,
        ctx: &OpContext,
        broker_id: i32,
        topic_name: &str,
        props: &TopicPropUpdate,
    ) -> MetaResult<TopicDeployment> {
        self.check_writable()?;
        let current = self.require_topic_deployment(broker_id, topic_name)?;
        if !current.is_valid_status() {
            return Err(MetaError::illegal_status(format!(
                "Topic configure is in {} status, please restore it first! brokerId={}, topicName={}",
                current.topic_status, broker_id, topic_name
            )));
        }
        let mut entity = current.clone();
        if !props.apply_to(&mut entity.topic_props) {
            return Err(MetaError::unchanged(format!(
                "Data not changed for brokerId={broker_id}, topicName={topic_name}"
            )));
        }
        if entity.topic_props.num_partitions < current.topic_props.num_partitions {
            return Err(MetaError::illegal_value(format!(
                "Partition value is less than before, please confirm the configure first! brokerId={}, \
                 topicName={}, old value={}, new value={}",
                broker_id, topic_name, current.topic_props.num_partitions, entity.topic_props.num_partitions
            )));
        }
        if entity.topic_props.num_topic_stores < current.topic_props.num_topic_stores {
            return Err(MetaError::illegal_value(format!(
                "TopicStores value is less than before, please confirm the configure first! brokerId={}, \
                 topicName={}, old value={}, new value={}",
                broker_id, topic_name, current.topic_props.num_topic_stores, entity.topic_props.num_topic_stores
            )));
        }
        validate_topic_props(&entity.topic_props)?;
        self.write_topic_deployment(ctx, &current, entity)
    }

    /// First, reversible step of topic decommissioning.
    pub fn soft_delete_topics(
        &self,
        ctx: &OpContext,
        broker_ids: &[i32],
        topic_names: &[&str],
    ) -> Vec<TopicProcessResult> {
        self.for_each_topic_target(broker_ids, topic_names, |broker_id, topic_name| {
            self.check_writable()?;
            let current = self.require_topic_deployment(broker_id, topic_name)?;
            match current.topic_status {
                TopicStatus::SoftDelete => return Ok(current),
                TopicStatus::SoftRemove | TopicStatus::HardRemove => {
                    return Err(MetaError::illegal_status(format!(
                        "Topic is in removing flow! brokerId={broker_id}, topicName={topic_name}"
                    )));
                }
                _ => {}
            }
            ensure_closed(&current)?;
            let mut entity = current.clone();
            entity.topic_status = TopicStatus::SoftDelete;
            self.write_topic_deployment(ctx, &current, entity)
        })
    }

    /// Terminal step of topic decommissioning; afterwards the deployment can
    /// be hard deleted. A topic that was never soft deleted is left as is.
    pub fn soft_remove_topics(
        &self,
        ctx: &OpContext,
        broker_ids: &[i32],
        topic_names: &[&str],
    ) -> Vec<TopicProcessResult> {
        self.for_each_topic_target(broker_ids, topic_names, |broker_id, topic_name| {
            self.check_writable()?;
            let current = self.require_topic_deployment(broker_id, topic_name)?;
            if current.topic_status == TopicStatus::SoftRemove {
                return Ok(current);
            }
            ensure_closed(&current)?;
            if current.topic_status != TopicStatus::SoftDelete {
                info!(
                    "[Topic Remove] brokerId={} topicName={} is {}, skipped",
                    broker_id, topic_name, current.topic_status
                );
                return Ok(current);
            }
            let mut entity = current.clone();
            entity.topic_status = TopicStatus::SoftRemove;
            self.write_topic_deployment(ctx, &current, entity)
        })
    }

    /// Brings a soft deleted topic back to normal.
    pub fn restore_topics(&self, ctx: &OpContext, broker_ids: &[i32], topic_names: &[&str]) -> Vec<TopicProcessResult> {
        self.for_each_topic_target(broker_ids, topic_names, |broker_id, topic_name| {
            self.check_writable()?;
            let current = self.require_topic_deployment(broker_id, topic_name)?;
            match current.topic_status {
                TopicStatus::SoftDelete => {}
                TopicStatus::SoftRemove | TopicStatus::HardRemove => {
                    return Err(MetaError::illegal_status(format!(
                        "Topic is in removing flow, cannot be restored! brokerId={broker_id}, topicName={topic_name}"
                    )));
                }
                _ => return Ok(current),
            }
            ensure_closed(&current)?;
            let mut entity = current.clone();
            entity.topic_status = TopicStatus::Normal;
            self.write_topic_deployment(ctx, &current, entity)
        })
    }

    /// Hard deletes the listed soft removed deployments of a broker and
    /// returns the deleted topic names. Other topics are skipped silently.
    pub fn clear_removed_topic_conf(
        &self,
        ctx: &OpContext,
        broker_id: i32,
        topic_names: &[&str],
    ) -> MetaResult<Vec<TopicName>> {
        self.check_writable()?;
        let mut cleared = Vec::new();
        for topic_name in topic_names {
            let Some(current) = self.store.get_topic_deployment(broker_id, topic_name) else {
                continue;
            };
            if !current.is_hard_deletable() {
                continue;
            }
            self.store.delete_topic_deployment(broker_id, topic_name)?;
            cleared.push(current.topic_name);
        }
        if !cleared.is_empty() {
            info!(
                "[Topic Clear] operator={} brokerId={} cleared topics={:?}",
                ctx.operator, broker_id, cleared
            );
            self.refresh_broker_desired(broker_id);
        }
        Ok(cleared)
    }

    /// Hard deletes every deployment of a broker that finished the removing
    /// flow; the others are reported as failures.
    pub fn clear_all_topic_conf(&self, ctx: &OpContext, broker_id: i32) -> Vec<TopicProcessResult> {
        let deployments = self.store.query_topic_deployments(&|deploy| deploy.broker_id == broker_id);
        let mut results = Vec::with_capacity(deployments.len());
        for ((_, topic_name), current) in deployments {
            let result = (|| -> MetaResult<()> {
                self.check_writable()?;
                if !current.is_hard_deletable() {
                    return Err(MetaError::illegal_status(format!(
                        "Topic is not soft removed with acceptPublish and acceptSubscribe closed! \
                         brokerId={broker_id}, topicName={topic_name}"
                    )));
                }
                self.store.delete_topic_deployment(broker_id, topic_name.as_str())?;
                Ok(())
            })();
            results.push(TopicProcessResult::new(broker_id, topic_name, ProcessResult::from_result(&result)));
        }
        if results.iter().any(|result| result.is_success()) {
            info!("[Topic Clear] operator={} cleared topics of brokerId={}", ctx.operator, broker_id);
            self.refresh_broker_desired(broker_id);
        }
        results
    }

    pub fn get_topic_deploy(&self, broker_id: i32, topic_name: &str) -> Option<TopicDeployment> {
        self.store.get_topic_deployment(broker_id, topic_name)
    }

    pub fn get_broker_topic_deploys(&self, broker_id: i32) -> BTreeMap<TopicName, TopicDeployment> {
        self.store
            .query_topic_deployments(&|deploy| deploy.broker_id == broker_id)
            .into_iter()
            .map(|((_, topic_name), deploy)| (topic_name, deploy))
            .collect()
    }

    /// Topic names deployed on each broker; all brokers for an empty list.
    pub fn get_broker_topic_names(&self, broker_ids: &[i32]) -> BTreeMap<i32, BTreeSet<TopicName>> {
        let mut result: BTreeMap<i32, BTreeSet<TopicName>> = BTreeMap::new();
        let deployments = self
            .store
            .query_topic_deployments(&|deploy| broker_ids.is_empty() || broker_ids.contains(&deploy.broker_id));
        for (broker_id, topic_name) in deployments.into_keys() {
            result.entry(broker_id).or_default().insert(topic_name);
        }
        result
    }

    /// Brokers hosting each topic; all topics for an empty list.
    pub fn get_topic_broker_ids(&self, topic_names: &[&str]) -> BTreeMap<TopicName, BTreeSet<i32>> {
        let mut result: BTreeMap<TopicName, BTreeSet<i32>> = BTreeMap::new();
        let deployments = self.store.query_topic_deployments(&|deploy| {
            topic_names.is_empty() || topic_names.contains(&deploy.topic_name.as_str())
        });
        for (broker_id, topic_name) in deployments.into_keys() {
            result.entry(topic_name).or_default().insert(broker_id);
        }
        result
    }

    pub fn get_configured_topic_names(&self) -> BTreeSet<TopicName> {
        self.store
            .query_topic_deployments(&|_| true)
            .into_keys()
            .map(|(_, topic_name)| topic_name)
            .collect()
    }

    pub fn query_topic_deploys(
        &self,
        topic_names: &[&str],
        broker_ids: &[i32],
        filter: &dyn Fn(&TopicDeployment) -> bool,
    ) -> BTreeMap<(i32, TopicName), TopicDeployment> {
        self.store.query_topic_deployments(&|deploy| {
            (topic_names.is_empty() || topic_names.contains(&deploy.topic_name.as_str()))
                && (broker_ids.is_empty() || broker_ids.contains(&deploy.broker_id))
                && filter(deploy)
        })
    }

    fn require_topic_deployment(&self, broker_id: i32, topic_name: &str) -> MetaResult<TopicDeployment> {
        self.store.get_topic_deployment(broker_id, topic_name).ok_or_else(|| {
            MetaError::not_exist(format!(
                "Not found topic configure! brokerId={broker_id}, topicName={topic_name}"
            ))
        })
    }

    fn write_topic_deployment(
        &self,
        ctx: &OpContext,
        current: &TopicDeployment,
        mut entity: TopicDeployment,
    ) -> MetaResult<TopicDeployment> {
        let read_version = ctx.require_version(
            current.base.data_version,
            &format!("brokerId={}, topicName={}", current.broker_id, current.topic_name),
        )?;
        entity.base.touch(ctx.operator.clone(), read_version);
        self.store.update_topic_deployment(entity)
    }

    /// Runs `op` for every (broker, topic) pair and refreshes the desired
    /// configuration of each broker that had at least one success.
    fn for_each_topic_target(
        &self,
        broker_ids: &[i32],
        topic_names: &[&str],
        op: impl Fn(i32, &str) -> MetaResult<TopicDeployment>,
    ) -> Vec<TopicProcessResult> {
        let mut results = Vec::with_capacity(broker_ids.len() * topic_names.len());
        let mut touched = BTreeSet::new();
        for broker_id in broker_ids {
            for topic_name in topic_names {
                let result = op(*broker_id, topic_name);
                log_result("topic configure", &result);
                if result.is_ok() {
                    touched.insert(*broker_id);
                }
                results.push(TopicProcessResult::new(
                    *broker_id,
                    *topic_name,
                    ProcessResult::from_result(&result),
                ));
            }
        }
        for broker_id in touched {
            self.refresh_broker_desired(broker_id);
        }
        results
    }

    // ----------------------------------------------------------------------
    // topic control
    // ----------------------------------------------------------------------

    /// Creates the topic's control record with defaults when missing.
    pub fn add_if_absent_topic_control(&self, ctx: &OpContext, topic_name: &str) -> MetaResult<TopicControl> {
        if let Some(current) = self.store.get_topic_control(topic_name) {
            return Ok(current);
        }
        match self
            .store
            .add_topic_control(TopicControl::new(BaseEntity::new(ctx.operator.clone()), topic_name))
        {
            Ok(created) => {
                info!("[Topic Control] auto created control record of topic {}", topic_name);
                Ok(created)
            }
            // lost a race against another creator
            Err(e) if e.code() == ErrorCode::AlreadyExists => self
                .store
                .get_topic_control(topic_name)
                .ok_or(e),
            Err(e) => Err(e),
        }
    }

    /// Sets the auth flag and/or message size of each topic, creating the
    /// control record when missing.
    pub fn add_or_update_topic_control(
        &self,
        ctx: &OpContext,
        topic_names: &[&str],
        auth_ctrl_enable: Option<bool>,
        max_msg_size_in_mb: Option<i32>,
    ) -> Vec<TopicProcessResult> {
        topic_names
            .iter()
            .map(|topic_name| {
                let result =
                    self.add_or_update_one_topic_control(ctx, topic_name, auth_ctrl_enable, max_msg_size_in_mb);
                log_result("add or update topic control", &result);
                TopicProcessResult::new(META_VALUE_UNDEFINED, *topic_name, ProcessResult::from_result(&result))
            })
            .collect()
    }

    fn add_or_update_one_topic_control(
        &self,
        ctx: &OpContext,
        topic_name: &str,
        auth_ctrl_enable: Option<bool>,
        max_msg_size_in_mb: Option<i32>,
    ) -> MetaResult<TopicControl> {
        self.check_writable()?;
        if let Some(size_in_mb) = max_msg_size_in_mb {
            validate_max_msg_size(size_in_mb)?;
        }
        let (current, created) = match self.store.get_topic_control(topic_name) {
            Some(current) => (current, false),
            None => (self.add_if_absent_topic_control(ctx, topic_name)?, true),
        };
        let mut entity = current.clone();
        if let Some(enable) = auth_ctrl_enable {
            entity.auth_ctrl_enable = enable;
        }
        if let Some(size_in_mb) = max_msg_size_in_mb {
            entity.max_msg_size_in_mb = Some(size_in_mb);
        }
        if entity.same_content(&current) {
            return Ok(current);
        }
        let read_version = if created {
            current.base.data_version
        } else {
            ctx.require_version(current.base.data_version, &format!("topicName={topic_name}"))?
        };
        entity.base.touch(ctx.operator.clone(), read_version);
        let stored = self.store.update_topic_control(entity)?;
        if stored.max_msg_size_in_mb != current.max_msg_size_in_mb {
            let hosts = self.get_topic_broker_ids(&[topic_name]);
            for broker_id in hosts.into_values().flatten() {
                self.refresh_broker_desired(broker_id);
            }
        }
        Ok(stored)
    }

    /// Removes a topic's control record once nothing references the topic.
    pub fn delete_topic_control(&self, ctx: &OpContext, topic_name: &str) -> MetaResult<TopicControl> {
        let result: MetaResult<TopicControl> = (|| {
            self.check_writable()?;
            let deployed = self
                .store
                .query_topic_deployments(&|deploy| deploy.topic_name.as_str() == topic_name);
            if !deployed.is_empty() {
                return Err(MetaError::illegal_status(format!(
                    "Topic {} is still deployed on brokers {:?}, please delete them first!",
                    topic_name,
                    deployed.keys().map(|(broker_id, _)| *broker_id).collect::<Vec<_>>()
                )));
            }
            let consumers = self
                .store
                .query_group_consume_controls(&|ctrl| ctrl.topic_name.as_str() == topic_name);
            if !consumers.is_empty() {
                return Err(MetaError::illegal_status(format!(
                    "Topic {} is still referenced by consume control of groups {:?}, please delete them first!",
                    topic_name,
                    consumers.keys().map(|(group, _)| group.as_str()).collect::<Vec<_>>()
                )));
            }
            let removed = self.store.delete_topic_control(topic_name)?;
            info!("[Topic Control] operator={} deleted control of topic {}", ctx.operator, topic_name);
            Ok(removed)
        })();
        log_result("delete topic control", &result);
        result
    }

    pub fn get_topic_control(&self, topic_name: &str) -> Option<TopicControl> {
        self.store.get_topic_control(topic_name)
    }

    /// The topic's override, or the cluster default when it has none.
    pub fn get_topic_max_msg_size_mb(&self, topic_name: &str) -> i32 {
        self.store
            .get_topic_control(topic_name)
            .and_then(|ctrl| ctrl.max_msg_size_in_mb)
            .unwrap_or_else(|| self.cluster_defaults().max_msg_size_in_mb)
    }

    pub fn query_topic_controls(
        &self,
        topic_names: &[&str],
        filter: &dyn Fn(&TopicControl) -> bool,
    ) -> BTreeMap<TopicName, TopicControl> {
        self.store.query_topic_controls(&|ctrl| {
            (topic_names.is_empty() || topic_names.contains(&ctrl.topic_name.as_str())) && filter(ctrl)
        })
    }

    // ----------------------------------------------------------------------
    // cluster defaults
    // ----------------------------------------------------------------------

    /// Stores the cluster defaults; fails when they are already stored.
    pub fn add_cluster_defaults(&self, ctx: &OpContext, mut entity: ClusterDefaults) -> MetaResult<ClusterDefaults> {
        let result: MetaResult<ClusterDefaults> = (|| {
            self.check_writable()?;
            if self.store.get_cluster_defaults().is_some() {
                return Err(MetaError::already_exists(
                    "Cluster default setting already exists, please modify it instead!",
                ));
            }
            validate_cluster_defaults(&entity)?;
            entity.base = BaseEntity::new(ctx.operator.clone());
            self.store.add_cluster_defaults(entity)
        })();
        log_result("add cluster defaults", &result);
        if result.is_ok() {
            self.refresh_all_broker_desired();
        }
        result
    }

    pub fn modify_cluster_defaults(&self, ctx: &OpContext, mut entity: ClusterDefaults) -> MetaResult<ClusterDefaults> {
        let result: MetaResult<ClusterDefaults> = (|| {
            self.check_writable()?;
            let Some(current) = self.store.get_cluster_defaults() else {
                return Err(MetaError::not_exist("Cluster default setting not exist, please add it first!"));
            };
            let read_version = ctx.check_entity_version(
                entity.base.data_version,
                current.base.data_version,
                "cluster default setting",
            )?;
            if entity.same_content(&current) {
                return Err(MetaError::unchanged("Data not changed for cluster default setting"));
            }
            validate_cluster_defaults(&entity)?;
            entity.base.touch(ctx.operator.clone(), read_version);
            self.store.update_cluster_defaults(entity)
        })();
        log_result("modify cluster defaults", &result);
        if result.is_ok() {
            self.refresh_all_broker_desired();
        }
        result
    }

    pub fn add_or_update_cluster_defaults(
        &self,
        ctx: &OpContext,
        entity: ClusterDefaults,
    ) -> MetaResult<ClusterDefaults> {
        if self.store.get_cluster_defaults().is_some() {
            self.modify_cluster_defaults(ctx, entity)
        } else {
            self.add_cluster_defaults(ctx, entity)
        }
    }

    /// Stored defaults; the built-in ones unless `must_configured`.
    pub fn get_cluster_defaults(&self, must_configured: bool) -> Option<ClusterDefaults> {
        match self.store.get_cluster_defaults() {
            Some(defaults) => Some(defaults),
            None if must_configured => None,
            None => Some(ClusterDefaults::default()),
        }
    }
}

fn ensure_closed(current: &TopicDeployment) -> MetaResult<()> {
    if current.topic_props.is_closed() {
        return Ok(());
    }
    warn!(
        "[Topic Remove] brokerId={} topicName={} is still open",
        current.broker_id, current.topic_name
    );
    Err(MetaError::illegal_status(format!(
        "The topic's acceptPublish and acceptSubscribe parameters must be false in broker={} before topic \
         deletion! topicName={}",
        current.broker_id, current.topic_name
    )))
}

fn validate_topic_props(props: &TopicPropGroup) -> MetaResult<()> {
    let positive = [
        ("numPartitions", props.num_partitions),
        ("numTopicStores", props.num_topic_stores),
        ("unflushThreshold", props.unflush_threshold),
        ("unflushInterval", props.unflush_interval),
        ("memCacheMsgSizeInMB", props.mem_cache_msg_size_in_mb),
        ("memCacheMsgCntInK", props.mem_cache_msg_cnt_in_k),
        ("memCacheFlushIntvl", props.mem_cache_flush_intvl),
    ];
    if let Some((name, value)) = positive.iter().find(|(_, value)| *value <= 0) {
        return Err(MetaError::illegal_value(format!("{name} must be greater than 0, current value is {value}")));
    }
    if props.unflush_data_hold < 0 {
        return Err(MetaError::illegal_value(format!(
            "unflushDataHold must not be negative, current value is {}",
            props.unflush_data_hold
        )));
    }
    if props.delete_policy.as_str().trim().is_empty() || props.delete_policy.as_str().contains(':') {
        return Err(MetaError::illegal_value(format!(
            "deletePolicy is illegal: {}",
            props.delete_policy
        )));
    }
    Ok(())
}

fn validate_max_msg_size(size_in_mb: i32) -> MetaResult<()> {
    if !(1..=MAX_ALLOWED_MSG_SIZE_MB).contains(&size_in_mb) {
        return Err(MetaError::illegal_value(format!(
            "maxMsgSizeInMB must be in [1, {MAX_ALLOWED_MSG_SIZE_MB}], current value is {size_in_mb}"
        )));
    }
    Ok(())
}

fn validate_cluster_defaults(entity: &ClusterDefaults) -> MetaResult<()> {
    validate_max_msg_size(entity.max_msg_size_in_mb)?;
    validate_topic_props(&entity.default_topic_props)
}
