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
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::entity::ClusterDefaults;
use mqmaster_common::common::entity::MetaEntity;
use mqmaster_common::common::entity::TopicDeployment;
use mqmaster_common::common::manage_status::ManageStatus;
use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_common::TopicName;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;
use parking_lot::Mutex;
use tracing::info;
use tracing::warn;

use crate::metamanage::broker_index::BrokerSummaryIndex;
use crate::metamanage::op_context::OpContext;
use crate::metamanage::process_result::BrokerProcessResult;
use crate::metamanage::process_result::ProcessResult;
use crate::metamanage::runtime_topic_table::RuntimeTopicTable;
use crate::metamanage::status_checker::MasterGroupStatusCache;
use crate::metamanage::status_checker::StoreStatusChecker;
use crate::metastore::meta_store_service::MasterGroupStatus;
use crate::metastore::meta_store_service::MetaStoreService;
use crate::nodebroker::broker_sync_state::BrokerSyncState;
use crate::nodebroker::broker_sync_state::ConfigSnapshot;
use crate::nodebroker::broker_sync_state::SyncPhase;
use crate::nodebroker::heartbeat::BrokerHeartbeat;
use crate::nodebroker::heartbeat::HeartbeatResponse;
use crate::nodebroker::heartbeat::TopicInfo;
use crate::nodebroker::sync_state_table::SharedSyncState;
use crate::nodebroker::sync_state_table::SyncStateTable;

/// Owner of the authoritative metadata and of every broker's sync state.
///
/// All methods take `&self`; the manager is shared behind an `Arc` by the
/// heartbeat handlers, administrative handlers and the status poller.
pub struct MetaDataManager {
    config: Arc<MasterConfig>,
    pub(crate) store: Arc<dyn MetaStoreService>,
    broker_index: BrokerSummaryIndex,
    pub(crate) sync_states: SyncStateTable,
    broker_op_locks: DashMap<i32, Arc<Mutex<()>>>,
    run_topic_table: RuntimeTopicTable,
    group_status: Arc<MasterGroupStatusCache>,
    status_checker: StoreStatusChecker,
    started: AtomicBool,
    stopped: AtomicBool,
}

impl MetaDataManager {
    pub fn new(config: MasterConfig, store: Arc<dyn MetaStoreService>) -> Self {
        let group_status = Arc::new(MasterGroupStatusCache::default());
        StoreStatusChecker::check_once(store.as_ref(), &group_status);
        let status_checker = StoreStatusChecker::new(
            Arc::clone(&store),
            Arc::clone(&group_status),
            Duration::from_millis(config.rep_status_check_interval_ms),
        );
        Self {
            config: Arc::new(config),
            store,
            broker_index: BrokerSummaryIndex::new(),
            sync_states: SyncStateTable::new(),
            broker_op_locks: DashMap::new(),
            run_topic_table: RuntimeTopicTable::new(),
            group_status,
            status_checker,
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Starts the store, loads the broker indexes and sync states, then
    /// launches the status poller. Must run inside a tokio runtime.
    pub fn start(&self) -> MetaResult<()> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.store.start()?;
        self.reload_broker_sync_states();
        self.status_checker.start();
        info!(
            "meta data manager started, brokers={}, node={}",
            self.sync_states.len(),
            self.config.node_host
        );
        Ok(())
    }

    pub fn stop(&self) -> MetaResult<()> {
        if !self.started.load(Ordering::Acquire) || self.stopped.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.status_checker.stop();
        self.store.stop()?;
        info!("meta data manager stopped");
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire) && !self.stopped.load(Ordering::Acquire)
    }

    pub fn is_status_checker_running(&self) -> bool {
        self.status_checker.is_running()
    }

    // ----------------------------------------------------------------------
    // master role
    // ----------------------------------------------------------------------

    pub fn is_self_master(&self) -> bool {
        self.group_status.get().is_master
    }

    pub fn is_primary_node_active(&self) -> bool {
        self.store.is_primary_node_active()
    }

    /// Hands the master role back when the primary node is down and this
    /// node took over. Does nothing otherwise.
    pub fn transfer_master(&self) -> MetaResult<()> {
        if self.store.is_master_now() && !self.store.is_primary_node_active() {
            self.store.transfer_master()?;
            info!("transfer master role finished");
        }
        Ok(())
    }

    pub fn master_group_status(&self) -> MasterGroupStatus {
        self.group_status.get()
    }

    /// Fails fast when the local node cannot accept metadata writes.
    pub(crate) fn check_writable(&self) -> MetaResult<()> {
        let status = self.group_status.get();
        if !status.is_master {
            return Err(MetaError::unavailable(
                "Current node is not the active master, please retry on the master!",
            ));
        }
        if !status.is_writable {
            return Err(MetaError::unavailable("Current master node is not writable, please try later!"));
        }
        self.store.check_store_status(true)
    }

    // ----------------------------------------------------------------------
    // broker configure
    // ----------------------------------------------------------------------

    /// Adds a broker whose id and ip are both unused.
    pub fn add_broker_config(&self, ctx: &OpContext, mut entity: BrokerConfig) -> MetaResult<BrokerConfig> {
        let result: MetaResult<BrokerConfig> = (|| {
            self.check_writable()?;
            if self.store.get_broker_config(entity.broker_id).is_some() {
                return Err(MetaError::already_exists(format!(
                    "Duplicated broker configure record by brokerId={}",
                    entity.broker_id
                )));
            }
            if let Some(other) = self.store.get_broker_config_by_ip(entity.broker_ip.as_str()) {
                return Err(MetaError::already_exists(format!(
                    "Duplicated broker configure record by brokerIp={}, used by brokerId={}",
                    entity.broker_ip, other.broker_id
                )));
            }
            entity.base.touch(ctx.operator.clone(), 0);
            entity.base.create_user = ctx.operator.clone();
            let stored = self.store.add_broker_config(entity)?;
            self.update_broker_maps(&stored);
            if stored.manage_status.is_applied() {
                self.get_or_create_sync_state(&stored);
            }
            Ok(stored)
        })();
        log_result("add broker configure", &result);
        result
    }

    /// Changes a broker's address, placement or default topic properties.
    ///
    /// The manage status moves only through [`Self::set_broker_manage_status`].
    pub fn modify_broker_config(&self, ctx: &OpContext, mut entity: BrokerConfig) -> MetaResult<BrokerConfig> {
        let result: MetaResult<BrokerConfig> = (|| {
            self.check_writable()?;
            let Some(current) = self.store.get_broker_config(entity.broker_id) else {
                return Err(MetaError::not_exist(format!(
                    "Not found broker configure by brokerId={}",
                    entity.broker_id
                )));
            };
            if entity.manage_status != current.manage_status {
                return Err(MetaError::illegal_value(format!(
                    "Manage status of brokerId={} can only be changed by the manage status operation",
                    entity.broker_id
                )));
            }
            if let Some(other) = self.store.get_broker_config_by_ip(entity.broker_ip.as_str()) {
                if other.broker_id != entity.broker_id {
                    return Err(MetaError::already_exists(format!(
                        "Duplicated broker configure record by brokerIp={}, used by brokerId={}",
                        entity.broker_ip, other.broker_id
                    )));
                }
            }
            let read_version = ctx.check_entity_version(
                entity.base.data_version,
                current.base.data_version,
                &format!("brokerId={}", entity.broker_id),
            )?;
            entity.conf_data_updated = current.conf_data_updated;
            entity.broker_loaded = current.broker_loaded;
            if entity.same_content(&current) {
                return Err(MetaError::unchanged(format!(
                    "Data not changed for brokerId={}",
                    entity.broker_id
                )));
            }
            entity.base.touch(ctx.operator.clone(), read_version);
            let stored = self.store.update_broker_config(entity)?;
            self.update_broker_maps(&stored);
            self.refresh_broker_desired(stored.broker_id);
            Ok(stored)
        })();
        log_result("modify broker configure", &result);
        result
    }

    /// Moves a broker to a new manage status and triggers its sync.
    ///
    /// The broker's sync lock is held across the store write so that an
    /// online switch rejected as in flight leaves the stored status intact.
    pub fn set_broker_manage_status(
        &self,
        ctx: &OpContext,
        broker_id: i32,
        new_status: ManageStatus,
        request_fast_start: bool,
    ) -> MetaResult<BrokerConfig> {
        let result: MetaResult<BrokerConfig> = (|| {
            self.check_writable()?;
            if !new_status.is_applied() {
                return Err(MetaError::illegal_value(format!(
                    "Manage status {} cannot be set by an administrator",
                    new_status
                )));
            }
            let Some(current) = self.store.get_broker_config(broker_id) else {
                return Err(MetaError::not_exist(format!(
                    "Not found broker configure by brokerId={broker_id}"
                )));
            };
            if current.manage_status == new_status {
                return Err(MetaError::unchanged(format!(
                    "Broker manage status of brokerId={} is already {}",
                    broker_id, new_status
                )));
            }
            if new_status == ManageStatus::Offline && !current.manage_status.is_online_variant() {
                return Err(MetaError::illegal_status(format!(
                    "Broker manage status is {}, only online brokers can be set offline! brokerId={}",
                    current.manage_status, broker_id
                )));
            }
            let read_version = ctx.require_version(current.base.data_version, &format!("brokerId={broker_id}"))?;
            let state = self.get_or_create_sync_state(&current);
            let mut guard = state.lock();
            if new_status.is_online_variant() && guard.is_transition_in_flight() {
                return Err(in_flight_error(&guard));
            }
            let mut entity = current.clone().with_manage_status(new_status);
            entity.base.touch(ctx.operator.clone(), read_version);
            let stored = self.store.update_broker_config(entity)?;
            self.apply_sync_trigger(&mut guard, &stored, current.manage_status, request_fast_start)?;
            Ok(stored)
        })();
        log_result("set broker manage status", &result);
        result
    }

    /// Bulk form of [`Self::set_broker_manage_status`], one result per broker.
    pub fn set_brokers_manage_status(
        &self,
        ctx: &OpContext,
        broker_ids: &[i32],
        new_status: ManageStatus,
        request_fast_start: bool,
    ) -> Vec<BrokerProcessResult> {
        broker_ids
            .iter()
            .map(|broker_id| {
                let result = self.set_broker_manage_status(ctx, *broker_id, new_status, request_fast_start);
                let broker_ip = match &result {
                    Ok(entity) => entity.broker_ip.to_string(),
                    Err(_) => self
                        .store
                        .get_broker_config(*broker_id)
                        .map(|entity| entity.broker_ip.to_string())
                        .unwrap_or_default(),
                };
                BrokerProcessResult::new(*broker_id, broker_ip, ProcessResult::from_result(&result))
            })
            .collect()
    }

    /// Deletes a broker with no deployed topics that is not online.
    ///
    /// Holds the broker's operation lock so no topic can be deployed on it
    /// between the check and the delete.
    pub fn delete_broker_config(&self, ctx: &OpContext, broker_id: i32) -> MetaResult<BrokerConfig> {
        let result: MetaResult<BrokerConfig> = (|| {
            self.check_writable()?;
            let op_lock = self.broker_op_lock(broker_id);
            let _op_guard = op_lock.lock();
            let deployed = self
                .store
                .query_topic_deployments(&|deploy| deploy.broker_id == broker_id);
            if !deployed.is_empty() {
                return Err(MetaError::illegal_status(format!(
                    "The broker's topic configure uncleaned! brokerId={}, topics={}",
                    broker_id,
                    deployed.len()
                )));
            }
            let Some(current) = self.store.get_broker_config(broker_id) else {
                return Err(MetaError::not_exist(format!(
                    "Not found broker configure by brokerId={broker_id}"
                )));
            };
            if current.manage_status.is_online_variant() {
                return Err(MetaError::illegal_status(format!(
                    "Broker manage status is online, please offline first! brokerId={broker_id}"
                )));
            }
            if let Some(state) = self.sync_states.get(broker_id) {
                let state = state.lock();
                if state.is_registered()
                    && current.manage_status == ManageStatus::Offline
                    && state.phase() == SyncPhase::ProcessingOffline
                {
                    return Err(MetaError::illegal_status(format!(
                        "Broker is processing offline event, please wait and try later! brokerId={broker_id}"
                    )));
                }
            }
            let removed = self.store.delete_broker_config(broker_id)?;
            self.del_broker_run_data(broker_id);
            info!("[Broker Delete] operator={} removed brokerId={}", ctx.operator, broker_id);
            Ok(removed)
        })();
        log_result("delete broker configure", &result);
        result
    }

    pub fn get_broker_config(&self, broker_id: i32) -> Option<BrokerConfig> {
        self.store.get_broker_config(broker_id)
    }

    pub fn get_broker_config_by_ip(&self, broker_ip: &str) -> Option<BrokerConfig> {
        self.store.get_broker_config_by_ip(broker_ip)
    }

    /// Brokers matching every non-empty id/ip list and the filter.
    pub fn query_broker_configs(
        &self,
        broker_ids: &[i32],
        broker_ips: &[&str],
        filter: &dyn Fn(&BrokerConfig) -> bool,
    ) -> BTreeMap<i32, BrokerConfig> {
        self.store.query_broker_configs(&|broker| {
            (broker_ids.is_empty() || broker_ids.contains(&broker.broker_id))
                && (broker_ips.is_empty() || broker_ips.contains(&broker.broker_ip.as_str()))
                && filter(broker)
        })
    }

    /// Lock serializing structural changes of one broker: its deletion and
    /// the deployment of topics on it.
    pub(crate) fn broker_op_lock(&self, broker_id: i32) -> Arc<Mutex<()>> {
        Arc::clone(self.broker_op_locks.entry(broker_id).or_default().value())
    }

    pub fn update_broker_maps(&self, entity: &BrokerConfig) -> bool {
        self.broker_index.update(entity)
    }

    /// Drops every in-memory trace of a broker.
    pub fn del_broker_run_data(&self, broker_id: i32) {
        self.broker_index.remove(broker_id);
        self.sync_states.remove(broker_id);
        self.run_topic_table.remove(broker_id);
    }

    pub fn get_brokers_map(&self, over_tls: bool) -> BTreeMap<i32, CheetahString> {
        self.broker_index.get_brokers_map(over_tls)
    }

    pub fn get_broker_info_checksum(&self) -> i64 {
        self.broker_index.checksum()
    }

    // ----------------------------------------------------------------------
    // broker synchronization
    // ----------------------------------------------------------------------

    /// Reacts to a manage status change of a broker from `previous_status`,
    /// working on the broker as currently stored.
    ///
    /// A switch to an online status is rejected while an earlier transition
    /// of the broker is unresolved; a switch to any other status always wins.
    pub fn trigger_broker_sync(
        &self,
        broker_id: i32,
        previous_status: ManageStatus,
        request_fast_start: bool,
    ) -> MetaResult<()> {
        let result: MetaResult<()> = (|| {
            self.check_writable()?;
            let Some(current) = self.store.get_broker_config(broker_id) else {
                return Err(MetaError::not_exist(format!(
                    "Not found broker configure by brokerId={broker_id}"
                )));
            };
            let state = self.get_or_create_sync_state(&current);
            let mut guard = state.lock();
            // the record may have moved on while waiting for the lock
            let current = self.store.get_broker_config(broker_id).unwrap_or(current);
            self.apply_sync_trigger(&mut guard, &current, previous_status, request_fast_start)
        })();
        if let Err(e) = &result {
            warn!("[Broker Sync] trigger brokerId={} rejected: {}", broker_id, e);
        }
        result
    }

    fn apply_sync_trigger(
        &self,
        state: &mut BrokerSyncState,
        entity: &BrokerConfig,
        previous_status: ManageStatus,
        request_fast_start: bool,
    ) -> MetaResult<()> {
        let snapshot = self.build_config_snapshot(entity);
        if entity.manage_status.is_online_variant() {
            state.trigger_online(entity.manage_status, snapshot, request_fast_start)?;
        } else {
            state.trigger_offline(entity.manage_status, snapshot);
        }
        state.update_address(entity);
        info!(
            "[Broker Sync] brokerId={} manage status {} -> {}, state={}",
            entity.broker_id,
            previous_status,
            entity.manage_status,
            state.to_json()
        );
        Ok(())
    }

    /// Records a broker's acknowledgment of the configuration it was given.
    ///
    /// `conf_changed` means the broker holds configuration it has not loaded
    /// yet; otherwise it reports the configuration as loaded. Only approved
    /// brokers have a sync state to advance.
    pub fn update_broker_conf_ack_state(
        &self,
        broker_id: i32,
        conf_changed: bool,
        fast_start_requested: bool,
    ) -> MetaResult<()> {
        let Some(current) = self.store.get_broker_config(broker_id) else {
            return Err(MetaError::not_exist(format!(
                "Not found broker configure by brokerId={broker_id}"
            )));
        };
        let flags_stale = if conf_changed {
            !current.conf_data_updated || current.broker_loaded
        } else {
            current.conf_data_updated || !current.broker_loaded
        };
        if flags_stale {
            self.check_writable()?;
            let mut entity = current.clone();
            if conf_changed {
                entity.mark_conf_data_updated();
            } else {
                entity.mark_broker_loaded();
            }
            let ctx = OpContext::system();
            entity.base.touch(ctx.operator, current.base.data_version);
            self.store.update_broker_config(entity)?;
        }
        if !current.manage_status.is_applied() {
            return Ok(());
        }
        let state = self.get_or_create_sync_state(&current);
        let mut state = state.lock();
        if conf_changed {
            state.on_conf_changed(fast_start_requested);
        } else {
            state.on_conf_loaded(fast_start_requested);
        }
        Ok(())
    }

    /// Rebuilds the broker maps and one fresh sync state per approved broker.
    pub fn reload_broker_sync_states(&self) {
        let brokers = self.store.query_broker_configs(&|_| true);
        for broker in brokers.values() {
            self.update_broker_maps(broker);
            if broker.manage_status.is_applied() {
                let snapshot = self.build_config_snapshot(broker);
                self.sync_states
                    .insert(broker.broker_id, BrokerSyncState::new(broker, snapshot));
            } else {
                self.sync_states.remove(broker.broker_id);
            }
        }
        info!("[Broker Sync] loaded sync states of {} brokers", self.sync_states.len());
    }

    /// Forgets what a broker reported, keeping its sync flags.
    pub fn reset_broker_report_info(&self, broker_id: i32) -> bool {
        self.run_topic_table.remove(broker_id);
        match self.sync_states.get(broker_id) {
            Some(state) => {
                state.lock().reset_report();
                true
            }
            None => false,
        }
    }

    pub fn clear_broker_sync_data(&self) {
        self.sync_states.clear();
        self.run_topic_table.clear();
    }

    pub fn get_broker_sync_state(&self, broker_id: i32) -> Option<BrokerSyncState> {
        self.sync_states.get(broker_id).map(|state| state.lock().clone())
    }

    pub(crate) fn get_or_create_sync_state(&self, broker: &BrokerConfig) -> SharedSyncState {
        self.sync_states.get_or_insert_with(broker.broker_id, || {
            BrokerSyncState::new(broker, self.build_config_snapshot(broker))
        })
    }

    /// Recomputes the desired configuration of one broker after its address,
    /// topics or defaults changed.
    ///
    /// The snapshot is read from the store while the broker's lock is held,
    /// so the last refresh to run always installs the latest stored state.
    pub(crate) fn refresh_broker_desired(&self, broker_id: i32) {
        let Some(state) = self.sync_states.get(broker_id) else {
            return;
        };
        let mut state = state.lock();
        let Some(broker) = self.store.get_broker_config(broker_id) else {
            return;
        };
        state.update_address(&broker);
        let snapshot = self.build_config_snapshot(&broker);
        if state.refresh_desired(snapshot) {
            info!(
                "[Broker Sync] desired configure of brokerId={} changed, confVersion={}",
                broker_id,
                state.conf_version()
            );
        }
    }

    pub(crate) fn refresh_all_broker_desired(&self) {
        for broker_id in self.sync_states.broker_ids() {
            self.refresh_broker_desired(broker_id);
        }
    }

    pub(crate) fn build_config_snapshot(&self, broker: &BrokerConfig) -> ConfigSnapshot {
        ConfigSnapshot::new(broker.broker_default_conf(), self.get_broker_topic_conf_lines(broker))
    }

    /// Config lines of the broker's active topics.
    pub fn get_broker_topic_conf_lines(&self, broker: &BrokerConfig) -> Vec<String> {
        self.encode_topic_lines(broker, |deploy| !deploy.is_in_removing())
    }

    /// Config lines of the broker's topics in the removing flow.
    pub fn get_broker_removed_topic_conf_lines(&self, broker: &BrokerConfig) -> Vec<String> {
        self.encode_topic_lines(broker, |deploy| deploy.is_in_removing())
    }

    fn encode_topic_lines(&self, broker: &BrokerConfig, select: impl Fn(&TopicDeployment) -> bool) -> Vec<String> {
        let def_max_msg_size_in_b = self.cluster_defaults().max_msg_size_in_b();
        let broker_id = broker.broker_id;
        self.store
            .query_topic_deployments(&|deploy| deploy.broker_id == broker_id && select(deploy))
            .values()
            .map(|deploy| {
                let max_msg_size_in_b = self
                    .store
                    .get_topic_control(deploy.topic_name.as_str())
                    .and_then(|ctrl| ctrl.max_msg_size_in_b())
                    .unwrap_or(def_max_msg_size_in_b);
                deploy
                    .to_conf_line(max_msg_size_in_b)
                    .encode(&broker.topic_props, def_max_msg_size_in_b)
            })
            .collect()
    }

    /// Stored cluster defaults, or the built-in ones when none are stored.
    pub(crate) fn cluster_defaults(&self) -> ClusterDefaults {
        self.store.get_cluster_defaults().unwrap_or_default()
    }

    // ----------------------------------------------------------------------
    // broker runtime reports
    // ----------------------------------------------------------------------

    /// Handles one broker heartbeat and returns the directive for it.
    pub fn report_broker_heartbeat(&self, heartbeat: BrokerHeartbeat) -> MetaResult<HeartbeatResponse> {
        let broker_id = heartbeat.broker_id;
        let Some(broker) = self.store.get_broker_config(broker_id) else {
            return Err(MetaError::not_exist(format!(
                "Not found broker configure by brokerId={broker_id}, please create it first!"
            )));
        };
        if !broker.manage_status.is_applied() {
            return Err(MetaError::illegal_status(format!(
                "The broker's manage status is {}, not approved! brokerId={}",
                broker.manage_status, broker_id
            )));
        }
        if heartbeat.carries_ack() {
            self.update_broker_conf_ack_state(broker_id, heartbeat.conf_changed, heartbeat.fast_start_requested)?;
        }
        let reported = ConfigSnapshot::new(heartbeat.broker_default_conf, heartbeat.topic_conf_lines);
        let response = {
            let state = self.get_or_create_sync_state(&broker);
            let mut state = state.lock();
            state.on_heartbeat(heartbeat.manage_status, reported)
        };
        let topics = heartbeat
            .topic_infos
            .into_iter()
            .map(|info| (info.topic_name.clone(), info))
            .collect();
        self.update_broker_run_topic_info(broker_id, topics);
        Ok(response)
    }

    pub fn update_broker_run_topic_info(&self, broker_id: i32, topics: HashMap<TopicName, TopicInfo>) {
        self.run_topic_table.update(broker_id, topics);
    }

    pub fn get_broker_run_topic_info(&self, broker_id: i32) -> Option<HashMap<TopicName, TopicInfo>> {
        self.run_topic_table.get(broker_id)
    }

    pub fn remove_broker_run_topic_info(&self, broker_id: i32) -> Option<HashMap<TopicName, TopicInfo>> {
        self.run_topic_table.remove(broker_id)
    }
}

fn in_flight_error(state: &BrokerSyncState) -> MetaError {
    MetaError::illegal_status(format!(
        "The broker is processing {} event(brokerId={}), please try later!",
        if state.phase() == SyncPhase::ProcessingOnline {
            "online"
        } else {
            "offline"
        },
        state.broker_id()
    ))
}

pub(crate) fn log_result<T: std::fmt::Debug>(operation: &str, result: &MetaResult<T>) {
    match result {
        Ok(entity) => info!("[Meta Data] {} success: {:?}", operation, entity),
        Err(e) if e.is_unchanged() => info!("[Meta Data] {} unchanged: {}", operation, e),
        Err(e) => warn!("[Meta Data] {} failed: {}", operation, e),
    }
}
