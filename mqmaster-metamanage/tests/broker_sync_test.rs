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

use std::sync::Arc;
use std::thread;

use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::manage_status::ManageStatus;
use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_common::common::topic_prop_group::TopicPropUpdate;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;
use mqmaster_metamanage::metamanage::op_context::OpContext;
use mqmaster_metamanage::nodebroker::broker_sync_state::ConfigSnapshot;
use mqmaster_metamanage::nodebroker::heartbeat::BrokerHeartbeat;
use mqmaster_metamanage::nodebroker::heartbeat::TopicInfo;
use mqmaster_metamanage::MemoryMetaStore;
use mqmaster_metamanage::MetaDataManager;
use mqmaster_metamanage::SyncPhase;

fn new_manager() -> MetaDataManager {
    MetaDataManager::new(MasterConfig::default(), Arc::new(MemoryMetaStore::new()))
}

fn online_broker(broker_id: i32, broker_ip: &str) -> BrokerConfig {
    BrokerConfig::new(BaseEntity::new("admin"), broker_id, broker_ip).with_manage_status(ManageStatus::Online)
}

/// Context carrying the broker's currently stored version.
fn read_ctx(manager: &MetaDataManager, broker_id: i32) -> OpContext {
    let version = manager.get_broker_config(broker_id).unwrap().base.data_version;
    OpContext::new("admin").with_data_version(version)
}

/// Heartbeat of a broker running exactly the configuration the master wants.
fn matching_heartbeat(manager: &MetaDataManager, broker_id: i32, status: ManageStatus) -> BrokerHeartbeat {
    let state = manager.get_broker_sync_state(broker_id).unwrap();
    BrokerHeartbeat::new(broker_id, status).with_config(
        state.desired().broker_default_conf(),
        state.desired().topic_conf_lines().to_vec(),
    )
}

#[test]
fn test_fast_start_not_restored_after_topic_deploy() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    manager.add_broker_config(&ctx, online_broker(5, "10.2.0.5")).unwrap();
    manager.clear_broker_sync_data();
    manager.reload_broker_sync_states();
    assert!(manager.get_broker_sync_state(5).unwrap().is_fast_start_eligible());

    let results = manager.add_topic_deploy_info(&ctx, &[5], &["payments"], &TopicPropUpdate::default());
    assert!(results[0].is_success());
    assert!(!manager.get_broker_sync_state(5).unwrap().is_fast_start_eligible());

    manager.clear_broker_sync_data();
    manager.reload_broker_sync_states();
    let state = manager.get_broker_sync_state(5).unwrap();
    assert!(!state.is_fast_start_eligible());
    assert!(state.desired().has_topics());
}

#[test]
fn test_second_online_trigger_rejected_while_in_flight() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    manager
        .add_broker_config(&ctx, BrokerConfig::new(BaseEntity::new("admin"), 8, "10.2.0.8"))
        .unwrap();
    assert!(manager.get_broker_sync_state(8).is_none());

    manager
        .set_broker_manage_status(&read_ctx(&manager, 8), 8, ManageStatus::Online, false)
        .unwrap();
    assert_eq!(manager.get_broker_sync_state(8).unwrap().phase(), SyncPhase::ProcessingOnline);

    let err = manager
        .set_broker_manage_status(&read_ctx(&manager, 8), 8, ManageStatus::OnlineNotWrite, false)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalStatus);
    assert!(err.detail().contains("processing online"));
    assert_eq!(manager.get_broker_config(8).unwrap().manage_status, ManageStatus::Online);

    let response = manager
        .report_broker_heartbeat(matching_heartbeat(&manager, 8, ManageStatus::Online))
        .unwrap();
    assert!(!response.requires_reload());
    assert_eq!(manager.get_broker_sync_state(8).unwrap().phase(), SyncPhase::Synced);

    manager
        .set_broker_manage_status(&read_ctx(&manager, 8), 8, ManageStatus::OnlineNotWrite, false)
        .unwrap();
}

#[test]
fn test_offline_trigger_overrides_pending_online() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    manager
        .add_broker_config(&ctx, BrokerConfig::new(BaseEntity::new("admin"), 9, "10.2.0.9"))
        .unwrap();
    manager
        .set_broker_manage_status(&read_ctx(&manager, 9), 9, ManageStatus::Online, false)
        .unwrap();
    manager
        .set_broker_manage_status(&read_ctx(&manager, 9), 9, ManageStatus::Offline, false)
        .unwrap();
    assert_eq!(manager.get_broker_sync_state(9).unwrap().phase(), SyncPhase::Offline);

    // the broker has not noticed yet
    manager
        .report_broker_heartbeat(matching_heartbeat(&manager, 9, ManageStatus::Online))
        .unwrap();
    assert_eq!(manager.get_broker_sync_state(9).unwrap().phase(), SyncPhase::ProcessingOffline);
    let err = manager.delete_broker_config(&ctx, 9).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalStatus);

    manager
        .report_broker_heartbeat(matching_heartbeat(&manager, 9, ManageStatus::Offline))
        .unwrap();
    assert_eq!(manager.get_broker_sync_state(9).unwrap().phase(), SyncPhase::Offline);
    manager.delete_broker_config(&ctx, 9).unwrap();
}

#[test]
fn test_heartbeat_pushes_config_until_loaded() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    manager.add_broker_config(&ctx, online_broker(10, "10.2.0.10")).unwrap();

    let first = manager
        .report_broker_heartbeat(BrokerHeartbeat::new(10, ManageStatus::Online))
        .unwrap();
    assert!(first.requires_reload());
    assert_eq!(manager.get_broker_sync_state(10).unwrap().phase(), SyncPhase::Registering);

    manager
        .report_broker_heartbeat(matching_heartbeat(&manager, 10, ManageStatus::Online))
        .unwrap();
    let synced = manager.get_broker_sync_state(10).unwrap();
    assert_eq!(synced.phase(), SyncPhase::Synced);
    let version_before = synced.conf_version();

    let stale = matching_heartbeat(&manager, 10, ManageStatus::Online);
    manager.add_topic_deploy_info(&ctx, &[10], &["audit"], &TopicPropUpdate::default());
    let state = manager.get_broker_sync_state(10).unwrap();
    assert_eq!(state.phase(), SyncPhase::PendingPush);
    assert_eq!(state.conf_version(), version_before + 1);

    let pushed = manager.report_broker_heartbeat(stale).unwrap();
    let payload = pushed.conf_payload.unwrap();
    assert_eq!(payload.topic_conf_lines.len(), 1);
    assert!(payload.topic_conf_lines[0].starts_with("audit:"));

    let loaded = matching_heartbeat(&manager, 10, ManageStatus::Online).with_ack(false, true, true);
    let response = manager.report_broker_heartbeat(loaded).unwrap();
    assert!(!response.requires_reload());
    assert!(response.fast_start);
    let state = manager.get_broker_sync_state(10).unwrap();
    assert_eq!(state.phase(), SyncPhase::Synced);
    assert!(state.is_conf_loaded());
    assert!(manager.get_broker_config(10).unwrap().broker_loaded);
}

#[test]
fn test_changed_ack_only_lowers_fast_start() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    manager.add_broker_config(&ctx, online_broker(11, "10.2.0.11")).unwrap();
    assert!(manager.get_broker_sync_state(11).unwrap().is_fast_start_eligible());

    manager.update_broker_conf_ack_state(11, true, false).unwrap();
    let state = manager.get_broker_sync_state(11).unwrap();
    assert!(state.is_conf_changed());
    assert!(!state.is_fast_start_eligible());
    assert!(manager.get_broker_config(11).unwrap().conf_data_updated);

    manager.update_broker_conf_ack_state(11, true, true).unwrap();
    assert!(!manager.get_broker_sync_state(11).unwrap().is_fast_start_eligible());

    let err = manager.update_broker_conf_ack_state(99, false, true).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotExist);
}

#[test]
fn test_heartbeat_rejected_for_unknown_or_pending_broker() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    let err = manager
        .report_broker_heartbeat(BrokerHeartbeat::new(20, ManageStatus::Online))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotExist);

    manager
        .add_broker_config(&ctx, BrokerConfig::new(BaseEntity::new("admin"), 20, "10.2.0.20"))
        .unwrap();
    let err = manager
        .report_broker_heartbeat(BrokerHeartbeat::new(20, ManageStatus::Online))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalStatus);
}

#[test]
fn test_runtime_topics_replaced_and_reset() {
    let manager = new_manager();
    let ctx = OpContext::new("admin");
    manager.add_broker_config(&ctx, online_broker(12, "10.2.0.12")).unwrap();

    let heartbeat = BrokerHeartbeat::new(12, ManageStatus::Online).with_topic_infos(vec![
        TopicInfo::new(12, "orders", 3, 1),
        TopicInfo::new(12, "audit", 1, 1),
    ]);
    manager.report_broker_heartbeat(heartbeat).unwrap();
    assert_eq!(manager.get_broker_run_topic_info(12).unwrap().len(), 2);

    let heartbeat =
        BrokerHeartbeat::new(12, ManageStatus::Online).with_topic_infos(vec![TopicInfo::new(12, "orders", 3, 1)]);
    manager.report_broker_heartbeat(heartbeat).unwrap();
    let topics = manager.get_broker_run_topic_info(12).unwrap();
    assert_eq!(topics.len(), 1);
    assert!(topics.contains_key(&TopicName::from("orders")));

    assert!(manager.reset_broker_report_info(12));
    assert!(manager.get_broker_run_topic_info(12).is_none());
    let state = manager.get_broker_sync_state(12).unwrap();
    assert!(!state.is_registered());
    assert_eq!(state.phase(), SyncPhase::Unregistered);
    assert!(!manager.reset_broker_report_info(77));
}

/// Desired configuration rebuilt from what is stored right now.
fn stored_snapshot(manager: &MetaDataManager, broker_id: i32) -> ConfigSnapshot {
    let broker = manager.get_broker_config(broker_id).unwrap();
    ConfigSnapshot::new(broker.broker_default_conf(), manager.get_broker_topic_conf_lines(&broker))
}

#[test]
fn test_concurrent_topic_edits_keep_desired_config_current() {
    let manager = Arc::new(new_manager());
    let ctx = OpContext::new("admin");
    manager.add_broker_config(&ctx, online_broker(13, "10.2.0.13")).unwrap();
    let topics = ["t0", "t1", "t2", "t3"];
    let results = manager.add_topic_deploy_info(&ctx, &[13], &topics, &TopicPropUpdate::default());
    assert!(results.iter().all(|result| result.is_success()));

    for round in 0..100 {
        let handles: Vec<_> = topics
            .into_iter()
            .map(|topic| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    let version = manager.get_topic_deploy(13, topic).unwrap().base.data_version;
                    let ctx = OpContext::new("admin").with_data_version(version);
                    let update = TopicPropUpdate::default().with_num_partitions(round + 4);
                    manager.modify_topic_deploy_info(&ctx, &[13], &[topic], &update)[0].is_success()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
        let state = manager.get_broker_sync_state(13).unwrap();
        assert_eq!(
            state.desired().checksum(),
            stored_snapshot(&manager, 13).checksum(),
            "desired configure lost an edit in round {round}"
        );
    }
}

#[test]
fn test_broker_edit_racing_topic_edits_keeps_desired_config_current() {
    let manager = Arc::new(new_manager());
    let ctx = OpContext::new("admin");
    manager.add_broker_config(&ctx, online_broker(14, "10.2.0.14")).unwrap();
    manager.add_topic_deploy_info(&ctx, &[14], &["orders"], &TopicPropUpdate::default());

    for round in 0..50 {
        let broker_edit = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let mut broker = manager.get_broker_config(14).unwrap();
                broker.topic_props.num_topic_stores = round + 2;
                manager.modify_broker_config(&OpContext::new("admin"), broker).is_ok()
            })
        };
        let topic_edit = {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let version = manager.get_topic_deploy(14, "orders").unwrap().base.data_version;
                let ctx = OpContext::new("admin").with_data_version(version);
                let update = TopicPropUpdate::default().with_num_partitions(round + 4);
                manager.modify_topic_deploy_info(&ctx, &[14], &["orders"], &update)[0].is_success()
            })
        };
        assert!(broker_edit.join().unwrap());
        assert!(topic_edit.join().unwrap());
        let state = manager.get_broker_sync_state(14).unwrap();
        assert_eq!(state.desired(), &stored_snapshot(&manager, 14), "round {round}");
    }
}
