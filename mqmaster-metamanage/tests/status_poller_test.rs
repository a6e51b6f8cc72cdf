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
use std::time::Duration;

use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::manage_status::ManageStatus;
use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_error::ErrorCode;
use mqmaster_metamanage::metamanage::op_context::OpContext;
use mqmaster_metamanage::MemoryMetaStore;
use mqmaster_metamanage::MetaDataManager;

fn fast_poll_config() -> MasterConfig {
    MasterConfig {
        rep_status_check_interval_ms: 20,
        ..MasterConfig::default()
    }
}

#[tokio::test]
async fn test_poller_mirrors_store_reachability() {
    let store = Arc::new(MemoryMetaStore::new());
    let manager = MetaDataManager::new(fast_poll_config(), store.clone());
    manager.start().unwrap();
    assert!(manager.is_status_checker_running());
    assert!(manager.master_group_status().is_writable);

    store.set_reachable(false);
    tokio::time::sleep(Duration::from_millis(100)).await;
    let status = manager.master_group_status();
    assert!(!status.is_master);
    assert!(!status.is_writable);
    let err = manager
        .add_broker_config(
            &OpContext::new("admin"),
            BrokerConfig::new(BaseEntity::new("admin"), 1, "10.4.0.1"),
        )
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unavailable);

    store.set_reachable(true);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(manager.master_group_status().is_master);
    manager
        .add_broker_config(
            &OpContext::new("admin"),
            BrokerConfig::new(BaseEntity::new("admin"), 1, "10.4.0.1"),
        )
        .unwrap();

    manager.stop().unwrap();
}

#[tokio::test]
async fn test_stop_halts_polling() {
    let store = Arc::new(MemoryMetaStore::new());
    let manager = MetaDataManager::new(fast_poll_config(), store.clone());
    manager.start().unwrap();
    manager.stop().unwrap();
    assert!(!manager.is_status_checker_running());
    assert!(!manager.is_started());

    // no tick may observe the change once stopped
    store.set_master(false);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(manager.master_group_status().is_master);
}

#[tokio::test]
async fn test_start_reloads_sync_states() {
    let store = Arc::new(MemoryMetaStore::new());
    let manager = MetaDataManager::new(fast_poll_config(), store.clone());
    let ctx = OpContext::new("admin");
    manager
        .add_broker_config(
            &ctx,
            BrokerConfig::new(BaseEntity::new("admin"), 2, "10.4.0.2")
                .with_manage_status(ManageStatus::Offline),
        )
        .unwrap();
    manager.clear_broker_sync_data();
    assert!(manager.get_broker_sync_state(2).is_none());

    manager.start().unwrap();
    assert!(manager.get_broker_sync_state(2).is_some());
    assert_eq!(manager.get_brokers_map(false).len(), 1);
    manager.stop().unwrap();
}
