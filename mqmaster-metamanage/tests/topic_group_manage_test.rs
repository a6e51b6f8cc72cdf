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

use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::entity::ClusterDefaults;
use mqmaster_common::common::entity::GroupConsumeControl;
use mqmaster_common::common::entity::GroupResourceControl;
use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_common::common::topic_prop_group::TopicPropUpdate;
use mqmaster_common::common::topic_status::TopicStatus;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;
use mqmaster_metamanage::metamanage::op_context::OpContext;
use mqmaster_metamanage::MemoryMetaStore;
use mqmaster_metamanage::MetaDataManager;

fn manager_with_brokers(broker_ids: &[i32]) -> MetaDataManager {
    let manager = MetaDataManager::new(MasterConfig::default(), Arc::new(MemoryMetaStore::new()));
    let ctx = OpContext::new("admin");
    for broker_id in broker_ids {
        manager
            .add_broker_config(
                &ctx,
                BrokerConfig::new(BaseEntity::new("admin"), *broker_id, format!("10.3.0.{broker_id}")),
            )
            .unwrap();
    }
    manager
}

/// Context carrying the deployment's currently stored version.
fn read_ctx(manager: &MetaDataManager, broker_id: i32, topic_name: &str) -> OpContext {
    let version = manager.get_topic_deploy(broker_id, topic_name).unwrap().base.data_version;
    OpContext::new("admin").with_data_version(version)
}

fn partitions(num_partitions: i32) -> TopicPropUpdate {
    TopicPropUpdate::default().with_num_partitions(num_partitions)
}

fn close_update() -> TopicPropUpdate {
    TopicPropUpdate::default()
        .with_accept_publish(false)
        .with_accept_subscribe(false)
}

#[test]
fn test_topic_decommission_flow() {
    let manager = manager_with_brokers(&[1, 2]);
    let ctx = OpContext::new("admin");
    let results = manager.add_topic_deploy_info(&ctx, &[1, 2], &["orders"], &TopicPropUpdate::default());
    assert!(results.iter().all(|result| result.is_success()));
    assert!(manager.get_topic_control("orders").is_some());

    let results = manager.soft_delete_topics(&ctx, &[1], &["orders"]);
    assert_eq!(results[0].result.code(), ErrorCode::IllegalStatus);

    manager.modify_topic_deploy_info(&read_ctx(&manager, 1, "orders"), &[1], &["orders"], &close_update());
    assert!(manager.soft_delete_topics(&read_ctx(&manager, 1, "orders"), &[1], &["orders"])[0].is_success());
    assert!(manager.soft_remove_topics(&read_ctx(&manager, 1, "orders"), &[1], &["orders"])[0].is_success());
    assert_eq!(
        manager.get_topic_deploy(1, "orders").unwrap().topic_status,
        TopicStatus::SoftRemove
    );

    let results = manager.restore_topics(&ctx, &[1], &["orders"]);
    assert_eq!(results[0].result.code(), ErrorCode::IllegalStatus);

    let err = manager.delete_topic_control(&ctx, "orders").unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalStatus);

    let cleared = manager.clear_removed_topic_conf(&ctx, 1, &["orders", "missing"]).unwrap();
    assert_eq!(cleared, vec![TopicName::from("orders")]);
    assert!(manager.get_topic_deploy(1, "orders").is_none());
    assert!(manager.get_topic_deploy(2, "orders").is_some());
}

#[test]
fn test_restore_soft_deleted_topic() {
    let manager = manager_with_brokers(&[3]);
    let ctx = OpContext::new("admin");
    manager.add_topic_deploy_info(&ctx, &[3], &["billing"], &close_update());
    let first_read = read_ctx(&manager, 3, "billing");
    assert!(manager.soft_delete_topics(&first_read, &[3], &["billing"])[0].is_success());

    let results = manager.modify_topic_deploy_info(&ctx, &[3], &["billing"], &partitions(9));
    assert_eq!(results[0].result.code(), ErrorCode::IllegalStatus);

    let stale = manager.restore_topics(&first_read, &[3], &["billing"]);
    assert_eq!(stale[0].result.code(), ErrorCode::IllegalStatus);
    assert!(manager.restore_topics(&read_ctx(&manager, 3, "billing"), &[3], &["billing"])[0].is_success());
    assert_eq!(
        manager.get_topic_deploy(3, "billing").unwrap().topic_status,
        TopicStatus::Normal
    );
}

#[test]
fn test_bulk_results_per_target() {
    let manager = manager_with_brokers(&[5]);
    let ctx = OpContext::new("admin");
    let results = manager.add_topic_deploy_info(&ctx, &[5, 50], &["a", "b"], &TopicPropUpdate::default());
    assert_eq!(results.len(), 4);
    assert!(results.iter().filter(|result| result.broker_id == 5).all(|result| result.is_success()));
    assert!(results
        .iter()
        .filter(|result| result.broker_id == 50)
        .all(|result| result.result.code() == ErrorCode::NotExist));

    let by_topic = manager.get_topic_broker_ids(&["a"]);
    assert_eq!(by_topic[&TopicName::from("a")].len(), 1);
    assert_eq!(manager.get_configured_topic_names().len(), 2);
    assert_eq!(manager.get_broker_topic_names(&[5])[&5].len(), 2);
}

#[test]
fn test_topic_max_msg_size_falls_back_to_cluster_default() {
    let manager = manager_with_brokers(&[]);
    let ctx = OpContext::new("admin");
    assert!(manager.get_cluster_defaults(true).is_none());
    assert_eq!(manager.get_topic_max_msg_size_mb("orders"), 1);

    let defaults = ClusterDefaults {
        max_msg_size_in_mb: 4,
        ..ClusterDefaults::default()
    };
    manager.add_or_update_cluster_defaults(&ctx, defaults).unwrap();
    assert_eq!(manager.get_topic_max_msg_size_mb("orders"), 4);

    let results = manager.add_or_update_topic_control(&ctx, &["orders"], Some(true), Some(8));
    assert!(results[0].is_success());
    assert_eq!(manager.get_topic_max_msg_size_mb("orders"), 8);

    let results = manager.add_or_update_topic_control(&ctx, &["orders"], None, Some(21));
    assert_eq!(results[0].result.code(), ErrorCode::IllegalValue);

    let mut invalid = manager.get_cluster_defaults(true).unwrap();
    invalid.max_msg_size_in_mb = 0;
    let err = manager.modify_cluster_defaults(&ctx, invalid).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalValue);
}

#[test]
fn test_group_resource_control_in_use_cannot_be_deleted() {
    let manager = manager_with_brokers(&[]);
    let ctx = OpContext::new("admin");
    manager
        .add_group_consume_control(&ctx, GroupConsumeControl::new(BaseEntity::new("admin"), "g1", "t1"))
        .unwrap();
    assert!(manager.get_group_resource_control("g1").is_some());
    assert!(manager.get_topic_control("t1").is_some());

    let results = manager.delete_group_resource_controls(&ctx, &["g1"]);
    assert_eq!(results[0].result.code(), ErrorCode::IllegalStatus);

    let results = manager.delete_group_consume_controls(&ctx, &["g1"], &[]);
    assert_eq!(results.len(), 1);
    assert!(results[0].is_success());
    assert!(manager.delete_group_resource_controls(&ctx, &["g1"])[0].is_success());
}

#[test]
fn test_group_resource_control_validation() {
    let manager = manager_with_brokers(&[]);
    let ctx = OpContext::new("admin");
    let mut entity = GroupResourceControl::with_defaults(BaseEntity::new("admin"), "g2");
    entity.qry_priority_id = 104;
    let err = manager.add_group_resource_control(&ctx, entity.clone()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalValue);

    entity.qry_priority_id = 203;
    manager.add_group_resource_control(&ctx, entity.clone()).unwrap();
    let err = manager.add_group_resource_control(&ctx, entity).unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyExists);
}

#[test]
fn test_blacklist_add_and_delete() {
    let manager = manager_with_brokers(&[]);
    let ctx = OpContext::new("admin");
    manager.add_group_blacklist(&ctx, "g3", Some("t1"), "abuse").unwrap();
    manager.add_group_blacklist(&ctx, "g3", None, "abuse").unwrap();
    assert_eq!(manager.get_group_blacklist("g3").len(), 2);
    assert_eq!(manager.get_blacklist_topics("g3").len(), 1);

    assert_eq!(manager.delete_group_blacklist(&ctx, None, None).unwrap(), 0);
    assert_eq!(manager.delete_group_blacklist(&ctx, Some("g3"), None).unwrap(), 2);
    assert!(manager.get_group_blacklist("g3").is_empty());
}
