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
use std::collections::BTreeSet;
use std::sync::Arc;

use cheetah_string::CheetahString;
use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::GroupConsumeControl;
use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;
use mqmaster_metamanage::metamanage::op_context::OpContext;
use mqmaster_metamanage::MemoryMetaStore;
use mqmaster_metamanage::MetaDataManager;

fn topics(names: &[&str]) -> BTreeSet<TopicName> {
    names.iter().map(|name| TopicName::from(*name)).collect()
}

fn conditions(topic: &str, items: &[&str]) -> BTreeMap<TopicName, BTreeSet<CheetahString>> {
    let items = items.iter().map(|item| CheetahString::from(*item)).collect();
    BTreeMap::from([(TopicName::from(topic), items)])
}

/// Group g1 may consume t1 restricted to the filter items `allowed`.
fn restricted_manager(allowed: &[&str]) -> MetaDataManager {
    let manager = MetaDataManager::new(MasterConfig::default(), Arc::new(MemoryMetaStore::new()));
    let ctx = OpContext::new("admin");
    let results = manager.add_or_update_topic_control(&ctx, &["t1"], Some(true), None);
    assert!(results[0].is_success());
    let consume_ctrl =
        GroupConsumeControl::new(BaseEntity::new("admin"), "g1", "t1").with_filter_conditions(allowed.iter().copied());
    manager.add_group_consume_control(&ctx, consume_ctrl).unwrap();
    manager
}

#[test]
fn test_allowed_condition_passes() {
    let manager = restricted_manager(&["a", "b"]);
    let result = manager.is_consume_target_authorized("c1", "g1", &topics(&["t1"]), &conditions("t1", &["a"]));
    assert!(result.result, "{}", result);
}

#[test]
fn test_unlisted_condition_forbidden() {
    let manager = restricted_manager(&["a", "b"]);
    let result = manager.is_consume_target_authorized("c1", "g1", &topics(&["t1"]), &conditions("t1", &["c"]));
    assert!(!result.result);
    assert_eq!(result.code(), ErrorCode::ContentForbidden);
    assert!(result.err_info.contains("[c]"));
}

#[test]
fn test_blank_allow_list_blocks_all_content() {
    let manager = restricted_manager(&[]);
    let result = manager.is_consume_target_authorized("c1", "g1", &topics(&["t1"]), &conditions("t1", &["a"]));
    assert_eq!(result.code(), ErrorCode::ContentForbidden);
    assert!(result.err_info.contains("not allowed to consume any data of topic t1"));
}

#[test]
fn test_missing_conditions_for_restricted_topic() {
    let manager = restricted_manager(&["a"]);
    let result = manager.is_consume_target_authorized("c1", "g1", &topics(&["t1"]), &BTreeMap::new());
    assert_eq!(result.code(), ErrorCode::ContentForbidden);
    assert!(result.err_info.contains("must set the filter conditions"));
}

#[test]
fn test_group_without_consume_control_not_authorized() {
    let manager = restricted_manager(&["a"]);
    let result = manager.is_consume_target_authorized("c2", "g2", &topics(&["t1"]), &BTreeMap::new());
    assert_eq!(result.code(), ErrorCode::Forbidden);
    assert!(result.err_info.contains("unAuthorizedTopics : [t1]"));
}

#[test]
fn test_blacklisted_group_forbidden() {
    let manager = restricted_manager(&["a"]);
    manager
        .add_group_blacklist(&OpContext::new("admin"), "g1", None, "maintenance")
        .unwrap();
    let result = manager.is_consume_target_authorized("c1", "g1", &topics(&["t1"]), &conditions("t1", &["a"]));
    assert_eq!(result.code(), ErrorCode::Forbidden);
    assert!(result.err_info.contains("blackList"));
}

#[test]
fn test_topic_without_auth_is_open() {
    let manager = restricted_manager(&["a"]);
    let result = manager.is_consume_target_authorized("c3", "g3", &topics(&["t9"]), &BTreeMap::new());
    assert!(result.result);
}

#[test]
fn test_malformed_requests() {
    let manager = restricted_manager(&["a"]);
    let result = manager.is_consume_target_authorized("c1", "g1", &BTreeSet::new(), &BTreeMap::new());
    assert_eq!(result.code(), ErrorCode::BadRequest);

    let result = manager.is_consume_target_authorized("c1", "g1", &topics(&["t1"]), &conditions("t2", &["a"]));
    assert_eq!(result.code(), ErrorCode::BadRequest);
    assert!(result.err_info.contains("[t2]"));
}
