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
use std::fmt::Display;

use cheetah_string::CheetahString;
use mqmaster_common::common::entity::GroupBlacklist;
use mqmaster_common::common::entity::GroupConsumeControl;
use mqmaster_common::common::entity::TopicControl;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;

use crate::auth::target_valid_result::TargetValidResult;
use crate::metamanage::meta_data_manager::MetaDataManager;

/// Read-only view of the policy records a consume check needs.
#[cfg_attr(test, mockall::automock)]
pub trait ConsumeAuthSource: Send + Sync {
    fn blacklist_of_group(&self, group_name: &str) -> Vec<GroupBlacklist>;

    fn topic_control_of(&self, topic_name: &str) -> Option<TopicControl>;

    fn consume_control_of(&self, group_name: &str, topic_name: &str) -> Option<GroupConsumeControl>;
}

impl ConsumeAuthSource for MetaDataManager {
    fn blacklist_of_group(&self, group_name: &str) -> Vec<GroupBlacklist> {
        self.get_group_blacklist(group_name)
    }

    fn topic_control_of(&self, topic_name: &str) -> Option<TopicControl> {
        self.get_topic_control(topic_name)
    }

    fn consume_control_of(&self, group_name: &str, topic_name: &str) -> Option<GroupConsumeControl> {
        self.get_group_consume_control(group_name, topic_name)
    }
}

impl MetaDataManager {
    /// Whether `consumer_id` of `group_name` may subscribe to the requested
    /// topics with the requested filter conditions.
    pub fn is_consume_target_authorized(
        &self,
        consumer_id: &str,
        group_name: &str,
        requested_topics: &BTreeSet<TopicName>,
        requested_conditions: &BTreeMap<TopicName, BTreeSet<CheetahString>>,
    ) -> TargetValidResult {
        authorize(self, consumer_id, group_name, requested_topics, requested_conditions)
    }
}

/// Checks a consume request, stopping at the first rule it breaks:
///
/// 1. at least one topic is requested;
/// 2. filter conditions only name requested topics;
/// 3. the group is not blacklisted for any requested topic;
/// 4. every requested topic with auth enabled has a consume control record
///    for the group;
/// 5. for those records with filter consumption enabled, the caller supplies
///    conditions and each of them is on the allow-list.
///
/// The check has no side effects.
pub fn authorize(
    source: &dyn ConsumeAuthSource,
    consumer_id: &str,
    group_name: &str,
    requested_topics: &BTreeSet<TopicName>,
    requested_conditions: &BTreeMap<TopicName, BTreeSet<CheetahString>>,
) -> TargetValidResult {
    if requested_topics.is_empty() {
        return TargetValidResult::fail(ErrorCode::BadRequest, "Request miss necessary subscribed topic data");
    }
    let unset_topics: Vec<&TopicName> = requested_conditions
        .keys()
        .filter(|topic| !requested_topics.contains(*topic))
        .collect();
    if !unset_topics.is_empty() {
        return TargetValidResult::fail(
            ErrorCode::BadRequest,
            format!("Filter's Topic not subscribed :{}", render_list(&unset_topics)),
        );
    }

    let blacklist = source.blacklist_of_group(group_name);
    let forbidden_topics: Vec<&TopicName> = requested_topics
        .iter()
        .filter(|topic| blacklist.iter().any(|record| record.covers(topic.as_str())))
        .collect();
    if !forbidden_topics.is_empty() {
        return TargetValidResult::fail(
            ErrorCode::Forbidden,
            format!(
                "[unAuthorized Group] {}'s consumerGroup in blackList by administrator, topics : {}",
                consumer_id,
                render_list(&forbidden_topics)
            ),
        );
    }

    let mut restricted: Vec<GroupConsumeControl> = Vec::new();
    let mut unauthorized_topics: Vec<&TopicName> = Vec::new();
    for topic in requested_topics {
        if topic.as_str().trim().is_empty() {
            continue;
        }
        let Some(topic_ctrl) = source.topic_control_of(topic.as_str()) else {
            continue;
        };
        if !topic_ctrl.auth_ctrl_enable {
            continue;
        }
        match source.consume_control_of(group_name, topic.as_str()) {
            None => unauthorized_topics.push(topic),
            Some(consume_ctrl) if consume_ctrl.filter_enable => restricted.push(consume_ctrl),
            Some(_) => {}
        }
    }
    if !unauthorized_topics.is_empty() {
        return TargetValidResult::fail(
            ErrorCode::Forbidden,
            format!(
                "[unAuthorized Group] {}'s consumerGroup not authorized by administrator, unAuthorizedTopics : {}",
                consumer_id,
                render_list(&unauthorized_topics)
            ),
        );
    }

    for consume_ctrl in &restricted {
        let topic = &consume_ctrl.topic_name;
        if consume_ctrl.is_blank_filter() {
            return TargetValidResult::fail(
                ErrorCode::ContentForbidden,
                format!(
                    "[Restricted Group] {} : {} not allowed to consume any data of topic {}",
                    consumer_id, group_name, topic
                ),
            );
        }
        let conditions = match requested_conditions.get(topic) {
            Some(conditions) if !conditions.is_empty() => conditions,
            _ => {
                return TargetValidResult::fail(
                    ErrorCode::ContentForbidden,
                    format!(
                        "[Restricted Group] {} : {} must set the filter conditions of topic {}",
                        consumer_id, group_name, topic
                    ),
                );
            }
        };
        let unauthorized_conds: Vec<&CheetahString> = conditions
            .iter()
            .filter(|condition| !consume_ctrl.allows_condition(condition.as_str()))
            .collect();
        if !unauthorized_conds.is_empty() {
            return TargetValidResult::fail(
                ErrorCode::ContentForbidden,
                format!(
                    "[Restricted Group] {} : unAuthorized filter conditions {{{}={}}}",
                    consumer_id,
                    topic,
                    render_list(&unauthorized_conds)
                ),
            );
        }
    }
    TargetValidResult::ok()
}

fn render_list<T: Display>(items: &[T]) -> String {
    let joined = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    format!("[{joined}]")
}

#[cfg(test)]
mod tests {
    use mqmaster_common::common::entity::BaseEntity;

    use super::*;

    fn topics(names: &[&str]) -> BTreeSet<TopicName> {
        names.iter().map(|name| TopicName::from(*name)).collect()
    }

    fn conditions(topic: &str, items: &[&str]) -> BTreeMap<TopicName, BTreeSet<CheetahString>> {
        let mut map = BTreeMap::new();
        map.insert(
            TopicName::from(topic),
            items.iter().map(|item| CheetahString::from(*item)).collect(),
        );
        map
    }

    fn auth_topic(topic: &str) -> Option<TopicControl> {
        Some(TopicControl::new(BaseEntity::new("admin"), topic).with_auth_ctrl_enable(true))
    }

    #[test]
    fn test_empty_request_is_bad_request() {
        let source = MockConsumeAuthSource::new();
        let result = authorize(&source, "c1", "g1", &BTreeSet::new(), &BTreeMap::new());
        assert_eq!(result.code(), ErrorCode::BadRequest);
        assert_eq!(result.err_info, "Request miss necessary subscribed topic data");
    }

    #[test]
    fn test_conditions_for_unrequested_topic() {
        let source = MockConsumeAuthSource::new();
        let result = authorize(&source, "c1", "g1", &topics(&["t1"]), &conditions("t2", &["a"]));
        assert_eq!(result.code(), ErrorCode::BadRequest);
        assert_eq!(result.err_info, "Filter's Topic not subscribed :[t2]");
    }

    #[test]
    fn test_blacklisted_group_is_forbidden() {
        let mut source = MockConsumeAuthSource::new();
        source.expect_blacklist_of_group().returning(|group| {
            vec![GroupBlacklist::new(BaseEntity::new("admin"), group, Some(TopicName::from("t2")))]
        });
        let result = authorize(&source, "c1", "g1", &topics(&["t1", "t2"]), &BTreeMap::new());
        assert_eq!(result.code(), ErrorCode::Forbidden);
        assert_eq!(
            result.err_info,
            "[unAuthorized Group] c1's consumerGroup in blackList by administrator, topics : [t2]"
        );
    }

    #[test]
    fn test_auth_topic_without_consume_control() {
        let mut source = MockConsumeAuthSource::new();
        source.expect_blacklist_of_group().returning(|_| Vec::new());
        source.expect_topic_control_of().returning(auth_topic);
        source.expect_consume_control_of().returning(|_, _| None);
        let result = authorize(&source, "c1", "g1", &topics(&["t1"]), &BTreeMap::new());
        assert_eq!(result.code(), ErrorCode::Forbidden);
        assert!(result.err_info.ends_with("unAuthorizedTopics : [t1]"));
    }

    #[test]
    fn test_topic_without_auth_passes() {
        let mut source = MockConsumeAuthSource::new();
        source.expect_blacklist_of_group().returning(|_| Vec::new());
        source
            .expect_topic_control_of()
            .returning(|topic| Some(TopicControl::new(BaseEntity::new("admin"), topic)));
        source.expect_consume_control_of().never();
        let result = authorize(&source, "c1", "g1", &topics(&["t1"]), &BTreeMap::new());
        assert!(result.result);
        assert_eq!(result.err_info, "Ok!");
    }

    #[test]
    fn test_blank_allow_list_forbids_any_condition() {
        let mut source = MockConsumeAuthSource::new();
        source.expect_blacklist_of_group().returning(|_| Vec::new());
        source.expect_topic_control_of().returning(auth_topic);
        source.expect_consume_control_of().returning(|group, topic| {
            Some(
                GroupConsumeControl::new(BaseEntity::new("admin"), group, topic)
                    .with_filter_conditions(Vec::<&str>::new()),
            )
        });
        let result = authorize(&source, "c1", "g1", &topics(&["t1"]), &conditions("t1", &["a"]));
        assert_eq!(result.code(), ErrorCode::ContentForbidden);
        assert_eq!(
            result.err_info,
            "[Restricted Group] c1 : g1 not allowed to consume any data of topic t1"
        );
    }

    #[test]
    fn test_filter_conditions_checked_against_allow_list() {
        let mut source = MockConsumeAuthSource::new();
        source.expect_blacklist_of_group().returning(|_| Vec::new());
        source.expect_topic_control_of().returning(auth_topic);
        source.expect_consume_control_of().returning(|group, topic| {
            Some(GroupConsumeControl::new(BaseEntity::new("admin"), group, topic).with_filter_conditions(["a", "b"]))
        });

        let allowed = authorize(&source, "c1", "g1", &topics(&["t1"]), &conditions("t1", &["a"]));
        assert!(allowed.result);

        let missing = authorize(&source, "c1", "g1", &topics(&["t1"]), &BTreeMap::new());
        assert_eq!(missing.code(), ErrorCode::ContentForbidden);
        assert_eq!(
            missing.err_info,
            "[Restricted Group] c1 : g1 must set the filter conditions of topic t1"
        );

        let denied = authorize(&source, "c1", "g1", &topics(&["t1"]), &conditions("t1", &["a", "c"]));
        assert_eq!(denied.code(), ErrorCode::ContentForbidden);
        assert_eq!(denied.err_info, "[Restricted Group] c1 : unAuthorized filter conditions {t1=[c]}");
    }
}
