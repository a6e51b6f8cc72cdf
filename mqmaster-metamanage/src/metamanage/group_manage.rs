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

//! Consumer group policy: resource control, consume control and blacklist.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use cheetah_string::CheetahString;
use mqmaster_common::common::constant::ARRAY_SEP;
use mqmaster_common::common::entity::group_consume_control::normalize_filter_conds;
use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::GroupBlacklist;
use mqmaster_common::common::entity::GroupConsumeControl;
use mqmaster_common::common::entity::GroupResourceControl;
use mqmaster_common::common::entity::MetaEntity;
use mqmaster_common::GroupName;
use mqmaster_common::TopicName;
use mqmaster_error::ErrorCode;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;
use tracing::info;

use crate::metamanage::meta_data_manager::log_result;
use crate::metamanage::meta_data_manager::MetaDataManager;
use crate::metamanage::op_context::OpContext;
use crate::metamanage::process_result::GroupProcessResult;
use crate::metamanage::process_result::ProcessResult;

impl MetaDataManager {
    // ----------------------------------------------------------------------
    // group resource control
    // ----------------------------------------------------------------------

    pub fn add_group_resource_control(
        &self,
        ctx: &OpContext,
        mut entity: GroupResourceControl,
    ) -> MetaResult<GroupResourceControl> {
        let result: MetaResult<GroupResourceControl> = (|| {
            self.check_writable()?;
            validate_group_resource_control(&entity)?;
            entity.base = BaseEntity::new(ctx.operator.clone());
            self.store.add_group_resource_control(entity)
        })();
        log_result("add group resource control", &result);
        result
    }

    pub fn modify_group_resource_control(
        &self,
        ctx: &OpContext,
        mut entity: GroupResourceControl,
    ) -> MetaResult<GroupResourceControl> {
        let result: MetaResult<GroupResourceControl> = (|| {
            self.check_writable()?;
            let Some(current) = self.store.get_group_resource_control(entity.group_name.as_str()) else {
                return Err(MetaError::not_exist(format!(
                    "Not found group resource control of groupName={}",
                    entity.group_name
                )));
            };
            let read_version = ctx.check_entity_version(
                entity.base.data_version,
                current.base.data_version,
                &format!("groupName={}", entity.group_name),
            )?;
            if entity.same_content(&current) {
                return Err(MetaError::unchanged(format!(
                    "Data not changed for groupName={}",
                    entity.group_name
                )));
            }
            validate_group_resource_control(&entity)?;
            entity.base.touch(ctx.operator.clone(), read_version);
            self.store.update_group_resource_control(entity)
        })();
        log_result("modify group resource control", &result);
        result
    }

    pub fn add_or_update_group_resource_control(
        &self,
        ctx: &OpContext,
        entity: GroupResourceControl,
    ) -> MetaResult<GroupResourceControl> {
        if self
            .store
            .get_group_resource_control(entity.group_name.as_str())
            .is_some()
        {
            self.modify_group_resource_control(ctx, entity)
        } else {
            self.add_group_resource_control(ctx, entity)
        }
    }

    /// Creates the group's resource control record with defaults when missing.
    pub fn add_if_absent_group_resource_control(
        &self,
        ctx: &OpContext,
        group_name: &str,
    ) -> MetaResult<GroupResourceControl> {
        if let Some(current) = self.store.get_group_resource_control(group_name) {
            return Ok(current);
        }
        let defaults = self.cluster_defaults();
        let mut entity = GroupResourceControl::with_defaults(BaseEntity::new(ctx.operator.clone()), group_name);
        entity.qry_priority_id = defaults.qry_priority_id;
        entity.flow_ctrl_enable = defaults.flow_ctrl_enable;
        entity.flow_ctrl_rule_count = defaults.flow_ctrl_rule_count;
        entity.flow_ctrl_info = defaults.flow_ctrl_info.clone();
        match self.store.add_group_resource_control(entity) {
            Ok(created) => {
                info!("[Group Control] auto created resource control of group {}", group_name);
                Ok(created)
            }
            Err(e) if e.code() == ErrorCode::AlreadyExists => {
                self.store.get_group_resource_control(group_name).ok_or(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes each group's resource control once no consume control or
    /// blacklist record references the group.
    pub fn delete_group_resource_controls(&self, ctx: &OpContext, group_names: &[&str]) -> Vec<GroupProcessResult> {
        group_names
            .iter()
            .map(|group_name| {
                let result: MetaResult<GroupResourceControl> = (|| {
                    self.check_writable()?;
                    let consume = self
                        .store
                        .query_group_consume_controls(&|ctrl| ctrl.group_name.as_str() == *group_name);
                    if !consume.is_empty() {
                        return Err(MetaError::illegal_status(format!(
                            "Group {group_name} is still referenced by consume control records, please delete \
                             them first!"
                        )));
                    }
                    let blacklist = self
                        .store
                        .query_group_blacklist(&|record| record.group_name.as_str() == *group_name);
                    if !blacklist.is_empty() {
                        return Err(MetaError::illegal_status(format!(
                            "Group {group_name} is still referenced by blacklist records, please delete them first!"
                        )));
                    }
                    let removed = self.store.delete_group_resource_control(group_name)?;
                    info!("[Group Control] operator={} deleted group {}", ctx.operator, group_name);
                    Ok(removed)
                })();
                log_result("delete group resource control", &result);
                GroupProcessResult::new(*group_name, None, ProcessResult::from_result(&result))
            })
            .collect()
    }

    pub fn get_group_resource_control(&self, group_name: &str) -> Option<GroupResourceControl> {
        self.store.get_group_resource_control(group_name)
    }

    pub fn query_group_resource_controls(
        &self,
        group_names: &[&str],
        filter: &dyn Fn(&GroupResourceControl) -> bool,
    ) -> BTreeMap<GroupName, GroupResourceControl> {
        self.store.query_group_resource_controls(&|ctrl| {
            (group_names.is_empty() || group_names.contains(&ctrl.group_name.as_str())) && filter(ctrl)
        })
    }

    // ----------------------------------------------------------------------
    // group consume control
    // ----------------------------------------------------------------------

    /// Adds a consume control record, creating the group's resource control
    /// and the topic's control record when they are missing.
    pub fn add_group_consume_control(
        &self,
        ctx: &OpContext,
        mut entity: GroupConsumeControl,
    ) -> MetaResult<GroupConsumeControl> {
        let result: MetaResult<GroupConsumeControl> = (|| {
            self.check_writable()?;
            normalize_consume_control(&mut entity);
            if self
                .store
                .get_group_consume_control(entity.group_name.as_str(), entity.topic_name.as_str())
                .is_some()
            {
                return Err(MetaError::already_exists(format!(
                    "Consume control already exists! groupName={}, topicName={}",
                    entity.group_name, entity.topic_name
                )));
            }
            self.add_if_absent_group_resource_control(ctx, entity.group_name.as_str())?;
            self.add_if_absent_topic_control(ctx, entity.topic_name.as_str())?;
            entity.base = BaseEntity::new(ctx.operator.clone());
            self.store.add_group_consume_control(entity)
        })();
        log_result("add group consume control", &result);
        result
    }

    pub fn modify_group_consume_control(
        &self,
        ctx: &OpContext,
        mut entity: GroupConsumeControl,
    ) -> MetaResult<GroupConsumeControl> {
        let result: MetaResult<GroupConsumeControl> = (|| {
            self.check_writable()?;
            normalize_consume_control(&mut entity);
            let Some(current) = self
                .store
                .get_group_consume_control(entity.group_name.as_str(), entity.topic_name.as_str())
            else {
                return Err(MetaError::not_exist(format!(
                    "Not found consume control! groupName={}, topicName={}",
                    entity.group_name, entity.topic_name
                )));
            };
            let read_version = ctx.check_entity_version(
                entity.base.data_version,
                current.base.data_version,
                &format!("groupName={}, topicName={}", entity.group_name, entity.topic_name),
            )?;
            if entity.same_content(&current) {
                return Err(MetaError::unchanged(format!(
                    "Data not changed for groupName={}, topicName={}",
                    entity.group_name, entity.topic_name
                )));
            }
            entity.base.touch(ctx.operator.clone(), read_version);
            self.store.update_group_consume_control(entity)
        })();
        log_result("modify group consume control", &result);
        result
    }

    pub fn add_or_update_group_consume_control(
        &self,
        ctx: &OpContext,
        entity: GroupConsumeControl,
    ) -> MetaResult<GroupConsumeControl> {
        if self
            .store
            .get_group_consume_control(entity.group_name.as_str(), entity.topic_name.as_str())
            .is_some()
        {
            self.modify_group_consume_control(ctx, entity)
        } else {
            self.add_group_consume_control(ctx, entity)
        }
    }

    /// Deletes every consume control record whose group is listed or whose
    /// topic is listed, one result per record.
    pub fn delete_group_consume_controls(
        &self,
        ctx: &OpContext,
        group_names: &[&str],
        topic_names: &[&str],
    ) -> Vec<GroupProcessResult> {
        if group_names.is_empty() && topic_names.is_empty() {
            return Vec::new();
        }
        let matched = self.store.query_group_consume_controls(&|ctrl| {
            group_names.contains(&ctrl.group_name.as_str()) || topic_names.contains(&ctrl.topic_name.as_str())
        });
        matched
            .into_keys()
            .map(|(group_name, topic_name)| {
                let result = self.check_writable().and_then(|_| {
                    self.store
                        .delete_group_consume_control(group_name.as_str(), topic_name.as_str())
                });
                if result.is_ok() {
                    info!(
                        "[Group Control] operator={} deleted consume control groupName={}, topicName={}",
                        ctx.operator, group_name, topic_name
                    );
                }
                GroupProcessResult::new(group_name, Some(topic_name), ProcessResult::from_result(&result))
            })
            .collect()
    }

    pub fn get_group_consume_control(&self, group_name: &str, topic_name: &str) -> Option<GroupConsumeControl> {
        self.store.get_group_consume_control(group_name, topic_name)
    }

    /// Consume control records of one topic keyed by group.
    pub fn get_consume_controls_by_topic(&self, topic_name: &str) -> BTreeMap<GroupName, GroupConsumeControl> {
        self.store
            .query_group_consume_controls(&|ctrl| ctrl.topic_name.as_str() == topic_name)
            .into_iter()
            .map(|((group_name, _), ctrl)| (group_name, ctrl))
            .collect()
    }

    pub fn query_group_consume_controls(
        &self,
        group_names: &[&str],
        topic_names: &[&str],
        filter: &dyn Fn(&GroupConsumeControl) -> bool,
    ) -> BTreeMap<(GroupName, TopicName), GroupConsumeControl> {
        self.store.query_group_consume_controls(&|ctrl| {
            (group_names.is_empty() || group_names.contains(&ctrl.group_name.as_str()))
                && (topic_names.is_empty() || topic_names.contains(&ctrl.topic_name.as_str()))
                && filter(ctrl)
        })
    }

    // ----------------------------------------------------------------------
    // group blacklist
    // ----------------------------------------------------------------------

    /// Blacklists the group for one topic, or for every topic when `topic_name`
    /// is `None`.
    pub fn add_group_blacklist(
        &self,
        ctx: &OpContext,
        group_name: &str,
        topic_name: Option<&str>,
        reason: &str,
    ) -> MetaResult<GroupBlacklist> {
        let result: MetaResult<GroupBlacklist> = (|| {
            self.check_writable()?;
            self.add_if_absent_group_resource_control(ctx, group_name)?;
            let entity = GroupBlacklist::new(
                BaseEntity::new(ctx.operator.clone()),
                group_name,
                topic_name.map(CheetahString::from),
            )
            .with_reason(reason);
            self.store.add_group_blacklist(entity)
        })();
        log_result("add group blacklist", &result);
        result
    }

    /// Removes blacklist records matching the group and/or topic; with
    /// neither given nothing is removed.
    pub fn delete_group_blacklist(
        &self,
        ctx: &OpContext,
        group_name: Option<&str>,
        topic_name: Option<&str>,
    ) -> MetaResult<usize> {
        let result: MetaResult<usize> = (|| {
            if group_name.is_none() && topic_name.is_none() {
                return Ok(0);
            }
            self.check_writable()?;
            let removed = self.store.delete_group_blacklist(group_name, topic_name)?;
            info!(
                "[Group Blacklist] operator={} removed {} records, groupName={:?}, topicName={:?}",
                ctx.operator, removed, group_name, topic_name
            );
            Ok(removed)
        })();
        log_result("delete group blacklist", &result);
        result
    }

    pub fn get_group_blacklist(&self, group_name: &str) -> Vec<GroupBlacklist> {
        self.store
            .query_group_blacklist(&|record| record.group_name.as_str() == group_name)
            .into_values()
            .collect()
    }

    /// Topics the group is blacklisted for by a topic specific record.
    pub fn get_blacklist_topics(&self, group_name: &str) -> BTreeSet<TopicName> {
        self.get_group_blacklist(group_name)
            .into_iter()
            .filter_map(|record| record.topic_name)
            .collect()
    }

    pub fn query_group_blacklist(
        &self,
        group_names: &[&str],
        topic_names: &[&str],
        filter: &dyn Fn(&GroupBlacklist) -> bool,
    ) -> BTreeMap<(GroupName, Option<TopicName>), GroupBlacklist> {
        self.store.query_group_blacklist(&|record| {
            (group_names.is_empty() || group_names.contains(&record.group_name.as_str()))
                && (topic_names.is_empty()
                    || record
                        .topic_name
                        .as_ref()
                        .is_some_and(|topic| topic_names.contains(&topic.as_str())))
                && filter(record)
        })
    }
}

/// Stored filter conditions are always comma wrapped, sorted and unique.
fn normalize_consume_control(entity: &mut GroupConsumeControl) {
    let raw = entity.filter_cond_str.to_string();
    entity.filter_cond_str = normalize_filter_conds(raw.split(ARRAY_SEP));
}

fn validate_group_resource_control(entity: &GroupResourceControl) -> MetaResult<()> {
    let qry_priority_id = entity.qry_priority_id;
    let (level, rule) = (qry_priority_id / 100, qry_priority_id % 100);
    if !(1..=3).contains(&level) || !(1..=3).contains(&rule) {
        return Err(MetaError::illegal_value(format!(
            "qryPriorityId must be in [101, 303] with each digit in [1, 3] except the middle one, current value \
             is {qry_priority_id}"
        )));
    }
    if entity.allowed_broker_client_rate < 0 {
        return Err(MetaError::illegal_value(format!(
            "allowedBrokerClientRate must not be negative, current value is {}",
            entity.allowed_broker_client_rate
        )));
    }
    if entity.flow_ctrl_rule_count < 0 {
        return Err(MetaError::illegal_value(format!(
            "flowCtrlRuleCount must not be negative, current value is {}",
            entity.flow_ctrl_rule_count
        )));
    }
    Ok(())
}
