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

use std::collections::BTreeSet;

use cheetah_string::CheetahString;
use serde::Deserialize;
use serde::Serialize;

use crate::common::constant::ARRAY_SEP;
use crate::common::constant::BLANK_FILTER_ITEM_STR;
use crate::common::entity::BaseEntity;
use crate::common::entity::MetaEntity;
use crate::common::GroupName;
use crate::common::TopicName;

/// Consume permission of one group on one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupConsumeControl {
    pub base: BaseEntity,
    pub group_name: GroupName,
    pub topic_name: TopicName,
    pub consume_enable: bool,
    pub disable_reason: CheetahString,
    pub filter_enable: bool,
    /// Comma-wrapped allow-list such as `,a,b,`, or `,,` for "nothing allowed"
    pub filter_cond_str: CheetahString,
}

impl GroupConsumeControl {
    pub fn new(base: BaseEntity, group_name: impl Into<GroupName>, topic_name: impl Into<TopicName>) -> Self {
        Self {
            base,
            group_name: group_name.into(),
            topic_name: topic_name.into(),
            consume_enable: true,
            disable_reason: CheetahString::empty(),
            filter_enable: false,
            filter_cond_str: CheetahString::from_static_str(BLANK_FILTER_ITEM_STR),
        }
    }

    /// Enables filter consumption restricted to `conditions`.
    pub fn with_filter_conditions<'a>(mut self, conditions: impl IntoIterator<Item = &'a str>) -> Self {
        self.filter_enable = true;
        self.filter_cond_str = normalize_filter_conds(conditions);
        self
    }

    #[inline]
    pub fn is_blank_filter(&self) -> bool {
        self.filter_cond_str.as_str() == BLANK_FILTER_ITEM_STR
    }

    /// Whether `condition` is on the allow-list
    pub fn allows_condition(&self, condition: &str) -> bool {
        let wrapped = format!("{ARRAY_SEP}{condition}{ARRAY_SEP}");
        self.filter_cond_str.as_str().contains(wrapped.as_str())
    }
}

/// Builds the comma-wrapped allow-list from loose tokens.
///
/// Tokens are trimmed, blank ones dropped, duplicates removed and the rest
/// sorted. An empty set yields the blank sentinel.
pub fn normalize_filter_conds<'a>(conditions: impl IntoIterator<Item = &'a str>) -> CheetahString {
    let items: BTreeSet<&str> = conditions
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return CheetahString::from_static_str(BLANK_FILTER_ITEM_STR);
    }
    let joined = items.into_iter().collect::<Vec<_>>().join(ARRAY_SEP);
    CheetahString::from_string(format!("{ARRAY_SEP}{joined}{ARRAY_SEP}"))
}

impl MetaEntity for GroupConsumeControl {
    type Key = (GroupName, TopicName);

    fn record_key(&self) -> Self::Key {
        (self.group_name.clone(), self.topic_name.clone())
    }

    fn base(&self) -> &BaseEntity {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseEntity {
        &mut self.base
    }

    fn same_content(&self, other: &Self) -> bool {
        self.group_name == other.group_name
            && self.topic_name == other.topic_name
            && self.consume_enable == other.consume_enable
            && self.disable_reason == other.disable_reason
            && self.filter_enable == other.filter_enable
            && self.filter_cond_str == other.filter_cond_str
    }
}
