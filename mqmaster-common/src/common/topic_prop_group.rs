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

use cheetah_string::CheetahString;
use serde::Deserialize;
use serde::Serialize;

use crate::common::constant;
use crate::common::constant::ATTR_SEP;
use crate::common::constant::BLANK_TOKEN;

/// Storage and flush properties of a topic on a broker.
///
/// A broker carries one group as its default; every deployment carries its
/// own copy, seeded from the broker's default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPropGroup {
    pub num_topic_stores: i32,
    pub num_partitions: i32,
    pub unflush_threshold: i32,
    pub unflush_interval: i32,
    pub unflush_data_hold: i32,
    #[serde(alias = "memCacheMsgSizeInMB")]
    pub mem_cache_msg_size_in_mb: i32,
    #[serde(alias = "memCacheMsgCntInK")]
    pub mem_cache_msg_cnt_in_k: i32,
    pub mem_cache_flush_intvl: i32,
    pub accept_publish: bool,
    pub accept_subscribe: bool,
    pub delete_policy: CheetahString,
}

impl Default for TopicPropGroup {
    fn default() -> Self {
        Self {
            num_topic_stores: constant::DEFAULT_NUM_TOPIC_STORES,
            num_partitions: constant::DEFAULT_NUM_PARTITIONS,
            unflush_threshold: constant::DEFAULT_UNFLUSH_THRESHOLD,
            unflush_interval: constant::DEFAULT_UNFLUSH_INTERVAL,
            unflush_data_hold: constant::DEFAULT_UNFLUSH_DATA_HOLD,
            mem_cache_msg_size_in_mb: constant::DEFAULT_MEM_CACHE_MSG_SIZE_MB,
            mem_cache_msg_cnt_in_k: constant::DEFAULT_MEM_CACHE_MSG_CNT_K,
            mem_cache_flush_intvl: constant::DEFAULT_MEM_CACHE_FLUSH_INTVL,
            accept_publish: true,
            accept_subscribe: true,
            delete_policy: CheetahString::from_static_str(constant::DEFAULT_DELETE_POLICY),
        }
    }
}

impl TopicPropGroup {
    /// Renders the broker-level default configuration string.
    ///
    /// Field order: partitions, acceptPublish, acceptSubscribe, unflushThreshold,
    /// unflushInterval, a reserved blank, deletePolicy, stores, unflushDataHold,
    /// memCacheMsgSizeInMB, memCacheMsgCntInK, memCacheFlushIntvl.
    pub fn to_broker_default_conf(&self) -> String {
        [
            self.num_partitions.to_string(),
            self.accept_publish.to_string(),
            self.accept_subscribe.to_string(),
            self.unflush_threshold.to_string(),
            self.unflush_interval.to_string(),
            BLANK_TOKEN.to_string(),
            self.delete_policy.to_string(),
            self.num_topic_stores.to_string(),
            self.unflush_data_hold.to_string(),
            self.mem_cache_msg_size_in_mb.to_string(),
            self.mem_cache_msg_cnt_in_k.to_string(),
            self.mem_cache_flush_intvl.to_string(),
        ]
        .join(ATTR_SEP)
    }

    /// Both producers and consumers are shut out
    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.accept_publish && !self.accept_subscribe
    }
}

/// Partial update of a [`TopicPropGroup`]; unset fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPropUpdate {
    pub num_topic_stores: Option<i32>,
    pub num_partitions: Option<i32>,
    pub unflush_threshold: Option<i32>,
    pub unflush_interval: Option<i32>,
    pub unflush_data_hold: Option<i32>,
    pub mem_cache_msg_size_in_mb: Option<i32>,
    pub mem_cache_msg_cnt_in_k: Option<i32>,
    pub mem_cache_flush_intvl: Option<i32>,
    pub accept_publish: Option<bool>,
    pub accept_subscribe: Option<bool>,
    pub delete_policy: Option<CheetahString>,
}

impl TopicPropUpdate {
    pub fn with_num_partitions(mut self, value: i32) -> Self {
        self.num_partitions = Some(value);
        self
    }

    pub fn with_num_topic_stores(mut self, value: i32) -> Self {
        self.num_topic_stores = Some(value);
        self
    }

    pub fn with_accept_publish(mut self, value: bool) -> Self {
        self.accept_publish = Some(value);
        self
    }

    pub fn with_accept_subscribe(mut self, value: bool) -> Self {
        self.accept_subscribe = Some(value);
        self
    }

    pub fn with_unflush_threshold(mut self, value: i32) -> Self {
        self.unflush_threshold = Some(value);
        self
    }

    pub fn with_delete_policy(mut self, value: impl Into<CheetahString>) -> Self {
        self.delete_policy = Some(value.into());
        self
    }

    /// Applies every set field to `target`, returning whether anything changed.
    pub fn apply_to(&self, target: &mut TopicPropGroup) -> bool {
        let mut changed = false;
        changed |= assign(&mut target.num_topic_stores, self.num_topic_stores);
        changed |= assign(&mut target.num_partitions, self.num_partitions);
        changed |= assign(&mut target.unflush_threshold, self.unflush_threshold);
        changed |= assign(&mut target.unflush_interval, self.unflush_interval);
        changed |= assign(&mut target.unflush_data_hold, self.unflush_data_hold);
        changed |= assign(&mut target.mem_cache_msg_size_in_mb, self.mem_cache_msg_size_in_mb);
        changed |= assign(&mut target.mem_cache_msg_cnt_in_k, self.mem_cache_msg_cnt_in_k);
        changed |= assign(&mut target.mem_cache_flush_intvl, self.mem_cache_flush_intvl);
        changed |= assign(&mut target.accept_publish, self.accept_publish);
        changed |= assign(&mut target.accept_subscribe, self.accept_subscribe);
        changed |= assign(&mut target.delete_policy, self.delete_policy.clone());
        changed
    }
}

fn assign<T: PartialEq>(slot: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *slot != value => {
            *slot = value;
            true
        }
        _ => false,
    }
}
