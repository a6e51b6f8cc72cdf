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

//! Compact per-topic configuration line handed to brokers.
//!
//! One line per deployed topic, fields joined by `:` in fixed order:
//!
//! ```text
//! topicName:partitions:acceptPublish:acceptSubscribe:unflushThreshold:unflushInterval:
//! <reserved>:deletePolicy:stores:topicStatusCode:unflushDataHold:memCacheMsgSizeInMB:
//! memCacheMsgCntInK:memCacheFlushIntvl:maxMsgSizeInBytes
//! ```
//!
//! Any field equal to the broker default (or, for the message size, to the
//! cluster default) is rendered as a single blank. The status code is always
//! rendered.

use std::fmt::Display;
use std::str::FromStr;

use cheetah_string::CheetahString;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;

use crate::common::constant::ATTR_SEP;
use crate::common::constant::BLANK_TOKEN;
use crate::common::topic_prop_group::TopicPropGroup;
use crate::common::topic_status::TopicStatus;
use crate::common::TopicName;

const FIELD_COUNT: usize = 15;

/// Effective configuration of one topic on one broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfLine {
    pub topic_name: TopicName,
    pub props: TopicPropGroup,
    pub status: TopicStatus,
    pub max_msg_size_in_b: i32,
}

impl TopicConfLine {
    pub fn encode(&self, broker_defaults: &TopicPropGroup, def_max_msg_size_in_b: i32) -> String {
        let props = &self.props;
        let fields = [
            self.topic_name.to_string(),
            compact(props.num_partitions, broker_defaults.num_partitions),
            compact(props.accept_publish, broker_defaults.accept_publish),
            compact(props.accept_subscribe, broker_defaults.accept_subscribe),
            compact(props.unflush_threshold, broker_defaults.unflush_threshold),
            compact(props.unflush_interval, broker_defaults.unflush_interval),
            BLANK_TOKEN.to_string(),
            compact(props.delete_policy.as_str(), broker_defaults.delete_policy.as_str()),
            compact(props.num_topic_stores, broker_defaults.num_topic_stores),
            self.status.code().to_string(),
            compact(props.unflush_data_hold, broker_defaults.unflush_data_hold),
            compact(props.mem_cache_msg_size_in_mb, broker_defaults.mem_cache_msg_size_in_mb),
            compact(props.mem_cache_msg_cnt_in_k, broker_defaults.mem_cache_msg_cnt_in_k),
            compact(props.mem_cache_flush_intvl, broker_defaults.mem_cache_flush_intvl),
            compact(self.max_msg_size_in_b, def_max_msg_size_in_b),
        ];
        fields.join(ATTR_SEP)
    }

    /// Parses a line, substituting the defaults for blank fields.
    pub fn decode(line: &str, broker_defaults: &TopicPropGroup, def_max_msg_size_in_b: i32) -> MetaResult<Self> {
        let fields: Vec<&str> = line.split(ATTR_SEP).collect();
        if fields.len() != FIELD_COUNT {
            return Err(MetaError::illegal_value(format!(
                "topic config line must have {FIELD_COUNT} fields, found {}: {line}",
                fields.len()
            )));
        }
        let topic_name = fields[0].trim();
        if topic_name.is_empty() {
            return Err(MetaError::illegal_value(format!(
                "topic config line misses the topic name: {line}"
            )));
        }
        let defaults = broker_defaults;
        let props = TopicPropGroup {
            num_partitions: expand(fields[1], defaults.num_partitions)?,
            accept_publish: expand(fields[2], defaults.accept_publish)?,
            accept_subscribe: expand(fields[3], defaults.accept_subscribe)?,
            unflush_threshold: expand(fields[4], defaults.unflush_threshold)?,
            unflush_interval: expand(fields[5], defaults.unflush_interval)?,
            delete_policy: match fields[7].trim() {
                "" => defaults.delete_policy.clone(),
                policy => CheetahString::from(policy),
            },
            num_topic_stores: expand(fields[8], defaults.num_topic_stores)?,
            unflush_data_hold: expand(fields[10], defaults.unflush_data_hold)?,
            mem_cache_msg_size_in_mb: expand(fields[11], defaults.mem_cache_msg_size_in_mb)?,
            mem_cache_msg_cnt_in_k: expand(fields[12], defaults.mem_cache_msg_cnt_in_k)?,
            mem_cache_flush_intvl: expand(fields[13], defaults.mem_cache_flush_intvl)?,
        };
        let status_code: i32 = expand(fields[9], TopicStatus::Normal.code())?;
        Ok(Self {
            topic_name: CheetahString::from(topic_name),
            props,
            status: TopicStatus::from(status_code),
            max_msg_size_in_b: expand(fields[14], def_max_msg_size_in_b)?,
        })
    }
}

fn compact<T: PartialEq + Display>(value: T, default: T) -> String {
    if value == default {
        BLANK_TOKEN.to_string()
    } else {
        value.to_string()
    }
}

fn expand<T: FromStr>(token: &str, default: T) -> MetaResult<T> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(default);
    }
    token
        .parse::<T>()
        .map_err(|_| MetaError::illegal_value(format!("unparsable topic config field: {token}")))
}
