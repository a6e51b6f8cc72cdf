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

use std::collections::HashMap;

use dashmap::DashMap;
use mqmaster_common::TopicName;

use crate::nodebroker::heartbeat::TopicInfo;

/// Topics each broker reported in its last heartbeat.
#[derive(Default)]
pub struct RuntimeTopicTable {
    table: DashMap<i32, HashMap<TopicName, TopicInfo>>,
}

impl RuntimeTopicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything known about the broker's live topics.
    pub fn update(&self, broker_id: i32, topics: HashMap<TopicName, TopicInfo>) {
        self.table.insert(broker_id, topics);
    }

    pub fn get(&self, broker_id: i32) -> Option<HashMap<TopicName, TopicInfo>> {
        self.table.get(&broker_id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, broker_id: i32) -> Option<HashMap<TopicName, TopicInfo>> {
        self.table.remove(&broker_id).map(|(_, topics)| topics)
    }

    pub fn clear(&self) {
        self.table.clear();
    }
}
