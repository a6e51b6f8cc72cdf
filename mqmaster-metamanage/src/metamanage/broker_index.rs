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
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use cheetah_string::CheetahString;
use dashmap::DashMap;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::time_utils::get_current_millis;

/// Address listing of every configured broker, plain and TLS, with a
/// marker that moves forward on every change.
pub struct BrokerSummaryIndex {
    plain: DashMap<i32, CheetahString>,
    tls: DashMap<i32, CheetahString>,
    checksum: AtomicI64,
}

impl Default for BrokerSummaryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerSummaryIndex {
    pub fn new() -> Self {
        Self {
            plain: DashMap::new(),
            tls: DashMap::new(),
            checksum: AtomicI64::new(get_current_millis()),
        }
    }

    /// Records the broker's addresses; returns whether either listing changed.
    pub fn update(&self, broker: &BrokerConfig) -> bool {
        let plain_info = broker.simple_broker_info();
        let tls_info = broker.simple_tls_broker_info();
        let plain_changed = self
            .plain
            .insert(broker.broker_id, plain_info.clone())
            .is_none_or(|old| old != plain_info);
        let tls_changed = self
            .tls
            .insert(broker.broker_id, tls_info.clone())
            .is_none_or(|old| old != tls_info);
        let changed = plain_changed || tls_changed;
        if changed {
            self.bump_checksum();
        }
        changed
    }

    pub fn remove(&self, broker_id: i32) -> bool {
        let removed = self.plain.remove(&broker_id).is_some() | self.tls.remove(&broker_id).is_some();
        if removed {
            self.bump_checksum();
        }
        removed
    }

    /// `brokerId -> "id:ip:port"`, using the TLS port when `over_tls`.
    pub fn get_brokers_map(&self, over_tls: bool) -> BTreeMap<i32, CheetahString> {
        let source = if over_tls { &self.tls } else { &self.plain };
        source
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    pub fn checksum(&self) -> i64 {
        self.checksum.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        self.plain.clear();
        self.tls.clear();
        self.bump_checksum();
    }

    fn bump_checksum(&self) {
        let now = get_current_millis();
        // strictly increasing even when two changes land in the same millisecond
        let _ = self
            .checksum
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(now.max(current + 1))
            });
    }
}
