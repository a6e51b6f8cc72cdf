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

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::nodebroker::broker_sync_state::BrokerSyncState;

pub type SharedSyncState = Arc<Mutex<BrokerSyncState>>;

/// Per-broker sync states, each guarded by its own lock so unrelated
/// brokers never contend.
#[derive(Default)]
pub struct SyncStateTable {
    states: DashMap<i32, SharedSyncState>,
}

impl SyncStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, broker_id: i32) -> Option<SharedSyncState> {
        self.states.get(&broker_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns the live state of the broker, creating it with `create` when
    /// absent. Concurrent callers always observe the same instance.
    pub fn get_or_insert_with(&self, broker_id: i32, create: impl FnOnce() -> BrokerSyncState) -> SharedSyncState {
        let entry = self
            .states
            .entry(broker_id)
            .or_insert_with(|| Arc::new(Mutex::new(create())));
        Arc::clone(entry.value())
    }

    pub fn insert(&self, broker_id: i32, state: BrokerSyncState) {
        self.states.insert(broker_id, Arc::new(Mutex::new(state)));
    }

    pub fn remove(&self, broker_id: i32) -> Option<SharedSyncState> {
        self.states.remove(&broker_id).map(|(_, state)| state)
    }

    pub fn broker_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.states.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use mqmaster_common::common::entity::BaseEntity;
    use mqmaster_common::common::entity::BrokerConfig;

    use super::*;
    use crate::nodebroker::broker_sync_state::ConfigSnapshot;

    #[test]
    fn test_get_or_insert_returns_single_instance() {
        let table = Arc::new(SyncStateTable::new());
        let broker = BrokerConfig::new(BaseEntity::new("admin"), 1, "10.0.0.1");
        let mut handles = vec![];
        for _ in 0..8 {
            let table = Arc::clone(&table);
            let broker = broker.clone();
            handles.push(thread::spawn(move || {
                table.get_or_insert_with(1, || BrokerSyncState::new(&broker, ConfigSnapshot::default()))
            }));
        }
        let states: Vec<SharedSyncState> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
        assert!(states.iter().all(|state| Arc::ptr_eq(state, &states[0])));
        assert_eq!(table.len(), 1);

        assert!(table.remove(1).is_some());
        assert!(table.get(1).is_none());
    }
}
