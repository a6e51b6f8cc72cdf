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

//! Versioned record table backing each entity kind of the in-memory store.

use std::collections::BTreeMap;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mqmaster_common::common::entity::MetaEntity;
use mqmaster_common::time_utils::get_current_millis;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;

/// Records keyed by their natural key with optimistic version checks.
///
/// Each write holds the entry lock of its key for the whole
/// read-compare-write, so writes on one key are linearizable while writes on
/// different keys proceed in parallel.
pub struct VersionedTable<V: MetaEntity> {
    name: &'static str,
    inner: DashMap<V::Key, V>,
}

impl<V: MetaEntity> VersionedTable<V> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: DashMap::new(),
        }
    }

    /// Inserts a new record at version 1.
    pub fn add(&self, mut entity: V) -> MetaResult<V> {
        let key = entity.record_key();
        match self.inner.entry(key) {
            Entry::Occupied(entry) => Err(MetaError::already_exists(format!(
                "{} record {:?} already exists",
                self.name,
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                let now = get_current_millis();
                let base = entity.base_mut();
                base.data_version = 1;
                base.create_date = now;
                base.modify_date = now;
                entry.insert(entity.clone());
                Ok(entity)
            }
        }
    }

    /// Replaces a record whose stored version equals the supplied one.
    pub fn update(&self, mut entity: V) -> MetaResult<V> {
        let key = entity.record_key();
        let Some(mut current) = self.inner.get_mut(&key) else {
            return Err(MetaError::not_exist(format!("{} record {:?} not exist", self.name, key)));
        };
        let stored_version = current.base().data_version;
        if entity.base().data_version != stored_version {
            return Err(MetaError::illegal_status(format!(
                "data version mismatch for {} record {:?}: supplied {}, current {}",
                self.name,
                key,
                entity.base().data_version,
                stored_version
            )));
        }
        let create_user = current.base().create_user.clone();
        let create_date = current.base().create_date;
        let base = entity.base_mut();
        base.data_version = stored_version + 1;
        base.create_user = create_user;
        base.create_date = create_date;
        base.modify_date = get_current_millis();
        *current = entity.clone();
        Ok(entity)
    }

    pub fn remove(&self, key: &V::Key) -> MetaResult<V> {
        self.inner
            .remove(key)
            .map(|(_, entity)| entity)
            .ok_or_else(|| MetaError::not_exist(format!("{} record {:?} not exist", self.name, key)))
    }

    pub fn get(&self, key: &V::Key) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &V::Key) -> bool {
        self.inner.contains_key(key)
    }

    /// Matching records ordered by key
    pub fn query(&self, filter: &dyn Fn(&V) -> bool) -> BTreeMap<V::Key, V> {
        self.inner
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
