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

use std::panic::AssertUnwindSafe;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::metastore::meta_store_service::MasterGroupStatus;
use crate::metastore::meta_store_service::MetaStoreService;

/// Last observed role of the local store node.
#[derive(Debug, Default)]
pub struct MasterGroupStatusCache {
    is_master: AtomicBool,
    is_writable: AtomicBool,
    is_readable: AtomicBool,
}

impl MasterGroupStatusCache {
    pub fn new(status: MasterGroupStatus) -> Self {
        let cache = Self::default();
        cache.set(status);
        cache
    }

    pub fn set(&self, status: MasterGroupStatus) {
        self.is_master.store(status.is_master, Ordering::Release);
        self.is_writable.store(status.is_writable, Ordering::Release);
        self.is_readable.store(status.is_readable, Ordering::Release);
    }

    pub fn get(&self) -> MasterGroupStatus {
        MasterGroupStatus::new(
            self.is_master.load(Ordering::Acquire),
            self.is_writable.load(Ordering::Acquire),
            self.is_readable.load(Ordering::Acquire),
        )
    }
}

/// Background task mirroring the store's role into [`MasterGroupStatusCache`].
pub struct StoreStatusChecker {
    store: Arc<dyn MetaStoreService>,
    cache: Arc<MasterGroupStatusCache>,
    interval: Duration,
    cancel_token: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl StoreStatusChecker {
    pub fn new(store: Arc<dyn MetaStoreService>, cache: Arc<MasterGroupStatusCache>, interval: Duration) -> Self {
        Self {
            store,
            cache,
            interval,
            cancel_token: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    /// Spawns the poll loop on the current tokio runtime. The first check
    /// runs immediately. Calling it again while running does nothing.
    pub fn start(&self) {
        let mut handle = self.handle.lock();
        if handle.is_some() || self.cancel_token.is_cancelled() {
            return;
        }
        let store = Arc::clone(&self.store);
        let cache = Arc::clone(&self.cache);
        let token = self.cancel_token.clone();
        let period = self.interval;
        *handle = Some(tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("store status checker cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        Self::check_once(store.as_ref(), &cache);
                    }
                }
            }
        }));
        info!("store status checker started, interval={:?}", period);
    }

    /// Runs one check; failures are logged and never propagate.
    pub fn check_once(store: &dyn MetaStoreService, cache: &MasterGroupStatusCache) {
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            store
                .get_master_group_status(true)
                .map(|status| MasterGroupStatus::new(store.is_master_now(), status.is_writable, status.is_readable))
        }));
        match outcome {
            Ok(Ok(status)) => cache.set(status),
            Ok(Err(e)) => {
                error!("check meta store status failed: {}", e);
                cache.set(MasterGroupStatus::default());
            }
            Err(_) => {
                error!("check meta store status panicked, retry on next tick");
            }
        }
    }

    /// Cancels the poll loop. Returns immediately; the task never runs
    /// another tick afterwards.
    pub fn stop(&self) {
        self.cancel_token.cancel();
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
            warn!("store status checker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
