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

use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_error::MetaResult;
use tracing::info;

use crate::metamanage::meta_data_manager::MetaDataManager;
use crate::metastore::memory_meta_store::MemoryMetaStore;
use crate::metastore::meta_store_service::MetaStoreService;

pub struct MasterBootstrap {
    manager: Arc<MetaDataManager>,
}

pub struct Builder {
    master_config: Option<MasterConfig>,
    meta_store: Option<Arc<dyn MetaStoreService>>,
}

impl MasterBootstrap {
    pub fn manager(&self) -> &Arc<MetaDataManager> {
        &self.manager
    }

    /// Starts the manager and serves until ctrl-c, then shuts it down.
    pub async fn boot(self) -> MetaResult<()> {
        self.manager.start()?;
        info!("mqmaster started, node={}", self.manager.config().node_host);
        tokio::signal::ctrl_c().await?;
        info!("shutdown signal received, stopping mqmaster");
        self.manager.stop()
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            master_config: None,
            meta_store: None,
        }
    }

    pub fn set_master_config(mut self, master_config: MasterConfig) -> Self {
        self.master_config = Some(master_config);
        self
    }

    pub fn set_meta_store(mut self, meta_store: Arc<dyn MetaStoreService>) -> Self {
        self.meta_store = Some(meta_store);
        self
    }

    pub fn build(self) -> MasterBootstrap {
        let master_config = self.master_config.unwrap_or_default();
        let meta_store = self
            .meta_store
            .unwrap_or_else(|| Arc::new(MemoryMetaStore::new()) as Arc<dyn MetaStoreService>);
        MasterBootstrap {
            manager: Arc::new(MetaDataManager::new(master_config, meta_store)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        let bootstrap = Builder::new().build();
        assert!(!bootstrap.manager().is_started());
        assert_eq!(bootstrap.manager().config().node_host, "127.0.0.1");
    }

    #[tokio::test]
    async fn test_build_with_custom_store() {
        let store = Arc::new(MemoryMetaStore::new());
        store.set_master(false);
        let config = MasterConfig {
            rep_status_check_interval_ms: 50,
            ..MasterConfig::default()
        };
        let bootstrap = Builder::new()
            .set_master_config(config)
            .set_meta_store(store.clone())
            .build();
        let manager = Arc::clone(bootstrap.manager());
        manager.start().unwrap();
        assert!(!manager.is_self_master());
        manager.stop().unwrap();
        assert!(!store.is_started());
    }
}
