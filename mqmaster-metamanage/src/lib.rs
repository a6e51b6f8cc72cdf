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

#![allow(dead_code)]

pub use crate::auth::consume_authorizer::ConsumeAuthSource;
pub use crate::auth::target_valid_result::TargetValidResult;
pub use crate::metamanage::meta_data_manager::MetaDataManager;
pub use crate::metamanage::process_result::ProcessResult;
pub use crate::metastore::memory_meta_store::MemoryMetaStore;
pub use crate::metastore::meta_store_service::MasterGroupStatus;
pub use crate::metastore::meta_store_service::MetaStoreService;
pub use crate::nodebroker::broker_sync_state::BrokerSyncState;
pub use crate::nodebroker::broker_sync_state::SyncPhase;

pub mod auth;
pub mod bootstrap;
pub mod master_config_parse;
pub mod metamanage;
pub mod metastore;
pub mod nodebroker;
