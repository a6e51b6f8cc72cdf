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

//! Persistent metadata entities held by the metadata store.

pub mod base_entity;
pub mod broker_config;
pub mod cluster_defaults;
pub mod group_blacklist;
pub mod group_consume_control;
pub mod group_resource_control;
pub mod topic_control;
pub mod topic_deployment;

use std::fmt::Debug;
use std::hash::Hash;

pub use base_entity::BaseEntity;
pub use broker_config::BrokerConfig;
pub use cluster_defaults::ClusterDefaults;
pub use group_blacklist::GroupBlacklist;
pub use group_consume_control::GroupConsumeControl;
pub use group_resource_control::GroupResourceControl;
pub use topic_control::TopicControl;
pub use topic_deployment::TopicDeployment;

/// A versioned record addressed by its natural key.
pub trait MetaEntity: Clone + Debug + Send + Sync + 'static {
    type Key: Clone + Debug + Eq + Hash + Ord + Send + Sync + 'static;

    /// Natural key of the record
    fn record_key(&self) -> Self::Key;

    fn base(&self) -> &BaseEntity;

    fn base_mut(&mut self) -> &mut BaseEntity;

    /// Compares the business fields only, ignoring version and audit data.
    fn same_content(&self, other: &Self) -> bool;
}
