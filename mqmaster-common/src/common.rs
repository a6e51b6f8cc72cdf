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

pub mod constant;
pub mod entity;
pub mod manage_status;
pub mod master_config;
pub mod topic_conf_line;
pub mod topic_prop_group;
pub mod topic_status;

/// Topic name type
pub type TopicName = CheetahString;

/// Consumer group name type
pub type GroupName = CheetahString;
