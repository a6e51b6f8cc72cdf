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

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Lifecycle status of a topic deployed on a broker.
///
/// Decommissioning is two-phase: a soft delete can be reverted, a soft remove
/// marks the deployment eligible for hard deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TopicStatus {
    Undefined,
    #[default]
    Normal,
    SoftDelete,
    SoftRemove,
    HardRemove,
}

impl TopicStatus {
    pub const fn code(&self) -> i32 {
        match self {
            TopicStatus::Undefined => -2,
            TopicStatus::Normal => 0,
            TopicStatus::SoftDelete => 1,
            TopicStatus::SoftRemove => 2,
            TopicStatus::HardRemove => 3,
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            TopicStatus::Undefined => "Undefined",
            TopicStatus::Normal => "Normal",
            TopicStatus::SoftDelete => "Soft deleted",
            TopicStatus::SoftRemove => "Soft removed",
            TopicStatus::HardRemove => "Hard removed",
        }
    }

    #[inline]
    pub const fn is_valid(&self) -> bool {
        matches!(self, TopicStatus::Normal)
    }

    /// Past the point of no return in the decommission flow
    #[inline]
    pub const fn is_in_removing(&self) -> bool {
        matches!(self, TopicStatus::SoftRemove | TopicStatus::HardRemove)
    }
}

impl From<i32> for TopicStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => TopicStatus::Normal,
            1 => TopicStatus::SoftDelete,
            2 => TopicStatus::SoftRemove,
            3 => TopicStatus::HardRemove,
            _ => TopicStatus::Undefined,
        }
    }
}

impl From<TopicStatus> for i32 {
    fn from(status: TopicStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.description(), self.code())
    }
}

impl Serialize for TopicStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for TopicStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = i32::deserialize(deserializer)?;
        Ok(TopicStatus::from(code))
    }
}
