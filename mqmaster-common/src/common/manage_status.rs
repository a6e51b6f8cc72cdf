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

/// Administrator-declared lifecycle state of a broker.
///
/// A broker in [`ManageStatus::New`] has been registered by an administrator
/// but not yet approved, so it is forbidden from serving. Every other defined
/// status counts as applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ManageStatus {
    #[default]
    Undefined,
    New,
    Online,
    OnlineNotWrite,
    OnlineNotRead,
    Offline,
}

impl ManageStatus {
    pub const fn code(&self) -> i32 {
        match self {
            ManageStatus::Undefined => -2,
            ManageStatus::New => 1,
            ManageStatus::Online => 5,
            ManageStatus::OnlineNotWrite => 6,
            ManageStatus::OnlineNotRead => 7,
            ManageStatus::Offline => 9,
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            ManageStatus::Undefined => "Undefined",
            ManageStatus::New => "Pending",
            ManageStatus::Online => "Online",
            ManageStatus::OnlineNotWrite => "OnlineOnlyRead",
            ManageStatus::OnlineNotRead => "OnlineOnlyWrite",
            ManageStatus::Offline => "Offline",
        }
    }

    /// Approved by an administrator, whether currently online or offline
    #[inline]
    pub const fn is_applied(&self) -> bool {
        matches!(
            self,
            ManageStatus::Online | ManageStatus::OnlineNotWrite | ManageStatus::OnlineNotRead | ManageStatus::Offline
        )
    }

    /// The single predicate for every "broker is online" decision
    #[inline]
    pub const fn is_online_variant(&self) -> bool {
        matches!(
            self,
            ManageStatus::Online | ManageStatus::OnlineNotWrite | ManageStatus::OnlineNotRead
        )
    }

    /// Whether producers may publish to the broker in this status
    #[inline]
    pub const fn accept_publish(&self) -> bool {
        matches!(self, ManageStatus::Online | ManageStatus::OnlineNotRead)
    }

    /// Whether consumers may subscribe from the broker in this status
    #[inline]
    pub const fn accept_subscribe(&self) -> bool {
        matches!(self, ManageStatus::Online | ManageStatus::OnlineNotWrite)
    }
}

impl From<i32> for ManageStatus {
    fn from(code: i32) -> Self {
        match code {
            1 => ManageStatus::New,
            5 => ManageStatus::Online,
            6 => ManageStatus::OnlineNotWrite,
            7 => ManageStatus::OnlineNotRead,
            9 => ManageStatus::Offline,
            _ => ManageStatus::Undefined,
        }
    }
}

impl From<ManageStatus> for i32 {
    fn from(status: ManageStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ManageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.description(), self.code())
    }
}

impl Serialize for ManageStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(self.code())
    }
}

impl<'de> Deserialize<'de> for ManageStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = i32::deserialize(deserializer)?;
        Ok(ManageStatus::from(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_variants() {
        assert!(ManageStatus::Online.is_online_variant());
        assert!(ManageStatus::OnlineNotWrite.is_online_variant());
        assert!(ManageStatus::OnlineNotRead.is_online_variant());
        assert!(!ManageStatus::Offline.is_online_variant());
        assert!(!ManageStatus::New.is_online_variant());
    }

    #[test]
    fn test_applied_excludes_pending() {
        assert!(!ManageStatus::Undefined.is_applied());
        assert!(!ManageStatus::New.is_applied());
        assert!(ManageStatus::Offline.is_applied());
        assert!(ManageStatus::OnlineNotRead.is_applied());
    }

    #[test]
    fn test_read_write_permissions() {
        assert!(ManageStatus::OnlineNotRead.accept_publish());
        assert!(!ManageStatus::OnlineNotRead.accept_subscribe());
        assert!(!ManageStatus::OnlineNotWrite.accept_publish());
        assert!(ManageStatus::OnlineNotWrite.accept_subscribe());
        assert!(!ManageStatus::Offline.accept_publish());
    }

    #[test]
    fn test_code_conversion_and_serde() {
        assert_eq!(ManageStatus::from(6), ManageStatus::OnlineNotWrite);
        assert_eq!(ManageStatus::from(42), ManageStatus::Undefined);
        assert_eq!(i32::from(ManageStatus::Offline), 9);
        let json = serde_json::to_string(&ManageStatus::Online).unwrap();
        assert_eq!(json, "5");
        let status: ManageStatus = serde_json::from_str("7").unwrap();
        assert_eq!(status, ManageStatus::OnlineNotRead);
        assert_eq!(ManageStatus::Online.to_string(), "Online(5)");
    }
}
