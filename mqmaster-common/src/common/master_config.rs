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

use std::env;
use std::path::MAIN_SEPARATOR;

use serde::Deserialize;
use serde::Serialize;

use crate::common::constant::DEFAULT_REP_STATUS_CHECK_INTERVAL_MS;

pub const MQMASTER_HOME_ENV: &str = "MQMASTER_HOME";

/// Startup configuration of the master process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MasterConfig {
    #[serde(alias = "masterHome")]
    pub master_home: String,

    #[serde(alias = "metaDataPath")]
    pub meta_data_path: String,

    #[serde(alias = "nodeHost")]
    pub node_host: String,

    /// Period of the store role and availability poll
    #[serde(alias = "repStatusCheckIntervalMs")]
    pub rep_status_check_interval_ms: u64,
}

impl Default for MasterConfig {
    fn default() -> Self {
        let master_home = env::var(MQMASTER_HOME_ENV).unwrap_or_default();
        let home_dir = dirs::home_dir()
            .map(|dir| dir.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        let meta_data_path = format!("{home_dir}{MAIN_SEPARATOR}mqmaster{MAIN_SEPARATOR}meta_data");
        MasterConfig {
            master_home,
            meta_data_path,
            node_host: "127.0.0.1".to_string(),
            rep_status_check_interval_ms: DEFAULT_REP_STATUS_CHECK_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = MasterConfig::default();
        assert_eq!(config.node_host, "127.0.0.1");
        assert_eq!(config.rep_status_check_interval_ms, 10_000);
        assert!(config.meta_data_path.ends_with("meta_data"));
    }

    #[test]
    fn test_camel_case_aliases_and_partial_input() {
        let config: MasterConfig =
            serde_json::from_str(r#"{"nodeHost":"10.1.1.1","repStatusCheckIntervalMs":2000}"#).unwrap();
        assert_eq!(config.node_host, "10.1.1.1");
        assert_eq!(config.rep_status_check_interval_ms, 2000);
        assert_eq!(config.meta_data_path, MasterConfig::default().meta_data_path);
    }
}
