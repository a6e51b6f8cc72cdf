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

use std::path::PathBuf;

use config::Config;
use mqmaster_common::common::master_config::MasterConfig;
use tracing::info;

/// Loads the master configuration from a properties/toml/json file.
///
/// Keys absent from the file keep their default values. A file that cannot be
/// parsed at all falls back to the default configuration.
pub fn parse_command_and_config_file(config_file: PathBuf) -> anyhow::Result<MasterConfig> {
    let master_config = Config::builder()
        .add_source(config::File::with_name(config_file.to_string_lossy().into_owned().as_str()))
        .build()
        .map_or(MasterConfig::default(), |result| {
            result.try_deserialize::<MasterConfig>().unwrap_or_default()
        });
    info!("mqmaster config: {:?}", master_config);
    Ok(master_config)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_parse_toml_with_camel_case_keys() {
        let dir = std::env::temp_dir().join(format!("mqmaster_conf_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("master.toml");
        fs::write(&file, "nodeHost = \"10.0.0.8\"\nrepStatusCheckIntervalMs = 500\n").unwrap();

        let config = parse_command_and_config_file(file).unwrap();
        assert_eq!(config.node_host, "10.0.0.8");
        assert_eq!(config.rep_status_check_interval_ms, 500);
        assert_eq!(config.meta_data_path, MasterConfig::default().meta_data_path);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = parse_command_and_config_file(PathBuf::from("/nonexistent/mqmaster/master.toml")).unwrap();
        assert_eq!(config, MasterConfig::default());
    }
}
