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
use std::process;

use anyhow::bail;
use clap::Parser;
use mqmaster_common::common::master_config::MasterConfig;
use mqmaster_common::log::init_logger_with_level;
use mqmaster_common::log::Level;
use mqmaster_metamanage::bootstrap::Builder;
use mqmaster_metamanage::master_config_parse::parse_command_and_config_file;
use tracing::error;
use tracing::info;

const LOGO: &str = r#"
      __  __  ___   __  __           _
     |  \/  |/ _ \ |  \/  | __ _ ___| |_ ___ _ __
     | |\/| | | | || |\/| |/ _` / __| __/ _ \ '__|
     | |  | | |_| || |  | | (_| \__ \ ||  __/ |
     |_|  |_|\__\_\|_|  |_|\__,_|___/\__\___|_|
    "#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logger_with_level(Level::INFO);

    println!("{}", LOGO);

    match parse_and_merge_config(&args) {
        Ok(master_config) => {
            if args.print_config_item {
                print_config_and_exit(&master_config);
            }

            info!("===== MQMaster Configuration =====");
            info!("Master Home: {}", master_config.master_home);
            info!("Meta Data Path: {}", master_config.meta_data_path);
            info!("Node Host: {}", master_config.node_host);
            info!(
                "Status Check Interval(ms): {}",
                master_config.rep_status_check_interval_ms
            );
            info!("==================================");

            Builder::new()
                .set_master_config(master_config)
                .build()
                .boot()
                .await?;
            Ok(())
        }
        Err(e) => {
            error!("Failed to parse configuration: {}", e);
            process::exit(-1);
        }
    }
}

/// Command line values take precedence over the config file.
fn parse_and_merge_config(args: &Args) -> anyhow::Result<MasterConfig> {
    let mut master_config = if let Some(config_file) = args.config_file.clone() {
        if !config_file.exists() || !config_file.is_file() {
            bail!("Config file does not exist or is not a file: {:?}", config_file);
        }
        info!("Loading config from file: {:?}", config_file);
        parse_command_and_config_file(config_file)?
    } else {
        info!("No config file specified, using default configuration");
        MasterConfig::default()
    };

    if let Some(ref home) = args.master_home {
        master_config.master_home = home.clone();
    }
    if let Some(ref path) = args.meta_data_path {
        master_config.meta_data_path = path.to_string_lossy().to_string();
    }
    if let Some(ref host) = args.node_host {
        master_config.node_host = host.clone();
    }
    if let Some(interval) = args.status_check_interval_ms {
        if interval == 0 {
            bail!("repStatusCheckIntervalMs must be greater than 0");
        }
        master_config.rep_status_check_interval_ms = interval;
    }
    Ok(master_config)
}

fn print_config_and_exit(master_config: &MasterConfig) {
    println!("\n========== Master Configuration ==========");
    println!("masterHome = {}", master_config.master_home);
    println!("metaDataPath = {}", master_config.meta_data_path);
    println!("nodeHost = {}", master_config.node_host);
    println!(
        "repStatusCheckIntervalMs = {}",
        master_config.rep_status_check_interval_ms
    );
    println!("\n==========================================\n");
    process::exit(0);
}

#[derive(Parser, Debug)]
#[command(
    name = "mqmaster",
    version = "0.1.0",
    about = "MQ master control plane",
    long_about = "Metadata manager of the message queue cluster: broker and topic configuration, broker config \
                  synchronization and consumer authorization"
)]
struct Args {
    /// Master config file
    #[arg(short = 'c', long = "configFile", value_name = "FILE", help = "Master config file")]
    config_file: Option<PathBuf>,

    #[arg(short = 'p', long = "printConfigItem", help = "Print all config items and exit")]
    print_config_item: bool,

    /// Overrides MQMASTER_HOME
    #[arg(long = "masterHome", value_name = "PATH", help = "Master home directory")]
    master_home: Option<String>,

    #[arg(long = "metaDataPath", value_name = "PATH", help = "Meta data directory")]
    meta_data_path: Option<PathBuf>,

    #[arg(long = "nodeHost", value_name = "HOST", help = "Address of this master node")]
    node_host: Option<String>,

    #[arg(
        long = "repStatusCheckIntervalMs",
        value_name = "MILLIS",
        help = "Period of the store status poll in milliseconds"
    )]
    status_check_interval_ms: Option<u64>,
}
