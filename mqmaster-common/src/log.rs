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
use std::str::FromStr;

/// Initializes the global logger.
///
/// The level is read from the `RUST_LOG` environment variable and defaults to
/// `INFO` when unset or unparsable. Output carries thread names, thread ids,
/// levels and line numbers.
pub fn init_logger() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| tracing::Level::from_str(value.as_str()).ok())
        .unwrap_or(tracing::Level::INFO);
    init_with_max_level(level);
}

pub fn init_logger_with_level(level: Level) {
    let level = tracing::Level::from_str(level.as_str()).unwrap_or(tracing::Level::INFO);
    init_with_max_level(level);
}

fn init_with_max_level(level: tracing::Level) {
    // a second initialization (tests, embedded use) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_thread_names(true)
        .with_level(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_max_level(level)
        .try_init();
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Level(&'static str);

impl Level {
    pub const ERROR: Level = Level("ERROR");

    pub const WARN: Level = Level("WARN");

    pub const INFO: Level = Level("INFO");

    pub const DEBUG: Level = Level("DEBUG");

    pub const TRACE: Level = Level("TRACE");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.to_ascii_uppercase().as_str() {
            "ERROR" => Ok(Level::ERROR),
            "WARN" => Ok(Level::WARN),
            "INFO" => Ok(Level::INFO),
            "DEBUG" => Ok(Level::DEBUG),
            "TRACE" => Ok(Level::TRACE),
            _ => Err(format!("Invalid log level: {level}")),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
