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
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::manage_status::ManageStatus;
use mqmaster_common::time_utils::get_current_millis;
use mqmaster_error::MetaError;
use mqmaster_error::MetaResult;
use serde::Serialize;

use crate::nodebroker::heartbeat::ConfigPayload;
use crate::nodebroker::heartbeat::HeartbeatResponse;

/// Where a broker stands in reaching the configuration the master intends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyncPhase {
    /// No heartbeat seen since the state was created or reset
    Unregistered,
    /// First heartbeat seen, full configuration handed out
    Registering,
    /// Reported configuration equals the desired one
    Synced,
    /// Desired configuration changed since the broker last acknowledged
    PendingPush,
    ProcessingOnline,
    ProcessingOffline,
    Offline,
}

/// Administrative transition currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BrokerRunStatus {
    Undefined,
    ProcessingOnline,
    ProcessingOffline,
}

/// Serialized configuration a broker is expected to run with.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSnapshot {
    checksum: u32,
    broker_default_conf: CheetahString,
    topic_conf_lines: Vec<String>,
}

impl ConfigSnapshot {
    pub fn new(broker_default_conf: impl Into<CheetahString>, mut topic_conf_lines: Vec<String>) -> Self {
        let broker_default_conf = broker_default_conf.into();
        topic_conf_lines.sort();
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(broker_default_conf.as_str().as_bytes());
        for line in &topic_conf_lines {
            hasher.update(b"\n");
            hasher.update(line.as_bytes());
        }
        Self {
            checksum: hasher.finalize(),
            broker_default_conf,
            topic_conf_lines,
        }
    }

    #[inline]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    #[inline]
    pub fn broker_default_conf(&self) -> &str {
        self.broker_default_conf.as_str()
    }

    #[inline]
    pub fn topic_conf_lines(&self) -> &[String] {
        &self.topic_conf_lines
    }

    #[inline]
    pub fn has_topics(&self) -> bool {
        !self.topic_conf_lines.is_empty()
    }

    fn to_payload(&self) -> ConfigPayload {
        ConfigPayload {
            broker_default_conf: self.broker_default_conf.clone(),
            topic_conf_lines: self.topic_conf_lines.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedConfig {
    pub manage_status: ManageStatus,
    pub snapshot: ConfigSnapshot,
    pub report_time: i64,
}

/// Synchronization bookkeeping of one broker.
///
/// Callers hold the per-broker lock of the sync state table across every
/// method call, so each transition is atomic. Guards are checked before any
/// field is written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerSyncState {
    broker_id: i32,
    broker_ip: CheetahString,
    broker_port: i32,
    broker_tls_port: i32,
    manage_status: ManageStatus,
    phase: SyncPhase,
    is_registered: bool,
    conf_changed: bool,
    conf_loaded: bool,
    fast_start_eligible: bool,
    desired: ConfigSnapshot,
    conf_version: i64,
    reported: Option<ReportedConfig>,
    last_heartbeat_ms: i64,
}

impl BrokerSyncState {
    /// Fast start is only possible for a broker without deployed topics.
    pub fn new(broker: &BrokerConfig, desired: ConfigSnapshot) -> Self {
        let phase = if broker.manage_status.is_online_variant() {
            SyncPhase::Unregistered
        } else {
            SyncPhase::Offline
        };
        Self {
            broker_id: broker.broker_id,
            broker_ip: broker.broker_ip.clone(),
            broker_port: broker.broker_port,
            broker_tls_port: broker.broker_tls_port,
            manage_status: broker.manage_status,
            phase,
            is_registered: false,
            conf_changed: false,
            conf_loaded: false,
            fast_start_eligible: !desired.has_topics(),
            desired,
            conf_version: 1,
            reported: None,
            last_heartbeat_ms: 0,
        }
    }

    pub fn broker_id(&self) -> i32 {
        self.broker_id
    }

    pub fn broker_ip(&self) -> &str {
        self.broker_ip.as_str()
    }

    pub fn manage_status(&self) -> ManageStatus {
        self.manage_status
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    pub fn is_conf_changed(&self) -> bool {
        self.conf_changed
    }

    pub fn is_conf_loaded(&self) -> bool {
        self.conf_loaded
    }

    pub fn is_fast_start_eligible(&self) -> bool {
        self.fast_start_eligible
    }

    pub fn desired(&self) -> &ConfigSnapshot {
        &self.desired
    }

    pub fn conf_version(&self) -> i64 {
        self.conf_version
    }

    pub fn reported(&self) -> Option<&ReportedConfig> {
        self.reported.as_ref()
    }

    pub fn last_heartbeat_ms(&self) -> i64 {
        self.last_heartbeat_ms
    }

    pub fn run_status(&self) -> BrokerRunStatus {
        match self.phase {
            SyncPhase::ProcessingOnline => BrokerRunStatus::ProcessingOnline,
            SyncPhase::ProcessingOffline => BrokerRunStatus::ProcessingOffline,
            _ => BrokerRunStatus::Undefined,
        }
    }

    #[inline]
    pub fn is_transition_in_flight(&self) -> bool {
        matches!(
            self.phase,
            SyncPhase::ProcessingOnline | SyncPhase::ProcessingOffline
        )
    }

    /// Address fields follow the stored broker configuration.
    pub fn update_address(&mut self, broker: &BrokerConfig) {
        self.broker_ip = broker.broker_ip.clone();
        self.broker_port = broker.broker_port;
        self.broker_tls_port = broker.broker_tls_port;
    }

    /// Replaces the desired configuration after a metadata edit.
    ///
    /// Returns whether the configuration actually changed.
    pub fn refresh_desired(&mut self, desired: ConfigSnapshot) -> bool {
        if desired == self.desired {
            return false;
        }
        if desired.has_topics() {
            self.fast_start_eligible = false;
        }
        self.desired = desired;
        self.conf_version += 1;
        if self.phase == SyncPhase::Synced {
            self.phase = SyncPhase::PendingPush;
        }
        true
    }

    /// Administrative switch to an online manage status.
    ///
    /// Fails without touching any field while a previous transition is
    /// unresolved. The fast start hint can only lower eligibility here.
    pub fn trigger_online(
        &mut self,
        manage_status: ManageStatus,
        desired: ConfigSnapshot,
        request_fast_start: bool,
    ) -> MetaResult<()> {
        if self.is_transition_in_flight() {
            return Err(MetaError::illegal_status(format!(
                "The broker is processing {} event(brokerId={}), please try later!",
                if self.phase == SyncPhase::ProcessingOnline {
                    "online"
                } else {
                    "offline"
                },
                self.broker_id
            )));
        }
        self.refresh_desired(desired);
        self.manage_status = manage_status;
        self.fast_start_eligible &= request_fast_start;
        self.phase = SyncPhase::ProcessingOnline;
        Ok(())
    }

    /// Administrative switch to a non-online manage status. Supersedes any
    /// pending online push.
    pub fn trigger_offline(&mut self, manage_status: ManageStatus, desired: ConfigSnapshot) {
        self.refresh_desired(desired);
        self.manage_status = manage_status;
        self.phase = SyncPhase::Offline;
    }

    /// The broker received configuration it has not loaded yet.
    pub fn on_conf_changed(&mut self, fast_start_hint: bool) {
        self.conf_changed = true;
        self.conf_loaded = false;
        self.fast_start_eligible &= fast_start_hint;
        if matches!(self.phase, SyncPhase::Synced | SyncPhase::Registering) {
            self.phase = SyncPhase::PendingPush;
        }
    }

    /// The broker finished loading its configuration. When this lands a
    /// pending sync the hint is committed as is, otherwise it may only lower
    /// eligibility.
    pub fn on_conf_loaded(&mut self, fast_start_hint: bool) {
        self.conf_changed = false;
        self.conf_loaded = true;
        if matches!(
            self.phase,
            SyncPhase::PendingPush | SyncPhase::ProcessingOnline
        ) {
            self.phase = SyncPhase::Synced;
            self.fast_start_eligible = fast_start_hint;
        } else {
            self.fast_start_eligible &= fast_start_hint;
        }
    }

    /// Records a heartbeat and advances the phase from what the broker runs.
    pub fn on_heartbeat(&mut self, manage_status: ManageStatus, reported: ConfigSnapshot) -> HeartbeatResponse {
        let matches_desired = reported.checksum == self.desired.checksum;
        let now = get_current_millis();
        self.is_registered = true;
        self.last_heartbeat_ms = now;
        self.phase = match self.phase {
            SyncPhase::Unregistered => SyncPhase::Registering,
            SyncPhase::Registering | SyncPhase::Synced | SyncPhase::PendingPush => {
                if matches_desired {
                    SyncPhase::Synced
                } else {
                    SyncPhase::PendingPush
                }
            }
            SyncPhase::ProcessingOnline => {
                if matches_desired && manage_status == self.manage_status {
                    SyncPhase::Synced
                } else {
                    SyncPhase::ProcessingOnline
                }
            }
            SyncPhase::Offline => {
                if manage_status.is_online_variant() {
                    SyncPhase::ProcessingOffline
                } else {
                    SyncPhase::Offline
                }
            }
            SyncPhase::ProcessingOffline => {
                if manage_status.is_online_variant() {
                    SyncPhase::ProcessingOffline
                } else {
                    SyncPhase::Offline
                }
            }
        };
        self.reported = Some(ReportedConfig {
            manage_status,
            snapshot: reported,
            report_time: now,
        });
        self.build_response()
    }

    /// Directive for the broker, carrying the desired configuration while
    /// the broker still has to load it.
    pub fn build_response(&self) -> HeartbeatResponse {
        let push = matches!(
            self.phase,
            SyncPhase::Registering | SyncPhase::PendingPush | SyncPhase::ProcessingOnline
        );
        HeartbeatResponse {
            broker_id: self.broker_id,
            manage_status: self.manage_status.code(),
            accept_publish: self.manage_status.accept_publish(),
            accept_subscribe: self.manage_status.accept_subscribe(),
            run_status: self.run_status(),
            fast_start: self.fast_start_eligible,
            conf_version: self.conf_version,
            conf_checksum: self.desired.checksum,
            conf_payload: push.then(|| self.desired.to_payload()),
        }
    }

    /// Forgets what the broker reported while keeping the synchronization
    /// flags and the desired configuration.
    pub fn reset_report(&mut self) {
        self.is_registered = false;
        self.reported = None;
        self.last_heartbeat_ms = 0;
        self.phase = match self.phase {
            SyncPhase::Registering | SyncPhase::Synced | SyncPhase::PendingPush => SyncPhase::Unregistered,
            SyncPhase::ProcessingOffline => SyncPhase::Offline,
            other => other,
        };
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
