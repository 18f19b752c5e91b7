//! Per-vehicle identity and capability records
//!
//! A [`VehicleInfo`] is built once at setup from the client's capability
//! getters. Apart from the hard-poll timestamp, which the refresh
//! coordinator advances, the record is static for the life of the session.

use crate::commands::RemoteCommand;
use crate::starlink::{ApiGeneration, SubaruClient};
use serde::Serialize;

/// Static per-VIN record of identity and capability flags
#[derive(Debug, Clone, Serialize)]
pub struct VehicleInfo {
    /// Vehicle identification number (uppercase)
    pub vin: String,

    /// Display name from the account (nickname, falls back to VIN)
    pub display_name: String,

    /// Plug-in EV flag
    pub has_ev: bool,

    /// Telematics API generation
    pub api_gen: ApiGeneration,

    /// Remote engine start flag
    pub has_remote_start: bool,

    /// Active remote-services subscription
    pub has_remote_service: bool,

    /// Active safety-service subscription (gates all telemetry polling)
    pub has_safety_service: bool,

    /// Epoch seconds of the last commanded live poll; 0 = never
    #[serde(skip)]
    pub last_hard_poll: f64,
}

impl VehicleInfo {
    /// Obtain vehicle identifiers and capabilities from the client cache
    pub fn from_client(client: &dyn SubaruClient, vin: &str) -> Self {
        Self {
            vin: vin.to_string(),
            display_name: client.vin_to_name(vin).unwrap_or_else(|| vin.to_string()),
            has_ev: client.get_ev_status(vin),
            api_gen: client.get_api_gen(vin).unwrap_or(ApiGeneration::G1),
            has_remote_start: client.get_res_status(vin),
            has_remote_service: client.get_remote_status(vin),
            has_safety_service: client.get_safety_status(vin),
            last_hard_poll: 0.0,
        }
    }

    /// Remote commands this vehicle's capabilities support
    pub fn supported_commands(&self) -> Vec<RemoteCommand> {
        let mut commands = Vec::new();
        if self.has_safety_service {
            commands.push(RemoteCommand::Fetch);
        }
        if self.has_remote_service {
            commands.push(RemoteCommand::Horn);
            commands.push(RemoteCommand::Lights);
            commands.push(RemoteCommand::Lock);
            commands.push(RemoteCommand::Unlock);
            commands.push(RemoteCommand::Update);
        }
        if self.has_remote_start || self.has_ev {
            commands.push(RemoteCommand::RemoteStart);
            commands.push(RemoteCommand::RemoteStop);
        }
        if self.has_ev {
            commands.push(RemoteCommand::ChargeStart);
        }
        commands
    }

    /// Whether a live poll is due given the configured hard interval
    pub fn hard_poll_due(&self, now_epoch: f64, hard_interval_secs: u64) -> bool {
        now_epoch - self.last_hard_poll > hard_interval_secs as f64
    }
}
