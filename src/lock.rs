//! Door lock entity
//!
//! The vehicle never reports its lock state, so this is a write-only entity:
//! lock and unlock delegate to the command dispatcher and user feedback
//! arrives via notifications like any other remote command.

use crate::commands::{CommandDispatcher, RemoteCommand};
use crate::entity::VehicleEntity;
use crate::error::Result;
use crate::vehicle::VehicleInfo;
use serde_json::{Value, json};

/// Presentation icon for the door lock
pub const LOCK_ICON: &str = "mdi:car-door-lock";

/// Door lock bound to one vehicle
#[derive(Debug, Clone)]
pub struct DoorLock {
    vin: String,
    car_name: String,
}

impl VehicleEntity for DoorLock {
    fn vin(&self) -> &str {
        &self.vin
    }

    fn car_name(&self) -> &str {
        &self.car_name
    }

    fn title(&self) -> &str {
        "Door Lock"
    }
}

impl DoorLock {
    /// Lock the doors
    pub async fn lock(&self, dispatcher: &CommandDispatcher) -> Result<bool> {
        dispatcher.execute(RemoteCommand::Lock, &self.vin).await
    }

    /// Unlock the doors
    pub async fn unlock(&self, dispatcher: &CommandDispatcher) -> Result<bool> {
        dispatcher.execute(RemoteCommand::Unlock, &self.vin).await
    }

    /// Projection for the web read-out
    pub fn state_json(&self) -> Value {
        json!({
            "name": self.title(),
            "unique_id": self.unique_id(),
            "icon": LOCK_ICON,
        })
    }
}

/// Door lock for a vehicle, if its subscription supports remote actuation
pub fn lock_for(info: &VehicleInfo) -> Option<DoorLock> {
    if !info.has_remote_service {
        return None;
    }
    Some(DoorLock {
        vin: info.vin.clone(),
        car_name: info.display_name.clone(),
    })
}
