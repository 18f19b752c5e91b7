//! Vehicle data snapshot types and the field vocabulary shared with the
//! entity adapter tables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// Status field names, as normalized from cloud responses
pub const VEHICLE_STATE: &str = "VEHICLE_STATE_TYPE";
pub const ODOMETER: &str = "ODOMETER";
pub const AVG_FUEL_CONSUMPTION: &str = "AVG_FUEL_CONSUMPTION";
pub const DIST_TO_EMPTY: &str = "DISTANCE_TO_EMPTY_FUEL";
pub const EXTERNAL_TEMP: &str = "EXT_EXTERNAL_TEMP";
pub const BATTERY_VOLTAGE: &str = "BATTERY_VOLTAGE";
pub const DOOR_BOOT_POSITION: &str = "DOOR_BOOT_POSITION";
pub const DOOR_ENGINE_HOOD_POSITION: &str = "DOOR_ENGINE_HOOD_POSITION";
pub const DOOR_FRONT_LEFT_POSITION: &str = "DOOR_FRONT_LEFT_POSITION";
pub const DOOR_FRONT_RIGHT_POSITION: &str = "DOOR_FRONT_RIGHT_POSITION";
pub const DOOR_REAR_LEFT_POSITION: &str = "DOOR_REAR_LEFT_POSITION";
pub const DOOR_REAR_RIGHT_POSITION: &str = "DOOR_REAR_RIGHT_POSITION";
pub const EV_IS_PLUGGED_IN: &str = "EV_IS_PLUGGED_IN";
pub const EV_CHARGER_STATE_TYPE: &str = "EV_CHARGER_STATE_TYPE";
pub const EV_STATE_OF_CHARGE_PERCENT: &str = "EV_STATE_OF_CHARGE_PERCENT";
pub const EV_DISTANCE_TO_EMPTY: &str = "EV_DISTANCE_TO_EMPTY";
pub const EV_CHARGE_RATE: &str = "EV_CHARGE_RATE";
pub const LATITUDE: &str = "LATITUDE";
pub const LONGITUDE: &str = "LONGITUDE";
pub const TIMESTAMP: &str = "TIMESTAMP";
pub const LOCATION_VALID: &str = "LOCATION_VALID";

// Status field values
pub const IGNITION_ON: &str = "ON";
pub const IGNITION_OFF: &str = "OFF";
pub const DOOR_OPEN: &str = "OPEN";
pub const DOOR_CLOSED: &str = "CLOSED";
pub const CHARGING: &str = "CHARGING";
pub const LOCKED_CONNECTED: &str = "LOCKED_CONNECTED";
pub const UNLOCKED_CONNECTED: &str = "UNLOCKED_CONNECTED";

// Coordinates the cloud reports when the vehicle has not pushed a usable fix
pub const BAD_LATITUDE: f64 = 90.0;
pub const BAD_LONGITUDE: f64 = 180.0;

/// Telematics API generation of a vehicle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiGeneration {
    /// First-generation telematics: limited data, no active polling
    G1,
    /// Second-generation telematics: full status and remote services
    G2,
}

impl ApiGeneration {
    /// Feature-list marker for this generation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::G1 => "g1",
            Self::G2 => "g2",
        }
    }
}

/// Per-VIN vehicle profile as enumerated from the account
#[derive(Debug, Clone, Default)]
pub struct VehicleProfile {
    pub vin: String,
    pub nickname: String,
    pub features: Vec<String>,
    pub subscription_features: Vec<String>,
    pub subscription_status: String,
}

impl VehicleProfile {
    /// API generation from the feature list; unmarked vehicles are gen 1
    pub fn api_gen(&self) -> ApiGeneration {
        if self.features.iter().any(|f| f == "g2") {
            ApiGeneration::G2
        } else {
            ApiGeneration::G1
        }
    }

    /// Plug-in hybrid flag
    pub fn has_ev(&self) -> bool {
        self.features.iter().any(|f| f == "PHEV")
    }

    /// Remote engine start flag
    pub fn has_remote_start(&self) -> bool {
        self.features.iter().any(|f| f == "RES")
    }

    /// Remote services subscription (lock/unlock/horn/lights)
    pub fn has_remote_service(&self) -> bool {
        self.subscription_active() && self.subscription_features.iter().any(|f| f == "REMOTE")
    }

    /// Safety-plus subscription gating telemetry availability
    pub fn has_safety_service(&self) -> bool {
        self.subscription_active() && self.subscription_features.iter().any(|f| f == "SAFETY")
    }

    fn subscription_active(&self) -> bool {
        self.subscription_status == "ACTIVE"
    }
}

/// Last-fetched status values for one vehicle
///
/// The map is replaced wholesale on every successful poll cycle; readers
/// never observe a partially updated snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VehicleData {
    /// Field name to last-fetched value
    pub status: HashMap<String, Value>,
}

impl VehicleData {
    /// Raw field lookup
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.status.get(field)
    }

    /// Field as a string, if present and textual
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.status.get(field).and_then(|v| v.as_str())
    }

    /// Field as a float, accepting integer values
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.status.get(field).and_then(|v| v.as_f64())
    }

    /// Whether the last pushed location is usable
    pub fn location_valid(&self) -> bool {
        self.status
            .get(LOCATION_VALID)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

/// Compute the location-validity flag from raw coordinates
pub fn location_is_valid(lat: Option<f64>, lon: Option<f64>) -> bool {
    match (lat, lon) {
        (Some(lat), Some(lon)) => {
            lat.is_finite()
                && lon.is_finite()
                && !(lat == BAD_LATITUDE && lon == BAD_LONGITUDE)
                && lat.abs() <= 90.0
                && lon.abs() <= 180.0
        }
        _ => false,
    }
}
