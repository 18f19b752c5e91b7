//! Shared entity plumbing
//!
//! Entities are stateless projections of the coordinator snapshot: they hold
//! identity (VIN, car name, title) and a descriptor, never vehicle state.

use crate::coordinator::SnapshotMap;
use serde::Serialize;

/// Device class of a binary sensor, for icon and presentation purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Power,
    Door,
    Plug,
    BatteryCharging,
}

/// Common identity accessors for per-vehicle entities
pub trait VehicleEntity {
    /// VIN of the vehicle this entity belongs to
    fn vin(&self) -> &str;

    /// Display name of the vehicle
    fn car_name(&self) -> &str;

    /// Entity title, unique within the vehicle
    fn title(&self) -> &str;

    /// Friendly name shown to users
    fn friendly_name(&self) -> String {
        format!("{} {}", self.car_name(), self.title())
    }

    /// Stable identifier derived from VIN and title
    fn unique_id(&self) -> String {
        format!(
            "{}_{}",
            self.vin().to_lowercase(),
            self.title().to_lowercase().replace(' ', "_")
        )
    }

    /// An entity is available once its vehicle appears in the snapshot
    fn available(&self, snapshot: &SnapshotMap) -> bool {
        snapshot.contains_key(self.vin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe;

    impl VehicleEntity for Probe {
        fn vin(&self) -> &str {
            "JF2ABCDE6L0000001"
        }
        fn car_name(&self) -> &str {
            "Crosstrek"
        }
        fn title(&self) -> &str {
            "Front Left Door"
        }
    }

    #[test]
    fn identity_helpers() {
        let probe = Probe;
        assert_eq!(probe.friendly_name(), "Crosstrek Front Left Door");
        assert_eq!(probe.unique_id(), "jf2abcde6l0000001_front_left_door");
    }

    #[test]
    fn availability_follows_snapshot() {
        let probe = Probe;
        let mut snapshot = SnapshotMap::new();
        assert!(!probe.available(&snapshot));
        snapshot.insert(probe.vin().to_string(), Default::default());
        assert!(probe.available(&snapshot));
    }
}
