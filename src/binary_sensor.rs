//! Binary sensor adapters
//!
//! Static tables mapping a snapshot field and its "on" values onto a boolean
//! read-out. Which tables apply to a vehicle is decided once at setup from
//! its capability flags.

use crate::entity::{DeviceClass, VehicleEntity};
use crate::starlink::types as sc;
use crate::starlink::{ApiGeneration, VehicleData};
use crate::vehicle::VehicleInfo;
use serde_json::{Value, json};

/// One row of a binary sensor table
#[derive(Debug, Clone, Copy)]
pub struct BinarySensorDescriptor {
    /// Entity title
    pub name: &'static str,

    /// Snapshot field to project
    pub field: &'static str,

    /// Presentation class
    pub device_class: DeviceClass,

    /// Values of the field that read as "on"
    pub on_values: &'static [&'static str],
}

/// Data available to safety-service subscribers with gen-2 vehicles
pub const API_GEN_2_SENSORS: &[BinarySensorDescriptor] = &[
    BinarySensorDescriptor {
        name: "Ignition",
        field: sc::VEHICLE_STATE,
        device_class: DeviceClass::Power,
        on_values: &[sc::IGNITION_ON],
    },
    BinarySensorDescriptor {
        name: "Trunk",
        field: sc::DOOR_BOOT_POSITION,
        device_class: DeviceClass::Door,
        on_values: &[sc::DOOR_OPEN],
    },
    BinarySensorDescriptor {
        name: "Hood",
        field: sc::DOOR_ENGINE_HOOD_POSITION,
        device_class: DeviceClass::Door,
        on_values: &[sc::DOOR_OPEN],
    },
    BinarySensorDescriptor {
        name: "Front Left Door",
        field: sc::DOOR_FRONT_LEFT_POSITION,
        device_class: DeviceClass::Door,
        on_values: &[sc::DOOR_OPEN],
    },
    BinarySensorDescriptor {
        name: "Front Right Door",
        field: sc::DOOR_FRONT_RIGHT_POSITION,
        device_class: DeviceClass::Door,
        on_values: &[sc::DOOR_OPEN],
    },
    BinarySensorDescriptor {
        name: "Rear Left Door",
        field: sc::DOOR_REAR_LEFT_POSITION,
        device_class: DeviceClass::Door,
        on_values: &[sc::DOOR_OPEN],
    },
    BinarySensorDescriptor {
        name: "Rear Right Door",
        field: sc::DOOR_REAR_RIGHT_POSITION,
        device_class: DeviceClass::Door,
        on_values: &[sc::DOOR_OPEN],
    },
];

/// Data available to safety-service subscribers with PHEV vehicles
pub const EV_SENSORS: &[BinarySensorDescriptor] = &[
    BinarySensorDescriptor {
        name: "EV Charge Port",
        field: sc::EV_IS_PLUGGED_IN,
        device_class: DeviceClass::Plug,
        on_values: &[sc::LOCKED_CONNECTED, sc::UNLOCKED_CONNECTED],
    },
    BinarySensorDescriptor {
        name: "EV Battery Charging",
        field: sc::EV_CHARGER_STATE_TYPE,
        device_class: DeviceClass::BatteryCharging,
        on_values: &[sc::CHARGING],
    },
];

/// Icon per device class and current state
fn icon_for(device_class: DeviceClass, is_on: bool) -> &'static str {
    match (device_class, is_on) {
        (DeviceClass::Power, true) => "mdi:engine",
        (DeviceClass::Power, false) => "mdi:engine-off",
        (DeviceClass::BatteryCharging, true) => "mdi:car-electric",
        (DeviceClass::BatteryCharging, false) => "mdi:car",
        (DeviceClass::Door, true) => "mdi:door-open",
        (DeviceClass::Door, false) => "mdi:door-closed",
        (DeviceClass::Plug, true) => "mdi:power-plug",
        (DeviceClass::Plug, false) => "mdi:power-plug-off",
    }
}

/// A binary sensor bound to one vehicle
#[derive(Debug, Clone)]
pub struct BinarySensor {
    vin: String,
    car_name: String,
    descriptor: &'static BinarySensorDescriptor,
}

impl VehicleEntity for BinarySensor {
    fn vin(&self) -> &str {
        &self.vin
    }

    fn car_name(&self) -> &str {
        &self.car_name
    }

    fn title(&self) -> &str {
        self.descriptor.name
    }
}

impl BinarySensor {
    /// Presentation class
    pub fn device_class(&self) -> DeviceClass {
        self.descriptor.device_class
    }

    /// Whether the sensor reads "on"; a missing field reads "off"
    pub fn is_on(&self, data: &VehicleData) -> bool {
        data.get_str(self.descriptor.field)
            .map(|value| self.descriptor.on_values.contains(&value))
            .unwrap_or(false)
    }

    /// Icon for the current state
    pub fn icon(&self, data: &VehicleData) -> &'static str {
        icon_for(self.descriptor.device_class, self.is_on(data))
    }

    /// Projection for the web read-out
    pub fn state_json(&self, data: &VehicleData) -> Value {
        json!({
            "name": self.title(),
            "unique_id": self.unique_id(),
            "device_class": self.descriptor.device_class,
            "is_on": self.is_on(data),
            "icon": self.icon(data),
        })
    }
}

/// Binary sensors applicable to a vehicle, per its capability flags
pub fn binary_sensors_for(info: &VehicleInfo) -> Vec<BinarySensor> {
    let mut descriptors: Vec<&'static BinarySensorDescriptor> = Vec::new();

    if info.api_gen == ApiGeneration::G2 {
        descriptors.extend(API_GEN_2_SENSORS);
    }
    if info.has_ev {
        descriptors.extend(EV_SENSORS);
    }

    descriptors
        .into_iter()
        .map(|descriptor| BinarySensor {
            vin: info.vin.clone(),
            car_name: info.display_name.clone(),
            descriptor,
        })
        .collect()
}
