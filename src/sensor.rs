//! Scalar sensor adapters
//!
//! Passthrough projections of snapshot fields with a unit and icon. Tables
//! are tiered: safety subscribers get the odometer, gen-2 vehicles add the
//! trip/condition set, PHEVs add the EV set.

use crate::entity::VehicleEntity;
use crate::starlink::types as sc;
use crate::starlink::{ApiGeneration, VehicleData};
use crate::vehicle::VehicleInfo;
use serde_json::{Value, json};

/// One row of a sensor table
#[derive(Debug, Clone, Copy)]
pub struct SensorDescriptor {
    /// Entity title
    pub name: &'static str,

    /// Snapshot field to project
    pub field: &'static str,

    /// Unit of measurement, if any
    pub unit: Option<&'static str>,

    /// Presentation icon
    pub icon: &'static str,
}

/// Data available to all safety-service subscribers
pub const SAFETY_SENSORS: &[SensorDescriptor] = &[SensorDescriptor {
    name: "Odometer",
    field: sc::ODOMETER,
    unit: Some("km"),
    icon: "mdi:counter",
}];

/// Data available to safety-service subscribers with gen-2 vehicles
pub const API_GEN_2_SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        name: "Avg Fuel Consumption",
        field: sc::AVG_FUEL_CONSUMPTION,
        unit: Some("L/100km"),
        icon: "mdi:leaf",
    },
    SensorDescriptor {
        name: "Range",
        field: sc::DIST_TO_EMPTY,
        unit: Some("km"),
        icon: "mdi:gas-station",
    },
    SensorDescriptor {
        name: "External Temp",
        field: sc::EXTERNAL_TEMP,
        unit: Some("°C"),
        icon: "mdi:thermometer",
    },
    SensorDescriptor {
        name: "12V Battery Voltage",
        field: sc::BATTERY_VOLTAGE,
        unit: Some("V"),
        icon: "mdi:car-battery",
    },
];

/// Data available to safety-service subscribers with PHEV vehicles
pub const EV_SENSORS: &[SensorDescriptor] = &[
    SensorDescriptor {
        name: "EV Battery Level",
        field: sc::EV_STATE_OF_CHARGE_PERCENT,
        unit: Some("%"),
        icon: "mdi:battery-high",
    },
    SensorDescriptor {
        name: "EV Range",
        field: sc::EV_DISTANCE_TO_EMPTY,
        unit: Some("km"),
        icon: "mdi:car-electric",
    },
    SensorDescriptor {
        name: "EV Charge Rate",
        field: sc::EV_CHARGE_RATE,
        unit: None,
        icon: "mdi:ev-station",
    },
];

/// A scalar sensor bound to one vehicle
#[derive(Debug, Clone)]
pub struct VehicleSensor {
    vin: String,
    car_name: String,
    descriptor: &'static SensorDescriptor,
}

impl VehicleEntity for VehicleSensor {
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

impl VehicleSensor {
    /// Unit of measurement, if any
    pub fn unit(&self) -> Option<&'static str> {
        self.descriptor.unit
    }

    /// Presentation icon
    pub fn icon(&self) -> &'static str {
        self.descriptor.icon
    }

    /// Raw field value from the snapshot, if present
    pub fn value<'a>(&self, data: &'a VehicleData) -> Option<&'a Value> {
        data.get(self.descriptor.field)
    }

    /// Projection for the web read-out
    pub fn state_json(&self, data: &VehicleData) -> Value {
        json!({
            "name": self.title(),
            "unique_id": self.unique_id(),
            "value": self.value(data).cloned().unwrap_or(Value::Null),
            "unit": self.descriptor.unit,
            "icon": self.descriptor.icon,
        })
    }
}

/// Sensors applicable to a vehicle, per its capability flags
pub fn sensors_for(info: &VehicleInfo) -> Vec<VehicleSensor> {
    let mut descriptors: Vec<&'static SensorDescriptor> = Vec::new();

    descriptors.extend(SAFETY_SENSORS);
    if info.api_gen == ApiGeneration::G2 {
        descriptors.extend(API_GEN_2_SENSORS);
    }
    if info.has_ev {
        descriptors.extend(EV_SENSORS);
    }

    descriptors
        .into_iter()
        .map(|descriptor| VehicleSensor {
            vin: info.vin.clone(),
            car_name: info.display_name.clone(),
            descriptor,
        })
        .collect()
}
