//! Shared test doubles
//!
//! `MockSubaruClient` records every client call and serves scripted
//! responses, so tests can assert exactly which cloud operations a scenario
//! performs.

use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tribeca::error::{Result, TribecaError};
use tribeca::starlink::types::LOCATION_VALID;
use tribeca::starlink::{ApiGeneration, SubaruClient, VehicleData};

pub const VIN_G2: &str = "JF2ABCDE6L0000001";
pub const VIN_EV: &str = "JF2FGHIJ2M0000002";
pub const VIN_NO_SAFETY: &str = "JF2KLMNO8N0000003";

/// Scripted per-vehicle identity and capabilities
#[derive(Clone)]
pub struct MockVehicle {
    pub vin: String,
    pub name: String,
    pub api_gen: ApiGeneration,
    pub has_ev: bool,
    pub has_remote_start: bool,
    pub has_remote_service: bool,
    pub has_safety_service: bool,
}

impl MockVehicle {
    /// Gen-2 gas vehicle with full subscriptions
    pub fn g2(vin: &str) -> Self {
        Self {
            vin: vin.to_string(),
            name: "Test Car".to_string(),
            api_gen: ApiGeneration::G2,
            has_ev: false,
            has_remote_start: true,
            has_remote_service: true,
            has_safety_service: true,
        }
    }

    /// Gen-2 PHEV with full subscriptions
    pub fn ev(vin: &str) -> Self {
        Self {
            has_ev: true,
            ..Self::g2(vin)
        }
    }

    /// Vehicle without an active safety subscription
    pub fn no_safety(vin: &str) -> Self {
        Self {
            has_remote_service: false,
            has_safety_service: false,
            ..Self::g2(vin)
        }
    }
}

/// Recording mock of the cloud client
pub struct MockSubaruClient {
    vehicles: Vec<MockVehicle>,
    calls: Mutex<Vec<String>>,
    /// Per-VIN queue of location-validity flags served by successive
    /// `get_data` calls; exhausted queues serve `true`
    location_script: Mutex<HashMap<String, Vec<bool>>>,
    pub fail_commands: AtomicBool,
    pub invalid_pin: AtomicBool,
    pub fail_fetch: AtomicBool,
}

impl MockSubaruClient {
    pub fn new(vehicles: Vec<MockVehicle>) -> Self {
        Self {
            vehicles,
            calls: Mutex::new(Vec::new()),
            location_script: Mutex::new(HashMap::new()),
            fail_commands: AtomicBool::new(false),
            invalid_pin: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
        }
    }

    /// Queue location-validity results for a VIN's future `get_data` calls
    pub fn script_location(&self, vin: &str, flags: &[bool]) {
        self.location_script
            .lock()
            .unwrap()
            .insert(vin.to_string(), flags.to_vec());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Number of recorded calls matching `name:vin`
    pub fn count(&self, name: &str, vin: &str) -> usize {
        let needle = format!("{}:{}", name, vin);
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == needle)
            .count()
    }

    fn record(&self, name: &str, vin: &str) {
        self.calls.lock().unwrap().push(format!("{}:{}", name, vin));
    }

    fn find(&self, vin: &str) -> Option<&MockVehicle> {
        self.vehicles.iter().find(|v| v.vin == vin)
    }

    fn command(&self, name: &str, vin: &str) -> Result<bool> {
        self.record(name, vin);
        if self.invalid_pin.load(Ordering::SeqCst) {
            return Err(TribecaError::invalid_pin("API error: InvalidPin"));
        }
        if self.fail_commands.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(true)
    }
}

#[async_trait::async_trait]
impl SubaruClient for MockSubaruClient {
    async fn connect(&self) -> Result<bool> {
        self.calls.lock().unwrap().push("connect".to_string());
        Ok(true)
    }

    fn vehicles(&self) -> Vec<String> {
        self.vehicles.iter().map(|v| v.vin.clone()).collect()
    }

    fn vin_to_name(&self, vin: &str) -> Option<String> {
        self.find(vin).map(|v| v.name.clone())
    }

    fn get_api_gen(&self, vin: &str) -> Option<ApiGeneration> {
        self.find(vin).map(|v| v.api_gen)
    }

    fn get_ev_status(&self, vin: &str) -> bool {
        self.find(vin).map(|v| v.has_ev).unwrap_or(false)
    }

    fn get_res_status(&self, vin: &str) -> bool {
        self.find(vin).map(|v| v.has_remote_start).unwrap_or(false)
    }

    fn get_remote_status(&self, vin: &str) -> bool {
        self.find(vin)
            .map(|v| v.has_remote_service)
            .unwrap_or(false)
    }

    fn get_safety_status(&self, vin: &str) -> bool {
        self.find(vin)
            .map(|v| v.has_safety_service)
            .unwrap_or(false)
    }

    async fn update(&self, vin: &str, _force: bool) -> Result<bool> {
        self.record("update", vin);
        Ok(true)
    }

    async fn fetch(&self, vin: &str, _force: bool) -> Result<bool> {
        self.record("fetch", vin);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(TribecaError::api("fetch failed"));
        }
        Ok(true)
    }

    async fn get_data(&self, vin: &str) -> Result<VehicleData> {
        self.record("get_data", vin);
        let location_valid = {
            let mut script = self.location_script.lock().unwrap();
            match script.get_mut(vin) {
                Some(queue) if !queue.is_empty() => queue.remove(0),
                _ => true,
            }
        };
        let mut data = VehicleData::default();
        data.status
            .insert(LOCATION_VALID.to_string(), json!(location_valid));
        Ok(data)
    }

    async fn lock(&self, vin: &str) -> Result<bool> {
        self.command("lock", vin)
    }

    async fn unlock(&self, vin: &str) -> Result<bool> {
        self.command("unlock", vin)
    }

    async fn horn(&self, vin: &str) -> Result<bool> {
        self.command("horn", vin)
    }

    async fn lights(&self, vin: &str) -> Result<bool> {
        self.command("lights", vin)
    }

    async fn remote_start(&self, vin: &str) -> Result<bool> {
        self.command("remote_start", vin)
    }

    async fn remote_stop(&self, vin: &str) -> Result<bool> {
        self.command("remote_stop", vin)
    }

    async fn charge_start(&self, vin: &str) -> Result<bool> {
        self.command("charge_start", vin)
    }
}
