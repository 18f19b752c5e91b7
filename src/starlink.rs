//! Vehicle cloud client boundary
//!
//! Everything outside this module treats the vehicle cloud as an opaque
//! async client: connect, enumerate vehicles, read capability flags, command
//! live polls, fetch cached data, and invoke named remote actions. The
//! production implementation lives in [`client`]; tests substitute their own.

pub mod api;
pub mod client;
pub mod types;

pub use client::StarlinkClient;
pub use types::{ApiGeneration, VehicleData, VehicleProfile};

use crate::error::Result;

/// Opaque interface to the vehicle cloud
///
/// Capability getters are synchronous reads of the profile cache populated by
/// [`connect`](SubaruClient::connect); data and command operations go to the
/// network.
#[async_trait::async_trait]
pub trait SubaruClient: Send + Sync {
    /// Authenticate and enumerate the account's vehicles
    async fn connect(&self) -> Result<bool>;

    /// Known VINs (uppercase), in no particular order
    fn vehicles(&self) -> Vec<String>;

    /// Display name for a VIN
    fn vin_to_name(&self, vin: &str) -> Option<String>;

    /// Telematics generation for a VIN
    fn get_api_gen(&self, vin: &str) -> Option<ApiGeneration>;

    /// Whether the vehicle is a plug-in EV
    fn get_ev_status(&self, vin: &str) -> bool;

    /// Whether the vehicle supports remote engine start
    fn get_res_status(&self, vin: &str) -> bool;

    /// Whether the account has an active remote-services subscription
    fn get_remote_status(&self, vin: &str) -> bool;

    /// Whether the account has an active safety-service subscription
    fn get_safety_status(&self, vin: &str) -> bool;

    /// Command a live poll of the physical vehicle (expensive, rate-limited)
    async fn update(&self, vin: &str, force: bool) -> Result<bool>;

    /// Pull last-known server-side data into the client cache
    async fn fetch(&self, vin: &str, force: bool) -> Result<bool>;

    /// Snapshot of the cached data for a VIN
    async fn get_data(&self, vin: &str) -> Result<VehicleData>;

    /// Lock the doors
    async fn lock(&self, vin: &str) -> Result<bool>;

    /// Unlock the doors
    async fn unlock(&self, vin: &str) -> Result<bool>;

    /// Sound the horn (with lights)
    async fn horn(&self, vin: &str) -> Result<bool>;

    /// Flash the lights
    async fn lights(&self, vin: &str) -> Result<bool>;

    /// Start the engine / climate remotely
    async fn remote_start(&self, vin: &str) -> Result<bool>;

    /// Stop a remote engine start
    async fn remote_stop(&self, vin: &str) -> Result<bool>;

    /// Begin EV charging now
    async fn charge_start(&self, vin: &str) -> Result<bool>;
}
