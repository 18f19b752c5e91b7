//! # Tribeca - Subaru STARLINK Connected-Vehicle Bridge
//!
//! A Rust bridge daemon that connects a Subaru STARLINK account to a local
//! automation surface: it authenticates against the vehicle cloud, polls
//! vehicle state on a dual-interval schedule, projects that state into
//! entity-style read-outs, and translates service calls into remote vehicle
//! commands.
//!
//! ## Features
//!
//! - **Async-first**: built on the Tokio runtime
//! - **Dual-interval polling**: cheap cloud fetches on a soft interval,
//!   throttled live vehicle polls on a hard interval
//! - **Entity adapters**: binary sensors, sensors, and a door lock projected
//!   from one shared per-poll snapshot
//! - **Remote commands**: lock/unlock, horn, lights, remote start/stop,
//!   charging, with transient notification feedback
//! - **Web interface**: REST API and SSE notification stream
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! The application follows a modular architecture with clear separation of
//! concerns:
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `starlink`: Vehicle cloud client (session, data fetch, remote services)
//! - `vehicle`: Per-VIN identity and capability records
//! - `coordinator`: Dual-interval refresh coordinator and snapshot owner
//! - `commands`: Remote command dispatch
//! - `notify`: Transient user notifications
//! - `entity` / `binary_sensor` / `sensor` / `lock`: Entity adapters
//! - `session`: Per-session context wiring it all together
//! - `web`: HTTP server and REST API

pub mod binary_sensor;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod entity;
pub mod error;
pub mod lock;
pub mod logging;
pub mod notify;
pub mod sensor;
pub mod session;
pub mod starlink;
pub mod vehicle;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TribecaError};
pub use session::BridgeSession;
pub use starlink::{StarlinkClient, SubaruClient};
