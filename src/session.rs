//! Bridge session lifecycle
//!
//! A [`BridgeSession`] is the per-session context passed to all
//! collaborators: the connected client, the vehicle table, the coordinator
//! handle, the command dispatcher, the notifier, and the live polling
//! options. There is no shared mutable data bag; everything travels through
//! this object.

use crate::commands::CommandDispatcher;
use crate::config::{Config, PollingConfig};
use crate::coordinator::{Coordinator, CoordinatorHandle};
use crate::error::Result;
use crate::logging::get_logger;
use crate::notify::Notifier;
use crate::starlink::SubaruClient;
use crate::vehicle::VehicleInfo;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Delay before retrying setup after a connect failure
pub const SETUP_RETRY_SECS: u64 = 30;

/// Per-session context shared by the web surface and command handlers
pub struct BridgeSession {
    /// Static capability records per VIN
    pub vehicles: Arc<HashMap<String, VehicleInfo>>,

    /// Remote service executor
    pub dispatcher: Arc<CommandDispatcher>,

    /// Refresh coordinator handle
    pub coordinator: CoordinatorHandle,

    /// User notification channel
    pub notifier: Notifier,

    options: watch::Sender<PollingConfig>,
    coordinator_task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeSession")
            .field("vehicles", &self.vehicles)
            .finish_non_exhaustive()
    }
}

impl BridgeSession {
    /// Connect and assemble a running session
    ///
    /// A connect failure is a not-ready condition: the caller should retry
    /// later rather than give up. On success the coordinator task is
    /// spawned; its first tick fires immediately, providing the initial
    /// refresh.
    pub async fn start(config: &Config, client: Arc<dyn SubaruClient>) -> Result<Self> {
        let logger = get_logger("session");

        client.connect().await?;

        let mut vehicles = HashMap::new();
        for vin in client.vehicles() {
            let info = VehicleInfo::from_client(client.as_ref(), &vin);
            logger.info(&format!(
                "Found vehicle {} ({}, {:?}, ev={}, safety={})",
                info.display_name, info.vin, info.api_gen, info.has_ev, info.has_safety_service
            ));
            vehicles.insert(vin, info);
        }

        let (options, options_rx) = watch::channel(config.polling);
        let (coordinator, handle) = Coordinator::new(client.clone(), vehicles.clone(), options_rx);
        let coordinator_task = tokio::spawn(coordinator.run());

        let vehicles = Arc::new(vehicles);
        let notifier = Notifier::new();
        let dispatcher = Arc::new(CommandDispatcher::new(
            client,
            vehicles.clone(),
            handle.clone(),
            notifier.clone(),
        ));

        logger.info(&format!(
            "Session ready with {} vehicle(s), {} registered service(s)",
            vehicles.len(),
            dispatcher.registered().len()
        ));

        Ok(Self {
            vehicles,
            dispatcher,
            coordinator: handle,
            notifier,
            options,
            coordinator_task,
        })
    }

    /// Current polling options
    pub fn current_options(&self) -> PollingConfig {
        *self.options.borrow()
    }

    /// Publish new polling options; they take effect on the next scheduled
    /// cycle without a reconnect
    pub fn update_options(&self, polling: PollingConfig) -> Result<()> {
        polling.validate()?;
        let _ = self.options.send(polling);
        Ok(())
    }

    /// Stop the coordinator; the session is unusable afterwards
    pub fn shutdown(&self) {
        self.coordinator.shutdown();
    }

    /// Whether the coordinator task is still running
    pub fn is_running(&self) -> bool {
        !self.coordinator_task.is_finished()
    }
}
