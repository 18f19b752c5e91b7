//! Remote command dispatch
//!
//! Each supported vehicle capability registers a named service; incoming
//! service calls are resolved to a [`RemoteCommand`] variant and dispatched
//! through one exhaustive mapping onto the bound client operation. User
//! feedback travels over transient notifications, not a result channel.

use crate::coordinator::CoordinatorHandle;
use crate::error::{Result, TribecaError};
use crate::logging::get_logger;
use crate::notify::{Notifier, PROGRESS_ID};
use crate::starlink::SubaruClient;
use crate::vehicle::VehicleInfo;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A remote vehicle service, one variant per registered service name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteCommand {
    Lock,
    Unlock,
    Horn,
    Lights,
    RemoteStart,
    RemoteStop,
    ChargeStart,
    Update,
    Fetch,
}

impl RemoteCommand {
    /// Every command, in registration order
    pub const ALL: [RemoteCommand; 9] = [
        RemoteCommand::Lock,
        RemoteCommand::Unlock,
        RemoteCommand::Horn,
        RemoteCommand::Lights,
        RemoteCommand::RemoteStart,
        RemoteCommand::RemoteStop,
        RemoteCommand::ChargeStart,
        RemoteCommand::Update,
        RemoteCommand::Fetch,
    ];

    /// Service name for registration and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Horn => "horn",
            Self::Lights => "lights",
            Self::RemoteStart => "remote_start",
            Self::RemoteStop => "remote_stop",
            Self::ChargeStart => "charge_start",
            Self::Update => "update",
            Self::Fetch => "fetch",
        }
    }

    /// Commands whose success changes vehicle state, warranting an
    /// immediate refresh so entities reflect the effect promptly
    pub fn needs_fetch(&self) -> bool {
        matches!(
            self,
            Self::Fetch | Self::RemoteStart | Self::RemoteStop | Self::Update | Self::ChargeStart
        )
    }
}

impl std::fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RemoteCommand {
    type Err = TribecaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lock" => Ok(Self::Lock),
            "unlock" => Ok(Self::Unlock),
            "horn" => Ok(Self::Horn),
            "lights" => Ok(Self::Lights),
            "remote_start" => Ok(Self::RemoteStart),
            "remote_stop" => Ok(Self::RemoteStop),
            "charge_start" => Ok(Self::ChargeStart),
            "update" => Ok(Self::Update),
            "fetch" => Ok(Self::Fetch),
            other => Err(TribecaError::validation(
                "service".to_string(),
                format!("Unknown service: {}", other),
            )),
        }
    }
}

/// Executes remote services against validated vehicles
pub struct CommandDispatcher {
    client: Arc<dyn SubaruClient>,
    vehicles: Arc<HashMap<String, VehicleInfo>>,
    coordinator: CoordinatorHandle,
    notifier: Notifier,
    registered: HashSet<RemoteCommand>,
    logger: crate::logging::StructuredLogger,
}

impl CommandDispatcher {
    /// Build a dispatcher; the registered set is the union of every
    /// vehicle's supported commands
    pub fn new(
        client: Arc<dyn SubaruClient>,
        vehicles: Arc<HashMap<String, VehicleInfo>>,
        coordinator: CoordinatorHandle,
        notifier: Notifier,
    ) -> Self {
        let registered = vehicles
            .values()
            .flat_map(|v| v.supported_commands())
            .collect();
        Self {
            client,
            vehicles,
            coordinator,
            notifier,
            registered,
            logger: get_logger("commands"),
        }
    }

    /// Registered service set
    pub fn registered(&self) -> &HashSet<RemoteCommand> {
        &self.registered
    }

    /// Whether a service name was registered at setup
    pub fn is_registered(&self, command: RemoteCommand) -> bool {
        self.registered.contains(&command)
    }

    /// Execute a remote service call
    ///
    /// Returns `Ok(true)`/`Ok(false)` for completed/failed commands and an
    /// error for rejected ones (unknown VIN, wrong PIN). The target VIN is
    /// validated before any client call is made.
    pub async fn execute(&self, command: RemoteCommand, vin: &str) -> Result<bool> {
        let vin = vin.to_uppercase();
        if !self.vehicles.contains_key(&vin) {
            self.notifier
                .create(&format!("ERROR - Invalid VIN: {}", vin));
            return Err(TribecaError::unknown_vehicle(vin));
        }

        // A fetch is a bare coordinator refresh with no notifications
        if command == RemoteCommand::Fetch {
            return self.invoke(command, &vin).await;
        }

        self.logger.debug(&format!("Calling {}", command));
        self.notifier.create_with_id(
            PROGRESS_ID,
            &format!(
                "Calling Subaru Service: {}:{}\nThis may take 10-15 seconds.",
                command, vin
            ),
        );

        let success = match self.invoke(command, &vin).await {
            Ok(ok) => ok,
            Err(e) if e.is_invalid_pin() => {
                self.notifier.dismiss(PROGRESS_ID);
                self.notifier.create("ERROR - Invalid PIN");
                return Err(e);
            }
            Err(e) => {
                self.logger
                    .error(&format!("Service {} failed for {}: {}", command, vin, e));
                false
            }
        };

        if success && command.needs_fetch() {
            self.coordinator.refresh().await;
        }

        self.notifier.dismiss(PROGRESS_ID);
        if success {
            self.notifier
                .create(&format!("Command completed: {}:{}", command, vin));
        } else {
            self.notifier
                .create(&format!("ERROR - Command failed: {}:{}", command, vin));
        }
        Ok(success)
    }

    /// The one place a command identifier meets its bound operation
    async fn invoke(&self, command: RemoteCommand, vin: &str) -> Result<bool> {
        match command {
            RemoteCommand::Lock => self.client.lock(vin).await,
            RemoteCommand::Unlock => self.client.unlock(vin).await,
            RemoteCommand::Horn => self.client.horn(vin).await,
            RemoteCommand::Lights => self.client.lights(vin).await,
            RemoteCommand::RemoteStart => self.client.remote_start(vin).await,
            RemoteCommand::RemoteStop => self.client.remote_stop(vin).await,
            RemoteCommand::ChargeStart => self.client.charge_start(vin).await,
            RemoteCommand::Update => self.coordinator.hard_poll(vin).await,
            RemoteCommand::Fetch => Ok(self.coordinator.refresh().await),
        }
    }
}
