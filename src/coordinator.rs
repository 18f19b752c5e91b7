//! Dual-interval refresh coordinator
//!
//! The coordinator is the sole owner and writer of the per-VIN snapshot
//! table. A soft interval (`scan_interval`) paces full refresh cycles that
//! read the cloud's last-known data; a much longer hard interval
//! (`hard_poll_interval`) throttles commanded live polls of the physical
//! vehicle, which are expensive and rate-limited upstream. Out-of-band
//! refresh and override-poll requests arrive over a channel and are
//! serialized with scheduled ticks in one select loop.

use crate::config::PollingConfig;
use crate::error::{Result, TribecaError};
use crate::logging::get_logger;
use crate::starlink::{SubaruClient, VehicleData};
use crate::vehicle::VehicleInfo;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// VIN to last-fetched data; replaced wholesale each successful cycle
pub type SnapshotMap = HashMap<String, VehicleData>;

/// Out-of-band work injected into the coordinator loop
#[derive(Debug)]
pub enum CoordinatorRequest {
    /// Run a full refresh cycle now; replies with overall success
    Refresh { done: oneshot::Sender<bool> },

    /// Command a live poll for one vehicle, ignoring the hard interval
    HardPoll {
        vin: String,
        done: oneshot::Sender<Result<bool>>,
    },
}

/// Refresh coordinator task state
pub struct Coordinator {
    client: Arc<dyn SubaruClient>,
    vehicles: HashMap<String, VehicleInfo>,
    options: watch::Receiver<PollingConfig>,
    snapshot_tx: watch::Sender<Arc<SnapshotMap>>,
    requests_rx: mpsc::UnboundedReceiver<CoordinatorRequest>,
    shutdown_rx: mpsc::UnboundedReceiver<()>,
    logger: crate::logging::StructuredLogger,
}

/// Cloneable handle for readers and command dispatch
#[derive(Clone)]
pub struct CoordinatorHandle {
    requests_tx: mpsc::UnboundedSender<CoordinatorRequest>,
    shutdown_tx: mpsc::UnboundedSender<()>,
    snapshot_rx: watch::Receiver<Arc<SnapshotMap>>,
}

/// Wall-clock seconds since the Unix epoch
pub fn epoch_now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl Coordinator {
    /// Create a coordinator and its handle
    pub fn new(
        client: Arc<dyn SubaruClient>,
        vehicles: HashMap<String, VehicleInfo>,
        options: watch::Receiver<PollingConfig>,
    ) -> (Self, CoordinatorHandle) {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(SnapshotMap::new()));
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();

        let coordinator = Self {
            client,
            vehicles,
            options,
            snapshot_tx,
            requests_rx,
            shutdown_rx,
            logger: get_logger("coordinator"),
        };
        let handle = CoordinatorHandle {
            requests_tx,
            shutdown_tx,
            snapshot_rx,
        };
        (coordinator, handle)
    }

    /// Capability record for a VIN, if known
    pub fn vehicle(&self, vin: &str) -> Option<&VehicleInfo> {
        self.vehicles.get(vin)
    }

    /// Run the coordinator loop until shutdown
    ///
    /// The first tick fires immediately, providing the initial refresh at
    /// setup. Interval changes published on the options channel take effect
    /// on the next scheduled cycle.
    pub async fn run(mut self) {
        self.logger.info("Starting refresh coordinator");

        let mut scan = self.options.borrow().scan_interval();
        let mut ticker = tokio::time::interval(scan);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        self.logger.error(&format!("Refresh cycle failed: {}", e));
                        // Keep polling; the previous snapshot stays current
                    }
                }
                Some(request) = self.requests_rx.recv() => {
                    self.handle_request(request).await;
                }
                _ = self.shutdown_rx.recv() => {
                    self.logger.info("Shutdown signal received");
                    break;
                }
            }

            let current = self.options.borrow().scan_interval();
            if current != scan {
                self.logger.info(&format!(
                    "Fetch interval changed from {:?} to {:?}",
                    scan, current
                ));
                scan = current;
                ticker =
                    tokio::time::interval_at(tokio::time::Instant::now() + scan, scan);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            }
        }
    }

    /// Run one full refresh cycle at the current wall-clock time
    pub async fn refresh_once(&mut self) -> Result<()> {
        self.refresh_at(epoch_now()).await
    }

    /// Run one full refresh cycle with an injected clock
    ///
    /// Data fetch/update must be done one vehicle at a time: the cloud API
    /// keeps a server-side vehicle context. The snapshot is only replaced if
    /// the whole cycle succeeds.
    pub async fn refresh_at(&mut self, now_epoch: f64) -> Result<()> {
        let mut data = SnapshotMap::new();

        let vins: Vec<String> = self.vehicles.keys().cloned().collect();
        for vin in vins {
            let safety = self
                .vehicles
                .get(&vin)
                .map(|v| v.has_safety_service)
                .unwrap_or(false);
            // Active subscription required
            if !safety {
                continue;
            }

            // Poll vehicle (throttled with the hard interval)
            self.hard_poll_if_due(&vin, now_epoch, false).await?;

            // Fetch data from cloud servers
            self.client.fetch(&vin, true).await?;
            let mut vehicle_data = self.client.get_data(&vin).await?;

            // If the vehicle pushed a bad location, force one new poll
            if !vehicle_data.location_valid() {
                self.hard_poll_if_due(&vin, now_epoch, true).await?;
                self.client.fetch(&vin, true).await?;
                vehicle_data = self.client.get_data(&vin).await?;
            }

            data.insert(vin, vehicle_data);
        }

        self.snapshot_tx.send_replace(Arc::new(data));
        self.logger.debug("Refresh cycle completed");
        Ok(())
    }

    /// Command a live poll if the hard interval elapsed or on override
    ///
    /// Returns `None` when the poll was skipped. The timestamp is stamped
    /// once the call returns, whatever boolean the cloud reports; transport
    /// errors propagate without stamping.
    async fn hard_poll_if_due(
        &mut self,
        vin: &str,
        now_epoch: f64,
        override_interval: bool,
    ) -> Result<Option<bool>> {
        let hard_interval = self.options.borrow().hard_poll_interval_secs;
        let due = self
            .vehicles
            .get(vin)
            .map(|v| v.hard_poll_due(now_epoch, hard_interval))
            .unwrap_or(false);
        if !due && !override_interval {
            return Ok(None);
        }

        let result = self.client.update(vin, true).await?;
        if let Some(vehicle) = self.vehicles.get_mut(vin) {
            vehicle.last_hard_poll = now_epoch;
        }
        Ok(Some(result))
    }

    async fn handle_request(&mut self, request: CoordinatorRequest) {
        match request {
            CoordinatorRequest::Refresh { done } => {
                let ok = match self.refresh_once().await {
                    Ok(()) => true,
                    Err(e) => {
                        self.logger.error(&format!("Requested refresh failed: {}", e));
                        false
                    }
                };
                let _ = done.send(ok);
            }
            CoordinatorRequest::HardPoll { vin, done } => {
                let result = if self.vehicles.contains_key(&vin) {
                    self.hard_poll_if_due(&vin, epoch_now(), true)
                        .await
                        .map(|r| r.unwrap_or(false))
                } else {
                    Err(TribecaError::unknown_vehicle(vin.clone()))
                };
                let _ = done.send(result);
            }
        }
    }
}

impl CoordinatorHandle {
    /// Latest published snapshot (consistent as of one poll cycle)
    pub fn latest(&self) -> Arc<SnapshotMap> {
        self.snapshot_rx.borrow().clone()
    }

    /// Run a refresh cycle now and wait for it; false on failure
    pub async fn refresh(&self) -> bool {
        let (done, rx) = oneshot::channel();
        if self
            .requests_tx
            .send(CoordinatorRequest::Refresh { done })
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Queue a refresh without waiting for the result
    pub fn request_refresh(&self) {
        let (done, _) = oneshot::channel();
        let _ = self.requests_tx.send(CoordinatorRequest::Refresh { done });
    }

    /// Command an override live poll for one vehicle and wait for it
    pub async fn hard_poll(&self, vin: &str) -> Result<bool> {
        let (done, rx) = oneshot::channel();
        self.requests_tx
            .send(CoordinatorRequest::HardPoll {
                vin: vin.to_string(),
                done,
            })
            .map_err(|_| TribecaError::generic("Coordinator is not running"))?;
        rx.await
            .map_err(|_| TribecaError::generic("Coordinator dropped the request"))?
    }

    /// Ask the coordinator loop to exit
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Subscribe to snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<Arc<SnapshotMap>> {
        self.snapshot_rx.clone()
    }
}
