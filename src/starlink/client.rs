//! Production client for the MySubaru vehicle cloud
//!
//! Holds the cookie-backed session, the enumerated vehicle profiles, and the
//! per-VIN data cache. Remote services on this API are asynchronous: an
//! execute call returns a service-request id which is then polled until the
//! vehicle acknowledges.

use crate::config::AccountConfig;
use crate::error::{Result, TribecaError};
use crate::logging::get_logger;
use crate::starlink::api::{self, ApiClient, check_success};
use crate::starlink::types::{self, ApiGeneration, VehicleData, VehicleProfile};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::RwLock;

/// Condition-report fields worth keeping, response key to canonical name
const CONDITION_FIELDS: &[(&str, &str)] = &[
    ("vehicleStateType", types::VEHICLE_STATE),
    ("odometer", types::ODOMETER),
    ("avgFuelConsumption", types::AVG_FUEL_CONSUMPTION),
    ("distanceToEmptyFuel", types::DIST_TO_EMPTY),
    ("extExternalTemp", types::EXTERNAL_TEMP),
    ("batteryVoltage", types::BATTERY_VOLTAGE),
    ("doorBootPosition", types::DOOR_BOOT_POSITION),
    ("doorEngineHoodPosition", types::DOOR_ENGINE_HOOD_POSITION),
    ("doorFrontLeftPosition", types::DOOR_FRONT_LEFT_POSITION),
    ("doorFrontRightPosition", types::DOOR_FRONT_RIGHT_POSITION),
    ("doorRearLeftPosition", types::DOOR_REAR_LEFT_POSITION),
    ("doorRearRightPosition", types::DOOR_REAR_RIGHT_POSITION),
    ("evIsPluggedIn", types::EV_IS_PLUGGED_IN),
    ("evChargerStateType", types::EV_CHARGER_STATE_TYPE),
    ("evStateOfChargePercent", types::EV_STATE_OF_CHARGE_PERCENT),
    ("evDistanceToEmpty", types::EV_DISTANCE_TO_EMPTY),
    ("evChargeRate", types::EV_CHARGE_RATE),
    ("lastUpdatedTime", types::TIMESTAMP),
];

#[derive(Default)]
struct ClientState {
    profiles: HashMap<String, VehicleProfile>,
    data: HashMap<String, VehicleData>,
    current_vin: Option<String>,
}

/// MySubaru mobile API client
pub struct StarlinkClient {
    api: ApiClient,
    account: AccountConfig,
    device_name: String,
    state: RwLock<ClientState>,
    logger: crate::logging::StructuredLogger,
}

impl StarlinkClient {
    /// Create a new client; no network traffic until [`connect`](Self::connect)
    pub fn new(account: AccountConfig) -> Result<Self> {
        let date = chrono::Local::now().format("%Y-%m-%d");
        Ok(Self {
            api: ApiClient::new()?,
            account,
            device_name: format!("Tribeca: Added {}", date),
            state: RwLock::new(ClientState::default()),
            logger: get_logger("starlink"),
        })
    }

    fn state_read(&self) -> std::sync::RwLockReadGuard<'_, ClientState> {
        self.state
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn state_write(&self) -> std::sync::RwLockWriteGuard<'_, ClientState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn profile(&self, vin: &str) -> Option<VehicleProfile> {
        self.state_read().profiles.get(vin).cloned()
    }

    fn now_ms() -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }

    async fn login(&self) -> Result<()> {
        let params = [
            ("env", "cloudprod".to_string()),
            ("loginUsername", self.account.username.clone()),
            ("password", self.account.password.clone()),
            ("deviceId", self.account.device_id.clone()),
            ("deviceType", "android".to_string()),
            ("deviceName", self.device_name.clone()),
        ];
        let body = self.api.post_form(api::API_LOGIN, &params).await?;
        let data = check_success(body)?;

        let registered = data
            .get("deviceRegistered")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        if !registered {
            return Err(TribecaError::auth(
                "Device is not registered with this account",
            ));
        }
        self.logger.info("Authenticated with vehicle cloud");
        Ok(())
    }

    async fn enumerate_vehicles(&self) -> Result<()> {
        let params = [("_", Self::now_ms())];
        let body = self.api.get_json(api::API_REFRESH_VEHICLES, &params).await?;
        let data = check_success(body)?;

        let vehicles = data
            .get("vehicles")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut profiles = HashMap::new();
        for entry in &vehicles {
            let Some(vin) = entry.get("vin").and_then(|v| v.as_str()) else {
                continue;
            };
            let vin = vin.to_uppercase();
            let profile = VehicleProfile {
                vin: vin.clone(),
                nickname: entry
                    .get("nickname")
                    .and_then(|v| v.as_str())
                    .unwrap_or(&vin)
                    .to_string(),
                features: string_list(entry.get("features")),
                subscription_features: string_list(entry.get("subscriptionFeatures")),
                subscription_status: entry
                    .get("subscriptionStatus")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
            };
            profiles.insert(vin, profile);
        }

        self.logger
            .info(&format!("Enumerated {} vehicle(s)", profiles.len()));
        self.state_write().profiles = profiles;
        Ok(())
    }

    /// Switch the server-side vehicle context; API calls are vehicle-scoped
    async fn select_vehicle(&self, vin: &str) -> Result<()> {
        if self.state_read().current_vin.as_deref() == Some(vin) {
            return Ok(());
        }
        let params = [("vin", vin.to_string()), ("_", Self::now_ms())];
        let body = self.api.get_json(api::API_SELECT_VEHICLE, &params).await?;
        check_success(body)?;
        self.state_write().current_vin = Some(vin.to_string());
        Ok(())
    }

    /// Execute a remote service and poll its request until completion
    async fn remote_command(
        &self,
        vin: &str,
        endpoint: &str,
        extra: &[(&str, String)],
    ) -> Result<bool> {
        self.select_vehicle(vin).await?;

        let mut params = vec![
            ("pin", self.account.pin.clone()),
            ("delay", "0".to_string()),
            ("vin", vin.to_string()),
        ];
        params.extend(extra.iter().map(|(k, v)| (*k, v.clone())));

        let body = self.api.post_form(endpoint, &params).await?;
        let data = check_success(body)?;

        let Some(request_id) = data
            .get("serviceRequestId")
            .and_then(|v| v.as_str())
            .map(str::to_string)
        else {
            // Some services acknowledge synchronously
            return Ok(data.get("success").and_then(|v| v.as_bool()).unwrap_or(true));
        };

        self.poll_remote_service(&request_id).await
    }

    async fn poll_remote_service(&self, request_id: &str) -> Result<bool> {
        let params = [
            ("serviceRequestId", request_id.to_string()),
            ("_", Self::now_ms()),
        ];
        for _ in 0..api::SERVICE_POLL_ATTEMPTS {
            tokio::time::sleep(api::SERVICE_POLL_INTERVAL).await;
            let body = self.api.get_json(api::API_REMOTE_SVC_STATUS, &params).await?;
            let data = check_success(body)?;
            let state = data
                .get("remoteServiceState")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            if state == "finished" {
                return Ok(data.get("success").and_then(|v| v.as_bool()).unwrap_or(false));
            }
        }
        self.logger.warn(&format!(
            "Remote service request {} did not finish in time",
            request_id
        ));
        Ok(false)
    }

    async fn fetch_condition(&self) -> Result<HashMap<String, Value>> {
        let body = self
            .api
            .get_json(api::API_CONDITION, &[("_", Self::now_ms())])
            .await?;
        let data = check_success(body)?;
        let result = data.get("result").cloned().unwrap_or(Value::Null);

        let mut status = HashMap::new();
        for (response_key, field) in CONDITION_FIELDS {
            if let Some(value) = result.get(*response_key) {
                if !value.is_null() {
                    status.insert((*field).to_string(), value.clone());
                }
            }
        }
        Ok(status)
    }

    async fn fetch_location(&self, status: &mut HashMap<String, Value>) -> Result<()> {
        let body = self
            .api
            .get_json(api::API_LOCATE, &[("_", Self::now_ms())])
            .await?;
        let data = check_success(body)?;
        let result = data.get("result").cloned().unwrap_or(Value::Null);

        let lat = result.get("latitude").and_then(|v| v.as_f64());
        let lon = result.get("longitude").and_then(|v| v.as_f64());
        if let Some(lat) = lat {
            status.insert(types::LATITUDE.to_string(), json!(lat));
        }
        if let Some(lon) = lon {
            status.insert(types::LONGITUDE.to_string(), json!(lon));
        }
        status.insert(
            types::LOCATION_VALID.to_string(),
            json!(types::location_is_valid(lat, lon)),
        );
        Ok(())
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait::async_trait]
impl super::SubaruClient for StarlinkClient {
    async fn connect(&self) -> Result<bool> {
        self.login().await?;
        self.enumerate_vehicles().await?;
        Ok(true)
    }

    fn vehicles(&self) -> Vec<String> {
        self.state_read().profiles.keys().cloned().collect()
    }

    fn vin_to_name(&self, vin: &str) -> Option<String> {
        self.profile(vin).map(|p| p.nickname)
    }

    fn get_api_gen(&self, vin: &str) -> Option<ApiGeneration> {
        self.profile(vin).map(|p| p.api_gen())
    }

    fn get_ev_status(&self, vin: &str) -> bool {
        self.profile(vin).map(|p| p.has_ev()).unwrap_or(false)
    }

    fn get_res_status(&self, vin: &str) -> bool {
        self.profile(vin)
            .map(|p| p.has_remote_start())
            .unwrap_or(false)
    }

    fn get_remote_status(&self, vin: &str) -> bool {
        self.profile(vin)
            .map(|p| p.has_remote_service())
            .unwrap_or(false)
    }

    fn get_safety_status(&self, vin: &str) -> bool {
        self.profile(vin)
            .map(|p| p.has_safety_service())
            .unwrap_or(false)
    }

    /// Command a live poll of the physical vehicle. The bridge coordinator
    /// throttles these; `force` is accepted for interface parity and the
    /// call always executes.
    async fn update(&self, vin: &str, _force: bool) -> Result<bool> {
        match self.get_api_gen(vin) {
            Some(ApiGeneration::G2) => {
                self.remote_command(vin, api::API_VEHICLE_STATUS, &[]).await
            }
            // Gen-1 telematics cannot be actively polled
            _ => Ok(false),
        }
    }

    async fn fetch(&self, vin: &str, _force: bool) -> Result<bool> {
        self.select_vehicle(vin).await?;

        let mut status = self.fetch_condition().await?;
        if let Err(e) = self.fetch_location(&mut status).await {
            // A failed locate still yields a usable (location-invalid) report
            self.logger
                .warn(&format!("Location fetch failed for {}: {}", vin, e));
            status.insert(types::LOCATION_VALID.to_string(), json!(false));
        }

        self.state_write()
            .data
            .insert(vin.to_string(), VehicleData { status });
        Ok(true)
    }

    async fn get_data(&self, vin: &str) -> Result<VehicleData> {
        self.state_read()
            .data
            .get(vin)
            .cloned()
            .ok_or_else(|| TribecaError::api(format!("No data fetched for {}", vin)))
    }

    async fn lock(&self, vin: &str) -> Result<bool> {
        self.remote_command(vin, api::API_LOCK, &[]).await
    }

    async fn unlock(&self, vin: &str) -> Result<bool> {
        self.remote_command(vin, api::API_UNLOCK, &[]).await
    }

    async fn horn(&self, vin: &str) -> Result<bool> {
        self.remote_command(vin, api::API_HORN_LIGHTS, &[]).await
    }

    async fn lights(&self, vin: &str) -> Result<bool> {
        self.remote_command(vin, api::API_LIGHTS_ONLY, &[]).await
    }

    async fn remote_start(&self, vin: &str) -> Result<bool> {
        let extra = [("runTimeMinutes", "10".to_string())];
        self.remote_command(vin, api::API_ENGINE_START, &extra).await
    }

    async fn remote_stop(&self, vin: &str) -> Result<bool> {
        self.remote_command(vin, api::API_ENGINE_STOP, &[]).await
    }

    async fn charge_start(&self, vin: &str) -> Result<bool> {
        self.remote_command(vin, api::API_EV_CHARGE_NOW, &[]).await
    }
}
