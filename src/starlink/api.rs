//! HTTP plumbing for the MySubaru mobile API
//!
//! Endpoint table, response envelope handling, and error-code mapping. The
//! mobile API is cookie-session based: every call after login rides on the
//! JSESSIONID cookie held by the client's cookie store.

use crate::error::{Result, TribecaError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Mobile API host
pub const API_SERVER: &str = "mobileapi.prod.subarucs.com";

/// API version prefix
pub const API_VERSION: &str = "/g2v30";

pub const API_LOGIN: &str = "/login.json";
pub const API_REFRESH_VEHICLES: &str = "/refreshVehicles.json";
pub const API_SELECT_VEHICLE: &str = "/selectVehicle.json";
pub const API_VALIDATE_SESSION: &str = "/validateSession.json";

pub const API_CONDITION: &str = "/service/g2/condition/execute.json";
pub const API_LOCATE: &str = "/service/g2/locate/execute.json";
pub const API_VEHICLE_STATUS: &str = "/service/g2/vehicleStatus/execute.json";
pub const API_LOCK: &str = "/service/g2/lock/execute.json";
pub const API_UNLOCK: &str = "/service/g2/unlock/execute.json";
pub const API_HORN_LIGHTS: &str = "/service/g2/hornLights/execute.json";
pub const API_LIGHTS_ONLY: &str = "/service/g2/lightsOnly/execute.json";
pub const API_ENGINE_START: &str = "/service/g2/engineStart/execute.json";
pub const API_ENGINE_STOP: &str = "/service/g2/engineStop/execute.json";
pub const API_EV_CHARGE_NOW: &str = "/service/g2/phevChargeNow/execute.json";
pub const API_REMOTE_SVC_STATUS: &str = "/service/g2/remoteService/status.json";

// Error codes in the response envelope
pub const ERROR_INVALID_CREDENTIALS: &str = "InvalidCredentials";
pub const ERROR_INVALID_ACCOUNT: &str = "invalidAccount";
pub const ERROR_PASSWORD_WARNING: &str = "passwordWarning";
pub const ERROR_INVALID_PIN: &str = "InvalidPin";
pub const ERROR_PIN_LOCKED: &str = "pinLockedOut";
pub const ERROR_SESSION_EXPIRED: &str = "sessionExpired";

/// Interval between remote-service status polls
pub const SERVICE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum remote-service status polls before giving up
pub const SERVICE_POLL_ATTEMPTS: u32 = 30;

/// Thin wrapper around a cookie-holding reqwest client bound to the API base
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Build a client with a fresh cookie store
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::new(reqwest::cookie::Jar::default()))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base: format!("https://{}{}", API_SERVER, API_VERSION),
        })
    }

    /// POST form-encoded parameters, returning the parsed JSON body
    pub async fn post_form(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .http
            .post(format!("{}{}", self.base, endpoint))
            .form(params)
            .send()
            .await?;
        Self::read_json(resp).await
    }

    /// GET with query parameters, returning the parsed JSON body
    pub async fn get_json(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}{}", self.base, endpoint))
            .query(params)
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn read_json(resp: reqwest::Response) -> Result<Value> {
        let status = resp.status();
        if !status.is_success() {
            return Err(TribecaError::network(format!(
                "API returned HTTP {}",
                status
            )));
        }
        let body: Value = resp.json().await?;
        Ok(body)
    }
}

/// Unwrap the `{success, errorCode, data}` envelope into its data payload
pub fn check_success(body: Value) -> Result<Value> {
    let success = body
        .get("success")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    if success {
        return Ok(body.get("data").cloned().unwrap_or(Value::Null));
    }

    let code = body
        .get("errorCode")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    Err(map_error_code(code))
}

/// Map an envelope error code onto the crate error taxonomy
pub fn map_error_code(code: &str) -> TribecaError {
    match code {
        ERROR_INVALID_CREDENTIALS | ERROR_INVALID_ACCOUNT | ERROR_PASSWORD_WARNING
        | ERROR_SESSION_EXPIRED => TribecaError::auth(format!("API error: {}", code)),
        ERROR_INVALID_PIN | ERROR_PIN_LOCKED => {
            TribecaError::invalid_pin(format!("API error: {}", code))
        }
        other => TribecaError::api(format!("API error: {}", other)),
    }
}
