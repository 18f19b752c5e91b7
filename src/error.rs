//! Error types and handling for Tribeca
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Tribeca operations
pub type Result<T> = std::result::Result<T, TribecaError>;

/// Main error type for Tribeca
#[derive(Debug, Error)]
pub enum TribecaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Authentication/session errors against the vehicle cloud
    #[error("Authentication error: {message}")]
    Auth { message: String },

    /// The PIN supplied for a remote command was rejected
    #[error("Invalid PIN: {message}")]
    InvalidPin { message: String },

    /// Vehicle cloud API errors (bad response, service failure)
    #[error("API error: {message}")]
    Api { message: String },

    /// Network/transport errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// A command targeted a VIN that is not in the known-vehicle set
    #[error("Unknown vehicle: {vin}")]
    UnknownVehicle { vin: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl TribecaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        TribecaError::Config {
            message: message.into(),
        }
    }

    /// Create a new auth error
    pub fn auth<S: Into<String>>(message: S) -> Self {
        TribecaError::Auth {
            message: message.into(),
        }
    }

    /// Create a new invalid-PIN error
    pub fn invalid_pin<S: Into<String>>(message: S) -> Self {
        TribecaError::InvalidPin {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        TribecaError::Api {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        TribecaError::Network {
            message: message.into(),
        }
    }

    /// Create a new unknown-vehicle error
    pub fn unknown_vehicle<S: Into<String>>(vin: S) -> Self {
        TribecaError::UnknownVehicle { vin: vin.into() }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        TribecaError::Io {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        TribecaError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        TribecaError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        TribecaError::Generic {
            message: message.into(),
        }
    }

    /// Whether this error is the distinct wrong-PIN failure
    pub fn is_invalid_pin(&self) -> bool {
        matches!(self, TribecaError::InvalidPin { .. })
    }
}

impl From<std::io::Error> for TribecaError {
    fn from(err: std::io::Error) -> Self {
        TribecaError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for TribecaError {
    fn from(err: serde_yaml::Error) -> Self {
        TribecaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TribecaError {
    fn from(err: serde_json::Error) -> Self {
        TribecaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for TribecaError {
    fn from(err: reqwest::Error) -> Self {
        TribecaError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TribecaError::config("test config error");
        assert!(matches!(err, TribecaError::Config { .. }));

        let err = TribecaError::invalid_pin("rejected");
        assert!(matches!(err, TribecaError::InvalidPin { .. }));
        assert!(err.is_invalid_pin());

        let err = TribecaError::validation("field", "test validation error");
        assert!(matches!(err, TribecaError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = TribecaError::auth("login rejected");
        assert_eq!(format!("{}", err), "Authentication error: login rejected");

        let err = TribecaError::unknown_vehicle("JF2ABCDE6L0000001");
        assert_eq!(format!("{}", err), "Unknown vehicle: JF2ABCDE6L0000001");

        let err = TribecaError::validation("polling.scan_interval_secs", "below minimum");
        assert_eq!(
            format!("{}", err),
            "Validation error: polling.scan_interval_secs - below minimum"
        );
    }

    #[test]
    fn test_generic_is_not_invalid_pin() {
        let err = TribecaError::api("remote service failed");
        assert!(!err.is_invalid_pin());
    }
}
