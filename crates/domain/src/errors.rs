//! Error types used throughout the gateway

use std::fmt;

use thiserror::Error;

/// Static validation codes for rejected calls
///
/// Callers can match on these without parsing messages. `numeric()` returns
/// the integer code historically attached to each rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    /// Connector type is not on the allow-list
    UnknownConnectorType,

    /// `get` call without `take` and without a full-dataset override
    MissingTake,

    /// Literal `take` argument is not numeric
    NonNumericTake,
}

impl ValidationCode {
    /// Stable string code for logging and API consumers
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownConnectorType => "UNKNOWN_CONNECTOR_TYPE",
            Self::MissingTake => "MISSING_TAKE",
            Self::NonNumericTake => "NON_NUMERIC_TAKE",
        }
    }

    /// Integer code for the rejection
    pub const fn numeric(self) -> u16 {
        match self {
            Self::UnknownConnectorType => 40,
            Self::MissingTake => 41,
            Self::NonNumericTake => 42,
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.numeric())
    }
}

/// Main error type for the gateway
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error {code}: {message}")]
    Validation { code: ValidationCode, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String, detail: Option<String> },

    #[error("Unknown response format: {raw}")]
    Format { raw: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Integer code used when the response shape is not recognised
    pub const FORMAT_CODE: u16 = 24;

    /// Build a validation error
    pub fn validation(code: ValidationCode, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    /// Validation code, if this is a validation error
    pub fn validation_code(&self) -> Option<ValidationCode> {
        match self {
            Self::Validation { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Integer code for errors that carry one
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Validation { code, .. } => Some(code.numeric()),
            Self::Format { .. } => Some(Self::FORMAT_CODE),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
