//! Connector types accepted by the remote API

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{GatewayError, ValidationCode};

/// Category of remote operation
///
/// Determines the endpoint path and which argument rules apply. The set is
/// closed: new connector types need their preprocessing reviewed before they
/// are added here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorType {
    Get,
    Update,
    Report,
    Subject,
    Data,
    Token,
    VersionInfo,
}

impl ConnectorType {
    /// Every accepted connector type
    pub const ALL: [Self; 7] = [
        Self::Get,
        Self::Update,
        Self::Report,
        Self::Subject,
        Self::Data,
        Self::Token,
        Self::VersionInfo,
    ];

    /// Lower-case name as used in endpoint paths
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Update => "update",
            Self::Report => "report",
            Self::Subject => "subject",
            Self::Data => "data",
            Self::Token => "token",
            Self::VersionInfo => "versioninfo",
        }
    }

    /// Path segment substituted for `%connectorPath%`
    ///
    /// The token connector lives at `tokenconnector`; every other connector
    /// lives at `appconnector<type>`.
    pub fn path_segment(self) -> String {
        match self {
            Self::Token => "tokenconnector".to_string(),
            other => format!("appconnector{}", other.as_str()),
        }
    }

    /// Whether calls need the app token injected
    pub const fn requires_token(self) -> bool {
        !matches!(self, Self::Token)
    }

    /// Whether `skip`/`take` pagination arguments are validated
    pub const fn validates_pagination(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for ConnectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorType {
    type Err = GatewayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.to_lowercase();
        Self::ALL.into_iter().find(|connector| connector.as_str() == lowered).ok_or_else(|| {
            GatewayError::validation(
                ValidationCode::UnknownConnectorType,
                format!("Invalid connector type '{lowered}'"),
            )
        })
    }
}
