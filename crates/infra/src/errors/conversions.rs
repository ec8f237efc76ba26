//! Conversions from external infrastructure errors into gateway errors.

use profitgate_domain::GatewayError;
use quick_xml::events::attributes::AttrError;
use quick_xml::Error as XmlError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the gateway error.
#[derive(Debug)]
pub struct InfraError(pub GatewayError);

impl From<InfraError> for GatewayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GatewayError> for InfraError {
    fn from(value: GatewayError) -> Self {
        Self(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGatewayError {
    fn into_gateway(self) -> GatewayError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for HttpError {
    fn into_gateway(self) -> GatewayError {
        if self.is_builder() {
            return GatewayError::Transport(format!("HTTP client could not be built: {self}"));
        }

        if self.is_timeout() {
            return GatewayError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return GatewayError::Network(format!("HTTP connection failure: {self}"));
        }

        if let Some(status) = self.status() {
            return GatewayError::Network(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        GatewayError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* quick_xml errors → GatewayError */
/* -------------------------------------------------------------------------- */

impl IntoGatewayError for XmlError {
    fn into_gateway(self) -> GatewayError {
        GatewayError::Format { raw: format!("malformed XML: {self}") }
    }
}

impl From<XmlError> for InfraError {
    fn from(value: XmlError) -> Self {
        Self(value.into_gateway())
    }
}

impl From<AttrError> for InfraError {
    fn from(value: AttrError) -> Self {
        Self(XmlError::from(value).into_gateway())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
