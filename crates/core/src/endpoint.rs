//! Endpoint resolution
//!
//! Pure string substitution over the configured URL template; no network
//! access.

use profitgate_domain::constants::{
    PLACEHOLDER_CONNECTOR_PATH, PLACEHOLDER_CUSTOMER_ID, PLACEHOLDER_ENV, WSDL_QUERY_SUFFIX,
};
use profitgate_domain::{ClientConfig, ConnectorType};

/// Build the endpoint URL for a connector type
///
/// The customer id is percent-escaped before substitution, so it can never
/// introduce another placeholder.
pub fn resolve_endpoint(config: &ClientConfig, connector: ConnectorType) -> String {
    let customer_id = urlencoding::encode(config.customer_id());

    config
        .endpoint_template()
        .replace(PLACEHOLDER_CUSTOMER_ID, &customer_id)
        .replace(PLACEHOLDER_CONNECTOR_PATH, &connector.path_segment())
        .replace(PLACEHOLDER_ENV, config.environment().segment())
}

/// WSDL document URL for an endpoint
pub fn wsdl_url(endpoint: &str) -> String {
    format!("{endpoint}{WSDL_QUERY_SUFFIX}")
}
