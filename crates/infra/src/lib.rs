//! # profitgate Infrastructure
//!
//! Infrastructure implementations of the core transport ports.
//!
//! This crate contains:
//! - The HTTP SOAP transport (reqwest blocking client, quick-xml codec)
//! - WSDL fetching and the process-wide WSDL cache
//! - Configuration loading from environment variables and files
//!
//! ## Architecture
//! - Implements traits defined in `profitgate-core`
//! - Contains all "impure" code (network and file I/O)

pub mod config;
pub mod errors;
pub mod http;

use std::sync::Arc;

use profitgate_core::GatewayClient;
use profitgate_domain::{ClientConfig, GatewayError, Result, TransportSelector};

pub use http::{set_cache_ttl, HttpSoapTransport, HttpTransportFactory};

/// Build a gateway client on the built-in HTTP transport
///
/// Verifies up front that the HTTP stack honours the configured secure
/// channel, so a client is never handed out that cannot reach the service.
///
/// # Errors
/// Returns `GatewayError::Config` when the configuration selects a custom
/// transport or the TLS settings are unsupported.
pub fn connect(config: ClientConfig) -> Result<GatewayClient> {
    if let TransportSelector::Custom(label) = config.transport_selector() {
        return Err(GatewayError::Config(format!(
            "Transport '{label}' is not built in; construct GatewayClient::new with its factory"
        )));
    }

    HttpTransportFactory::probe(config.transport_options())?;
    tracing::info!(
        customer_id = %config.customer_id(),
        environment = ?config.environment(),
        "gateway client ready"
    );

    Ok(GatewayClient::new(config, Arc::new(HttpTransportFactory::new())))
}
