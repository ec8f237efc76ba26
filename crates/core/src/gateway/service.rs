//! Gateway client
//!
//! Entry point for remote calls. A call runs, in order: connector type
//! parsing, argument folding, transport acquisition, argument normalization,
//! dispatch and response unwrapping.

use std::sync::Arc;

use profitgate_domain::constants::SERVICE_NAMESPACE;
use profitgate_domain::{Arguments, ClientConfig, ConnectorType, Result};
use tracing::{debug, instrument};

use crate::arguments::{encode_parameters, fold_arguments, normalize};
use crate::gateway::response::unwrap_response;
use crate::ports::{RpcCall, TransportFactory};
use crate::transport_manager::TransportManager;

/// Kind of client, reported to callers that support several
pub const CLIENT_TYPE: &str = "SOAP";

/// Client for the Profit SOAP services
///
/// Holds its transport exclusively; `call` takes `&mut self` so one client is
/// never driven from two threads at once.
pub struct GatewayClient {
    config: ClientConfig,
    transports: TransportManager,
}

impl GatewayClient {
    pub fn new(config: ClientConfig, factory: Arc<dyn TransportFactory>) -> Self {
        Self { config, transports: TransportManager::new(factory) }
    }

    pub const fn client_type(&self) -> &'static str {
        CLIENT_TYPE
    }

    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connector the client's transport is currently bound to
    pub const fn bound_connector(&self) -> Option<ConnectorType> {
        self.transports.bound_connector()
    }

    /// Call `function` on the connector named by `connector_type`
    ///
    /// `connector_type` is matched case-insensitively; argument names are
    /// folded to lower case before validation.
    ///
    /// # Errors
    /// - `Validation` for an unknown connector type (before any transport is
    ///   built) or invalid `get` pagination arguments
    /// - `Transport`, `Network` or `Fault` from the transport, unchanged
    /// - `Format` when the response carries no result
    #[instrument(skip(self, arguments), fields(args = arguments.len()))]
    pub fn call(
        &mut self,
        connector_type: &str,
        function: &str,
        arguments: Arguments,
    ) -> Result<String> {
        let connector: ConnectorType = connector_type.parse()?;
        let folded = fold_arguments(arguments);

        let transport = self.transports.acquire(connector, &self.config)?;
        let normalized = normalize(connector, folded, self.config.app_token())?;

        let call = RpcCall::new(function, SERVICE_NAMESPACE, encode_parameters(&normalized));
        debug!(
            %connector,
            location = transport.location(),
            params = call.params.len(),
            "dispatching SOAP call"
        );

        let response = if self.config.use_wsdl() {
            transport.invoke(&call)?
        } else {
            let soap_action = format!("{SERVICE_NAMESPACE}/{function}");
            transport.invoke_with_action(&call, &soap_action)?
        };

        unwrap_response(function, response)
    }
}
