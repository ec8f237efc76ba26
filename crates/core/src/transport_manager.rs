//! Transport lifecycle
//!
//! One transport is kept per client and reused across calls:
//!
//! | state        | next call          | mode     | action                          |
//! |--------------|--------------------|----------|---------------------------------|
//! | Uninitialized| any connector      | any      | create, bind                    |
//! | Bound(T)     | T                  | any      | reuse unchanged                 |
//! | Bound(T)     | T2 != T            | literal  | retarget location in place      |
//! | Bound(T)     | T2 != T            | WSDL     | drop, create from T2's WSDL     |
//!
//! WSDL transports are tied to the contract of one connector, so they cannot
//! be retargeted.

use std::sync::Arc;

use profitgate_domain::constants::SERVICE_NAMESPACE;
use profitgate_domain::{ClientConfig, ConnectorType, GatewayError, Result};
use tracing::{debug, info};

use crate::endpoint::{resolve_endpoint, wsdl_url};
use crate::ports::{SoapTransport, TransportFactory, TransportTarget};

enum TransportState {
    Uninitialized,
    Bound { connector: ConnectorType, transport: Box<dyn SoapTransport> },
}

/// Owns the client's transport and drives its state machine
pub struct TransportManager {
    factory: Arc<dyn TransportFactory>,
    state: TransportState,
}

impl TransportManager {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self { factory, state: TransportState::Uninitialized }
    }

    /// Connector the current transport is bound to, if any
    pub const fn bound_connector(&self) -> Option<ConnectorType> {
        match &self.state {
            TransportState::Uninitialized => None,
            TransportState::Bound { connector, .. } => Some(*connector),
        }
    }

    /// Return a transport bound to `connector`'s endpoint
    ///
    /// # Errors
    /// Propagates transport construction failures unchanged.
    pub fn acquire(
        &mut self,
        connector: ConnectorType,
        config: &ClientConfig,
    ) -> Result<&mut dyn SoapTransport> {
        let endpoint = resolve_endpoint(config, connector);

        let reusable = match &mut self.state {
            TransportState::Bound { connector: bound, .. } if *bound == connector => true,
            TransportState::Bound { connector: bound, transport } if !config.use_wsdl() => {
                debug!(from = %bound, to = %connector, %endpoint, "retargeting SOAP transport");
                transport.set_location(&endpoint);
                *bound = connector;
                true
            }
            TransportState::Bound { .. } | TransportState::Uninitialized => false,
        };

        if !reusable {
            let transport = self.create(connector, &endpoint, config)?;
            self.state = TransportState::Bound { connector, transport };
        }

        match &mut self.state {
            TransportState::Bound { transport, .. } => Ok(&mut **transport),
            TransportState::Uninitialized => {
                Err(GatewayError::Internal("transport was not bound after acquisition".into()))
            }
        }
    }

    fn create(
        &self,
        connector: ConnectorType,
        endpoint: &str,
        config: &ClientConfig,
    ) -> Result<Box<dyn SoapTransport>> {
        let target = if config.use_wsdl() {
            TransportTarget::Wsdl {
                wsdl_url: wsdl_url(endpoint),
                cache_ttl: config.wsdl_cache_ttl(),
            }
        } else {
            TransportTarget::Literal {
                location: endpoint.to_string(),
                namespace: SERVICE_NAMESPACE.to_string(),
            }
        };

        info!(%connector, %endpoint, wsdl = config.use_wsdl(), "creating SOAP transport");
        self.factory.create(target, config.transport_options().clone())
    }
}
