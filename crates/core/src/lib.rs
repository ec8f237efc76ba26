//! # profitgate Core
//!
//! Call orchestration for the Profit SOAP gateway - no network code.
//!
//! This crate contains:
//! - Endpoint resolution from the configured URL template
//! - Argument folding, token injection and `get` pagination checks
//! - The transport state machine (reuse, retarget, recreate)
//! - The gateway client that ties them together
//!
//! ## Architecture Principles
//! - Only depends on `profitgate-domain`
//! - Transports are reached through the traits in [`ports`]
//! - Pure, testable logic

pub mod arguments;
pub mod endpoint;
pub mod gateway;
pub mod ports;
pub mod transport_manager;

pub use arguments::{encode_parameters, fold_arguments, normalize, ArgumentMap};
pub use endpoint::{resolve_endpoint, wsdl_url};
pub use gateway::{unwrap_response, GatewayClient};
pub use ports::{
    ParamEncoding, RpcCall, SoapParam, SoapTransport, TransportFactory, TransportTarget,
};
pub use transport_manager::TransportManager;
