//! Gateway client: call orchestration over the resolver, the transport
//! manager and the argument normalizer

pub mod response;
pub mod service;

pub use response::unwrap_response;
pub use service::GatewayClient;
