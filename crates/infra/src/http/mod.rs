//! HTTP SOAP transport: reqwest client, envelope codec and WSDL cache

pub mod client;
pub mod envelope;
pub mod transport;
pub mod wsdl;

pub use client::HttpClientBuilder;
pub use transport::{HttpSoapTransport, HttpTransportFactory};
pub use wsdl::{set_cache_ttl, WsdlDocument};
