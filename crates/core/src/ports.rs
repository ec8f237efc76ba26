//! Transport port interfaces
//!
//! The gateway never talks to the network directly. A [`TransportFactory`]
//! builds [`SoapTransport`] instances bound to an endpoint; infrastructure
//! crates provide the HTTP implementation and tests provide doubles.

use std::time::Duration;

use profitgate_domain::{Result, SoapValue, TransportOptions};

/// How a parameter value is written into the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEncoding {
    /// Escaped text element in the service namespace
    Scalar,

    /// Markup embedded verbatim (CDATA-wrapped), never re-escaped
    RawMarkup,
}

/// One named parameter of a remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapParam {
    pub name: String,
    pub value: String,
    pub encoding: ParamEncoding,
}

impl SoapParam {
    pub fn scalar(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), encoding: ParamEncoding::Scalar }
    }

    pub fn raw_markup(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), encoding: ParamEncoding::RawMarkup }
    }
}

/// A remote procedure call: one envelope named after the function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcCall {
    pub function: String,
    pub namespace: String,
    pub params: Vec<SoapParam>,
}

impl RpcCall {
    pub fn new(
        function: impl Into<String>,
        namespace: impl Into<String>,
        params: Vec<SoapParam>,
    ) -> Self {
        Self { function: function.into(), namespace: namespace.into(), params }
    }
}

/// What a new transport is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportTarget {
    /// Schema-less transport posting to a fixed location
    Literal { location: String, namespace: String },

    /// Transport described by a remote WSDL document
    ///
    /// `cache_ttl` is applied process-wide before the document is fetched.
    Wsdl { wsdl_url: String, cache_ttl: Option<Duration> },
}

/// An RPC transport bound to one endpoint
///
/// Implementations are used from one thread at a time; the owning client
/// holds them exclusively.
pub trait SoapTransport: Send {
    /// Endpoint requests are currently posted to
    fn location(&self) -> &str;

    /// Retarget the transport to another endpoint
    fn set_location(&mut self, location: &str);

    /// Invoke through the normal path; the transport derives the SOAP action
    fn invoke(&mut self, call: &RpcCall) -> Result<SoapValue>;

    /// Invoke with an explicit SOAP action header
    fn invoke_with_action(&mut self, call: &RpcCall, soap_action: &str) -> Result<SoapValue>;
}

/// Builds transports for the gateway client
pub trait TransportFactory: Send + Sync {
    /// Construct a transport for `target`
    ///
    /// `options` is a fresh copy owned by the new transport.
    ///
    /// # Errors
    /// Construction failures are fatal for the call that triggered them.
    fn create(
        &self,
        target: TransportTarget,
        options: TransportOptions,
    ) -> Result<Box<dyn SoapTransport>>;
}
