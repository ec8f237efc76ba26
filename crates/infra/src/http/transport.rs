//! HTTP SOAP transport
//!
//! Posts SOAP 1.1 envelopes with the blocking reqwest client. A transport is
//! either literal (fixed location and namespace, retargetable) or described by
//! a WSDL document fetched through the process-wide cache.

use indexmap::IndexMap;
use profitgate_core::ports::{RpcCall, SoapTransport, TransportFactory, TransportTarget};
use profitgate_domain::constants::WSDL_QUERY_SUFFIX;
use profitgate_domain::{GatewayError, Result, SoapValue, TransportOptions};
use reqwest::blocking::Client as BlockingClient;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use super::client::{parse_location, HttpClientBuilder};
use super::envelope::{build_envelope, parse_response, ResponseBody};
use super::wsdl::{self, WsdlDocument};
use crate::errors::InfraError;

const SOAP_ACTION_HEADER: &str = "SOAPAction";

enum Binding {
    Literal { namespace: String },
    Wsdl(WsdlDocument),
}

/// SOAP transport over HTTP
pub struct HttpSoapTransport {
    client: BlockingClient,
    location: String,
    encoding: String,
    binding: Binding,
}

impl HttpSoapTransport {
    /// Transport posting to a fixed location in `namespace`
    pub fn literal(
        client: BlockingClient,
        location: impl Into<String>,
        namespace: impl Into<String>,
        options: &TransportOptions,
    ) -> Self {
        Self {
            client,
            location: location.into(),
            encoding: options.encoding.clone(),
            binding: Binding::Literal { namespace: namespace.into() },
        }
    }

    /// Transport described by a WSDL document
    ///
    /// Posts to the document's service address, or to `wsdl_url` without its
    /// query when the document declares none.
    pub fn from_wsdl(
        client: BlockingClient,
        wsdl_url: &str,
        document: WsdlDocument,
        options: &TransportOptions,
    ) -> Self {
        let location = document
            .location
            .clone()
            .unwrap_or_else(|| wsdl_url.trim_end_matches(WSDL_QUERY_SUFFIX).to_string());

        Self {
            client,
            location,
            encoding: options.encoding.clone(),
            binding: Binding::Wsdl(document),
        }
    }

    fn namespace<'a>(&'a self, call: &'a RpcCall) -> &'a str {
        match &self.binding {
            Binding::Literal { namespace } => namespace,
            Binding::Wsdl(document) => {
                document.target_namespace.as_deref().unwrap_or(&call.namespace)
            }
        }
    }

    fn post(&self, call: &RpcCall, soap_action: &str) -> Result<SoapValue> {
        let url = parse_location(&self.location)?;
        let envelope = build_envelope(call, self.namespace(call), &self.encoding);

        debug!(
            function = %call.function,
            endpoint = %self.location,
            %soap_action,
            "posting SOAP request"
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, format!("text/xml; charset={}", self.encoding))
            .header(SOAP_ACTION_HEADER, format!("\"{soap_action}\""))
            .body(envelope.into_bytes())
            .send()
            .map_err(InfraError::from)?;

        let status = response.status();
        let body = response.text().map_err(InfraError::from)?;
        debug!(function = %call.function, %status, bytes = body.len(), "received SOAP response");

        match parse_response(&body) {
            Ok(ResponseBody::Fault { code, message, detail }) => {
                warn!(function = %call.function, %code, %message, "SOAP fault returned");
                Err(GatewayError::Fault { code, message, detail })
            }
            Ok(ResponseBody::Parts(parts)) if status.is_success() => Ok(self.shape(parts)),
            Err(err) if status.is_success() => Err(err),
            _ => Err(GatewayError::Network(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ))),
        }
    }

    /// Literal transports return a single part as plain text; WSDL transports
    /// return every part
    fn shape(&self, mut parts: IndexMap<String, String>) -> SoapValue {
        match (&self.binding, parts.len()) {
            (_, 0) => SoapValue::Nil,
            (Binding::Literal { .. }, 1) => {
                parts.pop().map_or(SoapValue::Nil, |(_, value)| SoapValue::Text(value))
            }
            _ => SoapValue::Struct(parts),
        }
    }
}

impl SoapTransport for HttpSoapTransport {
    fn location(&self) -> &str {
        &self.location
    }

    fn set_location(&mut self, location: &str) {
        location.clone_into(&mut self.location);
    }

    fn invoke(&mut self, call: &RpcCall) -> Result<SoapValue> {
        let soap_action = match &self.binding {
            Binding::Literal { namespace } => format!("{namespace}#{}", call.function),
            Binding::Wsdl(document) => {
                if !document.operations.is_empty() && !document.has_operation(&call.function) {
                    return Err(GatewayError::Transport(format!(
                        "Function '{}' is not a valid method for this service",
                        call.function
                    )));
                }
                document.soap_action(&call.function).map_or_else(
                    || format!("{}/{}", self.namespace(call), call.function),
                    str::to_string,
                )
            }
        };

        self.post(call, &soap_action)
    }

    fn invoke_with_action(&mut self, call: &RpcCall, soap_action: &str) -> Result<SoapValue> {
        self.post(call, soap_action)
    }
}

/// Builds [`HttpSoapTransport`]s for the gateway client
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransportFactory;

impl HttpTransportFactory {
    pub const fn new() -> Self {
        Self
    }

    /// Verify that a client honouring `options` can be built
    ///
    /// # Errors
    /// Returns `GatewayError::Config` when the encoding is not UTF-8 or the
    /// TLS settings are unsupported.
    pub fn probe(options: &TransportOptions) -> Result<()> {
        client_for(options).map(|_| ())
    }
}

/// Request bodies are written as UTF-8 and labelled with `options.encoding`
fn client_for(options: &TransportOptions) -> Result<BlockingClient> {
    if !options.is_utf8() {
        return Err(GatewayError::Config(format!(
            "Encoding '{}' is not supported by the HTTP transport (use utf-8)",
            options.encoding
        )));
    }
    HttpClientBuilder::from_options(options).build()
}

fn fetch_wsdl(client: &BlockingClient, url: &str) -> Result<WsdlDocument> {
    info!(%url, "fetching WSDL document");

    let response = client
        .get(parse_location(url)?)
        .send()
        .map_err(|err| {
            GatewayError::Transport(format!("Unable to fetch WSDL from '{url}': {err}"))
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::Transport(format!(
            "Unable to fetch WSDL from '{url}': HTTP {}",
            status.as_u16()
        )));
    }

    let body = response
        .text()
        .map_err(|err| {
            GatewayError::Transport(format!("Unable to read WSDL from '{url}': {err}"))
        })?;

    WsdlDocument::parse(&body)
}

impl TransportFactory for HttpTransportFactory {
    fn create(
        &self,
        target: TransportTarget,
        options: TransportOptions,
    ) -> Result<Box<dyn SoapTransport>> {
        let client = client_for(&options)?;

        match target {
            TransportTarget::Literal { location, namespace } => {
                Ok(Box::new(HttpSoapTransport::literal(client, location, namespace, &options)))
            }
            TransportTarget::Wsdl { wsdl_url, cache_ttl } => {
                if let Some(ttl) = cache_ttl {
                    wsdl::set_cache_ttl(ttl);
                }

                let document = wsdl::cached_or_fetch(&wsdl_url, |url| fetch_wsdl(&client, url))?;
                Ok(Box::new(HttpSoapTransport::from_wsdl(client, &wsdl_url, document, &options)))
            }
        }
    }
}
