use std::error::Error;
use std::iter::successors;
use std::time::Duration;

use profitgate_domain::{GatewayError, SecureChannel, TlsVersion, TransportOptions};
use reqwest::blocking::Client as BlockingClient;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Certificate, Url};
use tracing::debug;

use crate::errors::InfraError;

const DEFAULT_USER_AGENT: &str = concat!("profitgate/", env!("CARGO_PKG_VERSION"));

/// Builder for the blocking HTTP client used by SOAP transports.
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Vec<(String, String)>,
    no_proxy: bool,
    secure_channel: Option<SecureChannel>,
}

impl HttpClientBuilder {
    /// Start from a transport option bag
    pub fn from_options(options: &TransportOptions) -> Self {
        Self {
            timeout: options.timeout,
            connect_timeout: options.connect_timeout,
            user_agent: options.user_agent.clone(),
            default_headers: options.headers.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            no_proxy: options.no_proxy,
            secure_channel: options.secure_channel.clone(),
        }
    }

    /// Build the client
    ///
    /// # Errors
    /// Returns `GatewayError::Config` when the secure channel cannot be
    /// honoured (unreadable CA certificate, unsupported TLS version) and
    /// `GatewayError::Transport` for other client build failures.
    pub fn build(self) -> Result<BlockingClient, GatewayError> {
        let mut builder = BlockingClient::builder()
            .use_rustls_tls()
            .user_agent(self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()))
            .default_headers(header_map(&self.default_headers)?);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if self.no_proxy {
            builder = builder.no_proxy();
        }

        let tls_pinned = self.secure_channel.is_some();
        if let Some(channel) = self.secure_channel {
            builder = builder.min_tls_version(tls_version(channel.min_tls_version));

            if let Some(path) = channel.ca_certificate {
                let pem = std::fs::read(&path).map_err(|err| {
                    GatewayError::Config(format!(
                        "Unable to read CA certificate {}: {err}",
                        path.display()
                    ))
                })?;
                let certificate = Certificate::from_pem(&pem).map_err(|err| {
                    GatewayError::Config(format!(
                        "Invalid CA certificate {}: {err}",
                        path.display()
                    ))
                })?;
                builder = builder.add_root_certificate(certificate);
            }
        }

        builder.build().map_err(|err| {
            if tls_pinned && mentions_tls(&err) {
                GatewayError::Config(format!(
                    "HTTP client does not support the requested TLS settings: {err}"
                ))
            } else {
                InfraError::from(err).into()
            }
        })
    }
}

/// True when `err` or any of its sources is a TLS failure
fn mentions_tls(err: &(dyn Error + 'static)) -> bool {
    successors(Some(err), |&err| err.source())
        .any(|err| err.to_string().to_ascii_lowercase().contains("tls"))
}

const fn tls_version(version: TlsVersion) -> reqwest::tls::Version {
    match version {
        TlsVersion::Tls12 => reqwest::tls::Version::TLS_1_2,
        TlsVersion::Tls13 => reqwest::tls::Version::TLS_1_3,
    }
}

fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, GatewayError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            GatewayError::Config(format!("Invalid HTTP header name '{name}': {err}"))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            GatewayError::Config(format!("Invalid value for HTTP header '{name}': {err}"))
        })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Check that a URL can be posted to by the blocking client
///
/// # Errors
/// Returns `GatewayError::Transport` if `location` is not an absolute URL.
pub fn parse_location(location: &str) -> Result<Url, GatewayError> {
    Url::parse(location).map_err(|err| {
        debug!(%location, error = %err, "rejecting SOAP location");
        GatewayError::Transport(format!("Invalid SOAP location '{location}': {err}"))
    })
}
