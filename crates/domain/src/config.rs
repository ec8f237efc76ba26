//! Client configuration
//!
//! `ClientConfig` is validated once at construction and never mutated
//! afterwards. `ClientSettings` is the serde-facing form read from config
//! files and converted with [`ClientConfig::from_settings`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ENCODING, DEFAULT_ENDPOINT_TEMPLATE};
use crate::errors::{GatewayError, Result};

/// Remote environment to connect to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Live,
    Test,
    Accept,
}

impl Environment {
    /// Value substituted for `%env%`; empty for the live environment
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Live => "",
            Self::Test => "test",
            Self::Accept => "accept",
        }
    }
}

impl FromStr for Environment {
    type Err = GatewayError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "live" => Ok(Self::Live),
            "test" => Ok(Self::Test),
            "accept" => Ok(Self::Accept),
            other => Err(GatewayError::Config(format!(
                "Unknown environment '{other}' (expected 'test', 'accept' or unset)"
            ))),
        }
    }
}

/// Which transport implementation the client is built with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSelector {
    /// Built-in HTTP transport
    #[default]
    Default,

    /// Caller-injected transport factory, identified by a label
    Custom(String),
}

/// Minimum TLS protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    #[serde(rename = "1.2")]
    Tls12,
    #[serde(rename = "1.3")]
    Tls13,
}

/// Secure channel policy for HTTPS connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureChannel {
    pub min_tls_version: TlsVersion,
    /// Additional trusted CA certificate (PEM)
    #[serde(default)]
    pub ca_certificate: Option<PathBuf>,
}

impl SecureChannel {
    /// Require at least the given TLS version
    pub const fn minimum(version: TlsVersion) -> Self {
        Self { min_tls_version: version, ca_certificate: None }
    }
}

/// Options handed to the transport constructor
///
/// Cloned for every transport the client creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    pub encoding: String,
    #[serde(with = "duration_secs")]
    pub timeout: Option<Duration>,
    #[serde(with = "duration_secs")]
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub no_proxy: bool,
    pub secure_channel: Option<SecureChannel>,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            timeout: None,
            connect_timeout: None,
            user_agent: None,
            headers: BTreeMap::new(),
            no_proxy: false,
            secure_channel: None,
        }
    }
}

impl TransportOptions {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Bypass system proxy settings
    #[must_use]
    pub fn with_no_proxy(mut self, enabled: bool) -> Self {
        self.no_proxy = enabled;
        self
    }

    #[must_use]
    pub fn with_secure_channel(mut self, channel: SecureChannel) -> Self {
        self.secure_channel = Some(channel);
        self
    }

    /// True when `encoding` names UTF-8
    pub fn is_utf8(&self) -> bool {
        matches!(self.encoding.trim().to_ascii_lowercase().as_str(), "utf-8" | "utf8")
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

/// Immutable gateway configuration
#[derive(Clone)]
pub struct ClientConfig {
    customer_id: String,
    app_token: String,
    environment: Environment,
    endpoint_template: String,
    transport_selector: TransportSelector,
    use_wsdl: bool,
    wsdl_cache_ttl: Option<Duration>,
    transport_options: TransportOptions,
}

impl ClientConfig {
    /// Start building a configuration from the two required credentials
    pub fn builder(
        customer_id: impl Into<String>,
        app_token: impl Into<String>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder::new(customer_id, app_token)
    }

    /// Convert deserialized settings into a validated configuration
    ///
    /// # Errors
    /// Returns `GatewayError::Config` if a required credential is empty.
    pub fn from_settings(settings: ClientSettings) -> Result<Self> {
        let mut builder = Self::builder(settings.customer_id, settings.app_token)
            .environment(settings.environment)
            .transport_selector(settings.transport_selector)
            .use_wsdl(settings.use_wsdl)
            .transport_options(settings.transport);

        if let Some(template) = settings.endpoint_template {
            builder = builder.endpoint_template(template);
        }
        if let Some(ttl) = settings.wsdl_cache_ttl_secs {
            builder = builder.wsdl_cache_ttl(Duration::from_secs(ttl));
        }

        builder.build()
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn app_token(&self) -> &str {
        &self.app_token
    }

    pub const fn environment(&self) -> Environment {
        self.environment
    }

    pub fn endpoint_template(&self) -> &str {
        &self.endpoint_template
    }

    pub const fn transport_selector(&self) -> &TransportSelector {
        &self.transport_selector
    }

    pub const fn use_wsdl(&self) -> bool {
        self.use_wsdl
    }

    pub const fn wsdl_cache_ttl(&self) -> Option<Duration> {
        self.wsdl_cache_ttl
    }

    pub const fn transport_options(&self) -> &TransportOptions {
        &self.transport_options
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("customer_id", &self.customer_id)
            .field("app_token", &"<redacted>")
            .field("environment", &self.environment)
            .field("endpoint_template", &self.endpoint_template)
            .field("transport_selector", &self.transport_selector)
            .field("use_wsdl", &self.use_wsdl)
            .field("wsdl_cache_ttl", &self.wsdl_cache_ttl)
            .field("transport_options", &self.transport_options)
            .finish()
    }
}

/// Builder for [`ClientConfig`]
#[derive(Debug)]
pub struct ClientConfigBuilder {
    customer_id: String,
    app_token: String,
    environment: Environment,
    endpoint_template: String,
    transport_selector: TransportSelector,
    use_wsdl: bool,
    wsdl_cache_ttl: Option<Duration>,
    transport_options: TransportOptions,
}

impl ClientConfigBuilder {
    fn new(customer_id: impl Into<String>, app_token: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            app_token: app_token.into(),
            environment: Environment::Live,
            endpoint_template: DEFAULT_ENDPOINT_TEMPLATE.to_string(),
            transport_selector: TransportSelector::Default,
            use_wsdl: false,
            wsdl_cache_ttl: None,
            transport_options: TransportOptions::default(),
        }
    }

    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// URL template with `%customerId%`, `%connectorPath%` and `%env%`
    /// placeholders
    #[must_use]
    pub fn endpoint_template(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = template.into();
        self
    }

    #[must_use]
    pub fn transport_selector(mut self, selector: TransportSelector) -> Self {
        self.transport_selector = selector;
        self
    }

    #[must_use]
    pub const fn use_wsdl(mut self, enabled: bool) -> Self {
        self.use_wsdl = enabled;
        self
    }

    /// Process-wide WSDL cache lifetime applied before WSDL transports are
    /// built
    #[must_use]
    pub const fn wsdl_cache_ttl(mut self, ttl: Duration) -> Self {
        self.wsdl_cache_ttl = Some(ttl);
        self
    }

    #[must_use]
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport_options = options;
        self
    }

    /// Validate and freeze the configuration
    ///
    /// The built-in transport is pinned to TLS 1.2 or newer unless the caller
    /// supplied their own secure channel. It writes UTF-8 request bodies
    /// only, so any other encoding is refused for it.
    ///
    /// # Errors
    /// Returns `GatewayError::Config` if the customer id or app token is empty,
    /// or the built-in transport is configured with a non-UTF-8 encoding.
    pub fn build(mut self) -> Result<ClientConfig> {
        for (name, value) in [("customer_id", &self.customer_id), ("app_token", &self.app_token)] {
            if value.trim().is_empty() {
                return Err(GatewayError::Config(format!(
                    "Required configuration parameter missing: {name}"
                )));
            }
        }

        if self.transport_selector == TransportSelector::Default {
            if !self.transport_options.is_utf8() {
                return Err(GatewayError::Config(format!(
                    "Encoding '{}' is not supported by the built-in transport (use utf-8)",
                    self.transport_options.encoding
                )));
            }
            if self.transport_options.secure_channel.is_none() {
                self.transport_options.secure_channel =
                    Some(SecureChannel::minimum(TlsVersion::Tls12));
            }
        }

        Ok(ClientConfig {
            customer_id: self.customer_id,
            app_token: self.app_token,
            environment: self.environment,
            endpoint_template: self.endpoint_template,
            transport_selector: self.transport_selector,
            use_wsdl: self.use_wsdl,
            wsdl_cache_ttl: self.wsdl_cache_ttl,
            transport_options: self.transport_options,
        })
    }
}

/// Serde form of the configuration, as stored in TOML or JSON files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    pub customer_id: String,
    pub app_token: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub endpoint_template: Option<String>,
    #[serde(default)]
    pub transport_selector: TransportSelector,
    #[serde(default)]
    pub use_wsdl: bool,
    #[serde(default)]
    pub wsdl_cache_ttl_secs: Option<u64>,
    #[serde(default)]
    pub transport: TransportOptions,
}
