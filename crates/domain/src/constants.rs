//! Gateway constants
//!
//! Wire-level values shared by the resolver, the normalizer and the
//! transports.

// Endpoint
pub const DEFAULT_ENDPOINT_TEMPLATE: &str =
    "https://%customerId%.soap%env%.afas.online/profitservices/%connectorPath%.asmx";
pub const PLACEHOLDER_CUSTOMER_ID: &str = "%customerId%";
pub const PLACEHOLDER_CONNECTOR_PATH: &str = "%connectorPath%";
pub const PLACEHOLDER_ENV: &str = "%env%";
pub const WSDL_QUERY_SUFFIX: &str = "?WSDL";

// SOAP
pub const SERVICE_NAMESPACE: &str = "urn:Afas.Profit.Services";
pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const DEFAULT_ENCODING: &str = "utf-8";

// Authentication
pub const TOKEN_ARGUMENT: &str = "token";
pub const TOKEN_SCHEMA_VERSION: u32 = 1;

// WSDL caching (process-wide)
pub const DEFAULT_WSDL_CACHE_TTL_SECS: u64 = 86_400;
