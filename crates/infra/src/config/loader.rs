//! Configuration loader
//!
//! Loads the gateway configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `PROFITGATE_CUSTOMER_ID`: Profit customer (tenant) id (required)
//! - `PROFITGATE_APP_TOKEN`: App connector token (required)
//! - `PROFITGATE_ENVIRONMENT`: `test`, `accept` or unset for live
//! - `PROFITGATE_ENDPOINT_TEMPLATE`: Endpoint URL template
//! - `PROFITGATE_USE_WSDL`: Whether transports are built from WSDL (true/false)
//! - `PROFITGATE_WSDL_CACHE_TTL`: WSDL cache lifetime in seconds
//! - `PROFITGATE_TIMEOUT_SECS`: HTTP request timeout in seconds
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./profitgate.toml` or `./profitgate.json` (current working directory)
//! 2. `./config.toml` or `./config.json` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use profitgate_domain::{
    ClientConfig, ClientSettings, Environment, GatewayError, Result, TransportOptions,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["profitgate.toml", "profitgate.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `GatewayError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `GatewayError::Config` if required variables are missing or any
/// variable has an invalid value.
pub fn load_from_env() -> Result<ClientConfig> {
    let customer_id = env_var("PROFITGATE_CUSTOMER_ID")?;
    let app_token = env_var("PROFITGATE_APP_TOKEN")?;

    let environment = optional_env_var("PROFITGATE_ENVIRONMENT")
        .map(|value| Environment::from_str(&value))
        .transpose()?
        .unwrap_or_default();

    let wsdl_cache_ttl_secs = optional_env_var("PROFITGATE_WSDL_CACHE_TTL")
        .map(|s| {
            s.parse::<u64>()
                .map_err(|e| GatewayError::Config(format!("Invalid WSDL cache TTL: {e}")))
        })
        .transpose()?;

    let mut transport = TransportOptions::default();
    if let Some(timeout) = optional_env_var("PROFITGATE_TIMEOUT_SECS") {
        let secs = timeout
            .parse::<u64>()
            .map_err(|e| GatewayError::Config(format!("Invalid timeout: {e}")))?;
        transport = transport.with_timeout(Duration::from_secs(secs));
    }

    ClientConfig::from_settings(ClientSettings {
        customer_id,
        app_token,
        environment,
        endpoint_template: optional_env_var("PROFITGATE_ENDPOINT_TEMPLATE"),
        transport_selector: profitgate_domain::TransportSelector::Default,
        use_wsdl: env_bool("PROFITGATE_USE_WSDL", false),
        wsdl_cache_ttl_secs,
        transport,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `GatewayError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(GatewayError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            GatewayError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path).map_err(|e| {
        tracing::warn!(path = %config_path.display(), error = %e, "Config file is unreadable");
        GatewayError::Config(format!("Failed to read config file: {e}"))
    })?;

    ClientConfig::from_settings(parse_config(&contents, &config_path)?)
}

/// Parse settings from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `GatewayError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<ClientSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| GatewayError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(GatewayError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, its parent and grandparent, then the
/// executable's directory and its parents.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `GatewayError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    optional_env_var(key).ok_or_else(|| {
        GatewayError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Get an optional environment variable, treating empty values as unset
fn optional_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map_or(default, |s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
