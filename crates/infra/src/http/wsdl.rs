//! WSDL documents and the process-wide WSDL cache
//!
//! Only the parts the transport needs are read: the target namespace, the
//! service address and the SOAP action of every bound operation.
//!
//! The cache lifetime is global to the process. Setting it to zero turns
//! caching off; documents fetched while caching is off are never stored.

use std::time::Duration;

use indexmap::IndexMap;
use moka::sync::Cache;
use parking_lot::{const_rwlock, RwLock};
use profitgate_domain::constants::DEFAULT_WSDL_CACHE_TTL_SECS;
use profitgate_domain::{GatewayError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::errors::InfraError;

/// Maximum number of WSDL documents kept at once
pub const WSDL_CACHE_MAX_CAPACITY: u64 = 256;

static CACHE: RwLock<CacheState> = const_rwlock(CacheState {
    ttl: Duration::from_secs(DEFAULT_WSDL_CACHE_TTL_SECS),
    documents: None,
});

/// Cache lifetime and the document cache built for it
///
/// `documents` is built lazily on first use and dropped whenever the
/// lifetime changes, so every entry expires under the lifetime it was
/// stored with.
struct CacheState {
    ttl: Duration,
    documents: Option<Cache<String, WsdlDocument>>,
}

/// Service description read from a WSDL document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WsdlDocument {
    pub target_namespace: Option<String>,
    pub location: Option<String>,
    /// Operation name → SOAP action
    pub operations: IndexMap<String, String>,
}

impl WsdlDocument {
    /// Read a WSDL document
    ///
    /// # Errors
    /// Returns `GatewayError::Transport` if the document is not well-formed
    /// XML or is not a WSDL `definitions` document.
    pub fn parse(xml: &str) -> Result<Self> {
        read_document(xml).map_err(|err| {
            let err = GatewayError::from(err);
            GatewayError::Transport(format!("Unable to read WSDL document: {err}"))
        })
    }

    /// SOAP action of `operation`, if the document declares one
    pub fn soap_action(&self, operation: &str) -> Option<&str> {
        self.operations.get(operation).map(String::as_str).filter(|action| !action.is_empty())
    }

    /// True when the document declares `operation`
    pub fn has_operation(&self, operation: &str) -> bool {
        self.operations.contains_key(operation)
    }
}

fn attribute(
    start: &BytesStart<'_>,
    name: &[u8],
) -> std::result::Result<Option<String>, InfraError> {
    for attr in start.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn read_document(xml: &str) -> std::result::Result<WsdlDocument, InfraError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = WsdlDocument::default();
    let mut seen_definitions = false;
    let mut in_binding = false;
    let mut operation: Option<String> = None;

    loop {
        let (start, is_empty) = match reader.read_event()? {
            Event::Start(start) => (start, false),
            Event::Empty(start) => (start, true),
            Event::End(end) => {
                match end.local_name().as_ref() {
                    b"binding" => in_binding = false,
                    b"operation" if in_binding => operation = None,
                    _ => {}
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        match start.local_name().as_ref() {
            b"definitions" => {
                seen_definitions = true;
                document.target_namespace = attribute(&start, b"targetNamespace")?;
            }
            b"binding" if !is_empty => in_binding = true,
            b"operation" if in_binding => {
                if let Some(name) = attribute(&start, b"name")? {
                    document.operations.entry(name.clone()).or_default();
                    if !is_empty {
                        operation = Some(name);
                    }
                } else if let (Some(name), Some(action)) =
                    (&operation, attribute(&start, b"soapAction")?)
                {
                    document.operations.insert(name.clone(), action);
                }
            }
            b"address" => {
                if document.location.is_none() {
                    document.location = attribute(&start, b"location")?;
                }
            }
            _ => {}
        }
    }

    if !seen_definitions {
        return Err(GatewayError::Format { raw: "missing wsdl:definitions element".into() }.into());
    }

    Ok(document)
}

/// Set the process-wide WSDL cache lifetime
///
/// A zero duration disables caching. Changing the lifetime drops every
/// cached document.
pub fn set_cache_ttl(ttl: Duration) {
    let mut state = CACHE.write();
    if state.ttl != ttl {
        debug!(ttl_seconds = ttl.as_secs(), "WSDL cache lifetime changed");
        state.ttl = ttl;
        state.documents = None;
    }
}

/// Current process-wide WSDL cache lifetime
pub fn cache_ttl() -> Duration {
    CACHE.read().ttl
}

/// Document cache for the current lifetime, or `None` while caching is off
fn documents() -> Option<Cache<String, WsdlDocument>> {
    {
        let state = CACHE.read();
        if state.ttl.is_zero() {
            return None;
        }
        if let Some(documents) = &state.documents {
            return Some(documents.clone());
        }
    }

    let mut state = CACHE.write();
    if state.ttl.is_zero() {
        return None;
    }
    let ttl = state.ttl;
    let documents = state.documents.get_or_insert_with(|| {
        Cache::builder().time_to_live(ttl).max_capacity(WSDL_CACHE_MAX_CAPACITY).build()
    });
    Some(documents.clone())
}

/// Return the cached document for `url` or fetch and cache it
///
/// No lock is held while fetching. Fetch errors are never cached.
///
/// # Errors
/// Propagates errors from `fetch` unchanged.
pub fn cached_or_fetch<F>(url: &str, fetch: F) -> Result<WsdlDocument>
where
    F: FnOnce(&str) -> Result<WsdlDocument>,
{
    let Some(documents) = documents() else {
        return fetch(url);
    };

    if let Some(document) = documents.get(url) {
        debug!(%url, "WSDL cache hit");
        return Ok(document);
    }

    debug!(%url, "WSDL cache miss");
    let document = fetch(url)?;
    documents.insert(url.to_string(), document.clone());
    Ok(document)
}
