//! Response shapes produced by a transport invocation

use indexmap::IndexMap;

/// Decoded SOAP response body
///
/// Schema-described transports expose every response part by name; schema-less
/// transports return the single response part as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapValue {
    /// Named response parts, in document order
    Struct(IndexMap<String, String>),

    /// Plain string response
    Text(String),

    /// Empty body or a shape with no usable content
    Nil,
}

impl SoapValue {
    /// Look up a named part of a structured response
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            Self::Struct(fields) => fields.get(name).map(String::as_str),
            Self::Text(_) | Self::Nil => None,
        }
    }
}
