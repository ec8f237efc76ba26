//! SOAP 1.1 envelope writer and response reader
//!
//! Requests are written as one body element named after the function, with
//! every parameter a child element in the `ns1` service namespace. Raw markup
//! parameters are wrapped in CDATA and never escaped.
//!
//! Responses are read namespace-agnostically: the first element inside `Body`
//! is either a `Fault` or the `<Function>Response` wrapper whose children are
//! the result parts.

use indexmap::IndexMap;
use profitgate_core::ports::{ParamEncoding, RpcCall, SoapParam};
use profitgate_domain::constants::SOAP_ENVELOPE_NAMESPACE;
use profitgate_domain::GatewayError;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::InfraError;

/// Parsed SOAP response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// Result parts of the response wrapper, in document order
    Parts(IndexMap<String, String>),

    /// SOAP fault returned by the service
    Fault { code: String, message: String, detail: Option<String> },
}

/// Write the request envelope for `call` in `namespace`
///
/// `encoding` is only the prolog label; the envelope text itself is UTF-8.
pub fn build_envelope(call: &RpcCall, namespace: &str, encoding: &str) -> String {
    let mut body = String::new();
    for param in &call.params {
        write_param(&mut body, param);
    }

    format!(
        concat!(
            r#"<?xml version="1.0" encoding="{encoding}"?>"#,
            r#"<SOAP-ENV:Envelope xmlns:SOAP-ENV="{envelope}" xmlns:ns1="{namespace}">"#,
            "<SOAP-ENV:Body><ns1:{function}>{body}</ns1:{function}></SOAP-ENV:Body>",
            "</SOAP-ENV:Envelope>"
        ),
        encoding = escape(encoding),
        envelope = SOAP_ENVELOPE_NAMESPACE,
        namespace = escape(namespace),
        function = call.function,
        body = body,
    )
}

fn write_param(out: &mut String, param: &SoapParam) {
    let value = match param.encoding {
        ParamEncoding::Scalar => escape(param.value.as_str()).into_owned(),
        ParamEncoding::RawMarkup => cdata(&param.value),
    };
    out.push_str(&format!("<ns1:{name}>{value}</ns1:{name}>", name = param.name));
}

/// Wrap markup in CDATA, splitting any embedded terminator
fn cdata(markup: &str) -> String {
    format!("<![CDATA[{}]]>", markup.replace("]]>", "]]]]><![CDATA[>"))
}

fn local_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}

/// Read a SOAP response document
///
/// # Errors
/// Returns `GatewayError::Format` when the document is not well-formed or has
/// no `Body`.
pub fn parse_response(xml: &str) -> Result<ResponseBody, GatewayError> {
    parse(xml).map_err(GatewayError::from)
}

fn parse(xml: &str) -> Result<ResponseBody, InfraError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_body = false;
    loop {
        match reader.read_event()? {
            Event::Start(start) if !in_body => {
                in_body = local_name(&start) == "Body";
            }
            Event::Start(start) => {
                let children = read_children(&mut reader)?;
                return Ok(if local_name(&start) == "Fault" {
                    fault(children)
                } else {
                    ResponseBody::Parts(children)
                });
            }
            Event::Empty(start) if in_body || local_name(&start) == "Body" => {
                return Ok(ResponseBody::Parts(IndexMap::new()));
            }
            Event::End(end) if in_body && end.local_name().as_ref() == b"Body" => {
                return Ok(ResponseBody::Parts(IndexMap::new()));
            }
            Event::Eof => {
                let raw = format!("no SOAP Body in response: {xml}");
                return Err(GatewayError::Format { raw }.into());
            }
            _ => {}
        }
    }
}

/// Collect the direct children of the current element as name → text
///
/// Nested markup inside a child contributes its text content only.
fn read_children(reader: &mut Reader<&[u8]>) -> Result<IndexMap<String, String>, InfraError> {
    let mut children = IndexMap::new();
    let mut current: Option<(String, String)> = None;
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if depth == 0 {
                    current = Some((local_name(&start), String::new()));
                }
                depth += 1;
            }
            Event::Empty(start) if depth == 0 => {
                children.insert(local_name(&start), String::new());
            }
            Event::Text(text) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some((_, value)) = current.as_mut() {
                    value.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) if depth == 0 => return Ok(children),
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    if let Some((name, value)) = current.take() {
                        children.insert(name, value);
                    }
                }
            }
            Event::Eof => {
                let raw = "response ended inside an element".to_string();
                return Err(GatewayError::Format { raw }.into());
            }
            _ => {}
        }
    }
}

fn fault(mut children: IndexMap<String, String>) -> ResponseBody {
    ResponseBody::Fault {
        code: children.swap_remove("faultcode").unwrap_or_default(),
        message: children.swap_remove("faultstring").unwrap_or_default(),
        detail: children.swap_remove("detail").filter(|detail| !detail.is_empty()),
    }
}
