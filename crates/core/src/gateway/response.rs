//! Response unwrapping
//!
//! Every remote function returns a single part named `<Function>Result`.

use profitgate_domain::{GatewayError, Result, SoapValue};

/// Extract the result string of `function` from a transport response
///
/// # Errors
/// Returns `GatewayError::Format` with the response captured when it is
/// neither a structure carrying the result part nor a plain string.
pub fn unwrap_response(function: &str, response: SoapValue) -> Result<String> {
    let result_field = format!("{function}Result");

    if let Some(result) = response.field(&result_field) {
        return Ok(result.to_string());
    }

    match response {
        SoapValue::Text(text) => Ok(text),
        other => Err(GatewayError::Format { raw: format!("{other:?}") }),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;

    #[test]
    fn returns_result_field_of_struct() {
        let mut fields = IndexMap::new();
        fields.insert("GetDataResult".to_string(), "<xml/>".to_string());

        let result = unwrap_response("GetData", SoapValue::Struct(fields)).unwrap();
        assert_eq!(result, "<xml/>");
    }

    #[test]
    fn returns_plain_string_unchanged() {
        let response = SoapValue::Text("<AfasGetConnector/>".into());
        let result = unwrap_response("GetData", response).unwrap();
        assert_eq!(result, "<AfasGetConnector/>");
    }

    #[test]
    fn struct_without_result_field_is_a_format_error() {
        let mut fields = IndexMap::new();
        fields.insert("OtherResult".to_string(), "x".to_string());

        let err = unwrap_response("GetData", SoapValue::Struct(fields)).unwrap_err();
        match err {
            GatewayError::Format { raw } => assert!(raw.contains("OtherResult")),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn nil_is_a_format_error() {
        let err = unwrap_response("GetData", SoapValue::Nil).unwrap_err();
        assert_eq!(err.code(), Some(24));
    }
}
