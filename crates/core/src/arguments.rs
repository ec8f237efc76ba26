//! Argument normalization
//!
//! Folds caller argument names, injects authentication, validates the
//! pagination arguments of the `get` connector and turns the result into wire
//! parameters.
//!
//! # Pagination on the `get` connector
//!
//! The service returns zero rows, without an error, when `take` is missing or
//! zero. Calls that would hit this are rejected before dispatch unless they ask
//! for the full dataset with `skip = -1` (either as an argument or as a
//! `<skip>-1</skip>` tag inside `options`). `take` may also be given as a
//! `<take>` tag inside `options`. Only this subset of the service's skip/take
//! behavior is enforced.

use std::sync::OnceLock;

use indexmap::IndexMap;
use profitgate_domain::constants::{TOKEN_ARGUMENT, TOKEN_SCHEMA_VERSION};
use profitgate_domain::{ArgValue, Arguments, ConnectorType, GatewayError, Result, ValidationCode};
use regex::Regex;

use crate::ports::SoapParam;

/// Folded argument map: lower-case names, insertion order kept
pub type ArgumentMap = IndexMap<String, ArgValue>;

/// Remote parameter names whose case matters, keyed by folded name
const CANONICAL_NAMES: [(&str, &str); 4] = [
    ("connectortype", "connectorType"),
    ("connectorid", "connectorId"),
    ("filtersxml", "filtersXml"),
    ("dataxml", "dataXml"),
];

/// Parameters carrying XML that must reach the service unescaped
const RAW_MARKUP_PARAMS: [&str; 2] = ["dataXml", TOKEN_ARGUMENT];

#[allow(clippy::expect_used)]
fn skip_override_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?i)<skip>\s*-1\s*</skip>").expect("skip pattern is valid"))
}

/// Lower-case all argument names
///
/// When two names fold to the same key the later value wins and keeps the
/// position of the first occurrence.
pub fn fold_arguments(arguments: Arguments) -> ArgumentMap {
    let mut folded = ArgumentMap::with_capacity(arguments.len());
    for (name, value) in arguments {
        folded.insert(name.to_lowercase(), value);
    }
    folded
}

/// XML fragment authenticating a call with the app token
pub fn token_fragment(app_token: &str) -> String {
    format!("<token><version>{TOKEN_SCHEMA_VERSION}</version><data>{app_token}</data></token>")
}

/// Validate and complete folded arguments for a connector
///
/// # Errors
/// Returns `GatewayError::Validation` when a `get` call would silently return
/// no rows or carries a non-numeric `take`.
pub fn normalize(
    connector: ConnectorType,
    mut arguments: ArgumentMap,
    app_token: &str,
) -> Result<ArgumentMap> {
    if connector.requires_token() {
        arguments.insert(TOKEN_ARGUMENT.to_string(), ArgValue::Str(token_fragment(app_token)));
    }

    if connector.validates_pagination() {
        validate_pagination(&arguments)?;
    }

    Ok(arguments)
}

/// True when `options` is present and non-empty
fn options_text(arguments: &ArgumentMap) -> Option<String> {
    arguments.get("options").filter(|options| !options.is_empty()).map(ArgValue::to_wire)
}

/// `skip = -1` asks for the full dataset and turns off `take` checks
pub fn is_full_dataset_override(arguments: &ArgumentMap) -> bool {
    let literal = arguments.get("skip").is_some_and(|skip| skip.equals_int(-1));
    let in_options = options_text(arguments)
        .is_some_and(|options| skip_override_regex().is_match(&options));
    literal || in_options
}

fn validate_pagination(arguments: &ArgumentMap) -> Result<()> {
    if is_full_dataset_override(arguments) {
        return Ok(());
    }

    let take = arguments.get("take");
    let take_in_options =
        options_text(arguments).is_some_and(|options| options.to_lowercase().contains("<take>"));

    if take.map_or(true, ArgValue::is_empty) && !take_in_options {
        return Err(GatewayError::validation(
            ValidationCode::MissingTake,
            "'take' argument must not be empty/zero, otherwise no results are returned.",
        ));
    }

    if take.is_some_and(|take| !take.is_numeric()) {
        return Err(GatewayError::validation(
            ValidationCode::NonNumericTake,
            "'take' argument must be a positive number.",
        ));
    }

    Ok(())
}

/// Restore the remote spelling of a folded argument name
pub fn canonical_name(name: &str) -> &str {
    CANONICAL_NAMES
        .iter()
        .find(|(folded, _)| *folded == name)
        .map_or(name, |(_, canonical)| *canonical)
}

/// Build a wire parameter, choosing its encoding by canonical name
pub fn encode_parameter(name: &str, value: &ArgValue) -> SoapParam {
    let name = canonical_name(name);
    if RAW_MARKUP_PARAMS.contains(&name) {
        SoapParam::raw_markup(name, value.to_wire())
    } else {
        SoapParam::scalar(name, value.to_wire())
    }
}

/// Turn normalized arguments into wire parameters, keeping their order
pub fn encode_parameters(arguments: &ArgumentMap) -> Vec<SoapParam> {
    arguments.iter().map(|(name, value)| encode_parameter(name, value)).collect()
}
