//! Named scalar arguments for remote calls

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Scalar argument value
///
/// The remote API only accepts scalars. `is_empty` and `is_numeric` follow the
/// loose rules the service itself applies to submitted strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

/// Numeric string: optional surrounding whitespace, sign, decimal digits and
/// exponent
#[allow(clippy::expect_used)]
fn numeric_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[ \t\n\r\x0B\x0C]*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?[ \t\n\r\x0B\x0C]*$")
            .expect("numeric pattern is valid")
    })
}

impl ArgValue {
    /// True for `0`, `0.0`, `false`, `""` and `"0"`
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Int(value) => *value == 0,
            Self::Float(value) => *value == 0.0,
            Self::Bool(value) => !value,
            Self::Str(value) => value.is_empty() || value == "0",
        }
    }

    /// True for integers, floats and numeric strings
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Int(_) | Self::Float(_) => true,
            Self::Bool(_) => false,
            Self::Str(value) => numeric_regex().is_match(value),
        }
    }

    /// Numeric value, if the argument is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(value) => Some(*value as f64),
            Self::Float(value) => Some(*value),
            Self::Bool(_) => None,
            Self::Str(value) if numeric_regex().is_match(value) => value.trim().parse().ok(),
            Self::Str(_) => None,
        }
    }

    /// True when the value compares equal to the given integer
    ///
    /// Numeric strings compare by value; booleans never match.
    pub fn equals_int(&self, expected: i64) -> bool {
        match self {
            Self::Int(value) => *value == expected,
            #[allow(clippy::cast_precision_loss)]
            _ => self.as_f64().is_some_and(|value| (value - expected as f64).abs() < f64::EPSILON),
        }
    }

    /// String form sent on the wire
    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(true) => f.write_str("1"),
            Self::Bool(false) => Ok(()),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for ArgValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Caller-supplied named arguments, in the order given
///
/// Names are case-insensitive. Entries are kept exactly as supplied, so two
/// names differing only in case may co-exist here; the client folds them
/// before dispatch and the later entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arguments {
    entries: Vec<(String, ArgValue)>,
}

impl Arguments {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.push(name, value);
        self
    }

    /// Append an argument in place
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for Arguments {
    type Item = (String, ArgValue);
    type IntoIter = std::vec::IntoIter<(String, ArgValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Arguments
where
    K: Into<String>,
    V: Into<ArgValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(name, value)| (name.into(), value.into())).collect(),
        }
    }
}
