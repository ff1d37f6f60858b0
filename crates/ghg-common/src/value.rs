//! Worksheet value helpers.
//!
//! Worksheet rows are sparse: quantities may be absent, `null` or `0`, and
//! categorical fields may be absent or empty. Every formula funnels raw row
//! values through the helpers here before doing arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GhgError;

/// Absent and zero quantities both read as `0.0`.
#[inline]
pub fn normalize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => 0.0,
    }
}

/// Clamp a computed emission to zero. NaN clamps to zero as well.
#[inline]
pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// A categorical field counts as present only when it is a non-empty string.
#[inline]
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// True when a quantity field carries a non-zero number.
#[inline]
pub fn is_set(value: Option<f64>) -> bool {
    normalize(value) != 0.0
}

/// A vehicle vintage year exactly as a worksheet supplied it.
///
/// Worksheets are hand-filled, so the year may arrive as a JSON integer, a
/// float such as `2005.0`, or a string such as `"2005"`. Anything else is kept
/// verbatim so resolution can report it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearValue {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl YearValue {
    /// Coerce to an integer year.
    ///
    /// Integers pass through; floats must be integer-valued; strings must be
    /// non-empty and consist only of ASCII digits.
    pub fn as_year(&self) -> Result<i64, GhgError> {
        match self {
            YearValue::Int(i) => Ok(*i),
            YearValue::Float(f) if f.is_finite() && f.fract() == 0.0 => Ok(*f as i64),
            YearValue::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse::<i64>().map_err(|_| self.invalid())
            }
            _ => Err(self.invalid()),
        }
    }

    fn invalid(&self) -> GhgError {
        GhgError::YearValue {
            value: self.to_string(),
        }
    }
}

impl From<i64> for YearValue {
    fn from(year: i64) -> Self {
        YearValue::Int(year)
    }
}

impl From<&str> for YearValue {
    fn from(year: &str) -> Self {
        YearValue::Text(year.to_string())
    }
}

impl fmt::Display for YearValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearValue::Int(i) => write!(f, "{i}"),
            YearValue::Float(v) => write!(f, "{v}"),
            YearValue::Text(s) => f.write_str(s),
            YearValue::Other(v) => write!(f, "{v}"),
        }
    }
}
