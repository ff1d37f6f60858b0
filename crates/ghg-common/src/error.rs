//! Error type shared by the factor layer and the category formulas.
//!
//! Two failure families exist:
//!
//! - **year resolution** (`YearValue`, `YearMap`): raised while mapping a
//!   vehicle vintage onto a time-varying factor table. Callers that tabulate
//!   many rows may treat these as per-row soft failures.
//! - **everything else**: structural problems (a category missing from a
//!   factor table, malformed factor data, undecodable worksheets) that abort
//!   the whole calculation.

use thiserror::Error;

pub type Result<T, E = GhgError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum GhgError {
    /// The supplied vintage year is not an integer, an integer-valued float,
    /// or a string of ASCII digits.
    #[error("vintage year `{value}` cannot be read as an integer year")]
    YearValue { value: String },

    /// The year lies strictly inside the table's range but has no entry.
    #[error("no factor recorded for year {year} (table covers {min}..={max})")]
    YearMap { year: i64, min: i64, max: i64 },

    #[error("`{key}` is not present in the {table} table")]
    MissingKey { table: &'static str, key: String },

    #[error("malformed {table} table: {reason}")]
    MalformedTable { table: String, reason: String },

    #[error("{formula} output could not be serialized")]
    Unserializable { formula: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GhgError {
    pub fn missing(table: &'static str, key: impl Into<String>) -> Self {
        GhgError::MissingKey {
            table,
            key: key.into(),
        }
    }

    pub fn malformed(table: impl Into<String>, reason: impl Into<String>) -> Self {
        GhgError::MalformedTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// True for the vintage-year failures that row tabulation may absorb.
    pub fn is_year_error(&self) -> bool {
        matches!(self, GhgError::YearValue { .. } | GhgError::YearMap { .. })
    }
}
