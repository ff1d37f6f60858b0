//! Fixtures shared by the GHG crates' test suites.
//!
//! The bundled factor document carries a representative slice of every table:
//! enough fuels, subregions and vehicle vintages to exercise each formula,
//! including a time-varying table with a gap (`lightDutyTrucks.gasoline`
//! covers 1990 and 2000 only).

use std::io::Write;
use std::sync::Arc;

use ghg_factors::FactorTables;
use tempfile::NamedTempFile;

pub const FACTORS_JSON: &str = include_str!("../fixtures/factors.json");

/// Default absolute tolerance when comparing computed emissions.
pub const TOLERANCE: f64 = 1e-4;

pub fn factor_tables() -> FactorTables {
    FactorTables::from_json_str(FACTORS_JSON).expect("bundled factor fixture parses")
}

pub fn shared_factors() -> Arc<FactorTables> {
    Arc::new(factor_tables())
}

/// Build a factor bundle from an ad-hoc JSON document.
pub fn factors_from(doc: serde_json::Value) -> Arc<FactorTables> {
    Arc::new(serde_json::from_value(doc).expect("ad-hoc factor document parses"))
}

/// Write the bundled factors to a temporary file with the given extension.
pub fn factors_file(extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{extension}"))
        .tempfile()
        .expect("create temp factors file");
    file.write_all(FACTORS_JSON.as_bytes())
        .expect("write temp factors file");
    file
}

pub fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= TOLERANCE.max(expected.abs() * 1e-9)
}

/// Read a number out of an output document, panicking with the path on a miss.
pub fn number(doc: &serde_json::Value, pointer: &str) -> f64 {
    doc.pointer(pointer)
        .and_then(serde_json::Value::as_f64)
        .unwrap_or_else(|| panic!("no number at {pointer} in {doc:#}"))
}

#[macro_export]
macro_rules! assert_close {
    ($actual:expr, $expected:expr $(,)?) => {{
        let (actual, expected): (f64, f64) = ($actual, $expected);
        assert!(
            $crate::close(actual, expected),
            "expected {expected}, got {actual} (diff {})",
            (actual - expected).abs()
        );
    }};
}
