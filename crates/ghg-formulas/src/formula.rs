//! The contract every category formula implements.

use std::sync::Arc;

use ghg_common::GhgError;
use ghg_factors::FactorTables;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::FormulaConfig;

/// A category calculation over a worksheet.
///
/// Lifecycle: construct over shared factor tables (optionally with a first
/// worksheet), then call [`Formula::recalc`] as often as needed. Each recalc
/// replaces the previous output wholesale; a failed recalc leaves no output.
pub trait Formula: Sized {
    type Worksheet: DeserializeOwned + Default;
    type Output: Serialize;

    /// Category name used in logs and errors.
    const NAME: &'static str;

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self;

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError>;

    /// Output of the last successful recalc.
    fn output(&self) -> Option<&Self::Output>;

    fn new(factors: Arc<FactorTables>) -> Self {
        Self::with_config(factors, FormulaConfig::default())
    }

    /// Construct with the default config and immediately compute.
    fn with_worksheet(
        factors: Arc<FactorTables>,
        worksheet: Self::Worksheet,
    ) -> Result<Self, GhgError> {
        Self::with_worksheet_and_config(factors, FormulaConfig::default(), worksheet)
    }

    fn with_worksheet_and_config(
        factors: Arc<FactorTables>,
        config: FormulaConfig,
        worksheet: Self::Worksheet,
    ) -> Result<Self, GhgError> {
        let mut formula = Self::with_config(factors, config);
        formula.recalc(worksheet)?;
        Ok(formula)
    }

    /// Decode a raw JSON worksheet and recalc.
    fn recalc_json(&mut self, worksheet: serde_json::Value) -> Result<&Self::Output, GhgError> {
        let worksheet: Self::Worksheet = serde_json::from_value(worksheet)?;
        self.recalc(worksheet)
    }

    /// JSON view of the output, or `None` when there is no output or it
    /// cannot be represented as JSON.
    fn to_dict(&self) -> Option<serde_json::Value> {
        let output = self.output()?;
        match serde_json::to_value(output) {
            Ok(value) => Some(value),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(formula = Self::NAME, error = %_err, "output is not JSON-serializable");
                None
            }
        }
    }

    /// Pretty-printed JSON text of the output; `None` under the same
    /// conditions as [`Formula::to_dict`].
    fn to_json(&self) -> Option<String> {
        let output = self.output()?;
        match serde_json::to_string_pretty(output) {
            Ok(text) => Some(text),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(formula = Self::NAME, error = %_err, "output is not JSON-serializable");
                None
            }
        }
    }
}

/// Shared state behind every formula: the factor tables, the configured
/// defaults and the last output.
#[derive(Debug, Clone)]
pub struct FormulaState<O> {
    factors: Arc<FactorTables>,
    config: FormulaConfig,
    output: Option<O>,
}

impl<O> FormulaState<O> {
    pub fn new(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            factors,
            config,
            output: None,
        }
    }

    pub fn factors(&self) -> &FactorTables {
        &self.factors
    }

    pub fn config(&self) -> &FormulaConfig {
        &self.config
    }

    pub fn output(&self) -> Option<&O> {
        self.output.as_ref()
    }

    /// Clear the previous output, run `compute`, and keep its result.
    pub fn run(
        &mut self,
        formula: &'static str,
        compute: impl FnOnce(&FactorTables, &FormulaConfig) -> Result<O, GhgError>,
    ) -> Result<&O, GhgError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("recalc", formula).entered();
        #[cfg(not(feature = "tracing"))]
        let _ = formula;

        self.output = None;
        let output = compute(&self.factors, &self.config)?;
        Ok(self.output.insert(output))
    }
}
