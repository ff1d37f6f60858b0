//! Purchased carbon offsets, reported as a negative adjustment.

use std::sync::Arc;

use ghg_common::{GhgError, normalize};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::Rows;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OffsetProjectRow {
    /// Metric tons CO2e.
    pub purchased_offset: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchasedOffsetsWorksheet {
    pub purchased_offsets: Rows<OffsetProjectRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedOffsetsOutput {
    pub total_purchased_offsets: f64,
}

#[derive(Debug, Clone)]
pub struct PurchasedOffsets {
    state: FormulaState<PurchasedOffsetsOutput>,
}

impl Formula for PurchasedOffsets {
    type Worksheet = PurchasedOffsetsWorksheet;
    type Output = PurchasedOffsetsOutput;
    const NAME: &'static str = "purchasedOffsets";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |_, _| {
            let sum: f64 = worksheet
                .purchased_offsets
                .iter()
                .map(|project| normalize(project.purchased_offset))
                .sum();
            Ok(PurchasedOffsetsOutput {
                // `0.0 - x` rather than `-x` keeps an empty sheet at +0.0.
                total_purchased_offsets: 0.0 - sum,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}
