//! Industrial gases purchased and released on site (welding, lab, process).

use std::sync::Arc;

use ghg_common::{GhgError, non_negative, normalize, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::{RowOutcome, Rows};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchasedGasRow {
    pub gas: Option<String>,
    /// lb.
    pub purchased_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchasedGasesWorksheet {
    pub purchased_gases: Rows<PurchasedGasRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedGasEmissions {
    pub gas: String,
    #[serde(rename = "gasGWP")]
    pub gas_gwp: f64,
    pub purchased_amount: f64,
    pub co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedGasesOutput {
    pub purchased_gases: Vec<RowOutcome<PurchasedGasEmissions>>,
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct PurchasedGases {
    state: FormulaState<PurchasedGasesOutput>,
}

impl Formula for PurchasedGases {
    type Worksheet = PurchasedGasesWorksheet;
    type Output = PurchasedGasesOutput;
    const NAME: &'static str = "purchasedGases";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let (rows, lb) = make_purchased_gases(factors, &worksheet.purchased_gases)?;
            Ok(PurchasedGasesOutput {
                purchased_gases: rows,
                total_co2_equivalent_emissions: factors.pounds_to_kilograms()? * lb / 1000.0,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

fn make_purchased_gases(
    factors: &FactorTables,
    rows: &Rows<PurchasedGasRow>,
) -> Result<(Vec<RowOutcome<PurchasedGasEmissions>>, f64), GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut total = 0.0;
    for row in rows {
        let Some(gas) = present(&row.gas) else {
            out.push(row.echo());
            continue;
        };
        let gwp = factors.gwp(gas)?;
        let amount = normalize(row.purchased_amount);
        let co2e = non_negative(gwp * amount);
        total += co2e;
        out.push(RowOutcome::Computed(PurchasedGasEmissions {
            gas: gas.to_string(),
            gas_gwp: gwp,
            purchased_amount: amount,
            co2_equivalent_emissions: co2e,
        }));
    }
    Ok((out, total))
}
