//! Fire suppression equipment (HFC/PFC agents).
//!
//! Uses the same material-balance tables as refrigeration. The screening
//! method applies a flat annual leak rate to the installed agent capacity of
//! fixed or portable systems. All quantities are in pounds.

use std::sync::Arc;

use ghg_common::{GhgError, non_negative, normalize, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::formulas::balance::{
    BalanceLine, MaterialBalance, MaterialBalanceRow, SimplifiedMaterialBalance,
    SimplifiedMaterialBalanceRow, make_balance,
};
use crate::row::{RowOutcome, Rows};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SuppressionScreeningRow {
    pub source_id: Option<Value>,
    /// `fixed` or `portable`.
    pub type_of_equipment: Option<String>,
    pub gas_type: Option<String>,
    pub units_capacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FireSuppressionWorksheet {
    pub material_balance: Rows<MaterialBalanceRow>,
    pub simplified_material_balance: Rows<SimplifiedMaterialBalanceRow>,
    pub screening_method: Rows<SuppressionScreeningRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionBalanceEmissions<Q> {
    pub gas: String,
    #[serde(rename = "gasGWP")]
    pub gas_gwp: f64,
    #[serde(flatten)]
    pub quantities: Q,
    #[serde(rename = "CO2EquivalentEmissions")]
    pub co2_equivalent_emissions: f64,
}

impl<Q> From<BalanceLine<Q>> for SuppressionBalanceEmissions<Q> {
    fn from(line: BalanceLine<Q>) -> Self {
        Self {
            gas: line.gas,
            gas_gwp: line.gwp,
            quantities: line.quantities,
            co2_equivalent_emissions: line.co2e,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppressionScreeningEmissions {
    pub source_id: Option<Value>,
    pub type_of_equipment: String,
    pub gas_type: String,
    #[serde(rename = "gasGWP")]
    pub gas_gwp: f64,
    pub units_capacity: f64,
    pub leak_rate: f64,
    #[serde(rename = "CO2EquivalentEmissions")]
    pub co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FireSuppressionOutput {
    pub material_balance: Vec<RowOutcome<SuppressionBalanceEmissions<MaterialBalance>>>,
    pub simplified_material_balance:
        Vec<RowOutcome<SuppressionBalanceEmissions<SimplifiedMaterialBalance>>>,
    pub screening_method: Vec<RowOutcome<SuppressionScreeningEmissions>>,
    #[serde(rename = "totalCO2EquivalentEmissions")]
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct FireSuppression {
    state: FormulaState<FireSuppressionOutput>,
}

impl Formula for FireSuppression {
    type Worksheet = FireSuppressionWorksheet;
    type Output = FireSuppressionOutput;
    const NAME: &'static str = "fireSuppression";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let (material_balance, mb_total) = make_balance::<MaterialBalance, _, _>(
                factors,
                &worksheet.material_balance,
                SuppressionBalanceEmissions::from,
            )?;
            let (simplified, smb_total) = make_balance::<SimplifiedMaterialBalance, _, _>(
                factors,
                &worksheet.simplified_material_balance,
                SuppressionBalanceEmissions::from,
            )?;
            let (screening, screening_total) =
                make_screening_method(factors, &worksheet.screening_method)?;

            let lb = mb_total + smb_total + screening_total;
            Ok(FireSuppressionOutput {
                material_balance,
                simplified_material_balance: simplified,
                screening_method: screening,
                total_co2_equivalent_emissions: factors.pounds_to_kilograms()? * lb / 1000.0,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

fn make_screening_method(
    factors: &FactorTables,
    rows: &Rows<SuppressionScreeningRow>,
) -> Result<(Vec<RowOutcome<SuppressionScreeningEmissions>>, f64), GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut total = 0.0;
    for row in rows {
        let (Some(gas), Some(equipment)) = (present(&row.gas_type), present(&row.type_of_equipment))
        else {
            out.push(row.echo());
            continue;
        };
        let gwp = factors.gwp(gas)?;
        let leak_rate = factors.fire_suppression_leak_rate(equipment)?;
        let capacity = normalize(row.units_capacity);
        let co2e = non_negative(gwp * capacity * leak_rate);
        total += co2e;

        out.push(RowOutcome::Computed(SuppressionScreeningEmissions {
            source_id: row.source_id.clone(),
            type_of_equipment: equipment.to_string(),
            gas_type: gas.to_string(),
            gas_gwp: gwp,
            units_capacity: capacity,
            leak_rate,
            co2_equivalent_emissions: co2e,
        }));
    }
    Ok((out, total))
}
