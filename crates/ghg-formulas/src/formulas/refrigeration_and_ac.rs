//! Refrigeration and air conditioning leaks.
//!
//! Three alternative estimation tables may be filled in any combination: a
//! full material balance, a simplified material balance, and a screening
//! method based on equipment-class default leak rates. Balance quantities are
//! in pounds; screening quantities are in kilograms.

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
pub struct ScreeningRow {
    pub source_id: Option<Value>,
    pub type_of_equipment: Option<String>,
    pub gas: Option<String>,
    pub new_units_charge: Option<f64>,
    pub capacity_operating_units: Option<f64>,
    pub capacity_disposed_units: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefrigerationAndAcWorksheet {
    pub material_balance: Rows<MaterialBalanceRow>,
    pub simplified_material_balance: Rows<SimplifiedMaterialBalanceRow>,
    pub screening_method: Rows<ScreeningRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEmissions<Q> {
    pub gas: String,
    #[serde(rename = "gasGWP")]
    pub gas_gwp: f64,
    #[serde(flatten)]
    pub quantities: Q,
    pub co2_equivalent_emissions: f64,
}

impl<Q> From<BalanceLine<Q>> for BalanceEmissions<Q> {
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
pub struct ScreeningEmissions {
    pub source_id: Option<Value>,
    pub type_of_equipment: String,
    pub gas: String,
    #[serde(rename = "gasGWP")]
    pub gas_gwp: f64,
    pub new_units_charge: f64,
    pub capacity_operating_units: f64,
    pub capacity_disposed_units: f64,
    pub co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefrigerationAndAcOutput {
    pub material_balance: Vec<RowOutcome<BalanceEmissions<MaterialBalance>>>,
    pub simplified_material_balance: Vec<RowOutcome<BalanceEmissions<SimplifiedMaterialBalance>>>,
    pub screening_method: Vec<RowOutcome<ScreeningEmissions>>,
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct RefrigerationAndAc {
    state: FormulaState<RefrigerationAndAcOutput>,
}

impl Formula for RefrigerationAndAc {
    type Worksheet = RefrigerationAndAcWorksheet;
    type Output = RefrigerationAndAcOutput;
    const NAME: &'static str = "refrigerationAndAc";

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
                BalanceEmissions::from,
            )?;
            let (simplified, smb_total) = make_balance::<SimplifiedMaterialBalance, _, _>(
                factors,
                &worksheet.simplified_material_balance,
                BalanceEmissions::from,
            )?;
            let (screening, screening_total) =
                make_screening_method(factors, &worksheet.screening_method)?;

            let kg = factors.pounds_to_kilograms()? * (mb_total + smb_total) + screening_total;
            Ok(RefrigerationAndAcOutput {
                material_balance,
                simplified_material_balance: simplified,
                screening_method: screening,
                total_co2_equivalent_emissions: kg / 1000.0,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

fn make_screening_method(
    factors: &FactorTables,
    rows: &Rows<ScreeningRow>,
) -> Result<(Vec<RowOutcome<ScreeningEmissions>>, f64), GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    let mut total = 0.0;
    for row in rows {
        let (Some(gas), Some(equipment)) = (present(&row.gas), present(&row.type_of_equipment))
        else {
            out.push(row.echo());
            continue;
        };
        let gwp = factors.gwp(gas)?;
        let rates = factors.refrigeration_equipment(equipment)?;

        let charge = normalize(row.new_units_charge);
        let operating = normalize(row.capacity_operating_units);
        let disposed = normalize(row.capacity_disposed_units);
        let released = charge * rates.installation_emission_factor
            + operating * rates.operating_emission_factor
            + disposed * rates.refrigerant_remaining_at_disposal * (1.0 - rates.recovery_efficiency);
        let co2e = non_negative(gwp * released);
        total += co2e;

        out.push(RowOutcome::Computed(ScreeningEmissions {
            source_id: row.source_id.clone(),
            type_of_equipment: equipment.to_string(),
            gas: gas.to_string(),
            gas_gwp: gwp,
            new_units_charge: charge,
            capacity_operating_units: operating,
            capacity_disposed_units: disposed,
            co2_equivalent_emissions: co2e,
        }));
    }
    Ok((out, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_row_flattens_quantities_between_gwp_and_result() {
        let row = BalanceEmissions {
            gas: "HFC-134a".to_string(),
            gas_gwp: 1430.0,
            quantities: MaterialBalance {
                inventory_change: 1.0,
                transferred_amount: 2.0,
                capacity_change: 3.0,
            },
            co2_equivalent_emissions: 8580.0,
        };
        let value = serde_json::to_value(&row).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 6);
        assert_eq!(value["gasGWP"], 1430.0);
        assert_eq!(value["capacityChange"], 3.0);
        assert_eq!(value["co2EquivalentEmissions"], 8580.0);
    }
}
