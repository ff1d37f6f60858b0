//! Combustion of waste gas streams (flares, thermal oxidizers).
//!
//! The stream's carbon content is built up from its molar composition, then
//! assumed oxidized to CO2 in proportion to the oxidation factor.

use std::sync::Arc;

use ghg_common::{GhgError, non_negative, normalize, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::{RowOutcome, Rows};

/// Balance component with no carbon and no molecular weight entry.
pub const NON_CARBON_COMPONENT: &str = "Other non-carbon";

/// Molecular weight of CO2 over the atomic weight of carbon.
const CO2_PER_CARBON: f64 = 44.0098 / 12.001;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GasComponentRow {
    pub component: Option<String>,
    /// Percent of the stream.
    pub molar_fraction: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WasteGasesWorksheet {
    pub gas_total_number_of_moles_per_unit_volume: Option<f64>,
    pub oxidation_factor: Option<f64>,
    pub waste_stream_gas_combusted: Option<f64>,
    pub emission_factor_for_gas_waste_stream: Rows<GasComponentRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GasComponentEmissions {
    pub component: String,
    pub chemical_formula: Option<String>,
    pub molar_fraction: f64,
    pub total_moles: f64,
    pub molecular_weight: f64,
    pub percent_carbon: f64,
    pub carbon_content: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamTotals {
    pub molar_fraction: f64,
    pub total_moles: f64,
    pub carbon_content: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteGasesOutput {
    pub emission_factor_for_gas_waste_stream: Vec<RowOutcome<GasComponentEmissions>>,
    pub total_for_all_components: StreamTotals,
    pub total_co2_equivalent_emissions: f64,
    pub waste_stream_gas_combusted: Option<f64>,
    pub gas_total_number_of_moles_per_unit_volume: f64,
    pub oxidation_factor: f64,
}

#[derive(Debug, Clone)]
pub struct WasteGases {
    state: FormulaState<WasteGasesOutput>,
}

impl Formula for WasteGases {
    type Worksheet = WasteGasesWorksheet;
    type Output = WasteGasesOutput;
    const NAME: &'static str = "wasteGases";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, config| {
            let moles_per_volume = setting(
                worksheet.gas_total_number_of_moles_per_unit_volume,
                config.gas_moles_per_unit_volume,
            );
            let oxidation = setting(worksheet.oxidation_factor, config.oxidation_factor_percent);

            let mut totals = StreamTotals::default();
            let rows = make_emission_factor_for_gas_waste_stream(
                factors,
                &worksheet.emission_factor_for_gas_waste_stream,
                moles_per_volume,
                &mut totals,
            )?;
            let co2e = make_co2_equivalent_emissions(
                factors,
                &totals,
                oxidation,
                worksheet.waste_stream_gas_combusted,
            )?;

            Ok(WasteGasesOutput {
                emission_factor_for_gas_waste_stream: rows,
                total_for_all_components: totals,
                total_co2_equivalent_emissions: co2e,
                waste_stream_gas_combusted: worksheet.waste_stream_gas_combusted,
                gas_total_number_of_moles_per_unit_volume: moles_per_volume,
                oxidation_factor: oxidation,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

/// A worksheet setting of zero counts as unset.
fn setting(value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(v) if v != 0.0 => v,
        _ => default,
    }
}

fn make_emission_factor_for_gas_waste_stream(
    factors: &FactorTables,
    rows: &Rows<GasComponentRow>,
    moles_per_volume: f64,
    totals: &mut StreamTotals,
) -> Result<Vec<RowOutcome<GasComponentEmissions>>, GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(component) = present(&row.component) else {
            out.push(row.echo());
            continue;
        };
        let molar_fraction = normalize(row.molar_fraction);
        let (chemical_formula, molecular_weight, percent_carbon) = if component == NON_CARBON_COMPONENT {
            (None, 0.0, 0.0)
        } else {
            let entry = factors.molecular_weight(component)?;
            (
                Some(entry.chemical_formula.clone()),
                entry.molecular_weight,
                entry.percent_carbon,
            )
        };
        let total_moles = non_negative(molar_fraction / 100.0 * moles_per_volume);
        let carbon_content = non_negative(total_moles * molecular_weight * percent_carbon);

        totals.molar_fraction += molar_fraction;
        totals.total_moles += total_moles;
        totals.carbon_content += carbon_content;

        out.push(RowOutcome::Computed(GasComponentEmissions {
            component: component.to_string(),
            chemical_formula,
            molar_fraction,
            total_moles,
            molecular_weight,
            percent_carbon,
            carbon_content,
        }));
    }
    Ok(out)
}

/// Metric tons CO2. Zero when no stream volume was combusted.
fn make_co2_equivalent_emissions(
    factors: &FactorTables,
    totals: &StreamTotals,
    oxidation_percent: f64,
    combusted: Option<f64>,
) -> Result<f64, GhgError> {
    let combusted = normalize(combusted);
    if combusted == 0.0 {
        return Ok(0.0);
    }
    let lb = totals.carbon_content * oxidation_percent / 100.0 * CO2_PER_CARBON * combusted;
    Ok(lb * factors.pounds_to_kilograms()? / 1000.0)
}
