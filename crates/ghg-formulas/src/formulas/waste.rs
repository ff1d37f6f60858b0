//! Waste sent off site for recycling, landfill, combustion, composting or
//! anaerobic digestion.

use std::sync::Arc;

use ghg_common::{GhgError, non_negative, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::{RowOutcome, Rows};
use crate::totals::CategoryTotals;

pub const DISPOSAL_METHODS: [&str; 6] = [
    "recycled",
    "landfilled",
    "combusted",
    "composted",
    "anaerobicallyDigestedDry",
    "anaerobicallyDigestedWet",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WasteDisposalRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub waste_material: Option<String>,
    pub disposal_method: Option<String>,
    pub weight: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WasteWorksheet {
    pub waste_disposal: Rows<WasteDisposalRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub waste_material: String,
    pub disposal_method: String,
    pub weight: f64,
    pub unit: String,
    /// kg.
    #[serde(rename = "CO2Emissions")]
    pub co2_emissions: f64,
}

/// Subtotal for one disposal method. The method is published under
/// `wasteMaterial`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisposalMethodTotal {
    #[serde(rename = "wasteMaterial")]
    pub disposal_method: &'static str,
    #[serde(rename = "CO2")]
    pub co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteOutput {
    pub waste_disposal: Vec<RowOutcome<WasteEmissions>>,
    pub total_emissions_by_disposal_method: Vec<DisposalMethodTotal>,
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct Waste {
    state: FormulaState<WasteOutput>,
}

impl Formula for Waste {
    type Worksheet = WasteWorksheet;
    type Output = WasteOutput;
    const NAME: &'static str = "waste";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let mut by_method: CategoryTotals<f64> =
                CategoryTotals::new("disposal method", &DISPOSAL_METHODS);
            let rows = make_waste_disposal(factors, &worksheet.waste_disposal, &mut by_method)?;
            let subtotals: Vec<DisposalMethodTotal> = by_method
                .iter()
                .map(|(method, co2)| DisposalMethodTotal {
                    disposal_method: method,
                    co2: *co2,
                })
                .collect();
            let kg: f64 = by_method.values().sum();

            Ok(WasteOutput {
                waste_disposal: rows,
                total_emissions_by_disposal_method: subtotals,
                total_co2_equivalent_emissions: kg / 1000.0,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

fn make_waste_disposal(
    factors: &FactorTables,
    rows: &Rows<WasteDisposalRow>,
    by_method: &mut CategoryTotals<f64>,
) -> Result<Vec<RowOutcome<WasteEmissions>>, GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let weight = row.weight.filter(|w| *w != 0.0);
        let (Some(material), Some(method), Some(weight), Some(unit)) = (
            present(&row.waste_material),
            present(&row.disposal_method),
            weight,
            present(&row.unit),
        ) else {
            out.push(row.echo());
            continue;
        };
        // Factors are metric tons CO2e per short ton.
        let per_short_ton = factors.waste(material, method)?;
        let to_short_tons = factors.unit_conversion(unit, "shortTon")?;
        let co2 = non_negative(per_short_ton * to_short_tons * weight * 1000.0);
        *by_method.slot_mut(method)? += co2;

        out.push(RowOutcome::Computed(WasteEmissions {
            source_id: row.source_id.clone(),
            source_description: row.source_description.clone(),
            waste_material: material.to_string(),
            disposal_method: method.to_string(),
            weight,
            unit: unit.to_string(),
            co2_emissions: co2,
        }));
    }
    Ok(out)
}
