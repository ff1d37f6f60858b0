//! Stationary source fuel combustion (boilers, furnaces, generators).
//!
//! Quantities are first converted into each fuel's common unit and summed per
//! fuel; emissions are then computed once per fuel. CO2 from biomass fuels is
//! reported separately and excluded from the CO2-equivalent total.

use std::sync::Arc;

use ghg_common::{Gas, GhgError, non_negative, normalize, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::Rows;
use crate::totals::{CategoryTotals, GasTotals};

pub const FOSSIL_FUELS: [&str; 9] = [
    "anthraciteCoal",
    "bituminousCoal",
    "subBituminousCoal",
    "ligniteCoal",
    "naturalGas",
    "distillateFuelOilNo2",
    "residualFuelOilNo6",
    "kerosene",
    "liquefiedPetroleumGases",
];

pub const NON_FOSSIL_FUELS: [&str; 2] = ["woodAndWoodResiduals", "landfillGas"];

/// Unit every quantity of `fuel` is converted into before factors apply.
pub fn common_unit(fuel: &str) -> Option<&'static str> {
    Some(match fuel {
        "anthraciteCoal" | "bituminousCoal" | "subBituminousCoal" | "ligniteCoal"
        | "woodAndWoodResiduals" => "shortTon",
        "naturalGas" | "landfillGas" => "scf",
        "distillateFuelOilNo2" | "residualFuelOilNo6" | "kerosene" | "liquefiedPetroleumGases" => {
            "gallons"
        }
        _ => return None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FuelConsumptionRow {
    pub fuel_combusted: Option<String>,
    pub quantity_combusted: Option<f64>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StationaryCombustionWorksheet {
    pub stationary_source_fuel_consumption: Rows<FuelConsumptionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombustionTotal {
    pub fuel_type: &'static str,
    pub quantity_combusted: f64,
    pub units: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelEmissions {
    pub fuel_type: &'static str,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationaryCombustionOutput {
    pub total_stationary_source_combustion: Vec<CombustionTotal>,
    pub total_ghg_emissions_from_stationary_source_fuel_combustion: Vec<FuelEmissions>,
    pub total_co2_equivalent_emissions: f64,
    pub total_biomass_equivalent_emissions: f64,
    pub stationary_source_fuel_consumption: Rows<FuelConsumptionRow>,
}

struct Totals {
    combustion: CategoryTotals<f64>,
    fossil: GasTotals,
    non_fossil: GasTotals,
}

impl Totals {
    fn new() -> Self {
        let fuels: Vec<&'static str> = FOSSIL_FUELS.iter().chain(&NON_FOSSIL_FUELS).copied().collect();
        Self {
            combustion: CategoryTotals::new("stationary fuel", &fuels),
            fossil: GasTotals::default(),
            non_fossil: GasTotals::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StationaryCombustion {
    state: FormulaState<StationaryCombustionOutput>,
}

impl Formula for StationaryCombustion {
    type Worksheet = StationaryCombustionWorksheet;
    type Output = StationaryCombustionOutput;
    const NAME: &'static str = "stationaryCombustion";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let mut totals = Totals::new();
            let rows = worksheet.stationary_source_fuel_consumption;

            let combustion = make_total_combustion(factors, &rows, &mut totals)?;
            let emissions = make_emissions(factors, &mut totals)?;
            let co2e = make_co2_equivalent_emissions(factors, &totals)?;
            let biomass = totals.non_fossil.co2 / 1000.0;

            Ok(StationaryCombustionOutput {
                total_stationary_source_combustion: combustion,
                total_ghg_emissions_from_stationary_source_fuel_combustion: emissions,
                total_co2_equivalent_emissions: co2e,
                total_biomass_equivalent_emissions: biomass,
                stationary_source_fuel_consumption: rows,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

fn make_total_combustion(
    factors: &FactorTables,
    rows: &Rows<FuelConsumptionRow>,
    totals: &mut Totals,
) -> Result<Vec<CombustionTotal>, GhgError> {
    for row in rows {
        let (Some(fuel), Some(units)) = (present(&row.fuel_combusted), present(&row.units)) else {
            continue;
        };
        let quantity = normalize(row.quantity_combusted);
        if quantity == 0.0 {
            continue;
        }
        let slot = totals.combustion.slot_mut(fuel)?;
        *slot += factors.heat_content(fuel, units)? * quantity;
    }

    Ok(totals
        .combustion
        .iter()
        .map(|(fuel, quantity)| CombustionTotal {
            fuel_type: fuel,
            quantity_combusted: *quantity,
            units: common_unit(fuel).unwrap_or_default(),
        })
        .collect())
}

fn make_emissions(
    factors: &FactorTables,
    totals: &mut Totals,
) -> Result<Vec<FuelEmissions>, GhgError> {
    let mut rows = Vec::with_capacity(totals.combustion.iter().count() + 3);
    for (fuel, &quantity) in totals.combustion.iter() {
        let emissions = if quantity == 0.0 {
            GasTotals::default()
        } else {
            let factor = factors.stationary(fuel)?;
            GasTotals::try_from_fn(|gas| Ok(non_negative(factor.per_unit(fuel, gas)? * quantity)))?
        };
        if NON_FOSSIL_FUELS.contains(&fuel) {
            totals.non_fossil += emissions;
        } else {
            totals.fossil += emissions;
        }
        rows.push(FuelEmissions {
            fuel_type: fuel,
            emissions,
        });
    }

    let mut all = totals.fossil;
    all += totals.non_fossil;
    rows.extend([
        FuelEmissions {
            fuel_type: "totalFossilFuelEmissions",
            emissions: totals.fossil,
        },
        FuelEmissions {
            fuel_type: "totalNonFossilFuelEmissions",
            emissions: totals.non_fossil,
        },
        FuelEmissions {
            fuel_type: "totalEmissionsForAllFuels",
            emissions: all,
        },
    ]);
    Ok(rows)
}

/// Metric tons CO2e. Biomass CO2 is left out; its CH4 and N2O count.
fn make_co2_equivalent_emissions(factors: &FactorTables, totals: &Totals) -> Result<f64, GhgError> {
    let mut kg = 0.0;
    for gas in Gas::ALL {
        let conversion = match gas {
            Gas::Co2 => 1.0,
            Gas::Ch4 | Gas::N2o => 1.0 / 1000.0,
        };
        let gwp = factors.gas_gwp(gas)?;
        kg += totals.fossil.get(gas) * gwp * conversion;
        if gas != Gas::Co2 {
            kg += totals.non_fossil.get(gas) * gwp * conversion;
        }
    }
    Ok(kg / 1000.0)
}
