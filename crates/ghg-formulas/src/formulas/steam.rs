//! Purchased steam and district heat.
//!
//! Emissions are estimated from the fuel burned to raise the steam: steam
//! energy divided by boiler efficiency, times a per-mmBtu factor. Supplier
//! factors override the stationary combustion defaults.

use std::sync::Arc;

use ghg_common::{Gas, GhgError, non_negative, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::{RowOutcome, Rows};
use crate::totals::{CategoryTotals, GasTotals};

pub const STEAM_FUEL_TYPES: [&str; 13] = [
    "anthraciteCoal",
    "bituminousCoal",
    "coalCoke",
    "distillateFuelOilNo2",
    "kerosene",
    "landfillGas",
    "ligniteCoal",
    "liquefiedPetroleumGases",
    "mixedElectricPowerSector",
    "naturalGas",
    "residualFuelOilNo6",
    "subBituminousCoal",
    "woodAndWoodResiduals",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SteamRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub source_area: Option<Value>,
    pub fuel_type: Option<String>,
    /// Percent.
    pub boiler_efficiency: Option<f64>,
    /// mmBtu.
    pub steam_purchased: Option<f64>,
    #[serde(rename = "locationBasedEmissionFactorsCO2Factor")]
    pub location_co2_factor: Option<f64>,
    #[serde(rename = "locationBasedEmissionFactorsCH4Factor")]
    pub location_ch4_factor: Option<f64>,
    #[serde(rename = "locationBasedEmissionFactorsN2OFactor")]
    pub location_n2o_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsCO2Factor")]
    pub market_co2_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsCH4Factor")]
    pub market_ch4_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsN2OFactor")]
    pub market_n2o_factor: Option<f64>,
}

impl SteamRow {
    fn location_factor(&self, gas: Gas) -> Option<f64> {
        match gas {
            Gas::Co2 => self.location_co2_factor,
            Gas::Ch4 => self.location_ch4_factor,
            Gas::N2o => self.location_n2o_factor,
        }
    }

    fn market_factor(&self, gas: Gas) -> Option<f64> {
        match gas {
            Gas::Co2 => self.market_co2_factor,
            Gas::Ch4 => self.market_ch4_factor,
            Gas::N2o => self.market_n2o_factor,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SteamWorksheet {
    pub emission_factor_data_for_steam_purchased: Rows<SteamRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub source_area: Option<Value>,
    pub fuel_type: String,
    /// As entered, percent.
    pub boiler_efficiency: Option<f64>,
    pub steam_purchased: f64,
    #[serde(rename = "locationBasedEmissionFactorsCO2Factor")]
    pub location_co2_factor: Option<f64>,
    #[serde(rename = "locationBasedEmissionFactorsCH4Factor")]
    pub location_ch4_factor: Option<f64>,
    #[serde(rename = "locationBasedEmissionFactorsN2OFactor")]
    pub location_n2o_factor: Option<f64>,
    #[serde(rename = "locationBasedEmissionsCO2Emissions")]
    pub location_co2: f64,
    #[serde(rename = "locationBasedEmissionsCH4Emissions")]
    pub location_ch4: f64,
    #[serde(rename = "locationBasedEmissionsN2OEmissions")]
    pub location_n2o: f64,
    #[serde(rename = "marketBasedEmissionFactorsCO2Factor")]
    pub market_co2_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsCH4Factor")]
    pub market_ch4_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsN2OFactor")]
    pub market_n2o_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionsCO2Emissions")]
    pub market_co2: f64,
    #[serde(rename = "marketBasedEmissionsCH4Emissions")]
    pub market_ch4: f64,
    #[serde(rename = "marketBasedEmissionsN2OEmissions")]
    pub market_n2o: f64,
}

/// Per-fuel subtotal; keys match `emissionsBySourceAndFuelType` rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SteamFuelTotals {
    #[serde(rename = "locationBasedCO2Emissions")]
    pub location_co2: f64,
    #[serde(rename = "locationBasedCH4Emissions")]
    pub location_ch4: f64,
    #[serde(rename = "locationBasedN2OEmissions")]
    pub location_n2o: f64,
    #[serde(rename = "marketBasedCO2Emissions")]
    pub market_co2: f64,
    #[serde(rename = "marketBasedCH4Emissions")]
    pub market_ch4: f64,
    #[serde(rename = "marketBasedN2OEmissions")]
    pub market_n2o: f64,
}

impl SteamFuelTotals {
    fn add(&mut self, location: &GasTotals, market: &GasTotals) {
        self.location_co2 += location.co2;
        self.location_ch4 += location.ch4;
        self.location_n2o += location.n2o;
        self.market_co2 += market.co2;
        self.market_ch4 += market.ch4;
        self.market_n2o += market.n2o;
    }

    fn location(&self) -> GasTotals {
        GasTotals {
            co2: self.location_co2,
            ch4: self.location_ch4,
            n2o: self.location_n2o,
        }
    }

    fn market(&self) -> GasTotals {
        GasTotals {
            co2: self.market_co2,
            ch4: self.market_ch4,
            n2o: self.market_n2o,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelTypeEmissions {
    pub fuel_type: &'static str,
    #[serde(flatten)]
    pub emissions: SteamFuelTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SteamOutput {
    pub emission_factor_data_for_steam_purchased: Vec<RowOutcome<SteamEmissions>>,
    pub emissions_by_source_and_fuel_type: Vec<FuelTypeEmissions>,
    #[serde(rename = "CO2EquivalentEmissionsLocationBasedElectricityEmissions")]
    pub co2_equivalent_location_based: f64,
    #[serde(rename = "CO2EquivalentEmissionsMarketBasedElectricityEmissions")]
    pub co2_equivalent_market_based: f64,
}

#[derive(Debug, Clone)]
pub struct Steam {
    state: FormulaState<SteamOutput>,
}

impl Formula for Steam {
    type Worksheet = SteamWorksheet;
    type Output = SteamOutput;
    const NAME: &'static str = "steam";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, config| {
            let mut by_fuel: CategoryTotals<SteamFuelTotals> =
                CategoryTotals::new("steam fuel type", &STEAM_FUEL_TYPES);
            let rows = make_emission_factor_data(
                factors,
                config,
                &worksheet.emission_factor_data_for_steam_purchased,
                &mut by_fuel,
            )?;
            let (by_source, total) = make_emissions_by_source_and_fuel_type(&by_fuel);

            Ok(SteamOutput {
                emission_factor_data_for_steam_purchased: rows,
                emissions_by_source_and_fuel_type: by_source,
                co2_equivalent_location_based: total.location().co2e_kg(factors)? / 1000.0,
                co2_equivalent_market_based: total.market().co2e_kg(factors)? / 1000.0,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

fn make_emission_factor_data(
    factors: &FactorTables,
    config: &FormulaConfig,
    rows: &Rows<SteamRow>,
    by_fuel: &mut CategoryTotals<SteamFuelTotals>,
) -> Result<Vec<RowOutcome<SteamEmissions>>, GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let steam = row.steam_purchased.filter(|v| *v != 0.0);
        let (Some(fuel), Some(steam)) = (present(&row.fuel_type), steam) else {
            out.push(row.echo());
            continue;
        };
        let efficiency = match row.boiler_efficiency {
            Some(percent) if percent != 0.0 => percent / 100.0,
            _ => config.boiler_efficiency,
        };

        let location = GasTotals::try_from_fn(|gas| {
            let factor = match row.location_factor(gas) {
                Some(f) if f != 0.0 => f,
                _ => factors.stationary(fuel)?.per_mmbtu(fuel, gas)?,
            };
            Ok(non_negative(steam * factor / efficiency))
        })?;
        let market = GasTotals::try_from_fn(|gas| {
            Ok(match row.market_factor(gas) {
                Some(f) if f != 0.0 => non_negative(steam * f / efficiency),
                _ => location.get(gas),
            })
        })?;

        by_fuel.slot_mut(fuel)?.add(&location, &market);

        out.push(RowOutcome::Computed(SteamEmissions {
            source_id: row.source_id.clone(),
            source_description: row.source_description.clone(),
            source_area: row.source_area.clone(),
            fuel_type: fuel.to_string(),
            boiler_efficiency: row.boiler_efficiency,
            steam_purchased: steam,
            location_co2_factor: row.location_co2_factor,
            location_ch4_factor: row.location_ch4_factor,
            location_n2o_factor: row.location_n2o_factor,
            location_co2: location.co2,
            location_ch4: location.ch4,
            location_n2o: location.n2o,
            market_co2_factor: row.market_co2_factor,
            market_ch4_factor: row.market_ch4_factor,
            market_n2o_factor: row.market_n2o_factor,
            market_co2: market.co2,
            market_ch4: market.ch4,
            market_n2o: market.n2o,
        }));
    }
    Ok(out)
}

fn make_emissions_by_source_and_fuel_type(
    by_fuel: &CategoryTotals<SteamFuelTotals>,
) -> (Vec<FuelTypeEmissions>, SteamFuelTotals) {
    let mut total = SteamFuelTotals::default();
    let mut rows: Vec<FuelTypeEmissions> = by_fuel
        .iter()
        .map(|(fuel, emissions)| {
            total.add(&emissions.location(), &emissions.market());
            FuelTypeEmissions {
                fuel_type: fuel,
                emissions: *emissions,
            }
        })
        .collect();
    rows.push(FuelTypeEmissions {
        fuel_type: "totalEmissions",
        emissions: total,
    });
    (rows, total)
}
