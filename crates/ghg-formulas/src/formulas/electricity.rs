//! Purchased electricity, reported both location-based (eGRID subregion
//! averages) and market-based (contractual factors, falling back to the
//! location-based figure when none is supplied).

use std::sync::Arc;

use ghg_common::{Gas, GhgError, non_negative, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::{RowOutcome, Rows};
use crate::totals::GasTotals;

/// eGRID subregion acronyms.
pub const EGRID_SUBREGIONS: [&str; 27] = [
    "akgd", "akms", "aznm", "camx", "erct", "frcc", "hims", "hioa", "mroe", "mrow", "newe", "nwpp",
    "nycw", "nyli", "nyup", "prms", "rfce", "rfcm", "rfcw", "rmpa", "spno", "spso", "srmv", "srmw",
    "srso", "srtv", "srvc",
];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElectricityRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub source_area: Option<Value>,
    pub e_grid_subregion: Option<String>,
    pub electricity_purchased: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsCO2Emissions")]
    pub market_based_co2_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsCH4Emissions")]
    pub market_based_ch4_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsN2OEmissions")]
    pub market_based_n2o_factor: Option<f64>,
}

impl ElectricityRow {
    fn market_factor(&self, gas: Gas) -> Option<f64> {
        match gas {
            Gas::Co2 => self.market_based_co2_factor,
            Gas::Ch4 => self.market_based_ch4_factor,
            Gas::N2o => self.market_based_n2o_factor,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElectricityWorksheet {
    pub total_electricity_purchased: Rows<ElectricityRow>,
}

/// Market- and location-based emissions, lb of each gas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DualEmissions {
    #[serde(rename = "marketBasedEmissionsCO2Emissions")]
    pub market_co2: f64,
    #[serde(rename = "marketBasedEmissionsCH4Emissions")]
    pub market_ch4: f64,
    #[serde(rename = "marketBasedEmissionsN2OEmissions")]
    pub market_n2o: f64,
    #[serde(rename = "locationBasedEmissionsCO2Emissions")]
    pub location_co2: f64,
    #[serde(rename = "locationBasedEmissionsCH4Emissions")]
    pub location_ch4: f64,
    #[serde(rename = "locationBasedEmissionsN2OEmissions")]
    pub location_n2o: f64,
}

impl DualEmissions {
    fn new(market: GasTotals, location: GasTotals) -> Self {
        Self {
            market_co2: market.co2,
            market_ch4: market.ch4,
            market_n2o: market.n2o,
            location_co2: location.co2,
            location_ch4: location.ch4,
            location_n2o: location.n2o,
        }
    }

    fn market(&self) -> GasTotals {
        GasTotals {
            co2: self.market_co2,
            ch4: self.market_ch4,
            n2o: self.market_n2o,
        }
    }

    fn location(&self) -> GasTotals {
        GasTotals {
            co2: self.location_co2,
            ch4: self.location_ch4,
            n2o: self.location_n2o,
        }
    }

    fn add(&mut self, other: &DualEmissions) {
        self.market_co2 += other.market_co2;
        self.market_ch4 += other.market_ch4;
        self.market_n2o += other.market_n2o;
        self.location_co2 += other.location_co2;
        self.location_ch4 += other.location_ch4;
        self.location_n2o += other.location_n2o;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub source_area: Option<Value>,
    pub e_grid_subregion: String,
    pub electricity_purchased: f64,
    #[serde(rename = "marketBasedEmissionFactorsCO2Emissions")]
    pub market_based_co2_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsCH4Emissions")]
    pub market_based_ch4_factor: Option<f64>,
    #[serde(rename = "marketBasedEmissionFactorsN2OEmissions")]
    pub market_based_n2o_factor: Option<f64>,
    #[serde(flatten)]
    pub emissions: DualEmissions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityTotals {
    pub electricity_purchased: f64,
    #[serde(flatten)]
    pub emissions: DualEmissions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityOutput {
    pub total_electricity_purchased: Vec<RowOutcome<ElectricityEmissions>>,
    pub total_emissions_for_all_sources: ElectricityTotals,
    #[serde(rename = "CO2EquivalentEmissionsLocationBasedElectricityEmissions")]
    pub co2_equivalent_location_based: f64,
    #[serde(rename = "CO2EquivalentEmissionsMarketBasedElectricityEmissions")]
    pub co2_equivalent_market_based: f64,
}

#[derive(Debug, Clone)]
pub struct Electricity {
    state: FormulaState<ElectricityOutput>,
}

impl Formula for Electricity {
    type Worksheet = ElectricityWorksheet;
    type Output = ElectricityOutput;
    const NAME: &'static str = "electricity";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let mut totals = ElectricityTotals::default();
            let rows = make_total_electricity_purchased(
                factors,
                &worksheet.total_electricity_purchased,
                &mut totals,
            )?;
            let pounds_to_kg = factors.pounds_to_kilograms()?;
            let location = gwp_weighted(factors, totals.emissions.location())? * pounds_to_kg;
            let market = gwp_weighted(factors, totals.emissions.market())? * pounds_to_kg;

            Ok(ElectricityOutput {
                total_electricity_purchased: rows,
                total_emissions_for_all_sources: totals,
                co2_equivalent_location_based: location / 1000.0,
                co2_equivalent_market_based: market / 1000.0,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

/// lb CO2e. eGRID rates report all three gases in pounds.
fn gwp_weighted(factors: &FactorTables, lb: GasTotals) -> Result<f64, GhgError> {
    Ok(lb.co2 + lb.ch4 * factors.gas_gwp(Gas::Ch4)? + lb.n2o * factors.gas_gwp(Gas::N2o)?)
}

fn make_total_electricity_purchased(
    factors: &FactorTables,
    rows: &Rows<ElectricityRow>,
    totals: &mut ElectricityTotals,
) -> Result<Vec<RowOutcome<ElectricityEmissions>>, GhgError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(subregion), Some(purchased)) =
            (present(&row.e_grid_subregion), row.electricity_purchased)
        else {
            out.push(row.echo());
            continue;
        };
        let grid = factors.grid_subregion(subregion)?;
        let mwh = purchased / 1000.0;

        let location = GasTotals::try_from_fn(|gas| Ok(non_negative(mwh * grid.get(gas))))?;
        let market = GasTotals::try_from_fn(|gas| {
            Ok(match row.market_factor(gas) {
                Some(factor) if factor != 0.0 => non_negative(mwh * factor),
                _ => location.get(gas),
            })
        })?;
        let emissions = DualEmissions::new(market, location);

        totals.electricity_purchased += purchased;
        totals.emissions.add(&emissions);

        out.push(RowOutcome::Computed(ElectricityEmissions {
            source_id: row.source_id.clone(),
            source_description: row.source_description.clone(),
            source_area: row.source_area.clone(),
            e_grid_subregion: subregion.to_string(),
            electricity_purchased: purchased,
            market_based_co2_factor: row.market_based_co2_factor,
            market_based_ch4_factor: row.market_based_ch4_factor,
            market_based_n2o_factor: row.market_based_n2o_factor,
            emissions,
        }));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subregions_are_unique_lowercase_acronyms() {
        for (i, region) in EGRID_SUBREGIONS.iter().enumerate() {
            assert_eq!(region.len(), 4);
            assert_eq!(region.to_lowercase(), *region);
            assert!(!EGRID_SUBREGIONS[i + 1..].contains(region));
        }
        assert!(EGRID_SUBREGIONS.contains(&"srvc"));
    }

    #[test]
    fn dual_emissions_flatten_into_published_keys() {
        let value = serde_json::to_value(DualEmissions {
            market_co2: 1.0,
            ..DualEmissions::default()
        })
        .unwrap();
        assert_eq!(value["marketBasedEmissionsCO2Emissions"], 1.0);
        assert_eq!(value["locationBasedEmissionsN2OEmissions"], 0.0);
    }
}
