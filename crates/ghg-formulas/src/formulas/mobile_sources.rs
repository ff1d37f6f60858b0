//! Mobile source combustion: on-road fleets and non-road equipment.
//!
//! CO2 follows fuel consumed. CH4 and N2O follow miles driven for on-road
//! vehicles and fuel consumed for non-road equipment, with on-road factors
//! depending on vehicle vintage. Ethanol and biodiesel blends are split into a
//! fossil share (reported as CO2) and a biomass share (reported separately).

use std::sync::Arc;

use ghg_common::{GhgError, YearValue, is_set, non_negative, normalize, present};
use ghg_factors::FactorTables;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::row::Rows;
use crate::totals::{CategoryTotals, GasTotals};

/// Fuels CO2 is tabulated under, with their reporting units.
pub const CO2_FUEL_UNITS: [(&str, &str); 10] = [
    ("gasoline", "gallons"),
    ("diesel", "gallons"),
    ("residualFuelOil", "gallons"),
    ("aviationGasoline", "gallons"),
    ("jetFuel", "gallons"),
    ("lpg", "gallons"),
    ("ethanol", "gallons"),
    ("biodiesel", "gallons"),
    ("lng", "gallons"),
    ("cng", "scf"),
];

pub const ROAD_VEHICLES: [&str; 9] = [
    "heavyDutyVehicles",
    "lightDutyTrucks",
    "motorcycles",
    "passengerCars",
    "buses",
    "heavyDutyTrucks",
    "lightDutyCars",
    "mediumAndHeavyDutyVehicles",
    "mediumDutyTrucks",
];

pub const NONROAD_VEHICLES: [&str; 13] = [
    "agriculturalEquipment",
    "agriculturalOffroadTrucks",
    "aircraft",
    "airportEquipment",
    "constructionMiningEquipment",
    "constructionMiningOffroadTrucks",
    "industrialCommercialEquipment",
    "lawnAndGardenEquipment",
    "locomotives",
    "loggingEquipment",
    "railroadEquipment",
    "recreationalEquipment",
    "shipsAndBoats",
];

/// Fuel a consumption row's CO2 is tabulated under.
pub fn co2_fuel(fuel: &str) -> &str {
    match fuel {
        "gasoline2Stroke" | "gasoline4Stroke" => "gasoline",
        "methanol" => "ethanol",
        other => other,
    }
}

/// Fossil fuel whose CO2 factor applies to the non-biomass share of a blend.
pub fn non_biomass_fuel(fuel: &str) -> &str {
    match fuel {
        "ethanol" => "gasoline",
        "biodiesel" => "diesel",
        other => other,
    }
}

pub fn is_road_vehicle(vehicle: &str) -> bool {
    ROAD_VEHICLES.contains(&vehicle)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MobileFuelRow {
    pub vehicle_type: Option<String>,
    pub fuel_type: Option<String>,
    pub vehicle_year: Option<YearValue>,
    pub fuel_usage: Option<f64>,
    pub miles_traveled: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MobileSourcesWorksheet {
    pub mobile_sources_fuel_consumption: Rows<MobileFuelRow>,
    pub biodiesel_percent: Option<f64>,
    pub ethanol_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelUsageCo2 {
    pub fuel_type: &'static str,
    pub fuel_usage: f64,
    pub units: &'static str,
    #[serde(rename = "CO2")]
    pub co2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VintageEmissions {
    pub vehicle_year: String,
    pub mileage: f64,
    #[serde(rename = "CH4")]
    pub ch4: f64,
    #[serde(rename = "N2O")]
    pub n2o: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRoadGasoline {
    pub vehicle_type: String,
    pub emission_by_year: Vec<VintageEmissions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnRoadNonGasoline {
    pub vehicle_type: String,
    pub fuel_type: String,
    pub emission_by_year: Vec<VintageEmissions>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonRoadFuel {
    pub fuel_type: String,
    pub fuel_usage: f64,
    #[serde(rename = "CH4")]
    pub ch4: f64,
    #[serde(rename = "N2O")]
    pub n2o: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonRoadVehicle {
    pub vehicle_type: String,
    pub emission_by_fuel_type: Vec<NonRoadFuel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileSourcesOutput {
    #[serde(rename = "totalMobileSourcesFuelUsageAndCO2Emissions")]
    pub total_mobile_sources_fuel_usage_and_co2_emissions: Vec<FuelUsageCo2>,
    pub total_organization_wide_on_road_gasoline_mobile_source_mileage_and_emissions:
        Vec<OnRoadGasoline>,
    pub total_organization_wide_on_road_non_gasoline_mobile_source_mileage_and_emissions:
        Vec<OnRoadNonGasoline>,
    pub total_organization_wide_non_road_mobile_source_fuel_usage_and_emissions:
        Vec<NonRoadVehicle>,
    pub total_co2_equivalent_emissions: f64,
    pub total_biomass_co2_equivalent_emissions: f64,
    pub mobile_sources_fuel_consumption: Rows<MobileFuelRow>,
    pub biodiesel_percent: f64,
    pub ethanol_percent: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct FuelCo2 {
    fuel_usage: f64,
    co2: f64,
}

#[derive(Debug, Clone, Default)]
struct YearBucket {
    display: String,
    ch4: f64,
    n2o: f64,
    mileage: f64,
    fuel_usage: f64,
}

struct Totals {
    co2: CategoryTotals<FuelCo2>,
    /// (vehicle, fuel) -> buckets keyed by year display, ascending.
    vintages: FxHashMap<(String, String), Vec<YearBucket>>,
}

impl Totals {
    fn new(factors: &FactorTables) -> Self {
        let fuels: Vec<&'static str> = CO2_FUEL_UNITS.iter().map(|(fuel, _)| *fuel).collect();
        let mut vintages = FxHashMap::default();
        for (vehicle, fuels) in factors.mobile_combustion_ch4_and_n2o.iter() {
            for (fuel, table) in fuels.iter() {
                let buckets = table
                    .displays()
                    .into_iter()
                    .map(|display| YearBucket {
                        display: display.to_string(),
                        ..YearBucket::default()
                    })
                    .collect();
                vintages.insert((vehicle.to_string(), fuel.to_string()), buckets);
            }
        }
        Self {
            co2: CategoryTotals::new("mobile CO2 fuel", &fuels),
            vintages,
        }
    }

    fn bucket_mut(&mut self, vehicle: &str, fuel: &str, display: &str) -> Result<&mut YearBucket, GhgError> {
        self.vintages
            .get_mut(&(vehicle.to_string(), fuel.to_string()))
            .and_then(|buckets| buckets.iter_mut().find(|b| b.display == display))
            .ok_or_else(|| GhgError::missing("mobile CH4/N2O", format!("{vehicle}.{fuel}.{display}")))
    }

    fn buckets(&self, vehicle: &str, fuel: &str) -> &[YearBucket] {
        self.vintages
            .get(&(vehicle.to_string(), fuel.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn ch4_n2o(&self) -> (f64, f64) {
        self.vintages
            .values()
            .flatten()
            .fold((0.0, 0.0), |(ch4, n2o), b| (ch4 + b.ch4, n2o + b.n2o))
    }
}

#[derive(Debug, Clone)]
pub struct MobileSources {
    state: FormulaState<MobileSourcesOutput>,
}

impl Formula for MobileSources {
    type Worksheet = MobileSourcesWorksheet;
    type Output = MobileSourcesOutput;
    const NAME: &'static str = "mobileSources";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, config| {
            let blend = Blend {
                biodiesel_percent: worksheet.biodiesel_percent.unwrap_or(config.biodiesel_percent),
                ethanol_percent: worksheet.ethanol_percent.unwrap_or(config.ethanol_percent),
            };
            let rows = worksheet.mobile_sources_fuel_consumption;
            let mut totals = Totals::new(factors);

            tabulate_subtable_data(factors, &blend, &rows, &mut totals)?;

            Ok(MobileSourcesOutput {
                total_mobile_sources_fuel_usage_and_co2_emissions: make_fuel_usage_and_co2(&totals),
                total_organization_wide_on_road_gasoline_mobile_source_mileage_and_emissions:
                    make_on_road_gasoline(factors, &totals),
                total_organization_wide_on_road_non_gasoline_mobile_source_mileage_and_emissions:
                    make_on_road_non_gasoline(factors, &totals),
                total_organization_wide_non_road_mobile_source_fuel_usage_and_emissions:
                    make_non_road(factors, &totals),
                total_co2_equivalent_emissions: make_co2_equivalent_emissions(factors, &totals)?,
                total_biomass_co2_equivalent_emissions: make_biomass_co2_equivalent_emissions(
                    factors, &blend, &totals,
                )?,
                mobile_sources_fuel_consumption: rows,
                biodiesel_percent: blend.biodiesel_percent,
                ethanol_percent: blend.ethanol_percent,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

struct Blend {
    biodiesel_percent: f64,
    ethanol_percent: f64,
}

impl Blend {
    /// Share of `usage` that is fossil fuel.
    fn non_biomass_usage(&self, fuel: &str, usage: f64) -> f64 {
        match fuel {
            "ethanol" => usage * (100.0 - self.ethanol_percent) / 100.0,
            "biodiesel" => usage * (100.0 - self.biodiesel_percent) / 100.0,
            _ => usage,
        }
    }
}

fn tabulate_subtable_data(
    factors: &FactorTables,
    blend: &Blend,
    rows: &Rows<MobileFuelRow>,
    totals: &mut Totals,
) -> Result<(), GhgError> {
    for row in rows {
        let Some(fuel) = present(&row.fuel_type) else {
            continue;
        };
        let fuel_usage = normalize(row.fuel_usage);

        if is_set(row.fuel_usage) {
            let tabulated = co2_fuel(fuel);
            let fossil_usage = blend.non_biomass_usage(tabulated, fuel_usage);
            let co2 = non_negative(factors.mobile_co2(non_biomass_fuel(tabulated))? * fossil_usage);
            let slot = totals.co2.slot_mut(tabulated)?;
            slot.fuel_usage += fuel_usage;
            slot.co2 += co2;
        }

        let Some(vehicle) = present(&row.vehicle_type) else {
            continue;
        };
        let miles = normalize(row.miles_traveled);
        let activity = if is_road_vehicle(vehicle) { miles } else { fuel_usage };
        let table = factors.mobile_ch4_n2o(vehicle, fuel)?;
        let factor = match table.resolve(row.vehicle_year.as_ref()) {
            Ok(factor) => factor,
            Err(err) if err.is_year_error() => {
                skip_unresolved_year(vehicle, fuel, row.vehicle_year.as_ref(), &err);
                continue;
            }
            Err(err) => return Err(err),
        };

        let bucket = totals.bucket_mut(vehicle, fuel, &factor.year_display)?;
        bucket.ch4 += non_negative(factor.ch4_factor * activity);
        bucket.n2o += non_negative(factor.n2o_factor * activity);
        bucket.mileage += miles;
        bucket.fuel_usage += fuel_usage;
    }
    Ok(())
}

fn skip_unresolved_year(vehicle: &str, fuel: &str, year: Option<&YearValue>, err: &GhgError) {
    #[cfg(feature = "tracing")]
    tracing::error!(
        vehicle_type = vehicle,
        fuel_type = fuel,
        vehicle_year = ?year,
        error = %err,
        "vehicle year not mapped to a factor; row adds no CH4/N2O"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (vehicle, fuel, year, err);
}

fn make_fuel_usage_and_co2(totals: &Totals) -> Vec<FuelUsageCo2> {
    CO2_FUEL_UNITS
        .iter()
        .map(|&(fuel, units)| {
            let total = totals.co2.get(fuel).copied().unwrap_or_default();
            FuelUsageCo2 {
                fuel_type: fuel,
                fuel_usage: total.fuel_usage,
                units,
                co2: total.co2,
            }
        })
        .collect()
}

fn vintage_rows(buckets: &[YearBucket]) -> Vec<VintageEmissions> {
    buckets
        .iter()
        .map(|b| VintageEmissions {
            vehicle_year: b.display.clone(),
            mileage: b.mileage,
            ch4: b.ch4,
            n2o: b.n2o,
        })
        .collect()
}

/// Road vehicles in declared order that the factor tables cover.
fn road_vehicles_with_factors(factors: &FactorTables) -> impl Iterator<Item = &'static str> + '_ {
    ROAD_VEHICLES
        .into_iter()
        .filter(|vehicle| factors.mobile_combustion_ch4_and_n2o.contains_key(vehicle))
}

fn make_on_road_gasoline(factors: &FactorTables, totals: &Totals) -> Vec<OnRoadGasoline> {
    road_vehicles_with_factors(factors)
        .filter(|vehicle| totals.vintages.contains_key(&(vehicle.to_string(), "gasoline".to_string())))
        .map(|vehicle| OnRoadGasoline {
            vehicle_type: vehicle.to_string(),
            emission_by_year: vintage_rows(totals.buckets(vehicle, "gasoline")),
        })
        .collect()
}

fn make_on_road_non_gasoline(factors: &FactorTables, totals: &Totals) -> Vec<OnRoadNonGasoline> {
    let mut out = Vec::new();
    for vehicle in road_vehicles_with_factors(factors) {
        let Some(fuels) = factors.mobile_combustion_ch4_and_n2o.get(vehicle) else {
            continue;
        };
        for fuel in fuels.keys().filter(|fuel| *fuel != "gasoline") {
            out.push(OnRoadNonGasoline {
                vehicle_type: vehicle.to_string(),
                fuel_type: fuel.to_string(),
                emission_by_year: vintage_rows(totals.buckets(vehicle, fuel)),
            });
        }
    }
    out
}

/// Non-road equipment is reported per fuel; vintage buckets are summed.
fn make_non_road(factors: &FactorTables, totals: &Totals) -> Vec<NonRoadVehicle> {
    NONROAD_VEHICLES
        .into_iter()
        .filter_map(|vehicle| {
            let fuels = factors.mobile_combustion_ch4_and_n2o.get(vehicle)?;
            let emission_by_fuel_type = fuels
                .keys()
                .map(|fuel| {
                    let buckets = totals.buckets(vehicle, fuel);
                    NonRoadFuel {
                        fuel_type: fuel.to_string(),
                        fuel_usage: buckets.iter().map(|b| b.fuel_usage).sum(),
                        ch4: buckets.iter().map(|b| b.ch4).sum(),
                        n2o: buckets.iter().map(|b| b.n2o).sum(),
                    }
                })
                .collect();
            Some(NonRoadVehicle {
                vehicle_type: vehicle.to_string(),
                emission_by_fuel_type,
            })
        })
        .collect()
}

fn make_co2_equivalent_emissions(factors: &FactorTables, totals: &Totals) -> Result<f64, GhgError> {
    let (ch4, n2o) = totals.ch4_n2o();
    let gases = GasTotals {
        co2: totals.co2.values().map(|t| t.co2).sum(),
        ch4,
        n2o,
    };
    Ok(gases.co2e_kg(factors)? / 1000.0)
}

/// Metric tons of biogenic CO2 from the ethanol and biodiesel share of blends.
fn make_biomass_co2_equivalent_emissions(
    factors: &FactorTables,
    blend: &Blend,
    totals: &Totals,
) -> Result<f64, GhgError> {
    let mut kg = 0.0;
    for (fuel, percent) in [
        ("ethanol", blend.ethanol_percent),
        ("biodiesel", blend.biodiesel_percent),
    ] {
        let usage = totals.co2.get(fuel).map(|t| t.fuel_usage).unwrap_or_default();
        if usage != 0.0 {
            kg += usage * percent / 100.0 * factors.mobile_co2(fuel)?;
        }
    }
    Ok(kg / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blended_fuels_map_to_their_fossil_counterpart() {
        assert_eq!(co2_fuel("gasoline4Stroke"), "gasoline");
        assert_eq!(co2_fuel("methanol"), "ethanol");
        assert_eq!(co2_fuel("diesel"), "diesel");
        assert_eq!(non_biomass_fuel("ethanol"), "gasoline");
        assert_eq!(non_biomass_fuel("biodiesel"), "diesel");
        assert_eq!(non_biomass_fuel("lng"), "lng");
    }

    #[test]
    fn blend_splits_fossil_share() {
        let blend = Blend {
            biodiesel_percent: 20.0,
            ethanol_percent: 80.0,
        };
        assert_eq!(blend.non_biomass_usage("ethanol", 100.0), 20.0);
        assert_eq!(blend.non_biomass_usage("biodiesel", 100.0), 80.0);
        assert_eq!(blend.non_biomass_usage("gasoline", 100.0), 100.0);
    }

    #[test]
    fn vehicle_lists_do_not_overlap() {
        for vehicle in NONROAD_VEHICLES {
            assert!(!is_road_vehicle(vehicle), "{vehicle}");
        }
    }
}
