//! Third-party transport of purchased and sold products.
//!
//! Trucks and cars may be reported by vehicle-miles; freight modes by
//! short-ton-miles. A medium/heavy-duty truck can appear in both tables and
//! its subtotal combines the two.

use std::sync::Arc;

use ghg_common::{Gas, GhgError};
use ghg_factors::{FactorTables, TransportBasis};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::formulas::business_travel::{TransportTypeEmissions, by_transport_type};
use crate::formulas::travel::{MissingDistance, TravelActivity, make_travel};
use crate::row::{RowOutcome, Rows};
use crate::totals::{CategoryTotals, GasTotals};

pub const VEHICLE_MILE_TYPES: [&str; 3] = ["mediumAndHeavyDutyTruck", "lightDutyTruck", "passengerCars"];

pub const TON_MILE_TYPES: [&str; 4] = ["mediumAndHeavyDutyTruck", "rail", "aircraft", "waterborneCraft"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportByVehicleMilesRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: Option<String>,
    pub vehicle_miles: Option<f64>,
}

impl TravelActivity for TransportByVehicleMilesRow {
    fn mode(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }

    fn distance(&self) -> Option<f64> {
        self.vehicle_miles
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportByTonMilesRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: Option<String>,
    pub short_ton_miles: Option<f64>,
}

impl TravelActivity for TransportByTonMilesRow {
    fn mode(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }

    fn distance(&self) -> Option<f64> {
        self.short_ton_miles
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductTransportWorksheet {
    pub product_transport_by_vehicle_miles: Rows<TransportByVehicleMilesRow>,
    pub product_transport_by_ton_miles: Rows<TransportByTonMilesRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportByVehicleMilesEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: String,
    pub vehicle_miles: f64,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportByTonMilesEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: String,
    pub short_ton_miles: f64,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTransportOutput {
    pub product_transport_by_vehicle_miles: Vec<RowOutcome<TransportByVehicleMilesEmissions>>,
    pub total_for_product_transport_by_vehicle_miles: GasTotals,
    pub product_transport_by_ton_miles: Vec<RowOutcome<TransportByTonMilesEmissions>>,
    pub total_for_all_product_transport_by_ton_miles: GasTotals,
    pub total_emissions_by_product_transport_type: Vec<TransportTypeEmissions>,
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct ProductTransport {
    state: FormulaState<ProductTransportOutput>,
}

impl Formula for ProductTransport {
    type Worksheet = ProductTransportWorksheet;
    type Output = ProductTransportOutput;
    const NAME: &'static str = "productTransport";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let mut by_vehicle_miles = CategoryTotals::new("vehicle-mile transport", &VEHICLE_MILE_TYPES);
            let mut by_ton_miles = CategoryTotals::new("ton-mile transport", &TON_MILE_TYPES);

            let (vehicle_miles, vehicle_miles_total) = make_travel(
                &worksheet.product_transport_by_vehicle_miles,
                MissingDistance::Echo,
                |vehicle: &str| factors.product_transport(vehicle, TransportBasis::VehicleMile),
                &mut by_vehicle_miles,
                |line| TransportByVehicleMilesEmissions {
                    source_id: line.row.source_id.clone(),
                    source_description: line.row.source_description.clone(),
                    vehicle_type: line.mode.to_string(),
                    vehicle_miles: line.distance,
                    emissions: line.emissions,
                },
            )?;
            let (ton_miles, ton_miles_total) = make_travel(
                &worksheet.product_transport_by_ton_miles,
                MissingDistance::Echo,
                |vehicle: &str| factors.product_transport(vehicle, TransportBasis::TonMile),
                &mut by_ton_miles,
                |line| TransportByTonMilesEmissions {
                    source_id: line.row.source_id.clone(),
                    source_description: line.row.source_description.clone(),
                    vehicle_type: line.mode.to_string(),
                    short_ton_miles: line.distance,
                    emissions: line.emissions,
                },
            )?;

            let all =
                CategoryTotals::merged("product transport type", &[&by_vehicle_miles, &by_ton_miles]);
            let co2e = make_co2_equivalent_emissions(factors, all.sum())?;
            Ok(ProductTransportOutput {
                product_transport_by_vehicle_miles: vehicle_miles,
                total_for_product_transport_by_vehicle_miles: vehicle_miles_total,
                product_transport_by_ton_miles: ton_miles,
                total_for_all_product_transport_by_ton_miles: ton_miles_total,
                total_emissions_by_product_transport_type: by_transport_type(&all),
                total_co2_equivalent_emissions: co2e,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}

/// Metric tons CO2e; CO2 is GWP-weighted too.
fn make_co2_equivalent_emissions(factors: &FactorTables, total: GasTotals) -> Result<f64, GhgError> {
    let weighted = GasTotals {
        co2: factors.gas_gwp(Gas::Co2)? * total.co2,
        ..total
    };
    Ok(weighted.co2e_kg(factors)? / 1000.0)
}
