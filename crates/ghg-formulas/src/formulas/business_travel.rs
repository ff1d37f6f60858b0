//! Business travel in vehicles the organization does not own or operate.

use std::sync::Arc;

use ghg_common::GhgError;
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::formulas::travel::{
    FLIGHT_LENGTHS, MissingDistance, PERSONAL_VEHICLES, RAIL_OR_BUS, TravelActivity, TravelLine,
    make_travel,
};
use crate::row::{RowOutcome, Rows};
use crate::totals::{CategoryTotals, GasTotals};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleMilesRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: Option<String>,
    pub vehicle_miles: Option<f64>,
}

impl TravelActivity for VehicleMilesRow {
    fn mode(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }

    fn distance(&self) -> Option<f64> {
        self.vehicle_miles
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RailOrBusRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: Option<String>,
    pub passenger_miles: Option<f64>,
}

impl TravelActivity for RailOrBusRow {
    fn mode(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }

    fn distance(&self) -> Option<f64> {
        self.passenger_miles
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub flight_length: Option<String>,
    pub passenger_miles: Option<f64>,
}

impl TravelActivity for FlightRow {
    fn mode(&self) -> Option<&str> {
        self.flight_length.as_deref()
    }

    fn distance(&self) -> Option<f64> {
        self.passenger_miles
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessTravelWorksheet {
    pub personal_vehicle_rental_car_or_taxi_business_travel: Rows<VehicleMilesRow>,
    pub rail_or_bus_business_travel: Rows<RailOrBusRow>,
    pub air_business_travel: Rows<FlightRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleMilesEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: String,
    pub vehicle_miles: f64,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

impl From<TravelLine<'_, VehicleMilesRow>> for VehicleMilesEmissions {
    fn from(line: TravelLine<'_, VehicleMilesRow>) -> Self {
        Self {
            source_id: line.row.source_id.clone(),
            source_description: line.row.source_description.clone(),
            vehicle_type: line.mode.to_string(),
            vehicle_miles: line.distance,
            emissions: line.emissions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RailOrBusEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub vehicle_type: String,
    pub passenger_miles: f64,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub flight_length: String,
    pub passenger_miles: f64,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportTypeEmissions {
    pub transport_type: &'static str,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

/// One row per mode in `by_mode`'s declared order.
pub(crate) fn by_transport_type(by_mode: &CategoryTotals<GasTotals>) -> Vec<TransportTypeEmissions> {
    by_mode
        .iter()
        .map(|(mode, emissions)| TransportTypeEmissions {
            transport_type: mode,
            emissions: *emissions,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessTravelOutput {
    pub personal_vehicle_rental_car_or_taxi_business_travel: Vec<RowOutcome<VehicleMilesEmissions>>,
    pub total_for_all_personal_vehicle_business_travel: GasTotals,
    pub rail_or_bus_business_travel: Vec<RowOutcome<RailOrBusEmissions>>,
    pub total_for_all_rail_and_bus_business_travel: GasTotals,
    pub air_business_travel: Vec<RowOutcome<FlightEmissions>>,
    pub total_for_all_air_business_travel: GasTotals,
    pub total_co2_emissions_by_travel_type: Vec<TransportTypeEmissions>,
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct BusinessTravel {
    state: FormulaState<BusinessTravelOutput>,
}

impl Formula for BusinessTravel {
    type Worksheet = BusinessTravelWorksheet;
    type Output = BusinessTravelOutput;
    const NAME: &'static str = "businessTravel";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let mut personal_modes = CategoryTotals::new("personal vehicle", &PERSONAL_VEHICLES);
            let mut rail_or_bus_modes = CategoryTotals::new("rail or bus", &RAIL_OR_BUS);
            let mut flight_lengths = CategoryTotals::new("flight length", &FLIGHT_LENGTHS);
            let lookup = |mode: &str| factors.business_travel(mode);

            let (personal, personal_total) = make_travel(
                &worksheet.personal_vehicle_rental_car_or_taxi_business_travel,
                MissingDistance::Zero,
                lookup,
                &mut personal_modes,
                |line| VehicleMilesEmissions::from(line),
            )?;
            let (rail_or_bus, rail_or_bus_total) = make_travel(
                &worksheet.rail_or_bus_business_travel,
                MissingDistance::Zero,
                lookup,
                &mut rail_or_bus_modes,
                |line| RailOrBusEmissions {
                    source_id: line.row.source_id.clone(),
                    source_description: line.row.source_description.clone(),
                    vehicle_type: line.mode.to_string(),
                    passenger_miles: line.distance,
                    emissions: line.emissions,
                },
            )?;
            let (air, air_total) = make_travel(
                &worksheet.air_business_travel,
                MissingDistance::Zero,
                lookup,
                &mut flight_lengths,
                |line| FlightEmissions {
                    source_id: line.row.source_id.clone(),
                    source_description: line.row.source_description.clone(),
                    flight_length: line.mode.to_string(),
                    passenger_miles: line.distance,
                    emissions: line.emissions,
                },
            )?;

            let by_mode = CategoryTotals::merged(
                "business travel mode",
                &[&personal_modes, &rail_or_bus_modes, &flight_lengths],
            );
            let co2e = by_mode.sum().co2e_kg(factors)? / 1000.0;
            Ok(BusinessTravelOutput {
                personal_vehicle_rental_car_or_taxi_business_travel: personal,
                total_for_all_personal_vehicle_business_travel: personal_total,
                rail_or_bus_business_travel: rail_or_bus,
                total_for_all_rail_and_bus_business_travel: rail_or_bus_total,
                air_business_travel: air,
                total_for_all_air_business_travel: air_total,
                total_co2_emissions_by_travel_type: by_transport_type(&by_mode),
                total_co2_equivalent_emissions: co2e,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}
