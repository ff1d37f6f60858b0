//! Employee commuting by personal vehicle and public transportation.

use std::sync::Arc;

use ghg_common::GhgError;
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::FormulaConfig;
use crate::formula::{Formula, FormulaState};
use crate::formulas::business_travel::{
    TransportTypeEmissions, VehicleMilesEmissions, VehicleMilesRow, by_transport_type,
};
use crate::formulas::travel::{
    MissingDistance, PERSONAL_VEHICLES, RAIL_OR_BUS, TravelActivity, make_travel,
};
use crate::row::{RowOutcome, Rows};
use crate::totals::{CategoryTotals, GasTotals};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublicTransportationRow {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub transport_type: Option<String>,
    pub passenger_miles: Option<f64>,
}

impl TravelActivity for PublicTransportationRow {
    fn mode(&self) -> Option<&str> {
        self.transport_type.as_deref()
    }

    fn distance(&self) -> Option<f64> {
        self.passenger_miles
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommutingWorksheet {
    pub personal_vehicle: Rows<VehicleMilesRow>,
    pub public_transportation: Rows<PublicTransportationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTransportationEmissions {
    pub source_id: Option<Value>,
    pub source_description: Option<Value>,
    pub transport_type: String,
    pub passenger_miles: f64,
    #[serde(flatten)]
    pub emissions: GasTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommutingOutput {
    pub personal_vehicle: Vec<RowOutcome<VehicleMilesEmissions>>,
    pub total_for_all_personal_vehicle_employee_commuting: GasTotals,
    pub public_transportation: Vec<RowOutcome<PublicTransportationEmissions>>,
    pub total_for_all_public_transportation_employee_commuting: GasTotals,
    #[serde(rename = "totalCO2EmissionsByCommutingType")]
    pub total_co2_emissions_by_commuting_type: Vec<TransportTypeEmissions>,
    #[serde(rename = "totalCO2EquivalentEmissions")]
    pub total_co2_equivalent_emissions: f64,
}

#[derive(Debug, Clone)]
pub struct Commuting {
    state: FormulaState<CommutingOutput>,
}

impl Formula for Commuting {
    type Worksheet = CommutingWorksheet;
    type Output = CommutingOutput;
    const NAME: &'static str = "commuting";

    fn with_config(factors: Arc<FactorTables>, config: FormulaConfig) -> Self {
        Self {
            state: FormulaState::new(factors, config),
        }
    }

    fn recalc(&mut self, worksheet: Self::Worksheet) -> Result<&Self::Output, GhgError> {
        self.state.run(Self::NAME, |factors, _| {
            let mut personal_modes = CategoryTotals::new("personal vehicle", &PERSONAL_VEHICLES);
            let mut transit_modes = CategoryTotals::new("public transportation", &RAIL_OR_BUS);
            let lookup = |mode: &str| factors.business_travel(mode);

            let (personal, personal_total) = make_travel(
                &worksheet.personal_vehicle,
                MissingDistance::Echo,
                lookup,
                &mut personal_modes,
                |line| VehicleMilesEmissions::from(line),
            )?;
            let (transit, transit_total) = make_travel(
                &worksheet.public_transportation,
                MissingDistance::Echo,
                lookup,
                &mut transit_modes,
                |line| PublicTransportationEmissions {
                    source_id: line.row.source_id.clone(),
                    source_description: line.row.source_description.clone(),
                    transport_type: line.mode.to_string(),
                    passenger_miles: line.distance,
                    emissions: line.emissions,
                },
            )?;

            let by_mode =
                CategoryTotals::merged("commuting mode", &[&personal_modes, &transit_modes]);
            let co2e = by_mode.sum().co2e_kg(factors)? / 1000.0;
            Ok(CommutingOutput {
                personal_vehicle: personal,
                total_for_all_personal_vehicle_employee_commuting: personal_total,
                public_transportation: transit,
                total_for_all_public_transportation_employee_commuting: transit_total,
                total_co2_emissions_by_commuting_type: by_transport_type(&by_mode),
                total_co2_equivalent_emissions: co2e,
            })
        })
    }

    fn output(&self) -> Option<&Self::Output> {
        self.state.output()
    }
}
