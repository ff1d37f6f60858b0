//! Typed factor records stored in the tables.

use ghg_common::{Gas, GhgError};
use serde::{Deserialize, Serialize};

/// Per-gas factors keyed `co2` / `ch4` / `n2o`.
///
/// Units depend on the table: lb/MWh for eGRID subregions, kg or g per mile
/// for travel and transport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GasFactors {
    pub co2: f64,
    pub ch4: f64,
    pub n2o: f64,
}

impl GasFactors {
    pub fn get(&self, gas: Gas) -> f64 {
        match gas {
            Gas::Co2 => self.co2,
            Gas::Ch4 => self.ch4,
            Gas::N2o => self.n2o,
        }
    }
}

/// Stationary combustion factors, per common fuel unit and per mmBtu.
///
/// Not every fuel carries both bases (steam-only fuels such as `coalCoke` only
/// publish per-mmBtu factors), so each field is optional and callers go through
/// [`StationaryFactor::per_unit`] / [`StationaryFactor::per_mmbtu`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationaryFactor {
    #[serde(rename = "CO2 Factor (kg / Unit)", default)]
    pub co2_per_unit: Option<f64>,
    #[serde(rename = "CH4 Factor (g / unit)", default)]
    pub ch4_per_unit: Option<f64>,
    #[serde(rename = "N2O Factor (g / unit)", default)]
    pub n2o_per_unit: Option<f64>,
    #[serde(rename = "CO2 Factor (kg / mmBtu)", default)]
    pub co2_per_mmbtu: Option<f64>,
    #[serde(rename = "CH4 Factor (g / mmBtu)", default)]
    pub ch4_per_mmbtu: Option<f64>,
    #[serde(rename = "N2O Factor (g / mmBtu)", default)]
    pub n2o_per_mmbtu: Option<f64>,
}

impl StationaryFactor {
    /// kg CO2, g CH4 or g N2O per common unit of fuel.
    pub fn per_unit(&self, fuel: &str, gas: Gas) -> Result<f64, GhgError> {
        let (value, column) = match gas {
            Gas::Co2 => (self.co2_per_unit, "CO2 Factor (kg / Unit)"),
            Gas::Ch4 => (self.ch4_per_unit, "CH4 Factor (g / unit)"),
            Gas::N2o => (self.n2o_per_unit, "N2O Factor (g / unit)"),
        };
        value.ok_or_else(|| GhgError::missing("stationary combustion", format!("{fuel}.{column}")))
    }

    /// kg CO2, g CH4 or g N2O per mmBtu of fuel input.
    pub fn per_mmbtu(&self, fuel: &str, gas: Gas) -> Result<f64, GhgError> {
        let (value, column) = match gas {
            Gas::Co2 => (self.co2_per_mmbtu, "CO2 Factor (kg / mmBtu)"),
            Gas::Ch4 => (self.ch4_per_mmbtu, "CH4 Factor (g / mmBtu)"),
            Gas::N2o => (self.n2o_per_mmbtu, "N2O Factor (g / mmBtu)"),
        };
        value.ok_or_else(|| GhgError::missing("stationary combustion", format!("{fuel}.{column}")))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MolecularWeight {
    pub chemical_formula: String,
    pub molecular_weight: f64,
    pub percent_carbon: f64,
}

/// Default leak and recovery fractions for a class of refrigeration/AC equipment.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefrigerationEquipment {
    pub installation_emission_factor: f64,
    pub operating_emission_factor: f64,
    pub refrigerant_remaining_at_disposal: f64,
    pub recovery_efficiency: f64,
}

/// Product transport factors by activity basis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransportFactors {
    #[serde(rename = "vehicle-mile", default, skip_serializing_if = "Option::is_none")]
    pub vehicle_mile: Option<GasFactors>,
    #[serde(rename = "ton-mile", default, skip_serializing_if = "Option::is_none")]
    pub ton_mile: Option<GasFactors>,
}

/// Activity basis a product transport row is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportBasis {
    VehicleMile,
    TonMile,
}

impl TransportBasis {
    pub fn key(self) -> &'static str {
        match self {
            TransportBasis::VehicleMile => "vehicle-mile",
            TransportBasis::TonMile => "ton-mile",
        }
    }
}

impl TransportFactors {
    pub fn basis(&self, basis: TransportBasis) -> Option<&GasFactors> {
        match basis {
            TransportBasis::VehicleMile => self.vehicle_mile.as_ref(),
            TransportBasis::TonMile => self.ton_mile.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_factor_reads_published_column_names() {
        let factor: StationaryFactor = serde_json::from_str(
            r#"{
                "CO2 Factor (kg / Unit)": 2602.0,
                "CH4 Factor (g / unit)": 276.0,
                "N2O Factor (g / unit)": 40.0,
                "CO2 Factor (kg / mmBtu)": 103.69
            }"#,
        )
        .unwrap();
        assert_eq!(factor.per_unit("anthraciteCoal", Gas::Co2).unwrap(), 2602.0);
        assert_eq!(factor.per_mmbtu("anthraciteCoal", Gas::Co2).unwrap(), 103.69);
        match factor.per_mmbtu("anthraciteCoal", Gas::Ch4) {
            Err(GhgError::MissingKey { key, .. }) => {
                assert_eq!(key, "anthraciteCoal.CH4 Factor (g / mmBtu)")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn transport_factors_split_by_basis() {
        let factors: TransportFactors = serde_json::from_str(
            r#"{"ton-mile": {"co2": 0.023, "ch4": 0.0018, "n2o": 0.0006}}"#,
        )
        .unwrap();
        assert!(factors.basis(TransportBasis::VehicleMile).is_none());
        assert_eq!(factors.basis(TransportBasis::TonMile).unwrap().co2, 0.023);
    }
}
