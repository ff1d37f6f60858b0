use std::io::Read;
use std::path::Path;

use ghg_common::{Gas, GhgError};
use serde::{Deserialize, Serialize};

use crate::records::{
    GasFactors, MolecularWeight, RefrigerationEquipment, StationaryFactor, TransportBasis,
    TransportFactors,
};
use crate::table::FactorTable;
use crate::year::YearTable;

/// Every emission factor table consulted by the category formulas.
///
/// Tables absent from the source document load as empty; the first lookup
/// against one fails with [`GhgError::MissingKey`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FactorTables {
    /// fuel -> input unit -> multiplier into the fuel's common unit.
    pub heat_content: FactorTable<FactorTable<f64>>,
    pub stationary_combustion: FactorTable<StationaryFactor>,
    /// fuel -> kg CO2 per gallon (per scf for CNG).
    pub mobile_combustion_co2: FactorTable<f64>,
    /// vehicle type -> fuel type -> vintage table.
    pub mobile_combustion_ch4_and_n2o: FactorTable<FactorTable<YearTable>>,
    /// gas -> global warming potential. Carries `co2`, `ch4` and `n2o` as well
    /// as refrigerant and fire suppressant blends.
    pub refrigerants_gwp: FactorTable<f64>,
    /// eGRID subregion -> lb per MWh.
    pub electricity: FactorTable<GasFactors>,
    /// from unit -> to unit -> multiplier.
    pub unit_conversions: FactorTable<FactorTable<f64>>,
    pub molecular_weights: FactorTable<MolecularWeight>,
    pub refrigeration_and_ac_equipment: FactorTable<RefrigerationEquipment>,
    /// material -> disposal method -> metric tons CO2e per short ton.
    pub waste_emission: FactorTable<FactorTable<f64>>,
    pub business_travel: FactorTable<GasFactors>,
    pub product_transport: FactorTable<TransportFactors>,
    /// fire suppression equipment type -> annual leak rate.
    pub fire_suppression_leak_rates: FactorTable<f64>,
}

impl FactorTables {
    pub fn from_json_str(json: &str) -> Result<Self, GhgError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GhgError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, GhgError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from disk; `.yaml`/`.yml` files are read as YAML, anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GhgError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    /* ─────────────────────────── lookups ─────────────────────────── */

    pub fn heat_content(&self, fuel: &str, unit: &str) -> Result<f64, GhgError> {
        let units = self.heat_content.require("heat content", fuel)?;
        units
            .get(unit)
            .copied()
            .ok_or_else(|| GhgError::missing("heat content", format!("{fuel}.{unit}")))
    }

    pub fn stationary(&self, fuel: &str) -> Result<&StationaryFactor, GhgError> {
        self.stationary_combustion
            .require("stationary combustion", fuel)
    }

    pub fn mobile_co2(&self, fuel: &str) -> Result<f64, GhgError> {
        self.mobile_combustion_co2
            .require("mobile combustion CO2", fuel)
            .copied()
    }

    pub fn mobile_ch4_n2o(&self, vehicle: &str, fuel: &str) -> Result<&YearTable, GhgError> {
        let fuels = self
            .mobile_combustion_ch4_and_n2o
            .require("mobile CH4/N2O", vehicle)?;
        fuels
            .get(fuel)
            .ok_or_else(|| GhgError::missing("mobile CH4/N2O", format!("{vehicle}.{fuel}")))
    }

    pub fn gwp(&self, gas: &str) -> Result<f64, GhgError> {
        self.refrigerants_gwp.require("GWP", gas).copied()
    }

    pub fn gas_gwp(&self, gas: Gas) -> Result<f64, GhgError> {
        self.gwp(gas.factor_key())
    }

    pub fn grid_subregion(&self, subregion: &str) -> Result<&GasFactors, GhgError> {
        self.electricity.require("eGRID subregion", subregion)
    }

    pub fn unit_conversion(&self, from: &str, to: &str) -> Result<f64, GhgError> {
        let targets = self.unit_conversions.require("unit conversion", from)?;
        targets
            .get(to)
            .copied()
            .ok_or_else(|| GhgError::missing("unit conversion", format!("{from}.{to}")))
    }

    /// Pounds to kilograms, used by every GWP-weighted material balance.
    pub fn pounds_to_kilograms(&self) -> Result<f64, GhgError> {
        self.unit_conversion("pounds", "kilogram")
    }

    pub fn molecular_weight(&self, component: &str) -> Result<&MolecularWeight, GhgError> {
        self.molecular_weights.require("molecular weight", component)
    }

    pub fn refrigeration_equipment(
        &self,
        equipment: &str,
    ) -> Result<&RefrigerationEquipment, GhgError> {
        self.refrigeration_and_ac_equipment
            .require("refrigeration and AC equipment", equipment)
    }

    pub fn waste(&self, material: &str, method: &str) -> Result<f64, GhgError> {
        let methods = self.waste_emission.require("waste emission", material)?;
        methods
            .get(method)
            .copied()
            .ok_or_else(|| GhgError::missing("waste emission", format!("{material}.{method}")))
    }

    pub fn business_travel(&self, mode: &str) -> Result<&GasFactors, GhgError> {
        self.business_travel.require("business travel", mode)
    }

    pub fn product_transport(
        &self,
        vehicle: &str,
        basis: TransportBasis,
    ) -> Result<&GasFactors, GhgError> {
        let factors = self.product_transport.require("product transport", vehicle)?;
        factors.basis(basis).ok_or_else(|| {
            GhgError::missing("product transport", format!("{vehicle}.{}", basis.key()))
        })
    }

    pub fn fire_suppression_leak_rate(&self, equipment: &str) -> Result<f64, GhgError> {
        self.fire_suppression_leak_rates
            .require("fire suppression leak rate", equipment)
            .copied()
    }
}
