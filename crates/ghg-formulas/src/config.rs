use serde::{Deserialize, Serialize};

/// Defaults applied when a worksheet leaves a setting unspecified.
///
/// Worksheet-level values (`biodieselPercent`, `boilerEfficiency`,
/// `oxidationFactor`, ...) always win over these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormulaConfig {
    /// Biodiesel share of blended diesel, percent.
    pub biodiesel_percent: f64,
    /// Ethanol share of blended gasoline, percent.
    pub ethanol_percent: f64,
    /// Boiler efficiency assumed for purchased steam, as a fraction.
    pub boiler_efficiency: f64,
    /// Total moles of gas per unit volume for waste gas streams.
    pub gas_moles_per_unit_volume: f64,
    /// Share of carbon oxidized when waste gas is combusted, percent.
    pub oxidation_factor_percent: f64,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            biodiesel_percent: 20.0,
            ethanol_percent: 80.0,
            boiler_efficiency: 0.8,
            gas_moles_per_unit_volume: 0.00255,
            oxidation_factor_percent: 100.0,
        }
    }
}

impl FormulaConfig {
    pub fn with_blend_percents(mut self, biodiesel: f64, ethanol: f64) -> Self {
        self.biodiesel_percent = biodiesel;
        self.ethanol_percent = ethanol;
        self
    }

    pub fn with_boiler_efficiency(mut self, efficiency: f64) -> Self {
        self.boiler_efficiency = efficiency;
        self
    }

    pub fn with_waste_gas_defaults(mut self, moles_per_unit_volume: f64, oxidation_percent: f64) -> Self {
        self.gas_moles_per_unit_volume = moles_per_unit_volume;
        self.oxidation_factor_percent = oxidation_percent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config: FormulaConfig =
            serde_json::from_str(r#"{"ethanolPercent": 85, "boilerEfficiency": 0.75}"#).unwrap();
        assert_eq!(config.ethanol_percent, 85.0);
        assert_eq!(config.boiler_efficiency, 0.75);
        assert_eq!(config.biodiesel_percent, 20.0);
        assert_eq!(config.gas_moles_per_unit_volume, 0.00255);
    }
}
