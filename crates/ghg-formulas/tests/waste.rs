use ghg_formulas::{Formula, FormulaConfig, Waste, WasteGases};
use ghg_testkit::{assert_close, number, shared_factors};
use serde_json::json;

#[test]
fn waste_converts_weight_to_short_tons() {
    let mut formula = Waste::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "wasteDisposal": [
                {"sourceId": "W-1", "wasteMaterial": "corrugatedContainers", "disposalMethod": "recycled", "weight": 10, "unit": "shortTon"},
                {"sourceId": "W-2", "wasteMaterial": "foodWaste", "disposalMethod": "landfilled", "weight": 4000, "unit": "pounds"},
                {"sourceId": "W-3", "wasteMaterial": "mixedMsw", "disposalMethod": "combusted", "weight": 2, "unit": "metricTon"},
                {"sourceId": "W-4", "wasteMaterial": "mixedMsw", "disposalMethod": "combusted", "weight": 0, "unit": "metricTon"},
                {"sourceId": "W-5", "wasteMaterial": "mixedMsw", "disposalMethod": "landfilled", "weight": 3}
            ]
        }))
        .unwrap();

    let rows = &out.waste_disposal;
    // Recycling avoids emissions; the negative factor clamps to zero.
    assert_eq!(rows[0].computed().unwrap().co2_emissions, 0.0);
    assert_close!(rows[1].computed().unwrap().co2_emissions, 1160.0);
    assert_close!(rows[2].computed().unwrap().co2_emissions, 947.9877266);
    assert!(rows[3].is_echoed());
    assert!(rows[4].is_echoed());

    let methods: Vec<&str> = out
        .total_emissions_by_disposal_method
        .iter()
        .map(|t| t.disposal_method)
        .collect();
    assert_eq!(methods[..3], ["recycled", "landfilled", "combusted"]);
    assert_close!(out.total_emissions_by_disposal_method[2].co2, 947.9877266);
    assert_close!(out.total_co2_equivalent_emissions, 2.1079877266);
}

#[test]
fn waste_subtotals_publish_method_under_material_key() {
    let mut formula = Waste::new(shared_factors());
    formula
        .recalc_json(json!({
            "wasteDisposal": [
                {"wasteMaterial": "foodWaste", "disposalMethod": "landfilled", "weight": 1, "unit": "shortTon"}
            ]
        }))
        .unwrap();
    let doc = formula.to_dict().unwrap();
    let landfilled = &doc["totalEmissionsByDisposalMethod"][1];
    assert_eq!(landfilled["wasteMaterial"], "landfilled");
    assert_close!(number(landfilled, "/CO2"), 580.0);
    assert_close!(number(&doc, "/wasteDisposal/0/CO2Emissions"), 580.0);
}

fn stream(combusted: serde_json::Value) -> serde_json::Value {
    json!({
        "wasteStreamGasCombusted": combusted,
        "emissionFactorForGasWasteStream": [
            {"component": "Methane", "molarFraction": 80},
            {"component": "Ethane", "molarFraction": 15},
            {"component": "Other non-carbon", "molarFraction": 5},
            {"component": null, "molarFraction": 1}
        ]
    })
}

#[test]
fn waste_gas_carbon_builds_from_molar_composition() {
    let mut formula = WasteGases::new(shared_factors());
    let out = formula.recalc_json(stream(json!(1000))).unwrap();

    let methane = out.emission_factor_for_gas_waste_stream[0].computed().unwrap();
    assert_eq!(methane.chemical_formula.as_deref(), Some("CH4"));
    assert_close!(methane.total_moles, 0.00204);
    assert_close!(methane.carbon_content, 0.0245016337572384);

    let other = out.emission_factor_for_gas_waste_stream[2].computed().unwrap();
    assert_eq!(other.chemical_formula, None);
    assert_close!(other.total_moles, 0.0001275);
    assert_eq!(other.carbon_content, 0.0);

    assert!(out.emission_factor_for_gas_waste_stream[3].is_echoed());

    let totals = &out.total_for_all_components;
    assert_close!(totals.molar_fraction, 100.0);
    assert_close!(totals.total_moles, 0.00255);
    assert_close!(totals.carbon_content, 0.0336897979106478);
    assert_close!(out.total_co2_equivalent_emissions, 0.056039739217286375);
    assert_eq!(out.oxidation_factor, 100.0);
}

#[test]
fn waste_gas_oxidation_factor_scales_result() {
    let mut sheet = stream(json!(1000));
    sheet["oxidationFactor"] = json!(98);
    let mut formula = WasteGases::new(shared_factors());
    let out = formula.recalc_json(sheet).unwrap();
    assert_close!(out.total_co2_equivalent_emissions, 0.05491894443294065);

    let config = FormulaConfig::default().with_waste_gas_defaults(0.00255, 98.0);
    let mut formula = WasteGases::with_config(shared_factors(), config);
    let out = formula.recalc_json(stream(json!(1000))).unwrap();
    assert_close!(out.total_co2_equivalent_emissions, 0.05491894443294065);
}

#[test]
fn waste_gas_with_nothing_combusted_is_zero() {
    let mut formula = WasteGases::new(shared_factors());
    let out = formula.recalc_json(stream(json!(null))).unwrap();
    assert_eq!(out.total_co2_equivalent_emissions, 0.0);
    assert!(out.total_for_all_components.carbon_content > 0.0);

    let doc = formula.to_dict().unwrap();
    assert!(doc["wasteStreamGasCombusted"].is_null());
    assert_close!(number(&doc, "/gasTotalNumberOfMolesPerUnitVolume"), 0.00255);
}
