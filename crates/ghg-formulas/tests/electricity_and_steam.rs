use ghg_formulas::formulas::electricity::EGRID_SUBREGIONS;
use ghg_formulas::{Electricity, Formula, FormulaConfig, GhgError, Steam};
use ghg_testkit::{assert_close, factors_from, number, shared_factors};
use serde_json::json;

fn half_pound_grid() -> serde_json::Value {
    json!({
        "electricity": {"akgd": {"co2": 0.5, "ch4": 0.0, "n2o": 0.0}},
        "refrigerantsGwp": {"co2": 1, "ch4": 25, "n2o": 298},
        "unitConversions": {"pounds": {"kilogram": 0.45359237}}
    })
}

#[test]
fn market_factor_falls_back_to_grid_average() {
    let mut formula = Electricity::new(factors_from(half_pound_grid()));
    formula
        .recalc_json(json!({
            "totalElectricityPurchased": [{
                "eGridSubregion": "akgd",
                "electricityPurchased": 1000,
                "marketBasedEmissionFactorsCO2Emissions": null,
                "marketBasedEmissionFactorsCH4Emissions": null,
                "marketBasedEmissionFactorsN2OEmissions": null
            }]
        }))
        .unwrap();
    let doc = formula.to_dict().unwrap();
    let row = &doc["totalElectricityPurchased"][0];
    assert_close!(number(row, "/locationBasedEmissionsCO2Emissions"), 0.5);
    assert_close!(number(row, "/marketBasedEmissionsCO2Emissions"), 0.5);
    assert!(row["marketBasedEmissionFactorsCO2Emissions"].is_null());
    assert_close!(
        number(&doc, "/totalEmissionsForAllSources/electricityPurchased"),
        1000.0
    );
}

#[test]
fn supplier_factor_overrides_market_based_only() {
    let mut formula = Electricity::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "totalElectricityPurchased": [
                {"sourceId": "HQ", "eGridSubregion": "akgd", "electricityPurchased": 1000},
                {"sourceId": "Plant", "eGridSubregion": "camx", "electricityPurchased": 2000, "marketBasedEmissionFactorsCO2Emissions": 100},
                {"sourceId": "Empty", "eGridSubregion": "camx"}
            ]
        }))
        .unwrap();

    assert!(out.total_electricity_purchased[2].is_echoed());
    let plant = out.total_electricity_purchased[1].computed().unwrap();
    assert_close!(plant.emissions.location_co2, 993.0);
    assert_close!(plant.emissions.market_co2, 200.0);
    assert_close!(plant.emissions.market_ch4, plant.emissions.location_ch4);

    let totals = &out.total_emissions_for_all_sources;
    assert_close!(totals.electricity_purchased, 3000.0);
    assert_close!(totals.emissions.location_co2, 1052.1 + 993.0);
    assert_close!(totals.emissions.market_co2, 1052.1 + 200.0);
}

#[test]
fn co2_equivalent_converts_pounds_to_metric_tons() {
    let mut formula = Electricity::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "totalElectricityPurchased": [
                {"eGridSubregion": "akgd", "electricityPurchased": 1000}
            ]
        }))
        .unwrap();
    assert_close!(out.co2_equivalent_location_based, 0.47984448200612);
    assert_close!(out.co2_equivalent_market_based, 0.47984448200612);
}

#[test]
fn unknown_subregion_aborts() {
    let mut formula = Electricity::new(shared_factors());
    let err = formula
        .recalc_json(json!({
            "totalElectricityPurchased": [{"eGridSubregion": "zzzz", "electricityPurchased": 1}]
        }))
        .unwrap_err();
    match err {
        GhgError::MissingKey { key, .. } => assert_eq!(key, "zzzz"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn grid_factor_keys_are_known_subregions() {
    let factors = shared_factors();
    assert!(!factors.electricity.is_empty());
    for key in factors.electricity.keys() {
        assert!(EGRID_SUBREGIONS.contains(&key), "{key}");
    }
}

fn steam_sheet() -> serde_json::Value {
    json!({
        "emissionFactorDataForSteamPurchased": [
            {"sourceId": "S-1", "fuelType": "naturalGas", "steamPurchased": 100},
            {"sourceId": "S-2", "fuelType": "naturalGas", "boilerEfficiency": 50, "steamPurchased": 100, "marketBasedEmissionFactorsCO2Factor": 60},
            {"sourceId": "S-3", "fuelType": "naturalGas", "steamPurchased": 0}
        ]
    })
}

#[test]
fn steam_divides_energy_by_boiler_efficiency() {
    let mut formula = Steam::new(shared_factors());
    let out = formula.recalc_json(steam_sheet()).unwrap();

    let first = out.emission_factor_data_for_steam_purchased[0].computed().unwrap();
    assert_close!(first.location_co2, 6632.5);
    assert_close!(first.location_ch4, 125.0);
    assert_close!(first.location_n2o, 12.5);
    assert_close!(first.market_co2, 6632.5);

    let second = out.emission_factor_data_for_steam_purchased[1].computed().unwrap();
    assert_close!(second.location_co2, 10612.0);
    assert_close!(second.location_ch4, 200.0);
    assert_close!(second.market_co2, 12000.0);
    assert_close!(second.market_n2o, 20.0);

    assert!(out.emission_factor_data_for_steam_purchased[2].is_echoed());
}

#[test]
fn steam_subtotals_feed_co2_equivalents() {
    let mut formula = Steam::new(shared_factors());
    let out = formula.recalc_json(steam_sheet()).unwrap();

    let gas = out
        .emissions_by_source_and_fuel_type
        .iter()
        .find(|row| row.fuel_type == "naturalGas")
        .unwrap();
    assert_close!(gas.emissions.location_co2, 17244.5);
    assert_close!(gas.emissions.market_co2, 18632.5);

    let total = out.emissions_by_source_and_fuel_type.last().unwrap();
    assert_eq!(total.fuel_type, "totalEmissions");
    assert_eq!(total.emissions, gas.emissions);

    assert_close!(out.co2_equivalent_location_based, 17.26231);
    assert_close!(out.co2_equivalent_market_based, 18.65031);
}

#[test]
fn configured_efficiency_applies_when_sheet_is_silent() {
    let config = FormulaConfig::default().with_boiler_efficiency(0.5);
    let mut formula = Steam::with_config(shared_factors(), config);
    let out = formula
        .recalc_json(json!({
            "emissionFactorDataForSteamPurchased": [
                {"fuelType": "naturalGas", "steamPurchased": 100}
            ]
        }))
        .unwrap();
    let row = out.emission_factor_data_for_steam_purchased[0].computed().unwrap();
    assert_close!(row.location_co2, 10612.0);
}

#[test]
fn worksheet_constructor_honours_config() {
    let worksheet: <Steam as Formula>::Worksheet = serde_json::from_value(json!({
        "emissionFactorDataForSteamPurchased": [
            {"fuelType": "naturalGas", "steamPurchased": 100}
        ]
    }))
    .unwrap();
    let config = FormulaConfig::default().with_boiler_efficiency(0.5);
    let formula =
        Steam::with_worksheet_and_config(shared_factors(), config, worksheet.clone()).unwrap();
    let row = formula.output().unwrap().emission_factor_data_for_steam_purchased[0]
        .computed()
        .unwrap();
    assert_close!(row.location_co2, 10612.0);

    let formula = Steam::with_worksheet(shared_factors(), worksheet).unwrap();
    let row = formula.output().unwrap().emission_factor_data_for_steam_purchased[0]
        .computed()
        .unwrap();
    assert_close!(row.location_co2, 6632.5);
}
