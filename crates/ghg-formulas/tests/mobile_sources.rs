use ghg_formulas::{Formula, FormulaConfig, GhgError, MobileSources};
use ghg_testkit::{assert_close, number, shared_factors};
use serde_json::json;

#[test]
fn year_below_table_window_uses_earliest_vintage() {
    let mut formula = MobileSources::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "mobileSourcesFuelConsumption": [
                {"vehicleType": "passengerCars", "fuelType": "gasoline", "vehicleYear": 2000, "milesTraveled": 100}
            ]
        }))
        .unwrap();

    let gasoline = &out.total_organization_wide_on_road_gasoline_mobile_source_mileage_and_emissions;
    let vehicles: Vec<&str> = gasoline.iter().map(|v| v.vehicle_type.as_str()).collect();
    assert_eq!(vehicles, ["lightDutyTrucks", "passengerCars"]);

    let cars = &gasoline[1].emission_by_year;
    assert_eq!(cars.len(), 3);
    assert_eq!(cars[0].vehicle_year, "2005");
    assert_close!(cars[0].mileage, 100.0);
    assert_close!(cars[0].ch4, 1.47);
    assert_close!(cars[0].n2o, 0.79);
    assert_eq!(cars[1].ch4, 0.0);
}

#[test]
fn year_inside_a_table_gap_is_skipped_not_fatal() {
    let mut formula = MobileSources::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "mobileSourcesFuelConsumption": [
                {"vehicleType": "lightDutyTrucks", "fuelType": "gasoline", "vehicleYear": "1995", "fuelUsage": 10, "milesTraveled": 200},
                {"vehicleType": "lightDutyTrucks", "fuelType": "gasoline", "vehicleYear": "2000", "milesTraveled": 100}
            ]
        }))
        .unwrap();

    let trucks = &out.total_organization_wide_on_road_gasoline_mobile_source_mileage_and_emissions[0];
    assert_eq!(trucks.vehicle_type, "lightDutyTrucks");
    let years: Vec<&str> = trucks.emission_by_year.iter().map(|b| b.vehicle_year.as_str()).collect();
    assert_eq!(years, ["1990-1999", "2000"]);
    assert_eq!(trucks.emission_by_year[0].mileage, 0.0);
    assert_close!(trucks.emission_by_year[1].ch4, 1.83);

    // CO2 still follows fuel burned even when the vintage is unresolved.
    let gasoline = &out.total_mobile_sources_fuel_usage_and_co2_emissions[0];
    assert_eq!(gasoline.fuel_type, "gasoline");
    assert_close!(gasoline.fuel_usage, 10.0);
    assert_close!(gasoline.co2, 87.8);
}

#[test]
fn ethanol_blend_splits_fossil_and_biomass_co2() {
    let sheet = json!({
        "mobileSourcesFuelConsumption": [
            {"fuelType": "ethanol", "fuelUsage": 100}
        ]
    });

    let mut formula = MobileSources::new(shared_factors());
    formula.recalc_json(sheet.clone()).unwrap();
    let doc = formula.to_dict().unwrap();
    let ethanol = &doc["totalMobileSourcesFuelUsageAndCO2Emissions"][6];
    assert_eq!(ethanol["fuelType"], "ethanol");
    assert_close!(number(ethanol, "/CO2"), 175.6);
    assert_close!(number(&doc, "/totalBiomassCo2EquivalentEmissions"), 0.46);
    assert_close!(number(&doc, "/ethanolPercent"), 80.0);

    let config = FormulaConfig::default().with_blend_percents(20.0, 85.0);
    let mut formula = MobileSources::with_config(shared_factors(), config);
    let out = formula.recalc_json(sheet.clone()).unwrap();
    assert_close!(out.total_mobile_sources_fuel_usage_and_co2_emissions[6].co2, 131.7);
    assert_close!(out.total_biomass_co2_equivalent_emissions, 0.48875);

    // A percentage on the worksheet wins over the configured default.
    let mut with_percent = sheet;
    with_percent["ethanolPercent"] = json!(85);
    let mut formula = MobileSources::new(shared_factors());
    let out = formula.recalc_json(with_percent).unwrap();
    assert_close!(out.total_biomass_co2_equivalent_emissions, 0.48875);
    assert_eq!(out.ethanol_percent, 85.0);
}

#[test]
fn non_road_equipment_follows_fuel_usage() {
    let mut formula = MobileSources::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "mobileSourcesFuelConsumption": [
                {"vehicleType": "agriculturalEquipment", "fuelType": "diesel", "fuelUsage": 10, "milesTraveled": 999}
            ]
        }))
        .unwrap();

    let non_road = &out.total_organization_wide_non_road_mobile_source_fuel_usage_and_emissions;
    let vehicles: Vec<&str> = non_road.iter().map(|v| v.vehicle_type.as_str()).collect();
    assert_eq!(vehicles, ["agriculturalEquipment", "shipsAndBoats"]);

    let diesel = &non_road[0].emission_by_fuel_type[0];
    assert_eq!(diesel.fuel_type, "diesel");
    assert_close!(diesel.fuel_usage, 10.0);
    assert_close!(diesel.ch4, 14.4);
    assert_close!(diesel.n2o, 2.6);
    assert_eq!(non_road[0].emission_by_fuel_type[1].fuel_type, "gasoline");

    assert_close!(out.total_mobile_sources_fuel_usage_and_co2_emissions[1].co2, 102.1);
    let kg = 102.1 + 14.4 / 1000.0 * 25.0 + 2.6 / 1000.0 * 298.0;
    assert_close!(out.total_co2_equivalent_emissions, kg / 1000.0);
}

#[test]
fn on_road_non_gasoline_lists_remaining_fuels() {
    let mut formula = MobileSources::new(shared_factors());
    let out = formula
        .recalc_json(json!({
            "mobileSourcesFuelConsumption": [
                {"vehicleType": "passengerCars", "fuelType": "diesel", "vehicleYear": 1970, "fuelUsage": 5, "milesTraveled": 1000}
            ]
        }))
        .unwrap();
    let rows = &out.total_organization_wide_on_road_non_gasoline_mobile_source_mileage_and_emissions;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].vehicle_type, "passengerCars");
    assert_eq!(rows[0].fuel_type, "diesel");
    assert_close!(rows[0].emission_by_year[0].ch4, 0.5);
    assert_close!(rows[0].emission_by_year[0].n2o, 1.0);
}

#[test]
fn unknown_vehicle_is_a_hard_error() {
    let mut formula = MobileSources::new(shared_factors());
    let err = formula
        .recalc_json(json!({
            "mobileSourcesFuelConsumption": [
                {"vehicleType": "hovercraft", "fuelType": "diesel", "fuelUsage": 1}
            ]
        }))
        .unwrap_err();
    match err {
        GhgError::MissingKey { key, .. } => assert!(key.contains("hovercraft"), "{key}"),
        other => panic!("unexpected error: {other:?}"),
    }
}
