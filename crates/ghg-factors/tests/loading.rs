use ghg_common::GhgError;
use ghg_factors::{FactorTables, TransportBasis};
use ghg_testkit::{FACTORS_JSON, factors_file};

#[test]
fn loads_from_json_path() {
    let file = factors_file("json");
    let tables = FactorTables::from_path(file.path()).expect("load factors");
    assert_eq!(tables, ghg_testkit::factor_tables());
    assert_eq!(tables.gwp("HFC-134a").unwrap(), 1430.0);
}

#[test]
fn yaml_extension_selects_yaml_parser() {
    // JSON is a subset of YAML, so the JSON fixture parses either way.
    let file = factors_file("yaml");
    let tables = FactorTables::from_path(file.path()).expect("load factors as yaml");
    assert_eq!(tables.heat_content("naturalGas", "scf").unwrap(), 1.0);
}

#[test]
fn reader_and_str_loaders_agree() {
    let from_reader = FactorTables::from_json_reader(FACTORS_JSON.as_bytes()).unwrap();
    let from_str = FactorTables::from_json_str(FACTORS_JSON).unwrap();
    assert_eq!(from_reader, from_str);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    match FactorTables::from_path(dir.path().join("absent.json")) {
        Err(GhgError::Io(_)) => {}
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn yaml_document_round_trips_typed_records() {
    let yaml = r#"
businessTravel:
  bus: {co2: 0.071, ch4: 0.0, n2o: 0.0021}
productTransport:
  rail:
    ton-mile: {co2: 0.023, ch4: 0.0018, n2o: 0.0006}
"#;
    let tables = FactorTables::from_yaml_str(yaml).unwrap();
    assert_eq!(tables.business_travel("bus").unwrap().n2o, 0.0021);
    assert_eq!(
        tables
            .product_transport("rail", TransportBasis::TonMile)
            .unwrap()
            .co2,
        0.023
    );
    assert!(matches!(
        tables.product_transport("rail", TransportBasis::VehicleMile),
        Err(GhgError::MissingKey { .. })
    ));
}

#[test]
fn steam_only_fuels_publish_mmbtu_factors() {
    let tables = ghg_testkit::factor_tables();
    let coke = tables.stationary("coalCoke").unwrap();
    assert_eq!(coke.per_mmbtu("coalCoke", ghg_common::Gas::Co2).unwrap(), 113.67);
    assert!(coke.per_unit("coalCoke", ghg_common::Gas::Co2).is_err());
}
