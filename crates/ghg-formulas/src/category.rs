//! Dispatch a raw worksheet to its category formula.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ghg_common::GhgError;
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::FormulaConfig;
use crate::formula::Formula;
use crate::formulas::{
    BusinessTravel, Commuting, Electricity, FireSuppression, MobileSources, ProductTransport,
    PurchasedGases, PurchasedOffsets, RefrigerationAndAc, StationaryCombustion, Steam, Waste,
    WasteGases,
};

/// Emission categories with a worksheet formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    StationaryCombustion,
    MobileSources,
    Electricity,
    Steam,
    RefrigerationAndAc,
    FireSuppression,
    PurchasedGases,
    Waste,
    WasteGases,
    BusinessTravel,
    Commuting,
    ProductTransport,
    PurchasedOffsets,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::StationaryCombustion,
        Category::MobileSources,
        Category::Electricity,
        Category::Steam,
        Category::RefrigerationAndAc,
        Category::FireSuppression,
        Category::PurchasedGases,
        Category::Waste,
        Category::WasteGases,
        Category::BusinessTravel,
        Category::Commuting,
        Category::ProductTransport,
        Category::PurchasedOffsets,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::StationaryCombustion => StationaryCombustion::NAME,
            Category::MobileSources => MobileSources::NAME,
            Category::Electricity => Electricity::NAME,
            Category::Steam => Steam::NAME,
            Category::RefrigerationAndAc => RefrigerationAndAc::NAME,
            Category::FireSuppression => FireSuppression::NAME,
            Category::PurchasedGases => PurchasedGases::NAME,
            Category::Waste => Waste::NAME,
            Category::WasteGases => WasteGases::NAME,
            Category::BusinessTravel => BusinessTravel::NAME,
            Category::Commuting => Commuting::NAME,
            Category::ProductTransport => ProductTransport::NAME,
            Category::PurchasedOffsets => PurchasedOffsets::NAME,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = GhgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| GhgError::missing("category", s))
    }
}

/// A computed worksheet as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputDocument(Map<String, Value>);

impl OutputDocument {
    pub fn with_version(mut self, version: impl Into<Value>) -> Self {
        self.0.insert("version".to_string(), version.into());
        self
    }

    pub fn version(&self) -> Option<&Value> {
        self.0.get("version")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Run `category`'s formula over a raw worksheet.
///
/// A top-level `version` on the worksheet is carried into the document.
pub fn calculate(
    category: Category,
    factors: Arc<FactorTables>,
    config: FormulaConfig,
    worksheet: Value,
) -> Result<OutputDocument, GhgError> {
    let version = worksheet.get("version").cloned();
    let doc = match category {
        Category::StationaryCombustion => run::<StationaryCombustion>(factors, config, worksheet),
        Category::MobileSources => run::<MobileSources>(factors, config, worksheet),
        Category::Electricity => run::<Electricity>(factors, config, worksheet),
        Category::Steam => run::<Steam>(factors, config, worksheet),
        Category::RefrigerationAndAc => run::<RefrigerationAndAc>(factors, config, worksheet),
        Category::FireSuppression => run::<FireSuppression>(factors, config, worksheet),
        Category::PurchasedGases => run::<PurchasedGases>(factors, config, worksheet),
        Category::Waste => run::<Waste>(factors, config, worksheet),
        Category::WasteGases => run::<WasteGases>(factors, config, worksheet),
        Category::BusinessTravel => run::<BusinessTravel>(factors, config, worksheet),
        Category::Commuting => run::<Commuting>(factors, config, worksheet),
        Category::ProductTransport => run::<ProductTransport>(factors, config, worksheet),
        Category::PurchasedOffsets => run::<PurchasedOffsets>(factors, config, worksheet),
    }?;
    Ok(match version {
        Some(version) => doc.with_version(version),
        None => doc,
    })
}

fn run<F: Formula>(
    factors: Arc<FactorTables>,
    config: FormulaConfig,
    worksheet: Value,
) -> Result<OutputDocument, GhgError> {
    let mut formula = F::with_config(factors, config);
    formula.recalc_json(worksheet)?;
    match formula.to_dict() {
        Some(Value::Object(map)) => Ok(OutputDocument(map)),
        _ => Err(GhgError::Unserializable { formula: F::NAME }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for category in Category::ALL {
            assert_eq!(category.name().parse::<Category>().unwrap(), category);
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                Value::from(category.name())
            );
        }
    }

    #[test]
    fn unknown_category_is_missing_key() {
        match "scope4".parse::<Category>() {
            Err(GhgError::MissingKey { table, key }) => {
                assert_eq!(table, "category");
                assert_eq!(key, "scope4");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn version_is_copied_only_when_present() {
        let factors = Arc::new(FactorTables::default());
        let doc = calculate(
            Category::PurchasedOffsets,
            factors.clone(),
            FormulaConfig::default(),
            serde_json::json!({"version": "1.0", "purchasedOffsets": [{"purchasedOffset": 5}]}),
        )
        .unwrap();
        assert_eq!(doc.version(), Some(&Value::from("1.0")));
        assert_eq!(doc.get("totalPurchasedOffsets"), Some(&Value::from(-5.0)));

        let doc = calculate(
            Category::PurchasedOffsets,
            factors,
            FormulaConfig::default(),
            serde_json::json!({"purchasedOffsets": []}),
        )
        .unwrap();
        assert!(doc.version().is_none());
    }
}
