//! Running totals shared by the category pipelines.

use std::ops::AddAssign;

use ghg_common::{Gas, GhgError};
use ghg_factors::FactorTables;
use rustc_hash::FxHashMap;
use serde::Serialize;

/// CO2 (kg), CH4 (g) and N2O (g) for one row or one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GasTotals {
    #[serde(rename = "CO2")]
    pub co2: f64,
    #[serde(rename = "CH4")]
    pub ch4: f64,
    #[serde(rename = "N2O")]
    pub n2o: f64,
}

impl GasTotals {
    pub fn get(&self, gas: Gas) -> f64 {
        match gas {
            Gas::Co2 => self.co2,
            Gas::Ch4 => self.ch4,
            Gas::N2o => self.n2o,
        }
    }

    pub fn try_from_fn(mut f: impl FnMut(Gas) -> Result<f64, GhgError>) -> Result<Self, GhgError> {
        Ok(Self {
            co2: f(Gas::Co2)?,
            ch4: f(Gas::Ch4)?,
            n2o: f(Gas::N2o)?,
        })
    }

    /// kg CO2e, with CH4 and N2O converted from grams and weighted by GWP.
    pub fn co2e_kg(&self, factors: &FactorTables) -> Result<f64, GhgError> {
        Ok(self.co2
            + self.ch4 / 1000.0 * factors.gas_gwp(Gas::Ch4)?
            + self.n2o / 1000.0 * factors.gas_gwp(Gas::N2o)?)
    }
}

impl AddAssign for GasTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.co2 += rhs.co2;
        self.ch4 += rhs.ch4;
        self.n2o += rhs.n2o;
    }
}

/// Per-category accumulator seeded from a fixed enumeration.
///
/// Iteration follows the enumeration, never the order rows arrived in.
/// Accumulating into a category outside the enumeration is a `MissingKey`.
#[derive(Debug, Clone)]
pub struct CategoryTotals<V> {
    table: &'static str,
    slots: Vec<(&'static str, V)>,
    index: FxHashMap<&'static str, usize>,
}

impl<V: Default> CategoryTotals<V> {
    pub fn new(table: &'static str, categories: &[&'static str]) -> Self {
        let mut slots = Vec::with_capacity(categories.len());
        let mut index = FxHashMap::default();
        for &category in categories {
            if index.contains_key(category) {
                continue;
            }
            index.insert(category, slots.len());
            slots.push((category, V::default()));
        }
        Self {
            table,
            slots,
            index,
        }
    }
}

impl<V> CategoryTotals<V> {
    pub fn slot_mut(&mut self, category: &str) -> Result<&mut V, GhgError> {
        match self.index.get(category) {
            Some(&i) => Ok(&mut self.slots[i].1),
            None => Err(GhgError::missing(self.table, category)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&V> {
        self.index.get(category).map(|&i| &self.slots[i].1)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.index.contains_key(category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &V)> {
        self.slots.iter().map(|(k, v)| (*k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.slots.iter().map(|(_, v)| v)
    }
}

impl CategoryTotals<GasTotals> {
    /// Concatenate per-table totals in order. A category listed by several
    /// tables gets the sum of their slots at its first position.
    pub fn merged(table: &'static str, parts: &[&CategoryTotals<GasTotals>]) -> Self {
        let mut out = CategoryTotals {
            table,
            slots: Vec::new(),
            index: FxHashMap::default(),
        };
        for part in parts {
            for (category, value) in part.iter() {
                match out.index.get(category) {
                    Some(&i) => out.slots[i].1 += *value,
                    None => {
                        out.index.insert(category, out.slots.len());
                        out.slots.push((category, *value));
                    }
                }
            }
        }
        out
    }

    pub fn sum(&self) -> GasTotals {
        let mut total = GasTotals::default();
        for value in self.values() {
            total += *value;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_follows_declared_order() {
        let mut totals: CategoryTotals<f64> =
            CategoryTotals::new("disposal method", &["recycled", "landfilled", "combusted"]);
        *totals.slot_mut("combusted").unwrap() += 2.0;
        *totals.slot_mut("recycled").unwrap() += 1.0;
        let order: Vec<_> = totals.iter().map(|(k, v)| (k, *v)).collect();
        assert_eq!(
            order,
            vec![("recycled", 1.0), ("landfilled", 0.0), ("combusted", 2.0)]
        );
    }

    #[test]
    fn unknown_category_is_missing_key() {
        let mut totals: CategoryTotals<f64> = CategoryTotals::new("disposal method", &["recycled"]);
        match totals.slot_mut("incinerated") {
            Err(GhgError::MissingKey { table, key }) => {
                assert_eq!(table, "disposal method");
                assert_eq!(key, "incinerated");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn gas_totals_serialize_with_formula_labels() {
        let totals = GasTotals {
            co2: 1.0,
            ch4: 2.0,
            n2o: 3.0,
        };
        assert_eq!(
            serde_json::to_value(totals).unwrap(),
            serde_json::json!({"CO2": 1.0, "CH4": 2.0, "N2O": 3.0})
        );
    }

    #[test]
    fn gas_sum_adds_every_slot() {
        let mut totals: CategoryTotals<GasTotals> = CategoryTotals::new("travel", &["bus", "rail"]);
        *totals.slot_mut("bus").unwrap() += GasTotals { co2: 1.0, ch4: 0.5, n2o: 0.25 };
        *totals.slot_mut("rail").unwrap() += GasTotals { co2: 2.0, ch4: 0.5, n2o: 0.75 };
        assert_eq!(totals.sum(), GasTotals { co2: 3.0, ch4: 1.0, n2o: 1.0 });
    }

    #[test]
    fn merged_keeps_table_order_and_sums_shared_categories() {
        let one = GasTotals { co2: 1.0, ch4: 0.0, n2o: 0.0 };
        let mut trucks: CategoryTotals<GasTotals> = CategoryTotals::new("by mile", &["truck", "car"]);
        let mut freight: CategoryTotals<GasTotals> = CategoryTotals::new("by ton", &["truck", "rail"]);
        *trucks.slot_mut("truck").unwrap() += one;
        *freight.slot_mut("truck").unwrap() += one;
        *freight.slot_mut("rail").unwrap() += one;

        let mut all = CategoryTotals::merged("transport", &[&trucks, &freight]);
        let order: Vec<_> = all.iter().map(|(k, v)| (k, v.co2)).collect();
        assert_eq!(order, vec![("truck", 2.0), ("car", 0.0), ("rail", 1.0)]);
        match all.slot_mut("barge") {
            Err(GhgError::MissingKey { table, .. }) => assert_eq!(table, "transport"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
