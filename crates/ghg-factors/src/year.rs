//! Vintage-year resolution for mobile CH4/N2O factors.
//!
//! Published on-road factors are tabulated per model year, but the table only
//! covers a window of years. Requests outside the window reuse the nearest
//! boundary year; requests inside the window must hit an exact entry.

use std::collections::BTreeMap;

use ghg_common::{GhgError, YearValue};
use serde::{Deserialize, Serialize};

/// Key of the single entry a time-invariant table carries.
pub const DEFAULT_YEAR_KEY: &str = "default";

const TABLE: &str = "mobile CH4/N2O";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct YearFactor {
    pub ch4_factor: f64,
    pub n2o_factor: f64,
    /// Label grouping years in output tables, e.g. `"1984-1993"`.
    #[serde(default)]
    pub year_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, YearFactor>",
    into = "BTreeMap<String, YearFactor>"
)]
pub enum YearTable {
    TimeInvariant(YearFactor),
    TimeVarying {
        by_year: BTreeMap<i64, YearFactor>,
        min: i64,
        max: i64,
    },
}

impl YearTable {
    pub fn invariant(factor: YearFactor) -> Self {
        YearTable::TimeInvariant(factor)
    }

    /// Build a time-varying table from `(year, factor)` pairs.
    pub fn by_year(entries: impl IntoIterator<Item = (i64, YearFactor)>) -> Result<Self, GhgError> {
        let by_year: BTreeMap<i64, YearFactor> = entries.into_iter().collect();
        let (Some(&min), Some(&max)) = (by_year.keys().next(), by_year.keys().next_back()) else {
            return Err(GhgError::malformed(TABLE, "year table has no entries"));
        };
        Ok(YearTable::TimeVarying { by_year, min, max })
    }

    pub fn is_time_invariant(&self) -> bool {
        matches!(self, YearTable::TimeInvariant(_))
    }

    /// Resolve the factor record applicable to `year`.
    pub fn resolve(&self, year: Option<&YearValue>) -> Result<&YearFactor, GhgError> {
        let (by_year, min, max) = match self {
            YearTable::TimeInvariant(factor) => return Ok(factor),
            YearTable::TimeVarying { by_year, min, max } => (by_year, *min, *max),
        };

        let year = match year {
            Some(value) => value.as_year()?,
            None => {
                return Err(GhgError::YearValue {
                    value: "null".to_string(),
                });
            }
        };

        if let Some(factor) = by_year.get(&year) {
            return Ok(factor);
        }
        let boundary = if year < min {
            min
        } else if year > max {
            max
        } else {
            return Err(GhgError::YearMap { year, min, max });
        };
        by_year
            .get(&boundary)
            .ok_or(GhgError::YearMap { year, min, max })
    }

    /// Distinct display labels in ascending year order.
    pub fn displays(&self) -> Vec<&str> {
        match self {
            YearTable::TimeInvariant(factor) => vec![factor.year_display.as_str()],
            YearTable::TimeVarying { by_year, .. } => {
                let mut out: Vec<&str> = Vec::new();
                for factor in by_year.values() {
                    if !out.contains(&factor.year_display.as_str()) {
                        out.push(factor.year_display.as_str());
                    }
                }
                out
            }
        }
    }
}

impl TryFrom<BTreeMap<String, YearFactor>> for YearTable {
    type Error = GhgError;

    fn try_from(mut raw: BTreeMap<String, YearFactor>) -> Result<Self, Self::Error> {
        if raw.len() == 1 {
            return match raw.remove(DEFAULT_YEAR_KEY) {
                Some(factor) => Ok(YearTable::TimeInvariant(factor)),
                None => Err(GhgError::malformed(
                    TABLE,
                    "a single-entry table must be keyed `default`",
                )),
            };
        }
        let entries = raw
            .into_iter()
            .map(|(key, factor)| {
                key.trim()
                    .parse::<i64>()
                    .map(|year| (year, factor))
                    .map_err(|_| GhgError::malformed(TABLE, format!("`{key}` is not a year")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        YearTable::by_year(entries)
    }
}

impl From<YearTable> for BTreeMap<String, YearFactor> {
    fn from(table: YearTable) -> Self {
        match table {
            YearTable::TimeInvariant(factor) => {
                BTreeMap::from([(DEFAULT_YEAR_KEY.to_string(), factor)])
            }
            YearTable::TimeVarying { by_year, .. } => by_year
                .into_iter()
                .map(|(year, factor)| (year.to_string(), factor))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(ch4: f64, display: &str) -> YearFactor {
        YearFactor {
            ch4_factor: ch4,
            n2o_factor: ch4 / 2.0,
            year_display: display.to_string(),
        }
    }

    fn sparse() -> YearTable {
        YearTable::by_year([
            (2000, factor(0.1, "2000")),
            (2001, factor(0.2, "2001-2009")),
            (2010, factor(0.3, "2010")),
        ])
        .unwrap()
    }

    #[test]
    fn invariant_table_ignores_year() {
        let table = YearTable::invariant(factor(1.5, ""));
        for year in [None, Some(YearValue::Int(1900)), Some(YearValue::from("garbage"))] {
            assert_eq!(table.resolve(year.as_ref()).unwrap().ch4_factor, 1.5);
        }
    }

    #[test]
    fn exact_and_boundary_years_resolve() {
        let table = sparse();
        assert_eq!(table.resolve(Some(&YearValue::Int(2001))).unwrap().ch4_factor, 0.2);
        assert_eq!(table.resolve(Some(&YearValue::Int(1950))).unwrap().ch4_factor, 0.1);
        assert_eq!(table.resolve(Some(&YearValue::Int(2030))).unwrap().ch4_factor, 0.3);
        assert_eq!(table.resolve(Some(&YearValue::from("2010"))).unwrap().ch4_factor, 0.3);
    }

    #[test]
    fn gap_inside_range_is_a_year_map_error() {
        match sparse().resolve(Some(&YearValue::Int(2005))) {
            Err(GhgError::YearMap { year, min, max }) => assert_eq!((year, min, max), (2005, 2000, 2010)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_year_on_varying_table_is_a_year_value_error() {
        assert!(matches!(
            sparse().resolve(None),
            Err(GhgError::YearValue { .. })
        ));
    }

    #[test]
    fn displays_are_distinct_and_ordered() {
        let table = YearTable::by_year([
            (1990, factor(0.1, "1984-1993")),
            (1984, factor(0.1, "1984-1993")),
            (1994, factor(0.2, "1994")),
        ])
        .unwrap();
        assert_eq!(table.displays(), vec!["1984-1993", "1994"]);
    }

    #[test]
    fn single_entry_must_be_default() {
        let raw = BTreeMap::from([("2005".to_string(), factor(0.1, "2005"))]);
        assert!(matches!(
            YearTable::try_from(raw),
            Err(GhgError::MalformedTable { .. })
        ));
    }

    #[test]
    fn non_year_keys_are_rejected() {
        let raw = BTreeMap::from([
            ("2005".to_string(), factor(0.1, "2005")),
            ("latest".to_string(), factor(0.2, "latest")),
        ]);
        assert!(matches!(
            YearTable::try_from(raw),
            Err(GhgError::MalformedTable { .. })
        ));
    }
}
