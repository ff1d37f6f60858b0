//! Distance-based activity tables: business travel, commuting and product
//! transport all multiply a per-mile factor by a distance.

use ghg_common::{GhgError, non_negative, normalize};
use ghg_factors::GasFactors;

use crate::row::{RowOutcome, Rows};
use crate::totals::{CategoryTotals, GasTotals};

pub const PERSONAL_VEHICLES: [&str; 3] = ["passengerCars", "lightDutyTruck", "motorcycle"];

pub const RAIL_OR_BUS: [&str; 6] = [
    "intercityRailNortheastCorridor",
    "intercityRailOtherRoutes",
    "intercityRailNationalAverage",
    "commuterRail",
    "transitRail",
    "bus",
];

pub const FLIGHT_LENGTHS: [&str; 3] = ["shortHaul", "mediumHaul", "longHaul"];

/// A row that names a travel mode and a distance.
pub trait TravelActivity {
    fn mode(&self) -> Option<&str>;

    fn distance(&self) -> Option<f64>;
}

/// What to do with a row that names a mode but no distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingDistance {
    Echo,
    Zero,
}

pub struct TravelLine<'a, R> {
    pub row: &'a R,
    pub mode: &'a str,
    pub distance: f64,
    pub emissions: GasTotals,
}

/// Compute one activity table.
///
/// Rows without a mode are echoed. Each computed row is added to its mode's
/// slot in `by_mode`; the table total is returned alongside the rows.
pub fn make_travel<'f, R, C, L, S>(
    rows: &Rows<R>,
    missing: MissingDistance,
    lookup: L,
    by_mode: &mut CategoryTotals<GasTotals>,
    shape: S,
) -> Result<(Vec<RowOutcome<C>>, GasTotals), GhgError>
where
    R: TravelActivity,
    L: Fn(&str) -> Result<&'f GasFactors, GhgError>,
    S: Fn(TravelLine<'_, R>) -> C,
{
    let mut out = Vec::with_capacity(rows.len());
    let mut total = GasTotals::default();
    for row in rows {
        let distance = normalize(row.distance());
        let Some(mode) = row.mode().filter(|m| !m.is_empty()) else {
            out.push(row.echo());
            continue;
        };
        if distance == 0.0 && missing == MissingDistance::Echo {
            out.push(row.echo());
            continue;
        }
        let factors = lookup(mode)?;
        let emissions = GasTotals::try_from_fn(|gas| Ok(non_negative(factors.get(gas) * distance)))?;

        *by_mode.slot_mut(mode)? += emissions;
        total += emissions;

        out.push(RowOutcome::Computed(shape(TravelLine {
            row: row.fields(),
            mode,
            distance,
            emissions,
        })));
    }
    Ok((out, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Leg {
        mode: Option<String>,
        miles: Option<f64>,
    }

    impl TravelActivity for Leg {
        fn mode(&self) -> Option<&str> {
            self.mode.as_deref()
        }

        fn distance(&self) -> Option<f64> {
            self.miles
        }
    }

    const BUS: GasFactors = GasFactors {
        co2: 0.056,
        ch4: 0.0021,
        n2o: 0.0009,
    };

    fn rows() -> Rows<Leg> {
        serde_json::from_value(json!([
            {"mode": "bus", "miles": 100},
            {"mode": "bus", "miles": null},
            {"mode": "", "miles": 5}
        ]))
        .unwrap()
    }

    #[test]
    fn missing_distance_policy_decides_echo_or_zero() {
        let mut by_mode = CategoryTotals::new("travel", &["bus"]);
        let (echo, _) = make_travel(
            &rows(),
            MissingDistance::Echo,
            |_| Ok(&BUS),
            &mut by_mode,
            |line| line.distance,
        )
        .unwrap();
        assert!(echo[1].is_echoed());
        assert!(echo[2].is_echoed());

        let mut by_mode = CategoryTotals::new("travel", &["bus"]);
        let (zero, total) = make_travel(
            &rows(),
            MissingDistance::Zero,
            |_| Ok(&BUS),
            &mut by_mode,
            |line| line.distance,
        )
        .unwrap();
        assert_eq!(zero[1].computed(), Some(&0.0));
        assert!(zero[2].is_echoed());
        assert!((total.co2 - 5.6).abs() < 1e-9);
        assert_eq!(by_mode.get("bus"), Some(&total));
    }

    #[test]
    fn unknown_mode_is_missing_key() {
        let rows: Rows<Leg> = serde_json::from_value(json!([{"mode": "ferry", "miles": 1}])).unwrap();
        let mut by_mode = CategoryTotals::new("travel", &["bus"]);
        let err = make_travel(&rows, MissingDistance::Zero, |_| Ok(&BUS), &mut by_mode, |_| ())
            .unwrap_err();
        match err {
            GhgError::MissingKey { key, .. } => assert_eq!(key, "ferry"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
