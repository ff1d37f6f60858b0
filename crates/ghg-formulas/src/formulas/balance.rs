//! Material-balance tables shared by refrigeration/AC and fire suppression.
//!
//! Both categories track refrigerant-like gases by mass (lb) and weight the
//! net loss by GWP. They differ only in the key their per-row result is
//! published under, so each category wraps [`BalanceQuantities`] in its own
//! computed row.

use ghg_common::{GhgError, non_negative, normalize, present};
use ghg_factors::FactorTables;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::row::{RowOutcome, Rows};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MaterialBalanceRow {
    pub gas: Option<String>,
    pub inventory_change: Option<f64>,
    pub transferred_amount: Option<f64>,
    pub capacity_change: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimplifiedMaterialBalanceRow {
    pub gas: Option<String>,
    pub new_units_charge: Option<f64>,
    pub new_units_capacity: Option<f64>,
    pub existing_units_recharge: Option<f64>,
    pub disposed_units_capacity: Option<f64>,
    pub disposed_units_recovered: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialBalance {
    pub inventory_change: f64,
    pub transferred_amount: f64,
    pub capacity_change: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedMaterialBalance {
    pub new_units_charge: f64,
    pub new_units_capacity: f64,
    pub existing_units_recharge: f64,
    pub disposed_units_capacity: f64,
    pub disposed_units_recovered: f64,
}

/// Normalized quantities of one balance row.
pub trait BalanceQuantities: Serialize + Copy {
    type Row: DeserializeOwned;

    fn gas(row: &Self::Row) -> Option<&str>;

    fn from_row(row: &Self::Row) -> Self;

    /// Net mass released, lb. May be negative before clamping.
    fn net_release(&self) -> f64;
}

impl BalanceQuantities for MaterialBalance {
    type Row = MaterialBalanceRow;

    fn gas(row: &Self::Row) -> Option<&str> {
        present(&row.gas)
    }

    fn from_row(row: &Self::Row) -> Self {
        Self {
            inventory_change: normalize(row.inventory_change),
            transferred_amount: normalize(row.transferred_amount),
            capacity_change: normalize(row.capacity_change),
        }
    }

    fn net_release(&self) -> f64 {
        self.inventory_change + self.transferred_amount + self.capacity_change
    }
}

impl BalanceQuantities for SimplifiedMaterialBalance {
    type Row = SimplifiedMaterialBalanceRow;

    fn gas(row: &Self::Row) -> Option<&str> {
        present(&row.gas)
    }

    fn from_row(row: &Self::Row) -> Self {
        Self {
            new_units_charge: normalize(row.new_units_charge),
            new_units_capacity: normalize(row.new_units_capacity),
            existing_units_recharge: normalize(row.existing_units_recharge),
            disposed_units_capacity: normalize(row.disposed_units_capacity),
            disposed_units_recovered: normalize(row.disposed_units_recovered),
        }
    }

    fn net_release(&self) -> f64 {
        self.new_units_charge - self.new_units_capacity + self.existing_units_recharge
            + self.disposed_units_capacity
            - self.disposed_units_recovered
    }
}

/// A computed balance row before it is given its category's shape.
pub struct BalanceLine<Q> {
    pub gas: String,
    pub gwp: f64,
    pub quantities: Q,
    /// lb CO2e, clamped.
    pub co2e: f64,
}

/// Compute every row of a balance table. Rows without a gas are echoed.
///
/// Returns the rows in input order and the table's lb CO2e total.
pub fn make_balance<Q, C, F>(
    factors: &FactorTables,
    rows: &Rows<Q::Row>,
    shape: F,
) -> Result<(Vec<RowOutcome<C>>, f64), GhgError>
where
    Q: BalanceQuantities,
    F: Fn(BalanceLine<Q>) -> C,
{
    let mut out = Vec::with_capacity(rows.len());
    let mut total = 0.0;
    for row in rows {
        let Some(gas) = Q::gas(row.fields()) else {
            out.push(row.echo());
            continue;
        };
        let gwp = factors.gwp(gas)?;
        let quantities = Q::from_row(row.fields());
        let co2e = non_negative(gwp * quantities.net_release());
        total += co2e;
        out.push(RowOutcome::Computed(shape(BalanceLine {
            gas: gas.to_string(),
            gwp,
            quantities,
            co2e,
        })));
    }
    Ok((out, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplified_release_nets_out_capacity_and_recovery() {
        let q = SimplifiedMaterialBalance::from_row(&SimplifiedMaterialBalanceRow {
            gas: Some("HFC-134a".into()),
            new_units_charge: Some(100.0),
            new_units_capacity: Some(90.0),
            existing_units_recharge: Some(5.0),
            disposed_units_capacity: Some(20.0),
            disposed_units_recovered: None,
        });
        assert_eq!(q.disposed_units_recovered, 0.0);
        assert_eq!(q.net_release(), 35.0);
    }

    #[test]
    fn material_balance_serializes_normalized_inputs() {
        let q = MaterialBalance::from_row(&MaterialBalanceRow {
            gas: Some("R-410A".into()),
            inventory_change: Some(-3.0),
            transferred_amount: None,
            capacity_change: Some(1.0),
        });
        assert_eq!(
            serde_json::to_value(q).unwrap(),
            serde_json::json!({"inventoryChange": -3.0, "transferredAmount": 0.0, "capacityChange": 1.0})
        );
        assert_eq!(q.net_release(), -2.0);
    }
}
