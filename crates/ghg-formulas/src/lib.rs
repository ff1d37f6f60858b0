//! Category formulas for GHG inventory worksheets.
//!
//! Every category implements [`Formula`]. [`calculate`] dispatches a raw JSON
//! worksheet to the right category by [`Category`].

pub mod category;
pub mod config;
pub mod formula;
pub mod formulas;
pub mod row;
pub mod totals;

pub use category::{Category, OutputDocument, calculate};
pub use config::FormulaConfig;
pub use formula::Formula;
pub use formulas::*;
pub use row::{InputRow, RowOutcome, Rows};
pub use totals::{CategoryTotals, GasTotals};

pub use ghg_common::{Gas, GhgError, Result, YearValue};
pub use ghg_factors::FactorTables;
