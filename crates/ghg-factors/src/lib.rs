//! Emission factor tables for GHG inventory calculations.
//!
//! - [`FactorTable`]: a key-sorted, read-only lookup table.
//! - [`FactorTables`]: the bundle of every table the formulas consult.
//! - [`YearTable`]: vintage-indexed CH4/N2O factors and their resolver.

pub mod records;
pub mod table;
pub mod tables;
pub mod year;

pub use records::*;
pub use table::FactorTable;
pub use tables::FactorTables;
pub use year::{YearFactor, YearTable};
