//! Meta crate that re-exports the GHG inventory building blocks. Depend on
//! this crate and pick layers with feature flags, or depend on the underlying
//! crates directly for finer control.

#[cfg(feature = "common")]
pub use ghg_common as common;

#[cfg(feature = "factors")]
pub use ghg_factors as factors;

#[cfg(feature = "formulas")]
pub use ghg_formulas as formulas;

#[cfg(feature = "common")]
pub use ghg_common::{Gas, GhgError, Result, YearValue};

#[cfg(feature = "factors")]
pub use ghg_factors::{FactorTables, YearTable};

#[cfg(feature = "formulas")]
pub use ghg_formulas::{Category, Formula, FormulaConfig, OutputDocument, calculate};
