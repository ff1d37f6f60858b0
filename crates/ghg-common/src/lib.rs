pub mod error;
pub mod gas;
pub mod value;

pub use error::*;
pub use gas::*;
pub use value::*;
