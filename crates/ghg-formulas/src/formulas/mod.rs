//! One module per emission category.

pub mod balance;
pub mod business_travel;
pub mod commuting;
pub mod electricity;
pub mod fire_suppression;
pub mod mobile_sources;
pub mod product_transport;
pub mod purchased_gases;
pub mod purchased_offsets;
pub mod refrigeration_and_ac;
pub mod stationary_combustion;
pub mod steam;
pub mod travel;
pub mod waste;
pub mod waste_gases;

pub use balance::{
    MaterialBalance, MaterialBalanceRow, SimplifiedMaterialBalance, SimplifiedMaterialBalanceRow,
};
pub use business_travel::BusinessTravel;
pub use commuting::Commuting;
pub use electricity::Electricity;
pub use fire_suppression::FireSuppression;
pub use mobile_sources::MobileSources;
pub use product_transport::ProductTransport;
pub use purchased_gases::PurchasedGases;
pub use purchased_offsets::PurchasedOffsets;
pub use refrigeration_and_ac::RefrigerationAndAc;
pub use stationary_combustion::StationaryCombustion;
pub use steam::Steam;
pub use waste::Waste;
pub use waste_gases::WasteGases;
