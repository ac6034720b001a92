pub mod bill;
pub mod calendar;
pub mod charges;
pub mod error;
pub mod surcharge;
pub mod tariff;
pub mod types;

pub use bill::{compute_bill, compute_bill_with_schedule, BillingInput, ElectricityBill};
pub use error::TariffError;
pub use types::*;

/// Standard result type for all tariff operations
pub type TariffResult<T> = Result<T, TariffError>;
