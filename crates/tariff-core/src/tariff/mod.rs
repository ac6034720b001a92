pub mod category;
pub mod schedule;
pub mod slabs;

pub use category::{classify, monthly_units, TariffCategory};
pub use schedule::{Band, CategoryTariff, FixedChargePolicy, TariffSchedule};
pub use slabs::{allocate, SlabAllocation, SlabLine};
