pub mod bill;
pub mod calendar;
pub mod sweep;
pub mod tariff;
