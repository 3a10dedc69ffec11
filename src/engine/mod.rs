pub mod controller;
pub mod meter;
pub mod queue;
pub mod tariff;
