pub mod meter;
pub mod position;
pub mod route;
pub mod surcharge;
pub mod trip;
