pub mod internal_gains;
pub mod thermal_mass;
pub mod window;
pub mod zone;
