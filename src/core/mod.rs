pub mod heating_systems;
pub mod occupancy;
pub mod space_heat_demand;
pub mod units;
