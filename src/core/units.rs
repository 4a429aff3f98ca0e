pub const WATTS_PER_KILOWATT: u32 = 1_000;
pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: usize = (HOURS_PER_DAY * DAYS_PER_YEAR) as usize;

/// Volumetric heat capacity of air used by the ventilation conductance, in J/(m3.K)
pub(crate) const AIR_VOLUMETRIC_HEAT_CAPACITY: f64 = 1200.;

/// Hourly energy in Wh (one hour at W) to kWh.
pub fn watt_hours_to_kilowatt_hours(energy_wh: f64) -> f64 {
    energy_wh / WATTS_PER_KILOWATT as f64
}
