/// Arguments:
/// * `gain_per_person` - sensible heat given off by each occupant, in W
/// * `appliance_gains` - heat given off by appliances, in W/m2 of floor area
/// * `max_occupancy` - number of occupants when the household is fully present
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InternalGains {
    gain_per_person: f64,
    appliance_gains: f64,
    max_occupancy: f64,
}

impl InternalGains {
    pub fn new(gain_per_person: f64, appliance_gains: f64, max_occupancy: f64) -> Self {
        Self {
            gain_per_person,
            appliance_gains,
            max_occupancy,
        }
    }

    /// Number of occupants present for an occupied fraction
    pub fn occupancy(&self, occupancy_fraction: f64) -> f64 {
        occupancy_fraction * self.max_occupancy
    }

    /// Return the total internal gain for the hour in W
    pub fn total_internal_gain_in_w(&self, occupancy_fraction: f64, floor_area: f64) -> f64 {
        self.occupancy(occupancy_fraction) * self.gain_per_person
            + self.appliance_gains * floor_area
    }
}
