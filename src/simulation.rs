use crate::core::heating_systems::supply::SupplyEnergy;
use crate::core::occupancy::OccupancyProfile;
use crate::core::space_heat_demand::internal_gains::InternalGains;
use crate::core::space_heat_demand::window::Window;
use crate::core::space_heat_demand::zone::Zone;
use crate::errors::{HeatDemandError, HeatDemandResult};
use crate::external_conditions::{SolarSite, WeatherProvider};
use crate::simulation_time::{month_for_hour, SimulationTime};

/// Mass node temperature of every building at the start of the year, in Celsius
pub const INITIAL_MASS_TEMPERATURE: f64 = 20.;

/// State carried from one hour to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationState {
    /// mass node temperature at the end of the previous hour, in Celsius
    pub t_m_prev: f64,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            t_m_prev: INITIAL_MASS_TEMPERATURE,
        }
    }
}

/// Everything the zone needs for one hour, apart from the carried state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourInputs {
    pub hour: usize,
    /// occupants present
    pub occupancy: f64,
    /// in W
    pub internal_gains: f64,
    /// in W
    pub solar_gains: f64,
    /// daylight transmitted through the glazing, in lumen
    pub illuminance: f64,
    /// in Celsius
    pub t_out: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HourlyResult {
    pub hour: usize,
    pub occupancy: f64,
    pub internal_gains: f64,
    pub solar_gains: f64,
    pub t_out: f64,
    pub t_m_prev: f64,
    pub t_m_next: f64,
    pub t_air: f64,
    pub t_operative: f64,
    /// in Wh
    pub heating_demand: f64,
    /// in Wh, zero or negative
    pub cooling_demand: f64,
    /// in Wh
    pub lighting_demand: f64,
    pub supply: SupplyEnergy,
    pub cop: f64,
}

/// Advance one hour: `(state, inputs) -> (next state, result)`.
pub fn step(
    zone: &Zone,
    state: SimulationState,
    inputs: &HourInputs,
) -> (SimulationState, HourlyResult) {
    let zone_step = zone.solve_energy(
        inputs.internal_gains,
        inputs.solar_gains,
        inputs.t_out,
        state.t_m_prev,
    );
    let lighting_demand = zone.solve_lighting(inputs.illuminance, inputs.occupancy);

    let result = HourlyResult {
        hour: inputs.hour,
        occupancy: inputs.occupancy,
        internal_gains: inputs.internal_gains,
        solar_gains: inputs.solar_gains,
        t_out: inputs.t_out,
        t_m_prev: state.t_m_prev,
        t_m_next: zone_step.t_m_next(),
        t_air: zone_step.temperatures.t_air,
        t_operative: zone_step.temperatures.t_operative(),
        heating_demand: zone_step.heating_demand,
        cooling_demand: zone_step.cooling_demand,
        lighting_demand,
        supply: zone_step.supply,
        cop: zone_step.cop,
    };

    (
        SimulationState {
            t_m_prev: zone_step.t_m_next(),
        },
        result,
    )
}

/// Results for every simulated hour, in hour order.
#[derive(Clone, Debug, PartialEq)]
pub struct HourlyResults {
    hours: Vec<HourlyResult>,
}

impl HourlyResults {
    pub fn hours(&self) -> &[HourlyResult] {
        &self.hours
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Sum of hourly heating demand, in Wh
    pub fn annual_heating_demand(&self) -> f64 {
        self.hours
            .iter()
            .fold(0., |total, hour| total + hour.heating_demand)
    }

    /// Sum of hourly cooling demand, in Wh (zero or negative)
    pub fn annual_cooling_demand(&self) -> f64 {
        self.hours
            .iter()
            .fold(0., |total, hour| total + hour.cooling_demand)
    }

    /// Sum of hourly lighting demand, in Wh
    pub fn annual_lighting_demand(&self) -> f64 {
        self.hours
            .iter()
            .fold(0., |total, hour| total + hour.lighting_demand)
    }

    /// Heating demand per calendar month, in Wh
    pub fn monthly_heating_demand(&self) -> [f64; 12] {
        let mut monthly = [0.; 12];
        for hour in &self.hours {
            if let Some(month) = month_for_hour(hour.hour) {
                monthly[month] += hour.heating_demand;
            }
        }
        monthly
    }
}

/// Drives one building through every hour of the year.
///
/// Weather and occupancy are borrowed read-only so that one simulator can be shared
/// between all buildings of a stock.
#[derive(Debug)]
pub struct HourlyEnergyBalanceSimulator<'a, W: WeatherProvider> {
    weather: &'a W,
    occupancy: &'a OccupancyProfile,
    internal_gains: InternalGains,
    site: SolarSite,
    simulation_time: SimulationTime,
}

impl<'a, W: WeatherProvider> HourlyEnergyBalanceSimulator<'a, W> {
    pub fn new(
        weather: &'a W,
        occupancy: &'a OccupancyProfile,
        internal_gains: InternalGains,
        site: SolarSite,
    ) -> Self {
        Self {
            weather,
            occupancy,
            internal_gains,
            site,
            simulation_time: SimulationTime::full_year(),
        }
    }

    /// Annual heating demand of the building, in Wh
    pub fn simulate_annual_heat_demand(
        &self,
        zone: &Zone,
        window: &Window,
    ) -> HeatDemandResult<f64> {
        let mut heating_demand = 0.;
        self.run(zone, window, |result| heating_demand += result.heating_demand)?;
        Ok(heating_demand)
    }

    /// Full hourly results of the building for the year
    pub fn simulate_hourly(
        &self,
        zone: &Zone,
        window: &Window,
    ) -> HeatDemandResult<HourlyResults> {
        let mut hours = Vec::with_capacity(self.simulation_time.total_steps());
        self.run(zone, window, |result| hours.push(result))?;
        Ok(HourlyResults { hours })
    }

    fn run(
        &self,
        zone: &Zone,
        window: &Window,
        mut on_hour: impl FnMut(HourlyResult),
    ) -> HeatDemandResult<()> {
        self.check_preconditions(zone, window)?;

        let mut state = SimulationState::default();
        for t_it in self.simulation_time.iter() {
            let inputs = self.hour_inputs(zone, window, t_it.hour)?;
            let (next_state, result) = step(zone, state, &inputs);
            state = next_state;
            on_hour(result);
        }

        Ok(())
    }

    fn check_preconditions(&self, zone: &Zone, window: &Window) -> HeatDemandResult<()> {
        if window.area() != zone.window_area() {
            return Err(HeatDemandError::ConfigurationMismatch {
                window_config_area: window.area(),
                zone_window_area: zone.window_area(),
            });
        }

        if let Some(last_hour) = self.simulation_time.last_hour() {
            if self.weather.hours_available() <= last_hour {
                return Err(HeatDemandError::IndexOutOfRange {
                    series: "weather data",
                    index: last_hour,
                    len: self.weather.hours_available(),
                });
            }
            self.occupancy.fraction(last_hour)?;
        }

        Ok(())
    }

    fn hour_inputs(
        &self,
        zone: &Zone,
        window: &Window,
        hour: usize,
    ) -> HeatDemandResult<HourInputs> {
        let occupancy_fraction = self.occupancy.fraction(hour)?;
        let weather = self.weather.weather_for_hour(hour)?;
        let sun = self.site.sun_position(hour)?;

        Ok(HourInputs {
            hour,
            occupancy: self.internal_gains.occupancy(occupancy_fraction),
            internal_gains: self
                .internal_gains
                .total_internal_gain_in_w(occupancy_fraction, zone.floor_area()),
            solar_gains: window.solar_gains(
                sun,
                weather.direct_normal_radiation,
                weather.diffuse_horizontal_radiation,
            ),
            illuminance: window.transmitted_illuminance(
                sun,
                weather.direct_normal_illuminance,
                weather.diffuse_horizontal_illuminance,
            ),
            t_out: weather.air_temperature,
        })
    }
}
