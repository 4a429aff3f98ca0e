use crate::core::heating_systems::emitters::{EmissionFlows, EmissionSystem, NodeShares};
use crate::core::heating_systems::supply::{SupplyEnergy, SupplySystem};
use crate::core::units::{AIR_VOLUMETRIC_HEAT_CAPACITY, SECONDS_PER_HOUR};
use crate::errors::{HeatDemandError, HeatDemandResult};
use serde::Deserialize;

// Heat transfer coefficient between mass and surface nodes, ISO 13790 12.2.2, in W/(m2.K)
const H_MS: f64 = 9.1;
// Heat transfer coefficient between air and surface nodes, ISO 13790 7.2.2.2, in W/(m2.K)
const H_IS: f64 = 3.45;
// Effective mass area per floor area (medium construction), ISO 13790 Table 12
const MASS_AREA_PER_FLOOR_AREA: f64 = 2.5;
// Heating power per floor area applied as a trial to the zone, ISO 13790 C.4.2, in W/m2
const TRIAL_POWER_PER_FLOOR_AREA: f64 = 10.;

/// Artificial lighting installed in the zone.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LightingConfig {
    /// installed lighting power, in W/m2
    pub load: f64,
    /// illuminance below which lights are switched on, in lux
    pub control: f64,
    pub utilisation_factor: f64,
    pub maintenance_factor: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            load: 11.7,
            control: 300.,
            utilisation_factor: 0.45,
            maintenance_factor: 0.9,
        }
    }
}

/// Every recognised zone option. Capacities left as `None` are unbounded.
#[derive(Clone, Debug, PartialEq)]
pub struct ZoneConfig {
    /// glazed area, in m2
    pub window_area: f64,
    /// opaque external wall area, in m2
    pub walls_area: f64,
    /// conditioned floor area, in m2
    pub floor_area: f64,
    /// conditioned volume, in m3
    pub room_vol: f64,
    /// area of all surfaces facing the zone, in m2
    pub total_internal_area: f64,
    /// in W/(m2.K)
    pub u_walls: f64,
    /// in W/(m2.K)
    pub u_windows: f64,
    /// mechanical ventilation air changes per hour
    pub ach_vent: f64,
    /// infiltration air changes per hour
    pub ach_infl: f64,
    /// heat recovery efficiency of the mechanical ventilation, 0 to 1
    pub ventilation_efficiency: f64,
    /// in J/(m2.K)
    pub thermal_capacitance_per_floor_area: f64,
    /// in Celsius
    pub t_set_heating: f64,
    /// in Celsius
    pub t_set_cooling: f64,
    /// in W/m2, positive
    pub max_heating_energy_per_floor_area: Option<f64>,
    /// in W/m2, negative
    pub max_cooling_energy_per_floor_area: Option<f64>,
    pub heating_supply_system: SupplySystem,
    pub cooling_supply_system: SupplySystem,
    pub heating_emission_system: EmissionSystem,
    pub cooling_emission_system: EmissionSystem,
    pub lighting: LightingConfig,
}

/// Single zone resistance-capacitance (5R1C) model of ISO 13790 Annex C.
///
/// The zone holds no state between hours: the mass node temperature is passed into
/// every step and the next one handed back, so consecutive hours are coupled only
/// through the caller.
#[derive(Clone, Debug)]
pub struct Zone {
    window_area: f64,
    floor_area: f64,
    /// heat capacity of the mass node, in J/K
    c_m: f64,
    /// effective mass area, in m2
    mass_area: f64,
    /// total internal area, in m2
    a_t: f64,
    h_tr_em: f64,
    h_tr_w: f64,
    h_ve_adj: f64,
    h_tr_ms: f64,
    h_tr_is: f64,
    h_tr_1: f64,
    h_tr_2: f64,
    h_tr_3: f64,
    t_set_heating: f64,
    t_set_cooling: f64,
    max_heating_energy: f64,
    max_cooling_energy: f64,
    heating_supply_system: SupplySystem,
    cooling_supply_system: SupplySystem,
    heating_emission_system: EmissionSystem,
    cooling_emission_system: EmissionSystem,
    lighting: LightingConfig,
}

/// Temperatures of the RC network nodes, in Celsius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTemperatures {
    /// mass node at the end of the hour
    pub t_m_next: f64,
    /// mass node averaged over the hour
    pub t_m: f64,
    /// surface node
    pub t_s: f64,
    /// internal air
    pub t_air: f64,
}

impl NodeTemperatures {
    pub fn t_operative(&self) -> f64 {
        0.3 * self.t_air + 0.7 * self.t_s
    }
}

/// Outcome of one hourly energy balance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneStep {
    pub temperatures: NodeTemperatures,
    /// energy required to hold the heating setpoint, in Wh, zero or positive
    pub heating_demand: f64,
    /// energy removed to hold the cooling setpoint, in Wh, zero or negative
    pub cooling_demand: f64,
    /// final energy drawn by the supply system, in Wh
    pub supply: SupplyEnergy,
    pub cop: f64,
}

impl ZoneStep {
    pub fn t_m_next(&self) -> f64 {
        self.temperatures.t_m_next
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Demand {
    Heating,
    Cooling,
}

impl Zone {
    pub fn new(config: ZoneConfig) -> HeatDemandResult<Self> {
        validate(&config)?;
        let ZoneConfig {
            window_area,
            walls_area,
            floor_area,
            room_vol,
            total_internal_area,
            u_walls,
            u_windows,
            ach_vent,
            ach_infl,
            ventilation_efficiency,
            thermal_capacitance_per_floor_area,
            t_set_heating,
            t_set_cooling,
            max_heating_energy_per_floor_area,
            max_cooling_energy_per_floor_area,
            heating_supply_system,
            cooling_supply_system,
            heating_emission_system,
            cooling_emission_system,
            lighting,
        } = config;

        let c_m = thermal_capacitance_per_floor_area * floor_area;
        let mass_area = MASS_AREA_PER_FLOOR_AREA * floor_area;
        let h_tr_em = u_walls * walls_area;
        let h_tr_w = u_windows * window_area;

        // temperature adjustment factor for heat recovered from ventilation, ISO 13790 E.27
        let ach_tot = ach_infl + ach_vent;
        let b_ek = 1. - (ach_vent / ach_tot) * ventilation_efficiency;
        let h_ve_adj =
            AIR_VOLUMETRIC_HEAT_CAPACITY * b_ek * room_vol * (ach_tot / SECONDS_PER_HOUR as f64);
        if h_ve_adj <= 0. {
            return Err(HeatDemandError::InvalidConfiguration(
                "ventilation heat transfer must be positive; infiltration is needed when heat recovery is total".into(),
            ));
        }

        let h_tr_ms = H_MS * mass_area;
        let h_tr_is = H_IS * total_internal_area;
        // ISO 13790 C.6 to C.8
        let h_tr_1 = 1. / (1. / h_ve_adj + 1. / h_tr_is);
        let h_tr_2 = h_tr_1 + h_tr_w;
        let h_tr_3 = 1. / (1. / h_tr_2 + 1. / h_tr_ms);

        Ok(Self {
            window_area,
            floor_area,
            c_m,
            mass_area,
            a_t: total_internal_area,
            h_tr_em,
            h_tr_w,
            h_ve_adj,
            h_tr_ms,
            h_tr_is,
            h_tr_1,
            h_tr_2,
            h_tr_3,
            t_set_heating,
            t_set_cooling,
            max_heating_energy: max_heating_energy_per_floor_area
                .map_or(f64::INFINITY, |max| max * floor_area),
            max_cooling_energy: max_cooling_energy_per_floor_area
                .map_or(f64::NEG_INFINITY, |max| max * floor_area),
            heating_supply_system,
            cooling_supply_system,
            heating_emission_system,
            cooling_emission_system,
            lighting,
        })
    }

    pub fn window_area(&self) -> f64 {
        self.window_area
    }

    pub fn floor_area(&self) -> f64 {
        self.floor_area
    }

    fn node_shares(&self) -> NodeShares {
        NodeShares {
            surface: 1. - (self.mass_area / self.a_t) - (self.h_tr_w / (H_MS * self.a_t)),
            mass: self.mass_area / self.a_t,
        }
    }

    /// Solve the energy balance for one hour.
    ///
    /// Arguments:
    /// * `internal_gains` - gains from occupants and appliances, in W
    /// * `solar_gains` - solar gains through glazing, in W
    /// * `t_out` - outdoor air temperature, in Celsius
    /// * `t_m_prev` - mass node temperature at the end of the previous hour, in Celsius
    pub fn solve_energy(
        &self,
        internal_gains: f64,
        solar_gains: f64,
        t_out: f64,
        t_m_prev: f64,
    ) -> ZoneStep {
        let free_running = self.calc_temperatures_crank_nicolson(
            0.,
            self.heating_emission_system,
            internal_gains,
            solar_gains,
            t_out,
            t_m_prev,
        );

        let (demand, t_air_set, emission_system, supply_system) = if free_running.t_air
            < self.t_set_heating
        {
            (
                Demand::Heating,
                self.t_set_heating,
                self.heating_emission_system,
                self.heating_supply_system,
            )
        } else if free_running.t_air > self.t_set_cooling {
            (
                Demand::Cooling,
                self.t_set_cooling,
                self.cooling_emission_system,
                self.cooling_supply_system,
            )
        } else {
            return ZoneStep {
                temperatures: free_running,
                heating_demand: 0.,
                cooling_demand: 0.,
                supply: SupplyEnergy::default(),
                cop: 0.,
            };
        };

        // ISO 13790 C.4.2: apply the trial power and interpolate to the setpoint
        let t_air_0 = free_running.t_air;
        let energy_trial = TRIAL_POWER_PER_FLOOR_AREA * self.floor_area;
        let t_air_10 = self
            .calc_temperatures_crank_nicolson(
                energy_trial,
                emission_system,
                internal_gains,
                solar_gains,
                t_out,
                t_m_prev,
            )
            .t_air;
        let energy_demand_unrestricted =
            energy_trial * (t_air_set - t_air_0) / (t_air_10 - t_air_0);

        let energy_demand =
            energy_demand_unrestricted.clamp(self.max_cooling_energy, self.max_heating_energy);

        let temperatures = self.calc_temperatures_crank_nicolson(
            energy_demand,
            emission_system,
            internal_gains,
            solar_gains,
            t_out,
            t_m_prev,
        );
        let flows = emission_system.heat_flows(self.node_shares(), energy_demand);
        let supply = supply_system.supply(energy_demand, t_out, &flows);

        ZoneStep {
            temperatures,
            heating_demand: if demand == Demand::Heating {
                energy_demand
            } else {
                0.
            },
            cooling_demand: if demand == Demand::Cooling {
                energy_demand
            } else {
                0.
            },
            cop: supply.cop(energy_demand),
            supply,
        }
    }

    /// Lighting energy for the hour, in Wh
    ///
    /// Arguments:
    /// * `illuminance` - daylight entering through the glazing, in lumen
    /// * `occupancy` - number of occupants present
    pub fn solve_lighting(&self, illuminance: f64, occupancy: f64) -> f64 {
        let lux = (illuminance
            * self.lighting.utilisation_factor
            * self.lighting.maintenance_factor)
            / self.floor_area;

        if lux < self.lighting.control && occupancy > 0. {
            self.lighting.load * self.floor_area
        } else {
            0.
        }
    }

    fn calc_temperatures_crank_nicolson(
        &self,
        energy_demand: f64,
        emission_system: EmissionSystem,
        internal_gains: f64,
        solar_gains: f64,
        t_out: f64,
        t_m_prev: f64,
    ) -> NodeTemperatures {
        let shares = self.node_shares();
        let flows = emission_system.heat_flows(shares, energy_demand);
        let (phi_ia, phi_st, phi_m) =
            self.calc_heat_flow(shares, &flows, internal_gains, solar_gains);

        // supply air is taken straight from outdoors, ISO 13790 9.3.2
        let t_supply = t_out;

        // ISO 13790 C.5
        let phi_m_tot = phi_m
            + self.h_tr_em * t_out
            + self.h_tr_3
                * (phi_st
                    + self.h_tr_w * t_out
                    + self.h_tr_1 * ((phi_ia / self.h_ve_adj) + t_supply))
                / self.h_tr_2;

        // ISO 13790 C.4
        let c_m_hourly = self.c_m / SECONDS_PER_HOUR as f64;
        let t_m_next = ((t_m_prev * (c_m_hourly - 0.5 * (self.h_tr_3 + self.h_tr_em))) + phi_m_tot)
            / (c_m_hourly + 0.5 * (self.h_tr_3 + self.h_tr_em));

        // ISO 13790 C.9
        let t_m = (t_m_next + t_m_prev) / 2.;

        // ISO 13790 C.10
        let t_s = (self.h_tr_ms * t_m
            + phi_st
            + self.h_tr_w * t_out
            + self.h_tr_1 * (t_supply + phi_ia / self.h_ve_adj))
            / (self.h_tr_ms + self.h_tr_w + self.h_tr_1);

        // ISO 13790 C.11
        let t_air = (self.h_tr_is * t_s + self.h_ve_adj * t_supply + phi_ia)
            / (self.h_tr_is + self.h_ve_adj);

        NodeTemperatures {
            t_m_next,
            t_m,
            t_s,
            t_air,
        }
    }

    /// Heat flows into the air, surface and mass nodes, in W
    fn calc_heat_flow(
        &self,
        shares: NodeShares,
        flows: &EmissionFlows,
        internal_gains: f64,
        solar_gains: f64,
    ) -> (f64, f64, f64) {
        let radiant_gains = 0.5 * internal_gains + solar_gains;

        (
            0.5 * internal_gains + flows.phi_ia_plus,
            shares.surface * radiant_gains + flows.phi_st_plus,
            shares.mass * radiant_gains + flows.phi_m_plus,
        )
    }
}

fn validate(config: &ZoneConfig) -> HeatDemandResult<()> {
    let invalid = |message: String| Err(HeatDemandError::InvalidConfiguration(message));

    for (name, value) in [
        ("floor area", config.floor_area),
        ("room volume", config.room_vol),
        ("total internal area", config.total_internal_area),
        (
            "thermal capacitance per floor area",
            config.thermal_capacitance_per_floor_area,
        ),
        ("total air changes", config.ach_vent + config.ach_infl),
    ] {
        if value.is_nan() || value <= 0. {
            return invalid(format!("{name} must be positive, got {value}"));
        }
    }
    for (name, value) in [
        ("window area", config.window_area),
        ("walls area", config.walls_area),
        ("wall U-value", config.u_walls),
        ("window U-value", config.u_windows),
        ("ventilation air changes", config.ach_vent),
        ("infiltration air changes", config.ach_infl),
    ] {
        if value.is_nan() || value < 0. {
            return invalid(format!("{name} must not be negative, got {value}"));
        }
    }
    if !(0. ..=1.).contains(&config.ventilation_efficiency) {
        return invalid(format!(
            "ventilation efficiency must be between 0 and 1, got {}",
            config.ventilation_efficiency
        ));
    }
    if config.t_set_heating > config.t_set_cooling {
        return invalid(format!(
            "heating setpoint {} is above cooling setpoint {}",
            config.t_set_heating, config.t_set_cooling
        ));
    }
    if config.max_heating_energy_per_floor_area.is_some_and(|max| max.is_nan() || max < 0.) {
        return invalid("maximum heating energy must not be negative".into());
    }
    if config.max_cooling_energy_per_floor_area.is_some_and(|max| max.is_nan() || max > 0.) {
        return invalid("maximum cooling energy must not be positive".into());
    }
    Ok(())
}
