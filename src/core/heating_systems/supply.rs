use crate::core::heating_systems::emitters::EmissionFlows;
use serde::Deserialize;
use strum::{Display, EnumIter};

/// Source temperature of water-source heat pumps, in Celsius
const WATER_SOURCE_TEMPERATURE: f64 = 10.;

/// Plant converting final energy into the heating or cooling demanded by the zone.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, PartialEq)]
pub enum SupplySystem {
    OilBoilerOld,
    OilBoilerMed,
    OilBoilerNew,
    HeatPumpAir,
    HeatPumpWater,
    ElectricHeating,
    DirectHeater,
    DirectCooler,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SupplyEnergy {
    /// electricity drawn, in W
    pub electricity_in: f64,
    /// fossil fuel burnt, in W
    pub fossils_in: f64,
}

impl SupplyEnergy {
    pub fn total(&self) -> f64 {
        self.electricity_in + self.fossils_in
    }

    /// Delivered heat or cold per unit of final energy. Zero when nothing is supplied.
    pub fn cop(&self, load: f64) -> f64 {
        match self.total() {
            total if total > 0. => load.abs() / total,
            _ => 0.,
        }
    }
}

impl SupplySystem {
    /// Final energy needed to cover a load.
    ///
    /// Arguments:
    /// * `load` - heating (positive) or cooling (negative) energy demand, in W
    /// * `t_out` - outdoor air temperature, in Celsius
    /// * `flows` - emitter flows, giving the supply temperature the plant must reach
    pub fn supply(&self, load: f64, t_out: f64, flows: &EmissionFlows) -> SupplyEnergy {
        let load_abs = load.abs();
        match self {
            Self::OilBoilerOld => boiler(load_abs, 0.63),
            Self::OilBoilerMed => boiler(load_abs, 0.82),
            Self::OilBoilerNew => boiler(load_abs, 0.98),
            Self::HeatPumpAir => {
                let lift = temperature_lift(load, t_out, flows);
                heat_pump(load_abs, air_source_cop(lift))
            }
            Self::HeatPumpWater => {
                let lift = temperature_lift(load, WATER_SOURCE_TEMPERATURE, flows);
                heat_pump(load_abs, water_source_cop(lift))
            }
            Self::ElectricHeating | Self::DirectHeater | Self::DirectCooler => SupplyEnergy {
                electricity_in: load_abs,
                fossils_in: 0.,
            },
        }
    }
}

fn boiler(load: f64, efficiency: f64) -> SupplyEnergy {
    SupplyEnergy {
        electricity_in: 0.,
        fossils_in: load / efficiency,
    }
}

fn heat_pump(load: f64, cop: f64) -> SupplyEnergy {
    SupplyEnergy {
        electricity_in: load / cop,
        fossils_in: 0.,
    }
}

/// Temperature difference the heat pump works across, in K
fn temperature_lift(load: f64, t_source: f64, flows: &EmissionFlows) -> f64 {
    if load >= 0. {
        (flows.heating_supply_temperature - t_source).max(0.)
    } else {
        (t_source - flows.cooling_supply_temperature).max(0.)
    }
}

fn air_source_cop(lift: f64) -> f64 {
    (6.81 - 0.121 * lift + 0.000630 * lift.powi(2)).max(1.)
}

fn water_source_cop(lift: f64) -> f64 {
    (8.94 - 0.189 * lift + 0.00139 * lift.powi(2)).max(1.)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heating_systems::emitters::{EmissionSystem, NodeShares};
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use strum::IntoEnumIterator;

    #[fixture]
    fn radiator_flows() -> EmissionFlows {
        EmissionSystem::NewRadiators.heat_flows(
            NodeShares {
                surface: 0.3,
                mass: 0.6,
            },
            1000.,
        )
    }

    #[rstest]
    fn should_burn_fuel_in_boiler(radiator_flows: EmissionFlows) {
        let energy = SupplySystem::OilBoilerMed.supply(820., 5., &radiator_flows);

        assert_eq!(energy.electricity_in, 0.);
        assert_relative_eq!(energy.fossils_in, 1000.);
        assert_relative_eq!(energy.cop(820.), 0.82);
    }

    #[rstest]
    fn should_use_air_temperature_lift_for_air_source_heat_pump(radiator_flows: EmissionFlows) {
        // supply at 50C from air at 5C: lift of 45K
        let expected_cop = 6.81 - 0.121 * 45. + 0.000630 * 45. * 45.;

        let energy = SupplySystem::HeatPumpAir.supply(1000., 5., &radiator_flows);

        assert_eq!(energy.fossils_in, 0.);
        assert_relative_eq!(energy.electricity_in, 1000. / expected_cop);
        assert_relative_eq!(energy.cop(1000.), expected_cop);
    }

    #[rstest]
    fn should_cool_with_heat_pump_across_outdoor_lift() {
        let flows = EmissionSystem::AirConditioning.heat_flows(
            NodeShares {
                surface: 0.3,
                mass: 0.6,
            },
            -500.,
        );
        // outdoor air at 30C rejecting heat from supply at 6C
        let expected_cop = 6.81 - 0.121 * 24. + 0.000630 * 24. * 24.;

        let energy = SupplySystem::HeatPumpAir.supply(-500., 30., &flows);

        assert_relative_eq!(energy.electricity_in, 500. / expected_cop);
    }

    #[rstest]
    fn should_supply_nothing_without_load(radiator_flows: EmissionFlows) {
        for system in SupplySystem::iter() {
            let energy = system.supply(0., 5., &radiator_flows);
            assert_eq!(energy.total(), 0., "{system} drew energy without load");
            assert_eq!(energy.cop(0.), 0.);
        }
    }
}
