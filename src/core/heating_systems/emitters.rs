use serde::Deserialize;
use strum::{Display, EnumIter};

/// How heating or cooling energy is delivered to the zone. Each emitter splits the
/// delivered energy between the air, surface and mass nodes of the RC network.
#[derive(Clone, Copy, Debug, Deserialize, Display, EnumIter, Eq, PartialEq)]
pub enum EmissionSystem {
    /// radiators with high supply temperature, emitting to the air node
    OldRadiators,
    /// radiators with medium supply temperature, emitting to the air node
    NewRadiators,
    ChilledBeams,
    /// air-based unit, emitting to the air node as in ISO 13790 Annex C
    AirConditioning,
    /// emitting to the surface and mass nodes in proportion to their areas
    FloorHeating,
    /// thermally activated building structure, emitting to the mass node only
    #[serde(alias = "TABS")]
    Tabs,
}

/// Share of solar and radiant gains received by the surface and mass nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeShares {
    pub surface: f64,
    pub mass: f64,
}

/// Additional heat flows into each node (W) and emitter water temperatures (Celsius).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EmissionFlows {
    pub phi_ia_plus: f64,
    pub phi_st_plus: f64,
    pub phi_m_plus: f64,
    pub heating_supply_temperature: f64,
    pub heating_return_temperature: f64,
    pub cooling_supply_temperature: f64,
    pub cooling_return_temperature: f64,
}

impl EmissionSystem {
    /// Arguments:
    /// * `shares` - surface and mass node shares of the zone
    /// * `energy_demand` - heating (positive) or cooling (negative) energy delivered, in W
    pub fn heat_flows(&self, shares: NodeShares, energy_demand: f64) -> EmissionFlows {
        let (phi_ia_plus, phi_st_plus, phi_m_plus) = match self {
            Self::OldRadiators
            | Self::NewRadiators
            | Self::ChilledBeams
            | Self::AirConditioning => {
                (energy_demand, 0., 0.)
            }
            Self::FloorHeating => (
                0.,
                shares.surface * energy_demand,
                shares.mass * energy_demand,
            ),
            Self::Tabs => (0., 0., energy_demand),
        };
        let (heating_supply_temperature, heating_return_temperature) = match self {
            Self::OldRadiators => (65., 45.),
            Self::NewRadiators | Self::ChilledBeams | Self::Tabs => (50., 35.),
            Self::AirConditioning => (40., 20.),
            Self::FloorHeating => (40., 35.),
        };
        let (cooling_supply_temperature, cooling_return_temperature) = match self {
            Self::ChilledBeams => (18., 21.),
            Self::AirConditioning => (6., 15.),
            _ => (12., 21.),
        };

        EmissionFlows {
            phi_ia_plus,
            phi_st_plus,
            phi_m_plus,
            heating_supply_temperature,
            heating_return_temperature,
            cooling_supply_temperature,
            cooling_return_temperature,
        }
    }
}
