use crate::core::heating_systems::emitters::EmissionSystem;
use crate::core::heating_systems::supply::SupplySystem;
use crate::core::space_heat_demand::zone::LightingConfig;
use crate::errors::{HeatDemandError, HeatDemandResult};
use crate::external_conditions::SolarSite;
use csv::{ReaderBuilder as CsvReaderBuilder, Trim};
use itertools::Itertools;
use serde::Deserialize;
use serde_valid::Validate;
use std::io::Read;

/// Columns a stock table must carry.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "WallArea",
    "WindowArea",
    "GroundFloorArea",
    "GroundFloorHeight",
    "FirstFloorHeight",
    "SecondFloorHeight",
    "ThirdFloorHeight",
    "HSMainSystemEfficiency",
    "UValueWall",
    "UValueWindow",
    "HeatExchangerEff",
    "ThermalMassCategory",
];

/// One building of the stock table.
///
/// Areas in m2, heights in m, U-values in W/(m2.K), efficiencies as fractions.
/// Upper storey heights may be left empty for buildings without that storey.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BuildingRecord {
    pub wall_area: f64,
    pub window_area: f64,
    pub ground_floor_area: f64,
    pub ground_floor_height: f64,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub first_floor_height: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub second_floor_height: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub third_floor_height: Option<f64>,
    #[serde(rename = "HSMainSystemEfficiency")]
    pub hs_main_system_efficiency: f64,
    pub u_value_wall: f64,
    pub u_value_window: f64,
    pub heat_exchanger_eff: f64,
    pub thermal_mass_category: String,
}

impl BuildingRecord {
    /// Walls, windows and ground floor, in m2
    pub fn total_internal_area(&self) -> f64 {
        self.wall_area + self.window_area + self.ground_floor_area
    }

    /// Sum of all storey heights, in m
    pub fn building_height(&self) -> f64 {
        self.ground_floor_height
            + self.first_floor_height.unwrap_or_default()
            + self.second_floor_height.unwrap_or_default()
            + self.third_floor_height.unwrap_or_default()
    }

    /// in m3
    pub fn building_volume(&self) -> f64 {
        self.building_height() * self.ground_floor_area
    }
}

/// Fail if any required column is absent from the stock table header.
pub fn check_schema<'a>(headers: impl IntoIterator<Item = &'a str>) -> HeatDemandResult<()> {
    let headers = headers.into_iter().map(str::trim).collect_vec();
    let missing = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.contains(column))
        .map(|column| column.to_string())
        .collect_vec();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(HeatDemandError::SchemaViolation { missing })
    }
}

/// Read a stock table (CSV with header row). The header is checked against
/// [`REQUIRED_COLUMNS`] before any row is read; extra columns are ignored.
pub fn read_stock(reader: impl Read) -> HeatDemandResult<Vec<BuildingRecord>> {
    let mut reader = CsvReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    check_schema(reader.headers()?.iter())?;

    reader
        .deserialize::<BuildingRecord>()
        .enumerate()
        .map(|(row, record)| record.map_err(|e| HeatDemandError::from(e).for_row(row)))
        .collect()
}

/// Zone options applied to every building of the stock.
#[derive(Clone, Debug, Deserialize, PartialEq, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct ZoneDefaults {
    #[validate(minimum = 0.)]
    pub ach_vent: f64,
    #[validate(minimum = 0.)]
    pub ach_infl: f64,
    pub t_set_heating: f64,
    pub t_set_cooling: f64,
    /// in W/m2, unbounded when absent
    pub max_heating_energy_per_floor_area: Option<f64>,
    /// in W/m2, negative, unbounded when absent
    pub max_cooling_energy_per_floor_area: Option<f64>,
    pub heating_supply_system: SupplySystem,
    pub cooling_supply_system: SupplySystem,
    pub heating_emission_system: EmissionSystem,
    pub cooling_emission_system: EmissionSystem,
    pub lighting: LightingConfig,
}

impl Default for ZoneDefaults {
    fn default() -> Self {
        Self {
            ach_vent: 1.5,
            ach_infl: 0.5,
            t_set_heating: 20.,
            t_set_cooling: 26.,
            max_heating_energy_per_floor_area: None,
            max_cooling_energy_per_floor_area: None,
            heating_supply_system: SupplySystem::OilBoilerMed,
            cooling_supply_system: SupplySystem::HeatPumpAir,
            heating_emission_system: EmissionSystem::NewRadiators,
            cooling_emission_system: EmissionSystem::AirConditioning,
            lighting: LightingConfig::default(),
        }
    }
}

/// Glazing applied to every building of the stock: a single south-facing vertical
/// window.
#[derive(Clone, Debug, Deserialize, PartialEq, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct WindowDefaults {
    pub azimuth_tilt: f64,
    pub altitude_tilt: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub glass_solar_transmittance: f64,
    #[validate(minimum = 0.)]
    #[validate(maximum = 1.)]
    pub glass_light_transmittance: f64,
    /// Fixed window area in m2. When absent the stock row's window area is used.
    pub area: Option<f64>,
}

impl Default for WindowDefaults {
    fn default() -> Self {
        Self {
            azimuth_tilt: 0.,
            altitude_tilt: 90.,
            glass_solar_transmittance: 0.7,
            glass_light_transmittance: 0.8,
            area: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationParameters {
    /// in W per occupant
    #[validate(minimum = 0.)]
    pub gain_per_person: f64,
    /// in W/m2 of floor area
    #[validate(minimum = 0.)]
    pub appliance_gains: f64,
    #[validate(minimum = 0.)]
    pub max_occupancy: f64,
    pub site: SolarSite,
    #[validate]
    pub zone: ZoneDefaults,
    #[validate]
    pub window: WindowDefaults,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            gain_per_person: 100.,
            appliance_gains: 14.,
            max_occupancy: 3.,
            site: Default::default(),
            zone: Default::default(),
            window: Default::default(),
        }
    }
}

impl SimulationParameters {
    /// Read parameters from JSON. Options not given take their default value.
    pub fn from_json(json: impl Read) -> HeatDemandResult<Self> {
        let parameters: Self = serde_json::from_reader(json).map_err(|e| {
            HeatDemandError::InvalidConfiguration(format!("could not read parameters: {e}"))
        })?;
        parameters.check()?;
        Ok(parameters)
    }

    pub fn check(&self) -> HeatDemandResult<()> {
        self.validate()
            .map_err(|e| HeatDemandError::InvalidConfiguration(e.to_string()))?;
        self.site.validate()
    }
}
