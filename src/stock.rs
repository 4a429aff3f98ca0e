use crate::core::occupancy::OccupancyProfile;
use crate::core::space_heat_demand::internal_gains::InternalGains;
use crate::core::space_heat_demand::thermal_mass;
use crate::core::space_heat_demand::window::{Window, WindowConfig};
use crate::core::space_heat_demand::zone::{Zone, ZoneConfig};
use crate::errors::HeatDemandResult;
use crate::external_conditions::WeatherProvider;
use crate::input::{read_stock, BuildingRecord, SimulationParameters};
use crate::simulation::{HourlyEnergyBalanceSimulator, HourlyResults};
use rayon::prelude::*;
use std::io::Read;
use tracing::{debug, info, warn};

// Largest distance between sun-position site and weather station accepted silently, in degrees
const SITE_OFFSET_WARNING_THRESHOLD: f64 = 1.;

/// Annual result for one row of the stock table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingHeatDemand {
    /// position of the building in the stock table, counting data rows from 0
    pub row: usize,
    /// in Wh
    pub annual_heat_demand: f64,
    /// energy delivered to the main heating system, in Wh. `None` when the row's
    /// system efficiency is not positive.
    pub main_system_energy: Option<f64>,
}

fn main_system_energy(row: usize, annual_heat_demand: f64, efficiency: f64) -> Option<f64> {
    if efficiency.is_nan() || efficiency <= 0. {
        warn!(
            "Building at stock row {row} has main heating system efficiency {efficiency}; main system energy is left empty"
        );
        return None;
    }

    Some(annual_heat_demand / efficiency)
}

/// Annual results of a stock, position i holding the result for stock row i.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StockResult {
    buildings: Vec<BuildingHeatDemand>,
}

impl StockResult {
    pub fn from_buildings(buildings: Vec<BuildingHeatDemand>) -> Self {
        Self { buildings }
    }

    pub fn buildings(&self) -> &[BuildingHeatDemand] {
        &self.buildings
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    /// Annual heat demand per building in stock row order, in Wh
    pub fn annual_heat_demands(&self) -> Vec<f64> {
        self.buildings
            .iter()
            .map(|building| building.annual_heat_demand)
            .collect()
    }

    /// in Wh
    pub fn total_heat_demand(&self) -> f64 {
        self.buildings
            .iter()
            .map(|building| building.annual_heat_demand)
            .sum()
    }
}

/// Simulates every building of a stock against one weather file and one occupancy
/// archetype.
#[derive(Debug)]
pub struct StockHeatDemandAggregator<'a, W: WeatherProvider> {
    simulator: HourlyEnergyBalanceSimulator<'a, W>,
    parameters: &'a SimulationParameters,
}

impl<'a, W: WeatherProvider> StockHeatDemandAggregator<'a, W> {
    pub fn new(
        weather: &'a W,
        occupancy: &'a OccupancyProfile,
        parameters: &'a SimulationParameters,
    ) -> Self {
        if let Some((latitude, longitude)) = weather.location() {
            let offset = parameters.site.offset_from(latitude, longitude);
            if offset > SITE_OFFSET_WARNING_THRESHOLD {
                warn!(
                    "Sun position is calculated for latitude {}, longitude {} which is {offset:.2} degrees away from the weather data location (latitude {latitude}, longitude {longitude})",
                    parameters.site.latitude, parameters.site.longitude
                );
            }
        }

        let internal_gains = InternalGains::new(
            parameters.gain_per_person,
            parameters.appliance_gains,
            parameters.max_occupancy,
        );

        Self {
            simulator: HourlyEnergyBalanceSimulator::new(
                weather,
                occupancy,
                internal_gains,
                parameters.site,
            ),
            parameters,
        }
    }

    /// Zone of a building, geometry and fabric from the stock row and everything else
    /// from the simulation parameters.
    pub fn zone_config(&self, record: &BuildingRecord) -> HeatDemandResult<ZoneConfig> {
        let zone = &self.parameters.zone;

        Ok(ZoneConfig {
            window_area: record.window_area,
            walls_area: record.wall_area,
            floor_area: record.ground_floor_area,
            room_vol: record.building_volume(),
            total_internal_area: record.total_internal_area(),
            u_walls: record.u_value_wall,
            u_windows: record.u_value_window,
            ach_vent: zone.ach_vent,
            ach_infl: zone.ach_infl,
            ventilation_efficiency: record.heat_exchanger_eff,
            thermal_capacitance_per_floor_area: thermal_mass::lookup(
                &record.thermal_mass_category,
            )?,
            t_set_heating: zone.t_set_heating,
            t_set_cooling: zone.t_set_cooling,
            max_heating_energy_per_floor_area: zone.max_heating_energy_per_floor_area,
            max_cooling_energy_per_floor_area: zone.max_cooling_energy_per_floor_area,
            heating_supply_system: zone.heating_supply_system,
            cooling_supply_system: zone.cooling_supply_system,
            heating_emission_system: zone.heating_emission_system,
            cooling_emission_system: zone.cooling_emission_system,
            lighting: zone.lighting,
        })
    }

    pub fn window_config(&self, record: &BuildingRecord) -> WindowConfig {
        let window = &self.parameters.window;

        WindowConfig {
            azimuth_tilt: window.azimuth_tilt,
            altitude_tilt: window.altitude_tilt,
            glass_solar_transmittance: window.glass_solar_transmittance,
            glass_light_transmittance: window.glass_light_transmittance,
            area: window.area.unwrap_or(record.window_area),
        }
    }

    fn build(&self, record: &BuildingRecord) -> HeatDemandResult<(Zone, Window)> {
        let zone = Zone::new(self.zone_config(record)?)?;
        let window = Window::new(self.window_config(record))?;
        Ok((zone, window))
    }

    /// Annual heat demand of the building at stock row `row`. Any failure is
    /// reported against that row.
    pub fn simulate_building(
        &self,
        row: usize,
        record: &BuildingRecord,
    ) -> HeatDemandResult<BuildingHeatDemand> {
        let annual_heat_demand = self
            .build(record)
            .and_then(|(zone, window)| {
                self.simulator.simulate_annual_heat_demand(&zone, &window)
            })
            .map_err(|e| e.for_row(row))?;
        debug!("Building at stock row {row}: annual heat demand {annual_heat_demand:.0} Wh");

        Ok(BuildingHeatDemand {
            row,
            annual_heat_demand,
            main_system_energy: main_system_energy(
                row,
                annual_heat_demand,
                record.hs_main_system_efficiency,
            ),
        })
    }

    /// Hourly results of the building at stock row `row`.
    pub fn simulate_building_hourly(
        &self,
        row: usize,
        record: &BuildingRecord,
    ) -> HeatDemandResult<HourlyResults> {
        self.build(record)
            .and_then(|(zone, window)| self.simulator.simulate_hourly(&zone, &window))
            .map_err(|e| e.for_row(row))
    }

    /// Simulate every building, in parallel across buildings. Any failing building
    /// aborts the stock run, the error naming the lowest failing row.
    pub fn simulate_stock(&self, records: &[BuildingRecord]) -> HeatDemandResult<StockResult> {
        info!("Simulating {} buildings", records.len());

        let buildings = records
            .par_iter()
            .enumerate()
            .map(|(row, record)| self.simulate_building(row, record))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<HeatDemandResult<Vec<_>>>()?;

        info!("Simulated {} buildings", buildings.len());

        Ok(StockResult::from_buildings(buildings))
    }

    /// Read a stock table and simulate every building in it. A table missing required
    /// columns is rejected before any building is simulated.
    pub fn calculate_annual_stock_heat_demand(
        &self,
        stock: impl Read,
    ) -> HeatDemandResult<StockResult> {
        let records = read_stock(stock)?;
        self.simulate_stock(&records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::HOURS_PER_YEAR;
    use crate::errors::HeatDemandError;
    use crate::external_conditions::tests::ConstantWeather;
    use crate::external_conditions::HourlyWeather;
    use crate::input::tests::STOCK_HEADER;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[fixture]
    fn weather() -> ConstantWeather {
        ConstantWeather {
            hours: HOURS_PER_YEAR,
            weather: HourlyWeather {
                air_temperature: 5.,
                ..Default::default()
            },
        }
    }

    #[fixture]
    fn occupancy() -> OccupancyProfile {
        OccupancyProfile::new(vec![0.5; HOURS_PER_YEAR])
    }

    #[fixture]
    fn parameters() -> SimulationParameters {
        SimulationParameters::default()
    }

    #[fixture]
    fn record() -> BuildingRecord {
        BuildingRecord {
            wall_area: 110.,
            window_area: 18.,
            ground_floor_area: 55.,
            ground_floor_height: 2.6,
            first_floor_height: Some(2.5),
            second_floor_height: None,
            third_floor_height: None,
            hs_main_system_efficiency: 0.8,
            u_value_wall: 0.5,
            u_value_window: 2.8,
            heat_exchanger_eff: 0.,
            thermal_mass_category: "Medium".into(),
        }
    }

    struct CountingWeather {
        inner: ConstantWeather,
        calls: AtomicUsize,
    }

    impl WeatherProvider for CountingWeather {
        fn hours_available(&self) -> usize {
            self.inner.hours_available()
        }

        fn weather_for_hour(&self, hour: usize) -> HeatDemandResult<HourlyWeather> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.weather_for_hour(hour)
        }
    }

    #[rstest]
    fn should_build_zone_from_stock_row(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);

        let zone_config = aggregator.zone_config(&record).unwrap();

        assert_eq!(zone_config.floor_area, 55.);
        assert_eq!(zone_config.walls_area, 110.);
        assert_eq!(zone_config.window_area, 18.);
        assert_relative_eq!(zone_config.room_vol, 5.1 * 55.);
        assert_relative_eq!(zone_config.total_internal_area, 183.);
        assert_eq!(zone_config.thermal_capacitance_per_floor_area, 165_000.);
        assert_eq!(zone_config.ach_vent, 1.5);
        assert_eq!(zone_config.max_heating_energy_per_floor_area, None);
        assert_eq!(aggregator.window_config(&record).area, 18.);
    }

    #[rstest]
    fn should_preserve_stock_row_order(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let records = vec![
            BuildingRecord {
                u_value_wall: 2.0,
                ..record.clone()
            },
            record.clone(),
            BuildingRecord {
                ground_floor_area: 140.,
                thermal_mass_category: "Low".into(),
                ..record.clone()
            },
        ];

        let result = aggregator.simulate_stock(&records).unwrap();

        assert_eq!(result.len(), 3);
        for (row, record) in records.iter().enumerate() {
            assert_eq!(result.buildings()[row].row, row);
            assert_eq!(
                result.buildings()[row],
                aggregator.simulate_building(row, record).unwrap()
            );
        }
        assert!(result.annual_heat_demands()[0] > result.annual_heat_demands()[1]);
        assert_relative_eq!(
            result.total_heat_demand(),
            result.annual_heat_demands().iter().sum::<f64>()
        );
    }

    #[rstest]
    fn should_deliver_demand_through_main_system_efficiency(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);

        let building = aggregator.simulate_building(0, &record).unwrap();

        assert!(building.annual_heat_demand > 0.);
        assert_relative_eq!(
            building.main_system_energy.unwrap(),
            building.annual_heat_demand / 0.8
        );
    }

    #[rstest]
    #[case(0.)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn should_leave_main_system_energy_empty_for_non_positive_efficiency(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
        #[case] efficiency: f64,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let expected_demand = aggregator
            .simulate_building(4, &record)
            .unwrap()
            .annual_heat_demand;
        let record = BuildingRecord {
            hs_main_system_efficiency: efficiency,
            ..record
        };

        let building = aggregator.simulate_building(4, &record).unwrap();

        assert_eq!(building.row, 4);
        assert_eq!(building.annual_heat_demand, expected_demand);
        assert_eq!(building.main_system_energy, None);
    }

    #[rstest]
    fn should_simulate_every_row_when_one_efficiency_is_zero(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let stock = format!(
            "{STOCK_HEADER}\n\
             110,18,55,2.6,2.5,,,0.8,0.5,2.8,0,Medium\n\
             110,18,55,2.6,2.5,,,0,0.5,2.8,0,Medium\n"
        );

        let result = aggregator
            .calculate_annual_stock_heat_demand(stock.as_bytes())
            .unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.buildings()[0].main_system_energy.is_some());
        assert_eq!(result.buildings()[1].main_system_energy, None);
        assert_eq!(
            result.buildings()[1].annual_heat_demand,
            result.buildings()[0].annual_heat_demand
        );
    }

    #[rstest]
    fn should_report_lowest_failing_row(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let unknown = BuildingRecord {
            thermal_mass_category: "Very heavy".into(),
            ..record.clone()
        };
        let mut records = vec![record; 6];
        records[2] = unknown.clone();
        records[5] = unknown;

        for _ in 0..5 {
            let error = aggregator.simulate_stock(&records).unwrap_err();
            assert_eq!(error.row(), Some(2));
        }
    }

    #[rstest]
    fn should_fail_stock_on_unknown_thermal_mass_category(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let records = vec![
            record.clone(),
            BuildingRecord {
                thermal_mass_category: "Very heavy".into(),
                ..record
            },
        ];

        let error = aggregator.simulate_stock(&records).unwrap_err();

        assert_eq!(error.row(), Some(1));
        match error.root() {
            HeatDemandError::UnknownCategory { category } => assert_eq!(category, "Very heavy"),
            other => panic!("expected unknown category, got {other:?}"),
        }
    }

    #[rstest]
    fn should_match_categories_with_surrounding_whitespace(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let padded = BuildingRecord {
            thermal_mass_category: "Medium   ".into(),
            ..record.clone()
        };

        assert_eq!(
            aggregator.simulate_building(0, &padded).unwrap(),
            aggregator.simulate_building(0, &record).unwrap()
        );
    }

    #[rstest]
    fn should_reject_incomplete_stock_before_simulating(
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        weather: ConstantWeather,
    ) {
        let weather = CountingWeather {
            inner: weather,
            calls: AtomicUsize::new(0),
        };
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let stock = "WallArea,WindowArea,GroundFloorArea\n110,18,55\n";

        let result = aggregator.calculate_annual_stock_heat_demand(stock.as_bytes());

        assert!(matches!(
            result,
            Err(HeatDemandError::SchemaViolation { .. })
        ));
        assert_eq!(weather.calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn should_calculate_stock_from_table(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);
        let stock = format!(
            "{STOCK_HEADER}\n\
             110,18,55,2.6,2.5,,,0.8,0.5,2.8,0,Medium\n\
             110,18,55,2.6,2.5,,,0.8,0.5,2.8,0,Medium\n"
        );

        let result = aggregator
            .calculate_annual_stock_heat_demand(stock.as_bytes())
            .unwrap();

        let expected = aggregator.simulate_building(0, &record).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.buildings()[0], expected);
        assert_eq!(
            result.buildings()[1].annual_heat_demand,
            expected.annual_heat_demand
        );
    }

    #[rstest]
    fn should_reject_window_area_diverging_from_fixed_window(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        mut parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        parameters.window.area = Some(4.);
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);

        let error = aggregator.simulate_building(2, &record).unwrap_err();

        assert_eq!(error.row(), Some(2));
        assert!(matches!(
            error.root(),
            HeatDemandError::ConfigurationMismatch {
                window_config_area,
                zone_window_area
            } if *window_config_area == 4. && *zone_window_area == 18.
        ));
    }

    #[rstest]
    fn should_simulate_building_hourly(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        parameters: SimulationParameters,
        record: BuildingRecord,
    ) {
        let aggregator = StockHeatDemandAggregator::new(&weather, &occupancy, &parameters);

        let hourly = aggregator.simulate_building_hourly(0, &record).unwrap();

        assert_eq!(hourly.len(), HOURS_PER_YEAR);
        assert_eq!(
            hourly.annual_heating_demand(),
            aggregator
                .simulate_building(0, &record)
                .unwrap()
                .annual_heat_demand
        );
    }
}
