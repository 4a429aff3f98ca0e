pub mod core;
pub mod errors;
pub mod external_conditions;
pub mod input;
pub mod output;
pub mod read_weather_file;
pub mod simulation;
pub mod simulation_time;
pub mod statistics;
pub mod stock;

use crate::core::occupancy::OccupancyProfile;
use crate::core::units::watt_hours_to_kilowatt_hours;
use crate::external_conditions::WeatherProvider;
use crate::input::{read_stock, SimulationParameters};
use crate::output::Output;
use crate::simulation::HourlyResults;
use crate::statistics::StockSummary;
pub use crate::stock::{BuildingHeatDemand, StockHeatDemandAggregator, StockResult};
use anyhow::Context;
use csv::WriterBuilder;
use std::io::Read;
use tracing::info;

pub const RESULTS_OUTPUT_KEY: &str = "results";

/// Simulate every building of a stock table and write the annual results, and with
/// `hourly` the full hourly results of each building, to `output`.
pub fn run_stock<W: WeatherProvider>(
    stock: impl Read,
    weather: &W,
    occupancy: &OccupancyProfile,
    parameters: &SimulationParameters,
    output: impl Output,
    hourly: bool,
) -> anyhow::Result<StockResult> {
    parameters.check()?;

    let records = read_stock(stock).context("Could not read stock table")?;
    let aggregator = StockHeatDemandAggregator::new(weather, occupancy, parameters);
    let result = aggregator.simulate_stock(&records)?;

    if let Some(summary) = StockSummary::from_result(&result) {
        info!(
            "Annual heat demand of {} buildings: total {:.0} kWh, mean {:.0} kWh, median {:.0} kWh, 90th percentile {:.0} kWh, max {:.0} kWh",
            summary.buildings,
            summary.total,
            summary.mean,
            summary.median,
            summary.percentile_90,
            summary.max
        );
    }

    if output.is_noop() {
        return Ok(result);
    }

    write_stock_results_file(&output, &result)?;

    if hourly {
        for (row, record) in records.iter().enumerate() {
            let hourly_results = aggregator.simulate_building_hourly(row, record)?;
            info!(
                "Building {row}: heating {:.0} kWh, cooling {:.0} kWh, lighting {:.0} kWh",
                watt_hours_to_kilowatt_hours(hourly_results.annual_heating_demand()),
                watt_hours_to_kilowatt_hours(hourly_results.annual_cooling_demand()),
                watt_hours_to_kilowatt_hours(hourly_results.annual_lighting_demand())
            );
            write_hourly_results_file(
                &output,
                &format!("building_{row}_hourly"),
                &hourly_results,
            )?;
        }
    }

    Ok(result)
}

fn write_stock_results_file(output: &impl Output, result: &StockResult) -> anyhow::Result<()> {
    info!("writing out to {RESULTS_OUTPUT_KEY}");
    let writer = output.writer_for_location_key(RESULTS_OUTPUT_KEY)?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record(["Row", "Annual heat demand", "Main system energy"])?;
    writer.write_record(["[count]", "[kWh]", "[kWh]"])?;

    for building in result.buildings() {
        writer.write_record([
            building.row.to_string(),
            watt_hours_to_kilowatt_hours(building.annual_heat_demand).to_string(),
            building
                .main_system_energy
                .map(|energy| watt_hours_to_kilowatt_hours(energy).to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

fn write_hourly_results_file(
    output: &impl Output,
    output_key: &str,
    results: &HourlyResults,
) -> anyhow::Result<()> {
    let writer = output.writer_for_location_key(output_key)?;
    let mut writer = WriterBuilder::new().flexible(true).from_writer(writer);

    writer.write_record([
        "Hour",
        "Occupancy",
        "Internal gains",
        "Solar gains",
        "Outdoor temperature",
        "Mass temperature",
        "Air temperature",
        "Operative temperature",
        "Heating demand",
        "Cooling demand",
        "Lighting demand",
        "Electricity in",
        "Fossils in",
        "COP",
    ])?;
    writer.write_record([
        "[count]", "[people]", "[W]", "[W]", "[deg C]", "[deg C]", "[deg C]", "[deg C]", "[Wh]",
        "[Wh]", "[Wh]", "[Wh]", "[Wh]", "[ratio]",
    ])?;

    for hour in results.hours() {
        writer.write_record([
            hour.hour.to_string(),
            hour.occupancy.to_string(),
            hour.internal_gains.to_string(),
            hour.solar_gains.to_string(),
            hour.t_out.to_string(),
            hour.t_m_next.to_string(),
            hour.t_air.to_string(),
            hour.t_operative.to_string(),
            hour.heating_demand.to_string(),
            hour.cooling_demand.to_string(),
            hour.lighting_demand.to_string(),
            hour.supply.electricity_in.to_string(),
            hour.supply.fossils_in.to_string(),
            hour.cop.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::units::HOURS_PER_YEAR;
    use crate::errors::HeatDemandError;
    use crate::external_conditions::tests::ConstantWeather;
    use crate::external_conditions::HourlyWeather;
    use crate::input::tests::STOCK_HEADER;
    use crate::output::{FileOutput, SinkOutput};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;
    use std::path::PathBuf;

    #[fixture]
    fn weather() -> ConstantWeather {
        ConstantWeather {
            hours: HOURS_PER_YEAR,
            weather: HourlyWeather {
                air_temperature: 2.,
                ..Default::default()
            },
        }
    }

    #[fixture]
    fn occupancy() -> OccupancyProfile {
        OccupancyProfile::new(vec![1.; HOURS_PER_YEAR])
    }

    #[fixture]
    fn stock() -> String {
        format!(
            "{STOCK_HEADER}\n\
             110,18,55,2.6,2.5,,,0.8,0.5,2.8,0,Medium\n\
             90,10,40,2.4,,,,0.9,0.3,1.4,0.7,High\n"
        )
    }

    fn output_directory(name: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(format!(
            "stock-heat-{name}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&directory).unwrap();
        directory
    }

    #[rstest]
    fn should_write_annual_results_in_stock_order(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        stock: String,
    ) {
        let directory = output_directory("annual");
        let output = FileOutput::new(directory.clone(), "stock_{}.csv".to_string());

        let result = run_stock(
            stock.as_bytes(),
            &weather,
            &occupancy,
            &SimulationParameters::default(),
            &output,
            false,
        )
        .unwrap();

        let written = fs::read_to_string(directory.join("stock_results.csv")).unwrap();
        let lines = written.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Row,Annual heat demand,Main system energy");
        assert!(lines[2].starts_with("0,"));
        assert!(lines[3].starts_with("1,"));
        assert_eq!(result.len(), 2);
        assert!(!directory.join("stock_building_0_hourly.csv").exists());
        fs::remove_dir_all(directory).unwrap();
    }

    #[rstest]
    fn should_write_hourly_results_per_building(
        weather: ConstantWeather,
        occupancy: OccupancyProfile,
        stock: String,
    ) {
        let directory = output_directory("hourly");
        let output = FileOutput::new(directory.clone(), "stock_{}.csv".to_string());

        run_stock(
            stock.as_bytes(),
            &weather,
            &occupancy,
            &SimulationParameters::default(),
            &output,
            true,
        )
        .unwrap();

        for row in 0..2 {
            let written =
                fs::read_to_string(directory.join(format!("stock_building_{row}_hourly.csv")))
                    .unwrap();
            assert_eq!(written.lines().count(), HOURS_PER_YEAR + 2);
        }
        fs::remove_dir_all(directory).unwrap();
    }

    #[rstest]
    fn should_surface_failing_building(weather: ConstantWeather, occupancy: OccupancyProfile) {
        let stock = format!("{STOCK_HEADER}\n110,18,55,2.6,2.5,,,0.8,0.5,2.8,0,Heavy\n");

        let error = run_stock(
            stock.as_bytes(),
            &weather,
            &occupancy,
            &SimulationParameters::default(),
            SinkOutput,
            false,
        )
        .unwrap_err();

        let error = error.downcast_ref::<HeatDemandError>().unwrap();
        assert_eq!(error.row(), Some(0));
        assert!(matches!(
            error.root(),
            HeatDemandError::UnknownCategory { .. }
        ));
    }
}
