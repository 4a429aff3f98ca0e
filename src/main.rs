extern crate stock_heat;

use anyhow::Context;
use clap::{Args, Parser};
use stock_heat::core::occupancy::OccupancyProfile;
use stock_heat::input::SimulationParameters;
use stock_heat::output::FileOutput;
use stock_heat::read_weather_file::weather_data_from_path;
use stock_heat::run_stock;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct StockArgs {
    /// Stock table, one building per row
    stock_file: String,
    #[command(flatten)]
    profiles: ProfileFiles,
    /// Simulation parameters as JSON; defaults are used when absent
    #[arg(long, short)]
    config: Option<String>,
    /// Directory for result files; defaults to the directory of the stock table
    #[arg(long, short)]
    output_dir: Option<String>,
    /// Also write the hourly results of every building
    #[arg(long, default_value_t = false)]
    hourly: bool,
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

#[derive(Args, Clone, Default, Debug)]
struct ProfileFiles {
    #[arg(long, short)]
    epw_file: String,
    #[arg(long = "occupancy-file", short = 'p')]
    occupancy_file: String,
}

fn main() -> anyhow::Result<()> {
    let args = StockArgs::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let stock_file = Path::new(args.stock_file.as_str());
    let stock_file_stem = stock_file
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("stock");
    let output_dir = match args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => stock_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let output = FileOutput::new(output_dir, format!("{stock_file_stem}_{{}}.csv"));

    let parameters = match args.config {
        Some(config) => SimulationParameters::from_json(BufReader::new(
            File::open(&config).with_context(|| format!("Could not open config file {config}"))?,
        ))
        .with_context(|| format!("Could not load config file {config}"))?,
        None => SimulationParameters::default(),
    };

    let weather = weather_data_from_path(Path::new(&args.profiles.epw_file))
        .context("Could not parse the weather file")?;
    let occupancy = OccupancyProfile::from_path(Path::new(&args.profiles.occupancy_file))
        .context("Could not parse the occupancy file")?;

    run_stock(
        BufReader::new(
            File::open(stock_file)
                .with_context(|| format!("Could not open stock file {}", args.stock_file))?,
        ),
        &weather,
        &occupancy,
        &parameters,
        output,
        args.hourly,
    )?;

    Ok(())
}
