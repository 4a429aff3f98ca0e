use crate::errors::{HeatDemandError, HeatDemandResult};
use crate::external_conditions::ExternalConditions;
use csv::{ReaderBuilder as CsvReaderBuilder, StringRecord};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const COLUMN_LATITUDE: usize = 6;
const COLUMN_LONGITUDE: usize = 7;
const COLUMN_AIR_TEMP: usize = 6; // dry bulb temp in degrees
const COLUMN_DNI_RAD: usize = 14; // direct beam normal irradiation in Wh/m2
const COLUMN_DIF_RAD: usize = 15; // diffuse irradiation (horizontal plane) in Wh/m2
const COLUMN_DNI_ILLUM: usize = 17; // direct normal illuminance in lux
const COLUMN_DIF_ILLUM: usize = 18; // diffuse horizontal illuminance in lux
const HEADER_ROWS: usize = 8;

fn parse_field(record: &StringRecord, column: usize, line: usize) -> HeatDemandResult<f64> {
    let field = record.get(column).ok_or_else(|| {
        HeatDemandError::InvalidInput(format!(
            "weather file line {} has no column {column}",
            line + 1
        ))
    })?;

    field.trim().parse().map_err(|_| {
        HeatDemandError::InvalidInput(format!(
            "weather file line {}, column {column}: '{field}' is not a number",
            line + 1
        ))
    })
}

/// Read an EnergyPlus weather (EPW) file: the LOCATION header line gives latitude and
/// longitude, and hourly data starts after the eight header lines.
pub fn weather_data_to_vec(file: impl Read) -> HeatDemandResult<ExternalConditions> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(file);

    let mut air_temperatures = vec![];
    let mut dir_norm_rad = vec![];
    let mut diff_hor_rad = vec![];
    let mut dir_norm_illum = vec![];
    let mut diff_hor_illum = vec![];
    let mut location: Option<(f64, f64)> = None;

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        if i == 0 {
            location = Some((
                parse_field(&record, COLUMN_LATITUDE, i)?,
                parse_field(&record, COLUMN_LONGITUDE, i)?,
            ));
        } else if i >= HEADER_ROWS {
            air_temperatures.push(parse_field(&record, COLUMN_AIR_TEMP, i)?);
            dir_norm_rad.push(parse_field(&record, COLUMN_DNI_RAD, i)?);
            diff_hor_rad.push(parse_field(&record, COLUMN_DIF_RAD, i)?);
            dir_norm_illum.push(parse_field(&record, COLUMN_DNI_ILLUM, i)?);
            diff_hor_illum.push(parse_field(&record, COLUMN_DIF_ILLUM, i)?);
        }
    }

    let (latitude, longitude) = location
        .ok_or_else(|| HeatDemandError::InvalidInput("weather file is empty".to_string()))?;

    ExternalConditions::new(
        air_temperatures,
        dir_norm_rad,
        diff_hor_rad,
        dir_norm_illum,
        diff_hor_illum,
        latitude,
        longitude,
    )
}

pub fn weather_data_from_path(path: &Path) -> HeatDemandResult<ExternalConditions> {
    let file = File::open(path).map_err(|e| {
        HeatDemandError::InvalidInput(format!(
            "could not open weather file {}: {e}",
            path.display()
        ))
    })?;

    weather_data_to_vec(BufReader::new(file))
}
