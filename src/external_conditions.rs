use crate::errors::{HeatDemandError, HeatDemandResult};
use chrono::{Datelike, Duration, NaiveDate, Timelike};
use serde::Deserialize;

/// Weather for a single hour of the year.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HourlyWeather {
    /// outdoor dry-bulb temperature, in Celsius
    pub air_temperature: f64,
    /// direct normal irradiation, in Wh/m2
    pub direct_normal_radiation: f64,
    /// diffuse horizontal irradiation, in Wh/m2
    pub diffuse_horizontal_radiation: f64,
    /// direct normal illuminance, in lux
    pub direct_normal_illuminance: f64,
    /// diffuse horizontal illuminance, in lux
    pub diffuse_horizontal_illuminance: f64,
}

/// Source of hourly weather for a fixed location.
///
/// Implementations are shared read-only between building simulations, which may run
/// on different threads.
pub trait WeatherProvider: Sync {
    /// Number of consecutive hours, from hour 0, that weather is available for.
    fn hours_available(&self) -> usize;

    fn weather_for_hour(&self, hour: usize) -> HeatDemandResult<HourlyWeather>;

    /// Latitude and longitude of the weather station, in degrees, if known.
    fn location(&self) -> Option<(f64, f64)> {
        None
    }
}

#[derive(Clone, Debug)]
pub struct ExternalConditions {
    air_temperatures: Vec<f64>,
    direct_normal_radiation: Vec<f64>,
    diffuse_horizontal_radiation: Vec<f64>,
    direct_normal_illuminance: Vec<f64>,
    diffuse_horizontal_illuminance: Vec<f64>,
    latitude: f64,
    longitude: f64,
}

impl ExternalConditions {
    /// Arguments:
    /// * `air_temperatures` - dry-bulb air temperature, in Celsius, one entry per hour
    /// * `direct_normal_radiation` - direct normal irradiation, in Wh/m2
    /// * `diffuse_horizontal_radiation` - diffuse horizontal irradiation, in Wh/m2
    /// * `direct_normal_illuminance` - direct normal illuminance, in lux
    /// * `diffuse_horizontal_illuminance` - diffuse horizontal illuminance, in lux
    /// * `latitude`, `longitude` - location of the weather station, in degrees
    pub fn new(
        air_temperatures: Vec<f64>,
        direct_normal_radiation: Vec<f64>,
        diffuse_horizontal_radiation: Vec<f64>,
        direct_normal_illuminance: Vec<f64>,
        diffuse_horizontal_illuminance: Vec<f64>,
        latitude: f64,
        longitude: f64,
    ) -> HeatDemandResult<Self> {
        let hours = air_temperatures.len();
        let lengths = [
            direct_normal_radiation.len(),
            diffuse_horizontal_radiation.len(),
            direct_normal_illuminance.len(),
            diffuse_horizontal_illuminance.len(),
        ];
        if lengths.iter().any(|len| *len != hours) {
            return Err(HeatDemandError::InvalidInput(format!(
                "weather series have different lengths: {hours} air temperatures, but {lengths:?} for radiation and illuminance"
            )));
        }

        Ok(Self {
            air_temperatures,
            direct_normal_radiation,
            diffuse_horizontal_radiation,
            direct_normal_illuminance,
            diffuse_horizontal_illuminance,
            latitude,
            longitude,
        })
    }
}

impl WeatherProvider for ExternalConditions {
    fn hours_available(&self) -> usize {
        self.air_temperatures.len()
    }

    fn weather_for_hour(&self, hour: usize) -> HeatDemandResult<HourlyWeather> {
        if hour >= self.air_temperatures.len() {
            return Err(HeatDemandError::IndexOutOfRange {
                series: "weather data",
                index: hour,
                len: self.air_temperatures.len(),
            });
        }

        Ok(HourlyWeather {
            air_temperature: self.air_temperatures[hour],
            direct_normal_radiation: self.direct_normal_radiation[hour],
            diffuse_horizontal_radiation: self.diffuse_horizontal_radiation[hour],
            direct_normal_illuminance: self.direct_normal_illuminance[hour],
            diffuse_horizontal_illuminance: self.diffuse_horizontal_illuminance[hour],
        })
    }

    fn location(&self) -> Option<(f64, f64)> {
        Some((self.latitude, self.longitude))
    }
}

/// Location and calendar year used to position the sun.
///
/// This is configured independently of the weather file, and is not checked to
/// agree with it beyond a logged warning.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SolarSite {
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
}

impl Default for SolarSite {
    fn default() -> Self {
        Self {
            latitude: 47.480,
            longitude: 8.536,
            year: 2015,
        }
    }
}

impl SolarSite {
    pub(crate) fn validate(&self) -> HeatDemandResult<()> {
        if !(-90. ..=90.).contains(&self.latitude) || !(-180. ..=180.).contains(&self.longitude) {
            return Err(HeatDemandError::InvalidConfiguration(format!(
                "site latitude {} and longitude {} must be within +/-90 and +/-180 degrees",
                self.latitude, self.longitude
            )));
        }
        Ok(())
    }

    /// Largest absolute difference in latitude or longitude from the given location, in degrees
    pub fn offset_from(&self, latitude: f64, longitude: f64) -> f64 {
        (self.latitude - latitude)
            .abs()
            .max((self.longitude - longitude).abs())
    }

    pub fn sun_position(&self, hour_of_year: usize) -> HeatDemandResult<SunPosition> {
        calc_sun_position(self.latitude, self.longitude, self.year, hour_of_year)
    }
}

/// Position of the sun, in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunPosition {
    pub altitude: f64,
    pub azimuth: f64,
}

/// Calculate the sun altitude and azimuth for an hour of the year.
///
/// Hours are counted in UTC from midnight on 1st January of `year`.
pub fn calc_sun_position(
    latitude_deg: f64,
    longitude_deg: f64,
    year: i32,
    hour_of_year: usize,
) -> HeatDemandResult<SunPosition> {
    let start_of_year = NaiveDate::from_ymd_opt(year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| {
            HeatDemandError::InvalidConfiguration(format!("year {year} is not a valid year"))
        })?;
    let utc_datetime = start_of_year + Duration::hours(hour_of_year as i64);

    let latitude_rad = latitude_deg.to_radians();
    let day_of_year = utc_datetime.ordinal() as f64;

    // Declination, the angular distance of the sun north or south of the equator
    let declination_rad =
        (23.45 * ((2. * std::f64::consts::PI / 365.) * (day_of_year - 81.)).sin()).to_radians();

    let angle_of_day = (day_of_year - 81.) * (2. * std::f64::consts::PI / 364.);
    let equation_of_time = 9.87 * (2. * angle_of_day).sin()
        - 7.53 * angle_of_day.cos()
        - 1.5 * angle_of_day.sin();

    let solar_time = ((utc_datetime.hour() * 60) as f64
        + utc_datetime.minute() as f64
        + 4. * longitude_deg
        + equation_of_time)
        / 60.;
    let hour_angle_rad = (15. * (12. - solar_time)).to_radians();

    let altitude_rad = (latitude_rad.cos() * declination_rad.cos() * hour_angle_rad.cos()
        + latitude_rad.sin() * declination_rad.sin())
    .asin();
    let azimuth_rad =
        (declination_rad.cos() * hour_angle_rad.sin() / altitude_rad.cos()).asin();

    let altitude = altitude_rad.to_degrees();
    let azimuth = if hour_angle_rad.cos() >= declination_rad.tan() / latitude_rad.tan() {
        azimuth_rad.to_degrees()
    } else {
        180. - azimuth_rad.to_degrees()
    };

    Ok(SunPosition { altitude, azimuth })
}
