use crate::errors::{HeatDemandError, HeatDemandResult};
use crate::external_conditions::SunPosition;

/// Arguments:
/// * `azimuth_tilt` - orientation of the window, in degrees, 0 facing south
/// * `altitude_tilt` - tilt of the window from horizontal, in degrees, 90 for a vertical pane
/// * `glass_solar_transmittance` - fraction of incident solar radiation transmitted
/// * `glass_light_transmittance` - fraction of incident light transmitted
/// * `area` - glazed area, in m2
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowConfig {
    pub azimuth_tilt: f64,
    pub altitude_tilt: f64,
    pub glass_solar_transmittance: f64,
    pub glass_light_transmittance: f64,
    pub area: f64,
}

#[derive(Clone, Debug)]
pub struct Window {
    azimuth_tilt_rad: f64,
    altitude_tilt_rad: f64,
    glass_solar_transmittance: f64,
    glass_light_transmittance: f64,
    area: f64,
}

impl Window {
    pub fn new(config: WindowConfig) -> HeatDemandResult<Self> {
        let WindowConfig {
            azimuth_tilt,
            altitude_tilt,
            glass_solar_transmittance,
            glass_light_transmittance,
            area,
        } = config;

        if area.is_nan() || area < 0. {
            return Err(HeatDemandError::InvalidConfiguration(format!(
                "window area must not be negative, got {area}"
            )));
        }
        for (name, value) in [
            ("glass solar transmittance", glass_solar_transmittance),
            ("glass light transmittance", glass_light_transmittance),
        ] {
            if !(0. ..=1.).contains(&value) {
                return Err(HeatDemandError::InvalidConfiguration(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }

        Ok(Self {
            azimuth_tilt_rad: azimuth_tilt.to_radians(),
            altitude_tilt_rad: altitude_tilt.to_radians(),
            glass_solar_transmittance,
            glass_light_transmittance,
            area,
        })
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Fraction of direct normal radiation falling on the pane.
    ///
    /// Cosine of the angle of incidence (Quaschning and Hanitsch, 1995). Zero once the
    /// sun is behind the window surface.
    fn direct_factor(&self, sun: SunPosition) -> f64 {
        let sun_altitude_rad = sun.altitude.to_radians();
        let sun_azimuth_rad = sun.azimuth.to_radians();

        let cos_incidence = sun_altitude_rad.cos()
            * self.altitude_tilt_rad.sin()
            * (sun_azimuth_rad - self.azimuth_tilt_rad).cos()
            + sun_altitude_rad.sin() * self.altitude_tilt_rad.cos();

        cos_incidence.max(0.)
    }

    /// Fraction of diffuse horizontal radiation falling on the pane (isotropic sky)
    fn diffuse_factor(&self) -> f64 {
        (1. + self.altitude_tilt_rad.cos()) / 2.
    }

    fn incident(&self, sun: SunPosition, direct_normal: f64, diffuse_horizontal: f64) -> f64 {
        (self.direct_factor(sun) * direct_normal + self.diffuse_factor() * diffuse_horizontal)
            * self.area
    }

    /// Solar gain transmitted into the zone, in W
    ///
    /// Arguments:
    /// * `direct_normal_radiation` - direct normal irradiation for the hour, in Wh/m2
    /// * `diffuse_horizontal_radiation` - diffuse horizontal irradiation for the hour, in Wh/m2
    pub fn solar_gains(
        &self,
        sun: SunPosition,
        direct_normal_radiation: f64,
        diffuse_horizontal_radiation: f64,
    ) -> f64 {
        self.incident(sun, direct_normal_radiation, diffuse_horizontal_radiation)
            * self.glass_solar_transmittance
    }

    /// Luminous flux transmitted into the zone, in lumen
    pub fn transmitted_illuminance(
        &self,
        sun: SunPosition,
        direct_normal_illuminance: f64,
        diffuse_horizontal_illuminance: f64,
    ) -> f64 {
        self.incident(
            sun,
            direct_normal_illuminance,
            diffuse_horizontal_illuminance,
        ) * self.glass_light_transmittance
    }
}
