use crate::errors::{HeatDemandError, HeatDemandResult};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Thermal mass classes of ISO 13790 section 12.3.1.2.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
pub enum ThermalMassCategory {
    #[strum(serialize = "Low")]
    Low,
    #[strum(serialize = "Medium-low")]
    MediumLow,
    #[strum(serialize = "Medium")]
    Medium,
    #[strum(serialize = "Medium-high")]
    MediumHigh,
    #[strum(serialize = "High")]
    High,
}

impl ThermalMassCategory {
    /// Parse a category as written in stock data.
    ///
    /// Stock extracts pad this column to a fixed width, so surrounding whitespace is
    /// stripped before matching. Matching is otherwise exact and case-sensitive.
    pub fn from_stock_value(value: &str) -> HeatDemandResult<Self> {
        Self::from_str(value.trim()).map_err(|_| HeatDemandError::UnknownCategory {
            category: value.to_string(),
        })
    }

    /// Heat capacitance per floor area, in J/(m2.K)
    pub fn capacitance_per_floor_area(&self) -> f64 {
        match self {
            Self::Low => 80_000.,
            Self::MediumLow => 110_000.,
            Self::Medium => 165_000.,
            Self::MediumHigh => 260_000.,
            Self::High => 370_000.,
        }
    }
}

/// Look up the heat capacitance per floor area (J/(m2.K)) for a thermal mass category.
pub fn lookup(category: &str) -> HeatDemandResult<f64> {
    ThermalMassCategory::from_stock_value(category)
        .map(|category| category.capacitance_per_floor_area())
}
