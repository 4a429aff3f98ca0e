//! Summary statistics of annual stock results.

use crate::core::units::watt_hours_to_kilowatt_hours;
use crate::stock::StockResult;
use statrs::statistics::{Data, OrderStatistics};

pub fn percentile(numbers: &[f64], percentile: usize) -> f64 {
    let mut data = Data::new(numbers.to_vec());

    data.percentile(percentile)
}

/// Distribution of annual heat demand across the buildings of a stock, in kWh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StockSummary {
    pub buildings: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub percentile_90: f64,
    pub max: f64,
}

impl StockSummary {
    /// `None` for a stock without buildings.
    pub fn from_result(result: &StockResult) -> Option<Self> {
        if result.is_empty() {
            return None;
        }

        let demands = result
            .annual_heat_demands()
            .into_iter()
            .map(watt_hours_to_kilowatt_hours)
            .collect::<Vec<_>>();
        let total = demands.iter().sum::<f64>();

        Some(Self {
            buildings: demands.len(),
            total,
            mean: total / demands.len() as f64,
            median: percentile(&demands, 50),
            percentile_90: percentile(&demands, 90),
            max: demands.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
