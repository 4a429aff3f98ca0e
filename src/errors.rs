use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeatDemandError {
    #[error("Stock table is missing required columns: {}", missing.join(", "))]
    SchemaViolation { missing: Vec<String> },
    #[error("Window area defined for the window ({window_config_area} m2) doesn't match window area defined for the zone ({zone_window_area} m2)")]
    ConfigurationMismatch {
        window_config_area: f64,
        zone_window_area: f64,
    },
    #[error("Thermal mass category '{category}' is not one of Low, Medium-low, Medium, Medium-high, High")]
    UnknownCategory { category: String },
    #[error("Index {index} is out of range for {series} with {len} entries")]
    IndexOutOfRange {
        series: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Building at stock row {row} failed: {source}")]
    Building {
        row: usize,
        #[source]
        source: Box<HeatDemandError>,
    },
}

impl HeatDemandError {
    pub(crate) fn for_row(self, row: usize) -> Self {
        Self::Building {
            row,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any stock-row context.
    pub fn root(&self) -> &HeatDemandError {
        match self {
            Self::Building { source, .. } => source.root(),
            other => other,
        }
    }

    /// The stock row this error was raised for, if it came from a building run.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Building { row, .. } => Some(*row),
            _ => None,
        }
    }
}

impl From<csv::Error> for HeatDemandError {
    fn from(error: csv::Error) -> Self {
        Self::InvalidInput(error.to_string())
    }
}

pub type HeatDemandResult<T> = Result<T, HeatDemandError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn should_report_root_and_row_of_building_error() {
        let error = HeatDemandError::UnknownCategory {
            category: "Very high".to_string(),
        }
        .for_row(7);

        assert_eq!(error.row(), Some(7));
        assert!(matches!(
            error.root(),
            HeatDemandError::UnknownCategory { category } if category == "Very high"
        ));
        assert_eq!(
            error.to_string(),
            "Building at stock row 7 failed: Thermal mass category 'Very high' is not one of Low, Medium-low, Medium, Medium-high, High"
        );
    }

    #[rstest]
    fn should_list_missing_columns() {
        let error = HeatDemandError::SchemaViolation {
            missing: vec!["WallArea".to_string(), "UValueWall".to_string()],
        };

        assert_eq!(error.row(), None);
        assert_eq!(
            error.to_string(),
            "Stock table is missing required columns: WallArea, UValueWall"
        );
    }
}
