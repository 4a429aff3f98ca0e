use crate::errors::{HeatDemandError, HeatDemandResult};
use csv::{ReaderBuilder as CsvReaderBuilder, Trim};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

const PEOPLE_COLUMN: &str = "People";

#[derive(Debug, Deserialize)]
struct OccupancyRow {
    #[serde(rename = "People")]
    people: f64,
}

/// Hourly fractional occupancy of a household archetype, indexed by hour of year.
///
/// Loaded once and then shared read-only between every building simulated with
/// this archetype.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyProfile {
    fractions: Vec<f64>,
}

impl OccupancyProfile {
    pub fn new(fractions: Vec<f64>) -> Self {
        Self { fractions }
    }

    /// Read a schedule table with a header row and a `People` column. Any other
    /// columns (appliance or lighting schedules) are ignored.
    pub fn from_reader(reader: impl Read) -> HeatDemandResult<Self> {
        let mut reader = CsvReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        if !reader.headers()?.iter().any(|h| h == PEOPLE_COLUMN) {
            return Err(HeatDemandError::InvalidInput(format!(
                "occupancy profile has no '{PEOPLE_COLUMN}' column"
            )));
        }

        let fractions = reader
            .deserialize::<OccupancyRow>()
            .map(|row| row.map(|row| row.people))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(fractions))
    }

    pub fn from_path(path: &Path) -> HeatDemandResult<Self> {
        let file = File::open(path).map_err(|e| {
            HeatDemandError::InvalidInput(format!(
                "could not open occupancy profile {}: {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.fractions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fractions.is_empty()
    }

    /// Occupied fraction of the maximum occupancy for the given hour of year
    pub fn fraction(&self, hour: usize) -> HeatDemandResult<f64> {
        self.fractions
            .get(hour)
            .copied()
            .ok_or(HeatDemandError::IndexOutOfRange {
                series: "occupancy profile",
                index: hour,
                len: self.fractions.len(),
            })
    }
}
