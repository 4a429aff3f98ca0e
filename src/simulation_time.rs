use crate::core::units::HOURS_PER_YEAR;

// First hour of each month of a 365-day year, closed by the end of December
pub(crate) const MONTH_START_END_HOURS: [usize; 13] = [
    0, 744, 1416, 2160, 2880, 3624, 4344, 5088, 5832, 6552, 7296, 8016, 8760,
];

/// Hourly simulation time over a year, hour 0 being midnight on 1st January.
#[derive(Clone, Copy, Debug)]
pub struct SimulationTime {
    start_hour: usize,
    end_hour: usize,
}

impl SimulationTime {
    fn new(start_hour: usize, end_hour: usize) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub fn full_year() -> Self {
        Self::new(0, HOURS_PER_YEAR)
    }

    pub fn total_steps(&self) -> usize {
        self.end_hour.saturating_sub(self.start_hour)
    }

    /// Last hour of year the simulation touches, if it runs at all.
    pub fn last_hour(&self) -> Option<usize> {
        (self.total_steps() > 0).then(|| self.end_hour - 1)
    }

    pub fn iter(&self) -> SimulationTimeIterator {
        SimulationTimeIterator {
            current_index: 0,
            simulation_time: *self,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SimulationTimeIterator {
    current_index: usize,
    simulation_time: SimulationTime,
}

#[derive(Clone, Copy, Debug)]
pub struct SimulationTimeIteration {
    /// hour of year, 0 to 8759
    pub hour: usize,
}

pub(crate) fn month_for_hour(hour: usize) -> Option<usize> {
    MONTH_START_END_HOURS
        .iter()
        .position(|end_hour| hour < *end_hour)
        .map(|i| i - 1)
}

impl Iterator for SimulationTimeIterator {
    type Item = SimulationTimeIteration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.simulation_time.total_steps() {
            return None;
        }
        let iteration = SimulationTimeIteration {
            hour: self.simulation_time.start_hour + self.current_index,
        };
        self.current_index += 1;
        Some(iteration)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.simulation_time.total_steps() - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SimulationTimeIterator {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    pub fn simtime() -> SimulationTime {
        SimulationTime::new(742, 746)
    }

    #[rstest]
    fn should_have_correct_total_steps(simtime: SimulationTime) {
        assert_eq!(simtime.total_steps(), 4);
        assert_eq!(simtime.last_hour(), Some(745));
        assert_eq!(SimulationTime::full_year().total_steps(), 8760);
        assert_eq!(SimulationTime::new(5, 5).last_hour(), None);
    }

    #[rstest]
    fn should_iterate_correctly(simtime: SimulationTime) {
        let current_months = [0, 0, 1, 1];

        let iterations = simtime.iter().collect::<Vec<_>>();

        assert_eq!(iterations.len(), 4);
        for (i, item) in iterations.iter().enumerate() {
            assert_eq!(item.hour, 742 + i);
            assert_eq!(month_for_hour(item.hour), Some(current_months[i]));
        }
    }

    #[rstest]
    fn should_have_no_month_past_end_of_year() {
        assert_eq!(month_for_hour(8759), Some(11));
        assert_eq!(month_for_hour(8760), None);
    }
}
