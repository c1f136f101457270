use std::sync::Arc;

use thiserror::Error;

use super::model::{Dataset, Year, YearTable};

/// Placeholder shown in the year dropdown before a real year is chosen.
pub const YEAR_SENTINEL: &str = "Select Year";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("'{0}' is not a valid race year")]
    InvalidYear(String),
    #[error("no lap count is recorded for '{0}'")]
    UnknownEvent(String),
}

// ---------------------------------------------------------------------------
// Cascading dropdown queries
// ---------------------------------------------------------------------------

/// Derives the option sets of dependent dropdowns from the dataset.
///
/// Every query is pure: repeated calls return identical sequences. Callers
/// must clear whatever options they displayed before showing a new result.
#[derive(Debug, Clone)]
pub struct FilterCascade {
    dataset: Arc<Dataset>,
}

impl FilterCascade {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    /// Selectable years, in column order.
    pub fn years(&self) -> &[Year] {
        self.dataset.years()
    }

    /// Events raced in `year`, in dataset order.
    pub fn events_for_year(&self, year: &str) -> Result<Vec<String>, FilterError> {
        self.entries_for_year(&self.dataset.events, year)
    }

    /// Drivers entered in `year`, in dataset order.
    pub fn drivers_for_year(&self, year: &str) -> Result<Vec<String>, FilterError> {
        self.entries_for_year(&self.dataset.drivers, year)
    }

    /// Lap numbers `1..=N` for an event with a race distance of `N` laps.
    pub fn lap_range_for_event(&self, event: &str) -> Result<Vec<u32>, FilterError> {
        self.dataset
            .laps
            .laps(event)
            .map(|n| (1..=n).collect())
            .ok_or_else(|| FilterError::UnknownEvent(event.to_string()))
    }

    /// Resolve a dropdown label to a year that has a column in the events
    /// table. The sentinel and unparsable labels are rejected.
    pub fn resolve_year(&self, year: &str) -> Result<Year, FilterError> {
        let invalid = || FilterError::InvalidYear(year.to_string());
        if year.trim() == YEAR_SENTINEL {
            return Err(invalid());
        }
        let parsed = year.parse::<Year>().map_err(|_| invalid())?;
        if self.dataset.years().contains(&parsed) {
            Ok(parsed)
        } else {
            Err(invalid())
        }
    }

    fn entries_for_year(&self, table: &YearTable, year: &str) -> Result<Vec<String>, FilterError> {
        let year = self.resolve_year(year)?;
        // A year present for events but absent from the drivers table has
        // no entries rather than being invalid.
        Ok(table.entries(year).map(<[String]>::to_vec).unwrap_or_default())
    }
}
