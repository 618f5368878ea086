//! Core data structures for soil moisture quality control.
//!
//! Defines the time series container wrapping one station's observation
//! table, plus the transient break and plateau structures exchanged between
//! detectors during a run.

use crate::constants::EXPECTED_STEP_SECONDS;
use crate::error::{FlagitError, Result};
use crate::taxonomy::{AncillaryVariable, FlagCode};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

// =============================================================================
// Time Series Container
// =============================================================================

/// Timestamp-indexed observation table for one soil moisture sensor
///
/// Soil moisture is mandatory; ancillary columns are optional and their
/// absence merely disables the detectors that need them. Missing values are
/// encoded as `NaN`. The flag column starts empty for every timestamp and is
/// filled by [`Interface::run`](crate::interface::Interface::run).
#[derive(Debug, Clone)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    soil_moisture: Vec<f64>,
    ancillary: BTreeMap<AncillaryVariable, Vec<f64>>,
    qflag: Vec<BTreeSet<FlagCode>>,
}

impl TimeSeries {
    /// Number of observations
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Shared timestamp index, strictly increasing
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Soil moisture column in m³/m³, `NaN` where missing
    pub fn soil_moisture(&self) -> &[f64] {
        &self.soil_moisture
    }

    /// Ancillary column aligned with the timestamp index, if present
    pub fn column(&self, variable: AncillaryVariable) -> Option<&[f64]> {
        self.ancillary.get(&variable).map(Vec::as_slice)
    }

    pub fn has_column(&self, variable: AncillaryVariable) -> bool {
        self.ancillary.contains_key(&variable)
    }

    /// Whether the soil moisture value at position `index` is missing
    pub fn is_missing(&self, index: usize) -> bool {
        self.soil_moisture[index].is_nan()
    }

    /// Per-timestamp flag sets (the `qflag` column)
    pub fn qflag(&self) -> &[BTreeSet<FlagCode>] {
        &self.qflag
    }

    pub(crate) fn set_qflag(&mut self, qflag: Vec<BTreeSet<FlagCode>>) {
        debug_assert_eq!(qflag.len(), self.timestamps.len());
        self.qflag = qflag;
    }

    /// Render the flag column: `"G"`, a comma-joined code list, or the empty
    /// string where soil moisture is missing
    pub fn flag_strings(&self) -> Vec<String> {
        self.qflag
            .iter()
            .map(|flags| {
                flags
                    .iter()
                    .map(FlagCode::as_str)
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }

    /// Render the flag column using numeric tags instead of flag ids
    pub fn flag_strings_numeric(&self) -> Vec<String> {
        self.qflag
            .iter()
            .map(|flags| {
                flags
                    .iter()
                    .map(|code| code.number().to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect()
    }
}

/// Builder for [`TimeSeries`]
///
/// Validates the schema on [`build`](TimeSeriesBuilder::build): the index
/// must be strictly increasing (duplicates are invalid), every column must
/// match its length, and at least one observation is required.
#[derive(Debug, Clone)]
pub struct TimeSeriesBuilder {
    timestamps: Vec<DateTime<Utc>>,
    soil_moisture: Vec<f64>,
    ancillary: BTreeMap<AncillaryVariable, Vec<f64>>,
}

impl TimeSeriesBuilder {
    pub fn new(timestamps: Vec<DateTime<Utc>>, soil_moisture: Vec<f64>) -> Self {
        Self {
            timestamps,
            soil_moisture,
            ancillary: BTreeMap::new(),
        }
    }

    /// Attach an ancillary column aligned with the timestamp index
    pub fn with_column(mut self, variable: AncillaryVariable, values: Vec<f64>) -> Self {
        self.ancillary.insert(variable, values);
        self
    }

    pub fn build(self) -> Result<TimeSeries> {
        if self.timestamps.is_empty() {
            return Err(FlagitError::schema("time series contains no observations"));
        }

        if self.soil_moisture.len() != self.timestamps.len() {
            return Err(FlagitError::schema(format!(
                "soil_moisture column has {} values for {} timestamps",
                self.soil_moisture.len(),
                self.timestamps.len()
            )));
        }

        for (variable, values) in &self.ancillary {
            if values.len() != self.timestamps.len() {
                return Err(FlagitError::schema(format!(
                    "{} column has {} values for {} timestamps",
                    variable,
                    values.len(),
                    self.timestamps.len()
                )));
            }
        }

        for pair in self.timestamps.windows(2) {
            if pair[1] == pair[0] {
                return Err(FlagitError::schema(format!(
                    "duplicate timestamp in index: {}",
                    pair[0]
                )));
            }
            if pair[1] < pair[0] {
                return Err(FlagitError::schema(format!(
                    "time index not sorted ascending at {}",
                    pair[1]
                )));
            }
        }

        check_sampling_step(&self.timestamps);

        let qflag = vec![BTreeSet::new(); self.timestamps.len()];
        Ok(TimeSeries {
            timestamps: self.timestamps,
            soil_moisture: self.soil_moisture,
            ancillary: self.ancillary,
            qflag,
        })
    }
}

/// Warn when the dominant sampling step is not hourly; the detector windows
/// are positional and assume the ISMN hourly resolution.
fn check_sampling_step(timestamps: &[DateTime<Utc>]) {
    if timestamps.len() < 2 {
        return;
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for pair in timestamps.windows(2) {
        let step = (pair[1] - pair[0]).num_seconds();
        *counts.entry(step).or_insert(0) += 1;
    }

    if let Some((step, _)) = counts.into_iter().max_by_key(|(_, count)| *count) {
        if step != EXPECTED_STEP_SECONDS {
            warn!(
                "dominant sampling step is {}s, expected {}s; positional windows may not span the intended durations",
                step, EXPECTED_STEP_SECONDS
            );
        }
    }
}

// =============================================================================
// Transient Detector Structures
// =============================================================================

/// Direction of a detected level shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDirection {
    /// Level drops (flag D07)
    Negative,
    /// Level rises (flag D08)
    Positive,
}

/// One detected discontinuity in the soil moisture level
///
/// Produced by the break/spike analyzer, consumed by the break and
/// post-break plateau detectors within the same run; never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakEvent {
    /// Position of the break onset in the timestamp index
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    /// Signed step change relative to the pre-break median, in m³/m³
    pub magnitude: f64,
    pub direction: BreakDirection,
}

/// Maximal contiguous run of near-constant values, as an inclusive index
/// range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauInterval {
    pub start: usize,
    pub end: usize,
}

// An interval covers at least one observation, so there is no empty case.
#[allow(clippy::len_without_is_empty)]
impl PlateauInterval {
    /// Number of observations covered by the interval
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}
