//! Run configuration for quality control.
//!
//! Provides the per-run request (which flag codes to apply, the optional
//! saturation point) and the detector threshold configuration whose defaults
//! come from [`constants`](crate::constants).

use crate::constants;
use crate::error::{FlagitError, Result};
use crate::taxonomy::{FlagCode, ALL_DETECTORS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Numeric thresholds driving the detectors
///
/// `Default` mirrors the documented constants; tests and callers with
/// site-specific needs override individual fields instead of patching
/// literals in detector code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Lower plausible soil moisture bound in m³/m³ (C01)
    pub soil_moisture_lower_bound: f64,
    /// Upper plausible soil moisture bound in m³/m³, exclusive (C02)
    pub soil_moisture_upper_bound: f64,
    /// Freezing threshold in °C (D01/D02/D03)
    pub temperature_lower_bound: f64,

    /// Minimum hourly rise in m³/m³ treated as a rain response (D04/D05)
    pub min_rise: f64,
    /// Positions over which precipitation is accumulated (D04/D05)
    pub precipitation_window: usize,
    /// Accumulated precipitation in mm at or below which the window counts
    /// as rain-free (D04/D05)
    pub precipitation_near_zero: f64,

    /// Positions forming the trailing scoring neighborhood (D06-D08)
    pub score_window: usize,
    /// Minimum valid neighbors required to score a timestamp
    pub min_window_obs: usize,
    /// MAD-to-sigma consistency constant
    pub mad_scale: f64,
    /// Floor applied to the scaled MAD, in m³/m³
    pub mad_floor: f64,
    /// z magnitude at or above which an isolated point is a spike (D06)
    pub spike_z: f64,
    /// z magnitude at or above which a level shift is a break (D07/D08)
    pub break_z: f64,
    /// Consecutive valid points, including the onset, that must hold the new
    /// level
    pub break_min_run: usize,
    /// Fraction of the step the post-break points must keep away from the
    /// pre-break median
    pub break_persistence: f64,
    /// Level in m³/m³ above which a fall to exactly zero is a negative break
    pub drop_to_zero_min: f64,

    /// Tolerance band around the post-break level in m³/m³ (D09)
    pub plateau_tolerance: f64,
    /// Minimum length of a constant-low run after a negative break (D09)
    pub low_plateau_min_len: usize,
    /// Fraction of the reference level counting as saturated (D10)
    pub saturation_fraction: f64,
    /// Minimum length of a saturated plateau run (D10)
    pub saturated_plateau_min_len: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            soil_moisture_lower_bound: constants::SOIL_MOISTURE_LOWER_BOUND,
            soil_moisture_upper_bound: constants::SOIL_MOISTURE_UPPER_BOUND,
            temperature_lower_bound: constants::TEMPERATURE_LOWER_BOUND,
            min_rise: constants::SOIL_MOISTURE_MIN_RISE,
            precipitation_window: constants::PRECIPITATION_WINDOW,
            precipitation_near_zero: constants::PRECIPITATION_NEAR_ZERO,
            score_window: constants::SCORE_WINDOW,
            min_window_obs: constants::MIN_WINDOW_OBS,
            mad_scale: constants::MAD_SCALE,
            mad_floor: constants::MAD_FLOOR,
            spike_z: constants::SPIKE_Z_THRESHOLD,
            break_z: constants::BREAK_Z_THRESHOLD,
            break_min_run: constants::BREAK_MIN_RUN,
            break_persistence: constants::BREAK_PERSISTENCE,
            drop_to_zero_min: constants::DROP_TO_ZERO_MIN,
            plateau_tolerance: constants::PLATEAU_TOLERANCE,
            low_plateau_min_len: constants::LOW_PLATEAU_MIN_LEN,
            saturation_fraction: constants::SATURATION_FRACTION,
            saturated_plateau_min_len: constants::SATURATED_PLATEAU_MIN_LEN,
        }
    }
}

impl DetectorConfig {
    /// Validate configuration values for consistency
    pub fn validate(&self) -> Result<()> {
        if self.soil_moisture_lower_bound >= self.soil_moisture_upper_bound {
            return Err(FlagitError::configuration(
                "soil moisture lower bound must be below the upper bound",
            ));
        }
        if self.score_window == 0 || self.min_window_obs == 0 {
            return Err(FlagitError::configuration(
                "scoring window and minimum observation count must be positive",
            ));
        }
        if self.min_window_obs > self.score_window {
            return Err(FlagitError::configuration(format!(
                "min_window_obs {} exceeds score_window {}",
                self.min_window_obs, self.score_window
            )));
        }
        if self.precipitation_window == 0 {
            return Err(FlagitError::configuration(
                "precipitation window must be positive",
            ));
        }
        if self.break_min_run < 2 {
            return Err(FlagitError::configuration(
                "break_min_run must cover at least the onset and one follow-up point",
            ));
        }
        if self.mad_floor <= 0.0 || self.mad_scale <= 0.0 {
            return Err(FlagitError::configuration(
                "MAD scale and floor must be positive",
            ));
        }
        if self.spike_z <= 0.0 || self.break_z <= 0.0 {
            return Err(FlagitError::configuration(
                "spike and break thresholds must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.break_persistence)
            || !(0.0..=1.0).contains(&self.saturation_fraction)
        {
            return Err(FlagitError::configuration(
                "persistence and saturation fractions must lie in [0, 1]",
            ));
        }
        if self.plateau_tolerance <= 0.0 {
            return Err(FlagitError::configuration(
                "plateau tolerance must be positive",
            ));
        }
        if self.low_plateau_min_len < 2 || self.saturated_plateau_min_len < 2 {
            return Err(FlagitError::configuration(
                "plateau minimum lengths must cover at least two observations",
            ));
        }
        Ok(())
    }
}

/// One quality control run request
///
/// `codes: None` applies every detector. Requesting `G` is accepted and
/// ignored; the merger always assigns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Flag codes to apply; `None` means all
    pub codes: Option<Vec<FlagCode>>,
    /// Saturation point in m³/m³ for C03; C03 is skipped when unset here and
    /// on the interface
    pub sat_point: Option<f64>,
}

impl RunRequest {
    /// Request every detector
    pub fn all() -> Self {
        Self::default()
    }

    /// Request a single flag code
    pub fn single(code: FlagCode) -> Self {
        Self {
            codes: Some(vec![code]),
            sat_point: None,
        }
    }

    /// Request an ordered collection of flag codes
    pub fn codes(codes: impl Into<Vec<FlagCode>>) -> Self {
        Self {
            codes: Some(codes.into()),
            sat_point: None,
        }
    }

    /// Parse a request from flag id strings; fails with a configuration
    /// error on the first unknown code
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let codes = names
            .iter()
            .map(|name| name.as_ref().parse::<FlagCode>())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            codes: Some(codes),
            sat_point: None,
        })
    }

    pub fn with_sat_point(mut self, sat_point: f64) -> Self {
        self.sat_point = Some(sat_point);
        self
    }

    /// Resolve the detector set for execution, dropping duplicates and `G`
    pub(crate) fn resolved_detectors(&self) -> BTreeSet<FlagCode> {
        match &self.codes {
            None => ALL_DETECTORS.iter().copied().collect(),
            Some(codes) => codes
                .iter()
                .copied()
                .filter(|code| *code != FlagCode::Good)
                .collect(),
        }
    }
}
