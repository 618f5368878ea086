//! Detection constants for soil moisture quality control
//!
//! This module contains the numeric thresholds used by the flag detectors.
//! Values follow Dorigo et al. (2013), "Global Automated Quality Control of
//! In Situ Soil Moisture Data from the International Soil Moisture Network",
//! Vadose Zone Journal, adapted to the robust median/MAD scoring used by the
//! break/spike analyzer. All of these are defaults for
//! [`DetectorConfig`](crate::config::DetectorConfig); tests override fields
//! there rather than relying on literals.

// =============================================================================
// Geophysical Plausibility Bounds
// =============================================================================

/// Lower plausible soil moisture bound in m³/m³ (flag C01 fires below this)
pub const SOIL_MOISTURE_LOWER_BOUND: f64 = 0.0;

/// Upper plausible soil moisture bound in m³/m³ (flag C02 fires above this,
/// boundary exclusive)
pub const SOIL_MOISTURE_UPPER_BOUND: f64 = 0.60;

/// Freezing threshold in °C for in-situ and GLDAS temperatures (D01/D02/D03
/// fire strictly below this)
pub const TEMPERATURE_LOWER_BOUND: f64 = 0.0;

// =============================================================================
// Rise Detection (D04/D05)
// =============================================================================

/// Minimum hourly soil moisture rise in m³/m³ considered a rain response
pub const SOIL_MOISTURE_MIN_RISE: f64 = 0.01;

/// Number of preceding hourly positions over which precipitation is summed
pub const PRECIPITATION_WINDOW: usize = 24;

/// Accumulated precipitation in mm at or below which the preceding window
/// counts as rain-free
pub const PRECIPITATION_NEAR_ZERO: f64 = 0.2;

// =============================================================================
// Break/Spike Scoring
// =============================================================================

/// Number of preceding hourly positions forming the scoring neighborhood
pub const SCORE_WINDOW: usize = 24;

/// Minimum count of valid neighbors required before a timestamp is scored
pub const MIN_WINDOW_OBS: usize = 12;

/// Consistency constant relating MAD to the standard deviation of a normal
/// distribution
pub const MAD_SCALE: f64 = 1.4826;

/// Floor in m³/m³ applied to the scaled MAD so near-constant neighborhoods
/// do not divide by ~0
pub const MAD_FLOOR: f64 = 1e-3;

/// Robust z-score magnitude at or above which an isolated point is a spike
pub const SPIKE_Z_THRESHOLD: f64 = 4.0;

/// Robust z-score magnitude at or above which a level shift is a break
pub const BREAK_Z_THRESHOLD: f64 = 3.0;

/// Number of consecutive valid points (including the onset) that must hold
/// the new level for a break to register
pub const BREAK_MIN_RUN: usize = 5;

/// Fraction of the step magnitude the post-break points must keep away from
/// the pre-break median
pub const BREAK_PERSISTENCE: f64 = 0.5;

/// Soil moisture in m³/m³ above which a fall to exactly zero registers as a
/// negative break even without a z-score crossing
pub const DROP_TO_ZERO_MIN: f64 = 0.05;

// =============================================================================
// Plateau Detection (D09/D10)
// =============================================================================

/// Tolerance band in m³/m³ around the post-break level for D09 runs
pub const PLATEAU_TOLERANCE: f64 = 0.005;

/// Minimum length in hourly positions of a constant-low run after a negative
/// break (the 13 h minimum of the ISMN procedure)
pub const LOW_PLATEAU_MIN_LEN: usize = 13;

/// Fraction of the reference level a value must reach to count as saturated
pub const SATURATION_FRACTION: f64 = 0.95;

/// Minimum length in hourly positions of a saturated plateau run
pub const SATURATED_PLATEAU_MIN_LEN: usize = 6;

// =============================================================================
// Sampling
// =============================================================================

/// Expected sampling step in seconds; other dominant steps are logged as a
/// warning by the container
pub const EXPECTED_STEP_SECONDS: i64 = 3600;
