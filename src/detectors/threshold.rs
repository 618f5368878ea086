//! Threshold detectors: plausible-range checks on soil moisture (C01-C03)
//! and freezing checks on ancillary temperatures (D01-D03).
//!
//! Each detector compares one column against a fixed bound. A missing
//! ancillary column or an unset saturation point is a silent skip, never an
//! error.

use crate::config::DetectorConfig;
use crate::detectors::{empty_mask, Mask};
use crate::models::TimeSeries;
use crate::taxonomy::AncillaryVariable;
use tracing::debug;

/// C01: soil moisture below the plausible lower bound
pub fn below_lower_bound(series: &TimeSeries, config: &DetectorConfig) -> Mask {
    series
        .soil_moisture()
        .iter()
        .map(|value| *value < config.soil_moisture_lower_bound)
        .collect()
}

/// C02: soil moisture above the plausible upper bound (boundary exclusive)
pub fn above_upper_bound(series: &TimeSeries, config: &DetectorConfig) -> Mask {
    series
        .soil_moisture()
        .iter()
        .map(|value| *value > config.soil_moisture_upper_bound)
        .collect()
}

/// C03: soil moisture above the site saturation point
///
/// Contributes nothing when no saturation point was supplied.
pub fn above_saturation(series: &TimeSeries, sat_point: Option<f64>) -> Mask {
    let Some(sat_point) = sat_point else {
        debug!("C03 skipped: no saturation point supplied");
        return empty_mask(series.len());
    };

    series
        .soil_moisture()
        .iter()
        .map(|value| *value > sat_point)
        .collect()
}

/// D01/D02/D03: ancillary temperature below the freezing threshold
///
/// `variable` selects the in-situ soil, in-situ air, or GLDAS soil
/// temperature column. Contributes nothing when the column is absent.
pub fn frozen(
    series: &TimeSeries,
    config: &DetectorConfig,
    variable: AncillaryVariable,
) -> Mask {
    let Some(column) = series.column(variable) else {
        debug!("freezing check skipped: {} column absent", variable);
        return empty_mask(series.len());
    };

    column
        .iter()
        .map(|value| *value < config.temperature_lower_bound)
        .collect()
}
