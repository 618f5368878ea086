//! Rise detectors: soil moisture increases with no supporting rain event
//! (D04 against in-situ precipitation, D05 against GLDAS precipitation).
//!
//! A timestamp is flagged when the hourly rise exceeds the minimum rise
//! threshold while the precipitation accumulated over the preceding window
//! stays at or below the near-zero threshold. The first timestamp has no
//! predecessor and is never flagged; a missing soil moisture value at t or
//! t-1 also leaves t unflagged.

use crate::config::DetectorConfig;
use crate::detectors::{empty_mask, Mask};
use crate::models::TimeSeries;
use crate::taxonomy::AncillaryVariable;
use tracing::debug;

/// D04/D05: rise in soil moisture without precipitation
///
/// `variable` selects which precipitation column backs the test. Contributes
/// nothing when the column is absent.
pub fn rise_without_precipitation(
    series: &TimeSeries,
    config: &DetectorConfig,
    variable: AncillaryVariable,
) -> Mask {
    let Some(precipitation) = series.column(variable) else {
        debug!("rise check skipped: {} column absent", variable);
        return empty_mask(series.len());
    };

    let soil_moisture = series.soil_moisture();
    let mut mask = empty_mask(series.len());

    for t in 1..series.len() {
        let current = soil_moisture[t];
        let previous = soil_moisture[t - 1];
        if current.is_nan() || previous.is_nan() {
            continue;
        }
        if current - previous <= config.min_rise {
            continue;
        }

        // Accumulate over the window ending at t; missing values are skipped
        // rather than stretching the window.
        let window_start = (t + 1).saturating_sub(config.precipitation_window);
        let accumulated: f64 = precipitation[window_start..=t]
            .iter()
            .filter(|value| !value.is_nan())
            .sum();

        if accumulated <= config.precipitation_near_zero {
            mask[t] = true;
        }
    }

    mask
}
