//! Plateau detectors: constant low values following a negative break (D09)
//! and saturated plateaus near the maximum observed level (D10).
//!
//! Both detectors work on maximal contiguous runs; candidate intervals are
//! merged into their maximal extent before flagging, and runs shorter than
//! the configured minimum are discarded.

use crate::config::DetectorConfig;
use crate::detectors::{empty_mask, Mask};
use crate::models::{BreakDirection, BreakEvent, PlateauInterval, TimeSeries};
use tracing::debug;

/// D09: constant values following a negative break
///
/// From each negative break onset, the run extends while values stay within
/// the plateau tolerance of the post-break level. Missing values end the
/// run. Runs shorter than the minimum length are not flagged.
pub fn low_plateaus(
    series: &TimeSeries,
    breaks: &[BreakEvent],
    config: &DetectorConfig,
) -> Vec<PlateauInterval> {
    let soil_moisture = series.soil_moisture();
    let mut intervals = Vec::new();

    for event in breaks {
        if event.direction != BreakDirection::Negative {
            continue;
        }
        let level = soil_moisture[event.index];
        if level.is_nan() {
            continue;
        }

        let mut end = event.index;
        while end + 1 < series.len() {
            let value = soil_moisture[end + 1];
            if value.is_nan() || (value - level).abs() > config.plateau_tolerance {
                break;
            }
            end += 1;
        }

        let interval = PlateauInterval {
            start: event.index,
            end,
        };
        if interval.len() >= config.low_plateau_min_len {
            intervals.push(interval);
        } else {
            debug!(
                "post-break run at index {} too short ({} < {})",
                event.index,
                interval.len(),
                config.low_plateau_min_len
            );
        }
    }

    merge_intervals(intervals)
}

/// D10: saturated plateaus
///
/// Values at or above `saturation_fraction` of the reference level are
/// plateau candidates; the reference is the saturation point when supplied,
/// otherwise the maximum valid soil moisture within the plausible range.
/// Candidate runs may bridge gaps of missing values.
///
/// When no saturation point is supplied the reference comes from the series
/// itself, so a run is only kept if the series rises into the saturation
/// band and falls out of it again; otherwise a constant series at any level
/// would saturate against its own maximum.
pub fn saturated_plateaus(
    series: &TimeSeries,
    sat_point: Option<f64>,
    config: &DetectorConfig,
) -> Vec<PlateauInterval> {
    let soil_moisture = series.soil_moisture();

    let self_referenced = sat_point.is_none();
    let reference = match sat_point {
        Some(value) => value,
        None => {
            let maximum = soil_moisture
                .iter()
                .copied()
                .filter(|value| !value.is_nan() && *value <= config.soil_moisture_upper_bound)
                .fold(f64::NEG_INFINITY, f64::max);
            if !maximum.is_finite() || maximum <= 0.0 {
                debug!("saturated plateau check skipped: no plausible reference level");
                return Vec::new();
            }
            maximum
        }
    };
    let threshold = config.saturation_fraction * reference;

    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for t in 0..=series.len() {
        let candidate = t < series.len() && {
            let value = soil_moisture[t];
            !value.is_nan() && value >= threshold
        };
        match (candidate, run_start) {
            (true, None) => run_start = Some(t),
            (false, Some(start)) => {
                runs.push(PlateauInterval { start, end: t - 1 });
                run_start = None;
            }
            _ => {}
        }
    }

    bridge_missing_gaps(runs, soil_moisture)
        .into_iter()
        .filter(|interval| interval.len() >= config.saturated_plateau_min_len)
        .filter(|interval| {
            !self_referenced || bounded_by_level_changes(interval, soil_moisture, threshold)
        })
        .collect()
}

/// Merge candidate runs whose gap consists solely of missing values; a
/// plateau is allowed to bridge data gaps.
fn bridge_missing_gaps(runs: Vec<PlateauInterval>, soil_moisture: &[f64]) -> Vec<PlateauInterval> {
    let mut merged: Vec<PlateauInterval> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last)
                if soil_moisture[last.end + 1..run.start]
                    .iter()
                    .all(|value| value.is_nan()) =>
            {
                last.end = run.end;
            }
            _ => merged.push(run),
        }
    }
    merged
}

/// A self-referenced plateau must be entered from below the saturation band
/// and left again; the nearest valid value on either side decides.
fn bounded_by_level_changes(
    interval: &PlateauInterval,
    soil_moisture: &[f64],
    threshold: f64,
) -> bool {
    let before = soil_moisture[..interval.start]
        .iter()
        .rev()
        .copied()
        .find(|value| !value.is_nan());
    let after = soil_moisture[interval.end + 1..]
        .iter()
        .copied()
        .find(|value| !value.is_nan());
    matches!(before, Some(value) if value < threshold)
        && matches!(after, Some(value) if value < threshold)
}

/// Merge overlapping or adjacent intervals into their maximal extent
pub fn merge_intervals(mut intervals: Vec<PlateauInterval>) -> Vec<PlateauInterval> {
    intervals.sort_by_key(|interval| interval.start);

    let mut merged: Vec<PlateauInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end + 1 => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Convert plateau intervals to a boolean mask
pub fn intervals_to_mask(intervals: &[PlateauInterval], len: usize) -> Mask {
    let mut mask = empty_mask(len);
    for interval in intervals {
        for hit in mask.iter_mut().take(interval.end + 1).skip(interval.start) {
            *hit = true;
        }
    }
    mask
}
