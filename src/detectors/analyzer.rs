//! Break/spike analyzer: shared rolling-window deviation scoring behind the
//! spike (D06), negative break (D07) and positive break (D08) detectors, and
//! the break list consumed by the post-break plateau detector (D09).
//!
//! Every timestamp is scored against the trailing window of valid
//! observations: z = (value - rolling median) / max(mad_scale * MAD,
//! mad_floor). The window slides incrementally through a sorted buffer, so
//! scoring the whole series costs O(n * window) rather than O(n²).
//! Timestamps with fewer than the minimum count of valid neighbors are not
//! scored and can never be flagged by this module.
//!
//! A spike is an isolated score excursion: the point itself crosses the
//! spike threshold while neither immediate neighbor does. A break is a score
//! excursion that persists: the onset crosses the break threshold and the
//! following points hold the new level relative to the pre-break median.

use crate::config::DetectorConfig;
use crate::detectors::{empty_mask, Mask};
use crate::models::{BreakDirection, BreakEvent, TimeSeries};
use tracing::debug;

/// Result of one analyzer pass over a series
#[derive(Debug, Clone)]
pub struct AnalyzerOutput {
    /// Robust z-score per timestamp; `None` where the value is missing or
    /// the window holds too few valid neighbors
    pub scores: Vec<Option<f64>>,
    /// Median of the trailing window per timestamp, where scored
    pub pre_medians: Vec<Option<f64>>,
    /// D06 mask
    pub spike_mask: Mask,
    /// Break onsets ordered by index; negative ⇒ D07, positive ⇒ D08
    pub breaks: Vec<BreakEvent>,
}

impl AnalyzerOutput {
    /// Mask of break onsets with the given direction
    pub fn break_mask(&self, direction: BreakDirection, len: usize) -> Mask {
        let mut mask = empty_mask(len);
        for event in &self.breaks {
            if event.direction == direction {
                mask[event.index] = true;
            }
        }
        mask
    }
}

/// Run the break/spike analysis over the whole series
pub fn analyze(series: &TimeSeries, config: &DetectorConfig) -> AnalyzerOutput {
    let n = series.len();
    let soil_moisture = series.soil_moisture();

    let (scores, pre_medians) = score_series(soil_moisture, config);
    let spike_mask = detect_spikes(&scores, config);
    let breaks = detect_breaks(series, &scores, &pre_medians, config);

    debug!(
        "analyzer pass: {} scored, {} spikes, {} breaks",
        scores.iter().filter(|score| score.is_some()).count(),
        spike_mask.iter().filter(|hit| **hit).count(),
        breaks.len()
    );

    AnalyzerOutput {
        scores,
        pre_medians,
        spike_mask,
        breaks,
    }
}

/// Sorted sliding window over the trailing valid observations
///
/// Insertion and removal run a binary search; the buffer never contains NaN.
struct SortedWindow {
    values: Vec<f64>,
}

impl SortedWindow {
    fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn insert(&mut self, value: f64) {
        let position = self.values.partition_point(|existing| *existing < value);
        self.values.insert(position, value);
    }

    fn remove(&mut self, value: f64) {
        let position = self.values.partition_point(|existing| *existing < value);
        // The outgoing value was inserted earlier, so it is present at the
        // first position not below it.
        if position < self.values.len() && self.values[position] == value {
            self.values.remove(position);
        }
    }

    fn median(&self) -> f64 {
        median_of_sorted(&self.values)
    }

    /// Median absolute deviation around the given center
    fn mad(&self, center: f64) -> f64 {
        let mut deviations: Vec<f64> = self
            .values
            .iter()
            .map(|value| (value - center).abs())
            .collect();
        deviations.sort_by(f64::total_cmp);
        median_of_sorted(&deviations)
    }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

/// Score every timestamp against its trailing window
fn score_series(
    soil_moisture: &[f64],
    config: &DetectorConfig,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let n = soil_moisture.len();
    let mut scores = vec![None; n];
    let mut pre_medians = vec![None; n];
    let mut window = SortedWindow::new(config.score_window + 1);

    for t in 0..n {
        if t > 0 {
            let incoming = soil_moisture[t - 1];
            if !incoming.is_nan() {
                window.insert(incoming);
            }
        }
        if t > config.score_window {
            let outgoing = soil_moisture[t - 1 - config.score_window];
            if !outgoing.is_nan() {
                window.remove(outgoing);
            }
        }

        if window.len() < config.min_window_obs {
            continue;
        }

        let median = window.median();
        pre_medians[t] = Some(median);

        let value = soil_moisture[t];
        if value.is_nan() {
            continue;
        }
        let sigma = (config.mad_scale * window.mad(median)).max(config.mad_floor);
        scores[t] = Some((value - median) / sigma);
    }

    (scores, pre_medians)
}

/// D06: isolated score excursions
fn detect_spikes(scores: &[Option<f64>], config: &DetectorConfig) -> Mask {
    let n = scores.len();
    let exceeds =
        |index: usize| scores[index].is_some_and(|score| score.abs() >= config.spike_z);

    let mut mask = empty_mask(n);
    for t in 0..n {
        if !exceeds(t) {
            continue;
        }
        let before = t > 0 && exceeds(t - 1);
        let after = t + 1 < n && exceeds(t + 1);
        if !before && !after {
            mask[t] = true;
        }
    }
    mask
}

/// Break onsets: score crossings that persist at the new level
fn detect_breaks(
    series: &TimeSeries,
    scores: &[Option<f64>],
    pre_medians: &[Option<f64>],
    config: &DetectorConfig,
) -> Vec<BreakEvent> {
    let n = series.len();
    let soil_moisture = series.soil_moisture();
    let timestamps = series.timestamps();
    let mut breaks = Vec::new();

    for t in 0..n {
        let Some(score) = scores[t] else {
            continue;
        };
        if score.abs() < config.break_z {
            continue;
        }
        // Register the onset only; the following samples of the transition
        // keep crossing the threshold until the window catches up.
        if t > 0
            && scores[t - 1].is_some_and(|previous| previous.abs() >= config.break_z)
        {
            continue;
        }
        let Some(median) = pre_medians[t] else {
            continue;
        };

        let step = soil_moisture[t] - median;
        if step == 0.0 {
            continue;
        }

        if !holds_new_level(soil_moisture, t, median, step, config) {
            continue;
        }

        breaks.push(BreakEvent {
            index: t,
            timestamp: timestamps[t],
            magnitude: step,
            direction: if step < 0.0 {
                BreakDirection::Negative
            } else {
                BreakDirection::Positive
            },
        });
    }

    append_drops_to_zero(series, config, &mut breaks);
    breaks.sort_by_key(|event| event.index);
    breaks
}

/// Whether the valid points after the onset stay on the new side of the
/// pre-break median, at least `break_persistence` of the step away from it
fn holds_new_level(
    soil_moisture: &[f64],
    onset: usize,
    median: f64,
    step: f64,
    config: &DetectorConfig,
) -> bool {
    let needed = config.break_min_run - 1;
    let mut confirmed = 0;

    for value in soil_moisture.iter().skip(onset + 1) {
        if confirmed == needed {
            break;
        }
        if value.is_nan() {
            continue;
        }
        let offset = value - median;
        if offset * step <= 0.0 || offset.abs() < config.break_persistence * step.abs() {
            return false;
        }
        confirmed += 1;
    }

    confirmed == needed
}

/// Falls from above `drop_to_zero_min` to exactly zero register as negative
/// breaks even when the scored path cannot fire, e.g. right after a data gap.
fn append_drops_to_zero(series: &TimeSeries, config: &DetectorConfig, breaks: &mut Vec<BreakEvent>) {
    let soil_moisture = series.soil_moisture();
    let timestamps = series.timestamps();

    for t in 1..series.len() {
        if soil_moisture[t] == 0.0 && soil_moisture[t - 1] >= config.drop_to_zero_min {
            if breaks.iter().any(|event| event.index == t) {
                continue;
            }
            breaks.push(BreakEvent {
                index: t,
                timestamp: timestamps[t],
                magnitude: -soil_moisture[t - 1],
                direction: BreakDirection::Negative,
            });
        }
    }
}
