//! Flag merger: combines per-detector masks into the final flag column.
//!
//! Flags are additive; every code whose mask includes a timestamp is
//! retained, in code order. `G` goes only to timestamps with no applicable
//! code and a present soil moisture value. Missing soil moisture values pass
//! through unflagged regardless of what any mask says, which keeps the
//! missing-data invariant in one place instead of in thirteen detectors.
//!
//! The merge is associative and order-independent: the result depends only
//! on the set of (code, mask) pairs, not on the order detectors ran.

use crate::detectors::Mask;
use crate::models::TimeSeries;
use crate::taxonomy::FlagCode;
use std::collections::{BTreeMap, BTreeSet};

/// Combine detector masks into one ordered flag set per timestamp
pub fn merge_masks(
    series: &TimeSeries,
    masks: &BTreeMap<FlagCode, Mask>,
) -> Vec<BTreeSet<FlagCode>> {
    let mut qflag = vec![BTreeSet::new(); series.len()];

    for (code, mask) in masks {
        for (t, hit) in mask.iter().enumerate() {
            if *hit && !series.is_missing(t) {
                qflag[t].insert(*code);
            }
        }
    }

    for (t, flags) in qflag.iter_mut().enumerate() {
        if flags.is_empty() && !series.is_missing(t) {
            flags.insert(FlagCode::Good);
        }
    }

    qflag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSeriesBuilder;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn hourly_index(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::hours(i as i64)).collect()
    }

    fn series_with(values: Vec<f64>) -> TimeSeries {
        TimeSeriesBuilder::new(hourly_index(values.len()), values)
            .build()
            .unwrap()
    }

    #[test]
    fn test_multiple_codes_are_retained_in_order() {
        let series = series_with(vec![0.2, 0.2, 0.2]);
        let mut masks = BTreeMap::new();
        masks.insert(FlagCode::D08, vec![false, true, false]);
        masks.insert(FlagCode::D06, vec![false, true, false]);

        let qflag = merge_masks(&series, &masks);
        let codes: Vec<FlagCode> = qflag[1].iter().copied().collect();
        assert_eq!(codes, vec![FlagCode::D06, FlagCode::D08]);
    }

    #[test]
    fn test_good_is_assigned_only_to_clean_present_values() {
        let series = series_with(vec![0.2, -0.1, f64::NAN]);
        let mut masks = BTreeMap::new();
        masks.insert(FlagCode::C01, vec![false, true, false]);

        let qflag = merge_masks(&series, &masks);
        assert!(qflag[0].contains(&FlagCode::Good));
        assert_eq!(qflag[0].len(), 1);
        assert!(qflag[1].contains(&FlagCode::C01));
        assert!(!qflag[1].contains(&FlagCode::Good));
        assert!(qflag[2].is_empty());
    }

    #[test]
    fn test_missing_soil_moisture_is_never_flagged() {
        // A detector mask wrongly covering a missing value is ignored.
        let series = series_with(vec![f64::NAN, 0.2]);
        let mut masks = BTreeMap::new();
        masks.insert(FlagCode::D01, vec![true, false]);

        let qflag = merge_masks(&series, &masks);
        assert!(qflag[0].is_empty());
    }

    #[test]
    fn test_merge_is_independent_of_mask_insertion_order() {
        let series = series_with(vec![0.2, 0.2]);

        let mut forward = BTreeMap::new();
        forward.insert(FlagCode::C01, vec![true, false]);
        forward.insert(FlagCode::D10, vec![true, true]);

        let mut reverse = BTreeMap::new();
        reverse.insert(FlagCode::D10, vec![true, true]);
        reverse.insert(FlagCode::C01, vec![true, false]);

        assert_eq!(merge_masks(&series, &forward), merge_masks(&series, &reverse));
    }
}
