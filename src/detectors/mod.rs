//! Detector set for soil moisture quality control
//!
//! Each detector is a pure function from the time series container (plus its
//! thresholds) to a boolean mask over the timestamp index. The modules group
//! detectors by mechanism:
//!
//! - [`threshold`] - plausible-range and freezing checks (C01-C03, D01-D03)
//! - [`rise`] - unexplained soil moisture rises (D04, D05)
//! - [`analyzer`] - shared rolling median/MAD scoring, spikes and breaks
//!   (D06-D08)
//! - [`plateau`] - constant-value runs (D09, D10)
//!
//! Detectors never mutate the container; masks are combined by
//! [`merge`](crate::merge) after all requested detectors ran.

pub mod analyzer;
pub mod plateau;
pub mod rise;
pub mod threshold;

/// Boolean mask aligned with the timestamp index
pub type Mask = Vec<bool>;

/// Mask with no timestamp flagged
pub fn empty_mask(len: usize) -> Mask {
    vec![false; len]
}

/// Number of flagged timestamps in a mask
pub fn flagged_count(mask: &Mask) -> usize {
    mask.iter().filter(|hit| **hit).count()
}
