//! flagit - automated quality control for in-situ soil moisture time series
//!
//! This library reproduces the ISMN (International Soil Moisture Network)
//! quality control procedures for hourly in-situ soil moisture
//! observations. Given a timestamp-indexed observation table with soil
//! moisture and optional ancillary variables, it assigns each observation
//! zero or more flags from a fixed taxonomy - range violations (C01-C03),
//! freezing conditions (D01-D03), unexplained rises (D04-D05), spikes
//! (D06), breaks (D07-D08), plateaus (D09-D10) - or marks it good (`G`).
//!
//! The library provides:
//! - A validated time series container with per-column access and a flag
//!   column ([`TimeSeries`], [`TimeSeriesBuilder`])
//! - Independent detector functions producing boolean masks
//!   ([`detectors`])
//! - A rolling median/MAD analyzer shared by the spike, break and plateau
//!   detectors ([`detectors::analyzer`])
//! - A merger resolving the final per-timestamp flag set ([`merge`])
//! - The [`Interface`] entry point orchestrating a run
//!
//! Loading observation tables from files, reanalysis retrieval and
//! visualization are left to collaborating tools.
//!
//! # Example
//!
//! ```
//! use flagit::{Interface, RunRequest, TimeSeriesBuilder};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! # fn main() -> flagit::Result<()> {
//! let start = Utc.with_ymd_and_hms(2020, 6, 1, 0, 0, 0).unwrap();
//! let timestamps = (0..6i64).map(|i| start + Duration::hours(i)).collect();
//! let soil_moisture = vec![0.21, 0.22, -0.05, 0.23, f64::NAN, 0.24];
//!
//! let series = TimeSeriesBuilder::new(timestamps, soil_moisture).build()?;
//! let annotated = Interface::new(series).run(&RunRequest::all())?;
//!
//! assert_eq!(
//!     annotated.flag_strings(),
//!     vec!["G", "G", "C01", "G", "", "G"]
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod detectors;
pub mod error;
pub mod interface;
pub mod merge;
pub mod models;
pub mod taxonomy;

// Re-export commonly used types
pub use config::{DetectorConfig, RunRequest};
pub use error::{FlagitError, Result};
pub use interface::Interface;
pub use models::{BreakDirection, BreakEvent, PlateauInterval, TimeSeries, TimeSeriesBuilder};
pub use taxonomy::{flag_descriptions, AncillaryVariable, FlagCode, FlagDescriptor};
