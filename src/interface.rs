//! Interface for applying ISMN quality control procedures to in-situ soil
//! moisture time series.
//!
//! The interface owns one validated [`TimeSeries`] and applies the requested
//! detectors to it, merging the per-detector masks into the `qflag` column
//! of the returned copy. Detectors whose required ancillary column or
//! parameter is absent are skipped silently. The only inter-detector
//! ordering constraint is that D09 consumes the break list of the
//! break/spike analyzer, which therefore runs (at most once per call)
//! whenever D06, D07, D08 or D09 is requested.
//!
//! For a description of the algorithms see Dorigo et al. (2013), "Global
//! Automated Quality Control of In Situ Soil Moisture Data from the
//! International Soil Moisture Network", Vadose Zone Journal,
//! doi:10.2136/vzj2012.0097.

use crate::config::{DetectorConfig, RunRequest};
use crate::detectors::analyzer::{analyze, AnalyzerOutput};
use crate::detectors::{flagged_count, plateau, rise, threshold, Mask};
use crate::error::Result;
use crate::merge::merge_masks;
use crate::models::{BreakDirection, TimeSeries};
use crate::taxonomy::{AncillaryVariable, FlagCode};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Entry point for quality control runs
#[derive(Debug, Clone)]
pub struct Interface {
    series: TimeSeries,
    sat_point: Option<f64>,
    config: DetectorConfig,
}

impl Interface {
    /// Wrap a validated time series with the default detector thresholds
    pub fn new(series: TimeSeries) -> Self {
        Self {
            series,
            sat_point: None,
            config: DetectorConfig::default(),
        }
    }

    /// Fix the site saturation point for every run; a per-run value on the
    /// request takes precedence
    pub fn with_sat_point(mut self, sat_point: f64) -> Self {
        self.sat_point = Some(sat_point);
        self
    }

    /// Replace the detector thresholds
    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// The wrapped series (flag column still empty)
    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    /// Apply the requested detectors and return the annotated series
    ///
    /// Pure with respect to the interface state: re-running the same request
    /// yields an identical flag column.
    pub fn run(&self, request: &RunRequest) -> Result<TimeSeries> {
        self.config.validate()?;

        let codes = request.resolved_detectors();
        let sat_point = request.sat_point.or(self.sat_point);

        // D09 depends on the break list; D06/D07/D08 share the same pass.
        let needs_analyzer = [FlagCode::D06, FlagCode::D07, FlagCode::D08, FlagCode::D09]
            .iter()
            .any(|code| codes.contains(code));
        let analysis = needs_analyzer.then(|| analyze(&self.series, &self.config));

        let mut masks: BTreeMap<FlagCode, Mask> = BTreeMap::new();
        for code in &codes {
            let mask = self.detector_mask(*code, sat_point, analysis.as_ref());
            debug!(
                "{} flagged {} of {} observations",
                code,
                flagged_count(&mask),
                self.series.len()
            );
            masks.insert(*code, mask);
        }

        let qflag = merge_masks(&self.series, &masks);
        let flagged = qflag
            .iter()
            .filter(|flags| !flags.is_empty() && !flags.contains(&FlagCode::Good))
            .count();
        info!(
            "quality control complete: {} detectors over {} observations, {} flagged",
            codes.len(),
            self.series.len(),
            flagged
        );

        let mut annotated = self.series.clone();
        annotated.set_qflag(qflag);
        Ok(annotated)
    }

    fn detector_mask(
        &self,
        code: FlagCode,
        sat_point: Option<f64>,
        analysis: Option<&AnalyzerOutput>,
    ) -> Mask {
        let series = &self.series;
        let config = &self.config;
        let len = series.len();

        match code {
            FlagCode::C01 => threshold::below_lower_bound(series, config),
            FlagCode::C02 => threshold::above_upper_bound(series, config),
            FlagCode::C03 => threshold::above_saturation(series, sat_point),
            FlagCode::D01 => threshold::frozen(series, config, AncillaryVariable::SoilTemperature),
            FlagCode::D02 => threshold::frozen(series, config, AncillaryVariable::AirTemperature),
            FlagCode::D03 => {
                threshold::frozen(series, config, AncillaryVariable::GldasSoilTemperature)
            }
            FlagCode::D04 => {
                rise::rise_without_precipitation(series, config, AncillaryVariable::Precipitation)
            }
            FlagCode::D05 => rise::rise_without_precipitation(
                series,
                config,
                AncillaryVariable::GldasPrecipitation,
            ),
            FlagCode::D06 => analysis
                .map(|output| output.spike_mask.clone())
                .unwrap_or_else(|| vec![false; len]),
            FlagCode::D07 => analysis
                .map(|output| output.break_mask(BreakDirection::Negative, len))
                .unwrap_or_else(|| vec![false; len]),
            FlagCode::D08 => analysis
                .map(|output| output.break_mask(BreakDirection::Positive, len))
                .unwrap_or_else(|| vec![false; len]),
            FlagCode::D09 => {
                let intervals = analysis
                    .map(|output| plateau::low_plateaus(series, &output.breaks, config))
                    .unwrap_or_default();
                plateau::intervals_to_mask(&intervals, len)
            }
            FlagCode::D10 => {
                let intervals = plateau::saturated_plateaus(series, sat_point, config);
                plateau::intervals_to_mask(&intervals, len)
            }
            // The merger assigns G; as a detector it contributes nothing.
            FlagCode::Good => vec![false; len],
        }
    }
}
