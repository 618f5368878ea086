//! Integration tests for the quality control interface
//!
//! These tests exercise the full pipeline - container validation, detector
//! execution, dependency resolution and flag merging - through the public
//! API, covering the documented behavior of every flag code.

use chrono::{DateTime, Duration, TimeZone, Utc};
use flagit::{
    flag_descriptions, AncillaryVariable, FlagCode, FlagitError, Interface, RunRequest,
    TimeSeriesBuilder,
};

fn hourly_index(n: usize) -> Vec<DateTime<Utc>> {
    let start = Utc.with_ymd_and_hms(2021, 4, 1, 0, 0, 0).unwrap();
    (0..n).map(|i| start + Duration::hours(i as i64)).collect()
}

fn builder(values: Vec<f64>) -> TimeSeriesBuilder {
    TimeSeriesBuilder::new(hourly_index(values.len()), values)
}

// =============================================================================
// Schema and configuration failures
// =============================================================================

#[test]
fn unsorted_index_fails_before_any_detector_runs() {
    let mut index = hourly_index(4);
    index.swap(1, 2);
    let err = TimeSeriesBuilder::new(index, vec![0.2; 4]).build().unwrap_err();
    assert!(matches!(err, FlagitError::Schema { .. }));
}

#[test]
fn duplicate_timestamps_fail_before_any_detector_runs() {
    let mut index = hourly_index(4);
    index[3] = index[2];
    let err = TimeSeriesBuilder::new(index, vec![0.2; 4]).build().unwrap_err();
    assert!(matches!(err, FlagitError::Schema { .. }));
}

#[test]
fn unknown_code_is_a_configuration_error_and_produces_no_output() {
    let err = RunRequest::from_names(&["Z99"]).unwrap_err();
    assert!(matches!(err, FlagitError::Configuration { .. }));
    assert!(err.to_string().contains("Z99"));
}

// =============================================================================
// Range detectors
// =============================================================================

#[test]
fn c01_boundary_behavior() {
    let series = builder(vec![-0.01, 0.0, 0.2]).build().unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::C01))
        .unwrap();
    assert_eq!(annotated.flag_strings(), vec!["C01", "G", "G"]);
}

#[test]
fn c02_boundary_is_exclusive_above_060() {
    let series = builder(vec![0.61, 0.60, 0.2]).build().unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::C02))
        .unwrap();
    assert_eq!(annotated.flag_strings(), vec!["C02", "G", "G"]);
}

#[test]
fn c03_requires_a_saturation_point() {
    let series = builder(vec![0.41, 0.40, 0.99]).build().unwrap();
    let interface = Interface::new(series);

    // Without sat_point, C03 never fires regardless of value.
    let annotated = interface.run(&RunRequest::single(FlagCode::C03)).unwrap();
    assert_eq!(annotated.flag_strings(), vec!["G", "G", "G"]);

    let request = RunRequest::single(FlagCode::C03).with_sat_point(0.40);
    let annotated = interface.run(&request).unwrap();
    assert_eq!(annotated.flag_strings(), vec!["C03", "G", "C03"]);
}

#[test]
fn temperature_detectors_fire_below_zero_and_skip_absent_columns() {
    let cases = [
        (AncillaryVariable::SoilTemperature, FlagCode::D01),
        (AncillaryVariable::AirTemperature, FlagCode::D02),
        (AncillaryVariable::GldasSoilTemperature, FlagCode::D03),
    ];

    for (variable, code) in cases {
        let series = builder(vec![0.2, 0.2, 0.2])
            .with_column(variable, vec![-0.1, 0.0, 5.0])
            .build()
            .unwrap();
        let annotated = Interface::new(series).run(&RunRequest::single(code)).unwrap();
        assert_eq!(
            annotated.flag_strings(),
            vec![code.as_str(), "G", "G"],
            "boundary behavior for {code}"
        );

        // Entirely absent column: zero flags, no error.
        let series = builder(vec![0.2, 0.2, 0.2]).build().unwrap();
        let annotated = Interface::new(series).run(&RunRequest::single(code)).unwrap();
        assert_eq!(annotated.flag_strings(), vec!["G", "G", "G"]);
    }
}

// =============================================================================
// Rise detectors
// =============================================================================

#[test]
fn d04_flags_dry_rises_and_respects_rain_events() {
    let mut values = vec![0.20; 30];
    for value in values.iter_mut().skip(15) {
        *value = 0.26;
    }

    let dry = builder(values.clone())
        .with_column(AncillaryVariable::Precipitation, vec![0.0; 30])
        .build()
        .unwrap();
    let annotated = Interface::new(dry).run(&RunRequest::single(FlagCode::D04)).unwrap();
    assert_eq!(annotated.flag_strings()[15], "D04");

    let mut rain = vec![0.0; 30];
    rain[14] = 2.5;
    let wet = builder(values)
        .with_column(AncillaryVariable::Precipitation, rain)
        .build()
        .unwrap();
    let annotated = Interface::new(wet).run(&RunRequest::single(FlagCode::D04)).unwrap();
    assert!(annotated.flag_strings().iter().all(|flag| flag == "G"));
}

#[test]
fn d05_uses_gldas_precipitation_and_skips_when_absent() {
    let mut values = vec![0.20; 30];
    for value in values.iter_mut().skip(15) {
        *value = 0.26;
    }

    let series = builder(values.clone())
        .with_column(AncillaryVariable::GldasPrecipitation, vec![0.0; 30])
        .build()
        .unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::D05))
        .unwrap();
    assert_eq!(annotated.flag_strings()[15], "D05");

    let series = builder(values).build().unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::D05))
        .unwrap();
    assert!(annotated.flag_strings().iter().all(|flag| flag == "G"));
}

// =============================================================================
// Spike, break and plateau detectors
// =============================================================================

#[test]
fn isolated_deviation_is_a_spike_and_sustained_deviation_is_a_break() {
    // One deviant point surrounded by stable neighbors: spike, not break.
    let mut values = vec![0.25; 40];
    values[30] = 0.30;
    let series = builder(values).build().unwrap();
    let annotated = Interface::new(series).run(&RunRequest::all()).unwrap();
    let strings = annotated.flag_strings();
    assert_eq!(strings[30], "D06");
    assert!(!strings.iter().any(|flag| flag.contains("D07") || flag.contains("D08")));

    // The same deviation sustained: break, not spike.
    let mut values = vec![0.25; 40];
    for value in values.iter_mut().skip(30) {
        *value = 0.30;
    }
    let series = builder(values).build().unwrap();
    let annotated = Interface::new(series).run(&RunRequest::all()).unwrap();
    let strings = annotated.flag_strings();
    assert!(strings[30].contains("D08"));
    assert!(!strings.iter().any(|flag| flag.contains("D06")));
}

#[test]
fn negative_break_followed_by_constant_low_values() {
    let mut values = vec![0.30; 25];
    values.extend(vec![0.05; 15]);
    let series = builder(values).build().unwrap();
    let request = RunRequest::from_names(&["D07", "D08", "D09"]).unwrap();
    let annotated = Interface::new(series).run(&request).unwrap();
    let strings = annotated.flag_strings();

    assert!(strings[25].contains("D07"));
    assert!(strings[25].contains("D09"));
    for flag in strings.iter().take(40).skip(26) {
        assert!(flag.contains("D09"), "expected D09 in {flag}");
    }
    assert_eq!(strings[24], "G");
}

#[test]
fn saturated_plateau_requires_a_run_of_matching_values() {
    let mut values = vec![0.20; 30];
    for value in values.iter_mut().skip(10).take(6) {
        *value = 0.35;
    }
    let series = builder(values).build().unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::D10))
        .unwrap();
    let strings = annotated.flag_strings();
    for (t, flag) in strings.iter().enumerate() {
        if (10..16).contains(&t) {
            assert_eq!(flag, "D10");
        } else {
            assert_eq!(flag, "G");
        }
    }

    // A single matching value with non-matching neighbors is not flagged.
    let mut values = vec![0.20; 30];
    values[10] = 0.35;
    let series = builder(values).build().unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::D10))
        .unwrap();
    assert!(annotated.flag_strings().iter().all(|flag| flag == "G"));
}

#[test]
fn constant_midrange_series_is_not_a_saturated_plateau() {
    // Without a saturation point the reference is the series' own maximum;
    // a healthy constant series must not saturate against itself.
    let series = builder(vec![0.25; 48]).build().unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::D10))
        .unwrap();
    assert!(annotated.flag_strings().iter().all(|flag| flag == "G"));
}

// =============================================================================
// Merge semantics
// =============================================================================

#[test]
fn missing_soil_moisture_is_passed_through_unflagged() {
    let mut values = vec![0.2; 20];
    values[5] = f64::NAN;
    let series = builder(values)
        .with_column(AncillaryVariable::SoilTemperature, vec![-2.0; 20])
        .build()
        .unwrap();
    let annotated = Interface::new(series)
        .run(&RunRequest::single(FlagCode::D01))
        .unwrap();

    // The frozen-soil detector covers every timestamp, yet the missing value
    // carries neither a code nor G.
    let strings = annotated.flag_strings();
    assert_eq!(strings[5], "");
    for (t, flag) in strings.iter().enumerate() {
        if t != 5 {
            assert_eq!(flag, "D01");
        }
    }
}

#[test]
fn good_means_no_detector_fired_and_value_present() {
    let series = builder(vec![0.2, -0.1, f64::NAN, 0.3]).build().unwrap();
    let annotated = Interface::new(series).run(&RunRequest::all()).unwrap();

    for (flags, &value) in annotated.qflag().iter().zip(annotated.soil_moisture()) {
        if flags.contains(&FlagCode::Good) {
            assert_eq!(flags.len(), 1);
            assert!(!value.is_nan());
        }
    }
}

#[test]
fn flags_are_additive_when_multiple_detectors_fire() {
    let mut values = vec![0.30; 30];
    values.extend(vec![0.65; 10]);
    let series = builder(values).build().unwrap();
    let annotated = Interface::new(series).run(&RunRequest::all()).unwrap();

    // The jump to 0.65 violates the plausible range and is a positive break.
    let strings = annotated.flag_strings();
    assert!(strings[30].contains("C02"));
    assert!(strings[30].contains("D08"));
}

#[test]
fn runs_are_idempotent() {
    let mut values = vec![0.25; 40];
    values[20] = 0.31;
    values[35] = f64::NAN;
    let series = builder(values)
        .with_column(AncillaryVariable::Precipitation, vec![0.0; 40])
        .build()
        .unwrap();
    let interface = Interface::new(series).with_sat_point(0.45);

    let first = interface.run(&RunRequest::all()).unwrap();
    let second = interface.run(&RunRequest::all()).unwrap();
    assert_eq!(first.flag_strings(), second.flag_strings());
}

#[test]
fn execution_order_does_not_change_the_result() {
    let mut values = vec![0.25; 40];
    values[20] = 0.31;
    values.extend(vec![0.05; 15]);
    let series = builder(values)
        .with_column(AncillaryVariable::AirTemperature, vec![-1.0; 55])
        .build()
        .unwrap();
    let interface = Interface::new(series);

    let forward = RunRequest::from_names(&["C01", "D02", "D06", "D07", "D09"]).unwrap();
    let reverse = RunRequest::from_names(&["D09", "D07", "D06", "D02", "C01"]).unwrap();
    let shuffled = RunRequest::from_names(&["D06", "C01", "D09", "D02", "D07"]).unwrap();

    let baseline = interface.run(&forward).unwrap().flag_strings();
    assert_eq!(interface.run(&reverse).unwrap().flag_strings(), baseline);
    assert_eq!(interface.run(&shuffled).unwrap().flag_strings(), baseline);
}

// =============================================================================
// Static taxonomy accessor
// =============================================================================

#[test]
fn flag_description_table_is_complete_and_pure() {
    let table = flag_descriptions();
    assert_eq!(table.len(), 14);

    let d05 = table
        .iter()
        .find(|descriptor| descriptor.code == FlagCode::D05)
        .unwrap();
    assert_eq!(
        d05.required_columns,
        &[AncillaryVariable::GldasPrecipitation]
    );
    assert!(d05.description.contains("GLDAS"));

    // Same static table on every call.
    assert_eq!(flag_descriptions(), table);
}
