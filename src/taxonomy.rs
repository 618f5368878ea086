//! Flag taxonomy for ISMN-style soil moisture quality control.
//!
//! Defines the fixed set of flag codes, the ancillary variables some of them
//! require, and the static code → description → required-ancillary registry
//! exposed through [`flag_descriptions`]. The registry is a constant table;
//! it is never mutated at runtime.

use crate::error::FlagitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality control flag codes
///
/// `C` codes mark values outside the plausible geophysical range, `D` codes
/// mark dubious values, and `G` marks observations no detector objected to.
/// The derived ordering is the rendering order of a flag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlagCode {
    C01,
    C02,
    C03,
    D01,
    D02,
    D03,
    D04,
    D05,
    D06,
    D07,
    D08,
    D09,
    D10,
    #[serde(rename = "G")]
    Good,
}

/// All detector codes in execution order (excludes `G`, which is assigned by
/// the merger, never run as a detector)
pub const ALL_DETECTORS: &[FlagCode] = &[
    FlagCode::C01,
    FlagCode::C02,
    FlagCode::C03,
    FlagCode::D01,
    FlagCode::D02,
    FlagCode::D03,
    FlagCode::D04,
    FlagCode::D05,
    FlagCode::D06,
    FlagCode::D07,
    FlagCode::D08,
    FlagCode::D09,
    FlagCode::D10,
];

impl FlagCode {
    /// Flag id as it appears in the output column
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagCode::C01 => "C01",
            FlagCode::C02 => "C02",
            FlagCode::C03 => "C03",
            FlagCode::D01 => "D01",
            FlagCode::D02 => "D02",
            FlagCode::D03 => "D03",
            FlagCode::D04 => "D04",
            FlagCode::D05 => "D05",
            FlagCode::D06 => "D06",
            FlagCode::D07 => "D07",
            FlagCode::D08 => "D08",
            FlagCode::D09 => "D09",
            FlagCode::D10 => "D10",
            FlagCode::Good => "G",
        }
    }

    /// Numeric tag used by the alternative rendering mode
    pub fn number(&self) -> u8 {
        match self {
            FlagCode::C01 => 1,
            FlagCode::C02 => 2,
            FlagCode::C03 => 3,
            FlagCode::D01 => 4,
            FlagCode::D02 => 5,
            FlagCode::D03 => 6,
            FlagCode::D04 => 7,
            FlagCode::D05 => 8,
            FlagCode::D06 => 9,
            FlagCode::D07 => 10,
            FlagCode::D08 => 11,
            FlagCode::D09 => 12,
            FlagCode::D10 => 13,
            FlagCode::Good => 14,
        }
    }
}

impl fmt::Display for FlagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagCode {
    type Err = FlagitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C01" => Ok(FlagCode::C01),
            "C02" => Ok(FlagCode::C02),
            "C03" => Ok(FlagCode::C03),
            "D01" => Ok(FlagCode::D01),
            "D02" => Ok(FlagCode::D02),
            "D03" => Ok(FlagCode::D03),
            "D04" => Ok(FlagCode::D04),
            "D05" => Ok(FlagCode::D05),
            "D06" => Ok(FlagCode::D06),
            "D07" => Ok(FlagCode::D07),
            "D08" => Ok(FlagCode::D08),
            "D09" => Ok(FlagCode::D09),
            "D10" => Ok(FlagCode::D10),
            "G" => Ok(FlagCode::Good),
            other => Err(FlagitError::configuration(format!(
                "unknown flag code: {other}"
            ))),
        }
    }
}

/// Ancillary variables consumed by some detectors
///
/// The names double as the expected column names of the observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AncillaryVariable {
    SoilTemperature,
    AirTemperature,
    Precipitation,
    GldasSoilTemperature,
    GldasPrecipitation,
}

impl AncillaryVariable {
    /// Column name of this variable in the observation table
    pub fn as_str(&self) -> &'static str {
        match self {
            AncillaryVariable::SoilTemperature => "soil_temperature",
            AncillaryVariable::AirTemperature => "air_temperature",
            AncillaryVariable::Precipitation => "precipitation",
            AncillaryVariable::GldasSoilTemperature => "gldas_soil_temperature",
            AncillaryVariable::GldasPrecipitation => "gldas_precipitation",
        }
    }
}

impl fmt::Display for AncillaryVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the static flag registry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlagDescriptor {
    pub code: FlagCode,
    pub description: &'static str,
    /// Ancillary columns the detector needs; empty when it runs on soil
    /// moisture alone
    pub required_columns: &'static [AncillaryVariable],
    /// Whether the detector additionally needs the `sat_point` parameter
    pub requires_sat_point: bool,
}

const FLAG_REGISTRY: &[FlagDescriptor] = &[
    FlagDescriptor {
        code: FlagCode::C01,
        description: "soil moisture < 0 m³/m³",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::C02,
        description: "soil moisture > 0.60 m³/m³",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::C03,
        description: "soil moisture > saturation point",
        required_columns: &[],
        requires_sat_point: true,
    },
    FlagDescriptor {
        code: FlagCode::D01,
        description: "negative soil temperature (in situ)",
        required_columns: &[AncillaryVariable::SoilTemperature],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D02,
        description: "negative air temperature (in situ)",
        required_columns: &[AncillaryVariable::AirTemperature],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D03,
        description: "negative soil temperature (GLDAS)",
        required_columns: &[AncillaryVariable::GldasSoilTemperature],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D04,
        description: "rise in soil moisture without precipitation (in situ)",
        required_columns: &[AncillaryVariable::Precipitation],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D05,
        description: "rise in soil moisture without precipitation (GLDAS)",
        required_columns: &[AncillaryVariable::GldasPrecipitation],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D06,
        description: "spikes",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D07,
        description: "negative breaks (drops)",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D08,
        description: "positive breaks (jumps)",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D09,
        description: "constant low values following negative break",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::D10,
        description: "saturated plateaus",
        required_columns: &[],
        requires_sat_point: false,
    },
    FlagDescriptor {
        code: FlagCode::Good,
        description: "good",
        required_columns: &[],
        requires_sat_point: false,
    },
];

/// Static code → description → required-ancillary-data table
///
/// Pure accessor for documentation and UI purposes; performs no computation.
pub fn flag_descriptions() -> &'static [FlagDescriptor] {
    FLAG_REGISTRY
}

/// Look up the registry entry for one code
///
/// The registry is laid out in ISMN numbering order, so the code's number
/// is its index.
pub fn describe(code: FlagCode) -> &'static FlagDescriptor {
    &FLAG_REGISTRY[code.number() as usize - 1]
}
