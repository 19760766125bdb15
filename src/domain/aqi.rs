//! AQI categories and EPA concentration-to-index conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Health category for an AQI value, using EPA breakpoints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumIter,
)]
pub enum AqiCategory {
    #[serde(rename = "Good")]
    #[strum(serialize = "Good")]
    Good,
    #[serde(rename = "Moderate")]
    #[strum(serialize = "Moderate")]
    Moderate,
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    #[strum(serialize = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    #[serde(rename = "Unhealthy")]
    #[strum(serialize = "Unhealthy")]
    Unhealthy,
    #[serde(rename = "Very Unhealthy")]
    #[strum(serialize = "Very Unhealthy")]
    VeryUnhealthy,
    #[serde(rename = "Hazardous")]
    #[strum(serialize = "Hazardous")]
    Hazardous,
}

impl AqiCategory {
    /// Map an AQI value to its category.
    ///
    /// Upper breakpoints are inclusive: 50 is still Good, anything above 50
    /// up to and including 100 is Moderate, and so on. Values above 300 are
    /// Hazardous. Negative (and NaN) inputs land in Good.
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi.is_nan() || aqi <= 50.0 {
            Self::Good
        } else if aqi <= 100.0 {
            Self::Moderate
        } else if aqi <= 150.0 {
            Self::UnhealthyForSensitiveGroups
        } else if aqi <= 200.0 {
            Self::Unhealthy
        } else if aqi <= 300.0 {
            Self::VeryUnhealthy
        } else {
            Self::Hazardous
        }
    }

    /// Human-readable label, e.g. "Unhealthy for Sensitive Groups"
    pub fn label(&self) -> &str {
        self.as_ref()
    }
}

/// Categorize an AQI value
pub fn categorize(aqi: f64) -> AqiCategory {
    AqiCategory::from_aqi(aqi)
}

/// True when `aqi` is strictly above `threshold`
pub fn is_threshold_exceeded(aqi: f64, threshold: f64) -> bool {
    aqi > threshold
}

/// Pollutants with EPA breakpoint tables
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Pollutant {
    Pm25,
    Pm10,
    No2,
    O3,
    So2,
    Co,
}

/// (concentration low, concentration high, aqi low, aqi high)
type Breakpoint = (f64, f64, f64, f64);

const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
    (250.5, 500.4, 301.0, 500.0),
];

const PM10_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 54.0, 0.0, 50.0),
    (55.0, 154.0, 51.0, 100.0),
    (155.0, 254.0, 101.0, 150.0),
    (255.0, 354.0, 151.0, 200.0),
    (355.0, 424.0, 201.0, 300.0),
    (425.0, 604.0, 301.0, 500.0),
];

const NO2_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 53.0, 0.0, 50.0),
    (54.0, 100.0, 51.0, 100.0),
    (101.0, 360.0, 101.0, 150.0),
    (361.0, 649.0, 151.0, 200.0),
    (650.0, 1249.0, 201.0, 300.0),
    (1250.0, 2049.0, 301.0, 500.0),
];

const O3_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 54.0, 0.0, 50.0),
    (55.0, 70.0, 51.0, 100.0),
    (71.0, 85.0, 101.0, 150.0),
    (86.0, 105.0, 151.0, 200.0),
    (106.0, 200.0, 201.0, 300.0),
    (201.0, 500.0, 301.0, 500.0),
];

const SO2_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 35.0, 0.0, 50.0),
    (36.0, 75.0, 51.0, 100.0),
    (76.0, 185.0, 101.0, 150.0),
    (186.0, 304.0, 151.0, 200.0),
    (305.0, 604.0, 201.0, 300.0),
    (605.0, 1004.0, 301.0, 500.0),
];

const CO_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 4.4, 0.0, 50.0),
    (4.5, 9.4, 51.0, 100.0),
    (9.5, 12.4, 101.0, 150.0),
    (12.5, 15.4, 151.0, 200.0),
    (15.5, 30.4, 201.0, 300.0),
    (30.5, 50.4, 301.0, 500.0),
];

impl Pollutant {
    fn breakpoints(&self) -> &'static [Breakpoint; 6] {
        match self {
            Self::Pm25 => &PM25_BREAKPOINTS,
            Self::Pm10 => &PM10_BREAKPOINTS,
            Self::No2 => &NO2_BREAKPOINTS,
            Self::O3 => &O3_BREAKPOINTS,
            Self::So2 => &SO2_BREAKPOINTS,
            Self::Co => &CO_BREAKPOINTS,
        }
    }
}

/// Calculate the AQI for a single pollutant concentration.
///
/// Interpolates linearly inside the matching breakpoint segment. A
/// concentration that falls in the rounding gap between two segments
/// (e.g. 12.05 for PM2.5) is assigned the lower edge of the next segment.
/// Anything beyond the last breakpoint maps to 500. Returns `None` for
/// negative or non-finite concentrations.
pub fn calculate_aqi(concentration: f64, pollutant: Pollutant) -> Option<u32> {
    if !concentration.is_finite() || concentration < 0.0 {
        return None;
    }

    for &(c_low, c_high, aqi_low, aqi_high) in pollutant.breakpoints() {
        if concentration <= c_high {
            let clamped = concentration.max(c_low);
            let aqi = (aqi_high - aqi_low) / (c_high - c_low) * (clamped - c_low) + aqi_low;
            return Some(aqi.round() as u32);
        }
    }

    Some(500)
}

/// Daily AQI summary across several pollutants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAqi {
    /// Maximum of the per-pollutant AQIs
    pub aqi: u32,
    pub category: AqiCategory,
    /// Pollutant that produced the maximum
    pub dominant: Pollutant,
    pub breakdown: BTreeMap<Pollutant, u32>,
}

/// Combine per-pollutant measurements into the daily AQI.
///
/// Invalid concentrations are skipped; returns `None` if nothing valid remains.
pub fn daily_aqi(measurements: &[(Pollutant, f64)]) -> Option<DailyAqi> {
    let breakdown: BTreeMap<Pollutant, u32> = measurements
        .iter()
        .filter_map(|&(pollutant, concentration)| {
            calculate_aqi(concentration, pollutant).map(|aqi| (pollutant, aqi))
        })
        .collect();

    let (&dominant, &aqi) = breakdown.iter().max_by_key(|(_, aqi)| **aqi)?;

    Some(DailyAqi {
        aqi,
        category: AqiCategory::from_aqi(aqi as f64),
        dominant,
        breakdown,
    })
}
