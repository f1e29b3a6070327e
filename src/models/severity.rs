use crate::constants::{MODERATE_THRESHOLD, SEVERE_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flood severity bucket derived from an externally supplied score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Severe,
    Moderate,
    Light,
    None,
}

impl SeverityLevel {
    /// Map a score onto its bucket.
    ///
    /// `0.7` and `0.4` are inclusive lower bounds of Severe and Moderate.
    /// Anything that is not strictly positive (including NaN) is `None`.
    pub fn from_score(score: f64) -> Self {
        if score >= SEVERE_THRESHOLD {
            SeverityLevel::Severe
        } else if score >= MODERATE_THRESHOLD {
            SeverityLevel::Moderate
        } else if score > 0.0 {
            SeverityLevel::Light
        } else {
            SeverityLevel::None
        }
    }

    /// Stroke color used when drawing a road of this severity.
    pub fn color(&self) -> &'static str {
        match self {
            SeverityLevel::Severe => "red",
            SeverityLevel::Moderate => "orange",
            SeverityLevel::Light => "yellow",
            SeverityLevel::None => "green",
        }
    }

    /// Human-readable legend label.
    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Severe => "Severe",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Light => "Light",
            SeverityLevel::None => "No Flood",
        }
    }

    /// All levels, most severe first (legend order).
    pub fn all() -> [SeverityLevel; 4] {
        [
            SeverityLevel::Severe,
            SeverityLevel::Moderate,
            SeverityLevel::Light,
            SeverityLevel::None,
        ]
    }
}

/// Shorthand for `SeverityLevel::from_score(score).color()`.
pub fn severity_color(score: f64) -> &'static str {
    SeverityLevel::from_score(score).color()
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeverityLevel::Severe => "severe",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::Light => "light",
            SeverityLevel::None => "none",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for SeverityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "severe" => Ok(SeverityLevel::Severe),
            "moderate" => Ok(SeverityLevel::Moderate),
            "light" => Ok(SeverityLevel::Light),
            "none" | "no flood" => Ok(SeverityLevel::None),
            _ => Err(format!("Invalid severity level: {}", s)),
        }
    }
}

/// One row of the map legend.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LegendEntry {
    pub level: SeverityLevel,
    pub color: &'static str,
    pub label: &'static str,
}

pub fn legend() -> Vec<LegendEntry> {
    SeverityLevel::all()
        .into_iter()
        .map(|level| LegendEntry {
            level,
            color: level.color(),
            label: level.label(),
        })
        .collect()
}
