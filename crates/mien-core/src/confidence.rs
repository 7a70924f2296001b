//! Distance-to-confidence calibration.
//!
//! Two scoring strategies coexist. The asymmetric curve rewards very close
//! matches super-linearly while decaying linearly past the threshold, so a
//! rejected candidate still carries a small, smoothly ranked score. The
//! older linear-threshold curve is a plain ramp that reports a hard zero
//! for anything at or beyond the threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Exponent of the super-linear boost term. Tuned value; changing it shifts
/// every reported confidence.
const BOOST_EXPONENT: f32 = 0.2;

/// Midpoint of the linear ramp where the boost term vanishes. Tuned value,
/// paired with [`BOOST_EXPONENT`].
const BOOST_MIDPOINT: f32 = 0.5;

#[derive(Error, Debug)]
#[error("unknown scoring strategy {0:?} (expected \"asymmetric\" or \"linear-threshold\")")]
pub struct ParseStrategyError(String);

/// Confidence scoring strategy, selected at matcher construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringStrategy {
    /// Super-linear reward near zero distance, linear falloff past the
    /// threshold.
    #[default]
    Asymmetric,
    /// Plain `1 - distance/threshold` ramp, zero at and beyond the
    /// threshold.
    LinearThreshold,
}

impl ScoringStrategy {
    /// Map a distance to a confidence in [0.0, 1.0].
    ///
    /// Deterministic and total for finite `distance >= 0` and a threshold
    /// in (0.0, 1.0]. Output is rounded to 2 decimal digits, half away
    /// from zero.
    pub fn score(&self, distance: f32, threshold: f32) -> f32 {
        match self {
            ScoringStrategy::Asymmetric => asymmetric(distance, threshold),
            ScoringStrategy::LinearThreshold => linear_threshold(distance, threshold),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringStrategy::Asymmetric => "asymmetric",
            ScoringStrategy::LinearThreshold => "linear-threshold",
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asymmetric" => Ok(ScoringStrategy::Asymmetric),
            "linear-threshold" => Ok(ScoringStrategy::LinearThreshold),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

fn asymmetric(distance: f32, threshold: f32) -> f32 {
    if distance > threshold {
        // Linear falloff for non-matches, floored at zero.
        let range = 1.0 - threshold;
        let raw = (1.0 - distance) / (range * 2.0);
        return clamp_unit(round2(raw.max(0.0)));
    }

    // Match regime: boost the linear ramp so confidence approaches 1.0
    // rapidly as distance approaches zero.
    let range = threshold;
    let linear = 1.0 - distance / (range * 2.0);
    // `linear` sits in [0.5, 1.0] whenever distance <= threshold, so the
    // boost base is non-negative; the clamp guards against float noise
    // driving a fractional power of a negative base.
    let boost_base = ((linear - BOOST_MIDPOINT) * 2.0).max(0.0);
    let confidence = linear + (1.0 - linear) * boost_base.powf(BOOST_EXPONENT);
    clamp_unit(round2(confidence.min(1.0)))
}

fn linear_threshold(distance: f32, threshold: f32) -> f32 {
    if distance >= threshold {
        return 0.0;
    }
    round2((1.0 - distance / threshold).max(0.0))
}

/// Round to 2 decimal digits, half away from zero.
fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

fn clamp_unit(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}
