// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Intelligence Module
//!
//! Analytics for the coaching brief. Each submodule owns one stage of the
//! pipeline:
//!
//! - [`metrics`]: per-sport performance extractors (decoupling, SWOLF,
//!   efficiency trend, FTP, brick lag, zone distribution)
//! - [`load`]: acute/chronic load, ACWR and injury risk
//! - [`periodization`]: phase detection and weekly targets
//! - [`recommendation`]: next-workout policy
//! - [`brief`]: assembly of the final coaching brief

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod brief;
pub mod load;
pub mod metrics;
pub mod periodization;
pub mod recommendation;

pub use brief::{generate_brief, CoachingBrief};
pub use load::{LoadSummary, RiskLevel};
pub use metrics::{EfficiencyTrend, FtpEstimate, ZoneDistribution};
pub use periodization::{PhasePlan, PhaseSnapshot, PhaseState};
pub use recommendation::{Recommendation, WorkoutType};

/// A metric that either has a value or is explicitly not applicable.
///
/// Downstream consumers must be able to tell "we measured zero" apart from
/// "we could not measure this", so unavailable metrics serialize as the
/// string `"N/A"` rather than `0` or `null`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    /// A computed value
    Value(f64),
    /// The metric could not be computed from the available data
    NotApplicable,
}

impl MetricValue {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::NotApplicable,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotApplicable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Render with one decimal place, or the sentinel text.
    pub fn display(&self) -> String {
        match self {
            Self::Value(v) => format!("{v:.1}"),
            Self::NotApplicable => "N/A".to_string(),
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for MetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(v) => Ok(Self::Value(v)),
            Raw::Text(s) if s == "N/A" => Ok(Self::NotApplicable),
            Raw::Text(other) => Err(serde::de::Error::custom(format!(
                "expected a number or \"N/A\", got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_value_serialization() {
        let value = MetricValue::Value(4.25);
        assert_eq!(serde_json::to_string(&value).unwrap(), "4.25");

        let na = MetricValue::NotApplicable;
        assert_eq!(serde_json::to_string(&na).unwrap(), "\"N/A\"");
    }

    #[test]
    fn test_metric_value_round_trip() {
        for original in [MetricValue::Value(12.5), MetricValue::NotApplicable] {
            let json = serde_json::to_string(&original).unwrap();
            let back: MetricValue = serde_json::from_str(&json).unwrap();
            assert_eq!(back, original);
        }
    }

    #[test]
    fn test_metric_value_rejects_other_strings() {
        let result: Result<MetricValue, _> = serde_json::from_str("\"missing\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_metric_value_display() {
        assert_eq!(MetricValue::Value(4.267).display(), "4.3");
        assert_eq!(MetricValue::NotApplicable.display(), "N/A");
    }
}
