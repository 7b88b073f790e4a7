//! Training load model
//!
//! Rolls the activity history into acute (7-day) and chronic (28-day)
//! load, the acute:chronic workload ratio, and an injury risk tier.
//! Load is tracked in minutes; a heart-rate based stress proxy supplements
//! it for the weekly stress total.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::MetricValue;
use crate::constants::load as params;
use crate::models::ActivityRecord;

/// Injury risk tier from the acute:chronic workload ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    /// ACWR above 1.5
    High,
    /// ACWR above 1.3
    Elevated,
    /// ACWR at or below 1.3
    Optimal,
    /// Not enough chronic history to form a ratio
    InsufficientHistory,
}

impl RiskLevel {
    pub fn from_acwr(acwr: f64) -> Self {
        if acwr > params::ACWR_HIGH {
            Self::High
        } else if acwr > params::ACWR_ELEVATED {
            Self::Elevated
        } else {
            Self::Optimal
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "high injury risk, load ramping too fast",
            Self::Elevated => "elevated, watch the ramp rate",
            Self::Optimal => "optimal",
            Self::InsufficientHistory => "insufficient history",
        }
    }
}

/// Rolled-up training load for the brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Training minutes over the trailing 7 days
    pub acute_load_min: f64,
    /// Training minutes over the trailing 28 days (or all history if shorter)
    pub chronic_load_min: f64,
    /// Acute load against the weekly-equivalent chronic load
    pub acwr: MetricValue,
    /// Weekly-equivalent chronic load minus acute load; negative means
    /// this week ran hotter than the month's average
    pub stress_balance_min: MetricValue,
    /// Heart-rate stress proxy summed over the trailing 7 days
    pub weekly_stress: f64,
    /// Injury risk tier
    pub risk: RiskLevel,
}

/// Threshold heart rate inferred from the history: 85% of the highest
/// maximum heart rate on record, with a population fallback when no session
/// recorded one.
pub fn threshold_heart_rate(history: &[ActivityRecord]) -> f64 {
    let observed_max = history
        .iter()
        .filter_map(|a| a.max_heart_rate)
        .filter(|hr| *hr > 0.0)
        .fold(f64::NEG_INFINITY, f64::max);

    let max_hr = if observed_max.is_finite() {
        observed_max
    } else {
        params::DEFAULT_MAX_HR
    };
    max_hr * params::THRESHOLD_HR_FACTOR
}

/// Stress proxy for one session: hours at the square of relative intensity,
/// scaled to 100 points per threshold-hour. Sessions without heart rate fall
/// back to a flat per-minute credit.
pub fn session_stress(activity: &ActivityRecord, threshold_hr: f64) -> f64 {
    match activity.average_heart_rate {
        Some(avg_hr) if avg_hr > 0.0 && threshold_hr > 0.0 => {
            let intensity = avg_hr / threshold_hr;
            (activity.duration_seconds / 3600.0) * intensity * intensity * 100.0
        }
        _ => activity.duration_minutes() * params::NO_HR_STRESS_PER_MINUTE,
    }
}

/// Sum minutes of activities inside the trailing window. Records without a
/// timestamp cannot be windowed; they are counted in every window so that
/// totals never understate what the athlete did.
fn window_minutes(history: &[ActivityRecord], now: DateTime<Utc>, days: i64) -> f64 {
    let cutoff = now - Duration::days(days);
    history
        .iter()
        .filter(|a| match a.start_time {
            Some(start) => start > cutoff && start <= now,
            None => true,
        })
        .map(ActivityRecord::duration_minutes)
        .sum()
}

/// Compute the load summary as of `now`.
pub fn summarize(history: &[ActivityRecord], now: DateTime<Utc>) -> LoadSummary {
    let acute = window_minutes(history, now, params::ACUTE_WINDOW_DAYS);

    let earliest = history.iter().filter_map(|a| a.start_time).min();
    let span_days = earliest.map_or(0, |start| (now - start).num_days());

    // With under a week of history the chronic window is the acute window.
    let chronic = if span_days < params::ACUTE_WINDOW_DAYS {
        acute
    } else {
        window_minutes(history, now, params::CHRONIC_WINDOW_DAYS)
    };

    let threshold_hr = threshold_heart_rate(history);
    let week_cutoff = now - Duration::days(params::ACUTE_WINDOW_DAYS);
    let weekly_stress: f64 = history
        .iter()
        .filter(|a| match a.start_time {
            Some(start) => start > week_cutoff && start <= now,
            None => true,
        })
        .map(|a| session_stress(a, threshold_hr))
        .sum();

    let (acwr, stress_balance, risk) = if chronic > 0.0 {
        let chronic_weekly = chronic / 4.0;
        let ratio = acute / chronic_weekly;
        (
            MetricValue::Value(ratio),
            MetricValue::Value(chronic_weekly - acute),
            RiskLevel::from_acwr(ratio),
        )
    } else {
        (
            MetricValue::NotApplicable,
            MetricValue::NotApplicable,
            RiskLevel::InsufficientHistory,
        )
    };

    debug!(
        acute_min = acute,
        chronic_min = chronic,
        span_days,
        risk = ?risk,
        "load summary computed"
    );

    LoadSummary {
        acute_load_min: acute,
        chronic_load_min: chronic,
        acwr,
        stress_balance_min: stress_balance,
        weekly_stress,
        risk,
    }
}
