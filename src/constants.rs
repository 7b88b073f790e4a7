// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Physiological thresholds and analysis parameters used across the engine.
//! Every tunable the heuristics depend on lives here so a reviewer can audit
//! the numbers in one place.

/// Training load model parameters
pub mod load {
    /// Acute load window in days
    pub const ACUTE_WINDOW_DAYS: i64 = 7;

    /// Chronic load window in days
    pub const CHRONIC_WINDOW_DAYS: i64 = 28;

    /// ACWR above this is a high injury risk (strict inequality)
    pub const ACWR_HIGH: f64 = 1.5;

    /// ACWR above this is elevated (strict inequality)
    pub const ACWR_ELEVATED: f64 = 1.3;

    /// Threshold heart rate as a fraction of observed maximum
    pub const THRESHOLD_HR_FACTOR: f64 = 0.85;

    /// Fallback maximum heart rate when no session recorded one (bpm)
    pub const DEFAULT_MAX_HR: f64 = 185.0;

    /// Stress-proxy points per minute for sessions without heart rate
    pub const NO_HR_STRESS_PER_MINUTE: f64 = 0.8;
}

/// Performance metric parameters
pub mod metrics {
    /// Minimum session duration for a decoupling estimate (minutes)
    pub const DECOUPLING_MIN_DURATION_MIN: f64 = 60.0;

    /// Reference duration the decoupling estimate is scaled against (minutes)
    pub const DECOUPLING_REFERENCE_MIN: f64 = 120.0;

    /// Ceiling on the decoupling estimate (percent)
    pub const DECOUPLING_CAP_PCT: f64 = 15.0;

    /// Assumed pool length for SWOLF (meters)
    pub const POOL_LENGTH_M: f64 = 25.0;

    /// Relative change below which a bike efficiency trend reads as stable
    pub const EF_TREND_DEADBAND: f64 = 0.05;

    /// Minimum rides with an efficiency factor before a trend is reported
    pub const EF_MIN_SESSIONS: usize = 2;

    /// FTP as a fraction of best 20-minute power
    pub const FTP_FROM_20MIN_FACTOR: f64 = 0.95;

    /// Maximum gap between a ride and a run for a brick pairing (minutes)
    pub const BRICK_MAX_GAP_MIN: f64 = 30.0;
}

/// Recommendation policy thresholds
pub mod policy {
    /// Share of zone time in Z4-Z5 above which intensity is overcooked (percent)
    pub const ZONE_HARD_MAX_PCT: f64 = 30.0;

    /// Share of zone time in Z1-Z2 below which the base is too thin (percent)
    pub const ZONE_EASY_MIN_PCT: f64 = 70.0;

    /// Run decoupling above this signals fading aerobic durability (percent)
    pub const DECOUPLING_LIMIT_PCT: f64 = 5.0;

    /// Lap-swim SWOLF above this flags technique work (score)
    pub const SWOLF_TECHNIQUE_LIMIT: f64 = 40.0;
}

/// Readiness heuristics
pub mod readiness {
    /// Recent activity HR above overall mean by this factor reads as elevated
    pub const HR_ELEVATED_FACTOR: f64 = 1.02;

    /// Sessions in the recent window for the activity-HR fallback
    pub const HR_RECENT_SESSIONS: usize = 7;

    /// Nights of sleep averaged for the sleep score
    pub const SLEEP_WINDOW_NIGHTS: usize = 7;
}

/// Default analysis parameters
pub mod defaults {
    /// History window the brief analyzes (days)
    pub const ANALYSIS_DAYS: i64 = 60;

    /// Athlete display name when none is configured
    pub const ATHLETE_NAME: &str = "athlete";
}
