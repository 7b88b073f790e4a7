// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures for the training load and periodization engine.
//! These models provide a unified representation of wearable fitness data
//! regardless of which tracking service produced it.
//!
//! ## Design Principles
//!
//! - **Immutable records**: an [`ActivityRecord`] is created once at import
//!   time and only read afterwards; the engine derives new values from it.
//! - **Absence is a state**: wellness and sleep side-channels are optional,
//!   and missing data degrades to explicit sentinels, never fabricated zeros.
//! - **Serializable**: all models round-trip through JSON so a brief can be
//!   handed off to external tooling field-for-field.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One completed training session from the athlete's history.
///
/// # Examples
///
/// ```rust
/// use tricoach::models::{ActivityRecord, SportType};
/// use chrono::Utc;
///
/// let activity = ActivityRecord {
///     id: "12345".to_string(),
///     name: "Morning Run".to_string(),
///     sport: SportType::Running,
///     start_time: Some(Utc::now()),
///     duration_seconds: 5400.0, // 90 minutes
///     distance_meters: Some(15000.0),
///     average_heart_rate: Some(150.0),
///     max_heart_rate: Some(180.0),
///     average_speed: Some(2.78), // m/s
///     average_power: None,
///     max_20min_power: None,
///     zone_seconds: [600.0, 2400.0, 1800.0, 500.0, 100.0],
///     average_strokes: None,
///     average_cadence: Some(172.0),
/// };
/// assert!(activity.duration_minutes() > 89.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Provider-specific identifier
    pub id: String,
    /// Human-readable session name
    pub name: String,
    /// Sport classification
    pub sport: SportType,
    /// Session start (UTC). `None` when the source timestamp was
    /// unparseable; such records are retained rather than dropped so
    /// aggregate totals stay honest.
    pub start_time: Option<DateTime<Utc>>,
    /// Total duration in seconds
    pub duration_seconds: f64,
    /// Distance covered in meters, if the sport tracks one
    pub distance_meters: Option<f64>,
    /// Average heart rate (bpm)
    pub average_heart_rate: Option<f64>,
    /// Maximum heart rate reached (bpm)
    pub max_heart_rate: Option<f64>,
    /// Average speed in meters per second
    pub average_speed: Option<f64>,
    /// Average power output (watts), cycling only
    pub average_power: Option<f64>,
    /// Best 20-minute power (watts), cycling only
    pub max_20min_power: Option<f64>,
    /// Time spent in heart-rate zones 1-5, in seconds
    pub zone_seconds: [f64; 5],
    /// Average strokes per length, lap swimming only
    pub average_strokes: Option<f64>,
    /// Average cadence (steps or revolutions per minute)
    pub average_cadence: Option<f64>,
}

impl ActivityRecord {
    /// Session duration in minutes
    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }

    /// Total time with a recorded heart-rate zone, in seconds
    pub fn total_zone_seconds(&self) -> f64 {
        self.zone_seconds.iter().sum()
    }

    /// Running pace in minutes per kilometer, when speed is known and positive
    pub fn pace_min_per_km(&self) -> Option<f64> {
        match self.average_speed {
            Some(speed) if speed > 0.0 => Some((1000.0 / speed) / 60.0),
            _ => None,
        }
    }
}

/// Sport classification for an activity.
///
/// Provider type keys are collapsed into the families the engine reasons
/// about; everything else is carried through as [`SportType::Other`] so no
/// activity is silently dropped from load totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Outdoor, treadmill, trail or track running
    Running,
    /// Road, indoor, gravel or mountain cycling
    Cycling,
    /// Pool swimming (stroke counts available)
    LapSwimming,
    /// Open water swimming
    OpenWaterSwimming,
    /// Any sport the engine has no specific handling for
    Other(String),
}

impl SportType {
    /// Map a provider `typeKey` string onto the engine's sport families.
    pub fn from_type_key(type_key: &str) -> Self {
        match type_key {
            "running" | "treadmill_running" | "trail_running" | "track_running" => Self::Running,
            "cycling" | "road_biking" | "indoor_cycling" | "mountain_biking" | "gravel_cycling"
            | "virtual_ride" => Self::Cycling,
            "lap_swimming" => Self::LapSwimming,
            "open_water_swimming" => Self::OpenWaterSwimming,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_cycling(&self) -> bool {
        matches!(self, Self::Cycling)
    }

    pub fn is_lap_swim(&self) -> bool {
        matches!(self, Self::LapSwimming)
    }
}

/// Daily wellness reading from the tracking service.
///
/// The whole side-channel is optional; when present, individual fields may
/// still be absent depending on what the device measured that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellnessSample {
    /// Resting heart rate (bpm)
    pub resting_heart_rate: Option<f64>,
    /// Average stress level for the day (0-100)
    pub stress_average: Option<f64>,
    /// Peak body-battery charge for the day (0-100)
    pub body_battery_peak: Option<f64>,
}

/// One night of sleep data in whichever layout the provider used.
///
/// Providers have shipped at least three field layouts for the 0-100 sleep
/// score. Rather than guessing, the known shapes are probed in a fixed
/// priority order and the first present, in-range score wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SleepRecord {
    raw: serde_json::Value,
}

impl SleepRecord {
    pub fn new(raw: serde_json::Value) -> Self {
        Self { raw }
    }

    /// Extract the overall sleep score (0-100), trying each known payload
    /// shape in priority order.
    pub fn score(&self) -> Option<f64> {
        let candidates = [
            score_from_overall(&self.raw),
            score_from_sleep_scores(&self.raw),
            score_from_daily_dto(&self.raw),
        ];
        candidates
            .into_iter()
            .flatten()
            .find(|score| (0.0..=100.0).contains(score))
    }
}

/// Shape 1: `{"overallSleepScore": {"value": 82}}`
fn score_from_overall(raw: &serde_json::Value) -> Option<f64> {
    raw.get("overallSleepScore")?.get("value")?.as_f64()
}

/// Shape 2: `{"sleepScores": {"overall": {"value": 82}}}`
fn score_from_sleep_scores(raw: &serde_json::Value) -> Option<f64> {
    raw.get("sleepScores")?.get("overall")?.get("value")?.as_f64()
}

/// Shape 3: `{"dailySleepDTO": {"sleepScores": {"overall": {"value": 82}}}}`
fn score_from_daily_dto(raw: &serde_json::Value) -> Option<f64> {
    raw.get("dailySleepDTO")?
        .get("sleepScores")?
        .get("overall")?
        .get("value")?
        .as_f64()
}

/// Goal event the athlete is training toward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceGoal {
    /// Event date
    pub date: NaiveDate,
    /// Event format
    pub event: EventType,
    /// Priority tier (A races drive periodization)
    #[serde(default)]
    pub priority: Priority,
}

impl RaceGoal {
    /// Signed weeks until the event; negative after race day.
    pub fn weeks_to_event(&self, today: NaiveDate) -> f64 {
        let days = (self.date - today).num_days();
        days as f64 / 7.0
    }
}

/// Triathlon event formats the engine plans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Sprint,
    Olympic,
    HalfDistance,
    FullDistance,
    /// Multi-day stage format (several short races back to back); plans
    /// shift toward repeatability over single-day peak output.
    MultiDayStage,
}

impl EventType {
    /// Parse an event type key as found in configuration.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "sprint" => Some(Self::Sprint),
            "olympic" => Some(Self::Olympic),
            "half_distance" | "half" => Some(Self::HalfDistance),
            "full_distance" | "full" => Some(Self::FullDistance),
            // "triple_t" is the legacy key for the multi-day stage format
            "multi_day_stage" | "triple_t" => Some(Self::MultiDayStage),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Sprint => "sprint",
            Self::Olympic => "olympic",
            Self::HalfDistance => "half distance",
            Self::FullDistance => "full distance",
            Self::MultiDayStage => "multi-day stage race",
        }
    }
}

/// Race priority tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    A,
    B,
    C,
}

impl Priority {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "A" | "a" => Some(Self::A),
            "B" | "b" => Some(Self::B),
            "C" | "c" => Some(Self::C),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::A
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn sample_run() -> ActivityRecord {
        ActivityRecord {
            id: "12345".to_string(),
            name: "Morning Run".to_string(),
            sport: SportType::Running,
            start_time: Some(Utc::now()),
            duration_seconds: 5400.0,
            distance_meters: Some(15000.0),
            average_heart_rate: Some(150.0),
            max_heart_rate: Some(180.0),
            average_speed: Some(2.78),
            average_power: None,
            max_20min_power: None,
            zone_seconds: [600.0, 2400.0, 1800.0, 500.0, 100.0],
            average_strokes: None,
            average_cadence: Some(172.0),
        }
    }

    #[test]
    fn test_activity_derived_values() {
        let activity = sample_run();
        assert_eq!(activity.duration_minutes(), 90.0);
        assert_eq!(activity.total_zone_seconds(), 5400.0);

        let pace = activity.pace_min_per_km().unwrap();
        assert!((pace - 5.995).abs() < 0.01);
    }

    #[test]
    fn test_pace_undefined_without_speed() {
        let mut activity = sample_run();
        activity.average_speed = None;
        assert_eq!(activity.pace_min_per_km(), None);

        activity.average_speed = Some(0.0);
        assert_eq!(activity.pace_min_per_km(), None);
    }

    #[test]
    fn test_activity_serialization_round_trip() {
        let activity = sample_run();
        let json = serde_json::to_string(&activity).expect("serialize activity");
        let back: ActivityRecord = serde_json::from_str(&json).expect("deserialize activity");
        assert_eq!(back, activity);
    }

    #[test]
    fn test_sport_type_from_type_key() {
        assert_eq!(SportType::from_type_key("running"), SportType::Running);
        assert_eq!(
            SportType::from_type_key("treadmill_running"),
            SportType::Running
        );
        assert_eq!(
            SportType::from_type_key("indoor_cycling"),
            SportType::Cycling
        );
        assert_eq!(
            SportType::from_type_key("lap_swimming"),
            SportType::LapSwimming
        );
        assert_eq!(
            SportType::from_type_key("yoga"),
            SportType::Other("yoga".to_string())
        );
    }

    #[test]
    fn test_sleep_score_shape_priority() {
        let overall = SleepRecord::new(json!({"overallSleepScore": {"value": 82}}));
        assert_eq!(overall.score(), Some(82.0));

        let scores = SleepRecord::new(json!({"sleepScores": {"overall": {"value": 75}}}));
        assert_eq!(scores.score(), Some(75.0));

        let dto = SleepRecord::new(json!({
            "dailySleepDTO": {"sleepScores": {"overall": {"value": 64}}}
        }));
        assert_eq!(dto.score(), Some(64.0));

        // First present shape wins
        let both = SleepRecord::new(json!({
            "overallSleepScore": {"value": 90},
            "sleepScores": {"overall": {"value": 10}}
        }));
        assert_eq!(both.score(), Some(90.0));
    }

    #[test]
    fn test_sleep_score_rejects_out_of_range() {
        let bogus = SleepRecord::new(json!({"overallSleepScore": {"value": 250}}));
        assert_eq!(bogus.score(), None);

        let empty = SleepRecord::new(json!({"unrelated": true}));
        assert_eq!(empty.score(), None);
    }

    #[test]
    fn test_weeks_to_event_sign() {
        let goal = RaceGoal {
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            event: EventType::Olympic,
            priority: Priority::A,
        };
        let before = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let after = NaiveDate::from_ymd_opt(2025, 6, 22).unwrap();
        assert!(goal.weeks_to_event(before) > 0.0);
        assert!(goal.weeks_to_event(after) < 0.0);
        assert_eq!(goal.weeks_to_event(goal.date), 0.0);
    }

    #[test]
    fn test_event_type_keys() {
        assert_eq!(EventType::from_key("sprint"), Some(EventType::Sprint));
        assert_eq!(
            EventType::from_key("multi_day_stage"),
            Some(EventType::MultiDayStage)
        );
        assert_eq!(
            EventType::from_key("triple_t"),
            Some(EventType::MultiDayStage)
        );
        assert_eq!(EventType::from_key("duathlon"), None);
    }
}
