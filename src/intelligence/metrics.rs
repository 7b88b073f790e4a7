//! Per-sport performance metric extractors
//!
//! Each extractor consumes the activity history and produces either a value
//! or an explicit "not applicable". None of them mutate the history or
//! depend on anything outside their arguments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MetricValue;
use crate::constants::metrics as params;
use crate::models::ActivityRecord;

/// Aerobic decoupling estimate for a single session, in percent.
///
/// True decoupling needs second-by-second streams; summary data only gives
/// averages, so this proxies it from the heart-rate range scaled by how far
/// past the reference duration the session ran. Defined only for sessions of
/// at least an hour with nonzero average and maximum heart rate, a recorded
/// speed and heart-rate zone data.
pub fn session_decoupling(activity: &ActivityRecord) -> Option<f64> {
    let avg_hr = activity.average_heart_rate?;
    let max_hr = activity.max_heart_rate?;
    let speed = activity.average_speed?;
    let duration_min = activity.duration_minutes();

    if duration_min < params::DECOUPLING_MIN_DURATION_MIN
        || avg_hr <= 0.0
        || max_hr <= 0.0
        || speed <= 0.0
        || activity.total_zone_seconds() <= 0.0
    {
        return None;
    }

    let hr_drift = (max_hr - avg_hr) / avg_hr;
    let estimate = hr_drift * (duration_min / params::DECOUPLING_REFERENCE_MIN) * 100.0;
    Some(estimate.min(params::DECOUPLING_CAP_PCT))
}

/// Mean decoupling estimate across qualifying runs.
pub fn run_decoupling(history: &[ActivityRecord]) -> MetricValue {
    let estimates: Vec<f64> = history
        .iter()
        .filter(|a| a.sport.is_running())
        .filter_map(session_decoupling)
        .collect();

    if estimates.is_empty() {
        MetricValue::NotApplicable
    } else {
        MetricValue::Value(estimates.iter().sum::<f64>() / estimates.len() as f64)
    }
}

/// Share of heart-rate zone time in easy, tempo and hard bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneDistribution {
    /// Zones 1-2 share of total zone time (percent)
    pub easy_pct: MetricValue,
    /// Zone 3 share (percent)
    pub tempo_pct: MetricValue,
    /// Zones 4-5 share (percent)
    pub hard_pct: MetricValue,
}

impl ZoneDistribution {
    pub fn not_applicable() -> Self {
        Self {
            easy_pct: MetricValue::NotApplicable,
            tempo_pct: MetricValue::NotApplicable,
            hard_pct: MetricValue::NotApplicable,
        }
    }
}

/// Aggregate zone distribution over the whole history.
///
/// Activities without zone data contribute nothing; if no activity recorded
/// zone time the distribution is not applicable rather than all zeros.
pub fn zone_distribution(history: &[ActivityRecord]) -> ZoneDistribution {
    let mut zones = [0.0f64; 5];
    for activity in history {
        for (total, seconds) in zones.iter_mut().zip(activity.zone_seconds.iter()) {
            *total += seconds;
        }
    }

    let total: f64 = zones.iter().sum();
    if total <= 0.0 {
        return ZoneDistribution::not_applicable();
    }

    let pct = |secs: f64| MetricValue::Value(secs / total * 100.0);
    ZoneDistribution {
        easy_pct: pct(zones[0] + zones[1]),
        tempo_pct: pct(zones[2]),
        hard_pct: pct(zones[3] + zones[4]),
    }
}

/// Mean SWOLF over lap-swim sessions, assuming a 25 m pool.
///
/// SWOLF for one session is average strokes per length plus average seconds
/// per length. Sessions without stroke counts or distance are skipped.
pub fn swim_swolf(history: &[ActivityRecord]) -> MetricValue {
    let scores: Vec<f64> = history
        .iter()
        .filter(|a| a.sport.is_lap_swim())
        .filter_map(|a| {
            let strokes = a.average_strokes?;
            let distance = a.distance_meters?;
            if strokes <= 0.0 || distance <= 0.0 || a.duration_seconds <= 0.0 {
                return None;
            }
            let lengths = distance / params::POOL_LENGTH_M;
            Some(strokes + a.duration_seconds / lengths)
        })
        .collect();

    if scores.is_empty() {
        MetricValue::NotApplicable
    } else {
        MetricValue::Value(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}

/// Direction of the bike aerobic efficiency trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfficiencyTrend {
    Improving,
    Declining,
    Stable,
    /// Fewer than two rides had both speed and heart rate
    InsufficientData,
}

impl EfficiencyTrend {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
            Self::InsufficientData => "insufficient data",
        }
    }
}

/// Bike aerobic efficiency trend: speed per heartbeat, early rides against
/// recent rides, with a deadband so noise does not read as a trend.
///
/// History must already be in chronological order; undated rides sort last
/// and so land in the recent batch.
pub fn bike_efficiency_trend(history: &[ActivityRecord]) -> EfficiencyTrend {
    let factors: Vec<f64> = history
        .iter()
        .filter(|a| a.sport.is_cycling())
        .filter_map(|a| {
            let speed = a.average_speed?;
            let hr = a.average_heart_rate?;
            if speed > 0.0 && hr > 0.0 {
                Some(speed / hr)
            } else {
                None
            }
        })
        .collect();

    if factors.len() < params::EF_MIN_SESSIONS {
        return EfficiencyTrend::InsufficientData;
    }

    let batch = (factors.len() / 2).min(3).max(1);
    let first: f64 = factors[..batch].iter().sum::<f64>() / batch as f64;
    let last: f64 = factors[factors.len() - batch..].iter().sum::<f64>() / batch as f64;

    let change = (last - first) / first;
    if change > params::EF_TREND_DEADBAND {
        EfficiencyTrend::Improving
    } else if change < -params::EF_TREND_DEADBAND {
        EfficiencyTrend::Declining
    } else {
        EfficiencyTrend::Stable
    }
}

/// Where an FTP figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtpSource {
    /// Configured by the athlete; trusted over any estimate
    Manual,
    /// Derived from the best 20-minute power on record
    Estimated,
}

/// Functional threshold power with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FtpEstimate {
    /// FTP in watts
    pub ftp_watts: f64,
    /// Manual or estimated
    pub source: FtpSource,
    /// Best 20-minute power the estimate came from, when estimated
    pub best_20min_watts: Option<f64>,
    /// Date of the session that produced the best 20-minute power
    pub best_20min_date: Option<NaiveDate>,
    /// Name of that session
    pub best_20min_workout: Option<String>,
    /// Cycling sessions on record that carried a 20-minute power figure
    pub power_sessions: usize,
}

/// Resolve FTP: a manually configured value always wins; otherwise estimate
/// from the best 20-minute power over all rides on record. `None` when
/// neither exists.
pub fn estimate_ftp(history: &[ActivityRecord], configured: Option<f64>) -> Option<FtpEstimate> {
    let powered: Vec<(f64, &ActivityRecord)> = history
        .iter()
        .filter(|a| a.sport.is_cycling())
        .filter_map(|a| a.max_20min_power.map(|p| (p, a)))
        .filter(|(p, _)| *p > 0.0)
        .collect();

    if let Some(watts) = configured {
        return Some(FtpEstimate {
            ftp_watts: watts,
            source: FtpSource::Manual,
            best_20min_watts: None,
            best_20min_date: None,
            best_20min_workout: None,
            power_sessions: powered.len(),
        });
    }

    let (power, activity) = powered
        .iter()
        .max_by(|(a, _), (b, _)| a.total_cmp(b))
        .copied()?;

    Some(FtpEstimate {
        ftp_watts: power * params::FTP_FROM_20MIN_FACTOR,
        source: FtpSource::Estimated,
        best_20min_watts: Some(power),
        best_20min_date: activity.start_time.map(|t| t.date_naive()),
        best_20min_workout: Some(activity.name.clone()),
        power_sessions: powered.len(),
    })
}

/// Mean pace penalty on brick runs, in percent above the athlete's median
/// run pace.
///
/// A brick is a run starting within 30 minutes of the end of a ride. The
/// penalty is how much slower (positive) or faster (negative) brick runs
/// were than the median standalone pace. History must be chronological.
pub fn brick_pace_lag(history: &[ActivityRecord]) -> MetricValue {
    let mut run_paces: Vec<f64> = history
        .iter()
        .filter(|a| a.sport.is_running())
        .filter_map(|a| a.pace_min_per_km())
        .collect();

    if run_paces.is_empty() {
        return MetricValue::NotApplicable;
    }
    run_paces.sort_by(|a, b| a.total_cmp(b));
    let median_pace = run_paces[run_paces.len() / 2];

    let mut deviations = Vec::new();
    for pair in history.windows(2) {
        let (ride, run) = (&pair[0], &pair[1]);
        if !ride.sport.is_cycling() || !run.sport.is_running() {
            continue;
        }
        let (Some(ride_start), Some(run_start)) = (ride.start_time, run.start_time) else {
            continue;
        };
        let ride_end = ride_start + chrono::Duration::seconds(ride.duration_seconds as i64);
        let gap_min = (run_start - ride_end).num_seconds() as f64 / 60.0;
        if !(0.0..=params::BRICK_MAX_GAP_MIN).contains(&gap_min) {
            continue;
        }
        if let Some(pace) = run.pace_min_per_km() {
            deviations.push((pace - median_pace) / median_pace * 100.0);
        }
    }

    if deviations.is_empty() {
        MetricValue::NotApplicable
    } else {
        MetricValue::Value(deviations.iter().sum::<f64>() / deviations.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SportType;
    use chrono::{Duration, TimeZone, Utc};

    fn base_activity(sport: SportType) -> ActivityRecord {
        ActivityRecord {
            id: "1".to_string(),
            name: "Workout".to_string(),
            sport,
            start_time: Some(Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap()),
            duration_seconds: 3600.0,
            distance_meters: Some(10000.0),
            average_heart_rate: Some(140.0),
            max_heart_rate: Some(165.0),
            average_speed: Some(2.8),
            average_power: None,
            max_20min_power: None,
            zone_seconds: [300.0, 1800.0, 1200.0, 240.0, 60.0],
            average_strokes: None,
            average_cadence: None,
        }
    }

    #[test]
    fn test_decoupling_ninety_minute_run() {
        let mut run = base_activity(SportType::Running);
        run.duration_seconds = 5400.0;
        run.average_heart_rate = Some(150.0);
        run.max_heart_rate = Some(180.0);

        // (180-150)/150 * (90/120) * 100 = 15.0, right at the cap
        let estimate = session_decoupling(&run).unwrap();
        assert!((estimate - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_decoupling_capped() {
        let mut run = base_activity(SportType::Running);
        run.duration_seconds = 4.0 * 3600.0;
        run.average_heart_rate = Some(120.0);
        run.max_heart_rate = Some(190.0);

        assert_eq!(session_decoupling(&run), Some(15.0));
    }

    #[test]
    fn test_decoupling_requires_an_hour() {
        let mut run = base_activity(SportType::Running);
        run.duration_seconds = 3599.0;
        assert_eq!(session_decoupling(&run), None);

        run.duration_seconds = 3600.0;
        assert!(session_decoupling(&run).is_some());
    }

    #[test]
    fn test_decoupling_requires_heart_rate() {
        let mut run = base_activity(SportType::Running);
        run.average_heart_rate = None;
        assert_eq!(session_decoupling(&run), None);

        let mut run = base_activity(SportType::Running);
        run.max_heart_rate = Some(0.0);
        assert_eq!(session_decoupling(&run), None);
    }

    #[test]
    fn test_decoupling_requires_speed_and_zone_data() {
        let mut run = base_activity(SportType::Running);
        run.average_speed = None;
        assert_eq!(session_decoupling(&run), None);

        let mut run = base_activity(SportType::Running);
        run.zone_seconds = [0.0; 5];
        assert_eq!(session_decoupling(&run), None);
    }

    #[test]
    fn test_run_decoupling_ignores_rides() {
        let mut ride = base_activity(SportType::Cycling);
        ride.duration_seconds = 7200.0;
        assert_eq!(run_decoupling(&[ride]), MetricValue::NotApplicable);
    }

    #[test]
    fn test_zone_distribution_percentages() {
        let activity = base_activity(SportType::Running);
        let dist = zone_distribution(&[activity]);

        // 3600s total: easy 2100, tempo 1200, hard 300
        assert!((dist.easy_pct.value().unwrap() - 58.333).abs() < 0.01);
        assert!((dist.tempo_pct.value().unwrap() - 33.333).abs() < 0.01);
        assert!((dist.hard_pct.value().unwrap() - 8.333).abs() < 0.01);
    }

    #[test]
    fn test_zone_distribution_without_zone_data() {
        let mut activity = base_activity(SportType::Running);
        activity.zone_seconds = [0.0; 5];
        let dist = zone_distribution(&[activity]);
        assert_eq!(dist.easy_pct, MetricValue::NotApplicable);
        assert_eq!(dist.hard_pct, MetricValue::NotApplicable);
    }

    #[test]
    fn test_swolf_for_lap_swims() {
        let mut swim = base_activity(SportType::LapSwimming);
        swim.distance_meters = Some(1000.0); // 40 lengths
        swim.duration_seconds = 1200.0; // 30 s/length
        swim.average_strokes = Some(14.0);

        let swolf = swim_swolf(&[swim]).value().unwrap();
        assert!((swolf - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_swolf_skips_open_water() {
        let mut swim = base_activity(SportType::OpenWaterSwimming);
        swim.average_strokes = Some(14.0);
        assert_eq!(swim_swolf(&[swim]), MetricValue::NotApplicable);
    }

    fn ride_with_ef(speed: f64, hr: f64) -> ActivityRecord {
        let mut ride = base_activity(SportType::Cycling);
        ride.average_speed = Some(speed);
        ride.average_heart_rate = Some(hr);
        ride
    }

    #[test]
    fn test_ef_trend_improving() {
        let history = vec![
            ride_with_ef(7.0, 150.0),
            ride_with_ef(7.0, 148.0),
            ride_with_ef(8.0, 145.0),
            ride_with_ef(8.2, 144.0),
        ];
        assert_eq!(bike_efficiency_trend(&history), EfficiencyTrend::Improving);
    }

    #[test]
    fn test_ef_trend_stable_within_deadband() {
        let history = vec![ride_with_ef(7.0, 150.0), ride_with_ef(7.2, 150.0)];
        assert_eq!(bike_efficiency_trend(&history), EfficiencyTrend::Stable);
    }

    #[test]
    fn test_ef_trend_needs_two_rides() {
        let history = vec![ride_with_ef(7.0, 150.0)];
        assert_eq!(
            bike_efficiency_trend(&history),
            EfficiencyTrend::InsufficientData
        );
    }

    #[test]
    fn test_ftp_manual_wins() {
        let mut ride = base_activity(SportType::Cycling);
        ride.max_20min_power = Some(300.0);

        let ftp = estimate_ftp(&[ride], Some(250.0)).unwrap();
        assert_eq!(ftp.ftp_watts, 250.0);
        assert_eq!(ftp.source, FtpSource::Manual);
        assert_eq!(ftp.best_20min_watts, None);
    }

    #[test]
    fn test_ftp_estimated_from_best_20min() {
        let mut easy = base_activity(SportType::Cycling);
        easy.max_20min_power = Some(240.0);
        let mut hard = base_activity(SportType::Cycling);
        hard.name = "Threshold Test".to_string();
        hard.max_20min_power = Some(280.0);

        let ftp = estimate_ftp(&[easy, hard], None).unwrap();
        assert_eq!(ftp.source, FtpSource::Estimated);
        assert!((ftp.ftp_watts - 266.0).abs() < 1e-9);
        assert_eq!(ftp.best_20min_watts, Some(280.0));
        assert_eq!(ftp.best_20min_workout.as_deref(), Some("Threshold Test"));
        assert_eq!(ftp.power_sessions, 2);
    }

    #[test]
    fn test_ftp_unavailable_without_power() {
        let ride = base_activity(SportType::Cycling);
        assert!(estimate_ftp(&[ride], None).is_none());
    }

    #[test]
    fn test_brick_pairing_window() {
        let ride_start = Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap();
        let mut ride = base_activity(SportType::Cycling);
        ride.start_time = Some(ride_start);
        ride.duration_seconds = 3600.0;

        // Run starts 10 minutes after the ride ends, 10% slower than median
        let mut brick_run = base_activity(SportType::Running);
        brick_run.start_time = Some(ride_start + Duration::minutes(70));
        brick_run.average_speed = Some(2.8 / 1.1);

        // Standalone runs on later days set the median pace
        let mut solo_a = base_activity(SportType::Running);
        solo_a.start_time = Some(ride_start + Duration::days(1));
        let mut solo_b = base_activity(SportType::Running);
        solo_b.start_time = Some(ride_start + Duration::days(2));

        let history = vec![ride, brick_run, solo_a, solo_b];
        let lag = brick_pace_lag(&history).value().unwrap();
        assert!(lag > 0.0, "brick run should read slower, got {lag}");
    }

    #[test]
    fn test_brick_requires_close_start() {
        let ride_start = Utc.with_ymd_and_hms(2025, 3, 1, 7, 0, 0).unwrap();
        let mut ride = base_activity(SportType::Cycling);
        ride.start_time = Some(ride_start);

        // Two hours later is a double day, not a brick
        let mut run = base_activity(SportType::Running);
        run.start_time = Some(ride_start + Duration::hours(3));

        assert_eq!(brick_pace_lag(&[ride, run]), MetricValue::NotApplicable);
    }
}
