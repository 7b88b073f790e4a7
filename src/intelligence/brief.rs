//! Coaching brief assembly
//!
//! Pulls every analysis stage together into one immutable value: readiness,
//! load, performance, triathlon-specific metrics, periodization and the
//! next-workout recommendation, plus a rendered natural-language prompt an
//! athlete can paste into an external coach. The brief is all-or-nothing;
//! individual metrics degrade to sentinels but the brief itself either
//! builds completely or fails with [`EngineError::NoActivityData`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::info;

use super::load::{self, LoadSummary, RiskLevel};
use super::metrics::{self, EfficiencyTrend, FtpEstimate, ZoneDistribution};
use super::periodization::{self, PhasePlan, PhaseState};
use super::recommendation::{self, Recommendation, RecommendationInput};
use super::MetricValue;
use crate::config::EngineConfig;
use crate::constants::{policy, readiness as readiness_params};
use crate::errors::EngineError;
use crate::models::{ActivityRecord, EventType, Priority, SleepRecord, WellnessSample};

/// Recent-versus-baseline training heart rate comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HrStatus {
    Balanced,
    Elevated,
    Unknown,
}

/// Averaged sleep score with its sample size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SleepScore {
    /// Mean of the valid nightly scores, 0-100
    pub score: MetricValue,
    /// Nights the mean is built from
    pub nights: usize,
}

impl SleepScore {
    fn unavailable() -> Self {
        Self {
            score: MetricValue::NotApplicable,
            nights: 0,
        }
    }
}

/// Recovery readiness, tagged by where the numbers came from.
///
/// With wellness data the snapshot carries real resting heart rate. Without
/// it the engine falls back to comparing recent training heart rate against
/// the athlete's baseline, and says so: activity HR runs 100-120 bpm where
/// resting HR runs 40-60, and the two must never be confused downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_source", rename_all = "snake_case")]
pub enum ReadinessSnapshot {
    Wellness {
        resting_hr: MetricValue,
        body_battery: MetricValue,
        stress_avg: MetricValue,
        sleep_score: SleepScore,
    },
    ActivityHeartRate {
        status: HrStatus,
        /// Recent mean training HR against the whole-history mean, percent
        deviation_pct: MetricValue,
        avg_activity_hr: MetricValue,
        /// Weak-proxy warning carried with the data
        note: String,
        sleep_score: SleepScore,
    },
}

/// Training load section of the brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSnapshot {
    pub acute_load_min: f64,
    pub chronic_load_min: f64,
    pub acwr: MetricValue,
    pub stress_balance_min: MetricValue,
    pub weekly_stress: f64,
    pub injury_risk: RiskLevel,
    pub distribution: ZoneDistribution,
}

/// Performance section of the brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub run_decoupling: MetricValue,
    pub swim_swolf: MetricValue,
    pub bike_ef_trend: EfficiencyTrend,
    pub ftp: Option<FtpEstimate>,
}

/// Triathlon-specific section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriathlonSnapshot {
    /// Mean pace penalty on bike-to-run transitions, percent
    pub brick_pace_lag_pct: MetricValue,
}

/// Periodization section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodizationSnapshot {
    pub race_date: Option<NaiveDate>,
    pub race_type: Option<EventType>,
    pub race_priority: Option<Priority>,
    pub weeks_to_event: Option<f64>,
    pub phase: PhaseState,
    pub phase_description: String,
    pub plan: PhasePlan,
}

/// The complete coaching brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingBrief {
    pub athlete: String,
    /// Human-readable analysis period, e.g. "Last 60 Days"
    pub period: String,
    pub generated: DateTime<Utc>,
    pub readiness: ReadinessSnapshot,
    pub load: LoadSnapshot,
    pub performance: PerformanceSnapshot,
    pub triathlon: TriathlonSnapshot,
    pub periodization: PeriodizationSnapshot,
    pub recommendation: Recommendation,
    pub coaching_notes: Vec<String>,
    /// Rendered prompt for an external coach; embeds the numbers above
    pub prompt: String,
}

/// Build the coaching brief as of `now`.
///
/// The performance extractors see only the configured analysis window;
/// brick detection and FTP search the whole history, since a best power
/// or a transition pattern does not expire with the window.
pub fn generate_brief(
    history: &[ActivityRecord],
    wellness: Option<&WellnessSample>,
    sleep: Option<&[SleepRecord]>,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Result<CoachingBrief, EngineError> {
    if history.is_empty() {
        return Err(EngineError::NoActivityData);
    }

    let mut ordered: Vec<ActivityRecord> = history.to_vec();
    // Chronological, with undated records at the end (stable)
    ordered.sort_by_key(|a| (a.start_time.is_none(), a.start_time));

    let cutoff = now - chrono::Duration::days(config.analysis_days);
    let windowed: Vec<ActivityRecord> = ordered
        .iter()
        .filter(|a| a.start_time.map_or(true, |t| t >= cutoff))
        .cloned()
        .collect();

    info!(
        total = ordered.len(),
        in_window = windowed.len(),
        analysis_days = config.analysis_days,
        "generating coaching brief"
    );

    let load_summary = load::summarize(&ordered, now);
    let distribution = metrics::zone_distribution(&windowed);
    let run_decoupling = metrics::run_decoupling(&windowed);
    let swim_swolf = metrics::swim_swolf(&windowed);
    let bike_ef_trend = metrics::bike_efficiency_trend(&windowed);
    let ftp = metrics::estimate_ftp(&ordered, config.ftp_watts);
    let brick_lag = metrics::brick_pace_lag(&ordered);

    let readiness = assess_readiness(&ordered, wellness, sleep);

    let phase_snapshot = periodization::detect_phase(config.race_goal.as_ref(), now.date_naive());
    let plan = PhasePlan::resolve(
        phase_snapshot.phase,
        config.race_goal.as_ref().map(|g| g.event),
        load_summary.acwr.value(),
    );

    let rec_input = RecommendationInput {
        acwr: load_summary.acwr.value(),
        easy_pct: distribution.easy_pct.value(),
        hard_pct: distribution.hard_pct.value(),
        run_decoupling: run_decoupling.value(),
    };
    let recommendation = recommendation::recommend(&rec_input);

    let coaching_notes = build_notes(&load_summary, run_decoupling, &distribution, swim_swolf, bike_ef_trend);

    let load_snapshot = LoadSnapshot {
        acute_load_min: load_summary.acute_load_min,
        chronic_load_min: load_summary.chronic_load_min,
        acwr: load_summary.acwr,
        stress_balance_min: load_summary.stress_balance_min,
        weekly_stress: load_summary.weekly_stress,
        injury_risk: load_summary.risk,
        distribution,
    };
    let performance = PerformanceSnapshot {
        run_decoupling,
        swim_swolf,
        bike_ef_trend,
        ftp,
    };
    let triathlon = TriathlonSnapshot {
        brick_pace_lag_pct: brick_lag,
    };
    let periodization_snapshot = PeriodizationSnapshot {
        race_date: config.race_goal.as_ref().map(|g| g.date),
        race_type: config.race_goal.as_ref().map(|g| g.event),
        race_priority: config.race_goal.as_ref().map(|g| g.priority),
        weeks_to_event: phase_snapshot.weeks_to_event,
        phase: phase_snapshot.phase,
        phase_description: phase_snapshot.description.clone(),
        plan,
    };

    let period = format!("Last {} Days", config.analysis_days);
    let prompt = render_prompt(
        &config.athlete_name,
        &period,
        now,
        &readiness,
        &load_snapshot,
        &performance,
        &triathlon,
        &periodization_snapshot,
        &recommendation,
        &coaching_notes,
    );

    Ok(CoachingBrief {
        athlete: config.athlete_name.clone(),
        period,
        generated: now,
        readiness,
        load: load_snapshot,
        performance,
        triathlon,
        periodization: periodization_snapshot,
        recommendation,
        coaching_notes,
        prompt,
    })
}

/// Mean of the most recent valid sleep scores, up to a week's worth.
fn sleep_score(sleep: Option<&[SleepRecord]>) -> SleepScore {
    let Some(records) = sleep else {
        return SleepScore::unavailable();
    };

    let scores: Vec<f64> = records
        .iter()
        .take(readiness_params::SLEEP_WINDOW_NIGHTS)
        .filter_map(SleepRecord::score)
        .collect();

    if scores.is_empty() {
        SleepScore::unavailable()
    } else {
        SleepScore {
            score: MetricValue::Value(scores.iter().sum::<f64>() / scores.len() as f64),
            nights: scores.len(),
        }
    }
}

fn assess_readiness(
    history: &[ActivityRecord],
    wellness: Option<&WellnessSample>,
    sleep: Option<&[SleepRecord]>,
) -> ReadinessSnapshot {
    let sleep_score = sleep_score(sleep);

    if let Some(sample) = wellness {
        if sample.resting_heart_rate.is_some() {
            return ReadinessSnapshot::Wellness {
                resting_hr: MetricValue::from_option(sample.resting_heart_rate),
                body_battery: MetricValue::from_option(sample.body_battery_peak),
                stress_avg: MetricValue::from_option(sample.stress_average),
                sleep_score,
            };
        }
    }

    // Fallback: compare recent training HR against the athlete's baseline.
    let with_hr: Vec<f64> = history
        .iter()
        .filter_map(|a| a.average_heart_rate)
        .filter(|hr| *hr > 0.0)
        .collect();

    if with_hr.is_empty() {
        return ReadinessSnapshot::ActivityHeartRate {
            status: HrStatus::Unknown,
            deviation_pct: MetricValue::NotApplicable,
            avg_activity_hr: MetricValue::NotApplicable,
            note: "No wellness data available".to_string(),
            sleep_score,
        };
    }

    let overall_avg = with_hr.iter().sum::<f64>() / with_hr.len() as f64;
    let recent: Vec<f64> = with_hr
        .iter()
        .rev()
        .take(readiness_params::HR_RECENT_SESSIONS)
        .copied()
        .collect();
    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;

    let status = if recent_avg <= overall_avg * readiness_params::HR_ELEVATED_FACTOR {
        HrStatus::Balanced
    } else {
        HrStatus::Elevated
    };
    let deviation = (recent_avg - overall_avg) / overall_avg * 100.0;

    ReadinessSnapshot::ActivityHeartRate {
        status,
        deviation_pct: MetricValue::Value(deviation),
        avg_activity_hr: MetricValue::Value(recent_avg),
        note: "This is activity HR (~100-120 bpm), NOT resting HR (~40-60 bpm)".to_string(),
        sleep_score,
    }
}

fn build_notes(
    load: &LoadSummary,
    run_decoupling: MetricValue,
    distribution: &ZoneDistribution,
    swim_swolf: MetricValue,
    bike_ef_trend: EfficiencyTrend,
) -> Vec<String> {
    let mut notes = Vec::new();

    if let Some(acwr) = load.acwr.value() {
        if acwr > crate::constants::load::ACWR_HIGH {
            notes.push(format!(
                "ACWR at {acwr:.2} - CUT volume by 30% to avoid injury!"
            ));
        } else if acwr > crate::constants::load::ACWR_ELEVATED {
            notes.push(format!("ACWR at {acwr:.2} - monitor fatigue closely"));
        }
    }

    if let Some(decoupling) = run_decoupling.value() {
        if decoupling > policy::DECOUPLING_LIMIT_PCT {
            notes.push("Aerobic decoupling high - increase Zone 2 volume".to_string());
        } else {
            notes.push("Strong aerobic base - ready for intensity".to_string());
        }
    }

    if let Some(easy) = distribution.easy_pct.value() {
        if easy > 0.0 && easy < policy::ZONE_EASY_MIN_PCT {
            notes.push(format!(
                "Only {easy:.0}% time in Z1-Z2 - aim for 80/20 split"
            ));
        }
    }

    if let Some(swolf) = swim_swolf.value() {
        if swolf > policy::SWOLF_TECHNIQUE_LIMIT {
            notes.push(format!("SWOLF at {swolf:.1} - work on technique drills"));
        }
    }

    if bike_ef_trend == EfficiencyTrend::Declining {
        notes.push("Bike efficiency declining - check fatigue/recovery".to_string());
    }

    notes
}

/// Render the external-coach prompt. Pure templating over the computed
/// sections; every number appears exactly as computed, nothing is inferred.
#[allow(clippy::too_many_arguments)]
fn render_prompt(
    athlete: &str,
    period: &str,
    generated: DateTime<Utc>,
    readiness: &ReadinessSnapshot,
    load: &LoadSnapshot,
    performance: &PerformanceSnapshot,
    triathlon: &TriathlonSnapshot,
    periodization: &PeriodizationSnapshot,
    recommendation: &Recommendation,
    notes: &[String],
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "I'm a triathlete ({athlete}) using data-driven training. Please analyze my \
         current state and help optimize my training plan."
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "CURRENT TRAINING DATA:");
    let _ = writeln!(out, "Analysis Period: {period}");
    let _ = writeln!(out, "Generated: {}", generated.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out);

    let _ = writeln!(out, "RECOVERY STATUS:");
    match readiness {
        ReadinessSnapshot::Wellness {
            resting_hr,
            body_battery,
            stress_avg,
            sleep_score,
        } => {
            let _ = writeln!(out, "- Resting HR: {resting_hr} bpm (actual RHR)");
            let _ = writeln!(out, "- Body Battery (peak): {body_battery}");
            let _ = writeln!(out, "- Stress (avg): {stress_avg}");
            let _ = writeln!(
                out,
                "- Sleep Score: {} (7-day avg, n={})",
                sleep_score.score, sleep_score.nights
            );
            let _ = writeln!(out, "- Data Source: wellness API");
        }
        ReadinessSnapshot::ActivityHeartRate {
            status,
            deviation_pct,
            avg_activity_hr,
            note,
            sleep_score,
        } => {
            let _ = writeln!(out, "- HR Status: {status:?} ({deviation_pct}%)");
            let _ = writeln!(out, "- Activity HR (avg): {avg_activity_hr} bpm");
            let _ = writeln!(out, "  NOTE: {note}");
            let _ = writeln!(
                out,
                "- Sleep Score: {} (7-day avg, n={})",
                sleep_score.score, sleep_score.nights
            );
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "TRAINING LOAD:");
    let _ = writeln!(out, "- Acute Load (7d): {:.0} minutes", load.acute_load_min);
    let _ = writeln!(
        out,
        "- Chronic Load (28d): {:.0} minutes",
        load.chronic_load_min
    );
    let _ = writeln!(
        out,
        "- ACWR: {} - Risk Level: {:?}",
        load.acwr, load.injury_risk
    );
    let _ = writeln!(
        out,
        "- HR Zone Distribution: {}% in Z1-Z2 (target: 80%), {}% in Z3, {}% in Z4-Z5",
        load.distribution.easy_pct, load.distribution.tempo_pct, load.distribution.hard_pct
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "PERFORMANCE METRICS ({period}):");
    let _ = writeln!(
        out,
        "- Run Aerobic Decoupling: {}%",
        performance.run_decoupling
    );
    let _ = writeln!(out, "- Swim SWOLF: {}", performance.swim_swolf);
    let _ = writeln!(
        out,
        "- Bike Efficiency Trend: {}",
        performance.bike_ef_trend.description()
    );
    match &performance.ftp {
        Some(ftp) => {
            let _ = writeln!(out, "- FTP: {:.0}W ({:?})", ftp.ftp_watts, ftp.source);
        }
        None => {
            let _ = writeln!(out, "- FTP: N/A (no power data)");
        }
    }
    let _ = writeln!(
        out,
        "- Brick Pace Lag: {}% vs median run pace",
        triathlon.brick_pace_lag_pct
    );
    let _ = writeln!(out);

    let _ = writeln!(out, "RACE INFORMATION:");
    match (&periodization.race_date, &periodization.race_type) {
        (Some(date), Some(event)) => {
            let weeks = periodization
                .weeks_to_event
                .map_or_else(|| "N/A".to_string(), |w| format!("{w:.1}"));
            let _ = writeln!(out, "- Race Date: {date} ({weeks} weeks away)");
            let _ = writeln!(out, "- Race Type: {}", event.display_name());
            if let Some(priority) = periodization.race_priority {
                let _ = writeln!(out, "- Priority: {priority:?}-race");
            }
        }
        _ => {
            let _ = writeln!(out, "- No race currently scheduled");
        }
    }
    let _ = writeln!(out, "CURRENT TRAINING PHASE: {:?}", periodization.phase);
    let _ = writeln!(
        out,
        "- Phase Description: {}",
        periodization.phase_description
    );
    let _ = writeln!(
        out,
        "- Target Weekly TSS: {}",
        periodization.plan.weekly_tss
    );
    let _ = writeln!(
        out,
        "- Intensity Split: {}",
        periodization.plan.intensity_split
    );
    let _ = writeln!(out, "- Phase Focus: {}", periodization.plan.focus);
    let _ = writeln!(out);

    let _ = writeln!(out, "NEXT WORKOUT RECOMMENDATION:");
    let _ = writeln!(out, "- Type: {}", recommendation.workout_type);
    let _ = writeln!(out, "- Target TSS: {}", recommendation.target_tss);
    let _ = writeln!(
        out,
        "- Target IF: {:.2}",
        recommendation.target_intensity_factor
    );
    for reason in &recommendation.rationale {
        let _ = writeln!(out, "- Why: {reason}");
    }
    for workout in &recommendation.workouts {
        let _ = writeln!(out, "- Suggested: {workout}");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "CURRENT APP RECOMMENDATIONS:");
    if notes.is_empty() {
        let _ = writeln!(out, "- Training load and metrics look balanced");
    }
    for note in notes {
        let _ = writeln!(out, "- {note}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RaceGoal, SportType};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 30, 12, 0, 0).unwrap()
    }

    fn run(days_ago: i64, minutes: f64) -> ActivityRecord {
        ActivityRecord {
            id: format!("r{days_ago}"),
            name: "Run".to_string(),
            sport: SportType::Running,
            start_time: Some(now() - Duration::days(days_ago)),
            duration_seconds: minutes * 60.0,
            distance_meters: Some(minutes * 180.0),
            average_heart_rate: Some(145.0),
            max_heart_rate: Some(170.0),
            average_speed: Some(3.0),
            average_power: None,
            max_20min_power: None,
            zone_seconds: [minutes * 12.0, minutes * 30.0, minutes * 12.0, minutes * 4.0, minutes * 2.0],
            average_strokes: None,
            average_cadence: None,
        }
    }

    fn config() -> EngineConfig {
        EngineConfig {
            athlete_name: "Tester".to_string(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_empty_history_is_fatal() {
        let result = generate_brief(&[], None, None, &config(), now());
        assert!(matches!(result, Err(EngineError::NoActivityData)));
    }

    #[test]
    fn test_single_run_produces_full_brief() {
        // A 90-minute run with HR data and nothing else still yields a
        // complete brief with sentinels in the gaps
        let history = vec![run(1, 90.0)];
        let brief = generate_brief(&history, None, None, &config(), now()).unwrap();

        assert!(brief.performance.run_decoupling.is_available());
        assert_eq!(brief.performance.swim_swolf, MetricValue::NotApplicable);
        assert_eq!(
            brief.performance.bike_ef_trend,
            EfficiencyTrend::InsufficientData
        );
        assert!(brief.performance.ftp.is_none());
        assert_eq!(
            brief.triathlon.brick_pace_lag_pct,
            MetricValue::NotApplicable
        );
        assert_eq!(brief.periodization.phase, PhaseState::OffSeason);
        assert!(!brief.prompt.is_empty());
    }

    #[test]
    fn test_readiness_prefers_wellness() {
        let wellness = WellnessSample {
            resting_heart_rate: Some(48.0),
            stress_average: Some(30.0),
            body_battery_peak: Some(85.0),
        };
        let history = vec![run(1, 60.0)];
        let brief =
            generate_brief(&history, Some(&wellness), None, &config(), now()).unwrap();

        match brief.readiness {
            ReadinessSnapshot::Wellness { resting_hr, .. } => {
                assert_eq!(resting_hr, MetricValue::Value(48.0));
            }
            other => panic!("expected wellness readiness, got {other:?}"),
        }
    }

    #[test]
    fn test_readiness_fallback_is_flagged() {
        let history = vec![run(1, 60.0), run(3, 60.0)];
        let brief = generate_brief(&history, None, None, &config(), now()).unwrap();

        match brief.readiness {
            ReadinessSnapshot::ActivityHeartRate { status, note, .. } => {
                assert_eq!(status, HrStatus::Balanced);
                assert!(note.contains("NOT resting HR"));
            }
            other => panic!("expected activity HR fallback, got {other:?}"),
        }
    }

    #[test]
    fn test_sleep_score_window() {
        let nights: Vec<SleepRecord> = (0..10)
            .map(|i| SleepRecord::new(json!({"overallSleepScore": {"value": 70 + i}})))
            .collect();
        let score = sleep_score(Some(&nights));

        // Only the first 7 nights count: mean of 70..=76
        assert_eq!(score.nights, 7);
        assert_eq!(score.score, MetricValue::Value(73.0));
    }

    #[test]
    fn test_injury_override_reaches_plan() {
        // Heavy recent week against a light month forces ACWR over 1.5
        // while a race 10 weeks out would otherwise say BUILD
        let history = vec![
            run(1, 120.0),
            run(2, 120.0),
            run(3, 120.0),
            run(15, 30.0),
            run(25, 30.0),
        ];
        let mut config = config();
        config.race_goal = Some(RaceGoal {
            date: now().date_naive() + Duration::days(70),
            event: EventType::Olympic,
            priority: Priority::A,
        });

        let brief = generate_brief(&history, None, None, &config, now()).unwrap();
        assert_eq!(brief.periodization.phase, PhaseState::Build);
        assert!(brief.load.acwr.value().unwrap() > 1.5);
        assert!(brief
            .periodization
            .plan
            .focus
            .contains("INJURY RISK OVERRIDE"));
        assert_eq!(brief.load.injury_risk, RiskLevel::High);
    }

    #[test]
    fn test_brief_round_trip() {
        let history = vec![run(1, 90.0), run(5, 60.0), run(12, 60.0), run(20, 45.0)];
        let brief = generate_brief(&history, None, None, &config(), now()).unwrap();

        let json = serde_json::to_string_pretty(&brief).unwrap();
        let back: CoachingBrief = serde_json::from_str(&json).unwrap();
        assert_eq!(back, brief);
    }

    #[test]
    fn test_prompt_embeds_numbers() {
        let history = vec![run(1, 90.0), run(5, 60.0), run(12, 60.0)];
        let brief = generate_brief(&history, None, None, &config(), now()).unwrap();

        assert!(brief
            .prompt
            .contains(&format!("{:.0} minutes", brief.load.acute_load_min)));
        assert!(brief
            .prompt
            .contains(&format!("Target TSS: {}", brief.recommendation.target_tss)));
    }
}
