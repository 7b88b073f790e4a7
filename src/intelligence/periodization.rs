//! Training phase detection and weekly planning
//!
//! Maps weeks-to-event onto a total partition of training phases and
//! attaches weekly targets per phase. Multi-day stage events get adjusted
//! plans; an ACWR above the high-risk line overrides any plan with
//! recovery-only work.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::load as load_params;
use crate::models::{EventType, RaceGoal};

/// Training phase relative to the goal event.
///
/// The mapping from weeks-to-event is a total partition; every input lands
/// in exactly one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseState {
    /// More than 20 weeks out, more than 2 weeks past, or no race planned
    OffSeason,
    /// 12-20 weeks out
    Base,
    /// 8-12 weeks out
    Build,
    /// 4-8 weeks out
    Peak,
    /// 2-4 weeks out
    Taper,
    /// 0-2 weeks out
    RaceWeek,
    /// Up to 2 weeks post-race
    Recovery,
}

impl PhaseState {
    pub fn description(&self) -> &'static str {
        match self {
            Self::OffSeason => "Off-season - general fitness, cross-training",
            Self::Base => "Base phase - high volume, low intensity, Zone 2 focus",
            Self::Build => "Build phase - sweet spot, tempo, race-specific volume",
            Self::Peak => "Peak phase - race-specific intensity, VO2 max work",
            Self::Taper => "Taper phase - reduce volume 30-50%, maintain intensity",
            Self::RaceWeek => "Race week - short openers, rest, final prep",
            Self::Recovery => "Post-race recovery - easy aerobic work only",
        }
    }
}

/// Detected phase with its distance from the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    pub phase: PhaseState,
    /// Signed weeks to the event; `None` without a goal
    pub weeks_to_event: Option<f64>,
    pub description: String,
}

/// Determine the current phase from the goal event, if any.
pub fn detect_phase(goal: Option<&RaceGoal>, today: NaiveDate) -> PhaseSnapshot {
    let Some(goal) = goal else {
        return PhaseSnapshot {
            phase: PhaseState::OffSeason,
            weeks_to_event: None,
            description: "No race planned - general fitness maintenance".to_string(),
        };
    };

    let days = (goal.date - today).num_days();
    let weeks = days as f64 / 7.0;

    let phase = if days < 0 && days > -14 {
        PhaseState::Recovery
    } else if (0.0..2.0).contains(&weeks) {
        PhaseState::RaceWeek
    } else if (2.0..4.0).contains(&weeks) {
        PhaseState::Taper
    } else if (4.0..8.0).contains(&weeks) {
        PhaseState::Peak
    } else if (8.0..12.0).contains(&weeks) {
        PhaseState::Build
    } else if (12.0..20.0).contains(&weeks) {
        PhaseState::Base
    } else {
        PhaseState::OffSeason
    };

    debug!(phase = ?phase, weeks_to_event = weeks, "phase detected");

    PhaseSnapshot {
        phase,
        weeks_to_event: Some(weeks),
        description: phase.description().to_string(),
    }
}

/// Weekly targets and suggested workouts for a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhasePlan {
    /// Target training stress for the week
    pub weekly_tss: u32,
    /// Easy/hard split the week should follow
    pub intensity_split: String,
    /// Kinds of sessions to schedule
    pub workout_types: Vec<String>,
    /// What the phase is for
    pub focus: String,
    /// Named workouts from the catalog
    pub workouts: Vec<String>,
}

impl PhasePlan {
    /// Plan for a phase, adjusted for the event format. Multi-day stage
    /// events need durability over single-day peak output, so their
    /// preparation phases carry more volume and their recovery runs longer.
    pub fn for_phase(phase: PhaseState, event: Option<EventType>) -> Self {
        let mut plan = Self::base_plan(phase);
        if event == Some(EventType::MultiDayStage) {
            plan.adjust_for_stage_race(phase);
        }
        plan
    }

    /// Recovery-only plan that replaces any phase plan when the load ramp
    /// has crossed into high injury risk.
    pub fn injury_override() -> Self {
        Self {
            weekly_tss: 200,
            intensity_split: "100% Z1-Z2".to_string(),
            workout_types: vec!["Recovery Only".to_string()],
            focus: "INJURY RISK OVERRIDE - active recovery only".to_string(),
            workouts: vec![
                "Lazy Mountain (24 TSS, IF 0.46)".to_string(),
                "Pettit (39 TSS, IF 0.56)".to_string(),
                "REST days as needed".to_string(),
            ],
        }
    }

    /// Resolve the plan for a phase, applying the injury override when the
    /// ACWR is past the high-risk line.
    pub fn resolve(phase: PhaseState, event: Option<EventType>, acwr: Option<f64>) -> Self {
        match acwr {
            Some(ratio) if ratio > load_params::ACWR_HIGH => Self::injury_override(),
            _ => Self::for_phase(phase, event),
        }
    }

    fn base_plan(phase: PhaseState) -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        match phase {
            PhaseState::OffSeason => Self {
                weekly_tss: 300,
                intensity_split: "90% Z1-Z2, 10% Z3+".to_string(),
                workout_types: strings(&["Endurance", "Easy Recovery"]),
                focus: "General fitness, cross-training, skill work".to_string(),
                workouts: strings(&[
                    "Pettit (39 TSS, IF 0.56)",
                    "Boarstone (60 TSS, IF 0.68)",
                    "Gibbs (75 TSS, IF 0.70)",
                ]),
            },
            PhaseState::Base => Self {
                weekly_tss: 400,
                intensity_split: "80% Z1-Z2, 20% Z3+".to_string(),
                workout_types: strings(&["Endurance", "Sweet Spot (1x/week)"]),
                focus: "Aerobic base, mitochondrial density, fat adaptation".to_string(),
                workouts: strings(&[
                    "Warren (60 TSS, IF 0.69) - Endurance",
                    "Boarstone +3 (88 TSS, IF 0.70) - Long endurance",
                    "Carson (60 TSS, IF 0.88) - Weekly sweet spot",
                ]),
            },
            PhaseState::Build => Self {
                weekly_tss: 450,
                intensity_split: "70% Z1-Z2, 30% Z3+".to_string(),
                workout_types: strings(&["Sweet Spot", "Tempo", "Endurance"]),
                focus: "Lactate threshold, race-specific intensity".to_string(),
                workouts: strings(&[
                    "Antelope (70 TSS, IF 0.89) - Sweet spot intervals",
                    "Tallac (67 TSS, IF 0.90) - Tempo",
                    "Warren (60 TSS, IF 0.69) - Recovery endurance",
                ]),
            },
            PhaseState::Peak => Self {
                weekly_tss: 500,
                intensity_split: "60% Z1-Z2, 40% Z3+".to_string(),
                workout_types: strings(&["VO2 Max", "Threshold", "Race Simulation"]),
                focus: "Peak fitness, race-specific power, neuromuscular prep".to_string(),
                workouts: strings(&[
                    "Spencer (49 TSS, IF 1.00) - VO2 max",
                    "Lamarck (69 TSS, IF 0.95) - Threshold",
                    "McAdie (71 TSS, IF 0.94) - Over-unders",
                ]),
            },
            PhaseState::Taper => Self {
                weekly_tss: 250,
                intensity_split: "70% Z1-Z2, 30% Z3+ (short bursts)".to_string(),
                workout_types: strings(&["Openers", "Short Intensity", "Easy Spin"]),
                focus: "Maintain sharpness, shed fatigue, mental prep".to_string(),
                workouts: strings(&[
                    "Truuli -2 (30 TSS, IF 0.70) - Opener",
                    "Lazy Mountain (24 TSS, IF 0.46) - Recovery",
                    "Pettit (39 TSS, IF 0.56) - Easy spin",
                ]),
            },
            PhaseState::RaceWeek => Self {
                weekly_tss: 150,
                intensity_split: "80% Z1-Z2, 20% Z3+ (openers only)".to_string(),
                workout_types: strings(&["Openers", "Easy Recovery"]),
                focus: "Rest, pre-race openers, carb loading".to_string(),
                workouts: strings(&[
                    "Truuli -2 (30 TSS, IF 0.70) - 2 days before race",
                    "Lazy Mountain (24 TSS, IF 0.46) - Easy spin",
                    "REST - day before race",
                ]),
            },
            PhaseState::Recovery => Self {
                weekly_tss: 200,
                intensity_split: "100% Z1-Z2".to_string(),
                workout_types: strings(&["Easy Recovery", "Active Rest"]),
                focus: "Active recovery, rebuild glycogen, repair tissue".to_string(),
                workouts: strings(&[
                    "Lazy Mountain (24 TSS, IF 0.46)",
                    "Pettit (39 TSS, IF 0.56)",
                    "Boarstone (60 TSS, IF 0.68) - week 2 only",
                ]),
            },
        }
    }

    fn adjust_for_stage_race(&mut self, phase: PhaseState) {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        match phase {
            PhaseState::Base => {
                self.weekly_tss = 450;
                self.focus =
                    "Aerobic durability, back-to-back training days, brick workouts".to_string();
                self.workouts.push(
                    "3-day training blocks (Sat-Sun-Mon) to simulate race format".to_string(),
                );
            }
            PhaseState::Build => {
                self.weekly_tss = 500;
                self.intensity_split = "65% Z1-Z2, 35% Z3+".to_string();
                self.focus =
                    "Back-to-back race-pace efforts, recovery between races, heat adaptation"
                        .to_string();
                self.workouts = strings(&[
                    "Friday: Antelope (70 TSS, IF 0.89) - PM race simulation",
                    "Saturday AM: Tallac (67 TSS, IF 0.90) - 4hr recovery",
                    "Saturday PM: Carson (60 TSS, IF 0.88) - 6hr recovery",
                    "Sunday: McAdie (71 TSS, IF 0.94) - race pace",
                ]);
            }
            PhaseState::Peak => {
                self.weekly_tss = 550;
                self.focus = "Triple-brick weekends, race nutrition rehearsal, cumulative fatigue management".to_string();
                self.workouts = strings(&[
                    "Race simulation weekend:",
                    "Friday 6pm: super sprint effort (30-40 TSS)",
                    "Saturday 8am: sprint effort (60-70 TSS)",
                    "Saturday 2pm: sprint effort (60-70 TSS)",
                    "Sunday 8am: olympic effort (90-100 TSS)",
                ]);
            }
            PhaseState::Taper => {
                self.weekly_tss = 300;
                self.focus =
                    "Extra recovery for the multi-day event, practice transitions, final nutrition checks"
                        .to_string();
                self.workouts = strings(&[
                    "Week 1: 2x opener workouts, rest of easy spin",
                    "Race week: Truuli -2 on Monday/Wednesday, complete rest Thursday",
                ]);
            }
            PhaseState::RaceWeek => {
                self.weekly_tss = 180;
                self.focus =
                    "Rest for the multi-day event, pack gear, hydration and nutrition plan"
                        .to_string();
                self.workouts = strings(&[
                    "Monday: Pettit (39 TSS, IF 0.56)",
                    "Tuesday: Truuli -2 (30 TSS, IF 0.70)",
                    "Wednesday: complete REST",
                    "Thursday: complete REST",
                    "Friday: pre-race swim/bike check only",
                ]);
            }
            PhaseState::Recovery => {
                self.weekly_tss = 150;
                self.focus =
                    "Extended recovery (2 weeks minimum), massage, nutrition replenishment"
                        .to_string();
                self.workouts = strings(&[
                    "Week 1: complete REST or easy 20min spins only",
                    "Week 2: Lazy Mountain (24 TSS) every other day",
                    "Week 3: return to 200 TSS, all endurance",
                ]);
            }
            PhaseState::OffSeason => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::Duration;

    fn goal_in_days(days: i64) -> RaceGoal {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        RaceGoal {
            date: today + Duration::days(days),
            event: EventType::Olympic,
            priority: Priority::A,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_no_goal_is_off_season() {
        let snapshot = detect_phase(None, today());
        assert_eq!(snapshot.phase, PhaseState::OffSeason);
        assert_eq!(snapshot.weeks_to_event, None);
    }

    #[test]
    fn test_phase_boundaries() {
        let cases = [
            (0, PhaseState::RaceWeek),
            (13, PhaseState::RaceWeek),
            (14, PhaseState::Taper),
            (27, PhaseState::Taper),
            (28, PhaseState::Peak),
            (55, PhaseState::Peak),
            (56, PhaseState::Build),
            (83, PhaseState::Build),
            (84, PhaseState::Base),
            (139, PhaseState::Base),
            (140, PhaseState::OffSeason),
            (-1, PhaseState::Recovery),
            (-13, PhaseState::Recovery),
            (-14, PhaseState::OffSeason),
            (-100, PhaseState::OffSeason),
        ];
        for (days, expected) in cases {
            let snapshot = detect_phase(Some(&goal_in_days(days)), today());
            assert_eq!(
                snapshot.phase, expected,
                "{days} days out should be {expected:?}"
            );
        }
    }

    #[test]
    fn test_partition_is_total() {
        // Every day offset from 3 years before to 3 years after maps to a phase
        for days in -1095..=1095 {
            let snapshot = detect_phase(Some(&goal_in_days(days)), today());
            assert!(snapshot.weeks_to_event.is_some());
        }
    }

    #[test]
    fn test_base_plan_targets() {
        let plan = PhasePlan::for_phase(PhaseState::Base, Some(EventType::Olympic));
        assert_eq!(plan.weekly_tss, 400);
        assert_eq!(plan.intensity_split, "80% Z1-Z2, 20% Z3+");
    }

    #[test]
    fn test_stage_race_adjustments() {
        let plan = PhasePlan::for_phase(PhaseState::Build, Some(EventType::MultiDayStage));
        assert_eq!(plan.weekly_tss, 500);
        assert_eq!(plan.intensity_split, "65% Z1-Z2, 35% Z3+");

        let taper = PhasePlan::for_phase(PhaseState::Taper, Some(EventType::MultiDayStage));
        assert_eq!(taper.weekly_tss, 300);

        // Off-season is unchanged by event format
        let off = PhasePlan::for_phase(PhaseState::OffSeason, Some(EventType::MultiDayStage));
        assert_eq!(off.weekly_tss, 300);
    }

    #[test]
    fn test_injury_override_beats_any_phase() {
        let plan = PhasePlan::resolve(PhaseState::Build, Some(EventType::Olympic), Some(1.6));
        assert_eq!(plan.weekly_tss, 200);
        assert!(plan.focus.contains("INJURY RISK OVERRIDE"));

        // At exactly 1.5 the phase plan stands
        let plan = PhasePlan::resolve(PhaseState::Build, Some(EventType::Olympic), Some(1.5));
        assert_eq!(plan.weekly_tss, 450);
    }
}
