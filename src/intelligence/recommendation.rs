//! Next-workout recommendation policy
//!
//! An ordered table of (predicate, outcome) rules evaluated top-down;
//! the first matching rule wins. Safety rules sit above quality rules,
//! so an overreaching athlete is never handed an intensity session no
//! matter what the other metrics say. Unknown inputs never match a rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::constants::{load as load_params, policy};

/// Kind of session to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkoutType {
    #[serde(rename = "RECOVERY or REST")]
    RecoveryOrRest,
    #[serde(rename = "ENDURANCE")]
    Endurance,
    #[serde(rename = "SWEET SPOT")]
    SweetSpot,
    #[serde(rename = "TEMPO or SWEET SPOT")]
    TempoOrSweetSpot,
}

impl fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RecoveryOrRest => "RECOVERY or REST",
            Self::Endurance => "ENDURANCE",
            Self::SweetSpot => "SWEET SPOT",
            Self::TempoOrSweetSpot => "TEMPO or SWEET SPOT",
        };
        write!(f, "{label}")
    }
}

/// A named workout from the fixed catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub name: String,
    pub tss: u32,
    pub intensity_factor: f64,
    pub note: String,
}

impl Workout {
    fn new(name: &str, tss: u32, intensity_factor: f64, note: &str) -> Self {
        Self {
            name: name.to_string(),
            tss,
            intensity_factor,
            note: note.to_string(),
        }
    }
}

impl fmt::Display for Workout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} TSS, IF {:.2}) - {}",
            self.name, self.tss, self.intensity_factor, self.note
        )
    }
}

/// The workout catalog the rules draw from.
pub mod catalog {
    use super::Workout;

    pub fn pettit() -> Workout {
        Workout::new("Pettit", 39, 0.56, "Easy endurance")
    }
    pub fn lazy_mountain() -> Workout {
        Workout::new("Lazy Mountain", 24, 0.46, "Recovery spin")
    }
    pub fn boarstone() -> Workout {
        Workout::new("Boarstone", 60, 0.68, "Endurance")
    }
    pub fn fletcher() -> Workout {
        Workout::new("Fletcher", 60, 0.66, "Long endurance")
    }
    pub fn pettit_plus_one() -> Workout {
        Workout::new("Pettit +1", 46, 0.65, "Endurance")
    }
    pub fn warren() -> Workout {
        Workout::new("Warren", 60, 0.69, "Steady endurance")
    }
    pub fn boarstone_plus_two() -> Workout {
        Workout::new("Boarstone +2", 74, 0.69, "Long endurance")
    }
    pub fn gibbs() -> Workout {
        Workout::new("Gibbs", 75, 0.70, "Steady aerobic")
    }
    pub fn carson() -> Workout {
        Workout::new("Carson", 60, 0.88, "Classic sweet spot")
    }
    pub fn monitor() -> Workout {
        Workout::new("Monitor", 54, 0.87, "Short sweet spot")
    }
    pub fn antelope() -> Workout {
        Workout::new("Antelope", 70, 0.89, "Sweet spot intervals")
    }
    pub fn tallac() -> Workout {
        Workout::new("Tallac", 67, 0.90, "Tempo")
    }
    pub fn baird() -> Workout {
        Workout::new("Baird", 62, 0.85, "Tempo intervals")
    }
}

/// Metrics the policy decides on. `None` means unknown, and unknown never
/// triggers a correction rule.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecommendationInput {
    /// Acute:chronic workload ratio
    pub acwr: Option<f64>,
    /// Percent of zone time in Z1-Z2
    pub easy_pct: Option<f64>,
    /// Percent of zone time in Z4-Z5
    pub hard_pct: Option<f64>,
    /// Mean run decoupling estimate, percent
    pub run_decoupling: Option<f64>,
}

/// The recommended next session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub workout_type: WorkoutType,
    pub target_tss: u32,
    pub target_intensity_factor: f64,
    /// Why this rule fired
    pub rationale: Vec<String>,
    /// Catalog workouts that fit the prescription
    pub workouts: Vec<Workout>,
}

struct Rule {
    name: &'static str,
    applies: fn(&RecommendationInput) -> bool,
    build: fn(&RecommendationInput) -> Recommendation,
}

/// Evaluated top-down; order is the policy. The last rule always matches.
const RULES: &[Rule] = &[
    Rule {
        name: "high_injury_risk",
        applies: |input| input.acwr.is_some_and(|r| r > load_params::ACWR_HIGH),
        build: |_| Recommendation {
            workout_type: WorkoutType::RecoveryOrRest,
            target_tss: 30,
            target_intensity_factor: 0.55,
            rationale: vec![
                "ACWR > 1.5: HIGH injury risk - prioritize recovery".to_string(),
                "Take a rest day or very easy spin".to_string(),
            ],
            workouts: vec![catalog::pettit(), catalog::lazy_mountain()],
        },
    },
    Rule {
        name: "elevated_injury_risk",
        applies: |input| input.acwr.is_some_and(|r| r > load_params::ACWR_ELEVATED),
        build: |_| Recommendation {
            workout_type: WorkoutType::Endurance,
            target_tss: 50,
            target_intensity_factor: 0.68,
            rationale: vec![
                "ACWR > 1.3: elevated risk - stick to endurance pace".to_string(),
                "Build aerobic base without adding stress".to_string(),
            ],
            workouts: vec![catalog::boarstone(), catalog::fletcher()],
        },
    },
    Rule {
        name: "excess_intensity",
        applies: |input| input.hard_pct.is_some_and(|p| p > policy::ZONE_HARD_MAX_PCT),
        build: |input| Recommendation {
            workout_type: WorkoutType::Endurance,
            target_tss: 60,
            target_intensity_factor: 0.70,
            rationale: vec![
                format!(
                    "{:.0}% time in Z4-5: too much intensity",
                    input.hard_pct.unwrap_or_default()
                ),
                "Need more Zone 2 aerobic base work".to_string(),
            ],
            workouts: vec![catalog::pettit_plus_one(), catalog::warren()],
        },
    },
    Rule {
        name: "thin_aerobic_base",
        applies: |input| input.easy_pct.is_some_and(|p| p < policy::ZONE_EASY_MIN_PCT),
        build: |input| Recommendation {
            workout_type: WorkoutType::Endurance,
            target_tss: 70,
            target_intensity_factor: 0.72,
            rationale: vec![
                format!(
                    "Only {:.0}% in Z1-2: build aerobic base",
                    input.easy_pct.unwrap_or_default()
                ),
                "Target 80/20 split - more easy miles".to_string(),
            ],
            workouts: vec![catalog::boarstone_plus_two(), catalog::gibbs()],
        },
    },
    Rule {
        name: "high_decoupling",
        applies: |input| {
            input
                .run_decoupling
                .is_some_and(|d| d > policy::DECOUPLING_LIMIT_PCT)
        },
        build: |_| Recommendation {
            workout_type: WorkoutType::SweetSpot,
            target_tss: 55,
            target_intensity_factor: 0.88,
            rationale: vec![
                "Aerobic base OK but efficiency needs work".to_string(),
                "Sweet Spot builds sustainable power efficiently".to_string(),
            ],
            workouts: vec![catalog::carson(), catalog::monitor()],
        },
    },
    Rule {
        name: "ready_for_intensity",
        applies: |_| true,
        build: |_| Recommendation {
            workout_type: WorkoutType::TempoOrSweetSpot,
            target_tss: 65,
            target_intensity_factor: 0.90,
            rationale: vec![
                "Strong aerobic base, balanced load".to_string(),
                "Ready for productive intensity work".to_string(),
            ],
            workouts: vec![catalog::antelope(), catalog::tallac(), catalog::baird()],
        },
    },
];

/// Pick the next workout. First matching rule wins.
pub fn recommend(input: &RecommendationInput) -> Recommendation {
    for rule in RULES {
        if (rule.applies)(input) {
            debug!(rule = rule.name, "recommendation rule matched");
            return (rule.build)(input);
        }
    }
    // The table ends in a catch-all rule
    unreachable!("recommendation rule table must have a catch-all")
}
