// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Engine configuration
//!
//! The engine itself never reads the environment or global state; it takes
//! an explicit [`EngineConfig`]. The CLI layer may populate that config
//! from a TOML file or from `.env`-style environment variables, in that
//! order of preference.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::constants::defaults;
use crate::models::{EventType, Priority, RaceGoal};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Days of history the performance extractors look at
    pub analysis_days: i64,
    /// Manually configured FTP in watts; trusted over any estimate
    pub ftp_watts: Option<f64>,
    /// Goal event driving periodization
    pub race_goal: Option<RaceGoal>,
    /// Athlete display name for the brief
    pub athlete_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analysis_days: defaults::ANALYSIS_DAYS,
            ftp_watts: None,
            race_goal: None,
            athlete_name: defaults::ATHLETE_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration: an explicit TOML file if one exists at `path`
    /// (or the platform config directory), otherwise environment variables.
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| {
            dirs::config_dir()
                .map(|p| p.join("tricoach/config.toml"))
                .unwrap_or_else(|| "config.toml".into())
                .to_string_lossy()
                .to_string()
        });

        if Path::new(&config_path).exists() {
            let content =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            dotenv::dotenv().ok();
            Ok(Self::from_env())
        }
    }

    /// Build configuration from environment variables. Unset or unparseable
    /// values fall back to defaults with a warning rather than failing.
    pub fn from_env() -> Self {
        let analysis_days = match std::env::var("ANALYSIS_DAYS") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "ANALYSIS_DAYS is not a number, using default");
                defaults::ANALYSIS_DAYS
            }),
            Err(_) => defaults::ANALYSIS_DAYS,
        };

        let ftp_watts = std::env::var("FTP").ok().and_then(|raw| {
            raw.parse::<f64>()
                .map_err(|_| warn!(value = %raw, "FTP is not a number, ignoring"))
                .ok()
        });

        let athlete_name = std::env::var("ATHLETE_NAME")
            .unwrap_or_else(|_| defaults::ATHLETE_NAME.to_string());

        Self {
            analysis_days,
            ftp_watts,
            race_goal: race_goal_from_env(),
            athlete_name,
        }
    }
}

/// Assemble the race goal from RACE_DATE / RACE_TYPE / RACE_PRIORITY.
/// An absent or malformed date means no goal; an unknown type or priority
/// is warned about and dropped rather than guessed.
fn race_goal_from_env() -> Option<RaceGoal> {
    let date_raw = std::env::var("RACE_DATE").ok()?;
    let date_raw = date_raw.trim();
    if date_raw.is_empty() {
        return None;
    }

    let date = match NaiveDate::parse_from_str(date_raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            warn!(value = %date_raw, "RACE_DATE is not YYYY-MM-DD, ignoring race goal");
            return None;
        }
    };

    let event_raw = std::env::var("RACE_TYPE").unwrap_or_default();
    let event = match EventType::from_key(event_raw.trim()) {
        Some(event) => event,
        None => {
            warn!(value = %event_raw, "RACE_TYPE not recognized, ignoring race goal");
            return None;
        }
    };

    let priority = std::env::var("RACE_PRIORITY")
        .ok()
        .and_then(|raw| Priority::from_key(raw.trim()))
        .unwrap_or_default();

    Some(RaceGoal {
        date,
        event,
        priority,
    })
}
