// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! File-based input adapters
//!
//! Two activity shapes are supported: the rich JSON export (nested
//! `activityType.typeKey`, per-zone heart-rate seconds, stroke and power
//! data) and the flattened CSV export (one row per activity, summary
//! columns only). Both project onto [`ActivityRecord`].
//!
//! Wellness and sleep side-channels are optional: a missing file is
//! `Ok(None)`, a malformed one is a warning plus `None`. Activities are
//! the only required input.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{ActivityRecord, SleepRecord, SportType, WellnessSample};

/// Rich JSON activity shape as exported by the tracking service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJsonActivity {
    #[serde(default)]
    activity_id: Option<i64>,
    #[serde(default)]
    activity_name: Option<String>,
    #[serde(default)]
    activity_type: Option<RawActivityType>,
    #[serde(default)]
    start_time_local: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default, rename = "averageHR")]
    average_hr: Option<f64>,
    #[serde(default, rename = "maxHR")]
    max_hr: Option<f64>,
    #[serde(default)]
    average_speed: Option<f64>,
    #[serde(default)]
    avg_power: Option<f64>,
    #[serde(default, rename = "max20MinPower")]
    max_20min_power: Option<f64>,
    #[serde(default, rename = "hrTimeInZone_1")]
    hr_zone_1: Option<f64>,
    #[serde(default, rename = "hrTimeInZone_2")]
    hr_zone_2: Option<f64>,
    #[serde(default, rename = "hrTimeInZone_3")]
    hr_zone_3: Option<f64>,
    #[serde(default, rename = "hrTimeInZone_4")]
    hr_zone_4: Option<f64>,
    #[serde(default, rename = "hrTimeInZone_5")]
    hr_zone_5: Option<f64>,
    #[serde(default)]
    avg_strokes: Option<f64>,
    #[serde(default, rename = "averageRunningCadenceInStepsPerMinute")]
    average_cadence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawActivityType {
    #[serde(default)]
    type_key: Option<String>,
}

impl RawJsonActivity {
    fn into_record(self) -> ActivityRecord {
        let type_key = self
            .activity_type
            .and_then(|t| t.type_key)
            .unwrap_or_default();

        ActivityRecord {
            id: self
                .activity_id
                .map_or_else(String::new, |id| id.to_string()),
            name: self.activity_name.unwrap_or_else(|| "Unknown".to_string()),
            sport: SportType::from_type_key(&type_key),
            start_time: parse_start_time(self.start_time_local.as_deref()),
            duration_seconds: self.duration.unwrap_or(0.0),
            distance_meters: self.distance,
            average_heart_rate: self.average_hr,
            max_heart_rate: self.max_hr,
            average_speed: self.average_speed,
            average_power: self.avg_power,
            max_20min_power: self.max_20min_power,
            zone_seconds: [
                self.hr_zone_1.unwrap_or(0.0),
                self.hr_zone_2.unwrap_or(0.0),
                self.hr_zone_3.unwrap_or(0.0),
                self.hr_zone_4.unwrap_or(0.0),
                self.hr_zone_5.unwrap_or(0.0),
            ],
            average_strokes: self.avg_strokes,
            average_cadence: self.average_cadence,
        }
    }
}

/// Flattened CSV activity row.
#[derive(Debug, Deserialize)]
struct RawCsvActivity {
    #[serde(default, rename = "activityId")]
    activity_id: Option<i64>,
    #[serde(default, rename = "activityName")]
    activity_name: Option<String>,
    #[serde(default, rename = "activityType")]
    activity_type: Option<String>,
    #[serde(default, rename = "startTimeLocal")]
    start_time_local: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default, rename = "averageSpeed")]
    average_speed: Option<f64>,
    #[serde(default, rename = "averageHR")]
    average_hr: Option<f64>,
    #[serde(default, rename = "maxHR")]
    max_hr: Option<f64>,
    #[serde(default, rename = "averageRunningCadenceInStepsPerMinute")]
    average_cadence: Option<f64>,
}

impl RawCsvActivity {
    fn into_record(self) -> ActivityRecord {
        ActivityRecord {
            id: self
                .activity_id
                .map_or_else(String::new, |id| id.to_string()),
            name: self.activity_name.unwrap_or_else(|| "Unknown".to_string()),
            sport: SportType::from_type_key(self.activity_type.as_deref().unwrap_or("")),
            start_time: parse_start_time(self.start_time_local.as_deref()),
            duration_seconds: self.duration.unwrap_or(0.0),
            distance_meters: self.distance,
            average_heart_rate: self.average_hr,
            max_heart_rate: self.max_hr,
            average_speed: self.average_speed,
            average_power: None,
            max_20min_power: None,
            zone_seconds: [0.0; 5],
            average_strokes: None,
            average_cadence: self.average_cadence,
        }
    }
}

/// Parse the provider's local timestamp. An unparseable value yields `None`
/// and a warning; the record itself is kept.
fn parse_start_time(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    warn!(timestamp = %raw, "unparseable start time, keeping record undated");
    None
}

/// Load activities from the rich JSON export.
pub fn load_activities_json(path: &Path) -> Result<Vec<ActivityRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read activities from {}", path.display()))?;
    let raw: Vec<RawJsonActivity> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse activities JSON {}", path.display()))?;

    let records: Vec<ActivityRecord> = raw.into_iter().map(RawJsonActivity::into_record).collect();
    info!(count = records.len(), path = %path.display(), "loaded activities from JSON");
    Ok(records)
}

/// Load activities from the flattened CSV export.
pub fn load_activities_csv(path: &Path) -> Result<Vec<ActivityRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open activities CSV {}", path.display()))?;

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let raw: RawCsvActivity =
            row.with_context(|| format!("Failed to parse CSV row in {}", path.display()))?;
        records.push(raw.into_record());
    }

    info!(count = records.len(), path = %path.display(), "loaded activities from CSV");
    Ok(records)
}

/// Load the wellness side-channel, if present and well-formed.
pub fn load_wellness(path: &Path) -> Result<Option<WellnessSample>> {
    let Some(raw) = read_optional_json(path)? else {
        return Ok(None);
    };

    let resting_heart_rate = raw
        .get("heart_rates")
        .and_then(|hr| hr.get("restingHeartRate"))
        .and_then(|v| v.as_f64());

    // Body battery arrives either as a list of charge samples or one object
    let body_battery_peak = match raw.get("body_battery") {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("charged").and_then(|v| v.as_f64()))
            .fold(None, |peak: Option<f64>, v| {
                Some(peak.map_or(v, |p| p.max(v)))
            }),
        Some(serde_json::Value::Object(obj)) => obj.get("charged").and_then(|v| v.as_f64()),
        _ => None,
    };

    let stress_average = raw
        .get("stress")
        .and_then(|s| s.get("avgStressLevel"))
        .and_then(|v| v.as_f64());

    Ok(Some(WellnessSample {
        resting_heart_rate,
        stress_average,
        body_battery_peak,
    }))
}

/// Load the sleep side-channel, if present and well-formed. Records keep
/// their file order, which the provider writes most-recent-first.
pub fn load_sleep(path: &Path) -> Result<Option<Vec<SleepRecord>>> {
    let Some(raw) = read_optional_json(path)? else {
        return Ok(None);
    };

    match raw {
        serde_json::Value::Array(items) => {
            Ok(Some(items.into_iter().map(SleepRecord::new).collect()))
        }
        _ => {
            warn!(path = %path.display(), "sleep data is not a list, ignoring");
            Ok(None)
        }
    }
}

/// Read an optional JSON file: absent is `None`, unreadable or malformed is
/// a warning plus `None`. Side-channels must never take the brief down.
fn read_optional_json(path: &Path) -> Result<Option<serde_json::Value>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not read optional data file");
            return Ok(None);
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not parse optional data file");
            Ok(None)
        }
    }
}
