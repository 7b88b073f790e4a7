// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Tricoach
//!
//! A training load and periodization engine for triathletes. Tricoach turns
//! an exported activity history (plus optional wellness and sleep data) into
//! a structured coaching brief: readiness, training load and injury risk,
//! per-sport performance metrics, the current training phase, and a concrete
//! next-workout recommendation.
//!
//! ## Features
//!
//! - **Load model**: acute/chronic workload ratio with injury risk tiers
//! - **Performance extractors**: run decoupling, swim SWOLF, bike efficiency
//!   trend, FTP estimation, brick transition analysis
//! - **Periodization**: phase detection against a goal race with weekly
//!   targets, including multi-day stage race adjustments
//! - **Recommendation policy**: an ordered, auditable rule table picking the
//!   next workout
//! - **Explicit degradation**: missing data becomes an explicit "N/A"
//!   sentinel, never a fabricated zero
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tricoach::config::EngineConfig;
//! use tricoach::intelligence::generate_brief;
//! use tricoach::store;
//! use chrono::Utc;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let activities = store::load_activities_json(Path::new("data/activities.json"))?;
//!     let wellness = store::load_wellness(Path::new("data/wellness.json"))?;
//!     let sleep = store::load_sleep(Path::new("data/sleep.json"))?;
//!
//!     let config = EngineConfig::load(None)?;
//!     let brief = generate_brief(
//!         &activities,
//!         wellness.as_ref(),
//!         sleep.as_deref(),
//!         &config,
//!         Utc::now(),
//!     )?;
//!
//!     println!("{}", serde_json::to_string_pretty(&brief)?);
//!     Ok(())
//! }
//! ```

/// Common data models for activity, wellness and goal data
pub mod models;

/// Engine configuration
pub mod config;

/// Physiological thresholds and analysis parameters
pub mod constants;

/// Engine error types
pub mod errors;

/// File-based input adapters
pub mod store;

/// Training analytics and brief assembly
pub mod intelligence;

/// Structured logging setup
pub mod logging;
