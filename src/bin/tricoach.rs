// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tricoach CLI: read exported training data, print a coaching brief.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use tricoach::config::EngineConfig;
use tricoach::intelligence::generate_brief;
use tricoach::{logging, store};

#[derive(Parser, Debug)]
#[command(author, version, about = "Training load and periodization engine", long_about = None)]
struct Args {
    /// Directory holding activities.json / activities.csv and optional
    /// wellness.json / sleep.json
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// Path to a TOML config file (default: platform config dir, then env)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the analysis window in days
    #[arg(long)]
    analysis_days: Option<i64>,

    /// Write the brief JSON here as well as to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print only the rendered coach prompt instead of the full JSON
    #[arg(long)]
    prompt_only: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_from_env()?;

    let args = Args::parse();

    let mut config = EngineConfig::load(args.config.clone())?;
    if let Some(days) = args.analysis_days {
        config.analysis_days = days;
    }

    let activities = load_activities(&args)?;
    let wellness = store::load_wellness(&args.data_dir.join("wellness.json"))?;
    let sleep = store::load_sleep(&args.data_dir.join("sleep.json"))?;

    let brief = generate_brief(
        &activities,
        wellness.as_ref(),
        sleep.as_deref(),
        &config,
        Utc::now(),
    )
    .context("Failed to generate coaching brief")?;

    if args.prompt_only {
        println!("{}", brief.prompt);
    } else {
        println!("{}", serde_json::to_string_pretty(&brief)?);
    }

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&brief)?)
            .with_context(|| format!("Failed to write brief to {}", path.display()))?;
        info!(path = %path.display(), "coaching brief written");
    }

    Ok(())
}

/// Prefer the rich JSON export; fall back to the flattened CSV.
fn load_activities(args: &Args) -> Result<Vec<tricoach::models::ActivityRecord>> {
    let json_path = args.data_dir.join("activities.json");
    let csv_path = args.data_dir.join("activities.csv");

    if json_path.exists() {
        store::load_activities_json(&json_path)
    } else if csv_path.exists() {
        store::load_activities_csv(&csv_path)
    } else {
        bail!(
            "no activity data found in {} (expected activities.json or activities.csv)",
            args.data_dir.display()
        );
    }
}
