//! BlitzBoat daily run.
//!
//! Entry point. Loads configuration, initialises structured logging, runs
//! the daily flow and prints ticket sheets for every chance race.

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

use blitzboat::config::AppConfig;
use blitzboat::daily::run_daily;
use blitzboat::report;

const BANNER: &str = r#"
  ___ _ _ _      ___           _
 | _ ) (_) |_ __| _ ) ___  __ _| |_
 | _ \ | |  _|_ / _ \/ _ \/ _` |  _|
 |___/_|_|\__/__|___/\___/\__,_|\__|

  Chance race detection and trifecta allocation
"#;

/// Rows of each venue ranking printed alongside the ticket sheets.
const RANKING_ROWS: usize = 10;

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let config_path = std::env::var("BLITZBOAT_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let cfg = AppConfig::load_or_default(&config_path)?;

    init_logging();

    println!("{BANNER}");
    info!(
        agent_name = %cfg.agent.name,
        config = %config_path,
        data_dir = %cfg.paths.data_dir.display(),
        budget = cfg.allocation.budget,
        "BlitzBoat starting up"
    );

    let snapshot_path = std::env::var("BLITZBOAT_SNAPSHOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| cfg.paths.snapshot());
    let run = run_daily(&cfg, &snapshot_path)?;
    let plan = &run.plan;

    let venues: BTreeSet<&str> = plan.plans.iter().map(|p| p.chance.venue.as_str()).collect();
    for venue in venues {
        if let Some(stats) = run.book.venue(venue) {
            println!("{}", report::render_ranking(stats, RANKING_ROWS));
        }
    }
    println!("{}", report::render_day_plan(plan));

    info!(
        path = %run.report_path.display(),
        added = run.added,
        pruned = run.pruned,
        chance_races = plan.plans.len(),
        stake = plan.total_stake(),
        "BlitzBoat run complete"
    );
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blitzboat=info"));

    let json_logging = std::env::var("BLITZBOAT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
