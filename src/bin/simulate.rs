//! Command-line driver: run batches of matches or inspect a saved log.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use bgsim::env::BatchRunner;
use bgsim::{MatchConfig, MatchLog};

#[derive(Parser, Debug)]
#[command(name = "simulate", about = "Run Battlegrounds matches with random policies")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a batch of matches in parallel.
    Batch {
        /// Number of matches.
        #[arg(short, long, default_value_t = 16)]
        count: u64,
        /// Base seed; each match derives its own.
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Players per match (ignored when --config is given).
        #[arg(short, long, default_value_t = 8)]
        players: usize,
        /// JSON match configuration.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory to write one JSON log per match.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the standings stored in a JSON or bincode match log.
    Replay {
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Batch { count, seed, players, config, out } => batch(count, seed, players, config, out),
        Command::Replay { path } => replay(&path),
    }
}

fn batch(count: u64, seed: u64, players: usize, config: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => MatchConfig::from_path(&path)?,
        None => MatchConfig::default().with_player_count(players),
    };
    config.validate()?;

    if let Some(dir) = &out {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let reports = BatchRunner::standard(config).run(count, seed);
    let mut failed = 0;
    let mut rounds = 0;
    for report in &reports {
        match &report.result {
            Ok(summary) => {
                rounds += summary.rounds;
                let winner = summary
                    .winner()
                    .map_or_else(|| "shared".to_string(), |p| p.to_string());
                println!("match {:>4}  seed {:>20}  rounds {:>3}  winner {}", report.match_id, report.seed, summary.rounds, winner);
                if let Some(dir) = &out {
                    let path = dir.join(format!("match_{}.json", report.match_id));
                    std::fs::write(&path, summary.log.to_json()?)
                        .with_context(|| format!("writing {}", path.display()))?;
                }
            }
            Err(e) => {
                failed += 1;
                println!("match {:>4}  seed {:>20}  FAILED: {}", report.match_id, report.seed, e);
            }
        }
    }

    let finished = reports.len() - failed;
    if finished > 0 {
        log::info!("{} matches, {} failed, {:.1} rounds on average", reports.len(), failed, rounds as f64 / finished as f64);
    }
    if failed == reports.len() && failed > 0 {
        bail!("every match failed");
    }
    Ok(())
}

fn replay(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let log = match std::str::from_utf8(&bytes) {
        Ok(text) if text.trim_start().starts_with('{') => MatchLog::from_json(text)?,
        _ => MatchLog::from_bytes(&bytes)?,
    };

    println!("match {} (seed {}), {} rounds", log.match_id, log.seed, log.len());
    for standing in log.standings() {
        let fate = standing
            .eliminated_in
            .map_or_else(|| format!("{} health left", standing.health), |r| format!("out in round {}", r));
        println!("{:>2}. {}  {}", standing.placement, standing.player, fate);
    }
    Ok(())
}
