//! bbsim - lineup run simulator CLI
//!
//! `run` simulates one lineup, `compare` cross-checks the pooled scalar and
//! vectorized runners, `convert` turns season stats into outcome profiles.

use anyhow::{Context, Result};
use bb_core::api::{self, LineupEntry};
use bb_core::engine::{SimulationConfig, SimulationStrategy};
use bb_core::models::{BatterProfile, SimulationResult};
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "bb_cli=info,bb_core=info";
const HISTOGRAM_WIDTH: usize = 50;

#[derive(Parser)]
#[command(name = "bbsim")]
#[command(about = "Monte Carlo run-production simulator for a nine-batter lineup", long_about = None)]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a lineup and report the score distribution
    Run {
        /// Lineup JSON file (9 entries)
        #[arg(long)]
        lineup: PathBuf,

        /// Number of games to simulate
        #[arg(long, default_value_t = 10_000)]
        games: i64,

        /// Execution strategy
        #[arg(long, default_value = "parallel")]
        strategy: SimulationStrategy,

        /// Random seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Worker count for the parallel strategy
        #[arg(long)]
        workers: Option<usize>,

        /// Write the full result JSON here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print a text histogram of runs per game
        #[arg(long)]
        histogram: bool,

        /// Also play one game and print its plate-by-plate tally
        #[arg(long)]
        verbose_game: bool,
    },

    /// Run pooled scalar and vectorized strategies side by side
    Compare {
        #[arg(long)]
        lineup: PathBuf,

        #[arg(long, default_value_t = 10_000)]
        games: i64,

        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        config: ConfigArgs,

        /// Maximum accepted relative difference of the means
        #[arg(long, default_value_t = 0.05)]
        tolerance: f64,
    },

    /// Convert season counting stats into outcome probabilities
    Convert {
        /// Lineup JSON file with `stats` and/or `probabilities` entries
        #[arg(long)]
        stats: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args, Clone, Debug, Default)]
struct ConfigArgs {
    /// Simulation config JSON (partial files fill from defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in preset, used when no config file is given
    #[arg(long, value_enum)]
    preset: Option<Preset>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Preset {
    Realistic,
    Aggressive,
    Conservative,
}

impl ConfigArgs {
    /// `--config`, else `--preset`, else `BB_SIM_CONFIG_PATH`, else defaults.
    fn load(&self) -> Result<SimulationConfig> {
        if let Some(path) = &self.config {
            return SimulationConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()));
        }
        match self.preset {
            Some(Preset::Realistic) => Ok(SimulationConfig::realistic()),
            Some(Preset::Aggressive) => Ok(SimulationConfig::aggressive()),
            Some(Preset::Conservative) => Ok(SimulationConfig::conservative()),
            None => SimulationConfig::from_env()
                .context("failed to load config from BB_SIM_CONFIG_PATH"),
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);
    info!(version = bb_core::VERSION, "bbsim starting");

    match cli.command {
        Commands::Run {
            lineup,
            games,
            strategy,
            seed,
            config,
            workers,
            output,
            histogram,
            verbose_game,
        } => {
            let profiles = load_lineup(&lineup)?;
            let config = config.load()?;
            let num_games = trial_count(games)?;
            let seed = seed.unwrap_or_else(random_seed);

            let result =
                api::simulate_with(&profiles, &config, num_games, strategy, seed, workers)
                    .context("simulation failed")?;

            print_summary(&result);
            if histogram {
                print!("{}", render_histogram(&result.distribution, result.num_games));
            }
            if verbose_game {
                let log = api::sample_game(&profiles, &config, seed)
                    .context("sample game failed")?;
                println!("\nSample game (seed {seed}):");
                println!("{}", serde_json::to_string_pretty(&log.tally)?);
            }
            if let Some(path) = output {
                write_json(&path, &result)?;
                println!("\nResult saved to: {}", path.display());
            }
        }

        Commands::Compare { lineup, games, seed, config, tolerance } => {
            let profiles = load_lineup(&lineup)?;
            let config = config.load()?;
            let num_games = trial_count(games)?;
            let seed = seed.unwrap_or_else(random_seed);

            let check = api::cross_check(&profiles, &config, num_games, seed)
                .context("cross-check failed")?;

            println!("Games:       {num_games} (seed {seed})");
            println!(
                "Scalar:      mean {:.3}  sd {:.3}  median {:.1}",
                check.scalar.mean, check.scalar.std_dev, check.scalar.median
            );
            println!(
                "Vectorized:  mean {:.3}  sd {:.3}  median {:.1}",
                check.vectorized.mean, check.vectorized.std_dev, check.vectorized.median
            );
            println!("Difference:  {:.2}%", check.relative_difference * 100.0);

            if !check.agrees_within(tolerance) {
                anyhow::bail!(
                    "strategies disagree: {:.2}% exceeds tolerance {:.2}%",
                    check.relative_difference * 100.0,
                    tolerance * 100.0
                );
            }
            println!("Strategies agree within {:.1}%", tolerance * 100.0);
        }

        Commands::Convert { stats, output } => {
            let profiles = load_lineup(&stats)?;
            let json = convert_to_json(&profiles)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Converted {} batters to: {}", profiles.len(), path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn load_lineup(path: &Path) -> Result<Vec<BatterProfile>> {
    api::load_lineup_file(path)
        .with_context(|| format!("failed to load lineup from {}", path.display()))
}

fn trial_count(games: i64) -> Result<usize> {
    match usize::try_from(games) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(bb_core::SimError::InvalidTrialCount(games).into()),
    }
}

fn random_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn print_summary(result: &SimulationResult) {
    println!("Lineup:      {}", result.lineup_names.join(", "));
    println!("Strategy:    {} (seed {})", result.strategy, result.seed);
    println!("Games:       {}", result.num_games);
    println!("Avg runs:    {:.3} ± {:.3}", result.avg_score, result.standard_error());
    println!("Median:      {:.1}", result.median_score);
    println!("Std dev:     {:.3}", result.std_dev);
    println!("Range:       {}-{}", result.min_score, result.max_score);
    println!("Elapsed:     {:.1} ms", result.elapsed_ms);
}

fn render_histogram(distribution: &BTreeMap<u32, u64>, total: usize) -> String {
    let peak = distribution.values().copied().max().unwrap_or(0).max(1);
    let mut out = String::new();
    for (&runs, &count) in distribution {
        let width = (count as usize * HISTOGRAM_WIDTH).div_ceil(peak as usize);
        let share = count as f64 / total.max(1) as f64 * 100.0;
        out.push_str(&format!("{runs:>3} | {:<w$} {share:5.1}%\n", "#".repeat(width), w = HISTOGRAM_WIDTH));
    }
    out
}

fn convert_to_json(profiles: &[BatterProfile]) -> Result<String> {
    let entries: Vec<LineupEntry> = profiles.iter().map(LineupEntry::from).collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

fn write_json(path: &Path, result: &SimulationResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
