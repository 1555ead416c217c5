use std::path::PathBuf;

use clap::Parser;

use hanabi_bench::config::{BenchmarkConfig, ResolvedOutputs};
use hanabi_bench::logging::init_logging;
use hanabi_bench::runner::BenchRunner;
use hanabi_core::AppInfo;
use hanabi_core::model::suit::Variant;

/// Self-play benchmarking harness for Hanabi conventions.
#[derive(Debug, Parser)]
#[command(
    name = "hanabi-bench",
    author,
    version,
    about = "Deterministic Hanabi self-play harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of games each agent plays.
    #[arg(long, value_name = "GAMES")]
    games: Option<usize>,

    /// Override the RNG seed for deal generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Override the table size.
    #[arg(long, value_name = "COUNT")]
    players: Option<usize>,

    /// Deal with the rainbow suit regardless of config.
    #[arg(long)]
    rainbow: bool,

    /// Exit after validating the configuration (no games are played).
    #[arg(long)]
    validate_only: bool,

    /// Log hat anomalies for every seat (forces HANABI_HAT_VERBOSE=1).
    #[arg(long)]
    log_decisions: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(games) = cli.games {
        config.games.count = games;
    }

    if let Some(seed) = cli.seed {
        config.games.seed = Some(seed);
    }

    if let Some(players) = cli.players {
        config.games.players = players;
    }

    if cli.rainbow {
        config.games.variant = Variant::Rainbow;
    }

    if cli.log_decisions {
        config.logging.decision_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let games = config.games.count;
    let players = config.games.players;
    let variant = config.games.variant;

    println!(
        "{} {}: loaded configuration '{run_id}' with {agent_count} agent{} ({games} games, {players} players, {variant})",
        AppInfo::name(),
        AppInfo::version(),
        if agent_count == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = BenchRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: self-play skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Run complete for '{run_id}': {} games × {} agents → {} rows at {}",
        summary.games_played,
        summary.agents,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Score histogram: {}", plot_path.display());
    }
    if let Some(replays_dir) = summary.replays_dir.as_ref() {
        println!("Replays: {}", replays_dir.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Decisions: {} events, reasons {:?}",
            outputs.summary.decisions.count, outputs.summary.decisions.reason_counts
        );
        if !outputs.summary.anomalies.kind_counts.is_empty() {
            println!("  Anomalies: {:?}", outputs.summary.anomalies.kind_counts);
        }
    }

    Ok(())
}
