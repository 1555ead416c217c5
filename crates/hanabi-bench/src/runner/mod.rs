mod agent;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use agent::AgentBlueprint;
use hanabi_bot::{HatFeatures, PolicyError};
use hanabi_core::game::serialization::{GameRecord, status_label};
use hanabi_core::game::setup::GameSetup;
use hanabi_core::model::card::Card;
use hanabi_core::model::round::{ActionOutcome, MAX_HINTS, RoundError, RoundStatus};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::{BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

pub use agent::AgentError;

/// Longest game the engine can produce is well below this; past it a table is stuck.
const MAX_TURNS: usize = 256;

/// Primary entry point for self-play runs.
pub struct BenchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
    log_anomalies: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub agents: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub plot_path: Option<PathBuf>,
    pub replays_dir: Option<PathBuf>,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents, HatFeatures::from_env())?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            log_anomalies: config.logging.decision_details,
            config,
            outputs,
            agents,
        })
    }

    /// Play every configured game with every agent, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;
        if !self.outputs.plots_dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.outputs.plots_dir)?;
        }
        if let Some(dir) = self.outputs.replays_dir.as_ref() {
            fs::create_dir_all(dir)?;
        }

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();

            let mut outcomes = Vec::with_capacity(self.agents.len());
            for agent in &self.agents {
                outcomes.push(self.play_game(game_index, game_seed, agent)?);
            }

            analytics.record_game(game_index, &outcomes)?;
            rows_written += write_game_rows(&mut writer, &self.config, &outcomes)?;
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;
        let plot_path = match summary.render_plot(&self.outputs.plots_dir) {
            Ok(path) => Some(path),
            Err(err) => {
                eprintln!("WARN: {}", err);
                None
            }
        };

        let telemetry_dir = self.outputs.summary_dir();
        let telemetry_path = if self.logging_enabled {
            Some(telemetry_dir.join(TELEMETRY_FILE))
        } else {
            None
        };

        let telemetry_outputs = if let Some(path) = telemetry_path.as_ref() {
            write_summary_outputs(path, &telemetry_dir)?
        } else {
            None
        };

        if let Some(outputs) = telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&self.outputs.summary_md, outputs)?;
        }

        Ok(RunSummary {
            games_played: self.config.games.count,
            agents: self.agents.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            plot_path,
            replays_dir: self.outputs.replays_dir.clone(),
            telemetry_path,
            telemetry_outputs,
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        game_seed: u64,
        agent: &AgentBlueprint,
    ) -> Result<GameOutcome, RunnerError> {
        let games = &self.config.games;
        let setup = GameSetup::new(game_seed, games.players, games.variant);
        let mut round = setup.deal()?;
        let mut table = agent.spawn_table(games.players);
        let mut metrics = DecisionMetrics::default();
        let mut wasted_fives = 0u32;

        while !round.is_over() {
            if round.turn() >= MAX_TURNS {
                return Err(RunnerError::game(format!(
                    "game {game_index} for agent '{}' still running after {MAX_TURNS} turns",
                    agent.name
                )));
            }

            let seat = round.current_player();
            let hints_before = round.hints();
            let start = Instant::now();
            let action = table.decide(&round)?;
            let elapsed_ms = metrics.record(start.elapsed());
            let outcome = round.apply(action)?;

            if let Some(card) = wasted_five(&outcome, hints_before) {
                wasted_fives += 1;
                self.warn_wasted_five(&agent.name, game_index, seat, card);
            }

            if self.logging_enabled && tracing::enabled!(Level::DEBUG) {
                event!(
                    target: "hanabi_bench::turn",
                    Level::DEBUG,
                    run_id = %self.config.run_id,
                    agent = %agent.name,
                    game_index = game_index as u32,
                    turn = (round.turn() - 1) as u32,
                    seat = seat as u32,
                    action = %action,
                    hints = round.hints(),
                    score = round.score() as u32,
                    elapsed_ms
                );
            }
        }

        let replay_path = match self.outputs.replays_dir.as_ref() {
            Some(dir) => {
                let path = dir.join(format!("{}_{}.json", game_id(game_index), agent.name));
                fs::write(&path, GameRecord::to_json(setup, &round)?)?;
                Some(path)
            }
            None => None,
        };

        let status = round.status();
        let metrics = metrics.finalize();
        if self.logging_enabled && tracing::enabled!(Level::INFO) {
            event!(
                target: "hanabi_bench::game",
                Level::INFO,
                run_id = %self.config.run_id,
                agent = %agent.name,
                game_index = game_index as u32,
                game_seed,
                score = round.score() as u32,
                bombs = round.bombs(),
                status = status_label(status),
                turns = round.turn() as u32,
                avg_ms_per_decision = metrics.avg_ms_per_decision,
            );
        }

        Ok(GameOutcome {
            agent_name: agent.name.clone(),
            game_index,
            game_seed,
            score: round.score(),
            max_score: round.max_score(),
            bombs: round.bombs(),
            hints_left: round.hints(),
            status,
            turns: round.turn(),
            wasted_fives,
            metrics,
            replay_path,
        })
    }

    /// Only logged in decision-detail mode, like the bot's own anomalies.
    fn warn_wasted_five(&self, agent: &str, game_index: usize, seat: usize, card: Card) {
        if !self.log_anomalies {
            return;
        }
        event!(
            target: "hanabi_bench::anomaly",
            Level::WARN,
            run_id = %self.config.run_id,
            agent,
            game_index = game_index as u32,
            seat = seat as u32,
            kind = "wasted_five",
            card = %card,
        );
    }
}

/// A five played with every token already in hand, so its token bonus is lost.
fn wasted_five(outcome: &ActionOutcome, hints_before: u8) -> Option<Card> {
    match outcome {
        ActionOutcome::Played {
            card,
            success: true,
        } if card.is_five() && hints_before == MAX_HINTS => Some(*card),
        _ => None,
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn game_id(game_index: usize) -> String {
    format!("G{game_index:05}")
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    outcomes: &[GameOutcome],
) -> Result<usize, RunnerError> {
    let mut rows_written = 0usize;
    for outcome in outcomes {
        let row = GameLogRow {
            run_id: config.run_id.clone(),
            game_id: game_id(outcome.game_index),
            game_index: outcome.game_index,
            game_seed: outcome.game_seed,
            agent: outcome.agent_name.clone(),
            players: config.games.players,
            variant: config.games.variant.as_str(),
            score: outcome.score,
            max_score: outcome.max_score,
            bombs: outcome.bombs,
            hints_left: outcome.hints_left,
            status: status_label(outcome.status),
            turns: outcome.turns,
            wasted_fives: outcome.wasted_fives,
            speed_ms_decision: outcome.metrics.avg_ms_per_decision,
            decisions: outcome.metrics.decisions,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

/// Result of one agent's table playing one deal.
pub struct GameOutcome {
    pub agent_name: String,
    pub game_index: usize,
    pub game_seed: u64,
    pub score: usize,
    pub max_score: usize,
    pub bombs: u8,
    pub hints_left: u8,
    pub status: RoundStatus,
    pub turns: usize,
    pub wasted_fives: u32,
    pub metrics: DecisionSummary,
    pub replay_path: Option<PathBuf>,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) -> f64 {
        self.total += duration;
        self.decisions += 1;
        duration.as_secs_f64() * 1000.0
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    agent: String,
    players: usize,
    variant: &'static str,
    score: usize,
    max_score: usize,
    bombs: u8,
    hints_left: u8,
    status: &'static str,
    turns: usize,
    wasted_fives: u32,
    speed_ms_decision: f64,
    decisions: u32,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("{0}")]
    Policy(#[from] PolicyError),
    #[error("round rejected an action: {0}")]
    Round(#[from] RoundError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}
