use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use hanabi_core::model::round::RoundStatus;
use plotters::prelude::*;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentConfig, AgentKind, BenchmarkConfig};
use crate::runner::GameOutcome;

const CONFIDENCE_Z: f64 = 1.96; // 95% CI
const SERIES_COLORS: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in run results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("baseline '{0}' missing for game {1}")]
    MissingBaselineGame(String, String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    comparisons: HashMap<String, ComparisonAccumulator>,
    agent_order: Vec<String>,
    latency_budget_ms: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .baseline()
            .map(str::to_string)
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.clone(), config.metrics.latency_budget_ms),
            );
            order.push(agent.name.clone());
        }

        if !agents.contains_key(&baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        Ok(Self {
            baseline,
            agents,
            comparisons: HashMap::new(),
            agent_order: order,
            latency_budget_ms: config.metrics.latency_budget_ms,
        })
    }

    /// Records every agent's result on the same deal.
    pub fn record_game(
        &mut self,
        game_index: usize,
        outcomes: &[GameOutcome],
    ) -> Result<(), AnalyticsError> {
        let baseline_score = outcomes
            .iter()
            .find(|outcome| outcome.agent_name == self.baseline)
            .map(|outcome| outcome.score as f64)
            .ok_or_else(|| {
                AnalyticsError::MissingBaselineGame(
                    self.baseline.clone(),
                    format!("G{game_index:05}"),
                )
            })?;

        for outcome in outcomes {
            let acc = self
                .agents
                .get_mut(&outcome.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(outcome.agent_name.clone()))?;
            acc.record_game(outcome);
        }

        for outcome in outcomes {
            if outcome.agent_name == self.baseline {
                continue;
            }
            let diff = outcome.score as f64 - baseline_score;
            self.comparisons
                .entry(outcome.agent_name.clone())
                .or_insert_with(ComparisonAccumulator::new)
                .record(diff);
        }

        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let mut comparisons = Vec::new();
        for report in &reports {
            if report.name == self.baseline {
                comparisons.push(ComparisonReport {
                    agent: report.name.clone(),
                    p_value: 1.0,
                    sample_size: report.games,
                });
                continue;
            }
            let (p_value, sample_size) = match self.comparisons.remove(&report.name) {
                Some(comp) => comp.wilcoxon_signed_rank(),
                None => (1.0, 0),
            };
            comparisons.push(ComparisonReport {
                agent: report.name.clone(),
                p_value,
                sample_size,
            });
        }

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            agents: reports,
            comparisons,
            latency_budget_ms: self.latency_budget_ms,
        }
        .enrich())
    }
}

struct AgentAccumulator {
    config: AgentConfig,
    scores: Vec<f64>,
    score_counts: Vec<usize>,
    perfect: u32,
    bombed: u32,
    total_bombs: u32,
    wasted_fives: u32,
    total_latency_ms: f64,
    total_decisions: u64,
    latency_budget_ms: u64,
}

impl AgentAccumulator {
    fn new(config: AgentConfig, latency_budget_ms: u64) -> Self {
        Self {
            config,
            scores: Vec::new(),
            score_counts: Vec::new(),
            perfect: 0,
            bombed: 0,
            total_bombs: 0,
            wasted_fives: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
            latency_budget_ms,
        }
    }

    fn record_game(&mut self, outcome: &GameOutcome) {
        self.scores.push(outcome.score as f64);
        if self.score_counts.len() <= outcome.max_score {
            self.score_counts.resize(outcome.max_score + 1, 0);
        }
        if let Some(slot) = self.score_counts.get_mut(outcome.score) {
            *slot += 1;
        }
        match outcome.status {
            RoundStatus::Perfect => self.perfect += 1,
            RoundStatus::Bombed => self.bombed += 1,
            RoundStatus::InProgress | RoundStatus::DeckExhausted => {}
        }
        self.total_bombs += u32::from(outcome.bombs);
        self.wasted_fives += outcome.wasted_fives;
        self.total_latency_ms += outcome.metrics.total_ms;
        self.total_decisions += u64::from(outcome.metrics.decisions);
    }

    fn into_report(self) -> AgentReport {
        let games = self.scores.len();
        let per_game = |count: u32| {
            if games == 0 {
                0.0
            } else {
                f64::from(count) / games as f64
            }
        };
        let avg_score = if games == 0 {
            0.0
        } else {
            self.scores.iter().sum::<f64>() / games as f64
        };
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };
        AgentReport {
            ci95: confidence_interval(&self.scores),
            perfect_rate: per_game(self.perfect),
            bombed_rate: per_game(self.bombed),
            avg_bombs: per_game(self.total_bombs),
            name: self.config.name,
            kind: self.config.kind,
            params: self.config.params,
            games,
            avg_score,
            wasted_fives: self.wasted_fives,
            average_ms_per_decision: avg_latency,
            score_counts: self.score_counts,
            delta_vs_baseline: 0.0, // Filled later once we know baseline report
            over_budget: avg_latency > self.latency_budget_ms as f64,
        }
    }
}

#[derive(Clone)]
struct ComparisonAccumulator {
    diffs: Vec<f64>,
}

impl ComparisonAccumulator {
    fn new() -> Self {
        Self { diffs: Vec::new() }
    }

    fn record(&mut self, diff: f64) {
        self.diffs.push(diff);
    }

    fn wilcoxon_signed_rank(self) -> (f64, usize) {
        let diffs: Vec<f64> = self
            .diffs
            .into_iter()
            .filter(|d| d.abs() > f64::EPSILON)
            .collect();
        let n = diffs.len();
        if n == 0 {
            return (1.0, 0);
        }

        let mut paired: Vec<(f64, f64)> =
            diffs.into_iter().map(|d| (d.abs(), d.signum())).collect();
        paired.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Rank handling with ties
        let mut ranks = Vec::with_capacity(n);
        let mut tie_sizes = Vec::new();
        let mut i = 0;
        while i < paired.len() {
            let mut j = i;
            while j + 1 < paired.len() && (paired[j + 1].0 - paired[i].0).abs() < 1e-12 {
                j += 1;
            }
            let rank = (i + j + 2) as f64 / 2.0;
            for pair in &paired[i..=j] {
                ranks.push((rank, pair.1));
            }
            if j > i {
                tie_sizes.push(j - i + 1);
            }
            i = j + 1;
        }

        let w_plus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign > 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w_minus: f64 = ranks
            .iter()
            .filter(|(_, sign)| *sign < 0.0)
            .map(|(rank, _)| *rank)
            .sum();
        let w = w_plus.min(w_minus);
        let n_f = n as f64;
        let mean_w = n_f * (n_f + 1.0) / 4.0;

        // Variance with tie correction
        let tie_adjustment: f64 = tie_sizes
            .into_iter()
            .map(|count| {
                let c = count as f64;
                (c.powi(3) - c) / 48.0
            })
            .sum();
        let variance_w = n_f * (n_f + 1.0) * (2.0 * n_f + 1.0) / 24.0 - tie_adjustment;
        if variance_w <= 0.0 {
            return (1.0, n);
        }

        let z = ((w - mean_w).abs() - 0.5) / variance_w.sqrt();
        let Ok(normal) = Normal::new(0.0, 1.0) else {
            return (1.0, n);
        };
        let p = 2.0 * (1.0 - normal.cdf(z));
        (p.clamp(0.0, 1.0), n)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn enrich(mut self) -> Self {
        let baseline_avg = self
            .agents
            .iter()
            .find(|agent| agent.name == self.baseline)
            .map(|agent| agent.avg_score)
            .unwrap_or(0.0);

        for agent in &mut self.agents {
            agent.delta_vs_baseline = agent.avg_score - baseline_avg;
        }

        self
    }

    pub fn render_markdown(&self) -> String {
        let mut rows = String::new();
        rows.push_str("# Hanabi Self-Play Summary\n\n");
        rows.push_str(&format!(
            "Baseline: `{}`. Latency budget: {} ms average per decision\n\n",
            self.baseline, self.latency_budget_ms
        ));
        rows.push_str("| Agent | Kind | Games | Avg score | Δ vs baseline | 95% CI | Perfect % | Bombed % | Avg bombs | Wasted fives | Avg ms/decision | Over Budget | p-value |\n");
        rows.push_str("|-------|------|-------|-----------|----------------|--------|-----------|----------|-----------|--------------|------------------|-------------|---------|\n");

        for agent in &self.agents {
            let comparison = self
                .comparisons
                .iter()
                .find(|c| c.agent == agent.name)
                .map(|c| c.p_value)
                .unwrap_or(1.0);
            rows.push_str(&format!(
                "| {name} | {kind:?} | {games} | {avg:.3} | {delta:+.3} | [{ci_low:.3}, {ci_high:.3}] | {perfect:.1}% | {bombed:.1}% | {bombs:.2} | {wasted} | {latency:.3} | {over_budget} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                games = agent.games,
                avg = agent.avg_score,
                delta = agent.delta_vs_baseline,
                ci_low = agent.ci95.0,
                ci_high = agent.ci95.1,
                perfect = agent.perfect_rate * 100.0,
                bombed = agent.bombed_rate * 100.0,
                bombs = agent.avg_bombs,
                wasted = agent.wasted_fives,
                latency = agent.average_ms_per_decision,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
                pval = comparison,
            ));
        }

        rows.push_str("\n## Score Distribution\n\n| Score |");
        for agent in &self.agents {
            rows.push_str(&format!(" {} |", agent.name));
        }
        rows.push_str("\n|-------|");
        for _ in &self.agents {
            rows.push_str("------|");
        }
        rows.push('\n');

        let top = self
            .agents
            .iter()
            .map(|agent| agent.score_counts.len())
            .max()
            .unwrap_or(0);
        for score in (0..top).rev() {
            let counts: Vec<usize> = self
                .agents
                .iter()
                .map(|agent| agent.score_counts.get(score).copied().unwrap_or(0))
                .collect();
            if counts.iter().all(|count| *count == 0) {
                continue;
            }
            rows.push_str(&format!("| {score} |"));
            for count in counts {
                rows.push_str(&format!(" {count} |"));
            }
            rows.push('\n');
        }

        rows
    }

    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        fs::write(path.as_ref(), self.render_markdown()).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }

    pub fn render_plot(&self, dir: impl AsRef<Path>) -> Result<PathBuf, AnalyticsError> {
        let dir = dir.as_ref();
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(|e| AnalyticsError::Io {
                context: "creating plots directory",
                source: e,
            })?;
        }

        let output_path = dir.join("score_histogram.png");
        let agents_snapshot = self.agents.clone();

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));

        let plot_attempt = std::panic::catch_unwind(move || {
            let root = BitMapBackend::new(&output_path, (800, 480)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let agents = agents_snapshot;
            let buckets = agents
                .iter()
                .map(|agent| agent.score_counts.len())
                .max()
                .unwrap_or(1)
                .max(1);
            let y_max = agents
                .iter()
                .flat_map(|agent| agent.score_counts.iter().copied())
                .max()
                .unwrap_or(0)
                .max(1) as f64;

            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .caption("Final score distribution", ("sans-serif", 22))
                .set_label_area_size(LabelAreaPosition::Left, 50)
                .set_label_area_size(LabelAreaPosition::Bottom, 40)
                .build_cartesian_2d(0.0..buckets as f64, 0.0..y_max * 1.1)
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            chart
                .configure_mesh()
                .disable_mesh()
                .y_desc("Games")
                .x_desc("Score")
                .draw()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            let width = 0.8 / agents.len().max(1) as f64;
            for (agent_idx, agent) in agents.iter().enumerate() {
                let color = SERIES_COLORS[agent_idx % SERIES_COLORS.len()];
                chart
                    .draw_series(agent.score_counts.iter().enumerate().map(|(score, count)| {
                        let left = score as f64 + 0.1 + width * agent_idx as f64;
                        Rectangle::new(
                            [(left, 0.0), (left + width, *count as f64)],
                            color.filled(),
                        )
                    }))
                    .map_err(|e| AnalyticsError::Plot(e.to_string()))?;
            }

            drop(chart);

            root.present()
                .map_err(|e| AnalyticsError::Plot(e.to_string()))?;

            drop(root);

            Ok(output_path)
        });

        std::panic::set_hook(prev_hook);

        match plot_attempt {
            Ok(result) => result,
            Err(_) => Err(AnalyticsError::Plot(
                "plotters panicked while rendering (missing font support?)".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub games: usize,
    pub avg_score: f64,
    pub ci95: (f64, f64),
    pub perfect_rate: f64,
    pub bombed_rate: f64,
    pub avg_bombs: f64,
    pub wasted_fives: u32,
    pub average_ms_per_decision: f64,
    /// Games per final score, indexed by score.
    pub score_counts: Vec<usize>,
    #[serde(skip)]
    pub delta_vs_baseline: f64,
    #[serde(skip)]
    pub over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub p_value: f64,
    pub sample_size: usize,
}

fn confidence_interval(points: &[f64]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let mean = points.iter().sum::<f64>() / points.len() as f64;
    if points.len() == 1 {
        return (mean, mean);
    }
    let variance = points
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / (points.len() as f64 - 1.0);
    let std_error = (variance / points.len() as f64).sqrt();
    let margin = CONFIDENCE_Z * std_error;
    (mean - margin, mean + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::DecisionSummary;

    const YAML: &str = r#"
run_id: "analytics"
games:
  count: 3
agents:
  - name: "hat"
    kind: "hat"
  - name: "hat_plain"
    kind: "hat"
    params:
      modified_action: false
outputs:
  jsonl: "out/games.jsonl"
  summary_md: "out/summary.md"
  plots_dir: "out/plots"
"#;

    fn config() -> BenchmarkConfig {
        let mut cfg: BenchmarkConfig = serde_yaml::from_str(YAML).expect("parse");
        cfg.validate().expect("valid");
        cfg
    }

    fn outcome(agent: &str, game_index: usize, score: usize, status: RoundStatus) -> GameOutcome {
        GameOutcome {
            agent_name: agent.to_string(),
            game_index,
            game_seed: game_index as u64,
            score,
            max_score: 25,
            bombs: if status == RoundStatus::Bombed { 3 } else { 0 },
            hints_left: 0,
            status,
            turns: 60,
            wasted_fives: 0,
            metrics: DecisionSummary {
                decisions: 60,
                avg_ms_per_decision: 0.5,
                total_ms: 30.0,
            },
            replay_path: None,
        }
    }

    #[test]
    fn confidence_interval_brackets_the_mean() {
        let (low, high) = confidence_interval(&[20.0, 22.0, 24.0]);
        assert!(low < 22.0 && high > 22.0);
        assert!((high - 22.0 - (22.0 - low)).abs() < 1e-9);
        assert_eq!(confidence_interval(&[17.0]), (17.0, 17.0));
        assert_eq!(confidence_interval(&[]), (0.0, 0.0));
    }

    #[test]
    fn collector_reports_rates_and_deltas() {
        let mut collector = AnalyticsCollector::new(&config()).unwrap();
        collector
            .record_game(
                0,
                &[
                    outcome("hat", 0, 25, RoundStatus::Perfect),
                    outcome("hat_plain", 0, 22, RoundStatus::DeckExhausted),
                ],
            )
            .unwrap();
        collector
            .record_game(
                1,
                &[
                    outcome("hat", 1, 23, RoundStatus::DeckExhausted),
                    outcome("hat_plain", 1, 9, RoundStatus::Bombed),
                ],
            )
            .unwrap();

        let summary = collector.finalize().unwrap();
        assert_eq!(summary.baseline, "hat");
        let hat = &summary.agents[0];
        assert_eq!(hat.games, 2);
        assert!((hat.avg_score - 24.0).abs() < 1e-9);
        assert!((hat.perfect_rate - 0.5).abs() < 1e-9);
        assert_eq!(hat.score_counts[25], 1);

        let plain = &summary.agents[1];
        assert!((plain.bombed_rate - 0.5).abs() < 1e-9);
        assert!((plain.avg_bombs - 1.5).abs() < 1e-9);
        assert!((plain.delta_vs_baseline + 8.5).abs() < 1e-9);
        assert!(!plain.over_budget);

        let comparison = summary
            .comparisons
            .iter()
            .find(|c| c.agent == "hat_plain")
            .unwrap();
        assert_eq!(comparison.sample_size, 2);
    }

    #[test]
    fn missing_baseline_result_is_an_error() {
        let mut collector = AnalyticsCollector::new(&config()).unwrap();
        let err = collector
            .record_game(4, &[outcome("hat_plain", 4, 20, RoundStatus::DeckExhausted)])
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingBaselineGame(_, id) if id == "G00004"));
    }

    #[test]
    fn wilcoxon_identical_results_have_no_signal() {
        let mut comp = ComparisonAccumulator::new();
        for _ in 0..5 {
            comp.record(0.0);
        }
        assert_eq!(comp.wilcoxon_signed_rank(), (1.0, 0));
    }

    #[test]
    fn wilcoxon_one_sided_shift_is_significant() {
        let mut comp = ComparisonAccumulator::new();
        for diff in 1..=20 {
            comp.record(-(diff as f64));
        }
        let (p, n) = comp.wilcoxon_signed_rank();
        assert_eq!(n, 20);
        assert!(p < 0.01);
    }

    #[test]
    fn markdown_lists_agents_and_distribution() {
        let mut collector = AnalyticsCollector::new(&config()).unwrap();
        collector
            .record_game(
                0,
                &[
                    outcome("hat", 0, 24, RoundStatus::DeckExhausted),
                    outcome("hat_plain", 0, 21, RoundStatus::DeckExhausted),
                ],
            )
            .unwrap();
        let markdown = collector.finalize().unwrap().render_markdown();
        assert!(markdown.contains("# Hanabi Self-Play Summary"));
        assert!(markdown.contains("| hat | Hat | 1 | 24.000 | +0.000 |"));
        assert!(markdown.contains("| Score | hat | hat_plain |"));
        assert!(markdown.contains("| 24 | 1 | 0 |"));
        assert!(markdown.contains("| 21 | 0 | 1 |"));
        assert!(!markdown.contains("| 23 |"));
    }
}
