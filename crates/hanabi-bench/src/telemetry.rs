use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub decisions: DecisionTelemetrySummary,
    pub anomalies: AnomalyTelemetrySummary,
}

#[derive(Debug, Default, Serialize)]
pub struct DecisionTelemetrySummary {
    pub count: usize,
    pub avg_hints: Option<f64>,
    pub reason_counts: BTreeMap<String, usize>,
    /// What clue givers told the first seat of each new chain.
    pub first_reason_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct AnomalyTelemetrySummary {
    pub count: usize,
    pub kind_counts: BTreeMap<String, usize>,
}

#[derive(Debug)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregate decision and anomaly events from the structured JSON log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut decisions = DecisionTelemetrySummary::default();
    let mut hints_avg = Average::new();
    let mut anomalies = AnomalyTelemetrySummary::default();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        match target {
            "hanabi_bot::decision" => {
                decisions.count += 1;

                if let Some(hints) = fields.get("hints").and_then(Value::as_f64) {
                    hints_avg.add(hints);
                }
                bump(&mut decisions.reason_counts, label(fields.get("reason")));
                if let Some(first_reason) = fields
                    .get("first_reason")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    bump(&mut decisions.first_reason_counts, first_reason);
                }
            }
            "hanabi_bot::anomaly" | "hanabi_bench::anomaly" => {
                anomalies.count += 1;
                bump(&mut anomalies.kind_counts, label(fields.get("kind")));
            }
            _ => {}
        }
    }

    decisions.avg_hints = hints_avg.mean();

    Ok(TelemetrySummary {
        decisions,
        anomalies,
    })
}

fn label(raw: Option<&Value>) -> &str {
    raw.and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("<unset>")
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(
        &json_path,
        serde_json::to_vec_pretty(&summary).map_err(TelemetryError::from)?,
    )
    .map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary json",
        source,
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    let decisions = &outputs.summary.decisions;
    section.push_str(&format!("- Decisions captured: {}\n", decisions.count));
    if let Some(value) = decisions.avg_hints {
        section.push_str(&format!("- Avg tokens at decision: {:.2}\n", value));
    }
    push_counts(&mut section, "- Decision reasons:\n", "  ", &decisions.reason_counts);
    push_counts(
        &mut section,
        "- Chain openers:\n",
        "  ",
        &decisions.first_reason_counts,
    );

    let anomalies = &outputs.summary.anomalies;
    section.push_str("\n### Anomalies\n");
    if anomalies.kind_counts.is_empty() {
        section.push_str("- <none>\n");
    } else {
        push_counts(&mut section, "", "", &anomalies.kind_counts);
    }

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn push_counts(out: &mut String, heading: &str, indent: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    out.push_str(heading);
    for (label, count) in counts {
        out.push_str(&format!("{indent}- {label}: {count}\n"));
    }
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push('\n');

    output.push_str("## Decisions\n");
    output.push_str(&format!("- Events: {}\n", summary.decisions.count));
    if let Some(value) = summary.decisions.avg_hints {
        output.push_str(&format!("- Avg tokens: {:.2}\n", value));
    }
    push_counts(
        &mut output,
        "- Reasons:\n",
        "  ",
        &summary.decisions.reason_counts,
    );
    push_counts(
        &mut output,
        "- Chain openers:\n",
        "  ",
        &summary.decisions.first_reason_counts,
    );
    output.push('\n');

    output.push_str("## Anomalies\n");
    output.push_str(&format!("- Events: {}\n", summary.anomalies.count));
    push_counts(&mut output, "", "", &summary.anomalies.kind_counts);
    output
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    #[test]
    fn summarises_decision_and_anomaly_events() {
        let lines = vec![
            r#"{"target":"hanabi_bot::decision","fields":{"reason":"clue","first_reason":"play","hints":8}}"#,
            r#"{"target":"hanabi_bot::decision","fields":{"reason":"decoded_play","first_reason":"","hints":7}}"#,
            r#"{"target":"hanabi_bot::decision","fields":{"reason":"clue","first_reason":"five_for_token","hints":6}}"#,
            r#"{"target":"hanabi_bot::anomaly","fields":{"kind":"endgame_discard","seat":2}}"#,
            r#"{"target":"hanabi_bench::anomaly","fields":{"kind":"wasted_five","seat":0}}"#,
            r#"{"target":"hanabi_bench::turn","fields":{"action":"play slot 0"}}"#,
        ];
        let file = write_temp_file(&lines);
        let summary = summarise_telemetry(file.path()).expect("summarise");
        assert_eq!(summary.decisions.count, 3);
        assert!((summary.decisions.avg_hints.unwrap() - 7.0).abs() < 1e-9);
        assert_eq!(summary.decisions.reason_counts.get("clue"), Some(&2));
        assert_eq!(summary.decisions.reason_counts.get("decoded_play"), Some(&1));
        assert_eq!(summary.decisions.first_reason_counts.len(), 2);
        assert_eq!(
            summary.decisions.first_reason_counts.get("five_for_token"),
            Some(&1)
        );
        assert_eq!(summary.anomalies.count, 2);
        assert_eq!(summary.anomalies.kind_counts.get("wasted_five"), Some(&1));
    }

    #[test]
    fn handles_missing_file() {
        let path = Path::new("tests/does/not/exist.jsonl");
        let summary = summarise_telemetry(path).expect("summarise missing file");
        assert_eq!(summary.decisions.count, 0);
        assert!(summary.decisions.avg_hints.is_none());
        assert!(summary.anomalies.kind_counts.is_empty());
    }

    #[test]
    fn events_without_labels_count_as_unset() {
        let file = write_temp_file(&[r#"{"target":"hanabi_bot::anomaly","fields":{}}"#]);
        let summary = summarise_telemetry(file.path()).expect("summarise");
        assert_eq!(summary.anomalies.kind_counts.get("<unset>"), Some(&1));
    }

    #[test]
    fn appends_highlights_to_summary_markdown() {
        let mut summary_file = tempfile::NamedTempFile::new().expect("summary temp file");
        writeln!(summary_file, "# Hanabi Self-Play Summary").expect("seed summary content");
        let telemetry_json = tempfile::NamedTempFile::new().expect("telemetry json temp");
        let telemetry_md = tempfile::NamedTempFile::new().expect("telemetry md temp");

        let mut reasons = BTreeMap::new();
        reasons.insert("clue".to_string(), 12);
        reasons.insert("decoded_play".to_string(), 30);
        let mut kinds = BTreeMap::new();
        kinds.insert("endgame_discard".to_string(), 3);

        let outputs = TelemetryOutputs {
            summary: TelemetrySummary {
                decisions: DecisionTelemetrySummary {
                    count: 42,
                    avg_hints: Some(4.25),
                    reason_counts: reasons,
                    first_reason_counts: BTreeMap::new(),
                },
                anomalies: AnomalyTelemetrySummary {
                    count: 3,
                    kind_counts: kinds,
                },
            },
            json_path: telemetry_json.path().to_path_buf(),
            markdown_path: telemetry_md.path().to_path_buf(),
        };

        append_highlights_to_markdown(summary_file.path(), &outputs).expect("append highlights");

        let contents = std::fs::read_to_string(summary_file.path()).expect("read summary file");
        assert!(contents.contains("## Telemetry Highlights"));
        assert!(contents.contains("Decisions captured: 42"));
        assert!(contents.contains("Avg tokens at decision: 4.25"));
        assert!(contents.contains("  - decoded_play: 30"));
        assert!(!contents.contains("Chain openers"));
        assert!(contents.contains("### Anomalies"));
        assert!(contents.contains("- endgame_discard: 3"));
    }
}
