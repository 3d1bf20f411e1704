use crate::alert::Alert;
use crate::config::{LoggingConfig, VitalRuleConfig};
use crate::ingestion::{self, FileRecordReader};
use crate::metrics::METRICS;
use crate::store::MemoryStore;
use crate::AlertEngine;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
/// Logs go to stderr so stdout stays clean for `--json`.
pub fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).init();
    }
}

#[derive(Debug, Serialize)]
pub struct SubjectAlerts {
    pub subject_id: i32,
    pub alerts: Vec<Alert>,
}

/// Loads `data_dir` and evaluates one subject, or all of them.
pub fn evaluate_directory(
    data_dir: &Path,
    config: &VitalRuleConfig,
    subject: Option<i32>,
) -> Result<Vec<SubjectAlerts>> {
    let mut store = MemoryStore::new();
    FileRecordReader::new(data_dir).read_into(&mut store)?;

    let mut engine = AlertEngine::from_config(config);
    let results = match subject {
        Some(subject_id) => vec![SubjectAlerts {
            subject_id,
            alerts: engine.evaluate(&store, subject_id),
        }],
        None => engine
            .evaluate_all(&store)
            .into_iter()
            .map(|(subject_id, alerts)| SubjectAlerts { subject_id, alerts })
            .collect(),
    };

    debug!(metrics = %METRICS.to_prometheus(), "Evaluation metrics");
    Ok(results)
}

pub fn render_text(results: &[SubjectAlerts]) -> String {
    let mut output = String::new();
    for result in results {
        if result.alerts.is_empty() {
            continue;
        }
        output.push_str(&format!("🚨 Subject {} ({} alerts)\n", result.subject_id, result.alerts.len()));
        for alert in &result.alerts {
            output.push_str(&format!("   └─ [{}] {}\n", alert.timestamp(), alert.condition()));
        }
    }
    if output.is_empty() {
        output.push_str("✅ No alerts\n");
    }
    output
}

pub fn render_json(results: &[SubjectAlerts]) -> Result<String> {
    serde_json::to_string_pretty(results).context("Failed to serialize alerts")
}

/// Accepts either record format and describes what it parsed to.
pub fn check_line(line: &str) -> Result<String> {
    let measurement = ingestion::parse_file_line(line)
        .or_else(|_| ingestion::parse_message(line))
        .with_context(|| format!("Unrecognised record: {}", line))?;
    Ok(format!(
        "✅ subject={} timestamp={} signal={} value={}",
        measurement.subject_id, measurement.timestamp, measurement.signal, measurement.value
    ))
}
