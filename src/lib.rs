//! # vital_rule - Vital-Sign Alert Engine
//!
//! Evaluates per-subject physiological measurements against stateful,
//! windowed condition rules and returns the alerts they raise.
//!
//! ## Quick Start
//!
//! ```
//! use vital_rule::{AlertEngine, store::MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! store.add_measurement(1, 88.0, "SystolicPressure", 1_000);
//! store.add_measurement(1, 91.0, "OxygenSaturation", 1_001);
//!
//! let mut engine = AlertEngine::new();
//! let alerts = engine.evaluate(&store, 1);
//! assert_eq!(alerts.len(), 3);
//! ```
//!
//! ## Features
//!
//! - **Per-subject windows**: trend, spike and rapid-drop detection keyed by subject
//! - **Family builders**: alert text tagged by the signal family that raised it
//! - **Annotations**: priority and repeat tags composed as pure transforms
//! - **Deterministic ordering**: records are stably sorted by timestamp before scanning

pub mod alert;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod ingestion;
pub mod measurement;
pub mod metrics;
pub mod rule;
pub mod rules;
pub mod store;
pub mod window;

use crate::alert::Alert;
use crate::config::{RuleThresholds, VitalRuleConfig};
use crate::correlation::OxygenTimeline;
use crate::measurement::Measurement;
use crate::metrics::METRICS;
use crate::rule::RuleSet;
use crate::store::RecordStore;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Runs evaluation sessions: one subject's full history, sorted, scanned once.
///
/// The engine owns its rule instances. Reusing an engine keeps their window
/// state, so a second `evaluate` of the same subject continues from where the
/// first left off; call [`AlertEngine::reset`] (or build a new engine) to
/// start clean.
///
/// # Example
///
/// ```
/// use vital_rule::AlertEngine;
/// use vital_rule::measurement::Measurement;
///
/// let mut engine = AlertEngine::new();
/// let alerts = engine.evaluate_records(
///     4,
///     vec![
///         Measurement::new(4, 91.0, "OxygenSaturation", 300_000),
///         Measurement::new(4, 97.0, "OxygenSaturation", 0),
///     ],
/// );
/// assert!(alerts.iter().any(|a| a.condition().contains("Rapid Oxygen Drop")));
/// ```
pub struct AlertEngine {
    rules: RuleSet,
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::with_thresholds(RuleThresholds::default())
    }

    pub fn with_thresholds(thresholds: RuleThresholds) -> Self {
        Self::with_rules(RuleSet::with_thresholds(&thresholds))
    }

    /// Uses caller-built rule instances, thresholds included.
    pub fn with_rules(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn from_config(config: &VitalRuleConfig) -> Self {
        Self::with_thresholds(config.thresholds.clone())
    }

    /// Replaces every rule window with empty state.
    pub fn reset(&mut self) {
        self.rules.reset();
        debug!("Rule state cleared");
    }

    /// Fetches the full history of `subject_id` and evaluates it.
    pub fn evaluate(&mut self, store: &dyn RecordStore, subject_id: i32) -> Vec<Alert> {
        let records = store.get_records(subject_id, i64::MIN, i64::MAX);
        self.evaluate_records(subject_id, records)
    }

    /// Evaluates every subject in the store, ascending by id.
    pub fn evaluate_all(&mut self, store: &dyn RecordStore) -> Vec<(i32, Vec<Alert>)> {
        store
            .subjects()
            .into_iter()
            .map(|subject_id| (subject_id, self.evaluate(store, subject_id)))
            .collect()
    }

    /// One session over an already-fetched history. Order of `records` does
    /// not matter; ties on timestamp keep their given order.
    pub fn evaluate_records(&mut self, subject_id: i32, mut records: Vec<Measurement>) -> Vec<Alert> {
        let span = info_span!("evaluate", subject_id);
        let _guard = span.enter();
        let started = Instant::now();

        // stable: equal timestamps stay in fetch order
        records.sort_by_key(|m| m.timestamp);
        let oxygen = OxygenTimeline::from_sorted(&records);

        let mut alerts = Vec::new();
        for record in &records {
            if let Some(rule) = self.rules.rule_for(&record.signal) {
                let fired = rule.evaluate(record);
                METRICS.record_alerts(rule.name(), fired.len());
                alerts.extend(fired);
            }

            if let Some(alert) = correlation::manual_alert(record) {
                METRICS.record_alerts("manual", 1);
                alerts.push(alert);
            }

            if let Some(alert) = correlation::hypotensive_hypoxemia(record, &oxygen) {
                METRICS.record_alerts("hypotensive_hypoxemia", 1);
                alerts.push(alert);
            }
        }

        METRICS.record_session(records.len(), started.elapsed().as_secs_f64());
        info!(
            subject_id,
            records = records.len(),
            alerts = alerts.len(),
            "Evaluation session complete"
        );
        alerts
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}
