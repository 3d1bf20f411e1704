use crate::alert::{Alert, AlertFamily};
use crate::config::RuleThresholds;
use crate::measurement::{format_value, Measurement, SignalType};
use crate::rule::ConditionRule;
use crate::window::TimeWindow;
use std::collections::HashMap;
use tracing::debug;

/// Low-saturation and rapid-drop checks.
///
/// The drop check compares the current value against the oldest sample seen in
/// the preceding ten minutes, so membership is by timestamp, not sample count.
pub struct OxygenSaturationRule {
    low: f64,
    drop: f64,
    window_ms: i64,
    history: HashMap<i32, TimeWindow>,
}

impl OxygenSaturationRule {
    pub fn new(thresholds: &RuleThresholds) -> Self {
        Self {
            low: thresholds.oxygen_low,
            drop: thresholds.oxygen_drop,
            window_ms: thresholds.oxygen_drop_window_ms,
            history: HashMap::new(),
        }
    }
}

impl ConditionRule for OxygenSaturationRule {
    fn name(&self) -> &'static str {
        "oxygen_saturation"
    }

    fn evaluate(&mut self, measurement: &Measurement) -> Vec<Alert> {
        if measurement.signal != SignalType::OxygenSaturation {
            return Vec::new();
        }

        let subject = measurement.subject_id.to_string();
        let value = measurement.value;
        let ts = measurement.timestamp;
        let mut alerts = Vec::new();

        if value < self.low {
            let message = format!("Low Oxygen Saturation: {}", format_value(value));
            alerts.push(AlertFamily::BloodOxygen.build(subject.as_str(), &message, ts));
        }

        let window_ms = self.window_ms;
        let history = self
            .history
            .entry(measurement.subject_id)
            .or_insert_with(|| TimeWindow::new(window_ms));

        if let Some((_, oldest)) = history.earliest_before(ts) {
            if oldest - value >= self.drop {
                let message = format!(
                    "Rapid Oxygen Drop: {} → {}",
                    format_value(oldest),
                    format_value(value)
                );
                alerts.push(AlertFamily::BloodOxygen.build(subject.as_str(), &message, ts));
            }
        }
        history.insert(ts, value);

        for alert in &alerts {
            debug!(
                rule = self.name(),
                subject_id = measurement.subject_id,
                condition = %alert.condition(),
                "Rule fired"
            );
        }
        alerts
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}
