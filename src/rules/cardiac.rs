use crate::alert::{Alert, AlertFamily};
use crate::config::RuleThresholds;
use crate::measurement::{format_value, Measurement, SignalType};
use crate::rule::ConditionRule;
use crate::window::WindowBuffer;
use std::collections::HashMap;
use tracing::debug;

/// Spike detection against a moving average of recent ECG samples.
pub struct CardiacRhythmRule {
    capacity: usize,
    spike_factor: f64,
    windows: HashMap<i32, WindowBuffer>,
}

impl CardiacRhythmRule {
    pub fn new(thresholds: &RuleThresholds) -> Self {
        Self {
            capacity: thresholds.ecg_window,
            spike_factor: thresholds.ecg_spike_factor,
            windows: HashMap::new(),
        }
    }
}

impl ConditionRule for CardiacRhythmRule {
    fn name(&self) -> &'static str {
        "cardiac_rhythm"
    }

    fn evaluate(&mut self, measurement: &Measurement) -> Vec<Alert> {
        if measurement.signal != SignalType::Ecg {
            return Vec::new();
        }

        let capacity = self.capacity;
        let window = self
            .windows
            .entry(measurement.subject_id)
            .or_insert_with(|| WindowBuffer::new(capacity));

        // average of the samples before this one
        let average = window.average();
        let value = measurement.value;
        let mut alerts = Vec::new();

        if average > 0.0 && value > self.spike_factor * average {
            let message = format!(
                "ECG Spike Detected: {} (avg: {})",
                format_value(value),
                format_value(average)
            );
            let alert = AlertFamily::Ecg.build(
                measurement.subject_id.to_string(),
                &message,
                measurement.timestamp,
            );
            debug!(
                rule = "cardiac_rhythm",
                subject_id = measurement.subject_id,
                condition = %alert.condition(),
                "Rule fired"
            );
            alerts.push(alert);
        }

        window.push(value);
        alerts
    }

    fn reset(&mut self) {
        self.windows.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_never_spikes() {
        let mut rule = CardiacRhythmRule::new(&RuleThresholds::default());
        assert!(rule
            .evaluate(&Measurement::new(1, 1_000.0, "ECG", 0))
            .is_empty());
    }

    #[test]
    fn test_negative_average_disables_check() {
        let mut rule = CardiacRhythmRule::new(&RuleThresholds::default());
        rule.evaluate(&Measurement::new(1, -10.0, "ECG", 0));
        assert!(rule.evaluate(&Measurement::new(1, 50.0, "ECG", 1)).is_empty());
    }

    #[test]
    fn test_spike_text_includes_average() {
        let mut rule = CardiacRhythmRule::new(&RuleThresholds::default());
        rule.evaluate(&Measurement::new(1, 100.0, "ECG", 0));
        let alerts = rule.evaluate(&Measurement::new(1, 151.0, "ECG", 1));
        assert_eq!(alerts.len(), 1);
        assert_eq!(
            alerts[0].condition(),
            "ECG Alert: ECG Spike Detected: 151.0 (avg: 100.0)"
        );
    }

    #[test]
    fn test_value_at_exact_factor_does_not_spike() {
        let mut rule = CardiacRhythmRule::new(&RuleThresholds::default());
        for i in 0..5 {
            rule.evaluate(&Measurement::new(1, 100.0, "ECG", i));
        }
        assert!(rule.evaluate(&Measurement::new(1, 150.0, "ECG", 5)).is_empty());
    }
}
