use crate::alert::{Alert, AlertFamily};
use crate::config::RuleThresholds;
use crate::measurement::{format_value, Measurement, SignalType};
use crate::rule::ConditionRule;
use crate::window::WindowBuffer;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PressureKind {
    Systolic,
    Diastolic,
}

impl PressureKind {
    fn of(signal: &SignalType) -> Option<Self> {
        match signal {
            SignalType::SystolicPressure => Some(PressureKind::Systolic),
            SignalType::DiastolicPressure => Some(PressureKind::Diastolic),
            _ => None,
        }
    }

    fn trend_label(&self) -> &'static str {
        match self {
            PressureKind::Systolic => "Systolic Trend",
            PressureKind::Diastolic => "Diastolic Trend",
        }
    }
}

/// Critical-threshold and consistent-trend checks for systolic and diastolic
/// pressure. The two kinds keep separate trend windows.
pub struct BloodPressureRule {
    thresholds: RuleThresholds,
    trends: HashMap<(i32, PressureKind), WindowBuffer>,
}

impl BloodPressureRule {
    pub fn new(thresholds: &RuleThresholds) -> Self {
        Self {
            thresholds: thresholds.clone(),
            trends: HashMap::new(),
        }
    }

    fn is_critical(&self, kind: PressureKind, value: f64) -> bool {
        let (min, max) = match kind {
            PressureKind::Systolic => (self.thresholds.systolic_min, self.thresholds.systolic_max),
            PressureKind::Diastolic => (self.thresholds.diastolic_min, self.thresholds.diastolic_max),
        };
        value < min || value > max
    }

    /// Number of subjects with trend state.
    pub fn tracked_subjects(&self) -> usize {
        let mut subjects: Vec<i32> = self.trends.keys().map(|(subject, _)| *subject).collect();
        subjects.sort_unstable();
        subjects.dedup();
        subjects.len()
    }
}

impl ConditionRule for BloodPressureRule {
    fn name(&self) -> &'static str {
        "blood_pressure"
    }

    fn evaluate(&mut self, measurement: &Measurement) -> Vec<Alert> {
        let Some(kind) = PressureKind::of(&measurement.signal) else {
            return Vec::new();
        };

        let subject = measurement.subject_id.to_string();
        let value = measurement.value;
        let mut alerts = Vec::new();

        if self.is_critical(kind, value) {
            let message = format!("Critical {}: {}", measurement.signal, format_value(value));
            alerts.push(AlertFamily::BloodPressure.build(subject.as_str(), &message, measurement.timestamp));
        }

        let capacity = self.thresholds.trend_window;
        let window = self
            .trends
            .entry((measurement.subject_id, kind))
            .or_insert_with(|| WindowBuffer::new(capacity));
        window.push(value);

        if window.is_full() && window.is_consistent_trend(self.thresholds.trend_step) {
            let message = format!("{}: {:?}", kind.trend_label(), window.values());
            alerts.push(AlertFamily::BloodPressure.build(subject.as_str(), &message, measurement.timestamp));
        }

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
        self.trends.clear();
    }
}
