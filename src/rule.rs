use crate::alert::Alert;
use crate::config::RuleThresholds;
use crate::measurement::{Measurement, SignalType};
use crate::rules::{BloodPressureRule, CardiacRhythmRule, OxygenSaturationRule};

/// A stateful condition over one signal family.
///
/// `evaluate` is called once per measurement in timestamp order. Window state
/// is keyed by subject id inside the rule, so one instance can serve many
/// subjects as long as each subject has a single writer.
pub trait ConditionRule {
    fn name(&self) -> &'static str;
    fn evaluate(&mut self, measurement: &Measurement) -> Vec<Alert>;
    /// Drops all window state.
    fn reset(&mut self);
}

/// The rule instances an engine dispatches to.
pub struct RuleSet {
    pub pressure: BloodPressureRule,
    pub oxygen: OxygenSaturationRule,
    pub cardiac: CardiacRhythmRule,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::with_thresholds(&RuleThresholds::default())
    }

    pub fn with_thresholds(thresholds: &RuleThresholds) -> Self {
        Self {
            pressure: BloodPressureRule::new(thresholds),
            oxygen: OxygenSaturationRule::new(thresholds),
            cardiac: CardiacRhythmRule::new(thresholds),
        }
    }

    /// The stateful rule responsible for `signal`, if any.
    pub fn rule_for(&mut self, signal: &SignalType) -> Option<&mut dyn ConditionRule> {
        match signal {
            SignalType::SystolicPressure | SignalType::DiastolicPressure => Some(&mut self.pressure),
            SignalType::OxygenSaturation => Some(&mut self.oxygen),
            SignalType::Ecg => Some(&mut self.cardiac),
            SignalType::Alert | SignalType::ManualAlert | SignalType::Other(_) => None,
        }
    }

    pub fn reset(&mut self) {
        self.pressure.reset();
        self.oxygen.reset();
        self.cardiac.reset();
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}
