use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a measurement.
///
/// Labels the engine has a rule for get their own variant; anything else is
/// carried verbatim in [`SignalType::Other`] so it can be stored and queried
/// but never matches a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignalType {
    SystolicPressure,
    DiastolicPressure,
    OxygenSaturation,
    Ecg,
    Alert,
    ManualAlert,
    Other(String),
}

impl SignalType {
    pub fn as_str(&self) -> &str {
        match self {
            SignalType::SystolicPressure => "SystolicPressure",
            SignalType::DiastolicPressure => "DiastolicPressure",
            SignalType::OxygenSaturation => "OxygenSaturation",
            SignalType::Ecg => "ECG",
            SignalType::Alert => "Alert",
            SignalType::ManualAlert => "ManualAlert",
            SignalType::Other(label) => label,
        }
    }

    /// Operator-asserted events carry no meaningful value.
    pub fn is_manual(&self) -> bool {
        matches!(self, SignalType::Alert | SignalType::ManualAlert)
    }
}

impl From<&str> for SignalType {
    fn from(label: &str) -> Self {
        match label {
            "SystolicPressure" => SignalType::SystolicPressure,
            "DiastolicPressure" => SignalType::DiastolicPressure,
            "OxygenSaturation" => SignalType::OxygenSaturation,
            "ECG" => SignalType::Ecg,
            "Alert" => SignalType::Alert,
            "ManualAlert" => SignalType::ManualAlert,
            other => SignalType::Other(other.to_string()),
        }
    }
}

impl From<String> for SignalType {
    fn from(label: String) -> Self {
        SignalType::from(label.as_str())
    }
}

impl From<SignalType> for String {
    fn from(signal: SignalType) -> Self {
        signal.as_str().to_string()
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reading for one subject. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub subject_id: i32,
    pub value: f64,
    pub signal: SignalType,
    pub timestamp: i64,
}

impl Measurement {
    pub fn new(subject_id: i32, value: f64, signal: impl Into<SignalType>, timestamp: i64) -> Self {
        Self {
            subject_id,
            value,
            signal: signal.into(),
            timestamp,
        }
    }
}

/// Renders a reading the way alert text shows it: always with a fractional
/// part (`88.0`, `97.5`). Magnitudes up to 1e16 stay in plain decimal
/// (`10000000.0`), so very large or tiny readings do not use the `1.0E7`
/// style exponent form.
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}
