//! Alert values, the per-family builders that create them, and the
//! annotations that rewrite their condition text.

use serde::Serialize;

/// An emitted alert. Annotating returns a new value; nothing mutates in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    subject_id: String,
    condition: String,
    timestamp: i64,
}

impl Alert {
    pub fn new(subject_id: impl Into<String>, condition: impl Into<String>, timestamp: i64) -> Self {
        Self {
            subject_id: subject_id.into(),
            condition: condition.into(),
            timestamp,
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn annotate(self, annotation: Annotation) -> Alert {
        annotation.apply(self)
    }

    /// Applies `annotations` left to right, so `[Repeated(2), Priority]`
    /// yields `"[PRIORITY] <text> (Repeated 2x)"`.
    pub fn annotate_all(self, annotations: &[Annotation]) -> Alert {
        annotations
            .iter()
            .fold(self, |alert, annotation| annotation.apply(alert))
    }
}

/// Which builder produced an alert. Each family tags the condition text with a
/// fixed prefix; `Default` leaves it untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertFamily {
    Default,
    BloodPressure,
    BloodOxygen,
    Ecg,
}

impl AlertFamily {
    pub fn prefix(&self) -> &'static str {
        match self {
            AlertFamily::Default => "",
            AlertFamily::BloodPressure => "Blood Pressure Alert: ",
            AlertFamily::BloodOxygen => "Blood Oxygen Alert: ",
            AlertFamily::Ecg => "ECG Alert: ",
        }
    }

    pub fn build(&self, subject_id: impl Into<String>, message: &str, timestamp: i64) -> Alert {
        Alert::new(subject_id, format!("{}{}", self.prefix(), message), timestamp)
    }
}

/// A transform over an alert's condition text. Subject and timestamp pass
/// through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    Priority,
    Repeated(u32),
}

impl Annotation {
    pub fn apply(&self, alert: Alert) -> Alert {
        let condition = match self {
            Annotation::Priority => format!("[PRIORITY] {}", alert.condition),
            Annotation::Repeated(count) => format!("{} (Repeated {}x)", alert.condition, count),
        };
        Alert { condition, ..alert }
    }
}
