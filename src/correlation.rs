//! Checks the orchestrator runs on every record in addition to the
//! per-family rules: operator-asserted alerts and the low-pressure /
//! low-oxygen correlation.

use crate::alert::{Alert, AlertFamily, Annotation};
use crate::measurement::{Measurement, SignalType};

pub const MANUAL_ALERT: &str = "Manual Alert Triggered";
pub const HYPOTENSIVE_HYPOXEMIA: &str = "Hypotensive Hypoxemia (Sys < 90 & Oxy < 92)";

const SYSTOLIC_LIMIT: f64 = 90.0;
const OXYGEN_LIMIT: f64 = 92.0;

/// Fixed enrichment for orchestrator-level alerts: repeat count first, then
/// priority.
pub const ESCALATION: [Annotation; 2] = [Annotation::Repeated(2), Annotation::Priority];

/// Every `Alert`/`ManualAlert` record raises an alert regardless of its value.
pub fn manual_alert(measurement: &Measurement) -> Option<Alert> {
    if !measurement.signal.is_manual() {
        return None;
    }
    let alert = AlertFamily::Default.build(
        measurement.subject_id.to_string(),
        MANUAL_ALERT,
        measurement.timestamp,
    );
    Some(alert.annotate_all(&ESCALATION))
}

/// Oxygen readings of one session, in the session's sorted order.
#[derive(Debug, Clone, Default)]
pub struct OxygenTimeline {
    series: Vec<(i64, f64)>,
}

impl OxygenTimeline {
    /// `records` must already be sorted by timestamp.
    pub fn from_sorted(records: &[Measurement]) -> Self {
        let series = records
            .iter()
            .filter(|m| m.signal == SignalType::OxygenSaturation)
            .map(|m| (m.timestamp, m.value))
            .collect();
        Self { series }
    }

    /// Most recent reading at or before `at`. Among readings sharing a
    /// timestamp the last one in session order wins.
    pub fn latest_at_or_before(&self, at: i64) -> Option<f64> {
        let idx = self.series.partition_point(|(ts, _)| *ts <= at);
        idx.checked_sub(1).map(|i| self.series[i].1)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Fires on a systolic reading below 90 when the latest oxygen reading at or
/// before it is below 92. No oxygen reading at all counts as low.
pub fn hypotensive_hypoxemia(measurement: &Measurement, oxygen: &OxygenTimeline) -> Option<Alert> {
    if measurement.signal != SignalType::SystolicPressure || measurement.value >= SYSTOLIC_LIMIT {
        return None;
    }

    let latest = oxygen.latest_at_or_before(measurement.timestamp);
    if latest.is_some_and(|value| value >= OXYGEN_LIMIT) {
        return None;
    }

    let alert = AlertFamily::Default.build(
        measurement.subject_id.to_string(),
        HYPOTENSIVE_HYPOXEMIA,
        measurement.timestamp,
    );
    Some(alert.annotate_all(&ESCALATION))
}
