use crate::measurement::{Measurement, SignalType};
use std::collections::BTreeMap;

/// Read side of a measurement store as seen by the alert engine.
pub trait RecordStore {
    /// Records of `subject_id` with `start <= timestamp <= end`, in insertion
    /// order. Unknown subjects yield an empty list.
    fn get_records(&self, subject_id: i32, start: i64, end: i64) -> Vec<Measurement>;

    /// Every subject with at least one record, ascending.
    fn subjects(&self) -> Vec<i32>;
}

/// In-memory store indexed by subject id. Constructed explicitly and passed
/// by reference; dropping it releases everything.
#[derive(Debug, Default)]
pub struct MemoryStore {
    histories: BTreeMap<i32, Vec<Measurement>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, measurement: Measurement) {
        self.histories
            .entry(measurement.subject_id)
            .or_default()
            .push(measurement);
    }

    pub fn add_measurement(
        &mut self,
        subject_id: i32,
        value: f64,
        signal: impl Into<SignalType>,
        timestamp: i64,
    ) {
        self.add(Measurement::new(subject_id, value, signal, timestamp));
    }

    /// Clears every subject.
    pub fn reset(&mut self) {
        self.histories.clear();
    }

    pub fn subject_count(&self) -> usize {
        self.histories.len()
    }

    pub fn record_count(&self) -> usize {
        self.histories.values().map(Vec::len).sum()
    }
}

impl RecordStore for MemoryStore {
    fn get_records(&self, subject_id: i32, start: i64, end: i64) -> Vec<Measurement> {
        self.histories
            .get(&subject_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|m| m.timestamp >= start && m.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn subjects(&self) -> Vec<i32> {
        self.histories.keys().copied().collect()
    }
}
