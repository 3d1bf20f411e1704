use std::collections::{BTreeMap, VecDeque};

/// Most-recent-N values, oldest first.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    capacity: usize,
    values: VecDeque<f64>,
}

impl WindowBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        self.prune();
    }

    fn prune(&mut self) {
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the buffered values; an empty buffer averages to 0.
    pub fn average(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    pub fn values(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// True when every consecutive step rises by more than `min_step`, or every
    /// step falls by more than `min_step`. Needs at least two values.
    pub fn is_consistent_trend(&self, min_step: f64) -> bool {
        if self.values.len() < 2 {
            return false;
        }
        let steps: Vec<f64> = self
            .values
            .iter()
            .zip(self.values.iter().skip(1))
            .map(|(prev, next)| next - prev)
            .collect();

        steps.iter().all(|step| *step > min_step) || steps.iter().all(|step| -*step > min_step)
    }
}

/// Samples keyed by timestamp. A later sample at the same timestamp replaces
/// the earlier one.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    span_ms: i64,
    samples: BTreeMap<i64, f64>,
}

impl TimeWindow {
    pub fn new(span_ms: i64) -> Self {
        Self {
            span_ms,
            samples: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, timestamp: i64, value: f64) {
        self.samples.insert(timestamp, value);
    }

    /// Oldest sample with timestamp in `[at - span, at)`.
    pub fn earliest_before(&self, at: i64) -> Option<(i64, f64)> {
        let start = at.saturating_sub(self.span_ms);
        self.samples
            .range(start..at)
            .next()
            .map(|(ts, value)| (*ts, *value))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_evicts_oldest() {
        let mut window = WindowBuffer::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            window.push(v);
        }
        assert_eq!(window.values(), vec![2.0, 3.0, 4.0]);
        assert!(window.is_full());
    }

    #[test]
    fn test_empty_average_is_zero() {
        let window = WindowBuffer::new(5);
        assert_eq!(window.average(), 0.0);
    }

    #[test]
    fn test_trend_requires_strict_step() {
        let mut window = WindowBuffer::new(3);
        for v in [100.0, 110.0, 121.0] {
            window.push(v);
        }
        // first step is exactly 10, not more
        assert!(!window.is_consistent_trend(10.0));

        let mut falling = WindowBuffer::new(3);
        for v in [150.0, 135.0, 120.0] {
            falling.push(v);
        }
        assert!(falling.is_consistent_trend(10.0));
    }

    #[test]
    fn test_mixed_direction_is_not_a_trend() {
        let mut window = WindowBuffer::new(3);
        for v in [100.0, 120.0, 100.0] {
            window.push(v);
        }
        assert!(!window.is_consistent_trend(10.0));
    }

    #[test]
    fn test_time_window_bounds() {
        let mut window = TimeWindow::new(600_000);
        window.insert(0, 97.0);
        window.insert(100_000, 96.0);

        // start bound is inclusive
        assert_eq!(window.earliest_before(600_000), Some((0, 97.0)));
        // outside the span
        assert_eq!(window.earliest_before(600_001), Some((100_000, 96.0)));
        // the probe timestamp itself is excluded
        assert_eq!(window.earliest_before(0), None);
    }

    #[test]
    fn test_time_window_replaces_same_timestamp() {
        let mut window = TimeWindow::new(1_000);
        window.insert(10, 90.0);
        window.insert(10, 95.0);
        assert_eq!(window.len(), 1);
        assert_eq!(window.earliest_before(11), Some((10, 95.0)));
    }
}
