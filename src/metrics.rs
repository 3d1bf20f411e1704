use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// Latency histogram, bounds in seconds. Bucket counts are cumulative.
#[derive(Debug)]
pub struct Histogram {
    buckets: Vec<(f64, AtomicU64)>, // (upper_bound, observations <= bound)
    count: AtomicU64,
    sum_micros: AtomicU64,
}

impl Histogram {
    fn new() -> Self {
        let bounds = vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0];
        Self {
            buckets: bounds.into_iter().map(|b| (b, AtomicU64::new(0))).collect(),
            count: AtomicU64::new(0),
            sum_micros: AtomicU64::new(0),
        }
    }

    fn record(&self, value: f64) {
        for (bound, count) in &self.buckets {
            if value <= *bound {
                count.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_micros
            .fetch_add((value.max(0.0) * 1_000_000.0).round() as u64, Ordering::Relaxed);
    }

    fn to_prometheus(&self, name: &str) -> String {
        let mut output = format!("# HELP {} Duration histogram.\n", name);
        output.push_str(&format!("# TYPE {} histogram\n", name));
        for (bound, count) in &self.buckets {
            output.push_str(&format!(
                "{}_bucket{{le=\"{}\"}} {}\n",
                name,
                bound,
                count.load(Ordering::Relaxed)
            ));
        }
        let total = self.count.load(Ordering::Relaxed);
        output.push_str(&format!("{}_bucket{{le=\"+Inf\"}} {}\n", name, total));
        output.push_str(&format!(
            "{}_sum {}\n",
            name,
            self.sum_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
        ));
        output.push_str(&format!("{}_count {}\n", name, total));
        output
    }
}

pub struct SystemMetrics {
    pub sessions_total: AtomicU64,
    pub records_scanned: AtomicU64,
    pub alerts_total: AtomicU64,
    pub records_skipped: AtomicU64,
    pub alerts_by_source: Mutex<HashMap<String, u64>>,
    pub session_duration: Histogram,
}

impl SystemMetrics {
    pub fn new() -> Self {
        Self {
            sessions_total: AtomicU64::new(0),
            records_scanned: AtomicU64::new(0),
            alerts_total: AtomicU64::new(0),
            records_skipped: AtomicU64::new(0),
            alerts_by_source: Mutex::new(HashMap::new()),
            session_duration: Histogram::new(),
        }
    }

    pub fn record_session(&self, records: usize, duration_secs: f64) {
        self.sessions_total.fetch_add(1, Ordering::Relaxed);
        self.records_scanned
            .fetch_add(records as u64, Ordering::Relaxed);
        self.session_duration.record(duration_secs);
    }

    pub fn record_alerts(&self, source: &str, count: usize) {
        if count == 0 {
            return;
        }
        self.alerts_total.fetch_add(count as u64, Ordering::Relaxed);
        if let Ok(mut map) = self.alerts_by_source.lock() {
            *map.entry(source.to_string()).or_insert(0) += count as u64;
        }
    }

    pub fn record_skipped(&self, count: usize) {
        self.records_skipped
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let alerts_by_source = self
            .alerts_by_source
            .lock()
            .map(|map| map.clone())
            .unwrap_or_default();

        MetricsSnapshot {
            sessions_total: self.sessions_total.load(Ordering::Relaxed),
            records_scanned: self.records_scanned.load(Ordering::Relaxed),
            alerts_total: self.alerts_total.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            alerts_by_source,
        }
    }

    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = format!(
            "# HELP vitalrule_sessions_total Total number of subject evaluation sessions.\n\
             # TYPE vitalrule_sessions_total counter\n\
             vitalrule_sessions_total {}\n\
             # HELP vitalrule_records_scanned_total Total number of records fed to rules.\n\
             # TYPE vitalrule_records_scanned_total counter\n\
             vitalrule_records_scanned_total {}\n\
             # HELP vitalrule_alerts_total Total number of alerts emitted.\n\
             # TYPE vitalrule_alerts_total counter\n\
             vitalrule_alerts_total {}\n\
             # HELP vitalrule_records_skipped_total Total number of malformed input lines skipped.\n\
             # TYPE vitalrule_records_skipped_total counter\n\
             vitalrule_records_skipped_total {}\n",
            snapshot.sessions_total,
            snapshot.records_scanned,
            snapshot.alerts_total,
            snapshot.records_skipped
        );

        output.push_str("# HELP vitalrule_alerts_by_source_total Alerts emitted per rule or check.\n");
        output.push_str("# TYPE vitalrule_alerts_by_source_total counter\n");
        let mut sources: Vec<_> = snapshot.alerts_by_source.iter().collect();
        sources.sort();
        for (source, count) in sources {
            output.push_str(&format!(
                "vitalrule_alerts_by_source_total{{source=\"{}\"}} {}\n",
                source, count
            ));
        }

        output.push_str(&self.session_duration.to_prometheus("vitalrule_session_duration_seconds"));
        output
    }
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct MetricsSnapshot {
    pub sessions_total: u64,
    pub records_scanned: u64,
    pub alerts_total: u64,
    pub records_skipped: u64,
    pub alerts_by_source: HashMap<String, u64>,
}

lazy_static::lazy_static! {
    pub static ref METRICS: SystemMetrics = SystemMetrics::new();
}
