use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct VitalRuleConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub thresholds: RuleThresholds,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Directory scanned for `*.txt` record files when the CLI gets no `--data`
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Limits used by the condition rules. Defaults are the clinical thresholds
/// the engine ships with.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuleThresholds {
    #[serde(default = "default_systolic_min")]
    pub systolic_min: f64,
    #[serde(default = "default_systolic_max")]
    pub systolic_max: f64,
    #[serde(default = "default_diastolic_min")]
    pub diastolic_min: f64,
    #[serde(default = "default_diastolic_max")]
    pub diastolic_max: f64,
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
    #[serde(default = "default_trend_step")]
    pub trend_step: f64,
    #[serde(default = "default_oxygen_low")]
    pub oxygen_low: f64,
    #[serde(default = "default_oxygen_drop")]
    pub oxygen_drop: f64,
    #[serde(default = "default_oxygen_drop_window_ms")]
    pub oxygen_drop_window_ms: i64,
    #[serde(default = "default_ecg_window")]
    pub ecg_window: usize,
    #[serde(default = "default_ecg_spike_factor")]
    pub ecg_spike_factor: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            systolic_min: default_systolic_min(),
            systolic_max: default_systolic_max(),
            diastolic_min: default_diastolic_min(),
            diastolic_max: default_diastolic_max(),
            trend_window: default_trend_window(),
            trend_step: default_trend_step(),
            oxygen_low: default_oxygen_low(),
            oxygen_drop: default_oxygen_drop(),
            oxygen_drop_window_ms: default_oxygen_drop_window_ms(),
            ecg_window: default_ecg_window(),
            ecg_spike_factor: default_ecg_spike_factor(),
        }
    }
}

fn default_systolic_min() -> f64 {
    90.0
}

fn default_systolic_max() -> f64 {
    180.0
}

fn default_diastolic_min() -> f64 {
    60.0
}

fn default_diastolic_max() -> f64 {
    120.0
}

fn default_trend_window() -> usize {
    3
}

fn default_trend_step() -> f64 {
    10.0
}

fn default_oxygen_low() -> f64 {
    92.0
}

fn default_oxygen_drop() -> f64 {
    5.0
}

fn default_oxygen_drop_window_ms() -> i64 {
    600_000 // 10 minutes
}

fn default_ecg_window() -> usize {
    5
}

fn default_ecg_spike_factor() -> f64 {
    1.5
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// "json" or "pretty"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl VitalRuleConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .build()
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: VitalRuleConfig = settings
            .try_deserialize()
            .context("Failed to parse config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "thresholds:\n  oxygen_low: 90.0\nlogging:\n  level: debug"
        )
        .unwrap();

        let config = VitalRuleConfig::from_file(file.path()).unwrap();
        assert_eq!(config.thresholds.oxygen_low, 90.0);
        assert_eq!(config.thresholds.systolic_min, 90.0);
        assert_eq!(config.thresholds.trend_window, 3);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.engine.data_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(VitalRuleConfig::from_file("does/not/exist.yaml").is_err());
    }
}
