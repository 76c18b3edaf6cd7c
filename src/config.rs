// src/config.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::pipeline::{RolloutWindow, TimestampPolicy};

pub const ENV_CONFIG_PATH: &str = "DASHBOARD_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard.toml";

fn default_poll_interval_secs() -> u64 {
    6
}
fn default_feed_size() -> usize {
    crate::pipeline::ALL_ROWS
}
fn default_true() -> bool {
    true
}
fn default_rollout_start() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-11-01T00:00:00Z")
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default()
}
fn default_rollout_end() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-12-15T23:59:59Z")
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_default()
}
fn default_fresh_threshold_hours() -> i64 {
    48
}
/// Upper bound on the fresh threshold: one year.
const MAX_FRESH_THRESHOLD_HOURS: i64 = 24 * 365;
fn default_metrics_endpoint() -> String {
    "http://127.0.0.1:8000/metrics".to_string()
}
fn default_feed_endpoint() -> String {
    "http://127.0.0.1:8000/feed".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Number of items the mock feed expands its catalog to.
    #[serde(default = "default_feed_size")]
    pub feed_size: usize,
    /// Serve this pre-recorded feed (JSON) instead of the mock one.
    #[serde(default)]
    pub feed_fixture: Option<PathBuf>,
    #[serde(default = "default_true")]
    pub normalize_timestamps: bool,
    #[serde(default = "default_rollout_start")]
    pub rollout_start: DateTime<Utc>,
    #[serde(default = "default_rollout_end")]
    pub rollout_end: DateTime<Utc>,
    #[serde(default = "default_fresh_threshold_hours")]
    pub fresh_threshold_hours: i64,
    /// Remote endpoints polled by the `leaderboard` client.
    #[serde(default = "default_metrics_endpoint")]
    pub metrics_endpoint: String,
    #[serde(default = "default_feed_endpoint")]
    pub feed_endpoint: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            feed_size: default_feed_size(),
            feed_fixture: None,
            normalize_timestamps: true,
            rollout_start: default_rollout_start(),
            rollout_end: default_rollout_end(),
            fresh_threshold_hours: default_fresh_threshold_hours(),
            metrics_endpoint: default_metrics_endpoint(),
            feed_endpoint: default_feed_endpoint(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: DashboardConfig = toml::from_str(s).context("parsing dashboard config")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading dashboard config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $DASHBOARD_CONFIG_PATH (must exist)
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
                }
                Self::load_from(&pb)?
            }
            Err(_) => {
                let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
                if pb.exists() {
                    Self::load_from(&pb)?
                } else {
                    Self::default()
                }
            }
        };
        Ok(base.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<u64>("POLL_INTERVAL_SECS") {
            self.poll_interval_secs = v;
        }
        if let Ok(v) = std::env::var("METRICS_ENDPOINT") {
            self.metrics_endpoint = v;
        }
        if let Ok(v) = std::env::var("FEED_ENDPOINT") {
            self.feed_endpoint = v;
        }
        if let Ok(v) = std::env::var("FEED_FIXTURE") {
            self.feed_fixture = Some(PathBuf::from(v));
        }
        if let Ok(v) = std::env::var("NORMALIZE_TIMESTAMPS") {
            self.normalize_timestamps = matches!(v.trim(), "1" | "true" | "yes" | "on");
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        if self.poll_interval_secs == 0 {
            self.poll_interval_secs = default_poll_interval_secs();
        }
        if self.fresh_threshold_hours < 0 {
            self.fresh_threshold_hours = default_fresh_threshold_hours();
        }
        self.fresh_threshold_hours = self.fresh_threshold_hours.min(MAX_FRESH_THRESHOLD_HOURS);
        if self.rollout_start > self.rollout_end {
            std::mem::swap(&mut self.rollout_start, &mut self.rollout_end);
        }
        self
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    /// `None` when display-timestamp normalization is switched off.
    pub fn timestamp_policy(&self) -> Option<TimestampPolicy> {
        self.normalize_timestamps.then(|| TimestampPolicy {
            window: RolloutWindow::new(self.rollout_start, self.rollout_end),
            fresh_threshold: Duration::hours(self.fresh_threshold_hours),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = DashboardConfig::from_toml_str("poll_interval_secs = 10").unwrap();
        assert_eq!(cfg.poll_interval_secs, 10);
        assert_eq!(cfg.feed_size, 50);
        assert!(cfg.normalize_timestamps);
        assert_eq!(cfg.fresh_threshold_hours, 48);
    }

    #[test]
    fn reversed_window_and_zero_interval_are_sanitized() {
        let cfg = DashboardConfig::from_toml_str(
            r#"
            poll_interval_secs = 0
            rollout_start = "2025-12-31T00:00:00Z"
            rollout_end = "2025-11-01T00:00:00Z"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.poll_interval_secs, 6);
        assert!(cfg.rollout_start < cfg.rollout_end);
    }

    #[test]
    fn oversized_fresh_threshold_is_capped() {
        let cfg =
            DashboardConfig::from_toml_str("fresh_threshold_hours = 9223372036854775807").unwrap();
        assert_eq!(cfg.fresh_threshold_hours, 24 * 365);
        let p = cfg.timestamp_policy().unwrap();
        assert_eq!(p.fresh_threshold, Duration::hours(24 * 365));

        let neg = DashboardConfig::from_toml_str("fresh_threshold_hours = -5").unwrap();
        assert_eq!(neg.fresh_threshold_hours, 48);
    }

    #[test]
    fn policy_is_absent_when_disabled() {
        let cfg = DashboardConfig {
            normalize_timestamps: false,
            ..Default::default()
        };
        assert!(cfg.timestamp_policy().is_none());
        let on = DashboardConfig::default().timestamp_policy().unwrap();
        assert_eq!(on.fresh_threshold, Duration::hours(48));
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_path_then_overrides() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var("POLL_INTERVAL_SECS");

        // No file in temp CWD -> defaults
        let d = DashboardConfig::load_default().unwrap();
        assert_eq!(d, DashboardConfig::default());

        let p = tmp.path().join("custom.toml");
        fs::write(&p, "feed_size = 12\npoll_interval_secs = 30").unwrap();
        env::set_var(ENV_CONFIG_PATH, p.display().to_string());
        env::set_var("POLL_INTERVAL_SECS", "3");
        let c = DashboardConfig::load_default().unwrap();
        assert_eq!(c.feed_size, 12);
        assert_eq!(c.poll_interval_secs, 3);

        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(DashboardConfig::load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var("POLL_INTERVAL_SECS");
        env::set_current_dir(&old).unwrap();
    }
}
