use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::monitor::FAILURE_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_ping_targets")]
    pub ping_targets: Vec<String>,
    #[serde(default = "default_dns_test_domains")]
    pub dns_test_domains: Vec<String>,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_ping_targets() -> Vec<String> {
    vec![
        "8.8.8.8".to_string(),
        "1.1.1.1".to_string(),
        "208.67.222.222".to_string(),
    ]
}

fn default_dns_test_domains() -> Vec<String> {
    vec![
        "google.com".to_string(),
        "cloudflare.com".to_string(),
        "amazon.com".to_string(),
    ]
}

fn default_check_interval_secs() -> u64 {
    2
}

fn default_probe_timeout_secs() -> u64 {
    3
}

fn default_failure_threshold() -> u32 {
    FAILURE_THRESHOLD
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("network_logs")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ping_targets: default_ping_targets(),
            dns_test_domains: default_dns_test_domains(),
            check_interval_secs: default_check_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            failure_threshold: default_failure_threshold(),
            log_dir: default_log_dir(),
        }
    }
}

impl AppConfig {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("UptimeMonitor");

        fs::create_dir_all(&config_dir)?;
        Ok(config_dir.join("config.json"))
    }

    /// Loads the config file, falling back to defaults if it is missing or
    /// unreadable. A broken config never stops the monitor from starting.
    pub fn load() -> Self {
        match Self::get_config_path() {
            Ok(path) if path.exists() => match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        log::warn!("Failed to parse config, using defaults: {e}");
                        AppConfig::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read config file, using defaults: {e}");
                    AppConfig::default()
                }
            },
            Ok(_) => AppConfig::default(),
            Err(e) => {
                log::warn!("Failed to get config path, using defaults: {e}");
                AppConfig::default()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = AppConfig::default();
        assert_eq!(config.ping_targets.len(), 3);
        assert_eq!(config.ping_targets[0], "8.8.8.8");
        assert_eq!(config.check_interval_secs, 2);
        assert_eq!(config.probe_timeout_secs, 3);
        assert_eq!(config.failure_threshold, 3);
        assert_eq!(config.log_dir, PathBuf::from("network_logs"));
    }

    #[test]
    fn partial_config_fills_in_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"ping_targets": ["192.168.1.1"]}"#).unwrap();
        assert_eq!(config.ping_targets, vec!["192.168.1.1".to_string()]);
        assert_eq!(config.dns_test_domains.len(), 3);
        assert_eq!(config.failure_threshold, 3);
    }
}
