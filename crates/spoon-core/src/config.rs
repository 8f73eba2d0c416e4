use crate::error::{Result, SpoonError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// RunnerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,
    /// Answer every prompt with no, as `--no-input` does.
    #[serde(default)]
    pub assume_no: bool,
}

fn default_step_delay_ms() -> u64 {
    500
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: default_step_delay_ms(),
            assume_no: false,
        }
    }
}

impl RunnerConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// RelayConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Overrides the provider's chat-completions URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_endpoint: Option<String>,
    /// Token budget for command translation replies.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Token budget for conversational replies.
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_github_api")]
    pub github_api: String,
    /// Upper bound on how long the CLI waits for background syncs at exit.
    #[serde(default = "default_sync_grace_ms")]
    pub sync_grace_ms: u64,
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,
}

fn default_max_tokens() -> u32 {
    150
}

fn default_chat_max_tokens() -> u32 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_sync_grace_ms() -> u64 {
    2000
}

fn default_auto_sync() -> bool {
    true
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            chat_endpoint: None,
            max_tokens: default_max_tokens(),
            chat_max_tokens: default_chat_max_tokens(),
            timeout_secs: default_timeout_secs(),
            github_api: default_github_api(),
            sync_grace_ms: default_sync_grace_ms(),
            auto_sync: default_auto_sync(),
        }
    }
}

impl RelayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sync_grace(&self) -> Duration {
        Duration::from_millis(self.sync_grace_ms)
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_state_file")]
    pub state_file: String,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    /// File the config was read from; `None` for built-in defaults.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

fn default_state_file() -> String {
    paths::STATE_FILE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            runner: RunnerConfig::default(),
            relay: RelayConfig::default(),
            source: None,
        }
    }
}

impl Config {
    /// First config file that exists: `explicit`, then `<root>/spoon.yaml`,
    /// then the per-user file.
    pub fn locate(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(p) = explicit {
            if !p.exists() {
                return Err(SpoonError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            return Ok(Some(p.to_path_buf()));
        }
        let local = paths::config_path(root);
        if local.exists() {
            return Ok(Some(local));
        }
        match paths::global_config_path() {
            Ok(global) if global.exists() => Ok(Some(global)),
            _ => Ok(None),
        }
    }

    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::locate(root, explicit)? else {
            return Ok(Self::default());
        };
        let mut cfg = Self::from_file(&path)?;
        cfg.source = Some(path);
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if self.state_file.trim().is_empty() {
            error("state_file must not be empty".to_string());
        }
        if self.relay.max_tokens == 0 {
            error("relay.max_tokens must be greater than 0".to_string());
        }
        if self.relay.chat_max_tokens == 0 {
            error("relay.chat_max_tokens must be greater than 0".to_string());
        }
        if self.relay.timeout_secs == 0 {
            error("relay.timeout_secs must be greater than 0".to_string());
        }
        if !is_http_url(&self.relay.github_api) {
            error(format!(
                "relay.github_api '{}' is not an http(s) URL",
                self.relay.github_api
            ));
        }
        if let Some(endpoint) = &self.relay.chat_endpoint {
            if !is_http_url(endpoint) {
                error(format!(
                    "relay.chat_endpoint '{endpoint}' is not an http(s) URL"
                ));
            }
        }

        if self.runner.step_delay_ms > 10_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "runner.step_delay_ms={} (>10s between steps is unusual)",
                    self.runner.step_delay_ms
                ),
            });
        }
        if self.relay.sync_grace_ms > 30_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "relay.sync_grace_ms={} delays every exit while a sync is pending",
                    self.relay.sync_grace_ms
                ),
            });
        }
        if let Some(endpoint) = &self.relay.chat_endpoint {
            if endpoint.starts_with("http://") && !is_loopback(endpoint) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "relay.chat_endpoint '{endpoint}' sends the API key unencrypted"
                    ),
                });
            }
        }

        warnings
    }

    pub fn has_errors(warnings: &[ConfigWarning]) -> bool {
        warnings.iter().any(|w| w.level == WarnLevel::Error)
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("https://") || s.starts_with("http://")
}

fn is_loopback(url: &str) -> bool {
    let host = url
        .trim_start_matches("http://")
        .split(['/', ':'])
        .next()
        .unwrap_or("");
    matches!(host, "localhost" | "127.0.0.1")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.state_file, ".spoon-state.json");
        assert_eq!(cfg.runner.step_delay(), Duration::from_millis(500));
        assert_eq!(cfg.relay.max_tokens, 150);
        assert_eq!(cfg.relay.chat_max_tokens, 500);
        assert!(cfg.relay.auto_sync);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_yaml_backfills_defaults() {
        let cfg: Config = serde_yaml::from_str("runner:\n  assume_no: true\n").unwrap();
        assert!(cfg.runner.assume_no);
        assert_eq!(cfg.runner.step_delay_ms, 500);
        assert_eq!(cfg.relay.github_api, "https://api.github.com");
    }

    #[test]
    fn local_file_is_found() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("spoon.yaml"),
            "state_file: custom.json\nrunner:\n  step_delay_ms: 0\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path(), None).unwrap();
        assert_eq!(cfg.state_file, "custom.json");
        assert_eq!(cfg.runner.step_delay_ms, 0);
        assert_eq!(cfg.source, Some(dir.path().join("spoon.yaml")));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(Config::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn empty_file_is_defaults() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("spoon.yaml");
        std::fs::write(&p, "\n").unwrap();
        let cfg = Config::load(dir.path(), Some(&p)).unwrap();
        assert_eq!(cfg.relay, RelayConfig::default());
    }

    #[test]
    fn validate_reports_errors_and_warnings() {
        let mut cfg = Config::default();
        cfg.relay.max_tokens = 0;
        cfg.relay.github_api = "api.github.com".to_string();
        cfg.runner.step_delay_ms = 60_000;
        let warnings = cfg.validate();
        assert!(Config::has_errors(&warnings));
        assert_eq!(
            warnings
                .iter()
                .filter(|w| w.level == WarnLevel::Error)
                .count(),
            2
        );
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("step_delay_ms")));
    }

    #[test]
    fn plain_http_endpoint_warns_unless_local() {
        let mut cfg = Config::default();
        cfg.relay.chat_endpoint = Some("http://example.com/v1/chat/completions".into());
        assert_eq!(cfg.validate().len(), 1);
        cfg.relay.chat_endpoint = Some("http://localhost:8080/v1/chat/completions".into());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn yaml_roundtrip() {
        let cfg = Config::default();
        let yaml = cfg.to_yaml().unwrap();
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, cfg);
    }
}
