//! Client configuration and backend factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use studydesk_core::statistics::DEFAULT_PASS_THRESHOLD;
use studydesk_core::traits::StudyApi;

use crate::http::{HttpApi, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Environment variable that overrides `api.base_url`.
pub const API_URL_ENV: &str = "STUDYDESK_API_URL";

/// Where the backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Top-level studydesk configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudydeskConfig {
    #[serde(default)]
    pub api: ApiConfig,
    /// Debounce delay before an edited note is saved.
    #[serde(default = "default_autosave_delay")]
    pub autosave_delay_ms: u64,
    /// Minimum percentage for a quiz to count as passed.
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: u32,
    /// How many notes the dashboard lists.
    #[serde(default = "default_recent_notes")]
    pub recent_notes: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_autosave_delay() -> u64 {
    5000
}
fn default_pass_threshold() -> u32 {
    DEFAULT_PASS_THRESHOLD
}
fn default_recent_notes() -> usize {
    5
}

impl Default for StudydeskConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            autosave_delay_ms: default_autosave_delay(),
            pass_threshold: default_pass_threshold(),
            recent_notes: default_recent_notes(),
        }
    }
}

impl StudydeskConfig {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `studydesk.toml` in the current directory
/// 2. `~/.config/studydesk/config.toml`
///
/// `STUDYDESK_API_URL` overrides the configured base URL.
pub fn load_config_from(path: Option<&Path>) -> Result<StudydeskConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("studydesk.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StudydeskConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StudydeskConfig::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV) {
        if !url.trim().is_empty() {
            config.api.base_url = url;
        }
    }
    config.api.base_url = resolve_env_vars(&config.api.base_url);

    anyhow::ensure!(
        config.api.base_url.starts_with("http://") || config.api.base_url.starts_with("https://"),
        "api.base_url must be an http(s) URL, got {:?}",
        config.api.base_url
    );
    anyhow::ensure!(
        config.pass_threshold <= 100,
        "pass_threshold must be between 0 and 100"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("studydesk"))
}

/// Create the HTTP backend described by the configuration.
pub fn create_api(config: &StudydeskConfig) -> Result<Arc<dyn StudyApi>> {
    let api = HttpApi::new(&config.api.base_url, config.api.timeout_secs)?;
    Ok(Arc::new(api))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_STUDYDESK_TEST_HOST", "api.example.edu");
        assert_eq!(
            resolve_env_vars("https://${_STUDYDESK_TEST_HOST}/v1"),
            "https://api.example.edu/v1"
        );
        assert_eq!(resolve_env_vars("no vars"), "no vars");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_STUDYDESK_TEST_HOST");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_STUDYDESK_TEST_SELF", "${_STUDYDESK_TEST_SELF}");
        assert_eq!(
            resolve_env_vars("http://${_STUDYDESK_TEST_SELF}/${_STUDYDESK_TEST_MISSING}x"),
            "http://${_STUDYDESK_TEST_SELF}/x"
        );
        std::env::remove_var("_STUDYDESK_TEST_SELF");
    }

    #[test]
    fn default_config() {
        let config = StudydeskConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.autosave_delay(), Duration::from_secs(5));
        assert_eq!(config.pass_threshold, 70);
        assert_eq!(config.recent_notes, 5);
    }

    #[test]
    fn parse_partial_config() {
        let toml_str = r#"
pass_threshold = 80

[api]
base_url = "https://study.example.edu"
"#;
        let config: StudydeskConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://study.example.edu");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.pass_threshold, 80);
        assert_eq!(config.autosave_delay_ms, 5000);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/studydesk.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded_and_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studydesk.toml");

        std::fs::write(&path, "recent_notes = 3\n[api]\nbase_url = \"http://10.0.0.5:8000\"\n")
            .unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.recent_notes, 3);

        std::fs::write(&path, "[api]\nbase_url = \"ftp://nope\"\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());

        std::fs::write(&path, "pass_threshold = 150\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
