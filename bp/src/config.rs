//! bakenplanner configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Strategy;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Where race datasets live
    pub catalog: CatalogConfig,

    /// Planning defaults
    pub planning: PlanningConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Validate configuration before talking to the LLM
    ///
    /// Checks that the API key environment variable is set.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    ///
    /// 1. explicit `--config` path
    /// 2. `./.bakenplanner.yml`
    /// 3. `~/.config/bakenplanner/bakenplanner.yml`
    /// 4. defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialised
    ///
    /// Errors are ignored here; the full load reports them later.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_paths(),
        };
        paths
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".bakenplanner.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("bakenplanner").join("bakenplanner.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 120_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn get_api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(eyre::eyre!(
                "LLM API key not found. Set the {} environment variable.",
                self.api_key_env
            )),
        }
    }
}

/// Race dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory scanned for `{year}_{race}.csv` files
    #[serde(rename = "data-dir")]
    pub data_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

/// Planning defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Temperature for the bet proposal call (variety)
    #[serde(rename = "bet-temperature")]
    pub bet_temperature: f32,

    /// Temperature for the allocation call (consistency)
    #[serde(rename = "allocation-temperature")]
    pub allocation_temperature: f32,

    /// Strategy preselected when a session starts
    #[serde(rename = "default-strategy")]
    pub default_strategy: Strategy,

    /// Budget suggested by the REPL, in yen
    #[serde(rename = "default-budget")]
    pub default_budget: i64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            bet_temperature: 0.7,
            allocation_temperature: 0.5,
            default_strategy: Strategy::Balanced,
            default_budget: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.catalog.data_dir, PathBuf::from("data"));
        assert!((config.planning.bet_temperature - 0.7).abs() < f32::EPSILON);
        assert!((config.planning.allocation_temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.planning.default_strategy, Strategy::Balanced);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

llm:
  provider: openai
  model: gpt-4o-mini
  api-key-env: MY_API_KEY
  base-url: http://localhost:8080
  max-tokens: 2048
  timeout-ms: 60000

catalog:
  data-dir: /srv/races

planning:
  bet-temperature: 0.9
  allocation-temperature: 0.2
  default-strategy: high-payout
  default-budget: 3000
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.api_key_env, "MY_API_KEY");
        assert_eq!(config.llm.max_tokens, 2048);
        assert_eq!(config.catalog.data_dir, PathBuf::from("/srv/races"));
        assert_eq!(config.planning.default_strategy, Strategy::HighPayout);
        assert_eq!(config.planning.default_budget, 3000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
llm:
  model: gpt-4.1
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.planning.default_budget, 1000);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("bp.yml");
        fs::write(&path, "log-level: warn\ncatalog:\n  data-dir: races\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.catalog.data_dir, PathBuf::from("races"));
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/definitely/not/here/bp.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: "BAKENPLANNER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let err = config.get_api_key().unwrap_err();
        assert!(err.to_string().contains("BAKENPLANNER_TEST_UNSET_KEY"));
    }
}
