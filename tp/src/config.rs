//! TaskPlan configuration types and loading

use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main TaskPlan configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Planner settings
    pub planner: PlannerConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Checks that an API key is reachable. Call this early in startup to
    /// fail fast with a clear error message.
    pub fn validate(&self) -> Result<()> {
        self.llm.get_api_key().map(|_| ())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .taskplan.yml
        let local_config = PathBuf::from(".taskplan.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/taskplan/taskplan.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates = match config_path {
            Some(path) => vec![path.clone()],
            None => {
                let mut paths = vec![PathBuf::from(".taskplan.yml")];
                paths.extend(Self::user_config_path());
                paths
            }
        };

        candidates
            .into_iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Config>(&content).ok())
            .and_then(|config| config.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskplan").join("taskplan.yml"))
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
    /// Provider name ("openai" or "anthropic")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// File containing the API key, used when the env var is unset
    #[serde(rename = "api-key-file")]
    pub api_key_file: Option<PathBuf>,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries for transient (network, 408, 5xx) failures
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key_file: None,
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 1024,
            timeout_ms: 60_000,
            max_retries: 2,
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key: environment variable first, then key file
    pub fn get_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var(&self.api_key_env)
            && !key.trim().is_empty()
        {
            return Ok(key.trim().to_string());
        }

        if let Some(path) = &self.api_key_file {
            let expanded = expand_home(path);
            let key = fs::read_to_string(&expanded)
                .context(format!("Failed to read API key file {}", expanded.display()))?;
            let key = key.trim();
            if !key.is_empty() {
                return Ok(key.to_string());
            }
            return Err(eyre!("API key file {} is empty", expanded.display()));
        }

        Err(eyre!(
            "LLM API key not found. Set the {} environment variable.",
            self.api_key_env
        ))
    }
}

/// Planner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Max tokens requested for the plan response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Root searched for `.taskplan/prompts/` and `prompts/` template overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: PathBuf,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            prompts_dir: PathBuf::from("."),
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.planner.max_tokens, 1024);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_llm_config_defaults() {
        let config = LlmConfig::default();

        assert_eq!(config.provider, "openai");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.base_url, "https://api.openai.com");
        assert_eq!(config.max_retries, 2);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug
llm:
  provider: anthropic
  model: claude-sonnet-4-20250514
  api-key-env: ANTHROPIC_API_KEY
  base-url: https://api.anthropic.com
  temperature: 0.2
planner:
  max-tokens: 512
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.llm.temperature, Some(0.2));
        // Unspecified fields keep their defaults
        assert_eq!(config.llm.timeout_ms, 60_000);
        assert_eq!(config.planner.max_tokens, 512);
        assert_eq!(config.planner.prompts_dir, PathBuf::from("."));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "llm:\n  model: gpt-4o").unwrap();

        let config = Config::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.provider, "openai");
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let result = Config::load(Some(&PathBuf::from("/nonexistent/taskplan.yml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_log_level_explicit() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log-level: WARN").unwrap();

        let level = Config::load_log_level(Some(&file.path().to_path_buf()));
        assert_eq!(level.as_deref(), Some("WARN"));
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "TASKPLAN_CONFIG_TEST_KEY".to_string(),
            ..Default::default()
        };
        // SAFETY: serialized with the other env-mutating tests
        unsafe { std::env::set_var("TASKPLAN_CONFIG_TEST_KEY", "  sk-env  ") };
        assert_eq!(config.get_api_key().unwrap(), "sk-env");
        assert!(Config { llm: config, ..Default::default() }.validate().is_ok());
        unsafe { std::env::remove_var("TASKPLAN_CONFIG_TEST_KEY") };
    }

    #[test]
    #[serial]
    fn test_get_api_key_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "sk-file").unwrap();

        let config = LlmConfig {
            api_key_env: "TASKPLAN_CONFIG_TEST_UNSET".to_string(),
            api_key_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        unsafe { std::env::remove_var("TASKPLAN_CONFIG_TEST_UNSET") };
        assert_eq!(config.get_api_key().unwrap(), "sk-file");
    }

    #[test]
    #[serial]
    fn test_get_api_key_missing() {
        let config = LlmConfig {
            api_key_env: "TASKPLAN_CONFIG_TEST_UNSET".to_string(),
            ..Default::default()
        };
        unsafe { std::env::remove_var("TASKPLAN_CONFIG_TEST_UNSET") };

        let err = config.get_api_key().unwrap_err();
        assert!(err.to_string().contains("TASKPLAN_CONFIG_TEST_UNSET"));
        assert!(Config { llm: config, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/etc/key")), PathBuf::from("/etc/key"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/key")), home.join("key"));
        }
    }
}
