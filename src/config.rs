//! Layered configuration.
//!
//! Priority, lowest to highest: built-in defaults, `./trivia.toml`, an explicit
//! config file, then `TRIVIA_`-prefixed environment variables
//! (`TRIVIA_API__CATEGORY=18`). Command-line flags are applied on top by the
//! binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PROJECT_CONFIG_FILE: &str = "trivia.toml";
pub const ENV_PREFIX: &str = "TRIVIA_";

/// Largest batch the provider serves in a single request.
pub const MAX_BATCH_SIZE: u32 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Figment(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Trivia provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub question_url: String,
    pub token_url: String,
    pub batch_size: u32,
    /// Provider category id. 9 is General Knowledge.
    pub category: u32,
    pub question_type: String,
    pub timeout_secs: u64,
    /// Request a session token so a run does not repeat questions.
    pub use_token: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            question_url: "https://opentdb.com/api.php".to_string(),
            token_url: "https://opentdb.com/api_token.php".to_string(),
            batch_size: MAX_BATCH_SIZE,
            category: 9,
            question_type: "multiple".to_string(),
            timeout_secs: 10,
            use_token: true,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path. Defaults to `trivia-quiz.log` in the temp directory.
    pub file: Option<PathBuf>,
}

impl LogConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("trivia-quiz.log"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriviaConfig {
    pub api: ApiConfig,
    pub log: LogConfig,
}

impl TriviaConfig {
    /// Load configuration from every source, `explicit` taking precedence
    /// over the project file. Call [`TriviaConfig::validate`] once any
    /// further overrides are applied.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(TriviaConfig::default()))
            .merge(Toml::file(PROJECT_CONFIG_FILE));

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        let config: TriviaConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.batch_size == 0 || self.api.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::Invalid(format!(
                "api.batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.api.batch_size
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
