use crate::error::Result;
use crate::media::DEFAULT_MAX_MEDIA_BYTES;
use crate::scoring::ResultPolicy;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "SURVEY";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SurveyConfig {
    pub database: DatabaseConfig,
    pub export: ExportConfig,
    pub scoring: ScoringConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub answers_file: String,
    pub scores_file: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ScoringConfig {
    pub result_policy: ResultPolicy,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MediaConfig {
    pub max_bytes: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir(),
            answers_file: "SurveyAnswers.csv".to_string(),
            scores_file: "StudentScores.csv".to_string(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_MEDIA_BYTES,
        }
    }
}

impl SurveyConfig {
    /// Load from the default location, creating the file on first use.
    pub fn load() -> Result<(Self, PathBuf)> {
        let config_path = default_config_path();
        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    /// Load from `config_path`, creating it with defaults when missing.
    /// `SURVEY__<SECTION>__<KEY>` environment variables override file values.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        Self::load_with_env(config_path, env_source())
    }

    fn load_with_env(config_path: &Path, env: Environment) -> Result<Self> {
        if !config_path.exists() {
            write_default_config(config_path)?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml))
            .add_source(env)
            .build()?;

        let mut config: SurveyConfig = builder.try_deserialize()?;

        config.database.path = expand_tilde(&config.database.path);
        config.export.directory = expand_tilde(&config.export.directory);

        tracing::debug!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    pub fn answers_export_path(&self) -> PathBuf {
        self.export.directory.join(&self.export.answers_file)
    }

    pub fn scores_export_path(&self) -> PathBuf {
        self.export.directory.join(&self.export.scores_file)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| {
            ConfigError::Message(format!("Failed to serialize configuration: {e}")).into()
        })
    }
}

/// Write the default configuration to `config_path`, creating parent directories.
pub fn write_default_config(config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::Message(format!("Failed to create config directory: {e}"))
        })?;
    }

    let body = SurveyConfig::default().to_toml()?;
    let contents = format!(
        "# Health survey configuration\n\
         # Environment variables such as SURVEY__DATABASE__PATH override these values.\n\
         # result_policy: \"upsert\" keeps one result per respondent, \"append\" keeps every run.\n\n\
         {body}"
    );
    std::fs::write(config_path, contents)
        .map_err(|e| ConfigError::Message(format!("Failed to write default config: {e}")))?;

    tracing::info!("Wrote default configuration to {}", config_path.display());
    Ok(())
}

pub fn default_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("health-survey/survey.toml")
    } else {
        PathBuf::from("survey.toml")
    }
}

fn default_db_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join("health-survey/survey.db")
    } else {
        PathBuf::from("survey.db")
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn expand_tilde(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = home::home_dir() {
            let path_str = path.to_string_lossy();
            let expanded = path_str.replacen('~', &home.to_string_lossy(), 1);
            return PathBuf::from(expanded);
        }
    }
    path.to_path_buf()
}
