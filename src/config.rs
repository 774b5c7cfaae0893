use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::KeyMapperError;

pub static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub keymapper: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const KEYMAPPER_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            keymapper: Self::KEYMAPPER_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.keymapper.clone();
        self.keymapper = self.keymapper.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.keymapper.as_str()) {
            eprintln!(
                "Config error: keymapper log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::KEYMAPPER_LEVEL
            );
            self.keymapper = Self::KEYMAPPER_LEVEL.to_owned();
        }
    }

    /// Level spec for flexi_logger.
    pub fn log_spec(&self) -> String {
        format!("keymapper_db={}", self.keymapper)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub filename: String,
}

impl DatabaseConfig {
    const FILENAME: &str = "keymaps.db";

    fn default() -> Self {
        DatabaseConfig {
            filename: Self::FILENAME.to_owned(),
        }
    }

    fn ensure_valid(&mut self) {
        let trimmed = self.filename.trim();
        if trimmed.is_empty() {
            eprintln!(
                "Config error: database filename is empty - using default of '{}'",
                Self::FILENAME
            );
            self.filename = Self::FILENAME.to_owned();
        } else if trimmed.len() != self.filename.len() {
            self.filename = trimmed.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
}

impl Config {
    fn default() -> Self {
        Config {
            logging: LoggingConfig::default(),
            database: DatabaseConfig::default(),
        }
    }

    pub fn project_dirs() -> Result<ProjectDirs, KeyMapperError> {
        ProjectDirs::from("io.github", "sds100", "keymapper-db")
            .ok_or_else(|| KeyMapperError::Error("Could not determine project directories".to_string()))
    }

    /// Loads the configuration from `config.toml` in the app's data directory.
    pub fn load_config(project_dirs: &ProjectDirs) -> Self {
        Self::load_from(&project_dirs.data_local_dir().join("config.toml"))
    }

    /// Defaults, then the TOML file at `config_path`, then `KEYMAPPER_`
    /// environment variables (`KEYMAPPER_DATABASE__FILENAME=...`).
    /// Writes the defaults to `config_path` if nothing is there yet.
    pub fn load_from(config_path: &Path) -> Self {
        let default_config = Config::default();

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                if let Err(e) = fs::create_dir_all(parent) {
                    eprintln!(
                        "Failed to create configuration directory {}: {}",
                        parent.display(),
                        e
                    );
                }
            }
            if let Ok(toml_string) = toml::to_string_pretty(&default_config) {
                if let Err(e) = fs::write(config_path, toml_string) {
                    eprintln!(
                        "Failed to write default config to {}: {}",
                        config_path.display(),
                        e
                    );
                }
            } else {
                eprintln!("Failed to serialize default config.");
            }
        }

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("KEYMAPPER_").split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load config file {}: {}. Using default configuration.",
                config_path.display(),
                err
            );
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.database.ensure_valid();
    }

    /// The process-wide config, loading defaults if nothing was set at startup.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::default)
    }

    /// Where the store lives when no path is given on the command line.
    pub fn default_database_path(&self, project_dirs: &ProjectDirs) -> PathBuf {
        project_dirs.data_local_dir().join(&self.database.filename)
    }
}
