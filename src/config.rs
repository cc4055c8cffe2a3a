use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::CsvLayout;
use crate::error::Result;
use crate::rl::TradingEnvConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: TradingEnvConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Market data CSV; can also be given on the command line
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Rows before the header row
    #[serde(default = "default_skip_rows")]
    pub skip_rows: usize,
    /// Zero-based column holding the closing price
    #[serde(default = "default_close_column")]
    pub close_column: usize,
}

fn default_skip_rows() -> usize {
    2
}

fn default_close_column() -> usize {
    1
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            skip_rows: default_skip_rows(),
            close_column: default_close_column(),
        }
    }
}

impl DataConfig {
    pub fn layout(&self) -> CsvLayout {
        CsvLayout {
            skip_rows: self.skip_rows,
            close_column: self.close_column,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Per-episode action log, overwritten at every episode end
    #[serde(default = "default_action_log_path")]
    pub action_log_path: PathBuf,
    /// Equity curve export; skipped when unset
    #[serde(default)]
    pub equity_curve_path: Option<PathBuf>,
}

fn default_action_log_path() -> PathBuf {
    PathBuf::from("actions_log.csv")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            action_log_path: default_action_log_path(),
            equity_curve_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
    /// Also write daily-rolled log files here
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            dir: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref();
        let profile = std::env::var("TRADESIM_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("output.action_log_path", "actions_log.csv")?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // e.g. config/production.toml
            .add_source(File::from(config_dir.join(format!("{profile}.toml"))).required(false))
            // TRADESIM_ENVIRONMENT__WINDOW_SIZE, TRADESIM_DATA__PATH, ...
            .add_source(
                Environment::with_prefix("TRADESIM")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.environment.validate()
    }

    /// Render as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
