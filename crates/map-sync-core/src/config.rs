use crate::error::Error;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Catalog keys the remote map database is known to serve.
pub const KNOWN_GAME_TYPES: &[(&str, &str)] = &[
    ("yr", "Red Alert 2 Yuri's Revenge"),
    ("ra", "Red Alert"),
    ("ts", "Tiberian Sun"),
    ("td", "Tiberian Dawn"),
    ("d2", "Dune 2000"),
    ("dta", "Dawn of the Tiberium Age"),
];

pub const DEFAULT_BASE_URL: &str = "https://mapdb.cncnet.org";
const CONFIG_FILE_NAME: &str = "MapSync";
const ENV_PREFIX: &str = "MAP_SYNC";

/// Run configuration. Built once at startup and handed to every component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game_type: String,
    /// Only list maps newer than this many days; 0 disables the filter.
    pub map_age_days: u32,
    /// Catalog truncation; zero or negative means unlimited.
    pub max_number_of_maps: i64,
    pub delay_between_requests_ms: u64,
    pub sort_in_directories: bool,
    pub destination_dir: PathBuf,
    pub debug: bool,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            game_type: "yr".to_string(),
            map_age_days: 0,
            max_number_of_maps: -1,
            delay_between_requests_ms: 500,
            sort_in_directories: true,
            destination_dir: PathBuf::from("cncnet-maps"),
            debug: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn map_limit(&self) -> Option<usize> {
        if self.max_number_of_maps > 0 {
            Some(self.max_number_of_maps as usize)
        } else {
            None
        }
    }

    pub fn max_age_days(&self) -> Option<u32> {
        (self.map_age_days > 0).then_some(self.map_age_days)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Anchor a relative destination directory at `cwd`.
    pub fn resolve_destination(mut self, cwd: &Path) -> Self {
        if self.destination_dir.is_relative() {
            self.destination_dir = cwd.join(&self.destination_dir);
        }
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.game_type.trim().is_empty() {
            return Err(Error::Config("game_type must not be empty".to_string()));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("base_url must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.destination_dir.as_os_str().is_empty() {
            return Err(Error::Config("destination_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from an optional `MapSync.*` file in the working
/// directory, then `MAP_SYNC_*` environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(CONFIG_FILE_NAME).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load configuration from an explicit file, without environment overrides.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::from(path))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
