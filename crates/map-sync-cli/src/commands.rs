use clap::{Args, Parser, Subcommand};
use map_sync_core::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "map-sync")]
#[command(
    about = "Download new maps from the CnCNet map database and keep a tidy local copy",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Download missing maps, remove duplicates and arrange the directory (default)
    Sync,
    /// Remove byte-identical files from the destination directory
    Dedupe,
    /// Move maps into first-character subdirectories (a-z, 0-9)
    Sort,
    /// Move maps out of subdirectories back into the destination directory
    Unsort,
    /// Print configuration values
    PrintConfig,
}

/// Command line values that take precedence over file and environment config.
#[derive(Debug, Args)]
pub struct ConfigOverrides {
    /// Catalog key: yr, ra, ts, td, d2 or dta
    #[arg(long, short = 'g', global = true)]
    pub game: Option<String>,

    /// Directory the maps are saved in
    #[arg(long, short = 'd', global = true)]
    pub destination: Option<PathBuf>,

    /// Only consider the first N maps of the catalog (-1 for all)
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub max_maps: Option<i64>,

    /// Only list maps uploaded within this many days (0 for all)
    #[arg(long, global = true)]
    pub age: Option<u32>,

    /// Milliseconds to wait between archive downloads
    #[arg(long, global = true)]
    pub delay: Option<u64>,

    /// Flatten the directory instead of sorting into subdirectories
    #[arg(long, global = true)]
    pub no_sort: bool,

    /// Base URL of the map database
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Verbose diagnostics
    #[arg(long, global = true)]
    pub debug: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(game) = &self.game {
            config.game_type = game.clone();
        }
        if let Some(destination) = &self.destination {
            config.destination_dir = destination.clone();
        }
        if let Some(max_maps) = self.max_maps {
            config.max_number_of_maps = max_maps;
        }
        if let Some(age) = self.age {
            config.map_age_days = age;
        }
        if let Some(delay) = self.delay {
            config.delay_between_requests_ms = delay;
        }
        if self.no_sort {
            config.sort_in_directories = false;
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if self.debug {
            config.debug = true;
        }
        config
    }
}
