use crate::catalog::{self, MapRepository};
use crate::config::AppConfig;
use crate::dedupe;
use crate::error::Error;
use crate::fetch::{self, FailedMap, FetchOptions};
use crate::layout;
use crate::progress::{ProgressReporter, Stage};
use crate::reconcile;
use crate::scanner;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Runs the fixed pipeline: catalog, reconcile, fetch, dedupe, layout.
pub struct SyncEngine<R: MapRepository> {
    config: AppConfig,
    repository: R,
    cancel: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct SyncSummary {
    pub catalog_size: usize,
    pub files_wrote: Vec<String>,
    pub files_errored: Vec<FailedMap>,
    pub number_of_files_skipped: usize,
    pub files_deduped: usize,
    pub files_moved: usize,
    pub directories_removed: usize,
    pub duration: Duration,
}

impl<R: MapRepository> SyncEngine<R> {
    pub fn new(config: AppConfig, repository: R) -> Self {
        Self {
            config,
            repository,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Token checked between stages. Setting it ends the run with
    /// `Error::Cancelled` before the next stage starts.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn check_cancelled(&self) -> Result<(), Error> {
        if self.cancel.load(Ordering::Relaxed) {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Create the destination directory if needed.
    pub fn prepare_destination(&self) -> Result<(), Error> {
        let destination = &self.config.destination_dir;
        if destination.is_dir() {
            info!("Using existing destination dir: {}", destination.display());
        } else {
            fs::create_dir_all(destination)?;
            info!(
                "Destination dir does not exist. Created {}",
                destination.display()
            );
        }
        Ok(())
    }

    /// Full run. Only catalog, configuration and destination failures are
    /// returned as errors; per-map and per-file failures end up in the summary
    /// or the debug log.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<SyncSummary, Error> {
        self.cancel.store(false, Ordering::Relaxed);
        self.config.validate()?;
        let started = Instant::now();
        let destination = self.config.destination_dir.as_path();

        // Catalog
        reporter.on_stage_start(Stage::Catalog);
        info!(
            "Getting maps from {}",
            self.config.base_url.trim_end_matches('/')
        );
        let maps = self
            .repository
            .fetch_catalog(&self.config.game_type, self.config.max_age_days())?;
        let maps = catalog::apply_limit(maps, self.config.map_limit());
        let catalog_size = maps.len();
        reporter.on_stage_complete(Stage::Catalog, catalog_size);
        self.check_cancelled()?;
        self.prepare_destination()?;

        // Reconcile + fetch
        let local_files = scanner::list_relative_paths(destination)?;
        let reconciliation = reconcile::reconcile(maps, &local_files);
        debug!("{} new maps to download", reconciliation.new_maps.len());

        reporter.on_stage_start(Stage::Fetch);
        let options = FetchOptions {
            game_type: &self.config.game_type,
            destination,
            delay: self.config.request_delay(),
        };
        let fetched = fetch::fetch_maps(
            &self.repository,
            &reconciliation.new_maps,
            reconciliation.skipped_count,
            &options,
            reporter,
        );
        reporter.on_stage_complete(Stage::Fetch, fetched.files_wrote.len());
        self.check_cancelled()?;

        // Dedupe
        reporter.on_stage_start(Stage::Dedupe);
        let files_deduped = dedupe::remove_duplicates(destination, reporter)?;
        reporter.on_stage_complete(Stage::Dedupe, files_deduped);
        self.check_cancelled()?;

        // Layout
        let files_moved = self.arrange(reporter)?;
        self.check_cancelled()?;

        reporter.on_stage_start(Stage::Cleanup);
        let directories_removed = layout::remove_empty_directories(destination)?;
        reporter.on_stage_complete(Stage::Cleanup, directories_removed);

        Ok(SyncSummary {
            catalog_size,
            files_wrote: fetched.files_wrote,
            files_errored: fetched.files_errored,
            number_of_files_skipped: fetched.number_of_files_skipped,
            files_deduped,
            files_moved,
            directories_removed,
            duration: started.elapsed(),
        })
    }

    /// Sort or unsort the destination, depending on configuration.
    pub fn arrange(&self, reporter: &dyn ProgressReporter) -> Result<usize, Error> {
        let destination = self.config.destination_dir.as_path();
        if self.config.sort_in_directories {
            reporter.on_stage_start(Stage::Sort);
            let moved = layout::sort_maps(destination, reporter)?;
            reporter.on_stage_complete(Stage::Sort, moved);
            Ok(moved)
        } else {
            reporter.on_stage_start(Stage::Unsort);
            let moved = layout::unsort_maps(destination, reporter)?;
            reporter.on_stage_complete(Stage::Unsort, moved);
            Ok(moved)
        }
    }
}
