//! Sequential, rate-limited download and extraction of new maps.

pub mod archive;
pub mod naming;

use crate::catalog::{MapDescriptor, MapRepository};
use crate::error::Error;
use crate::progress::ProgressReporter;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct FetchOptions<'a> {
    pub game_type: &'a str,
    pub destination: &'a Path,
    /// Minimum spacing between the end of one fetch attempt and the start of
    /// the next.
    pub delay: Duration,
}

/// A map that could not be fetched, extracted or written.
#[derive(Debug)]
pub struct FailedMap {
    pub name: String,
    pub fingerprint: String,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct FetchSummary {
    /// Fingerprints of maps whose every entry was written.
    pub files_wrote: Vec<String>,
    pub files_errored: Vec<FailedMap>,
    pub number_of_files_skipped: usize,
}

/// Download and extract each map in order, one request in flight at a time.
/// A failure is recorded against its own map and never stops the batch.
pub fn fetch_maps(
    repository: &dyn MapRepository,
    new_maps: &[MapDescriptor],
    number_of_files_skipped: usize,
    options: &FetchOptions<'_>,
    reporter: &dyn ProgressReporter,
) -> FetchSummary {
    let mut summary = FetchSummary {
        number_of_files_skipped,
        ..FetchSummary::default()
    };
    let total = new_maps.len();

    for (index, map) in new_maps.iter().enumerate() {
        if index > 0 && !options.delay.is_zero() {
            thread::sleep(options.delay);
        }
        match fetch_one(repository, map, options) {
            Ok(written) => {
                debug!(
                    "Wrote {} file(s) for '{}' ({})",
                    written.len(),
                    map.name,
                    map.fingerprint
                );
                summary.files_wrote.push(map.fingerprint.clone());
            }
            Err(error) => {
                debug!("Failed to get '{}': {}", map.name, error);
                summary.files_errored.push(FailedMap {
                    name: map.name.clone(),
                    fingerprint: map.fingerprint.clone(),
                    error,
                });
            }
        }
        reporter.report(&format!("Downloaded {}/{}", index + 1, total));
    }

    info!(
        "Downloaded {} maps, {} failed, {} skipped",
        summary.files_wrote.len(),
        summary.files_errored.len(),
        summary.number_of_files_skipped
    );
    summary
}

fn fetch_one(
    repository: &dyn MapRepository,
    map: &MapDescriptor,
    options: &FetchOptions<'_>,
) -> Result<Vec<PathBuf>, Error> {
    let bytes = repository.fetch_archive(options.game_type, &map.fingerprint)?;
    let entries = archive::read_entries(&map.fingerprint, &bytes)?;
    write_entries(map, &entries, options.destination)
}

/// Write all entries of one map. If any write fails, the files already
/// written for this map are removed so the next run retries it.
fn write_entries(
    map: &MapDescriptor,
    entries: &[archive::ArchiveEntry],
    destination: &Path,
) -> Result<Vec<PathBuf>, Error> {
    let mut used_names: HashSet<String> = HashSet::new();
    let mut written: Vec<PathBuf> = Vec::with_capacity(entries.len());

    for entry in entries {
        let base_name = naming::build_file_name(&map.name, &map.fingerprint, &entry.path);
        let mut file_name = base_name.clone();
        let mut n = 2;
        while used_names.contains(&file_name) {
            file_name = naming::with_collision_suffix(&base_name, n);
            n += 1;
        }

        let path = destination.join(&file_name);
        debug!("Writing {} to {}", entry.path, path.display());
        if let Err(source) = fs::write(&path, &entry.data) {
            discard_partial(&written);
            return Err(Error::FileWriteFailed { path, source });
        }
        used_names.insert(file_name);
        written.push(path);
    }

    Ok(written)
}

fn discard_partial(written: &[PathBuf]) {
    for path in written {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial file {}: {}", path.display(), e);
        }
    }
}
