use crate::error::Error;
use crate::hasher;
use crate::progress::ProgressReporter;
use crate::scanner;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build size -> paths for every regular file under `root`, keeping the
/// listing order inside each bucket. Files that cannot be stat'ed are left
/// out, which makes them unique.
pub fn build_size_groups(files: Vec<PathBuf>) -> BTreeMap<u64, Vec<PathBuf>> {
    let sized: Vec<(PathBuf, Option<u64>)> = files
        .into_par_iter()
        .map(|path| match fs::metadata(&path) {
            Ok(metadata) => {
                let size = metadata.len();
                (path, Some(size))
            }
            Err(source) => {
                debug!("{}", Error::StatFailed { path: path.clone(), source });
                (path, None)
            }
        })
        .collect();

    let mut groups: BTreeMap<u64, Vec<PathBuf>> = BTreeMap::new();
    for (path, size) in sized {
        if let Some(size) = size {
            groups.entry(size).or_default().push(path);
        }
    }
    groups
}

/// Decide which members of one size group to delete. Members are split by
/// content hash; in every hash bucket with more than one file the first in
/// listing order is kept and the rest are returned.
pub fn duplicates_in_group(group: &[PathBuf]) -> Vec<PathBuf> {
    let hashed: Vec<(&PathBuf, u64)> = group
        .par_iter()
        .filter_map(|path| match hasher::hash_file(path) {
            Ok(hash) => Some((path, hash)),
            Err(source) => {
                debug!("{}", Error::HashFailed { path: path.clone(), source });
                None
            }
        })
        .collect();

    let mut seen: HashSet<u64> = HashSet::with_capacity(hashed.len());
    hashed
        .into_iter()
        .filter(|(_, hash)| !seen.insert(*hash))
        .map(|(path, _)| path.clone())
        .collect()
}

/// Remove byte-identical files under `root`, keeping one per duplicate set.
/// Returns the number of files removed.
pub fn remove_duplicates(root: &Path, reporter: &dyn ProgressReporter) -> Result<usize, Error> {
    info!("Comparing file sizes...");
    let files = scanner::list_files(root)?;
    let size_groups = build_size_groups(files);

    let candidates: Vec<Vec<PathBuf>> = size_groups
        .into_values()
        .filter(|paths| paths.len() > 1)
        .collect();

    info!("Checking {} size groups for duplicates...", candidates.len());
    let mut removed = 0usize;
    for (index, group) in candidates.iter().enumerate() {
        reporter.report(&format!(
            "Checking for duplicates {}/{}",
            index + 1,
            candidates.len()
        ));

        let to_remove = duplicates_in_group(group);
        if to_remove.is_empty() {
            continue;
        }
        debug!(
            "Found {} duplicate(s) among {} files of equal size",
            to_remove.len(),
            group.len()
        );
        for path in &to_remove {
            match fs::remove_file(path) {
                Ok(()) => {
                    debug!("Removed duplicate {}", path.display());
                    removed += 1;
                }
                Err(source) => {
                    debug!("{}", Error::RemoveFailed { path: path.clone(), source });
                }
            }
        }
    }

    info!("Removed {} duplicate files", removed);
    Ok(removed)
}
