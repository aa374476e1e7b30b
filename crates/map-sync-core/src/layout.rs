//! Sort files into first-character subdirectories, or flatten them back.

use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::scanner;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Subdirectory a file belongs to when sorted: its lower-cased first
/// character, if that is an ASCII letter or digit.
pub fn sort_bucket(file_name: &str) -> Option<char> {
    file_name
        .chars()
        .next()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
}

fn move_file(from: &Path, to: &Path) -> Result<(), Error> {
    fs::rename(from, to).map_err(|source| Error::MoveFailed {
        path: from.to_path_buf(),
        source,
    })
}

/// Move every regular file in `root` into `root/<bucket>/`. Files without an
/// alphanumeric first character stay where they are. Returns files moved.
pub fn sort_maps(root: &Path, reporter: &dyn ProgressReporter) -> Result<usize, Error> {
    info!("Sorting maps...");
    let files = scanner::list_root_files(root)?;
    let total = files.len();
    let mut moved = 0usize;

    for (index, path) in files.iter().enumerate() {
        reporter.report(&format!("Sorting {}/{}", index + 1, total));
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let Some(bucket) = sort_bucket(&file_name.to_string_lossy()) else {
            continue;
        };

        let bucket_dir = root.join(bucket.to_string());
        let result = fs::create_dir_all(&bucket_dir)
            .map_err(|source| Error::MoveFailed {
                path: path.clone(),
                source,
            })
            .and_then(|_| move_file(path, &bucket_dir.join(file_name)));
        match result {
            Ok(()) => moved += 1,
            Err(e) => debug!("{}", e),
        }
    }

    info!("Sorted {} files", moved);
    Ok(moved)
}

/// Move every file below `root` up to `root`, keeping only its base name.
/// When two files share a base name the one moved later wins.
pub fn unsort_maps(root: &Path, reporter: &dyn ProgressReporter) -> Result<usize, Error> {
    info!("Un-sorting maps...");
    let nested: Vec<PathBuf> = scanner::list_files(root)?
        .into_iter()
        .filter(|path| path.parent() != Some(root))
        .collect();
    let total = nested.len();
    let mut moved = 0usize;

    for (index, path) in nested.iter().enumerate() {
        reporter.report(&format!("Un-sorting {}/{}", index + 1, total));
        let Some(file_name) = path.file_name() else {
            continue;
        };
        match move_file(path, &root.join(file_name)) {
            Ok(()) => moved += 1,
            Err(e) => debug!("{}", e),
        }
    }

    info!("Un-sorted {} files", moved);
    Ok(moved)
}

/// Remove every directory under `root` that holds no files, at any depth.
/// `root` itself is kept. Returns the number of directories removed.
pub fn remove_empty_directories(root: &Path) -> Result<usize, Error> {
    let mut removed = 0usize;
    for entry in fs::read_dir(root)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                debug!("Error reading entry in {}: {}", root.display(), e);
                continue;
            }
        };
        if path.is_dir() && !path.is_symlink() {
            removed += prune(&path);
        }
    }
    if removed > 0 {
        info!("Removed {} empty directories", removed);
    }
    Ok(removed)
}

/// Depth-first removal; returns directories removed including `dir`.
fn prune(dir: &Path) -> usize {
    let mut removed = 0usize;
    let children = match fs::read_dir(dir) {
        Ok(children) => children,
        Err(e) => {
            debug!("Error reading directory {}: {}", dir.display(), e);
            return 0;
        }
    };
    for child in children.flatten() {
        let path = child.path();
        if path.is_dir() && !path.is_symlink() {
            removed += prune(&path);
        }
    }

    match is_empty_dir(dir) {
        Ok(true) => match fs::remove_dir(dir) {
            Ok(()) => {
                debug!("Removed empty directory {}", dir.display());
                removed += 1;
            }
            Err(source) => debug!(
                "{}",
                Error::RmdirFailed {
                    path: dir.to_path_buf(),
                    source
                }
            ),
        },
        Ok(false) => {}
        Err(e) => debug!("Error reading directory {}: {}", dir.display(), e),
    }
    removed
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
