use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Recursively list regular files under `root`, in file-name order per
/// directory. Symlinks are not followed. Unreadable entries are logged and
/// skipped; only an unreadable root is an error.
pub fn list_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    if !fs::metadata(root)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", root.display()),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("Error walking {}: {}", root.display(), err);
                continue;
            }
        };
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Same as [`list_files`], with paths relative to `root`.
pub fn list_relative_paths(root: &Path) -> io::Result<Vec<String>> {
    Ok(list_files(root)?
        .into_iter()
        .filter_map(|path| {
            path.strip_prefix(root)
                .ok()
                .map(|rel| rel.to_string_lossy().into_owned())
        })
        .collect())
}

/// Regular files directly inside `root`, in file-name order.
pub fn list_root_files(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("Error reading entry in {}: {}", root.display(), err);
                continue;
            }
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => files.push(entry.path()),
            Ok(_) => {}
            Err(err) => debug!("Failed to stat {}: {}", entry.path().display(), err),
        }
    }
    files.sort();
    Ok(files)
}
