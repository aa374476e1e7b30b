use crate::error::Error;
use std::io::{Cursor, Read};

const MAX_ZIP_ENTRIES: usize = 1_000;
const MAX_ZIP_ENTRY_UNCOMPRESSED_BYTES: u64 = 128 * 1024 * 1024;
const MAX_ZIP_TOTAL_UNCOMPRESSED_BYTES: u64 = 256 * 1024 * 1024;
const MAX_ZIP_COMPRESSION_RATIO: u64 = 200;

/// Bounds applied while inflating a map archive into memory.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionLimits {
    pub max_entries: usize,
    pub max_entry_uncompressed_bytes: u64,
    pub max_total_uncompressed_bytes: u64,
    pub max_compression_ratio: u64,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_entries: MAX_ZIP_ENTRIES,
            max_entry_uncompressed_bytes: MAX_ZIP_ENTRY_UNCOMPRESSED_BYTES,
            max_total_uncompressed_bytes: MAX_ZIP_TOTAL_UNCOMPRESSED_BYTES,
            max_compression_ratio: MAX_ZIP_COMPRESSION_RATIO,
        }
    }
}

/// A file entry read out of a map archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// Read every file entry of an in-memory zip, in archive order. Directory
/// entries and entries escaping the archive root are skipped.
pub fn read_entries(fingerprint: &str, bytes: &[u8]) -> Result<Vec<ArchiveEntry>, Error> {
    read_entries_with_limits(fingerprint, bytes, ExtractionLimits::default())
}

pub fn read_entries_with_limits(
    fingerprint: &str,
    bytes: &[u8],
    limits: ExtractionLimits,
) -> Result<Vec<ArchiveEntry>, Error> {
    let extract_failed = |reason: String| Error::ArchiveExtractFailed {
        fingerprint: fingerprint.to_string(),
        reason,
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| extract_failed(e.to_string()))?;
    let entry_count = archive.len();
    if entry_count > limits.max_entries {
        return Err(extract_failed(format!(
            "archive has {} entries, limit is {}",
            entry_count, limits.max_entries
        )));
    }

    let mut entries = Vec::with_capacity(entry_count);
    let mut total_uncompressed: u64 = 0;
    for i in 0..entry_count {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| extract_failed(e.to_string()))?;
        if entry.is_dir() || entry.enclosed_name().is_none() {
            continue;
        }
        let name = entry.name().to_string();
        let size = entry.size();
        let compressed_size = entry.compressed_size();
        if size > limits.max_entry_uncompressed_bytes {
            return Err(extract_failed(format!(
                "entry '{}' is too large ({} bytes)",
                name, size
            )));
        }
        check_ratio(&name, size, compressed_size, limits).map_err(extract_failed)?;
        total_uncompressed = total_uncompressed
            .checked_add(size)
            .filter(|total| *total <= limits.max_total_uncompressed_bytes)
            .ok_or_else(|| {
                extract_failed(format!(
                    "extracted size exceeds limit {}",
                    limits.max_total_uncompressed_bytes
                ))
            })?;

        // Headers can lie about sizes, so the read itself is bounded too.
        let budget = limits
            .max_entry_uncompressed_bytes
            .min(limits.max_total_uncompressed_bytes - (total_uncompressed - size));
        let mut data = Vec::with_capacity(size as usize);
        (&mut entry)
            .take(budget + 1)
            .read_to_end(&mut data)
            .map_err(|e| extract_failed(format!("entry '{}': {}", name, e)))?;
        let actual = data.len() as u64;
        if actual > budget {
            return Err(extract_failed(format!(
                "entry '{}' exceeds extracted size limit",
                name
            )));
        }
        check_ratio(&name, actual, compressed_size, limits).map_err(extract_failed)?;
        total_uncompressed = total_uncompressed - size + actual;
        entries.push(ArchiveEntry { path: name, data });
    }

    if entries.is_empty() {
        return Err(extract_failed("archive contains no files".to_string()));
    }
    Ok(entries)
}

fn check_ratio(
    name: &str,
    uncompressed: u64,
    compressed: u64,
    limits: ExtractionLimits,
) -> Result<(), String> {
    if uncompressed == 0 {
        return Ok(());
    }
    if compressed == 0 {
        return Err(format!("entry '{}' has zero compressed size", name));
    }
    if uncompressed > compressed.saturating_mul(limits.max_compression_ratio) {
        return Err(format!("entry '{}' exceeds compression ratio limit", name));
    }
    Ok(())
}
