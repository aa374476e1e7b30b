//! On-disk naming: `<display name> {{<fingerprint>}}<extension>`.
//!
//! The bracketed token is the only link between a local file and its catalog
//! entry, so it must survive sanitisation intact.

use std::path::Path;

pub const DEFAULT_EXTENSION: &str = ".map";
const MAX_FILE_NAME_BYTES: usize = 255;
const FALLBACK_DISPLAY_NAME: &str = "Unnamed";

fn is_illegal(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
}

/// Strip characters that are illegal in file names on common platforms, and
/// trailing dots and spaces which Windows silently drops.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !is_illegal(*c)).collect();
    cleaned.trim_end_matches(['.', ' ']).trim_start().to_string()
}

/// Extension of an archive entry, including the dot. Entries without one
/// are treated as maps.
pub fn entry_extension(entry_path: &str) -> String {
    let file_name = entry_path.rsplit(['/', '\\']).next().unwrap_or(entry_path);
    match Path::new(file_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = sanitize_file_name(ext);
            if ext.is_empty() {
                DEFAULT_EXTENSION.to_string()
            } else {
                format!(".{}", ext)
            }
        }
        None => DEFAULT_EXTENSION.to_string(),
    }
}

/// The form of a catalog fingerprint as it appears inside local file names.
pub fn on_disk_fingerprint(fingerprint: &str) -> String {
    sanitize_file_name(fingerprint)
}

pub fn fingerprint_token(fingerprint: &str) -> String {
    format!("{{{{{}}}}}", on_disk_fingerprint(fingerprint))
}

/// Build the local file name for one archive entry of a map.
pub fn build_file_name(display_name: &str, fingerprint: &str, entry_path: &str) -> String {
    let token = fingerprint_token(fingerprint);
    let extension = entry_extension(entry_path);

    let mut display = sanitize_file_name(display_name);
    if display.is_empty() {
        display = FALLBACK_DISPLAY_NAME.to_string();
    }

    // Shorten the display name, never the token, to stay within limits.
    let reserved = token.len() + extension.len() + 1;
    let budget = MAX_FILE_NAME_BYTES.saturating_sub(reserved);
    if display.len() > budget {
        let mut cut = budget;
        while cut > 0 && !display.is_char_boundary(cut) {
            cut -= 1;
        }
        display.truncate(cut);
        display = display.trim_end_matches(['.', ' ']).to_string();
    }

    format!("{} {}{}", display, token, extension)
}

/// `Name {{fp}}.map` -> `Name {{fp}} (n).map`
pub fn with_collision_suffix(file_name: &str, n: usize) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => format!("{} ({}){}", &file_name[..dot], n, &file_name[dot..]),
        _ => format!("{} ({})", file_name, n),
    }
}

/// The fingerprint embedded in a local file name, if any.
pub fn extract_fingerprint(file_name: &str) -> Option<&str> {
    let start = file_name.rfind("{{")? + 2;
    let len = file_name[start..].find("}}")?;
    let fingerprint = &file_name[start..start + len];
    (!fingerprint.is_empty()).then_some(fingerprint)
}
