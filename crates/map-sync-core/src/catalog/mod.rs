//! Remote map catalog: descriptor parsing and the repository seam used by the
//! fetch stage.

mod http_repository;

pub use http_repository::{archive_url, catalog_url, HttpRepository};

use crate::error::Error;
use crate::fetch::naming;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// One map as listed by the catalog. The fingerprint is the catalog's unique
/// content id and is what gets embedded in local file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDescriptor {
    pub name: String,
    pub fingerprint: String,
    pub age_days: Option<u64>,
}

impl MapDescriptor {
    pub fn new(name: impl Into<String>, fingerprint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fingerprint: fingerprint.into(),
            age_days: None,
        }
    }
}

/// Source of catalog listings and map archives.
pub trait MapRepository: Send + Sync {
    fn fetch_catalog(
        &self,
        game_type: &str,
        max_age_days: Option<u32>,
    ) -> Result<Vec<MapDescriptor>, Error>;

    /// Fetch the raw zip bytes for one map.
    fn fetch_archive(&self, game_type: &str, fingerprint: &str) -> Result<Vec<u8>, Error>;
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    name: String,
    hash: String,
    #[serde(default)]
    date: Option<Value>,
}

/// Parse a catalog response body. Anything other than a JSON array of
/// `{name, hash, date}` objects is `CatalogUnavailable`.
pub fn parse_catalog(body: &[u8], now: DateTime<Utc>) -> Result<Vec<MapDescriptor>, Error> {
    let entries: Vec<CatalogEntry> = serde_json::from_slice(body)
        .map_err(|e| Error::CatalogUnavailable(format!("malformed catalog body: {}", e)))?;

    let mut maps = Vec::with_capacity(entries.len());
    for entry in entries {
        let fingerprint = entry.hash.trim().to_string();
        if fingerprint.is_empty() {
            warn!("Catalog entry '{}' has no hash, ignoring it", entry.name);
            continue;
        }
        if naming::on_disk_fingerprint(&fingerprint).is_empty() {
            warn!(
                "Catalog entry '{}' has hash '{}' with no usable file name characters, ignoring it",
                entry.name, fingerprint
            );
            continue;
        }
        let age_days = entry
            .date
            .as_ref()
            .and_then(parse_catalog_date)
            .and_then(|date| now.signed_duration_since(date).num_days().try_into().ok());
        maps.push(MapDescriptor {
            name: entry.name,
            fingerprint,
            age_days,
        });
    }
    Ok(maps)
}

fn parse_catalog_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(secs) = s.parse::<i64>() {
                return DateTime::from_timestamp(secs, 0);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
                return Some(dt.and_utc());
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        }
        _ => None,
    }
}

/// Keep the first `limit` maps, preserving catalog order.
pub fn apply_limit(mut maps: Vec<MapDescriptor>, limit: Option<usize>) -> Vec<MapDescriptor> {
    if let Some(limit) = limit {
        maps.truncate(limit);
    }
    maps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_catalog_preserves_order() {
        let body = br#"[
            {"name": "Desert", "hash": "abc123", "date": "1709856000"},
            {"name": "Ice", "hash": "def456", "date": 1710072000}
        ]"#;
        let maps = parse_catalog(body, now()).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].name, "Desert");
        assert_eq!(maps[0].fingerprint, "abc123");
        assert_eq!(maps[0].age_days, Some(3));
        assert_eq!(maps[1].fingerprint, "def456");
        assert_eq!(maps[1].age_days, Some(1));
    }

    #[test]
    fn test_parse_catalog_accepts_missing_or_textual_dates() {
        let body = br#"[
            {"name": "A", "hash": "a1"},
            {"name": "B", "hash": "b2", "date": "2024-03-01 08:00:00"},
            {"name": "C", "hash": "c3", "date": "not a date"}
        ]"#;
        let maps = parse_catalog(body, now()).unwrap();
        assert_eq!(maps[0].age_days, None);
        assert_eq!(maps[1].age_days, Some(10));
        assert_eq!(maps[2].age_days, None);
    }

    #[test]
    fn test_parse_catalog_rejects_non_array() {
        let err = parse_catalog(br#"{"error": "nope"}"#, now()).unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable(_)));

        let err = parse_catalog(b"<html></html>", now()).unwrap_err();
        assert!(matches!(err, Error::CatalogUnavailable(_)));
    }

    #[test]
    fn test_parse_catalog_drops_entries_without_hash() {
        let body = br#"[{"name": "Blank", "hash": ""}, {"name": "Ok", "hash": "ff00"}]"#;
        let maps = parse_catalog(body, now()).unwrap();
        assert_eq!(maps, vec![MapDescriptor::new("Ok", "ff00")]);
    }

    #[test]
    fn test_parse_catalog_drops_hashes_with_no_file_name_characters() {
        let body = br#"[{"name": "Bad", "hash": "::?*"}, {"name": "Odd", "hash": "ab:cd"}]"#;
        let maps = parse_catalog(body, now()).unwrap();
        assert_eq!(maps, vec![MapDescriptor::new("Odd", "ab:cd")]);
    }

    #[test]
    fn test_apply_limit_keeps_first_n() {
        let maps = vec![
            MapDescriptor::new("A", "1"),
            MapDescriptor::new("B", "2"),
            MapDescriptor::new("C", "3"),
        ];
        let limited = apply_limit(maps.clone(), Some(2));
        assert_eq!(limited, maps[..2].to_vec());
        assert_eq!(apply_limit(maps.clone(), None), maps);
        assert_eq!(apply_limit(maps.clone(), Some(10)), maps);
    }
}
