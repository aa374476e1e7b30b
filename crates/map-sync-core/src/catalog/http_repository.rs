use super::{parse_catalog, MapDescriptor, MapRepository};
use crate::error::Error;
use crate::http;
use chrono::Utc;
use std::time::Duration;
use tracing::debug;

const MAX_CATALOG_BYTES: usize = 64 * 1024 * 1024;
const MAX_ARCHIVE_BYTES: usize = 256 * 1024 * 1024;

/// `GET <base>/search-json.php?game=<game>[&age=<days>]`
pub fn catalog_url(base_url: &str, game_type: &str, max_age_days: Option<u32>) -> String {
    let base = base_url.trim_end_matches('/');
    match max_age_days {
        Some(age) => format!("{}/search-json.php?game={}&age={}", base, game_type, age),
        None => format!("{}/search-json.php?game={}", base, game_type),
    }
}

/// `GET <base>/<game>/<fingerprint>.zip`
pub fn archive_url(base_url: &str, game_type: &str, fingerprint: &str) -> String {
    format!(
        "{}/{}/{}.zip",
        base_url.trim_end_matches('/'),
        game_type,
        fingerprint
    )
}

/// Catalog and archive access over HTTP with bounded timeouts.
pub struct HttpRepository {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpRepository {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: http::build_agent(timeout),
            base_url: base_url.to_string(),
        }
    }
}

impl MapRepository for HttpRepository {
    fn fetch_catalog(
        &self,
        game_type: &str,
        max_age_days: Option<u32>,
    ) -> Result<Vec<MapDescriptor>, Error> {
        let url = catalog_url(&self.base_url, game_type, max_age_days);
        debug!("Requesting catalog from {}", url);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| Error::CatalogUnavailable(http::describe_error(e)))?;
        let body = http::read_response_bytes(response, MAX_CATALOG_BYTES)
            .map_err(|e| Error::CatalogUnavailable(e.to_string()))?;
        parse_catalog(&body, Utc::now())
    }

    fn fetch_archive(&self, game_type: &str, fingerprint: &str) -> Result<Vec<u8>, Error> {
        let url = archive_url(&self.base_url, game_type, fingerprint);
        debug!("Requesting archive {}", url);
        let fetch_failed = |reason: String| Error::ArchiveFetchFailed {
            fingerprint: fingerprint.to_string(),
            reason,
        };
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| fetch_failed(http::describe_error(e)))?;
        http::read_response_bytes(response, MAX_ARCHIVE_BYTES).map_err(|e| fetch_failed(e.to_string()))
    }
}
