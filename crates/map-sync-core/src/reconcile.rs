use crate::catalog::MapDescriptor;
use crate::fetch::naming;
use std::collections::HashSet;
use tracing::info;

/// Catalog entries missing locally, in catalog order, plus how many were
/// already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub new_maps: Vec<MapDescriptor>,
    pub skipped_count: usize,
}

/// Diff the catalog against local file names. A map is present when any local
/// name contains its fingerprint, compared in the sanitised form file names
/// carry.
pub fn reconcile<S: AsRef<str>>(catalog: Vec<MapDescriptor>, local_files: &[S]) -> Reconciliation {
    let tokens: HashSet<&str> = local_files
        .iter()
        .filter_map(|name| naming::extract_fingerprint(name.as_ref()))
        .collect();

    let total = catalog.len();
    let new_maps: Vec<MapDescriptor> = catalog
        .into_iter()
        .filter(|map| {
            let key = naming::on_disk_fingerprint(&map.fingerprint);
            !is_present(&key, &tokens, local_files)
        })
        .collect();
    let skipped_count = total - new_maps.len();

    info!(
        "Got {} maps, {} already present in the destination directory",
        total, skipped_count
    );
    if total > 0 && skipped_count == total {
        info!("No new files to download");
    }

    Reconciliation {
        new_maps,
        skipped_count,
    }
}

fn is_present<S: AsRef<str>>(fingerprint: &str, tokens: &HashSet<&str>, local_files: &[S]) -> bool {
    tokens.contains(fingerprint)
        || local_files
            .iter()
            .any(|name| name.as_ref().contains(fingerprint))
}
