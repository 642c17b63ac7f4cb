use crate::store::CaptureStore;
use anyhow::{Context, Result};
use std::path::PathBuf;

fn default_name(ext: &str) -> String {
    let stamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "now".into());
    format!(
        "pokedex-collection-{}.{ext}",
        stamp.replace(':', "-").replace('T', "_")
    )
}

fn target(ext: &str) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("get current directory")?;
    Ok(current_dir.join(default_name(ext)))
}

/// Export the collection as JSON into the current directory.
/// Returns the absolute path of the exported file.
pub fn export_collection_json(store: &CaptureStore) -> Result<PathBuf> {
    let path = target("json")?;
    crate::storage::export_json(&path, store.user(), store.captured())?;
    Ok(path)
}

/// Export the collection as CSV into the current directory.
pub fn export_collection_csv(store: &CaptureStore) -> Result<PathBuf> {
    let path = target("csv")?;
    crate::storage::export_csv(&path, store.captured())?;
    Ok(path)
}
