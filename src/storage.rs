//! On-disk persistence for the capture store, plus collection exports.

use crate::model::{CapturedEntity, User};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const APP_DIR: &str = "pokedex-cli";
const STATE_FILE: &str = "pokemon-auth-storage.json";

/// Everything that survives a restart. Field names match the JSON payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub captured_pokemon: Vec<CapturedEntity>,
}

pub fn default_state_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("could not determine a data directory")?;
    Ok(base.join(APP_DIR).join(STATE_FILE))
}

/// Read the persisted state. A missing file is a fresh start; an unreadable
/// or structurally incompatible one is treated the same way.
pub fn load_state(path: &Path) -> PersistedState {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return PersistedState::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "could not read state file; starting empty");
            return PersistedState::default();
        }
    };
    match serde_json::from_slice::<PersistedState>(&bytes) {
        Ok(state) => {
            debug!(
                path = %path.display(),
                captured = state.captured_pokemon.len(),
                "state loaded"
            );
            state
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "incompatible state file; starting empty");
            PersistedState::default()
        }
    }
}

/// Write the state via a temp file and rename so a crash never leaves a
/// half-written payload behind.
pub fn save_state(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create state dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(state).context("serialize state")?;
    std::fs::write(&tmp, data).with_context(|| format!("write {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}

#[derive(Serialize)]
struct CollectionExport<'a> {
    exported_at: String,
    trainer: Option<&'a str>,
    count: usize,
    pokemon: &'a [CapturedEntity],
}

pub fn export_json(path: &Path, trainer: Option<&User>, captured: &[CapturedEntity]) -> Result<()> {
    let doc = CollectionExport {
        exported_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        trainer: trainer.map(|u| u.name.as_str()),
        count: captured.len(),
        pokemon: captured,
    };
    let data = serde_json::to_vec_pretty(&doc).context("serialize collection")?;
    std::fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn export_csv(path: &Path, captured: &[CapturedEntity]) -> Result<()> {
    let mut out = String::from("id,name,types,image_url\n");
    for p in captured {
        out.push_str(&format!(
            "{},{},{},{}\n",
            p.id,
            csv_field(&p.name),
            csv_field(&p.types.join("|")),
            csv_field(&p.image_url)
        ));
    }
    std::fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
