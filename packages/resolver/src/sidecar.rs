//! Per-complex metadata sidecar.
//!
//! The complex resolver learns two facts other resolvers need later:
//! the legal division code (whose five-digit prefix keys the
//! government transaction API) and the construction company. They are
//! persisted as a small JSON file under the complex's cache directory,
//! written once and read-only afterwards — the only intentional
//! cross-resolver shared state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Sidecar file name under the per-complex directory.
const SIDECAR_FILE: &str = "meta.json";

/// The persisted metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplexSidecar {
    #[serde(default)]
    pub legal_division_code: String,
    #[serde(default)]
    pub construction_company: String,
}

impl ComplexSidecar {
    /// Five-digit legal-division prefix used as `LAWD_CD`, when the
    /// stored code is long enough.
    #[must_use]
    pub fn lawd_cd(&self) -> Option<&str> {
        self.legal_division_code.get(..5).filter(|s| s.len() == 5)
    }
}

/// Sidecar path for a complex id.
#[must_use]
pub fn sidecar_path(work_dir: &Path, complex_id: &str) -> PathBuf {
    work_dir.join(complex_id).join(SIDECAR_FILE)
}

/// Writes the sidecar unless one already exists (write-once
/// semantics). Returns `true` when this call created the file.
pub fn write_once(work_dir: &Path, complex_id: &str, sidecar: &ComplexSidecar) -> bool {
    let path = sidecar_path(work_dir, complex_id);
    if path.exists() {
        log::debug!("sidecar already present for {complex_id}");
        return false;
    }

    let result = path
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| {
            let json = serde_json::to_string_pretty(sidecar)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            std::fs::write(&path, json)
        });

    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("sidecar write failed for {complex_id}: {e}");
            false
        }
    }
}

/// Reads the sidecar, if one was written.
#[must_use]
pub fn read(work_dir: &Path, complex_id: &str) -> Option<ComplexSidecar> {
    let path = sidecar_path(work_dir, complex_id);
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(sidecar) => Some(sidecar),
        Err(e) => {
            log::warn!("sidecar unreadable for {complex_id}: {e}");
            None
        }
    }
}
