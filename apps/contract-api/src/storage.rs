//! Upload persistence on the local filesystem

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use shared_types::hash_document;
use uuid::Uuid;

/// A contract file written to the upload folder
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: usize,
    pub sha256: String,
}

/// UUID-prefixed, sanitized name so uploads never collide or escape the folder
pub fn stored_filename(original: &str) -> String {
    let safe = sanitize_filename::sanitize(original);
    let safe = if safe.is_empty() {
        "upload".to_string()
    } else {
        safe
    };
    format!("{}_{}", Uuid::new_v4(), safe)
}

pub async fn save_upload(dir: &Path, original_name: &str, bytes: &[u8]) -> Result<StoredFile> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating upload folder {}", dir.display()))?;

    let path = dir.join(stored_filename(original_name));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    tracing::debug!("Stored {} bytes at {}", bytes.len(), path.display());

    Ok(StoredFile {
        path,
        size: bytes.len(),
        sha256: hash_document(bytes),
    })
}

/// Remove a stored upload; a file that is already gone is not an error
pub async fn remove_upload(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Upload already missing: {}", path.display());
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
    }
}
