//! JSON account store: an array of account records on disk

use std::path::Path;

use account_eraser_app::adapters::{AccountRecord, InMemoryAccountDirectory};
use anyhow::{Context, Result};

/// Load the records in `path` into a fresh directory
pub fn load(path: &Path, gpg_enabled: bool) -> Result<InMemoryAccountDirectory> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read account store {}", path.display()))?;
    let records: Vec<AccountRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse account store {}", path.display()))?;
    tracing::debug!("Loaded {} accounts from {}", records.len(), path.display());
    Ok(InMemoryAccountDirectory::with_records(gpg_enabled, records))
}

/// Write the directory back to `path`
pub async fn save(path: &Path, directory: &InMemoryAccountDirectory) -> Result<()> {
    let records = directory.records().await;
    let raw = serde_json::to_string_pretty(&records)?;
    std::fs::write(path, raw)
        .with_context(|| format!("Failed to write account store {}", path.display()))?;
    Ok(())
}
