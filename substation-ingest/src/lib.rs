//! substation-ingest: load the operations dataset from a SQL seed script or a JSON dump.

pub mod sql;

pub use sql::{parse_sql_seed, IngestError};

use std::path::Path;

use anyhow::{bail, Context, Result};
use substation_core::Dataset;
use tracing::info;

/// Load a dataset from `.sql` (seed script) or `.json` (serialized `Dataset`).
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;

    let dataset = match ext.as_str() {
        "sql" => parse_sql_seed(&text)
            .with_context(|| format!("Failed to parse SQL seed {}", path.display()))?,
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON dataset {}", path.display()))?,
        other => bail!(
            "Unsupported dataset format '{}' for {} (expected .sql or .json)",
            other,
            path.display()
        ),
    };

    let rows: usize = dataset.table_counts().iter().map(|(_, n)| n).sum();
    info!(path = %path.display(), rows, "loaded dataset");
    Ok(dataset)
}
