pub mod csv;
pub mod json;

use std::path::Path;

use idforge_core::GeneratedId;

use crate::errors::ExportError;

/// Batch file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// Pick the format from a file extension, defaulting to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

/// Write `items` to `path` in the format implied by its extension.
/// Returns the number of bytes written.
pub fn write_batch(path: &Path, items: &[GeneratedId]) -> Result<u64, ExportError> {
    let bytes = match OutputFormat::from_path(path) {
        OutputFormat::Csv => csv::write_batch_csv(path, items)?,
        OutputFormat::Json => json::write_batch_json(path, items)?,
    };
    tracing::info!(event = "batch_written", path = %path.display(), items = items.len(), bytes);
    Ok(bytes)
}
