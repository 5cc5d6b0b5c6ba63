use std::path::Path;

use idforge_core::GeneratedId;

use crate::atomic::write_bytes_atomic;
use crate::errors::ExportError;

pub fn write_batch_json(path: &Path, items: &[GeneratedId]) -> Result<u64, ExportError> {
    let data = serde_json::to_vec_pretty(items)?;
    write_bytes_atomic(path, &data)?;
    Ok(data.len() as u64)
}
