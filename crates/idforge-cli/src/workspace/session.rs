use chrono::{DateTime, Utc};
use idforge_core::{GeneratedId, Scheme};
use idforge_export::atomic::write_json_atomic;
use serde::{Deserialize, Serialize};

use super::{WorkspaceError, WorkspacePaths, WorkspaceResult};

/// Last batch generated for a scheme, kept until cleared or replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBatch {
    pub scheme: Scheme,
    pub generated_at: DateTime<Utc>,
    pub items: Vec<GeneratedId>,
}

impl SessionBatch {
    pub fn new(scheme: Scheme, items: Vec<GeneratedId>) -> Self {
        Self {
            scheme,
            generated_at: Utc::now(),
            items,
        }
    }

    pub fn values(&self) -> Vec<String> {
        self.items.iter().map(|item| item.value.clone()).collect()
    }
}

pub fn load_session(paths: &WorkspacePaths, scheme: Scheme) -> WorkspaceResult<Option<SessionBatch>> {
    let path = paths.session_path(scheme);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    let batch: SessionBatch = serde_json::from_str(&content)?;
    if batch.scheme != scheme {
        return Err(WorkspaceError::Invalid(format!(
            "{} holds a {} batch",
            path.display(),
            batch.scheme
        )));
    }
    Ok(Some(batch))
}

pub fn save_session(paths: &WorkspacePaths, batch: &SessionBatch) -> WorkspaceResult<()> {
    write_json_atomic(&paths.session_path(batch.scheme), batch)?;
    Ok(())
}

/// Remove the stored batch. Returns whether one existed.
pub fn clear_session(paths: &WorkspacePaths, scheme: Scheme) -> WorkspaceResult<bool> {
    let path = paths.session_path(scheme);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path)?;
    Ok(true)
}
