mod paths;
mod session;
mod settings;

pub use paths::WorkspacePaths;
pub use session::{SessionBatch, clear_session, load_session, save_session};
pub use settings::{Preferences, load_or_create_preferences, save_preferences};

use std::io;

use idforge_export::ExportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("write error: {0}")]
    Write(#[from] ExportError),
    #[error("invalid workspace state: {0}")]
    Invalid(String),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
