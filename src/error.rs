use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("profile store {} is malformed: {source}", path.display())]
    MalformedDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("a profile named '{0}' already exists")]
    DuplicateName(String),

    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("source folder is missing: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("the game mods folder is missing: {}", .0.display())]
    LiveModsMissing(PathBuf),

    #[error("copy from {} to {} failed: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid profile name: {0}")]
    InvalidName(String),

    #[error("the game folders are not configured yet")]
    SettingsUnset,

    #[error("failed to launch the game: {0}")]
    Launch(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
