mod resources;
mod source;

pub use resources::{load_tree_from_sources, DefinitionTree};
pub use source::{load_resources_dir, read_sources_from_dir};

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    ParseJson {
        path: String,
        source: serde_json::Error,
    },
    #[error("Resources directory does not exist: {path}")]
    NotFound { path: PathBuf },
    #[error("Resources path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
    #[error("No .json files under {path}.")]
    SourceEmpty { path: PathBuf },
    #[error("Failed to scan {path}: {message}")]
    Scan { path: PathBuf, message: String },
    #[error(transparent)]
    Definition(#[from] sc_core::DefinitionError),
}

impl LoaderError {
    /// Stable code for CLI output, mirroring `DefinitionError::code`.
    pub fn code(&self) -> &str {
        match self {
            Self::ReadFile { .. } => "LOADER_READ_FILE",
            Self::ParseJson { .. } => "LOADER_PARSE_JSON",
            Self::NotFound { .. } => "LOADER_NOT_FOUND",
            Self::NotADirectory { .. } => "LOADER_NOT_DIR",
            Self::SourceEmpty { .. } => "LOADER_SOURCE_EMPTY",
            Self::Scan { .. } => "LOADER_SCAN",
            Self::Definition(error) => &error.code,
        }
    }
}
