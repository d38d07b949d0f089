use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two ways an authored definition can be wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The authored shape is wrong for its type.
    MalformedDefinition,
    /// The shape is fine but the combination of fields contradicts itself.
    DefinitionConflict,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedDefinition => f.write_str("MalformedDefinition"),
            Self::DefinitionConflict => f.write_str("DefinitionConflict"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}:{code}: {message}")]
pub struct DefinitionError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl DefinitionError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn malformed(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedDefinition, code, message)
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DefinitionConflict, code, message)
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == ErrorKind::DefinitionConflict
    }
}
