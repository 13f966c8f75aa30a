//! Error types for the notice pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::content::FrontMatterError;

/// Errors raised while loading, parsing or normalizing notices
#[derive(Error, Debug)]
pub enum NoticeError {
    #[error("Notice not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed front-matter in {filename}: {source}")]
    MalformedFrontMatter {
        filename: String,
        #[source]
        source: FrontMatterError,
    },

    #[error("Invalid {field} value {value:?} in {filename}")]
    InvalidField {
        filename: String,
        field: &'static str,
        value: String,
    },

    #[error("Notice task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl NoticeError {
    /// Whether the error concerns the content of a single document, as opposed
    /// to the file system or the runtime
    pub fn is_document_fault(&self) -> bool {
        matches!(
            self,
            NoticeError::MalformedFrontMatter { .. } | NoticeError::InvalidField { .. }
        )
    }
}

pub type Result<T, E = NoticeError> = std::result::Result<T, E>;
