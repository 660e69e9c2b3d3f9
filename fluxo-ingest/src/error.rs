use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Page numbers are 1-based.
    #[error("could not decode page {page} of the statement: {reason}")]
    Decode { page: usize, reason: String },

    /// The decoder rejected the file before any page was read.
    #[error("could not open statement document: {0}")]
    Document(String),

    #[error("unsupported statement file: {0}")]
    UnsupportedFile(String),

    #[error("invalid statement profile: {0}")]
    Profile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed text-layer dump: {0}")]
    Json(#[from] serde_json::Error),
}

impl IngestError {
    /// True when the file itself could not be read, as opposed to a
    /// configuration or file-kind problem.
    pub fn is_unreadable(&self) -> bool {
        matches!(
            self,
            Self::Decode { .. } | Self::Document(_) | Self::Io(_) | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
