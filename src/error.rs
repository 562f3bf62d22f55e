use thiserror::Error;

#[derive(Error, Debug)]
pub enum DisorderError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config Read Error at '{path}': {reason}")]
    ConfigRead { path: String, reason: String },

    #[error("Malformed Disorder Spec: {0}")]
    MalformedDisorderSpec(String),

    #[error("Index Out Of Range: {what} index {index} outside [0, {bound})")]
    IndexOutOfRange {
        what: &'static str,
        index: i64,
        bound: usize,
    },

    #[error("Geometry Error: {0}")]
    Geometry(String),

    #[error("Stage '{stage}' failed: {reason}")]
    Stage { stage: String, reason: String },

    #[error("Replica {replica} panicked: {reason}")]
    ReplicaPanicked { replica: usize, reason: String },

    #[error("Thread Pool Error: {0}")]
    ThreadPool(String),
}

impl DisorderError {
    pub fn config_read(path: &str, reason: impl Into<String>) -> Self {
        Self::ConfigRead {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    /// True for faults caused by an inconsistent disorder declaration.
    /// An out-of-range orbital index counts as one.
    pub fn is_malformed_spec(&self) -> bool {
        matches!(
            self,
            Self::MalformedDisorderSpec(_) | Self::IndexOutOfRange { .. }
        )
    }
}

pub type DisResult<T> = Result<T, DisorderError>;
