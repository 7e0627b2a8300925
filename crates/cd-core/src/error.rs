use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoError {
    #[error("Placeholder handler already registered: {name}")]
    DuplicateHandler { name: String },
    #[error("User not found: {ident}")]
    UserNotFound { ident: String },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DecoError>;
