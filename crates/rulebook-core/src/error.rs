use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Search index has not been built yet")]
    UninitializedIndex,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to load chapter {}: {reason}", path.display())]
    Chapter { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
