use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FuseError>;

/// Failures at the request boundary. The fusion engine itself never fails.
#[derive(Error, Debug)]
pub enum FuseError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("could not read screenshot: {0}")]
    Image(#[from] image::ImageError),
}

impl FuseError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FuseError::Io {
            path: path.into(),
            source,
        }
    }
}
