use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LakeError {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error(
        "Credentials not found at {}. Run: gcloud auth application-default login",
        path.display()
    )]
    MissingCredentials { path: PathBuf },

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Partition discovery failed: {0}")]
    Discovery(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),
}

pub type Result<T> = std::result::Result<T, LakeError>;
