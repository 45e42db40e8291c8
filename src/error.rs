use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunvisError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RunvisError>;
