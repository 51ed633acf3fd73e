use thiserror::Error;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid timestamp setting: {0}")]
    Timestamp(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
