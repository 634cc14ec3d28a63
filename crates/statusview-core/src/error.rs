use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatusviewError {
    #[error("invalid projects data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
