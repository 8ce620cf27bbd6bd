use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config parse error: {0}")]
    Config(String),
    #[error("Shape table line {line}: {reason}")]
    ShapeTable { line: usize, reason: String },
}
