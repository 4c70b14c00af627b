use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebscanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Scan submission failed: {0}")]
    Submission(String),

    #[error("Poll transport failure: {0}")]
    PollTransport(String),

    #[error("Rendering error: {0}")]
    Rendering(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
