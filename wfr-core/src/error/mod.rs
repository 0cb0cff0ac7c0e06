use thiserror::Error;

/// Failure to read a query document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("query document is empty")]
    Empty,
    #[error("query is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("query is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
