use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use wfr_core::{drop_nulls, Message};

use crate::config::NormalizerConfig;
use crate::http::{HttpClient, HttpError, HttpRequest};

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("normalizer request failed: {0}")]
    Http(#[from] HttpError),
    #[error("normalizer returned HTTP {status}")]
    Status { status: u16 },
    #[error("normalizer returned an unusable body: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(serde::Deserialize)]
struct Normalized {
    message: Message,
}

/// Rewrites provider messages through an external identifier normalization service.
#[derive(Clone)]
pub struct Normalizer {
    http: Arc<dyn HttpClient>,
    config: NormalizerConfig,
    max_response_bytes: usize,
}

impl Normalizer {
    pub fn new(http: Arc<dyn HttpClient>, config: NormalizerConfig, max_response_bytes: usize) -> Self {
        Self {
            http,
            config,
            max_response_bytes,
        }
    }

    pub async fn normalize(&self, message: &Message) -> Result<Message, NormalizeError> {
        let body = json!({ "message": message });
        let resp = self
            .http
            .send(
                HttpRequest::post_json(self.config.url.clone(), &body),
                self.config.timeout,
                self.max_response_bytes,
            )
            .await?;
        if !resp.is_success() {
            return Err(NormalizeError::Status {
                status: resp.status,
            });
        }
        let value: JsonValue = serde_json::from_slice(&resp.body)?;
        let normalized: Normalized = serde_json::from_value(drop_nulls(value))?;
        Ok(normalized.message)
    }
}
