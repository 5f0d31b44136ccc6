use async_trait::async_trait;
use thiserror::Error;

use crate::label::Label;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("service error: {0}")]
    Service(String),
}

/// A backend that turns encoded image bytes into labels.
///
/// Implementations return labels in the order the backend reported them and
/// make a single request per call. `min_confidence` is the caller's threshold;
/// a backend may use it to drop labels early but must not apply a higher floor.
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect(&self, image: &[u8], min_confidence: f32) -> Result<Vec<Label>, DetectError>;
}
