use async_trait::async_trait;

use crate::engine::{DetectError, LabelDetector};
use crate::label::Label;

/// Detector that answers every request with the same label list.
///
/// Used to replay a saved detection run without touching the network. The
/// confidence floor is ignored; callers filter the replayed labels themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    labels: Vec<Label>,
}

impl StaticDetector {
    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

#[async_trait]
impl LabelDetector for StaticDetector {
    async fn detect(&self, image: &[u8], _min_confidence: f32) -> Result<Vec<Label>, DetectError> {
        if image.is_empty() {
            return Err(DetectError::InvalidInput("image payload is empty".into()));
        }
        Ok(self.labels.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_labels_in_order() {
        let detector = StaticDetector::new(vec![
            Label::new("Water", 99.1),
            Label::new("Pool", 98.7),
            Label::new("Water", 60.0),
        ]);
        let labels = detector.detect(b"not-empty", 0.0).await.unwrap();
        let names: Vec<_> = labels.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Water", "Pool", "Water"]);
    }

    #[tokio::test]
    async fn test_rejects_empty_payload() {
        let detector = StaticDetector::default();
        let err = detector.detect(&[], 0.0).await.unwrap_err();
        assert!(matches!(err, DetectError::InvalidInput(_)));
    }
}
