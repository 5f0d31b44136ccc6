//! Confidence-filtered label retrieval.
//!
//! The fetcher resolves an image reference, makes one detector call and keeps the
//! labels whose confidence reaches the threshold, in the order the detector
//! returned them.

use crate::error::{Error, Result};
use crate::image_source::{ImageLoader, ImageSource};
use labelsight_detect::{Label, LabelDetector};
use std::sync::Arc;

/// Threshold used when the caller does not pick one.
pub const DEFAULT_CONFIDENCE: f32 = 50.0;

/// Rejects thresholds outside `0..=100` (and NaN).
pub fn validate_threshold(threshold: f32) -> Result<f32> {
    if (0.0..=100.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(Error::InvalidThreshold(threshold))
    }
}

/// Keeps labels with `confidence >= threshold`, preserving order and duplicates.
pub fn filter_by_confidence(labels: &[Label], threshold: f32) -> Vec<Label> {
    labels
        .iter()
        .filter(|label| label.meets(threshold))
        .cloned()
        .collect()
}

pub fn label_names(labels: &[Label]) -> Vec<String> {
    labels.iter().map(|label| label.name.clone()).collect()
}

#[derive(Clone)]
pub struct LabelFetcher {
    detector: Arc<dyn LabelDetector>,
    loader: ImageLoader,
}

impl LabelFetcher {
    pub fn new(detector: Arc<dyn LabelDetector>, loader: ImageLoader) -> Self {
        Self { detector, loader }
    }

    pub fn loader(&self) -> &ImageLoader {
        &self.loader
    }

    /// Names of the labels meeting `threshold`.
    pub async fn get_labels(&self, source: &ImageSource, threshold: f32) -> Result<Vec<String>> {
        let labels = self.fetch_labels(source, threshold).await?;
        Ok(label_names(&labels))
    }

    /// Like [`get_labels`](Self::get_labels) but keeps the confidence values.
    pub async fn fetch_labels(&self, source: &ImageSource, threshold: f32) -> Result<Vec<Label>> {
        let threshold = validate_threshold(threshold)?;
        let bytes = source.load(&self.loader).await?;
        self.labels_for_bytes(&bytes, threshold).await
    }

    /// Detects and filters labels for an already loaded image.
    ///
    /// The threshold is also handed to the detector as its confidence floor.
    pub async fn labels_for_bytes(&self, bytes: &[u8], threshold: f32) -> Result<Vec<Label>> {
        let threshold = validate_threshold(threshold)?;
        let labels = self.detector.detect(bytes, threshold).await?;
        let kept = filter_by_confidence(&labels, threshold);
        log::info!(
            "{} of {} labels at or above {}% confidence",
            kept.len(),
            labels.len(),
            threshold
        );
        Ok(kept)
    }
}
