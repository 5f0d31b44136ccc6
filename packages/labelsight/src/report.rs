use crate::error::{Error, Result};
use crate::fetcher::{label_names, DEFAULT_CONFIDENCE};
use crate::image_source::ImageSource;
use chrono::Utc;
use labelsight_detect::{Label, StaticDetector};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot of one detection run.
///
/// Besides files written by `labels --json`, raw `DetectLabels` responses
/// (with a top-level `Labels` array) load as reports too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelReport {
    #[serde(default)]
    pub image: String,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub generated_at: String,
    #[serde(alias = "Labels")]
    pub labels: Vec<Label>,
}

fn default_threshold() -> f32 {
    DEFAULT_CONFIDENCE
}

impl LabelReport {
    pub fn new(source: &ImageSource, threshold: f32, labels: Vec<Label>) -> Self {
        Self {
            image: source.describe(),
            threshold,
            generated_at: Utc::now().to_rfc3339(),
            labels,
        }
    }

    pub fn names(&self) -> Vec<String> {
        label_names(&self.labels)
    }

    /// A detector that replays these labels.
    pub fn detector(&self) -> StaticDetector {
        StaticDetector::new(self.labels.clone())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Render(format!("failed to serialize label report: {}", e)))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&contents)
            .map_err(|e| config_error(format!("invalid label report: {}", e)))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}
