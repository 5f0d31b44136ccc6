//! Persistent settings for the CLI.
//!
//! Every section falls back to its defaults, so a settings file only needs the
//! values it changes. Command line flags are applied on top.

use crate::annotator::Annotator;
use crate::credentials::CredentialSource;
use crate::error::{Error, Result};
use crate::fetcher::{validate_threshold, LabelFetcher, DEFAULT_CONFIDENCE};
use crate::image_source::ImageLoader;
use crate::overlay::{OverlayFont, OverlayStyle};
use crate::report::LabelReport;
use labelsight_detect::{LabelDetector, RekognitionOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Detection request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Minimum confidence (percent) for a label to be kept.
    pub threshold: f32,
    /// AWS region; the SDK's region chain is used when unset.
    pub region: Option<String>,
    /// Timeout applied to the detection call and to image downloads.
    pub timeout_secs: u64,
    /// Attempts per detection call; `1` means no retry.
    pub max_attempts: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE,
            region: None,
            timeout_secs: 30,
            max_attempts: 1,
        }
    }
}

impl DetectionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rekognition_options(&self) -> RekognitionOptions {
        RekognitionOptions {
            region: self.region.clone(),
            timeout: self.timeout(),
            max_attempts: self.max_attempts.max(1),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSettings {
    /// Font file; well-known system fonts are tried when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Images annotated at the same time.
    pub concurrency: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detection: DetectionSettings,
    pub overlay: OverlayStyle,
    pub font: FontSettings,
    pub credentials: CredentialSource,
    pub batch: BatchSettings,
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        let settings: Settings =
            serde_json::from_str(&contents).map_err(|e| config_error(e.to_string()))?;
        settings.validate().map_err(|e| config_error(e.to_string()))?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize settings to disk in pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload = serde_json::to_string_pretty(self).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.detection.threshold)?;
        let invalid = |reason: &str| {
            Err(Error::Config {
                path: PathBuf::from("<settings>"),
                reason: reason.to_string(),
            })
        };
        if self.overlay.columns == 0 {
            return invalid("overlay.columns must be at least 1");
        }
        if self.overlay.font_size.is_nan() || self.overlay.font_size <= 0.0 {
            return invalid("overlay.font_size must be positive");
        }
        if self.batch.concurrency == 0 {
            return invalid("batch.concurrency must be at least 1");
        }
        Ok(())
    }

    /// Builds the label fetcher: replaying `replay` when given, calling Rekognition otherwise.
    pub async fn fetcher(&self, replay: Option<&LabelReport>) -> Result<LabelFetcher> {
        let loader = ImageLoader::new(self.detection.timeout())?;
        let detector: Arc<dyn LabelDetector> = match replay {
            Some(report) => {
                log::info!("Replaying {} saved labels", report.labels.len());
                Arc::new(report.detector())
            }
            None => Arc::new(
                self.credentials
                    .detector(self.detection.rekognition_options())
                    .await,
            ),
        };
        Ok(LabelFetcher::new(detector, loader))
    }

    /// Builds an annotator; fails with a render error when the font cannot be loaded.
    pub async fn annotator(&self, replay: Option<&LabelReport>) -> Result<Annotator> {
        let font = OverlayFont::load(self.font.path.as_deref())?;
        let fetcher = self.fetcher(replay).await?;
        Ok(Annotator::new(fetcher, font, self.overlay.clone()))
    }
}
