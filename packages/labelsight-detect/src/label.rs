use serde::{Deserialize, Serialize};

/// A single label reported for an image.
///
/// Field names serialize as `Name`/`Confidence`, the shape Rekognition uses,
/// so saved responses can be read back directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Label {
    pub name: String,
    /// Certainty in percent, 0 to 100.
    pub confidence: f32,
}

impl Label {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }

    /// Confidence rounded to a whole percent.
    pub fn rounded_confidence(&self) -> u32 {
        self.confidence.clamp(0.0, 100.0).round() as u32
    }

    pub fn meets(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}
