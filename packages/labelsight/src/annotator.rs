//! Fetch labels for an image and draw them onto a copy of it.
use crate::error::{Error, Result};
use crate::fetcher::{label_names, validate_threshold, LabelFetcher};
use crate::image_source::ImageSource;
use crate::overlay::{add_text_to_image, OverlayFont, OverlayStyle};
use image::RgbaImage;
use labelsight_detect::Label;
use std::path::Path;
use std::sync::Arc;

/// Separator placed between label names in the overlay text.
pub const LABEL_SEPARATOR: &str = " , ";

pub fn join_labels(names: &[String]) -> String {
  names.join(LABEL_SEPARATOR)
}

/// Result of annotating one image.
#[derive(Debug, Clone)]
pub struct Annotated {
  pub image: RgbaImage,
  /// Labels that made it into the overlay, in detector order.
  pub labels: Vec<Label>,
  /// The overlay text before wrapping.
  pub text: String,
}

impl Annotated {
  /// Writes the image; the format follows the file extension.
  pub fn save(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    self
      .image
      .save(path)
      .map_err(|e| Error::Render(format!("failed to save {}: {}", path.display(), e)))
  }
}

pub struct Annotator {
  fetcher: LabelFetcher,
  font: Arc<OverlayFont>,
  style: OverlayStyle,
}

impl Annotator {
  pub fn new(fetcher: LabelFetcher, font: OverlayFont, style: OverlayStyle) -> Self {
    Self {
      fetcher,
      font: Arc::new(font),
      style,
    }
  }

  pub fn style(&self) -> &OverlayStyle {
    &self.style
  }

  pub fn fetcher(&self) -> &LabelFetcher {
    &self.fetcher
  }

  /// Returns a copy of the image with the labels meeting `threshold` drawn on it.
  ///
  /// The image is resolved once; its bytes feed both the detector and the decoder.
  pub async fn label_image(&self, source: &ImageSource, threshold: f32) -> Result<Annotated> {
    let threshold = validate_threshold(threshold)?;
    let bytes = source.load(self.fetcher.loader()).await?;
    let labels = self.fetcher.labels_for_bytes(&bytes, threshold).await?;
    let text = join_labels(&label_names(&labels));

    log::info!("Annotating {} with {} labels", source, labels.len());
    let font = Arc::clone(&self.font);
    let style = self.style.clone();
    let reference = source.describe();
    let overlay_text = text.clone();

    let image = tokio::task::spawn_blocking(move || {
      let decoded = image::load_from_memory(&bytes).map_err(|e| Error::image_load(reference, e))?;
      Ok::<_, Error>(add_text_to_image(&decoded, &overlay_text, &style, &font))
    })
    .await
    .map_err(|e| Error::Render(format!("render task failed: {}", e)))??;

    Ok(Annotated {
      image,
      labels,
      text,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_join_labels() {
    let names = vec!["Water".to_string(), "Pool".to_string(), "Hot Tub".to_string()];
    assert_eq!(join_labels(&names), "Water , Pool , Hot Tub");
    assert_eq!(join_labels(&[]), "");
  }
}
