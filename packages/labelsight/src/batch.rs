//! Annotating every image in a directory tree.
use crate::annotator::Annotator;
use crate::error::Result;
use crate::image_source::ImageSource;
use chrono::Utc;
use labelsight_detect::Label;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use walkdir::WalkDir;

/// File extensions picked up by [`collect_images`].
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];

/// Suffix added to the stem of every annotated file.
pub const OUTPUT_SUFFIX: &str = "_labelled";

/// Name of the JSON summary written next to the annotated images.
pub const SUMMARY_FILE: &str = "labels.json";

pub struct BatchOptions {
  pub input_dir: PathBuf,
  pub output_dir: PathBuf,
  pub threshold: f32,
  /// Maximum number of images processed concurrently
  pub concurrency: usize,
}

/// Outcome for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
  pub image: String,
  pub output: Option<String>,
  pub labels: Vec<Label>,
  pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
  pub generated_at: String,
  pub threshold: f32,
  pub total: usize,
  pub annotated: usize,
  pub failed: usize,
  pub results: Vec<BatchEntry>,
}

/// Image files under `dir`, sorted, skipping files this tool produced.
pub fn collect_images(dir: &Path) -> Vec<PathBuf> {
  let mut images: Vec<PathBuf> = WalkDir::new(dir)
    .into_iter()
    .filter_map(|e| e.ok())
    .filter(|entry| entry.file_type().is_file())
    .map(|entry| entry.into_path())
    .filter(|path| is_image(path) && !is_output(path))
    .collect();
  images.sort();
  images
}

fn is_image(path: &Path) -> bool {
  path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
    .unwrap_or(false)
}

fn is_output(path: &Path) -> bool {
  path
    .file_stem()
    .and_then(|s| s.to_str())
    .map(|s| s.ends_with(OUTPUT_SUFFIX))
    .unwrap_or(false)
}

/// `<output_dir>/<dir>/<stem>_labelled.png`, `<dir>` being the image's directory under `input_dir`.
pub fn output_path(input_dir: &Path, output_dir: &Path, image: &Path) -> PathBuf {
  output_dir
    .join(relative_dir(input_dir, image))
    .join(format!("{}{}.png", file_stem(image), OUTPUT_SUFFIX))
}

/// Output paths for `images`, one per image and never shared.
///
/// Images whose default output would collide (`a.png` and `a.jpg`) keep their
/// extension in the name; anything still clashing gets a counter.
pub fn plan_outputs(input_dir: &Path, output_dir: &Path, images: &[PathBuf]) -> Vec<PathBuf> {
  let defaults: Vec<PathBuf> = images
    .iter()
    .map(|image| output_path(input_dir, output_dir, image))
    .collect();
  let mut counts: HashMap<&Path, usize> = HashMap::new();
  for path in &defaults {
    *counts.entry(path.as_path()).or_default() += 1;
  }

  let mut taken: HashSet<PathBuf> = HashSet::new();
  let mut outputs = Vec::with_capacity(images.len());
  for (image, default) in images.iter().zip(&defaults) {
    let stem = file_stem(image);
    let ext = image.extension().and_then(|e| e.to_str()).unwrap_or("");
    let with_ext = default.with_file_name(format!("{}_{}{}.png", stem, ext, OUTPUT_SUFFIX));

    let mut candidate = if counts[default.as_path()] > 1 {
      with_ext.clone()
    } else {
      default.clone()
    };
    if taken.contains(&candidate) {
      candidate = with_ext;
    }
    let mut n = 2;
    while taken.contains(&candidate) {
      let name = format!("{}_{}_{}{}.png", stem, ext, n, OUTPUT_SUFFIX);
      candidate = default.with_file_name(name);
      n += 1;
    }
    taken.insert(candidate.clone());
    outputs.push(candidate);
  }
  outputs
}

fn file_stem(image: &Path) -> &str {
  image
    .file_stem()
    .and_then(|s| s.to_str())
    .unwrap_or("image")
}

fn relative_dir<'a>(input_dir: &Path, image: &'a Path) -> &'a Path {
  image
    .strip_prefix(input_dir)
    .ok()
    .and_then(Path::parent)
    .unwrap_or_else(|| Path::new(""))
}

/// Annotates every image under `options.input_dir`.
///
/// Per-image failures are logged and recorded in the summary; they do not stop the run.
pub async fn annotate_directory(
  annotator: Arc<Annotator>,
  options: &BatchOptions,
) -> Result<BatchSummary> {
  let images = collect_images(&options.input_dir);
  let outputs = plan_outputs(&options.input_dir, &options.output_dir, &images);
  tokio::fs::create_dir_all(&options.output_dir).await?;

  log::info!(
    "Annotating {} images from {} with max {} concurrent",
    images.len(),
    options.input_dir.display(),
    options.concurrency
  );

  let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));
  let total = images.len();
  let mut tasks = Vec::new();

  for (index, (image, output)) in images.into_iter().zip(outputs).enumerate() {
    let semaphore = semaphore.clone();
    let annotator = annotator.clone();
    let threshold = options.threshold;
    let task_image = image.clone();

    let task = tokio::spawn(async move {
      let image = task_image;
      let _permit = semaphore.acquire_owned().await;
      log::info!("Processing image {}/{}: {}", index + 1, total, image.display());

      let source = ImageSource::Path(image.clone());
      let result = match annotator.label_image(&source, threshold).await {
        Ok(annotated) => annotated.save(&output).map(|_| annotated.labels),
        Err(e) => Err(e),
      };

      match result {
        Ok(labels) => BatchEntry {
          image: image.display().to_string(),
          output: Some(output.display().to_string()),
          labels,
          error: None,
        },
        Err(e) => {
          log::warn!("Failed to annotate {}: {}", image.display(), e);
          BatchEntry {
            image: image.display().to_string(),
            output: None,
            labels: Vec::new(),
            error: Some(e.to_string()),
          }
        }
      }
    });
    tasks.push((image, task));
  }

  let mut results = Vec::with_capacity(total);
  for (image, task) in tasks {
    match task.await {
      Ok(entry) => results.push(entry),
      Err(e) => {
        log::error!("Task join error for {}: {}", image.display(), e);
        results.push(BatchEntry {
          image: image.display().to_string(),
          output: None,
          labels: Vec::new(),
          error: Some(format!("annotation task failed: {}", e)),
        });
      }
    }
  }

  let failed = results.iter().filter(|r| r.error.is_some()).count();
  let summary = BatchSummary {
    generated_at: Utc::now().to_rfc3339(),
    threshold: options.threshold,
    total,
    annotated: results.len() - failed,
    failed,
    results,
  };

  let summary_path = options.output_dir.join(SUMMARY_FILE);
  let json = serde_json::to_string_pretty(&summary)
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
  tokio::fs::write(&summary_path, json).await?;
  log::info!(
    "Annotated {}/{} images; summary at {}",
    summary.annotated,
    summary.total,
    summary_path.display()
  );

  Ok(summary)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_collect_images_filters_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir_all(&nested).unwrap();
    for name in ["b.JPG", "a.png", "notes.txt", "a_labelled.png"] {
      std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    std::fs::write(nested.join("c.webp"), b"x").unwrap();

    let found: Vec<String> = collect_images(dir.path())
      .iter()
      .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
      .collect();
    assert_eq!(found, ["a.png", "b.JPG", "nested/c.webp"]);
  }

  #[tokio::test]
  async fn test_annotate_directory_counts_failures() {
    use crate::fetcher::LabelFetcher;
    use crate::image_source::ImageLoader;
    use crate::overlay::{OverlayFont, OverlayStyle};
    use labelsight_detect::StaticDetector;
    use std::time::Duration;

    let font = match OverlayFont::discover() {
      Ok(font) => font,
      Err(_) => {
        eprintln!("skipping test: no system font found");
        return;
      }
    };
    let detector = Arc::new(StaticDetector::new(vec![
      Label::new("Water", 99.4),
      Label::new("Villa", 47.3),
    ]));
    let fetcher = LabelFetcher::new(detector, ImageLoader::new(Duration::from_secs(5)).unwrap());
    let annotator = Arc::new(Annotator::new(fetcher, font, OverlayStyle::default()));

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    image::RgbImage::from_pixel(64, 48, image::Rgb([10, 20, 30]))
      .save(input.path().join("good.png"))
      .unwrap();
    std::fs::write(input.path().join("broken.jpg"), b"not an image").unwrap();

    let options = BatchOptions {
      input_dir: input.path().to_path_buf(),
      output_dir: output.path().to_path_buf(),
      threshold: 50.0,
      concurrency: 2,
    };
    let summary = annotate_directory(annotator, &options).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.annotated, 1);
    assert_eq!(summary.failed, 1);
    assert!(output.path().join("good_labelled.png").is_file());
    assert!(output.path().join(SUMMARY_FILE).is_file());

    let good = summary.results.iter().find(|r| r.error.is_none()).unwrap();
    assert_eq!(good.labels, vec![Label::new("Water", 99.4)]);
  }

  #[tokio::test]
  async fn test_annotate_directory_keeps_same_named_images_apart() {
    use crate::fetcher::LabelFetcher;
    use crate::image_source::ImageLoader;
    use crate::overlay::{OverlayFont, OverlayStyle};
    use labelsight_detect::StaticDetector;
    use std::time::Duration;

    let font = match OverlayFont::discover() {
      Ok(font) => font,
      Err(_) => {
        eprintln!("skipping test: no system font found");
        return;
      }
    };
    let detector = Arc::new(StaticDetector::new(vec![Label::new("Pool", 99.0)]));
    let fetcher = LabelFetcher::new(detector, ImageLoader::new(Duration::from_secs(5)).unwrap());
    let annotator = Arc::new(Annotator::new(fetcher, font, OverlayStyle::default()));

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(input.path().join("sub")).unwrap();
    let pixels = image::RgbImage::from_pixel(32, 24, image::Rgb([90, 90, 90]));
    for name in ["pool.png", "pool.jpg", "sub/pool.jpg"] {
      pixels.save(input.path().join(name)).unwrap();
    }

    let options = BatchOptions {
      input_dir: input.path().to_path_buf(),
      output_dir: output.path().to_path_buf(),
      threshold: 50.0,
      concurrency: 3,
    };
    let summary = annotate_directory(annotator, &options).await.unwrap();
    assert_eq!(summary.annotated, 3);

    let outputs: HashSet<String> = summary
      .results
      .iter()
      .filter_map(|r| r.output.clone())
      .collect();
    assert_eq!(outputs.len(), 3);
    for name in ["pool_jpg_labelled.png", "pool_png_labelled.png", "sub/pool_labelled.png"] {
      assert!(output.path().join(name).is_file(), "{} missing", name);
    }
  }

  #[tokio::test]
  async fn test_annotate_directory_records_panicked_tasks() {
    use crate::fetcher::LabelFetcher;
    use crate::image_source::ImageLoader;
    use crate::overlay::{OverlayFont, OverlayStyle};
    use async_trait::async_trait;
    use labelsight_detect::{DetectError, LabelDetector};
    use std::time::Duration;

    struct PanickingDetector;

    #[async_trait]
    impl LabelDetector for PanickingDetector {
      async fn detect(
        &self,
        _image: &[u8],
        _min_confidence: f32,
      ) -> std::result::Result<Vec<Label>, DetectError> {
        panic!("detector crashed");
      }
    }

    let font = match OverlayFont::discover() {
      Ok(font) => font,
      Err(_) => {
        eprintln!("skipping test: no system font found");
        return;
      }
    };
    let fetcher = LabelFetcher::new(
      Arc::new(PanickingDetector),
      ImageLoader::new(Duration::from_secs(5)).unwrap(),
    );
    let annotator = Arc::new(Annotator::new(fetcher, font, OverlayStyle::default()));

    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    image::RgbImage::from_pixel(16, 16, image::Rgb([0, 0, 0]))
      .save(input.path().join("pool.png"))
      .unwrap();

    let options = BatchOptions {
      input_dir: input.path().to_path_buf(),
      output_dir: output.path().to_path_buf(),
      threshold: 50.0,
      concurrency: 1,
    };
    let summary = annotate_directory(annotator, &options).await.unwrap();

    assert_eq!(summary.total, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.results.len(), 1);
    let entry = &summary.results[0];
    assert!(entry.image.ends_with("pool.png"));
    assert!(entry.error.as_deref().unwrap().starts_with("annotation task failed"));
  }

  #[test]
  fn test_output_path_mirrors_input_tree() {
    let out = output_path(Path::new("photos"), Path::new("out"), Path::new("photos/pool.jpeg"));
    assert_eq!(out, PathBuf::from("out/pool_labelled.png"));
    let out = output_path(
      Path::new("photos"),
      Path::new("out"),
      Path::new("photos/2024/pool.jpeg"),
    );
    assert_eq!(out, PathBuf::from("out/2024/pool_labelled.png"));
  }

  #[test]
  fn test_plan_outputs_never_shares_a_file() {
    let input = Path::new("in");
    let images: Vec<PathBuf> = [
      "in/a.jpg",
      "in/a.png",
      "in/a_png.jpg",
      "in/b.png",
      "in/sub/a.png",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    let outputs = plan_outputs(input, Path::new("out"), &images);

    assert_eq!(
      outputs,
      [
        "out/a_jpg_labelled.png",
        "out/a_png_labelled.png",
        "out/a_png_jpg_labelled.png",
        "out/b_labelled.png",
        "out/sub/a_labelled.png",
      ]
      .iter()
      .map(PathBuf::from)
      .collect::<Vec<_>>()
    );
    let unique: HashSet<_> = outputs.iter().collect();
    assert_eq!(unique.len(), outputs.len());
  }
}
