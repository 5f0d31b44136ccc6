//! Resolving an image reference (URL, file or raw bytes) to encoded bytes.
use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
  Url(String),
  Path(PathBuf),
  Bytes(Vec<u8>),
}

impl ImageSource {
  /// Treats `http://` and `https://` references as URLs and everything else as a file name.
  pub fn from_reference(reference: &str) -> Self {
    let lower = reference.trim_start().to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
      ImageSource::Url(reference.trim().to_string())
    } else {
      ImageSource::Path(PathBuf::from(reference))
    }
  }

  /// Short description used in logs and error messages.
  pub fn describe(&self) -> String {
    match self {
      ImageSource::Url(url) => url.clone(),
      ImageSource::Path(path) => path.display().to_string(),
      ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
    }
  }

  pub async fn load(&self, loader: &ImageLoader) -> Result<Vec<u8>> {
    let bytes = match self {
      ImageSource::Url(url) => loader.fetch(url).await?,
      ImageSource::Path(path) => tokio::fs::read(path)
        .await
        .map_err(|e| Error::image_load(self.describe(), e))?,
      ImageSource::Bytes(bytes) => bytes.clone(),
    };

    if bytes.is_empty() {
      return Err(Error::image_load(self.describe(), "no image data"));
    }
    log::debug!("Loaded {} bytes from {}", bytes.len(), self.describe());
    Ok(bytes)
  }
}

impl fmt::Display for ImageSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.describe())
  }
}

impl From<&str> for ImageSource {
  fn from(reference: &str) -> Self {
    ImageSource::from_reference(reference)
  }
}

impl From<Vec<u8>> for ImageSource {
  fn from(bytes: Vec<u8>) -> Self {
    ImageSource::Bytes(bytes)
  }
}

impl From<PathBuf> for ImageSource {
  fn from(path: PathBuf) -> Self {
    ImageSource::Path(path)
  }
}

/// HTTP side of image loading.
#[derive(Debug, Clone)]
pub struct ImageLoader {
  client: reqwest::Client,
}

impl ImageLoader {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("labelsight/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::image_load("<http client>", e))?;
    Ok(Self { client })
  }

  async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
    log::debug!("GET {}", url);
    let response = self
      .client
      .get(url)
      .send()
      .await
      .and_then(|r| r.error_for_status())
      .map_err(|e| Error::image_load(url, e))?;
    let bytes = response
      .bytes()
      .await
      .map_err(|e| Error::image_load(url, e))?;
    Ok(bytes.to_vec())
  }
}
