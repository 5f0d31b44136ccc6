//! Error type shared by the library modules.
use labelsight_detect::DetectError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication error: {0}")]
  Authentication(String),
  #[error("could not load image {reference}: {reason}")]
  ImageLoad { reference: String, reason: String },
  #[error("label service error: {0}")]
  Service(String),
  #[error("render error: {0}")]
  Render(String),
  #[error("confidence threshold {0} is outside 0..=100")]
  InvalidThreshold(f32),
  #[error("configuration error in {path}: {reason}")]
  Config { path: PathBuf, reason: String },
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
  pub(crate) fn image_load(reference: impl Into<String>, reason: impl ToString) -> Self {
    Error::ImageLoad {
      reference: reference.into(),
      reason: reason.to_string(),
    }
  }
}

impl From<DetectError> for Error {
  fn from(err: DetectError) -> Self {
    match err {
      DetectError::Authentication(msg) => Error::Authentication(msg),
      DetectError::InvalidInput(msg) => Error::Service(format!("image rejected: {}", msg)),
      DetectError::Timeout(msg) => Error::Service(format!("timed out: {}", msg)),
      DetectError::Service(msg) => Error::Service(msg),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_detect_errors_map_to_library_kinds() {
    assert!(matches!(
      Error::from(DetectError::Authentication("nope".into())),
      Error::Authentication(_)
    ));
    assert!(matches!(
      Error::from(DetectError::Timeout("30s".into())),
      Error::Service(_)
    ));
    // The image was already resolved to bytes, so a rejection is a service error.
    let err = Error::from(DetectError::InvalidInput("InvalidImageFormatException".into()));
    assert!(matches!(err, Error::Service(_)));
    assert!(err.to_string().contains("InvalidImageFormatException"));
  }

  #[test]
  fn test_messages() {
    let err = Error::image_load("missing.png", "not found");
    assert_eq!(err.to_string(), "could not load image missing.png: not found");
    assert_eq!(
      Error::InvalidThreshold(120.0).to_string(),
      "confidence threshold 120 is outside 0..=100"
    );
  }
}
