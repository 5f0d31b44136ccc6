//! # labelsight
//!
//! Detect what is in a picture with AWS Rekognition and write the answer onto the picture.
//!
//! ## Features
//!
//! - **Label Fetching**: Resolve an image (URL, local path or raw bytes) and return the labels
//!   at or above a confidence threshold
//! - **Annotation**: Draw the labels onto a copy of the image inside a translucent box
//! - **Batch Mode**: Annotate a whole directory with bounded concurrency and a JSON summary
//! - **Replay**: Reuse a saved label report instead of calling the service
//!
//! ## Quick Start
//!
//! ```ignore
//! use labelsight::prelude::*;
//!
//! let settings = Settings::default();
//! let annotator = settings.annotator(None).await?;
//!
//! let url = "https://www.parrots.org/images/uploads/dreamstime_C_47716185.jpg";
//! let source = ImageSource::from(url);
//! let annotated = annotator.label_image(&source, 50.0).await?;
//! annotated.save(Path::new("labelled.png"))?;
//! println!("{}", annotated.text);
//! ```

pub mod annotator;
pub mod batch;
pub mod credentials;
pub mod error;
pub mod fetcher;
pub mod image_source;
pub mod layout;
pub mod logging;
pub mod overlay;
pub mod report;
pub mod settings;
pub mod text_format;

// Re-export commonly used types at the root level
pub use annotator::{join_labels, Annotated, Annotator, LABEL_SEPARATOR};
pub use batch::{
    annotate_directory, collect_images, plan_outputs, BatchEntry, BatchOptions, BatchSummary,
};
pub use credentials::{AccessKeys, CredentialSource};
pub use error::{Error, Result};
pub use fetcher::{
    filter_by_confidence, label_names, validate_threshold, LabelFetcher, DEFAULT_CONFIDENCE,
};
pub use image_source::{ImageLoader, ImageSource};
pub use labelsight_detect::{DetectError, Label, LabelDetector, StaticDetector};
pub use overlay::{add_text_to_image, OverlayFont, OverlayStyle};
pub use report::LabelReport;
pub use settings::Settings;
pub use text_format::{format_text, DEFAULT_COLUMNS};

/// Prelude module for convenient imports
///
/// Import everything you need with:
/// ```ignore
/// use labelsight::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        add_text_to_image, annotate_directory, filter_by_confidence, format_text, join_labels,
        label_names, validate_threshold, Annotated, Annotator, BatchOptions, BatchSummary,
        CredentialSource, Error, ImageLoader, ImageSource, Label, LabelDetector, LabelFetcher,
        LabelReport, OverlayFont, OverlayStyle, Result, Settings, StaticDetector,
        DEFAULT_CONFIDENCE,
    };
}
