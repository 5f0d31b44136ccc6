mod engine;
mod errors;

pub use engine::{RekognitionDetector, RekognitionOptions, DEFAULT_REGION};
