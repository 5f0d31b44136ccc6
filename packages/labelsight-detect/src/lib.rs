pub mod engine;
pub mod label;
pub mod rekognition;
pub mod replay;

pub use engine::{DetectError, LabelDetector};
pub use label::Label;
pub use rekognition::{RekognitionDetector, RekognitionOptions};
pub use replay::StaticDetector;
