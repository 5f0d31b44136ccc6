use aws_sdk_rekognition::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_rekognition::operation::detect_labels::DetectLabelsError;

use crate::engine::DetectError;

const AUTH_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "InvalidSignatureException",
    "AccessDeniedException",
    "ExpiredTokenException",
    "InvalidClientTokenId",
];

const INPUT_CODES: &[&str] = &[
    "InvalidImageFormatException",
    "ImageTooLargeException",
    "InvalidParameterException",
];

pub(crate) fn map_sdk_error<R>(err: SdkError<DetectLabelsError, R>) -> DetectError
where
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    if let SdkError::TimeoutError(_) = err {
        return DetectError::Timeout(message);
    }
    let code = err.as_service_error().and_then(|e| e.code());
    classify(code, message)
}

/// Sorts a service error code into one of the detector error kinds.
pub(crate) fn classify(code: Option<&str>, message: String) -> DetectError {
    match code {
        Some(code) if AUTH_CODES.contains(&code) => DetectError::Authentication(message),
        Some(code) if INPUT_CODES.contains(&code) => DetectError::InvalidInput(message),
        _ => DetectError::Service(message),
    }
}
