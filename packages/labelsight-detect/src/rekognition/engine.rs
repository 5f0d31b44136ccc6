use std::time::Duration;

use async_trait::async_trait;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::{self, Image};
use aws_sdk_rekognition::Client;

use super::errors::map_sdk_error;
use crate::engine::{DetectError, LabelDetector};
use crate::label::Label;

/// Region used when neither the options nor the environment name one.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct RekognitionOptions {
    pub region: Option<String>,
    /// Upper bound for one `DetectLabels` operation, retries included.
    pub timeout: Duration,
    /// Total attempts per request. `1` disables retries.
    pub max_attempts: u32,
}

impl Default for RekognitionOptions {
    fn default() -> Self {
        Self {
            region: None,
            timeout: Duration::from_secs(30),
            max_attempts: 1,
        }
    }
}

impl RekognitionOptions {
    fn retry_config(&self) -> RetryConfig {
        if self.max_attempts <= 1 {
            RetryConfig::disabled()
        } else {
            RetryConfig::standard().with_max_attempts(self.max_attempts)
        }
    }
}

/// Label detector backed by AWS Rekognition `DetectLabels`.
///
/// A fresh client is built for every call, so credentials are resolved again
/// before each request.
pub struct RekognitionDetector {
    credentials: SharedCredentialsProvider,
    options: RekognitionOptions,
}

impl RekognitionDetector {
    pub fn new(
        credentials: impl ProvideCredentials + 'static,
        options: RekognitionOptions,
    ) -> Self {
        Self {
            credentials: SharedCredentialsProvider::new(credentials),
            options,
        }
    }

    /// Uses the SDK's standard provider chain (environment, profile, IMDS, ...).
    pub async fn with_default_credentials(options: RekognitionOptions) -> Self {
        let chain = DefaultCredentialsChain::builder().build().await;
        Self::new(chain, options)
    }

    pub fn options(&self) -> &RekognitionOptions {
        &self.options
    }

    async fn client(&self) -> Result<Client, DetectError> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| DetectError::Authentication(DisplayErrorContext(&e).to_string()))?;

        let region = RegionProviderChain::first_try(self.options.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .credentials_provider(credentials)
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(self.options.timeout)
                    .build(),
            )
            .retry_config(self.options.retry_config())
            .load()
            .await;

        Ok(Client::new(&config))
    }
}

/// Converts service labels, skipping unnamed ones and reading a missing confidence as 0.
fn labels_from_response(labels: &[types::Label]) -> Vec<Label> {
    labels
        .iter()
        .filter_map(|label| {
            let name = label.name()?;
            Some(Label::new(name, label.confidence().unwrap_or(0.0)))
        })
        .collect()
}

#[async_trait]
impl LabelDetector for RekognitionDetector {
    async fn detect(&self, image: &[u8], min_confidence: f32) -> Result<Vec<Label>, DetectError> {
        if image.is_empty() {
            return Err(DetectError::InvalidInput("image payload is empty".into()));
        }

        let client = self.client().await?;
        log::debug!(
            "DetectLabels: {} bytes, floor {}%, timeout {:?}, attempts {}",
            image.len(),
            min_confidence,
            self.options.timeout,
            self.options.max_attempts
        );

        // Without MinConfidence the service drops everything under 55.
        let response = client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image.to_vec())).build())
            .min_confidence(min_confidence)
            .send()
            .await
            .map_err(map_sdk_error)?;
        let labels = labels_from_response(response.labels());

        log::debug!("DetectLabels returned {} labels", labels.len());
        Ok(labels)
    }
}
