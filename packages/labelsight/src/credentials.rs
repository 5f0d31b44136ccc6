//! Credential sources for the Rekognition client.
//!
//! Keys come from the process environment, from the CSV file the AWS console
//! exports for an access key, or from the SDK's own provider chain.
use crate::error::{Error, Result};
use aws_credential_types::provider::{error::CredentialsError, future, ProvideCredentials};
use aws_credential_types::Credentials;
use csv::{ReaderBuilder, Trim};
use labelsight_detect::{RekognitionDetector, RekognitionOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

const ACCESS_KEY_HEADER: &str = "Access key ID";
const SECRET_KEY_HEADER: &str = "Secret access key";

/// A resolved key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKeys {
  pub access_key_id: String,
  pub secret_access_key: String,
  pub session_token: Option<String>,
}

impl fmt::Debug for AccessKeys {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AccessKeys")
      .field("access_key_id", &self.access_key_id)
      .field("secret_access_key", &"** redacted **")
      .field(
        "session_token",
        &self.session_token.as_ref().map(|_| "** redacted **"),
      )
      .finish()
  }
}

impl From<AccessKeys> for Credentials {
  fn from(keys: AccessKeys) -> Self {
    Credentials::new(
      keys.access_key_id,
      keys.secret_access_key,
      keys.session_token,
      None,
      "labelsight",
    )
  }
}

/// Where credentials are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "path", rename_all = "snake_case")]
pub enum CredentialSource {
  /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` (and optional `AWS_SESSION_TOKEN`).
  Environment,
  /// Console-exported CSV: a header row followed by one data row.
  CsvFile(PathBuf),
  /// The SDK provider chain: environment, shared profile, SSO, instance metadata.
  DefaultChain,
}

impl Default for CredentialSource {
  fn default() -> Self {
    CredentialSource::DefaultChain
  }
}

impl CredentialSource {
  /// Reads the keys now. `DefaultChain` is resolved by the SDK and yields `None`.
  pub fn load(&self) -> Result<Option<AccessKeys>> {
    match self {
      CredentialSource::Environment => {
        load_from_vars(|name| std::env::var(name).ok()).map(Some)
      }
      CredentialSource::CsvFile(path) => load_csv_file(path).map(Some),
      CredentialSource::DefaultChain => Ok(None),
    }
  }

  /// Builds a Rekognition detector that resolves these credentials before every request.
  pub async fn detector(&self, options: RekognitionOptions) -> RekognitionDetector {
    match self {
      CredentialSource::DefaultChain => {
        RekognitionDetector::with_default_credentials(options).await
      }
      other => RekognitionDetector::new(SourceCredentials(other.clone()), options),
    }
  }
}

/// Adapts a non-SDK `CredentialSource` to the SDK provider interface.
#[derive(Debug)]
struct SourceCredentials(CredentialSource);

impl ProvideCredentials for SourceCredentials {
  fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
  where
    Self: 'a,
  {
    let loaded = match self.0.load() {
      Ok(Some(keys)) => Ok(Credentials::from(keys)),
      Ok(None) => Err(CredentialsError::not_loaded("no static credentials configured")),
      Err(e) => Err(CredentialsError::not_loaded(e.to_string())),
    };
    future::ProvideCredentials::ready(loaded)
  }
}

/// Reads keys through `lookup`, which maps a variable name to its value.
pub fn load_from_vars<F>(lookup: F) -> Result<AccessKeys>
where
  F: Fn(&str) -> Option<String>,
{
  let required = |name: &str| {
    lookup(name)
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
      .ok_or_else(|| Error::Authentication(format!("{} is not set", name)))
  };

  Ok(AccessKeys {
    access_key_id: required(ACCESS_KEY_VAR)?,
    secret_access_key: required(SECRET_KEY_VAR)?,
    session_token: lookup(SESSION_TOKEN_VAR).filter(|v| !v.trim().is_empty()),
  })
}

pub fn load_csv_file(path: &Path) -> Result<AccessKeys> {
  let contents = std::fs::read_to_string(path).map_err(|e| {
    Error::Authentication(format!("cannot read credentials file {}: {}", path.display(), e))
  })?;
  log::debug!("Loaded credentials file {}", path.display());
  parse_csv(&contents)
}

/// Parses the console CSV export.
///
/// Columns are located by header name; files without the expected headers use
/// columns 0 and 1 of the first data row.
pub fn parse_csv(contents: &str) -> Result<AccessKeys> {
  let csv_error =
    |e: csv::Error| Error::Authentication(format!("malformed credentials file: {}", e));
  let mut reader = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(Trim::All)
    .from_reader(contents.trim_start_matches('\u{feff}').as_bytes());

  let header = reader.headers().map_err(csv_error)?.clone();
  if header.iter().all(|h| h.is_empty()) {
    return Err(Error::Authentication("credentials file is empty".into()));
  }
  let row = reader
    .records()
    .next()
    .ok_or_else(|| Error::Authentication("credentials file has no data row".into()))?
    .map_err(csv_error)?;

  let column = |name: &str, fallback: usize| {
    header
      .iter()
      .position(|h| h.eq_ignore_ascii_case(name))
      .unwrap_or(fallback)
  };
  let field = |index: usize, what: &str| {
    row
      .get(index)
      .filter(|v| !v.is_empty())
      .map(str::to_string)
      .ok_or_else(|| Error::Authentication(format!("credentials file is missing the {}", what)))
  };

  Ok(AccessKeys {
    access_key_id: field(column(ACCESS_KEY_HEADER, 0), "access key id")?,
    secret_access_key: field(column(SECRET_KEY_HEADER, 1), "secret access key")?,
    session_token: None,
  })
}
