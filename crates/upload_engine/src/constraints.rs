use serde::Deserialize;
use thiserror::Error;
use upload_core::Constraints;
use upload_logging::{upload_info, upload_warn};

use crate::http::{build_client, error_detail};
use crate::settings::SUPPORTED_FORMATS_PATH;
use crate::ClientSettings;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum ConstraintFetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http status {status}: {detail}")]
    HttpStatus { status: u16, detail: String },
    #[error("could not decode constraints: {0}")]
    Decode(String),
    #[error("constraints out of range: {0}")]
    InvalidConstraints(String),
}

#[async_trait::async_trait]
pub trait ConstraintSource: Send + Sync {
    async fn fetch(&self) -> Result<Constraints, ConstraintFetchError>;
}

/// Fetches constraints once and falls back to the built-in defaults on any error.
pub async fn load_constraints(source: &dyn ConstraintSource) -> Constraints {
    match source.fetch().await {
        Ok(constraints) => {
            upload_info!(
                "constraints: {} extensions, max {} bytes, max {} files",
                constraints.allowed_extensions().len(),
                constraints.max_file_size_bytes(),
                constraints.max_files_per_batch()
            );
            constraints
        }
        Err(err) => {
            upload_warn!("constraint fetch failed, using defaults: {}", err);
            Constraints::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct SupportedFormatsResponse {
    supported_formats: Vec<SupportedFormat>,
    max_file_size_mb: f64,
    max_files_per_upload: u64,
}

#[derive(Debug, Deserialize)]
struct SupportedFormat {
    extension: String,
}

impl SupportedFormatsResponse {
    fn into_constraints(self) -> Result<Constraints, ConstraintFetchError> {
        if !self.max_file_size_mb.is_finite() || self.max_file_size_mb <= 0.0 {
            return Err(ConstraintFetchError::InvalidConstraints(format!(
                "max_file_size_mb = {}",
                self.max_file_size_mb
            )));
        }
        let max_bytes = (self.max_file_size_mb * BYTES_PER_MB).round() as u64;
        let max_files = usize::try_from(self.max_files_per_upload).unwrap_or(usize::MAX);
        Constraints::new(
            self.supported_formats.into_iter().map(|format| format.extension),
            max_bytes,
            max_files,
        )
        .ok_or_else(|| {
            ConstraintFetchError::InvalidConstraints(
                "no extensions or a zero file limit".to_string(),
            )
        })
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestConstraintSource {
    settings: ClientSettings,
}

impl ReqwestConstraintSource {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl ConstraintSource for ReqwestConstraintSource {
    async fn fetch(&self) -> Result<Constraints, ConstraintFetchError> {
        let client = build_client(&self.settings)
            .map_err(|err| ConstraintFetchError::Network(err.to_string()))?;
        let response = client
            .get(self.settings.endpoint(SUPPORTED_FORMATS_PATH))
            .send()
            .await
            .map_err(|err| ConstraintFetchError::Network(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| ConstraintFetchError::Network(err.to_string()))?;
        if !status.is_success() {
            return Err(ConstraintFetchError::HttpStatus {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        let parsed: SupportedFormatsResponse = serde_json::from_str(&body)
            .map_err(|err| ConstraintFetchError::Decode(err.to_string()))?;
        parsed.into_constraints()
    }
}
