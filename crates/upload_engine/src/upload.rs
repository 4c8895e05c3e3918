use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use upload_core::{BatchResult, CandidateFile, FileSource, UploadError};
use upload_logging::{upload_debug, upload_info};

use crate::http::{build_client, error_detail};
use crate::settings::UPLOAD_MULTIPLE_PATH;
use crate::{normalize_batch_response, ClientSettings};

/// The remote batch upload collaborator. Called once per submit with the whole batch.
#[async_trait::async_trait]
pub trait BatchUploader: Send + Sync {
    async fn upload(&self, files: &[CandidateFile]) -> Result<BatchResult, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBatchUploader {
    settings: ClientSettings,
}

impl ReqwestBatchUploader {
    pub fn new(settings: ClientSettings) -> Self {
        Self { settings }
    }

    async fn build_form(&self, files: &[CandidateFile]) -> Result<Form, UploadError> {
        let mut form = Form::new();
        for file in files {
            let bytes = match file.source() {
                FileSource::Memory(bytes) => bytes.to_vec(),
                FileSource::Path(path) => tokio::fs::read(path).await.map_err(|err| {
                    UploadError::Transport(format!("could not read {}: {err}", file.name()))
                })?,
            };
            let part = Part::bytes(bytes)
                .file_name(file.name().to_string())
                .mime_str(file.mime_type())
                .map_err(|err| UploadError::Transport(err.to_string()))?;
            form = form.part("files", part);
        }
        Ok(form)
    }
}

#[async_trait::async_trait]
impl BatchUploader for ReqwestBatchUploader {
    async fn upload(&self, files: &[CandidateFile]) -> Result<BatchResult, UploadError> {
        let client = build_client(&self.settings).map_err(map_reqwest_error)?;
        let form = self.build_form(files).await?;
        let url = self.settings.endpoint(UPLOAD_MULTIPLE_PATH);
        upload_debug!("POST {} with {} parts", url, files.len());

        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        upload_info!("batch endpoint answered {}", status);

        // 207 carries the partial-success shape; both are normalized the same way.
        if status == StatusCode::OK || status == StatusCode::MULTI_STATUS {
            return normalize_batch_response(&body);
        }
        Err(UploadError::Transport(format!(
            "http status {}: {}",
            status.as_u16(),
            error_detail(&body)
        )))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::Transport("request timed out".to_string());
    }
    UploadError::Transport(err.to_string())
}
