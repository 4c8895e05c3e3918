use thiserror::Error;

use crate::{UploadFailure, ValidationError};

/// Whole-operation submit errors. The display text is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Please select at least one file to upload")]
    EmptySelection,
    #[error("An upload is already in progress")]
    SubmitInFlight,
    #[error("The previous upload has finished; reset before uploading again")]
    SessionFinished,
    #[error("Upload failed: {0}")]
    Transport(String),
    #[error("Unexpected response from upload service: {0}")]
    MalformedResponse(String),
}

impl UploadError {
    /// Transport and protocol errors land the session in `Failed`.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            UploadError::Transport(_) | UploadError::MalformedResponse(_)
        )
    }
}

/// Collects error lines for one call into a single user-facing message.
///
/// Lines are not deduplicated by file name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorReport {
    lines: Vec<String>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_rejections(&mut self, rejected: &[ValidationError]) -> &mut Self {
        self.lines.extend(
            rejected
                .iter()
                .map(|error| format!("{}: {}", error.file_name, error.detail)),
        );
        self
    }

    pub fn push_failures(&mut self, failures: &[UploadFailure]) -> &mut Self {
        self.lines.extend(
            failures
                .iter()
                .map(|failure| format!("{}: {}", failure.file_name, failure.reason)),
        );
        self
    }

    pub fn push_error(&mut self, error: &UploadError) -> &mut Self {
        self.lines.push(error.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The joined message, or `None` when nothing was collected.
    pub fn message(&self) -> Option<String> {
        if self.lines.is_empty() {
            None
        } else {
            Some(self.lines.join("\n"))
        }
    }
}
