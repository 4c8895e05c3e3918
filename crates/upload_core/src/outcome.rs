#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSuccess {
    pub file_name: String,
    pub remote_id: Option<String>,
    pub remote_url: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
}

impl UploadSuccess {
    pub fn named(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            remote_id: None,
            remote_url: None,
            status: None,
            message: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    pub file_name: String,
    pub reason: String,
}

/// Per-file result of a batch upload, whatever wire shape it arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success(UploadSuccess),
    Failure(UploadFailure),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchResult {
    pub successes: Vec<UploadSuccess>,
    pub failures: Vec<UploadFailure>,
}

impl BatchResult {
    pub fn partition(outcomes: impl IntoIterator<Item = UploadOutcome>) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            match outcome {
                UploadOutcome::Success(success) => result.successes.push(success),
                UploadOutcome::Failure(failure) => result.failures.push(failure),
            }
        }
        result
    }

    pub fn is_full_success(&self) -> bool {
        self.failures.is_empty()
    }
}
