use serde::Deserialize;
use serde_json::Value;
use upload_core::{BatchResult, UploadError, UploadFailure, UploadOutcome, UploadSuccess};

/// The two shapes the batch endpoint answers with.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchResponse {
    /// Every file uploaded.
    Uploaded(Vec<UploadedEntry>),
    /// Multi-status: some files failed.
    Partial {
        successful_uploads: Vec<UploadedEntry>,
        errors: Vec<FailedEntry>,
    },
}

#[derive(Debug, Deserialize)]
struct UploadedEntry {
    filename: String,
    #[serde(default)]
    call_id: Option<RemoteId>,
    #[serde(default)]
    s3_url: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct FailedEntry {
    filename: String,
    error: String,
}

impl From<UploadedEntry> for UploadSuccess {
    fn from(entry: UploadedEntry) -> Self {
        UploadSuccess {
            file_name: entry.filename,
            remote_id: entry.call_id.map(|id| match id {
                RemoteId::Number(n) => n.to_string(),
                RemoteId::Text(s) => s,
            }),
            remote_url: entry.s3_url,
            status: entry.status,
            message: entry.message,
        }
    }
}

/// Normalizes a batch upload response body into successes and failures.
///
/// Anything other than the two known shapes is a protocol violation.
pub fn normalize_batch_response(body: &str) -> Result<BatchResult, UploadError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| UploadError::MalformedResponse(format!("invalid JSON: {err}")))?;
    let unknown_shape = || {
        UploadError::MalformedResponse(
            "expected a list of uploads or {successful_uploads, errors}".to_string(),
        )
    };
    // Derived struct decoding also takes positional arrays, so the outline is checked first.
    if !has_known_shape(&value) {
        return Err(unknown_shape());
    }
    let response: BatchResponse = serde_json::from_value(value).map_err(|_| unknown_shape())?;

    let outcomes: Vec<UploadOutcome> = match response {
        BatchResponse::Uploaded(entries) => entries
            .into_iter()
            .map(|entry| UploadOutcome::Success(entry.into()))
            .collect(),
        BatchResponse::Partial {
            successful_uploads,
            errors,
        } => successful_uploads
            .into_iter()
            .map(|entry| UploadOutcome::Success(entry.into()))
            .chain(errors.into_iter().map(|entry| {
                UploadOutcome::Failure(UploadFailure {
                    file_name: entry.filename,
                    reason: entry.error,
                })
            }))
            .collect(),
    };
    Ok(BatchResult::partition(outcomes))
}

fn has_known_shape(value: &Value) -> bool {
    match value {
        Value::Array(_) => is_list_of_objects(value),
        Value::Object(map) => {
            map.get("successful_uploads").is_some_and(is_list_of_objects)
                && map.get("errors").is_some_and(is_list_of_objects)
        }
        _ => false,
    }
}

fn is_list_of_objects(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_object))
}
