use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use upload_logging::upload_warn;

use crate::ClientSettings;

pub(crate) fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Some(token) = settings.bearer_token.as_deref() {
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => upload_warn!("bearer token contains invalid header characters; sent without it"),
        }
    }

    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .default_headers(headers)
        .build()
}

/// Pulls the `detail` field out of an error body, falling back to the raw text.
pub(crate) fn error_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "no response body".to_string()
            } else {
                trimmed.chars().take(200).collect()
            }
        })
}
