use std::time::Duration;

use upload_core::{CandidateFile, UploadError};
use upload_engine::{BatchUploader, ClientSettings, ReqwestBatchUploader};
use wiremock::matchers::{header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn uploader_for(server: &MockServer) -> ReqwestBatchUploader {
    ReqwestBatchUploader::new(ClientSettings::with_base_url(server.uri()))
}

fn wav(name: &str) -> CandidateFile {
    CandidateFile::from_bytes(name, b"RIFF....WAVE".to_vec())
}

#[tokio::test]
async fn posts_every_file_in_one_multipart_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload-multiple"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"filename": "a.wav", "call_id": 1}, {"filename": "b.wav", "call_id": 2}]"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let result = uploader_for(&server)
        .upload(&[wav("a.wav"), wav("b.wav")])
        .await
        .expect("upload ok");

    assert_eq!(result.successes.len(), 2);
    assert!(result.failures.is_empty());

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert_eq!(body.matches("name=\"files\"").count(), 2);
    assert!(body.contains("filename=\"a.wav\""));
    assert!(body.contains("audio/wav"));
}

#[tokio::test]
async fn multi_status_is_partial_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"{"successful_uploads": [{"filename": "a.wav"}],
                "errors": [{"filename": "b.wav", "error": "Upload failed: boom"}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let result = uploader_for(&server)
        .upload(&[wav("a.wav"), wav("b.wav")])
        .await
        .expect("partial is not an error");

    assert_eq!(result.successes[0].file_name, "a.wav");
    assert_eq!(result.failures[0].file_name, "b.wav");
    assert_eq!(result.failures[0].reason, "Upload failed: boom");
}

#[tokio::test]
async fn reads_path_sources_at_upload_time() {
    let dir = tempfile::TempDir::new().unwrap();
    let file_path = dir.path().join("call.mp3");
    std::fs::write(&file_path, b"ID3-audio").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"[{"filename": "call.mp3"}]"#, "application/json"),
        )
        .mount(&server)
        .await;

    let candidate = CandidateFile::from_path("call.mp3", &file_path, 9);
    uploader_for(&server)
        .upload(&[candidate])
        .await
        .expect("upload ok");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("ID3-audio"));
    assert!(body.contains("audio/mpeg"));
}

#[tokio::test]
async fn missing_path_is_a_transport_error() {
    let server = MockServer::start().await;
    let candidate = CandidateFile::from_path("gone.wav", "/nonexistent/gone.wav", 10);

    let err = uploader_for(&server).upload(&[candidate]).await.unwrap_err();

    assert!(matches!(err, UploadError::Transport(msg) if msg.contains("gone.wav")));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn error_status_is_a_transport_error_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(
            r#"{"detail": "Maximum 10 files allowed per upload"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let err = uploader_for(&server).upload(&[wav("a.wav")]).await.unwrap_err();

    assert_eq!(
        err,
        UploadError::Transport("http status 400: Maximum 10 files allowed per upload".to_string())
    );
}

#[tokio::test]
async fn unrecognized_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"status": "ok"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = uploader_for(&server).upload(&[wav("a.wav")]).await.unwrap_err();
    assert!(matches!(err, UploadError::MalformedResponse(_)));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_raw("[]", "application/json"),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::with_base_url(server.uri())
    };
    let err = ReqwestBatchUploader::new(settings)
        .upload(&[wav("a.wav")])
        .await
        .unwrap_err();

    assert_eq!(err, UploadError::Transport("request timed out".to_string()));
}
