use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use upload_core::{
    BatchResult, CandidateFile, Constraints, PickOutcome, Stage, UploadError, UploadFailure,
    UploadSuccess,
};
use upload_engine::{
    BatchUploader, ClientSettings, InstantPacer, Navigator, PacingSettings,
    ReqwestBatchUploader, ReqwestConstraintSource, UploadSession,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(upload_logging::initialize_for_tests);
}

struct FakeUploader {
    response: Result<BatchResult, UploadError>,
    calls: Mutex<Vec<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl FakeUploader {
    fn answering(response: Result<BatchResult, UploadError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    fn gated(response: Result<BatchResult, UploadError>, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            response,
            calls: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl BatchUploader for FakeUploader {
    async fn upload(&self, files: &[CandidateFile]) -> Result<BatchResult, UploadError> {
        self.calls
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name().to_string()).collect());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.response.clone()
    }
}

struct TestNavigator {
    tx: mpsc::UnboundedSender<()>,
}

impl Navigator for TestNavigator {
    fn navigate(&self) {
        let _ = self.tx.send(());
    }
}

fn navigator() -> (Arc<TestNavigator>, mpsc::UnboundedReceiver<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(TestNavigator { tx }), rx)
}

fn session_with(uploader: Arc<dyn BatchUploader>, navigator: Arc<dyn Navigator>) -> UploadSession {
    UploadSession::new(
        Constraints::new([".wav"], 1000, 5).unwrap(),
        uploader,
        navigator,
    )
    .with_pacing(Arc::new(InstantPacer), PacingSettings::zero())
}

fn wav(name: &str, size: usize) -> CandidateFile {
    CandidateFile::from_bytes(name, vec![0u8; size])
}

fn success(names: &[&str]) -> BatchResult {
    BatchResult {
        successes: names.iter().map(|n| UploadSuccess::named(*n)).collect(),
        failures: Vec::new(),
    }
}

async fn expect_navigation(rx: &mut mpsc::UnboundedReceiver<()>) {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("navigation within timeout")
        .expect("navigator channel open");
}

#[tokio::test]
async fn rejected_pick_leaves_selection_empty() {
    init_logging();
    let uploader = FakeUploader::answering(Ok(success(&[])));
    let (nav, _rx) = navigator();
    let session = session_with(uploader, nav);

    let outcome = session.pick(vec![wav("a.wav", 500), wav("b.mp3", 500)]);

    match outcome {
        PickOutcome::Rejected(rejected) => {
            assert_eq!(rejected.len(), 1);
            assert_eq!(rejected[0].file_name, "b.mp3");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    let snapshot = session.snapshot();
    assert!(snapshot.staged.is_empty());
    assert_eq!(snapshot.stage, Stage::Idle);
}

#[tokio::test]
async fn single_file_walks_to_complete_and_navigates() {
    init_logging();
    let uploader = FakeUploader::answering(Ok(success(&["a.wav"])));
    let (nav, mut rx) = navigator();
    let session = session_with(uploader.clone(), nav);

    assert!(matches!(
        session.pick(vec![wav("a.wav", 500)]),
        PickOutcome::Staged(_)
    ));
    let result = session.submit().await.expect("submit ok");

    assert_eq!(result.successes.len(), 1);
    assert_eq!(uploader.calls(), vec![vec!["a.wav".to_string()]]);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.stage, Stage::Complete);
    assert_eq!(
        snapshot.stages_reached,
        vec![
            Stage::Idle,
            Stage::Validating,
            Stage::Uploading,
            Stage::StartingAnalysis,
            Stage::Complete
        ]
    );
    assert_eq!(snapshot.per_file_progress.get("a.wav"), Some(&100));
    assert_eq!(snapshot.per_file_progress.len(), 1);

    expect_navigation(&mut rx).await;
    let snapshot = session.snapshot();
    assert!(snapshot.navigated);
    assert!(snapshot.staged.is_empty());
    assert_eq!(snapshot.uploaded.len(), 1);
}

#[tokio::test]
async fn empty_submit_never_calls_uploader() {
    init_logging();
    let uploader = FakeUploader::answering(Ok(success(&[])));
    let (nav, _rx) = navigator();
    let session = session_with(uploader.clone(), nav);

    let err = session.submit().await.unwrap_err();

    assert_eq!(err, UploadError::EmptySelection);
    assert!(uploader.calls().is_empty());
    assert_eq!(session.snapshot().stage, Stage::Idle);
}

#[tokio::test]
async fn partial_failure_completes_with_failure_lines() {
    init_logging();
    let result = BatchResult {
        successes: vec![UploadSuccess::named("a.wav"), UploadSuccess::named("b.wav")],
        failures: vec![UploadFailure {
            file_name: "c.wav".to_string(),
            reason: "Upload failed: storage".to_string(),
        }],
    };
    let uploader = FakeUploader::answering(Ok(result));
    let (nav, mut rx) = navigator();
    let session = session_with(uploader, nav);

    session.pick(vec![wav("a.wav", 1), wav("b.wav", 1), wav("c.wav", 1)]);
    session.submit().await.expect("partial failure still settles Ok");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.stage, Stage::Complete);
    assert_eq!(
        snapshot.error_message.as_deref(),
        Some("c.wav: Upload failed: storage")
    );
    assert_eq!(
        snapshot.per_file_progress.values().filter(|p| **p == 100).count(),
        2
    );
    expect_navigation(&mut rx).await;
}

#[tokio::test]
async fn transport_failure_lands_in_failed_without_navigation() {
    init_logging();
    let uploader = FakeUploader::answering(Err(UploadError::Transport("refused".into())));
    let (nav, mut rx) = navigator();
    let session = session_with(uploader, nav);

    session.pick(vec![wav("a.wav", 1)]);
    let err = session.submit().await.unwrap_err();

    assert_eq!(err, UploadError::Transport("refused".into()));
    let snapshot = session.snapshot();
    assert_eq!(snapshot.stage, Stage::Failed);
    assert_eq!(snapshot.overall_progress, 50);
    assert!(!snapshot.navigation_scheduled);
    assert_eq!(snapshot.error_message.as_deref(), Some("Upload failed: refused"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn second_submit_is_refused_while_uploading() {
    init_logging();
    let gate = Arc::new(Notify::new());
    let uploader = FakeUploader::gated(Ok(success(&["a.wav"])), gate.clone());
    let (nav, _rx) = navigator();
    let session = session_with(uploader.clone(), nav);
    session.pick(vec![wav("a.wav", 1)]);

    let mut snapshots = session.subscribe();
    let first = tokio::spawn({
        let session = session.clone();
        async move { session.submit().await }
    });
    while snapshots.borrow_and_update().stage != Stage::Uploading {
        snapshots.changed().await.unwrap();
    }

    assert_eq!(session.submit().await, Err(UploadError::SubmitInFlight));
    assert!(!session.remove(1));
    session.reset();
    assert_eq!(session.snapshot().stage, Stage::Uploading);

    gate.notify_one();
    first.await.unwrap().expect("first submit ok");
    assert_eq!(uploader.calls().len(), 1);
    assert_eq!(session.snapshot().stage, Stage::Complete);
}

#[tokio::test]
async fn reset_before_hand_off_cancels_navigation() {
    init_logging();
    let uploader = FakeUploader::answering(Ok(success(&["a.wav"])));
    let (nav, mut rx) = navigator();
    let pacing = PacingSettings {
        navigation: Duration::from_millis(100),
        ..PacingSettings::zero()
    };
    let session = UploadSession::new(Constraints::default(), uploader, nav)
        .with_pacing(Arc::new(upload_engine::TokioPacer), pacing);

    session.pick(vec![wav("a.wav", 1)]);
    session.submit().await.unwrap();
    assert!(session.snapshot().navigation_scheduled);
    session.reset();

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(session.snapshot().stage, Stage::Idle);
}

#[tokio::test]
async fn remove_by_entry_and_by_name() {
    init_logging();
    let uploader = FakeUploader::answering(Ok(success(&[])));
    let (nav, _rx) = navigator();
    let session = session_with(uploader, nav);

    let ids = match session.pick(vec![wav("a.wav", 1), wav("a.wav", 2), wav("b.wav", 3)]) {
        PickOutcome::Staged(ids) => ids,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert!(session.remove(ids[0]));
    assert!(!session.remove(ids[0]));
    assert_eq!(session.snapshot().staged.len(), 2);

    assert_eq!(session.remove_named("b.wav"), 1);
    let names: Vec<_> = session.snapshot().staged.into_iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["a.wav".to_string()]);
}

#[tokio::test]
async fn end_to_end_against_http_service() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/supported-formats"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"supported_formats": [{"extension": ".wav"}], "max_file_size_mb": 1, "max_files_per_upload": 5}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload-multiple"))
        .respond_with(ResponseTemplate::new(207).set_body_raw(
            r#"{"successful_uploads": [{"filename": "a.wav", "call_id": 11}],
                "errors": [{"filename": "b.wav", "error": "Upload failed: quota"}]}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings::with_base_url(server.uri());
    let (nav, mut rx) = navigator();
    let session = UploadSession::open(
        &ReqwestConstraintSource::new(settings.clone()),
        Arc::new(ReqwestBatchUploader::new(settings)),
        nav,
    )
    .await
    .with_pacing(Arc::new(InstantPacer), PacingSettings::zero());

    assert_eq!(session.constraints().max_file_size_bytes(), 1024 * 1024);
    assert!(matches!(
        session.pick(vec![wav("a.wav", 10), wav("b.wav", 10)]),
        PickOutcome::Staged(_)
    ));
    let result = session.submit().await.expect("submit ok");

    assert_eq!(result.successes[0].remote_id.as_deref(), Some("11"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(session.snapshot().stage, Stage::Complete);
    expect_navigation(&mut rx).await;
}
