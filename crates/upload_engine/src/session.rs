use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use upload_core::{
    update, BatchResult, CandidateFile, Constraints, Effect, EntryId, Msg, NavigationTicket,
    PickOutcome, SessionSnapshot, UploadError, UploadState,
};
use upload_logging::{upload_debug, upload_info};

use crate::{load_constraints, BatchUploader, ConstraintSource, Navigator, Pacer, PacingSettings, TokioPacer};

struct Shared {
    state: Mutex<UploadState>,
    snapshots: watch::Sender<SessionSnapshot>,
}

/// One upload session: owns the batch and stage state, runs effects, and
/// publishes a snapshot to subscribers after every change.
///
/// The state lock is never held across an await.
#[derive(Clone)]
pub struct UploadSession {
    shared: Arc<Shared>,
    uploader: Arc<dyn BatchUploader>,
    navigator: Arc<dyn Navigator>,
    pacer: Arc<dyn Pacer>,
    pacing: PacingSettings,
}

impl UploadSession {
    /// Fetches constraints once (falling back to defaults) and opens the session.
    pub async fn open(
        source: &dyn ConstraintSource,
        uploader: Arc<dyn BatchUploader>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let constraints = load_constraints(source).await;
        Self::new(constraints, uploader, navigator)
    }

    pub fn new(
        constraints: Constraints,
        uploader: Arc<dyn BatchUploader>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let state = UploadState::new(constraints);
        let (snapshots, _) = watch::channel(state.view());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                snapshots,
            }),
            uploader,
            navigator,
            pacer: Arc::new(TokioPacer),
            pacing: PacingSettings::default(),
        }
    }

    pub fn with_pacing(mut self, pacer: Arc<dyn Pacer>, pacing: PacingSettings) -> Self {
        self.pacer = pacer;
        self.pacing = pacing;
        self
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn constraints(&self) -> Constraints {
        self.lock().constraints().clone()
    }

    /// Validates and stages a pick as one all-or-nothing group.
    pub fn pick(&self, files: Vec<CandidateFile>) -> PickOutcome {
        let mut state = self.lock();
        self.apply(&mut state, Msg::FilesPicked(files));
        state.last_pick().cloned().unwrap_or(PickOutcome::Ignored)
    }

    /// Removes one staged entry. Returns `false` if it was not staged or the batch is in flight.
    pub fn remove(&self, entry_id: EntryId) -> bool {
        let is_staged = |state: &UploadState| state.staged().iter().any(|e| e.id == entry_id);
        let mut state = self.lock();
        let was_staged = is_staged(&state);
        self.apply(&mut state, Msg::RemoveEntry { entry_id });
        was_staged && !is_staged(&state)
    }

    /// Removes every staged entry named `file_name`; returns how many went.
    pub fn remove_named(&self, file_name: &str) -> usize {
        let mut state = self.lock();
        let before = state.staged().len();
        self.apply(
            &mut state,
            Msg::RemoveNamed {
                file_name: file_name.to_string(),
            },
        );
        before - state.staged().len()
    }

    pub fn reset(&self) {
        self.dispatch(Msg::ResetClicked);
    }

    /// Submits the staged batch as one upload and drives the stages to
    /// `Complete` or `Failed`. The navigation hand-off is scheduled, not awaited.
    pub async fn submit(&self) -> Result<BatchResult, UploadError> {
        let mut queue: VecDeque<Effect> = self.dispatch(Msg::SubmitClicked).into();
        let mut settled = None;

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::SubmitRefused(err) => settled = Some(Err(err)),
                Effect::PaceStage { stage } => {
                    self.pacer.pause(self.pacing.for_stage(stage)).await;
                    queue.extend(self.dispatch(Msg::StagePaced { stage }));
                }
                Effect::UploadBatch { files } => {
                    upload_info!("uploading batch of {} files", files.len());
                    let result = self.uploader.upload(&files).await;
                    settled = Some(result.clone());
                    queue.extend(self.dispatch(Msg::UploadFinished(result)));
                }
                Effect::ScheduleNavigation { ticket } => self.schedule_navigation(ticket),
                Effect::Navigate => self.navigator.navigate(),
            }
        }

        // Every accepted submit reaches the upload effect, every refused one says why.
        settled.unwrap_or(Err(UploadError::SubmitInFlight))
    }

    fn schedule_navigation(&self, ticket: NavigationTicket) {
        let session = self.clone();
        let delay = self.pacing.navigation;
        upload_debug!("navigation ticket {} due in {:?}", ticket, delay);
        tokio::spawn(async move {
            session.pacer.pause(delay).await;
            for effect in session.dispatch(Msg::NavigationDue { ticket }) {
                if effect == Effect::Navigate {
                    session.navigator.navigate();
                }
            }
        });
    }

    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let mut state = self.lock();
        self.apply(&mut state, msg)
    }

    fn apply(&self, slot: &mut UploadState, msg: Msg) -> Vec<Effect> {
        let state = std::mem::take(slot);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.shared.snapshots.send_replace(state.view());
        }
        *slot = state;
        effects
    }

    fn lock(&self) -> MutexGuard<'_, UploadState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
