use std::collections::{BTreeMap, BTreeSet};

use upload_logging::{upload_info, upload_warn};

use crate::view_model::{SessionSnapshot, StagedFileView};
use crate::{
    BatchResult, CandidateFile, Constraints, Stage, StageTracker, UploadSuccess, ValidationError,
};

pub type EntryId = u64;
pub type NavigationTicket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub id: EntryId,
    pub file: CandidateFile,
}

/// What happened to the most recent pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Staged(Vec<EntryId>),
    /// Nothing from the pick was staged, including files that passed on their own.
    Rejected(Vec<ValidationError>),
    Ignored,
    Busy,
    /// The session reached `Complete` or `Failed`; reset before picking again.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    constraints: Constraints,
    staged: Vec<StagedEntry>,
    next_entry_id: EntryId,
    tracker: StageTracker,
    per_file_progress: BTreeMap<String, u8>,
    analysis_pending: BTreeSet<String>,
    uploaded: Vec<UploadSuccess>,
    error_message: Option<String>,
    last_pick: Option<PickOutcome>,
    next_ticket: NavigationTicket,
    pending_navigation: Option<NavigationTicket>,
    navigated: bool,
    dirty: bool,
}

impl UploadState {
    pub fn new(constraints: Constraints) -> Self {
        Self {
            constraints,
            ..Self::default()
        }
    }

    pub fn view(&self) -> SessionSnapshot {
        let staged = self
            .staged
            .iter()
            .map(|entry| StagedFileView {
                entry_id: entry.id,
                name: entry.file.name().to_string(),
                size_bytes: entry.file.size_bytes(),
                progress: self
                    .per_file_progress
                    .get(entry.file.name())
                    .copied()
                    .unwrap_or(0),
                analysis_pending: self.analysis_pending.contains(entry.file.name()),
            })
            .collect();

        SessionSnapshot {
            stage: self.tracker.stage(),
            overall_progress: self.tracker.overall_progress(),
            stages_reached: self.tracker.history().to_vec(),
            staged,
            per_file_progress: self.per_file_progress.clone(),
            analysis_pending: self.analysis_pending.iter().cloned().collect(),
            uploaded: self.uploaded.clone(),
            error_message: self.error_message.clone(),
            last_pick: self.last_pick.clone(),
            navigation_scheduled: self.pending_navigation.is_some(),
            navigated: self.navigated,
            constraints: self.constraints.clone(),
            dirty: self.dirty,
        }
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn stage(&self) -> Stage {
        self.tracker.stage()
    }

    pub fn staged(&self) -> &[StagedEntry] {
        &self.staged
    }

    pub fn per_file_progress(&self) -> &BTreeMap<String, u8> {
        &self.per_file_progress
    }

    pub fn uploaded(&self) -> &[UploadSuccess] {
        &self.uploaded
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn last_pick(&self) -> Option<&PickOutcome> {
        self.last_pick.as_ref()
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_last_pick(&mut self, outcome: PickOutcome) {
        self.last_pick = Some(outcome);
        self.mark_dirty();
    }

    pub(crate) fn set_error(&mut self, message: Option<String>) {
        if self.error_message != message {
            self.error_message = message;
            self.mark_dirty();
        }
    }

    pub(crate) fn stage_files(&mut self, files: Vec<CandidateFile>) -> Vec<EntryId> {
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            self.next_entry_id += 1;
            ids.push(self.next_entry_id);
            self.staged.push(StagedEntry {
                id: self.next_entry_id,
                file,
            });
        }
        self.mark_dirty();
        ids
    }

    pub(crate) fn staged_files(&self) -> Vec<CandidateFile> {
        self.staged.iter().map(|entry| entry.file.clone()).collect()
    }

    pub(crate) fn remove_entry(&mut self, entry_id: EntryId) -> bool {
        let Some(index) = self.staged.iter().position(|entry| entry.id == entry_id) else {
            return false;
        };
        let entry = self.staged.remove(index);
        let name = entry.file.name();
        if !self.staged.iter().any(|other| other.file.name() == name) {
            self.forget_name(name);
        }
        self.mark_dirty();
        true
    }

    /// Removes every staged entry carrying `file_name`.
    pub(crate) fn remove_named(&mut self, file_name: &str) -> usize {
        let before = self.staged.len();
        self.staged.retain(|entry| entry.file.name() != file_name);
        let removed = before - self.staged.len();
        if removed > 0 {
            self.forget_name(file_name);
            self.mark_dirty();
        }
        removed
    }

    fn forget_name(&mut self, file_name: &str) {
        self.per_file_progress.remove(file_name);
        self.analysis_pending.remove(file_name);
    }

    /// Back to `Idle` with an empty batch. Uploaded results survive.
    pub(crate) fn reset(&mut self) {
        self.staged.clear();
        self.per_file_progress.clear();
        self.analysis_pending.clear();
        self.error_message = None;
        self.last_pick = None;
        self.pending_navigation = None;
        self.navigated = false;
        self.tracker.reset();
        self.mark_dirty();
    }

    pub(crate) fn advance(&mut self, next: Stage) -> bool {
        match self.tracker.advance(next) {
            Ok(()) => {
                upload_info!("stage -> {:?}", next);
                self.mark_dirty();
                true
            }
            Err(err) => {
                upload_warn!("{}", err);
                false
            }
        }
    }

    pub(crate) fn record_batch(&mut self, result: &BatchResult) {
        for success in &result.successes {
            self.per_file_progress
                .insert(success.file_name.clone(), 100);
            self.analysis_pending.insert(success.file_name.clone());
        }
        self.uploaded.extend(result.successes.iter().cloned());
        self.mark_dirty();
    }

    pub(crate) fn schedule_navigation(&mut self) -> NavigationTicket {
        self.next_ticket += 1;
        self.pending_navigation = Some(self.next_ticket);
        self.mark_dirty();
        self.next_ticket
    }

    /// Consumes the pending hand-off if `ticket` is still the current one.
    pub(crate) fn take_navigation(&mut self, ticket: NavigationTicket) -> bool {
        if self.pending_navigation != Some(ticket) || self.stage() != Stage::Complete {
            return false;
        }
        self.pending_navigation = None;
        self.navigated = true;
        self.staged.clear();
        self.mark_dirty();
        true
    }
}
