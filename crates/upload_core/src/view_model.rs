use std::collections::BTreeMap;

use crate::{Constraints, EntryId, PickOutcome, Stage, UploadSuccess};

/// Immutable snapshot of a session for observers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSnapshot {
    pub stage: Stage,
    pub overall_progress: u8,
    pub stages_reached: Vec<Stage>,
    pub staged: Vec<StagedFileView>,
    pub per_file_progress: BTreeMap<String, u8>,
    pub analysis_pending: Vec<String>,
    pub uploaded: Vec<UploadSuccess>,
    pub error_message: Option<String>,
    pub last_pick: Option<PickOutcome>,
    pub navigation_scheduled: bool,
    pub navigated: bool,
    pub constraints: Constraints,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFileView {
    pub entry_id: EntryId,
    pub name: String,
    pub size_bytes: u64,
    pub progress: u8,
    pub analysis_pending: bool,
}
