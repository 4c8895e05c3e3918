use crate::{BatchResult, CandidateFile, EntryId, NavigationTicket, Stage, UploadError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked files; validated as one all-or-nothing group.
    FilesPicked(Vec<CandidateFile>),
    /// User removed one staged entry.
    RemoveEntry { entry_id: EntryId },
    /// Remove every staged entry with this name.
    RemoveNamed { file_name: String },
    /// User clicked Reset.
    ResetClicked,
    /// User clicked Upload.
    SubmitClicked,
    /// The pacing delay for `stage` elapsed.
    StagePaced { stage: Stage },
    /// The batch upload call returned, already normalized.
    UploadFinished(Result<BatchResult, UploadError>),
    /// The post-completion delay for a scheduled hand-off elapsed.
    NavigationDue { ticket: NavigationTicket },
    NoOp,
}
