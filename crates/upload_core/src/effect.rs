use crate::{CandidateFile, NavigationTicket, Stage, UploadError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Wait the pacing delay for `stage`, then send `Msg::StagePaced`.
    PaceStage { stage: Stage },
    /// Call the batch upload collaborator once with every file.
    UploadBatch { files: Vec<CandidateFile> },
    /// Wait the navigation delay, then send `Msg::NavigationDue`.
    ScheduleNavigation { ticket: NavigationTicket },
    /// Hand off to the navigation collaborator.
    Navigate,
    SubmitRefused(UploadError),
}
