//! Upload core: pure batch-upload state machine and view-model helpers.
mod constraints;
mod effect;
mod error;
mod file;
mod msg;
mod outcome;
mod stage;
mod state;
mod update;
mod validate;
mod view_model;

pub use constraints::{
    Constraints, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILES_PER_BATCH,
    DEFAULT_MAX_FILE_SIZE_BYTES,
};
pub use effect::Effect;
pub use error::{ErrorReport, UploadError};
pub use file::{mime_for_extension, CandidateFile, FileSource};
pub use msg::Msg;
pub use outcome::{BatchResult, UploadFailure, UploadOutcome, UploadSuccess};
pub use stage::{Stage, StageTracker, StageTransitionError};
pub use state::{EntryId, NavigationTicket, PickOutcome, StagedEntry, UploadState};
pub use update::update;
pub use validate::{extension_of, validate, ValidationError, ValidationReason, ValidationReport};
pub use view_model::{SessionSnapshot, StagedFileView};
