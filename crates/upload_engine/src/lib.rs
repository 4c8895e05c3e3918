//! Upload engine: remote collaborators and the effect-running upload session.
mod constraints;
mod http;
mod navigate;
mod pacing;
mod session;
mod settings;
mod upload;
mod wire;

pub use constraints::{load_constraints, ConstraintFetchError, ConstraintSource, ReqwestConstraintSource};
pub use navigate::{ChannelNavigator, NavigationRequest, Navigator};
pub use pacing::{InstantPacer, Pacer, TokioPacer};
pub use session::UploadSession;
pub use settings::{ClientSettings, PacingSettings};
pub use upload::{BatchUploader, ReqwestBatchUploader};
pub use wire::normalize_batch_response;
