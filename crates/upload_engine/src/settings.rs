use std::time::Duration;

use upload_core::Stage;

pub(crate) const SUPPORTED_FORMATS_PATH: &str = "supported-formats";
pub(crate) const UPLOAD_MULTIPLE_PATH: &str = "upload-multiple";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base of the uploads API, e.g. `http://host/api/uploads`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub bearer_token: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api/uploads".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(300),
            bearer_token: None,
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Fixed delays used to pace the stage display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingSettings {
    pub validating: Duration,
    pub starting_analysis: Duration,
    /// Time between `Complete` and the hand-off to the uploaded list.
    pub navigation: Duration,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            validating: Duration::from_millis(500),
            starting_analysis: Duration::from_millis(1000),
            navigation: Duration::from_millis(2000),
        }
    }
}

impl PacingSettings {
    pub fn zero() -> Self {
        Self {
            validating: Duration::ZERO,
            starting_analysis: Duration::ZERO,
            navigation: Duration::ZERO,
        }
    }

    pub fn for_stage(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Validating => self.validating,
            Stage::StartingAnalysis => self.starting_analysis,
            _ => Duration::ZERO,
        }
    }
}
