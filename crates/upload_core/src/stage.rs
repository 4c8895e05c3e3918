use thiserror::Error;

/// Pipeline phase shown by step indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Validating,
    Uploading,
    StartingAnalysis,
    Complete,
    Failed,
}

impl Stage {
    /// A submit is in flight; the batch can't be touched and no second submit starts.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            Stage::Validating | Stage::Uploading | Stage::StartingAnalysis
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Complete | Stage::Failed)
    }

    fn can_advance_to(self, next: Stage) -> bool {
        matches!(
            (self, next),
            (Stage::Idle, Stage::Validating)
                | (Stage::Validating, Stage::Uploading)
                | (Stage::Uploading, Stage::StartingAnalysis)
                | (Stage::Uploading, Stage::Complete)
                | (Stage::Uploading, Stage::Failed)
                | (Stage::StartingAnalysis, Stage::Complete)
        )
    }

    fn progress_percent(self) -> Option<u8> {
        match self {
            Stage::Idle | Stage::Validating => Some(25),
            Stage::Uploading => Some(50),
            Stage::StartingAnalysis => Some(75),
            Stage::Complete => Some(100),
            Stage::Failed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal stage transition {from:?} -> {to:?}")]
pub struct StageTransitionError {
    pub from: Stage,
    pub to: Stage,
}

/// Forward-only stage machine. `Idle` is reachable again only through [`StageTracker::reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTracker {
    stage: Stage,
    last_percent: u8,
    history: Vec<Stage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            stage: Stage::Idle,
            last_percent: 25,
            history: vec![Stage::Idle],
        }
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stages reached since the last reset, oldest first.
    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    pub fn advance(&mut self, next: Stage) -> Result<(), StageTransitionError> {
        if !self.stage.can_advance_to(next) {
            return Err(StageTransitionError {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        // Failed keeps the percentage it was entered with.
        if let Some(percent) = next.progress_percent() {
            self.last_percent = percent;
        }
        self.history.push(next);
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Coarse overall progress for the UI; not a byte-level measurement.
    pub fn overall_progress(&self) -> u8 {
        self.last_percent
    }
}
