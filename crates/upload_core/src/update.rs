use upload_logging::{upload_debug, upload_error, upload_info, upload_warn};

use crate::{
    validate, BatchResult, CandidateFile, Effect, ErrorReport, Msg, PickOutcome, Stage, UploadError,
    UploadState,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: UploadState, msg: Msg) -> (UploadState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesPicked(files) => {
            pick_files(&mut state, files);
            Vec::new()
        }
        Msg::RemoveEntry { entry_id } => {
            if refuse_while_busy(&state, "remove") {
                return (state, Vec::new());
            }
            if !state.remove_entry(entry_id) {
                upload_debug!("remove: no staged entry {}", entry_id);
            }
            Vec::new()
        }
        Msg::RemoveNamed { file_name } => {
            if refuse_while_busy(&state, "remove") {
                return (state, Vec::new());
            }
            let removed = state.remove_named(&file_name);
            upload_debug!("removed {} entries named {:?}", removed, file_name);
            Vec::new()
        }
        Msg::ResetClicked => {
            // No cancellation: an in-flight submit runs to Complete or Failed first.
            if refuse_while_busy(&state, "reset") {
                return (state, Vec::new());
            }
            state.reset();
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::StagePaced { stage } => {
            if stage != state.stage() {
                upload_debug!("stale pacing for {:?} while {:?}", stage, state.stage());
                return (state, Vec::new());
            }
            match stage {
                Stage::Validating => {
                    state.advance(Stage::Uploading);
                    vec![Effect::UploadBatch {
                        files: state.staged_files(),
                    }]
                }
                Stage::StartingAnalysis => {
                    state.advance(Stage::Complete);
                    vec![Effect::ScheduleNavigation {
                        ticket: state.schedule_navigation(),
                    }]
                }
                _ => Vec::new(),
            }
        }
        Msg::UploadFinished(result) => {
            if state.stage() != Stage::Uploading {
                upload_warn!("upload result arrived while {:?}; dropped", state.stage());
                return (state, Vec::new());
            }
            match result {
                Ok(batch) => apply_batch(&mut state, batch),
                Err(err) => {
                    upload_error!("upload failed: {}", err);
                    state.advance(Stage::Failed);
                    state.set_error(ErrorReport::new().push_error(&err).message());
                    Vec::new()
                }
            }
        }
        Msg::NavigationDue { ticket } => {
            if state.take_navigation(ticket) {
                upload_info!("handing off to uploaded list");
                vec![Effect::Navigate]
            } else {
                upload_debug!("navigation ticket {} no longer current", ticket);
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn pick_files(state: &mut UploadState, files: Vec<CandidateFile>) {
    if files.is_empty() {
        state.set_last_pick(PickOutcome::Ignored);
        return;
    }
    if refuse_while_busy(state, "pick") {
        state.set_last_pick(PickOutcome::Busy);
        return;
    }
    if state.stage().is_terminal() {
        upload_warn!("pick of {} files refused while {:?}", files.len(), state.stage());
        let err = UploadError::SessionFinished;
        state.set_error(ErrorReport::new().push_error(&err).message());
        state.set_last_pick(PickOutcome::Finished);
        return;
    }

    let report = validate(&files, state.constraints());
    if !report.is_clean() {
        upload_warn!(
            "pick of {} files rejected: {} invalid",
            files.len(),
            report.rejected.len()
        );
        state.set_error(ErrorReport::new().push_rejections(&report.rejected).message());
        state.set_last_pick(PickOutcome::Rejected(report.rejected));
        return;
    }

    let ids = state.stage_files(report.accepted);
    state.set_error(None);
    state.set_last_pick(PickOutcome::Staged(ids));
}

fn submit(state: &mut UploadState) -> Vec<Effect> {
    let stage = state.stage();
    let refusal = if stage.is_busy() {
        Some(UploadError::SubmitInFlight)
    } else if stage.is_terminal() {
        Some(UploadError::SessionFinished)
    } else if state.staged().is_empty() {
        Some(UploadError::EmptySelection)
    } else {
        None
    };

    if let Some(err) = refusal {
        upload_warn!("submit refused: {}", err);
        if err == UploadError::EmptySelection {
            state.set_error(ErrorReport::new().push_error(&err).message());
        }
        return vec![Effect::SubmitRefused(err)];
    }

    state.set_error(None);
    state.advance(Stage::Validating);
    vec![Effect::PaceStage {
        stage: Stage::Validating,
    }]
}

fn apply_batch(state: &mut UploadState, batch: BatchResult) -> Vec<Effect> {
    upload_info!(
        "batch returned {} successes, {} failures",
        batch.successes.len(),
        batch.failures.len()
    );
    for failure in &batch.failures {
        upload_warn!("{} not uploaded: {}", failure.file_name, failure.reason);
    }
    state.record_batch(&batch);
    state.set_error(ErrorReport::new().push_failures(&batch.failures).message());

    if batch.successes.is_empty() {
        state.advance(Stage::Complete);
        vec![Effect::ScheduleNavigation {
            ticket: state.schedule_navigation(),
        }]
    } else {
        state.advance(Stage::StartingAnalysis);
        vec![Effect::PaceStage {
            stage: Stage::StartingAnalysis,
        }]
    }
}

fn refuse_while_busy(state: &UploadState, action: &str) -> bool {
    if state.stage().is_busy() {
        upload_warn!("{} ignored while {:?}", action, state.stage());
        return true;
    }
    false
}
