use upload_core::{SessionSnapshot, Stage};

const STEPS: [(Stage, &str); 4] = [
    (Stage::Validating, "Validating"),
    (Stage::Uploading, "Uploading"),
    (Stage::StartingAnalysis, "Starting analysis"),
    (Stage::Complete, "Complete"),
];

pub fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Idle => "Idle",
        Stage::Validating => "Validating",
        Stage::Uploading => "Uploading",
        Stage::StartingAnalysis => "Starting analysis",
        Stage::Complete => "Complete",
        Stage::Failed => "Failed",
    }
}

pub fn status_line(view: &SessionSnapshot) -> String {
    format!(
        "Stage: {} ({}%) | Staged: {} | Uploaded: {}",
        stage_label(view.stage),
        view.overall_progress,
        view.staged.len(),
        view.uploaded.len()
    )
}

/// `[x]` for steps reached since the last reset, `[!]` where the pipeline failed.
pub fn step_indicator(view: &SessionSnapshot) -> String {
    let mut parts: Vec<String> = STEPS
        .iter()
        .map(|(stage, label)| {
            let mark = if view.stages_reached.contains(stage) {
                "x"
            } else {
                " "
            };
            format!("[{mark}] {label}")
        })
        .collect();
    if view.stage == Stage::Failed {
        parts.push("[!] Failed".to_string());
    }
    parts.join("  ")
}

pub fn file_lines(view: &SessionSnapshot) -> Vec<String> {
    view.staged
        .iter()
        .map(|file| {
            let note = if file.analysis_pending {
                " (uploaded, analysis pending)"
            } else {
                ""
            };
            format!(
                "  #{} {} {} bytes {}%{}",
                file.entry_id, file.name, file.size_bytes, file.progress, note
            )
        })
        .collect()
}

pub fn uploaded_lines(view: &SessionSnapshot) -> Vec<String> {
    view.uploaded
        .iter()
        .map(|success| match &success.remote_id {
            Some(id) => format!("  {} -> #{}", success.file_name, id),
            None => format!("  {}", success.file_name),
        })
        .collect()
}
