use std::path::{Path, PathBuf};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use upload_core::{CandidateFile, PickOutcome};
use upload_engine::{
    ChannelNavigator, ReqwestBatchUploader, ReqwestConstraintSource, TokioPacer, UploadSession,
};
use upload_logging::{upload_error, upload_info};

use super::logging::{self, LogDestination};
use super::render;
use super::settings::{self, AppSettings, DEFAULT_SETTINGS_FILENAME};

/// Upload a batch of call recordings and start their analysis.
#[derive(Debug, Parser)]
#[command(name = "upload_app", version)]
struct Cli {
    /// Files to upload together as one batch.
    #[arg(required_unless_present = "init_settings")]
    files: Vec<PathBuf>,

    /// Base URL of the uploads API; overrides the settings file.
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, env = "UPLOAD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// RON settings file.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILENAME)]
    settings: PathBuf,

    /// Write the effective settings to the settings file and exit.
    #[arg(long)]
    init_settings: bool,

    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log: LogDestination,

    #[arg(short, long)]
    verbose: bool,
}

pub fn run_app() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log, cli.verbose);

    let mut settings = settings::load_settings(&cli.settings);
    if let Some(base_url) = cli.base_url.clone() {
        settings.client.base_url = base_url;
    }
    if let Some(token) = cli.token.clone() {
        settings.client.bearer_token = Some(token);
    }

    if cli.init_settings {
        settings::write_settings(&cli.settings, &settings)?;
        println!("Wrote {}", cli.settings.display());
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    runtime.block_on(upload_batch(settings, cli.files))
}

async fn upload_batch(settings: AppSettings, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let files = paths
        .iter()
        .map(|path| candidate_from_path(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let (nav_tx, nav_rx) = mpsc::channel();
    let session = UploadSession::open(
        &ReqwestConstraintSource::new(settings.client.clone()),
        Arc::new(ReqwestBatchUploader::new(settings.client.clone())),
        Arc::new(ChannelNavigator::new(nav_tx)),
    )
    .await
    .with_pacing(Arc::new(TokioPacer), settings.pacing);

    let mut snapshots = session.subscribe();
    tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let view = snapshots.borrow_and_update().clone();
            println!("{}", render::status_line(&view));
            println!("{}", render::step_indicator(&view));
        }
    });

    match session.pick(files) {
        PickOutcome::Staged(ids) => upload_info!("staged {} files", ids.len()),
        PickOutcome::Rejected(rejected) => {
            if let Some(message) = session.snapshot().error_message {
                eprintln!("{message}");
            }
            bail!("{} of the selected files cannot be uploaded", rejected.len());
        }
        PickOutcome::Ignored | PickOutcome::Busy | PickOutcome::Finished => {
            bail!("nothing to upload")
        }
    }
    for line in render::file_lines(&session.snapshot()) {
        println!("{line}");
    }

    if let Err(err) = session.submit().await {
        upload_error!("upload did not complete: {}", err);
        bail!("{err}");
    }

    let view = session.snapshot();
    if let Some(message) = &view.error_message {
        eprintln!("Some files were not uploaded:\n{message}");
    }
    for line in render::file_lines(&view) {
        println!("{line}");
    }

    let wait = settings.pacing.navigation + Duration::from_secs(1);
    let navigated = tokio::task::spawn_blocking(move || nav_rx.recv_timeout(wait).is_ok())
        .await
        .unwrap_or(false);
    if navigated {
        println!("Uploaded calls:");
        for line in render::uploaded_lines(&session.snapshot()) {
            println!("{line}");
        }
    }
    Ok(())
}

fn candidate_from_path(path: &Path) -> anyhow::Result<CandidateFile> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a file", path.display());
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))?;
    Ok(CandidateFile::from_path(name, path, metadata.len()))
}
