use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use upload_engine::{ClientSettings, PacingSettings};
use upload_logging::{upload_info, upload_warn};

pub(crate) const DEFAULT_SETTINGS_FILENAME: &str = "upload_settings.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
struct PersistedSettings {
    base_url: String,
    bearer_token: Option<String>,
    connect_timeout_ms: u64,
    request_timeout_ms: u64,
    validating_delay_ms: u64,
    analysis_delay_ms: u64,
    navigation_delay_ms: u64,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        AppSettings::default().into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct AppSettings {
    pub client: ClientSettings,
    pub pacing: PacingSettings,
}

impl From<AppSettings> for PersistedSettings {
    fn from(settings: AppSettings) -> Self {
        Self {
            base_url: settings.client.base_url,
            bearer_token: settings.client.bearer_token,
            connect_timeout_ms: millis(settings.client.connect_timeout),
            request_timeout_ms: millis(settings.client.request_timeout),
            validating_delay_ms: millis(settings.pacing.validating),
            analysis_delay_ms: millis(settings.pacing.starting_analysis),
            navigation_delay_ms: millis(settings.pacing.navigation),
        }
    }
}

impl From<PersistedSettings> for AppSettings {
    fn from(persisted: PersistedSettings) -> Self {
        Self {
            client: ClientSettings {
                base_url: persisted.base_url,
                connect_timeout: Duration::from_millis(persisted.connect_timeout_ms),
                request_timeout: Duration::from_millis(persisted.request_timeout_ms),
                bearer_token: persisted.bearer_token,
            },
            pacing: PacingSettings {
                validating: Duration::from_millis(persisted.validating_delay_ms),
                starting_analysis: Duration::from_millis(persisted.analysis_delay_ms),
                navigation: Duration::from_millis(persisted.navigation_delay_ms),
            },
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Loads settings from `path`. A missing or broken file yields the defaults.
pub(crate) fn load_settings(path: &Path) -> AppSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppSettings::default();
        }
        Err(err) => {
            upload_warn!("Failed to read settings from {:?}: {}", path, err);
            return AppSettings::default();
        }
    };

    match ron::from_str::<PersistedSettings>(&content) {
        Ok(persisted) => {
            upload_info!("Loaded settings from {:?}", path);
            persisted.into()
        }
        Err(err) => {
            upload_warn!("Failed to parse settings from {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

pub(crate) fn write_settings(path: &Path, settings: &AppSettings) -> anyhow::Result<()> {
    let persisted = PersistedSettings::from(settings.clone());
    let content = ron::ser::to_string_pretty(&persisted, ron::ser::PrettyConfig::new())
        .context("serialize settings")?;
    fs::write(path, content).with_context(|| format!("write settings to {}", path.display()))
}
