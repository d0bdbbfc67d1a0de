// src/config/validate.rs

use chrono::Utc;

use crate::config::model::{
    ConfigFile, RawConfigFile, RawWatchSection, RawWorkspaceSection, WatchSettings,
    WorkspaceSettings,
};
use crate::errors::{DlwatchError, Result};
use crate::watch::filter::build_globset;
use crate::workspace::{parse_timezone, render_timestamp};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::DlwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let watch = validate_watch(raw.watch)?;
        let workspace = validate_workspace(raw.workspace)?;
        Ok(ConfigFile::new_unchecked(watch, workspace))
    }
}

fn validate_watch(raw: RawWatchSection) -> Result<WatchSettings> {
    if raw.poll_interval.as_duration().is_zero() {
        return Err(DlwatchError::ConfigError(
            "[watch].poll_interval must be greater than zero".to_string(),
        ));
    }

    if raw.partial_suffixes.iter().any(|s| s.trim().is_empty()) {
        return Err(DlwatchError::ConfigError(
            "[watch].partial_suffixes must not contain empty entries".to_string(),
        ));
    }

    if !raw.exclude.is_empty() {
        build_globset(&raw.exclude).map_err(|e| {
            DlwatchError::ConfigError(format!("[watch].exclude has an invalid pattern: {e}"))
        })?;
    }

    Ok(WatchSettings {
        timeout: raw.timeout.into(),
        poll_interval: raw.poll_interval.into(),
        partial_suffixes: raw.partial_suffixes,
        exclude: raw.exclude,
    })
}

fn validate_workspace(raw: RawWorkspaceSection) -> Result<WorkspaceSettings> {
    let timezone = parse_timezone(&raw.timezone)?;

    // Catch bad formats at load time rather than at the start of a run.
    render_timestamp(Utc::now(), &raw.timestamp_format, timezone)?;

    Ok(WorkspaceSettings {
        root: raw.root,
        timestamp_format: raw.timestamp_format,
        timezone,
    })
}
