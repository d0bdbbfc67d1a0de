// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::types::HumanDuration;
use crate::watch::DEFAULT_PARTIAL_SUFFIXES;
use crate::watch::poll::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT};
use crate::workspace::{DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMEZONE};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [watch]
/// timeout = "60s"
/// poll_interval = "1s"
/// partial_suffixes = [".crdownload", ".part", ".tmp"]
/// exclude = ["*.DS_Store"]
///
/// [workspace]
/// root = "."
/// timestamp_format = "%Y%m%d%H%M%S"
/// timezone = "UTC"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Waiter defaults from `[watch]`.
    #[serde(default)]
    pub watch: RawWatchSection,

    /// Run directory layout from `[workspace]`.
    #[serde(default)]
    pub workspace: RawWorkspaceSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWatchSection {
    /// How long a waiter keeps polling before reporting a timeout.
    #[serde(default = "default_timeout")]
    pub timeout: HumanDuration,

    /// Pause between polls. Must be greater than zero.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: HumanDuration,

    /// Name suffixes marking a transfer still in progress.
    #[serde(default = "default_partial_suffixes")]
    pub partial_suffixes: Vec<String>,

    /// Globs (matched against bare entry names) that are never reported.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_timeout() -> HumanDuration {
    HumanDuration::from_duration(DEFAULT_TIMEOUT)
}

fn default_poll_interval() -> HumanDuration {
    HumanDuration::from_duration(DEFAULT_POLL_INTERVAL)
}

fn default_partial_suffixes() -> Vec<String> {
    DEFAULT_PARTIAL_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

impl Default for RawWatchSection {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            partial_suffixes: default_partial_suffixes(),
            exclude: Vec::new(),
        }
    }
}

/// `[workspace]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWorkspaceSection {
    /// Directory under which `data/` is (re)created.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// strftime-style format naming each run directory.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,

    /// IANA timezone the timestamp is rendered in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for RawWorkspaceSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            timestamp_format: default_timestamp_format(),
            timezone: default_timezone(),
        }
    }
}

/// Validated configuration. Built from [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub watch: WatchSettings,
    pub workspace: WorkspaceSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSettings {
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub partial_suffixes: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceSettings {
    pub root: PathBuf,
    pub timestamp_format: String,
    pub timezone: Tz,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(watch: WatchSettings, workspace: WorkspaceSettings) -> Self {
        Self { watch, workspace }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            watch: WatchSettings {
                timeout: DEFAULT_TIMEOUT,
                poll_interval: DEFAULT_POLL_INTERVAL,
                partial_suffixes: default_partial_suffixes(),
                exclude: Vec::new(),
            },
            workspace: WorkspaceSettings {
                root: default_root(),
                timestamp_format: default_timestamp_format(),
                timezone: Tz::UTC,
            },
        }
    }
}
