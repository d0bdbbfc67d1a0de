// tests/config_loading.rs
mod common;
use crate::common::{TestResult, init_tracing};

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use dlwatch::config::{load_and_validate, load_or_default};
use dlwatch::errors::DlwatchError;
use dlwatch::watch::{EntryFilter, WatchRequest};
use tempfile::NamedTempFile;

fn demo_config() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/Dlwatch.toml")
}

fn write_config(contents: &str) -> Result<NamedTempFile, std::io::Error> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn demo_config_loads() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(demo_config())?;

    assert_eq!(cfg.watch.timeout, Duration::from_secs(90));
    assert_eq!(cfg.watch.poll_interval, Duration::from_millis(500));
    assert_eq!(
        cfg.watch.partial_suffixes,
        vec![".crdownload", ".part", ".tmp"]
    );
    assert_eq!(cfg.watch.exclude, vec!["*.DS_Store", "~$*"]);
    assert_eq!(cfg.workspace.timezone, Tz::Asia__Tokyo);
    assert_eq!(cfg.workspace.timestamp_format, "%Y%m%d%H%M%S");
    Ok(())
}

#[test]
fn demo_config_drives_a_watch_request() -> TestResult {
    let cfg = load_and_validate(demo_config())?;
    let request = WatchRequest::from_settings("Downloads", &cfg.watch)?;

    assert_eq!(request.poll_schedule().timeout, Duration::from_secs(90));
    assert_eq!(request.poll_schedule().interval, Duration::from_millis(500));

    let filter: &EntryFilter = request.entry_filter();
    assert!(filter.is_excluded("~$report.xlsx"));
    assert!(filter.is_in_progress("movie.mkv.PART"));
    assert!(filter.admits("report.xlsx"));
    Ok(())
}

#[test]
fn partial_sections_fall_back_to_defaults() -> TestResult {
    let file = write_config("[watch]\ntimeout = \"2m\"\n")?;
    let cfg = load_and_validate(file.path())?;

    assert_eq!(cfg.watch.timeout, Duration::from_secs(120));
    assert_eq!(cfg.watch.poll_interval, Duration::from_secs(1));
    assert_eq!(cfg.workspace.timezone, Tz::UTC);
    assert_eq!(cfg.workspace.root, PathBuf::from("."));
    Ok(())
}

#[test]
fn zero_poll_interval_is_rejected() -> TestResult {
    let file = write_config("[watch]\npoll_interval = \"0s\"\n")?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DlwatchError::ConfigError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn unknown_timezone_is_rejected() -> TestResult {
    let file = write_config("[workspace]\ntimezone = \"Atlantis/Capital\"\n")?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DlwatchError::InvalidTimezone(_)), "got {err:?}");
    Ok(())
}

#[test]
fn malformed_duration_is_a_toml_error() -> TestResult {
    let file = write_config("[watch]\ntimeout = \"soon\"\n")?;
    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, DlwatchError::TomlError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn explicit_missing_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("nope.toml");

    let err = load_or_default(Some(&missing)).unwrap_err();
    assert!(matches!(err, DlwatchError::IoError(_)), "got {err:?}");
    Ok(())
}
