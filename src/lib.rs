// src/lib.rs

pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;
pub mod workspace;

use std::collections::BTreeSet;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{BaselineArgs, CliArgs, Command, TimingArgs};
use crate::config::{WatchSettings, load_or_default};
use crate::fs::RealFileSystem;
use crate::watch::{
    EntryFilter, PollSchedule, WatchRequest, WatchResult, await_completed_download_async,
    latest_file, new_entry_request, snapshot, wait_for_file_async, wait_for_readable_file_async,
};
use crate::workspace::{BootstrapOptions, WorkspaceLayout, parse_timezone};

/// Exit status when a wait timed out or there was nothing to report.
pub const EXIT_NOT_FOUND: u8 = 2;

/// High-level entry point used by `main.rs`.
///
/// Loads the config, applies CLI overrides, runs one command, and maps its
/// outcome to an exit code: 0 when something was found or done,
/// [`EXIT_NOT_FOUND`] on timeout / nothing found. Errors are returned.
pub async fn run(args: CliArgs) -> Result<ExitCode> {
    let cfg = load_or_default(args.config.as_deref()).context("loading configuration")?;
    debug!(?cfg, "resolved configuration");

    let fs = RealFileSystem;

    match args.command {
        Command::Download {
            folder,
            name,
            baseline,
            timing,
            partial_suffixes,
        } => {
            let mut request = WatchRequest::from_settings(&folder, &cfg.watch)?
                .schedule(schedule_for(&cfg.watch, timing));
            if !partial_suffixes.is_empty() {
                request = request.filter(EntryFilter::new(partial_suffixes, &cfg.watch.exclude)?);
            }
            if let Some(name) = name {
                request = request.expected_name(name);
            }
            if let Some(names) = read_baseline(&baseline)? {
                request = request.baseline(names);
            }

            let result = await_completed_download_async(&fs, &request).await?;
            Ok(emit(result))
        }

        Command::NewFile {
            folder,
            baseline,
            timing,
        } => {
            let request = new_entry_request(
                &folder,
                read_baseline(&baseline)?,
                schedule_for(&cfg.watch, timing),
            );
            let result = await_completed_download_async(&fs, &request).await?;
            Ok(emit(result))
        }

        Command::Exists { path, timing } => {
            let result = wait_for_file_async(&fs, &path, schedule_for(&cfg.watch, timing)).await?;
            Ok(emit(result))
        }

        Command::Ready { path, timing } => {
            let result =
                wait_for_readable_file_async(&fs, &path, schedule_for(&cfg.watch, timing)).await?;
            Ok(emit(result))
        }

        Command::Latest { folder } => {
            let latest = latest_file(&fs, &folder)?;
            Ok(emit(WatchResult::from(latest)))
        }

        Command::Snapshot { folder } => {
            for name in snapshot(&fs, &folder)? {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Init {
            root,
            timestamp_format,
            timezone,
            dry_run,
        } => {
            let mut options = BootstrapOptions::from_settings(&cfg.workspace);
            if let Some(root) = root {
                options.root = root;
            }
            if let Some(format) = timestamp_format {
                options.timestamp_format = format;
            }
            if let Some(tz) = timezone {
                options.timezone = parse_timezone(&tz)?;
            }

            let layout = if dry_run {
                WorkspaceLayout::plan_now(&options)?
            } else {
                WorkspaceLayout::initialize(&options).context("initializing workspace")?
            };
            println!("{}", serde_json::to_string_pretty(&layout)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Config values, overridden by whatever was passed on the command line.
fn schedule_for(settings: &WatchSettings, timing: TimingArgs) -> PollSchedule {
    PollSchedule::new(
        timing
            .timeout
            .map_or(settings.timeout, |d| d.as_duration()),
        timing
            .poll_interval
            .map_or(settings.poll_interval, |d| d.as_duration()),
    )
}

/// Merge `--baseline` names and `--baseline-file` lines.
///
/// `None` when neither was given, so the waiter snapshots on its own.
fn read_baseline(args: &BaselineArgs) -> Result<Option<BTreeSet<String>>> {
    if args.names.is_empty() && args.file.is_none() {
        return Ok(None);
    }

    let mut names: BTreeSet<String> = args.names.iter().cloned().collect();
    if let Some(file) = &args.file {
        names.extend(read_name_list(file)?);
    }
    Ok(Some(names))
}

fn read_name_list(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading baseline file {:?}", path))?;
    // `lines` drops `\n` / `\r\n`; anything else, trailing spaces included,
    // is part of the entry name.
    Ok(contents
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn emit(result: WatchResult) -> ExitCode {
    match result {
        WatchResult::Found(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        WatchResult::TimedOut => {
            eprintln!("dlwatch: nothing found");
            ExitCode::from(EXIT_NOT_FOUND)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::types::HumanDuration;

    #[test]
    fn cli_timing_overrides_config() {
        let settings = config::ConfigFile::default().watch;
        let timing = TimingArgs {
            timeout: Some(HumanDuration::from_duration(Duration::from_secs(5))),
            poll_interval: None,
        };

        let schedule = schedule_for(&settings, timing);
        assert_eq!(schedule.timeout, Duration::from_secs(5));
        assert_eq!(schedule.interval, settings.poll_interval);
    }

    #[test]
    fn baseline_merges_flags_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"from-file.txt\n\nshared.txt\n").unwrap();

        let args = BaselineArgs {
            names: vec!["flag.txt".to_string(), "shared.txt".to_string()],
            file: Some(file.path().to_path_buf()),
        };
        let names = read_baseline(&args).unwrap().unwrap();

        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["flag.txt", "from-file.txt", "shared.txt"]
        );
    }

    #[test]
    fn baseline_file_keeps_whitespace_in_names() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"report.pdf \r\n notes.txt\n").unwrap();

        let names = read_name_list(file.path()).unwrap();
        assert_eq!(names, vec!["report.pdf ", " notes.txt"]);
    }

    #[test]
    fn no_baseline_flags_means_self_snapshot() {
        assert!(read_baseline(&BaselineArgs::default()).unwrap().is_none());
    }
}
