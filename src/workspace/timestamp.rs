// src/workspace/timestamp.rs

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::errors::{DlwatchError, Result};

/// `20250131174502`: sortable, and safe as a single path component.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Parse an IANA timezone name such as `"Asia/Tokyo"` or `"UTC"`.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DlwatchError::InvalidTimezone(name.to_string()))
}

/// Render `now` in `tz` using a strftime-style `format`.
///
/// The result names a directory, so it must be non-empty and must not
/// contain a path separator.
pub fn render_timestamp(now: DateTime<Utc>, format: &str, tz: Tz) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", now.with_timezone(&tz).format(format))
        .map_err(|_| DlwatchError::InvalidTimestampFormat(format.to_string()))?;

    if out.trim().is_empty() {
        return Err(DlwatchError::InvalidTimestampFormat(format!(
            "'{format}' renders an empty name"
        )));
    }
    if out.contains(['/', '\\']) {
        return Err(DlwatchError::InvalidTimestampFormat(format!(
            "'{format}' renders '{out}', which contains a path separator"
        )));
    }
    Ok(out)
}
