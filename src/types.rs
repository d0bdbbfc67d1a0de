use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// A duration written the way humans write them in config files and on the
/// command line: `"250ms"`, `"3s"`, `"1m"`, `"2h"`.
///
/// Deserializes from a TOML string and parses from CLI arguments through the
/// same [`FromStr`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct HumanDuration(Duration);

impl HumanDuration {
    pub const fn from_duration(d: Duration) -> Self {
        Self(d)
    }

    pub const fn as_duration(self) -> Duration {
        self.0
    }
}

impl From<HumanDuration> for Duration {
    fn from(value: HumanDuration) -> Self {
        value.0
    }
}

impl TryFrom<String> for HumanDuration {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_duration(s).map(Self)
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0.as_millis();
        if ms % 3_600_000 == 0 && ms > 0 {
            write!(f, "{}h", ms / 3_600_000)
        } else if ms % 60_000 == 0 && ms > 0 {
            write!(f, "{}m", ms / 60_000)
        } else if ms % 1_000 == 0 {
            write!(f, "{}s", ms / 1_000)
        } else {
            write!(f, "{ms}ms")
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix (ms, s, m, h)"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let too_large = || format!("duration '{s}' is too large");
    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => value
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(too_large),
        "h" => value
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .ok_or_else(too_large),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_units() {
        assert_eq!("250ms".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_millis(250));
        assert_eq!("3s".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_secs(3));
        assert_eq!(" 2M ".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_secs(120));
        assert_eq!("1h".parse::<HumanDuration>().unwrap().as_duration(), Duration::from_secs(3600));
        assert_eq!("0s".parse::<HumanDuration>().unwrap().as_duration(), Duration::ZERO);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!("".parse::<HumanDuration>().is_err());
        assert!("10".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
        assert!("5 days".parse::<HumanDuration>().is_err());
        assert!("-1s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn rejects_overflowing_durations() {
        let err = "6000000000000000h".parse::<HumanDuration>().unwrap_err();
        assert!(err.contains("too large"), "got {err}");
        assert!("400000000000000000m".parse::<HumanDuration>().is_err());
        assert_eq!(
            "5124095576030431h".parse::<HumanDuration>().unwrap().as_duration(),
            Duration::from_secs(5_124_095_576_030_431 * 3600)
        );
    }

    #[test]
    fn display_uses_largest_whole_unit() {
        assert_eq!(HumanDuration::from_duration(Duration::from_secs(7200)).to_string(), "2h");
        assert_eq!(HumanDuration::from_duration(Duration::from_secs(90)).to_string(), "90s");
        assert_eq!(HumanDuration::from_duration(Duration::from_millis(1500)).to_string(), "1500ms");
        assert_eq!(HumanDuration::from_duration(Duration::ZERO).to_string(), "0s");
    }
}
