#![allow(dead_code)]

use std::time::Duration;

pub use dlwatch_test_utils::downloads::DownloadDir;
pub use dlwatch_test_utils::init_tracing;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Short timings so real-filesystem tests stay fast.
pub const POLL: Duration = Duration::from_millis(25);
pub const PATIENCE: Duration = Duration::from_secs(5);
