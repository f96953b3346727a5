pub mod config;
pub mod driver;
pub mod event_log;
pub mod monitor;
pub mod probe;
pub mod report;
pub mod stats;

pub use config::AppConfig;
pub use monitor::{MonitorState, OutageRecord, Transition};
pub use probe::{ProbeResult, ProbeSource, Prober, TestType};
pub use stats::{Summary, summarize};

/// Timestamp format shared by the event log, the report and console notices.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";
