use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeDelta};
use log::warn;

use crate::TIMESTAMP_FORMAT;
use crate::probe::{ProbeResult, TestType};
use crate::report::format_duration;

const CSV_HEADER: &str = "Timestamp,Status,Target,Response_Time_ms,Test_Type,Details";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    MonitorStart,
    Success,
    Failure,
    OutageStart,
    OutageEnd,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::MonitorStart => "MONITOR_START",
            EventType::Success => "SUCCESS",
            EventType::Failure => "FAILURE",
            EventType::OutageStart => "OUTAGE_START",
            EventType::OutageEnd => "OUTAGE_END",
        }
    }
}

/// One structured entry for the durable logs.
#[derive(Debug, Clone)]
pub struct MonitorEvent {
    pub timestamp: DateTime<Local>,
    pub event_type: EventType,
    pub target: String,
    pub response_time_ms: Option<f64>,
    pub test_type: Option<TestType>,
    pub message: String,
}

impl MonitorEvent {
    pub fn monitor_start(at: DateTime<Local>) -> Self {
        Self {
            timestamp: at,
            event_type: EventType::MonitorStart,
            target: String::new(),
            response_time_ms: None,
            test_type: None,
            message: "Network monitoring started".to_string(),
        }
    }

    pub fn from_probe(result: &ProbeResult) -> Self {
        let (event_type, message) = if result.success {
            (EventType::Success, "Connection successful")
        } else {
            (EventType::Failure, "Connection failed")
        };
        Self {
            timestamp: result.timestamp,
            event_type,
            target: result.target.clone(),
            response_time_ms: if result.success {
                result.response_time_ms
            } else {
                None
            },
            test_type: Some(result.test_type),
            message: message.to_string(),
        }
    }

    pub fn outage_start(at: DateTime<Local>, failure_threshold: u32) -> Self {
        Self {
            timestamp: at,
            event_type: EventType::OutageStart,
            target: String::new(),
            response_time_ms: None,
            test_type: None,
            message: format!(
                "Network outage detected after {failure_threshold} consecutive failures"
            ),
        }
    }

    pub fn outage_end(at: DateTime<Local>, duration: TimeDelta) -> Self {
        Self {
            timestamp: at,
            event_type: EventType::OutageEnd,
            target: String::new(),
            response_time_ms: None,
            test_type: None,
            message: format!(
                "Network restored. Outage duration: {}",
                format_duration(duration)
            ),
        }
    }

    fn csv_row(&self) -> String {
        let timestamp = self.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let response_time = self
            .response_time_ms
            .map(|ms| format!("{ms:.1}"))
            .unwrap_or_default();
        let test_type = self.test_type.map(TestType::as_str).unwrap_or("");
        [
            csv_field(&timestamp),
            self.event_type.as_str().to_string(),
            csv_field(&self.target),
            response_time,
            test_type.to_string(),
            csv_field(&self.message),
        ]
        .join(",")
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Receives every event as it occurs. Implementations own their failure
/// handling; recording never interrupts the monitoring loop.
pub trait EventSink {
    fn record(&mut self, event: &MonitorEvent);
}

/// Appends events to a line-oriented `.log` file and a `.csv` file, both
/// named after the monitoring start time.
pub struct FileEventSink {
    log_file: PathBuf,
    csv_file: PathBuf,
}

impl FileEventSink {
    pub fn new(log_dir: &Path, started_at: DateTime<Local>) -> Result<Self> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        let stamp = started_at.format("%Y%m%d_%H%M%S");
        let log_file = log_dir.join(format!("monitor_{stamp}.log"));
        let csv_file = log_dir.join(format!("monitor_{stamp}.csv"));

        fs::write(&csv_file, format!("{CSV_HEADER}\n"))
            .with_context(|| format!("Failed to initialize {}", csv_file.display()))?;

        Ok(Self { log_file, csv_file })
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    pub fn csv_file(&self) -> &Path {
        &self.csv_file
    }

    fn append(path: &Path, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        writeln!(file, "{line}")
    }
}

impl EventSink for FileEventSink {
    fn record(&mut self, event: &MonitorEvent) {
        let line = format!(
            "[{}] {}: {}",
            event.timestamp.format(TIMESTAMP_FORMAT),
            event.event_type.as_str(),
            event.message
        );
        if let Err(e) = Self::append(&self.log_file, &line) {
            warn!("Failed to append to {}: {e}", self.log_file.display());
        }

        if let Err(e) = Self::append(&self.csv_file, &event.csv_row()) {
            warn!("Failed to append to {}: {e}", self.csv_file.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn probe_events_carry_target_and_latency() {
        let result = ProbeResult::success(at(), "8.8.8.8", Some(12.34), TestType::IcmpPing);
        let event = MonitorEvent::from_probe(&result);
        assert_eq!(event.event_type, EventType::Success);
        assert_eq!(event.target, "8.8.8.8");
        assert_eq!(event.message, "Connection successful");

        let row = event.csv_row();
        assert!(row.contains(",SUCCESS,8.8.8.8,12.3,ICMP_PING,"));
    }

    #[test]
    fn failure_events_have_no_latency_column() {
        let result = ProbeResult::failure(at(), "google.com", TestType::DnsResolution);
        let event = MonitorEvent::from_probe(&result);
        let row = event.csv_row();
        assert!(row.contains(",FAILURE,google.com,,DNS_RESOLUTION,"));
    }

    #[test]
    fn outage_end_message_includes_formatted_duration() {
        let event = MonitorEvent::outage_end(at(), TimeDelta::seconds(125));
        assert_eq!(event.message, "Network restored. Outage duration: 2m 5s");
    }

    #[test]
    fn csv_fields_are_quoted_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn file_sink_writes_header_and_rows() {
        let dir = std::env::temp_dir().join(format!("uptime-monitor-test-{}", std::process::id()));
        let mut sink = FileEventSink::new(&dir, at()).unwrap();
        sink.record(&MonitorEvent::monitor_start(at()));

        let csv = fs::read_to_string(sink.csv_file()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert!(lines.next().unwrap().contains("MONITOR_START"));

        let log = fs::read_to_string(sink.log_file()).unwrap();
        assert!(log.contains("MONITOR_START: Network monitoring started"));

        fs::remove_dir_all(&dir).unwrap();
    }
}
