use chrono::{DateTime, Local, TimeDelta};

use crate::probe::ProbeResult;

/// Consecutive failures required before the link is classified offline.
/// A single lost packet followed by a success never becomes an outage.
pub const FAILURE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageRecord {
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    pub duration: TimeDelta,
    pub ongoing: bool,
}

/// Which classification change a check caused, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    WentOffline { at: DateTime<Local> },
    WentOnline { outage: OutageRecord },
}

/// Running classification state, mutated exclusively through
/// [`MonitorState::record_check`]. The statistics side only reads.
pub struct MonitorState {
    start_time: DateTime<Local>,
    failure_threshold: u32,
    is_online: bool,
    consecutive_failures: u32,
    current_outage_start: Option<DateTime<Local>>,
    total_checks: u64,
    successful_checks: u64,
    failed_checks: u64,
    response_times: Vec<f64>,
    outages: Vec<OutageRecord>,
}

impl MonitorState {
    pub fn new(start_time: DateTime<Local>, failure_threshold: u32) -> Self {
        Self {
            start_time,
            failure_threshold,
            is_online: true,
            consecutive_failures: 0,
            current_outage_start: None,
            total_checks: 0,
            successful_checks: 0,
            failed_checks: 0,
            response_times: Vec::new(),
            outages: Vec::new(),
        }
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn current_outage_start(&self) -> Option<DateTime<Local>> {
        self.current_outage_start
    }

    pub fn total_checks(&self) -> u64 {
        self.total_checks
    }

    pub fn successful_checks(&self) -> u64 {
        self.successful_checks
    }

    pub fn failed_checks(&self) -> u64 {
        self.failed_checks
    }

    /// Latencies of successful checks, in the order they were observed.
    pub fn response_times(&self) -> &[f64] {
        &self.response_times
    }

    /// Completed outages, chronological. An outage still in progress is not
    /// listed here; report-time views synthesize it from
    /// [`MonitorState::current_outage_start`].
    pub fn outages(&self) -> &[OutageRecord] {
        &self.outages
    }

    /// Folds one probe outcome into the state and reports the transition it
    /// caused, if any. Successes while online and failures below the
    /// threshold (or while already offline) cause none.
    pub fn record_check(&mut self, result: &ProbeResult) -> Option<Transition> {
        self.total_checks += 1;

        if result.success {
            self.successful_checks += 1;
            self.consecutive_failures = 0;
            // A negative latency means the probe reported garbage timing;
            // the check still counts, the sample does not.
            if let Some(ms) = result.response_time_ms {
                if ms >= 0.0 {
                    self.response_times.push(ms);
                }
            }

            if !self.is_online {
                return Some(self.transition_to_online(result.timestamp));
            }
            None
        } else {
            self.failed_checks += 1;
            self.consecutive_failures += 1;

            if self.is_online && self.consecutive_failures >= self.failure_threshold {
                return Some(self.transition_to_offline(result.timestamp));
            }
            None
        }
    }

    fn transition_to_offline(&mut self, at: DateTime<Local>) -> Transition {
        self.is_online = false;
        self.current_outage_start = Some(at);
        Transition::WentOffline { at }
    }

    fn transition_to_online(&mut self, at: DateTime<Local>) -> Transition {
        self.is_online = true;
        let start = self.current_outage_start.take().unwrap_or(at);
        let outage = OutageRecord {
            start,
            end: at,
            duration: at - start,
            ongoing: false,
        };
        self.outages.push(outage.clone());
        Transition::WentOnline { outage }
    }
}
