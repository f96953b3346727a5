use std::path::PathBuf;

use chrono::{DateTime, Local, TimeDelta};

use crate::monitor::{MonitorState, OutageRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageStats {
    pub average: TimeDelta,
    pub longest: TimeDelta,
    pub shortest: TimeDelta,
}

/// Read-only aggregation of the monitor state at a point in time, ready for
/// rendering. Outages include a trailing synthetic record when the link is
/// still down at `end_time`.
#[derive(Debug, Clone)]
pub struct Summary {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub total_runtime: TimeDelta,
    pub total_checks: u64,
    pub successful_checks: u64,
    pub failed_checks: u64,
    pub avg_response_time_ms: f64,
    pub total_uptime: TimeDelta,
    pub total_outage_time: TimeDelta,
    pub uptime_percentage: f64,
    pub outages: Vec<OutageRecord>,
    pub outage_stats: Option<OutageStats>,
    pub log_file: Option<PathBuf>,
    pub csv_file: Option<PathBuf>,
}

impl Summary {
    pub fn with_log_files(mut self, log_file: PathBuf, csv_file: PathBuf) -> Self {
        self.log_file = Some(log_file);
        self.csv_file = Some(csv_file);
        self
    }
}

/// Aggregates the state into a [`Summary`] as of `now`. Pure: the live state
/// is never touched, so an outage still open keeps its open status in the
/// running process and repeated calls cannot double-count it.
pub fn summarize(state: &MonitorState, now: DateTime<Local>) -> Summary {
    let mut outages: Vec<OutageRecord> = state.outages().to_vec();
    if !state.is_online() {
        if let Some(start) = state.current_outage_start() {
            outages.push(OutageRecord {
                start,
                end: now,
                duration: now - start,
                ongoing: true,
            });
        }
    }

    let total_runtime = now - state.start_time();
    let total_outage_time = outages
        .iter()
        .fold(TimeDelta::zero(), |acc, outage| acc + outage.duration);
    let total_uptime = total_runtime - total_outage_time;

    let uptime_percentage = if total_runtime > TimeDelta::zero() {
        total_uptime.num_milliseconds() as f64 / total_runtime.num_milliseconds() as f64 * 100.0
    } else {
        0.0
    };

    let response_times = state.response_times();
    let avg_response_time_ms = if response_times.is_empty() {
        0.0
    } else {
        response_times.iter().sum::<f64>() / response_times.len() as f64
    };

    let outage_stats = if outages.len() >= 2 {
        let longest = outages
            .iter()
            .map(|o| o.duration)
            .max()
            .unwrap_or(TimeDelta::zero());
        let shortest = outages
            .iter()
            .map(|o| o.duration)
            .min()
            .unwrap_or(TimeDelta::zero());
        Some(OutageStats {
            average: total_outage_time / outages.len() as i32,
            longest,
            shortest,
        })
    } else {
        None
    };

    Summary {
        start_time: state.start_time(),
        end_time: now,
        total_runtime,
        total_checks: state.total_checks(),
        successful_checks: state.successful_checks(),
        failed_checks: state.failed_checks(),
        avg_response_time_ms,
        total_uptime,
        total_outage_time,
        uptime_percentage,
        outages,
        outage_stats,
        log_file: None,
        csv_file: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::{FAILURE_THRESHOLD, MonitorState};
    use crate::probe::{ProbeResult, TestType};
    use chrono::TimeZone;

    fn base() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn at(secs: i64) -> DateTime<Local> {
        base() + TimeDelta::seconds(secs)
    }

    fn ok(secs: i64, latency: Option<f64>) -> ProbeResult {
        ProbeResult::success(at(secs), "8.8.8.8", latency, TestType::IcmpPing)
    }

    fn fail(secs: i64) -> ProbeResult {
        ProbeResult::failure(at(secs), "8.8.8.8", TestType::IcmpPing)
    }

    #[test]
    fn clean_run_reports_full_uptime() {
        let mut state = MonitorState::new(base(), FAILURE_THRESHOLD);
        state.record_check(&ok(0, Some(10.0)));
        state.record_check(&ok(2, Some(20.0)));

        let summary = summarize(&state, at(10));
        assert_eq!(summary.total_runtime, TimeDelta::seconds(10));
        assert_eq!(summary.total_outage_time, TimeDelta::zero());
        assert_eq!(summary.uptime_percentage, 100.0);
        assert_eq!(summary.avg_response_time_ms, 15.0);
        assert!(summary.outages.is_empty());
        assert!(summary.outage_stats.is_none());
    }

    #[test]
    fn outage_timeline_scenario() {
        // Failures at +2s, +4s, +6s open an outage at +6s; the success at
        // +10s closes it after 4 seconds.
        let mut state = MonitorState::new(base(), FAILURE_THRESHOLD);
        for secs in [2, 4, 6] {
            state.record_check(&fail(secs));
        }
        state.record_check(&ok(10, Some(18.0)));

        let summary = summarize(&state, at(10));
        assert_eq!(summary.outages.len(), 1);
        assert_eq!(summary.outages[0].start, at(6));
        assert_eq!(summary.outages[0].duration, TimeDelta::seconds(4));
        assert!(!summary.outages[0].ongoing);
        assert_eq!(summary.total_uptime, TimeDelta::seconds(6));
        assert_eq!(summary.uptime_percentage, 60.0);
    }

    #[test]
    fn open_outage_is_synthesized_without_mutating_state() {
        let mut state = MonitorState::new(base(), FAILURE_THRESHOLD);
        for secs in [2, 4, 6] {
            state.record_check(&fail(secs));
        }

        let summary = summarize(&state, at(9));
        assert_eq!(summary.outages.len(), 1);
        assert!(summary.outages[0].ongoing);
        assert_eq!(summary.outages[0].end, at(9));
        assert_eq!(summary.outages[0].duration, TimeDelta::seconds(3));

        // The live state still has the outage open, not recorded.
        assert!(state.outages().is_empty());
        assert_eq!(state.current_outage_start(), Some(at(6)));
    }

    #[test]
    fn repeated_summaries_while_offline_are_monotone_and_single_counted() {
        let mut state = MonitorState::new(base(), FAILURE_THRESHOLD);
        for secs in [2, 4, 6] {
            state.record_check(&fail(secs));
        }

        let first = summarize(&state, at(8));
        let second = summarize(&state, at(12));
        assert_eq!(first.outages.len(), 1);
        assert_eq!(second.outages.len(), 1);
        assert!(second.total_outage_time >= first.total_outage_time);

        // A later real closure must not duplicate the synthetic record.
        state.record_check(&ok(14, None));
        let closed = summarize(&state, at(14));
        assert_eq!(closed.outages.len(), 1);
        assert_eq!(closed.outages[0].duration, TimeDelta::seconds(8));
        assert!(!closed.outages[0].ongoing);
    }

    #[test]
    fn outage_statistics_require_two_records() {
        let mut state = MonitorState::new(base(), FAILURE_THRESHOLD);
        // First outage: 4 seconds.
        for secs in [2, 4, 6] {
            state.record_check(&fail(secs));
        }
        state.record_check(&ok(10, None));
        assert!(summarize(&state, at(10)).outage_stats.is_none());

        // Second outage: still open, 2 seconds by query time.
        for secs in [12, 14, 16] {
            state.record_check(&fail(secs));
        }
        let summary = summarize(&state, at(18));
        let stats = summary.outage_stats.expect("two records present");
        assert_eq!(stats.longest, TimeDelta::seconds(4));
        assert_eq!(stats.shortest, TimeDelta::seconds(2));
        assert_eq!(stats.average, TimeDelta::seconds(3));
    }

    #[test]
    fn zero_runtime_yields_zero_percentage() {
        let state = MonitorState::new(base(), FAILURE_THRESHOLD);
        let summary = summarize(&state, base());
        assert_eq!(summary.uptime_percentage, 0.0);
        assert_eq!(summary.avg_response_time_ms, 0.0);
    }

    #[test]
    fn uptime_percentage_stays_in_range() {
        let mut state = MonitorState::new(base(), FAILURE_THRESHOLD);
        for secs in [1, 2, 3] {
            state.record_check(&fail(secs));
        }
        let summary = summarize(&state, at(3));
        assert!(summary.uptime_percentage >= 0.0);
        assert!(summary.uptime_percentage <= 100.0);
    }
}
