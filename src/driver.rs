use std::time::Duration;

use anyhow::Result;
use log::info;
use tokio::signal;
use tokio::time;

use crate::TIMESTAMP_FORMAT;
use crate::config::AppConfig;
use crate::event_log::{EventSink, MonitorEvent};
use crate::monitor::{MonitorState, Transition};
use crate::probe::{ProbeResult, ProbeSource};

/// Pause between individual probe attempts within one cycle.
const PROBE_GAP: Duration = Duration::from_millis(500);

/// Only the first two configured fallback domains are consulted.
const DNS_FALLBACK_LIMIT: usize = 2;

/// Feeds one probe outcome to the tracker, mirrors it to the event sink and
/// prints a console notice when the classification changed. On a restoring
/// success the OUTAGE_END event precedes the SUCCESS event; on a threshold
/// failure the FAILURE event precedes OUTAGE_START.
pub fn record_result<S: EventSink>(
    state: &mut MonitorState,
    sink: &mut S,
    result: &ProbeResult,
) -> Option<Transition> {
    let transition = state.record_check(result);

    if result.success {
        if let Some(Transition::WentOnline { outage }) = &transition {
            sink.record(&MonitorEvent::outage_end(outage.end, outage.duration));
            println!(
                "Connection restored at {}",
                outage.end.format(TIMESTAMP_FORMAT)
            );
            println!(
                "Outage lasted: {}\n",
                crate::report::format_duration(outage.duration)
            );
        }
        sink.record(&MonitorEvent::from_probe(result));
    } else {
        sink.record(&MonitorEvent::from_probe(result));
        if let Some(Transition::WentOffline { at }) = &transition {
            sink.record(&MonitorEvent::outage_start(*at, state.failure_threshold()));
            println!("\nOUTAGE DETECTED at {}", at.format(TIMESTAMP_FORMAT));
        }
    }

    transition
}

/// Runs one connectivity test cycle: every ping target in order, stopping at
/// the first success; only if all of them failed, DNS resolution against the
/// first fallback domains, again stopping at the first success. Returns
/// whether any probe in the cycle succeeded.
pub async fn run_cycle<P: ProbeSource, S: EventSink>(
    probe: &P,
    config: &AppConfig,
    state: &mut MonitorState,
    sink: &mut S,
) -> bool {
    let mut any_success = false;

    for target in &config.ping_targets {
        let result = probe.ping(target).await;
        let success = result.success;
        record_result(state, sink, &result);

        if success {
            any_success = true;
            break;
        }
        time::sleep(PROBE_GAP).await;
    }

    if !any_success {
        for domain in config.dns_test_domains.iter().take(DNS_FALLBACK_LIMIT) {
            let result = probe.resolve(domain).await;
            let success = result.success;
            record_result(state, sink, &result);

            if success {
                any_success = true;
                break;
            }
            time::sleep(PROBE_GAP).await;
        }
    }

    any_success
}

/// The monitoring loop. Probes, sleeps the configured interval and repeats
/// until interrupted; the interrupt is observed between iterations, so
/// shutdown work happens in normal context, never inside a signal handler.
pub async fn run<P: ProbeSource, S: EventSink>(
    probe: &P,
    config: &AppConfig,
    state: &mut MonitorState,
    sink: &mut S,
) -> Result<()> {
    // Spawned so the handler is registered right away, not on first poll.
    let mut shutdown = tokio::spawn(signal::ctrl_c());

    loop {
        run_cycle(probe, config, state, sink).await;

        tokio::select! {
            result = &mut shutdown => {
                result??;
                info!("Interrupt received, stopping monitor");
                break;
            }
            _ = time::sleep(config.check_interval()) => {}
        }
    }

    Ok(())
}
