use anyhow::{Context, Result};
use chrono::Local;

use uptime_monitor::TIMESTAMP_FORMAT;
use uptime_monitor::config::AppConfig;
use uptime_monitor::driver;
use uptime_monitor::event_log::{EventSink, FileEventSink, MonitorEvent};
use uptime_monitor::monitor::MonitorState;
use uptime_monitor::probe::Prober;
use uptime_monitor::report;
use uptime_monitor::stats;

fn print_banner(config: &AppConfig, started_at: chrono::DateTime<Local>) {
    let rule = "=".repeat(80);
    println!("{rule}");
    println!("NETWORK UPTIME MONITOR");
    println!("{rule}");
    println!(
        "Monitoring started at {}",
        started_at.format(TIMESTAMP_FORMAT)
    );
    println!("Check interval: {} seconds", config.check_interval_secs);
    println!("Test targets: {}", config.ping_targets.join(", "));
    println!("Logs directory: {}", config.log_dir.display());
    println!("\nPress Ctrl+C to stop monitoring and generate report");
    println!("{rule}");
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = AppConfig::load();
    let start_time = Local::now();

    print_banner(&config, start_time);

    let mut sink = FileEventSink::new(&config.log_dir, start_time)?;
    sink.record(&MonitorEvent::monitor_start(start_time));

    let prober = Prober::new(config.probe_timeout())?;
    let mut state = MonitorState::new(start_time, config.failure_threshold);

    driver::run(&prober, &config, &mut state, &mut sink).await?;

    println!("\n\nMonitoring stopped by user");

    let end_time = Local::now();
    let summary = stats::summarize(&state, end_time)
        .with_log_files(sink.log_file().to_path_buf(), sink.csv_file().to_path_buf());
    let report_text = report::render(&summary);

    let report_file = config
        .log_dir
        .join(format!("report_{}.txt", end_time.format("%Y%m%d_%H%M%S")));
    std::fs::write(&report_file, &report_text)
        .with_context(|| format!("Failed to write report to {}", report_file.display()))?;

    println!("\n{report_text}");
    println!("\nReport saved to: {}", report_file.display());

    Ok(())
}
