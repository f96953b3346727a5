use chrono::TimeDelta;

use crate::TIMESTAMP_FORMAT;
use crate::stats::Summary;

const RULE_WIDTH: usize = 80;

/// Compact `"Xh Ym Zs"` rendering. Zero-valued higher units are omitted;
/// seconds are always shown.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{seconds}s"));
    parts.join(" ")
}

/// Formats the final monitoring report. Pure formatting; writing the text
/// anywhere is the caller's job.
pub fn render(summary: &Summary) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut report = Vec::new();

    report.push(rule.clone());
    report.push("NETWORK MONITORING REPORT".to_string());
    report.push(rule.clone());
    report.push(String::new());

    report.push("MONITORING PERIOD".to_string());
    report.push(format!(
        "  Start Time:     {}",
        summary.start_time.format(TIMESTAMP_FORMAT)
    ));
    report.push(format!(
        "  End Time:       {}",
        summary.end_time.format(TIMESTAMP_FORMAT)
    ));
    report.push(format!(
        "  Total Duration: {}",
        format_duration(summary.total_runtime)
    ));
    report.push(String::new());

    report.push("CONNECTION SUMMARY".to_string());
    report.push(format!("  Total Checks:       {}", summary.total_checks));
    if summary.total_checks > 0 {
        let total = summary.total_checks as f64;
        report.push(format!(
            "  Successful Checks:  {} ({:.2}%)",
            summary.successful_checks,
            summary.successful_checks as f64 / total * 100.0
        ));
        report.push(format!(
            "  Failed Checks:      {} ({:.2}%)",
            summary.failed_checks,
            summary.failed_checks as f64 / total * 100.0
        ));
    } else {
        report.push("  Successful Checks:  0".to_string());
        report.push("  Failed Checks:      0".to_string());
    }
    report.push(format!(
        "  Avg Response Time:  {:.1} ms",
        summary.avg_response_time_ms
    ));
    report.push(String::new());

    report.push("UPTIME STATISTICS".to_string());
    report.push(format!(
        "  Total Uptime:       {} ({:.2}%)",
        format_duration(summary.total_uptime),
        summary.uptime_percentage
    ));
    report.push(format!(
        "  Total Downtime:     {}",
        format_duration(summary.total_outage_time)
    ));
    report.push(format!("  Number of Outages:  {}", summary.outages.len()));
    report.push(String::new());

    if !summary.outages.is_empty() {
        report.push("OUTAGE DETAILS".to_string());
        report.push("-".repeat(RULE_WIDTH));
        for (i, outage) in summary.outages.iter().enumerate() {
            let ongoing_marker = if outage.ongoing { " (ONGOING)" } else { "" };
            report.push(format!("  Outage #{}{}", i + 1, ongoing_marker));
            report.push(format!(
                "    Start:    {}",
                outage.start.format(TIMESTAMP_FORMAT)
            ));
            report.push(format!(
                "    End:      {}",
                outage.end.format(TIMESTAMP_FORMAT)
            ));
            report.push(format!("    Duration: {}", format_duration(outage.duration)));
            report.push(String::new());
        }

        if let Some(stats) = &summary.outage_stats {
            report.push("  Outage Statistics".to_string());
            report.push(format!(
                "    Average Duration: {}",
                format_duration(stats.average)
            ));
            report.push(format!(
                "    Longest Outage:   {}",
                format_duration(stats.longest)
            ));
            report.push(format!(
                "    Shortest Outage:  {}",
                format_duration(stats.shortest)
            ));
            report.push(String::new());
        }
    }

    report.push(rule.clone());
    if let (Some(log_file), Some(csv_file)) = (&summary.log_file, &summary.csv_file) {
        report.push("LOG FILES".to_string());
        report.push(format!("  Detailed Log: {}", log_file.display()));
        report.push(format!("  CSV Data:     {}", csv_file.display()));
        report.push(rule);
    }

    report.join("\n")
}
