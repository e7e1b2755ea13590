//! Formatting utilities for sizes, durations and the build summary.

use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

/// One line of the production build summary.
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub artifact: String,
    /// Target the artifact was compiled for
    pub target: String,
    pub size: u64,
    pub duration: Duration,
}

/// Format a byte count in the largest fitting unit.
///
/// ```
/// use kiln_cli::ui::format_size;
///
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, `s` or `m s`.
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the per-artifact build summary to stderr.
pub fn print_build_summary(rows: &[SummaryRow]) {
    let width = (Term::stderr().size().1 as usize).min(80);
    let name_width = rows.iter().map(|r| r.artifact.len()).max().unwrap_or(0);

    let total_size: u64 = rows.iter().map(|r| r.size).sum();
    let slowest = rows.iter().map(|r| r.duration).max().unwrap_or_default();

    if !super::colors_enabled() {
        eprintln!("\nBuild Summary");
        for row in rows {
            eprintln!(
                "  - {:<name_width$} {} {} ({})",
                row.artifact,
                row.target,
                format_size(row.size),
                format_duration(row.duration)
            );
        }
        eprintln!(
            "  Total: {} in {}",
            format_size(total_size),
            format_duration(slowest)
        );
        return;
    }

    eprintln!("\n{}", "Build Summary".bold().underline());
    eprintln!("{}", "─".repeat(width));

    for row in rows {
        eprintln!(
            "  {} {:<name_width$} {} {} {}",
            "▸".blue(),
            row.artifact.bright_white().bold(),
            row.target.dimmed(),
            format_size(row.size).dimmed(),
            format!("({})", format_duration(row.duration)).dimmed()
        );
    }

    eprintln!("{}", "─".repeat(width));

    eprintln!(
        "  {} {} in {}",
        "Total:".bold(),
        format_size(total_size).green(),
        format_duration(slowest).green()
    );
}
