//! Session summary output in human-readable and JSON modes.

use serde::Serialize;

use crate::cli_style::{print_info, print_success, print_warning, Icons, Theme};
use crate::core::dry_run::DryRunSummary;
use crate::manifest::PersistOutcome;
use crate::resolve::{SessionReport, StopReason};

/// Output mode for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Structured error line for JSON output
#[derive(Debug, Serialize)]
struct ErrorRecord<'a> {
    status: &'static str,
    category: &'a str,
    error: String,
}

/// Writes end-of-session results; operator prompts are not routed through here
#[derive(Debug, Clone)]
pub struct OutputWriter {
    pub mode: OutputMode,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Human },
        }
    }

    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Print the summary of a finished session
    pub fn session_summary(&self, report: &SessionReport) {
        match self.mode {
            OutputMode::Json => {
                if let Ok(json) = serde_json::to_string(report) {
                    println!("{}", json);
                }
            }
            OutputMode::Human => print_human_summary(report),
        }
    }

    /// Print what a dry run would have done
    pub fn dry_run_summary(&self, summary: &DryRunSummary) {
        if self.is_json() {
            return;
        }
        print_info(&format!(
            "Dry run: would remove {} and link {} entries",
            Theme::value(summary.remove_count),
            Theme::value(summary.link_count)
        ));
    }

    /// Print a fatal error with its category
    pub fn error(&self, category: &str, msg: &str) {
        match self.mode {
            OutputMode::Json => {
                let record = ErrorRecord {
                    status: "error",
                    category,
                    error: sanitize_error(msg),
                };
                if let Ok(json) = serde_json::to_string(&record) {
                    eprintln!("{}", json);
                }
            }
            OutputMode::Human => {
                eprintln!("Error: {}", sanitize_error(msg));
            }
        }
    }
}

fn print_human_summary(report: &SessionReport) {
    let stats = &report.stats;

    eprintln!();
    eprintln!("{}", Theme::primary("Session summary"));
    eprintln!(
        "  {} groups seen {}, preserved {}, deleted {}, skipped {}",
        Icons::ARROW_RIGHT,
        Theme::value(stats.groups_seen),
        Theme::value(stats.groups_preserved),
        Theme::value(stats.groups_deleted),
        Theme::value(stats.groups_skipped)
    );
    eprintln!(
        "  {} files removed {}, links created {}",
        Icons::ARROW_RIGHT,
        Theme::value(stats.files_removed),
        Theme::value(stats.links_created)
    );
    if stats.truncated_members > 0 {
        eprintln!(
            "  {} {} members of oversized groups left untouched",
            Icons::ARROW_RIGHT,
            Theme::value(stats.truncated_members)
        );
    }

    match report.stop {
        StopReason::Exhausted => {}
        StopReason::Aborted => print_info("Stopped at operator request"),
        StopReason::Malformed => print_warning("Stopped at a malformed manifest line"),
        StopReason::Overflow => print_warning("Stopped at an oversized group"),
    }

    match &report.persist {
        PersistOutcome::Untouched => print_info("Manifest unchanged"),
        PersistOutcome::DryRun => print_info("Dry run: manifest unchanged"),
        PersistOutcome::Rewritten { bytes } if *bytes == 0 => {
            print_success("Manifest fully resolved")
        }
        PersistOutcome::Rewritten { bytes } => print_success(&format!(
            "Manifest rewritten with {} unresolved bytes",
            bytes
        )),
        PersistOutcome::Incomplete { expected, actual } => print_warning(&format!(
            "Manifest not rewritten: wrote {} of {} bytes",
            actual, expected
        )),
    }

    if stats.has_failures() {
        eprintln!(
            "{} {}",
            Theme::error(Icons::ERROR),
            Theme::error(format!("{} member operations failed", stats.failures))
        );
    }
}

/// Sanitize error messages by collapsing whitespace
pub fn sanitize_error(msg: &str) -> String {
    msg.split_whitespace().collect::<Vec<&str>>().join(" ")
}
