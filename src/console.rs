//! User-facing terminal output.
//!
//! Every line carries a `[TAG]` severity prefix. Warnings and errors go to
//! stderr, everything else to stdout. Each message is also mirrored as a
//! debug-level tracing event, so `RUST_LOG=debug` interleaves the narrative
//! with internal diagnostics without duplicating it by default.

use crate::types::Severity;

/// Format a tagged line without printing it
pub fn format_line(severity: Severity, message: &str) -> String {
    format!("[{}] {}", severity, message)
}

/// Print a tagged line and mirror it to tracing
pub fn emit(severity: Severity, message: &str) {
    tracing::debug!(severity = %severity, "{}", message);
    let line = format_line(severity, message);
    match severity {
        Severity::Error | Severity::Warning => eprintln!("{}", line),
        Severity::Info | Severity::Success | Severity::DryRun => println!("{}", line),
    }
}

pub fn info(message: &str) {
    emit(Severity::Info, message);
}

pub fn success(message: &str) {
    emit(Severity::Success, message);
}

pub fn warn(message: &str) {
    emit(Severity::Warning, message);
}

pub fn error(message: &str) {
    emit(Severity::Error, message);
}

/// Print a multi-line block (rendered files in dry-run) indented under a header
pub fn block(header: &str, body: &str) {
    emit(Severity::DryRun, header);
    for line in body.lines() {
        println!("    {}", line);
    }
}
