//! Stderr logging setup: an `EnvFilter`-driven fmt layer over stderr,
//! ansi-aware, with a verbosity count overriding the default level on top
//! of whatever `CULLER_LOG_VERBOSITY` sets per-module.

use owo_colors::OwoColorize;
use tracing_subscriber::{
    fmt,
    metadata::LevelFilter,
    prelude::*,
    EnvFilter,
};

/// Installs the global subscriber. Call once, at process start.
pub fn init(verbosity: u8) {
    let level_override = match verbosity {
        0 => None,
        1 => Some(LevelFilter::INFO),
        2 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("CULLER_LOG_VERBOSITY")
        .from_env_lossy();

    let filter = if let Some(max_level) = level_override {
        filter.add_directive(max_level.into())
    } else {
        filter
    };

    let ansi = std::io::IsTerminal::is_terminal(&std::io::stderr());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(ansi))
        .with(filter)
        .init();
}

/// Formats a one-line, color-aware issue-count summary for the human
/// reporter.
pub fn summary_line(processed: usize, total: usize, issue_count: usize) -> String {
    let files = format!("{processed}/{total} files analysed");
    if issue_count == 0 {
        format!("{} {}", files, "no issues found".green())
    } else {
        format!("{} {}", files, format!("{issue_count} issues found").red())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_reports_counts() {
        let line = summary_line(4, 4, 0);
        assert!(line.contains("4/4 files analysed"));
    }
}
