//! Diagnostics capability passed into registries and the pipeline
//!
//! Business logic never prints on its own: it reports labelled lines through a
//! [`Reporter`], which production code wires to `tracing` + stderr and tests swap
//! for a [`MemoryReporter`].

use std::sync::{Arc, Mutex};

/// Severity of a reported line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

/// Sink for user-facing diagnostics
pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, label: &str, message: &str);

    fn info(&self, label: &str, message: &str) {
        self.report(Level::Info, label, message);
    }

    fn warn(&self, label: &str, message: &str) {
        self.report(Level::Warn, label, message);
    }

    fn error(&self, label: &str, message: &str) {
        self.report(Level::Error, label, message);
    }
}

/// Reporter that prints labelled lines to stderr, or only traces them when quiet
#[derive(Debug, Default, Clone)]
pub struct TracingReporter {
    quiet: bool,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit through `tracing` only, never to stderr
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Reporter for TracingReporter {
    fn report(&self, level: Level, label: &str, message: &str) {
        if self.quiet {
            match level {
                Level::Info => tracing::info!(label, "{}", message),
                Level::Warn => tracing::warn!(label, "{}", message),
                Level::Error => tracing::error!(label, "{}", message),
            }
        } else {
            // Printed directly; keep the trace at debug so lines are not duplicated
            tracing::debug!(label, ?level, "{}", message);
            eprintln!("{}", format_line(label, message));
        }
    }
}

/// Console form of a reported line: the label right-aligned in ten columns
pub fn format_line(label: &str, message: &str) -> String {
    format!("{:>10} : {}", label, message)
}

/// A single captured diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub level: Level,
    pub label: String,
    pub message: String,
}

/// Reporter that keeps every line in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    lines: Arc<Mutex<Vec<ReportLine>>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Lines reported at the given level
    pub fn at(&self, level: Level) -> Vec<ReportLine> {
        self.lines().into_iter().filter(|l| l.level == level).collect()
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, label: &str, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(ReportLine {
                level,
                label: label.to_string(),
                message: message.to_string(),
            });
        }
    }
}
