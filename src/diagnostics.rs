//! Diagnostics sink shared by the ingesters, the classifier and the pipeline
//!
//! Every non-fatal condition is recorded exactly once here. Recording also
//! emits a single tracing event so the condition shows up in the log.

use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

/// A single non-fatal condition observed during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable identifier such as `chart.values-unparsable`
    pub rule: &'static str,
    /// 1-based template line, when the condition belongs to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
}

/// Collects diagnostics in the order they are raised
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn record(
        &mut self,
        severity: Severity,
        rule: &'static str,
        line: Option<usize>,
        message: impl Into<String>,
    ) {
        let message = message.into();
        match (severity, line) {
            (Severity::Debug, Some(line)) => debug!(rule, line, "{message}"),
            (Severity::Debug, None) => debug!(rule, "{message}"),
            (Severity::Info, Some(line)) => info!(rule, line, "{message}"),
            (Severity::Info, None) => info!(rule, "{message}"),
            (Severity::Warning, Some(line)) => warn!(rule, line, "{message}"),
            (Severity::Warning, None) => warn!(rule, "{message}"),
            (Severity::Error, Some(line)) => error!(rule, line, "{message}"),
            (Severity::Error, None) => error!(rule, "{message}"),
        }
        self.entries.push(Diagnostic {
            severity,
            rule,
            line,
            message,
        });
    }

    pub fn debug(&mut self, rule: &'static str, line: Option<usize>, message: impl Into<String>) {
        self.record(Severity::Debug, rule, line, message);
    }

    pub fn warn(&mut self, rule: &'static str, message: impl Into<String>) {
        self.record(Severity::Warning, rule, None, message);
    }

    pub fn error(&mut self, rule: &'static str, message: impl Into<String>) {
        self.record(Severity::Error, rule, None, message);
    }

    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of diagnostics recorded under `rule`
    #[must_use]
    pub fn count(&self, rule: &str) -> usize {
        self.entries.iter().filter(|d| d.rule == rule).count()
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
