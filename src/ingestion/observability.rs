use std::fmt;
use std::sync::Arc;

use crate::error::{ErrorKind, IngestionError};

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Error-level event (operation failed).
    Error,
    /// Critical error (the source could not be read).
    Critical,
}

impl IngestionSeverity {
    /// Severity assigned to a failed ingestion.
    pub fn for_error(e: &IngestionError) -> Self {
        match e.kind() {
            ErrorKind::Read => IngestionSeverity::Critical,
            ErrorKind::Parse | ErrorKind::Config => IngestionSeverity::Error,
        }
    }
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Name of the ingested file.
    pub name: String,
    /// Format used for ingestion.
    pub format: IngestionFormat,
}

/// Minimal stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of records produced.
    pub records: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits ingestion events through `tracing`.
///
/// Successes are logged at `info`, failures at `warn` and alerts at `error`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            file = %ctx.name,
            format = ?ctx.format,
            records = stats.records,
            "ingestion succeeded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            file = %ctx.name,
            format = ?ctx.format,
            severity = ?severity,
            error = %error,
            "ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            file = %ctx.name,
            format = ?ctx.format,
            severity = ?severity,
            error = %error,
            "ingestion alert"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::IngestionSeverity;
    use crate::error::IngestionError;

    #[test]
    fn read_failures_are_critical() {
        let err = IngestionError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(IngestionSeverity::for_error(&err), IngestionSeverity::Critical);
    }

    #[test]
    fn parse_and_config_failures_are_errors() {
        assert_eq!(
            IngestionSeverity::for_error(&IngestionError::NoSheets),
            IngestionSeverity::Error
        );
        let err = IngestionError::InvalidOptions {
            message: "bad".to_string(),
        };
        assert_eq!(IngestionSeverity::for_error(&err), IngestionSeverity::Error);
    }

    #[test]
    fn error_threshold_also_covers_critical() {
        assert!(IngestionSeverity::Critical >= IngestionSeverity::Error);
        assert!(IngestionSeverity::Error < IngestionSeverity::Critical);
    }
}
