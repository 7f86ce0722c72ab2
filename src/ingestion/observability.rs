use std::fmt;
use std::sync::Arc;

use crate::error::IngestionError;
use crate::types::SourceFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O failures, oversized uploads).
    Critical,
}

impl IngestionSeverity {
    /// Severity of an ingestion failure.
    pub fn for_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::Io(_) | IngestionError::FileTooLarge { .. } => Self::Critical,
            IngestionError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            IngestionError::Json(err) if err.is_io() => Self::Critical,
            _ => Self::Error,
        }
    }
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Filename (or path) the bytes came from.
    pub source: String,
    /// Format the input was read as; `None` when the failure happened before detection.
    pub format: Option<SourceFormat>,
}

/// Stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of features in the returned collection.
    pub features: usize,
    /// Number of validation and pre-flight warnings.
    pub warnings: usize,
    /// Number of rows/items dropped during conversion.
    pub skipped: usize,
}

/// Hooks called once per upload, after the dataset was accepted or rejected.
///
/// Row-level skips are not reported here; they arrive aggregated in [`IngestionStats::skipped`].
pub trait IngestionObserver: Send + Sync {
    /// The upload produced a valid dataset.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// The upload was rejected (pre-flight, parse, conversion or validation).
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// A rejection at or above [`IngestionOptions::alert_at_or_above`](super::IngestionOptions).
    /// Forwards to [`Self::on_failure`] unless overridden.
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
    /// Observers are notified in list order.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    /// Append one more observer, e.g. a [`TracingObserver`] next to an application hook.
    pub fn with(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    fn each(&self, f: impl Fn(&dyn IngestionObserver)) {
        self.observers.iter().for_each(|o| f(o.as_ref()));
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits ingestion events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            source = %ctx.source,
            format = ?ctx.format,
            features = stats.features,
            warnings = stats.warnings,
            skipped = stats.skipped,
            "ingestion succeeded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(
            source = %ctx.source,
            format = ?ctx.format,
            ?severity,
            %error,
            "ingestion failed"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            source = %ctx.source,
            format = ?ctx.format,
            ?severity,
            %error,
            "ingestion alert"
        );
    }
}
