use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::artifact::ArtifactId;
use crate::error::ConversionError;
use crate::normalize::WorkbookFormat;
use crate::record::NormalizationWarning;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConversionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about a conversion attempt.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    /// The workbook being converted.
    pub path: PathBuf,
    /// Format the workbook was detected or declared as.
    pub format: WorkbookFormat,
}

/// Stats reported on a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    /// Number of canonical VM records.
    pub rows: usize,
    /// Number of data-quality warnings raised.
    pub warnings: usize,
    /// Artifact written, if the conversion persisted one.
    pub artifact: Option<ArtifactId>,
}

/// Observer interface for conversion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ConversionObserver: Send + Sync {
    /// Called once the workbook format is known (including [`WorkbookFormat::Invalid`]).
    fn on_detected(&self, _ctx: &ConversionContext) {}

    /// Called when conversion succeeds.
    fn on_success(&self, _ctx: &ConversionContext, _stats: &ConversionStats) {}

    /// Called for each non-fatal finding of a successful extraction.
    fn on_warning(&self, _ctx: &ConversionContext, _warning: &NormalizationWarning) {}

    /// Called when conversion fails.
    fn on_failure(&self, _ctx: &ConversionContext, _severity: ConversionSeverity, _error: &ConversionError) {}

    /// Called when a conversion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ConversionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn ConversionObserver>>) -> Self {
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

impl ConversionObserver for CompositeObserver {
    fn on_detected(&self, ctx: &ConversionContext) {
        for o in &self.observers {
            o.on_detected(ctx);
        }
    }

    fn on_success(&self, ctx: &ConversionContext, stats: &ConversionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &ConversionContext, warning: &NormalizationWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

fn artifact_label(stats: &ConversionStats) -> &str {
    stats.artifact.as_ref().map_or("-", ArtifactId::file_name)
}

/// Logs conversion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ConversionObserver for StdErrObserver {
    fn on_detected(&self, ctx: &ConversionContext) {
        eprintln!("[convert][detect] format={} path={}", ctx.format, ctx.path.display());
    }

    fn on_success(&self, ctx: &ConversionContext, stats: &ConversionStats) {
        eprintln!(
            "[convert][ok] format={} path={} rows={} warnings={} artifact={}",
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.warnings,
            artifact_label(stats)
        );
    }

    fn on_warning(&self, ctx: &ConversionContext, warning: &NormalizationWarning) {
        eprintln!(
            "[convert][Warning] format={} path={} {}",
            ctx.format,
            ctx.path.display(),
            warning
        );
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        eprintln!(
            "[convert][{:?}] format={} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        eprintln!(
            "[ALERT][convert][{:?}] format={} path={} err={}",
            severity,
            ctx.format,
            ctx.path.display(),
            error
        );
    }
}

/// Appends conversion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl ConversionObserver for FileObserver {
    fn on_detected(&self, ctx: &ConversionContext) {
        self.append_line(&format!(
            "{} detect format={} path={}",
            unix_ts(),
            ctx.format,
            ctx.path.display()
        ));
    }

    fn on_success(&self, ctx: &ConversionContext, stats: &ConversionStats) {
        self.append_line(&format!(
            "{} ok format={} path={} rows={} warnings={} artifact={}",
            unix_ts(),
            ctx.format,
            ctx.path.display(),
            stats.rows,
            stats.warnings,
            artifact_label(stats)
        ));
    }

    fn on_warning(&self, ctx: &ConversionContext, warning: &NormalizationWarning) {
        self.append_line(&format!(
            "{} warn format={} path={} {}",
            unix_ts(),
            ctx.format,
            ctx.path.display(),
            warning
        ));
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={} path={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
