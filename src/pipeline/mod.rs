//! Path-based conversion entrypoints.
//!
//! The flow for an uploaded workbook is [`detect_format`] → [`convert`] → [`summarize`];
//! [`describe_import`] runs all three. Workbooks are addressed by a directory and a file
//! name, artifacts by an [`ArtifactId`] inside an output directory.
//!
//! - A workbook matching neither vendor layout is not an error: detection returns
//!   [`WorkbookFormat::Invalid`] and [`describe_import`] returns [`ImportOutcome::Unsupported`].
//! - If an [`observability::ConversionObserver`] is provided, detection, success, warnings,
//!   failures and alerts are reported to it.

pub mod observability;

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::artifact::{artifact_id, read_artifact, write_artifact, ArtifactId, ArtifactNaming};
use crate::error::{ConversionError, ConversionResult};
use crate::normalize::{detect_workbook_format, extractor_for, DuplicatePolicy, WorkbookFormat};
use crate::record::VmRecordSet;
use crate::summary::{summarize_dataset, InventorySummary};
use crate::workbook::{ExcelWorkbook, SheetSource};

pub use observability::{
    CompositeObserver, ConversionContext, ConversionObserver, ConversionSeverity, ConversionStats,
    FileObserver, StdErrObserver,
};

/// Options controlling conversion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct PipelineOptions {
    /// How the artifact file is named.
    pub artifact_naming: ArtifactNaming,
    /// What to do with repeated VM identifiers in a primary sheet.
    pub duplicate_policy: DuplicatePolicy,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn ConversionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: ConversionSeverity,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("artifact_naming", &self.artifact_naming)
            .field("duplicate_policy", &self.duplicate_policy)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            artifact_naming: ArtifactNaming::default(),
            duplicate_policy: DuplicatePolicy::default(),
            observer: None,
            alert_at_or_above: ConversionSeverity::Critical,
        }
    }
}

/// Result of [`describe_import`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// The workbook was converted and summarized.
    Summarized {
        format: WorkbookFormat,
        artifact: ArtifactId,
        summary: InventorySummary,
    },
    /// The workbook matches neither vendor layout; nothing was converted.
    Unsupported,
}

impl ImportOutcome {
    /// Total VM count, or `None` for an unsupported workbook.
    pub fn total_vm_count(&self) -> Option<usize> {
        match self {
            Self::Summarized { summary, .. } => Some(summary.total_vm_count),
            Self::Unsupported => None,
        }
    }
}

/// Detect the vendor layout of `input_path/file_name` from its sheet and column names.
pub fn detect_format(
    input_path: impl AsRef<Path>,
    file_name: &str,
) -> ConversionResult<WorkbookFormat> {
    let mut wb = ExcelWorkbook::open(input_path.as_ref().join(file_name))?;
    detect_workbook_format(&mut wb)
}

/// Extract canonical records from any [`SheetSource`] without writing an artifact.
///
/// Fails with [`ConversionError::UnsupportedFormat`] for [`WorkbookFormat::Invalid`].
pub fn convert_source(
    format: WorkbookFormat,
    source: &mut dyn SheetSource,
    duplicate_policy: DuplicatePolicy,
) -> ConversionResult<VmRecordSet> {
    let extractor = extractor_for(format, duplicate_policy)
        .ok_or(ConversionError::UnsupportedFormat { path: None })?;
    extractor.extract(source)
}

/// Convert `input_path/file_name` as `format` and persist the canonical records as a CSV
/// artifact in `output_path`, which is created if missing.
///
/// When an observer is configured, this function reports:
///
/// - `on_warning` for each non-fatal finding, then `on_success` with row/artifact stats
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use rust_vm_inventory::pipeline::{convert, detect_format, summarize, PipelineOptions};
///
/// # fn main() -> Result<(), rust_vm_inventory::ConversionError> {
/// let format = detect_format("input/", "rvtools_export.xlsx")?;
/// let artifact = convert(format, "input/", "rvtools_export.xlsx", "output/", &PipelineOptions::default())?;
/// let summary = summarize("output/", &artifact)?;
/// println!("vms={}", summary.total_vm_count);
/// # Ok(())
/// # }
/// ```
///
/// ## Observability (stderr logging + alert threshold)
///
/// ```no_run
/// use std::sync::Arc;
///
/// use rust_vm_inventory::normalize::WorkbookFormat;
/// use rust_vm_inventory::pipeline::{convert, ConversionSeverity, PipelineOptions, StdErrObserver};
///
/// let opts = PipelineOptions {
///     observer: Some(Arc::new(StdErrObserver::default())),
///     alert_at_or_above: ConversionSeverity::Critical,
///     ..Default::default()
/// };
///
/// // Missing files are treated as Critical and will trigger `on_alert` at this threshold.
/// let _err = convert(WorkbookFormat::LiveOptics, "input/", "missing.xlsx", "output/", &opts).unwrap_err();
/// ```
pub fn convert(
    format: WorkbookFormat,
    input_path: impl AsRef<Path>,
    file_name: &str,
    output_path: impl AsRef<Path>,
    options: &PipelineOptions,
) -> ConversionResult<ArtifactId> {
    let path = input_path.as_ref().join(file_name);
    let ctx = ConversionContext {
        path: path.clone(),
        format,
    };

    let result = convert_and_persist(format, &path, output_path.as_ref(), options);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok((set, artifact)) => {
                for w in &set.warnings {
                    obs.on_warning(&ctx, w);
                }
                obs.on_success(
                    &ctx,
                    &ConversionStats {
                        rows: set.len(),
                        warnings: set.warnings.len(),
                        artifact: Some(artifact.clone()),
                    },
                );
            }
            Err(e) => report_failure(obs.as_ref(), &ctx, e, options.alert_at_or_above),
        }
    }

    result.map(|(_, artifact)| artifact)
}

fn convert_and_persist(
    format: WorkbookFormat,
    path: &Path,
    output_dir: &Path,
    options: &PipelineOptions,
) -> ConversionResult<(VmRecordSet, ArtifactId)> {
    let Some(artifact) = artifact_id(format, options.artifact_naming) else {
        return Err(ConversionError::UnsupportedFormat {
            path: Some(path.to_path_buf()),
        });
    };
    let mut wb = ExcelWorkbook::open(path)?;
    let set = convert_source(format, &mut wb, options.duplicate_policy)?;
    std::fs::create_dir_all(output_dir)?;
    write_artifact(artifact.path_in(output_dir), &set.records)?;
    Ok((set, artifact))
}

/// Read a persisted artifact back from `output_path` and compute its summary.
pub fn summarize(
    output_path: impl AsRef<Path>,
    artifact: &ArtifactId,
) -> ConversionResult<InventorySummary> {
    let ds = read_artifact(artifact.path_in(output_path))?;
    summarize_dataset(&ds)
}

/// Detect, convert and summarize `input_path/file_name`.
///
/// Detection failures (e.g. an unreadable file) are reported to the observer like conversion
/// failures.
pub fn describe_import(
    input_path: impl AsRef<Path>,
    file_name: &str,
    output_path: impl AsRef<Path>,
    options: &PipelineOptions,
) -> ConversionResult<ImportOutcome> {
    let input_path = input_path.as_ref();
    let format = match detect_format(input_path, file_name) {
        Ok(f) => f,
        Err(e) => {
            if let Some(obs) = options.observer.as_ref() {
                let ctx = ConversionContext {
                    path: input_path.join(file_name),
                    format: WorkbookFormat::Invalid,
                };
                report_failure(obs.as_ref(), &ctx, &e, options.alert_at_or_above);
            }
            return Err(e);
        }
    };
    describe_import_as(format, input_path, file_name, output_path, options)
}

/// Like [`describe_import`], but with the format declared by the caller instead of detected.
pub fn describe_import_as(
    format: WorkbookFormat,
    input_path: impl AsRef<Path>,
    file_name: &str,
    output_path: impl AsRef<Path>,
    options: &PipelineOptions,
) -> ConversionResult<ImportOutcome> {
    let input_path = input_path.as_ref();
    if let Some(obs) = options.observer.as_ref() {
        obs.on_detected(&ConversionContext {
            path: input_path.join(file_name),
            format,
        });
    }
    if !format.is_supported() {
        return Ok(ImportOutcome::Unsupported);
    }

    let output_path = output_path.as_ref();
    let artifact = convert(format, input_path, file_name, output_path, options)?;
    let summary = summarize(output_path, &artifact)?;
    Ok(ImportOutcome::Summarized {
        format,
        artifact,
        summary,
    })
}

fn report_failure(
    obs: &dyn ConversionObserver,
    ctx: &ConversionContext,
    error: &ConversionError,
    alert_at_or_above: ConversionSeverity,
) {
    let sev = severity_for_error(error);
    obs.on_failure(ctx, sev, error);
    if sev >= alert_at_or_above {
        obs.on_alert(ctx, sev, error);
    }
}

fn severity_for_error(e: &ConversionError) -> ConversionSeverity {
    match e {
        ConversionError::Io(_) => ConversionSeverity::Critical,
        ConversionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => ConversionSeverity::Critical,
            _ => ConversionSeverity::Error,
        },
        ConversionError::Excel(err) => {
            // calamine wraps I/O inside per-container errors.
            if error_chain_contains_io(err) {
                ConversionSeverity::Critical
            } else {
                ConversionSeverity::Error
            }
        }
        ConversionError::Json(_)
        | ConversionError::UnsupportedFormat { .. }
        | ConversionError::MissingRequiredSheet { .. }
        | ConversionError::MissingRequiredColumns { .. }
        | ConversionError::DuplicateVmId { .. }
        | ConversionError::ParseError { .. } => ConversionSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Convenience helper for callers that want an owned request object.
///
/// This can be useful if you want to enqueue conversions in a job system.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Directory holding the uploaded workbook.
    pub input_path: PathBuf,
    /// Workbook file name inside `input_path`.
    pub file_name: String,
    /// Directory receiving the artifact.
    pub output_path: PathBuf,
    /// Format declared by the uploader; detected when `None`.
    pub declared_format: Option<WorkbookFormat>,
    /// Options controlling conversion.
    pub options: PipelineOptions,
}

impl ConversionRequest {
    /// Execute the request by calling [`describe_import`] or [`describe_import_as`].
    pub fn run(&self) -> ConversionResult<ImportOutcome> {
        match self.declared_format {
            Some(format) => describe_import_as(
                format,
                &self.input_path,
                &self.file_name,
                &self.output_path,
                &self.options,
            ),
            None => describe_import(&self.input_path, &self.file_name, &self.output_path, &self.options),
        }
    }
}
