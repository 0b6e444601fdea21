mod common;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use common::{live_optics_rows, tmp_dir, write_rvtools, write_workbook, N, T, LIVE_OPTICS_PERF, LIVE_OPTICS_VMS};
use rust_vm_inventory::artifact::{ArtifactNaming, RVTOOLS_ARTIFACT};
use rust_vm_inventory::config::EngineConfig;
use rust_vm_inventory::pipeline::{
    convert, describe_import, describe_import_as, detect_format, summarize, ConversionContext,
    ConversionObserver, ConversionRequest, ConversionSeverity, ConversionStats, FileObserver,
    ImportOutcome, PipelineOptions,
};
use rust_vm_inventory::record::NormalizationWarning;
use rust_vm_inventory::{ConversionError, WorkbookFormat};

#[derive(Default)]
struct RecordingObserver {
    detected: Mutex<Vec<WorkbookFormat>>,
    successes: Mutex<Vec<ConversionStats>>,
    warnings: Mutex<Vec<String>>,
    failures: Mutex<Vec<ConversionSeverity>>,
    alerts: Mutex<Vec<ConversionSeverity>>,
}

impl ConversionObserver for RecordingObserver {
    fn on_detected(&self, ctx: &ConversionContext) {
        self.detected.lock().unwrap().push(ctx.format);
    }

    fn on_success(&self, _ctx: &ConversionContext, stats: &ConversionStats) {
        self.successes.lock().unwrap().push(stats.clone());
    }

    fn on_warning(&self, _ctx: &ConversionContext, warning: &NormalizationWarning) {
        self.warnings.lock().unwrap().push(warning.to_string());
    }

    fn on_failure(&self, _ctx: &ConversionContext, severity: ConversionSeverity, _error: &ConversionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &ConversionContext, severity: ConversionSeverity, _error: &ConversionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn observed(obs: &Arc<RecordingObserver>) -> PipelineOptions {
    PipelineOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: ConversionSeverity::Critical,
        ..Default::default()
    }
}

fn write_unrelated(dir: &std::path::Path, file_name: &str) {
    write_workbook(
        dir,
        file_name,
        &[
            ("Sheet1", &["id", "name"][..], vec![vec![N(1.0), T("Ada")]]),
            ("Budget", &["year", "amount"][..], vec![vec![N(2024.0), N(1000.0)]]),
        ],
    );
}

#[test]
fn unrelated_workbook_is_unsupported_and_nothing_is_written() {
    let dir = tmp_dir("pipe-invalid");
    let out = dir.join("out");
    write_unrelated(&dir, "budget.xlsx");
    let obs = Arc::new(RecordingObserver::default());

    assert_eq!(detect_format(&dir, "budget.xlsx").unwrap(), WorkbookFormat::Invalid);
    let outcome = describe_import(&dir, "budget.xlsx", &out, &observed(&obs)).unwrap();

    assert_eq!(outcome, ImportOutcome::Unsupported);
    assert_eq!(outcome.total_vm_count(), None);
    assert!(!out.exists());
    assert_eq!(*obs.detected.lock().unwrap(), vec![WorkbookFormat::Invalid]);
    assert!(obs.successes.lock().unwrap().is_empty());
    assert!(obs.failures.lock().unwrap().is_empty());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn convert_with_invalid_format_is_an_error() {
    let dir = tmp_dir("pipe-convert-invalid");
    write_unrelated(&dir, "budget.xlsx");
    let err = convert(WorkbookFormat::Invalid, &dir, "budget.xlsx", dir.join("out"), &PipelineOptions::default())
        .unwrap_err();
    let _ = std::fs::remove_dir_all(&dir);
    assert!(matches!(err, ConversionError::UnsupportedFormat { path: Some(ref p) } if p.ends_with("budget.xlsx")));
    assert!(err.to_string().contains("budget.xlsx"));
}

#[test]
fn rvtools_import_end_to_end() {
    let dir = tmp_dir("pipe-rv");
    let out = dir.join("out");
    write_rvtools(&dir, "rvtools.xlsx");
    let obs = Arc::new(RecordingObserver::default());

    let outcome = describe_import(&dir, "rvtools.xlsx", &out, &observed(&obs)).unwrap();
    let ImportOutcome::Summarized { format, artifact, summary } = outcome else {
        panic!("expected a summarized import");
    };
    assert_eq!(format, WorkbookFormat::RvTools);
    assert!(artifact.path_in(&out).is_file());
    assert!(artifact.file_name().starts_with("1_vmdata_df_rvtools-"));

    assert_eq!(summary.total_vm_count, 2);
    assert_eq!(summary.total_vcpu, 6);
    assert_eq!(summary.total_vram_gib, 20.0);
    // vm-1 from vDisk (80) + vm-2 from vInfo fallback (40).
    assert_eq!(summary.total_vmdk_total_gib, 120.0);
    assert_eq!(summary.total_vmdk_used_gib, 23.0);
    assert_eq!(summary.cluster_names, vec!["prod"]);

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 1);
    assert_eq!(successes[0].rows, 2);
    assert_eq!(successes[0].artifact.as_ref(), Some(&artifact));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn live_optics_import_with_declared_format() {
    let dir = tmp_dir("pipe-lo");
    let out = dir.join("out");
    let (vms, perf) = live_optics_rows();
    write_workbook(
        &dir,
        "lova.xlsx",
        &[("VMs", &LIVE_OPTICS_VMS[..], vms), ("VM Performance", &LIVE_OPTICS_PERF[..], perf)],
    );

    let outcome =
        describe_import_as(WorkbookFormat::LiveOptics, &dir, "lova.xlsx", &out, &PipelineOptions::default()).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    let ImportOutcome::Summarized { summary, .. } = outcome else {
        panic!("expected a summarized import");
    };
    assert_eq!(summary.total_vm_count, 3);
    assert_eq!(summary.total_vcpu, 14);
    assert_eq!(summary.distinct_os_count, 3);
    let iops = summary.describe.iter().find(|c| c.column == "read_iops").unwrap();
    assert_eq!(iops.count, 2);
}

#[test]
fn converting_twice_yields_identical_artifacts() {
    let dir = tmp_dir("pipe-idem");
    write_rvtools(&dir, "rvtools.xlsx");
    let opts = PipelineOptions::default();

    let a = convert(WorkbookFormat::RvTools, &dir, "rvtools.xlsx", dir.join("run_a"), &opts).unwrap();
    let b = convert(WorkbookFormat::RvTools, &dir, "rvtools.xlsx", dir.join("run_b"), &opts).unwrap();
    assert_ne!(a, b);

    let bytes_a = std::fs::read(a.path_in(dir.join("run_a"))).unwrap();
    let bytes_b = std::fs::read(b.path_in(dir.join("run_b"))).unwrap();
    let _ = std::fs::remove_dir_all(&dir);
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn fixed_naming_uses_the_legacy_artifact_name() {
    let dir = tmp_dir("pipe-fixed");
    write_rvtools(&dir, "rvtools.xlsx");
    let opts = PipelineOptions {
        artifact_naming: ArtifactNaming::Fixed,
        ..Default::default()
    };
    let artifact = convert(WorkbookFormat::RvTools, &dir, "rvtools.xlsx", &dir, &opts).unwrap();
    assert_eq!(artifact.file_name(), RVTOOLS_ARTIFACT);

    let summary = summarize(&dir, &artifact).unwrap();
    let _ = std::fs::remove_dir_all(&dir);
    assert_eq!(summary.total_vm_count, 2);
}

#[test]
fn missing_workbook_is_critical_and_alerts() {
    let dir = tmp_dir("pipe-missing");
    let obs = Arc::new(RecordingObserver::default());
    let err = convert(WorkbookFormat::LiveOptics, &dir, "nope.xlsx", dir.join("out"), &observed(&obs)).unwrap_err();
    let _ = std::fs::remove_dir_all(&dir);

    assert!(matches!(err, ConversionError::Io(_)));
    assert_eq!(*obs.failures.lock().unwrap(), vec![ConversionSeverity::Critical]);
    assert_eq!(*obs.alerts.lock().unwrap(), vec![ConversionSeverity::Critical]);
}

#[test]
fn wrong_declared_format_fails_without_alert() {
    let dir = tmp_dir("pipe-wrong");
    write_rvtools(&dir, "rvtools.xlsx");
    let obs = Arc::new(RecordingObserver::default());
    let err = convert(WorkbookFormat::LiveOptics, &dir, "rvtools.xlsx", dir.join("out"), &observed(&obs))
        .unwrap_err();
    let _ = std::fs::remove_dir_all(&dir);

    assert!(matches!(err, ConversionError::MissingRequiredSheet { ref sheet } if sheet == "VMs"));
    assert_eq!(*obs.failures.lock().unwrap(), vec![ConversionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn duplicate_warnings_reach_the_observer() {
    let dir = tmp_dir("pipe-warn");
    let (mut vms, perf) = live_optics_rows();
    let first = vms[0].clone();
    vms.push(first);
    write_workbook(
        &dir,
        "dup.xlsx",
        &[("VMs", &LIVE_OPTICS_VMS[..], vms), ("VM Performance", &LIVE_OPTICS_PERF[..], perf)],
    );
    let obs = Arc::new(RecordingObserver::default());
    convert(WorkbookFormat::LiveOptics, &dir, "dup.xlsx", dir.join("out"), &observed(&obs)).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    let warnings = obs.warnings.lock().unwrap().clone();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("vm-1"));
    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!((successes[0].rows, successes[0].warnings), (3, 1));
}

#[test]
fn unparsable_optional_cell_is_a_warning_not_a_failure() {
    let dir = tmp_dir("pipe-unparsable");
    let (vms, mut perf) = live_optics_rows();
    perf[1][1] = T("n/a");
    write_workbook(
        &dir,
        "na.xlsx",
        &[("VMs", &LIVE_OPTICS_VMS[..], vms), ("VM Performance", &LIVE_OPTICS_PERF[..], perf)],
    );
    let obs = Arc::new(RecordingObserver::default());
    let outcome = describe_import(&dir, "na.xlsx", dir.join("out"), &observed(&obs)).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(outcome.total_vm_count(), Some(3));
    assert!(obs.failures.lock().unwrap().is_empty());
    let warnings = obs.warnings.lock().unwrap().clone();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Avg Read IOPS"));
    assert!(warnings[0].contains("'n/a'"));
}

#[test]
fn file_observer_appends_lines() {
    let dir = tmp_dir("pipe-filelog");
    write_rvtools(&dir, "rvtools.xlsx");
    let log: PathBuf = dir.join("convert.log");
    let opts = PipelineOptions {
        observer: Some(Arc::new(FileObserver::new(&log))),
        ..Default::default()
    };
    describe_import(&dir, "rvtools.xlsx", dir.join("out"), &opts).unwrap();
    let text = std::fs::read_to_string(&log).unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    assert!(text.contains("detect format=rv-tools"));
    assert!(text.contains(" ok format=rv-tools"));
    assert!(text.contains("rows=2"));
}

#[test]
fn request_runs_with_configured_options() {
    let dir = tmp_dir("pipe-request");
    write_rvtools(&dir, "rvtools.xlsx");
    let cfg = EngineConfig::from_json_str(r#"{ "artifact_naming": "fixed" }"#).unwrap();
    assert!(cfg.is_allowed_file("rvtools.xlsx"));

    let request = ConversionRequest {
        input_path: dir.clone(),
        file_name: "rvtools.xlsx".to_string(),
        output_path: dir.join("out"),
        declared_format: None,
        options: cfg.pipeline_options(),
    };
    let outcome = request.run().unwrap();
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(outcome.total_vm_count(), Some(2));
    let ImportOutcome::Summarized { artifact, .. } = outcome else {
        panic!("expected a summarized import");
    };
    assert_eq!(artifact.file_name(), RVTOOLS_ARTIFACT);
}
