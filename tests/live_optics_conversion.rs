mod common;

use common::{live_optics_rows, live_optics_vms_mb, tmp_dir, write_workbook, LIVE_OPTICS_PERF, LIVE_OPTICS_VMS};
use rust_vm_inventory::normalize::{DuplicatePolicy, WorkbookFormat};
use rust_vm_inventory::pipeline::convert_source;
use rust_vm_inventory::record::VmRecordSet;
use rust_vm_inventory::workbook::ExcelWorkbook;
use rust_vm_inventory::{detect_format, ConversionError};

fn write_live_optics(dir: &std::path::Path, file_name: &str, vm_headers: &[&str]) {
    let (vms, perf) = live_optics_rows();
    write_workbook(
        dir,
        file_name,
        &[("VMs", vm_headers, vms), ("VM Performance", &LIVE_OPTICS_PERF[..], perf)],
    );
}

fn extract(dir: &std::path::Path, file_name: &str) -> VmRecordSet {
    let mut wb = ExcelWorkbook::open(dir.join(file_name)).unwrap();
    convert_source(WorkbookFormat::LiveOptics, &mut wb, DuplicatePolicy::KeepFirst).unwrap()
}

#[test]
fn live_optics_workbook_is_detected() {
    let dir = tmp_dir("lo-detect");
    write_live_optics(&dir, "lova.xlsx", &LIVE_OPTICS_VMS);
    assert_eq!(detect_format(&dir, "lova.xlsx").unwrap(), WorkbookFormat::LiveOptics);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn vm_missing_from_performance_sheet_has_null_iops() {
    let dir = tmp_dir("lo-perf");
    write_live_optics(&dir, "lova.xlsx", &LIVE_OPTICS_VMS);
    let set = extract(&dir, "lova.xlsx");
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(set.len(), 3);
    assert_eq!(set.records.iter().filter(|r| r.read_iops.is_some()).count(), 2);
    let old = set.records.iter().find(|r| r.vm_id == "vm-3").unwrap();
    assert_eq!(old.read_iops, None);
    assert!(!old.has_performance());
    assert!(set.warnings.is_empty());
}

#[test]
fn sizes_are_whole_gib_and_sentinels_fill_gaps() {
    let dir = tmp_dir("lo-units");
    write_live_optics(&dir, "lova.xlsx", &LIVE_OPTICS_VMS);
    let set = extract(&dir, "lova.xlsx");
    let _ = std::fs::remove_dir_all(&dir);

    let web = &set.records[0];
    assert_eq!(web.vm_name, "web01");
    assert_eq!(web.vcpu, Some(4));
    assert_eq!(web.vram_gib, Some(8.0));
    assert_eq!(web.vmdk_total_gib, Some(50.0));
    assert_eq!(web.vmdk_used_gib, Some(20.0));
    assert_eq!(web.read_iops, Some(120.0));
    assert_eq!(web.peak_write_throughput, Some(12.0));

    let db = &set.records[1];
    assert_eq!(db.ip_addresses, "10.0.0.2, 10.0.1.2");
    assert_eq!(db.vmdk_total_gib, Some(200.0));

    let old = &set.records[2];
    assert_eq!(old.os, "none specified");
    assert_eq!(old.ip_addresses, "no ip");
    assert_eq!(old.os_name, None);
}

#[test]
fn mib_and_mb_labelled_workbooks_produce_equal_records() {
    let dir = tmp_dir("lo-mb");
    write_live_optics(&dir, "mib.xlsx", &LIVE_OPTICS_VMS);
    let mb_headers = live_optics_vms_mb();
    let mb_refs: Vec<&str> = mb_headers.iter().map(String::as_str).collect();
    write_live_optics(&dir, "mb.xlsx", &mb_refs);

    assert_eq!(detect_format(&dir, "mb.xlsx").unwrap(), WorkbookFormat::LiveOptics);
    let mib = extract(&dir, "mib.xlsx");
    let mb = extract(&dir, "mb.xlsx");
    let _ = std::fs::remove_dir_all(&dir);

    assert_eq!(mib.records, mb.records);
}

#[test]
fn missing_performance_sheet_is_a_typed_error() {
    let dir = tmp_dir("lo-nosheet");
    let (vms, _) = live_optics_rows();
    write_workbook(&dir, "vms_only.xlsx", &[("VMs", &LIVE_OPTICS_VMS[..], vms)]);

    // Without `VM Performance` the layout is not recognized at all.
    assert_eq!(detect_format(&dir, "vms_only.xlsx").unwrap(), WorkbookFormat::Invalid);

    let mut wb = ExcelWorkbook::open(dir.join("vms_only.xlsx")).unwrap();
    let err = convert_source(WorkbookFormat::LiveOptics, &mut wb, DuplicatePolicy::KeepFirst).unwrap_err();
    let _ = std::fs::remove_dir_all(&dir);
    assert!(matches!(err, ConversionError::MissingRequiredSheet { ref sheet } if sheet == "VM Performance"));
}
