//! RVTools extractor.
//!
//! `vInfo` is the primary per-VM sheet. `vDisk` (one row per virtual disk) and `vPartition`
//! (one row per guest partition) are summed per VM before the join. Per-disk capacity and
//! per-partition consumption take precedence over the coarse `vInfo` figures, which fill in
//! whenever the fine-grained sum is missing or zero.

use std::collections::HashMap;

use crate::error::ConversionResult;
use crate::record::{NormalizationWarning, VmRecord, VmRecordSet, OS_NOT_SPECIFIED};
use crate::types::{DataType, RowRef};
use crate::workbook::{project, ColumnSpec, SheetSource};

use super::consolidate::{join_ip_addresses, prefer_detail, primary_rows, sum_by_vm, VM_ID};
use super::units::{resolve_unit_variant, to_gib, unit_columns};
use super::{DuplicatePolicy, Extractor, WorkbookFormat};

/// Per-VM inventory sheet.
pub const VINFO_SHEET: &str = "vInfo";
/// Per-virtual-disk sheet.
pub const VDISK_SHEET: &str = "vDisk";
/// Per-guest-partition sheet.
pub const VPARTITION_SHEET: &str = "vPartition";
/// VM identifier column in all three sheets.
pub const VM_KEY_COLUMN: &str = "VM ID";

const PROVISIONED: &str = "Provisioned {unit}";
const IN_USE: &str = "In Use {unit}";
const CAPACITY: &str = "Capacity {unit}";
const CONSUMED: &str = "Consumed {unit}";

/// Extractor for RVTools workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RvToolsExtractor {
    duplicate_policy: DuplicatePolicy,
}

impl RvToolsExtractor {
    /// Create an extractor applying `duplicate_policy` to the `vInfo` sheet.
    pub fn new(duplicate_policy: DuplicatePolicy) -> Self {
        Self { duplicate_policy }
    }
}

impl Extractor for RvToolsExtractor {
    fn format(&self) -> WorkbookFormat {
        WorkbookFormat::RvTools
    }

    fn extract(&self, source: &mut dyn SheetSource) -> ConversionResult<VmRecordSet> {
        let info_sheet = source.read_sheet(VINFO_SHEET)?;
        let info_variant = resolve_unit_variant(&info_sheet, PROVISIONED)?;
        let mut info_columns = vinfo_columns();
        info_columns.extend(unit_columns(
            info_variant,
            &[(PROVISIONED, "vinfo_provisioned"), (IN_USE, "vinfo_used")],
        ));
        let mut warnings = Vec::new();
        let info = project(&info_sheet, &info_columns, &mut warnings)?;

        let disk_totals = summed_sheet(source, VDISK_SHEET, CAPACITY, "vmdk_total", &mut warnings)?;
        let partition_totals =
            summed_sheet(source, VPARTITION_SHEET, CONSUMED, "vmdk_used", &mut warnings)?;

        let keep = primary_rows(&info, VINFO_SHEET, self.duplicate_policy, &mut warnings)?;

        let records = keep
            .into_iter()
            .filter_map(|idx| info.row(idx))
            .map(|row| {
                let mut record = vm_record(row);
                let disk = disk_totals.get(&record.vm_id).copied().map(to_gib);
                let used = partition_totals.get(&record.vm_id).copied().map(to_gib);
                record.vmdk_total_gib = prefer_detail(disk, record.vinfo_provisioned_gib);
                record.vmdk_used_gib = prefer_detail(used, record.vinfo_used_gib);
                record
            })
            .collect();

        Ok(VmRecordSet {
            format: WorkbookFormat::RvTools,
            records,
            warnings,
        })
    }
}

fn vinfo_columns() -> Vec<ColumnSpec> {
    use DataType::{Float64, Int64, Utf8};
    vec![
        ColumnSpec::required(VM_KEY_COLUMN, VM_ID, Utf8),
        ColumnSpec::required("VM", "vm_name", Utf8),
        ColumnSpec::optional("Cluster", "cluster", Utf8),
        ColumnSpec::optional("Datacenter", "virtual_datacenter", Utf8),
        ColumnSpec::optional("Primary IP Address", "ip_addresses", Utf8),
        ColumnSpec::optional("OS according to the VMware Tools", "os", Utf8),
        ColumnSpec::optional("DNS Name", "os_name", Utf8),
        ColumnSpec::optional("Powerstate", "vm_state", Utf8),
        ColumnSpec::optional("CPUs", "vcpu", Int64),
        // `Memory` carries no unit suffix; RVTools always reports it in MiB.
        ColumnSpec::optional("Memory", "vram", Float64),
    ]
}

/// Project `sheet` to its key plus one unit column and sum that column per VM.
fn summed_sheet(
    source: &mut dyn SheetSource,
    sheet: &str,
    template: &str,
    target: &'static str,
    warnings: &mut Vec<NormalizationWarning>,
) -> ConversionResult<HashMap<String, f64>> {
    let raw = source.read_sheet(sheet)?;
    let variant = resolve_unit_variant(&raw, template)?;
    let mut columns = vec![ColumnSpec::required(VM_KEY_COLUMN, VM_ID, DataType::Utf8)];
    columns.extend(unit_columns(variant, &[(template, target)]));
    let ds = project(&raw, &columns, warnings)?;
    Ok(sum_by_vm(&ds, target))
}

fn vm_record(row: RowRef<'_>) -> VmRecord {
    let mut record = VmRecord::new(
        row.text(VM_ID).unwrap_or_default(),
        row.text("vm_name").unwrap_or_default(),
    );
    record.cluster = row.text("cluster");
    record.virtual_datacenter = row.text("virtual_datacenter");
    record.os = row.text("os").unwrap_or_else(|| OS_NOT_SPECIFIED.to_string());
    record.os_name = row.text("os_name");
    record.vm_state = row.text("vm_state");
    record.vcpu = row.i64("vcpu");
    record.ip_addresses = join_ip_addresses([row.text("ip_addresses")]);
    record.vram_gib = row.f64("vram").map(to_gib);
    record.vinfo_provisioned_gib = row.f64("vinfo_provisioned").map(to_gib);
    record.vinfo_used_gib = row.f64("vinfo_used").map(to_gib);
    record
}
