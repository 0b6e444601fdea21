//! Live Optics extractor.
//!
//! Reads `VMs` (one row per VM) and `VM Performance` (I/O figures keyed by `MOB ID`) and
//! left-joins the performance figures onto the VM rows.

use crate::error::ConversionResult;
use crate::record::{VmRecord, VmRecordSet, OS_NOT_SPECIFIED};
use crate::types::{DataType, RowRef};
use crate::workbook::{project, ColumnSpec, SheetSource};

use super::consolidate::{first_row_by_vm, join_ip_addresses, primary_rows, VM_ID};
use super::units::{resolve_unit_variant, to_gib, unit_columns, UnitVariant};
use super::{DuplicatePolicy, Extractor, WorkbookFormat};

/// Per-VM inventory sheet.
pub const VMS_SHEET: &str = "VMs";
/// Per-VM I/O performance sheet.
pub const PERFORMANCE_SHEET: &str = "VM Performance";
/// VM identifier column in both sheets.
pub const VM_KEY_COLUMN: &str = "MOB ID";

const DISK_SIZE: &str = "Virtual Disk Size ({unit})";
const DISK_USED: &str = "Virtual Disk Used ({unit})";
const MEMORY: &str = "Provisioned Memory ({unit})";

const IP_COLUMNS: [(&str, &str); 4] = [
    ("Guest IP1", "guest_ip1"),
    ("Guest IP2", "guest_ip2"),
    ("Guest IP3", "guest_ip3"),
    ("Guest IP4", "guest_ip4"),
];

const PERFORMANCE_COLUMNS: [(&str, &str); 8] = [
    ("Avg Read IOPS", "read_iops"),
    ("Avg Write IOPS", "write_iops"),
    ("Peak Read IOPS", "peak_read_iops"),
    ("Peak Write IOPS", "peak_write_iops"),
    ("Avg Read MB/s", "read_throughput"),
    ("Avg Write MB/s", "write_throughput"),
    ("Peak Read MB/s", "peak_read_throughput"),
    ("Peak Write MB/s", "peak_write_throughput"),
];

/// Extractor for Live Optics workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveOpticsExtractor {
    duplicate_policy: DuplicatePolicy,
}

impl LiveOpticsExtractor {
    /// Create an extractor applying `duplicate_policy` to the `VMs` sheet.
    pub fn new(duplicate_policy: DuplicatePolicy) -> Self {
        Self { duplicate_policy }
    }
}

impl Extractor for LiveOpticsExtractor {
    fn format(&self) -> WorkbookFormat {
        WorkbookFormat::LiveOptics
    }

    fn extract(&self, source: &mut dyn SheetSource) -> ConversionResult<VmRecordSet> {
        let vms_sheet = source.read_sheet(VMS_SHEET)?;
        let variant = resolve_unit_variant(&vms_sheet, DISK_SIZE)?;
        let mut warnings = Vec::new();
        let vms = project(&vms_sheet, &vm_columns(variant), &mut warnings)?;

        let perf_sheet = source.read_sheet(PERFORMANCE_SHEET)?;
        let perf = project(&perf_sheet, &performance_columns(), &mut warnings)?;

        let keep = primary_rows(&vms, VMS_SHEET, self.duplicate_policy, &mut warnings)?;
        let perf_index = first_row_by_vm(&perf, PERFORMANCE_SHEET, &mut warnings);

        let records = keep
            .into_iter()
            .filter_map(|idx| vms.row(idx))
            .map(|row| {
                let mut record = vm_record(row);
                if let Some(perf_row) = perf_index.get(&record.vm_id).and_then(|&i| perf.row(i)) {
                    apply_performance(&mut record, perf_row);
                }
                record
            })
            .collect();

        Ok(VmRecordSet {
            format: WorkbookFormat::LiveOptics,
            records,
            warnings,
        })
    }
}

fn vm_columns(variant: UnitVariant) -> Vec<ColumnSpec> {
    use DataType::{Int64, Utf8};
    let mut columns = vec![
        ColumnSpec::required(VM_KEY_COLUMN, VM_ID, Utf8),
        ColumnSpec::required("VM Name", "vm_name", Utf8),
        ColumnSpec::optional("Cluster", "cluster", Utf8),
        ColumnSpec::optional("Datacenter", "virtual_datacenter", Utf8),
        ColumnSpec::optional("VM OS", "os", Utf8),
        ColumnSpec::optional("Guest Hostname", "os_name", Utf8),
        ColumnSpec::optional("Power State", "vm_state", Utf8),
        ColumnSpec::optional("Virtual CPU", "vcpu", Int64),
    ];
    columns.extend(
        IP_COLUMNS
            .iter()
            .map(|&(source, target)| ColumnSpec::optional(source, target, Utf8)),
    );
    columns.extend(unit_columns(
        variant,
        &[(DISK_SIZE, "vmdk_total"), (DISK_USED, "vmdk_used"), (MEMORY, "vram")],
    ));
    columns
}

fn performance_columns() -> Vec<ColumnSpec> {
    let mut columns = vec![ColumnSpec::required(VM_KEY_COLUMN, VM_ID, DataType::Utf8)];
    columns.extend(
        PERFORMANCE_COLUMNS
            .iter()
            .map(|&(source, target)| ColumnSpec::optional(source, target, DataType::Float64)),
    );
    columns
}

/// GiB rounded to whole units, ties to even.
fn whole_gib(mebibytes: Option<f64>) -> Option<f64> {
    mebibytes.map(|v| to_gib(v).round_ties_even())
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
    record.ip_addresses = join_ip_addresses(IP_COLUMNS.iter().map(|&(_, target)| row.text(target)));
    record.vmdk_total_gib = whole_gib(row.f64("vmdk_total"));
    record.vmdk_used_gib = whole_gib(row.f64("vmdk_used"));
    record.vram_gib = whole_gib(row.f64("vram"));
    record
}

fn apply_performance(record: &mut VmRecord, perf: RowRef<'_>) {
    record.read_iops = perf.f64("read_iops");
    record.write_iops = perf.f64("write_iops");
    record.peak_read_iops = perf.f64("peak_read_iops");
    record.peak_write_iops = perf.f64("peak_write_iops");
    record.read_throughput = perf.f64("read_throughput");
    record.write_throughput = perf.f64("write_throughput");
    record.peak_read_throughput = perf.f64("peak_read_throughput");
    record.peak_write_throughput = perf.f64("peak_write_throughput");
}
