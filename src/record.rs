//! The canonical per-VM record every vendor format is normalized into.

use serde::{Deserialize, Serialize};

use crate::normalize::WorkbookFormat;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Placeholder for a missing guest IP address.
pub const NO_IP: &str = "no ip";

/// Placeholder for a missing guest operating system.
pub const OS_NOT_SPECIFIED: &str = "none specified";

/// One virtual machine, vendor-agnostic. Capacities and memory are in GiB.
///
/// Field order is the column order of the intermediate CSV artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmRecord {
    pub vm_id: String,
    pub vm_name: String,
    pub cluster: Option<String>,
    pub virtual_datacenter: Option<String>,
    pub os: String,
    pub os_name: Option<String>,
    pub vm_state: Option<String>,
    pub vcpu: Option<i64>,
    pub vram_gib: Option<f64>,
    pub ip_addresses: String,
    pub vmdk_total_gib: Option<f64>,
    pub vmdk_used_gib: Option<f64>,
    // Live Optics `VM Performance`.
    pub read_iops: Option<f64>,
    pub write_iops: Option<f64>,
    pub peak_read_iops: Option<f64>,
    pub peak_write_iops: Option<f64>,
    pub read_throughput: Option<f64>,
    pub write_throughput: Option<f64>,
    pub peak_read_throughput: Option<f64>,
    pub peak_write_throughput: Option<f64>,
    // RVTools `vInfo` coarse storage figures.
    pub vinfo_provisioned_gib: Option<f64>,
    pub vinfo_used_gib: Option<f64>,
}

impl VmRecord {
    /// A record with only identity set; every optional field is empty and the sentinels
    /// are applied.
    pub fn new(vm_id: impl Into<String>, vm_name: impl Into<String>) -> Self {
        Self {
            vm_id: vm_id.into(),
            vm_name: vm_name.into(),
            cluster: None,
            virtual_datacenter: None,
            os: OS_NOT_SPECIFIED.to_string(),
            os_name: None,
            vm_state: None,
            vcpu: None,
            vram_gib: None,
            ip_addresses: NO_IP.to_string(),
            vmdk_total_gib: None,
            vmdk_used_gib: None,
            read_iops: None,
            write_iops: None,
            peak_read_iops: None,
            peak_write_iops: None,
            read_throughput: None,
            write_throughput: None,
            peak_read_throughput: None,
            peak_write_throughput: None,
            vinfo_provisioned_gib: None,
            vinfo_used_gib: None,
        }
    }

    /// Returns `true` if any I/O performance figure is present.
    pub fn has_performance(&self) -> bool {
        [
            self.read_iops,
            self.write_iops,
            self.peak_read_iops,
            self.peak_write_iops,
            self.read_throughput,
            self.write_throughput,
            self.peak_read_throughput,
            self.peak_write_throughput,
        ]
        .iter()
        .any(Option::is_some)
    }

    fn to_row(&self) -> Vec<Value> {
        let text = |v: &Option<String>| v.clone().map(Value::Utf8).unwrap_or(Value::Null);
        let num = |v: Option<f64>| v.map(Value::Float64).unwrap_or(Value::Null);
        vec![
            Value::Utf8(self.vm_id.clone()),
            Value::Utf8(self.vm_name.clone()),
            text(&self.cluster),
            text(&self.virtual_datacenter),
            Value::Utf8(self.os.clone()),
            text(&self.os_name),
            text(&self.vm_state),
            self.vcpu.map(Value::Int64).unwrap_or(Value::Null),
            num(self.vram_gib),
            Value::Utf8(self.ip_addresses.clone()),
            num(self.vmdk_total_gib),
            num(self.vmdk_used_gib),
            num(self.read_iops),
            num(self.write_iops),
            num(self.peak_read_iops),
            num(self.peak_write_iops),
            num(self.read_throughput),
            num(self.write_throughput),
            num(self.peak_read_throughput),
            num(self.peak_write_throughput),
            num(self.vinfo_provisioned_gib),
            num(self.vinfo_used_gib),
        ]
    }
}

/// Schema of the canonical record, in artifact column order.
pub fn canonical_schema() -> Schema {
    use DataType::{Float64, Int64, Utf8};
    Schema::new(vec![
        Field::new("vm_id", Utf8),
        Field::new("vm_name", Utf8),
        Field::new("cluster", Utf8),
        Field::new("virtual_datacenter", Utf8),
        Field::new("os", Utf8),
        Field::new("os_name", Utf8),
        Field::new("vm_state", Utf8),
        Field::new("vcpu", Int64),
        Field::new("vram_gib", Float64),
        Field::new("ip_addresses", Utf8),
        Field::new("vmdk_total_gib", Float64),
        Field::new("vmdk_used_gib", Float64),
        Field::new("read_iops", Float64),
        Field::new("write_iops", Float64),
        Field::new("peak_read_iops", Float64),
        Field::new("peak_write_iops", Float64),
        Field::new("read_throughput", Float64),
        Field::new("write_throughput", Float64),
        Field::new("peak_read_throughput", Float64),
        Field::new("peak_write_throughput", Float64),
        Field::new("vinfo_provisioned_gib", Float64),
        Field::new("vinfo_used_gib", Float64),
    ])
}

/// A non-fatal data-quality finding raised during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NormalizationWarning {
    /// A VM identifier occurred more than once in `sheet`; only the first row was kept.
    DuplicateVmId { sheet: String, vm_id: String },
    /// A row without a VM identifier was skipped.
    MissingVmId { sheet: String, row: usize },
    /// A cell of an optional column did not parse and was read as empty. `row` is the
    /// worksheet row number.
    UnparsableCell {
        sheet: String,
        row: usize,
        column: String,
        raw: String,
    },
}

impl std::fmt::Display for NormalizationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateVmId { sheet, vm_id } => {
                write!(f, "sheet '{sheet}': duplicate vm id '{vm_id}' (first row kept)")
            }
            Self::MissingVmId { sheet, row } => {
                write!(f, "sheet '{sheet}': row {row} has no vm id (skipped)")
            }
            Self::UnparsableCell {
                sheet,
                row,
                column,
                raw,
            } => {
                write!(f, "sheet '{sheet}': row {row} column '{column}': unparsable value '{raw}' (read as empty)")
            }
        }
    }
}

/// The outcome of one extraction: canonical records plus any warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct VmRecordSet {
    /// Vendor format the records were extracted from.
    pub format: WorkbookFormat,
    /// One record per VM, in primary-sheet order.
    pub records: Vec<VmRecord>,
    /// Data-quality findings that did not stop extraction.
    pub warnings: Vec<NormalizationWarning>,
}

impl VmRecordSet {
    /// Number of VM records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no VM was extracted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Tabular view of canonical records using [`canonical_schema`].
pub fn records_to_dataset(records: &[VmRecord]) -> DataSet {
    DataSet::new(
        canonical_schema(),
        records.iter().map(VmRecord::to_row).collect(),
    )
}
