//! Aggregate statistics over a canonical VM record set.
//!
//! [`summarize_dataset`] works on the tabular form (as read back from the intermediate
//! artifact); [`summarize_records`] on records still in memory. Both produce the same
//! [`InventorySummary`].

use std::fmt;

use serde::Serialize;

use crate::error::{ConversionError, ConversionResult};
use crate::processing::{describe, group_n_unique, reduce, unique, value_counts, ColumnStats, ReduceOp};
use crate::record::{records_to_dataset, VmRecord};
use crate::types::{DataSet, Value};

const SUMMARY_COLUMNS: &[&str] = &[
    "vm_id",
    "os",
    "cluster",
    "vm_state",
    "vcpu",
    "vram_gib",
    "vmdk_used_gib",
    "vmdk_total_gib",
];

/// A category value and how many VMs fall into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Everything the summary reporter computes. `total_vm_count` is the primary result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySummary {
    /// Number of canonical records. Primary-sheet rows without a VM identifier are skipped
    /// during extraction and are not counted here, even if they carry a VM name.
    pub total_vm_count: usize,
    /// VM count per power state, most frequent first.
    pub power_states: Vec<CategoryCount>,
    /// Number of distinct operating systems.
    pub distinct_os_count: usize,
    /// Distinct VM count per operating system, by OS name.
    pub vms_by_os: Vec<CategoryCount>,
    pub cluster_count: usize,
    pub cluster_names: Vec<String>,
    pub total_vcpu: i64,
    pub total_vram_gib: f64,
    pub total_vmdk_used_gib: f64,
    pub total_vmdk_total_gib: f64,
    /// Descriptive statistics per numeric column.
    pub describe: Vec<ColumnStats>,
}

/// Summarize a dataset with the canonical columns.
///
/// Fails with [`ConversionError::MissingRequiredColumns`] if any column the summary reads is
/// absent.
pub fn summarize_dataset(dataset: &DataSet) -> ConversionResult<InventorySummary> {
    let missing: Vec<&str> = SUMMARY_COLUMNS
        .iter()
        .copied()
        .filter(|c| dataset.schema.index_of(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ConversionError::MissingRequiredColumns {
            sheet: "summary".to_string(),
            message: format!("missing required column(s) {missing:?}"),
        });
    }
    Ok(summarize_columns(dataset))
}

/// Summarize records that have not been persisted.
pub fn summarize_records(records: &[VmRecord]) -> InventorySummary {
    summarize_columns(&records_to_dataset(records))
}

/// Absent columns read as empty; callers check presence first.
fn summarize_columns(dataset: &DataSet) -> InventorySummary {
    let counts = |pairs: Vec<(String, usize)>| {
        pairs
            .into_iter()
            .map(|(value, count)| CategoryCount { value, count })
            .collect::<Vec<_>>()
    };
    let cluster_names = unique(dataset, "cluster").unwrap_or_default();

    InventorySummary {
        total_vm_count: dataset.row_count(),
        power_states: counts(value_counts(dataset, "vm_state").unwrap_or_default()),
        distinct_os_count: unique(dataset, "os").map_or(0, |u| u.len()),
        vms_by_os: counts(
            group_n_unique(dataset, "os", "vm_id")
                .unwrap_or_default()
                .into_iter()
                .collect(),
        ),
        cluster_count: cluster_names.len(),
        cluster_names,
        total_vcpu: match reduce(dataset, "vcpu", ReduceOp::Sum) {
            Some(Value::Int64(n)) => n,
            Some(v) => v.as_f64().map_or(0, |f| f as i64),
            None => 0,
        },
        total_vram_gib: float_sum(dataset, "vram_gib"),
        total_vmdk_used_gib: float_sum(dataset, "vmdk_used_gib"),
        total_vmdk_total_gib: float_sum(dataset, "vmdk_total_gib"),
        describe: describe(dataset),
    }
}

fn float_sum(dataset: &DataSet, column: &str) -> f64 {
    reduce(dataset, column, ReduceOp::Sum)
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0)
}

fn opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

impl fmt::Display for InventorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total VMs: {}", self.total_vm_count)?;
        writeln!(f, "VMs by power state:")?;
        for c in &self.power_states {
            writeln!(f, "  {:<24} {}", c.value, c.count)?;
        }
        writeln!(f, "Distinct operating systems: {}", self.distinct_os_count)?;
        for c in &self.vms_by_os {
            writeln!(f, "  {:<48} {}", c.value, c.count)?;
        }
        writeln!(f, "Clusters ({}): {}", self.cluster_count, self.cluster_names.join(", "))?;
        writeln!(f, "Total vCPU: {}", self.total_vcpu)?;
        writeln!(f, "Total vRAM (GiB): {:.2}", self.total_vram_gib)?;
        writeln!(f, "Total VMDK used (GiB): {:.2}", self.total_vmdk_used_gib)?;
        writeln!(f, "Total VMDK provisioned (GiB): {:.2}", self.total_vmdk_total_gib)?;
        writeln!(
            f,
            "{:<24} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        )?;
        for s in &self.describe {
            writeln!(
                f,
                "{:<24} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
                s.column,
                s.count,
                opt(s.mean),
                opt(s.std),
                opt(s.min),
                opt(s.p25),
                opt(s.p50),
                opt(s.p75),
                opt(s.max)
            )?;
        }
        Ok(())
    }
}
