//! Consolidation of related sheets into one row per VM.
//!
//! Secondary sheets relate one-to-many to the primary sheet. They are reduced to one value
//! per VM ([`sum_by_vm`] or [`first_row_by_vm`]) before being left-joined onto the primary
//! rows, so a VM missing from a secondary sheet just gets nulls. [`prefer_detail`] is the
//! per-field fallback from fine-grained to coarse figures.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::error::{ConversionError, ConversionResult};
use crate::record::{NormalizationWarning, NO_IP};
use crate::types::DataSet;

use super::DuplicatePolicy;

/// Canonical name of the join key column in every projected sheet.
pub const VM_ID: &str = "vm_id";

/// Sum column `value` per VM identifier.
///
/// Rows without an identifier are ignored; null values add nothing, so a VM whose rows are
/// all null sums to `0.0`.
pub fn sum_by_vm(ds: &DataSet, value: &str) -> HashMap<String, f64> {
    let mut sums: HashMap<String, f64> = HashMap::new();
    for idx in 0..ds.row_count() {
        let Some(row) = ds.row(idx) else { continue };
        let Some(vm_id) = row.text(VM_ID) else { continue };
        let total = sums.entry(vm_id).or_insert(0.0);
        if let Some(v) = row.f64(value) {
            *total += v;
        }
    }
    sums
}

/// Map each VM identifier to the index of its first row.
///
/// Later rows for the same identifier are reported as
/// [`NormalizationWarning::DuplicateVmId`].
pub fn first_row_by_vm(
    ds: &DataSet,
    sheet: &str,
    warnings: &mut Vec<NormalizationWarning>,
) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for idx in 0..ds.row_count() {
        let Some(vm_id) = ds.row(idx).and_then(|r| r.text(VM_ID)) else {
            continue;
        };
        match index.entry(vm_id) {
            Entry::Vacant(e) => {
                e.insert(idx);
            }
            Entry::Occupied(e) => warnings.push(NormalizationWarning::DuplicateVmId {
                sheet: sheet.to_string(),
                vm_id: e.key().clone(),
            }),
        }
    }
    index
}

/// Row indices of the primary sheet that become records, in sheet order.
///
/// Rows without an identifier are skipped with a [`NormalizationWarning::MissingVmId`]
/// (the reported row is the 1-based data row). Repeated identifiers follow `policy`.
pub fn primary_rows(
    ds: &DataSet,
    sheet: &str,
    policy: DuplicatePolicy,
    warnings: &mut Vec<NormalizationWarning>,
) -> ConversionResult<Vec<usize>> {
    let mut seen = HashSet::new();
    let mut keep = Vec::with_capacity(ds.row_count());
    for idx in 0..ds.row_count() {
        let Some(vm_id) = ds.row(idx).and_then(|r| r.text(VM_ID)) else {
            warnings.push(NormalizationWarning::MissingVmId {
                sheet: sheet.to_string(),
                row: idx + 1,
            });
            continue;
        };
        if seen.contains(&vm_id) {
            match policy {
                DuplicatePolicy::KeepFirst => {
                    warnings.push(NormalizationWarning::DuplicateVmId {
                        sheet: sheet.to_string(),
                        vm_id,
                    });
                    continue;
                }
                DuplicatePolicy::Reject => {
                    return Err(ConversionError::DuplicateVmId {
                        sheet: sheet.to_string(),
                        vm_id,
                    });
                }
            }
        }
        seen.insert(vm_id);
        keep.push(idx);
    }
    Ok(keep)
}

/// Fine-grained figure if present and non-zero, otherwise the coarse one.
pub fn prefer_detail(detail: Option<f64>, coarse: Option<f64>) -> Option<f64> {
    match detail {
        Some(v) if v != 0.0 => Some(v),
        _ => coarse,
    }
}

/// Join guest IP fields with `", "`, dropping blanks and [`NO_IP`] entries.
///
/// Returns [`NO_IP`] when nothing is left.
pub fn join_ip_addresses<I>(ips: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    let kept: Vec<String> = ips
        .into_iter()
        .flatten()
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty() && ip != NO_IP)
        .collect();
    if kept.is_empty() {
        NO_IP.to_string()
    } else {
        kept.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::{first_row_by_vm, join_ip_addresses, prefer_detail, primary_rows, sum_by_vm};
    use crate::error::ConversionError;
    use crate::normalize::DuplicatePolicy;
    use crate::record::NormalizationWarning;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn keyed(rows: Vec<(Option<&str>, Option<f64>)>) -> DataSet {
        let schema = Schema::new(vec![
            Field::new("vm_id", DataType::Utf8),
            Field::new("vmdk_total", DataType::Float64),
        ]);
        let rows = rows
            .into_iter()
            .map(|(k, v)| {
                vec![
                    k.map(|k| Value::Utf8(k.to_string())).unwrap_or(Value::Null),
                    v.map(Value::Float64).unwrap_or(Value::Null),
                ]
            })
            .collect();
        DataSet::new(schema, rows)
    }

    #[test]
    fn sums_multiple_disks_per_vm() {
        let ds = keyed(vec![
            (Some("vm-1"), Some(51200.0)),
            (Some("vm-2"), Some(1024.0)),
            (Some("vm-1"), Some(30720.0)),
            (None, Some(99.0)),
        ]);
        let sums = sum_by_vm(&ds, "vmdk_total");
        assert_eq!(sums.len(), 2);
        assert_eq!(sums["vm-1"], 81920.0);
        assert_eq!(sums["vm-2"], 1024.0);
    }

    #[test]
    fn all_null_values_sum_to_zero() {
        let ds = keyed(vec![(Some("vm-1"), None), (Some("vm-1"), None)]);
        assert_eq!(sum_by_vm(&ds, "vmdk_total")["vm-1"], 0.0);
    }

    #[test]
    fn first_row_wins_and_duplicates_are_reported() {
        let ds = keyed(vec![
            (Some("vm-1"), Some(1.0)),
            (Some("vm-1"), Some(2.0)),
            (Some("vm-2"), Some(3.0)),
        ]);
        let mut warnings = Vec::new();
        let index = first_row_by_vm(&ds, "VM Performance", &mut warnings);
        assert_eq!(index["vm-1"], 0);
        assert_eq!(index["vm-2"], 2);
        assert_eq!(
            warnings,
            vec![NormalizationWarning::DuplicateVmId {
                sheet: "VM Performance".to_string(),
                vm_id: "vm-1".to_string(),
            }]
        );
    }

    #[test]
    fn primary_rows_keep_first_and_skip_missing_ids() {
        let ds = keyed(vec![
            (Some("vm-1"), None),
            (None, None),
            (Some("vm-1"), None),
            (Some("vm-3"), None),
        ]);
        let mut warnings = Vec::new();
        let keep = primary_rows(&ds, "vInfo", DuplicatePolicy::KeepFirst, &mut warnings).unwrap();
        assert_eq!(keep, vec![0, 3]);
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], NormalizationWarning::MissingVmId { row: 2, .. }));
    }

    #[test]
    fn primary_rows_reject_duplicates_when_asked() {
        let ds = keyed(vec![(Some("vm-1"), None), (Some("vm-1"), None)]);
        let mut warnings = Vec::new();
        let err = primary_rows(&ds, "VMs", DuplicatePolicy::Reject, &mut warnings).unwrap_err();
        assert!(matches!(err, ConversionError::DuplicateVmId { ref vm_id, .. } if vm_id == "vm-1"));
    }

    #[test]
    fn fallback_applies_to_missing_and_zero() {
        assert_eq!(prefer_detail(Some(80.0), Some(100.0)), Some(80.0));
        assert_eq!(prefer_detail(Some(0.0), Some(100.0)), Some(100.0));
        assert_eq!(prefer_detail(None, Some(100.0)), Some(100.0));
        assert_eq!(prefer_detail(None, None), None);
        assert_eq!(prefer_detail(Some(0.0), None), None);
    }

    #[test]
    fn ip_join_drops_sentinels_everywhere() {
        let ips = vec![
            Some("no ip".to_string()),
            Some("10.0.0.2".to_string()),
            None,
            Some("fe80::1".to_string()),
        ];
        assert_eq!(join_ip_addresses(ips), "10.0.0.2, fe80::1");
        assert_eq!(join_ip_addresses(vec![None, Some(" ".to_string())]), "no ip");
    }
}
