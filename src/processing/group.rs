//! Categorical aggregations: distinct values, value counts and per-group distinct counts.
//!
//! Null cells are never a category. Non-text cells are keyed by their rendered value.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{DataSet, Value};

fn key_of(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Utf8(s) => Some(s.clone()),
        Value::Int64(i) => Some(i.to_string()),
        Value::Float64(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
    }
}

/// Distinct non-null values of `column` in first-appearance order.
///
/// Returns `None` if the column does not exist.
pub fn unique(dataset: &DataSet, column: &str) -> Option<Vec<String>> {
    let mut seen = HashSet::new();
    let out = dataset
        .column(column)?
        .filter_map(key_of)
        .filter(|k| seen.insert(k.clone()))
        .collect();
    Some(out)
}

/// Number of distinct non-null values of `column`.
pub fn n_unique(dataset: &DataSet, column: &str) -> Option<usize> {
    unique(dataset, column).map(|u| u.len())
}

/// Occurrences of each non-null value of `column`, most frequent first.
///
/// Ties keep first-appearance order.
pub fn value_counts(dataset: &DataSet, column: &str) -> Option<Vec<(String, usize)>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    for key in dataset.column(column)?.filter_map(key_of) {
        let n = counts.entry(key.clone()).or_insert(0);
        if *n == 0 {
            order.push(key);
        }
        *n += 1;
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|k| {
            let n = counts[&k];
            (k, n)
        })
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    Some(out)
}

/// For each non-null value of `by`, the number of distinct non-null `of` values, sorted by
/// group key.
///
/// Returns `None` if either column does not exist.
pub fn group_n_unique(dataset: &DataSet, by: &str, of: &str) -> Option<BTreeMap<String, usize>> {
    let keys = dataset.column(by)?;
    let values = dataset.column(of)?;
    let mut groups: BTreeMap<String, HashSet<String>> = BTreeMap::new();
    for (k, v) in keys.zip(values) {
        let Some(k) = key_of(k) else { continue };
        let members = groups.entry(k).or_default();
        if let Some(v) = key_of(v) {
            members.insert(v);
        }
    }
    Some(groups.into_iter().map(|(k, v)| (k, v.len())).collect())
}
