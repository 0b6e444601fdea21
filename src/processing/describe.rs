//! Descriptive statistics for numeric columns.

use serde::Serialize;

use crate::types::{DataSet, Value};

use super::reduce::{reduce, ReduceOp};

/// count / mean / std / min / quartiles / max of one numeric column.
///
/// `count` is the number of non-null values. Every other figure is `None` when the column has
/// no values; `std` (sample, n-1) is also `None` for a single value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    fn of_column(dataset: &DataSet, column: &str) -> Self {
        let mut values: Vec<f64> = dataset
            .column(column)
            .into_iter()
            .flatten()
            .filter_map(Value::as_f64)
            .filter(|v| !v.is_nan())
            .collect();
        values.sort_by(f64::total_cmp);

        let stat = |op| reduce(dataset, column, op).and_then(|v| v.as_f64());
        let count = values.len();
        let mean = stat(ReduceOp::Mean);
        let std = match (mean, count) {
            (Some(m), n) if n > 1 => {
                let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            }
            _ => None,
        };
        Self {
            column: column.to_string(),
            count,
            mean,
            std,
            min: stat(ReduceOp::Min),
            p25: quantile(&values, 0.25),
            p50: quantile(&values, 0.50),
            p75: quantile(&values, 0.75),
            max: stat(ReduceOp::Max),
        }
    }
}

/// Linear-interpolated quantile of already sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let pos = q * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Statistics for every numeric column of `dataset`, in schema order.
pub fn describe(dataset: &DataSet) -> Vec<ColumnStats> {
    dataset
        .schema
        .fields
        .iter()
        .filter(|f| f.data_type.is_numeric())
        .map(|f| ColumnStats::of_column(dataset, &f.name))
        .collect()
}
