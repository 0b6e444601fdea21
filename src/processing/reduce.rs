//! Single-column reductions over a [`crate::types::DataSet`].

use crate::types::{DataSet, DataType, Value};

/// Built-in reduction operations over a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Sum numeric values, ignoring nulls.
    Sum,
    /// Minimum numeric value, ignoring nulls.
    Min,
    /// Maximum numeric value, ignoring nulls.
    Max,
    /// Arithmetic mean of numeric values, ignoring nulls. Always `Float64`.
    Mean,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// - Returns `None` if `column` does not exist in the schema.
/// - Returns `Some(Value::Null)` if there are no non-null values, or for a text column.
/// - `NaN` floats are skipped like nulls.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<Value> {
    let idx = dataset.schema.index_of(column)?;
    let data_type = dataset.schema.fields[idx].data_type;

    match op {
        ReduceOp::Mean => {
            let (sum, n) = numeric_values(dataset, idx)
                .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
            Some(if n == 0 { Value::Null } else { Value::Float64(sum / n as f64) })
        }
        ReduceOp::Sum | ReduceOp::Min | ReduceOp::Max => match data_type {
            DataType::Int64 => {
                let acc = dataset
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx).and_then(Value::as_i64))
                    .fold(None, |acc: Option<i64>, v| Some(combine(op, acc, v)));
                Some(acc.map(Value::Int64).unwrap_or(Value::Null))
            }
            DataType::Float64 => {
                let acc = numeric_values(dataset, idx)
                    .fold(None, |acc: Option<f64>, v| Some(combine(op, acc, v)));
                Some(acc.map(Value::Float64).unwrap_or(Value::Null))
            }
            _ => Some(Value::Null),
        },
    }
}

fn numeric_values(dataset: &DataSet, idx: usize) -> impl Iterator<Item = f64> + '_ {
    dataset
        .rows
        .iter()
        .filter_map(move |row| row.get(idx).and_then(Value::as_f64))
        .filter(|v| !v.is_nan())
}

fn combine<T: PartialOrd + std::ops::Add<Output = T> + Copy>(op: ReduceOp, acc: Option<T>, v: T) -> T {
    match (op, acc) {
        (_, None) => v,
        (ReduceOp::Sum, Some(a)) => a + v,
        (ReduceOp::Min, Some(a)) => {
            if v < a {
                v
            } else {
                a
            }
        }
        (ReduceOp::Max, Some(a)) => {
            if v > a {
                v
            } else {
                a
            }
        }
        (_, Some(a)) => a,
    }
}
