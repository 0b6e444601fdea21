//! Column projection: pick an allow-list of columns out of a [`RawSheet`], rename them to
//! canonical names and convert every cell to the column's [`DataType`].

use crate::error::{ConversionError, ConversionResult};
use crate::record::NormalizationWarning;
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::RawSheet;

/// One projected column: where it comes from, what it is called afterwards, and its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Header label in the vendor sheet.
    pub source: String,
    /// Canonical column name in the projected dataset.
    pub target: &'static str,
    /// Target type.
    pub data_type: DataType,
    /// Required columns fail projection when absent or unparsable; optional ones become
    /// null instead.
    pub required: bool,
}

impl ColumnSpec {
    /// A column that must be present in the sheet.
    pub fn required(source: impl Into<String>, target: &'static str, data_type: DataType) -> Self {
        Self {
            source: source.into(),
            target,
            data_type,
            required: true,
        }
    }

    /// A column that is projected as nulls when the sheet lacks it.
    pub fn optional(source: impl Into<String>, target: &'static str, data_type: DataType) -> Self {
        Self {
            source: source.into(),
            target,
            data_type,
            required: false,
        }
    }
}

/// Project `sheet` onto `columns`.
///
/// - The header row is the first non-empty row; fully empty data rows are skipped.
/// - Header matching is exact after trimming.
/// - Every missing required column is reported in one
///   [`ConversionError::MissingRequiredColumns`].
/// - A cell that does not parse as its type is a [`ConversionError::ParseError`] in a
///   required column. In an optional column it becomes [`Value::Null`] and is reported as
///   [`NormalizationWarning::UnparsableCell`].
pub fn project(
    sheet: &RawSheet,
    columns: &[ColumnSpec],
    warnings: &mut Vec<NormalizationWarning>,
) -> ConversionResult<DataSet> {
    let headers = sheet.headers();
    if headers.is_empty() {
        return Err(ConversionError::MissingRequiredColumns {
            sheet: sheet.name.clone(),
            message: "sheet has no non-empty rows (no header row found)".to_string(),
        });
    }

    let col_idxs: Vec<Option<usize>> = columns
        .iter()
        .map(|c| headers.iter().position(|h| *h == c.source))
        .collect();

    let missing: Vec<&str> = columns
        .iter()
        .zip(&col_idxs)
        .filter(|(c, idx)| c.required && idx.is_none())
        .map(|(c, _)| c.source.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(ConversionError::MissingRequiredColumns {
            sheet: sheet.name.clone(),
            message: format!("missing required column(s) {missing:?}. headers={headers:?}"),
        });
    }

    let schema = Schema::new(
        columns
            .iter()
            .map(|c| Field::new(c.target, c.data_type))
            .collect(),
    );

    let mut rows = Vec::new();
    for (user_row, row) in sheet.data_rows() {
        let mut out = Vec::with_capacity(columns.len());
        for (spec, idx) in columns.iter().zip(&col_idxs) {
            let cell = idx.and_then(|i| row.get(i)).unwrap_or(&Value::Null);
            let label = format!("{}:{}", sheet.name, spec.source);
            let value = match convert_cell(user_row, &label, spec.data_type, cell) {
                Ok(v) => v,
                Err(ConversionError::ParseError { raw, .. }) if !spec.required => {
                    warnings.push(NormalizationWarning::UnparsableCell {
                        sheet: sheet.name.clone(),
                        row: user_row,
                        column: spec.source.clone(),
                        raw,
                    });
                    Value::Null
                }
                Err(e) => return Err(e),
            };
            out.push(value);
        }
        rows.push(out);
    }

    Ok(DataSet::new(schema, rows))
}

fn convert_cell(row: usize, column: &str, data_type: DataType, c: &Value) -> ConversionResult<Value> {
    let c = match c {
        Value::Utf8(s) if s.trim().is_empty() => return Ok(Value::Null),
        Value::Null => return Ok(Value::Null),
        other => other,
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(cell_to_string(c))),
        DataType::Int64 => parse_i64_cell(row, column, c).map(Value::Int64),
        DataType::Float64 => parse_f64_cell(row, column, c).map(Value::Float64),
    }
}

/// Text rendering used for string columns; integral floats print without a fraction so
/// numeric-looking OS or name cells survive as `"2019"`, not `"2019.0"`.
fn cell_to_string(c: &Value) -> String {
    match c {
        Value::Utf8(s) => s.trim().to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Float64(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => (*f as i64).to_string(),
        Value::Float64(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
    }
}

fn parse_error(row: usize, column: &str, c: &Value, message: impl Into<String>) -> ConversionError {
    ConversionError::ParseError {
        row,
        column: column.to_string(),
        raw: cell_to_string(c),
        message: message.into(),
    }
}

fn parse_i64_cell(row: usize, column: &str, c: &Value) -> ConversionResult<i64> {
    match c {
        Value::Int64(i) => Ok(*i),
        Value::Float64(f) if f.fract() == 0.0 => Ok(*f as i64),
        Value::Float64(_) => Err(parse_error(
            row,
            column,
            c,
            "expected integer (got non-integer float)",
        )),
        Value::Utf8(s) => {
            let t = s.trim();
            t.parse::<i64>().or_else(|e| match t.parse::<f64>() {
                Ok(f) if f.fract() == 0.0 => Ok(f as i64),
                _ => Err(parse_error(row, column, c, e.to_string())),
            })
        }
        _ => Err(parse_error(row, column, c, "expected integer")),
    }
}

fn parse_f64_cell(row: usize, column: &str, c: &Value) -> ConversionResult<f64> {
    match c {
        Value::Float64(f) => Ok(*f),
        Value::Int64(i) => Ok(*i as f64),
        Value::Utf8(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| parse_error(row, column, c, e.to_string())),
        _ => Err(parse_error(row, column, c, "expected number")),
    }
}
