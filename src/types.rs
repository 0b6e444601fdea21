//! Core tabular types shared by the workbook readers, the extractors and the summary.
//!
//! Worksheets are projected into an in-memory [`DataSet`] described by a [`Schema`] (a list of
//! typed [`Field`]s). The canonical per-VM record lives in [`crate::record`].

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Returns `true` for [`DataType::Int64`] and [`DataType::Float64`].
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed value in a [`DataSet`] or a raw worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean worksheet cell; no column is typed as boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Numeric view of the value (`Int64` widened to `f64`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Converts a `Utf8` value into an owned string, treating blanks as missing.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Utf8(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Borrow row `idx` with by-name access.
    pub fn row(&self, idx: usize) -> Option<RowRef<'_>> {
        self.rows.get(idx).map(|values| RowRef {
            schema: &self.schema,
            values,
        })
    }

    /// Iterate the values of column `name`, or `None` if the column does not exist.
    ///
    /// Short rows yield [`Value::Null`] for the missing cell.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a Value> + use<'a>> {
        let idx = self.schema.index_of(name)?;
        Some(
            self.rows
                .iter()
                .map(move |row| row.get(idx).unwrap_or(&Value::Null)),
        )
    }
}

/// A borrowed [`DataSet`] row; cells are looked up by column name.
#[derive(Debug, Clone, Copy)]
pub struct RowRef<'a> {
    schema: &'a Schema,
    values: &'a [Value],
}

impl<'a> RowRef<'a> {
    /// Cell of column `name`; unknown columns and short rows read as [`Value::Null`].
    pub fn get(&self, name: &str) -> &'a Value {
        self.schema
            .index_of(name)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&Value::Null)
    }

    /// Non-blank text of column `name`.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).clone().into_text()
    }

    /// Numeric cell of column `name`.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).as_f64()
    }

    /// Integer cell of column `name`.
    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).as_i64()
    }
}
