//! Worksheet access.
//!
//! Extractors never talk to calamine directly; they read [`RawSheet`]s through the
//! [`SheetSource`] trait. Two sources exist:
//!
//! - [`excel::ExcelWorkbook`]: a workbook file on disk (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`)
//! - [`MemoryWorkbook`]: sheets already held in memory
//!
//! [`projection`] turns a raw sheet into a typed [`crate::types::DataSet`].

pub mod excel;
pub mod projection;

use crate::error::{ConversionError, ConversionResult};
use crate::types::Value;

pub use excel::ExcelWorkbook;
pub use projection::{project, ColumnSpec};

/// A worksheet as read from the workbook: untyped cells, header row included.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    /// Worksheet name.
    pub name: String,
    /// All rows of the used range, in sheet order.
    pub rows: Vec<Vec<Value>>,
}

impl RawSheet {
    /// Create a sheet from raw rows (the header row is expected among them).
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Create a sheet whose first row is `headers`, followed by `rows`.
    pub fn with_headers(name: impl Into<String>, headers: &[&str], rows: Vec<Vec<Value>>) -> Self {
        let mut all = Vec::with_capacity(rows.len() + 1);
        all.push(headers.iter().map(|h| Value::Utf8(h.to_string())).collect());
        all.extend(rows);
        Self::new(name, all)
    }

    /// Index of the header row: the first row with any non-empty cell.
    pub fn header_row_index(&self) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.iter().any(|c| !is_blank(c)))
    }

    /// Header labels (trimmed), or an empty list for a sheet without any content.
    pub fn headers(&self) -> Vec<String> {
        match self.header_row_index() {
            Some(idx) => self.rows[idx]
                .iter()
                .map(|c| header_label(c).trim().to_string())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns `true` if a header cell equals `column` literally.
    pub fn has_column(&self, column: &str) -> bool {
        self.headers().iter().any(|h| h == column)
    }

    /// Data rows below the header, skipping rows where every cell is empty.
    ///
    /// Yields `(user_row, row)` where `user_row` is the 1-based sheet row number.
    pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[Value])> + '_ {
        let start = self.header_row_index().map(|i| i + 1).unwrap_or(self.rows.len());
        self.rows
            .iter()
            .enumerate()
            .skip(start)
            .filter(|(_, row)| row.iter().any(|c| !is_blank(c)))
            .map(|(idx0, row)| (idx0 + 1, row.as_slice()))
    }
}

fn is_blank(c: &Value) -> bool {
    match c {
        Value::Null => true,
        Value::Utf8(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn header_label(c: &Value) -> String {
    match c {
        Value::Null => String::new(),
        Value::Utf8(s) => s.clone(),
        Value::Int64(i) => i.to_string(),
        Value::Float64(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
    }
}

/// Read access to the worksheets of one workbook.
pub trait SheetSource {
    /// Worksheet names in workbook order.
    fn sheet_names(&self) -> Vec<String>;

    /// Read a worksheet by exact name.
    ///
    /// Returns [`ConversionError::MissingRequiredSheet`] if no such sheet exists.
    fn read_sheet(&mut self, name: &str) -> ConversionResult<RawSheet>;

    /// Returns `true` if a worksheet named exactly `name` exists.
    fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names().iter().any(|s| s == name)
    }
}

/// A workbook whose sheets are already in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryWorkbook {
    sheets: Vec<RawSheet>,
}

impl MemoryWorkbook {
    /// Create a workbook from sheets (order is preserved).
    pub fn new(sheets: Vec<RawSheet>) -> Self {
        Self { sheets }
    }

    /// Append a sheet, builder style.
    pub fn with_sheet(mut self, sheet: RawSheet) -> Self {
        self.sheets.push(sheet);
        self
    }
}

impl SheetSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read_sheet(&mut self, name: &str) -> ConversionResult<RawSheet> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .cloned()
            .ok_or_else(|| ConversionError::MissingRequiredSheet {
                sheet: name.to_string(),
            })
    }
}
