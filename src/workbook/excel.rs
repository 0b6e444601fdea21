use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader, Sheets};

use crate::error::{ConversionError, ConversionResult};
use crate::types::Value;

use super::{RawSheet, SheetSource};

/// A workbook file on disk (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`), read with calamine.
///
/// Sheets are read lazily; only the worksheets an extractor asks for are parsed.
pub struct ExcelWorkbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl std::fmt::Debug for ExcelWorkbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExcelWorkbook")
            .field("path", &self.path)
            .field("sheets", &self.sheets.sheet_names())
            .finish()
    }
}

impl ExcelWorkbook {
    /// Open a workbook; the container format is inferred from the extension.
    pub fn open(path: impl AsRef<Path>) -> ConversionResult<Self> {
        let path = path.as_ref();
        // Surface a missing file as plain I/O rather than a container error.
        std::fs::metadata(path)?;
        let sheets = open_workbook_auto(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }
}

impl SheetSource for ExcelWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    fn read_sheet(&mut self, name: &str) -> ConversionResult<RawSheet> {
        if !self.has_sheet(name) {
            return Err(ConversionError::MissingRequiredSheet {
                sheet: name.to_string(),
            });
        }
        let range = self.sheets.worksheet_range(name)?;
        let rows = range
            .rows()
            .map(|row| row.iter().map(cell_to_value).collect())
            .collect();
        Ok(RawSheet::new(name, rows))
    }
}

/// Map a calamine cell onto an untyped [`Value`]; typing happens in projection.
fn cell_to_value(c: &Data) -> Value {
    match c {
        Data::Empty => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
        // Formula errors (#N/A, #DIV/0!) carry no usable value.
        Data::Error(_) => Value::Null,
        Data::DateTime(_) => Value::Utf8(c.to_string()),
    }
}
