//! The intermediate CSV artifact written after conversion and read back for the summary.
//!
//! Columns are the fields of [`VmRecord`] in declaration order; the header row is always
//! written, even for an empty record set.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConversionError, ConversionResult};
use crate::normalize::WorkbookFormat;
use crate::record::{canonical_schema, VmRecord};
use crate::types::{DataSet, DataType, Value};

/// Artifact base name for Live Optics conversions.
pub const LIVE_OPTICS_ARTIFACT: &str = "1_vmdata_df_lova.csv";
/// Artifact base name for RVTools conversions.
pub const RVTOOLS_ARTIFACT: &str = "1_vmdata_df_rvtools.csv";

/// How artifact file names are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactNaming {
    /// `<base>-<uuid>.csv`; concurrent runs into one directory never collide.
    #[default]
    RunScoped,
    /// The bare base name; each run overwrites the previous artifact of its format.
    Fixed,
}

/// Identifier of a persisted artifact: its file name inside the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Wrap an existing artifact file name.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self(file_name.into())
    }

    pub fn file_name(&self) -> &str {
        &self.0
    }

    /// Full path of the artifact inside `output_dir`.
    pub fn path_in(&self, output_dir: impl AsRef<Path>) -> PathBuf {
        output_dir.as_ref().join(&self.0)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Base artifact name for `format`, or `None` for [`WorkbookFormat::Invalid`].
pub fn base_name(format: WorkbookFormat) -> Option<&'static str> {
    match format {
        WorkbookFormat::LiveOptics => Some(LIVE_OPTICS_ARTIFACT),
        WorkbookFormat::RvTools => Some(RVTOOLS_ARTIFACT),
        WorkbookFormat::Invalid => None,
    }
}

/// Choose the artifact identifier for a conversion of `format`.
pub fn artifact_id(format: WorkbookFormat, naming: ArtifactNaming) -> Option<ArtifactId> {
    let base = base_name(format)?;
    let name = match naming {
        ArtifactNaming::Fixed => base.to_string(),
        ArtifactNaming::RunScoped => {
            let stem = base.strip_suffix(".csv").unwrap_or(base);
            format!("{stem}-{}.csv", Uuid::new_v4().simple())
        }
    };
    Some(ArtifactId(name))
}

/// Write `records` as CSV to `path`, replacing any existing file.
pub fn write_artifact(path: impl AsRef<Path>, records: &[VmRecord]) -> ConversionResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    wtr.write_record(canonical_schema().field_names())?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read an artifact back into a [`DataSet`] with the canonical schema.
///
/// Columns may appear in any order; every canonical column must be present.
pub fn read_artifact(path: impl AsRef<Path>) -> ConversionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    read_artifact_from_reader(&mut rdr)
}

/// Read artifact CSV from an existing reader.
pub fn read_artifact_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> ConversionResult<DataSet> {
    let schema = canonical_schema();
    let headers = rdr.headers()?.clone();

    let mut col_idxs = Vec::with_capacity(schema.fields.len());
    for field in &schema.fields {
        match headers.iter().position(|h| h == field.name) {
            Some(idx) => col_idxs.push(idx),
            None => {
                return Err(ConversionError::MissingRequiredColumns {
                    sheet: "artifact".to_string(),
                    message: format!(
                        "missing required column '{field}'. headers={:?}",
                        headers.iter().collect::<Vec<_>>(),
                        field = field.name
                    ),
                });
            }
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based, header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;

        let mut row = Vec::with_capacity(schema.fields.len());
        for (field, &csv_idx) in schema.fields.iter().zip(col_idxs.iter()) {
            let raw = record.get(csv_idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema, rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> ConversionResult<Value> {
    // Artifact text columns are never trimmed, blank means missing.
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    let parse_error = |message: String| ConversionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };
    let trimmed = raw.trim();
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
    }
}
