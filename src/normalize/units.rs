//! Unit-suffix resolution and GiB conversion.
//!
//! Vendor exports label storage and memory columns either `MiB` (binary) or `MB` (decimal)
//! depending on the exporter version. The suffix is resolved separately for every sheet,
//! since one workbook can mix both.
//!
//! Both suffixes are converted with the same divisor of 1024: an `MB` column is treated as
//! if it held mebibytes.

use crate::error::{ConversionError, ConversionResult};
use crate::types::DataType;
use crate::workbook::{ColumnSpec, RawSheet};

/// Mebibytes per gibibyte.
pub const MIB_PER_GIB: f64 = 1024.0;

/// Placeholder replaced by the unit suffix in column templates, e.g. `"Capacity {unit}"`.
pub const UNIT_PLACEHOLDER: &str = "{unit}";

/// Unit naming used by a sheet's storage/memory columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitVariant {
    /// `MiB` suffix.
    Binary,
    /// `MB` suffix.
    Decimal,
}

impl UnitVariant {
    /// Column-name suffix for this variant.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Binary => "MiB",
            Self::Decimal => "MB",
        }
    }

    /// Expand a column template for this variant.
    pub fn column(self, template: &str) -> String {
        template.replace(UNIT_PLACEHOLDER, self.suffix())
    }
}

/// Pick the unit variant of `sheet` by literal presence of the `template` column.
///
/// `MiB` wins if both are present. If neither is present the sheet fails with
/// [`ConversionError::MissingRequiredColumns`].
pub fn resolve_unit_variant(sheet: &RawSheet, template: &str) -> ConversionResult<UnitVariant> {
    let binary = UnitVariant::Binary.column(template);
    let decimal = UnitVariant::Decimal.column(template);
    if sheet.has_column(&binary) {
        Ok(UnitVariant::Binary)
    } else if sheet.has_column(&decimal) {
        Ok(UnitVariant::Decimal)
    } else {
        Err(ConversionError::MissingRequiredColumns {
            sheet: sheet.name.clone(),
            message: format!("neither '{binary}' nor '{decimal}' is present"),
        })
    }
}

/// Required numeric columns for `variant`, from `(template, target)` pairs.
pub fn unit_columns(variant: UnitVariant, templates: &[(&str, &'static str)]) -> Vec<ColumnSpec> {
    templates
        .iter()
        .map(|&(template, target)| ColumnSpec::required(variant.column(template), target, DataType::Float64))
        .collect()
}

/// Convert a mebibyte (or source-declared megabyte) quantity to GiB.
pub fn to_gib(mebibytes: f64) -> f64 {
    mebibytes / MIB_PER_GIB
}
