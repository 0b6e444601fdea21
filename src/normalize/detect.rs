//! Workbook format detection.
//!
//! Detection is syntactic: it looks at worksheet names and header labels only, never at cell
//! values, so reordering or editing data rows cannot change the result.

use std::fmt;

use serde::Serialize;

use crate::error::ConversionResult;
use crate::workbook::SheetSource;

use super::{live_optics, rvtools};

/// The vendor layout of a workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkbookFormat {
    /// Live Optics export (`VMs` + `VM Performance`).
    #[serde(rename = "live-optics")]
    LiveOptics,
    /// RVTools export (`vInfo` + `vDisk` + `vPartition`).
    #[serde(rename = "rv-tools")]
    RvTools,
    /// Neither layout matched.
    #[serde(rename = "invalid")]
    Invalid,
}

impl WorkbookFormat {
    /// Stable label: `live-optics`, `rv-tools` or `invalid`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LiveOptics => "live-optics",
            Self::RvTools => "rv-tools",
            Self::Invalid => "invalid",
        }
    }

    /// Parse a caller-declared file type (e.g. an upload form field). Case-insensitive.
    ///
    /// Only the two vendor formats are accepted; anything else is `None`.
    pub fn from_declared(declared: &str) -> Option<Self> {
        match declared.trim().to_ascii_lowercase().as_str() {
            "live-optics" | "liveoptics" | "lova" => Some(Self::LiveOptics),
            "rv-tools" | "rvtools" => Some(Self::RvTools),
            _ => None,
        }
    }

    /// Returns `true` for the two vendor formats.
    pub fn is_supported(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

impl fmt::Display for WorkbookFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide which vendor layout `source` uses.
///
/// - Live Optics: sheets `VMs` and `VM Performance`, and `VMs` has a `MOB ID` column.
/// - RVTools: sheets `vInfo`, `vDisk` and `vPartition`, and `vInfo` has a `VM ID` column.
///
/// Live Optics is checked first. A workbook matching neither is
/// [`WorkbookFormat::Invalid`]; that is a result, not an error. Errors are only returned
/// when a sheet cannot be read at all.
pub fn detect_workbook_format(source: &mut dyn SheetSource) -> ConversionResult<WorkbookFormat> {
    if matches_layout(
        source,
        &[live_optics::VMS_SHEET, live_optics::PERFORMANCE_SHEET],
        live_optics::VMS_SHEET,
        live_optics::VM_KEY_COLUMN,
    )? {
        return Ok(WorkbookFormat::LiveOptics);
    }

    if matches_layout(
        source,
        &[rvtools::VINFO_SHEET, rvtools::VDISK_SHEET, rvtools::VPARTITION_SHEET],
        rvtools::VINFO_SHEET,
        rvtools::VM_KEY_COLUMN,
    )? {
        return Ok(WorkbookFormat::RvTools);
    }

    Ok(WorkbookFormat::Invalid)
}

fn matches_layout(
    source: &mut dyn SheetSource,
    sheets: &[&str],
    key_sheet: &str,
    key_column: &str,
) -> ConversionResult<bool> {
    if !sheets.iter().all(|s| source.has_sheet(s)) {
        return Ok(false);
    }
    Ok(source.read_sheet(key_sheet)?.has_column(key_column))
}
