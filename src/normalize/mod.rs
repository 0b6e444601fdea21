//! The schema-normalization engine.
//!
//! - [`detect`]: decides which vendor layout a workbook uses
//! - [`units`]: resolves `MiB` vs `MB` column naming per sheet and converts to GiB
//! - [`live_optics`] / [`rvtools`]: one [`Extractor`] per vendor format
//! - [`consolidate`]: group-by-sum, first-wins indexing and the storage fallback rule
//!
//! ## Example: normalize an in-memory RVTools workbook
//!
//! ```rust
//! use rust_vm_inventory::normalize::{detect_workbook_format, extractor_for, DuplicatePolicy, WorkbookFormat};
//! use rust_vm_inventory::types::Value;
//! use rust_vm_inventory::workbook::{MemoryWorkbook, RawSheet};
//!
//! let s = |v: &str| Value::Utf8(v.to_string());
//! let mut wb = MemoryWorkbook::default()
//!     .with_sheet(RawSheet::with_headers(
//!         "vInfo",
//!         &["VM ID", "VM", "Provisioned MiB", "In Use MiB"],
//!         vec![vec![s("vm-1"), s("app01"), Value::Float64(102400.0), Value::Float64(51200.0)]],
//!     ))
//!     .with_sheet(RawSheet::with_headers("vDisk", &["VM ID", "Capacity MiB"], vec![]))
//!     .with_sheet(RawSheet::with_headers("vPartition", &["VM ID", "Consumed MiB"], vec![]));
//!
//! let format = detect_workbook_format(&mut wb).unwrap();
//! assert_eq!(format, WorkbookFormat::RvTools);
//!
//! let extractor = extractor_for(format, DuplicatePolicy::KeepFirst).unwrap();
//! let set = extractor.extract(&mut wb).unwrap();
//! // No vDisk / vPartition rows: the vInfo figures are used.
//! assert_eq!(set.records[0].vmdk_total_gib, Some(100.0));
//! assert_eq!(set.records[0].vmdk_used_gib, Some(50.0));
//! ```

pub mod consolidate;
pub mod detect;
pub mod live_optics;
pub mod rvtools;
pub mod units;

use serde::{Deserialize, Serialize};

use crate::error::ConversionResult;
use crate::record::VmRecordSet;
use crate::workbook::SheetSource;

pub use detect::{detect_workbook_format, WorkbookFormat};
pub use live_optics::LiveOpticsExtractor;
pub use rvtools::RvToolsExtractor;
pub use units::UnitVariant;

/// What to do when a VM identifier repeats within a primary sheet (`VMs` / `vInfo`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the first row for each identifier and report the rest as warnings.
    #[default]
    KeepFirst,
    /// Fail extraction with [`crate::ConversionError::DuplicateVmId`].
    Reject,
}

/// Reads one vendor layout and produces canonical records.
pub trait Extractor {
    /// Format handled by this extractor.
    fn format(&self) -> WorkbookFormat;

    /// Read the vendor sheets from `source` and consolidate them into one record per VM.
    fn extract(&self, source: &mut dyn SheetSource) -> ConversionResult<VmRecordSet>;
}

/// The extractor for `format`, or `None` for [`WorkbookFormat::Invalid`].
pub fn extractor_for(format: WorkbookFormat, policy: DuplicatePolicy) -> Option<Box<dyn Extractor>> {
    match format {
        WorkbookFormat::LiveOptics => Some(Box::new(LiveOpticsExtractor::new(policy))),
        WorkbookFormat::RvTools => Some(Box::new(RvToolsExtractor::new(policy))),
        WorkbookFormat::Invalid => None,
    }
}
