//! `rust-vm-inventory` normalizes VM inventory exports from Live Optics and RVTools workbooks
//! into one canonical per-VM record set, persists it as a CSV artifact and summarizes it.
//!
//! The primary entrypoint is [`pipeline::describe_import`], which detects the vendor layout,
//! converts the workbook and summarizes the result. The three steps are also available on
//! their own: [`pipeline::detect_format`], [`pipeline::convert`], [`pipeline::summarize`].
//!
//! ## What you can convert
//!
//! **Workbooks** (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`, read with `calamine`):
//!
//! - **Live Optics**: sheets `VMs` (keyed by `MOB ID`) and `VM Performance`
//! - **RVTools**: sheets `vInfo` (keyed by `VM ID`), `vDisk` and `vPartition`
//!
//! Capacity and memory columns may be labelled in `MiB` or `MB`; either way values are
//! divided by 1024 and reported in GiB. Anything else is [`normalize::WorkbookFormat::Invalid`],
//! which is a normal outcome, not an error.
//!
//! **Canonical record:** [`record::VmRecord`], one per VM, with performance fields empty for
//! RVTools and `vInfo` storage fields empty for Live Optics.
//!
//! ## Quick example: convert an upload
//!
//! ```no_run
//! use rust_vm_inventory::pipeline::{describe_import, ImportOutcome, PipelineOptions};
//!
//! # fn main() -> Result<(), rust_vm_inventory::ConversionError> {
//! match describe_import("input/", "export.xlsx", "output/", &PipelineOptions::default())? {
//!     ImportOutcome::Summarized { format, artifact, summary } => {
//!         println!("{format}: {} VMs in {artifact}", summary.total_vm_count);
//!         print!("{summary}");
//!     }
//!     ImportOutcome::Unsupported => println!("not a Live Optics or RVTools export"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`]: path-based entrypoints, options and observer hooks
//! - [`normalize`]: format detection, unit handling and the two vendor extractors
//! - [`workbook`]: worksheet access ([`workbook::SheetSource`]) and typed column projection
//! - [`record`]: the canonical record and its schema
//! - [`artifact`]: the intermediate CSV artifact
//! - [`summary`]: aggregate statistics over a record set
//! - [`processing`]: column reductions and group-bys used by the summary
//! - [`config`]: JSON engine configuration
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types used across the crate
//!
//! ## In-memory example
//!
//! ```rust
//! use rust_vm_inventory::normalize::{DuplicatePolicy, WorkbookFormat};
//! use rust_vm_inventory::pipeline::convert_source;
//! use rust_vm_inventory::summary::summarize_records;
//! use rust_vm_inventory::types::Value;
//! use rust_vm_inventory::workbook::{MemoryWorkbook, RawSheet};
//!
//! let s = |v: &str| Value::Utf8(v.to_string());
//! let mut wb = MemoryWorkbook::default()
//!     .with_sheet(RawSheet::with_headers(
//!         "vInfo",
//!         &["VM ID", "VM", "CPUs", "Provisioned MiB", "In Use MiB"],
//!         vec![
//!             vec![s("vm-1"), s("web01"), Value::Int64(2), Value::Float64(40960.0), Value::Float64(10240.0)],
//!             vec![s("vm-2"), s("db01"), Value::Int64(8), Value::Float64(81920.0), Value::Float64(40960.0)],
//!         ],
//!     ))
//!     .with_sheet(RawSheet::with_headers("vDisk", &["VM ID", "Capacity MiB"], vec![]))
//!     .with_sheet(RawSheet::with_headers("vPartition", &["VM ID", "Consumed MiB"], vec![]));
//!
//! let set = convert_source(WorkbookFormat::RvTools, &mut wb, DuplicatePolicy::KeepFirst).unwrap();
//! let summary = summarize_records(&set.records);
//! assert_eq!(summary.total_vm_count, 2);
//! assert_eq!(summary.total_vcpu, 10);
//! assert_eq!(summary.total_vmdk_total_gib, 120.0);
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod processing;
pub mod record;
pub mod summary;
pub mod types;
pub mod workbook;

pub use error::{ConversionError, ConversionResult};
pub use normalize::WorkbookFormat;
pub use pipeline::{convert, describe_import, detect_format, summarize, ImportOutcome, PipelineOptions};
pub use record::VmRecord;
pub use summary::InventorySummary;
