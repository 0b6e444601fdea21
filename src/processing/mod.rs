//! In-memory aggregations over a [`crate::types::DataSet`].
//!
//! The summary reporter is built from these:
//!
//! - [`reduce()`]: single-column reductions (sum/min/max/mean)
//! - [`value_counts()`], [`unique()`], [`n_unique()`], [`group_n_unique()`]: categorical
//!   aggregations
//! - [`describe()`]: count/mean/std/quartiles per numeric column
//!
//! ## Example
//!
//! ```rust
//! use rust_vm_inventory::processing::{reduce, value_counts, ReduceOp};
//! use rust_vm_inventory::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("vcpu", DataType::Int64),
//!     Field::new("vm_state", DataType::Utf8),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Int64(2), Value::Utf8("poweredOn".to_string())],
//!         vec![Value::Int64(4), Value::Utf8("poweredOn".to_string())],
//!         vec![Value::Null, Value::Utf8("poweredOff".to_string())],
//!     ],
//! );
//!
//! assert_eq!(reduce(&ds, "vcpu", ReduceOp::Sum), Some(Value::Int64(6)));
//! let states = value_counts(&ds, "vm_state").unwrap();
//! assert_eq!(states[0], ("poweredOn".to_string(), 2));
//! ```

pub mod describe;
pub mod group;
pub mod reduce;

pub use describe::{describe, ColumnStats};
pub use group::{group_n_unique, n_unique, unique, value_counts};
pub use reduce::{reduce, ReduceOp};
