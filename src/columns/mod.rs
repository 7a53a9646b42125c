//! Columnar output model: dictionaries, the logical schema, and batches.
//!
//! The decode pipeline projects the DWARF entry tree into a fixed set of fifteen logical
//! columns. Low-cardinality columns (tags, attribute names, forms, filenames) are
//! dictionary-encoded against shared value tables built once per run; array-typed columns
//! carry a values column plus per-row offsets.
//!
//! # Key Components
//!
//! - [`StringDict`] - Immutable shared value table referenced by dictionary columns
//! - [`ColumnId`] / [`ColumnSet`] - Logical column identifiers and the projection mask
//! - [`schema`] - The static output schema (no I/O required)
//! - [`Batch`] / [`ColumnData`] - One decode turn's materialized output

mod batch;
mod dictionary;

pub use batch::{schema, Batch, ColumnData, ColumnDesc, ColumnId, ColumnSet, ColumnType};
pub use dictionary::StringDict;

pub(crate) use dictionary::{SharedDicts, StringDictBuilder};
