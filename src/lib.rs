#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dwarfscope
//!
//! A concurrent decoder that projects the DWARF debug information of ELF binaries into
//! flat, dictionary-compressed columnar batches, built for feeding query engines that
//! consume data one row-batch at a time.
//!
//! ## Features
//!
//! - **Efficient memory access** - Memory-mapped containers with reference-based parsing
//! - **Parallel decoding** - A pool of worker threads decodes independent units
//!   concurrently, with a bounded delivery queue providing backpressure
//! - **Dictionary compression** - Low-cardinality columns (tags, attribute names, forms,
//!   filenames) share deduplicated value tables with format-code-stable indices
//! - **Column projection** - Only the columns the consumer requests are materialized
//! - **Memory safe** - Built in Rust with comprehensive error handling
//!
//! ## Quick Start
//!
//! Add `dwarfscope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! dwarfscope = "0.1"
//! ```
//!
//! ### Basic Usage
//!
//! ```rust,no_run
//! use dwarfscope::{ColumnId, DwarfReader, ReaderOptions};
//! use std::path::Path;
//!
//! let mut reader = DwarfReader::from_file(Path::new("binary.elf"), ReaderOptions::default())?;
//!
//! while let Some(batch) = reader.next_batch()? {
//!     let tags = batch.column(ColumnId::Tag).unwrap();
//!     println!("decoded {} entries", batch.num_rows());
//! }
//! # Ok::<(), dwarfscope::Error>(())
//! ```
//!
//! ### Column Projection
//!
//! ```rust,no_run
//! use dwarfscope::{ColumnSet, DwarfReader, ReaderOptions};
//! use std::path::Path;
//!
//! // Only materialize the offset and tag columns; everything else is skipped
//! // during decoding.
//! let options = ReaderOptions {
//!     columns: ColumnSet::OFFSET | ColumnSet::TAG,
//!     ..ReaderOptions::default()
//! };
//! let mut reader = DwarfReader::from_file(Path::new("binary.elf"), options)?;
//! # Ok::<(), dwarfscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `dwarfscope` is organized into four layers:
//!
//! - [`file`] - The byte-source layer: memory-mapped or buffered ELF containers and the
//!   bounds-checked section [`Parser`]
//! - `dwarf` (internal) - The format layer: abbreviation tables, unit headers, attribute
//!   forms, line-table prologues, and the fixed code→name enumeration spaces
//! - [`columns`] - The output model: shared dictionaries, the fixed logical schema, the
//!   projection mask, and [`Batch`]
//! - [`read`] - The pipeline: the stack-based entry decoder, the worker pool with its
//!   bounded delivery queue, and the pull-based [`DwarfReader`] driver
//!
//! ## Output Schema
//!
//! Every batch draws from a fixed set of fifteen logical columns — entry offset and
//! size, tag, unit name/offset, ancestor tags/offsets, the promoted `name` /
//! `linkage_name` / `decl_file` / `decl_line` scalars, and the four parallel attribute
//! arrays (`attr_name`, `attr_form`, `attr_int`, `attr_str`). See
//! [`DwarfReader::schema`].
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Container problems (missing
//! sections, unreadable files) surface once during lazy initialization; decode problems
//! are fatal for the run, captured from whichever worker hit them first, and re-raised
//! on the consumer's next pull.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;

pub mod columns;
pub(crate) mod dwarf;
pub mod file;
pub mod read;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use dwarfscope::prelude::*;
///
/// let mut reader = DwarfReader::from_file("binary.elf".as_ref(), ReaderOptions::default())?;
/// let batch = reader.next_batch()?;
/// # Ok::<(), dwarfscope::Error>(())
/// ```
pub mod prelude;

pub use columns::{schema, Batch, ColumnData, ColumnDesc, ColumnId, ColumnSet, ColumnType};
pub use error::Error;
pub use file::parser::Parser;
pub use file::File;
pub use read::{DwarfReader, ReaderOptions};

/// The result type used throughout dwarfscope.
pub type Result<T, E = Error> = std::result::Result<T, E>;
