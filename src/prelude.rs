//! # dwarfscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! dwarfscope library. Import this module to get quick access to the essential types
//! for decoding debug information.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dwarfscope operations
pub use crate::Error;

/// The result type used throughout dwarfscope
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Pull-based concurrent decoder of DWARF debug information
pub use crate::read::{DwarfReader, ReaderOptions};

/// Low-level container and section parsing utilities
pub use crate::{File, Parser};

// ================================================================================================
// Columnar Output Model
// ================================================================================================

/// Batches, columns and the projection mask
pub use crate::columns::{schema, Batch, ColumnData, ColumnDesc, ColumnId, ColumnSet, ColumnType};

/// Shared dictionary value tables
pub use crate::columns::StringDict;
