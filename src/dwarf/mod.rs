//! DWARF format layer: the structures between raw section bytes and column values.
//!
//! - [`constants`] - the fixed tag/attribute/form/language/encoding enumeration spaces
//! - [`abbrev`] - abbreviation tables from `.debug_abbrev`
//! - [`unit`] - unit headers, the unit scan, and the per-unit decode cursor
//! - [`form`] - attribute value extraction and shape classification
//! - [`line`] - line-number program prologues and filename tables
//!
//! Everything in this module is deliberately independent of the worker pool: parsing
//! operates on borrowed section slices plus explicit per-unit parameters, so the
//! pipeline layer decides what runs where.

pub(crate) mod abbrev;
pub(crate) mod constants;
pub(crate) mod form;
pub(crate) mod line;
pub(crate) mod unit;
