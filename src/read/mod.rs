//! The concurrent decode pipeline.
//!
//! Three pieces, bottom-up:
//!
//! - the entry decoder - turns one unit's entries into column builders, one bounded
//!   turn at a time, resumable via the unit cursor's explicit ancestor stack
//! - the worker pool - N threads pulling units from a shared FIFO queue and pushing
//!   completed batches into a delivery queue bounded by the worker count (backpressure)
//! - [`DwarfReader`] - the pull-based driver: lazy initialization, `next_batch`,
//!   cooperative stop and reset, cross-thread error propagation
//!
//! Batches are delivered in completion order, not unit order; rows within a unit
//! preserve decode order, and a unit's cursor is only ever advanced by one worker at a
//! time.

mod decoder;
mod pool;
mod reader;

pub use reader::{DwarfReader, ReaderOptions};
