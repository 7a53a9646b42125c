//! Work queue, worker pool, and delivery queue.
//!
//! All shared mutable state of the pipeline lives in one [`Mutex`]-guarded [`PoolState`];
//! two condition variables carry the two wait reasons: workers sleep on
//! `wake_up_workers` while the delivery queue is saturated, the consumer sleeps on
//! `deliver_batch` while no batch is ready and units remain outstanding.
//!
//! Per unit the state machine is `queued → in progress → requeued | retired`: a worker
//! pops a unit (FIFO), decodes up to the row budget, delivers the batch, and pushes the
//! unit back to the queue front if it is not yet exhausted. The delivery queue is bounded
//! by the worker count; a worker finding it full blocks instead of producing, which
//! throttles decoding when the consumer is slow.
//!
//! Worker failures are captured first-wins into the shared error slot, every waiter is
//! woken, and the pipeline transitions to stopped. Stopping is cooperative: the flag is
//! checked between decode turns, never inside one, so cancellation latency is bounded by
//! one row budget.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use crate::{
    columns::{Batch, ColumnSet, SharedDicts},
    dwarf::{form::DebugSections, line::WarningCounter, unit::UnitCursor},
    file::File,
    Error, Result,
};

use super::decoder::{parse_entries, DecodeContext};

/// `(offset, size)` byte ranges of the debug sections, resolved once at initialization.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SectionRanges {
    pub(crate) info: (usize, usize),
    pub(crate) line: Option<(usize, usize)>,
    pub(crate) strtab: Option<(usize, usize)>,
    pub(crate) line_strtab: Option<(usize, usize)>,
    pub(crate) str_offsets: Option<(usize, usize)>,
    pub(crate) addr: Option<(usize, usize)>,
}

/// Queue and delivery state, guarded by the pipeline mutex.
#[derive(Debug, Default)]
pub(crate) struct PoolState {
    /// Units waiting for a worker, FIFO
    pub(crate) units_queue: VecDeque<UnitCursor>,
    /// Completed batches waiting for the consumer, bounded by the worker count
    pub(crate) delivery_queue: VecDeque<Batch>,
    /// Units currently held by a worker
    pub(crate) units_in_progress: usize,
    /// First captured worker error; re-raised on the consumer's next pull
    pub(crate) error: Option<Error>,
    /// Cooperative stop flag
    pub(crate) stopped: bool,
}

/// Everything shared between the consumer and the worker threads.
///
/// The container, section ranges, dictionaries and projection are immutable after
/// construction; only [`PoolState`] mutates, under its mutex.
pub(crate) struct PipelineShared {
    pub(crate) file: File,
    pub(crate) ranges: SectionRanges,
    pub(crate) dicts: SharedDicts,
    /// Columns the consumer asked for
    pub(crate) requested: ColumnSet,
    /// `requested` closed over array-offset ownership
    pub(crate) need: ColumnSet,
    pub(crate) num_threads: usize,
    pub(crate) state: Mutex<PoolState>,
    /// Producers wait here while the delivery queue is full
    pub(crate) wake_up_workers: Condvar,
    /// The consumer waits here while no batch is ready
    pub(crate) deliver_batch: Condvar,
    pub(crate) line_warnings: WarningCounter,
}

impl PipelineShared {
    /// Materialize the borrowed section slices from the resolved ranges.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] only if the container shrank underneath us,
    /// which cannot happen for the backends this crate provides; ranges were validated
    /// at initialization.
    pub(crate) fn sections(&self) -> Result<DebugSections<'_>> {
        let slice = |range: (usize, usize)| self.file.data_slice(range.0, range.1);
        let optional = |range: Option<(usize, usize)>| range.map(slice).transpose();

        Ok(DebugSections {
            info: slice(self.ranges.info)?,
            line: optional(self.ranges.line)?,
            strtab: optional(self.ranges.strtab)?,
            line_strtab: optional(self.ranges.line_strtab)?,
            str_offsets: optional(self.ranges.str_offsets)?,
            addr: optional(self.ranges.addr)?,
        })
    }
}

/// Body of one worker thread.
///
/// Mirrors the state machine described in the module docs; any error is captured
/// first-wins and wakes every waiter.
pub(crate) fn worker_loop(shared: &Arc<PipelineShared>) {
    let result = run_worker(shared);

    if let Err(error) = result {
        if let Ok(mut state) = shared.state.lock() {
            if state.error.is_none() {
                state.error = Some(error);
            }
            state.stopped = true;
        }
        shared.deliver_batch.notify_all();
        shared.wake_up_workers.notify_all();
    }
}

fn run_worker(shared: &Arc<PipelineShared>) -> Result<()> {
    let sections = shared.sections()?;
    let ctx = DecodeContext {
        sections,
        dicts: &shared.dicts,
        requested: shared.requested,
        need: shared.need,
        warnings: &shared.line_warnings,
    };

    let mut state = lock!(shared.state)?;
    while !state.units_queue.is_empty() && !state.stopped {
        if state.delivery_queue.len() > shared.num_threads {
            state = shared
                .wake_up_workers
                .wait(state)
                .map_err(|_| Error::LockError)?;
            continue;
        }

        let Some(mut unit) = state.units_queue.pop_front() else {
            break;
        };
        state.units_in_progress += 1;
        drop(state);

        let decoded = parse_entries(&ctx, &mut unit);

        state = lock!(shared.state)?;
        state.units_in_progress -= 1;

        // The error must land in the same critical section as the decrement, or the
        // consumer could observe "no work left, no error" and report end-of-data
        // instead of the failure.
        let batch = match decoded {
            Ok(batch) => batch,
            Err(error) => {
                if state.error.is_none() {
                    state.error = Some(error);
                }
                state.stopped = true;
                drop(state);
                shared.deliver_batch.notify_all();
                shared.wake_up_workers.notify_all();
                return Ok(());
            }
        };

        if batch.num_rows() > 0 {
            state.delivery_queue.push_back(batch);
            shared.deliver_batch.notify_one();
        }
        if !unit.is_exhausted() {
            state.units_queue.push_front(unit);
        }
    }

    Ok(())
}
