//! The pipeline driver: lazy initialization, the pull side, and reset.
//!
//! [`DwarfReader`] is the crate's main entry point. Construction only records where the
//! bytes come from; the container is opened, sections located, units scanned and workers
//! started lazily on the first [`DwarfReader::next_batch`] call. The consumer then pulls
//! batches until end-of-data, and may [`DwarfReader::reset`] the pipeline back to its
//! pre-initialization state to re-drive the same input from the start (for example after
//! a schema-only probe).
//!
//! A local regular file is memory-mapped; in-memory buffers and generic readers are
//! served from a shared buffer. Missing `.debug_info`/`.debug_abbrev` sections are fatal
//! container errors raised once, during initialization.

use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::{
    columns::{Batch, ColumnDesc, ColumnSet, SharedDicts},
    dwarf::{abbrev::AbbrevTable, line::WarningCounter, unit::scan_units, unit::UnitCursor},
    file::{Backend, File},
    Error, Result,
};

use super::pool::{worker_loop, PipelineShared, PoolState, SectionRanges};

/// Cap on recoverable line-table warnings logged per pipeline instance.
const LINE_WARNING_CAP: usize = 10;

/// Tuning knobs for a [`DwarfReader`].
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    /// Number of parallel decode worker threads. Clamped to at least 1.
    pub num_threads: usize,
    /// The columns to materialize; everything else is skipped during decoding.
    pub columns: ColumnSet,
}

impl Default for ReaderOptions {
    fn default() -> ReaderOptions {
        ReaderOptions {
            num_threads: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            columns: ColumnSet::all(),
        }
    }
}

/// Where the container bytes come from. Retained across resets so the pipeline can be
/// re-driven from the start.
enum ByteSource {
    /// A file on disk; `mappable` selects the mmap fast path
    File { path: PathBuf, mappable: bool },
    /// A shared in-memory buffer
    Memory(Arc<Vec<u8>>),
}

/// Backend serving a shared memory buffer, reusable across resets without copying.
struct SharedBuffer(Arc<Vec<u8>>);

impl Backend for SharedBuffer {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(end) = offset.checked_add(len) else {
            return Err(Error::OutOfBounds);
        };
        if end > self.0.len() {
            return Err(Error::OutOfBounds);
        }
        Ok(&self.0[offset..end])
    }

    fn data(&self) -> &[u8] {
        &self.0
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Pull-based concurrent decoder of DWARF debug information into columnar batches.
///
/// # Examples
///
/// ```rust,no_run
/// use dwarfscope::{ColumnId, DwarfReader, ReaderOptions};
/// use std::path::Path;
///
/// let mut reader = DwarfReader::from_file(Path::new("binary.elf"), ReaderOptions::default())?;
/// while let Some(batch) = reader.next_batch()? {
///     let tags = batch.column(ColumnId::Tag).unwrap();
///     println!("{} rows", batch.num_rows());
/// }
/// # Ok::<(), dwarfscope::Error>(())
/// ```
pub struct DwarfReader {
    source: ByteSource,
    options: ReaderOptions,
    shared: Option<Arc<PipelineShared>>,
    workers: Vec<JoinHandle<()>>,
}

impl DwarfReader {
    /// Create a reader over a file on disk.
    ///
    /// The file is not opened yet; regular files are memory-mapped on first use, other
    /// path kinds are buffered.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the path cannot be inspected.
    pub fn from_file(path: &Path, options: ReaderOptions) -> Result<DwarfReader> {
        let metadata = std::fs::metadata(path)?;

        Ok(DwarfReader {
            source: ByteSource::File {
                path: path.to_path_buf(),
                mappable: metadata.is_file(),
            },
            options,
            shared: None,
            workers: Vec::new(),
        })
    }

    /// Create a reader over an in-memory container image.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer.
    pub fn from_mem(data: Vec<u8>, options: ReaderOptions) -> Result<DwarfReader> {
        if data.is_empty() {
            return Err(Error::Empty);
        }

        Ok(DwarfReader {
            source: ByteSource::Memory(Arc::new(data)),
            options,
            shared: None,
            workers: Vec::new(),
        })
    }

    /// Create a reader by buffering an arbitrary byte source upfront.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if reading fails or
    /// [`crate::Error::Empty`] if the source yields no bytes.
    pub fn from_reader<R: Read>(mut reader: R, options: ReaderOptions) -> Result<DwarfReader> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_mem(data, options)
    }

    /// The full output schema. Requires no I/O and no initialized pipeline.
    #[must_use]
    pub fn schema() -> &'static [ColumnDesc] {
        crate::columns::schema()
    }

    /// Pull the next completed batch.
    ///
    /// Blocks until a batch is available, returns `Ok(None)` once all units are decoded
    /// (or after a stop/reset), and re-raises the first captured worker error — after
    /// which the pipeline stays stopped until [`DwarfReader::reset`].
    ///
    /// # Errors
    /// Container errors from lazy initialization, or the first captured decode error.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        self.initialize()?;

        let Some(shared) = self.shared.as_ref().map(Arc::clone) else {
            return Ok(None);
        };

        let mut state = lock!(shared.state)?;
        loop {
            if let Some(error) = state.error.take() {
                state.stopped = true;
                drop(state);
                shared.wake_up_workers.notify_all();
                shared.deliver_batch.notify_all();
                return Err(error);
            }

            if state.stopped {
                return Ok(None);
            }

            if let Some(batch) = state.delivery_queue.pop_front() {
                // Exactly one producer gets unblocked per consumed batch.
                shared.wake_up_workers.notify_one();
                return Ok(Some(batch));
            }

            if state.units_queue.is_empty() && state.units_in_progress == 0 {
                state.stopped = true;
                drop(state);
                shared.wake_up_workers.notify_all();
                return Ok(None);
            }

            state = shared
                .deliver_batch
                .wait(state)
                .map_err(|_| Error::LockError)?;
        }
    }

    /// Stop the workers and return the pipeline to its pre-initialization state.
    ///
    /// Queued and delivered work is discarded, the captured error and stop flag are
    /// cleared, and the byte source is released. The next [`DwarfReader::next_batch`]
    /// call re-initializes from scratch over the same input.
    pub fn reset(&mut self) {
        self.stop_workers();
        self.shared = None;
    }

    /// Idempotent lazy initialization: open the container, locate sections, scan units,
    /// start the worker pool.
    fn initialize(&mut self) -> Result<()> {
        if self.shared.is_some() {
            return Ok(());
        }

        tracing::debug!("opening ELF container");
        let file = match &self.source {
            ByteSource::File { path, mappable } => {
                if *mappable {
                    File::from_file(path)?
                } else {
                    File::from_reader(std::fs::File::open(path)?)?
                }
            }
            ByteSource::Memory(data) => File::from_backend(SharedBuffer(Arc::clone(data)))?,
        };

        let info_range = file
            .section_range("debug_info")
            .ok_or(Error::MissingSection(".debug_info"))?;
        let abbrev_range = file
            .section_range("debug_abbrev")
            .ok_or(Error::MissingSection(".debug_abbrev"))?;
        let ranges = SectionRanges {
            info: info_range,
            line: file.section_range("debug_line"),
            strtab: file.section_range("debug_str"),
            line_strtab: file.section_range("debug_line_str"),
            str_offsets: file.section_range("debug_str_offsets"),
            addr: file.section_range("debug_addr"),
        };

        tracing::debug!(
            info_bytes = info_range.1,
            abbrev_bytes = abbrev_range.1,
            "located debug sections"
        );

        let info = file.data_slice(info_range.0, info_range.1)?;
        let abbrev = file.data_slice(abbrev_range.0, abbrev_range.1)?;
        for range in [
            ranges.line,
            ranges.strtab,
            ranges.line_strtab,
            ranges.str_offsets,
            ranges.addr,
        ]
        .into_iter()
        .flatten()
        {
            file.data_slice(range.0, range.1)?;
        }

        // Abbreviation tables are shared between units pointing at the same offset and
        // parsed here, single-threaded, so workers only ever read them.
        let headers = scan_units(info)?;
        let mut abbrev_tables: HashMap<u64, Arc<AbbrevTable>> = HashMap::new();
        let mut units = VecDeque::with_capacity(headers.len());
        for header in headers {
            let table = match abbrev_tables.get(&header.abbrev_offset) {
                Some(table) => Arc::clone(table),
                None => {
                    let offset = usize::try_from(header.abbrev_offset).map_err(|_| {
                        malformed_error!(
                            "Abbreviation offset {} does not fit in memory",
                            header.abbrev_offset
                        )
                    })?;
                    let table = Arc::new(AbbrevTable::parse(abbrev, offset)?);
                    abbrev_tables.insert(header.abbrev_offset, Arc::clone(&table));
                    table
                }
            };
            let cursor = UnitCursor::open(header, table, info)?;
            // A header-only unit has nothing to decode.
            if !cursor.is_exhausted() {
                units.push_back(cursor);
            }
        }

        let num_threads = self.options.num_threads.max(1);
        tracing::debug!(
            units = units.len(),
            threads = num_threads,
            "starting decode workers"
        );

        let requested = self.options.columns;
        let shared = Arc::new(PipelineShared {
            file,
            ranges,
            dicts: SharedDicts::build(),
            requested,
            need: requested.normalized(),
            num_threads,
            state: Mutex::new(PoolState {
                units_queue: units,
                ..PoolState::default()
            }),
            wake_up_workers: Condvar::new(),
            deliver_batch: Condvar::new(),
            line_warnings: WarningCounter::new(LINE_WARNING_CAP),
        });

        for i in 0..num_threads {
            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("dwarf-decode-{i}"))
                .spawn(move || worker_loop(&worker_shared))?;
            self.workers.push(handle);
        }

        self.shared = Some(shared);
        Ok(())
    }

    /// Raise the stop flag, wake everything, and join the workers.
    fn stop_workers(&mut self) {
        if let Some(shared) = &self.shared {
            if let Ok(mut state) = shared.state.lock() {
                state.stopped = true;
            }
            shared.wake_up_workers.notify_all();
            shared.deliver_batch.notify_all();
        }

        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for DwarfReader {
    fn drop(&mut self) {
        self.stop_workers();
    }
}
