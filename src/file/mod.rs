//! ELF container access for debug-info decoding.
//!
//! This module provides the byte-source layer of the pipeline: opening an ELF binary from
//! disk or memory, and exposing its named sections as bounds-checked byte ranges. The rest
//! of the library never touches the container format directly — it asks this layer for
//! sections like `debug_info` or `debug_str` and decodes their contents.
//!
//! # Architecture
//!
//! Two layers cooperate here:
//!
//! - [`crate::file::Backend`] - Trait abstracting the raw byte storage. Implemented by
//!   [`crate::file::physical::Physical`] (memory-mapped local file) and
//!   [`crate::file::memory::Memory`] (fully buffered source).
//! - [`crate::file::File`] - The parsed container: owns a backend plus the ELF section
//!   table parsed from it, and resolves section names to byte ranges.
//!
//! A local regular file is memory-mapped; any other source (readers, in-memory buffers)
//! is buffered whole. Debug sections typically dominate the binary anyway, so buffering
//! the full file costs little compared to loading just the `.debug_*` ranges.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use dwarfscope::file::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("binary.elf"))?;
//! if let Some(info) = file.section_data("debug_info")? {
//!     println!(".debug_info is {} bytes", info.len());
//! }
//! # Ok::<(), dwarfscope::Error>(())
//! ```

pub mod io;
pub mod memory;
pub mod parser;
pub mod physical;

use std::io::Read;
use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr},
    Result,
};
use goblin::elf::{section_header::SHT_NOBITS, Elf};
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Backend trait for container data sources.
///
/// This trait abstracts over the source of ELF data, allowing for both in-memory and
/// on-disk representations. All implementations must be thread-safe: the decode workers
/// read section data concurrently through a shared reference.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

#[self_referencing]
/// Represents a loaded ELF container with debug sections.
///
/// This struct wraps the parsed ELF section table and provides name-based access to
/// section byte ranges. It supports loading from files (memory-mapped), memory buffers,
/// and arbitrary readers (buffered).
///
/// Section names are matched with the leading dot stripped, so `"debug_info"` finds
/// `.debug_info`. This keeps call sites free of container-specific spelling.
///
/// # Examples
///
/// ```rust,no_run
/// use dwarfscope::file::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("binary.elf"))?;
/// let abbrev = file.section_data("debug_abbrev")?;
/// assert!(abbrev.is_some());
/// # Ok::<(), dwarfscope::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed ELF structure, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    elf: Elf<'this>,
}

impl File {
    /// Loads an ELF container from the given path using memory-mapped I/O.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the ELF binary on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is empty, or is not valid ELF.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads an ELF container from a memory buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the ELF binary.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty or not valid ELF.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    /// Loads an ELF container by buffering an arbitrary reader into memory.
    ///
    /// This is the fallback for sources that cannot be memory-mapped (pipes, archives,
    /// remote streams). The entire source is read upfront.
    ///
    /// # Arguments
    ///
    /// * `reader` - Any [`std::io::Read`] yielding the container bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails, the source is empty, or it is not valid ELF.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<File> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        Self::from_mem(data)
    }

    /// Loads an ELF container from a caller-provided backend.
    ///
    /// Used by the pipeline driver to reopen a shared memory buffer across resets
    /// without copying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or not parseable as ELF.
    pub(crate) fn from_backend<T: Backend + 'static>(backend: T) -> Result<File> {
        Self::load(backend)
    }

    /// Internal loader for any backend.
    ///
    /// # Arguments
    ///
    /// * `data` - The backend providing the ELF data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty or not parseable as ELF.
    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let data = data.as_ref();
            match Elf::parse(data.data()) {
                Ok(elf) => Ok(elf),
                Err(error) => Err(GoblinErr(error)),
            }
        })
    }

    /// Returns the total size of the loaded container in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.borrow_data().len()
    }

    /// Returns `true` if the container has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a bounds-checked slice of the raw container data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range exceeds the data.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.borrow_data().data_slice(offset, len)
    }

    /// Resolves a section by name to its `(offset, size)` byte range within the container.
    ///
    /// The leading dot of the stored section name is ignored, so both `"debug_info"` and
    /// `".debug_info"` match. Sections without file contents (`SHT_NOBITS`) are skipped.
    ///
    /// Returns `None` if no section with that name exists.
    #[must_use]
    pub fn section_range(&self, name: &str) -> Option<(usize, usize)> {
        let wanted = name.strip_prefix('.').unwrap_or(name);

        self.with_elf(|elf| {
            for header in &elf.section_headers {
                if header.sh_type == SHT_NOBITS {
                    continue;
                }

                let Some(section_name) = elf.shdr_strtab.get_at(header.sh_name) else {
                    continue;
                };

                if section_name.strip_prefix('.').unwrap_or(section_name) == wanted {
                    #[allow(clippy::cast_possible_truncation)]
                    return Some((header.sh_offset as usize, header.sh_size as usize));
                }
            }
            None
        })
    }

    /// Returns the contents of a section by name, or `None` if the section is absent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the section header describes a range
    /// outside the container (truncated or malformed file).
    pub fn section_data(&self, name: &str) -> Result<Option<&[u8]>> {
        match self.section_range(name) {
            Some((offset, size)) => Ok(Some(self.data_slice(offset, size)?)),
            None => Ok(None),
        }
    }
}
