//! Physical file backend for memory-mapped I/O.
//!
//! This module provides the [`crate::file::physical::Physical`] backend that implements the
//! [`crate::file::Backend`] trait for accessing containers from disk using memory-mapped
//! I/O. Debug sections routinely dominate a binary's size (often more than half of a debug
//! build), so mapping the file avoids buffering hundreds of megabytes upfront while still
//! allowing fast random access to any section.
//!
//! The mapping is created read-only and shared. All access operations include bounds
//! checking to ensure memory safety.

use super::Backend;
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A file backend that uses memory-mapped I/O for efficient access to containers on disk.
///
/// [`crate::file::physical::Physical`] maps the file directly into the process's virtual
/// address space, letting the operating system page debug sections in on demand. This is
/// the preferred backend whenever the input is a regular local file; non-mappable sources
/// fall back to [`crate::file::memory::Memory`].
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Create a new physical file backend by memory-mapping the specified file.
    ///
    /// # Arguments
    /// * `path` - Path to the container on disk
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        Self::from_std_file(file)
    }

    /// Creates a new physical file backend from an opened [`std::fs::File`].
    ///
    /// # Arguments
    /// * `file` - An opened file handle
    ///
    /// # Errors
    /// Returns [`crate::Error::Error`] if memory mapping fails.
    #[allow(clippy::needless_pass_by_value)]
    pub fn from_std_file(file: fs::File) -> Result<Physical> {
        // The file handle must remain alive for the duration of the mmap; Mmap keeps it
        // alive internally, so taking `file` by value matches std library conventions.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|error| Error(error.to_string()))?;

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(crate::Error::OutOfBounds);
        };

        if offset_end > self.data.len() {
            return Err(crate::Error::OutOfBounds);
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
