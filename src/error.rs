use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while opening an ELF
/// container and decoding its DWARF debug information into columnar batches. Each variant
/// provides specific context about the failure mode to enable appropriate error handling.
///
/// # Error Categories
///
/// ## Container Errors
/// - [`Error::MissingSection`] - A mandatory debug section is absent from the ELF file
/// - [`Error::GoblinErr`] - ELF parsing errors from the goblin crate
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Decode Errors
/// - [`Error::Malformed`] - Corrupted or invalid DWARF encoding
/// - [`Error::OutOfBounds`] - Attempted to read beyond a section boundary
/// - [`Error::NotSupported`] - Unsupported format version or feature
///
/// Container errors are raised once, during pipeline initialization, and are not retried.
/// Decode errors are fatal for the whole run: the first one observed by any worker thread
/// is captured and re-raised to the consumer on its next pull, after which the pipeline
/// stays stopped until it is reset.
///
/// # Examples
///
/// ```rust,no_run
/// use dwarfscope::{DwarfReader, Error, ReaderOptions};
/// use std::path::Path;
///
/// match DwarfReader::from_file(Path::new("binary.elf"), ReaderOptions::default()) {
///     Ok(reader) => {
///         println!("Reader created");
///     }
///     Err(Error::FileError(io_err)) => {
///         eprintln!("I/O error: {}", io_err);
///     }
///     Err(e) => {
///         eprintln!("Other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The debug information is damaged and could not be decoded.
    ///
    /// This error indicates that a DWARF structure does not conform to the expected
    /// encoding: an unresolvable abbreviation code, a terminator entry with no open
    /// ancestor, a unit whose tree runs past its declared end, or an attribute value
    /// that cannot be extracted. The error includes the source location where the
    /// malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading section data.
    ///
    /// This error occurs when trying to read data beyond the end of a section or
    /// buffer. It's a safety check to prevent buffer overruns during decoding.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// A mandatory debug section is missing from the container.
    ///
    /// The decode pipeline requires both `.debug_info` and `.debug_abbrev` to be
    /// present. A file without them cannot be processed.
    #[error("Missing mandatory section - {0}")]
    MissingSection(&'static str),

    /// This format version or feature is not supported.
    ///
    /// Raised for DWARF unit versions outside the range handled by this library.
    #[error("This format version or feature is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading from disk, permission issues, or filesystem errors.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    ///
    /// Used for errors that don't fit into other categories or for
    /// wrapping external library errors with additional context.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during ELF parsing.
    ///
    /// The goblin crate is used for low-level ELF container parsing.
    /// This error wraps any failures from that parsing layer.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// Failed to lock target.
    ///
    /// This error occurs when thread synchronization fails, typically
    /// when trying to acquire a mutex that was poisoned by a panicking thread.
    #[error("Failed to lock target")]
    LockError,
}
