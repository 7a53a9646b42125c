//! Low-level byte order and safe reading utilities for DWARF section decoding.
//!
//! This module provides bounds-checked, little-endian binary reading for the fixed-width
//! primitives that appear in ELF debug sections. All DWARF data handled by this library is
//! little-endian; there is no write side because encoding debug information is out of scope.
//!
//! # Key Components
//!
//! - [`crate::file::io::RawIO`] - Trait defining endian-aware reading for primitive types
//! - [`crate::file::io::read_le`] - Read a value from the start of a buffer
//! - [`crate::file::io::read_le_at`] - Read a value at a specific offset with auto-advance
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use dwarfscope::file::io::read_le_at;
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;  // offset: 0 -> 2
//! let second: u16 = read_le_at(&data, &mut offset)?; // offset: 2 -> 4
//! let third: u32 = read_le_at(&data, &mut offset)?;  // offset: 4 -> 8
//!
//! assert_eq!((first, second, third), (1, 2, 3));
//! # Ok::<(), dwarfscope::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All reading functions return [`crate::Result<T>`] and will return
//! [`crate::Error::OutOfBounds`] if there are insufficient bytes in the buffer to complete
//! the operation.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading operations.
///
/// This trait provides a unified interface for reading primitive types from byte slices
/// in a safe, little-endian-aware manner. Each implementation defines a `Bytes` associated
/// type representing the fixed-size byte array required for that particular type
/// (e.g., `[u8; 4]` for `u32`).
///
/// The trait is implemented for the unsigned and signed integer widths used by the
/// DWARF fixed-width forms and by the ELF/line-table headers.
pub trait RawIO: Sized {
    /// The fixed-size byte array type for this value type.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Convert a byte array to this type using little-endian byte order.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// The size of this type in bytes.
    fn size() -> usize {
        std::mem::size_of::<Self>()
    }
}

macro_rules! impl_raw_io {
    ($($t:ty),*) => {
        $(
            impl RawIO for $t {
                type Bytes = [u8; std::mem::size_of::<$t>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$t>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_raw_io!(u8, u16, u32, u64, i8, i16, i32, i64);

/// Read a value of type `T` from the start of the buffer in little-endian format.
///
/// # Arguments
/// * `data` - The byte slice to read from
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the buffer is smaller than `T`.
pub fn read_le<T: RawIO>(data: &[u8]) -> Result<T> {
    let mut offset = 0;
    read_le_at(data, &mut offset)
}

/// Read a value of type `T` at the given offset in little-endian format, advancing the offset.
///
/// # Arguments
/// * `data` - The byte slice to read from
/// * `offset` - Position to read at; advanced by `T`'s size on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if reading `T` at `offset` would exceed the
/// buffer length.
pub fn read_le_at<T: RawIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let size = T::size();
    let Some(end) = offset.checked_add(size) else {
        return Err(OutOfBounds);
    };

    if end > data.len() {
        return Err(OutOfBounds);
    }

    let mut bytes = T::Bytes::default();
    bytes.as_mut().copy_from_slice(&data[*offset..end]);
    *offset = end;

    Ok(T::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

        assert_eq!(read_le::<u8>(&data).unwrap(), 0x01);
        assert_eq!(read_le::<u16>(&data).unwrap(), 0x0201);
        assert_eq!(read_le::<u32>(&data).unwrap(), 0x0403_0201);
        assert_eq!(read_le::<u64>(&data).unwrap(), 0x0807_0605_0403_0201);
    }

    #[test]
    fn read_le_at_advances() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let mut offset = 0;

        let first: u16 = read_le_at(&data, &mut offset).unwrap();
        let second: u16 = read_le_at(&data, &mut offset).unwrap();
        let third: u32 = read_le_at(&data, &mut offset).unwrap();

        assert_eq!((first, second, third), (1, 2, 3));
        assert_eq!(offset, 8);
    }

    #[test]
    fn read_le_at_out_of_bounds() {
        let data = [0x01, 0x02];
        let mut offset = 1;

        assert!(matches!(
            read_le_at::<u32>(&data, &mut offset),
            Err(OutOfBounds)
        ));
        // Offset must be untouched after a failed read.
        assert_eq!(offset, 1);

        let mut overflow = usize::MAX;
        assert!(matches!(
            read_le_at::<u64>(&data, &mut overflow),
            Err(OutOfBounds)
        ));
    }

    #[test]
    fn read_le_signed() {
        let data = [0xFF, 0xFF];
        assert_eq!(read_le::<i16>(&data).unwrap(), -1);
        assert_eq!(read_le::<i8>(&data).unwrap(), -1);
    }
}
