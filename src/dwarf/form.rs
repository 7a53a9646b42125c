//! Attribute form decoding.
//!
//! Every attribute value in `.debug_info` is encoded according to its declared form.
//! [`extract_value`] decodes one value and classifies it into one of five shapes the
//! columnar model cares about: a 64-bit integer, an address, a byte block, a text string,
//! or a cross-reference offset. Indirection is resolved here: `strx*` forms go through
//! `.debug_str_offsets` into `.debug_str`, `addrx*` forms through `.debug_addr`, and
//! `DW_FORM_indirect` reads its real form from the data stream (classification then uses
//! the resolved form, not the declared one).
//!
//! Unit-relative reference forms are normalized to `.debug_info`-section-relative offsets
//! before they are handed to the columns. References into supplementary/alternate files
//! and type-signature references are not resolved; they yield 0 after skipping their
//! encoded bytes.

use std::borrow::Cow;

use crate::{file::parser::Parser, Result};

use super::constants::*;

/// Per-unit parameters needed to decode attribute values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormParams {
    /// Unit format version
    pub(crate) version: u16,
    /// Address width in bytes
    pub(crate) address_size: u8,
    /// `true` for the 64-bit format (8-byte offsets)
    pub(crate) is_dwarf64: bool,
    /// Section-relative offset of the unit, added to unit-relative references
    pub(crate) unit_offset: u64,
    /// Base offset of this unit's slice of `.debug_str_offsets`
    pub(crate) str_offsets_base: u64,
    /// Base offset of this unit's slice of `.debug_addr`
    pub(crate) addr_base: u64,
}

/// Borrowed views of the debug sections the decoder reads from.
///
/// `info` is mandatory; the rest are optional indirection targets.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DebugSections<'a> {
    pub(crate) info: &'a [u8],
    pub(crate) line: Option<&'a [u8]>,
    pub(crate) strtab: Option<&'a [u8]>,
    pub(crate) line_strtab: Option<&'a [u8]>,
    pub(crate) str_offsets: Option<&'a [u8]>,
    pub(crate) addr: Option<&'a [u8]>,
}

/// One decoded attribute value, classified by shape.
#[derive(Debug)]
pub(crate) enum FormValue<'a> {
    /// Fixed-width or variable-width integer data
    Int(u64),
    /// A machine address, possibly resolved through `.debug_addr`
    Addr(u64),
    /// A raw byte block (including DWARF expressions)
    Block(&'a [u8]),
    /// A text string, possibly resolved through a string table
    Str(Cow<'a, str>),
    /// A `.debug_info`-section-relative entry offset
    Ref(u64),
}

/// Read the NUL-terminated string at `offset` within a string table section.
fn cstr_at(data: &[u8], offset: u64) -> Option<&[u8]> {
    let start = usize::try_from(offset).ok()?;
    if start >= data.len() {
        return None;
    }
    let nul = data[start..].iter().position(|&b| b == 0)?;
    Some(&data[start..start + nul])
}

/// Resolve a string-table index through `.debug_str_offsets` into `.debug_str`.
///
/// Any failure (missing section, index past the populated entries, dangling offset)
/// yields the empty string rather than an error.
fn resolve_strx<'a>(index: u64, params: &FormParams, sections: &DebugSections<'a>) -> Cow<'a, str> {
    let entry_size: u64 = if params.is_dwarf64 { 8 } else { 4 };

    let resolved = sections.str_offsets.and_then(|offsets| {
        let entry = params.str_offsets_base.checked_add(index.checked_mul(entry_size)?)?;
        let start = usize::try_from(entry).ok()?;
        let end = start.checked_add(entry_size as usize)?;
        if end > offsets.len() {
            return None;
        }

        let str_offset = if params.is_dwarf64 {
            u64::from_le_bytes(offsets[start..end].try_into().ok()?)
        } else {
            u64::from(u32::from_le_bytes(offsets[start..end].try_into().ok()?))
        };

        cstr_at(sections.strtab?, str_offset)
    });

    match resolved {
        Some(bytes) => String::from_utf8_lossy(bytes),
        None => Cow::Borrowed(""),
    }
}

/// Resolve an address-table index through `.debug_addr`. Failures yield 0.
fn resolve_addrx(index: u64, params: &FormParams, sections: &DebugSections) -> u64 {
    let entry_size = u64::from(params.address_size);

    sections
        .addr
        .and_then(|addr| {
            let entry = params.addr_base.checked_add(index.checked_mul(entry_size)?)?;
            let start = usize::try_from(entry).ok()?;
            let end = start.checked_add(entry_size as usize)?;
            if end > addr.len() {
                return None;
            }

            let mut value = 0u64;
            for (i, byte) in addr[start..end].iter().enumerate() {
                value |= u64::from(*byte) << (8 * i);
            }
            Some(value)
        })
        .unwrap_or(0)
}

/// Decode one attribute value at the parser's position and classify it.
///
/// # Arguments
/// * `parser` - Positioned at the value's first byte within `.debug_info`
/// * `form` - The declared form code
/// * `implicit_const` - The declaration-carried value for `DW_FORM_implicit_const`
/// * `params` - The owning unit's decode parameters
/// * `sections` - Indirection targets
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an unknown form or a string-table offset that
/// does not resolve, [`crate::Error::OutOfBounds`] for truncated data. Both are fatal for
/// the run.
pub(crate) fn extract_value<'a>(
    parser: &mut Parser<'a>,
    form: u16,
    implicit_const: i64,
    params: &FormParams,
    sections: &DebugSections<'a>,
) -> Result<FormValue<'a>> {
    let mut form = form;

    // DW_FORM_indirect stores the real form in the data stream. Classification below
    // uses the resolved form.
    while form == DW_FORM_INDIRECT {
        let resolved = parser.read_uleb128()?;
        if resolved > u64::from(u16::MAX) || resolved as u16 == DW_FORM_INDIRECT {
            return Err(malformed_error!(
                "Invalid indirect form {:#x} at offset {}",
                resolved,
                parser.pos()
            ));
        }
        form = resolved as u16;
    }

    let value = match form {
        // A 64-bit value.
        DW_FORM_DATA1 => FormValue::Int(parser.read_uint_sized(1)?),
        DW_FORM_DATA2 => FormValue::Int(parser.read_uint_sized(2)?),
        DW_FORM_DATA4 => FormValue::Int(parser.read_uint_sized(4)?),
        DW_FORM_DATA8 => FormValue::Int(parser.read_uint_sized(8)?),
        #[allow(clippy::cast_sign_loss)]
        DW_FORM_SDATA => FormValue::Int(parser.read_sleb128()? as u64),
        DW_FORM_UDATA | DW_FORM_LOCLISTX | DW_FORM_RNGLISTX => {
            FormValue::Int(parser.read_uleb128()?)
        }
        DW_FORM_FLAG => FormValue::Int(u64::from(parser.read_le::<u8>()?)),
        DW_FORM_FLAG_PRESENT => FormValue::Int(1),
        DW_FORM_SEC_OFFSET => FormValue::Int(parser.read_offset(params.is_dwarf64)?),
        #[allow(clippy::cast_sign_loss)]
        DW_FORM_IMPLICIT_CONST => FormValue::Int(implicit_const as u64),
        // No 64-bit projection of a 16-byte constant; the bytes are skipped.
        DW_FORM_DATA16 => {
            parser.read_bytes(16)?;
            FormValue::Int(0)
        }

        // An address, possibly indirected through .debug_addr.
        DW_FORM_ADDR => FormValue::Addr(parser.read_uint_sized(params.address_size as usize)?),
        DW_FORM_ADDRX | DW_FORM_GNU_ADDR_INDEX => {
            let index = parser.read_uleb128()?;
            FormValue::Addr(resolve_addrx(index, params, sections))
        }
        DW_FORM_ADDRX1 | DW_FORM_ADDRX2 | DW_FORM_ADDRX3 | DW_FORM_ADDRX4 => {
            let size = (form - DW_FORM_ADDRX1 + 1) as usize;
            let index = parser.read_uint_sized(size)?;
            FormValue::Addr(resolve_addrx(index, params, sections))
        }

        // A byte string.
        DW_FORM_BLOCK1 => {
            let len = parser.read_uint_sized(1)?;
            FormValue::Block(parser.read_bytes(len as usize)?)
        }
        DW_FORM_BLOCK2 => {
            let len = parser.read_uint_sized(2)?;
            FormValue::Block(parser.read_bytes(len as usize)?)
        }
        DW_FORM_BLOCK4 => {
            let len = parser.read_uint_sized(4)?;
            FormValue::Block(parser.read_bytes(len as usize)?)
        }
        DW_FORM_BLOCK | DW_FORM_EXPRLOC => {
            let len = parser.read_uleb128()?;
            FormValue::Block(parser.read_bytes(len as usize)?)
        }

        // A text string, possibly indirected through .debug_str or .debug_line_str.
        DW_FORM_STRING => FormValue::Str(String::from_utf8_lossy(parser.read_cstr()?)),
        DW_FORM_STRP => {
            let offset = parser.read_offset(params.is_dwarf64)?;
            let Some(bytes) = sections.strtab.and_then(|s| cstr_at(s, offset)) else {
                return Err(malformed_error!(
                    "Error parsing string attribute: .debug_str offset {} does not resolve",
                    offset
                ));
            };
            FormValue::Str(String::from_utf8_lossy(bytes))
        }
        DW_FORM_LINE_STRP => {
            let offset = parser.read_offset(params.is_dwarf64)?;
            let Some(bytes) = sections.line_strtab.and_then(|s| cstr_at(s, offset)) else {
                return Err(malformed_error!(
                    "Error parsing string attribute: .debug_line_str offset {} does not resolve",
                    offset
                ));
            };
            FormValue::Str(String::from_utf8_lossy(bytes))
        }
        DW_FORM_STRX | DW_FORM_GNU_STR_INDEX => {
            let index = parser.read_uleb128()?;
            FormValue::Str(resolve_strx(index, params, sections))
        }
        DW_FORM_STRX1 | DW_FORM_STRX2 | DW_FORM_STRX3 | DW_FORM_STRX4 => {
            let size = (form - DW_FORM_STRX1 + 1) as usize;
            let index = parser.read_uint_sized(size)?;
            FormValue::Str(resolve_strx(index, params, sections))
        }
        // Strings in supplementary/alternate files are not resolved.
        DW_FORM_STRP_SUP | DW_FORM_GNU_STRP_ALT => {
            parser.read_offset(params.is_dwarf64)?;
            FormValue::Str(Cow::Borrowed(""))
        }

        // Offset of another entry in .debug_info. Unit-relative references are
        // normalized to be relative to the section start.
        DW_FORM_REF1 | DW_FORM_REF2 | DW_FORM_REF4 | DW_FORM_REF8 => {
            let size = match form {
                DW_FORM_REF1 => 1,
                DW_FORM_REF2 => 2,
                DW_FORM_REF4 => 4,
                _ => 8,
            };
            let value = parser.read_uint_sized(size)?;
            FormValue::Ref(params.unit_offset.wrapping_add(value))
        }
        DW_FORM_REF_UDATA => {
            let value = parser.read_uleb128()?;
            FormValue::Ref(params.unit_offset.wrapping_add(value))
        }
        DW_FORM_REF_ADDR => FormValue::Ref(parser.read_offset(params.is_dwarf64)?),
        // References into supplementary/alternate files and type signatures are not
        // resolved; they store 0.
        DW_FORM_REF_SUP4 => {
            parser.read_uint_sized(4)?;
            FormValue::Ref(0)
        }
        DW_FORM_REF_SUP8 | DW_FORM_REF_SIG8 => {
            parser.read_uint_sized(8)?;
            FormValue::Ref(0)
        }
        DW_FORM_GNU_REF_ALT => {
            parser.read_offset(params.is_dwarf64)?;
            FormValue::Ref(0)
        }

        _ => {
            return Err(malformed_error!(
                "Failed to parse attribute of form {:#x} at offset {}",
                form,
                parser.pos()
            ));
        }
    };

    Ok(value)
}

/// Advance the parser past one attribute value without touching other sections.
///
/// Returns the raw integer for integer-shaped forms (the shapes base attributes use),
/// `None` for everything else. Used by the unit cursor's eager root scan.
///
/// # Errors
/// Same failure modes as [`extract_value`], minus string-table resolution.
pub(crate) fn skip_value(
    parser: &mut Parser<'_>,
    form: u16,
    implicit_const: i64,
    params: &FormParams,
) -> Result<Option<u64>> {
    let mut form = form;

    while form == DW_FORM_INDIRECT {
        let resolved = parser.read_uleb128()?;
        if resolved > u64::from(u16::MAX) || resolved as u16 == DW_FORM_INDIRECT {
            return Err(malformed_error!(
                "Invalid indirect form {:#x} at offset {}",
                resolved,
                parser.pos()
            ));
        }
        form = resolved as u16;
    }

    let offset_size = if params.is_dwarf64 { 8 } else { 4 };

    let value = match form {
        DW_FORM_DATA1 => Some(parser.read_uint_sized(1)?),
        DW_FORM_DATA2 => Some(parser.read_uint_sized(2)?),
        DW_FORM_DATA4 => Some(parser.read_uint_sized(4)?),
        DW_FORM_DATA8 => Some(parser.read_uint_sized(8)?),
        #[allow(clippy::cast_sign_loss)]
        DW_FORM_SDATA => Some(parser.read_sleb128()? as u64),
        DW_FORM_UDATA | DW_FORM_LOCLISTX | DW_FORM_RNGLISTX => Some(parser.read_uleb128()?),
        DW_FORM_FLAG => Some(u64::from(parser.read_le::<u8>()?)),
        DW_FORM_FLAG_PRESENT => Some(1),
        DW_FORM_SEC_OFFSET => Some(parser.read_offset(params.is_dwarf64)?),
        #[allow(clippy::cast_sign_loss)]
        DW_FORM_IMPLICIT_CONST => Some(implicit_const as u64),
        DW_FORM_DATA16 => {
            parser.read_bytes(16)?;
            None
        }

        DW_FORM_ADDR => {
            parser.advance_by(params.address_size as usize)?;
            None
        }
        DW_FORM_ADDRX | DW_FORM_GNU_ADDR_INDEX | DW_FORM_STRX | DW_FORM_GNU_STR_INDEX
        | DW_FORM_REF_UDATA => {
            parser.read_uleb128()?;
            None
        }
        DW_FORM_ADDRX1 | DW_FORM_STRX1 | DW_FORM_REF1 => {
            parser.advance_by(1)?;
            None
        }
        DW_FORM_ADDRX2 | DW_FORM_STRX2 | DW_FORM_REF2 => {
            parser.advance_by(2)?;
            None
        }
        DW_FORM_ADDRX3 | DW_FORM_STRX3 => {
            parser.advance_by(3)?;
            None
        }
        DW_FORM_ADDRX4 | DW_FORM_STRX4 | DW_FORM_REF4 | DW_FORM_REF_SUP4 => {
            parser.advance_by(4)?;
            None
        }
        DW_FORM_REF8 | DW_FORM_REF_SUP8 | DW_FORM_REF_SIG8 => {
            parser.advance_by(8)?;
            None
        }
        DW_FORM_REF_ADDR | DW_FORM_STRP | DW_FORM_LINE_STRP | DW_FORM_STRP_SUP
        | DW_FORM_GNU_STRP_ALT | DW_FORM_GNU_REF_ALT => {
            parser.advance_by(offset_size)?;
            None
        }

        DW_FORM_BLOCK1 => {
            let len = parser.read_uint_sized(1)?;
            parser.advance_by(len as usize)?;
            None
        }
        DW_FORM_BLOCK2 => {
            let len = parser.read_uint_sized(2)?;
            parser.advance_by(len as usize)?;
            None
        }
        DW_FORM_BLOCK4 => {
            let len = parser.read_uint_sized(4)?;
            parser.advance_by(len as usize)?;
            None
        }
        DW_FORM_BLOCK | DW_FORM_EXPRLOC => {
            let len = parser.read_uleb128()?;
            parser.advance_by(len as usize)?;
            None
        }

        DW_FORM_STRING => {
            parser.read_cstr()?;
            None
        }

        _ => {
            return Err(malformed_error!(
                "Failed to parse attribute of form {:#x} at offset {}",
                form,
                parser.pos()
            ));
        }
    };

    Ok(value)
}
