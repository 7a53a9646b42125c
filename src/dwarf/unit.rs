//! Unit headers and the per-unit decode cursor.
//!
//! `.debug_info` is a sequence of independently decodable units, each introduced by a
//! version-dependent header followed by the entry tree. [`UnitHeader::parse`] handles the
//! DWARF32/DWARF64 formats and versions 2 through 5 (including the v5 unit types that
//! carry extra dwo-id/type-signature fields), and [`scan_units`] walks the section once to
//! build the work list.
//!
//! [`UnitCursor`] is the mutable decode state a worker thread carries for one unit: the
//! current byte offset, the fixed end offset, and an explicit stack of open ancestor
//! frames that replaces recursive descent. Because the stack lives in the cursor, a
//! unit's decode can be suspended after any entry and resumed by a later worker turn.

use std::sync::Arc;

use crate::{columns::StringDict, file::parser::Parser, Result};

use super::{
    abbrev::AbbrevTable,
    constants::{DW_AT_ADDR_BASE, DW_AT_GNU_ADDR_BASE, DW_AT_STR_OFFSETS_BASE},
    form::{skip_value, FormParams},
};

/// DWARF v5 unit-type codes that carry extra header fields.
const DW_UT_TYPE: u8 = 0x02;
const DW_UT_SKELETON: u8 = 0x04;
const DW_UT_SPLIT_COMPILE: u8 = 0x05;
const DW_UT_SPLIT_TYPE: u8 = 0x06;

/// Parsed header of one `.debug_info` unit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnitHeader {
    /// Section-relative offset of the unit's first byte
    pub(crate) offset: u64,
    /// Section-relative offset one past the unit's last byte
    pub(crate) end_offset: u64,
    /// Bytes from the unit start to the first entry
    pub(crate) header_size: u64,
    /// Unit format version (2..=5)
    pub(crate) version: u16,
    /// Size in bytes of addresses in this unit
    pub(crate) address_size: u8,
    /// Offset of the unit's abbreviation table within `.debug_abbrev`
    pub(crate) abbrev_offset: u64,
    /// `true` for the 64-bit format
    pub(crate) is_dwarf64: bool,
}

impl UnitHeader {
    /// Parse a unit header at `offset` within `.debug_info`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for versions outside 2..=5 and
    /// [`crate::Error::Malformed`] for truncated or inconsistent headers.
    pub(crate) fn parse(info: &[u8], offset: usize) -> Result<UnitHeader> {
        let mut parser = Parser::new(info);
        parser.seek(offset)?;

        let (unit_length, is_dwarf64) = parser.read_initial_length()?;
        let Some(end_offset) = (parser.pos() as u64).checked_add(unit_length) else {
            return Err(malformed_error!("Unit length overflow at offset {}", offset));
        };
        if end_offset > info.len() as u64 {
            return Err(malformed_error!(
                "Unit at offset {} claims {} bytes but .debug_info has {}",
                offset,
                unit_length,
                info.len()
            ));
        }

        let version = parser.read_le::<u16>()?;
        if !(2..=5).contains(&version) {
            return Err(crate::Error::NotSupported);
        }

        let (address_size, abbrev_offset) = if version >= 5 {
            let unit_type = parser.read_le::<u8>()?;
            let address_size = parser.read_le::<u8>()?;
            let abbrev_offset = parser.read_offset(is_dwarf64)?;

            // Extra header fields per unit type.
            match unit_type {
                DW_UT_SKELETON | DW_UT_SPLIT_COMPILE => {
                    parser.read_le::<u64>()?; // dwo_id
                }
                DW_UT_TYPE | DW_UT_SPLIT_TYPE => {
                    parser.read_le::<u64>()?; // type signature
                    parser.read_offset(is_dwarf64)?; // type offset
                }
                _ => {}
            }

            (address_size, abbrev_offset)
        } else {
            let abbrev_offset = parser.read_offset(is_dwarf64)?;
            let address_size = parser.read_le::<u8>()?;
            (address_size, abbrev_offset)
        };

        if !matches!(address_size, 2 | 4 | 8) {
            return Err(malformed_error!(
                "Unsupported address size {} in unit at offset {}",
                address_size,
                offset
            ));
        }

        let header_size = parser.pos() as u64 - offset as u64;
        if offset as u64 + header_size > end_offset {
            return Err(malformed_error!(
                "Unit header at offset {} runs past the unit end",
                offset
            ));
        }

        Ok(UnitHeader {
            offset: offset as u64,
            end_offset,
            header_size,
            version,
            address_size,
            abbrev_offset,
            is_dwarf64,
        })
    }

    /// Form-decoding parameters for this unit, with default indirection-table bases.
    ///
    /// Version 5 tables start with a fixed header, so the first entry sits 8 bytes in
    /// (16 for the 64-bit format) when the unit declares no explicit base attribute.
    /// Earlier versions default to 0.
    pub(crate) fn form_params(&self) -> FormParams {
        let table_header = if self.is_dwarf64 { 16 } else { 8 };
        let (str_offsets_base, addr_base) = if self.version >= 5 {
            (table_header, table_header)
        } else {
            (0, 0)
        };

        FormParams {
            version: self.version,
            address_size: self.address_size,
            is_dwarf64: self.is_dwarf64,
            unit_offset: self.offset,
            str_offsets_base,
            addr_base,
        }
    }
}

/// Walk `.debug_info` once and return every unit header in section order.
///
/// # Errors
/// Propagates header parse failures; a malformed unit list is fatal for the run.
pub(crate) fn scan_units(info: &[u8]) -> Result<Vec<UnitHeader>> {
    let mut units = Vec::new();
    let mut offset = 0usize;

    while offset < info.len() {
        let header = UnitHeader::parse(info, offset)?;
        let end = header.end_offset;
        units.push(header);
        offset = end as usize;
    }

    Ok(units)
}

/// One open ancestor of the entry currently being decoded.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AncestorFrame {
    /// Section-relative offset of the ancestor entry
    pub(crate) offset: u64,
    /// The ancestor's tag code
    pub(crate) tag: u16,
}

/// Mutable decode state for one unit.
///
/// The cursor is owned by at most one worker at a time; between worker turns it rests in
/// the shared unit queue with its offset, ancestor stack and filename table intact, so
/// decoding is resumable mid-tree. A unit is exhausted once the stack is empty and the
/// offset has reached the end offset; an empty stack anywhere else is a corruption error
/// raised by the entry decoder.
#[derive(Debug)]
pub(crate) struct UnitCursor {
    /// The unit's parsed header
    pub(crate) header: UnitHeader,
    /// The unit's abbreviation table
    pub(crate) abbrevs: Arc<AbbrevTable>,
    /// Form parameters with resolved indirection-table bases
    pub(crate) params: FormParams,
    /// Current section-relative decode offset
    pub(crate) offset: u64,
    /// Open ancestor frames, outermost first
    pub(crate) stack: Vec<AncestorFrame>,
    /// Name of the unit's root entry, captured when decoded
    pub(crate) unit_name: String,
    /// Per-unit filename table, built on the first `DW_AT_stmt_list`
    pub(crate) filename_table: Option<Arc<StringDict>>,
    /// Number of addressable entries in the filename table
    pub(crate) filename_table_size: u64,
}

impl UnitCursor {
    /// Open a unit for decoding.
    ///
    /// Performs the eager per-unit work that must not race with other workers: binding
    /// the abbreviation table and scanning the root entry's attributes for the
    /// string-offsets/address table bases that later attribute extraction depends on.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the unit has no usable abbreviation table
    /// or its root entry cannot be read. Failure here is fatal for the whole run.
    pub(crate) fn open(
        header: UnitHeader,
        abbrevs: Arc<AbbrevTable>,
        info: &[u8],
    ) -> Result<UnitCursor> {
        if abbrevs.is_empty() {
            return Err(malformed_error!(
                "Couldn't find abbreviation set for unit at offset {}",
                header.offset
            ));
        }

        let mut params = header.form_params();
        let first_die = header.offset + header.header_size;

        // Root scan: walk the root entry's attribute list once, without touching other
        // sections, to pick up explicit base attributes. The root is re-decoded normally
        // later; this pass only advances a throwaway parser.
        let mut parser = Parser::new(info);
        if first_die < header.end_offset {
            parser.seek(first_die as usize)?;
            let code = parser.read_uleb128()?;
            if code != 0 {
                let Some(decl) = abbrevs.get(code) else {
                    return Err(malformed_error!(
                        "Failed to parse compilation unit entry: abbrev code {} unknown at offset {}",
                        code,
                        first_die
                    ));
                };

                for spec in &decl.attrs {
                    let raw = skip_value(&mut parser, spec.form, spec.implicit_const, &params)?;
                    if let Some(value) = raw {
                        match spec.attr {
                            DW_AT_STR_OFFSETS_BASE => params.str_offsets_base = value,
                            DW_AT_ADDR_BASE | DW_AT_GNU_ADDR_BASE => params.addr_base = value,
                            _ => {}
                        }
                    }
                }
            }
        }

        Ok(UnitCursor {
            offset: first_die,
            header,
            abbrevs,
            params,
            stack: Vec::new(),
            unit_name: String::new(),
            filename_table: None,
            filename_table_size: 0,
        })
    }

    /// `true` once the unit's entry tree has been fully decoded.
    pub(crate) fn is_exhausted(&self) -> bool {
        self.stack.is_empty() && self.offset == self.header.end_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::dwarf::{AbbrevBuilder, UnitBuilder};

    #[test]
    fn parse_v4_header() {
        let info = UnitBuilder::new(4).abbrev_offset(0x20).build();
        let header = UnitHeader::parse(&info, 0).unwrap();

        assert_eq!(header.version, 4);
        assert_eq!(header.address_size, 8);
        assert_eq!(header.abbrev_offset, 0x20);
        assert!(!header.is_dwarf64);
        // initial length (4) + version (2) + abbrev offset (4) + address size (1)
        assert_eq!(header.header_size, 11);
        assert_eq!(header.end_offset, info.len() as u64);
    }

    #[test]
    fn parse_v5_header() {
        let info = UnitBuilder::new(5).build();
        let header = UnitHeader::parse(&info, 0).unwrap();

        assert_eq!(header.version, 5);
        // initial length (4) + version (2) + unit type (1) + address size (1) + abbrev offset (4)
        assert_eq!(header.header_size, 12);
    }

    #[test]
    fn unsupported_version() {
        let info = UnitBuilder::new(6).build();
        assert!(matches!(
            UnitHeader::parse(&info, 0),
            Err(crate::Error::NotSupported)
        ));
    }

    #[test]
    fn length_past_section_end() {
        let mut info = UnitBuilder::new(4).build();
        // Inflate the declared unit length beyond the available bytes.
        info[0] = info[0].wrapping_add(32);
        assert!(UnitHeader::parse(&info, 0).is_err());
    }

    #[test]
    fn scan_multiple_units() {
        let mut info = UnitBuilder::new(4).die(1, &[]).build();
        let second = UnitBuilder::new(5).die(1, &[]).build();
        let second_offset = info.len() as u64;
        info.extend_from_slice(&second);

        let units = scan_units(&info).unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].offset, 0);
        assert_eq!(units[1].offset, second_offset);
        assert_eq!(units[1].end_offset, info.len() as u64);
    }

    #[test]
    fn open_requires_abbreviations() {
        let info = UnitBuilder::new(4).die(1, &[]).build();
        let header = UnitHeader::parse(&info, 0).unwrap();
        let empty = Arc::new(AbbrevTable::default());

        assert!(UnitCursor::open(header, empty, &info).is_err());
    }

    #[test]
    fn open_extracts_bases() {
        // Root carries DW_AT_str_offsets_base (0x72) and DW_AT_addr_base (0x73) as
        // sec_offset values.
        let abbrev = AbbrevBuilder::new()
            .decl(1, 0x11, false, &[(0x72, 0x17), (0x73, 0x17)])
            .build();
        let table = Arc::new(AbbrevTable::parse(&abbrev, 0).unwrap());

        let mut payload = Vec::new();
        payload.extend_from_slice(&0x100u32.to_le_bytes());
        payload.extend_from_slice(&0x200u32.to_le_bytes());
        let info = UnitBuilder::new(5).die(1, &payload).build();

        let header = UnitHeader::parse(&info, 0).unwrap();
        let cursor = UnitCursor::open(header, table, &info).unwrap();

        assert_eq!(cursor.params.str_offsets_base, 0x100);
        assert_eq!(cursor.params.addr_base, 0x200);
        assert_eq!(cursor.offset, header.offset + header.header_size);
        assert!(!cursor.is_exhausted());
    }
}
