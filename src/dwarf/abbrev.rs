//! Abbreviation tables from `.debug_abbrev`.
//!
//! Every unit names an offset into `.debug_abbrev` where its abbreviation table lives:
//! a sequence of declarations, each giving the tag, the has-children flag and the ordered
//! attribute/form list for one abbreviation code. Entries in `.debug_info` reference these
//! declarations by code instead of repeating the layout per entry.
//!
//! Tables are parsed once during pipeline initialization and shared read-only across all
//! units that reference the same offset, so the decode workers never touch this parser.

use std::collections::HashMap;

use crate::{file::parser::Parser, Result};

use super::constants::DW_FORM_IMPLICIT_CONST;

/// One attribute slot of an abbreviation declaration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AttrSpec {
    /// Attribute code (`DW_AT_*`)
    pub(crate) attr: u16,
    /// Declared form code (`DW_FORM_*`)
    pub(crate) form: u16,
    /// Value carried by the declaration itself for `DW_FORM_implicit_const`
    pub(crate) implicit_const: i64,
}

/// One abbreviation declaration: the template for entries carrying its code.
#[derive(Debug, Clone)]
pub(crate) struct AbbrevDecl {
    /// Tag code (`DW_TAG_*`)
    pub(crate) tag: u16,
    /// Whether entries of this code own a following sibling list
    pub(crate) has_children: bool,
    /// Ordered attribute/form slots
    pub(crate) attrs: Vec<AttrSpec>,
}

/// A unit's abbreviation table, addressed by abbreviation code.
#[derive(Debug, Default)]
pub(crate) struct AbbrevTable {
    decls: HashMap<u64, AbbrevDecl>,
}

impl AbbrevTable {
    /// Parse the declaration sequence starting at `offset` within `.debug_abbrev`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the offset lies outside the section, a
    /// tag/attribute/form code exceeds the 16-bit code space, or the encoding is truncated.
    pub(crate) fn parse(data: &[u8], offset: usize) -> Result<AbbrevTable> {
        if offset >= data.len() {
            return Err(malformed_error!(
                "Abbreviation table offset {} is outside .debug_abbrev ({} bytes)",
                offset,
                data.len()
            ));
        }

        let mut parser = Parser::new(data);
        parser.seek(offset)?;

        let mut decls = HashMap::new();
        loop {
            let code = parser.read_uleb128()?;
            if code == 0 {
                break;
            }

            let tag = parser.read_uleb128()?;
            if tag > u64::from(u16::MAX) {
                return Err(malformed_error!(
                    "Tag {:#x} of abbreviation {} is outside the 16-bit code space",
                    tag,
                    code
                ));
            }
            let has_children = parser.read_le::<u8>()? != 0;

            let mut attrs = Vec::new();
            loop {
                let attr = parser.read_uleb128()?;
                let form = parser.read_uleb128()?;
                if attr == 0 && form == 0 {
                    break;
                }
                if attr > u64::from(u16::MAX) || form > u64::from(u16::MAX) {
                    return Err(malformed_error!(
                        "Attribute {:#x} / form {:#x} of abbreviation {} is outside the 16-bit code space",
                        attr,
                        form,
                        code
                    ));
                }

                let implicit_const = if form as u16 == DW_FORM_IMPLICIT_CONST {
                    parser.read_sleb128()?
                } else {
                    0
                };

                attrs.push(AttrSpec {
                    attr: attr as u16,
                    form: form as u16,
                    implicit_const,
                });
            }

            decls.insert(
                code,
                AbbrevDecl {
                    tag: tag as u16,
                    has_children,
                    attrs,
                },
            );
        }

        Ok(AbbrevTable { decls })
    }

    /// Look up a declaration by abbreviation code.
    pub(crate) fn get(&self, code: u64) -> Option<&AbbrevDecl> {
        self.decls.get(&code)
    }

    /// `true` if the table declares nothing (a unit pointing here is undecodable).
    pub(crate) fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
