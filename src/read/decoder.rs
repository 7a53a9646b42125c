//! The entry decoder: one unit's entries into column builders.
//!
//! [`parse_entries`] is what a worker runs when it holds a unit: decode entries starting
//! at the cursor's offset until the per-turn row budget is reached, the unit is
//! exhausted, or the encoding turns out to be malformed. The cursor's explicit ancestor
//! stack replaces recursion, so the walk can stop after any entry and a later turn picks
//! up exactly where this one left off.
//!
//! Only the columns in the normalized projection are materialized. For each family of
//! parallel attribute arrays the nominated offsets owner (`attr_name`, `ancestor_tags`)
//! is decoded whenever any member of the family is requested, because the offsets vector
//! is built alongside it.

use std::mem::take;
use std::sync::Arc;

use crate::{
    columns::{Batch, ColumnData, ColumnId, ColumnSet, SharedDicts, StringDict, StringDictBuilder},
    dwarf::{
        constants::{
            encoding_name, language_name, DW_AT_CALL_FILE, DW_AT_DECL_FILE, DW_AT_DECL_LINE,
            DW_AT_ENCODING, DW_AT_LANGUAGE, DW_AT_LINKAGE_NAME, DW_AT_NAME, DW_AT_STMT_LIST,
            DW_TAG_COMPILE_UNIT,
        },
        form::{extract_value, DebugSections, FormValue},
        line::{parse_filename_table, WarningCounter},
        unit::{AncestorFrame, UnitCursor},
    },
    file::parser::Parser,
    Result,
};

use strum::IntoEnumIterator;

/// Row budget for one decode turn over one unit.
///
/// Bounds both batch size and the latency of cooperative cancellation: workers check the
/// stop flag between turns, never mid-turn.
pub(crate) const ROWS_PER_BATCH: usize = 65_536;

/// Everything the decoder needs besides the unit cursor itself.
pub(crate) struct DecodeContext<'a> {
    /// Borrowed debug sections
    pub(crate) sections: DebugSections<'a>,
    /// The fixed tag/attribute/form dictionaries
    pub(crate) dicts: &'a SharedDicts,
    /// Columns the consumer asked for; the batch contains exactly these
    pub(crate) requested: ColumnSet,
    /// `requested` closed over offsets ownership; drives what gets decoded
    pub(crate) need: ColumnSet,
    /// Capped warning budget for recoverable line-table damage
    pub(crate) warnings: &'a WarningCounter,
}

/// Decode entries from the cursor position until the row budget is hit or the unit ends.
///
/// Advances `unit.offset` (and its ancestor stack, filename table and unit name) so the
/// unit can be requeued and resumed. The produced batch carries the cursor's byte
/// advance as `bytes_consumed`.
///
/// # Errors
/// Returns [`crate::Error::Malformed`]/[`crate::Error::OutOfBounds`] for structural
/// damage: an unresolvable abbreviation code, a terminator with no open ancestor, an
/// attribute that cannot be extracted, or a tree running past the unit end. Errors are
/// fatal for the whole run; no per-unit recovery is attempted.
#[allow(clippy::too_many_lines)]
pub(crate) fn parse_entries(ctx: &DecodeContext<'_>, unit: &mut UnitCursor) -> Result<Batch> {
    let need = ctx.need;
    let end_offset = unit.header.end_offset;

    let mut col_offset: Vec<u64> = Vec::new();
    let mut col_size: Vec<u32> = Vec::new();
    let mut col_tag: Vec<u32> = Vec::new();
    let mut col_ancestor_tags: Vec<u32> = Vec::new();
    let mut col_ancestor_offsets: Vec<u64> = Vec::new();
    let mut ancestor_array_offsets: Vec<u64> = Vec::new();
    let mut col_name: Vec<String> = Vec::new();
    let mut col_linkage_name: Vec<String> = Vec::new();
    let mut col_decl_file: Vec<u32> = Vec::new();
    let mut col_decl_line: Vec<u32> = Vec::new();
    let mut col_attr_name: Vec<u32> = Vec::new();
    let mut col_attr_form: Vec<u32> = Vec::new();
    let mut col_attr_int: Vec<u64> = Vec::new();
    let mut col_attr_str: Vec<u32> = Vec::new();
    let mut attr_array_offsets: Vec<u64> = Vec::new();
    let mut attr_str_dict = StringDictBuilder::new();

    let mut parser = Parser::new(ctx.sections.info);
    parser.seek(unit.offset as usize)?;

    let offset_before = unit.offset;
    let mut num_rows = 0usize;

    while num_rows < ROWS_PER_BATCH {
        num_rows += 1;
        let die_offset = parser.pos() as u64;

        if need.contains(ColumnSet::OFFSET) {
            col_offset.push(die_offset);
        }
        if need.contains(ColumnSet::ANCESTOR_TAGS) {
            // Innermost ancestor first.
            for frame in unit.stack.iter().rev() {
                col_ancestor_tags.push(u32::from(frame.tag));
                if need.contains(ColumnSet::ANCESTOR_OFFSETS) {
                    col_ancestor_offsets.push(frame.offset);
                }
            }
            ancestor_array_offsets.push(col_ancestor_tags.len() as u64);
        }

        let abbrev_code = parser.read_uleb128()?;

        if abbrev_code == 0 {
            // Terminator entry: a default row that closes one sibling list.
            if need.contains(ColumnSet::SIZE) {
                #[allow(clippy::cast_possible_truncation)]
                col_size.push((parser.pos() as u64 - die_offset) as u32);
            }
            if need.contains(ColumnSet::TAG) {
                col_tag.push(0);
            }
            if need.contains(ColumnSet::NAME) {
                col_name.push(String::new());
            }
            if need.contains(ColumnSet::LINKAGE_NAME) {
                col_linkage_name.push(String::new());
            }
            if need.contains(ColumnSet::DECL_FILE) {
                col_decl_file.push(0);
            }
            if need.contains(ColumnSet::DECL_LINE) {
                col_decl_line.push(0);
            }
            if need.contains(ColumnSet::ATTR_NAME) {
                attr_array_offsets.push(col_attr_name.len() as u64);
            }

            if unit.stack.pop().is_none() {
                return Err(malformed_error!("Stack underflow at offset {}", die_offset));
            }
        } else {
            if abbrev_code > u64::from(u32::MAX) {
                return Err(malformed_error!(
                    "Abbrev code in DIE header is out of bounds: {}, offset {}",
                    abbrev_code,
                    parser.pos()
                ));
            }
            let Some(decl) = unit.abbrevs.get(abbrev_code) else {
                return Err(malformed_error!(
                    "Abbrev code in DIE header is out of bounds: {}, offset {}",
                    abbrev_code,
                    parser.pos()
                ));
            };

            let tag = decl.tag;
            if need.contains(ColumnSet::TAG) {
                col_tag.push(u32::from(tag));
            }

            // One-shot flags: the first occurrence of each well-known attribute wins.
            let mut need_name = need.contains(ColumnSet::NAME);
            let mut need_linkage_name = need.contains(ColumnSet::LINKAGE_NAME);
            let mut need_decl_file = need.contains(ColumnSet::DECL_FILE);
            let mut need_decl_line = need.contains(ColumnSet::DECL_LINE);

            for spec in &decl.attrs {
                let value = extract_value(
                    &mut parser,
                    spec.form,
                    spec.implicit_const,
                    &unit.params,
                    &ctx.sections,
                )?;

                if need.contains(ColumnSet::ATTR_NAME) {
                    col_attr_name.push(u32::from(spec.attr));
                }
                // For implicit_const and indirect the value's resolved form differs from
                // the declared one; the column records the declaration.
                if need.contains(ColumnSet::ATTR_FORM) {
                    col_attr_form.push(u32::from(spec.form));
                }

                // The statement-list attribute is expected before any attribute that
                // points into the filename table.
                if spec.attr == DW_AT_STMT_LIST && unit.filename_table.is_none() {
                    if let FormValue::Int(line_offset) = value {
                        let Some(line) = ctx.sections.line else {
                            return Err(malformed_error!(
                                "There are stmt_list attributes but no .debug_line section"
                            ));
                        };
                        let (table, size) = parse_filename_table(
                            line,
                            line_offset,
                            &unit.params,
                            &ctx.sections,
                            ctx.warnings,
                        )?;
                        unit.filename_table = Some(table);
                        unit.filename_table_size = size;
                    }
                }

                match value {
                    FormValue::Int(v) => {
                        if need.contains(ColumnSet::ATTR_INT) {
                            col_attr_int.push(v);
                        }

                        #[allow(clippy::cast_possible_truncation)]
                        if spec.attr == DW_AT_DECL_LINE && take(&mut need_decl_line) {
                            col_decl_line.push(v as u32);
                        }

                        // Some attribute values are indices into lookup tables that can
                        // be stringified usefully.
                        if (spec.attr == DW_AT_DECL_FILE || spec.attr == DW_AT_CALL_FILE)
                            && v < unit.filename_table_size
                        {
                            #[allow(clippy::cast_possible_truncation)]
                            let index = (v + 1) as u32;
                            if spec.attr == DW_AT_DECL_FILE && take(&mut need_decl_file) {
                                col_decl_file.push(index);
                            }
                            if need.contains(ColumnSet::ATTR_STR) {
                                let name = unit
                                    .filename_table
                                    .as_ref()
                                    .map_or("", |table| table.get(index as usize));
                                col_attr_str.push(attr_str_dict.get_or_insert(name));
                            }
                        } else if need.contains(ColumnSet::ATTR_STR) {
                            #[allow(clippy::cast_possible_truncation)]
                            if spec.attr == DW_AT_LANGUAGE {
                                col_attr_str
                                    .push(attr_str_dict.get_or_insert(language_name(v as u32)));
                            } else if spec.attr == DW_AT_ENCODING {
                                col_attr_str
                                    .push(attr_str_dict.get_or_insert(encoding_name(v as u32)));
                            } else {
                                col_attr_str.push(0);
                            }
                        }
                    }
                    FormValue::Addr(v) => {
                        if need.contains(ColumnSet::ATTR_INT) {
                            col_attr_int.push(v);
                        }
                        if need.contains(ColumnSet::ATTR_STR) {
                            col_attr_str.push(0);
                        }
                    }
                    FormValue::Block(bytes) => {
                        if need.contains(ColumnSet::ATTR_STR) {
                            let text = String::from_utf8_lossy(bytes);
                            col_attr_str.push(attr_str_dict.get_or_insert(&text));
                        }
                        if need.contains(ColumnSet::ATTR_INT) {
                            col_attr_int.push(0);
                        }
                    }
                    FormValue::Str(text) => {
                        if spec.attr == DW_AT_NAME {
                            if take(&mut need_name) {
                                col_name.push(text.to_string());
                            }
                            if tag == DW_TAG_COMPILE_UNIT {
                                unit.unit_name = text.to_string();
                            }
                        }
                        if spec.attr == DW_AT_LINKAGE_NAME && take(&mut need_linkage_name) {
                            col_linkage_name.push(text.to_string());
                        }
                        if need.contains(ColumnSet::ATTR_STR) {
                            col_attr_str.push(attr_str_dict.get_or_insert(&text));
                        }
                        if need.contains(ColumnSet::ATTR_INT) {
                            col_attr_int.push(0);
                        }
                    }
                    FormValue::Ref(v) => {
                        if need.contains(ColumnSet::ATTR_INT) {
                            col_attr_int.push(v);
                        }
                        if need.contains(ColumnSet::ATTR_STR) {
                            col_attr_str.push(0);
                        }
                    }
                }
            }

            if need.contains(ColumnSet::SIZE) {
                #[allow(clippy::cast_possible_truncation)]
                col_size.push((parser.pos() as u64 - die_offset) as u32);
            }
            if need.contains(ColumnSet::ATTR_NAME) {
                attr_array_offsets.push(col_attr_name.len() as u64);
            }

            // Entries without the well-known attributes get defaults.
            if need_name {
                col_name.push(String::new());
            }
            if need_linkage_name {
                col_linkage_name.push(String::new());
            }
            if need_decl_file {
                col_decl_file.push(0);
            }
            if need_decl_line {
                col_decl_line.push(0);
            }

            if decl.has_children {
                unit.stack.push(AncestorFrame {
                    offset: die_offset,
                    tag,
                });
            }
        }

        unit.offset = parser.pos() as u64;
        if unit.offset > end_offset {
            return Err(malformed_error!(
                "Entry at offset {} runs past the unit end {}",
                die_offset,
                end_offset
            ));
        }

        if unit.stack.is_empty() {
            if !unit.is_exhausted() {
                return Err(malformed_error!(
                    "Unexpected end of DIE tree at offset {} != {}",
                    unit.offset,
                    end_offset
                ));
            }
            break;
        }

        if unit.offset == end_offset {
            return Err(malformed_error!(
                "Unit at offset {} ended with {} open ancestors",
                unit.header.offset,
                unit.stack.len()
            ));
        }
    }

    let bytes_consumed = (unit.offset - offset_before) as usize;
    let attr_str_dict = Arc::new(attr_str_dict.finish());

    let mut columns = Vec::new();
    for id in ColumnId::iter() {
        if !ctx.requested.contains(id.flag()) {
            continue;
        }

        let data = match id {
            ColumnId::Offset => ColumnData::UInt64(take(&mut col_offset)),
            ColumnId::Size => ColumnData::UInt32(take(&mut col_size)),
            ColumnId::Tag => ColumnData::DictStr {
                dict: Arc::clone(&ctx.dicts.tag),
                indices: take(&mut col_tag),
            },
            ColumnId::UnitName => ColumnData::DictStr {
                dict: Arc::new(StringDict::from_strings(vec![
                    String::new(),
                    unit.unit_name.clone(),
                ])),
                indices: vec![1; num_rows],
            },
            ColumnId::UnitOffset => ColumnData::DictUInt64 {
                dict: vec![0, unit.header.offset],
                indices: vec![1; num_rows],
            },
            ColumnId::AncestorTags => ColumnData::Array {
                values: Box::new(ColumnData::DictStr {
                    dict: Arc::clone(&ctx.dicts.tag),
                    indices: take(&mut col_ancestor_tags),
                }),
                offsets: ancestor_array_offsets.clone(),
            },
            ColumnId::AncestorOffsets => ColumnData::Array {
                values: Box::new(ColumnData::UInt64(take(&mut col_ancestor_offsets))),
                offsets: ancestor_array_offsets.clone(),
            },
            ColumnId::Name => ColumnData::Str(take(&mut col_name)),
            ColumnId::LinkageName => ColumnData::Str(take(&mut col_linkage_name)),
            ColumnId::DeclFile => ColumnData::DictStr {
                dict: unit
                    .filename_table
                    .clone()
                    .unwrap_or_else(|| Arc::new(StringDict::empty())),
                indices: take(&mut col_decl_file),
            },
            ColumnId::DeclLine => ColumnData::UInt32(take(&mut col_decl_line)),
            ColumnId::AttrName => ColumnData::Array {
                values: Box::new(ColumnData::DictStr {
                    dict: Arc::clone(&ctx.dicts.attr),
                    indices: take(&mut col_attr_name),
                }),
                offsets: attr_array_offsets.clone(),
            },
            ColumnId::AttrForm => ColumnData::Array {
                values: Box::new(ColumnData::DictStr {
                    dict: Arc::clone(&ctx.dicts.form),
                    indices: take(&mut col_attr_form),
                }),
                offsets: attr_array_offsets.clone(),
            },
            ColumnId::AttrInt => ColumnData::Array {
                values: Box::new(ColumnData::UInt64(take(&mut col_attr_int))),
                offsets: attr_array_offsets.clone(),
            },
            ColumnId::AttrStr => ColumnData::Array {
                values: Box::new(ColumnData::DictStr {
                    dict: Arc::clone(&attr_str_dict),
                    indices: take(&mut col_attr_str),
                }),
                offsets: attr_array_offsets.clone(),
            },
        };

        columns.push((id, data));
    }

    Ok(Batch::new(num_rows, bytes_consumed, columns))
}
