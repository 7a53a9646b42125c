//! Line-number program prologues and per-unit filename tables.
//!
//! `DW_AT_decl_file`/`DW_AT_call_file` attribute values are indices into the file table
//! declared by the unit's line-number program. Only the prologue is parsed here — the
//! state-machine opcodes that follow it are irrelevant to the columnar projection.
//!
//! Version 5 changed the table encoding (entry-format descriptors instead of fixed
//! C-string lists) and, more importantly, the index base: file indices are 1-based up to
//! version 4 and 0-based from version 5 on. The produced table hides that difference by
//! inserting a leading dummy entry for pre-v5 tables, so lookups are uniform downstream.
//!
//! Malformed individual entries are recoverable: they become an `"<error>"` placeholder
//! and a warning, capped per pipeline instance. Structural prologue damage is fatal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::{columns::StringDict, file::parser::Parser, Result};

use super::{
    constants::DW_LNCT_PATH,
    form::{extract_value, DebugSections, FormParams, FormValue},
};

/// Placeholder stored for a file entry whose name could not be decoded.
const ERROR_PLACEHOLDER: &str = "<error>";

/// Shared cap on recoverable line-table warnings, one per pipeline instance.
#[derive(Debug)]
pub(crate) struct WarningCounter {
    seen: AtomicUsize,
    cap: usize,
}

impl WarningCounter {
    pub(crate) fn new(cap: usize) -> WarningCounter {
        WarningCounter {
            seen: AtomicUsize::new(0),
            cap,
        }
    }

    /// Count one warning; `true` while the cap has not been reached.
    pub(crate) fn note(&self) -> bool {
        self.seen.fetch_add(1, Ordering::Relaxed) < self.cap
    }
}

/// Parse the line-number program prologue at `offset` and build the unit's filename table.
///
/// Returns the table plus the number of addressable entries (`len - 1`), which is what
/// raw attribute values are range-checked against before lookup.
///
/// # Errors
/// Returns [`crate::Error::Malformed`]/[`crate::Error::OutOfBounds`] for structural
/// damage: a truncated prologue, a reserved initial length, or an entry format the
/// decoder cannot walk. Individually damaged file names are recovered with a placeholder.
pub(crate) fn parse_filename_table<'a>(
    line: &'a [u8],
    offset: u64,
    params: &FormParams,
    sections: &DebugSections<'a>,
    warnings: &WarningCounter,
) -> Result<(Arc<StringDict>, u64)> {
    let offset = usize::try_from(offset)
        .map_err(|_| malformed_error!("Line program offset {} does not fit in memory", offset))?;
    if offset >= line.len() {
        return Err(malformed_error!(
            "Line program offset {} is outside .debug_line ({} bytes)",
            offset,
            line.len()
        ));
    }

    let mut parser = Parser::new(line);
    parser.seek(offset)?;

    let (_unit_length, is_dwarf64) = parser.read_initial_length()?;
    let version = parser.read_le::<u16>()?;
    if !(2..=5).contains(&version) {
        return Err(malformed_error!(
            "Unsupported line table version {} at offset {}",
            version,
            offset
        ));
    }

    if version >= 5 {
        parser.read_le::<u8>()?; // address_size
        parser.read_le::<u8>()?; // segment_selector_size
    }

    parser.read_offset(is_dwarf64)?; // header_length
    parser.read_le::<u8>()?; // minimum_instruction_length
    if version >= 4 {
        parser.read_le::<u8>()?; // maximum_operations_per_instruction
    }
    parser.read_le::<u8>()?; // default_is_stmt
    parser.read_le::<i8>()?; // line_base
    parser.read_le::<u8>()?; // line_range
    let opcode_base = parser.read_le::<u8>()?;
    if opcode_base == 0 {
        return Err(malformed_error!(
            "Line table prologue at offset {} declares opcode base 0",
            offset
        ));
    }
    parser.read_bytes(usize::from(opcode_base) - 1)?; // standard_opcode_lengths

    // Entry 0 is the default; pre-v5 tables get a second dummy so that their 1-based
    // file indices line up with v5's 0-based ones after the +1 shift at lookup time.
    let mut table = vec![String::new()];
    if version <= 4 {
        table.push(String::new());
    }

    if version <= 4 {
        parse_legacy_tables(&mut parser, &mut table)?;
    } else {
        parse_v5_tables(&mut parser, &mut table, params, sections, warnings)?;
    }

    let size = table.len() as u64 - 1;
    Ok((Arc::new(StringDict::from_strings(table)), size))
}

/// Version 2–4 include-directory and file lists: NUL-terminated strings, empty-terminated.
fn parse_legacy_tables(parser: &mut Parser<'_>, table: &mut Vec<String>) -> Result<()> {
    // Include directories are skipped; the table stores bare file names like the
    // attribute values reference them.
    loop {
        let dir = parser.read_cstr()?;
        if dir.is_empty() {
            break;
        }
    }

    loop {
        let name = parser.read_cstr()?;
        if name.is_empty() {
            break;
        }
        parser.read_uleb128()?; // directory index
        parser.read_uleb128()?; // modification time
        parser.read_uleb128()?; // file length

        table.push(String::from_utf8_lossy(name).into_owned());
    }

    Ok(())
}

/// Version 5 descriptor-driven directory and file tables.
fn parse_v5_tables<'a>(
    parser: &mut Parser<'a>,
    table: &mut Vec<String>,
    params: &FormParams,
    sections: &DebugSections<'a>,
    warnings: &WarningCounter,
) -> Result<()> {
    // Directory table: walked for its side effect on the parser position only.
    let dir_formats = read_entry_formats(parser)?;
    let dir_count = parser.read_uleb128()?;
    for _ in 0..dir_count {
        for &(_, form) in &dir_formats {
            extract_value(parser, form, 0, params, sections)?;
        }
    }

    let file_formats = read_entry_formats(parser)?;
    let file_count = parser.read_uleb128()?;
    for index in 0..file_count {
        let mut name: Option<String> = None;
        for &(content, form) in &file_formats {
            let value = extract_value(parser, form, 0, params, sections)?;
            if content != DW_LNCT_PATH {
                continue;
            }

            match value {
                FormValue::Str(s) => name = Some(s.into_owned()),
                _ => {
                    // A path declared with a non-string form is recoverable damage:
                    // keep the placeholder and keep going.
                    if warnings.note() {
                        tracing::warn!(
                            entry = index,
                            form,
                            "line table file entry has non-string path form"
                        );
                    }
                }
            }
        }

        table.push(name.unwrap_or_else(|| ERROR_PLACEHOLDER.to_string()));
    }

    Ok(())
}

/// Read one `(content type, form)` descriptor list.
fn read_entry_formats(parser: &mut Parser<'_>) -> Result<Vec<(u64, u16)>> {
    let count = parser.read_le::<u8>()?;
    let mut formats = Vec::with_capacity(usize::from(count));

    for _ in 0..count {
        let content = parser.read_uleb128()?;
        let form = parser.read_uleb128()?;
        if form > u64::from(u16::MAX) {
            return Err(malformed_error!(
                "Line table entry format declares form {:#x} outside the 16-bit code space",
                form
            ));
        }
        formats.push((content, form as u16));
    }

    Ok(formats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::dwarf::{line_program_v4, line_program_v5};

    fn params() -> FormParams {
        FormParams {
            version: 5,
            address_size: 8,
            is_dwarf64: false,
            unit_offset: 0,
            str_offsets_base: 8,
            addr_base: 8,
        }
    }

    fn sections<'a>(line: &'a [u8]) -> DebugSections<'a> {
        DebugSections {
            info: &[],
            line: Some(line),
            strtab: None,
            line_strtab: None,
            str_offsets: None,
            addr: None,
        }
    }

    #[test]
    fn v4_table_is_one_based() {
        let line = line_program_v4(&["main.c", "util.c"]);
        let warnings = WarningCounter::new(10);

        let (table, size) =
            parse_filename_table(&line, 0, &params(), &sections(&line), &warnings).unwrap();

        // default + dummy + 2 files
        assert_eq!(table.len(), 4);
        assert_eq!(size, 3);
        assert_eq!(table.get(0), "");
        assert_eq!(table.get(1), ""); // 1-based dummy
        assert_eq!(table.get(2), "main.c");
        assert_eq!(table.get(3), "util.c");
    }

    #[test]
    fn v5_table_is_zero_based() {
        let line = line_program_v5(&["main.c", "util.c"]);
        let warnings = WarningCounter::new(10);

        let (table, size) =
            parse_filename_table(&line, 0, &params(), &sections(&line), &warnings).unwrap();

        // default + 2 files, no dummy
        assert_eq!(table.len(), 3);
        assert_eq!(size, 2);
        assert_eq!(table.get(1), "main.c");
        assert_eq!(table.get(2), "util.c");
    }

    #[test]
    fn offset_outside_section() {
        let line = line_program_v4(&["main.c"]);
        let warnings = WarningCounter::new(10);

        assert!(parse_filename_table(
            &line,
            line.len() as u64 + 8,
            &params(),
            &sections(&line),
            &warnings
        )
        .is_err());
    }

    #[test]
    fn truncated_prologue() {
        let mut line = line_program_v4(&["main.c"]);
        line.truncate(10);
        let warnings = WarningCounter::new(10);

        assert!(parse_filename_table(&line, 0, &params(), &sections(&line), &warnings).is_err());
    }

    #[test]
    fn warning_counter_caps() {
        let warnings = WarningCounter::new(2);
        assert!(warnings.note());
        assert!(warnings.note());
        assert!(!warnings.note());
        assert!(!warnings.note());
    }
}
