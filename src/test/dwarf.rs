//! DWARF byte-sequence factories for crafted decode tests.

/// Append an unsigned LEB128 encoding of `value`.
pub(crate) fn push_uleb(out: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a signed LEB128 encoding of `value`.
pub(crate) fn push_sleb(out: &mut Vec<u8>, mut value: i64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        let sign_clear = byte & 0x40 == 0;
        if (value == 0 && sign_clear) || (value == -1 && !sign_clear) {
            out.push(byte);
            break;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

/// Builder for a `.debug_abbrev` table.
pub(crate) struct AbbrevBuilder {
    out: Vec<u8>,
}

impl AbbrevBuilder {
    pub(crate) fn new() -> Self {
        AbbrevBuilder { out: Vec::new() }
    }

    /// Add one abbreviation declaration with plain `(attr, form)` pairs.
    pub(crate) fn decl(
        mut self,
        code: u64,
        tag: u64,
        has_children: bool,
        attrs: &[(u64, u64)],
    ) -> Self {
        push_uleb(&mut self.out, code);
        push_uleb(&mut self.out, tag);
        self.out.push(u8::from(has_children));
        for &(attr, form) in attrs {
            push_uleb(&mut self.out, attr);
            push_uleb(&mut self.out, form);
        }
        push_uleb(&mut self.out, 0);
        push_uleb(&mut self.out, 0);
        self
    }

    /// Add a declaration whose last attribute uses `DW_FORM_implicit_const`.
    pub(crate) fn decl_implicit(
        mut self,
        code: u64,
        tag: u64,
        has_children: bool,
        attrs: &[(u64, u64)],
        implicit: (u64, i64),
    ) -> Self {
        push_uleb(&mut self.out, code);
        push_uleb(&mut self.out, tag);
        self.out.push(u8::from(has_children));
        for &(attr, form) in attrs {
            push_uleb(&mut self.out, attr);
            push_uleb(&mut self.out, form);
        }
        push_uleb(&mut self.out, implicit.0);
        push_uleb(&mut self.out, 0x21); // DW_FORM_implicit_const
        push_sleb(&mut self.out, implicit.1);
        push_uleb(&mut self.out, 0);
        push_uleb(&mut self.out, 0);
        self
    }

    /// Terminate the declaration list and return the section bytes.
    pub(crate) fn build(mut self) -> Vec<u8> {
        push_uleb(&mut self.out, 0);
        self.out
    }
}

/// Builder for one `.debug_info` unit (DWARF32).
pub(crate) struct UnitBuilder {
    version: u16,
    address_size: u8,
    abbrev_offset: u32,
    dies: Vec<u8>,
}

impl UnitBuilder {
    pub(crate) fn new(version: u16) -> Self {
        UnitBuilder {
            version,
            address_size: 8,
            abbrev_offset: 0,
            dies: Vec::new(),
        }
    }

    pub(crate) fn abbrev_offset(mut self, offset: u32) -> Self {
        self.abbrev_offset = offset;
        self
    }

    /// Append one DIE: abbreviation code followed by raw attribute payload bytes.
    pub(crate) fn die(mut self, code: u64, payload: &[u8]) -> Self {
        push_uleb(&mut self.dies, code);
        self.dies.extend_from_slice(payload);
        self
    }

    /// Append a terminator (null) entry.
    pub(crate) fn terminator(mut self) -> Self {
        push_uleb(&mut self.dies, 0);
        self
    }

    pub(crate) fn build(self) -> Vec<u8> {
        let mut header = Vec::new();
        header.extend_from_slice(&self.version.to_le_bytes());
        if self.version >= 5 {
            header.push(1); // DW_UT_compile
            header.push(self.address_size);
            header.extend_from_slice(&self.abbrev_offset.to_le_bytes());
        } else {
            header.extend_from_slice(&self.abbrev_offset.to_le_bytes());
            header.push(self.address_size);
        }

        let unit_length = (header.len() + self.dies.len()) as u32;
        let mut out = Vec::with_capacity(4 + unit_length as usize);
        out.extend_from_slice(&unit_length.to_le_bytes());
        out.extend_from_slice(&header);
        out.extend_from_slice(&self.dies);
        out
    }
}

/// A version 4 line-number program containing only a prologue with the given file names.
///
/// Directories are left empty; every file entry references directory 0 with zero
/// timestamp and size.
pub(crate) fn line_program_v4(files: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    body.push(1); // minimum_instruction_length
    body.push(1); // maximum_operations_per_instruction
    body.push(1); // default_is_stmt
    body.push(0xFB); // line_base = -5
    body.push(14); // line_range
    body.push(13); // opcode_base
    body.extend_from_slice(&[0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1]); // standard_opcode_lengths

    body.push(0); // include_directories terminator
    for file in files {
        body.extend_from_slice(file.as_bytes());
        body.push(0);
        push_uleb(&mut body, 0); // directory index
        push_uleb(&mut body, 0); // mtime
        push_uleb(&mut body, 0); // length
    }
    body.push(0); // file_names terminator

    let mut out = Vec::new();
    let header_length = body.len() as u32;
    let unit_length = 2 + 4 + body.len() as u32; // version + header_length + body
    out.extend_from_slice(&unit_length.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&header_length.to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// A version 5 line-number program prologue with inline-string directory and file entries.
pub(crate) fn line_program_v5(files: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    body.push(1); // minimum_instruction_length
    body.push(1); // maximum_operations_per_instruction
    body.push(1); // default_is_stmt
    body.push(0xFB); // line_base = -5
    body.push(14); // line_range
    body.push(13); // opcode_base
    body.extend_from_slice(&[0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1]); // standard_opcode_lengths

    // Directory table: one entry format (DW_LNCT_path, DW_FORM_string), one entry.
    body.push(1);
    push_uleb(&mut body, 1); // DW_LNCT_path
    push_uleb(&mut body, 0x08); // DW_FORM_string
    push_uleb(&mut body, 1);
    body.extend_from_slice(b"/src\0");

    // File table: path + directory index per entry.
    body.push(2);
    push_uleb(&mut body, 1); // DW_LNCT_path
    push_uleb(&mut body, 0x08); // DW_FORM_string
    push_uleb(&mut body, 2); // DW_LNCT_directory_index
    push_uleb(&mut body, 0x0B); // DW_FORM_data1
    push_uleb(&mut body, files.len() as u64);
    for file in files {
        body.extend_from_slice(file.as_bytes());
        body.push(0);
        body.push(0);
    }

    let mut out = Vec::new();
    // version, address_size, segment_selector_size, header_length, body
    let header_length = body.len() as u32;
    let unit_length = 2 + 1 + 1 + 4 + body.len() as u32;
    out.extend_from_slice(&unit_length.to_le_bytes());
    out.extend_from_slice(&5u16.to_le_bytes());
    out.push(8); // address_size
    out.push(0); // segment_selector_size
    out.extend_from_slice(&header_length.to_le_bytes());
    out.extend_from_slice(&body);
    out
}
