//! Shared fixture builders for the integration tests: minimal ELF64 images wrapping
//! crafted `.debug_*` payloads.
#![allow(dead_code)]

/// Append an unsigned LEB128 encoding of `value`.
pub fn push_uleb(out: &mut Vec<u8>, mut value: u64) {
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

/// Builder for a little-endian ELF64 relocatable image with named sections.
pub struct ElfBuilder {
    sections: Vec<(String, Vec<u8>)>,
}

impl ElfBuilder {
    pub fn new() -> Self {
        ElfBuilder {
            sections: Vec::new(),
        }
    }

    pub fn section(mut self, name: &str, data: &[u8]) -> Self {
        self.sections.push((name.to_string(), data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        const EHSIZE: usize = 64;
        const SHENTSIZE: usize = 64;

        let mut bodies: Vec<(usize, usize)> = Vec::new();
        let mut cursor = EHSIZE;
        for (_, data) in &self.sections {
            bodies.push((cursor, data.len()));
            cursor += data.len();
        }

        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for (name, _) in &self.sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_name_offset = shstrtab.len() as u32;
        shstrtab.extend_from_slice(b".shstrtab\0");

        let shstrtab_offset = cursor;
        cursor += shstrtab.len();
        let shoff = (cursor + 7) & !7;

        let section_count = self.sections.len() + 2;
        let shstrndx = (section_count - 1) as u16;

        let mut image = Vec::with_capacity(shoff + section_count * SHENTSIZE);

        image.extend_from_slice(&[0x7F, b'E', b'L', b'F', 2, 1, 1, 0]);
        image.extend_from_slice(&[0u8; 8]);
        image.extend_from_slice(&1u16.to_le_bytes()); // ET_REL
        image.extend_from_slice(&0x3Eu16.to_le_bytes()); // EM_X86_64
        image.extend_from_slice(&1u32.to_le_bytes());
        image.extend_from_slice(&0u64.to_le_bytes());
        image.extend_from_slice(&0u64.to_le_bytes());
        image.extend_from_slice(&(shoff as u64).to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&(EHSIZE as u16).to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&(SHENTSIZE as u16).to_le_bytes());
        image.extend_from_slice(&(section_count as u16).to_le_bytes());
        image.extend_from_slice(&shstrndx.to_le_bytes());

        for (_, data) in &self.sections {
            image.extend_from_slice(data);
        }
        image.extend_from_slice(&shstrtab);
        image.resize(shoff, 0);

        let mut push_shdr = |name: u32, sh_type: u32, offset: usize, size: usize| {
            image.extend_from_slice(&name.to_le_bytes());
            image.extend_from_slice(&sh_type.to_le_bytes());
            image.extend_from_slice(&0u64.to_le_bytes());
            image.extend_from_slice(&0u64.to_le_bytes());
            image.extend_from_slice(&(offset as u64).to_le_bytes());
            image.extend_from_slice(&(size as u64).to_le_bytes());
            image.extend_from_slice(&0u32.to_le_bytes());
            image.extend_from_slice(&0u32.to_le_bytes());
            image.extend_from_slice(&1u64.to_le_bytes());
            image.extend_from_slice(&0u64.to_le_bytes());
        };

        push_shdr(0, 0, 0, 0);
        for (i, (offset, size)) in bodies.iter().enumerate() {
            push_shdr(name_offsets[i], 1, *offset, *size);
        }
        push_shdr(shstrtab_name_offset, 3, shstrtab_offset, shstrtab.len());

        image
    }
}

/// Builder for a `.debug_abbrev` declaration list.
pub struct AbbrevBuilder {
    out: Vec<u8>,
}

impl AbbrevBuilder {
    pub fn new() -> Self {
        AbbrevBuilder { out: Vec::new() }
    }

    pub fn decl(mut self, code: u64, tag: u64, has_children: bool, attrs: &[(u64, u64)]) -> Self {
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

    pub fn build(mut self) -> Vec<u8> {
        push_uleb(&mut self.out, 0);
        self.out
    }
}

/// Builder for one DWARF32 `.debug_info` unit.
pub struct UnitBuilder {
    version: u16,
    abbrev_offset: u32,
    dies: Vec<u8>,
}

impl UnitBuilder {
    pub fn new(version: u16) -> Self {
        UnitBuilder {
            version,
            abbrev_offset: 0,
            dies: Vec::new(),
        }
    }

    pub fn abbrev_offset(mut self, offset: u32) -> Self {
        self.abbrev_offset = offset;
        self
    }

    pub fn die(mut self, code: u64, payload: &[u8]) -> Self {
        push_uleb(&mut self.dies, code);
        self.dies.extend_from_slice(payload);
        self
    }

    pub fn terminator(mut self) -> Self {
        push_uleb(&mut self.dies, 0);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut header = Vec::new();
        header.extend_from_slice(&self.version.to_le_bytes());
        if self.version >= 5 {
            header.push(1); // DW_UT_compile
            header.push(8); // address_size
            header.extend_from_slice(&self.abbrev_offset.to_le_bytes());
        } else {
            header.extend_from_slice(&self.abbrev_offset.to_le_bytes());
            header.push(8); // address_size
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
pub fn line_program_v4(files: &[&str]) -> Vec<u8> {
    let mut body = Vec::new();
    body.push(1); // minimum_instruction_length
    body.push(1); // maximum_operations_per_instruction
    body.push(1); // default_is_stmt
    body.push(0xFB); // line_base = -5
    body.push(14); // line_range
    body.push(13); // opcode_base
    body.extend_from_slice(&[0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1]);

    body.push(0); // include_directories terminator
    for file in files {
        body.extend_from_slice(file.as_bytes());
        body.push(0);
        push_uleb(&mut body, 0);
        push_uleb(&mut body, 0);
        push_uleb(&mut body, 0);
    }
    body.push(0); // file_names terminator

    let mut out = Vec::new();
    let header_length = body.len() as u32;
    let unit_length = 2 + 4 + body.len() as u32;
    out.extend_from_slice(&unit_length.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&header_length.to_le_bytes());
    out.extend_from_slice(&body);
    out
}
