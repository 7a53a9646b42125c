//! Fixed DWARF enumeration spaces: tags, attributes, forms, languages, base-type encodings.
//!
//! The decode pipeline stringifies format codes through complete, stable code→name tables.
//! Every function here maps a code to its canonical short name (the `DW_TAG_`/`DW_AT_`/
//! `DW_FORM_`/`DW_LANG_`/`DW_ATE_` prefix stripped) or to an empty string for codes the
//! format does not assign. The tables cover the full 16-bit code space so that dictionary
//! indices built from them are stable for the lifetime of a run and equal to the format
//! code itself.

#![allow(dead_code)]

// Tags
pub(crate) const DW_TAG_COMPILE_UNIT: u16 = 0x11;

// Attributes
pub(crate) const DW_AT_NAME: u16 = 0x03;
pub(crate) const DW_AT_STMT_LIST: u16 = 0x10;
pub(crate) const DW_AT_LANGUAGE: u16 = 0x13;
pub(crate) const DW_AT_DECL_FILE: u16 = 0x3A;
pub(crate) const DW_AT_DECL_LINE: u16 = 0x3B;
pub(crate) const DW_AT_ENCODING: u16 = 0x3E;
pub(crate) const DW_AT_CALL_FILE: u16 = 0x58;
pub(crate) const DW_AT_LINKAGE_NAME: u16 = 0x6E;
pub(crate) const DW_AT_STR_OFFSETS_BASE: u16 = 0x72;
pub(crate) const DW_AT_ADDR_BASE: u16 = 0x73;
pub(crate) const DW_AT_GNU_ADDR_BASE: u16 = 0x2133;

// Forms
pub(crate) const DW_FORM_ADDR: u16 = 0x01;
pub(crate) const DW_FORM_BLOCK2: u16 = 0x03;
pub(crate) const DW_FORM_BLOCK4: u16 = 0x04;
pub(crate) const DW_FORM_DATA2: u16 = 0x05;
pub(crate) const DW_FORM_DATA4: u16 = 0x06;
pub(crate) const DW_FORM_DATA8: u16 = 0x07;
pub(crate) const DW_FORM_STRING: u16 = 0x08;
pub(crate) const DW_FORM_BLOCK: u16 = 0x09;
pub(crate) const DW_FORM_BLOCK1: u16 = 0x0A;
pub(crate) const DW_FORM_DATA1: u16 = 0x0B;
pub(crate) const DW_FORM_FLAG: u16 = 0x0C;
pub(crate) const DW_FORM_SDATA: u16 = 0x0D;
pub(crate) const DW_FORM_STRP: u16 = 0x0E;
pub(crate) const DW_FORM_UDATA: u16 = 0x0F;
pub(crate) const DW_FORM_REF_ADDR: u16 = 0x10;
pub(crate) const DW_FORM_REF1: u16 = 0x11;
pub(crate) const DW_FORM_REF2: u16 = 0x12;
pub(crate) const DW_FORM_REF4: u16 = 0x13;
pub(crate) const DW_FORM_REF8: u16 = 0x14;
pub(crate) const DW_FORM_REF_UDATA: u16 = 0x15;
pub(crate) const DW_FORM_INDIRECT: u16 = 0x16;
pub(crate) const DW_FORM_SEC_OFFSET: u16 = 0x17;
pub(crate) const DW_FORM_EXPRLOC: u16 = 0x18;
pub(crate) const DW_FORM_FLAG_PRESENT: u16 = 0x19;
pub(crate) const DW_FORM_STRX: u16 = 0x1A;
pub(crate) const DW_FORM_ADDRX: u16 = 0x1B;
pub(crate) const DW_FORM_REF_SUP4: u16 = 0x1C;
pub(crate) const DW_FORM_STRP_SUP: u16 = 0x1D;
pub(crate) const DW_FORM_DATA16: u16 = 0x1E;
pub(crate) const DW_FORM_LINE_STRP: u16 = 0x1F;
pub(crate) const DW_FORM_REF_SIG8: u16 = 0x20;
pub(crate) const DW_FORM_IMPLICIT_CONST: u16 = 0x21;
pub(crate) const DW_FORM_LOCLISTX: u16 = 0x22;
pub(crate) const DW_FORM_RNGLISTX: u16 = 0x23;
pub(crate) const DW_FORM_REF_SUP8: u16 = 0x24;
pub(crate) const DW_FORM_STRX1: u16 = 0x25;
pub(crate) const DW_FORM_STRX2: u16 = 0x26;
pub(crate) const DW_FORM_STRX3: u16 = 0x27;
pub(crate) const DW_FORM_STRX4: u16 = 0x28;
pub(crate) const DW_FORM_ADDRX1: u16 = 0x29;
pub(crate) const DW_FORM_ADDRX2: u16 = 0x2A;
pub(crate) const DW_FORM_ADDRX3: u16 = 0x2B;
pub(crate) const DW_FORM_ADDRX4: u16 = 0x2C;
pub(crate) const DW_FORM_GNU_ADDR_INDEX: u16 = 0x1F01;
pub(crate) const DW_FORM_GNU_STR_INDEX: u16 = 0x1F02;
pub(crate) const DW_FORM_GNU_REF_ALT: u16 = 0x1F20;
pub(crate) const DW_FORM_GNU_STRP_ALT: u16 = 0x1F21;

// Line-table content types (DWARF v5 entry formats)
pub(crate) const DW_LNCT_PATH: u64 = 0x01;
pub(crate) const DW_LNCT_DIRECTORY_INDEX: u64 = 0x02;
pub(crate) const DW_LNCT_TIMESTAMP: u64 = 0x03;
pub(crate) const DW_LNCT_SIZE: u64 = 0x04;
pub(crate) const DW_LNCT_MD5: u64 = 0x05;

/// Canonical short name for a tag code, `""` for unassigned codes.
pub(crate) fn tag_name(tag: u16) -> &'static str {
    match tag {
        0x01 => "array_type",
        0x02 => "class_type",
        0x03 => "entry_point",
        0x04 => "enumeration_type",
        0x05 => "formal_parameter",
        0x08 => "imported_declaration",
        0x0A => "label",
        0x0B => "lexical_block",
        0x0D => "member",
        0x0F => "pointer_type",
        0x10 => "reference_type",
        0x11 => "compile_unit",
        0x12 => "string_type",
        0x13 => "structure_type",
        0x15 => "subroutine_type",
        0x16 => "typedef",
        0x17 => "union_type",
        0x18 => "unspecified_parameters",
        0x19 => "variant",
        0x1A => "common_block",
        0x1B => "common_inclusion",
        0x1C => "inheritance",
        0x1D => "inlined_subroutine",
        0x1E => "module",
        0x1F => "ptr_to_member_type",
        0x20 => "set_type",
        0x21 => "subrange_type",
        0x22 => "with_stmt",
        0x23 => "access_declaration",
        0x24 => "base_type",
        0x25 => "catch_block",
        0x26 => "const_type",
        0x27 => "constant",
        0x28 => "enumerator",
        0x29 => "file_type",
        0x2A => "friend",
        0x2B => "namelist",
        0x2C => "namelist_item",
        0x2D => "packed_type",
        0x2E => "subprogram",
        0x2F => "template_type_parameter",
        0x30 => "template_value_parameter",
        0x31 => "thrown_type",
        0x32 => "try_block",
        0x33 => "variant_part",
        0x34 => "variable",
        0x35 => "volatile_type",
        0x36 => "dwarf_procedure",
        0x37 => "restrict_type",
        0x38 => "interface_type",
        0x39 => "namespace",
        0x3A => "imported_module",
        0x3B => "unspecified_type",
        0x3C => "partial_unit",
        0x3D => "imported_unit",
        0x3F => "condition",
        0x40 => "shared_type",
        0x41 => "type_unit",
        0x42 => "rvalue_reference_type",
        0x43 => "template_alias",
        0x44 => "coarray_type",
        0x45 => "generic_subrange",
        0x46 => "dynamic_type",
        0x47 => "atomic_type",
        0x48 => "call_site",
        0x49 => "call_site_parameter",
        0x4A => "skeleton_unit",
        0x4B => "immutable_type",
        0x4081 => "MIPS_loop",
        0x4101 => "format_label",
        0x4102 => "function_template",
        0x4103 => "class_template",
        0x4106 => "GNU_BINCL",
        0x4107 => "GNU_EINCL",
        0x4108 => "GNU_template_template_param",
        0x4109 => "GNU_call_site",
        0x410A => "GNU_call_site_parameter",
        0x4200 => "APPLE_property",
        _ => "",
    }
}

/// Canonical short name for an attribute code, `""` for unassigned codes.
pub(crate) fn attr_name(attr: u16) -> &'static str {
    match attr {
        0x01 => "sibling",
        0x02 => "location",
        0x03 => "name",
        0x09 => "ordering",
        0x0B => "byte_size",
        0x0C => "bit_offset",
        0x0D => "bit_size",
        0x10 => "stmt_list",
        0x11 => "low_pc",
        0x12 => "high_pc",
        0x13 => "language",
        0x15 => "discr",
        0x16 => "discr_value",
        0x17 => "visibility",
        0x18 => "import",
        0x19 => "string_length",
        0x1A => "common_reference",
        0x1B => "comp_dir",
        0x1C => "const_value",
        0x1D => "containing_type",
        0x1E => "default_value",
        0x20 => "inline",
        0x21 => "is_optional",
        0x22 => "lower_bound",
        0x25 => "producer",
        0x27 => "prototyped",
        0x2A => "return_addr",
        0x2C => "start_scope",
        0x2E => "bit_stride",
        0x2F => "upper_bound",
        0x31 => "abstract_origin",
        0x32 => "accessibility",
        0x33 => "address_class",
        0x34 => "artificial",
        0x35 => "base_types",
        0x36 => "calling_convention",
        0x37 => "count",
        0x38 => "data_member_location",
        0x39 => "decl_column",
        0x3A => "decl_file",
        0x3B => "decl_line",
        0x3C => "declaration",
        0x3D => "discr_list",
        0x3E => "encoding",
        0x3F => "external",
        0x40 => "frame_base",
        0x41 => "friend",
        0x42 => "identifier_case",
        0x43 => "macro_info",
        0x44 => "namelist_item",
        0x45 => "priority",
        0x46 => "segment",
        0x47 => "specification",
        0x48 => "static_link",
        0x49 => "type",
        0x4A => "use_location",
        0x4B => "variable_parameter",
        0x4C => "virtuality",
        0x4D => "vtable_elem_location",
        0x4E => "allocated",
        0x4F => "associated",
        0x50 => "data_location",
        0x51 => "byte_stride",
        0x52 => "entry_pc",
        0x53 => "use_UTF8",
        0x54 => "extension",
        0x55 => "ranges",
        0x56 => "trampoline",
        0x57 => "call_column",
        0x58 => "call_file",
        0x59 => "call_line",
        0x5A => "description",
        0x5B => "binary_scale",
        0x5C => "decimal_scale",
        0x5D => "small",
        0x5E => "decimal_sign",
        0x5F => "digit_count",
        0x60 => "picture_string",
        0x61 => "mutable",
        0x62 => "threads_scaled",
        0x63 => "explicit",
        0x64 => "object_pointer",
        0x65 => "endianity",
        0x66 => "elemental",
        0x67 => "pure",
        0x68 => "recursive",
        0x69 => "signature",
        0x6A => "main_subprogram",
        0x6B => "data_bit_offset",
        0x6C => "const_expr",
        0x6D => "enum_class",
        0x6E => "linkage_name",
        0x6F => "string_length_bit_size",
        0x70 => "string_length_byte_size",
        0x71 => "rank",
        0x72 => "str_offsets_base",
        0x73 => "addr_base",
        0x74 => "rnglists_base",
        0x76 => "dwo_name",
        0x77 => "reference",
        0x78 => "rvalue_reference",
        0x79 => "macros",
        0x7A => "call_all_calls",
        0x7B => "call_all_source_calls",
        0x7C => "call_all_tail_calls",
        0x7D => "call_return_pc",
        0x7E => "call_value",
        0x7F => "call_origin",
        0x80 => "call_parameter",
        0x81 => "call_pc",
        0x82 => "call_tail_call",
        0x83 => "call_target",
        0x84 => "call_target_clobbered",
        0x85 => "call_data_location",
        0x86 => "call_data_value",
        0x87 => "noreturn",
        0x88 => "alignment",
        0x89 => "export_symbols",
        0x8A => "deleted",
        0x8B => "defaulted",
        0x8C => "loclists_base",
        0x2101 => "sf_names",
        0x2102 => "src_info",
        0x2103 => "mac_info",
        0x2104 => "src_coords",
        0x2105 => "body_begin",
        0x2106 => "body_end",
        0x2107 => "GNU_vector",
        0x2110 => "GNU_template_name",
        0x2111 => "GNU_call_site_value",
        0x2112 => "GNU_call_site_data_value",
        0x2113 => "GNU_call_site_target",
        0x2114 => "GNU_call_site_target_clobbered",
        0x2115 => "GNU_tail_call",
        0x2116 => "GNU_all_tail_call_sites",
        0x2117 => "GNU_all_call_sites",
        0x2118 => "GNU_all_source_call_sites",
        0x2119 => "GNU_macros",
        0x2130 => "GNU_dwo_name",
        0x2131 => "GNU_dwo_id",
        0x2132 => "GNU_ranges_base",
        0x2133 => "GNU_addr_base",
        0x2134 => "GNU_pubnames",
        0x2135 => "GNU_pubtypes",
        0x3E02 => "LLVM_sysroot",
        0x3FEF => "APPLE_sdk",
        _ => "",
    }
}

/// Canonical short name for a form code, `""` for unassigned codes.
pub(crate) fn form_name(form: u16) -> &'static str {
    match form {
        DW_FORM_ADDR => "addr",
        DW_FORM_BLOCK2 => "block2",
        DW_FORM_BLOCK4 => "block4",
        DW_FORM_DATA2 => "data2",
        DW_FORM_DATA4 => "data4",
        DW_FORM_DATA8 => "data8",
        DW_FORM_STRING => "string",
        DW_FORM_BLOCK => "block",
        DW_FORM_BLOCK1 => "block1",
        DW_FORM_DATA1 => "data1",
        DW_FORM_FLAG => "flag",
        DW_FORM_SDATA => "sdata",
        DW_FORM_STRP => "strp",
        DW_FORM_UDATA => "udata",
        DW_FORM_REF_ADDR => "ref_addr",
        DW_FORM_REF1 => "ref1",
        DW_FORM_REF2 => "ref2",
        DW_FORM_REF4 => "ref4",
        DW_FORM_REF8 => "ref8",
        DW_FORM_REF_UDATA => "ref_udata",
        DW_FORM_INDIRECT => "indirect",
        DW_FORM_SEC_OFFSET => "sec_offset",
        DW_FORM_EXPRLOC => "exprloc",
        DW_FORM_FLAG_PRESENT => "flag_present",
        DW_FORM_STRX => "strx",
        DW_FORM_ADDRX => "addrx",
        DW_FORM_REF_SUP4 => "ref_sup4",
        DW_FORM_STRP_SUP => "strp_sup",
        DW_FORM_DATA16 => "data16",
        DW_FORM_LINE_STRP => "line_strp",
        DW_FORM_REF_SIG8 => "ref_sig8",
        DW_FORM_IMPLICIT_CONST => "implicit_const",
        DW_FORM_LOCLISTX => "loclistx",
        DW_FORM_RNGLISTX => "rnglistx",
        DW_FORM_REF_SUP8 => "ref_sup8",
        DW_FORM_STRX1 => "strx1",
        DW_FORM_STRX2 => "strx2",
        DW_FORM_STRX3 => "strx3",
        DW_FORM_STRX4 => "strx4",
        DW_FORM_ADDRX1 => "addrx1",
        DW_FORM_ADDRX2 => "addrx2",
        DW_FORM_ADDRX3 => "addrx3",
        DW_FORM_ADDRX4 => "addrx4",
        DW_FORM_GNU_ADDR_INDEX => "GNU_addr_index",
        DW_FORM_GNU_STR_INDEX => "GNU_str_index",
        DW_FORM_GNU_REF_ALT => "GNU_ref_alt",
        DW_FORM_GNU_STRP_ALT => "GNU_strp_alt",
        _ => "",
    }
}

/// Canonical short name for a source-language code, `""` for unassigned codes.
pub(crate) fn language_name(lang: u32) -> &'static str {
    match lang {
        0x0001 => "C89",
        0x0002 => "C",
        0x0003 => "Ada83",
        0x0004 => "C_plus_plus",
        0x0005 => "Cobol74",
        0x0006 => "Cobol85",
        0x0007 => "Fortran77",
        0x0008 => "Fortran90",
        0x0009 => "Pascal83",
        0x000A => "Modula2",
        0x000B => "Java",
        0x000C => "C99",
        0x000D => "Ada95",
        0x000E => "Fortran95",
        0x000F => "PLI",
        0x0010 => "ObjC",
        0x0011 => "ObjC_plus_plus",
        0x0012 => "UPC",
        0x0013 => "D",
        0x0014 => "Python",
        0x0015 => "OpenCL",
        0x0016 => "Go",
        0x0017 => "Modula3",
        0x0018 => "Haskell",
        0x0019 => "C_plus_plus_03",
        0x001A => "C_plus_plus_11",
        0x001B => "OCaml",
        0x001C => "Rust",
        0x001D => "C11",
        0x001E => "Swift",
        0x001F => "Julia",
        0x0020 => "Dylan",
        0x0021 => "C_plus_plus_14",
        0x0022 => "Fortran03",
        0x0023 => "Fortran08",
        0x0024 => "RenderScript",
        0x0025 => "BLISS",
        0x0026 => "Kotlin",
        0x0027 => "Zig",
        0x0028 => "Crystal",
        0x002A => "C_plus_plus_17",
        0x002B => "C_plus_plus_20",
        0x002C => "C17",
        0x002D => "Fortran18",
        0x8001 => "Mips_Assembler",
        0x8E57 => "GOOGLE_RenderScript",
        0xB000 => "BORLAND_Delphi",
        _ => "",
    }
}

/// Canonical short name for a base-type encoding code, `""` for unassigned codes.
pub(crate) fn encoding_name(encoding: u32) -> &'static str {
    match encoding {
        0x01 => "address",
        0x02 => "boolean",
        0x03 => "complex_float",
        0x04 => "float",
        0x05 => "signed",
        0x06 => "signed_char",
        0x07 => "unsigned",
        0x08 => "unsigned_char",
        0x09 => "imaginary_float",
        0x0A => "packed_decimal",
        0x0B => "numeric_string",
        0x0C => "edited",
        0x0D => "signed_fixed",
        0x0E => "unsigned_fixed",
        0x0F => "decimal_float",
        0x10 => "UTF",
        0x11 => "UCS",
        0x12 => "ASCII",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names() {
        assert_eq!(tag_name(DW_TAG_COMPILE_UNIT), "compile_unit");
        assert_eq!(tag_name(0x2E), "subprogram");
        assert_eq!(attr_name(DW_AT_NAME), "name");
        assert_eq!(attr_name(DW_AT_LINKAGE_NAME), "linkage_name");
        assert_eq!(form_name(DW_FORM_STRP), "strp");
        assert_eq!(language_name(0x1C), "Rust");
        assert_eq!(encoding_name(0x05), "signed");
    }

    #[test]
    fn unassigned_codes_are_empty() {
        assert_eq!(tag_name(0), "");
        assert_eq!(tag_name(0x3E), "");
        assert_eq!(attr_name(0xFFFF), "");
        assert_eq!(form_name(0x02), "");
        assert_eq!(language_name(0), "");
        assert_eq!(encoding_name(0xFFFF), "");
    }
}
