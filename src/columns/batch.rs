//! The logical column set, projection masks, and the columnar batch type.
//!
//! The output model is fixed: fifteen logical columns whose names and types never depend
//! on the input file. Consumers describe the subset they want through a [`ColumnSet`]
//! and receive [`Batch`]es containing exactly those columns; everything else is skipped
//! during decoding.
//!
//! Array-typed logical columns are represented as a values column plus a per-row offsets
//! column: `offsets[row]` is the running element count after `row`, so the final offset
//! equals the total element count and consecutive offsets delimit one row's slice.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use super::dictionary::StringDict;

/// Identifier of one logical output column.
///
/// The declaration order is the canonical column order of the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum ColumnId {
    /// Section-relative byte offset of the entry
    Offset,
    /// Encoded byte size of the entry
    Size,
    /// The entry's tag, dictionary-encoded over the fixed tag space
    Tag,
    /// Name of the entry's unit root
    UnitName,
    /// Section-relative byte offset of the entry's unit
    UnitOffset,
    /// Tags of the open ancestors, innermost first
    AncestorTags,
    /// Offsets of the open ancestors, innermost first
    AncestorOffsets,
    /// The entry's `name` attribute
    Name,
    /// The entry's `linkage_name` attribute
    LinkageName,
    /// The entry's declaration file, resolved through the unit's filename table
    DeclFile,
    /// The entry's declaration line
    DeclLine,
    /// Attribute names, one array element per attribute
    AttrName,
    /// Attribute forms, parallel to `attr_name`
    AttrForm,
    /// Integer projections of attribute values, parallel to `attr_name`
    AttrInt,
    /// String projections of attribute values, parallel to `attr_name`
    AttrStr,
}

/// Concrete type of one logical column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// 32-bit unsigned integers
    UInt32,
    /// 64-bit unsigned integers
    UInt64,
    /// Plain strings
    Str,
    /// Dictionary-encoded strings
    DictStr,
    /// Dictionary-encoded 64-bit unsigned integers
    DictUInt64,
    /// Arrays of dictionary-encoded strings
    ArrayDictStr,
    /// Arrays of 64-bit unsigned integers
    ArrayUInt64,
}

impl ColumnId {
    /// The column's case-sensitive name in the output schema.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ColumnId::Offset => "offset",
            ColumnId::Size => "size",
            ColumnId::Tag => "tag",
            ColumnId::UnitName => "unit_name",
            ColumnId::UnitOffset => "unit_offset",
            ColumnId::AncestorTags => "ancestor_tags",
            ColumnId::AncestorOffsets => "ancestor_offsets",
            ColumnId::Name => "name",
            ColumnId::LinkageName => "linkage_name",
            ColumnId::DeclFile => "decl_file",
            ColumnId::DeclLine => "decl_line",
            ColumnId::AttrName => "attr_name",
            ColumnId::AttrForm => "attr_form",
            ColumnId::AttrInt => "attr_int",
            ColumnId::AttrStr => "attr_str",
        }
    }

    /// The column's concrete type.
    #[must_use]
    pub fn column_type(self) -> ColumnType {
        match self {
            ColumnId::Offset => ColumnType::UInt64,
            ColumnId::Size | ColumnId::DeclLine => ColumnType::UInt32,
            ColumnId::Tag | ColumnId::UnitName | ColumnId::DeclFile => ColumnType::DictStr,
            ColumnId::UnitOffset => ColumnType::DictUInt64,
            ColumnId::AncestorTags | ColumnId::AttrName | ColumnId::AttrForm
            | ColumnId::AttrStr => ColumnType::ArrayDictStr,
            ColumnId::AncestorOffsets | ColumnId::AttrInt => ColumnType::ArrayUInt64,
            ColumnId::Name | ColumnId::LinkageName => ColumnType::Str,
        }
    }

    /// Resolve a column by its schema name.
    ///
    /// Backed by a process-wide map built on first use.
    #[must_use]
    pub fn from_name(name: &str) -> Option<ColumnId> {
        static NAME_TO_ID: OnceLock<HashMap<&'static str, ColumnId>> = OnceLock::new();

        NAME_TO_ID
            .get_or_init(|| ColumnId::iter().map(|id| (id.name(), id)).collect())
            .get(name)
            .copied()
    }

    /// The column's bit in a [`ColumnSet`].
    #[must_use]
    pub fn flag(self) -> ColumnSet {
        ColumnSet::from_bits_truncate(1 << (self as u16))
    }
}

bitflags! {
    /// A set of requested logical columns (the projection mask).
    ///
    /// Bit positions follow the [`ColumnId`] declaration order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ColumnSet: u16 {
        /// `offset`
        const OFFSET = 1 << 0;
        /// `size`
        const SIZE = 1 << 1;
        /// `tag`
        const TAG = 1 << 2;
        /// `unit_name`
        const UNIT_NAME = 1 << 3;
        /// `unit_offset`
        const UNIT_OFFSET = 1 << 4;
        /// `ancestor_tags`
        const ANCESTOR_TAGS = 1 << 5;
        /// `ancestor_offsets`
        const ANCESTOR_OFFSETS = 1 << 6;
        /// `name`
        const NAME = 1 << 7;
        /// `linkage_name`
        const LINKAGE_NAME = 1 << 8;
        /// `decl_file`
        const DECL_FILE = 1 << 9;
        /// `decl_line`
        const DECL_LINE = 1 << 10;
        /// `attr_name`
        const ATTR_NAME = 1 << 11;
        /// `attr_form`
        const ATTR_FORM = 1 << 12;
        /// `attr_int`
        const ATTR_INT = 1 << 13;
        /// `attr_str`
        const ATTR_STR = 1 << 14;
    }
}

impl ColumnSet {
    /// Close the set over array-offset ownership.
    ///
    /// For each family of parallel arrays one member is nominated to own the offsets
    /// vector: requesting any of `attr_form`/`attr_int`/`attr_str` implies `attr_name`,
    /// and requesting `ancestor_offsets` implies `ancestor_tags`. The decoder always
    /// works on a normalized set; the batch still contains only the columns that were
    /// actually requested.
    #[must_use]
    pub fn normalized(mut self) -> ColumnSet {
        if self.intersects(ColumnSet::ATTR_FORM | ColumnSet::ATTR_INT | ColumnSet::ATTR_STR) {
            self |= ColumnSet::ATTR_NAME;
        }
        if self.contains(ColumnSet::ANCESTOR_OFFSETS) {
            self |= ColumnSet::ANCESTOR_TAGS;
        }
        self
    }
}

/// Description of one schema column: identifier, name, and concrete type.
#[derive(Clone, Copy, Debug)]
pub struct ColumnDesc {
    /// The column's identifier
    pub id: ColumnId,
    /// The column's case-sensitive name
    pub name: &'static str,
    /// The column's concrete type
    pub column_type: ColumnType,
}

/// The full output schema: all fifteen logical columns in canonical order.
///
/// Requires no I/O; usable before any container has been opened.
#[must_use]
pub fn schema() -> &'static [ColumnDesc] {
    static SCHEMA: OnceLock<Vec<ColumnDesc>> = OnceLock::new();

    SCHEMA.get_or_init(|| {
        ColumnId::iter()
            .map(|id| ColumnDesc {
                id,
                name: id.name(),
                column_type: id.column_type(),
            })
            .collect()
    })
}

/// One materialized column of a batch.
#[derive(Debug)]
pub enum ColumnData {
    /// 32-bit unsigned values, one per row
    UInt32(Vec<u32>),
    /// 64-bit unsigned values, one per row
    UInt64(Vec<u64>),
    /// Plain strings, one per row
    Str(Vec<String>),
    /// Dictionary-encoded strings: per-row indices into a shared dictionary
    DictStr {
        /// The shared value table
        dict: Arc<StringDict>,
        /// One dictionary index per row
        indices: Vec<u32>,
    },
    /// Dictionary-encoded 64-bit values: per-row indices into a small value table
    DictUInt64 {
        /// The value table
        dict: Vec<u64>,
        /// One dictionary index per row
        indices: Vec<u32>,
    },
    /// An array column: flat values plus one running element offset per row
    Array {
        /// The flattened element column
        values: Box<ColumnData>,
        /// Monotonically non-decreasing element counts, one per row
        offsets: Vec<u64>,
    },
}

impl ColumnData {
    /// Number of rows in this column.
    #[must_use]
    pub fn row_count(&self) -> usize {
        match self {
            ColumnData::UInt32(values) => values.len(),
            ColumnData::UInt64(values) => values.len(),
            ColumnData::Str(values) => values.len(),
            ColumnData::DictStr { indices, .. } | ColumnData::DictUInt64 { indices, .. } => {
                indices.len()
            }
            ColumnData::Array { offsets, .. } => offsets.len(),
        }
    }

    /// The dictionary-resolved string of `row`, for dictionary-string columns.
    #[must_use]
    pub fn dict_str(&self, row: usize) -> Option<&str> {
        match self {
            ColumnData::DictStr { dict, indices } => {
                Some(dict.get(*indices.get(row)? as usize))
            }
            _ => None,
        }
    }
}

/// A fixed-schema columnar batch produced by one decode turn over one unit.
///
/// Contains one concrete column per requested logical column, in canonical
/// [`ColumnId`] order. All columns have the same row count. Rows preserve decode order
/// within their unit; batches of different units may interleave in delivery order.
#[derive(Debug)]
pub struct Batch {
    num_rows: usize,
    bytes_consumed: usize,
    columns: Vec<(ColumnId, ColumnData)>,
}

impl Batch {
    pub(crate) fn new(
        num_rows: usize,
        bytes_consumed: usize,
        columns: Vec<(ColumnId, ColumnData)>,
    ) -> Batch {
        Batch {
            num_rows,
            bytes_consumed,
            columns,
        }
    }

    /// Number of rows in the batch.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Approximate number of `.debug_info` bytes consumed to produce this batch.
    ///
    /// Intended for progress accounting; the value is the advance of the producing
    /// unit's cursor, not an exact accounting of all sections touched.
    #[must_use]
    pub fn bytes_consumed(&self) -> usize {
        self.bytes_consumed
    }

    /// The batch's columns in canonical order.
    #[must_use]
    pub fn columns(&self) -> &[(ColumnId, ColumnData)] {
        &self.columns
    }

    /// Look up one column by identifier. `None` if it was not requested.
    #[must_use]
    pub fn column(&self, id: ColumnId) -> Option<&ColumnData> {
        self.columns
            .iter()
            .find(|(column_id, _)| *column_id == id)
            .map(|(_, data)| data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn schema_has_all_columns_in_order() {
        let schema = schema();
        assert_eq!(schema.len(), ColumnId::COUNT);
        assert_eq!(schema[0].name, "offset");
        assert_eq!(schema[0].column_type, ColumnType::UInt64);
        assert_eq!(schema[1].name, "size");
        assert_eq!(schema[2].name, "tag");
        assert_eq!(schema[14].name, "attr_str");
        assert_eq!(schema[14].column_type, ColumnType::ArrayDictStr);
    }

    #[test]
    fn names_round_trip() {
        for id in ColumnId::iter() {
            assert_eq!(ColumnId::from_name(id.name()), Some(id));
        }
        assert_eq!(ColumnId::from_name("no_such_column"), None);
        // Case sensitive.
        assert_eq!(ColumnId::from_name("Offset"), None);
    }

    #[test]
    fn flags_cover_the_set() {
        let mut all = ColumnSet::empty();
        for id in ColumnId::iter() {
            assert!(!all.intersects(id.flag()), "duplicate flag for {id:?}");
            all |= id.flag();
        }
        assert_eq!(all, ColumnSet::all());
    }

    #[test]
    fn normalization_nominates_offset_owners() {
        let set = ColumnSet::ATTR_INT.normalized();
        assert!(set.contains(ColumnSet::ATTR_NAME));

        let set = ColumnSet::ANCESTOR_OFFSETS.normalized();
        assert!(set.contains(ColumnSet::ANCESTOR_TAGS));

        let set = ColumnSet::OFFSET.normalized();
        assert_eq!(set, ColumnSet::OFFSET);
    }

    #[test]
    fn batch_lookup() {
        let batch = Batch::new(
            2,
            10,
            vec![
                (ColumnId::Offset, ColumnData::UInt64(vec![1, 2])),
                (ColumnId::Size, ColumnData::UInt32(vec![3, 4])),
            ],
        );

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.bytes_consumed(), 10);
        assert!(batch.column(ColumnId::Offset).is_some());
        assert!(batch.column(ColumnId::Tag).is_none());
        assert_eq!(batch.column(ColumnId::Size).unwrap().row_count(), 2);
    }
}
