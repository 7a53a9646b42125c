//! Shared dictionaries backing the low-cardinality columns.
//!
//! Three kinds of dictionary appear in the output model:
//!
//! - The fixed enumeration dictionaries (tag, attribute name, form name): built once per
//!   pipeline over the complete 16-bit code space so that the index of a value *is* its
//!   format code, stable across every batch of a run. Entry lookup never allocates — the
//!   table holds `&'static str` names.
//! - The per-unit filename table: owned strings, built lazily from the line-number
//!   program prologue and shared by every batch the unit produces.
//! - The per-batch deduplicating dictionary for `attr_str`: appended to during decoding
//!   through [`StringDictBuilder`], frozen when the batch is finished.
//!
//! All dictionaries are immutable once built and shared by reference, so concurrent
//! readers need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dwarf::constants::{attr_name, form_name, tag_name};

/// A position-addressed, immutable string table referenced by dictionary columns.
///
/// Index 0 is conventionally the empty string for owned dictionaries; the fixed
/// code-space dictionaries map every unassigned code to the empty string as well.
/// Out-of-range lookups yield the empty string rather than panicking, matching the
/// decoder's fallback behavior for dangling indices.
#[derive(Debug)]
pub struct StringDict {
    entries: Entries,
}

#[derive(Debug)]
enum Entries {
    /// Complete code-space table of static names
    Fixed(Vec<&'static str>),
    /// Owned values (filename tables, per-batch attribute strings)
    Owned(Vec<String>),
}

impl StringDict {
    /// Build a dictionary covering the complete 16-bit code space of `name_fn`.
    ///
    /// Entry `i` holds the canonical name of code `i`, or `""` for unassigned codes.
    pub(crate) fn from_code_space(name_fn: fn(u16) -> &'static str) -> StringDict {
        let mut entries = Vec::with_capacity(usize::from(u16::MAX) + 1);
        for code in 0..=u16::MAX {
            entries.push(name_fn(code));
        }

        StringDict {
            entries: Entries::Fixed(entries),
        }
    }

    /// Build a dictionary from owned values, addressed by position.
    pub(crate) fn from_strings(values: Vec<String>) -> StringDict {
        StringDict {
            entries: Entries::Owned(values),
        }
    }

    /// A dictionary holding only the default empty entry.
    pub(crate) fn empty() -> StringDict {
        StringDict::from_strings(vec![String::new()])
    }

    /// Look up the value at `index`, yielding `""` for out-of-range indices.
    #[must_use]
    pub fn get(&self, index: usize) -> &str {
        match &self.entries {
            Entries::Fixed(entries) => entries.get(index).copied().unwrap_or(""),
            Entries::Owned(entries) => entries.get(index).map_or("", String::as_str),
        }
    }

    /// Number of entries in the dictionary.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Fixed(entries) => entries.len(),
            Entries::Owned(entries) => entries.len(),
        }
    }

    /// `true` if the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append-only deduplicating builder for per-batch dictionaries.
///
/// Seeded with the default empty entry at index 0 so that "no value" rows can always
/// point somewhere valid.
#[derive(Debug)]
pub(crate) struct StringDictBuilder {
    values: Vec<String>,
    index: HashMap<String, u32>,
}

impl StringDictBuilder {
    pub(crate) fn new() -> StringDictBuilder {
        let mut builder = StringDictBuilder {
            values: Vec::new(),
            index: HashMap::new(),
        };
        builder.values.push(String::new());
        builder.index.insert(String::new(), 0);
        builder
    }

    /// Return the index of `value`, inserting it if unseen.
    pub(crate) fn get_or_insert(&mut self, value: &str) -> u32 {
        if let Some(&index) = self.index.get(value) {
            return index;
        }

        #[allow(clippy::cast_possible_truncation)]
        let index = self.values.len() as u32;
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), index);
        index
    }

    /// Freeze the builder into an immutable dictionary.
    pub(crate) fn finish(self) -> StringDict {
        StringDict::from_strings(self.values)
    }
}

/// The three fixed enumeration dictionaries shared by every worker and batch of a run.
#[derive(Debug, Clone)]
pub(crate) struct SharedDicts {
    pub(crate) tag: Arc<StringDict>,
    pub(crate) attr: Arc<StringDict>,
    pub(crate) form: Arc<StringDict>,
}

impl SharedDicts {
    /// Build the dictionaries. Called once per pipeline, before workers start; read-only
    /// afterwards.
    pub(crate) fn build() -> SharedDicts {
        SharedDicts {
            tag: Arc::new(StringDict::from_code_space(tag_name)),
            attr: Arc::new(StringDict::from_code_space(attr_name)),
            form: Arc::new(StringDict::from_code_space(form_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_space_dictionary_is_code_indexed() {
        let dict = StringDict::from_code_space(tag_name);

        assert_eq!(dict.len(), 65_536);
        assert_eq!(dict.get(0x11), "compile_unit");
        assert_eq!(dict.get(0x2E), "subprogram");
        assert_eq!(dict.get(0), "");
        assert_eq!(dict.get(0xFFFF), "");
        // Out of range falls back to the empty string.
        assert_eq!(dict.get(100_000), "");
    }

    #[test]
    fn builder_deduplicates() {
        let mut builder = StringDictBuilder::new();

        assert_eq!(builder.get_or_insert(""), 0);
        let a = builder.get_or_insert("alpha");
        let b = builder.get_or_insert("beta");
        assert_eq!(builder.get_or_insert("alpha"), a);
        assert_ne!(a, b);

        let dict = builder.finish();
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.get(0), "");
        assert_eq!(dict.get(a as usize), "alpha");
        assert_eq!(dict.get(b as usize), "beta");
    }

    #[test]
    fn shared_dicts_cover_all_three_spaces() {
        let dicts = SharedDicts::build();

        assert_eq!(dicts.tag.get(0x11), "compile_unit");
        assert_eq!(dicts.attr.get(0x03), "name");
        assert_eq!(dicts.form.get(0x0E), "strp");
    }
}
