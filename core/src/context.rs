//! Per-glyph validation context.
//!
//! The engine builds one context per glyph and hands the same context to
//! every applicable rule, so the category and the resolved entity are
//! computed once per glyph.

use once_cell::unsync::OnceCell;

use crate::category::{Captures, Category};
use crate::dump::{Dump, DumpEntry};
use crate::kage::KageData;

pub struct ValidatorContext<'a> {
    pub dump: &'a Dump,
    pub glyph: &'a DumpEntry,
    pub category: Category,
    pub captures: Captures,
    entity: OnceCell<&'a DumpEntry>,
}

impl<'a> ValidatorContext<'a> {
    pub fn new(
        dump: &'a Dump,
        glyph: &'a DumpEntry,
        category: Category,
        captures: Captures,
    ) -> Self {
        Self {
            dump,
            glyph,
            category,
            captures,
            entity: OnceCell::new(),
        }
    }

    /// Build a context, classifying the glyph name on the spot.
    pub fn for_glyph(dump: &'a Dump, glyph: &'a DumpEntry) -> Self {
        let (category, captures) = crate::category::categorize(&glyph.name);
        Self::new(dump, glyph, category, captures)
    }

    pub fn name(&self) -> &'a str {
        &self.glyph.name
    }

    pub fn kage(&self) -> &'a KageData {
        self.glyph.kage()
    }

    pub fn is_alias(&self) -> bool {
        self.glyph.is_alias()
    }

    pub fn is_non_kanji(&self) -> bool {
        self.category.is_non_kanji()
    }

    /// The aliased glyph when it exists, otherwise the glyph itself.
    /// Exactly one alias hop is followed.
    pub fn entity(&self) -> &'a DumpEntry {
        let dump = self.dump;
        let glyph = self.glyph;
        self.entity.get_or_init(|| {
            glyph
                .entity_name()
                .and_then(|name| dump.get(name))
                .unwrap_or(glyph)
        })
    }

    /// `true` for an alias whose target is not in the dump.
    pub fn entity_missing(&self) -> bool {
        self.glyph
            .entity_name()
            .is_some_and(|name| !self.dump.contains(name))
    }
}
