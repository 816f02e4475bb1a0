//! Glyph name taxonomy.
//!
//! Every glyph name falls into exactly one [`Category`]; rules use it to
//! decide whether they apply. Classification is ordered: a name containing
//! `_` is user-owned, otherwise the first matching name pattern wins.

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    UserOwned,
    Ids,
    /// 統合漢字
    Unified,
    UnifiedVariant,
    /// 互換漢字
    Compatibility,
    CompatibilityVariant,
    /// Any other UCS codepoint
    NonKanjiUcs,
    NonKanjiUcsVariant,
    Cdp,
    KosekiKanji,
    KosekiNonKanji,
    Toki,
    Ext,
    UnstableExt,
    Other,
}

impl Category {
    pub const ALL: [Category; 15] = [
        Category::UserOwned,
        Category::Ids,
        Category::Unified,
        Category::UnifiedVariant,
        Category::Compatibility,
        Category::CompatibilityVariant,
        Category::NonKanjiUcs,
        Category::NonKanjiUcsVariant,
        Category::Cdp,
        Category::KosekiKanji,
        Category::KosekiNonKanji,
        Category::Toki,
        Category::Ext,
        Category::UnstableExt,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::UserOwned => "user-owned",
            Category::Ids => "ids",
            Category::Unified => "togo",
            Category::UnifiedVariant => "togo-var",
            Category::Compatibility => "gokan",
            Category::CompatibilityVariant => "gokan-var",
            Category::NonKanjiUcs => "ucs-hikanji",
            Category::NonKanjiUcsVariant => "ucs-hikanji-var",
            Category::Cdp => "cdp",
            Category::KosekiKanji => "koseki-kanji",
            Category::KosekiNonKanji => "koseki-hikanji",
            Category::Toki => "toki",
            Category::Ext => "ext",
            Category::UnstableExt => "unstable-ext",
            Category::Other => "other",
        }
    }

    pub fn is_non_kanji(self) -> bool {
        matches!(
            self,
            Category::NonKanjiUcs | Category::NonKanjiUcsVariant | Category::KosekiNonKanji
        )
    }

    /// Categories whose names start with a UCS header.
    pub fn is_ucs(self) -> bool {
        matches!(
            self,
            Category::Unified
                | Category::UnifiedVariant
                | Category::Compatibility
                | Category::CompatibilityVariant
                | Category::NonKanjiUcs
                | Category::NonKanjiUcsVariant
        )
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name split at its first `-`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Captures {
    pub head: String,
    pub tail: Option<String>,
}

impl Captures {
    fn split(name: &str) -> Self {
        match name.split_once('-') {
            Some((head, tail)) => Self {
                head: head.to_string(),
                tail: Some(tail.to_string()),
            },
            None => Self {
                head: name.to_string(),
                tail: None,
            },
        }
    }
}

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:",
        r"(?P<ids>(?:u2ff[\da-f]|u31ef)-.+)",
        r"|u(?P<ucs>[\da-f]{4,6})(?:-.+)?",
        r"|(?P<cdp>cdp[on]?-[\da-f]{4}(?:-.*)?)",
        r"|koseki-(?P<koseki>\d{6})",
        r"|(?P<toki>toki-\d{8})",
        r"|(?P<ext>ext[a-z]-\d{5})",
        r"|(?P<irg>irg20\d{2}-\d{5})",
        r")$"
    ))
    .unwrap()
});

/// CJK Unified Ideographs, Extension A through Extension I.
const UNIFIED_RANGES: [(u32, u32); 10] = [
    (0x3400, 0x4DBF),
    (0x4E00, 0x9FFF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B739),
    (0x2B740, 0x2B81D),
    (0x2B820, 0x2CEA1),
    (0x2CEB0, 0x2EBE0),
    (0x2EBF0, 0x2EE5D),
    (0x30000, 0x3134A),
    (0x31350, 0x323AF),
];

/// Unified ideographs inside the compatibility block.
const UNIFIED_IN_COMPATIBILITY: [u32; 12] = [
    0xFA0E, 0xFA0F, 0xFA11, 0xFA13, 0xFA14, 0xFA1F, 0xFA21, 0xFA23, 0xFA24, 0xFA27, 0xFA28,
    0xFA29,
];

const COMPATIBILITY_RANGES: [(u32, u32); 3] =
    [(0xF900, 0xFA6D), (0xFA70, 0xFAD9), (0x2F800, 0x2FA1D)];

fn in_ranges(cp: u32, ranges: &[(u32, u32)]) -> bool {
    ranges.iter().any(|&(lo, hi)| lo <= cp && cp <= hi)
}

pub fn is_unified(cp: u32) -> bool {
    in_ranges(cp, &UNIFIED_RANGES) || UNIFIED_IN_COMPATIBILITY.contains(&cp)
}

pub fn is_compatibility(cp: u32) -> bool {
    in_ranges(cp, &COMPATIBILITY_RANGES) && !UNIFIED_IN_COMPATIBILITY.contains(&cp)
}

/// Codepoint of a `uXXXX` header, if the text is one.
pub fn ucs_codepoint(header: &str) -> Option<u32> {
    let hex = header.strip_prefix('u')?;
    if !(4..=6).contains(&hex.len()) || !hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Classify a glyph name.
pub fn categorize(name: &str) -> (Category, Captures) {
    let captures = Captures::split(name);
    if name.contains('_') {
        return (Category::UserOwned, captures);
    }
    let Some(caps) = NAME_RE.captures(name) else {
        return (Category::Other, captures);
    };
    let category = if caps.name("ids").is_some() {
        Category::Ids
    } else if let Some(hex) = caps.name("ucs") {
        let cp = u32::from_str_radix(hex.as_str(), 16).unwrap_or(0);
        let variant = captures.tail.is_some();
        match (is_unified(cp), is_compatibility(cp), variant) {
            (true, _, false) => Category::Unified,
            (true, _, true) => Category::UnifiedVariant,
            (_, true, false) => Category::Compatibility,
            (_, true, true) => Category::CompatibilityVariant,
            (_, _, false) => Category::NonKanjiUcs,
            (_, _, true) => Category::NonKanjiUcsVariant,
        }
    } else if caps.name("cdp").is_some() {
        Category::Cdp
    } else if let Some(num) = caps.name("koseki") {
        if num.as_str().starts_with('9') {
            Category::KosekiNonKanji
        } else {
            Category::KosekiKanji
        }
    } else if caps.name("toki").is_some() {
        Category::Toki
    } else if caps.name("ext").is_some() {
        Category::Ext
    } else if caps.name("irg").is_some() {
        Category::UnstableExt
    } else {
        Category::Other
    };
    (category, captures)
}

/// [`categorize`] behind a per-run LRU cache.
pub struct Categorizer {
    cache: RefCell<LruCache<String, (Category, Captures)>>,
}

impl Categorizer {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    pub fn categorize(&self, name: &str) -> (Category, Captures) {
        if let Some(hit) = self.cache.borrow_mut().get(name) {
            return hit.clone();
        }
        let result = categorize(name);
        self.cache.borrow_mut().put(name.to_string(), result.clone());
        result
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(4096)
    }
}
