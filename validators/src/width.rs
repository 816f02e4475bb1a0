//! Full-width versus half-width glyphs.
//!
//! The horizontal extent of the strokes (with quoted parts estimated from
//! their own width class) decides whether a glyph is drawn half-width. That
//! must agree with membership in the wiki's half-width glyph groups.

use std::sync::Arc;

use gwv_core::filters::category_in;
use gwv_core::refdata::{GlyphGroups, HALFWIDTH_GLYPHS, NON_SPACING_HALFWIDTH};
use gwv_core::{Category, ErrorKind, Predicate, Result, Rule, StrokeType, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::names::REGIONS;

static FULLWIDTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-fullwidth$|^uff(?:[0-5][0-9a-f]|60|e[0-6])$").unwrap());
static HALFWIDTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-halfwidth$|^uff(?:6[1-9a-f]|[7-9a-d][0-9a-f]|e[8-e])$").unwrap()
});
static HEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"-{REGIONS}?01(?:-(?:var|itaiji)-|$)")).unwrap());

/// Horizontal extent (out of 200) of parts whose ink is much narrower than
/// their width class suggests.
const PART_EXTENTS: [(&str, f64, f64); 24] = [
    ("left-half-circle", 15.0, 100.0),
    ("right-half-circle", 100.0, 185.0),
    ("palatal-hook", 40.0, 64.0),
    ("short-backslash", 94.0, 110.0),
    ("short-slash", 89.0, 105.0),
    ("small-diamond", 76.0, 124.0),
    ("vertical-short-bar", 99.0, 102.0),
    ("u002c", 36.0, 56.0),
    ("u002e", 44.0, 56.0),
    ("u0049", 30.0, 70.0),
    ("u006a", 9.0, 56.0),
    ("u006c", 30.0, 70.0),
    ("u02d9", 44.0, 56.0),
    ("u02db", 49.0, 79.0),
    ("u026a", 30.0, 70.0),
    ("u0020-u0309", 41.0, 63.0),
    ("u0020-u0323", 44.0, 56.0),
    ("u16c1", 50.0, 50.0),
    ("u2019", 36.0, 56.0),
    ("u2032", 40.0, 60.0),
    ("u25e6", 33.0, 67.0),
    ("u25e6-fullwidth", 83.0, 117.0),
    ("u26ac", 62.4, 137.6),
    ("u30fb", 92.0, 108.0),
];

/// Declared width class of a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClass {
    NonSpacingHalfwidth,
    Halfwidth,
    Fullwidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidthError {
    /// Class the glyph is declared with; its drawing says otherwise.
    pub declared: WidthClass,
}

impl ErrorKind for WidthError {
    fn code(&self) -> &'static str {
        match self.declared {
            // NonSpacingGlyphs-Halfwidthに含まれているが全角
            WidthClass::NonSpacingHalfwidth => "0",
            // HalfwidthGlyphsに含まれているが全角
            WidthClass::Halfwidth => "1",
            // 半角だがHalfwidthGlyphsに含まれていない
            WidthClass::Fullwidth => "2",
        }
    }
}

#[derive(Debug, Default)]
pub struct Width {
    groups: Arc<GlyphGroups>,
}

impl Width {
    pub fn new(groups: Arc<GlyphGroups>) -> Self {
        Self { groups }
    }

    fn class_of(&self, name: &str) -> WidthClass {
        if self.groups.contains(NON_SPACING_HALFWIDTH, name) {
            WidthClass::NonSpacingHalfwidth
        } else if self.groups.contains(HALFWIDTH_GLYPHS, name) {
            WidthClass::Halfwidth
        } else {
            WidthClass::Fullwidth
        }
    }

    /// Leftmost and rightmost x of the drawing; `None` if nothing is drawn.
    fn extent(&self, ctx: &ValidatorContext<'_>) -> Result<Option<(f64, f64)>> {
        let name = ctx.name();
        if FULLWIDTH_RE.is_match(name) || HEN_RE.is_match(name) {
            return Ok(Some((0.0, 200.0)));
        }
        if HALFWIDTH_RE.is_match(name) {
            return Ok(Some((0.0, 100.0)));
        }

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        for line in &ctx.kage().lines {
            match line.kind() {
                Some(StrokeType::Blank) => continue,
                Some(StrokeType::PartQuote) => {}
                _ => {
                    for x in line.values().iter().skip(3).step_by(2).flatten() {
                        min_x = min_x.min(*x as f64);
                        max_x = max_x.max(*x as f64);
                    }
                    continue;
                }
            }
            let x_left = line.int(3)? as f64;
            let width = line.int(5)? as f64 - x_left;
            let part = line.part_base_name().unwrap_or_default();
            let (left, right) = match PART_EXTENTS.iter().find(|(p, ..)| *p == part) {
                Some(&(_, l, r)) => (l / 200.0, r / 200.0),
                None => match self.class_of(part) {
                    WidthClass::NonSpacingHalfwidth => continue,
                    WidthClass::Halfwidth => (0.06, 0.44),
                    WidthClass::Fullwidth => {
                        let narrow = FULLWIDTH_RE.is_match(part)
                            || ctx.dump.contains(&format!("{part}-halfwidth"));
                        if narrow {
                            (0.31, 0.69)
                        } else {
                            (0.06, 0.94)
                        }
                    }
                },
            };
            for x in [x_left + width * left, x_left + width * right] {
                min_x = min_x.min(x);
                max_x = max_x.max(x);
            }
        }
        Ok((max_x != f64::NEG_INFINITY).then_some((min_x, max_x)))
    }
}

impl Rule for Width {
    type Error = WidthError;
    const NAME: &'static str = "width";

    fn filter(&self) -> Predicate {
        category_in(&[
            Category::UserOwned,
            Category::NonKanjiUcs,
            Category::NonKanjiUcsVariant,
            Category::Toki,
            Category::Other,
        ]) & !Predicate::HasTransform
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<WidthError>> {
        let Some((min_x, max_x)) = self.extent(ctx)? else {
            return Ok(None);
        };
        let drawn_half = max_x <= 110.0 && min_x < 90.0;
        let declared = self.class_of(ctx.name());
        let declared_half = declared != WidthClass::Fullwidth;
        Ok((drawn_half != declared_half).then_some(WidthError { declared }))
    }
}
