//! Applicability predicates.
//!
//! Each rule declares which glyphs it looks at as a [`Predicate`]. The engine
//! evaluates it before calling the rule, so rules never see glyphs outside
//! their scope.

use crate::category::Category;
use crate::context::ValidatorContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Always,
    IsAlias,
    HasTransform,
    IsNonKanji,
    CategoryIn(&'static [Category]),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eval(&self, ctx: &ValidatorContext<'_>) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::IsAlias => ctx.is_alias(),
            Predicate::HasTransform => ctx.kage().has_transform(),
            Predicate::IsNonKanji => ctx.is_non_kanji(),
            Predicate::CategoryIn(categories) => categories.contains(&ctx.category),
            Predicate::Not(inner) => !inner.eval(ctx),
            Predicate::And(all) => all.iter().all(|p| p.eval(ctx)),
        }
    }

    /// Conjunction; nested `And`s are flattened.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::Always, p) | (p, Predicate::Always) => p,
            (Predicate::And(mut a), Predicate::And(b)) => {
                a.extend(b);
                Predicate::And(a)
            }
            (Predicate::And(mut a), p) => {
                a.push(p);
                Predicate::And(a)
            }
            (p, Predicate::And(mut b)) => {
                b.insert(0, p);
                Predicate::And(b)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }
}

impl std::ops::Not for Predicate {
    type Output = Predicate;

    fn not(self) -> Predicate {
        match self {
            Predicate::Not(inner) => *inner,
            p => Predicate::Not(Box::new(p)),
        }
    }
}

impl std::ops::BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

pub fn category_in(categories: &'static [Category]) -> Predicate {
    Predicate::CategoryIn(categories)
}

/// Commonly used category sets.
pub mod categories {
    use crate::category::Category::{self, *};

    pub const USER_OWNED: &[Category] = &[UserOwned];
    pub const NON_KANJI: &[Category] = &[NonKanjiUcs, NonKanjiUcsVariant, KosekiNonKanji];
    pub const USER_OWNED_OR_NON_KANJI: &[Category] =
        &[UserOwned, NonKanjiUcs, NonKanjiUcsVariant, KosekiNonKanji];
    pub const UCS: &[Category] = &[
        Unified,
        UnifiedVariant,
        Compatibility,
        CompatibilityVariant,
        NonKanjiUcs,
        NonKanjiUcsVariant,
    ];
    pub const KANJI_UCS: &[Category] =
        &[Unified, UnifiedVariant, Compatibility, CompatibilityVariant];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::Dump;

    #[test]
    fn combinators() {
        let dump = Dump::from_entries(
            [
                ("u4e00", "u3013", "1:0:0:10:100:190:100"),
                ("u3042", "u3013", "99:0:0:0:0:200:200:u4e00"),
            ],
            0.0,
        );
        let kanji = ValidatorContext::for_glyph(&dump, dump.get("u4e00").unwrap());
        let kana = ValidatorContext::for_glyph(&dump, dump.get("u3042").unwrap());

        let pred = !Predicate::IsAlias & !category_in(categories::USER_OWNED);
        assert!(pred.eval(&kanji));
        assert!(!pred.eval(&kana));

        assert!(Predicate::IsNonKanji.eval(&kana));
        assert!((!!Predicate::IsNonKanji).eval(&kana));
        assert!(!Predicate::HasTransform.eval(&kanji));
        assert_eq!(
            Predicate::Always.and(Predicate::IsAlias),
            Predicate::IsAlias
        );
    }
}
