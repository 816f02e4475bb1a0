//! Consistency with the MJ character table.
//!
//! Names in a numbering scheme the table covers (koseki, juki, toki, JIS,
//! UCS, ...) are looked up in the table. Aliases should point at a glyph of
//! the same table row and the related character should be a UCS ideograph
//! of that row.

use std::collections::BTreeSet;
use std::sync::Arc;

use gwv_core::category::{is_unified, ucs_codepoint};
use gwv_core::filters::category_in;
use gwv_core::refdata::{glyph_name_to_key, MjField, MjTable};
use gwv_core::{Category, ErrorKind, Predicate, Result, Row, Rule, ValidatorContext, NO_RELATED};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::names::head;

static ITAIJI_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-itaiji-\d{3}$").unwrap());

/// JMJ numbers from here on are hentaigana.
const JMJ_HENTAIGANA_START: &str = "090000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MjError {
    /// entity のエイリアスになっているが expected のエイリアスの間違い
    WrongEntity {
        entity: String,
        expected: BTreeSet<String>,
    },
    /// 関連字に related が設定されているが expected の間違い
    WrongRelated {
        related: String,
        expected: BTreeSet<String>,
    },
    /// 関連字未設定であるが expected である
    MissingRelated { expected: BTreeSet<String> },
    /// 欠番のMJ
    UnassignedJmj,
}

fn names_value(names: &BTreeSet<String>) -> Value {
    names.iter().map(|n| Value::from(n.as_str())).collect()
}

impl ErrorKind for MjError {
    fn code(&self) -> &'static str {
        match self {
            MjError::WrongEntity { .. } => "0",
            MjError::WrongRelated { .. } => "1",
            MjError::MissingRelated { .. } => "2",
            MjError::UnassignedJmj => "3",
        }
    }

    fn payload(&self) -> Row {
        match self {
            MjError::WrongEntity { entity, expected } => {
                vec![Value::from(entity.as_str()), names_value(expected)]
            }
            MjError::WrongRelated { related, expected } => {
                vec![Value::from(related.as_str()), names_value(expected)]
            }
            MjError::MissingRelated { expected } => vec![Value::Null, names_value(expected)],
            MjError::UnassignedJmj => Vec::new(),
        }
    }
}

/// Name a table key of `field` is compared with: UCS entries are compared
/// by codepoint only.
fn base_name(name: &str, field: MjField) -> &str {
    if field == MjField::Ucs {
        head(name)
    } else {
        name
    }
}

#[derive(Debug, Default)]
pub struct Mj {
    table: Arc<MjTable>,
}

impl Mj {
    pub fn new(table: Arc<MjTable>) -> Self {
        Self { table }
    }

    fn names_in(&self, rows: &[usize], field: MjField) -> BTreeSet<String> {
        rows.iter()
            .flat_map(|&row| self.table.glyph_names(row, field))
            .collect()
    }

    fn check_entity(
        &self,
        name: &str,
        field: MjField,
        rows: &[usize],
        entity: &str,
    ) -> Option<MjError> {
        let (e_field, e_key) = glyph_name_to_key(entity)?;
        if e_field == field {
            return None;
        }
        let expected = self.names_in(rows, e_field);
        if expected.is_empty() || expected.contains(base_name(entity, e_field)) {
            return None;
        }
        let from_entity = self.names_in(self.table.search(e_field, &e_key), field);
        if from_entity.is_empty() || from_entity.contains(base_name(name, field)) {
            return None;
        }
        Some(MjError::WrongEntity {
            entity: entity.to_string(),
            expected,
        })
    }
}

impl Rule for Mj {
    type Error = MjError;
    const NAME: &'static str = "mj";

    fn filter(&self) -> Predicate {
        category_in(&[
            Category::Unified,
            Category::UnifiedVariant,
            Category::Compatibility,
            Category::CompatibilityVariant,
            Category::NonKanjiUcs,
            Category::NonKanjiUcsVariant,
            Category::KosekiKanji,
            Category::KosekiNonKanji,
            Category::Toki,
            Category::Other,
        ])
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<MjError>> {
        let name = ctx.name();
        let Some((field, key)) = glyph_name_to_key(name) else {
            return Ok(None);
        };
        let rows = self.table.search(field, &key);
        if rows.is_empty() {
            let unassigned = field == MjField::Jmj && key.as_str() < JMJ_HENTAIGANA_START;
            return Ok(unassigned.then_some(MjError::UnassignedJmj));
        }

        let entity = ctx.kage().entity_name();
        if let Some(entity) = entity.filter(|_| !ITAIJI_RE.is_match(name)) {
            if let Some(error) = self.check_entity(name, field, rows, entity) {
                return Ok(Some(error));
            }
        }

        let related_of = |glyph: &str| {
            ctx.dump
                .get(glyph)
                .map_or(NO_RELATED, |entry| entry.related.as_str())
        };
        let expected: BTreeSet<String> = self
            .names_in(rows, MjField::Ucs)
            .into_iter()
            .map(|ucs| {
                if ucs_codepoint(&ucs).is_some_and(is_unified) {
                    ucs
                } else {
                    // compatibility ideographs carry their unified counterpart
                    related_of(&ucs).to_string()
                }
            })
            .filter(|ucs| ucs != NO_RELATED)
            .collect();
        if expected.is_empty() {
            return Ok(None);
        }

        let mut related = ctx.glyph.related.as_str();
        if related == NO_RELATED {
            if let Some(entity) = entity {
                related = related_of(entity);
            }
        }
        if related == NO_RELATED {
            return Ok(Some(MjError::MissingRelated { expected }));
        }
        if !expected.contains(related) {
            return Ok(Some(MjError::WrongRelated {
                related: related.to_string(),
                expected,
            }));
        }
        Ok(None)
    }
}
