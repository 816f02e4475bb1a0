//! Related-character field of UCS-named kanji.
//!
//! The related character of `uXXXX[-...]` is `uXXXX` itself; for a
//! compatibility ideograph it is the unified ideograph it decomposes to.
//! Aliases must also point at an entity carrying the same relation.

use std::sync::Arc;

use gwv_core::category::{is_compatibility, is_unified, ucs_codepoint};
use gwv_core::filters::category_in;
use gwv_core::refdata::{CjkSources, SourceColumn};
use gwv_core::{Category, ErrorKind, Predicate, Result, Row, Rule, ValidatorContext, NO_RELATED};
use serde_json::Value;

use crate::names::head;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelatedError {
    /// 間違った関連字
    Wrong { related: String, expected: String },
    /// 関連字なし
    Missing { expected: String },
    /// 実体が存在しない
    EntityMissing { entity: String },
    /// 実体の関連字が違う
    EntityWrong {
        entity: String,
        related: String,
        expected: String,
    },
    /// 実体が関連字なし
    EntityUnrelated { entity: String, expected: String },
}

impl ErrorKind for RelatedError {
    fn code(&self) -> &'static str {
        match self {
            RelatedError::Wrong { .. } => "0",
            RelatedError::Missing { .. } => "1",
            RelatedError::EntityMissing { .. } => "2",
            RelatedError::EntityWrong { .. } => "10",
            RelatedError::EntityUnrelated { .. } => "11",
        }
    }

    fn payload(&self) -> Row {
        let fields: Vec<&String> = match self {
            RelatedError::Wrong { related, expected } => vec![related, expected],
            RelatedError::Missing { expected } => vec![expected],
            RelatedError::EntityMissing { entity } => vec![entity],
            RelatedError::EntityWrong {
                entity,
                related,
                expected,
            } => vec![entity, related, expected],
            RelatedError::EntityUnrelated { entity, expected } => vec![entity, expected],
        };
        fields.into_iter().map(|s| Value::from(s.as_str())).collect()
    }
}

const CATEGORIES: &[Category] = &[
    Category::Unified,
    Category::UnifiedVariant,
    Category::Compatibility,
    Category::CompatibilityVariant,
];

#[derive(Debug, Default)]
pub struct Related {
    sources: Arc<CjkSources>,
}

impl Related {
    pub fn new(sources: Arc<CjkSources>) -> Self {
        Self { sources }
    }

    /// Related character expected for `name`, or `None` when a
    /// compatibility ideograph has no known decomposition.
    fn expected(&self, name: &str) -> Option<String> {
        let header = head(name);
        if !ucs_codepoint(header).is_some_and(is_compatibility) {
            return Some(header.to_string());
        }
        let unified = self
            .sources
            .get(header, SourceColumn::CompatibilityVariant)?;
        Some(format!("u{}", unified.get(2..)?.to_lowercase()))
    }
}

impl Rule for Related {
    type Error = RelatedError;
    const NAME: &'static str = "related";

    fn filter(&self) -> Predicate {
        category_in(CATEGORIES)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<RelatedError>> {
        let Some(expected) = self.expected(ctx.name()) else {
            return Ok(None);
        };
        let related = ctx.glyph.related.as_str();
        if related != NO_RELATED && related != expected {
            return Ok(Some(RelatedError::Wrong {
                related: related.to_string(),
                expected,
            }));
        }

        let Some(entity) = ctx.kage().entity_name() else {
            return Ok((related == NO_RELATED).then_some(RelatedError::Missing { expected }));
        };
        let entity_head = head(entity);
        if ucs_codepoint(entity_head).is_some_and(is_unified) || entity_head == "extf" {
            return Ok(None);
        }
        let Some(target) = ctx.dump.get(entity) else {
            return Ok(Some(RelatedError::EntityMissing {
                entity: entity.to_string(),
            }));
        };
        let entity = entity.to_string();
        if target.related == NO_RELATED {
            return Ok(Some(RelatedError::EntityUnrelated { entity, expected }));
        }
        if target.related != expected {
            return Ok(Some(RelatedError::EntityWrong {
                entity,
                related: target.related.clone(),
                expected,
            }));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    fn sources() -> Arc<CjkSources> {
        Arc::new(
            CjkSources::from_json(
                r#"{"uf900": [null, null, null, "K0-6B69", null, null, null, null, null, null, null, "U+8C48"]}"#,
            )
            .unwrap(),
        )
    }

    fn check(entries: &[(&str, &str, &str)], name: &str) -> Option<RelatedError> {
        let dump = Dump::from_entries(entries.iter().copied(), 0.0);
        let ctx = ValidatorContext::for_glyph(&dump, dump.get(name).unwrap());
        Related::new(sources()).is_invalid(&ctx).unwrap()
    }

    #[test]
    fn wrong_and_missing_relation() {
        let stroke = "1:0:0:10:100:190:100";
        assert_eq!(
            check(&[("u4e00-j", "u4e01", stroke)], "u4e00-j"),
            Some(RelatedError::Wrong {
                related: "u4e01".into(),
                expected: "u4e00".into()
            })
        );
        assert_eq!(
            check(&[("u4e00", "u3013", stroke)], "u4e00"),
            Some(RelatedError::Missing {
                expected: "u4e00".into()
            })
        );
        assert_eq!(check(&[("u4e00-t", "u4e00", stroke)], "u4e00-t"), None);
    }

    #[test]
    fn compatibility_ideograph_relates_to_its_decomposition() {
        let stroke = "1:0:0:10:100:190:100";
        assert_eq!(check(&[("uf900", "u8c48", stroke)], "uf900"), None);
        assert_eq!(
            check(&[("uf900", "uf900", stroke)], "uf900").map(|e| e.code()),
            Some("0")
        );
        // no known decomposition
        assert_eq!(check(&[("uf901", "u3013", stroke)], "uf901"), None);
    }

    #[test]
    fn alias_entity_relations() {
        let entries = [
            ("uf900", "u3013", "99:0:0:0:0:200:200:koseki-000010"),
            ("koseki-000010", "u3013", "1:0:0:10:100:190:100"),
            ("uf900-k", "u3013", "99:0:0:0:0:200:200:koseki-000020"),
            ("koseki-000020", "u8c49", "1:0:0:10:100:190:100"),
            ("uf900-t", "u3013", "99:0:0:0:0:200:200:nowhere"),
            ("uf900-j", "u3013", "99:0:0:0:0:200:200:u8c48"),
        ];
        assert_eq!(
            check(&entries, "uf900"),
            Some(RelatedError::EntityUnrelated {
                entity: "koseki-000010".into(),
                expected: "u8c48".into()
            })
        );
        assert_eq!(
            check(&entries, "uf900-k").map(|e| e.code()),
            Some("10")
        );
        assert_eq!(
            check(&entries, "uf900-t"),
            Some(RelatedError::EntityMissing {
                entity: "nowhere".into()
            })
        );
        // aliases of unified ideographs are fine
        assert_eq!(check(&entries, "uf900-j"), None);
    }
}
