//! toki-00xxxxxx glyphs should share their entity with koseki-xxxxxx.

use gwv_core::filters::category_in;
use gwv_core::{Category, ErrorKind, Predicate, Result, Row, Rule, ValidatorContext};
use serde_json::Value;

const TOKI_PREFIX: &str = "toki-00";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KosekiTokiError {
    /// Neither an alias nor the entity of the koseki glyph
    NotAlias,
    /// Not an alias of koseki-xxxxxx
    NotKosekiAlias { entity: String },
    /// Aliases a different entity than koseki-xxxxxx does
    EntityMismatch {
        entity: String,
        koseki_entity: String,
    },
}

impl ErrorKind for KosekiTokiError {
    fn code(&self) -> &'static str {
        match self {
            KosekiTokiError::NotAlias => "0",
            KosekiTokiError::NotKosekiAlias { .. } => "1",
            KosekiTokiError::EntityMismatch { .. } => "2",
        }
    }

    fn payload(&self) -> Row {
        match self {
            KosekiTokiError::NotAlias => Vec::new(),
            KosekiTokiError::NotKosekiAlias { entity } => vec![Value::from(entity.as_str())],
            KosekiTokiError::EntityMismatch {
                entity,
                koseki_entity,
            } => vec![
                Value::from(entity.as_str()),
                Value::from(koseki_entity.as_str()),
            ],
        }
    }
}

#[derive(Debug, Default)]
pub struct KosekiToki;

impl Rule for KosekiToki {
    type Error = KosekiTokiError;
    const NAME: &'static str = "kosekitoki";

    fn filter(&self) -> Predicate {
        category_in(&[Category::Toki])
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<KosekiTokiError>> {
        let name = ctx.name();
        let Some(number) = name.strip_prefix(TOKI_PREFIX) else {
            return Ok(None);
        };
        let koseki_name = format!("koseki-{number}");
        let koseki_entity = ctx
            .dump
            .get(&koseki_name)
            .and_then(|koseki| koseki.entity_name())
            .unwrap_or(koseki_name.as_str());

        let Some(entity) = ctx.kage().entity_name() else {
            return Ok((name != koseki_entity).then_some(KosekiTokiError::NotAlias));
        };
        if entity == koseki_entity {
            return Ok(None);
        }
        let entity = entity.to_string();
        Ok(Some(if koseki_entity == koseki_name {
            KosekiTokiError::NotKosekiAlias { entity }
        } else {
            KosekiTokiError::EntityMismatch {
                entity,
                koseki_entity: koseki_entity.to_string(),
            }
        }))
    }
}
