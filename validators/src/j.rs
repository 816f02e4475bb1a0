//! Japanese region variants: `-j`, `-ja`, `-jv` (and the source checks of
//! every other region suffix).
//!
//! A `-jv` glyph is a virtual Japanese form for a character without a J
//! source; it must not quote parts the Japanese glyph style replaces.

use std::sync::Arc;

use gwv_core::filters::category_in;
use gwv_core::refdata::{CjkSources, GlyphGroups, JvTable, SourceColumn, SOURCE_SEPARATION};
use gwv_core::{Category, ErrorKind, KageData, Predicate, ReferenceData, Result, Row, Rule, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::names::REGIONS;

static REGION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({REGIONS})(\d{{2}})?$")).unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JError {
    /// uxxxx-j, ja, jv (の実体)と無印(の実体)が違う
    EntityDiffers,
    /// uxxxx-jv と uxxxx-j(a) が共存している
    Coexists { region: &'static str },
    /// -jvに使わない字形の部品が使用されている
    JvPart { part: String, replacement: String },
    /// ソースが存在しない地域指定
    NoSource,
    /// 原規格分離-jv
    SourceSeparated,
    /// Jソースがあるのにjv
    JvWithJSource { source: String },
    /// Kソースがあるのにkv
    KvWithKSource { source: String },
}

impl ErrorKind for JError {
    fn code(&self) -> &'static str {
        match self {
            JError::EntityDiffers => "0",
            JError::Coexists { .. } => "1",
            JError::JvPart { .. } => "2",
            JError::NoSource => "4",
            JError::SourceSeparated => "5",
            JError::JvWithJSource { .. } => "30",
            JError::KvWithKSource { .. } => "31",
        }
    }

    fn payload(&self) -> Row {
        match self {
            JError::EntityDiffers | JError::NoSource | JError::SourceSeparated => Vec::new(),
            JError::Coexists { region } => vec![Value::from(*region)],
            JError::JvPart { part, replacement } => {
                vec![Value::from(part.as_str()), Value::from(replacement.as_str())]
            }
            JError::JvWithJSource { source } | JError::KvWithKSource { source } => {
                vec![Value::from(source.as_str())]
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct J {
    sources: Arc<CjkSources>,
    jv: Arc<JvTable>,
    groups: Arc<GlyphGroups>,
}

impl J {
    pub fn new(data: &ReferenceData) -> Self {
        Self {
            sources: Arc::clone(&data.cjk_sources),
            jv: Arc::clone(&data.jv),
            groups: Arc::clone(&data.groups),
        }
    }

    /// First quoted part that `-jv` glyphs replace, unless one of the
    /// parts opts the glyph out of the substitutions.
    fn check_jv(&self, kage: &KageData) -> Option<JError> {
        let parts: Vec<&str> = kage.quotes().filter_map(|l| l.part_base_name()).collect();
        if parts.iter().any(|part| self.jv.is_exempt(part)) {
            return None;
        }
        parts.into_iter().find_map(|part| {
            self.jv.replacement(part).map(|replacement| JError::JvPart {
                part: part.to_string(),
                replacement: replacement.to_string(),
            })
        })
    }

    /// Region suffix against the sources of the character.
    fn check_source(&self, ucs: &str, region: &str, jsource: Option<&str>) -> Option<JError> {
        match region {
            "jv" => {
                if let Some(source) = jsource {
                    return Some(JError::JvWithJSource {
                        source: source.to_string(),
                    });
                }
                self.groups
                    .contains(SOURCE_SEPARATION, ucs)
                    .then_some(JError::SourceSeparated)
            }
            "kv" => self
                .sources
                .get(ucs, SourceColumn::K)
                .map(|source| JError::KvWithKSource {
                    source: source.to_string(),
                }),
            "j" | "ja" => jsource.is_none().then_some(JError::NoSource),
            _ => {
                let column = SourceColumn::for_region(region)?;
                self.sources
                    .get(ucs, column)
                    .is_none()
                    .then_some(JError::NoSource)
            }
        }
    }
}

impl Rule for J {
    type Error = JError;
    const NAME: &'static str = "j";

    fn filter(&self) -> Predicate {
        category_in(&[
            Category::Unified,
            Category::UnifiedVariant,
            Category::CompatibilityVariant,
            Category::Ext,
        ])
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<JError>> {
        // TODO: check -jv of extension glyphs once cjksrc.json covers them
        if ctx.category == Category::Ext {
            return Ok(None);
        }
        let name = ctx.name();
        let split: Vec<&str> = name.split('-').collect();
        let (ucs, suffix) = match split.as_slice() {
            [ucs] => (*ucs, None),
            [ucs, suffix] => (*ucs, Some(*suffix)),
            _ => return Ok(None),
        };
        let jsource = self.sources.get(ucs, SourceColumn::J);

        let Some(suffix) = suffix else {
            if jsource.is_none() && !self.jv.is_exempt(ucs) {
                return Ok(self.check_jv(ctx.kage()));
            }
            return Ok(None);
        };

        let Some(caps) = REGION_RE.captures(suffix) else {
            return Ok(None);
        };
        let region = caps.get(1).map_or("", |m| m.as_str());
        let is_henka = caps.get(2).is_some();

        if let Some(error) = self.check_source(ucs, region, jsource) {
            return Ok(Some(error));
        }
        if !matches!(region, "j" | "ja" | "jv") {
            return Ok(None);
        }

        if !ctx.dump.contains(ucs) {
            return Ok(None);
        }
        let entity = ctx.kage().entity_name().unwrap_or(name);
        if entity != ctx.dump.entity_name_of(ucs) && !is_henka {
            return Ok(Some(JError::EntityDiffers));
        }

        if region != "jv" {
            return Ok(None);
        }
        for other in ["j", "ja"] {
            if ctx.dump.contains(&format!("{ucs}-{other}")) {
                return Ok(Some(JError::Coexists { region: other }));
            }
        }
        if self.jv.is_exempt(ucs) {
            return Ok(None);
        }
        if ctx.is_alias() && ctx.entity_missing() {
            return Ok(None);
        }
        Ok(self.check_jv(ctx.entity().kage()))
    }
}
