//! Aliases among UCS-named glyphs.

use gwv_core::filters::{categories, category_in};
use gwv_core::{ErrorKind, Predicate, Result, Row, Rule, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static SOURCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[gtvhmi]|j[asv]?|k[pv]?|us?)$").unwrap());
static UCS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^u[\da-f]+(?:-|$)").unwrap());
static IDS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:u2ff[\da-f]|u31ef)-").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UcsAliasError {
    /// uxxxx aliases something that is not a UCS glyph (or an IDS)
    NonUcsEntity { entity: String },
    /// uxxxx-g aliases uxxxx
    RegionAliasesBase,
    /// uxxxx-var-nnn aliases (the entity of) uxxxx
    VarAliasesBase { entity: String },
    /// uxxxx aliases uxxxx-var-nnn
    BaseAliasesVar { entity: String },
    /// uxxxx-itaiji-nnn aliases (the entity of) uxxxx
    ItaijiAliasesBase { entity: String },
    /// uxxxx aliases uxxxx-itaiji-nnn
    BaseAliasesItaiji { entity: String },
}

impl ErrorKind for UcsAliasError {
    fn code(&self) -> &'static str {
        match self {
            UcsAliasError::NonUcsEntity { .. } => "0",
            UcsAliasError::RegionAliasesBase => "1",
            UcsAliasError::VarAliasesBase { .. } => "10",
            UcsAliasError::BaseAliasesVar { .. } => "11",
            UcsAliasError::ItaijiAliasesBase { .. } => "20",
            UcsAliasError::BaseAliasesItaiji { .. } => "21",
        }
    }

    fn payload(&self) -> Row {
        match self {
            UcsAliasError::RegionAliasesBase => Vec::new(),
            UcsAliasError::NonUcsEntity { entity }
            | UcsAliasError::VarAliasesBase { entity }
            | UcsAliasError::BaseAliasesVar { entity }
            | UcsAliasError::ItaijiAliasesBase { entity }
            | UcsAliasError::BaseAliasesItaiji { entity } => vec![Value::from(entity.as_str())],
        }
    }
}

#[derive(Debug, Default)]
pub struct UcsAlias;

impl UcsAlias {
    fn check_suffixed(
        &self,
        ctx: &ValidatorContext<'_>,
        parts: &[&str],
        entity: &str,
    ) -> Option<UcsAliasError> {
        match parts {
            [base, kind, _] => {
                if *kind != "var" && *kind != "itaiji" {
                    return None;
                }
                if !ctx.dump.contains(base) {
                    return None;
                }
                if entity != ctx.dump.entity_name_of(base) {
                    return None;
                }
                let entity = entity.to_string();
                Some(if *kind == "var" {
                    UcsAliasError::VarAliasesBase { entity }
                } else {
                    UcsAliasError::ItaijiAliasesBase { entity }
                })
            }
            [base, region] if SOURCE_RE.is_match(region) => {
                (entity == *base).then_some(UcsAliasError::RegionAliasesBase)
            }
            _ => None,
        }
    }
}

impl Rule for UcsAlias {
    type Error = UcsAliasError;
    const NAME: &'static str = "ucsalias";

    fn filter(&self) -> Predicate {
        Predicate::IsAlias & category_in(categories::UCS)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<UcsAliasError>> {
        let Some(entity) = ctx.kage().entity_name() else {
            return Ok(None);
        };
        let name = ctx.name();
        if name.contains('-') {
            let parts: Vec<&str> = name.split('-').collect();
            return Ok(self.check_suffixed(ctx, &parts, entity));
        }

        if !UCS_RE.is_match(entity) || IDS_RE.is_match(entity) {
            if entity == "undefined" || entity.starts_with("extf-") {
                return Ok(None);
            }
            return Ok(Some(UcsAliasError::NonUcsEntity {
                entity: entity.to_string(),
            }));
        }

        let parts: Vec<&str> = entity.split('-').collect();
        if let [base, kind, _] = parts.as_slice() {
            if *base == name {
                let entity = entity.to_string();
                match *kind {
                    "var" => return Ok(Some(UcsAliasError::BaseAliasesVar { entity })),
                    "itaiji" => return Ok(Some(UcsAliasError::BaseAliasesItaiji { entity })),
                    _ => {}
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    fn check(entries: &[(&str, &str)], name: &str) -> Option<UcsAliasError> {
        let dump = Dump::from_entries(entries.iter().map(|(n, d)| (*n, "u3013", *d)), 0.0);
        let ctx = ValidatorContext::for_glyph(&dump, dump.get(name).unwrap());
        UcsAlias.is_invalid(&ctx).unwrap()
    }

    #[test]
    fn base_aliasing_non_ucs() {
        let entries = [("u4e00", "99:0:0:0:0:200:200:cdp-8dc1")];
        assert_eq!(
            check(&entries, "u4e00"),
            Some(UcsAliasError::NonUcsEntity {
                entity: "cdp-8dc1".into()
            })
        );
        let ids = [("u4e00", "99:0:0:0:0:200:200:u2ff0-u4e01-u4e02")];
        assert!(matches!(
            check(&ids, "u4e00"),
            Some(UcsAliasError::NonUcsEntity { .. })
        ));
        let undefined = [("u4e00", "99:0:0:0:0:200:200:undefined")];
        assert_eq!(check(&undefined, "u4e00"), None);
    }

    #[test]
    fn region_variant_aliasing_base() {
        let entries = [
            ("u4e00", "1:0:0:10:100:190:100"),
            ("u4e00-j", "99:0:0:0:0:200:200:u4e00"),
            ("u4e00-i", "99:0:0:0:0:200:200:u4e00"),
        ];
        assert_eq!(
            check(&entries, "u4e00-j"),
            Some(UcsAliasError::RegionAliasesBase)
        );
        assert_eq!(check(&entries, "u4e00-i"), Some(UcsAliasError::RegionAliasesBase));
    }

    #[test]
    fn var_and_itaiji() {
        let entries = [
            ("u4e00", "99:0:0:0:0:200:200:u4e00-g"),
            ("u4e00-g", "1:0:0:10:100:190:100"),
            ("u4e00-var-001", "99:0:0:0:0:200:200:u4e00-g"),
            ("u4e00-itaiji-001", "99:0:0:0:0:200:200:u4e00-g"),
            ("u4e01", "99:0:0:0:0:200:200:u4e01-var-001"),
            ("u4e01-var-001", "1:0:0:10:100:190:100"),
        ];
        assert_eq!(
            check(&entries, "u4e00-var-001"),
            Some(UcsAliasError::VarAliasesBase {
                entity: "u4e00-g".into()
            })
        );
        assert_eq!(
            check(&entries, "u4e00-itaiji-001").map(|e| e.code()),
            Some("20")
        );
        assert_eq!(
            check(&entries, "u4e01"),
            Some(UcsAliasError::BaseAliasesVar {
                entity: "u4e01-var-001".into()
            })
        );
    }
}
