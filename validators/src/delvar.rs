//! Variants whose base glyph is gone.

use gwv_core::filters::category_in;
use gwv_core::{Category, ErrorKind, Predicate, Result, Row, Rule, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::names::REGIONS;

static NUMBERED_VARIANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+)-(?:(?:var|itaiji)-\d{3}|\d{2})$").unwrap());
static SOURCE_HENKA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^(u[0-9a-f]{{4,5}}-{REGIONS})\d{{2}}$")).unwrap());
static OTHER_VARIANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(u[0-9a-f]{4,5}|cdp[on]?-[0-9a-f]{4})-").unwrap());

const VARIANT_CATEGORIES: &[Category] = &[
    Category::Ids,
    Category::UnifiedVariant,
    Category::CompatibilityVariant,
    Category::NonKanjiUcsVariant,
    Category::Cdp,
    Category::Other,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseNotFoundError {
    pub base: String,
}

impl ErrorKind for BaseNotFoundError {
    fn code(&self) -> &'static str {
        "0"
    }

    fn payload(&self) -> Row {
        vec![Value::from(self.base.as_str())]
    }
}

/// Name the variant `name` derives from.
pub fn base_name(name: &str) -> Option<&str> {
    [&NUMBERED_VARIANT_RE, &SOURCE_HENKA_RE, &OTHER_VARIANT_RE]
        .into_iter()
        .find_map(|re| re.captures(name))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Default)]
pub struct DelVar;

impl Rule for DelVar {
    type Error = BaseNotFoundError;
    const NAME: &'static str = "delvar";

    fn filter(&self) -> Predicate {
        category_in(VARIANT_CATEGORIES)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<BaseNotFoundError>> {
        Ok(base_name(ctx.name())
            .filter(|base| !ctx.dump.contains(base))
            .map(|base| BaseNotFoundError {
                base: base.to_string(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    #[test]
    fn base_names() {
        assert_eq!(base_name("u4e00-var-001"), Some("u4e00"));
        assert_eq!(base_name("u4e00-j-itaiji-002"), Some("u4e00-j"));
        assert_eq!(base_name("u4e00-01"), Some("u4e00"));
        assert_eq!(base_name("u4e00-g04"), Some("u4e00-g"));
        assert_eq!(base_name("u4e00-jv"), Some("u4e00"));
        assert_eq!(base_name("cdp-8dc1-01"), Some("cdp-8dc1"));
        assert_eq!(base_name("u4e00"), None);
    }

    #[test]
    fn missing_base() {
        let dump = Dump::from_entries(
            [
                ("u4e00-var-001", "u3013", "1:0:0:10:100:190:100"),
                ("u4e01", "u3013", "1:0:0:10:100:190:100"),
                ("u4e01-g", "u3013", "99:0:0:0:0:200:200:u4e01"),
            ],
            0.0,
        );
        let ctx = ValidatorContext::for_glyph(&dump, dump.get("u4e00-var-001").unwrap());
        assert_eq!(
            DelVar.is_invalid(&ctx).unwrap(),
            Some(BaseNotFoundError {
                base: "u4e00".into()
            })
        );
        let ctx = ValidatorContext::for_glyph(&dump, dump.get("u4e01-g").unwrap());
        assert_eq!(DelVar.is_invalid(&ctx).unwrap(), None);
    }
}
