//! Glyph-name fragments shared by several rules.

use once_cell::sync::Lazy;
use regex::Regex;

/// Region codes of region-coded variant names (`-g`, `-kp`, `-jv`, ...).
pub const REGIONS: &str = r"(?:[gtvhmi]|k[pv]?|us?|j[asv]?)";

/// Two-digit henka (radical-position) code with an optional region and
/// variant suffix, anchored at the end of the name or at `@`.
static HENKA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"-{REGIONS}?(\d{{2}})(?:-(?:var|itaiji)-\d{{3}})?(?:@|$)"
    ))
    .unwrap()
});

/// The henka code of a quoted part name: `01` left, `02` right, `03` top,
/// `04` bottom, ...
pub fn henka_code(name: &str) -> Option<&str> {
    HENKA_RE
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Head of a dash-separated name.
pub fn head(name: &str) -> &str {
    name.split('-').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn henka_codes() {
        assert_eq!(henka_code("u4e00-01"), Some("01"));
        assert_eq!(henka_code("u4e00-j04"), Some("04"));
        assert_eq!(henka_code("u4e00-kp02-var-001"), Some("02"));
        assert_eq!(henka_code("u4e00-03@5"), Some("03"));
        assert_eq!(henka_code("u4e00-j"), None);
        assert_eq!(henka_code("u4e00-var-001"), None);
    }
}
