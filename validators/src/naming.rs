//! Glyph naming rules.
//!
//! Names are checked against the rule groups of `naming.json`. IDS names are
//! instead reduced operator by operator until a single character remains.

use std::sync::Arc;

use ahash::AHashMap;
use gwv_core::filters::{categories, category_in};
use gwv_core::refdata::{NamingData, UCS_ENCODED_CDP};
use gwv_core::{ErrorKind, Predicate, ReferenceData, Result, Row, Rule, ValidatorContext, NO_RELATED};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(?:var|itaiji)-\d{3}$").unwrap());
static HENKA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\d{2}$").unwrap());

static GL_GLYPH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:j78|j83|j90|jsp|jx1-200[04]|jx2|k0|g0|c[0-9a-f])-[\da-f]{4}$").unwrap()
});
static VALID_GL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:2[1-9a-f]|[3-6][\da-f]|7[\da-e]){2}$").unwrap());

static CDP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bcdp([on]?)-([\da-f]{4})\b").unwrap());
static VALID_CDP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:8[1-9a-f]|9[\da-f]|a0|c[67])(?:a[1-9a-f]|[4-6b-e][\da-f]|[7f][\da-e])$")
        .unwrap()
});

static IDS_HEAD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:kumimoji|u2ff[\da-f]|u31ef)-").unwrap());
static UNARY_IDC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bu2ff[ef]\b").unwrap());
static BINARY_IDC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:u2ff[014-9a-d]|u31ef)\b").unwrap());
static TERNARY_IDC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bu2ff[23]\b").unwrap());
static KANJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:u[23]?[\da-f]{4}(?:-u(?:e01[\da-f]{2}|fe0[\da-f]))?|cdp[on]?-[\da-f]{4})\b")
        .unwrap()
});
static REDUCIBLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"１-漢|２-漢-漢|３-漢-漢-漢").unwrap());
static UCS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bu[23]?[\da-f]{4}\b").unwrap());

const KANJI: &str = "漢";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// 命名規則違反
    RuleViolation,
    /// 不正なIDS
    InvalidIds { reduced: String },
    /// 禁止されたグリフ名
    Prohibited,
    /// UCSで符号化済みのCDP外字
    EncodedCdpInIds { cdp: String, ucs: String },
    /// 廃止予定の命名規則
    DeprecatedRule,
    /// IDSに〓
    PlaceholderInIds { ucs: String },
    /// IDSに私用領域
    PrivateUseInIds { ucs: String },
}

impl ErrorKind for NamingError {
    fn code(&self) -> &'static str {
        match self {
            NamingError::RuleViolation => "0",
            NamingError::InvalidIds { .. } => "1",
            NamingError::Prohibited => "2",
            NamingError::EncodedCdpInIds { .. } => "3",
            NamingError::DeprecatedRule => "4",
            NamingError::PlaceholderInIds { .. } => "5",
            NamingError::PrivateUseInIds { .. } => "6",
        }
    }

    fn payload(&self) -> Row {
        match self {
            NamingError::RuleViolation | NamingError::Prohibited | NamingError::DeprecatedRule => {
                Vec::new()
            }
            NamingError::InvalidIds { reduced } => vec![Value::from(reduced.as_str())],
            NamingError::EncodedCdpInIds { cdp, ucs } => {
                vec![Value::from(cdp.as_str()), Value::from(ucs.as_str())]
            }
            NamingError::PlaceholderInIds { ucs } | NamingError::PrivateUseInIds { ucs } => {
                vec![Value::from(ucs.as_str())]
            }
        }
    }
}

/// Reduce an IDS name: operators become their arity, characters become 漢,
/// then every operator applied to enough characters collapses into one.
/// A well-formed sequence reduces to a single 漢.
pub fn reduce_ids(name: &str) -> String {
    let name = name.strip_prefix("kumimoji-").unwrap_or(name);
    let reduced = UNARY_IDC_RE.replace_all(name, "１");
    let reduced = BINARY_IDC_RE.replace_all(&reduced, "２");
    let reduced = TERNARY_IDC_RE.replace_all(&reduced, "３");
    let mut reduced = KANJI_RE.replace_all(&reduced, KANJI).into_owned();
    while REDUCIBLE_RE.is_match(&reduced) {
        reduced = REDUCIBLE_RE.replace_all(&reduced, KANJI).into_owned();
    }
    reduced
}

/// Strips `-var-nnn` / `-itaiji-nnn` and then a henka suffix.
fn strip_suffixes(name: &str) -> (&str, bool, bool) {
    let (name, is_var) = match VAR_RE.find(name) {
        Some(m) => (&name[..m.start()], true),
        None => (name, false),
    };
    let (name, is_henka) = match HENKA_RE.find(name) {
        Some(m) => (&name[..m.start()], true),
        None => (name, false),
    };
    (name, is_var, is_henka)
}

fn is_private_use(ucs: &str) -> bool {
    ("ue000"..="uf8ff").contains(&ucs)
}

#[derive(Debug, Default)]
pub struct Naming {
    rules: Arc<NamingData>,
    /// CDP glyph name to the UCS codepoint it was encoded as
    encoded_cdp: AHashMap<String, String>,
}

impl Naming {
    pub fn new(data: &ReferenceData) -> Self {
        Self {
            rules: Arc::clone(&data.naming),
            encoded_cdp: data.groups.pairs(UCS_ENCODED_CDP),
        }
    }

    fn check_ids(&self, name: &str) -> Option<NamingError> {
        let reduced = reduce_ids(name);
        if reduced != KANJI {
            return Some(NamingError::InvalidIds { reduced });
        }

        for caps in CDP_RE.captures_iter(name) {
            let mut cdp = caps[0].to_string();
            if !caps[1].is_empty() && !self.encoded_cdp.contains_key(&cdp) {
                cdp = format!("cdp-{}", &caps[2]);
            }
            if let Some(ucs) = self.encoded_cdp.get(&cdp) {
                return Some(NamingError::EncodedCdpInIds {
                    ucs: ucs.clone(),
                    cdp,
                });
            }
        }

        UCS_RE.find_iter(name).find_map(|m| {
            let ucs = m.as_str().to_string();
            if m.as_str() == NO_RELATED {
                Some(NamingError::PlaceholderInIds { ucs })
            } else if is_private_use(m.as_str()) {
                Some(NamingError::PrivateUseInIds { ucs })
            } else {
                None
            }
        })
    }
}

impl Rule for Naming {
    type Error = NamingError;
    const NAME: &'static str = "naming";

    fn filter(&self) -> Predicate {
        !category_in(categories::USER_OWNED)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<NamingError>> {
        let (name, is_var, is_henka) = strip_suffixes(ctx.name());

        if self.rules.matches("dont-create", name) {
            return Ok(Some(NamingError::Prohibited));
        }
        if GL_GLYPH_RE.is_match(name) {
            let code = &name[name.len() - 4..];
            if !VALID_GL_RE.is_match(code) {
                return Ok(Some(NamingError::Prohibited));
            }
        } else if CDP_RE
            .captures_iter(name)
            .any(|caps| !VALID_CDP_RE.is_match(&caps[2]))
        {
            return Ok(Some(NamingError::Prohibited));
        }

        if IDS_HEAD_RE.is_match(name) {
            return Ok(self.check_ids(name));
        }

        let allowed = self.rules.matches("rule", name)
            || (!is_var && self.rules.matches("rule-novar", name))
            || (!is_henka && self.rules.matches("rule-nohenka", name))
            || (!is_var && !is_henka && self.rules.matches("rule-novar-nohenka", name));
        if allowed {
            return Ok(None);
        }
        if self.rules.matches("deprecated-rule", name) {
            return Ok(Some(NamingError::DeprecatedRule));
        }
        Ok(Some(NamingError::RuleViolation))
    }
}
