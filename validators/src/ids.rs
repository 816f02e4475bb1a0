//! Layout of the first part of IDS-named glyphs.
//!
//! A glyph named after an ideographic description sequence should quote its
//! parts in the order the sequence lists them, each laid out the way its
//! operator demands: `⿰` wants a left part (henka `01`) first, `⿱` a top
//! part (`03`), the surround operators an outer part.

use gwv_core::filters::category_in;
use gwv_core::{Category, ErrorKind, KageLine, LineRef, Predicate, Result, Row, Rule, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::names::henka_code;

static IDC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^u2ff[\dab]$").unwrap());

const LEFT_RIGHT: [&str; 2] = ["u2ff0", "u2ff2"];
const TOP_BOTTOM: [&str; 2] = ["u2ff1", "u2ff3"];
const SURROUND: [&str; 7] = ["u2ff4", "u2ff5", "u2ff6", "u2ff7", "u2ff8", "u2ff9", "u2ffa"];
const OVERLAP: &str = "u2ffb";

/// Widest a part can be laid out before it reads as a full-width one.
const FULL_SPAN: i64 = 175;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdsKind {
    /// 左右のIDSだが最初が上下の部品
    FirstPartTopBottomInLeftRight,
    /// 左右のIDSだが右部品が最初
    FirstPartRightInLeftRight,
    /// 左右のIDSだが左の字が最初でない
    LeftPartNotFirst,
    /// 左右のIDSだが最初の部品が横長の配置
    FirstPartLandscapeInLeftRight,
    /// 上下のIDSだが最初が左右の部品
    FirstPartLeftRightInTopBottom,
    /// 上下のIDSだが下部品が最初
    FirstPartBottomInTopBottom,
    /// 上下のIDSだが上の字が最初でない
    TopPartNotFirst,
    /// 上下のIDSだが最初の部品が縦長の配置
    FirstPartPortraitInTopBottom,
    /// 囲むIDSだが内側部品が最初
    FirstPartInnerInSurround,
    /// 囲むIDSだが外の字が最初でない
    OuterPartNotFirst,
    /// 重ねIDSだが最初の字が最初でない
    FirstPartNotFirstInOverlap,
    /// 未定義のIDC
    UnknownIdc,
}

impl IdsKind {
    pub fn code(self) -> &'static str {
        match self {
            IdsKind::FirstPartTopBottomInLeftRight => "1",
            IdsKind::FirstPartRightInLeftRight => "2",
            IdsKind::LeftPartNotFirst => "3",
            IdsKind::FirstPartLandscapeInLeftRight => "6",
            IdsKind::FirstPartLeftRightInTopBottom => "10",
            IdsKind::FirstPartBottomInTopBottom => "12",
            IdsKind::TopPartNotFirst => "13",
            IdsKind::FirstPartPortraitInTopBottom => "15",
            IdsKind::FirstPartInnerInSurround => "22",
            IdsKind::OuterPartNotFirst => "23",
            IdsKind::FirstPartNotFirstInOverlap => "33",
            IdsKind::UnknownIdc => "90",
        }
    }
}

/// What a finding points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdsDetail {
    /// A quoted part name, or the unknown operator
    Name(String),
    Line(LineRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdsError {
    pub kind: IdsKind,
    pub detail: IdsDetail,
}

impl IdsError {
    fn name(kind: IdsKind, name: &str) -> Self {
        Self {
            kind,
            detail: IdsDetail::Name(name.to_string()),
        }
    }

    fn line(kind: IdsKind, line: &KageLine) -> Self {
        Self {
            kind,
            detail: IdsDetail::Line(line.into()),
        }
    }
}

impl ErrorKind for IdsError {
    fn code(&self) -> &'static str {
        self.kind.code()
    }

    fn payload(&self) -> Row {
        match &self.detail {
            IdsDetail::Name(name) => vec![Value::from(name.as_str())],
            IdsDetail::Line(line) => vec![line.value()],
        }
    }
}

/// The part quote drawing the first character of the sequence, if any.
fn first_character_quote<'k>(tokens: &[&str], lines: &'k [KageLine]) -> Option<&'k KageLine> {
    let i = tokens.iter().position(|t| !IDC_RE.is_match(t))?;
    let mut first = tokens[i].to_string();
    if first == "cdp" {
        if let Some(code) = tokens.get(i + 1) {
            first = format!("cdp-{code}");
        }
    }
    lines.iter().find(|line| {
        line.is_part_quote() && line.part_name().is_some_and(|name| name.starts_with(&first))
    })
}

fn not_first(kind: IdsKind, tokens: &[&str], lines: &[KageLine]) -> Option<IdsError> {
    first_character_quote(tokens, lines)
        .filter(|line| line.line_number != 0)
        .map(|line| IdsError::line(kind, line))
}

#[derive(Debug, Default)]
pub struct Ids;

impl Rule for Ids {
    type Error = IdsError;
    const NAME: &'static str = "ids";

    fn filter(&self) -> Predicate {
        category_in(&[Category::Ids])
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<IdsError>> {
        use IdsKind::*;

        let kage = ctx.entity().kage();
        let lines = &kage.lines;
        let Some(first) = lines.first() else {
            return Ok(None);
        };
        if !(first.is_part_quote() && lines.len() > 1) {
            return Ok(None);
        }
        let f = first.ints(3, 7)?;
        let (width, height) = (f[2] - f[0], f[3] - f[1]);
        let aspect = if height == 0 {
            f64::INFINITY
        } else {
            (width as f64 / height as f64).abs()
        };
        let part = first.part_name().unwrap_or_default();
        let henka = henka_code(part);
        let is = |codes: &[&str]| henka.is_some_and(|h| codes.contains(&h));

        let tokens: Vec<&str> = ctx.name().split('-').collect();
        let idc = tokens[0];
        let second = tokens.get(1).copied().unwrap_or_default();
        // ⿰⿱... or ⿱⿰...: the first part's proportions are unpredictable
        let nested = (LEFT_RIGHT.contains(&second) && TOP_BOTTOM.contains(&idc))
            || (TOP_BOTTOM.contains(&second) && LEFT_RIGHT.contains(&idc));

        let error = if LEFT_RIGHT.contains(&idc) {
            if is(&["03", "04", "09", "14", "24"]) && width > FULL_SPAN {
                Some(IdsError::name(FirstPartTopBottomInLeftRight, part))
            } else if is(&["02"]) {
                Some(IdsError::name(FirstPartRightInLeftRight, part))
            } else if !nested && !is(&["01", "08"]) && aspect > 1.8 {
                Some(IdsError::line(FirstPartLandscapeInLeftRight, first))
            } else {
                not_first(LeftPartNotFirst, &tokens, lines)
            }
        } else if TOP_BOTTOM.contains(&idc) {
            if is(&["01", "02", "08"]) && height > FULL_SPAN {
                Some(IdsError::name(FirstPartLeftRightInTopBottom, part))
            } else if is(&["04", "14", "24"]) {
                Some(IdsError::name(FirstPartBottomInTopBottom, part))
            } else if !nested && !is(&["03", "09"]) && aspect < 0.65 {
                Some(IdsError::line(FirstPartPortraitInTopBottom, first))
            } else {
                not_first(TopPartNotFirst, &tokens, lines)
            }
        } else if SURROUND.contains(&idc) {
            if is(&["02", "06", "07"]) {
                Some(IdsError::name(FirstPartInnerInSurround, part))
            } else {
                not_first(OuterPartNotFirst, &tokens, lines)
            }
        } else if idc == OVERLAP {
            not_first(FirstPartNotFirstInOverlap, &tokens, lines)
        } else {
            Some(IdsError::name(UnknownIdc, idc))
        };
        Ok(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    fn check(name: &str, data: &str) -> Option<IdsError> {
        let dump = Dump::from_entries([(name, "u3013", data)], 0.0);
        let ctx = ValidatorContext::for_glyph(&dump, dump.get(name).unwrap());
        Ids.is_invalid(&ctx).unwrap()
    }

    #[test]
    fn bottom_part_first_in_left_right() {
        let data = "99:0:0:0:0:200:200:u4e00-04$99:0:0:100:0:200:200:u4e01-02";
        assert_eq!(
            check("u2ff0-u4e00-u4e01", data),
            Some(IdsError::name(
                IdsKind::FirstPartTopBottomInLeftRight,
                "u4e00-04"
            ))
        );
    }

    #[test]
    fn well_ordered_left_right() {
        let data = "99:0:0:0:0:100:200:u4e00-01$99:0:0:100:0:200:200:u4e01-02";
        assert_eq!(check("u2ff0-u4e00-u4e01", data), None);
    }

    #[test]
    fn right_part_first() {
        let data = "99:0:0:100:0:200:200:u4e01-02$99:0:0:0:0:100:200:u4e00-01";
        assert_eq!(
            check("u2ff0-u4e00-u4e01", data).map(|e| e.kind),
            Some(IdsKind::FirstPartRightInLeftRight)
        );
    }

    #[test]
    fn landscape_first_part() {
        let data = "99:0:0:0:0:200:100:u4e00$99:0:0:100:0:200:200:u4e01-02";
        assert_eq!(
            check("u2ff0-u4e00-u4e01", data).map(|e| e.kind),
            Some(IdsKind::FirstPartLandscapeInLeftRight)
        );
        // nested operators make the proportions unpredictable
        assert_eq!(
            check("u2ff0-u2ff1-u4e00-u4e02-u4e01", data),
            None
        );
    }

    #[test]
    fn first_character_not_first() {
        let data = "99:0:0:0:0:200:200:u5f73-01$99:0:0:0:0:200:200:u4e00-01$1:0:0:10:10:190:10";
        let err = check("u2ff0-u4e00-u4e01", data).unwrap();
        assert_eq!(err.kind, IdsKind::LeftPartNotFirst);
        assert!(matches!(err.detail, IdsDetail::Line(LineRef { number: 1, .. })));
    }

    #[test]
    fn top_bottom_and_surround() {
        let data = "99:0:0:0:0:200:200:u4e00-04$99:0:0:0:100:200:200:u4e01";
        assert_eq!(
            check("u2ff1-u4e00-u4e01", data).map(|e| e.kind),
            Some(IdsKind::FirstPartBottomInTopBottom)
        );
        let data = "99:0:0:0:0:200:200:u56d7-06$99:0:0:0:0:200:200:u4e00";
        assert_eq!(
            check("u2ff4-u56d7-u4e00", data).map(|e| e.kind),
            Some(IdsKind::FirstPartInnerInSurround)
        );
    }

    #[test]
    fn unknown_operator() {
        let data = "99:0:0:0:0:200:200:u4e00$99:0:0:0:0:200:200:u4e01";
        assert_eq!(
            check("u2ffc-u4e00-u4e01", data),
            Some(IdsError::name(IdsKind::UnknownIdc, "u2ffc"))
        );
    }

    #[test]
    fn alias_is_checked_through_its_entity() {
        let dump = Dump::from_entries(
            [
                ("u2ff0-u4e00-u4e01", "u3013", "99:0:0:0:0:200:200:u4e02"),
                ("u4e02", "u3013", "99:0:0:100:0:200:200:u4e01-02$99:0:0:0:0:100:200:u4e00-01"),
            ],
            0.0,
        );
        let ctx = ValidatorContext::for_glyph(&dump, dump.get("u2ff0-u4e00-u4e01").unwrap());
        assert_eq!(
            Ids.is_invalid(&ctx).unwrap().map(|e| e.kind),
            Some(IdsKind::FirstPartRightInLeftRight)
        );
    }
}
