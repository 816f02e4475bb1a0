//! Raw stroke-data text that is not in canonical form.
//!
//! The stroke parser is lenient (whitespace, floats, hex literals...), so a
//! glyph can render fine while its text is messy. This rule looks at the
//! raw text: every numeric column must be a plain canonical decimal.

use gwv_core::{ErrorKind, LineRef, Result, Row, Rule, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;

static VALID_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\da-z_:@-]+$").unwrap());

const PART_QUOTE: &str = "99";
const PART_NAME_COLUMN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumExpKind {
    /// 空行
    EmptyLine,
    /// 不正な文字
    IllegalCharacter,
    /// 整数として解釈できない
    NotAnInteger,
    /// 不正な数値の表現
    NonCanonical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumExpError {
    pub kind: NumExpKind,
    pub line: LineRef,
}

impl ErrorKind for NumExpError {
    fn code(&self) -> &'static str {
        match self.kind {
            NumExpKind::EmptyLine => "0",
            NumExpKind::IllegalCharacter => "1",
            NumExpKind::NotAnInteger => "2",
            NumExpKind::NonCanonical => "3",
        }
    }

    fn payload(&self) -> Row {
        vec![self.line.value()]
    }
}

/// Canonical decimal form of an integer literal (optional `-`, digits with
/// single `_` separators), or `None` if `col` is not one.
fn canonical_decimal(col: &str) -> Option<String> {
    let (negative, digits) = match col.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, col),
    };
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '_')
    {
        return None;
    }
    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    let trimmed = digits.trim_start_matches('0');
    Some(match (negative, trimmed.is_empty()) {
        (_, true) => "0".to_string(),
        (true, false) => format!("-{trimmed}"),
        (false, false) => trimmed.to_string(),
    })
}

fn check_line(text: &str) -> Option<NumExpKind> {
    if text.is_empty() {
        return Some(NumExpKind::EmptyLine);
    }
    if !VALID_CHARS_RE.is_match(text) {
        return Some(NumExpKind::IllegalCharacter);
    }
    let columns: Vec<&str> = text.split(':').collect();
    for (i, col) in columns.iter().enumerate() {
        if i == PART_NAME_COLUMN && columns[0] == PART_QUOTE {
            continue;
        }
        match canonical_decimal(col) {
            None => return Some(NumExpKind::NotAnInteger),
            Some(canonical) if canonical != *col => return Some(NumExpKind::NonCanonical),
            Some(_) => {}
        }
    }
    None
}

#[derive(Debug, Default)]
pub struct NumExp;

impl Rule for NumExp {
    type Error = NumExpError;
    const NAME: &'static str = "numexp";

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<NumExpError>> {
        for (number, text) in ctx.glyph.gdata.split('$').enumerate() {
            if let Some(kind) = check_line(text) {
                return Ok(Some(NumExpError {
                    kind,
                    line: LineRef {
                        number,
                        text: text.to_string(),
                    },
                }));
            }
        }
        Ok(None)
    }
}
