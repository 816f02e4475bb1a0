//! KAGE stroke data: a glyph is a `$`-separated list of stroke records, each
//! a `:`-separated list of columns.
//!
//! Numeric columns are decoded the way the KAGE engine reads them (through
//! `Math.floor`), so `"010"`, `"0x10"` and `"10.5"` are all integers here.
//! Text that cannot be read as a number is kept as `None` rather than
//! rejecting the whole glyph; rules that care report it themselves.

use crate::error::{Error, Result};

/// Prefix of the canonical alias record text.
pub const ALIAS_PREFIX: &str = "99:0:0:0:0:200:200:";

/// Canonical text of an intentionally blank glyph.
pub const BLANK_DATA: &str = "0:0:0:0";

/// Column index of the quoted glyph name in a part-quote record.
pub const PART_NAME_COLUMN: usize = 7;

/// Stroke record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeType {
    /// `0`: blank record, or a transform when the head code is 97, 98 or 99
    Blank,
    /// `1`: 直線
    Straight,
    /// `2`: 曲線
    Curve,
    /// `3`: 折れ
    Bent,
    /// `4`: 乙線
    Otsu,
    /// `6`: 複曲線
    DoubleCurve,
    /// `7`: 縦払い
    VerticalSlash,
    /// `9`: 部品位置 (obsolete)
    PartPosition,
    /// `99`: 部品引用
    PartQuote,
}

impl StrokeType {
    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => StrokeType::Blank,
            1 => StrokeType::Straight,
            2 => StrokeType::Curve,
            3 => StrokeType::Bent,
            4 => StrokeType::Otsu,
            6 => StrokeType::DoubleCurve,
            7 => StrokeType::VerticalSlash,
            9 => StrokeType::PartPosition,
            99 => StrokeType::PartQuote,
            _ => return None,
        })
    }

    pub fn code(self) -> i64 {
        match self {
            StrokeType::Blank => 0,
            StrokeType::Straight => 1,
            StrokeType::Curve => 2,
            StrokeType::Bent => 3,
            StrokeType::Otsu => 4,
            StrokeType::DoubleCurve => 6,
            StrokeType::VerticalSlash => 7,
            StrokeType::PartPosition => 9,
            StrokeType::PartQuote => 99,
        }
    }

    /// Expected column count, for the types that have exactly one.
    ///
    /// Part quotes accept 8 or 11 columns and blank records depend on the
    /// head code, so both return `None`.
    pub fn columns(self) -> Option<usize> {
        match self {
            StrokeType::Blank | StrokeType::PartQuote => None,
            StrokeType::Straight | StrokeType::PartPosition => Some(7),
            StrokeType::Curve | StrokeType::Bent | StrokeType::Otsu => Some(9),
            StrokeType::DoubleCurve | StrokeType::VerticalSlash => Some(11),
        }
    }
}

/// Head codes of type-0 records that transform the preceding strokes.
pub const TRANSFORM_HEADS: [i64; 3] = [97, 98, 99];

/// Decode a KAGE number.
///
/// Accepts surrounding whitespace, the empty string (0), decimal literals
/// with leading zeros, signed `0x`/`0o`/`0b` literals and floating literals,
/// which are floored. Returns `None` for anything else, including infinities
/// and NaN.
pub fn kage_int(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return Some(0);
    }
    parse_decimal(s)
        .or_else(|| parse_prefixed(s))
        .or_else(|| parse_floored(s))
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    }
}

/// Strip `_` digit separators, which are only legal between digits.
fn strip_separators(digits: &str, radix: u32, allow_leading: bool) -> Option<String> {
    if digits.is_empty() || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    if digits.starts_with('_') && !allow_leading {
        return None;
    }
    let cleaned: String = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(cleaned)
}

fn parse_decimal(s: &str) -> Option<i64> {
    let (negative, body) = split_sign(s);
    let digits = strip_separators(body, 10, false)?;
    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn parse_prefixed(s: &str) -> Option<i64> {
    let (negative, body) = split_sign(s);
    if body.len() < 2 || !body.starts_with('0') {
        return None;
    }
    let radix = match body.as_bytes()[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = strip_separators(&body[2..], radix, true)?;
    let value = i64::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

fn parse_floored(s: &str) -> Option<i64> {
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let floored = value.floor();
    if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return None;
    }
    Some(floored as i64)
}

/// `true` if the segment is horizontal enough to be treated as a 横画.
pub fn is_yoko(x0: i64, y0: i64, x1: i64, y1: i64) -> bool {
    if y0 == y1 && x0 != x1 {
        return true;
    }
    let dx = x1 - x0;
    let dy = y1 - y0;
    -dx < dy && dy < dx
}

/// One stroke record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KageLine {
    pub line_number: usize,
    pub strdata: String,
    values: Vec<Option<i64>>,
    part_name: Option<String>,
}

impl KageLine {
    pub fn parse(line_number: usize, data: &str) -> Self {
        let columns: Vec<&str> = data.split(':').collect();
        let is_quote = kage_int(columns[0]) == Some(StrokeType::PartQuote.code());
        let mut part_name = None;
        let values = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                if is_quote && i == PART_NAME_COLUMN {
                    part_name = Some((*col).to_string());
                    None
                } else {
                    kage_int(col)
                }
            })
            .collect();
        Self {
            line_number,
            strdata: data.to_string(),
            values,
            part_name,
        }
    }

    /// Raw stroke type code (`None` if unparseable).
    pub fn stroke_code(&self) -> Option<i64> {
        self.values[0]
    }

    pub fn kind(&self) -> Option<StrokeType> {
        self.stroke_code().and_then(StrokeType::from_code)
    }

    pub fn is_part_quote(&self) -> bool {
        self.kind() == Some(StrokeType::PartQuote)
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strdata.is_empty()
    }

    /// Numeric column, `None` when missing or unparseable.
    pub fn get(&self, column: usize) -> Option<i64> {
        self.values.get(column).copied().flatten()
    }

    /// Numeric column, failing when it is missing or unparseable.
    pub fn int(&self, column: usize) -> Result<i64> {
        match self.values.get(column) {
            None => Err(Error::MissingColumn {
                line: self.line_number,
                column,
            }),
            Some(None) => Err(Error::NotInteger {
                line: self.line_number,
                column,
            }),
            Some(Some(v)) => Ok(*v),
        }
    }

    /// Columns `start..end` as integers.
    pub fn ints(&self, start: usize, end: usize) -> Result<Vec<i64>> {
        (start..end).map(|i| self.int(i)).collect()
    }

    /// Index of the first numeric column that failed to parse.
    pub fn first_unparseable(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .position(|(i, v)| v.is_none() && !(self.part_name.is_some() && i == PART_NAME_COLUMN))
    }

    /// Decoded numeric columns; the part name column of a quote is `None`.
    pub fn values(&self) -> &[Option<i64>] {
        &self.values
    }

    /// Quoted glyph name including any `@revision`.
    pub fn part_name(&self) -> Option<&str> {
        self.part_name.as_deref()
    }

    /// Quoted glyph name without the `@revision` suffix.
    pub fn part_base_name(&self) -> Option<&str> {
        self.part_name
            .as_deref()
            .map(|name| name.split('@').next().unwrap_or(name))
    }

    /// `type:head:tail` prefix of the record text.
    pub fn shape_prefix(&self) -> String {
        self.strdata
            .splitn(4, ':')
            .take(3)
            .collect::<Vec<_>>()
            .join(":")
    }

    pub fn is_transform(&self) -> bool {
        self.kind() == Some(StrokeType::Blank)
            && self.get(1).is_some_and(|head| TRANSFORM_HEADS.contains(&head))
    }
}

/// Parsed stroke data of one glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KageData {
    pub lines: Vec<KageLine>,
}

impl KageData {
    pub fn parse(data: &str) -> Self {
        let lines = data
            .split('$')
            .enumerate()
            .map(|(i, line)| KageLine::parse(i, line))
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// A single part quote covering the whole 200×200 canvas.
    pub fn is_alias(&self) -> bool {
        if self.lines.len() != 1 {
            return false;
        }
        let line = &self.lines[0];
        line.is_part_quote()
            && line.len() > PART_NAME_COLUMN
            && (1..7)
                .map(|i| line.get(i))
                .eq([0, 0, 0, 0, 200, 200].into_iter().map(Some))
    }

    /// Quoted name of an alias, including any `@revision`.
    pub fn alias_target(&self) -> Option<&str> {
        if self.is_alias() {
            self.lines[0].part_name()
        } else {
            None
        }
    }

    /// Entity name of an alias: the quoted name without `@revision`.
    pub fn entity_name(&self) -> Option<&str> {
        if self.is_alias() {
            self.lines[0].part_base_name()
        } else {
            None
        }
    }

    /// A single type-0 record whose columns are all zero.
    pub fn is_blank(&self) -> bool {
        self.lines.len() == 1
            && self.lines[0].kind() == Some(StrokeType::Blank)
            && self.lines[0].values().iter().all(|v| *v == Some(0))
    }

    pub fn has_transform(&self) -> bool {
        self.lines.iter().any(KageLine::is_transform)
    }

    /// Part-quote records.
    pub fn quotes(&self) -> impl Iterator<Item = &KageLine> {
        self.lines.iter().filter(|line| line.is_part_quote())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kage_int_accepts_engine_literals() {
        assert_eq!(kage_int("42"), Some(42));
        assert_eq!(kage_int("010"), Some(10));
        assert_eq!(kage_int("-010"), Some(-10));
        assert_eq!(kage_int("10.24"), Some(10));
        assert_eq!(kage_int("-010.24"), Some(-11));
        assert_eq!(kage_int("  -010.24\t"), Some(-11));
        assert_eq!(kage_int("0x10"), Some(16));
        assert_eq!(kage_int(" \t -0x10\n \r"), Some(-16));
        assert_eq!(kage_int("0o10"), Some(8));
        assert_eq!(kage_int("0b10"), Some(2));
        assert_eq!(kage_int(""), Some(0));
        assert_eq!(kage_int(" "), Some(0));
        assert_eq!(kage_int(" -0 "), Some(0));
    }

    #[test]
    fn kage_int_rejects_garbage() {
        assert_eq!(kage_int("abc"), None);
        assert_eq!(kage_int("0b2"), None);
        assert_eq!(kage_int("0x10.24"), None);
        assert_eq!(kage_int("inf"), None);
        assert_eq!(kage_int("-inf"), None);
        assert_eq!(kage_int("nan"), None);
    }

    #[test]
    fn line_keeps_part_name_as_text() {
        let line = KageLine::parse(11, "99:0:0:0:0:200:200:u4e00@1");
        assert_eq!(line.kind(), Some(StrokeType::PartQuote));
        assert_eq!(line.part_name(), Some("u4e00@1"));
        assert_eq!(line.part_base_name(), Some("u4e00"));
        assert_eq!(line.get(6), Some(200));
        assert_eq!(line.get(7), None);
        assert_eq!(line.first_unparseable(), None);
    }

    #[test]
    fn line_with_mixed_literals() {
        let line = KageLine::parse(14, "0x63:: 0 :0x2:-0b0:abc:10.24:0:-99.12:0x10.24");
        assert_eq!(line.kind(), Some(StrokeType::PartQuote));
        assert_eq!(
            line.values(),
            &[
                Some(99),
                Some(0),
                Some(0),
                Some(2),
                Some(0),
                None,
                Some(10),
                None,
                Some(-100),
                None
            ]
        );
        assert_eq!(line.part_name(), Some("0"));
        assert_eq!(line.first_unparseable(), Some(5));
        assert!(line.int(5).is_err());
        assert!(line.int(10).is_err());
    }

    #[test]
    fn empty_line_is_blank_type() {
        let line = KageLine::parse(13, "");
        assert_eq!(line.values(), &[Some(0)]);
        assert_eq!(line.kind(), Some(StrokeType::Blank));
    }

    #[test]
    fn alias_detection() {
        let kage = KageData::parse("99:0:0:0:0:200:200:u4e00");
        assert!(kage.is_alias());
        assert_eq!(kage.entity_name(), Some("u4e00"));

        let kage = KageData::parse("99:0:0:0:0:200:200:u4e00@3");
        assert_eq!(kage.alias_target(), Some("u4e00@3"));
        assert_eq!(kage.entity_name(), Some("u4e00"));

        let kage = KageData::parse("99:0:0:0:0:200:190:u4e00");
        assert!(!kage.is_alias());

        let kage = KageData::parse("99:0:0:0:0:200:200:u4e00$1:0:0:10:10:20:10");
        assert!(!kage.is_alias());
        assert_eq!(kage.entity_name(), None);
    }

    #[test]
    fn blank_and_transform() {
        assert!(KageData::parse("0:0:0:0").is_blank());
        assert!(!KageData::parse("0:-1:-1:-1").is_blank());
        let kage = KageData::parse("1:0:0:10:10:190:10$0:98:0:0:0:200:200");
        assert!(kage.has_transform());
        assert!(!KageData::parse("1:0:0:10:10:190:10").has_transform());
    }

    #[test]
    fn yoko_classification() {
        assert!(is_yoko(10, 50, 90, 50));
        assert!(is_yoko(10, 50, 90, 60));
        assert!(!is_yoko(50, 10, 50, 90));
        assert!(!is_yoko(10, 10, 20, 20));
        assert!(is_yoko(90, 50, 10, 50));
    }
}
