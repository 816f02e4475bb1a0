//! Illegal stroke encodings: wrong column counts, undefined shape
//! combinations and shapes that contradict the stroke geometry.

use gwv_core::filters::{categories, category_in};
use gwv_core::kage::{is_yoko, ALIAS_PREFIX, BLANK_DATA};
use gwv_core::{
    ErrorKind, KageLine, LineRef, Predicate, Result, Row, Rule, RuleResult, StrokeType,
    ValidatorContext,
};
use serde_json::Value;

/// Defined `(type, head, tail)` combinations.
const SHAPE_COMBINATIONS: &[(i64, i64, i64)] = &[
    (0, 0, 0),
    (0, -1, -1),
    (0, 97, 0),
    (0, 98, 0),
    (0, 99, 1),
    (0, 99, 2),
    (0, 99, 3),
    (1, 0, 0),
    (1, 0, 2),
    (1, 0, 4),
    (1, 0, 13),
    (1, 0, 23),
    (1, 0, 24),
    (1, 0, 32),
    (1, 0, 313),
    (1, 0, 413),
    (1, 2, 0),
    (1, 2, 2),
    (1, 12, 0),
    (1, 12, 13),
    (1, 12, 23),
    (1, 12, 24),
    (1, 12, 32),
    (1, 12, 313),
    (1, 12, 413),
    (1, 22, 0),
    (1, 22, 4),
    (1, 22, 13),
    (1, 22, 23),
    (1, 22, 24),
    (1, 22, 32),
    (1, 22, 313),
    (1, 22, 413),
    (1, 32, 0),
    (1, 32, 4),
    (1, 32, 13),
    (1, 32, 23),
    (1, 32, 24),
    (1, 32, 32),
    (1, 32, 313),
    (1, 32, 413),
    (2, 0, 5),
    (2, 0, 7),
    (2, 7, 0),
    (2, 7, 4),
    (2, 7, 8),
    (2, 12, 7),
    (2, 22, 4),
    (2, 22, 5),
    (2, 22, 7),
    (2, 32, 4),
    (2, 32, 5),
    (2, 32, 7),
    (3, 0, 0),
    (3, 0, 5),
    (3, 12, 0),
    (3, 12, 5),
    (3, 22, 0),
    (3, 22, 5),
    (3, 32, 0),
    (3, 32, 5),
    (4, 0, 0),
    (4, 0, 5),
    (4, 22, 0),
    (4, 22, 5),
    (6, 0, 5),
    (6, 0, 7),
    (6, 7, 0),
    (6, 7, 4),
    (6, 7, 8),
    (6, 12, 7),
    (6, 22, 4),
    (6, 22, 5),
    (6, 22, 7),
    (6, 32, 4),
    (6, 32, 5),
    (6, 32, 7),
    (7, 0, 7),
    (7, 12, 7),
    (7, 22, 7),
    (7, 32, 7),
    (9, 0, 0),
];

/// Combinations additionally allowed in non-kanji glyphs.
const NON_KANJI_SHAPE_COMBINATIONS: &[(i64, i64, i64)] =
    &[(2, 32, 0), (6, 32, 0), (2, 32, 8), (6, 32, 8)];

const TRANSFORM_COLUMNS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalKind {
    /// 未定義の筆画
    UnknownStrokeType,
    /// 列不足
    TooFewColumns,
    /// 列余分（非ゼロ）
    TooManyColumnsNonZero,
    /// 列余分（ゼロ値）
    TooManyColumnsZero,
    /// 列数異常（99）
    WrongPartQuoteColumns,
    /// エイリアスに11列
    AliasWithElevenColumns,
    NotAnInteger,
    /// 不正なデータ（0）
    InvalidBlankData,
    /// 部品位置
    PartPosition,
    /// 横画に接続(縦)型
    HorizontalWithVerticalConnection,
    /// 縦画に接続(横)型
    VerticalWithHorizontalConnection,
    /// 折れの前半が横
    BentFirstLegHorizontal,
    /// 折れの後半が縦
    BentSecondLegVertical,
    /// 乙の前半が横
    OtsuFirstLegHorizontal,
    /// 乙の後半が左向き
    OtsuSecondLegLeftward,
    /// 縦払いの直線部分が横
    VerticalSlashHorizontal,
    /// 未定義の形状の組み合わせ
    UndefinedShape,
    NonCanonicalAlias,
    NonCanonicalBlank,
}

impl IllegalKind {
    pub fn code(self) -> &'static str {
        match self {
            IllegalKind::UnknownStrokeType => "0",
            IllegalKind::TooFewColumns => "1",
            IllegalKind::TooManyColumnsNonZero => "2",
            IllegalKind::TooManyColumnsZero => "3",
            IllegalKind::WrongPartQuoteColumns => "4",
            IllegalKind::AliasWithElevenColumns => "7",
            IllegalKind::NotAnInteger => "8",
            IllegalKind::InvalidBlankData => "5",
            IllegalKind::PartPosition => "9",
            IllegalKind::HorizontalWithVerticalConnection => "10",
            IllegalKind::VerticalWithHorizontalConnection => "11",
            IllegalKind::BentFirstLegHorizontal => "30",
            IllegalKind::BentSecondLegVertical => "31",
            IllegalKind::OtsuFirstLegHorizontal => "40",
            IllegalKind::OtsuSecondLegLeftward => "41",
            IllegalKind::VerticalSlashHorizontal => "70",
            IllegalKind::UndefinedShape => "6",
            IllegalKind::NonCanonicalAlias => "12",
            IllegalKind::NonCanonicalBlank => "13",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllegalError {
    pub kind: IllegalKind,
    pub line: LineRef,
}

impl IllegalError {
    fn new(kind: IllegalKind, line: &KageLine) -> Self {
        Self {
            kind,
            line: line.into(),
        }
    }

    /// `type:head:tail` prefix of the offending record.
    pub fn shape_prefix(&self) -> String {
        self.line
            .text
            .splitn(4, ':')
            .take(3)
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl ErrorKind for IllegalError {
    fn code(&self) -> &'static str {
        self.kind.code()
    }

    fn payload(&self) -> Row {
        vec![Value::from(self.shape_prefix()), self.line.value()]
    }
}

#[derive(Debug, Default)]
pub struct Illegal;

impl Illegal {
    fn check_line(
        &self,
        line: &KageLine,
        is_alias: bool,
        non_kanji: bool,
    ) -> Result<Option<IllegalKind>> {
        use IllegalKind::*;

        let Some(kind) = line.kind() else {
            return Ok(Some(UnknownStrokeType));
        };
        let columns = line.len();

        if kind == StrokeType::PartQuote {
            if columns != 8 && columns != 11 {
                return Ok(Some(WrongPartQuoteColumns));
            }
            if columns == 11 && is_alias {
                return Ok(Some(AliasWithElevenColumns));
            }
        } else {
            let expected = match kind.columns() {
                Some(n) => n,
                None if line.is_transform() => TRANSFORM_COLUMNS,
                None => 4,
            };
            if columns < expected {
                return Ok(Some(TooFewColumns));
            }
            if columns > expected {
                let non_zero = line.values()[expected..].iter().any(|v| *v != Some(0));
                return Ok(Some(if non_zero {
                    TooManyColumnsNonZero
                } else {
                    TooManyColumnsZero
                }));
            }
        }

        if line.first_unparseable().is_some() {
            return Ok(Some(NotAnInteger));
        }

        let head = line.int(1).unwrap_or(0);
        let tail = line.int(2).unwrap_or(0);
        match kind {
            StrokeType::Blank if !line.is_transform() => {
                let d3 = line.int(3)?;
                if (head == 0 && d3 != 0) || (head == -1 && d3 != -1) {
                    return Ok(Some(InvalidBlankData));
                }
            }
            StrokeType::Straight => {
                if [2, 12, 22, 32].contains(&head) || [2, 32, 13, 23, 24, 313, 413].contains(&tail) {
                    let p = line.ints(3, 7)?;
                    if is_yoko(p[0], p[1], p[2], p[3]) {
                        if head > 2 || tail > 2 {
                            return Ok(Some(HorizontalWithVerticalConnection));
                        }
                    } else if head == 2 || tail == 2 {
                        return Ok(Some(VerticalWithHorizontalConnection));
                    }
                }
            }
            StrokeType::PartPosition => return Ok(Some(PartPosition)),
            StrokeType::Bent => {
                let p = line.ints(3, 9)?;
                if is_yoko(p[0], p[1], p[2], p[3]) {
                    return Ok(Some(BentFirstLegHorizontal));
                }
                if tail == 5 && p[4] - p[2] == 0 {
                    return Ok(Some(BentSecondLegVertical));
                }
            }
            StrokeType::Otsu => {
                let p = line.ints(3, 9)?;
                if is_yoko(p[0], p[1], p[2], p[3]) {
                    return Ok(Some(OtsuFirstLegHorizontal));
                }
                if tail == 5 && p[4] - p[2] <= 0 {
                    return Ok(Some(OtsuSecondLegLeftward));
                }
            }
            StrokeType::VerticalSlash => {
                let p = line.ints(3, 7)?;
                if is_yoko(p[0], p[1], p[2], p[3]) {
                    return Ok(Some(VerticalSlashHorizontal));
                }
            }
            _ => {}
        }

        if kind != StrokeType::PartQuote {
            let shape = (kind.code(), head, tail);
            if !SHAPE_COMBINATIONS.contains(&shape)
                && !(non_kanji && NON_KANJI_SHAPE_COMBINATIONS.contains(&shape))
            {
                return Ok(Some(UndefinedShape));
            }
        }
        Ok(None)
    }
}

impl Rule for Illegal {
    type Error = IllegalError;
    const NAME: &'static str = "illegal";

    fn filter(&self) -> Predicate {
        !category_in(categories::USER_OWNED)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<IllegalError>> {
        let kage = ctx.kage();
        let is_alias = kage.is_alias();
        let non_kanji = ctx.is_non_kanji();
        for line in &kage.lines {
            if let Some(kind) = self.check_line(line, is_alias, non_kanji)? {
                return Ok(Some(IllegalError::new(kind, line)));
            }
        }

        let gdata = ctx.glyph.gdata.as_str();
        if let Some(target) = kage.alias_target() {
            if gdata.strip_prefix(ALIAS_PREFIX) != Some(target) {
                return Ok(Some(IllegalError::new(
                    IllegalKind::NonCanonicalAlias,
                    &kage.lines[0],
                )));
            }
        }
        if kage.is_blank() && gdata != BLANK_DATA {
            return Ok(Some(IllegalError::new(
                IllegalKind::NonCanonicalBlank,
                &kage.lines[0],
            )));
        }
        Ok(None)
    }

    fn finish(&self, result: &mut RuleResult) {
        gwv_core::validator::sort_rows_by_str(result, 1);
    }
}
