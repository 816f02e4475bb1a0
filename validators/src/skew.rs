//! Nearly-but-not-quite axis-aligned strokes.

use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;

use gwv_core::filters::{categories, category_in};
use gwv_core::{
    is_yoko, ErrorKind, LineRef, Predicate, Result, Row, Rule, RuleResult, StrokeType,
    ValidatorContext,
};
use serde_json::Value;

/// Largest offset, in glyph units, still treated as a slip of the hand.
const MAX_SKEW: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkewKind {
    /// 歪んだ水平
    Horizontal,
    /// 歪んだ垂直
    Vertical,
    /// 折れの後半が歪んだ水平
    BentSecondLeg,
    /// 折れの前半が歪んだ垂直
    BentFirstLeg,
    /// 乙の後半が歪んだ水平
    OtsuSecondLeg,
    /// 曲がった縦払い
    CurvedVerticalSlash,
    /// 縦払いの直線部分が歪んだ垂直
    VerticalSlashStraightPart,
}

impl SkewKind {
    pub fn code(self) -> &'static str {
        match self {
            SkewKind::Horizontal => "10",
            SkewKind::Vertical => "11",
            SkewKind::BentSecondLeg => "30",
            SkewKind::BentFirstLeg => "31",
            SkewKind::OtsuSecondLeg => "40",
            SkewKind::CurvedVerticalSlash => "71",
            SkewKind::VerticalSlashStraightPart => "72",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkewError {
    pub kind: SkewKind,
    pub line: LineRef,
    /// Deviation from the axis in degrees, one decimal.
    pub angle: f64,
}

impl ErrorKind for SkewError {
    fn code(&self) -> &'static str {
        self.kind.code()
    }

    fn payload(&self) -> Row {
        vec![self.line.value(), Value::from(self.angle)]
    }
}

fn degrees(rad: f64) -> f64 {
    (rad.to_degrees() * 10.0).round() / 10.0
}

fn slope(minor: i64, major: i64) -> f64 {
    degrees((minor as f64).atan2(major as f64))
}

fn is_slight(dif: i64) -> bool {
    dif != 0 && dif <= MAX_SKEW
}

fn check(kind: StrokeType, p: &[i64]) -> Option<(SkewKind, f64)> {
    match kind {
        StrokeType::Straight => {
            let x_dif = (p[0] - p[2]).abs();
            let y_dif = (p[1] - p[3]).abs();
            if x_dif <= y_dif && is_slight(x_dif) {
                return Some((SkewKind::Vertical, slope(x_dif, y_dif)));
            }
            if x_dif > y_dif && is_slight(y_dif) {
                return Some((SkewKind::Horizontal, slope(y_dif, x_dif)));
            }
        }
        StrokeType::Bent => {
            let x_dif1 = (p[0] - p[2]).abs();
            let y_dif1 = (p[1] - p[3]).abs();
            if is_slight(x_dif1) {
                return Some((SkewKind::BentFirstLeg, slope(x_dif1, y_dif1)));
            }
            let x_dif2 = (p[2] - p[4]).abs();
            let y_dif2 = (p[3] - p[5]).abs();
            if is_slight(y_dif2) {
                return Some((SkewKind::BentSecondLeg, slope(y_dif2, x_dif2)));
            }
        }
        StrokeType::Otsu => {
            let x_dif = (p[2] - p[4]).abs();
            let y_dif = (p[3] - p[5]).abs();
            if is_slight(y_dif) {
                return Some((SkewKind::OtsuSecondLeg, slope(y_dif, x_dif)));
            }
        }
        StrokeType::VerticalSlash => {
            // a horizontal straight part is an illegal stroke, not a skewed one
            if is_yoko(p[0], p[1], p[2], p[3]) {
                return None;
            }
            let (x_dif1, y_dif1) = (p[2] - p[0], p[3] - p[1]);
            let theta1 = if x_dif1 == 0 && y_dif1 == 0 {
                FRAC_PI_2
            } else {
                (y_dif1 as f64).atan2(x_dif1 as f64)
            };
            let (x_dif2, y_dif2) = (p[4] - p[2], p[5] - p[3]);
            let theta2 = (y_dif2 as f64).atan2(x_dif2 as f64);
            let bend = (theta1 - theta2).abs();
            if (x_dif1 == 0 && x_dif2 != 0) || bend * 60.0 > 3.0 {
                return Some((SkewKind::CurvedVerticalSlash, degrees(bend)));
            }
            if x_dif1 != 0 && (-MAX_SKEW..=MAX_SKEW).contains(&x_dif1) {
                let angle = (90.0 - theta1.to_degrees()).abs();
                return Some((
                    SkewKind::VerticalSlashStraightPart,
                    (angle * 10.0).round() / 10.0,
                ));
            }
        }
        _ => {}
    }
    None
}

#[derive(Debug, Default)]
pub struct Skew;

impl Rule for Skew {
    type Error = SkewError;
    const NAME: &'static str = "skew";

    fn filter(&self) -> Predicate {
        !Predicate::IsAlias & !category_in(categories::USER_OWNED)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<SkewError>> {
        for line in &ctx.kage().lines {
            let Some(kind) = line.kind() else { continue };
            let columns = match kind {
                StrokeType::Straight => 7,
                StrokeType::Bent | StrokeType::Otsu | StrokeType::VerticalSlash => 9,
                _ => continue,
            };
            let p = line.ints(3, columns)?;
            if let Some((kind, angle)) = check(kind, &p) {
                return Ok(Some(SkewError {
                    kind,
                    line: line.into(),
                    angle,
                }));
            }
        }
        Ok(None)
    }

    /// Largest deviation first.
    fn finish(&self, result: &mut RuleResult) {
        for rows in result.values_mut() {
            rows.sort_by(|a, b| {
                let ka = a.get(2).and_then(Value::as_f64).unwrap_or_default();
                let kb = b.get(2).and_then(Value::as_f64).unwrap_or_default();
                kb.partial_cmp(&ka).unwrap_or(Ordering::Equal)
            });
        }
    }
}
