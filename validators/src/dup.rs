//! Duplicated and near-duplicated strokes.
//!
//! Straight legs are pooled as near-horizontal and near-vertical lines and
//! compared by perpendicular offset, angle and overlap along the axis.
//! Curves, double curves, part positions and part quotes are compared with
//! their neighbour after sorting by the first coordinate.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use gwv_core::filters::{categories, category_in};
use gwv_core::{ErrorKind, KageData, KageLine, LineRef, Predicate, Result, Row, Rule, StrokeType, ValidatorContext};
use serde_json::Value;

/// Offset thresholds for ideographs; everything else must be exact.
const HORIZONTAL_GAP: f64 = 4.0;
const VERTICAL_GAP: f64 = 9.0;
const COORD_GAP: i64 = 3;

const ANGLE_TOLERANCE: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DupKind {
    /// 横
    Horizontal,
    /// 縦
    Vertical,
    /// 曲線
    Curve,
    /// 複曲線
    DoubleCurve,
    /// 部品位置
    PartPosition,
    /// 部品
    PartQuote,
}

impl DupKind {
    pub fn code(self) -> &'static str {
        match self {
            DupKind::Horizontal => "10",
            DupKind::Vertical => "11",
            DupKind::Curve => "2",
            DupKind::DoubleCurve => "3",
            DupKind::PartPosition => "9",
            DupKind::PartQuote => "99",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DupError {
    pub kind: DupKind,
    pub first: LineRef,
    pub second: LineRef,
    /// Overlap along the axis, for straight lines only.
    pub overlap: Option<i64>,
}

impl ErrorKind for DupError {
    fn code(&self) -> &'static str {
        self.kind.code()
    }

    fn payload(&self) -> Row {
        let mut row = vec![self.first.value(), self.second.value()];
        if let Some(overlap) = self.overlap {
            row.push(Value::from(overlap));
        }
        row
    }
}

/// A straight leg as a line: signed distance from the origin, direction,
/// and the interval it covers along its axis.
#[derive(Debug)]
struct Line<'k> {
    record: &'k KageLine,
    dist: f64,
    angle: f64,
    t0: i64,
    t1: i64,
}

#[derive(Debug, Default)]
struct Pools<'k> {
    horizontal: Vec<Line<'k>>,
    vertical: Vec<Line<'k>>,
    curves: Vec<(&'k KageLine, Vec<i64>)>,
    double_curves: Vec<(&'k KageLine, Vec<i64>)>,
    positions: Vec<(&'k KageLine, Vec<i64>)>,
    /// keyed by quoted name, `@revision` included
    quotes: BTreeMap<&'k str, Vec<(&'k KageLine, Vec<i64>)>>,
}

impl<'k> Pools<'k> {
    fn add_leg(&mut self, record: &'k KageLine, p: &[i64]) {
        let (x0, y0, x1, y1) = (p[0], p[1], p[2], p[3]);
        let line = |dist, angle, t0, t1| Line {
            record,
            dist,
            angle,
            t0,
            t1,
        };
        if y0 == y1 {
            if x0 != x1 {
                let dist = -(y0 as f64);
                self.horizontal
                    .push(line(dist, 0.0, x0.min(x1), x0.max(x1)));
            }
            return;
        }
        if x0 == x1 {
            self.vertical
                .push(line(x0 as f64, FRAC_PI_2, y0.min(y1), y0.max(y1)));
            return;
        }
        let (fx0, fy0, fx1, fy1) = (x0 as f64, y0 as f64, x1 as f64, y1 as f64);
        let dist = (fx0 * fy1 - fx1 * fy0) / (fx0 - fx1).hypot(fy0 - fy1);
        let angle = (fy1 - fy0).atan2(fx1 - fx0);
        if -FRAC_PI_4 < angle && angle < FRAC_PI_4 {
            self.horizontal.push(line(dist, angle, x0, x1));
        } else if angle > 0.0 {
            self.vertical.push(line(dist, angle, y0, y1));
        } else {
            self.vertical.push(line(dist, angle + PI, y1, y0));
        }
    }

    fn collect(kage: &'k KageData) -> Result<Self> {
        let mut pools = Self::default();
        for record in &kage.lines {
            match record.kind() {
                Some(StrokeType::Straight) => pools.add_leg(record, &record.ints(3, 7)?),
                Some(StrokeType::Bent | StrokeType::Otsu) => {
                    pools.add_leg(record, &record.ints(3, 7)?);
                    pools.add_leg(record, &record.ints(5, 9)?);
                }
                Some(StrokeType::VerticalSlash) => {
                    pools.add_leg(record, &record.ints(3, 7)?);
                    pools.curves.push((record, record.ints(5, 11)?));
                }
                Some(StrokeType::Curve) => pools.curves.push((record, record.ints(3, 9)?)),
                Some(StrokeType::DoubleCurve) => {
                    pools.double_curves.push((record, record.ints(3, 11)?))
                }
                Some(StrokeType::PartPosition) => {
                    pools.positions.push((record, record.ints(3, 7)?))
                }
                Some(StrokeType::PartQuote) => {
                    let name = record.part_name().unwrap_or_default();
                    pools
                        .quotes
                        .entry(name)
                        .or_default()
                        .push((record, record.ints(3, 7)?));
                }
                Some(StrokeType::Blank) | None => {}
            }
        }
        Ok(pools)
    }
}

fn by_dist(a: &Line<'_>, b: &Line<'_>) -> Ordering {
    a.dist.total_cmp(&b.dist)
}

/// First overlapping pair of parallel lines within `gap` of each other.
fn find_line_pair<'a, 'k>(
    lines: &'a mut [Line<'k>],
    gap: f64,
    inclusive: bool,
) -> Option<(&'a Line<'k>, &'a Line<'k>)> {
    lines.sort_by(by_dist);
    let lines = &*lines;
    for (i, a) in lines.iter().enumerate() {
        for b in &lines[i + 1..] {
            if b.dist - a.dist > gap {
                break;
            }
            if (a.angle - b.angle).abs() > ANGLE_TOLERANCE {
                continue;
            }
            let overlaps = if inclusive {
                b.t0 <= a.t1 && a.t0 <= b.t1
            } else {
                b.t0 < a.t1 && a.t0 < b.t1
            };
            if overlaps {
                return Some((a, b));
            }
        }
    }
    None
}

fn line_error(kind: DupKind, (a, b): (&Line<'_>, &Line<'_>)) -> DupError {
    let overlap = (a.t1 - b.t0)
        .min(b.t1 - a.t0)
        .min(a.t1 - a.t0)
        .min(b.t1 - b.t0);
    DupError {
        kind,
        first: a.record.into(),
        second: b.record.into(),
        overlap: Some(overlap),
    }
}

/// First pair of neighbours (after sorting by the first coordinate) whose
/// coordinates all lie within `gap`.
fn find_neighbours<'k>(
    items: &mut [(&'k KageLine, Vec<i64>)],
    gap: i64,
) -> Option<(&'k KageLine, &'k KageLine)> {
    items.sort_by_key(|(_, coords)| coords.first().copied().unwrap_or_default());
    items.windows(2).find_map(|pair| {
        let ((a, ca), (b, cb)) = (&pair[0], &pair[1]);
        let close = ca.iter().zip(cb).all(|(x, y)| (x - y).abs() <= gap);
        close.then_some((*a, *b))
    })
}

fn neighbour_error(kind: DupKind, (a, b): (&KageLine, &KageLine)) -> DupError {
    DupError {
        kind,
        first: a.into(),
        second: b.into(),
        overlap: None,
    }
}

/// First duplicated stroke of `kage`. With `exact`, strokes must coincide to
/// count as duplicates.
pub fn find_duplicate(kage: &KageData, exact: bool) -> Result<Option<DupError>> {
    let (horizontal_gap, vertical_gap, coord_gap) = if exact {
        (0.0, 0.0, 0)
    } else {
        (HORIZONTAL_GAP, VERTICAL_GAP, COORD_GAP)
    };
    let mut pools = Pools::collect(kage)?;

    if let Some(pair) = find_line_pair(&mut pools.horizontal, horizontal_gap, true) {
        return Ok(Some(line_error(DupKind::Horizontal, pair)));
    }
    if let Some(pair) = find_line_pair(&mut pools.vertical, vertical_gap, false) {
        return Ok(Some(line_error(DupKind::Vertical, pair)));
    }
    if let Some(pair) = find_neighbours(&mut pools.curves, coord_gap) {
        return Ok(Some(neighbour_error(DupKind::Curve, pair)));
    }
    if let Some(pair) = find_neighbours(&mut pools.double_curves, coord_gap) {
        return Ok(Some(neighbour_error(DupKind::DoubleCurve, pair)));
    }
    for quotes in pools.quotes.values_mut() {
        if let Some(pair) = find_neighbours(quotes, coord_gap) {
            return Ok(Some(neighbour_error(DupKind::PartQuote, pair)));
        }
    }
    if let Some(pair) = find_neighbours(&mut pools.positions, coord_gap) {
        return Ok(Some(neighbour_error(DupKind::PartPosition, pair)));
    }
    Ok(None)
}

#[derive(Debug, Default)]
pub struct Dup;

impl Rule for Dup {
    type Error = DupError;
    const NAME: &'static str = "dup";

    fn filter(&self) -> Predicate {
        !Predicate::IsAlias & !category_in(categories::USER_OWNED)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<DupError>> {
        find_duplicate(ctx.kage(), ctx.is_non_kanji())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dup(data: &str, exact: bool) -> Option<DupError> {
        find_duplicate(&KageData::parse(data), exact).unwrap()
    }

    #[test]
    fn near_horizontal_duplicate() {
        let err = dup("1:0:0:10:50:90:50$1:0:0:10:53:90:53", false).unwrap();
        assert_eq!(err.kind, DupKind::Horizontal);
        assert_eq!(err.first.number, 1);
        assert_eq!(err.second.number, 0);
        assert_eq!(err.overlap, Some(80));

        assert_eq!(dup("1:0:0:10:50:90:50$1:0:0:10:56:90:56", false), None);
        assert_eq!(dup("1:0:0:10:50:90:50$1:0:0:10:53:90:53", true), None);
    }

    #[test]
    fn horizontal_touching_ends_count_vertical_do_not() {
        let err = dup("1:0:0:10:50:90:50$1:0:0:90:50:150:50", false).unwrap();
        assert_eq!((err.kind, err.overlap), (DupKind::Horizontal, Some(0)));
        assert_eq!(dup("1:0:0:50:10:50:90$1:0:0:50:90:50:150", false), None);
        let err = dup("1:0:0:50:10:50:90$1:0:0:55:80:55:150", false).unwrap();
        assert_eq!((err.kind, err.overlap), (DupKind::Vertical, Some(10)));
    }

    #[test]
    fn bent_legs_are_lines() {
        let err = dup("3:0:0:50:10:50:90:150:90$1:0:0:52:20:52:60", false).unwrap();
        assert_eq!(err.kind, DupKind::Vertical);
    }

    #[test]
    fn curves_and_quotes() {
        let err = dup("2:7:8:20:20:60:60:100:180$2:7:8:22:20:60:62:100:178", false).unwrap();
        assert_eq!(err.kind, DupKind::Curve);
        assert_eq!(err.overlap, None);
        assert_eq!(
            dup("2:7:8:20:20:60:60:100:180$2:7:8:22:20:60:62:100:178", true),
            None
        );

        let same = "99:0:0:0:0:100:200:u4e00-01$99:0:0:2:0:101:200:u4e00-01";
        assert_eq!(dup(same, false).map(|e| e.kind), Some(DupKind::PartQuote));
        let different = "99:0:0:0:0:100:200:u4e00-01$99:0:0:2:0:101:200:u4e01-01";
        assert_eq!(dup(different, false), None);
    }

    #[test]
    fn payload_shape() {
        let err = dup("1:0:0:10:50:90:50$1:0:0:10:50:90:50", true).unwrap();
        assert_eq!(
            err.payload(),
            vec![
                serde_json::json!([0, "1:0:0:10:50:90:50"]),
                serde_json::json!([1, "1:0:0:10:50:90:50"]),
                serde_json::json!(80),
            ]
        );
    }
}
