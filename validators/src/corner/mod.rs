//! Corner connectivity.
//!
//! Every stroke is cut into near-vertical (tate) and near-horizontal (yoko)
//! segments. Each vertical end is matched against each horizontal end, then
//! against horizontal interiors (T and ⊥), and horizontal ends against
//! vertical interiors (|- and -|). A match becomes a connection carrying
//! either the exact-join outcome or an error code. The worst error code is
//! reported.

mod segment;
mod zh;

use gwv_core::filters::{categories, category_in};
use gwv_core::{ErrorKind, LineRef, Predicate, Result, Row, Rule, ValidatorContext};
use once_cell::sync::Lazy;
use regex::Regex;

use segment::{Geom, Graph, Outcome, Pos, NO_END};

/// Corner error codes. The first digit names the vertical end shape that
/// was found, the second the shape the join calls for; equal digits mean
/// the shape is right and only the position is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CornerCode {
    /// 左上近い
    DisconnectedTopLeft,
    /// 左下近い
    DisconnectedBottomLeft,
    /// 右上近い
    DisconnectedTopRight,
    /// 右下近い
    DisconnectedBottomRight,
    /// 左下zh用旧近い
    DisconnectedBottomLeftZhOld,
    /// 左下zh用新近い
    DisconnectedBottomLeftZhNew,
    /// 接続(横)近い
    DisconnectedHoriConn,
    /// 接続(縦)近い
    DisconnectedVertConn,
    /// 右下H/T近い
    DisconnectedBottomRightHt,
    TopLeftOnTopRight,
    TopLeftOnVertConn,
    BottomLeftOnBottomRight,
    BottomLeftOnBottomLeftZhOld,
    BottomLeftOnBottomLeftZhNew,
    BottomLeftOnVertConn,
    TopRightOnTopLeft,
    TopRightOnVertConn,
    BottomRightOnBottomLeft,
    BottomRightOnVertConn,
    BottomLeftZhOldOnBottomLeft,
    BottomLeftZhOldOnBottomRight,
    BottomLeftZhOldOnBottomLeftZhNew,
    BottomLeftZhOldOnVertConn,
    /// 右下H/Tに擬似右下H/T型
    PseudoBottomRightHtOnBottomRightHt,
    BottomLeftZhNewOnBottomLeft,
    BottomLeftZhNewOnBottomRight,
    BottomLeftZhNewOnBottomLeftZhOld,
    BottomLeftZhNewOnVertConn,
    OpenOnTopLeft,
    OpenOnBottomLeft,
    OpenOnTopRight,
    OpenOnBottomRightHt,
    OpenOnBottomLeftZhOld,
    OpenOnHoriConn,
    OpenOnVertConn,
    VertConnOnTopLeft,
    VertConnOnBottomLeft,
    VertConnOnTopRight,
    VertConnOnBottomRightHt,
    BottomRightHtOnBottomLeft,
    BottomRightHtOnVertConn,
}

impl CornerCode {
    pub fn as_str(self) -> &'static str {
        use CornerCode::*;
        match self {
            DisconnectedTopLeft => "00",
            DisconnectedBottomLeft => "11",
            DisconnectedTopRight => "22",
            DisconnectedBottomRight => "33",
            DisconnectedBottomLeftZhOld => "44",
            DisconnectedBottomLeftZhNew => "66",
            DisconnectedHoriConn => "77",
            DisconnectedVertConn => "99",
            DisconnectedBottomRightHt => "aa",
            TopLeftOnTopRight => "20",
            TopLeftOnVertConn => "90",
            BottomLeftOnBottomRight => "31",
            BottomLeftOnBottomLeftZhOld => "41",
            BottomLeftOnBottomLeftZhNew => "61",
            BottomLeftOnVertConn => "91",
            TopRightOnTopLeft => "02",
            TopRightOnVertConn => "92",
            BottomRightOnBottomLeft => "13",
            BottomRightOnVertConn => "93",
            BottomLeftZhOldOnBottomLeft => "14",
            BottomLeftZhOldOnBottomRight => "34",
            BottomLeftZhOldOnBottomLeftZhNew => "64",
            BottomLeftZhOldOnVertConn => "94",
            PseudoBottomRightHtOnBottomRightHt => "a5",
            BottomLeftZhNewOnBottomLeft => "16",
            BottomLeftZhNewOnBottomRight => "36",
            BottomLeftZhNewOnBottomLeftZhOld => "46",
            BottomLeftZhNewOnVertConn => "96",
            OpenOnTopLeft => "08",
            OpenOnBottomLeft => "18",
            OpenOnTopRight => "28",
            OpenOnBottomRightHt => "38",
            OpenOnBottomLeftZhOld => "48",
            OpenOnHoriConn => "78",
            OpenOnVertConn => "98",
            VertConnOnTopLeft => "09",
            VertConnOnBottomLeft => "19",
            VertConnOnTopRight => "29",
            VertConnOnBottomRightHt => "39",
            BottomRightHtOnBottomLeft => "1a",
            BottomRightHtOnVertConn => "9a",
        }
    }

    /// Corner shape found where a vertical meets a horizontal's interior.
    fn on_vert_conn(shape: i64) -> Option<Self> {
        use CornerCode::*;
        Some(match shape {
            12 => TopLeftOnVertConn,
            13 => BottomLeftOnVertConn,
            22 => TopRightOnVertConn,
            23 => BottomRightOnVertConn,
            313 => BottomLeftZhOldOnVertConn,
            413 => BottomLeftZhNewOnVertConn,
            24 => BottomRightHtOnVertConn,
            _ => return None,
        })
    }

    /// Shape mismatches outrank old/new zh confusion, which outranks
    /// position-only findings.
    fn severity(self) -> u8 {
        let code = self.as_str().as_bytes();
        if code[0] == code[1] {
            0
        } else if matches!(
            self,
            CornerCode::BottomLeftZhNewOnBottomLeftZhOld | CornerCode::BottomLeftZhOldOnBottomLeftZhNew
        ) {
            50
        } else {
            100
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CornerError {
    pub code: CornerCode,
    pub vertical: LineRef,
    pub horizontal: LineRef,
}

impl ErrorKind for CornerError {
    fn code(&self) -> &'static str {
        self.code.as_str()
    }

    fn payload(&self) -> Row {
        vec![self.vertical.value(), self.horizontal.value()]
    }
}

static G_DESIGN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:u[0-9a-f]+-[gi](?:\d{2})?|zihai-\d{6})$").unwrap());
static T_DESIGN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:u[0-9a-f]+-[th](?:\d{2})?|twedu-.+|lgccc-.+|hka-.+)$").unwrap()
});

const TOP_SHAPES: [i64; 4] = [0, 12, 22, 32];
const BOTTOM_SHAPES: [i64; 7] = [0, 13, 313, 413, 23, 24, 32];

fn exact(x_dif: i64, y_dif: i64) -> bool {
    x_dif == 0 && y_dif == 0
}

fn top_left(t: &Geom, y: &Geom) -> Option<Outcome> {
    use CornerCode::*;
    let (x_dif, y_dif) = (y.x0 - t.x0, y.y0 - t.y0);
    if y.start == NO_END || !(-7..=9).contains(&x_dif) {
        return None;
    }
    let code = match t.start {
        12 => {
            if exact(x_dif, y_dif) || [2, 6, 7].contains(&y.stroke_type) {
                return Some(Outcome::Exact);
            }
            (-5..=3).contains(&y_dif).then_some(DisconnectedTopLeft)
        }
        22 => (-5..=5).contains(&y_dif).then_some(TopRightOnTopLeft),
        0 => (0..=6).contains(&y_dif).then_some(OpenOnTopLeft),
        32 => (-5..=0).contains(&y_dif).then_some(VertConnOnTopLeft),
        _ => None,
    };
    code.map(Outcome::Error)
}

fn top_right(t: &Geom, y: &Geom) -> Option<Outcome> {
    use CornerCode::*;
    let (x_dif, y_dif) = (y.x1 - t.x0, y.y1 - t.y0);
    if y.end == NO_END || !(-7..=9).contains(&x_dif) {
        return None;
    }
    let outcome = match t.start {
        12 => (-5..=3).contains(&y_dif).then_some(Outcome::Error(TopLeftOnTopRight)),
        22 => {
            if exact(x_dif, y_dif) {
                Some(Outcome::Exact)
            } else {
                (-5..=5)
                    .contains(&y_dif)
                    .then_some(Outcome::Error(DisconnectedTopRight))
            }
        }
        0 => (0..=6).contains(&y_dif).then_some(Outcome::Error(OpenOnTopRight)),
        32 => (-5..=0).contains(&y_dif).then_some(Outcome::Error(VertConnOnTopRight)),
        _ => None,
    }?;
    if y.end == 0 {
        return Some(Outcome::Error(OpenOnHoriConn));
    }
    Some(outcome)
}

fn bottom_left(t: &Geom, y: &Geom, g_design: bool, t_design: bool) -> Option<Outcome> {
    use CornerCode::*;
    let (x_dif, y_dif) = (y.x0 - t.x1, y.y0 - t.y1);
    if y.start == NO_END || !(-8..=8).contains(&x_dif) {
        return None;
    }
    let in_range = |lo: i64, hi: i64, code: CornerCode| {
        (lo..=hi).contains(&y_dif).then_some(Outcome::Error(code))
    };
    match t.end {
        13 if exact(x_dif, y_dif) => Some(Outcome::Exact),
        13 => in_range(-2, 4, DisconnectedBottomLeft),
        313 if exact(x_dif, y_dif) => Some(if g_design {
            Outcome::Error(BottomLeftZhOldOnBottomLeftZhNew)
        } else {
            Outcome::Exact
        }),
        313 => in_range(-14, 4, DisconnectedBottomLeftZhOld),
        413 if exact(x_dif, y_dif) => Some(if t_design {
            Outcome::Error(BottomLeftZhNewOnBottomLeftZhOld)
        } else {
            Outcome::Exact
        }),
        413 => in_range(-14, 4, DisconnectedBottomLeftZhNew),
        23 => in_range(-6, 4, BottomRightOnBottomLeft),
        24 => in_range(-6, 4, BottomRightHtOnBottomLeft),
        0 => in_range(-19, -2, OpenOnBottomLeft).or_else(|| in_range(-1, 4, OpenOnBottomLeftZhOld)),
        32 => in_range(0, 4, VertConnOnBottomLeft),
        _ => None,
    }
}

fn bottom_right(t: &Geom, y: &Geom) -> Option<Outcome> {
    use CornerCode::*;
    let (x_dif, y_dif) = (y.x1 - t.x1, y.y1 - t.y1);
    if y.end == 0 && t.end == 32 && (6..=18).contains(&x_dif) && (0..=8).contains(&y_dif) {
        return Some(Outcome::Error(PseudoBottomRightHtOnBottomRightHt));
    }
    if y.end == NO_END || !(-8..=8).contains(&x_dif) {
        return None;
    }
    let in_range = |lo: i64, hi: i64, code: CornerCode| {
        (lo..=hi).contains(&y_dif).then_some(Outcome::Error(code))
    };
    let outcome = match t.end {
        13 => in_range(-2, 4, BottomLeftOnBottomRight),
        313 => in_range(-14, 4, BottomLeftZhOldOnBottomRight),
        413 => in_range(-14, 4, BottomLeftZhNewOnBottomRight),
        23 | 24 if exact(x_dif, y_dif) => Some(Outcome::Exact),
        23 => in_range(-6, 4, DisconnectedBottomRight),
        24 => in_range(-6, 4, DisconnectedBottomRightHt),
        0 => in_range(-19, -2, OpenOnBottomRightHt),
        32 => in_range(-19, 0, VertConnOnBottomRightHt),
        _ => None,
    }?;
    if y.end == 0 && x_dif >= 0 {
        return Some(Outcome::Error(OpenOnHoriConn));
    }
    Some(outcome)
}

/// Connection finding: code, vertical record, horizontal record.
type Finding = (CornerCode, usize, usize);

fn connect_all(g: &mut Graph, g_design: bool, t_design: bool) {
    let tate = g.tate.clone();
    let yoko = g.yoko.clone();
    let yoko_hori = g.yoko_hori.clone();
    let tate_vert = g.tate_vert.clone();

    for &t in &tate {
        let tg = g.geom(t);
        for &y in &yoko {
            let yg = g.geom(y);
            if [2, 6].contains(&tg.stroke_type) && [2, 6, 7].contains(&yg.stroke_type) {
                continue;
            }
            if TOP_SHAPES.contains(&tg.start) {
                if let Some(outcome) = top_left(&tg, &yg) {
                    g.connect(t, y, Pos::Start, Pos::Start, outcome);
                }
                if let Some(outcome) = top_right(&tg, &yg) {
                    g.connect(t, y, Pos::Start, Pos::End, outcome);
                }
            }
            if BOTTOM_SHAPES.contains(&tg.end) {
                if let Some(outcome) = bottom_left(&tg, &yg, g_design, t_design) {
                    g.connect(t, y, Pos::End, Pos::Start, outcome);
                }
                if let Some(outcome) = bottom_right(&tg, &yg) {
                    g.connect(t, y, Pos::End, Pos::End, outcome);
                }
            }
        }

        for &y in &yoko_hori {
            let yg = g.geom(y);

            // T
            let min = if yg.start != NO_END && g.segs[y].stt.is_none() { yg.x0 + 7 } else { yg.x0 };
            let max = if yg.end != NO_END && g.segs[y].end.is_none() { yg.x1 - 9 } else { yg.x1 };
            if g.stt_conn(t).map_or(true, |c| c.yoko != y)
                && tg.start != NO_END
                && (yg.y0 - 5..=yg.y0 + 5).contains(&tg.y0)
                && min < tg.x0
                && tg.x0 < max
            {
                let mut outcome = None;
                if yg.y0 == tg.y0 {
                    outcome = Some(Outcome::Exact);
                } else if tg.start != 0 {
                    outcome = Some(Outcome::Error(CornerCode::DisconnectedVertConn));
                }
                if let Some(code) = CornerCode::on_vert_conn(tg.start) {
                    outcome = Some(Outcome::Error(code));
                } else if tg.start == 0 && tg.y0 <= yg.y0 - 2 {
                    outcome = Some(Outcome::Error(CornerCode::OpenOnVertConn));
                }
                if let Some(outcome) = outcome {
                    g.connect(t, y, Pos::Start, Pos::Mid, outcome);
                }
            }

            // ⊥
            let min = if yg.start != NO_END && g.segs[y].stt.is_none() { yg.x0 + 8 } else { yg.x0 };
            let max = if yg.end != NO_END && g.segs[y].end.is_none() { yg.x1 - 8 } else { yg.x1 };
            if g.end_conn(t).map_or(true, |c| c.yoko != y)
                && tg.end != NO_END
                && (yg.y0 - 5..=yg.y0 + 5).contains(&tg.y1)
                && min < tg.x1
                && tg.x1 < max
            {
                let mut outcome = if yg.y0 == tg.y1 {
                    Outcome::Exact
                } else {
                    Outcome::Error(CornerCode::DisconnectedVertConn)
                };
                if let Some(code) = CornerCode::on_vert_conn(tg.end) {
                    outcome = Outcome::Error(code);
                } else if tg.end == 0 {
                    outcome = Outcome::Error(CornerCode::OpenOnVertConn);
                }
                g.connect(t, y, Pos::End, Pos::Mid, outcome);
            }
        }
    }

    for &y in &yoko {
        let yg = g.geom(y);
        if [2, 6, 7].contains(&yg.stroke_type) {
            continue;
        }
        for &t in &tate_vert {
            let tg = g.geom(t);

            // |-
            let min = if tg.start != NO_END && g.segs[t].stt.is_none() { tg.y0 + 6 } else { tg.y0 };
            let max = if tg.end != NO_END && g.segs[t].end.is_none() { tg.y1 - 19 } else { tg.y1 };
            if g.stt_conn(y).map_or(true, |c| c.tate != t)
                && yg.start != NO_END
                && (tg.x0 - 7..=tg.x0 + 7).contains(&yg.x0)
                && min < yg.y0
                && yg.y0 < max
            {
                // an open head and a horizontal-connection head look the same
                let outcome = if tg.x0 == yg.x0 {
                    Outcome::Exact
                } else {
                    Outcome::Error(CornerCode::DisconnectedHoriConn)
                };
                g.connect(t, y, Pos::Mid, Pos::Start, outcome);
            }

            // -|
            let min = if tg.start != NO_END && g.segs[t].stt.is_none() { tg.y0 + 6 } else { tg.y0 };
            let max = if tg.end != NO_END && g.segs[t].end.is_none() { tg.y1 - 19 } else { tg.y1 };
            if g.end_conn(y).map_or(true, |c| c.tate != t)
                && yg.end != NO_END
                && (tg.x0 - 7..=tg.x0 + 7).contains(&yg.x1)
                && min < yg.y1
                && yg.y1 < max
            {
                let mut outcome = None;
                if tg.x0 == yg.x1 {
                    outcome = Some(Outcome::Exact);
                } else if yg.end == 2 {
                    outcome = Some(Outcome::Error(CornerCode::DisconnectedHoriConn));
                }
                if yg.end == 0 && tg.x0 <= yg.x1 {
                    outcome = Some(Outcome::Error(CornerCode::OpenOnHoriConn));
                }
                if let Some(outcome) = outcome {
                    g.connect(t, y, Pos::Mid, Pos::End, outcome);
                }
            }
        }
    }
}

fn collect_findings(g: &Graph, g_design: bool, t_design: bool) -> Vec<Finding> {
    let mut findings = Vec::new();
    for &y in &g.yoko {
        let line = g.geom(y).line;
        let conns = g
            .stt_conn(y)
            .into_iter()
            .chain(g.end_conn(y))
            .chain(g.mid_conns(y));
        for conn in conns {
            if let Outcome::Error(code) = conn.outcome {
                findings.push((code, g.geom(conn.tate).line, line));
            }
        }
    }

    if g_design || t_design {
        for &t in &g.tate {
            let tg = g.geom(t);
            let Some(conn) = g.end_conn(t) else { continue };
            if conn.yoko_pos != Pos::Start || ![13, 313, 413].contains(&tg.end) {
                continue;
            }
            let zh = zh::is_zh_corner(g, t);
            let code = match (zh, tg.end) {
                (false, 313) => Some(CornerCode::BottomLeftZhOldOnBottomLeft),
                (false, 413) => Some(CornerCode::BottomLeftZhNewOnBottomLeft),
                (true, 13) if g_design => Some(CornerCode::BottomLeftOnBottomLeftZhNew),
                (true, 13) => Some(CornerCode::BottomLeftOnBottomLeftZhOld),
                _ => None,
            };
            if let Some(code) = code {
                findings.push((code, tg.line, g.geom(conn.yoko).line));
            }
        }
    }
    findings
}

/// Worst finding; the first one wins among equals.
fn worst(findings: &[Finding]) -> Option<Finding> {
    let mut best: Option<Finding> = None;
    for &finding in findings {
        if best.map_or(true, |b| finding.0.severity() > b.0.severity()) {
            best = Some(finding);
        }
    }
    best
}

#[derive(Debug, Default)]
pub struct Corner;

impl Rule for Corner {
    type Error = CornerError;
    const NAME: &'static str = "corner";

    fn filter(&self) -> Predicate {
        !Predicate::IsAlias & !category_in(categories::USER_OWNED_OR_NON_KANJI)
    }

    fn is_invalid(&self, ctx: &ValidatorContext<'_>) -> Result<Option<CornerError>> {
        let name = ctx.name();
        let kage = ctx.kage();
        let g_design = G_DESIGN_RE.is_match(name);
        let t_design = T_DESIGN_RE.is_match(name);
        let mut graph = Graph::build(kage)?;
        connect_all(&mut graph, g_design, t_design);
        let findings = collect_findings(&graph, g_design, t_design);
        Ok(worst(&findings).map(|(code, t, y)| CornerError {
            code,
            vertical: (&kage.lines[t]).into(),
            horizontal: (&kage.lines[y]).into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gwv_core::Dump;

    fn check(name: &str, data: &str) -> Option<(&'static str, usize, usize)> {
        let dump = Dump::from_entries([(name, "u3013", data)], 0.0);
        let ctx = ValidatorContext::for_glyph(&dump, dump.get(name).unwrap());
        Corner
            .is_invalid(&ctx)
            .unwrap()
            .map(|e| (e.code(), e.vertical.number, e.horizontal.number))
    }

    #[test]
    fn exact_top_left_corner() {
        // 口 drawn with exact joins
        let data = "1:12:13:30:40:30:170$1:2:2:30:40:170:40$1:22:23:170:40:170:170$1:2:2:30:170:170:170";
        assert_eq!(check("u53e3", data), None);
    }

    #[test]
    fn near_top_left_corner() {
        let data = "1:12:13:30:40:30:170$1:2:2:33:42:170:42";
        assert_eq!(check("u4e00", data), Some(("00", 0, 1)));
    }

    #[test]
    fn open_head_on_top_left() {
        let data = "1:0:0:30:40:30:170$1:2:2:30:43:170:43";
        assert_eq!(check("u4e00", data), Some(("08", 0, 1)));
    }

    #[test]
    fn vertical_meeting_interior() {
        // 丄-like: vertical head stops short of a horizontal
        let exact = "1:0:0:20:100:180:100$1:32:0:100:100:100:180";
        assert_eq!(check("u4e04", exact), None);
        let near = "1:0:0:20:100:180:100$1:32:0:100:103:100:180";
        assert_eq!(check("u4e04", near), Some(("99", 1, 0)));
        let corner = "1:0:0:20:100:180:100$1:12:0:100:100:100:180";
        assert_eq!(check("u4e04", corner), Some(("90", 1, 0)));
    }

    #[test]
    fn horizontal_meeting_vertical_interior() {
        let near = "1:0:0:100:20:100:180$1:0:0:104:100:180:100";
        assert_eq!(check("u4e05", near), Some(("77", 0, 1)));
        let exact = "1:0:0:100:20:100:180$1:0:0:100:100:180:100";
        assert_eq!(check("u4e05", exact), None);
    }

    #[test]
    fn shape_mismatch_outranks_distance() {
        // a near top-left join and a top-right head on a top-left corner
        let data = "1:12:13:30:40:30:170$1:2:2:33:42:100:42$1:22:0:120:60:120:170$1:2:2:122:63:160:63";
        assert_eq!(check("u4e00", data).map(|f| f.0), Some("02"));
    }

    #[test]
    fn zh_corner_only_for_regional_designs() {
        // └ on its own wants the zh corner
        let old_zh = "1:0:313:30:40:30:170$1:2:0:30:170:170:170";
        assert_eq!(check("u4e00", old_zh), None);
        assert_eq!(check("u4e00-t", old_zh), None);
        assert_eq!(check("u4e00-g", old_zh), Some(("64", 0, 1)));

        let plain = "1:0:13:30:40:30:170$1:2:0:30:170:170:170";
        assert_eq!(check("u4e00", plain), None);
        assert_eq!(check("u4e00-t", plain), Some(("41", 0, 1)));
        assert_eq!(check("u4e00-g", plain), Some(("61", 0, 1)));
    }

    #[test]
    fn severity_order() {
        assert_eq!(CornerCode::DisconnectedTopLeft.severity(), 0);
        assert_eq!(CornerCode::BottomLeftZhNewOnBottomLeftZhOld.severity(), 50);
        assert_eq!(CornerCode::TopRightOnTopLeft.severity(), 100);
    }
}
