//! Whether a vertical ending in a bottom-left corner should use the zh-style
//! corner, guessed from the shape of the surrounding connection graph.
//!
//! Each block below recognizes one skeleton where the plain corner is right
//! even though the corner closes a box.

use super::segment::{Graph, Pos};

/// `t` must have an end connection.
pub fn is_zh_corner(g: &Graph, t: usize) -> bool {
    let Some(t_end) = g.end_conn(t) else {
        return false;
    };
    let y = t_end.yoko;
    let tg = g.geom(t);
    let yg = g.geom(y);
    let t_stt = g.stt_conn(t);
    let y_end = g.end_conn(y);

    // 　┐
    // └┘
    // but not
    // ┐┐
    // └┘
    if tg.is_vert() && t_stt.map_or(true, |c| c.yoko_pos != Pos::End) {
        if let Some(ye) = y_end.filter(|c| c.tate_pos == Pos::End) {
            if g.stt_conn(ye.tate).is_some_and(|c| c.yoko_pos == Pos::End) {
                return false;
            }
        }
    }

    // ┌┐     ┌┐     ┌
    // ├一 or ├┤ or ├一 ┤
    // └      └      └
    if let Some(ts) = t_stt.filter(|c| c.yoko_pos == Pos::Start) {
        let midys: Vec<usize> = g
            .mid_conns(t)
            .filter(|c| c.yoko_pos == Pos::Start)
            .map(|c| c.yoko)
            .collect();
        let y2 = ts.yoko;
        let y2_end = g.end_conn(y2).filter(|c| c.tate_pos == Pos::Start);
        match y2_end {
            Some(y2e) if !midys.is_empty() => {
                // 曰・烏・鳥
                if midys
                    .iter()
                    .any(|&my| g.end_conn(my).is_none() && g.geom(my).end == 0)
                {
                    return false;
                }
                // 日・目
                if midys.iter().any(|&my| {
                    g.end_conn(my)
                        .is_some_and(|c| c.tate_pos == Pos::Mid && c.tate == y2e.tate)
                }) {
                    return false;
                }
            }
            _ => {
                // 臼
                for &my in &midys {
                    let mg = g.geom(my);
                    if g.end_conn(my).is_some() || mg.end != 0 {
                        continue;
                    }
                    // walks the verticals, so a vertical's end never sits at a mid
                    for &oy in &g.tate {
                        if oy == my {
                            continue;
                        }
                        let og = g.geom(oy);
                        if g.stt_conn(oy).is_none()
                            && og.end != super::segment::NO_END
                            && g.end_conn(oy).is_some_and(|c| c.tate_pos == Pos::Mid)
                            && og.x0 > mg.x1
                            && (-4..=4).contains(&(og.y0 - mg.y1))
                        {
                            return false;
                        }
                    }
                }
            }
        }
    }

    // ├┼一
    // └┴
    let midys: Vec<usize> = g
        .mid_conns(t)
        .filter(|c| {
            c.yoko_pos == Pos::Start && g.end_conn(c.yoko).is_none() && g.geom(c.yoko).end == 0
        })
        .map(|c| c.yoko)
        .collect();
    let midts: Vec<usize> = g
        .mid_conns(y)
        .filter(|c| c.tate_pos == Pos::End)
        .map(|c| c.tate)
        .collect();
    for &my in &midys {
        for &mt in &midts {
            let (mg, tg2) = (g.geom(my), g.geom(mt));
            if mg.x1 > tg2.x1 && mg.y0 > tg2.y0 {
                return false;
            }
        }
    }

    // ┌─┐
    // └┐┘
    // 　╰
    if let (Some(ts), Some(ye)) = (
        t_stt.filter(|c| c.yoko_pos == Pos::Start),
        y_end.filter(|c| c.tate_pos == Pos::Start),
    ) {
        let t2_type = g.geom(ye.tate).stroke_type;
        if t2_type == 3 {
            if let Some(y2e) = g.end_conn(ts.yoko).filter(|c| c.tate_pos == Pos::Start) {
                if g.end_conn(y2e.tate).is_some_and(|c| c.yoko_pos == Pos::End) {
                    return false;
                }
            }
        }
    }

    // ┌┬     ┌┤
    // └┤ or ├┤
    //        └┤
    if let (Some(ts), Some(ye)) = (
        t_stt.filter(|c| c.yoko_pos == Pos::Start),
        y_end.filter(|c| c.tate_pos == Pos::Mid),
    ) {
        let t2 = ye.tate;
        if g.stt_conn(t2)
            .is_some_and(|c| c.yoko_pos == Pos::Mid && c.yoko == ts.yoko)
        {
            return false;
        }
        if !g.segs[t].mid.is_empty() {
            let midys: Vec<usize> = g
                .mid_conns(t)
                .filter(|c| c.yoko_pos == Pos::Start)
                .map(|c| c.yoko)
                .collect();
            let y2e = g
                .end_conn(ts.yoko)
                .filter(|c| c.tate_pos == Pos::Mid && c.tate == t2);
            if let Some(y2e) = y2e {
                if !midys.is_empty()
                    && midys.iter().any(|&my| {
                        g.end_conn(my)
                            .is_some_and(|c| c.tate_pos == Pos::Mid && c.tate == y2e.tate)
                    })
                {
                    return false;
                }
            }
        }
    }

    // 廿
    if t_stt.is_none() && tg.start == 0 {
        if let Some(ye) = y_end.filter(|c| c.tate_pos == Pos::End) {
            let t2 = ye.tate;
            let t2g = g.geom(t2);
            if g.stt_conn(t2).is_none() && t2g.start == 0 {
                let ymin = tg.y0.max(t2g.y0);
                let ymax = tg.y1.min(t2g.y1);
                // verticals never straddle `y`, so no candidate qualifies
                for &py in &g.tate {
                    let pg = g.geom(py);
                    if g.stt_conn(py).is_none()
                        && g.end_conn(py).is_none()
                        && pg.end == 0
                        && pg.x0 < yg.x0
                        && pg.x1 > yg.x1
                        && ymin < pg.y0
                        && pg.y0 < ymax
                        && ymin < pg.y1
                        && pg.y1 < ymax
                    {
                        return false;
                    }
                }
            }
        }
    }

    true
}
