//! Segment decomposition and the connection graph.
//!
//! Segments live in an arena and refer to connections by index; a
//! connection refers back to its two segments by index. Each segment end
//! holds at most one connection, the interior any number.

use gwv_core::{is_yoko, KageData, KageLine, Result};

/// End shape of a segment end that is not a real stroke end.
pub const NO_END: i64 = -1;

/// Where a connection attaches to a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pos {
    Start,
    Mid,
    End,
}

/// Outcome of matching two segment ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Exact join with matching shapes
    Exact,
    Error(super::CornerCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geom {
    /// Index of the stroke record
    pub line: usize,
    pub stroke_type: i64,
    pub start: i64,
    pub end: i64,
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl Geom {
    fn new(line: usize, stroke_type: i64, start: i64, end: i64, p: [i64; 4]) -> Self {
        Self {
            line,
            stroke_type,
            start,
            end,
            x0: p[0],
            y0: p[1],
            x1: p[2],
            y1: p[3],
        }
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.start, &mut self.end);
        std::mem::swap(&mut self.x0, &mut self.x1);
        std::mem::swap(&mut self.y0, &mut self.y1);
    }

    pub fn is_yoko(&self) -> bool {
        is_yoko(self.x0, self.y0, self.x1, self.y1)
    }

    pub fn is_vert(&self) -> bool {
        self.x0 == self.x1
    }

    pub fn is_hori(&self) -> bool {
        self.y0 == self.y1
    }

    /// Order the ends left to right (horizontal) or top to bottom.
    fn normalize(&mut self) {
        let reversed = if self.is_yoko() {
            self.x1 < self.x0
        } else {
            self.y1 < self.y0
        };
        if reversed {
            self.reverse();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub geom: Geom,
    pub stt: Option<usize>,
    pub end: Option<usize>,
    pub mid: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct Connection {
    pub tate: usize,
    pub yoko: usize,
    pub tate_pos: Pos,
    pub yoko_pos: Pos,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct Graph {
    pub segs: Vec<Segment>,
    pub conns: Vec<Connection>,
    /// Near-vertical segments
    pub tate: Vec<usize>,
    /// Exactly vertical segments
    pub tate_vert: Vec<usize>,
    /// Near-horizontal segments
    pub yoko: Vec<usize>,
    /// Exactly horizontal segments
    pub yoko_hori: Vec<usize>,
}

fn point(line: &KageLine, column: usize) -> Result<[i64; 2]> {
    Ok([line.int(column)?, line.int(column + 1)?])
}

fn leg(line: &KageLine, column: usize) -> Result<[i64; 4]> {
    let a = point(line, column)?;
    let b = point(line, column + 2)?;
    Ok([a[0], a[1], b[0], b[1]])
}

impl Graph {
    pub fn build(kage: &KageData) -> Result<Self> {
        let mut graph = Graph::default();
        for (idx, line) in kage.lines.iter().enumerate() {
            if line.len() <= 2 {
                continue;
            }
            let Some(stype) = line.stroke_code() else {
                continue;
            };
            match stype {
                1 => {
                    let (head, tail) = (line.int(1)?, line.int(2)?);
                    graph.push_classified(Geom::new(idx, stype, head, tail, leg(line, 3)?));
                }
                2 | 6 => {
                    let (head, tail) = (line.int(1)?, line.int(2)?);
                    let stt = point(line, 3)?;
                    let end = point(line, if stype == 2 { 7 } else { 9 })?;
                    if [12, 22, 32].contains(&head) {
                        let geom = Geom::new(idx, stype, head, NO_END, [stt[0], stt[1], end[0], end[1]]);
                        let seg = graph.push(geom);
                        graph.tate.push(seg);
                    }
                    if tail == 7 && stt[0] > end[0] {
                        // a left-sweeping tail reads as a horizontal (臼)
                        let geom = Geom::new(idx, stype, 2, NO_END, [end[0], end[1], stt[0], stt[1]]);
                        let seg = graph.push(geom);
                        graph.yoko.push(seg);
                    }
                }
                3 | 4 | 7 => {
                    let (head, tail) = (line.int(1)?, line.int(2)?);
                    graph.push_classified(Geom::new(idx, stype, head, NO_END, leg(line, 3)?));
                    if stype == 7 {
                        if tail == 7 && line.int(5)? > line.int(9)? {
                            let from = point(line, 9)?;
                            let to = point(line, 5)?;
                            let geom = Geom::new(idx, stype, 2, NO_END, [from[0], from[1], to[0], to[1]]);
                            let seg = graph.push(geom);
                            graph.yoko.push(seg);
                        }
                    } else {
                        graph.push_classified(Geom::new(idx, stype, NO_END, NO_END, leg(line, 5)?));
                    }
                }
                _ => {}
            }
        }
        Ok(graph)
    }

    fn push(&mut self, geom: Geom) -> usize {
        self.segs.push(Segment {
            geom,
            stt: None,
            end: None,
            mid: Vec::new(),
        });
        self.segs.len() - 1
    }

    fn push_classified(&mut self, mut geom: Geom) {
        geom.normalize();
        let yoko = geom.is_yoko();
        let (hori, vert) = (geom.is_hori(), geom.is_vert());
        let seg = self.push(geom);
        if yoko {
            if hori {
                self.yoko_hori.push(seg);
            }
            self.yoko.push(seg);
        } else {
            if vert {
                self.tate_vert.push(seg);
            }
            self.tate.push(seg);
        }
    }

    pub fn geom(&self, seg: usize) -> Geom {
        self.segs[seg].geom
    }

    pub fn stt_conn(&self, seg: usize) -> Option<&Connection> {
        self.segs[seg].stt.map(|id| &self.conns[id])
    }

    pub fn end_conn(&self, seg: usize) -> Option<&Connection> {
        self.segs[seg].end.map(|id| &self.conns[id])
    }

    pub fn mid_conns(&self, seg: usize) -> impl Iterator<Item = &Connection> + '_ {
        self.segs[seg].mid.iter().map(|&id| &self.conns[id])
    }

    /// Link `tate` and `yoko`.
    ///
    /// An end slot already holding an exact join keeps it and the link stops
    /// there, possibly after the vertical side was already linked. Any other
    /// occupant is evicted.
    pub fn connect(&mut self, tate: usize, yoko: usize, tate_pos: Pos, yoko_pos: Pos, outcome: Outcome) {
        let id = self.conns.len();
        self.conns.push(Connection {
            tate,
            yoko,
            tate_pos,
            yoko_pos,
            outcome,
        });
        if !self.attach(tate, tate_pos, id) {
            return;
        }
        self.attach(yoko, yoko_pos, id);
    }

    fn attach(&mut self, seg: usize, pos: Pos, id: usize) -> bool {
        let occupant = match pos {
            Pos::Start => self.segs[seg].stt,
            Pos::End => self.segs[seg].end,
            Pos::Mid => {
                self.segs[seg].mid.push(id);
                return true;
            }
        };
        if let Some(old) = occupant {
            if self.conns[old].outcome == Outcome::Exact {
                return false;
            }
            self.disconnect(old);
        }
        match pos {
            Pos::Start => self.segs[seg].stt = Some(id),
            Pos::End => self.segs[seg].end = Some(id),
            Pos::Mid => {}
        }
        true
    }

    fn disconnect(&mut self, id: usize) {
        let conn = self.conns[id];
        self.detach(conn.tate, conn.tate_pos, id);
        self.detach(conn.yoko, conn.yoko_pos, id);
    }

    fn detach(&mut self, seg: usize, pos: Pos, id: usize) {
        let seg = &mut self.segs[seg];
        match pos {
            Pos::Start => seg.stt = None,
            Pos::End => seg.end = None,
            Pos::Mid => seg.mid.retain(|&other| other != id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corner::CornerCode;

    #[test]
    fn straight_lines_are_normalized() {
        let kage = KageData::parse("1:0:0:190:100:10:100$1:0:0:100:190:100:10");
        let graph = Graph::build(&kage).unwrap();
        assert_eq!(graph.yoko, vec![0]);
        assert_eq!(graph.yoko_hori, vec![0]);
        assert_eq!(graph.tate_vert, vec![1]);
        let h = graph.geom(0);
        assert_eq!((h.x0, h.x1), (10, 190));
        let v = graph.geom(1);
        assert_eq!((v.y0, v.y1), (10, 190));
    }

    #[test]
    fn bent_line_has_two_legs() {
        let kage = KageData::parse("3:0:5:30:20:30:170:180:170");
        let graph = Graph::build(&kage).unwrap();
        assert_eq!(graph.tate.len(), 1);
        assert_eq!(graph.yoko.len(), 1);
        let second = graph.geom(graph.yoko[0]);
        assert_eq!((second.start, second.end), (NO_END, NO_END));
    }

    #[test]
    fn left_sweep_reads_as_horizontal() {
        let kage = KageData::parse("2:22:7:100:20:90:80:30:120");
        let graph = Graph::build(&kage).unwrap();
        assert_eq!(graph.tate.len(), 1);
        assert_eq!(graph.yoko.len(), 1);
        let y = graph.geom(graph.yoko[0]);
        assert_eq!((y.x0, y.y0, y.x1, y.y1, y.start), (30, 120, 100, 20, 2));
    }

    #[test]
    fn exact_join_is_not_evicted() {
        let kage = KageData::parse("1:0:0:10:10:190:10$1:12:0:10:10:10:190");
        let mut graph = Graph::build(&kage).unwrap();
        let (y, t) = (graph.yoko[0], graph.tate[0]);
        graph.connect(t, y, Pos::Start, Pos::Start, Outcome::Exact);
        graph.connect(t, y, Pos::Start, Pos::Start, Outcome::Error(CornerCode::DisconnectedTopLeft));
        assert_eq!(graph.stt_conn(t).unwrap().outcome, Outcome::Exact);
        assert_eq!(graph.stt_conn(y).unwrap().outcome, Outcome::Exact);
    }

    #[test]
    fn error_join_is_evicted() {
        let kage = KageData::parse("1:0:0:10:10:190:10$1:12:0:10:10:10:190");
        let mut graph = Graph::build(&kage).unwrap();
        let (y, t) = (graph.yoko[0], graph.tate[0]);
        graph.connect(t, y, Pos::Start, Pos::Start, Outcome::Error(CornerCode::DisconnectedTopLeft));
        graph.connect(t, y, Pos::Start, Pos::Mid, Outcome::Exact);
        assert_eq!(graph.stt_conn(t).unwrap().outcome, Outcome::Exact);
        assert!(graph.stt_conn(y).is_none());
        assert_eq!(graph.mid_conns(y).count(), 1);
    }
}
