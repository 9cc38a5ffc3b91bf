use std::fmt;

use ir::Function;

use super::Liveness;
use crate::types::*;

/// Half-open sub-range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub from: Position,
    pub to: Position,
}

/// Ordered, disjoint, non-adjacent sub-ranges of one variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interval {
    ranges: Vec<Range>,
}

impl Interval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn start(&self) -> Option<Position> {
        self.ranges.first().map(|r| r.from)
    }

    pub fn end(&self) -> Option<Position> {
        self.ranges.last().map(|r| r.to)
    }

    /// Adds `[from, to)`, merging it with every sub-range it overlaps or touches.
    pub fn add_range(&mut self, from: Position, to: Position) {
        assert!(from < to, "empty range [{from}, {to})");
        let lo = self.ranges.partition_point(|r| r.to < from);
        let hi = self.ranges.partition_point(|r| r.from <= to);
        if lo == hi {
            self.ranges.insert(lo, Range { from, to });
            return;
        }
        let merged = Range {
            from: from.min(self.ranges[lo].from),
            to: to.max(self.ranges[hi - 1].to),
        };
        self.ranges[lo] = merged;
        self.ranges.drain(lo + 1..hi);
    }

    pub fn covers(&self, pos: Position) -> bool {
        let i = self.ranges.partition_point(|r| r.to <= pos);
        self.ranges.get(i).map_or(false, |r| r.from <= pos)
    }

    /// The first position covered by both intervals.
    pub fn intersect_pos(&self, other: &Interval) -> Option<Position> {
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let a = self.ranges[i];
            let b = other.ranges[j];
            if a.from < b.to && b.from < a.to {
                return Some(a.from.max(b.from));
            }
            if a.to <= b.to {
                i += 1;
            } else {
                j += 1;
            }
        }
        None
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ranges: Vec<_> = self
            .ranges
            .iter()
            .map(|r| format!("[{:#x}, {:#x})", r.from, r.to))
            .collect();
        util::format_vec(f, &ranges, "", " ", "")
    }
}

/// Builds the interval of every variable from a solved liveness result.
///
/// Each block is scanned backwards starting from its live-out set. A use opens the
/// range up to just after the use; the def closes it; whatever is still open at the
/// top of the block is live in and covers the block from its start.
pub fn build_intervals(func: &Function, live: &Liveness) -> Vec<Interval> {
    log::info!("building intervals of `{}`", func.name);
    let mut intervals = vec![Interval::new(); live.num_vars()];
    let num = live.numbering();

    for dfn in (0..num.len()).rev() {
        let block = &func.blocks[num.block(dfn)];
        let mut open: Vec<Option<Position>> = vec![None; live.num_vars()];
        for v in live.live_out_of(dfn).iter() {
            open[v] = Some(block_limit(dfn));
        }

        for (idx, inst) in block.insts.iter().enumerate().rev() {
            if inst.op == ir::Opcode::Nop {
                continue;
            }
            let pp = ProgramPoint::new(dfn, idx);
            if let Some(d) = inst.dest {
                if !inst.op.is_store_membase() {
                    let d = d.index();
                    // a dead def still occupies its slot
                    let to = open[d].take().unwrap_or(pp.def_pos() + 1);
                    intervals[d].add_range(pp.def_pos(), to);
                }
            }

            let uses = inst
                .srcs
                .iter()
                .chain(inst.dest.iter().filter(|_| inst.op.is_store_membase()));
            for v in uses {
                let v = v.index();
                if open[v].is_none() {
                    open[v] = Some(pp.use_pos() + 1);
                }
            }
        }

        for (v, to) in open.into_iter().enumerate() {
            if let Some(to) = to {
                intervals[v].add_range(block_start(dfn), to);
            }
        }
    }

    for a in &func.args {
        let iv = &mut intervals[a.index()];
        if let Some(to) = iv.start() {
            if to > 0 {
                iv.add_range(0, to);
            }
        }
    }
    intervals
}
