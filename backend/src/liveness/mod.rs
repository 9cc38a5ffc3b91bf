mod exception;
mod initlocals;
mod interval;
mod safepoint;

pub use initlocals::dead_inits;
pub use interval::{build_intervals, Interval, Range};
pub use safepoint::{live_at_safepoints, Safepoint};

use std::collections::BinaryHeap;

use ir::{BlockId, Function, Opcode, VarId};
use util::BitSet;

use crate::dominator::LoopInfo;
use crate::types::*;

/// Per-block dataflow sets and per-variable ranges of one function.
///
/// Block tables are indexed by `dfn`, variable bitsets and tables by `VarId::index()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Liveness {
    num: Numbering,
    gen: Vec<BitSet>,
    kill: Vec<BitSet>,
    live_in: Vec<BitSet>,
    live_out: Vec<BitSet>,
    ranges: Vec<LiveRange>,
    spill_costs: Vec<u32>,
    volatile: BitSet,
    dead: BitSet,
}

fn cost_increment(nesting: u32) -> u32 {
    1 << (2 * nesting).min(30)
}

impl Liveness {
    pub fn analyze(func: &Function, loops: &LoopInfo) -> Self {
        log::info!("liveness analysis of `{}`", func.name);
        let num = Numbering::new(func);
        let n = num.len();
        let nvars = func.num_vars();
        let mut live = Self {
            num,
            gen: vec![BitSet::new(nvars); n],
            kill: vec![BitSet::new(nvars); n],
            live_in: vec![BitSet::new(nvars); n],
            live_out: vec![BitSet::new(nvars); n],
            ranges: vec![LiveRange::UNUSED; nvars],
            spill_costs: vec![0; nvars],
            volatile: BitSet::new(nvars),
            dead: BitSet::new(nvars),
        };

        exception::pessimize(func, &mut live.volatile);
        for dfn in 0..n {
            live.analyze_block(func, dfn, loops.nesting_dfn(dfn));
        }
        live.solve(func);
        live.extend_ranges();
        live.extend_args(func);
        live
    }

    fn touch(&mut self, v: VarId, pos: Position, nesting: u32) {
        let i = v.index();
        self.ranges[i].update(pos);
        self.spill_costs[i] = self.spill_costs[i].saturating_add(cost_increment(nesting));
    }

    fn note_use(&mut self, dfn: usize, v: VarId, pos: Position, nesting: u32) {
        self.touch(v, pos, nesting);
        if !self.kill[dfn].test(v.index()) {
            self.gen[dfn].set(v.index());
        }
    }

    fn analyze_block(&mut self, func: &Function, dfn: usize, nesting: u32) {
        let block = &func.blocks[self.num.block(dfn)];
        for (idx, inst) in block.insts.iter().enumerate() {
            if inst.op == Opcode::Nop {
                continue;
            }
            let pp = ProgramPoint::new(dfn, idx);

            for v in &inst.srcs {
                self.note_use(dfn, *v, pp.use_pos(), nesting);
            }
            if let Some(d) = inst.dest {
                if inst.op.is_store_membase() {
                    self.note_use(dfn, d, pp.use_pos(), nesting);
                } else {
                    self.touch(d, pp.def_pos(), nesting);
                    self.kill[dfn].set(d.index());
                }
            }
        }
    }

    fn solve(&mut self, func: &Function) {
        let n = self.num.len();
        let mut worklist: BinaryHeap<usize> = (0..n).collect();
        let mut in_worklist = vec![true; n];
        let mut has_in = vec![false; n];
        let mut visited = vec![false; n];
        let mut iterations = 0;

        while let Some(dfn) = worklist.pop() {
            in_worklist[dfn] = false;
            iterations += 1;
            let block = &func.blocks[self.num.block(dfn)];
            if block.succs.is_empty() {
                continue;
            }

            let mut changed = false;
            // nothing flows back into a block that never falls through
            if !block.ends_unreachable() {
                for s in &block.succs {
                    let sd = self.num.expect_dfn(*s);
                    if !has_in[sd] {
                        let mut init = self.live_out[sd].clone();
                        init.subtract(&self.kill[sd]);
                        init.union_with(&self.gen[sd]);
                        self.live_in[sd] = init;
                        has_in[sd] = true;
                    }
                    changed |= self.live_out[dfn].union_with(&self.live_in[sd]);
                }
            }

            if changed || !visited[dfn] {
                visited[dfn] = true;
                let mut live_in = self.live_out[dfn].clone();
                live_in.subtract(&self.kill[dfn]);
                live_in.union_with(&self.gen[dfn]);
                self.live_in[dfn] = live_in;
                has_in[dfn] = true;

                for p in &block.preds {
                    if let Some(pd) = self.num.dfn(*p) {
                        if !in_worklist[pd] {
                            in_worklist[pd] = true;
                            worklist.push(pd);
                        }
                    }
                }
            }
        }

        for dfn in 0..n {
            if !has_in[dfn] {
                self.live_in[dfn] = self.gen[dfn].clone();
            }
        }
        log::trace!("liveness fixpoint took {iterations} block visits");
    }

    fn extend_ranges(&mut self) {
        for dfn in 0..self.num.len() {
            for v in self.live_in[dfn].iter() {
                self.ranges[v].update(block_start(dfn));
            }
            for v in self.live_out[dfn].iter() {
                self.ranges[v].update(block_end(dfn));
            }
        }
    }

    fn extend_args(&mut self, func: &Function) {
        for a in &func.args {
            let i = a.index();
            if self.ranges[i].is_unused() && !self.volatile.test(i) && !func.vars[*a].indirect {
                log::debug!("argument `{}` is never used", func.vars[*a].name);
                self.dead.set(i);
            }
            self.ranges[i].first_use = 0;
        }
    }

    /// Solves the dataflow equations again on the stored gen/kill sets.
    /// Returns whether any live-in or live-out set differs from the stored one.
    pub fn recompute(&mut self, func: &Function) -> bool {
        let old_in = std::mem::take(&mut self.live_in);
        let old_out = std::mem::take(&mut self.live_out);
        let nvars = func.num_vars();
        self.live_in = vec![BitSet::new(nvars); self.num.len()];
        self.live_out = vec![BitSet::new(nvars); self.num.len()];
        self.solve(func);
        old_in != self.live_in || old_out != self.live_out
    }

    pub fn numbering(&self) -> &Numbering {
        &self.num
    }

    pub fn num_vars(&self) -> usize {
        self.ranges.len()
    }

    pub fn gen_of(&self, dfn: usize) -> &BitSet {
        &self.gen[dfn]
    }

    pub fn kill_of(&self, dfn: usize) -> &BitSet {
        &self.kill[dfn]
    }

    pub fn live_in_of(&self, dfn: usize) -> &BitSet {
        &self.live_in[dfn]
    }

    pub fn live_out_of(&self, dfn: usize) -> &BitSet {
        &self.live_out[dfn]
    }

    pub fn live_in(&self, b: BlockId) -> Option<&BitSet> {
        self.num.dfn(b).map(|d| &self.live_in[d])
    }

    pub fn live_out(&self, b: BlockId) -> Option<&BitSet> {
        self.num.dfn(b).map(|d| &self.live_out[d])
    }

    pub fn range(&self, v: VarId) -> LiveRange {
        self.ranges[v.index()]
    }

    pub fn spill_cost(&self, v: VarId) -> u32 {
        self.spill_costs[v.index()]
    }

    /// Variables an exception handler may observe; they stay in memory.
    pub fn is_volatile(&self, v: VarId) -> bool {
        self.volatile.test(v.index())
    }

    /// Arguments that are never referenced.
    pub fn is_dead(&self, v: VarId) -> bool {
        self.dead.test(v.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dominator::DomInfo;

    fn analyze(src: &str) -> (Function, Liveness) {
        let func = parser::parse(src).unwrap().remove(0);
        let dom = DomInfo::compute(&func);
        let loops = LoopInfo::compute(&func, &dom);
        let live = Liveness::analyze(&func, &loops);
        (func, live)
    }

    fn var_names(func: &Function, set: &BitSet) -> Vec<String> {
        func.vars
            .iter()
            .filter(|(v, _)| set.test(v.index()))
            .map(|(_, v)| v.name.clone())
            .collect()
    }

    const DIAMOND: &str = "
method diamond(c) {
    locals x, y
entry:
    x = const 1
    branch c -> l, r
l:
    y = const 2
    -> join
r:
    y = const 3
    -> join
join:
    ret x
}
";

    #[test]
    fn diamond_liveness() {
        let (func, live) = analyze(DIAMOND);
        let b = |name| func.find_block(name).unwrap();
        let x = func.find_var("x").unwrap();
        let names = |set: Option<&BitSet>| var_names(&func, set.unwrap());

        assert_eq!(names(live.live_out(b("entry"))), vec!["x"]);
        assert_eq!(names(live.live_in(b("l"))), vec!["x"]);
        assert_eq!(names(live.live_out(b("l"))), vec!["x"]);
        assert_eq!(names(live.live_in(b("r"))), vec!["x"]);
        assert_eq!(names(live.live_out(b("r"))), vec!["x"]);
        assert_eq!(names(live.live_in(b("join"))), vec!["x"]);
        assert!(live.live_out(b("join")).unwrap().is_empty());
        assert_eq!(names(live.live_in(b("entry"))), vec!["c"]);

        let join = func.blocks[b("join")].dfn;
        let range = live.range(x);
        assert_eq!(range.first_use, ProgramPoint::new(0, 0).def_pos());
        assert_eq!(range.last_use, ProgramPoint::new(join, 0).use_pos());

        // y is defined on both arms and never read
        let y = func.find_var("y").unwrap();
        assert!(!live.live_in(b("join")).unwrap().test(y.index()));
    }

    #[test]
    fn gen_kill_and_self_move() {
        let src = "
method m(a) {
    locals v, p
entry:
    v = move v
    v = add v, a
    p = store v
    nop
    ret v
}
";
        let (func, live) = analyze(src);
        let v = func.find_var("v").unwrap();
        let p = func.find_var("p").unwrap();
        let a = func.find_var("a").unwrap();

        assert_eq!(var_names(&func, live.gen_of(0)), vec!["a", "v", "p"]);
        assert_eq!(var_names(&func, live.kill_of(0)), vec!["v"]);
        assert!(!live.kill_of(0).test(p.index()));
        // arguments start at the method entry
        assert_eq!(live.range(a).first_use, 0);
        assert_eq!(live.range(v).last_use, ProgramPoint::new(0, 4).use_pos());
        // six references outside of any loop
        assert_eq!(live.spill_cost(v), 6);
    }

    #[test]
    fn loop_weights_spill_cost() {
        let src = "
method m() {
    locals i, k
entry:
    i = const 0
    k = const 1
    -> head
head:
    i = add i, k
    branch i -> head, exit
exit:
    ret i
}
";
        let (func, live) = analyze(src);
        let i = func.find_var("i").unwrap();
        let k = func.find_var("k").unwrap();
        // one def in entry, three references at nesting 1, one use in exit
        assert_eq!(live.spill_cost(i), 1 + 3 * 4 + 1);
        assert_eq!(live.spill_cost(k), 1 + 4);

        let head = func.find_block("head").unwrap();
        assert!(live.live_out(head).unwrap().test(k.index()));
        let exit = func.blocks[func.find_block("exit").unwrap()].dfn;
        assert_eq!(live.range(k).last_use, block_end(func.blocks[head].dfn));
        assert_eq!(live.range(i).last_use, ProgramPoint::new(exit, 0).use_pos());
    }

    #[test]
    fn unused_argument_is_dead() {
        let src = "
method m(a, b, c) {
    indirect c
entry:
    ret b
}
";
        let (func, live) = analyze(src);
        let a = func.find_var("a").unwrap();
        let b = func.find_var("b").unwrap();
        let c = func.find_var("c").unwrap();
        assert!(live.is_dead(a));
        // read at position 0, so last_use alone cannot tell it apart from a
        assert!(!live.is_dead(b));
        assert_eq!(live.range(b).last_use, 0);
        assert!(!live.is_dead(c));
        assert_eq!(live.range(a).first_use, 0);
        assert!(live.range(a).is_empty());
    }

    #[test]
    fn never_returning_block_keeps_live_out_empty() {
        let src = "
method m(a) {
    locals x
entry:
    x = const 1
    branch a -> fail, ok
fail:
    call a
    unreachable -> ok
ok:
    ret x
}
";
        let (func, live) = analyze(src);
        let fail = func.find_block("fail").unwrap();
        let ok = func.find_block("ok").unwrap();
        assert!(live.live_out(fail).unwrap().is_empty());
        assert_eq!(var_names(&func, live.live_in(fail).unwrap()), vec!["a"]);
        assert_eq!(var_names(&func, live.live_in(ok).unwrap()), vec!["x"]);
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let src = "
method m(n) {
    locals i, s, t
entry:
    i = const 0
    s = const 0
    -> head
head:
    t = cmp i, n
    branch t -> body, exit
body:
    s = add s, i
    i = add i, n
    branch s -> head, inner
inner:
    t = mul s, s
    -> head
exit:
    ret s
}
";
        let (func, mut live) = analyze(src);
        let before = live.clone();
        assert!(!live.recompute(&func));
        assert_eq!(live, before);

        // live_in = (live_out - kill) U gen holds everywhere
        for dfn in 0..live.numbering().len() {
            let mut expect = live.live_out_of(dfn).clone();
            expect.subtract(live.kill_of(dfn));
            expect.union_with(live.gen_of(dfn));
            assert_eq!(&expect, live.live_in_of(dfn));
            assert!(live.gen_of(dfn).is_subset(live.live_in_of(dfn)));
        }
    }

    #[test]
    fn ranges_contain_every_reference() {
        let (func, live) = analyze(DIAMOND);
        for dfn in 0..live.numbering().len() {
            let block = &func.blocks[live.numbering().block(dfn)];
            for (idx, inst) in block.insts.iter().enumerate() {
                let pp = ProgramPoint::new(dfn, idx);
                for s in &inst.srcs {
                    assert!(live.range(*s).contains(pp.use_pos()));
                }
                if let Some(d) = inst.dest {
                    assert!(live.range(d).contains(pp.def_pos()));
                }
            }
            for v in live.live_in_of(dfn).iter() {
                assert!(live.ranges[v].contains(block_start(dfn)));
            }
            for v in live.live_out_of(dfn).iter() {
                assert!(live.ranges[v].contains(block_end(dfn)));
            }
        }
    }
}
