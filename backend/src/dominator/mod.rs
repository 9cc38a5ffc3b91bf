mod dump;
mod loops;

pub use dump::Dump;
pub use loops::LoopInfo;

use ir::{BlockId, Function};
use util::BitSet;

use crate::types::Numbering;

/// Dominator tree and dominance frontiers of the reachable blocks.
///
/// All tables are indexed by `dfn`; block bitsets use `dfn` as the bit index.
#[derive(Debug, Clone, PartialEq)]
pub struct DomInfo {
    num: Numbering,
    idom: Vec<Option<usize>>,
    doms: Vec<BitSet>,
    children: Vec<Vec<usize>>,
    frontier: Vec<BitSet>,
}

fn intersect(doms: &[Option<usize>], mut a: usize, mut b: usize) -> usize {
    while a != b {
        while a > b {
            a = doms[a].expect("climbing through a block without dominator");
        }
        while b > a {
            b = doms[b].expect("climbing through a block without dominator");
        }
    }
    a
}

impl DomInfo {
    pub fn compute(func: &Function) -> Self {
        log::info!("computing dominators of `{}`", func.name);
        let num = Numbering::new(func);
        let n = num.len();
        assert!(
            n > 0 && num.dfn(func.entry) == Some(0),
            "the entry block must be reachable and numbered first"
        );

        // the entry is its own dominator while iterating
        let mut doms: Vec<Option<usize>> = vec![None; n];
        doms[0] = Some(0);

        let mut changed = true;
        let mut round = 0;
        while changed {
            changed = false;
            round += 1;
            for dfn in 1..n {
                let block = &func.blocks[num.block(dfn)];
                let mut new_idom = None;
                for p in &block.preds {
                    let pd = match num.dfn(*p) {
                        Some(pd) if doms[pd].is_some() => pd,
                        _ => continue,
                    };
                    new_idom = Some(match new_idom {
                        None => pd,
                        Some(cur) => intersect(&doms, cur, pd),
                    });
                }
                assert!(
                    new_idom.is_some(),
                    "block `{}` has no predecessor with a dominator",
                    block.name
                );
                if doms[dfn] != new_idom {
                    doms[dfn] = new_idom;
                    changed = true;
                }
            }
        }
        log::trace!("dominators converged after {round} rounds");

        let mut idom = doms;
        idom[0] = None;

        let mut dom_sets = Vec::with_capacity(n);
        let mut children = vec![vec![]; n];
        for dfn in 0..n {
            let mut set = BitSet::new(n);
            set.set(0);
            set.set(dfn);
            let mut cur = idom[dfn];
            while let Some(d) = cur {
                set.set(d);
                cur = idom[d];
            }
            dom_sets.push(set);
            if let Some(d) = idom[dfn] {
                children[d].push(dfn);
            }
        }

        let mut info = Self {
            num,
            idom,
            doms: dom_sets,
            children,
            frontier: vec![BitSet::new(n); n],
        };
        info.compute_frontiers(func);
        info
    }

    fn compute_frontiers(&mut self, func: &Function) {
        for dfn in 0..self.num.len() {
            let block = &func.blocks[self.num.block(dfn)];
            // the entry joins control flow as soon as it has a predecessor
            if block.preds.len() < 2 && dfn != 0 {
                continue;
            }
            let stop = self.idom[dfn];
            for p in &block.preds {
                let mut runner = self.num.dfn(*p);
                while let Some(r) = runner {
                    if Some(r) == stop {
                        break;
                    }
                    self.frontier[r].set(dfn);
                    runner = self.idom[r];
                }
            }
        }
    }

    pub fn numbering(&self) -> &Numbering {
        &self.num
    }

    pub fn len(&self) -> usize {
        self.num.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num.is_empty()
    }

    /// Whether `a` dominates `b`. Unreachable blocks dominate nothing and are dominated by nothing.
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        match (self.num.dfn(a), self.num.dfn(b)) {
            (Some(a), Some(b)) => self.dominates_dfn(a, b),
            _ => false,
        }
    }

    pub fn dominates_dfn(&self, a: usize, b: usize) -> bool {
        self.doms[b].test(a)
    }

    pub fn strictly_dominates(&self, a: BlockId, b: BlockId) -> bool {
        a != b && self.dominates(a, b)
    }

    pub fn idom(&self, b: BlockId) -> Option<BlockId> {
        let dfn = self.num.dfn(b)?;
        self.idom[dfn].map(|d| self.num.block(d))
    }

    pub fn idom_dfn(&self, dfn: usize) -> Option<usize> {
        self.idom[dfn]
    }

    /// Blocks immediately dominated by `b`.
    pub fn dominated(&self, b: BlockId) -> Vec<BlockId> {
        match self.num.dfn(b) {
            Some(dfn) => self.children[dfn].iter().map(|c| self.num.block(*c)).collect(),
            None => vec![],
        }
    }

    pub fn dominators_of(&self, dfn: usize) -> &BitSet {
        &self.doms[dfn]
    }

    pub fn frontier_of(&self, dfn: usize) -> &BitSet {
        &self.frontier[dfn]
    }

    pub fn frontier(&self, b: BlockId) -> Vec<BlockId> {
        match self.num.dfn(b) {
            Some(dfn) => self.frontier[dfn].iter().map(|d| self.num.block(d)).collect(),
            None => vec![],
        }
    }

    /// Iterated dominance frontier of a set of blocks given by `dfn`.
    pub fn iterated_frontier(&self, set: &BitSet) -> BitSet {
        let mut result = BitSet::new(self.num.len());
        for b in set.iter() {
            result.union_with(&self.frontier[b]);
        }

        loop {
            let mut next = result.clone();
            for b in result.iter() {
                next.union_with(&self.frontier[b]);
            }
            if next == result {
                break;
            }
            result = next;
        }
        result
    }

    pub fn iterated_frontier_of(&self, blocks: &[BlockId]) -> Vec<BlockId> {
        let mut set = BitSet::new(self.num.len());
        for b in blocks {
            if let Some(dfn) = self.num.dfn(*b) {
                set.set(dfn);
            }
        }
        self.iterated_frontier(&set)
            .iter()
            .map(|d| self.num.block(d))
            .collect()
    }
}
