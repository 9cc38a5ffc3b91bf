use ir::{BlockId, Function};
use util::Map;

use super::DomInfo;
use crate::types::Numbering;

/// Natural loops found from the back edges of the dominator tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopInfo {
    num: Numbering,
    // header dfn -> member dfns, in discovery order
    bodies: Map<usize, Vec<usize>>,
    headers: Vec<usize>,
    nesting: Vec<u32>,
    loops_of: Vec<Vec<usize>>,
    body_start: Vec<bool>,
}

impl LoopInfo {
    pub fn compute(func: &Function, dom: &DomInfo) -> Self {
        log::info!("computing natural loops of `{}`", func.name);
        let num = dom.numbering().clone();
        let n = num.len();
        let mut info = Self {
            num,
            bodies: Map::default(),
            headers: vec![],
            nesting: vec![0; n],
            loops_of: vec![vec![]; n],
            body_start: vec![false; n],
        };

        for src in 0..n {
            let block = &func.blocks[info.num.block(src)];
            for succ in &block.succs {
                let h = match info.num.dfn(*succ) {
                    Some(h) if dom.dominates_dfn(h, src) => h,
                    _ => continue,
                };
                if info.loops_of[src].contains(&h) {
                    continue;
                }
                log::trace!("back edge {} -> {}", block.name, func.blocks[*succ].name);
                info.grow(func, h, src);
            }
        }

        for h in &info.headers {
            let start = info.bodies[h]
                .iter()
                .copied()
                .min_by_key(|b| info.num.block(*b).index());
            if let Some(start) = start {
                info.body_start[start] = true;
            }
        }
        info
    }

    fn add(&mut self, h: usize, b: usize) {
        self.loops_of[b].push(h);
        self.nesting[b] += 1;
        self.bodies.entry(h).or_default().push(b);
    }

    fn grow(&mut self, func: &Function, h: usize, src: usize) {
        if !self.bodies.contains_key(&h) {
            self.headers.push(h);
        }

        if src != h {
            let mut stack = vec![src];
            while let Some(c) = stack.pop() {
                if self.loops_of[c].contains(&h) {
                    continue;
                }
                self.add(h, c);
                for p in &func.blocks[self.num.block(c)].preds {
                    if let Some(pd) = self.num.dfn(*p) {
                        if pd != h && !self.loops_of[pd].contains(&h) {
                            stack.push(pd);
                        }
                    }
                }
            }
        }

        if !self.loops_of[h].contains(&h) {
            self.add(h, h);
        }
    }

    /// Loop headers in discovery order.
    pub fn headers(&self) -> Vec<BlockId> {
        self.headers.iter().map(|h| self.num.block(*h)).collect()
    }

    pub fn is_loop_header(&self, b: BlockId) -> bool {
        self.num.dfn(b).map_or(false, |d| self.bodies.contains_key(&d))
    }

    pub fn loop_blocks(&self, h: BlockId) -> Vec<BlockId> {
        self.num
            .dfn(h)
            .and_then(|d| self.bodies.get(&d))
            .map(|body| body.iter().map(|b| self.num.block(*b)).collect())
            .unwrap_or_default()
    }

    /// Number of loops containing `b`; 0 for unreachable blocks.
    pub fn nesting(&self, b: BlockId) -> u32 {
        self.num.dfn(b).map_or(0, |d| self.nesting[d])
    }

    pub fn nesting_dfn(&self, dfn: usize) -> u32 {
        self.nesting[dfn]
    }

    /// Headers of the loops containing `b`.
    pub fn loops_of(&self, b: BlockId) -> Vec<BlockId> {
        match self.num.dfn(b) {
            Some(d) => self.loops_of[d].iter().map(|h| self.num.block(*h)).collect(),
            None => vec![],
        }
    }

    pub fn is_body_start(&self, b: BlockId) -> bool {
        self.num.dfn(b).map_or(false, |d| self.body_start[d])
    }
}
