use ir::{BlockId, Function};
use util::BitSet;

use super::Liveness;

/// Variables live across a call or a may-trap instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Safepoint {
    pub block: BlockId,
    pub index: usize,
    pub live: BitSet,
}

pub fn live_at_safepoints(func: &Function, live: &Liveness) -> Vec<Safepoint> {
    let num = live.numbering();
    let mut safepoints = vec![];

    for dfn in 0..num.len() {
        let bid = num.block(dfn);
        let mut cur = live.live_out_of(dfn).clone();
        let mut in_block = vec![];

        for (index, inst) in func.blocks[bid].insts.iter().enumerate().rev() {
            if inst.op == ir::Opcode::Nop {
                continue;
            }
            let stores = inst.op.is_store_membase();
            if inst.is_safepoint() {
                let mut across = cur.clone();
                if let Some(d) = inst.dest.filter(|_| !stores) {
                    across.clear(d.index());
                }
                in_block.push(Safepoint { block: bid, index, live: across });
            }

            if let Some(d) = inst.dest {
                if stores {
                    cur.set(d.index());
                } else {
                    cur.clear(d.index());
                }
            }
            for v in &inst.srcs {
                cur.set(v.index());
            }
        }

        in_block.reverse();
        safepoints.extend(in_block);
    }
    safepoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dominator::{DomInfo, LoopInfo};

    #[test]
    fn live_across_calls() {
        let src = "
method m(a) {
    locals x, y, r
entry:
    x = const 1
    y = const 2
    r = call a
    x = add x, r
    y = div x, y
    ret y
}
";
        let func = parser::parse(src).unwrap().remove(0);
        let dom = DomInfo::compute(&func);
        let loops = LoopInfo::compute(&func, &dom);
        let live = Liveness::analyze(&func, &loops);
        let sps = live_at_safepoints(&func, &live);
        let names = |set: &BitSet| -> Vec<String> {
            func.vars
                .iter()
                .filter(|(v, _)| set.test(v.index()))
                .map(|(_, v)| v.name.clone())
                .collect()
        };

        assert_eq!(sps.len(), 2);
        assert_eq!(sps[0].index, 2);
        // the result of the call is not live across it
        assert_eq!(names(&sps[0].live), vec!["x", "y"]);
        assert_eq!(sps[1].index, 4);
        assert!(sps[1].live.is_empty());
    }
}
