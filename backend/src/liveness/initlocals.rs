use ir::{BlockId, Function, Opcode};
use util::BitSet;

use super::Liveness;

/// Default initializations in the entry block whose value nobody reads.
///
/// Only constant and move definitions qualify; the result lists `(block, index)` pairs
/// for the caller to drop.
pub fn dead_inits(func: &Function, live: &Liveness) -> Vec<(BlockId, usize)> {
    let entry = func.entry;
    let insts = &func.blocks[entry].insts;
    let mut read = BitSet::new(func.num_vars());
    for inst in insts {
        for v in &inst.srcs {
            read.set(v.index());
        }
        if let Some(d) = inst.dest.filter(|_| inst.op.is_store_membase()) {
            read.set(d.index());
        }
    }

    let live_out = match live.live_out(entry) {
        Some(set) => set,
        None => return vec![],
    };
    let mut dead = vec![];
    for (index, inst) in insts.iter().enumerate() {
        if !matches!(inst.op, Opcode::Const(_) | Opcode::Move) {
            continue;
        }
        let d = match inst.dest {
            Some(d) => d,
            None => continue,
        };
        if read.test(d.index())
            || live_out.test(d.index())
            || live.is_volatile(d)
            || func.vars[d].indirect
        {
            continue;
        }
        log::debug!("initialization of `{}` is dead", func.vars[d].name);
        dead.push((entry, index));
    }
    dead
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dominator::{DomInfo, LoopInfo};

    #[test]
    fn unread_inits_are_reported() {
        let src = "
method m(a) {
    locals x, y, z, p
    indirect p
entry:
    x = const 0
    y = const 0
    z = const 0
    p = const 0
    y = add a, a
    ret y
}
";
        let func = parser::parse(src).unwrap().remove(0);
        let dom = DomInfo::compute(&func);
        let loops = LoopInfo::compute(&func, &dom);
        let live = Liveness::analyze(&func, &loops);
        let dead = dead_inits(&func, &live);
        let entry = func.entry;
        assert_eq!(dead, vec![(entry, 0), (entry, 2)]);
    }
}
