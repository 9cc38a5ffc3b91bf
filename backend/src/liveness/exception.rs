use ir::{Function, Region};
use util::BitSet;

/// Marks every variable an exception handler may observe as volatile.
///
/// Visits start at every protected block except the bodies of outermost try clauses
/// and follow successor edges transitively; the visited set is shared by all visits.
pub(super) fn pessimize(func: &Function, volatile: &mut BitSet) {
    if func.clauses.is_empty() {
        return;
    }
    let outer_try: Vec<bool> = func.clauses.iter().map(|c| c.parent.is_none()).collect();

    let mut visited = vec![false; func.blocks.len()];
    for bid in func.layout() {
        let start = match func.blocks[bid].region {
            Region::None => continue,
            Region::Try(c) if outer_try[c] => continue,
            _ => bid,
        };
        if visited[start.index()] {
            continue;
        }

        visited[start.index()] = true;
        let mut stack = vec![start];
        while let Some(b) = stack.pop() {
            let block = &func.blocks[b];
            log::debug!("variables of block `{}` become volatile", block.name);
            for inst in &block.insts {
                for v in inst.srcs.iter().chain(inst.dest.iter()) {
                    volatile.set(v.index());
                }
            }
            for s in &block.succs {
                if !visited[s.index()] {
                    visited[s.index()] = true;
                    stack.push(*s);
                }
            }
        }
    }
}
