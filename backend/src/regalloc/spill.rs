use ir::{Function, VarId};
use util::Map;

use super::Assignment;
use crate::liveness::Liveness;
use crate::types::Position;

/// Every stack slot is pointer sized.
pub const SLOT_SIZE: u32 = 8;

/// Frame offsets of the variables left on the stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackSlots {
    offsets: Map<VarId, u32>,
    pub frame_size: u32,
}

impl StackSlots {
    pub fn offset(&self, v: VarId) -> Option<u32> {
        self.offsets.get(&v).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    fn fresh(&mut self) -> u32 {
        let off = self.frame_size;
        self.frame_size += SLOT_SIZE;
        off
    }
}

/// Gives a frame slot to every referenced variable without a register.
///
/// With `reuse`, a slot is handed to the next variable once the range of its
/// previous owner has ended. Volatile and address-taken variables always get a slot
/// of their own.
pub fn assign_stack_slots(
    func: &Function,
    live: &Liveness,
    asg: &Assignment,
    reuse: bool,
) -> StackSlots {
    let mut order: Vec<VarId> = func
        .vars
        .iter()
        .filter(|(v, var)| {
            asg.is_spilled(*v)
                && !live.is_dead(*v)
                && (!live.range(*v).is_unused() || live.is_volatile(*v) || var.indirect)
        })
        .map(|(v, _)| v)
        .collect();
    order.sort_by_key(|v| (live.range(*v).first_use, v.index()));

    let mut slots = StackSlots::default();
    // (last use, offset), sorted by last use
    let mut active: Vec<(Position, u32)> = vec![];
    let mut free: Vec<u32> = vec![];

    for v in order {
        let range = live.range(v);
        let pinned = !reuse || live.is_volatile(v) || func.vars[v].indirect;
        if pinned {
            let off = slots.fresh();
            slots.offsets.insert(v, off);
            continue;
        }

        // ranges are closed: two arguments read by the entry block's first
        // instruction both sit at position 0
        while let Some(&(last_use, off)) = active.first() {
            if last_use >= range.first_use {
                break;
            }
            active.remove(0);
            free.push(off);
        }
        // hand out the lowest free offset first
        free.sort_unstable_by(|a, b| b.cmp(a));

        let off = match free.pop() {
            Some(off) => off,
            None => slots.fresh(),
        };
        slots.offsets.insert(v, off);
        let at = active.partition_point(|(l, _)| *l <= range.last_use);
        active.insert(at, (range.last_use, off));
    }
    slots
}
