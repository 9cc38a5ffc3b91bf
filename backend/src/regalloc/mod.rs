mod interval_scan;
mod linear_scan;
mod spill;
mod target;

pub use interval_scan::IntervalScan;
pub use linear_scan::LinearScan;
pub use spill::{assign_stack_slots, StackSlots, SLOT_SIZE};
pub use target::{CostModel, Reg, RegCosts, Target, AMD64_COSTS, X86_COSTS};

use ir::{Function, VarId};
use util::Map;

use crate::liveness::{Interval, Liveness};
use crate::types::LiveRange;

/// A variable offered to the allocator.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub var: VarId,
    pub range: LiveRange,
    pub interval: Option<Interval>,
    pub spill_cost: u32,
    pub is_arg: bool,
}

impl Candidate {
    fn interferes(&self, other: &Candidate) -> bool {
        match (&self.interval, &other.interval) {
            (Some(a), Some(b)) => a.intersect_pos(b).is_some(),
            _ => self.range.overlaps(&other.range),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Reg(Reg),
    Stack,
}

/// Final register of every allocated variable; everything else stays on the stack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    regs: Map<VarId, Reg>,
}

impl Assignment {
    pub fn assign(&mut self, v: VarId, reg: Reg) {
        self.regs.insert(v, reg);
    }

    pub fn location(&self, v: VarId) -> Location {
        match self.regs.get(&v) {
            Some(r) => Location::Reg(*r),
            None => Location::Stack,
        }
    }

    pub fn reg(&self, v: VarId) -> Option<Reg> {
        self.regs.get(&v).copied()
    }

    pub fn is_spilled(&self, v: VarId) -> bool {
        !self.regs.contains_key(&v)
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    /// Registers the prologue has to save, in ascending order.
    pub fn used_regs(&self) -> Vec<Reg> {
        let mut regs: Vec<_> = self.regs.values().copied().collect();
        regs.sort();
        regs.dedup();
        regs
    }

    /// Checks that no two candidates sharing a register are live at the same time.
    pub fn check_non_interference(&self, candidates: &[Candidate]) -> Result<(), (VarId, VarId)> {
        let assigned: Vec<_> = candidates
            .iter()
            .filter_map(|c| self.reg(c.var).map(|r| (r, c)))
            .collect();
        for (i, (r1, c1)) in assigned.iter().enumerate() {
            for (r2, c2) in &assigned[i + 1..] {
                if r1 == r2 && c1.interferes(c2) {
                    return Err((c1.var, c2.var));
                }
            }
        }
        Ok(())
    }
}

pub trait RegisterAllocator {
    fn allocate(&self, candidates: &[Candidate], regs: &[Reg]) -> Assignment;
}

/// Variables worth a register: not volatile, not address-taken, not dead, and
/// referenced over more than one position.
pub fn candidates(
    func: &Function,
    live: &Liveness,
    intervals: Option<&[Interval]>,
) -> Vec<Candidate> {
    func.vars
        .iter()
        .filter(|(v, var)| {
            !live.is_volatile(*v) && !var.indirect && !live.is_dead(*v) && !live.range(*v).is_empty()
        })
        .map(|(v, var)| Candidate {
            var: v,
            range: live.range(v),
            interval: intervals.map(|ivs| ivs[v.index()].clone()),
            spill_cost: live.spill_cost(v),
            is_arg: var.is_arg(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use id_arena::Arena;
    use ir::{Var, VarKind};

    pub(crate) fn vars(n: usize) -> Vec<VarId> {
        let mut arena: Arena<Var> = Arena::new();
        (0..n)
            .map(|i| {
                arena.alloc(Var {
                    name: format!("v{i}"),
                    kind: VarKind::Local,
                    indirect: false,
                })
            })
            .collect()
    }

    pub(crate) fn candidate(var: VarId, first_use: u32, last_use: u32, spill_cost: u32) -> Candidate {
        let mut interval = Interval::new();
        interval.add_range(first_use, last_use);
        Candidate {
            var,
            range: LiveRange { first_use, last_use },
            interval: Some(interval),
            spill_cost,
            is_arg: false,
        }
    }

    #[test]
    fn interference_check() {
        let v = vars(3);
        let cands = vec![
            candidate(v[0], 0, 10, 1),
            candidate(v[1], 10, 20, 1),
            candidate(v[2], 5, 15, 1),
        ];
        let mut asg = Assignment::default();
        asg.assign(v[0], Reg(3));
        asg.assign(v[1], Reg(3));
        asg.assign(v[2], Reg(12));
        assert_eq!(asg.check_non_interference(&cands), Ok(()));
        assert_eq!(asg.used_regs(), vec![Reg(3), Reg(12)]);

        asg.assign(v[2], Reg(3));
        assert_eq!(asg.check_non_interference(&cands), Err((v[0], v[2])));
        assert_eq!(asg.location(v[2]), Location::Reg(Reg(3)));
    }
}
