use util::Map;

use super::*;

/// Linear scan over `[first_use, last_use]` ranges.
#[derive(Debug, Clone)]
pub struct LinearScan {
    /// Evict the cheapest active variable instead of the one ending last.
    pub cost_driven: bool,
    pub reuse_registers: bool,
    pub costs: CostModel,
}

impl Default for LinearScan {
    fn default() -> Self {
        Self {
            cost_driven: true,
            reuse_registers: true,
            costs: CostModel::default(),
        }
    }
}

impl LinearScan {
    // the active member giving way first
    fn lowest_priority(&self, active: &[usize], candidates: &[Candidate]) -> Option<usize> {
        if self.cost_driven {
            // on equal cost, prefer evicting the one that ends last
            active.iter().copied().min_by(|a, b| {
                let (a, b) = (&candidates[*a], &candidates[*b]);
                a.spill_cost
                    .cmp(&b.spill_cost)
                    .then(b.range.last_use.cmp(&a.range.last_use))
            })
        } else {
            active.last().copied()
        }
    }

    fn wins_over(&self, cur: &Candidate, member: &Candidate) -> bool {
        if self.cost_driven {
            member.spill_cost < cur.spill_cost
        } else {
            member.range.last_use > cur.range.last_use
        }
    }
}

// keeps `active` sorted by last use
fn insert_active(active: &mut Vec<usize>, i: usize, candidates: &[Candidate]) {
    let end = candidates[i].range.last_use;
    let at = active.partition_point(|a| candidates[*a].range.last_use <= end);
    active.insert(at, i);
}

impl RegisterAllocator for LinearScan {
    fn allocate(&self, candidates: &[Candidate], regs: &[Reg]) -> Assignment {
        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by_key(|i| (candidates[*i].range.first_use, candidates[*i].var.index()));

        // popping hands out the registers in pool order
        let mut free: Vec<Reg> = regs.iter().rev().copied().collect();
        let mut gains: Map<Reg, u32> = Map::default();
        let mut active: Vec<usize> = vec![];
        let mut reg_of: Vec<Option<Reg>> = vec![None; candidates.len()];

        for i in order {
            let cur = &candidates[i];

            if self.reuse_registers {
                while let Some(&a) = active.first() {
                    if candidates[a].range.last_use > cur.range.first_use {
                        break;
                    }
                    active.remove(0);
                    if let Some(r) = reg_of[a] {
                        *gains.entry(r).or_default() += candidates[a].spill_cost;
                        free.push(r);
                    }
                }
            }

            if active.len() >= regs.len() {
                match self.lowest_priority(&active, candidates) {
                    Some(a) if self.wins_over(cur, &candidates[a]) => {
                        log::debug!(
                            "{:?} evicts {:?} from {:?}",
                            cur.var,
                            candidates[a].var,
                            reg_of[a]
                        );
                        reg_of[i] = reg_of[a].take();
                        active.retain(|x| *x != a);
                        insert_active(&mut active, i, candidates);
                    }
                    _ => log::debug!("no register for {:?}", cur.var),
                }
            } else {
                let r = free.pop().expect("register pool out of sync with active list");
                reg_of[i] = Some(r);
                insert_active(&mut active, i, candidates);
            }
        }

        for a in active {
            if let Some(r) = reg_of[a] {
                *gains.entry(r).or_default() += candidates[a].spill_cost;
            }
        }

        let mut asg = Assignment::default();
        for (i, c) in candidates.iter().enumerate() {
            if let Some(r) = reg_of[i] {
                let gain = gains.get(&r).copied().unwrap_or(0);
                if gain > self.costs.regalloc_cost(c.is_arg) {
                    asg.assign(c.var, r);
                } else {
                    log::debug!("{:?} is not worth {:?} (gain {gain})", c.var, r);
                }
            }
        }
        asg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regalloc::tests::{candidate, vars};

    #[test]
    fn disjoint_ranges_share_a_register() {
        let v = vars(2);
        let cands = vec![candidate(v[0], 0, 10, 2), candidate(v[1], 10, 20, 2)];
        let asg = LinearScan::default().allocate(&cands, &[Reg(3)]);
        assert_eq!(asg.reg(v[0]), Some(Reg(3)));
        assert_eq!(asg.reg(v[1]), Some(Reg(3)));
        assert_eq!(asg.check_non_interference(&cands), Ok(()));
    }

    #[test]
    fn overlap_spills_the_cheaper() {
        let v = vars(3);
        let cands = vec![
            candidate(v[0], 0, 10, 1),
            candidate(v[1], 10, 20, 5),
            candidate(v[2], 5, 15, 3),
        ];
        let asg = LinearScan::default().allocate(&cands, &[Reg(3)]);
        assert!(asg.is_spilled(v[0]));
        assert!(asg.is_spilled(v[2]));
        assert_eq!(asg.reg(v[1]), Some(Reg(3)));
        assert_eq!(asg.check_non_interference(&cands), Ok(()));
    }

    #[test]
    fn gain_must_pay_for_the_register() {
        let v = vars(2);
        let cands = vec![candidate(v[0], 0, 10, 2), candidate(v[1], 0, 10, 3)];
        let asg = LinearScan::default().allocate(&cands, &[Reg(3), Reg(12)]);
        assert!(asg.is_spilled(v[0]));
        assert_eq!(asg.reg(v[1]), Some(Reg(12)));

        let cheap = LinearScan {
            costs: CostModel {
                save_lmf: true,
                ..CostModel::default()
            },
            ..LinearScan::default()
        };
        let asg = cheap.allocate(&cands, &[Reg(3), Reg(12)]);
        assert_eq!(asg.reg(v[0]), Some(Reg(3)));
    }

    #[test]
    fn argument_cost_depends_on_target() {
        let v = vars(1);
        let mut arg = candidate(v[0], 0, 10, 2);
        arg.is_arg = true;
        let cands = vec![arg];

        let x86 = LinearScan {
            costs: Target::x86().cost_model(false),
            ..LinearScan::default()
        };
        assert!(x86.allocate(&cands, &[Reg(3)]).is_spilled(v[0]));

        let amd64 = LinearScan {
            costs: Target::amd64().cost_model(false),
            ..LinearScan::default()
        };
        assert_eq!(amd64.allocate(&cands, &[Reg(3)]).reg(v[0]), Some(Reg(3)));
    }

    #[test]
    fn evict_by_range_end() {
        let v = vars(2);
        let cands = vec![candidate(v[0], 0, 100, 10), candidate(v[1], 5, 20, 3)];
        let by_end = LinearScan {
            cost_driven: false,
            ..LinearScan::default()
        };
        let asg = by_end.allocate(&cands, &[Reg(3)]);
        assert!(asg.is_spilled(v[0]));
        assert_eq!(asg.reg(v[1]), Some(Reg(3)));

        let asg = LinearScan::default().allocate(&cands, &[Reg(3)]);
        assert_eq!(asg.reg(v[0]), Some(Reg(3)));
        assert!(asg.is_spilled(v[1]));
    }

    #[test]
    fn no_reuse_keeps_one_variable_per_register() {
        let v = vars(2);
        let cands = vec![candidate(v[0], 0, 10, 4), candidate(v[1], 10, 20, 6)];
        let scan = LinearScan {
            reuse_registers: false,
            ..LinearScan::default()
        };
        let asg = scan.allocate(&cands, &[Reg(3)]);
        assert!(asg.is_spilled(v[0]));
        assert_eq!(asg.reg(v[1]), Some(Reg(3)));
    }

    #[test]
    fn empty_pool() {
        let v = vars(1);
        let cands = vec![candidate(v[0], 0, 10, 50)];
        assert!(LinearScan::default().allocate(&cands, &[]).is_empty());
    }

    #[test]
    fn many_variables_never_interfere() {
        let v = vars(40);
        let cands: Vec<_> = v
            .iter()
            .enumerate()
            .map(|(i, var)| {
                let i = i as u32;
                candidate(*var, (i * 7) % 50, (i * 7) % 50 + 3 + i % 11, 3 + i % 5)
            })
            .collect();
        let regs = Target::x86().regs();
        let asg = LinearScan::default().allocate(&cands, &regs);
        assert!(!asg.is_empty());
        assert_eq!(asg.check_non_interference(&cands), Ok(()));
    }
}
