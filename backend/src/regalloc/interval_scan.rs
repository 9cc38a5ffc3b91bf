use super::*;
use crate::config::SpillChoice;
use crate::types::Position;

/// Linear scan over intervals with lifetime holes.
#[derive(Debug, Clone)]
pub struct IntervalScan {
    pub spill_choice: SpillChoice,
    pub costs: CostModel,
}

impl Default for IntervalScan {
    fn default() -> Self {
        Self {
            spill_choice: SpillChoice::First,
            costs: CostModel::default(),
        }
    }
}

struct State<'a> {
    candidates: &'a [Candidate],
    nregs: usize,
    active: Vec<usize>,
    inactive: Vec<usize>,
    // index into the register pool
    reg_of: Vec<Option<usize>>,
    gains: Vec<i64>,
}

impl<'a> State<'a> {
    fn interval(&self, i: usize) -> &'a Interval {
        let candidates: &'a [Candidate] = self.candidates;
        candidates[i]
            .interval
            .as_ref()
            .expect("only candidates with an interval are scanned")
    }

    fn advance(&mut self, pos: Position) {
        let mut still_active = vec![];
        let mut now_inactive = vec![];
        for a in self.active.drain(..) {
            let iv = self.candidates[a].interval.as_ref();
            match iv {
                Some(iv) if iv.end().map_or(true, |e| e <= pos) => {}
                Some(iv) if !iv.covers(pos) => now_inactive.push(a),
                _ => still_active.push(a),
            }
        }

        let mut still_inactive = vec![];
        for a in self.inactive.drain(..) {
            let iv = self.candidates[a].interval.as_ref();
            match iv {
                Some(iv) if iv.end().map_or(true, |e| e <= pos) => {}
                Some(iv) if iv.covers(pos) => still_active.push(a),
                _ => still_inactive.push(a),
            }
        }
        still_inactive.extend(now_inactive);
        self.active = still_active;
        self.inactive = still_inactive;
    }

    /// The register staying free the longest, and until when.
    fn best_register(&self, cur: usize) -> (usize, Position) {
        let mut free_pos = vec![Position::MAX; self.nregs];
        for a in &self.active {
            if let Some(r) = self.reg_of[*a] {
                free_pos[r] = 0;
            }
        }
        let iv = self.interval(cur);
        for a in &self.inactive {
            if let (Some(r), Some(p)) = (self.reg_of[*a], iv.intersect_pos(self.interval(*a))) {
                free_pos[r] = free_pos[r].min(p);
            }
        }

        let mut best = 0;
        for r in 1..self.nregs {
            if free_pos[r] > free_pos[best] {
                best = r;
            }
        }
        (best, free_pos[best])
    }

    fn try_assign(&mut self, cur: usize) -> bool {
        let (r, free_until) = self.best_register(cur);
        let end = self.interval(cur).end().unwrap_or(0);
        if free_until < end {
            return false;
        }
        self.reg_of[cur] = Some(r);
        self.active.push(cur);
        self.gains[r] += self.candidates[cur].spill_cost as i64;
        true
    }
}

impl IntervalScan {
    fn victim(&self, state: &State) -> Option<usize> {
        match self.spill_choice {
            SpillChoice::First => state.active.first().copied(),
            SpillChoice::Cheapest => state
                .active
                .iter()
                .copied()
                .min_by_key(|a| state.candidates[*a].spill_cost),
        }
    }
}

impl RegisterAllocator for IntervalScan {
    fn allocate(&self, candidates: &[Candidate], regs: &[Reg]) -> Assignment {
        let mut order: Vec<usize> = (0..candidates.len())
            .filter(|i| candidates[*i].interval.as_ref().map_or(false, |iv| !iv.is_empty()))
            .collect();
        order.sort_by_key(|i| {
            let start = candidates[*i].interval.as_ref().and_then(|iv| iv.start());
            (start, candidates[*i].var.index())
        });

        let mut state = State {
            candidates,
            nregs: regs.len(),
            active: vec![],
            inactive: vec![],
            reg_of: vec![None; candidates.len()],
            gains: vec![0; regs.len()],
        };
        if regs.is_empty() {
            return Assignment::default();
        }

        for cur in order {
            let pos = state.interval(cur).start().unwrap_or(0);
            state.advance(pos);

            if state.try_assign(cur) {
                continue;
            }

            match self.victim(&state) {
                Some(v) if candidates[v].spill_cost < candidates[cur].spill_cost => {
                    if let Some(r) = state.reg_of[v].take() {
                        state.gains[r] -= candidates[v].spill_cost as i64;
                    }
                    state.active.retain(|a| *a != v);
                    log::debug!("spilling {:?} in favour of {:?}", candidates[v].var, candidates[cur].var);
                    if !state.try_assign(cur) {
                        log::debug!("spilling {:?}", candidates[cur].var);
                    }
                }
                _ => log::debug!("spilling {:?}", candidates[cur].var),
            }
        }

        let save_restore = self.costs.save_restore_cost() as i64;
        for g in state.gains.iter_mut() {
            if *g != 0 {
                *g = (*g - save_restore).max(0);
            }
        }

        let mut asg = Assignment::default();
        for (i, c) in candidates.iter().enumerate() {
            if let Some(r) = state.reg_of[i] {
                if state.gains[r] > self.costs.load_cost(c.is_arg) as i64 {
                    asg.assign(c.var, regs[r]);
                } else {
                    log::debug!("{:?} is not worth {:?}", c.var, regs[r]);
                }
            }
        }
        asg
    }
}
