use crate::regalloc::Target;

/// Which allocator `compile_method` runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Linear scan over `[first_use, last_use]` ranges.
    Simple,
    /// Linear scan over intervals with holes.
    Intervals,
}

/// Victim selection of the interval allocator when no register is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpillChoice {
    /// The first interval of the active list.
    First,
    /// The active interval with the lowest spill cost.
    Cheapest,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: Target,
    pub strategy: Strategy,
    /// Evict by spill cost instead of by range end.
    pub cost_driven: bool,
    pub spill_choice: SpillChoice,
    pub reuse_registers: bool,
    pub reuse_stack_slots: bool,
    /// The method saves every callee-saved register in its prologue anyway.
    pub save_lmf: bool,
    pub max_vars: usize,
    pub max_blocks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: Target::amd64(),
            strategy: Strategy::Simple,
            cost_driven: true,
            spill_choice: SpillChoice::First,
            reuse_registers: true,
            reuse_stack_slots: true,
            save_lmf: false,
            max_vars: 2000,
            max_blocks: 1000,
        }
    }
}
