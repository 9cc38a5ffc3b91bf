pub mod config;
pub mod dominator;
pub mod liveness;
pub mod regalloc;
pub mod types;

pub use config::{Config, SpillChoice, Strategy};
pub use dominator::{DomInfo, LoopInfo};
pub use liveness::{Interval, Liveness, Safepoint};
pub use regalloc::{Assignment, Candidate, Location, Reg, StackSlots, Target};

use ir::{BlockId, Function};

use regalloc::{IntervalScan, LinearScan, RegisterAllocator};

/// Everything the pipeline computed for one method.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub dom: DomInfo,
    pub loops: LoopInfo,
    pub liveness: Liveness,
    pub intervals: Option<Vec<Interval>>,
    pub candidates: Vec<Candidate>,
    pub assignment: Assignment,
    pub slots: StackSlots,
    pub safepoints: Vec<Safepoint>,
    pub dead_inits: Vec<(BlockId, usize)>,
}

#[derive(Debug, Clone)]
pub enum Outcome {
    Compiled(Box<Compiled>),
    /// The method is too large for the global passes.
    Skipped { reason: String },
}

fn allocator(config: &Config) -> Box<dyn RegisterAllocator> {
    let costs = config.target.cost_model(config.save_lmf);
    match config.strategy {
        Strategy::Simple => Box::new(LinearScan {
            cost_driven: config.cost_driven,
            reuse_registers: config.reuse_registers,
            costs,
        }),
        Strategy::Intervals => Box::new(IntervalScan {
            spill_choice: config.spill_choice,
            costs,
        }),
    }
}

/// Runs dominators, liveness and register allocation on `func`.
///
/// `func` must satisfy `Function::validate`.
pub fn compile_method(func: &Function, config: &Config) -> Outcome {
    if func.num_vars() > config.max_vars {
        log::info!("skipping `{}`: {} variables", func.name, func.num_vars());
        return Outcome::Skipped {
            reason: format!("{} variables exceed the limit of {}", func.num_vars(), config.max_vars),
        };
    }
    if func.blocks.len() > config.max_blocks {
        log::info!("skipping `{}`: {} blocks", func.name, func.blocks.len());
        return Outcome::Skipped {
            reason: format!("{} blocks exceed the limit of {}", func.blocks.len(), config.max_blocks),
        };
    }

    if func.num_bblocks() > types::MAX_BBLOCKS {
        log::info!("skipping `{}`: {} reachable blocks", func.name, func.num_bblocks());
        return Outcome::Skipped {
            reason: format!(
                "{} reachable blocks exceed the position encoding limit of {}",
                func.num_bblocks(),
                types::MAX_BBLOCKS
            ),
        };
    }

    let dom = DomInfo::compute(func);
    let loops = LoopInfo::compute(func, &dom);
    let liveness = Liveness::analyze(func, &loops);

    let intervals = match config.strategy {
        Strategy::Intervals => Some(liveness::build_intervals(func, &liveness)),
        Strategy::Simple => None,
    };
    let candidates = regalloc::candidates(func, &liveness, intervals.as_deref());
    log::info!(
        "allocating {} of {} variables of `{}` to {}",
        candidates.len(),
        func.num_vars(),
        func.name,
        config.target
    );
    let assignment = allocator(config).allocate(&candidates, &config.target.regs());
    debug_assert_eq!(assignment.check_non_interference(&candidates), Ok(()));

    let slots = regalloc::assign_stack_slots(func, &liveness, &assignment, config.reuse_stack_slots);
    let safepoints = liveness::live_at_safepoints(func, &liveness);
    let dead_inits = liveness::dead_inits(func, &liveness);

    Outcome::Compiled(Box::new(Compiled {
        dom,
        loops,
        liveness,
        intervals,
        candidates,
        assignment,
        slots,
        safepoints,
        dead_inits,
    }))
}
