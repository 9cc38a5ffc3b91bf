use anyhow::{anyhow, Context, Result};
use clap::Parser;

use backend::{Config, Outcome, SpillChoice, Strategy, Target};
use ir::Function;

use crate::Report;

#[derive(Debug, Parser)]
pub struct Args {
    /// Register pool: x86 or amd64
    #[clap(long, default_value = "amd64")]
    pub target: String,
    /// Use N anonymous registers instead of the target's pool
    #[clap(long)]
    pub regs: Option<u8>,
    /// Allocate over intervals with lifetime holes
    #[clap(long)]
    pub intervals: bool,
    /// Evict by range end instead of spill cost
    #[clap(long)]
    pub no_cost_driven: bool,
    /// Spill the cheapest active interval instead of the first one
    #[clap(long)]
    pub spill_cheapest: bool,
    #[clap(long)]
    pub no_reuse_regs: bool,
    #[clap(long)]
    pub no_reuse_slots: bool,
    /// The methods save every callee-saved register anyway
    #[clap(long)]
    pub save_lmf: bool,
    #[clap(long, default_value_t = 2000)]
    pub max_vars: usize,
    #[clap(long, default_value_t = 1000)]
    pub max_blocks: usize,
    #[clap(short, long)]
    pub verbose: bool,
    #[clap(long)]
    pub debug: bool,
    pub sources: Vec<String>,
}

pub fn config(args: &Args) -> Result<Config> {
    let target = match args.regs {
        Some(n) => Target::with_regs(n),
        None => Target::from_name(&args.target).ok_or_else(|| anyhow!("unknown target `{}`", args.target))?,
    };

    Ok(Config {
        target,
        strategy: if args.intervals {
            Strategy::Intervals
        } else {
            Strategy::Simple
        },
        cost_driven: !args.no_cost_driven,
        spill_choice: if args.spill_cheapest {
            SpillChoice::Cheapest
        } else {
            SpillChoice::First
        },
        reuse_registers: !args.no_reuse_regs,
        reuse_stack_slots: !args.no_reuse_slots,
        save_lmf: args.save_lmf,
        max_vars: args.max_vars,
        max_blocks: args.max_blocks,
    })
}

pub fn parse_file(path: &str) -> Result<Vec<Function>> {
    let src = std::fs::read_to_string(path).context(format!("failed to open file: {}", path))?;

    parser::parse(&src).map_err(|err| {
        use ariadne::{ColorGenerator, Fmt, Label, Report, ReportKind, Source};

        let mut colors = ColorGenerator::new();
        let a = colors.next();

        let printed = Report::build(ReportKind::Error, path, err.loc.0)
            .with_code(3)
            .with_message(err.item.to_string())
            .with_label(
                Label::new((path, (&err).into()))
                    .with_message(format!("error found {}", "here".fg(a)))
                    .with_color(a),
            )
            .finish()
            .print((path, Source::from(&src)));
        if let Err(e) = printed {
            log::warn!("failed to render the report: {e}");
        }

        anyhow::Error::msg("aborting due to the error above")
    })
}

pub fn compile(args: Args) -> Result<()> {
    let config = config(&args)?;
    for path in &args.sources {
        for func in parse_file(path)? {
            func.validate()
                .context(format!("method `{}` in {} is malformed", func.name, path))?;

            match backend::compile_method(&func, &config) {
                Outcome::Compiled(c) => {
                    c.assignment
                        .check_non_interference(&c.candidates)
                        .map_err(|(a, b)| {
                            anyhow!(
                                "`{}` and `{}` share a register while both live",
                                func.vars[a].name,
                                func.vars[b].name
                            )
                        })?;
                    print!("{}", Report::new(&func, &c, &config.target, args.verbose));
                }
                Outcome::Skipped { reason } => println!("[[{}]] skipped: {}", func.name, reason),
            }
        }
    }
    Ok(())
}
