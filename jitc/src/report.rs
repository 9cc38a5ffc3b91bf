use std::fmt;

use backend::dominator::Dump;
use backend::{Compiled, Location, Target};
use ir::Function;
use util::BitSet;

fn names(vars: &[&str], set: &BitSet) -> Vec<String> {
    set.iter().map(|i| vars[i].to_string()).collect()
}

fn braced(v: &[String]) -> String {
    format!("{{{}}}", v.join(", "))
}

/// Renders the analysis results and the allocation of one method.
pub struct Report<'a> {
    func: &'a Function,
    c: &'a Compiled,
    target: &'a Target,
    verbose: bool,
}

impl<'a> Report<'a> {
    pub fn new(func: &'a Function, c: &'a Compiled, target: &'a Target, verbose: bool) -> Self {
        Self {
            func,
            c,
            target,
            verbose,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self {
            func,
            c,
            target,
            verbose,
        } = *self;
        // variable names by index
        let vars: Vec<&str> = func.vars.iter().map(|(_, v)| v.name.as_str()).collect();

        writeln!(f, "[[{}]]", func.name)?;
        if verbose {
            write!(f, "{}", func)?;
            write!(f, "{}", Dump::new(func, &c.dom, Some(&c.loops)))?;

            writeln!(f, "liveness:")?;
            let num = c.liveness.numbering();
            for dfn in 0..num.len() {
                let block = &func.blocks[num.block(dfn)];
                writeln!(
                    f,
                    "  {}: in {} out {}",
                    block.name,
                    braced(&names(&vars, c.liveness.live_in_of(dfn))),
                    braced(&names(&vars, c.liveness.live_out_of(dfn)))
                )?;
            }

            writeln!(f, "ranges:")?;
            for (v, var) in func.vars.iter() {
                let range = c.liveness.range(v);
                if range.is_unused() {
                    continue;
                }
                write!(
                    f,
                    "  {}: [{:#x}, {:#x}] cost {}",
                    var.name,
                    range.first_use,
                    range.last_use,
                    c.liveness.spill_cost(v)
                )?;
                if let Some(iv) = c.intervals.as_ref().map(|ivs| &ivs[v.index()]) {
                    write!(f, " {}", iv)?;
                }
                writeln!(f)?;
            }
        }

        writeln!(f, "allocation ({}):", target)?;
        for (v, var) in func.vars.iter() {
            write!(f, "  {} -> ", var.name)?;
            match c.assignment.location(v) {
                Location::Reg(r) => write!(f, "{}", target.reg_name(r).unwrap_or("?"))?,
                Location::Stack => match c.slots.offset(v) {
                    Some(off) => write!(f, "[frame+{}]", off)?,
                    None => write!(f, "-")?,
                },
            }
            if c.liveness.is_volatile(v) {
                write!(f, " volatile")?;
            }
            if var.indirect {
                write!(f, " indirect")?;
            }
            if c.liveness.is_dead(v) {
                write!(f, " dead")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "frame size: {}", c.slots.frame_size)?;

        for (bid, index) in &c.dead_inits {
            writeln!(f, "dead init: {} #{}", func.blocks[*bid].name, index)?;
        }
        if verbose {
            for sp in &c.safepoints {
                writeln!(
                    f,
                    "safepoint {} #{}: {}",
                    func.blocks[sp.block].name,
                    sp.index,
                    braced(&names(&vars, &sp.live))
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{Config, Outcome};

    #[test]
    fn report_lists_every_variable() {
        let src = "
method m(a, b) {
    locals x
entry:
    x = add a, a
    ret x
}
";
        let func = parser::parse(src).unwrap().remove(0);
        let config = Config::default();
        let c = match backend::compile_method(&func, &config) {
            Outcome::Compiled(c) => c,
            Outcome::Skipped { .. } => unreachable!(),
        };
        let out = Report::new(&func, &c, &config.target, true).to_string();
        assert!(out.starts_with("[[m]]\n"));
        assert!(out.contains("  entry: in {a} out {}\n"));
        assert!(out.contains("  b -> - dead\n"));
        assert!(out.contains("allocation (amd64 (rbx, r12, r13, r14, r15)):\n"));
    }
}
