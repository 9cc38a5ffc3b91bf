use std::fmt;

/// Hardware register number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub u8);

// callee-saved registers handed to the global allocator
pub static X86_REGS: &'static [(&'static str, u8)] = &[("ebx", 3), ("esi", 6), ("edi", 7)];
pub static AMD64_REGS: &'static [(&'static str, u8)] =
    &[("rbx", 3), ("r12", 12), ("r13", 13), ("r14", 14), ("r15", 15)];

/// Memory references paid for putting a variable in a callee-saved register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegCosts {
    pub arg: u32,
    pub local: u32,
    /// Costs when the prologue already saves the register.
    pub arg_saved: u32,
    pub local_saved: u32,
}

// push + pop, plus the load of an incoming argument
pub const X86_COSTS: RegCosts = RegCosts {
    arg: 3,
    local: 2,
    arg_saved: 1,
    local_saved: 0,
};
// arguments arrive in registers; a saved register still costs its prologue store
pub const AMD64_COSTS: RegCosts = RegCosts {
    arg: 1,
    local: 2,
    arg_saved: 0,
    local_saved: 1,
};

/// An ordered pool of allocatable registers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    regs: Vec<(String, Reg)>,
    pub costs: RegCosts,
}

impl Target {
    fn from_table(name: &str, table: &[(&str, u8)], costs: RegCosts) -> Self {
        Self {
            name: name.to_string(),
            regs: table.iter().map(|(n, r)| (n.to_string(), Reg(*r))).collect(),
            costs,
        }
    }

    pub fn x86() -> Self {
        Self::from_table("x86", X86_REGS, X86_COSTS)
    }

    pub fn amd64() -> Self {
        Self::from_table("amd64", AMD64_REGS, AMD64_COSTS)
    }

    /// `n` anonymous registers `r0..rN-1`, priced like x86.
    pub fn with_regs(n: u8) -> Self {
        Self {
            name: format!("r{n}"),
            regs: (0..n).map(|i| (format!("r{i}"), Reg(i))).collect(),
            costs: X86_COSTS,
        }
    }

    pub fn cost_model(&self, save_lmf: bool) -> CostModel {
        CostModel {
            save_lmf,
            table: self.costs,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "x86" => Some(Self::x86()),
            "amd64" => Some(Self::amd64()),
            _ => None,
        }
    }

    pub fn regs(&self) -> Vec<Reg> {
        self.regs.iter().map(|(_, r)| *r).collect()
    }

    pub fn reg_name(&self, reg: Reg) -> Option<&str> {
        self.regs.iter().find(|(_, r)| *r == reg).map(|(n, _)| n.as_str())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<_> = self.regs.iter().map(|(n, _)| n.as_str()).collect();
        write!(f, "{} ", self.name)?;
        util::format_vec(f, &names, "(", ", ", ")")
    }
}

/// Prologue/epilogue price of using a callee-saved register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    /// The method saves every callee-saved register anyway.
    pub save_lmf: bool,
    pub table: RegCosts,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            save_lmf: false,
            table: X86_COSTS,
        }
    }
}

impl CostModel {
    pub fn regalloc_cost(&self, is_arg: bool) -> u32 {
        let t = &self.table;
        match (self.save_lmf, is_arg) {
            (false, true) => t.arg,
            (false, false) => t.local,
            (true, true) => t.arg_saved,
            (true, false) => t.local_saved,
        }
    }

    pub fn save_restore_cost(&self) -> u32 {
        if self.save_lmf {
            1
        } else {
            2
        }
    }

    // arguments must be loaded from their incoming location first
    pub fn load_cost(&self, is_arg: bool) -> u32 {
        if is_arg {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pools() {
        let t = Target::amd64();
        assert_eq!(t.regs(), vec![Reg(3), Reg(12), Reg(13), Reg(14), Reg(15)]);
        assert_eq!(t.reg_name(Reg(12)), Some("r12"));
        assert_eq!(t.to_string(), "amd64 (rbx, r12, r13, r14, r15)");
        assert_eq!(Target::from_name("x86").unwrap().regs().len(), 3);
        assert!(Target::from_name("sparc").is_none());
        assert_eq!(Target::with_regs(2).reg_name(Reg(1)), Some("r1"));
    }

    #[test]
    fn costs_follow_the_target() {
        let x86 = Target::x86().cost_model(false);
        let amd64 = Target::amd64().cost_model(false);
        assert_eq!((x86.regalloc_cost(true), x86.regalloc_cost(false)), (3, 2));
        assert_eq!((amd64.regalloc_cost(true), amd64.regalloc_cost(false)), (1, 2));

        let x86 = Target::x86().cost_model(true);
        let amd64 = Target::amd64().cost_model(true);
        assert_eq!((x86.regalloc_cost(true), x86.regalloc_cost(false)), (1, 0));
        assert_eq!((amd64.regalloc_cost(true), amd64.regalloc_cost(false)), (0, 1));
    }
}
