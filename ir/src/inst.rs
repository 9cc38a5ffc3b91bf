use id_arena::Arena;

use std::fmt;

use crate::Var;

pub type VarId = id_arena::Id<Var>;

/// Maximum number of source operands of one instruction.
pub const MAX_SRCS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    Const(i64),
    Move,
    Add,
    Sub,
    Mul,
    Div,
    Cmp,
    Load,
    // the destination is the base address register, i.e. it is read
    Store,
    // takes the address of its operand
    LdAddr,
    Call,
    Jump,
    Branch,
    Ret,
    Throw,
    // control never reaches the end of the block
    Unreachable,
    StartHandler,
    EndHandler,
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "nop",
            Const(_) => "const",
            Move => "move",
            Add => "add",
            Sub => "sub",
            Mul => "mul",
            Div => "div",
            Cmp => "cmp",
            Load => "load",
            Store => "store",
            LdAddr => "ldaddr",
            Call => "call",
            Jump => "jump",
            Branch => "branch",
            Ret => "ret",
            Throw => "throw",
            Unreachable => "unreachable",
            StartHandler => "start_handler",
            EndHandler => "end_handler",
        }
    }

    /// Opcodes without an immediate, by name.
    pub fn from_name(name: &str) -> Option<Self> {
        use Opcode::*;
        let op = match name {
            "nop" => Nop,
            "move" => Move,
            "add" => Add,
            "sub" => Sub,
            "mul" => Mul,
            "div" => Div,
            "cmp" => Cmp,
            "load" => Load,
            "store" => Store,
            "ldaddr" => LdAddr,
            "call" => Call,
            "jump" => Jump,
            "branch" => Branch,
            "ret" => Ret,
            "throw" => Throw,
            "unreachable" => Unreachable,
            "start_handler" => StartHandler,
            "end_handler" => EndHandler,
            _ => return None,
        };
        Some(op)
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Opcode::Call)
    }

    pub fn may_trap(&self) -> bool {
        use Opcode::*;
        matches!(self, Div | Load | Store | Throw)
    }

    pub fn is_store_membase(&self) -> bool {
        matches!(self, Opcode::Store)
    }

    pub fn is_not_reached(&self) -> bool {
        matches!(self, Opcode::Unreachable)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::Const(c) => write!(f, "const {c}"),
            op => write!(f, "{}", op.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub op: Opcode,
    pub dest: Option<VarId>,
    pub srcs: Vec<VarId>,
}

impl Inst {
    pub fn new(op: Opcode, dest: Option<VarId>, srcs: Vec<VarId>) -> Self {
        Self { op, dest, srcs }
    }

    pub fn def(op: Opcode, dest: VarId, srcs: &[VarId]) -> Self {
        Self::new(op, Some(dest), srcs.to_vec())
    }

    pub fn effect(op: Opcode, srcs: &[VarId]) -> Self {
        Self::new(op, None, srcs.to_vec())
    }

    pub fn nop() -> Self {
        Self::new(Opcode::Nop, None, vec![])
    }

    /// Call sites and instructions that may raise; GC maps are needed here.
    pub fn is_safepoint(&self) -> bool {
        self.op.is_call() || self.op.may_trap()
    }

    /// The variable whose address this instruction takes, if any.
    pub fn addr_taken(&self) -> Option<VarId> {
        match self.op {
            Opcode::LdAddr => self.srcs.first().copied(),
            _ => None,
        }
    }

    pub(crate) fn format(&self, f: &mut fmt::Formatter, vars: &Arena<Var>) -> fmt::Result {
        if let Some(d) = self.dest {
            write!(f, "{} = ", vars[d].name)?;
        }
        write!(f, "{}", self.op)?;
        let names: Vec<_> = self.srcs.iter().map(|x| vars[*x].name.as_str()).collect();
        if !names.is_empty() {
            util::format_vec(f, &names, " ", ", ", "")?;
        }
        Ok(())
    }
}
