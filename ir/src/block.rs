use id_arena::Arena;

use std::fmt;

use crate::{Inst, Var};

pub type BlockId = id_arena::Id<Block>;
pub type ClauseId = usize;

/// Maximum number of instructions in a block; keeps `2 * index + 1` below the block-end key.
pub const MAX_BLOCK_INSTS: usize = 0x7ffe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    Catch,
    Filter,
    Finally,
    Fault,
}

impl ClauseKind {
    pub fn name(&self) -> &'static str {
        match self {
            ClauseKind::Catch => "catch",
            ClauseKind::Filter => "filter",
            ClauseKind::Finally => "finally",
            ClauseKind::Fault => "fault",
        }
    }
}

/// An exception clause: a protected try body plus its handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub kind: ClauseKind,
    /// The clause whose handler contains this clause's try body.
    pub parent: Option<ClauseId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    None,
    Try(ClauseId),
    Handler(ClauseId),
}

impl Region {
    pub fn is_protected(&self) -> bool {
        !matches!(self, Region::None)
    }

    pub fn clause(&self) -> Option<ClauseId> {
        match self {
            Region::None => None,
            Region::Try(c) | Region::Handler(c) => Some(*c),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Region::None => Ok(()),
            Region::Try(c) => write!(f, " try {c}"),
            Region::Handler(c) => write!(f, " handler {c}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub name: String,
    pub insts: Vec<Inst>,
    pub preds: Vec<BlockId>,
    pub succs: Vec<BlockId>,
    pub region: Region,
    /// Reverse-postorder index; meaningful only when `reachable`.
    pub dfn: usize,
    pub reachable: bool,
}

impl Block {
    pub fn with_name(name: String) -> Self {
        Self {
            name,
            insts: vec![],
            preds: vec![],
            succs: vec![],
            region: Region::None,
            dfn: 0,
            reachable: false,
        }
    }

    pub fn last_inst(&self) -> Option<&Inst> {
        self.insts.last()
    }

    /// Whether the block ends with the never-returns marker.
    pub fn ends_unreachable(&self) -> bool {
        self.last_inst().map_or(false, |i| i.op.is_not_reached())
    }

    pub(crate) fn format_indented(
        &self,
        f: &mut fmt::Formatter,
        level: usize,
        arena: &Arena<Block>,
        vars: &Arena<Var>,
    ) -> fmt::Result {
        // print indentation
        let indent = |level: usize| "    ".repeat(level);
        writeln!(f, "{}{}{}:", indent(level), self.name, self.region)?;
        for inst in &self.insts {
            write!(f, "{}", indent(level + 1))?;
            inst.format(f, vars)?;
            writeln!(f)?;
        }
        if !self.succs.is_empty() {
            let names: Vec<_> = self.succs.iter().map(|b| arena[*b].name.as_str()).collect();
            write!(f, "{}", indent(level + 1))?;
            util::format_vec(f, &names, "-> ", ", ", "\n")?;
        }
        Ok(())
    }
}
