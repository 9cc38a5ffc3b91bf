use id_arena::Arena;

use std::fmt;

use crate::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    Arg,
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub kind: VarKind,
    /// The address of the variable is taken somewhere in the method.
    pub indirect: bool,
}

impl Var {
    pub fn is_arg(&self) -> bool {
        self.kind == VarKind::Arg
    }
}

/// One compilation unit: the finalized CFG of a method and its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub vars: Arena<Var>,
    pub args: Vec<VarId>,
    pub blocks: Arena<Block>,
    pub entry: BlockId,
    pub clauses: Vec<Clause>,
    // reachable blocks by dfn
    bblocks: Vec<BlockId>,
}

impl Function {
    pub fn new(
        name: String,
        vars: Arena<Var>,
        args: Vec<VarId>,
        blocks: Arena<Block>,
        entry: BlockId,
        clauses: Vec<Clause>,
    ) -> Self {
        let mut func = Self {
            name,
            vars,
            args,
            blocks,
            entry,
            clauses,
            bblocks: vec![],
        };
        func.compute_dfn();
        func
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of reachable blocks, i.e. the width of block bitsets.
    pub fn num_bblocks(&self) -> usize {
        self.bblocks.len()
    }

    /// Reachable blocks in dfn order; the entry comes first.
    pub fn bblocks(&self) -> &[BlockId] {
        &self.bblocks
    }

    /// All blocks in emission order, reachable or not.
    pub fn layout(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|(bid, _)| bid)
    }

    pub fn find_block(&self, name: &str) -> Option<BlockId> {
        self.blocks.iter().find(|(_, b)| b.name == name).map(|(bid, _)| bid)
    }

    pub fn find_var(&self, name: &str) -> Option<VarId> {
        self.vars.iter().find(|(_, v)| v.name == name).map(|(vid, _)| vid)
    }

    fn compute_dfn(&mut self) {
        for (_, b) in self.blocks.iter_mut() {
            b.reachable = false;
            b.dfn = 0;
        }

        let mut visited = vec![false; self.blocks.len()];
        let mut post = Vec::with_capacity(self.blocks.len());
        let mut stack = vec![(self.entry, 0usize)];
        visited[self.entry.index()] = true;

        while let Some((bid, next)) = stack.pop() {
            let succs = &self.blocks[bid].succs;
            if next < succs.len() {
                let succ = succs[next];
                stack.push((bid, next + 1));
                if !visited[succ.index()] {
                    visited[succ.index()] = true;
                    stack.push((succ, 0));
                }
            } else {
                post.push(bid);
            }
        }

        post.reverse();
        for (dfn, bid) in post.iter().enumerate() {
            let b = &mut self.blocks[*bid];
            b.dfn = dfn;
            b.reachable = true;
        }
        for (_, b) in self.blocks.iter() {
            if !b.reachable {
                log::debug!("block `{}` is unreachable", b.name);
            }
        }
        self.bblocks = post;
    }

    /// Checks the structural contract the analyses rely on.
    pub fn validate(&self) -> Result<(), GraphError> {
        for (i, c) in self.clauses.iter().enumerate() {
            if let Some(p) = c.parent {
                if p >= self.clauses.len() {
                    return Err(GraphError::UnknownParentClause { clause: i, parent: p });
                }
            }
        }

        for (bid, b) in self.blocks.iter() {
            for s in &b.succs {
                if !self.blocks[*s].preds.contains(&bid) {
                    return Err(GraphError::EdgeMismatch {
                        from: b.name.clone(),
                        to: self.blocks[*s].name.clone(),
                    });
                }
            }
            for p in &b.preds {
                if !self.blocks[*p].succs.contains(&bid) {
                    return Err(GraphError::EdgeMismatch {
                        from: self.blocks[*p].name.clone(),
                        to: b.name.clone(),
                    });
                }
            }

            if b.insts.len() > MAX_BLOCK_INSTS {
                return Err(GraphError::BlockTooLarge {
                    block: b.name.clone(),
                    len: b.insts.len(),
                    max: MAX_BLOCK_INSTS,
                });
            }

            if let Some(c) = b.region.clause() {
                if c >= self.clauses.len() {
                    return Err(GraphError::UnknownClause { block: b.name.clone(), clause: c });
                }
            }

            for (index, inst) in b.insts.iter().enumerate() {
                if inst.srcs.len() > MAX_SRCS {
                    return Err(GraphError::TooManySources {
                        block: b.name.clone(),
                        index,
                        count: inst.srcs.len(),
                    });
                }
                let known = inst
                    .srcs
                    .iter()
                    .chain(inst.dest.iter())
                    .all(|v| v.index() < self.vars.len());
                if !known {
                    return Err(GraphError::UnknownVar { block: b.name.clone() });
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let args: Vec<_> = self.args.iter().map(|a| self.vars[*a].name.as_str()).collect();
        write!(f, "method {}", self.name)?;
        util::format_vec(f, &args, "(", ", ", ") {\n")?;

        let locals: Vec<_> = self
            .vars
            .iter()
            .filter(|(_, v)| !v.is_arg())
            .map(|(_, v)| v.name.as_str())
            .collect();
        if !locals.is_empty() {
            util::format_vec(f, &locals, "    locals ", ", ", ";\n")?;
        }
        let indirect: Vec<_> = self
            .vars
            .iter()
            .filter(|(_, v)| v.indirect)
            .map(|(_, v)| v.name.as_str())
            .collect();
        if !indirect.is_empty() {
            util::format_vec(f, &indirect, "    indirect ", ", ", ";\n")?;
        }
        for (i, c) in self.clauses.iter().enumerate() {
            write!(f, "    clause {i} {}", c.kind.name())?;
            if let Some(p) = c.parent {
                write!(f, " in {p}")?;
            }
            writeln!(f, ";")?;
        }

        for (_, b) in self.blocks.iter() {
            b.format_indented(f, 0, &self.blocks, &self.vars)?;
        }
        writeln!(f, "}}")
    }
}
