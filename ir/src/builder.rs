use id_arena::Arena;

use crate::*;

/// Assembles a `Function` block by block; the first block created is the entry.
pub struct FunctionBuilder {
    name: String,
    vars: Arena<Var>,
    args: Vec<VarId>,
    blocks: Arena<Block>,
    entry: Option<BlockId>,
    clauses: Vec<Clause>,
}

impl FunctionBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vars: Arena::new(),
            args: vec![],
            blocks: Arena::new(),
            entry: None,
            clauses: vec![],
        }
    }

    pub fn arg(&mut self, name: &str) -> VarId {
        let v = self.vars.alloc(Var {
            name: name.to_string(),
            kind: VarKind::Arg,
            indirect: false,
        });
        self.args.push(v);
        v
    }

    pub fn local(&mut self, name: &str) -> VarId {
        self.vars.alloc(Var {
            name: name.to_string(),
            kind: VarKind::Local,
            indirect: false,
        })
    }

    pub fn set_indirect(&mut self, v: VarId) {
        self.vars[v].indirect = true;
    }

    pub fn clause(&mut self, kind: ClauseKind, parent: Option<ClauseId>) -> ClauseId {
        self.clauses.push(Clause { kind, parent });
        self.clauses.len() - 1
    }

    pub fn block(&mut self, name: &str) -> BlockId {
        let bid = self.blocks.alloc(Block::with_name(name.to_string()));
        self.entry.get_or_insert(bid);
        bid
    }

    pub fn set_region(&mut self, bid: BlockId, region: Region) {
        self.blocks[bid].region = region;
    }

    pub fn inst(&mut self, bid: BlockId, inst: Inst) {
        if let Some(v) = inst.addr_taken() {
            self.vars[v].indirect = true;
        }
        self.blocks[bid].insts.push(inst);
    }

    pub fn def(&mut self, bid: BlockId, op: Opcode, dest: VarId, srcs: &[VarId]) {
        self.inst(bid, Inst::def(op, dest, srcs));
    }

    pub fn effect(&mut self, bid: BlockId, op: Opcode, srcs: &[VarId]) {
        self.inst(bid, Inst::effect(op, srcs));
    }

    pub fn edge(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from].succs.push(to);
        self.blocks[to].preds.push(from);
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }

    /// Numbers the blocks and returns the finished function.
    ///
    /// Panics when no block was created.
    pub fn finish(self) -> Function {
        let entry = self.entry.expect("function without blocks");
        Function::new(self.name, self.vars, self.args, self.blocks, entry, self.clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpo_numbering() {
        // entry -> a -> c, entry -> b -> c, dead -> c
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let a = fb.block("a");
        let b = fb.block("b");
        let dead = fb.block("dead");
        let c = fb.block("c");
        fb.edge(entry, a);
        fb.edge(entry, b);
        fb.edge(a, c);
        fb.edge(b, c);
        fb.edge(dead, c);
        let func = fb.finish();

        assert_eq!(func.num_bblocks(), 4);
        assert_eq!(func.blocks[entry].dfn, 0);
        assert_eq!(func.bblocks()[0], entry);
        assert!(!func.blocks[dead].reachable);
        // the join comes after both arms
        assert!(func.blocks[c].dfn > func.blocks[a].dfn);
        assert!(func.blocks[c].dfn > func.blocks[b].dfn);
        for (i, bid) in func.bblocks().iter().enumerate() {
            assert_eq!(func.blocks[*bid].dfn, i);
        }
        assert!(func.validate().is_ok());
    }

    #[test]
    fn ldaddr_marks_indirect() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.local("x");
        let p = fb.local("p");
        let b = fb.block("b");
        fb.def(b, Opcode::LdAddr, p, &[x]);
        let func = fb.finish();
        assert!(func.vars[x].indirect);
        assert!(!func.vars[p].indirect);
    }

    #[test]
    fn validate_rejects_bad_input() {
        let mut fb = FunctionBuilder::new("f");
        let x = fb.local("x");
        let b = fb.block("b");
        fb.effect(b, Opcode::Call, &[x, x, x, x]);
        let func = fb.finish();
        assert!(matches!(
            func.validate(),
            Err(GraphError::TooManySources { count: 4, .. })
        ));

        let mut fb = FunctionBuilder::new("g");
        let b = fb.block("b");
        fb.set_region(b, Region::Try(3));
        let func = fb.finish();
        assert!(matches!(func.validate(), Err(GraphError::UnknownClause { clause: 3, .. })));

        let mut fb = FunctionBuilder::new("h");
        let b0 = fb.block("b0");
        let b1 = fb.block("b1");
        fb.edge(b0, b1);
        let mut func = fb.finish();
        func.blocks[b1].preds.clear();
        assert!(matches!(func.validate(), Err(GraphError::EdgeMismatch { .. })));
    }
}
