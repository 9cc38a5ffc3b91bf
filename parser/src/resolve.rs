use ir::{BlockId, ClauseKind, Function, FunctionBuilder, Inst, Opcode, Region, VarId};
use util::{Map, Spanned};

use crate::error::{ParseError, ParseErrorKind};
use crate::syntax::{self, Int, Item, Name, RegionTag};

type Result<T> = std::result::Result<T, ParseError>;

fn error<T>(kind: ParseErrorKind, loc: (usize, usize)) -> Result<T> {
    Err(Spanned::new(kind, loc))
}

fn clause_kind(name: &Name) -> Result<ClauseKind> {
    match name.item.as_str() {
        "catch" => Ok(ClauseKind::Catch),
        "filter" => Ok(ClauseKind::Filter),
        "finally" => Ok(ClauseKind::Finally),
        "fault" => Ok(ClauseKind::Fault),
        _ => error(ParseErrorKind::UnknownClauseKind(name.item.clone()), name.loc),
    }
}

fn index(i: &Int) -> Result<usize> {
    if i.item < 0 {
        return error(ParseErrorKind::ClauseOrder(i.item), i.loc);
    }
    Ok(i.item as usize)
}

/// Name tables of the method being resolved.
struct Scope {
    vars: Map<String, VarId>,
    blocks: Map<String, BlockId>,
}

impl Scope {
    fn declare(&mut self, name: &Name, v: VarId) -> Result<()> {
        if self.vars.insert(name.item.clone(), v).is_some() {
            return error(ParseErrorKind::DuplicateVariable(name.item.clone()), name.loc);
        }
        Ok(())
    }

    fn var(&self, name: &Name) -> Result<VarId> {
        match self.vars.get(&name.item) {
            Some(v) => Ok(*v),
            None => error(ParseErrorKind::UnknownVariable(name.item.clone()), name.loc),
        }
    }

    fn block(&self, name: &Name) -> Result<BlockId> {
        match self.blocks.get(&name.item) {
            Some(b) => Ok(*b),
            None => error(ParseErrorKind::UnknownBlock(name.item.clone()), name.loc),
        }
    }

    fn inst(&self, inst: &syntax::Inst) -> Result<Inst> {
        let dest = match &inst.dest {
            Some(d) => Some(self.var(d)?),
            None => None,
        };
        let op = match (inst.op.item.as_str(), &inst.imm) {
            ("const", Some(i)) => Opcode::Const(i.item),
            ("const", None) => {
                return error(ParseErrorKind::MissingImmediate(inst.op.item.clone()), inst.op.loc)
            }
            (_, Some(i)) => return error(ParseErrorKind::UnexpectedImmediate(i.item), i.loc),
            (name, None) => match Opcode::from_name(name) {
                Some(op) => op,
                None => {
                    return error(ParseErrorKind::UnknownOpcode(inst.op.item.clone()), inst.op.loc)
                }
            },
        };
        let srcs = inst
            .srcs
            .iter()
            .map(|x| self.var(x))
            .collect::<Result<Vec<_>>>()?;
        Ok(Inst::new(op, dest, srcs))
    }
}

/// Turns a parsed method into a validated [`Function`].
///
/// Declarations come first, then labelled blocks. Edges may name blocks that
/// appear later, so they are connected once every label is known.
pub fn method(m: syntax::Method) -> Result<Function> {
    let mut fb = FunctionBuilder::new(&m.name.item);
    let mut scope = Scope {
        vars: Map::default(),
        blocks: Map::default(),
    };

    for a in &m.args {
        let v = fb.arg(&a.item);
        scope.declare(a, v)?;
    }

    let mut nclauses = 0;
    let mut current = None;
    let mut edges: Vec<(BlockId, Name)> = vec![];
    for item in &m.items {
        let decl_loc = match item {
            Item::Locals(xs) | Item::Indirect(xs) => Some(xs[0].loc),
            Item::Clause { index: i, .. } => Some(i.loc),
            _ => None,
        };
        if let (Some(loc), Some(_)) = (decl_loc, current) {
            return error(ParseErrorKind::MisplacedDeclaration, loc);
        }

        match item {
            Item::Locals(xs) => {
                for x in xs {
                    let v = fb.local(&x.item);
                    scope.declare(x, v)?;
                }
            }
            Item::Indirect(xs) => {
                for x in xs {
                    fb.set_indirect(scope.var(x)?);
                }
            }
            Item::Clause {
                index: i,
                kind,
                parent,
            } => {
                if i.item != nclauses as i64 {
                    return error(ParseErrorKind::ClauseOrder(i.item), i.loc);
                }
                let kind = clause_kind(kind)?;
                let parent = parent.as_ref().map(index).transpose()?;
                fb.clause(kind, parent);
                nclauses += 1;
            }
            Item::Label { name, region } => {
                if scope.blocks.contains_key(&name.item) {
                    return error(ParseErrorKind::DuplicateBlock(name.item.clone()), name.loc);
                }
                let bid = fb.block(&name.item);
                let region = match region {
                    Some((RegionTag::Try, i)) => Region::Try(index(i)?),
                    Some((RegionTag::Handler, i)) => Region::Handler(index(i)?),
                    None => Region::None,
                };
                fb.set_region(bid, region);
                scope.blocks.insert(name.item.clone(), bid);
                current = Some(bid);
            }
            Item::Inst { inst, succs } => {
                let bid = match current {
                    Some(bid) => bid,
                    None => {
                        let loc = inst.as_ref().map_or(succs[0].loc, |i| i.op.loc);
                        return error(ParseErrorKind::OutsideBlock, loc);
                    }
                };
                if let Some(inst) = inst {
                    let inst = scope.inst(inst)?;
                    fb.inst(bid, inst);
                }
                edges.extend(succs.iter().map(|s| (bid, s.clone())));
            }
        }
    }

    if fb.is_empty() {
        return error(ParseErrorKind::EmptyMethod(m.name.item.clone()), m.name.loc);
    }
    for (from, to) in edges {
        let to = scope.block(&to)?;
        fb.edge(from, to);
    }

    let func = fb.finish();
    func.validate()
        .map_err(|e| Spanned::new(ParseErrorKind::Graph(e), m.name.loc))?;
    Ok(func)
}
