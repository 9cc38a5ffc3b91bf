use std::fmt;

use ir::Function;
use util::BitSet;

use super::{DomInfo, LoopInfo};

/// Prints every reachable block with its edges, dominators and frontier.
pub struct Dump<'a> {
    pub func: &'a Function,
    pub dom: &'a DomInfo,
    pub loops: Option<&'a LoopInfo>,
}

impl<'a> Dump<'a> {
    pub fn new(func: &'a Function, dom: &'a DomInfo, loops: Option<&'a LoopInfo>) -> Self {
        Self { func, dom, loops }
    }

    fn names(&self, set: &BitSet) -> Vec<&'a str> {
        set.iter()
            .map(|d| self.func.blocks[self.dom.numbering().block(d)].name.as_str())
            .collect()
    }
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "DFN of `{}`:", self.func.name)?;
        for dfn in 0..self.dom.len() {
            let bid = self.dom.numbering().block(dfn);
            let block = &self.func.blocks[bid];
            write!(f, "  {} [dfn {}]:", block.name, dfn)?;

            let preds: Vec<_> = block
                .preds
                .iter()
                .map(|p| self.func.blocks[*p].name.as_str())
                .collect();
            util::format_vec(f, &preds, " preds (", ", ", ")")?;
            let succs: Vec<_> = block
                .succs
                .iter()
                .map(|s| self.func.blocks[*s].name.as_str())
                .collect();
            util::format_vec(f, &succs, " succs (", ", ", ")")?;

            match self.dom.idom_dfn(dfn) {
                Some(d) => write!(f, " idom {}", self.func.blocks[self.dom.numbering().block(d)].name)?,
                None => write!(f, " idom -")?,
            }
            util::format_vec(f, &self.names(self.dom.dominators_of(dfn)), " doms {", ", ", "}")?;
            util::format_vec(f, &self.names(self.dom.frontier_of(dfn)), " df {", ", ", "}")?;

            if let Some(loops) = self.loops {
                let nesting = loops.nesting_dfn(dfn);
                if nesting > 0 {
                    write!(f, " nesting {nesting}")?;
                }
                if loops.is_loop_header(bid) {
                    write!(f, " header")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_lists_blocks_in_dfn_order() {
        let src = "
method m() {
entry:
    -> head
head:
    -> head, exit
exit:
    ret
}
";
        let func = parser::parse(src).unwrap().remove(0);
        let dom = DomInfo::compute(&func);
        let loops = LoopInfo::compute(&func, &dom);
        let out = Dump::new(&func, &dom, Some(&loops)).to_string();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines[0], "DFN of `m`:");
        assert_eq!(lines[1], "  entry [dfn 0]: preds () succs (head) idom - doms {entry} df {}");
        assert_eq!(
            lines[2],
            "  head [dfn 1]: preds (entry, head) succs (head, exit) idom entry doms {entry, head} df {head} nesting 1 header"
        );
        assert!(lines[3].starts_with("  exit [dfn 2]:"));
    }
}
