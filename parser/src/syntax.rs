use util::Spanned;

pub type Name = Spanned<String>;
pub type Int = Spanned<i64>;

/// A method as written, before names are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: Name,
    pub args: Vec<Name>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionTag {
    Try,
    Handler,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub dest: Option<Name>,
    pub op: Name,
    pub imm: Option<Int>,
    pub srcs: Vec<Name>,
}

/// One non-blank line of a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Locals(Vec<Name>),
    Indirect(Vec<Name>),
    Clause {
        index: Int,
        kind: Name,
        parent: Option<Int>,
    },
    Label {
        name: Name,
        region: Option<(RegionTag, Int)>,
    },
    Inst {
        inst: Option<Inst>,
        succs: Vec<Name>,
    },
}
