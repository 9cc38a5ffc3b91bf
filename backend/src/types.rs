use ir::{BlockId, Function};

/// Absolute position key: `(dfn << 16) | seq`.
pub type Position = u32;

const BLOCK_SHIFT: u32 = 16;
const SEQ_MASK: u32 = 0xffff;

/// Reachable blocks the position encoding can number; the last one still needs
/// an exclusive limit below `u32::MAX`.
pub const MAX_BBLOCKS: usize = SEQ_MASK as usize;

#[inline]
pub fn block_start(dfn: usize) -> Position {
    assert!(dfn <= SEQ_MASK as usize, "too many blocks for the position encoding");
    (dfn as u32) << BLOCK_SHIFT
}

#[inline]
pub fn block_end(dfn: usize) -> Position {
    block_start(dfn) | SEQ_MASK
}

/// The first position past the block, as an exclusive bound.
#[inline]
pub fn block_limit(dfn: usize) -> Position {
    block_end(dfn) + 1
}

/// An instruction slot: block `dfn` and index within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramPoint {
    pub dfn: usize,
    pub idx: usize,
}

impl ProgramPoint {
    pub fn new(dfn: usize, idx: usize) -> Self {
        Self { dfn, idx }
    }

    // operands are read before the destination is written
    pub fn use_pos(&self) -> Position {
        block_start(self.dfn) | (2 * self.idx as u32)
    }

    pub fn def_pos(&self) -> Position {
        self.use_pos() + 1
    }
}

/// A variable's live range summarized as `[first_use, last_use]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveRange {
    pub first_use: Position,
    pub last_use: Position,
}

impl LiveRange {
    pub const UNUSED: LiveRange = LiveRange {
        first_use: Position::MAX,
        last_use: 0,
    };

    pub fn update(&mut self, pos: Position) {
        self.first_use = self.first_use.min(pos);
        self.last_use = self.last_use.max(pos);
    }

    pub fn is_unused(&self) -> bool {
        self.first_use == Position::MAX
    }

    /// Whether the range is long enough to be worth a register.
    pub fn is_empty(&self) -> bool {
        self.first_use >= self.last_use
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.first_use <= pos && pos <= self.last_use
    }

    /// Ranges ending where another starts do not overlap.
    pub fn overlaps(&self, other: &LiveRange) -> bool {
        self.first_use < other.last_use && other.first_use < self.last_use
    }
}

impl Default for LiveRange {
    fn default() -> Self {
        Self::UNUSED
    }
}

/// Maps between block ids and dfn for the reachable part of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct Numbering {
    bblocks: Vec<BlockId>,
    dfn_of: Vec<Option<usize>>,
}

impl Numbering {
    pub fn new(func: &Function) -> Self {
        let mut dfn_of = vec![None; func.blocks.len()];
        for (dfn, bid) in func.bblocks().iter().enumerate() {
            dfn_of[bid.index()] = Some(dfn);
        }
        Self {
            bblocks: func.bblocks().to_vec(),
            dfn_of,
        }
    }

    pub fn len(&self) -> usize {
        self.bblocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bblocks.is_empty()
    }

    pub fn block(&self, dfn: usize) -> BlockId {
        self.bblocks[dfn]
    }

    pub fn dfn(&self, bid: BlockId) -> Option<usize> {
        self.dfn_of.get(bid.index()).copied().flatten()
    }

    /// dfn of a block the caller knows to be reachable.
    pub fn expect_dfn(&self, bid: BlockId) -> usize {
        match self.dfn(bid) {
            Some(dfn) => dfn,
            None => panic!("block {} is not reachable", bid.index()),
        }
    }
}
