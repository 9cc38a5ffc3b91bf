use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("edge `{from}` -> `{to}` is not recorded on both ends")]
    EdgeMismatch { from: String, to: String },
    #[error("instruction {index} of `{block}` has {count} sources (at most 3 allowed)")]
    TooManySources { block: String, index: usize, count: usize },
    #[error("block `{block}` has {len} instructions (at most {max} allowed)")]
    BlockTooLarge { block: String, len: usize, max: usize },
    #[error("block `{block}` refers to unknown clause {clause}")]
    UnknownClause { block: String, clause: usize },
    #[error("clause {clause} is nested in unknown clause {parent}")]
    UnknownParentClause { clause: usize, parent: usize },
    #[error("block `{block}` refers to an unknown variable")]
    UnknownVar { block: String },
}
