mod compile;
mod report;

pub use compile::*;
pub use report::Report;
