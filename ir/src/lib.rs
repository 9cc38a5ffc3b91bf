mod block;
mod builder;
mod error;
mod function;
mod inst;

pub use block::*;
pub use builder::FunctionBuilder;
pub use error::GraphError;
pub use function::*;
pub use inst::*;
