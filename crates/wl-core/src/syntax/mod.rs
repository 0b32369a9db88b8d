pub mod instruction;
pub mod matcher;
pub mod scan;

pub use instruction::Instruction;
pub use matcher::{BracketMatcher, Direction, LoopTable};
