pub mod interpreter;
pub mod memory;
pub mod operands;
pub mod semantics;
pub mod stack;
pub mod value;

pub use interpreter::{Interpreter, Step};
pub use memory::Variables;
pub use value::{Value, ValueType};
