//! WhatLang Interpreter - Core Library
//!
//! Public API surface for the interpreter core.

pub mod config;
pub mod error;
pub mod source;
pub mod syntax;
pub mod vm;

// Re-export commonly used types
pub use config::WlConfig;
pub use error::{ErrorKind, TraceFrame, WlError, WlResult};
pub use source::SourceOrigin;
pub use vm::interpreter::{Interpreter, OutputSink, Step};
pub use vm::memory::Variables;
pub use vm::value::{Value, ValueType};

/// Run `code` to completion on a single empty frame and return the final
/// current stack.
pub fn eval(code: &str, variables: &Variables, output: impl FnMut(&str)) -> WlResult<Vec<Value>> {
    let mut interpreter = Interpreter::new(code, output).with_variables(variables)?;
    interpreter.run()?;
    interpreter.stack()
}
