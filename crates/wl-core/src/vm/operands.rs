//! Operand Protocol
//!
//! Type-checked popping of operands off a stack. The requested window is
//! validated before the stack is touched, so a failed pop leaves it intact.

use std::fmt;
use std::rc::Rc;

use crate::error::{ErrorKind, WlError, WlResult};
use super::semantics::to_string;
use super::value::{ArrayRef, Value, ValueType};

/// Declared operand type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Any,
    String,
    Number,
    Array,
    Absent,
}

impl ArgType {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::String => value.type_of() == ValueType::String,
            ArgType::Number => value.type_of() == ValueType::Number,
            ArgType::Array => value.type_of() == ValueType::Array,
            ArgType::Absent => value.type_of() == ValueType::Absent,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgType::Any => f.write_str("Any"),
            ArgType::String => ValueType::String.fmt(f),
            ArgType::Number => ValueType::Number.fmt(f),
            ArgType::Array => ValueType::Array.fmt(f),
            ArgType::Absent => ValueType::Absent.fmt(f),
        }
    }
}

/// Pop `N` operands of the declared types off the tail of `stack`.
///
/// Index 0 of `types` (and of the result) is the deepest operand.
pub fn pop_args<const N: usize>(
    op: &str,
    stack: &mut Vec<Value>,
    types: [ArgType; N],
) -> WlResult<[Value; N]> {
    if stack.len() < N {
        return Err(ErrorKind::Arity {
            op: op.to_string(),
            required: N,
            available: stack.len(),
        }
        .into());
    }

    let base = stack.len() - N;
    for (index, (expected, value)) in types.iter().zip(&stack[base..]).enumerate() {
        if !expected.accepts(value) {
            return Err(ErrorKind::Type {
                op: op.to_string(),
                index,
                expected: *expected,
                actual: value.type_of(),
                rendered: to_string(value),
            }
            .into());
        }
    }

    stack
        .split_off(base)
        .try_into()
        .map_err(|_| WlError::internal(format!("{} popped the wrong number of operands", op)))
}

/// Unwrap an operand that `pop_args` already checked to be an array.
pub fn expect_array(op: &str, value: Value) -> WlResult<ArrayRef> {
    match &value {
        Value::Array(items) => Ok(Rc::clone(items)),
        other => Err(WlError::internal(format!(
            "{} received a checked {} operand",
            op,
            other.type_of()
        ))),
    }
}
