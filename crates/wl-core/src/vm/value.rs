//! Runtime Value Representation
//!
//! Defines the value domain of the interpreter and its type tags.
//! Arrays are shared by reference: duplicating an array value, opening it
//! as a stack with `|`, or storing it in a variable all alias one storage.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable array storage. Also the representation of a stack.
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Character sequence
    String(String),

    /// Numeric value (IEEE 754)
    Number(f64),

    /// Ordered sequence of values
    Array(ArrayRef),

    /// No value (unbound variable, missing element)
    Absent,
}

/// Type tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Number,
    Array,
    Absent,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "String",
            ValueType::Number => "Number",
            ValueType::Array => "Array",
            ValueType::Absent => "Absent",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Build a fresh array value owning `items`
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn type_of(&self) -> ValueType {
        match self {
            Value::String(_) => ValueType::String,
            Value::Number(_) => ValueType::Number,
            Value::Array(_) => ValueType::Array,
            Value::Absent => ValueType::Absent,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Number or Absent: the operands of numeric addition and comparison
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_) | Value::Absent)
    }

    /// Copy this value, giving every nested array its own storage.
    ///
    /// Returns `None` when arrays nest deeper than `max_nesting`.
    pub fn deep_clone(&self, max_nesting: usize) -> Option<Value> {
        match self {
            Value::Array(items) => {
                let depth = max_nesting.checked_sub(1)?;
                let copied = items
                    .borrow()
                    .iter()
                    .map(|item| item.deep_clone(depth))
                    .collect::<Option<Vec<_>>>()?;
                Some(Value::array(copied))
            }
            other => Some(other.clone()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

// Nested arrays are released through a worklist; nesting depth is unbounded.
impl Drop for Value {
    fn drop(&mut self) {
        let Value::Array(items) = self else {
            return;
        };
        if Rc::strong_count(items) != 1 {
            return;
        }
        let mut pending = match items.try_borrow_mut() {
            Ok(mut items) => std::mem::take(&mut *items),
            Err(_) => return,
        };
        while let Some(value) = pending.pop() {
            if let Value::Array(inner) = &value {
                if Rc::strong_count(inner) == 1 {
                    if let Ok(mut inner) = inner.try_borrow_mut() {
                        pending.append(&mut inner);
                    }
                }
            }
        }
    }
}

/// Type tag of `value`
pub fn type_of(value: &Value) -> ValueType {
    value.type_of()
}
