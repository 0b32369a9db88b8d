//! Variable Dictionary
//!
//! Name-keyed variable storage for one program run. Written only by `=`,
//! read only by `^`.

use std::collections::HashMap;

use crate::error::{ErrorKind, WlResult};
use super::value::Value;

/// Variables visible to a program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: HashMap<String, Value>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn store(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Private copy for one run: arrays are copied, never shared with `self`.
    pub fn snapshot(&self, max_nesting: usize) -> WlResult<Variables> {
        let mut values = HashMap::with_capacity(self.values.len());
        for (name, value) in &self.values {
            let copy = value
                .deep_clone(max_nesting)
                .ok_or(ErrorKind::Nesting(max_nesting))?;
            values.insert(name.clone(), copy);
        }
        Ok(Variables { values })
    }
}

impl From<HashMap<String, Value>> for Variables {
    fn from(values: HashMap<String, Value>) -> Self {
        Variables { values }
    }
}
