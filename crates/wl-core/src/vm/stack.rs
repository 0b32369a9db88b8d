//! Frame Stack
//!
//! The stack of stacks behind `[`, `|` and `]`. The last frame is the
//! current stack; the frame stack is never left empty.
//! No instruction semantics live here.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::error::{ErrorKind, WlError, WlResult};
use super::operands::{pop_args, ArgType};
use super::value::{ArrayRef, Value};

/// Nested execution stacks
#[derive(Debug)]
pub struct FrameStack {
    frames: Vec<ArrayRef>,
    max_stack_size: usize,
    max_frame_depth: usize,
}

impl FrameStack {
    /// Create a frame stack holding a single empty stack
    pub fn new(max_stack_size: usize, max_frame_depth: usize) -> Self {
        Self::from_frames(Vec::new(), max_stack_size, max_frame_depth)
    }

    /// Create a frame stack from host-supplied stacks (outermost first)
    pub fn from_frames(frames: Vec<Vec<Value>>, max_stack_size: usize, max_frame_depth: usize) -> Self {
        let mut frames: Vec<ArrayRef> = frames
            .into_iter()
            .map(|items| Rc::new(RefCell::new(items)))
            .collect();
        if frames.is_empty() {
            frames.push(Rc::default());
        }
        FrameStack {
            frames,
            max_stack_size,
            max_frame_depth,
        }
    }

    pub fn set_limits(&mut self, max_stack_size: usize, max_frame_depth: usize) {
        self.max_stack_size = max_stack_size;
        self.max_frame_depth = max_frame_depth;
    }

    /// Number of frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The current stack
    pub fn current(&self) -> WlResult<&ArrayRef> {
        self.frames
            .last()
            .ok_or_else(|| WlError::internal("frame stack is empty"))
    }

    /// Copy of the current stack's contents (bottom first)
    pub fn snapshot(&self) -> WlResult<Vec<Value>> {
        Ok(self.current()?.borrow().clone())
    }

    /// Push value onto the current stack
    pub fn push(&mut self, value: Value) -> WlResult<()> {
        let mut stack = self.current()?.borrow_mut();
        if stack.len() >= self.max_stack_size {
            return Err(ErrorKind::StackOverflow(self.max_stack_size).into());
        }
        stack.push(value);
        Ok(())
    }

    /// Push values in order onto the current stack
    pub fn extend(&mut self, values: Vec<Value>) -> WlResult<()> {
        let mut stack = self.current()?.borrow_mut();
        if stack.len() + values.len() > self.max_stack_size {
            return Err(ErrorKind::StackOverflow(self.max_stack_size).into());
        }
        stack.extend(values);
        Ok(())
    }

    /// Top of the current stack, if any
    pub fn peek(&self) -> WlResult<Option<Value>> {
        Ok(self.current()?.borrow().last().cloned())
    }

    /// Duplicate the top value; no-op on an empty stack
    pub fn dup(&mut self) -> WlResult<()> {
        match self.peek()? {
            Some(value) => self.push(value),
            None => Ok(()),
        }
    }

    /// Drop the top value; no-op on an empty stack
    pub fn discard(&mut self) -> WlResult<()> {
        self.current()?.borrow_mut().pop();
        Ok(())
    }

    /// Type-checked pop from the current stack
    pub fn pop_args<const N: usize>(&mut self, op: &str, types: [ArgType; N]) -> WlResult<[Value; N]> {
        pop_args(op, &mut self.current()?.borrow_mut(), types)
    }

    /// Remove the top `count` values and return them as one array
    pub fn gather(&mut self, op: &str, count: usize) -> WlResult<Value> {
        let mut stack = self.current()?.borrow_mut();
        if stack.len() < count {
            return Err(ErrorKind::Arity {
                op: op.to_string(),
                required: count,
                available: stack.len(),
            }
            .into());
        }
        let base = stack.len() - count;
        Ok(Value::array(stack.split_off(base)))
    }

    /// Open a new empty stack (`[`)
    pub fn open(&mut self) -> WlResult<()> {
        self.open_array(Rc::default())
    }

    /// Open an existing array as the current stack (`|`)
    pub fn open_array(&mut self, items: ArrayRef) -> WlResult<()> {
        if self.frames.len() >= self.max_frame_depth {
            return Err(ErrorKind::FrameOverflow(self.max_frame_depth).into());
        }
        self.frames.push(items);
        debug!(depth = self.frames.len(), "frame opened");
        Ok(())
    }

    /// Close the current stack and push it as an array onto the one below (`]`)
    pub fn close(&mut self) -> WlResult<()> {
        let closed = self
            .frames
            .pop()
            .ok_or_else(|| WlError::internal("frame stack is empty"))?;
        if self.frames.is_empty() {
            self.frames.push(Rc::default());
        }
        debug!(depth = self.frames.len(), "frame closed");
        self.push(Value::Array(closed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames() -> FrameStack {
        FrameStack::new(16, 4)
    }

    #[test]
    fn close_collects_frame_into_array() {
        let mut fs = frames();
        fs.push(Value::from("below")).unwrap();
        fs.open().unwrap();
        fs.push(Value::Number(1.0)).unwrap();
        fs.push(Value::Number(2.0)).unwrap();
        fs.close().unwrap();

        assert_eq!(fs.depth(), 1);
        assert_eq!(
            fs.snapshot().unwrap(),
            vec![
                Value::from("below"),
                Value::array(vec![Value::Number(1.0), Value::Number(2.0)]),
            ]
        );
    }

    #[test]
    fn closing_outermost_frame_installs_replacement() {
        let mut fs = frames();
        fs.push(Value::Number(1.0)).unwrap();
        fs.close().unwrap();
        assert_eq!(fs.depth(), 1);
        assert_eq!(
            fs.snapshot().unwrap(),
            vec![Value::array(vec![Value::Number(1.0)])]
        );
    }

    #[test]
    fn opened_array_is_shared_storage() {
        let mut fs = frames();
        let array = Value::array(vec![Value::Number(1.0)]);
        let storage = array.as_array().cloned().unwrap();
        fs.open_array(storage).unwrap();
        fs.push(Value::Number(2.0)).unwrap();
        fs.close().unwrap();

        assert_eq!(array, Value::array(vec![Value::Number(1.0), Value::Number(2.0)]));
    }

    #[test]
    fn limits_are_enforced() {
        let mut fs = FrameStack::new(1, 2);
        fs.push(Value::Absent).unwrap();
        let err = fs.push(Value::Absent).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::StackOverflow(1)));

        fs.open().unwrap();
        let err = fs.open().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::FrameOverflow(2)));
    }

    #[test]
    fn gather_takes_top_values_in_order() {
        let mut fs = frames();
        for n in 1..=3 {
            fs.push(Value::Number(n as f64)).unwrap();
        }
        let gathered = fs.gather(">", 2).unwrap();
        assert_eq!(gathered, Value::array(vec![Value::Number(2.0), Value::Number(3.0)]));
        assert_eq!(fs.snapshot().unwrap(), vec![Value::Number(1.0)]);

        let err = fs.gather(">", 5).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Arity { required: 5, available: 1, .. }));
    }

    #[test]
    fn dup_and_discard_ignore_empty_stack() {
        let mut fs = frames();
        fs.dup().unwrap();
        fs.discard().unwrap();
        assert!(fs.snapshot().unwrap().is_empty());
    }
}
