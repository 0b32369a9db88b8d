//! Instruction Dispatcher
//!
//! Executes program text directly: each step consumes one syntactic unit
//! (a literal run or a single instruction character), applies it to the
//! current frame and hands control back to the caller.

use tracing::{debug, trace};

use crate::config::WlConfig;
use crate::error::{ErrorKind, WlError, WlResult};
use crate::source::{Source, SourceOrigin};
use crate::syntax::scan;
use crate::syntax::{Direction, Instruction};

use super::memory::Variables;
use super::operands::{expect_array, ArgType};
use super::semantics::{add, arithmetic, compare, ordering_to_number, render, to_boolean, to_number};
use super::stack::FrameStack;
use super::value::Value;

/// Receives text emitted by `.` and `` ` ``
pub type OutputSink<'a> = Box<dyn FnMut(&str) + 'a>;

/// Result of executing one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More units remain
    Continue,
    /// Program finished (or halted after an error)
    Done,
}

/// WhatLang interpreter over one program text
pub struct Interpreter<'a> {
    config: WlConfig,
    source: Source,
    frames: FrameStack,
    variables: Variables,
    output: OutputSink<'a>,

    pos: usize,
    halted: bool,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with default limits, one empty frame and no variables
    pub fn new(code: &str, output: impl FnMut(&str) + 'a) -> Self {
        let config = WlConfig::default();
        Interpreter {
            frames: FrameStack::new(config.max_stack_size, config.max_frame_depth),
            source: Source::new(code, SourceOrigin::default()),
            variables: Variables::new(),
            output: Box::new(output),
            pos: 0,
            halted: false,
            config,
        }
    }

    pub fn with_config(mut self, config: WlConfig) -> Self {
        self.frames
            .set_limits(config.max_stack_size, config.max_frame_depth);
        self.config = config;
        self
    }

    pub fn with_origin(mut self, origin: SourceOrigin) -> Self {
        self.source.set_origin(origin);
        self
    }

    /// Seed variables from a host dictionary. The dictionary is copied.
    pub fn with_variables(mut self, variables: &Variables) -> WlResult<Self> {
        self.variables = variables.snapshot(self.config.max_nesting)?;
        Ok(self)
    }

    /// Replace the initial frame stack (outermost first)
    pub fn with_frames(mut self, frames: Vec<Vec<Value>>) -> Self {
        self.frames = FrameStack::from_frames(
            frames,
            self.config.max_stack_size,
            self.config.max_frame_depth,
        );
        self
    }

    /// Execute until the program ends or fails
    pub fn run(&mut self) -> WlResult<()> {
        while self.step()? == Step::Continue {}
        Ok(())
    }

    /// Execute at most `max_steps` units; fails if the program is not done by then
    pub fn run_with_budget(&mut self, max_steps: u64) -> WlResult<()> {
        let mut steps = 0u64;
        while self.step()? == Step::Continue {
            steps += 1;
            if steps >= max_steps && !self.is_finished() {
                self.halted = true;
                let err = WlError::from(ErrorKind::StepLimit(max_steps))
                    .with_frame(self.source.trace_frame(self.pos));
                return Err(err);
            }
        }
        Ok(())
    }

    /// Execute a single unit
    pub fn step(&mut self) -> WlResult<Step> {
        if self.halted {
            return Ok(Step::Done);
        }
        let start = self.pos;
        let Some(c) = self.source.get(start) else {
            self.halted = true;
            debug!(variables = self.variables.len(), "run finished");
            return Ok(Step::Done);
        };

        trace!(position = start, instruction = %c, "dispatch");
        match self.dispatch(start, c) {
            Ok(next) => {
                self.pos = next;
                Ok(Step::Continue)
            }
            Err(err) => {
                self.halted = true;
                Err(err.with_frame(self.source.trace_frame(start)))
            }
        }
    }

    /// Copy of the current stack (bottom first)
    pub fn stack(&self) -> WlResult<Vec<Value>> {
        self.frames.snapshot()
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.depth()
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Position of the next unit
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_finished(&self) -> bool {
        self.halted || self.pos >= self.source.len()
    }

    /// Apply the unit starting at `start`; returns the position of the next unit
    fn dispatch(&mut self, start: usize, c: char) -> WlResult<usize> {
        let next = start + 1;
        match Instruction::from_char(c) {
            Instruction::Nop => Ok(next),

            // Literals
            Instruction::Zero => {
                self.frames.push(Value::Number(0.0))?;
                Ok(next)
            }
            Instruction::Digits => {
                let end = scan::digit_run(self.source.chars(), start);
                let digits: String = self.source.chars()[start..end].iter().collect();
                let n = digits
                    .parse::<f64>()
                    .map_err(|e| WlError::internal(format!("bad digit run {:?}: {}", digits, e)))?;
                self.frames.push(Value::Number(n))?;
                Ok(end)
            }
            Instruction::Word => {
                let end = scan::word_run(self.source.chars(), start);
                let word: String = self.source.chars()[start..end].iter().collect();
                self.frames.push(Value::String(word.to_lowercase()))?;
                Ok(end)
            }
            Instruction::CharLiteral => {
                let ch = scan::char_literal(self.source.chars(), start)?;
                self.frames.push(Value::String(ch.to_string()))?;
                Ok(start + 2)
            }
            Instruction::StringLiteral => {
                let (text, end) = scan::delimited(self.source.chars(), start)?;
                self.frames.push(Value::String(text))?;
                Ok(end)
            }
            Instruction::OutputLiteral => {
                let (text, end) = scan::delimited(self.source.chars(), start)?;
                (self.output)(&text);
                Ok(end)
            }
            Instruction::ParenLiteral => {
                let close = scan::paren_close(self.source.chars(), start)?;
                let text: String = self.source.chars()[start + 1..close].iter().collect();
                self.frames.push(Value::String(text))?;
                Ok(close + 1)
            }
            Instruction::CloseParen => Err(WlError::syntax(start, "unmatched )")),

            // Arithmetic and comparison
            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Mod
            | Instruction::Compare => {
                self.binary(c)?;
                Ok(next)
            }
            Instruction::Not => {
                let [value] = self.frames.pop_args("~", [ArgType::Any])?;
                let negated = if to_boolean(&value) { 0.0 } else { 1.0 };
                self.frames.push(Value::Number(negated))?;
                Ok(next)
            }

            // Frames
            Instruction::OpenFrame => {
                self.frames.open()?;
                Ok(next)
            }
            Instruction::OpenArray => {
                let [array] = self.frames.pop_args("|", [ArgType::Array])?;
                self.frames.open_array(expect_array("|", array)?)?;
                Ok(next)
            }
            Instruction::CloseFrame => {
                self.frames.close()?;
                Ok(next)
            }

            // Stack
            Instruction::Print => {
                let top = self.frames.peek()?.unwrap_or(Value::Absent);
                let text = render(&top, self.config.max_nesting);
                (self.output)(&text);
                Ok(next)
            }
            Instruction::Dup => {
                self.frames.dup()?;
                Ok(next)
            }
            Instruction::Discard => {
                self.frames.discard()?;
                Ok(next)
            }

            // Variables
            Instruction::SetVar => {
                let [name] = self.frames.pop_args("=", [ArgType::Any])?;
                let value = self.frames.peek()?.unwrap_or(Value::Absent);
                self.variables
                    .store(render(&name, self.config.max_nesting), value);
                Ok(next)
            }
            Instruction::GetVar => {
                let [name] = self.frames.pop_args("^", [ArgType::Any])?;
                let value = self
                    .variables
                    .load(&render(&name, self.config.max_nesting))
                    .cloned()
                    .unwrap_or(Value::Absent);
                self.frames.push(value)?;
                Ok(next)
            }

            // Arrays
            Instruction::Gather => {
                let [count] = self.frames.pop_args(">", [ArgType::Any])?;
                // NaN and negative counts saturate to zero
                let count = to_number(&count).trunc() as usize;
                let gathered = self.frames.gather(">", count)?;
                self.frames.push(gathered)?;
                Ok(next)
            }
            Instruction::Spread => {
                let [array] = self.frames.pop_args("<", [ArgType::Array])?;
                let items = expect_array("<", array)?.borrow().clone();
                self.frames.extend(items)?;
                Ok(next)
            }
            Instruction::IndexGet => {
                let [array, index] = self.frames.pop_args(",", [ArgType::Array, ArgType::Any])?;
                let items = expect_array(",", array)?;
                let element = {
                    let items = items.borrow();
                    resolve_index(index_or(&index, 0.0), items.len())
                        .and_then(|i| items.get(i).cloned())
                        .unwrap_or(Value::Absent)
                };
                self.frames.push(Value::Array(items))?;
                self.frames.push(element)?;
                Ok(next)
            }
            Instruction::IndexSet => {
                let [array, index, value] =
                    self.frames
                        .pop_args(";", [ArgType::Array, ArgType::Any, ArgType::Any])?;
                let items = expect_array(";", array)?;
                {
                    let mut slots = items.borrow_mut();
                    let len = slots.len() as f64;
                    let i = index_or(&index, len);
                    if i == len || (-len < i && i < len) {
                        let i = (if i < 0.0 { i + len } else { i }) as usize;
                        if i == slots.len() {
                            slots.push(value);
                        } else {
                            slots[i] = value;
                        }
                    }
                }
                self.frames.push(Value::Array(items))?;
                Ok(next)
            }
            Instruction::IndexDelete => {
                let [array, index] = self.frames.pop_args("$", [ArgType::Array, ArgType::Any])?;
                let items = expect_array("$", array)?;
                {
                    let mut slots = items.borrow_mut();
                    if let Some(i) = resolve_index(index_or(&index, 0.0), slots.len()) {
                        slots.remove(i);
                    }
                }
                self.frames.push(Value::Array(items))?;
                Ok(next)
            }

            // Control flow
            Instruction::LoopHead => {
                let [condition] = self.frames.pop_args("{", [ArgType::Any])?;
                if to_boolean(&condition) {
                    return Ok(next);
                }
                let target = self.source.matcher().find(next, Direction::Forward, 1)?;
                debug!(from = start, to = target, "loop skipped");
                Ok(target)
            }
            Instruction::LoopTail => {
                let [condition] = self.frames.pop_args("}", [ArgType::Any])?;
                if !to_boolean(&condition) {
                    return Ok(next);
                }
                let target = self.source.matcher().find(start, Direction::Backward, 1)?;
                trace!(from = start, to = target, "loop repeated");
                Ok(target)
            }
            Instruction::Break => {
                let src = self.source.chars();
                let end = src[start..]
                    .iter()
                    .position(|ch| *ch != '!')
                    .map_or(src.len(), |p| start + p);
                let depth = end - start;
                let target = self.source.matcher().find(end, Direction::Forward, depth)?;
                debug!(from = start, to = target, depth, "break");
                Ok(target)
            }

            Instruction::Call | Instruction::Map => Err(ErrorKind::Unsupported(c).into()),
        }
    }

    /// `+ - * / % ?`
    fn binary(&mut self, op: char) -> WlResult<()> {
        let [a, b] = self
            .frames
            .pop_args(&op.to_string(), [ArgType::Any, ArgType::Any])?;
        let result = match op {
            '+' => add(&a, &b, self.config.max_nesting),
            '?' => Value::Number(ordering_to_number(compare(&a, &b, self.config.max_nesting)?)),
            _ => Value::Number(
                arithmetic(op, &a, &b)
                    .ok_or_else(|| WlError::internal(format!("{} is not an arithmetic operator", op)))?,
            ),
        };
        self.frames.push(result)
    }
}

/// Index operand as a truncated number, with `nan_as` standing in for NaN
fn index_or(index: &Value, nan_as: f64) -> f64 {
    let n = to_number(index);
    if n.is_nan() {
        nan_as
    } else {
        n.trunc()
    }
}

/// Map a possibly negative index into `0..len`
fn resolve_index(index: f64, len: usize) -> Option<usize> {
    let len = len as f64;
    let i = if index < 0.0 { index + len } else { index };
    if (0.0..len).contains(&i) {
        Some(i as usize)
    } else {
        None
    }
}
