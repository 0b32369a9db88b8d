//! WhatLang Error Types
//!
//! Defines all error conditions produced by the interpreter core.
//! Every error aborts the current run; the host decides how to report it.

use std::fmt;

use thiserror::Error;

use crate::vm::operands::ArgType;
use crate::vm::value::ValueType;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    // Operand errors
    #[error("{op} takes {required} arguments, only {available} values present in stack")]
    Arity {
        op: String,
        required: usize,
        available: usize,
    },

    #[error("{op} expected argument {index} to be of type {expected}, got {actual} {rendered}")]
    Type {
        op: String,
        index: usize,
        expected: ArgType,
        actual: ValueType,
        rendered: String,
    },

    // Source errors
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    // Resource limits
    #[error("stack overflow: more than {0} values on one stack")]
    StackOverflow(usize),

    #[error("frame overflow: more than {0} nested frames")]
    FrameOverflow(usize),

    #[error("structure nested deeper than {0} levels (cyclic array?)")]
    Nesting(usize),

    #[error("step limit of {0} exceeded")]
    StepLimit(u64),

    // Unimplemented instructions
    #[error("instruction `{0}` is not supported")]
    Unsupported(char),

    #[error("internal error: {0}")]
    Internal(String),
}

/// One entry of a diagnostic trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    pub name: String,
    pub line: usize,
    pub col: usize,
    pub source: String,
    /// Column of the position within `source` (1-based)
    pub caret: usize,
}

impl fmt::Display for TraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {} ({}:{})", self.name, self.line, self.col)?;
        if !self.source.is_empty() {
            write!(f, "\n    {}", self.source)?;
            write!(f, "\n    {:>width$}", "^", width = self.caret)?;
        }
        Ok(())
    }
}

/// Interpreter error: a kind plus an optional trace.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}{}", render_trace(.trace))]
pub struct WlError {
    kind: ErrorKind,
    trace: Vec<TraceFrame>,
}

impl WlError {
    pub fn new(kind: ErrorKind) -> Self {
        WlError {
            kind,
            trace: Vec::new(),
        }
    }

    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        ErrorKind::Syntax {
            position,
            message: message.into(),
        }
        .into()
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ErrorKind::Internal(message.into()).into()
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn trace(&self) -> &[TraceFrame] {
        &self.trace
    }

    /// Append a trace frame. The kind is left untouched.
    pub fn with_frame(mut self, frame: TraceFrame) -> Self {
        self.trace.push(frame);
        self
    }
}

impl From<ErrorKind> for WlError {
    fn from(kind: ErrorKind) -> Self {
        WlError::new(kind)
    }
}

fn render_trace(trace: &[TraceFrame]) -> String {
    trace.iter().map(|frame| format!("\n  {}", frame)).collect()
}

pub type WlResult<T> = Result<T, WlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_does_not_change_kind() {
        let err = WlError::syntax(3, "unmatched )").with_frame(TraceFrame {
            name: "<main>".to_string(),
            line: 1,
            col: 4,
            source: "12 )".to_string(),
            caret: 4,
        });
        assert!(matches!(err.kind(), ErrorKind::Syntax { position: 3, .. }));
        assert_eq!(err.trace().len(), 1);

        let text = err.to_string();
        assert!(text.starts_with("syntax error at position 3: unmatched )"));
        assert!(text.contains("at <main> (1:4)"));
        assert!(text.contains("12 )"));
        assert!(text.ends_with("\n    12 )\n       ^"), "{}", text);
    }

    #[test]
    fn arity_message_reports_counts() {
        let err = WlError::from(ErrorKind::Arity {
            op: "+".to_string(),
            required: 2,
            available: 1,
        });
        assert_eq!(
            err.to_string(),
            "+ takes 2 arguments, only 1 values present in stack"
        );
    }
}
