//! Program Source
//!
//! Holds program text as characters and maps character positions to
//! line/column pairs for diagnostics.

use crate::error::TraceFrame;
use crate::syntax::{BracketMatcher, LoopTable};

/// Where a program came from, for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOrigin {
    pub name: String,
    /// Line number of the first character (1-based)
    pub line: usize,
    /// Column number of the first character (1-based)
    pub col: usize,
}

impl Default for SourceOrigin {
    fn default() -> Self {
        SourceOrigin {
            name: "<main>".to_string(),
            line: 1,
            col: 1,
        }
    }
}

impl SourceOrigin {
    pub fn named(name: impl Into<String>) -> Self {
        SourceOrigin {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Program text
#[derive(Debug, Clone)]
pub struct Source {
    chars: Vec<char>,
    loops: LoopTable,
    origin: SourceOrigin,
}

impl Source {
    pub fn new(text: &str, origin: SourceOrigin) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Source {
            loops: LoopTable::build(&chars),
            chars,
            origin,
        }
    }

    /// Loop boundary resolution over this text
    pub fn matcher(&self) -> BracketMatcher<'_> {
        BracketMatcher::new(&self.chars, &self.loops)
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    pub fn origin(&self) -> &SourceOrigin {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: SourceOrigin) {
        self.origin = origin;
    }

    /// Line and column of `index`. The origin's column offset applies to
    /// the first line only.
    pub fn line_col(&self, index: usize) -> (usize, usize) {
        let before = &self.chars[..index.min(self.chars.len())];
        let newlines = before.iter().filter(|c| **c == '\n').count();
        let mut col = self.column_in_line(index);
        if newlines == 0 {
            col += self.origin.col - 1;
        }
        (self.origin.line + newlines, col)
    }

    /// 1-based column of `index` within its own line, ignoring the origin
    fn column_in_line(&self, index: usize) -> usize {
        let index = index.min(self.chars.len());
        let line_start = self.chars[..index]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |p| p + 1);
        index - line_start + 1
    }

    /// Text of the line containing `index`, without its line break
    pub fn line_text(&self, index: usize) -> String {
        let index = index.min(self.chars.len());
        let start = self.chars[..index]
            .iter()
            .rposition(|c| *c == '\n')
            .map_or(0, |p| p + 1);
        let end = self.chars[index..]
            .iter()
            .position(|c| *c == '\n')
            .map_or(self.chars.len(), |p| index + p);
        self.chars[start..end].iter().collect()
    }

    pub fn trace_frame(&self, index: usize) -> TraceFrame {
        let (line, col) = self.line_col(index);
        TraceFrame {
            name: self.origin.name.clone(),
            line,
            col,
            source: self.line_text(index),
            caret: self.column_in_line(index),
        }
    }
}
