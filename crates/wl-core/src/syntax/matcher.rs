//! Bracket/Loop Matcher
//!
//! Resolves loop boundaries and break targets from source text alone.
//! Walks whole syntactic units (see [`unit_end`]) so braces inside
//! character, string and paren literals are never counted.

use std::collections::HashMap;

use crate::error::{WlError, WlResult};
use super::scan::unit_end;

/// `}` to `{` pairs of one program, found by a single unit sweep
#[derive(Debug, Clone, Default)]
pub struct LoopTable {
    /// Position of each matched `}` mapped to the position after its `{`
    openers: HashMap<usize, usize>,
    /// Start of the first malformed literal, where the sweep stopped
    stopped: Option<usize>,
}

impl LoopTable {
    pub fn build(src: &[char]) -> Self {
        let mut openers = HashMap::new();
        let mut open = Vec::new();
        let mut i = 0;
        while i < src.len() {
            match src[i] {
                '{' => open.push(i),
                '}' => {
                    if let Some(start) = open.pop() {
                        openers.insert(i, start + 1);
                    }
                }
                _ => {}
            }
            match unit_end(src, i) {
                Ok(end) => i = end,
                Err(_) => {
                    return LoopTable {
                        openers,
                        stopped: Some(i),
                    }
                }
            }
        }
        LoopTable {
            openers,
            stopped: None,
        }
    }

    /// Number of matched loops
    pub fn len(&self) -> usize {
        self.openers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openers.is_empty()
    }
}

/// Scan direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards a closing `}`: skipping a loop body or breaking out
    Forward,
    /// Towards an opening `{`: repeating a loop body
    Backward,
}

/// Loop boundary resolution over one program text
#[derive(Debug, Clone, Copy)]
pub struct BracketMatcher<'a> {
    src: &'a [char],
    loops: &'a LoopTable,
}

impl<'a> BracketMatcher<'a> {
    pub fn new(src: &'a [char], loops: &'a LoopTable) -> Self {
        BracketMatcher { src, loops }
    }

    /// Resume position for a control transfer.
    ///
    /// Forward: start scanning at `from` with `depth` enclosing loops still
    /// open; returns the position after the `depth`-th unmatched `}`.
    /// Backward: `from` is a `}`; returns the position after its `{`.
    /// `depth` is ignored.
    pub fn find(&self, from: usize, direction: Direction, depth: usize) -> WlResult<usize> {
        match direction {
            Direction::Forward => self.forward(from, depth),
            Direction::Backward => self.backward(from),
        }
    }

    fn forward(&self, from: usize, depth: usize) -> WlResult<usize> {
        if depth == 0 {
            return Ok(from);
        }
        let mut depth = depth;
        let mut i = from;
        while i < self.src.len() {
            match self.src[i] {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i + 1);
                    }
                }
                _ => {}
            }
            i = unit_end(self.src, i)?;
        }
        Err(WlError::syntax(
            from.saturating_sub(1),
            "no matching } before end of input",
        ))
    }

    fn backward(&self, close: usize) -> WlResult<usize> {
        if let Some(stopped) = self.loops.stopped.filter(|s| *s < close) {
            // reports the malformed literal the sweep stopped at
            unit_end(self.src, stopped)?;
        }
        self.loops
            .openers
            .get(&close)
            .copied()
            .ok_or_else(|| WlError::syntax(close, "no matching { for }"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn matcher<'a>(src: &'a [char], loops: &'a LoopTable) -> BracketMatcher<'a> {
        BracketMatcher::new(src, loops)
    }

    #[test]
    fn forward_skips_nested_loops() {
        let src = chars("{a{b}c}d");
        let loops = LoopTable::build(&src);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(1, Direction::Forward, 1).unwrap(), 7);
    }

    #[test]
    fn forward_break_depth() {
        // break from inside both loops of `{{!!}}x`
        let src = chars("{{!!}}x");
        let loops = LoopTable::build(&src);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(4, Direction::Forward, 2).unwrap(), 6);
        assert_eq!(m.find(4, Direction::Forward, 1).unwrap(), 5);
    }

    #[test]
    fn backward_finds_opening_brace() {
        let src = chars("1{2{3}4}");
        let loops = LoopTable::build(&src);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(7, Direction::Backward, 1).unwrap(), 2);
        assert_eq!(m.find(5, Direction::Backward, 1).unwrap(), 4);
    }

    #[test]
    fn quoted_braces_are_not_counted() {
        let src = chars("{'}\"}\"(})}x");
        let loops = LoopTable::build(&src);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(1, Direction::Forward, 1).unwrap(), 10);
        assert_eq!(m.find(9, Direction::Backward, 1).unwrap(), 1);
    }

    #[test]
    fn escaped_quote_before_brace() {
        // `''` is the literal quote, so the following `}` is real
        let src = chars("{''}x");
        let loops = LoopTable::build(&src);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(1, Direction::Forward, 1).unwrap(), 4);
        assert_eq!(m.find(3, Direction::Backward, 1).unwrap(), 1);
    }

    #[test]
    fn unmatched_braces_are_syntax_errors() {
        let src = chars("{ab");
        let loops = LoopTable::build(&src);
        let err = matcher(&src, &loops)
            .find(1, Direction::Forward, 1)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Syntax { position: 0, .. }));

        let src = chars("ab}");
        let loops = LoopTable::build(&src);
        let err = matcher(&src, &loops)
            .find(2, Direction::Backward, 1)
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Syntax { position: 2, .. }));
    }

    #[test]
    fn table_pairs_every_real_brace() {
        let src = chars("{ '{ \"}\" { (}) } }");
        let loops = LoopTable::build(&src);
        assert_eq!(loops.len(), 2);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(15, Direction::Backward, 1).unwrap(), 10);
        assert_eq!(m.find(17, Direction::Backward, 1).unwrap(), 1);
    }

    #[test]
    fn malformed_literal_before_brace_is_reported() {
        // the sweep stops at the unterminated string, so later braces are unknown
        let src = chars("{ 1 } \"abc } ");
        let loops = LoopTable::build(&src);
        let m = matcher(&src, &loops);
        assert_eq!(m.find(4, Direction::Backward, 1).unwrap(), 1);
        let err = m.find(11, Direction::Backward, 1).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Syntax { position: 6, .. }));
    }
}
