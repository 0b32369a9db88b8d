//! Lexical Primitives
//!
//! Character-run scanners shared by the dispatcher and the bracket matcher.
//! All positions are character indices; returned ends are exclusive.

use crate::error::{WlError, WlResult};

/// End of the digit run starting at `start`
pub fn digit_run(src: &[char], start: usize) -> usize {
    run_end(src, start, |c| c.is_ascii_digit())
}

/// End of the identifier run (letters, digits, `_`) starting at `start`
pub fn word_run(src: &[char], start: usize) -> usize {
    run_end(src, start, |c| c.is_ascii_alphanumeric() || c == '_')
}

fn run_end(src: &[char], start: usize, accept: impl Fn(char) -> bool) -> usize {
    src[start..]
        .iter()
        .position(|c| !accept(*c))
        .map_or(src.len(), |p| start + p)
}

/// The character after the `'` at `start`
pub fn char_literal(src: &[char], start: usize) -> WlResult<char> {
    src.get(start + 1)
        .copied()
        .ok_or_else(|| WlError::syntax(start, "character literal at end of input"))
}

/// Read a `"` or `` ` `` delimited literal whose opening delimiter is at `start`.
///
/// Returns the unescaped text and the position after the closing delimiter.
pub fn delimited(src: &[char], start: usize) -> WlResult<(String, usize)> {
    let delimiter = src[start];
    let mut text = String::new();
    let mut i = start + 1;
    while let Some(&c) = src.get(i) {
        match c {
            '\\' => {
                let escaped = src
                    .get(i + 1)
                    .copied()
                    .ok_or_else(|| WlError::syntax(start, "unterminated string literal"))?;
                text.push(match escaped {
                    'r' => '\r',
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                });
                i += 2;
            }
            c if c == delimiter => return Ok((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(WlError::syntax(start, "unterminated string literal"))
}

/// Find the `)` balancing the `(` at `start`. Returns its position.
pub fn paren_close(src: &[char], start: usize) -> WlResult<usize> {
    let mut depth = 0usize;
    for (i, c) in src.iter().enumerate().skip(start) {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(WlError::syntax(start, "unterminated ( literal"))
}

/// End of the syntactic unit starting at `start`.
///
/// Literals are skipped whole so that brace characters inside them are
/// never taken for loop boundaries.
pub fn unit_end(src: &[char], start: usize) -> WlResult<usize> {
    match src[start] {
        '\'' => char_literal(src, start).map(|_| start + 2),
        '"' | '`' => delimited(src, start).map(|(_, end)| end),
        '(' => paren_close(src, start).map(|close| close + 1),
        c if c.is_ascii_digit() && c != '0' => Ok(digit_run(src, start)),
        c if c.is_ascii_alphabetic() => Ok(word_run(src, start)),
        _ => Ok(start + 1),
    }
}
