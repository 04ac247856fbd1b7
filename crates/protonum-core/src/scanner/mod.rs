//! Structural scanning of protobuf schema text.
//!
//! This module locates block boundaries without parsing the protobuf grammar.
//! It is built on a small lexical state machine ([`Lexer`]) that knows only
//! about comments and string literals, which is enough to keep braces and
//! semicolons inside them from affecting the structure.
//!
//! ## Algorithm Overview
//!
//! 1. Find each `message Name {` keyword occurrence in code
//! 2. Walk forward from its `{` counting brace depth in `Normal` mode
//! 3. Record the `(open, close)` [`Span`] once the depth returns to zero
//!
//! Statement starts ([`statement_starts`]) are derived from the same events
//! and tell the field renumberer where a declaration may begin.

mod lexer;
mod spans;

use crate::error::{Error, Result};
use tracing::trace;

pub use lexer::{Event, EventKind, Lexer, ScanState};
pub use spans::{find_message_spans, Span};

/// Returns the offset of the `}` matching the `{` at `open`.
///
/// Braces inside `//` comments, `/* */` comments and quoted strings are
/// ignored. Fails with [`Error::UnmatchedBrace`] when the text ends before the
/// depth returns to zero, and with [`Error::NotAnOpenBrace`] when `open` does
/// not hold a `{`.
///
/// ```
/// use protonum_core::scanner::match_brace;
///
/// let text = "message M { string s = 1 [default = \"}\"]; }";
/// assert_eq!(match_brace(text, 10).unwrap(), text.len() - 1);
/// ```
pub fn match_brace(text: &str, open: usize) -> Result<usize> {
    if text.as_bytes().get(open) != Some(&b'{') {
        return Err(Error::not_an_open_brace(open));
    }

    let mut depth: usize = 0;
    for event in Lexer::at(text, open) {
        match event.kind {
            EventKind::OpenBrace => depth += 1,
            EventKind::CloseBrace => {
                depth -= 1;
                if depth == 0 {
                    return Ok(event.offset);
                }
            }
            _ => {}
        }
    }

    trace!("No matching brace for offset {}", open);
    Err(Error::unmatched_brace(open))
}

/// Returns every offset at which a statement may begin, in ascending order.
///
/// That is offset 0 and the byte following a newline, `{`, `}`, `;` or the
/// end of a block comment, all in code. Offsets inside comments and strings
/// never appear.
pub fn statement_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(
        Lexer::new(text)
            .map(|event| event.offset + 1)
            .filter(|&start| start < text.len()),
    );
    starts
}

/// Returns a per-byte flag that is `true` where the byte is code.
///
/// Comment delimiters, comment bodies, quotes and string contents are all
/// `false`.
pub fn code_mask(text: &str) -> Vec<bool> {
    let bytes = text.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut state = ScanState::Normal;
    let mut pos = 0;

    while pos < bytes.len() {
        let step = lexer::transition(state, bytes, pos);
        let is_code = state.is_code() && step.next.is_code();
        let end = (pos + step.consumed).min(bytes.len());
        mask[pos..end].fill(is_code);
        state = step.next;
        pos += step.consumed;
    }

    mask
}
