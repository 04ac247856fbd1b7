//! Discovery of `message { ... }` block spans.

use super::{code_mask, match_brace};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::trace;

static MESSAGE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bmessage\s+[A-Za-z_][A-Za-z0-9_]*\s*\{").expect("message pattern is valid")
});

/// Brace offsets of one `message` block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Offset of the opening `{`
    pub open: usize,
    /// Offset of the matching `}`
    pub close: usize,
}

impl Span {
    /// Creates a new span
    pub fn new(open: usize, close: usize) -> Self {
        debug_assert!(open < close);
        Self { open, close }
    }

    /// Byte range of the body between the braces
    pub fn body_range(&self) -> Range<usize> {
        self.open + 1..self.close
    }

    /// Returns true if `other` lies strictly inside this span's braces
    pub fn contains(&self, other: &Span) -> bool {
        self.open < other.open && other.close < self.close
    }

    /// Returns true if `offset` lies strictly inside this span's braces
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.open < offset && offset < self.close
    }
}

/// Finds every `message Name {` block in `text`, nested ones included.
///
/// Spans are returned in ascending order of their opening brace. Keywords
/// inside comments or string literals are ignored, and an occurrence whose
/// brace is never closed is skipped.
pub fn find_message_spans(text: &str) -> Vec<Span> {
    let mask = code_mask(text);
    let mut spans = Vec::new();
    let mut position = 0;

    while let Some(found) = MESSAGE_HEAD.find_at(text, position) {
        // Resume just past the start so overlapping heads are still seen
        position = found.start() + 1;

        if !mask[found.start()] {
            trace!("Ignoring message keyword at {} outside code", found.start());
            continue;
        }

        let open = found.end() - 1;
        match match_brace(text, open) {
            Ok(close) => {
                trace!("Found message span {}..={}", open, close);
                spans.push(Span::new(open, close));
            }
            Err(e) => {
                trace!("Skipping message at {}: {}", found.start(), e);
            }
        }
    }

    spans
}
