//! Comment- and string-aware lexical state machine.
//!
//! The lexer walks schema text one byte at a time and reports the structural
//! characters that occur in code. Everything inside `//` comments, `/* */`
//! comments and quoted string literals is inert.
//!
//! ## Transitions
//!
//! | state                  | input            | next state             |
//! |------------------------|------------------|------------------------|
//! | `Normal`               | `//`             | `InLineComment`        |
//! | `Normal`               | `/*`             | `InBlockComment`       |
//! | `Normal`               | `"`              | `InDoubleQuotedString` |
//! | `Normal`               | `'`              | `InSingleQuotedString` |
//! | `InLineComment`        | newline          | `Normal`               |
//! | `InBlockComment`       | `*/`             | `Normal`               |
//! | `In*QuotedString`      | `\` + any byte   | unchanged              |
//! | `In*QuotedString`      | matching quote   | `Normal`               |
//!
//! All structural characters are ASCII, so offsets reported by the lexer are
//! always valid UTF-8 character boundaries of the source text.

/// Lexical mode active at a byte position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    /// Ordinary schema code
    #[default]
    Normal,
    /// Inside a `//` comment, up to the next newline
    InLineComment,
    /// Inside a `/* */` comment
    InBlockComment,
    /// Inside a `"..."` literal
    InDoubleQuotedString,
    /// Inside a `'...'` literal
    InSingleQuotedString,
}

impl ScanState {
    /// Returns true when the state is `Normal`
    pub fn is_code(&self) -> bool {
        matches!(self, ScanState::Normal)
    }
}

/// Kind of structural event produced by the [`Lexer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// `{` in code
    OpenBrace,
    /// `}` in code
    CloseBrace,
    /// `;` in code
    Semicolon,
    /// A newline in code, or the newline that terminates a line comment
    LineBreak,
    /// The `/` closing a block comment
    CommentEnd,
}

/// A structural event and the byte offset it occurred at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// What was seen
    pub kind: EventKind,
    /// Byte offset of the (last) character of the event
    pub offset: usize,
}

impl Event {
    fn new(kind: EventKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Result of a single state machine step
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    pub(crate) next: ScanState,
    pub(crate) consumed: usize,
    pub(crate) event: Option<EventKind>,
}

impl Step {
    fn advance(next: ScanState, consumed: usize) -> Self {
        Self {
            next,
            consumed,
            event: None,
        }
    }

    fn emit(next: ScanState, consumed: usize, event: EventKind) -> Self {
        Self {
            next,
            consumed,
            event: Some(event),
        }
    }
}

/// Performs one transition of the state machine at `pos`.
///
/// `pos` must be in bounds. The returned `consumed` count may run past the
/// end of `bytes` when a trailing backslash escapes nothing.
pub(crate) fn transition(state: ScanState, bytes: &[u8], pos: usize) -> Step {
    let byte = bytes[pos];
    let next_byte = bytes.get(pos + 1).copied();

    match state {
        ScanState::Normal => match (byte, next_byte) {
            (b'/', Some(b'/')) => Step::advance(ScanState::InLineComment, 2),
            (b'/', Some(b'*')) => Step::advance(ScanState::InBlockComment, 2),
            (b'"', _) => Step::advance(ScanState::InDoubleQuotedString, 1),
            (b'\'', _) => Step::advance(ScanState::InSingleQuotedString, 1),
            (b'{', _) => Step::emit(state, 1, EventKind::OpenBrace),
            (b'}', _) => Step::emit(state, 1, EventKind::CloseBrace),
            (b';', _) => Step::emit(state, 1, EventKind::Semicolon),
            (b'\n', _) => Step::emit(state, 1, EventKind::LineBreak),
            _ => Step::advance(state, 1),
        },
        ScanState::InLineComment => {
            if byte == b'\n' {
                Step::emit(ScanState::Normal, 1, EventKind::LineBreak)
            } else {
                Step::advance(state, 1)
            }
        }
        ScanState::InBlockComment => {
            if byte == b'*' && next_byte == Some(b'/') {
                Step::emit(ScanState::Normal, 2, EventKind::CommentEnd)
            } else {
                Step::advance(state, 1)
            }
        }
        ScanState::InDoubleQuotedString => match byte {
            b'\\' => Step::advance(state, 2),
            b'"' => Step::advance(ScanState::Normal, 1),
            _ => Step::advance(state, 1),
        },
        ScanState::InSingleQuotedString => match byte {
            b'\\' => Step::advance(state, 2),
            b'\'' => Step::advance(ScanState::Normal, 1),
            _ => Step::advance(state, 1),
        },
    }
}

/// Iterator over the structural [`Event`]s of a text.
///
/// The lexer always starts in [`ScanState::Normal`] at the requested offset.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    state: ScanState,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer at the start of `text`
    pub fn new(text: &'a str) -> Self {
        Self::at(text, 0)
    }

    /// Creates a lexer positioned at byte offset `start` of `text`
    pub fn at(text: &'a str, start: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: start,
            state: ScanState::Normal,
        }
    }

    /// Returns the current lexical state
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Returns the offset of the next byte to be examined
    pub fn position(&self) -> usize {
        self.pos.min(self.bytes.len())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        while self.pos < self.bytes.len() {
            let step = transition(self.state, self.bytes, self.pos);
            let last = self.pos + step.consumed - 1;
            self.pos += step.consumed;
            self.state = step.next;

            if let Some(kind) = step.event {
                return Some(Event::new(kind, last));
            }
        }
        None
    }
}
