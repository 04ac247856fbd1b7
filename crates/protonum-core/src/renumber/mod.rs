//! Document-level tag renumbering.
//!
//! The [`Renumberer`] finds every `message` span of a document, orders the
//! spans innermost-first (descending opening offset) and hands each body to a
//! [`BlockRewriter`]. Rewritten bodies are spliced back into a working buffer.
//!
//! ## Offset tracking
//!
//! Span offsets are computed once against the pristine document. A splice
//! whose replacement has a different length (`9` becoming `10`) moves the
//! closing brace of every enclosing span. With
//! [`RenumberConfig::track_offsets`] enabled (the default) those stored
//! offsets are shifted by the length delta after each splice. Disabling it
//! keeps the stale offsets; stale ranges that no longer fit the buffer are
//! skipped and counted in [`RenumberStats::spans_skipped`].

mod field;

use crate::scanner::{find_message_spans, Span};
use tracing::{debug, trace, warn};

pub use field::{field_declarations, renumber_body, FieldDecl};

/// Configuration for the renumberer
#[derive(Debug, Clone)]
pub struct RenumberConfig {
    /// Shift enclosing span offsets after each splice
    pub track_offsets: bool,
}

impl Default for RenumberConfig {
    fn default() -> Self {
        Self {
            track_offsets: true,
        }
    }
}

impl RenumberConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether enclosing span offsets follow length-changing splices
    pub fn track_offsets(mut self, track: bool) -> Self {
        self.track_offsets = track;
        self
    }
}

/// Result of rewriting one message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRewrite {
    /// The new body text
    pub text: String,
    /// Number of field declarations handled
    pub fields: usize,
}

/// Trait for rewriting the body of a single `message` block
///
/// The default implementation is [`FieldRenumberer`]. Custom rewriters see
/// bodies innermost-first, with nested bodies already rewritten.
pub trait BlockRewriter {
    /// Rewrite the text between a message's braces
    fn rewrite(&self, body: &str) -> BlockRewrite;
}

/// Assigns sequential tags to the direct fields of a message body
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRenumberer;

impl BlockRewriter for FieldRenumberer {
    fn rewrite(&self, body: &str) -> BlockRewrite {
        let decls = field_declarations(body);
        BlockRewrite {
            text: field::renumber_declarations(body, &decls),
            fields: decls.len(),
        }
    }
}

/// Counters collected while processing one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenumberStats {
    /// Number of message spans found
    pub message_count: usize,
    /// Number of message bodies whose text changed
    pub messages_rewritten: usize,
    /// Number of field declarations handled
    pub field_count: usize,
    /// Number of spans skipped because their offsets no longer fit the buffer
    pub spans_skipped: usize,
}

/// Result of processing one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The rewritten document
    pub text: String,
    /// True if any message body changed
    pub changed: bool,
    /// Processing counters
    pub stats: RenumberStats,
}

/// Rewrites every `message` body of a document with a [`BlockRewriter`]
#[derive(Debug, Clone, Default)]
pub struct Renumberer<R = FieldRenumberer> {
    config: RenumberConfig,
    rewriter: R,
}

impl Renumberer {
    /// Creates a new renumberer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new renumberer with custom configuration
    pub fn with_config(config: RenumberConfig) -> Self {
        Self {
            config,
            rewriter: FieldRenumberer,
        }
    }
}

impl<R: BlockRewriter> Renumberer<R> {
    /// Creates a renumberer driving a custom block rewriter
    pub fn with_rewriter(config: RenumberConfig, rewriter: R) -> Self {
        Self { config, rewriter }
    }

    /// Returns the active configuration
    pub fn config(&self) -> &RenumberConfig {
        &self.config
    }

    /// Processes one document, returning the rewritten text
    pub fn process(&self, text: &str) -> Outcome {
        let mut spans = find_message_spans(text);
        spans.sort_by(|a, b| b.open.cmp(&a.open));

        let mut buffer = text.to_string();
        let mut stats = RenumberStats {
            message_count: spans.len(),
            ..RenumberStats::default()
        };

        debug!("Processing {} message span(s)", spans.len());

        for index in 0..spans.len() {
            let span = spans[index];
            let range = span.body_range();

            let Some(body) = buffer.get(range.clone()) else {
                warn!(
                    "Skipping message span {}..={}: offsets no longer fit the document",
                    span.open, span.close
                );
                stats.spans_skipped += 1;
                continue;
            };

            let rewrite = self.rewriter.rewrite(body);
            stats.field_count += rewrite.fields;

            if rewrite.text == body {
                trace!("Span {}..={} unchanged", span.open, span.close);
                continue;
            }

            let delta = rewrite.text.len() as isize - body.len() as isize;
            trace!(
                "Span {}..={} rewritten ({} field(s), length delta {})",
                span.open,
                span.close,
                rewrite.fields,
                delta
            );
            buffer.replace_range(range, &rewrite.text);
            stats.messages_rewritten += 1;

            if self.config.track_offsets && delta != 0 {
                shift_enclosing(&mut spans[index + 1..], &span, delta);
            }
        }

        debug!(
            "Rewrote {} of {} message(s), {} field(s) seen",
            stats.messages_rewritten, stats.message_count, stats.field_count
        );

        Outcome {
            changed: stats.messages_rewritten > 0,
            text: buffer,
            stats,
        }
    }
}

/// Moves the closing offset of every pending span that encloses `edited`.
///
/// Pending spans all open before `edited`, so they either enclose it or end
/// before it starts.
fn shift_enclosing(pending: &mut [Span], edited: &Span, delta: isize) {
    for span in pending.iter_mut().filter(|s| s.close > edited.close) {
        span.close = span.close.saturating_add_signed(delta);
    }
}

/// Renumbers a whole document with the default configuration.
///
/// ```
/// use protonum_core::process_document;
///
/// let outcome = process_document("message M { string name = 5; int32 id = 2; }");
/// assert_eq!(outcome.text, "message M { string name = 1; int32 id = 2; }");
/// assert!(outcome.changed);
/// ```
pub fn process_document(text: &str) -> Outcome {
    Renumberer::new().process(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[test]
    fn test_config_builder() {
        assert!(RenumberConfig::new().track_offsets);
        assert!(!RenumberConfig::new().track_offsets(false).track_offsets);
    }

    #[test]
    fn test_single_message() {
        let outcome = process_document("message M { string name = 5; int32 id = 2; }");
        assert_eq!(outcome.text, "message M { string name = 1; int32 id = 2; }");
        assert!(outcome.changed);
        assert_eq!(outcome.stats.field_count, 2);
    }

    #[test]
    fn test_nested_one_line() {
        let outcome =
            process_document("message Outer { message Inner { int32 x = 9; } int32 y = 3; }");
        assert_eq!(
            outcome.text,
            "message Outer { message Inner { int32 x = 1; } int32 y = 1; }"
        );
        assert_eq!(outcome.stats.message_count, 2);
        assert_eq!(outcome.stats.messages_rewritten, 2);
    }

    #[test]
    fn test_unchanged_document() {
        let text = "syntax = \"proto3\";\n\nmessage M {\n  int32 a = 1;\n  int32 b = 2;\n}\n";
        let outcome = process_document(text);
        assert_eq!(outcome.text, text);
        assert!(!outcome.changed);
    }

    #[test]
    fn test_no_messages() {
        let text = "syntax = \"proto3\";\nenum E { A = 0; B = 7; }\n";
        let outcome = process_document(text);
        assert_eq!(outcome.text, text);
        assert!(!outcome.changed);
        assert_eq!(outcome.stats.message_count, 0);
    }

    #[test]
    fn test_unmatched_message_is_left_alone() {
        let text = "message Good { int32 a = 4; }\nmessage Bad { int32 b = 9;\n";
        let outcome = process_document(text);
        assert_eq!(
            outcome.text,
            "message Good { int32 a = 1; }\nmessage Bad { int32 b = 9;\n"
        );
    }

    const WIDENING: &str = "message Outer {
  message Inner {
    int32 a = 0;
    int32 b = 0;
    int32 c = 0;
    int32 d = 0;
    int32 e = 0;
    int32 f = 0;
    int32 g = 0;
    int32 h = 0;
    int32 i = 0;
    int32 j = 0;
  }
  int32 tail = 7;}
";

    #[test]
    fn test_tracked_offsets_survive_width_change() {
        let outcome = process_document(WIDENING);
        assert!(outcome.text.contains("int32 j = 10;"));
        assert!(outcome.text.ends_with("  }\n  int32 tail = 1;}\n"));
        assert_eq!(outcome.stats.spans_skipped, 0);
    }

    #[test]
    fn test_legacy_offsets_are_stale() {
        let renumberer = Renumberer::with_config(RenumberConfig::new().track_offsets(false));
        let outcome = renumberer.process(WIDENING);

        // The stale outer range now ends on the semicolon of the last field,
        // which is therefore no longer a complete declaration.
        assert!(outcome.text.contains("int32 j = 10;"));
        assert!(outcome.text.ends_with("int32 tail = 7;}\n"));
        assert_eq!(outcome.stats.messages_rewritten, 1);
    }

    #[test]
    fn test_idempotent() {
        let text = "message A {\n  int32 x = 4;\n  message B {\n    string s = 12;\n    \
                    repeated B children = 3;\n  }\n  map<string, B> index = 9;\n}\n\
                    message C { bool ok = 2; }\n";
        let once = process_document(text);
        let twice = process_document(&once.text);
        assert_eq!(twice.text, once.text);
        assert!(!twice.changed);
    }

    #[test]
    fn test_realistic_schema() {
        let text = r#"syntax = "proto3";

package demo.v1;

import "google/protobuf/timestamp.proto";

// A user { with braces } in a comment
message User {
  string id = 10;
  string display_name = 12 [json_name = "name}"];
  /* legacy: int32 age = 3; */
  repeated string emails = 7;

  message Address {
    string street = 4;
    string city = 2;
  }

  enum Role {
    ROLE_UNSPECIFIED = 0;
    ROLE_ADMIN = 5;
  }

  oneof contact {
    Address address = 20;
    string phone = 21;
  }
  map<string, string> labels = 30;
  google.protobuf.Timestamp created_at = 40;
  option deprecated = true;
}

service Users {
  rpc Get(User) returns (User);
}
"#;
        let expected = r#"syntax = "proto3";

package demo.v1;

import "google/protobuf/timestamp.proto";

// A user { with braces } in a comment
message User {
  string id = 1;
  string display_name = 2 [json_name = "name}"];
  /* legacy: int32 age = 3; */
  repeated string emails = 3;

  message Address {
    string street = 1;
    string city = 2;
  }

  enum Role {
    ROLE_UNSPECIFIED = 0;
    ROLE_ADMIN = 5;
  }

  oneof contact {
    Address address = 4;
    string phone = 5;
  }
  map<string, string> labels = 6;
  google.protobuf.Timestamp created_at = 7;
  option deprecated = true;
}

service Users {
  rpc Get(User) returns (User);
}
"#;
        let outcome = process_document(text);
        assert_eq!(outcome.text, expected);
        assert_eq!(outcome.stats.message_count, 2);
        assert_eq!(outcome.stats.field_count, 9);
    }

    struct Recording(RefCell<Vec<String>>);

    impl BlockRewriter for Recording {
        fn rewrite(&self, body: &str) -> BlockRewrite {
            self.0.borrow_mut().push(body.trim().to_string());
            BlockRewrite {
                text: body.to_string(),
                fields: 0,
            }
        }
    }

    #[test]
    fn test_innermost_first_order() {
        let recorder = Recording(RefCell::new(Vec::new()));
        let renumberer = Renumberer::with_rewriter(RenumberConfig::new(), recorder);
        let outcome = renumberer.process("message A { message B { } } message C { }");
        assert!(!outcome.changed);

        let seen = renumberer.rewriter.0.borrow();
        assert_eq!(seen.as_slice(), ["", "", "message B { }"]);
    }
}
