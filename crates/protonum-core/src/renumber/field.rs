//! Field declaration matching and per-block tag renumbering.
//!
//! A field declaration is recognized textually, one statement at a time:
//!
//! ```text
//! [label] type name = number [options];
//! ```
//!
//! `label` is one of `optional`, `required` or `repeated`; `type` is a bare or
//! dotted identifier or a `map<K, V>`; `options` is a single `[...]` group.
//! Only the number is ever rewritten. Declarations nested in an inner
//! `message` block belong to that block and are skipped here.

use crate::scanner::{find_message_spans, statement_starts};
use crate::MAX_FIELD_NUMBER;
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{trace, warn};

static FIELD_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
        \A[\ \t]*
        (?:(?P<label>optional|required|repeated)[\ \t]+)?
        (?P<ty>map[\ \t]*<[^>\n]*>|[\w.<>]+)
        [\ \t]+
        (?P<name>[A-Za-z_]\w*)
        [\ \t]*=[\ \t]*
        (?P<tag>[0-9]+)
        [\ \t]*
        (?:\[(?:[^\]"'\n]|"(?:[^"\\\n]|\\.)*"|'(?:[^'\\\n]|\\.)*')*\])?
        [\ \t]*;"#,
    )
    .expect("field pattern is valid")
});

/// Statements shaped like fields that are not fields
const NON_FIELD_KEYWORDS: &[&str] = &["option"];

/// One field declaration found in a message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl<'a> {
    /// `optional`, `required` or `repeated`, if present
    pub label: Option<&'a str>,
    /// Field type exactly as written
    pub ty: &'a str,
    /// Field name
    pub name: &'a str,
    /// Existing tag digits
    pub tag: &'a str,
    /// Byte range of the tag digits within the body
    pub tag_range: Range<usize>,
}

impl FieldDecl<'_> {
    /// Parses the existing tag, if it fits in a `u32`
    pub fn old_tag(&self) -> Option<u32> {
        self.tag.parse().ok()
    }
}

/// Returns the direct field declarations of a message body in source order.
///
/// Comment and string contents are never matched, `option x = N;` statements
/// are not fields, and declarations inside nested `message` blocks are left to
/// those blocks. Members of a `oneof` are direct fields of the message.
pub fn field_declarations(body: &str) -> Vec<FieldDecl<'_>> {
    let nested = find_message_spans(body);
    let mut decls = Vec::new();
    let mut consumed = 0;

    for start in statement_starts(body) {
        if start < consumed || nested.iter().any(|span| span.contains_offset(start)) {
            continue;
        }

        let Some(caps) = FIELD_DECL.captures(&body[start..]) else {
            continue;
        };

        let (Some(ty), Some(name), Some(tag), Some(whole)) = (
            caps.name("ty"),
            caps.name("name"),
            caps.name("tag"),
            caps.get(0),
        ) else {
            continue;
        };

        if NON_FIELD_KEYWORDS.contains(&ty.as_str()) {
            continue;
        }

        decls.push(FieldDecl {
            label: caps.name("label").map(|m| m.as_str()),
            ty: ty.as_str(),
            name: name.as_str(),
            tag: tag.as_str(),
            tag_range: start + tag.start()..start + tag.end(),
        });
        consumed = start + whole.end();
    }

    decls
}

/// Rewrites every direct field tag of `body` to 1, 2, 3, ... in source order.
///
/// All other bytes are copied through unchanged. A body without declarations
/// is returned as is.
///
/// ```
/// use protonum_core::renumber_body;
///
/// let body = "\n  string name = 5;\n  map<string, int32> tags = 9 [deprecated = true];\n";
/// assert_eq!(
///     renumber_body(body),
///     "\n  string name = 1;\n  map<string, int32> tags = 2 [deprecated = true];\n"
/// );
/// ```
pub fn renumber_body(body: &str) -> String {
    renumber_declarations(body, &field_declarations(body))
}

pub(crate) fn renumber_declarations(body: &str, decls: &[FieldDecl<'_>]) -> String {
    let mut output = String::with_capacity(body.len() + decls.len());
    let mut last = 0;

    for (tag, decl) in (1u32..).zip(decls) {
        if tag > MAX_FIELD_NUMBER {
            warn!(
                "Field '{}' gets tag {} beyond the protobuf maximum {}",
                decl.name, tag, MAX_FIELD_NUMBER
            );
        }
        trace!("Field '{}': {} -> {}", decl.name, decl.tag, tag);

        output.push_str(&body[last..decl.tag_range.start]);
        output.push_str(&tag.to_string());
        last = decl.tag_range.end;
    }

    output.push_str(&body[last..]);
    output
}
