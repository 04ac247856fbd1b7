//! # protonum-core
//!
//! A library for renumbering field tags in Protocol Buffers schema text.
//!
//! Within every `message` block, field tags are rewritten to run 1, 2, 3, ...
//! in source order. Nested messages get their own sequence. Everything that
//! is not a field number (comments, strings, options, enum values) passes
//! through byte for byte.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`scanner`]: Comment- and string-aware brace matching and span discovery
//! - [`renumber`]: Field matching and document rewriting
//! - [`io`]: Reading and writing schema files
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```
//! use protonum_core::process_document;
//!
//! let outcome = process_document(
//!     "message Outer { message Inner { int32 x = 9; } int32 y = 3; }",
//! );
//! assert_eq!(
//!     outcome.text,
//!     "message Outer { message Inner { int32 x = 1; } int32 y = 1; }"
//! );
//! ```
//!
//! ## Extensibility
//!
//! - [`BlockRewriter`]: Customize what happens to each message body
//! - [`RenumberConfig`]: Choose how span offsets follow earlier edits
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod io;
pub mod renumber;
pub mod scanner;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use io::{read_document, write_document};
pub use renumber::{
    field_declarations, process_document, renumber_body, BlockRewrite, BlockRewriter, FieldDecl,
    FieldRenumberer, Outcome, RenumberConfig, RenumberStats, Renumberer,
};
pub use scanner::{find_message_spans, match_brace, Span};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;
