//! # Introduction
//!
//! `protoidl` parses Protocol Buffers IDL (`.proto`) source text into a typed
//! AST that keeps comments and enough layout information to regenerate the
//! source. Consumers walk the tree through the [`Visitor`] trait.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → Proto (AST) → Visitor
//! ```
//!
//! 1. [`parser::lexer`]: classifies source text into tokens on demand.
//! 2. [`parser::parse`]: recursive descent over the token stream, attaching
//!    leading and trailing comments as it goes.
//! 3. [`parser::ast`]: one node type per construct, collected in
//!    [`Element`]; [`Proto`] is the root.
//! 4. [`parser::visitor`]: double dispatch: every node calls the one
//!    [`Visitor`] method for its kind.
//!
//! ## Example
//!
//! ```
//! use protoidl::{parse, Element};
//!
//! let proto = parse("syntax = \"proto3\";\nmessage Ping { string id = 1; }").unwrap();
//! assert_eq!(proto.elements.len(), 2);
//! assert!(matches!(&proto.elements[1], Element::Message(m) if m.name == "Ping"));
//! ```
//!
//! Parsing is fail-fast: the first problem is returned as a [`SyntaxError`]
//! and no partial tree is produced.

pub mod parser;

pub use parser::ast::{
    Comment, CommentInliner, Documented, Element, ElementContainer, Enum, EnumField, Extensions,
    Field, FieldLabel, Group, Import, ImportKind, Literal, MapField, Message, NamedLiteral,
    NormalField, OneOfField, Oneof, Package, Proto, ProtoOption, Range, RangeEnd, Reserved, Rpc,
    Service, Syntax,
};
pub use parser::columns::{to_source, Alignment, Column, Columns};
pub use parser::config::ParserConfig;
pub use parser::parse::{parse, parse_with_config, Parser, SyntaxError};
pub use parser::visitor::{walk, Visitee, Visitor};
