//! Protocol Buffers IDL front end
//!
//! This module transforms `.proto` source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split across `impl Parser` blocks
//! - [`ast`]: AST node definitions and their capabilities
//! - [`columns`]: alignment fragments for re-serialization
//! - [`visitor`]: double-dispatch traversal
//!
//! # Supported Grammar
//!
//! proto2 and proto3 files: syntax, package, imports, options (with aggregate
//! constants), messages, extend blocks, fields, maps, oneofs, groups, enums,
//! services, RPCs with streaming and option bodies, reserved and extension
//! ranges. Comments are kept and attached to the declarations they document.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser over a pull lexer with one token of
//! push-back. No external parser generator dependencies.

pub mod ast;
pub mod columns;
mod comments;
pub mod config;
mod declarations;
mod enums;
pub mod lexer;
mod messages;
pub mod parse;
mod services;
pub mod visitor;
