//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the [`SyntaxError`] type, the
//! token helpers every parse routine shares, and the [`parse`] entry points.
//!
//! # Parser Architecture
//!
//! The parser is recursive descent over a pull lexer with one token of
//! push-back:
//! - This module: Parser struct, helpers, top-level loop
//! - `declarations`: syntax, package, import, option and constants
//! - `messages`: message and extend bodies, fields, oneofs, groups, ranges
//! - `enums`: enum bodies and enum values
//! - `services`: service bodies and RPCs
//! - `comments`: doc/inline comment attachment shared by every body loop
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks.
//! Every routine receives the node it is filling in, so that a failure can
//! report the partially built node alongside the offending token.
//!
//! ```text
//! proto     = { comment | syntax | package | import | option
//!             | message | extend | enum | service | ";" } EOF
//! ```

use crate::parser::ast::*;
use crate::parser::comments::attach_comment;
use crate::parser::config::ParserConfig;
use crate::parser::declarations::OptionMode;
use crate::parser::lexer::{Keyword, LexError, Lexer, Punct, Token, TokenKind};
use tracing::{debug, trace};

/// Parse failure: what was found, what was expected, and the node being built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: found {found:?} but expected [{expected}]")]
pub struct SyntaxError {
    pub found: String,
    pub expected: String,
    /// Snapshot of the partially built node, when there was one
    pub node: Option<Box<Element>>,
    pub line: usize,
}

impl SyntaxError {
    /// Kind of the node under construction, if any.
    pub fn node_kind(&self) -> Option<&'static str> {
        self.node.as_deref().map(Element::kind_name)
    }
}

/// Anything the parser may be in the middle of building.
pub(crate) trait UnderConstruction {
    fn snapshot(&self) -> Option<Element>;
}

impl UnderConstruction for Proto {
    fn snapshot(&self) -> Option<Element> {
        None
    }
}

macro_rules! under_construction {
    ($($node:ty),*) => {
        $(
            impl UnderConstruction for $node {
                fn snapshot(&self) -> Option<Element> {
                    Some(self.clone().into())
                }
            }
        )*
    };
}

under_construction!(
    Syntax, Package, Import, ProtoOption, Message, NormalField, MapField, OneOfField, Oneof,
    Enum, EnumField, Service, Rpc, Reserved, Group, Extensions
);

/// A container whose body the parser is filling in.
pub(crate) trait Body: ElementContainer + UnderConstruction {}

impl<T: ElementContainer + UnderConstruction> Body for T {}

/// Recursive descent parser for `.proto` sources
pub struct Parser<'a> {
    pub(crate) lexer: Lexer<'a>,
    pub(crate) config: ParserConfig,
    depth: usize,
    /// Comments met between the tokens of a statement, waiting to be added
    /// to the enclosing body
    interior: Vec<Comment>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, config: ParserConfig) -> Self {
        Parser {
            lexer: Lexer::new(source),
            config,
            depth: 0,
            interior: Vec::new(),
        }
    }

    /// Parse the whole source into a [`Proto`].
    pub fn parse_proto(&mut self) -> Result<Proto, SyntaxError> {
        let mut proto = Proto::default();
        loop {
            let token = self.next(&proto)?;
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Comment => {
                    attach_comment(&mut proto, Comment::new(&token.literal, token.line));
                }
                TokenKind::Punct(Punct::Semicolon) => {
                    self.maybe_scan_inline_comment(&mut proto, &token)?;
                }
                TokenKind::Keyword(Keyword::Syntax) => {
                    let mut syntax = Syntax {
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_syntax(&mut syntax)?;
                    self.add_child(&mut proto, syntax.into());
                }
                TokenKind::Keyword(Keyword::Package) => {
                    let mut package = Package {
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_package(&mut package)?;
                    self.add_child(&mut proto, package.into());
                }
                TokenKind::Keyword(Keyword::Import) => {
                    let mut import = Import {
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_import(&mut import)?;
                    self.add_child(&mut proto, import.into());
                }
                TokenKind::Keyword(Keyword::Option) => {
                    let mut option = ProtoOption {
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_option(&mut option, OptionMode::Statement)?;
                    self.add_child(&mut proto, option.into());
                }
                TokenKind::Keyword(Keyword::Message | Keyword::Extend) => {
                    let mut message = Message {
                        is_extend: token.is_keyword(Keyword::Extend),
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_message(&mut message)?;
                    self.add_child(&mut proto, message.into());
                }
                TokenKind::Keyword(Keyword::Enum) => {
                    let mut e = Enum {
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_enum(&mut e)?;
                    self.add_child(&mut proto, e.into());
                }
                TokenKind::Keyword(Keyword::Service) => {
                    let mut service = Service {
                        comment: proto.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_service(&mut service)?;
                    self.add_child(&mut proto, service.into());
                }
                _ => return Err(self.unexpected(&token, "top-level declaration", &proto)),
            }
        }
        Ok(proto)
    }

    // ===== Helper methods =====

    pub(crate) fn next(&mut self, node: &dyn UnderConstruction) -> Result<Token, SyntaxError> {
        self.lexer.next().map_err(|err| lex_error(err, node))
    }

    pub(crate) fn unscan(&mut self) {
        self.lexer.unscan();
    }

    /// Next token that is not a comment. Skipped comments are kept and land in
    /// the enclosing body, ahead of the statement, through
    /// [`add_child`](Self::add_child).
    pub(crate) fn next_significant(
        &mut self,
        node: &dyn UnderConstruction,
    ) -> Result<Token, SyntaxError> {
        loop {
            let token = self.next(node)?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
            self.interior.push(Comment::new(&token.literal, token.line));
        }
    }

    /// Add a finished child to a body, preceded by the comments written inside it.
    pub(crate) fn add_child(&mut self, container: &mut dyn ElementContainer, element: Element) {
        for comment in self.interior.drain(..) {
            container.add_element(comment.into());
        }
        container.add_element(element);
    }

    /// Read the integer that follows an `=`.
    pub(crate) fn scan_integer(
        &mut self,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> Result<i64, SyntaxError> {
        while let Some(token) = self.lexer.next_comment().map_err(|err| lex_error(err, node))? {
            self.interior.push(Comment::new(&token.literal, token.line));
        }
        self.lexer.scan_integer().map_err(|err| SyntaxError {
            found: err.literal,
            expected: format!("{expected} integer literal"),
            node: node.snapshot().map(Box::new),
            line: err.line,
        })
    }

    pub(crate) fn unexpected(
        &self,
        token: &Token,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> SyntaxError {
        let found = match token.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => token.literal.clone(),
        };
        SyntaxError {
            found,
            expected: expected.to_string(),
            node: node.snapshot().map(Box::new),
            line: token.line,
        }
    }

    pub(crate) fn expect_punct(
        &mut self,
        punct: Punct,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> Result<Token, SyntaxError> {
        let token = self.next_significant(node)?;
        if token.is_punct(punct) {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected, node))
        }
    }

    pub(crate) fn expect_keyword(
        &mut self,
        keyword: Keyword,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> Result<Token, SyntaxError> {
        let token = self.next_significant(node)?;
        if token.is_keyword(keyword) {
            Ok(token)
        } else {
            Err(self.unexpected(&token, expected, node))
        }
    }

    /// Identifiers and keywords both qualify as names.
    pub(crate) fn expect_name(
        &mut self,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> Result<String, SyntaxError> {
        let token = self.next_significant(node)?;
        if token.is_name() {
            Ok(token.literal)
        } else {
            Err(self.unexpected(&token, expected, node))
        }
    }

    /// A quoted string, returned without its quotes, and the quote character.
    pub(crate) fn expect_string(
        &mut self,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> Result<(String, char), SyntaxError> {
        let token = self.next_significant(node)?;
        if token.kind == TokenKind::Str {
            Ok(unquote(&token.literal))
        } else {
            Err(self.unexpected(&token, expected, node))
        }
    }

    /// Require the terminating `;` and push it back for the body loop's
    /// inline comment check.
    pub(crate) fn expect_statement_end(
        &mut self,
        expected: &str,
        node: &dyn UnderConstruction,
    ) -> Result<(), SyntaxError> {
        self.expect_punct(Punct::Semicolon, expected, node)?;
        self.unscan();
        Ok(())
    }

    /// Step into a `{ ... }` body.
    pub(crate) fn enter(
        &mut self,
        what: &str,
        brace: &Token,
        node: &dyn UnderConstruction,
    ) -> Result<(), SyntaxError> {
        if self.depth >= self.config.max_depth {
            return Err(self.unexpected(
                brace,
                &format!("at most {} nested bodies", self.config.max_depth),
                node,
            ));
        }
        self.depth += 1;
        trace!(depth = self.depth, line = brace.line, "entering {what} body");
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

fn lex_error(err: LexError, node: &dyn UnderConstruction) -> SyntaxError {
    SyntaxError {
        found: err.literal,
        expected: err.message,
        node: node.snapshot().map(Box::new),
        line: err.line,
    }
}

/// Strip the surrounding quotes of a string literal.
pub(crate) fn unquote(literal: &str) -> (String, char) {
    let quote = literal.chars().next().unwrap_or('"');
    let body = literal
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(literal);
    (body.to_string(), quote)
}

/// Parse `.proto` source text with the default configuration.
pub fn parse(source: &str) -> Result<Proto, SyntaxError> {
    parse_with_config(source, &ParserConfig::default())
}

pub fn parse_with_config(source: &str, config: &ParserConfig) -> Result<Proto, SyntaxError> {
    debug!(len = source.len(), "parsing proto source");
    let result = Parser::new(source, *config).parse_proto();
    match &result {
        Ok(proto) => debug!(elements = proto.elements.len(), "parsed proto source"),
        Err(err) => debug!(%err, "failed to parse proto source"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_source() {
        let proto = parse("").unwrap();
        assert!(proto.elements.is_empty());

        let proto = parse("  \n\n ;; \n").unwrap();
        assert!(proto.elements.is_empty());
    }

    #[test]
    fn test_parse_top_level_order() {
        let source = r#"
            syntax = "proto3";
            package demo;
            import "other.proto";
            option java_package = "com.demo";
            message A {}
            enum B { X = 0; }
            service C {}
        "#;
        let proto = parse(source).unwrap();
        let kinds: Vec<&str> = proto.elements.iter().map(Element::kind_name).collect();
        assert_eq!(
            kinds,
            vec!["Syntax", "Package", "Import", "Option", "Message", "Enum", "Service"]
        );
    }

    #[test]
    fn test_unexpected_top_level_token() {
        let err = parse("int32 x = 1;").unwrap_err();
        assert_eq!(err.found, "int32");
        assert_eq!(err.expected, "top-level declaration");
        assert_eq!(err.line, 1);
        assert!(err.node.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = parse("\n}").unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"line 2: found "}" but expected [top-level declaration]"#
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"a.proto\""), ("a.proto".to_string(), '"'));
        assert_eq!(unquote("'x'"), ("x".to_string(), '\''));
    }

    #[test]
    fn test_depth_limit() {
        let config = ParserConfig::default().with_max_depth(2);
        assert!(parse_with_config("message A { message B {} }", &config).is_ok());

        let err = parse_with_config("message A { message B { message C {} } }", &config)
            .unwrap_err();
        assert_eq!(err.found, "{");
        assert!(err.expected.contains("at most 2"));
        assert_eq!(err.node_kind(), Some("Message"));
    }
}
