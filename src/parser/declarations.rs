//! Declaration parsing implementation
//!
//! This module handles the single-statement declarations of a `.proto` file and
//! the option constants they carry:
//!
//! - Syntax: `syntax = "proto3";`
//! - Package: `package foo.bar;`
//! - Import: `import [weak|public] "file.proto";`
//! - Option: `option (ext).name = constant;` or embedded `[name = constant, ...]`
//! - Constants: strings, signed numbers, identifiers, text-format aggregates
//!
//! # Grammar
//!
//! ```text
//! syntax    ::= "syntax" "=" string ";"
//! package   ::= "package" name ";"
//! import    ::= "import" [ "weak" | "public" ] string ";"
//! option    ::= "option" option_name "=" constant ";"
//! embedded  ::= "[" option_name "=" constant { "," option_name "=" constant } "]"
//! option_name ::= ( name | "(" name ")" ) { "." name | ".name" }
//! constant  ::= string | [ "-" | "+" ] ( number | name ) | aggregate
//! aggregate ::= "{" { entry [ "," | ";" ] } "}"
//! entry     ::= ( name | "[" name "]" ) ( ":" value | [ ":" ] aggregate )
//! value     ::= constant | "[" [ value { "," value } ] "]"
//! ```
//!
//! The leading keyword has already been consumed when these routines run.

use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Punct, Token, TokenKind};
use crate::parser::parse::{unquote, Parser, SyntaxError, UnderConstruction};

/// Where an option is being parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OptionMode {
    /// `option name = constant;` as a statement of its own
    Statement,
    /// `name = constant` inside `[ ... ]`; the caller handles `,` and `]`
    Embedded,
}

impl Parser<'_> {
    pub(crate) fn parse_syntax(&mut self, syntax: &mut Syntax) -> Result<(), SyntaxError> {
        self.expect_punct(Punct::Equals, "syntax =", syntax)?;
        (syntax.value, syntax.quote) = self.expect_string("syntax string constant", syntax)?;
        self.expect_statement_end("syntax ;", syntax)
    }

    pub(crate) fn parse_package(&mut self, package: &mut Package) -> Result<(), SyntaxError> {
        package.name = self.expect_name("package identifier", package)?;
        self.expect_statement_end("package ;", package)
    }

    pub(crate) fn parse_import(&mut self, import: &mut Import) -> Result<(), SyntaxError> {
        let mut token = self.next(import)?;
        if token.is_keyword(Keyword::Weak) || token.is_keyword(Keyword::Public) {
            import.kind = if token.is_keyword(Keyword::Weak) {
                ImportKind::Weak
            } else {
                ImportKind::Public
            };
            token = self.next(import)?;
        }
        if token.kind != TokenKind::Str {
            return Err(self.unexpected(&token, "import filename", import));
        }
        (import.filename, import.quote) = unquote(&token.literal);
        self.expect_statement_end("import ;", import)
    }

    /// Parse an option; in [`OptionMode::Statement`] the `option` keyword has
    /// already been read.
    pub(crate) fn parse_option(
        &mut self,
        option: &mut ProtoOption,
        mode: OptionMode,
    ) -> Result<(), SyntaxError> {
        option.name = self.parse_option_name(option)?;
        self.expect_punct(Punct::Equals, "option constant =", option)?;
        let mut comments = Vec::new();
        option.constant = self.parse_constant(option, &mut comments)?;
        option.inner_comments.append(&mut comments);
        match mode {
            OptionMode::Statement => self.expect_statement_end("option ;", option),
            OptionMode::Embedded => Ok(()),
        }
    }

    /// Parse `name = constant, ...]` after an opening `[`, consuming the `]`.
    ///
    /// A comment in the list belongs to the option it precedes, unless it sits
    /// before a `,` or the `]`, or on the same line as the `,`: then it belongs
    /// to the option before it.
    pub(crate) fn parse_embedded_options(
        &mut self,
        owner: &dyn UnderConstruction,
    ) -> Result<Vec<ProtoOption>, SyntaxError> {
        let mut options: Vec<ProtoOption> = Vec::new();
        let mut comma_line = None;
        loop {
            let mut leading = Vec::new();
            let token = self.next_skipping_comments(owner, &mut leading)?;
            if let (Some(line), Some(previous)) = (comma_line, options.last_mut()) {
                let (trailing, rest): (Vec<Comment>, Vec<Comment>) =
                    leading.into_iter().partition(|c| c.line == line);
                previous.inner_comments.extend(trailing);
                leading = rest;
            }
            if token.is_punct(Punct::RBracket) {
                return Err(self.unexpected(&token, "option name", owner));
            }
            self.unscan();
            let mut option = ProtoOption {
                inner_comments: leading,
                ..Default::default()
            };
            self.parse_option(&mut option, OptionMode::Embedded)?;
            let token = self.next_skipping_comments(owner, &mut option.inner_comments)?;
            options.push(option);
            if token.is_punct(Punct::RBracket) {
                return Ok(options);
            }
            if !token.is_punct(Punct::Comma) {
                return Err(self.unexpected(&token, "option closing ]", owner));
            }
            comma_line = Some(token.line);
        }
    }

    fn parse_option_name(&mut self, option: &ProtoOption) -> Result<String, SyntaxError> {
        let mut name = String::new();
        loop {
            let token = self.next(option)?;
            if token.is_punct(Punct::LParen) {
                let inner = self.expect_name("option extension name", option)?;
                self.expect_punct(Punct::RParen, "option closing )", option)?;
                name.push('(');
                name.push_str(&inner);
                name.push(')');
            } else if token.is_punct(Punct::Dot) && !name.is_empty() {
                name.push('.');
            } else if token.is_name() && (name.is_empty() || token.literal.starts_with('.')) {
                name.push_str(&token.literal);
            } else if name.is_empty() {
                return Err(self.unexpected(&token, "option name", option));
            } else {
                self.unscan();
                return Ok(name);
            }
        }
    }

    /// Parse the value of an option.
    ///
    /// Comments inside an aggregate are appended to `comments`.
    pub(crate) fn parse_constant(
        &mut self,
        node: &dyn UnderConstruction,
        comments: &mut Vec<Comment>,
    ) -> Result<Literal, SyntaxError> {
        let token = self.next(node)?;
        match token.kind {
            TokenKind::Str => {
                let (value, quote) = unquote(&token.literal);
                Ok(Literal::Str { value, quote })
            }
            TokenKind::Number | TokenKind::Ident | TokenKind::Keyword(_) => {
                Ok(Literal::Scalar(token.literal))
            }
            TokenKind::Punct(Punct::Minus | Punct::Plus) => {
                let value = self.next(node)?;
                if matches!(value.kind, TokenKind::Number | TokenKind::Ident) {
                    Ok(Literal::Scalar(format!("{}{}", token.literal, value.literal)))
                } else {
                    Err(self.unexpected(&value, "number after sign", node))
                }
            }
            TokenKind::Punct(Punct::LBrace) => self.parse_aggregate(&token, node, comments),
            _ => Err(self.unexpected(&token, "option constant", node)),
        }
    }

    /// Text-format message literal; the opening `{` is `brace`.
    fn parse_aggregate(
        &mut self,
        brace: &Token,
        node: &dyn UnderConstruction,
        comments: &mut Vec<Comment>,
    ) -> Result<Literal, SyntaxError> {
        self.enter("aggregate", brace, node)?;
        let mut entries = Vec::new();
        loop {
            let token = self.next_skipping_comments(node, comments)?;
            let name = match token.kind {
                TokenKind::Punct(Punct::RBrace) => break,
                TokenKind::Punct(Punct::Comma | Punct::Semicolon) => continue,
                TokenKind::Punct(Punct::LBracket) => {
                    let name = self.expect_name("extension name", node)?;
                    self.expect_punct(Punct::RBracket, "extension name closing ]", node)?;
                    format!("[{name}]")
                }
                TokenKind::Ident | TokenKind::Keyword(_) => token.literal,
                _ => return Err(self.unexpected(&token, "aggregate closing }", node)),
            };
            let separator = self.next(node)?;
            let entry = if separator.is_punct(Punct::Colon) {
                NamedLiteral {
                    name,
                    value: self.parse_aggregate_value(node, comments)?,
                    print_colon: true,
                }
            } else if separator.is_punct(Punct::LBrace) {
                NamedLiteral {
                    name,
                    value: self.parse_aggregate(&separator, node, comments)?,
                    print_colon: false,
                }
            } else {
                return Err(self.unexpected(&separator, "aggregate field : or {", node));
            };
            entries.push(entry);
        }
        self.leave();
        Ok(Literal::Message(entries))
    }

    fn parse_aggregate_value(
        &mut self,
        node: &dyn UnderConstruction,
        comments: &mut Vec<Comment>,
    ) -> Result<Literal, SyntaxError> {
        let token = self.next_skipping_comments(node, comments)?;
        if !token.is_punct(Punct::LBracket) {
            self.unscan();
            return self.parse_constant(node, comments);
        }
        self.enter("list", &token, node)?;
        let mut values = Vec::new();
        loop {
            let token = self.next_skipping_comments(node, comments)?;
            if token.is_punct(Punct::RBracket) {
                self.leave();
                return Ok(Literal::List(values));
            }
            if !values.is_empty() {
                if !token.is_punct(Punct::Comma) {
                    return Err(self.unexpected(&token, "list closing ]", node));
                }
            } else {
                self.unscan();
            }
            values.push(self.parse_aggregate_value(node, comments)?);
        }
    }

    /// Next non-comment token inside option brackets or an aggregate; the
    /// comments in between go to `comments`.
    fn next_skipping_comments(
        &mut self,
        node: &dyn UnderConstruction,
        comments: &mut Vec<Comment>,
    ) -> Result<Token, SyntaxError> {
        loop {
            let token = self.next(node)?;
            if token.kind != TokenKind::Comment {
                return Ok(token);
            }
            comments.push(Comment::new(&token.literal, token.line));
        }
    }
}
