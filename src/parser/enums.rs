//! Enum parsing implementation
//!
//! ```text
//! enum       ::= "enum" name "{" { comment | option | reserved | enum_field | ";" } "}"
//! enum_field ::= name "=" integer [ embedded ] ";"
//! ```
//!
//! Enum values are read with [`Lexer::scan_integer`](crate::parser::lexer::Lexer::scan_integer),
//! so signed, hex and octal values are accepted.

use crate::parser::ast::*;
use crate::parser::comments::attach_comment;
use crate::parser::declarations::OptionMode;
use crate::parser::lexer::{Keyword, Punct, TokenKind};
use crate::parser::parse::{Parser, SyntaxError};

impl Parser<'_> {
    pub(crate) fn parse_enum(&mut self, e: &mut Enum) -> Result<(), SyntaxError> {
        e.name = self.expect_name("enum identifier", e)?;
        let brace = self.expect_punct(Punct::LBrace, "enum opening {", e)?;
        self.enter("enum", &brace, e)?;
        loop {
            let token = self.next(e)?;
            match token.kind {
                TokenKind::Comment => {
                    attach_comment(e, Comment::new(&token.literal, token.line));
                }
                TokenKind::Punct(Punct::Semicolon) => {
                    self.maybe_scan_inline_comment(e, &token)?;
                }
                TokenKind::Punct(Punct::RBrace) => break,
                TokenKind::Eof => return Err(self.unexpected(&token, "enum closing }", e)),
                TokenKind::Keyword(Keyword::Option) => {
                    let mut option = ProtoOption {
                        comment: e.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_option(&mut option, OptionMode::Statement)?;
                    self.add_child(e, option.into());
                }
                TokenKind::Keyword(Keyword::Reserved) => {
                    let mut reserved = Reserved {
                        comment: e.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_reserved(&mut reserved)?;
                    self.add_child(e, reserved.into());
                }
                _ => {
                    self.unscan();
                    let mut field = EnumField {
                        comment: e.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_enum_field(&mut field)?;
                    self.add_child(e, field.into());
                }
            }
        }
        self.leave();
        Ok(())
    }

    fn parse_enum_field(&mut self, field: &mut EnumField) -> Result<(), SyntaxError> {
        field.name = self.expect_name("enum field identifier", field)?;
        self.expect_punct(Punct::Equals, "enum field =", field)?;
        field.integer = self.scan_integer("enum field", field)?;
        let token = self.next(field)?;
        if token.is_punct(Punct::LBracket) {
            field.value_options = self.parse_embedded_options(field)?;
        } else {
            self.unscan();
        }
        self.expect_statement_end("enum field ;", field)
    }
}
