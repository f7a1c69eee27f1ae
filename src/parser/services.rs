//! Service parsing implementation
//!
//! ```text
//! service ::= "service" name "{" { comment | option | rpc | ";" } "}"
//! rpc     ::= "rpc" name "(" [ "stream" ] type ")" "returns" "(" [ "stream" ] type ")"
//!             ( ";" | "{" { comment | option | ";" } "}" )
//! ```
//!
//! An RPC body is a container like any other: comments in it merge, inline
//! and document the following option by the usual rules.

use crate::parser::ast::*;
use crate::parser::comments::attach_comment;
use crate::parser::declarations::OptionMode;
use crate::parser::lexer::{Keyword, Punct, TokenKind};
use crate::parser::parse::{Parser, SyntaxError};

impl Parser<'_> {
    pub(crate) fn parse_service(&mut self, service: &mut Service) -> Result<(), SyntaxError> {
        service.name = self.expect_name("service identifier", service)?;
        let brace = self.expect_punct(Punct::LBrace, "service opening {", service)?;
        self.enter("service", &brace, service)?;
        loop {
            let token = self.next(service)?;
            match token.kind {
                TokenKind::Comment => {
                    attach_comment(service, Comment::new(&token.literal, token.line));
                }
                TokenKind::Punct(Punct::Semicolon) => {
                    self.maybe_scan_inline_comment(service, &token)?;
                }
                TokenKind::Punct(Punct::RBrace) => break,
                TokenKind::Eof => {
                    return Err(self.unexpected(&token, "service closing }", service));
                }
                TokenKind::Keyword(Keyword::Option) => {
                    let mut option = ProtoOption {
                        comment: service.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_option(&mut option, OptionMode::Statement)?;
                    self.add_child(service, option.into());
                }
                TokenKind::Keyword(Keyword::Rpc) => {
                    let mut rpc = Rpc {
                        comment: service.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_rpc(&mut rpc)?;
                    self.add_child(service, rpc.into());
                }
                _ => return Err(self.unexpected(&token, "service option or rpc", service)),
            }
        }
        self.leave();
        Ok(())
    }

    fn parse_rpc(&mut self, rpc: &mut Rpc) -> Result<(), SyntaxError> {
        rpc.name = self.expect_name("rpc method", rpc)?;
        self.expect_punct(Punct::LParen, "rpc type opening (", rpc)?;
        (rpc.streams_request, rpc.request_type) = self.parse_rpc_type(rpc)?;
        self.expect_punct(Punct::RParen, "rpc type closing )", rpc)?;
        self.expect_keyword(Keyword::Returns, "rpc returns", rpc)?;
        self.expect_punct(Punct::LParen, "rpc type opening (", rpc)?;
        (rpc.streams_returns, rpc.returns_type) = self.parse_rpc_type(rpc)?;
        self.expect_punct(Punct::RParen, "rpc type closing )", rpc)?;

        let token = self.next(rpc)?;
        if token.is_punct(Punct::Semicolon) {
            self.unscan();
            return Ok(());
        }
        if !token.is_punct(Punct::LBrace) {
            return Err(self.unexpected(&token, "rpc ; or {", rpc));
        }
        rpc.has_body = true;
        self.enter("rpc", &token, rpc)?;
        self.parse_rpc_body(rpc)?;
        self.leave();
        Ok(())
    }

    /// `[stream] Type`; a message literally named `stream` is not streamed.
    fn parse_rpc_type(&mut self, rpc: &Rpc) -> Result<(bool, String), SyntaxError> {
        let token = self.next(rpc)?;
        if !token.is_name() {
            return Err(self.unexpected(&token, "rpc type", rpc));
        }
        if !token.is_keyword(Keyword::Stream) {
            return Ok((false, token.literal));
        }
        let next = self.next(rpc)?;
        if next.is_name() {
            Ok((true, next.literal))
        } else {
            self.unscan();
            Ok((false, token.literal))
        }
    }

    fn parse_rpc_body(&mut self, rpc: &mut Rpc) -> Result<(), SyntaxError> {
        loop {
            let token = self.next(rpc)?;
            match token.kind {
                TokenKind::Comment => {
                    attach_comment(rpc, Comment::new(&token.literal, token.line));
                }
                TokenKind::Punct(Punct::Semicolon) => {
                    self.maybe_scan_inline_comment(rpc, &token)?;
                }
                TokenKind::Punct(Punct::RBrace) => return Ok(()),
                TokenKind::Eof => return Err(self.unexpected(&token, "rpc closing }", rpc)),
                TokenKind::Keyword(Keyword::Option) => {
                    let mut option = ProtoOption {
                        comment: rpc.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_option(&mut option, OptionMode::Statement)?;
                    self.add_child(rpc, option.into());
                }
                _ => return Err(self.unexpected(&token, "rpc option", rpc)),
            }
        }
    }
}
