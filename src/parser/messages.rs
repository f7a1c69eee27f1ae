//! Message body parsing implementation
//!
//! This module handles `message` and `extend` blocks and everything that can
//! appear inside them:
//!
//! - Normal fields: `[label] type name = N [options];`
//! - Map fields: `map<key, type> name = N [options];`
//! - Oneofs and their member fields
//! - Groups: `[label] group Name = N { ... }`
//! - Reserved ranges and names, extension ranges
//!
//! # Grammar
//!
//! ```text
//! message   ::= ( "message" | "extend" ) name "{" body "}"
//! body      ::= { comment | option | message | extend | enum | oneof | map_field
//!             | reserved | extensions | group | field | ";" }
//! field     ::= [ label ] type name "=" integer [ embedded ] ";"
//! map_field ::= "map" "<" type "," type ">" name "=" integer [ embedded ] ";"
//! oneof     ::= "oneof" name "{" { comment | option | group | oneof_field | ";" } "}"
//! group     ::= [ label ] "group" name "=" integer "{" body "}"
//! reserved  ::= "reserved" ( ranges | string { "," string } ) ";"
//! extensions ::= "extensions" ranges ";"
//! ranges    ::= range { "," range }
//! range     ::= integer [ "to" ( integer | "max" ) ]
//! ```
//!
//! Field numbers and ranges are taken as written and not validated.

use crate::parser::ast::*;
use crate::parser::comments::attach_comment;
use crate::parser::declarations::OptionMode;
use crate::parser::lexer::{Keyword, Punct, TokenKind};
use crate::parser::parse::{Body, Parser, SyntaxError, UnderConstruction};

fn label_of(keyword: Keyword) -> Option<FieldLabel> {
    match keyword {
        Keyword::Optional => Some(FieldLabel::Optional),
        Keyword::Repeated => Some(FieldLabel::Repeated),
        Keyword::Required => Some(FieldLabel::Required),
        _ => None,
    }
}

impl Parser<'_> {
    /// Parse a message or extend block; the keyword has been consumed.
    pub(crate) fn parse_message(&mut self, message: &mut Message) -> Result<(), SyntaxError> {
        let what = if message.is_extend { "extend" } else { "message" };
        message.name = self.expect_name(&format!("{what} identifier"), message)?;
        let brace = self.expect_punct(Punct::LBrace, &format!("{what} opening {{"), message)?;
        self.enter(what, &brace, message)?;
        self.parse_message_body(message, what)?;
        self.leave();
        Ok(())
    }

    /// Body shared by messages, extends and groups, up to and including `}`.
    pub(crate) fn parse_message_body<C: Body>(
        &mut self,
        container: &mut C,
        what: &str,
    ) -> Result<(), SyntaxError> {
        loop {
            let token = self.next(&*container)?;
            match token.kind {
                TokenKind::Comment => {
                    attach_comment(container, Comment::new(&token.literal, token.line));
                }
                TokenKind::Punct(Punct::Semicolon) => {
                    self.maybe_scan_inline_comment(container, &token)?;
                }
                TokenKind::Punct(Punct::RBrace) => return Ok(()),
                TokenKind::Eof => {
                    return Err(self.unexpected(&token, &format!("{what} closing }}"), &*container));
                }
                TokenKind::Keyword(Keyword::Option) => {
                    let mut option = ProtoOption {
                        comment: container.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_option(&mut option, OptionMode::Statement)?;
                    self.add_child(container, option.into());
                }
                TokenKind::Keyword(Keyword::Message | Keyword::Extend) => {
                    let mut message = Message {
                        is_extend: token.is_keyword(Keyword::Extend),
                        comment: container.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_message(&mut message)?;
                    self.add_child(container, message.into());
                }
                TokenKind::Keyword(Keyword::Enum) => {
                    let mut e = Enum {
                        comment: container.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_enum(&mut e)?;
                    self.add_child(container, e.into());
                }
                TokenKind::Keyword(Keyword::Oneof) => {
                    let mut oneof = Oneof {
                        comment: container.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_oneof(&mut oneof)?;
                    self.add_child(container, oneof.into());
                }
                TokenKind::Keyword(Keyword::Map) => {
                    let mut field = MapField::default();
                    field.field.comment = container.take_last_comment();
                    self.parse_map_field(&mut field)?;
                    self.add_child(container, field.into());
                }
                TokenKind::Keyword(Keyword::Reserved) => {
                    let mut reserved = Reserved {
                        comment: container.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_reserved(&mut reserved)?;
                    self.add_child(container, reserved.into());
                }
                TokenKind::Keyword(Keyword::Extensions) => {
                    let mut extensions = Extensions {
                        comment: container.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_extensions(&mut extensions)?;
                    self.add_child(container, extensions.into());
                }
                TokenKind::Keyword(Keyword::Group) => {
                    let element = self.parse_labelled_group(container, None)?;
                    self.add_child(container, element);
                }
                TokenKind::Keyword(keyword) if label_of(keyword).is_some() => {
                    let label = label_of(keyword);
                    let next = self.next(&*container)?;
                    if next.is_keyword(Keyword::Group) {
                        let element = self.parse_labelled_group(container, label)?;
                        self.add_child(container, element);
                    } else {
                        self.unscan();
                        let mut field = NormalField {
                            label,
                            ..Default::default()
                        };
                        field.field.comment = container.take_last_comment();
                        self.parse_normal_field(&mut field)?;
                        self.add_child(container, field.into());
                    }
                }
                _ => {
                    self.unscan();
                    let mut field = NormalField::default();
                    field.field.comment = container.take_last_comment();
                    self.parse_normal_field(&mut field)?;
                    self.add_child(container, field.into());
                }
            }
        }
    }

    fn parse_labelled_group<C: Body>(
        &mut self,
        container: &mut C,
        label: Option<FieldLabel>,
    ) -> Result<Element, SyntaxError> {
        let mut group = Group {
            label,
            comment: container.take_last_comment(),
            ..Default::default()
        };
        self.parse_group(&mut group)?;
        Ok(group.into())
    }

    fn parse_normal_field(&mut self, field: &mut NormalField) -> Result<(), SyntaxError> {
        field.field.type_name = self.expect_name("field type", field)?;
        field.field.name = self.expect_name("field identifier", field)?;
        let (sequence, options) = self.parse_field_number(field)?;
        field.field.sequence = sequence;
        field.field.options = options;
        self.expect_statement_end("field ;", field)
    }

    fn parse_map_field(&mut self, field: &mut MapField) -> Result<(), SyntaxError> {
        self.expect_punct(Punct::Lt, "map keys type <", field)?;
        field.key_type = self.expect_name("map key type", field)?;
        self.expect_punct(Punct::Comma, "map type separator ,", field)?;
        field.field.type_name = self.expect_name("map value type", field)?;
        self.expect_punct(Punct::Gt, "map valueType >", field)?;
        field.field.name = self.expect_name("map field identifier", field)?;
        let (sequence, options) = self.parse_field_number(field)?;
        field.field.sequence = sequence;
        field.field.options = options;
        self.expect_statement_end("map field ;", field)
    }

    fn parse_oneof_field(&mut self, field: &mut OneOfField) -> Result<(), SyntaxError> {
        field.field.type_name = self.expect_name("oneof field type", field)?;
        field.field.name = self.expect_name("oneof field identifier", field)?;
        let (sequence, options) = self.parse_field_number(field)?;
        field.field.sequence = sequence;
        field.field.options = options;
        self.expect_statement_end("oneof field ;", field)
    }

    /// `= N` followed by optional `[options]`.
    fn parse_field_number(
        &mut self,
        node: &dyn UnderConstruction,
    ) -> Result<(i64, Vec<ProtoOption>), SyntaxError> {
        self.expect_punct(Punct::Equals, "field =", node)?;
        let sequence = self.scan_integer("field sequence", node)?;
        let token = self.next(node)?;
        if token.is_punct(Punct::LBracket) {
            let options = self.parse_embedded_options(node)?;
            Ok((sequence, options))
        } else {
            self.unscan();
            Ok((sequence, Vec::new()))
        }
    }

    fn parse_oneof(&mut self, oneof: &mut Oneof) -> Result<(), SyntaxError> {
        oneof.name = self.expect_name("oneof identifier", oneof)?;
        let brace = self.expect_punct(Punct::LBrace, "oneof opening {", oneof)?;
        self.enter("oneof", &brace, oneof)?;
        loop {
            let token = self.next(oneof)?;
            match token.kind {
                TokenKind::Comment => {
                    attach_comment(oneof, Comment::new(&token.literal, token.line));
                }
                TokenKind::Punct(Punct::Semicolon) => {
                    self.maybe_scan_inline_comment(oneof, &token)?;
                }
                TokenKind::Punct(Punct::RBrace) => break,
                TokenKind::Eof => return Err(self.unexpected(&token, "oneof closing }", oneof)),
                TokenKind::Keyword(Keyword::Option) => {
                    let mut option = ProtoOption {
                        comment: oneof.take_last_comment(),
                        ..Default::default()
                    };
                    self.parse_option(&mut option, OptionMode::Statement)?;
                    self.add_child(oneof, option.into());
                }
                TokenKind::Keyword(Keyword::Group) => {
                    let element = self.parse_labelled_group(oneof, None)?;
                    self.add_child(oneof, element);
                }
                _ => {
                    self.unscan();
                    let mut field = OneOfField::default();
                    field.field.comment = oneof.take_last_comment();
                    self.parse_oneof_field(&mut field)?;
                    self.add_child(oneof, field.into());
                }
            }
        }
        self.leave();
        Ok(())
    }

    fn parse_group(&mut self, group: &mut Group) -> Result<(), SyntaxError> {
        group.name = self.expect_name("group name", group)?;
        self.expect_punct(Punct::Equals, "group =", group)?;
        group.sequence = self.scan_integer("group sequence", group)?;
        let brace = self.expect_punct(Punct::LBrace, "group opening {", group)?;
        self.enter("group", &brace, group)?;
        self.parse_message_body(group, "group")?;
        self.leave();
        Ok(())
    }

    pub(crate) fn parse_reserved(&mut self, reserved: &mut Reserved) -> Result<(), SyntaxError> {
        let token = self.next(reserved)?;
        if token.kind == TokenKind::Str {
            self.unscan();
            loop {
                let (name, quote) = self.expect_string("reserved field name", reserved)?;
                if reserved.field_names.is_empty() {
                    reserved.quote = quote;
                }
                reserved.field_names.push(name);
                let token = self.next(reserved)?;
                if !token.is_punct(Punct::Comma) {
                    self.unscan();
                    break;
                }
            }
        } else {
            self.unscan();
            reserved.ranges = self.parse_ranges("reserved", reserved)?;
        }
        self.expect_statement_end("reserved ;", reserved)
    }

    fn parse_extensions(&mut self, extensions: &mut Extensions) -> Result<(), SyntaxError> {
        extensions.ranges = self.parse_ranges("extensions", extensions)?;
        self.expect_statement_end("extensions ;", extensions)
    }

    fn parse_ranges(
        &mut self,
        what: &str,
        node: &dyn UnderConstruction,
    ) -> Result<Vec<Range>, SyntaxError> {
        let expected = format!("{what} range");
        let mut ranges = Vec::new();
        loop {
            let from = self.scan_integer(&expected, node)?;
            let token = self.next(node)?;
            let to = if token.is_keyword(Keyword::To) {
                let end = self.next(node)?;
                if end.is_keyword(Keyword::Max) {
                    RangeEnd::Max
                } else {
                    self.unscan();
                    RangeEnd::Number(self.scan_integer(&expected, node)?)
                }
            } else {
                self.unscan();
                RangeEnd::Single
            };
            ranges.push(Range { from, to });

            let token = self.next(node)?;
            if !token.is_punct(Punct::Comma) {
                self.unscan();
                return Ok(ranges);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::parse;

    fn message(source: &str) -> Message {
        let proto = parse(source).unwrap();
        match proto.elements.into_iter().next() {
            Some(Element::Message(m)) => m,
            other => panic!("Expected message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_normal_fields() {
        let m = message(
            "message M { string name = 1; repeated .pkg.Item items = 2 [packed = true, deprecated = false]; optional int64 id = 0x10; }",
        );
        assert_eq!(m.name, "M");
        assert_eq!(m.elements.len(), 3);
        let Element::NormalField(items) = &m.elements[1] else {
            panic!("Expected normal field");
        };
        assert_eq!(items.label, Some(FieldLabel::Repeated));
        assert_eq!(items.field.type_name, ".pkg.Item");
        assert_eq!(items.field.sequence, 2);
        assert_eq!(items.field.options.len(), 2);
        assert_eq!(items.field.options[1].name, "deprecated");
        let Element::NormalField(id) = &m.elements[2] else {
            panic!("Expected normal field");
        };
        assert_eq!(id.field.sequence, 16);
    }

    #[test]
    fn test_keywords_as_field_names() {
        let m = message("message M { string package = 1; message message {} }");
        let names: Vec<_> = m.elements.iter().filter_map(Element::name).collect();
        assert_eq!(names, vec!["package", "message"]);
        assert!(matches!(&m.elements[1], Element::Message(_)));
    }

    #[test]
    fn test_parse_map_field() {
        let m = message("message M { map<string, Project> projects = 3; }");
        let Element::MapField(map) = &m.elements[0] else {
            panic!("Expected map field");
        };
        assert_eq!(map.key_type, "string");
        assert_eq!(map.field.type_name, "Project");
        assert_eq!(map.field.name, "projects");
        assert_eq!(map.field.sequence, 3);
    }

    #[test]
    fn test_parse_oneof() {
        let m = message(
            "message M { oneof test { option (o) = 1; string name = 4; SubMessage sub = 9 [lazy = true]; } }",
        );
        let Element::Oneof(oneof) = &m.elements[0] else {
            panic!("Expected oneof");
        };
        assert_eq!(oneof.name, "test");
        let kinds: Vec<_> = oneof.elements.iter().map(Element::kind_name).collect();
        assert_eq!(kinds, vec!["Option", "OneOfField", "OneOfField"]);
    }

    #[test]
    fn test_parse_groups() {
        let m = message(
            "message M { repeated group Result = 1 { required string url = 2; } group Plain = 3 {} }",
        );
        let Element::Group(result) = &m.elements[0] else {
            panic!("Expected group");
        };
        assert_eq!(result.label, Some(FieldLabel::Repeated));
        assert_eq!(result.name, "Result");
        assert_eq!(result.sequence, 1);
        assert_eq!(result.elements.len(), 1);
        let Element::Group(plain) = &m.elements[1] else {
            panic!("Expected group");
        };
        assert_eq!(plain.label, None);
    }

    #[test]
    fn test_parse_reserved_and_extensions() {
        let m = message(
            r#"message M { reserved 2, 15, 9 to 11, 40 to max; reserved "foo", 'bar'; extensions 100 to 199; }"#,
        );
        let Element::Reserved(ranges) = &m.elements[0] else {
            panic!("Expected reserved");
        };
        assert_eq!(
            ranges.ranges,
            vec![
                Range { from: 2, to: RangeEnd::Single },
                Range { from: 15, to: RangeEnd::Single },
                Range { from: 9, to: RangeEnd::Number(11) },
                Range { from: 40, to: RangeEnd::Max },
            ]
        );
        let Element::Reserved(names) = &m.elements[1] else {
            panic!("Expected reserved");
        };
        assert_eq!(names.field_names, vec!["foo".to_string(), "bar".to_string()]);
        let Element::Extensions(ext) = &m.elements[2] else {
            panic!("Expected extensions");
        };
        assert_eq!(ext.ranges, vec![Range { from: 100, to: RangeEnd::Number(199) }]);
    }

    #[test]
    fn test_parse_extend() {
        let proto = parse("extend google.protobuf.FieldOptions { optional string my_opt = 51234; }")
            .unwrap();
        let Element::Message(extend) = &proto.elements[0] else {
            panic!("Expected extend");
        };
        assert!(extend.is_extend);
        assert_eq!(extend.name, "google.protobuf.FieldOptions");
        assert_eq!(extend.elements.len(), 1);
    }

    #[test]
    fn test_unterminated_message() {
        let err = parse("message M { string a = 1;").unwrap_err();
        assert_eq!(err.expected, "message closing }");
        assert_eq!(err.found, "end of file");
    }

    #[test]
    fn test_missing_field_semicolon() {
        let err = parse("message M { string a = 1 }").unwrap_err();
        assert_eq!(err.expected, "field ;");
        assert_eq!(err.node_kind(), Some("NormalField"));
    }
}
