//! Comment attachment
//!
//! Comments are tokens like any other, and every body loop routes them through
//! here. Three rules decide where a comment ends up:
//!
//! - **merge**: a `//` comment on the line right after a standalone `//`
//!   comment extends it, so a doc block becomes a single [`Comment`]
//! - **inline**: a comment starting on the same line as a statement's `;` is
//!   attached to that statement, if the statement accepts inline comments
//! - **take-back**: a standalone comment left as the last child when the next
//!   construct starts becomes that construct's doc comment (done by the body
//!   loops via [`ElementContainer::take_last_comment`])

use crate::parser::ast::{Comment, ElementContainer};
use crate::parser::lexer::{Token, TokenKind};
use crate::parser::parse::{Body, Parser, SyntaxError};

/// Whether `next` continues the comment block ending with `last`.
pub(crate) fn can_merge(last: &Comment, next: &Comment) -> bool {
    !last.c_style && !next.c_style && last.end_line() + 1 == next.line
}

/// Append a standalone comment to `container`, merging it into a directly
/// preceding line comment when possible.
pub(crate) fn attach_comment(container: &mut dyn ElementContainer, comment: Comment) {
    match container.take_last_comment() {
        Some(mut last) if can_merge(&last, &comment) => {
            last.merge(comment);
            container.add_element(last.into());
        }
        Some(last) => {
            container.add_element(last.into());
            container.add_element(comment.into());
        }
        None => container.add_element(comment.into()),
    }
}

impl Parser<'_> {
    /// Called by a body loop right after reading a `;`.
    ///
    /// Looks at the following token: a comment starting on the semicolon's line
    /// becomes the inline comment of the container's last child. Anything else,
    /// or a last child that cannot hold an inline comment, is pushed back.
    pub(crate) fn maybe_scan_inline_comment<C: Body>(
        &mut self,
        container: &mut C,
        semicolon: &Token,
    ) -> Result<(), SyntaxError> {
        let token = self.next(&*container)?;
        if token.kind != TokenKind::Comment || token.line != semicolon.line {
            self.unscan();
            return Ok(());
        }
        if container
            .inline_last(Comment::new(&token.literal, token.line))
            .is_err()
        {
            self.unscan();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::{Element, Message};

    #[test]
    fn test_adjacent_line_comments_merge() {
        let mut message = Message::default();
        attach_comment(&mut message, Comment::new("// one", 1));
        attach_comment(&mut message, Comment::new("// two", 2));
        assert_eq!(message.elements.len(), 1);
        let merged = message.elements[0].as_comment().unwrap();
        assert_eq!(merged.lines, vec![" one".to_string(), " two".to_string()]);
    }

    #[test]
    fn test_gap_prevents_merge() {
        let mut message = Message::default();
        attach_comment(&mut message, Comment::new("// one", 1));
        attach_comment(&mut message, Comment::new("// two", 3));
        assert_eq!(message.elements.len(), 2);
    }

    #[test]
    fn test_block_comments_never_merge() {
        let mut message = Message::default();
        attach_comment(&mut message, Comment::new("/* one */", 1));
        attach_comment(&mut message, Comment::new("// two", 2));
        attach_comment(&mut message, Comment::new("/* three */", 3));
        assert_eq!(message.elements.len(), 3);
    }

    #[test]
    fn test_comment_after_statement_is_not_merged() {
        let mut message = Message::default();
        message.add_element(Element::NormalField(Default::default()));
        attach_comment(&mut message, Comment::new("// c", 2));
        assert_eq!(message.elements.len(), 2);
    }

    #[test]
    fn test_merge_follows_end_line_of_multi_line_block() {
        let last = Comment {
            line: 4,
            lines: vec!["a".into(), "b".into()],
            ..Default::default()
        };
        assert!(can_merge(&last, &Comment::new("// c", 6)));
        assert!(!can_merge(&last, &Comment::new("// c", 5)));
    }
}
