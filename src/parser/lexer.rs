//! Lexer (tokenizer) for `.proto` source text
//!
//! Converts raw source text into classified [`Token`]s, pulled one at a time by
//! the parser. Whitespace and newlines never surface as tokens; they only move
//! the line counter that stamps every token, which is what later lets the parser
//! decide whether a comment sits on the same line as the statement before it.
//!
//! The lexer keeps exactly one token of look-back so that [`Lexer::unscan`] can
//! push the most recent token back. There is no deeper backtracking.

use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;

/// Contextual keywords of the IDL.
///
/// Keywords are only meaningful in the position where a construct may start;
/// everywhere else the parser accepts them as plain names (`string package = 1;`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Syntax,
    Package,
    Import,
    Weak,
    Public,
    Option,
    Message,
    Enum,
    Service,
    Rpc,
    Returns,
    Stream,
    Oneof,
    Map,
    Reserved,
    To,
    Max,
    Extensions,
    Extend,
    Group,
    Repeated,
    Optional,
    Required,
}

impl Keyword {
    const ALL: [Keyword; 23] = [
        Keyword::Syntax,
        Keyword::Package,
        Keyword::Import,
        Keyword::Weak,
        Keyword::Public,
        Keyword::Option,
        Keyword::Message,
        Keyword::Enum,
        Keyword::Service,
        Keyword::Rpc,
        Keyword::Returns,
        Keyword::Stream,
        Keyword::Oneof,
        Keyword::Map,
        Keyword::Reserved,
        Keyword::To,
        Keyword::Max,
        Keyword::Extensions,
        Keyword::Extend,
        Keyword::Group,
        Keyword::Repeated,
        Keyword::Optional,
        Keyword::Required,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Syntax => "syntax",
            Keyword::Package => "package",
            Keyword::Import => "import",
            Keyword::Weak => "weak",
            Keyword::Public => "public",
            Keyword::Option => "option",
            Keyword::Message => "message",
            Keyword::Enum => "enum",
            Keyword::Service => "service",
            Keyword::Rpc => "rpc",
            Keyword::Returns => "returns",
            Keyword::Stream => "stream",
            Keyword::Oneof => "oneof",
            Keyword::Map => "map",
            Keyword::Reserved => "reserved",
            Keyword::To => "to",
            Keyword::Max => "max",
            Keyword::Extensions => "extensions",
            Keyword::Extend => "extend",
            Keyword::Group => "group",
            Keyword::Repeated => "repeated",
            Keyword::Optional => "optional",
            Keyword::Required => "required",
        }
    }

    /// Look up the keyword spelled by `word`, if any.
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS.get(word).copied()
    }
}

static KEYWORDS: LazyLock<FxHashMap<&'static str, Keyword>> =
    LazyLock::new(|| Keyword::ALL.iter().map(|k| (k.as_str(), *k)).collect());

/// Single-character punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Semicolon, // ;
    Colon,     // :
    Equals,    // =
    Comma,     // ,
    Dot,       // .
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Lt,        // <
    Gt,        // >
    Minus,     // -
    Plus,      // +
    Slash,     // /
}

impl Punct {
    fn from_char(ch: char) -> Option<Punct> {
        let punct = match ch {
            ';' => Punct::Semicolon,
            ':' => Punct::Colon,
            '=' => Punct::Equals,
            ',' => Punct::Comma,
            '.' => Punct::Dot,
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            '<' => Punct::Lt,
            '>' => Punct::Gt,
            '-' => Punct::Minus,
            '+' => Punct::Plus,
            '/' => Punct::Slash,
            _ => return None,
        };
        Some(punct)
    }
}

/// Classification of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain or dotted identifier (`foo`, `foo.Bar`, `.pkg.Type`)
    Ident,
    Keyword(Keyword),
    Punct(Punct),
    /// Quoted string; the literal keeps its quotes and escapes
    Str,
    /// Integer or float literal
    Number,
    /// `// ...` or `/* ... */`; the literal keeps its delimiters
    Comment,
    Eof,
}

/// A classified piece of source text, stamped with the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, literal: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            literal: literal.into(),
            line,
        }
    }

    pub fn is_punct(&self, punct: Punct) -> bool {
        self.kind == TokenKind::Punct(punct)
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    /// Identifiers and keywords both qualify as names.
    pub fn is_name(&self) -> bool {
        matches!(self.kind, TokenKind::Ident | TokenKind::Keyword(_))
    }

    /// Line on which the token ends (differs from `line` for block comments).
    pub fn end_line(&self) -> usize {
        self.line + self.literal.matches('\n').count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident => write!(f, "identifier '{}'", self.literal),
            TokenKind::Keyword(k) => write!(f, "'{}'", k.as_str()),
            TokenKind::Punct(_) => write!(f, "'{}'", self.literal),
            TokenKind::Str => write!(f, "string literal {}", self.literal),
            TokenKind::Number => write!(f, "number {}", self.literal),
            TokenKind::Comment => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// Lexical failure: the offending text and what was expected instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: found {literal:?} but expected [{message}]")]
pub struct LexError {
    pub literal: String,
    pub message: String,
    pub line: usize,
}

impl LexError {
    fn new(literal: impl Into<String>, message: impl Into<String>, line: usize) -> Self {
        LexError {
            literal: literal.into(),
            message: message.into(),
            line,
        }
    }
}

/// Parse an optionally signed integer literal: decimal, `0x` hex or leading-zero octal.
pub fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = u64::from_str_radix(body, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude)
    } else {
        i64::try_from(magnitude).ok()
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Tokenizer over a borrowed source string.
pub struct Lexer<'a> {
    source: &'a str,
    position: usize,
    line: usize,
    last: Option<Token>,
    pushed_back: Option<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            position: 0,
            line: 1,
            last: None,
            pushed_back: None,
        }
    }

    /// Current line counter (1-based).
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the next token, or the pushed-back one if [`unscan`](Self::unscan)
    /// was called. At end of input this keeps returning [`TokenKind::Eof`].
    pub fn next(&mut self) -> Result<Token, LexError> {
        let token = match self.pushed_back.take() {
            Some(token) => token,
            None => self.scan()?,
        };
        self.last = Some(token.clone());
        Ok(token)
    }

    /// Push the most recently returned token back.
    ///
    /// # Panics
    ///
    /// Panics when called twice without an intervening [`next`](Self::next), or
    /// before any token has been returned.
    pub fn unscan(&mut self) {
        assert!(
            self.pushed_back.is_none(),
            "unscan called twice without an intervening next"
        );
        self.pushed_back = self.last.take();
        assert!(
            self.pushed_back.is_some(),
            "unscan called with no token to push back"
        );
    }

    /// Return the next token only if it is a comment; anything else is left
    /// unread.
    pub fn next_comment(&mut self) -> Result<Option<Token>, LexError> {
        if let Some(token) = &self.pushed_back {
            if token.kind != TokenKind::Comment {
                return Ok(None);
            }
            return self.next().map(Some);
        }
        self.skip_whitespace();
        if self.peek() != Some('/') || !matches!(self.peek_ahead(1), Some('/' | '*')) {
            return Ok(None);
        }
        self.next().map(Some)
    }

    /// Read an optionally signed integer straight from the source.
    ///
    /// Used right after an `=` where only an integer may follow, so the value
    /// never travels through the generic token path.
    pub fn scan_integer(&mut self) -> Result<i64, LexError> {
        if let Some(token) = self.pushed_back.take() {
            self.last = None;
            return parse_integer(&token.literal)
                .ok_or_else(|| LexError::new(token.literal, "integer literal", token.line));
        }
        self.last = None;
        self.skip_whitespace();
        let line = self.line;
        let start = self.position;
        if matches!(self.peek(), Some('-' | '+')) {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
            self.advance();
        }
        if self.position == start {
            // report the character that is in the way
            self.advance();
        }
        let text = &self.source[start..self.position];
        parse_integer(text).ok_or_else(|| LexError::new(text, "integer literal", line))
    }

    fn scan(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let line = self.line;
        let start = self.position;
        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, "", line));
        };

        match ch {
            '/' if self.peek() == Some('/') => Ok(self.line_comment(start, line)),
            '/' if self.peek() == Some('*') => self.block_comment(start, line),
            '"' | '\'' => self.string_literal(ch, start, line),
            '0'..='9' => Ok(self.number_literal(start, line)),
            '.' if matches!(self.peek(), Some(c) if c.is_ascii_digit()) => {
                Ok(self.number_literal(start, line))
            }
            '.' if matches!(self.peek(), Some(c) if is_ident_start(c)) => {
                Ok(self.identifier_or_keyword(start, line))
            }
            c if is_ident_start(c) => Ok(self.identifier_or_keyword(start, line)),
            c => match Punct::from_char(c) {
                Some(punct) => Ok(Token::new(TokenKind::Punct(punct), c.to_string(), line)),
                None => Err(LexError::new(c.to_string(), "valid token", line)),
            },
        }
    }

    /// `// ...` up to, not including, the newline
    fn line_comment(&mut self, start: usize, line: usize) -> Token {
        while matches!(self.peek(), Some(c) if c != '\n') {
            self.advance();
        }
        Token::new(TokenKind::Comment, &self.source[start..self.position], line)
    }

    fn block_comment(&mut self, start: usize, line: usize) -> Result<Token, LexError> {
        self.advance(); // skip '*'
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(Token::new(
                    TokenKind::Comment,
                    &self.source[start..self.position],
                    line,
                ));
            }
            self.advance();
        }
        Err(LexError::new(
            &self.source[start..self.position],
            "comment closing */",
            line,
        ))
    }

    fn string_literal(&mut self, quote: char, start: usize, line: usize) -> Result<Token, LexError> {
        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some('\\') => {
                    self.advance();
                }
                Some('\n') | None => {
                    return Err(LexError::new(
                        self.source[start..self.position].trim_end(),
                        format!("string closing {quote}"),
                        line,
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(Token::new(TokenKind::Str, &self.source[start..self.position], line))
    }

    /// Digits, hex letters, fraction and exponent (`1e-5`) in one run.
    fn number_literal(&mut self, start: usize, line: usize) -> Token {
        let mut prev = self.source[start..].chars().next();
        let hex = self.source[start..].starts_with("0x") || self.source[start..].starts_with("0X");
        while let Some(c) = self.peek() {
            let exponent_sign =
                matches!(c, '+' | '-') && !hex && matches!(prev, Some('e' | 'E'));
            if is_ident_continue(c) || c == '.' || exponent_sign {
                self.advance();
                prev = Some(c);
            } else {
                break;
            }
        }
        Token::new(TokenKind::Number, &self.source[start..self.position], line)
    }

    /// Identifier segments joined by dots; dotted names are never keywords.
    fn identifier_or_keyword(&mut self, start: usize, line: usize) -> Token {
        loop {
            while matches!(self.peek(), Some(c) if is_ident_continue(c)) {
                self.advance();
            }
            if self.peek() == Some('.') && matches!(self.peek_ahead(1), Some(c) if is_ident_start(c))
            {
                self.advance();
                continue;
            }
            break;
        }
        let text = &self.source[start..self.position];
        match Keyword::lookup(text) {
            Some(keyword) => Token::new(TokenKind::Keyword(keyword), text, line),
            None => Token::new(TokenKind::Ident, text, line),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.source[self.position..].chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next().unwrap();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokenize("message Foo { string name = 1; }");

        assert!(tokens[0].is_keyword(Keyword::Message));
        assert_eq!(tokens[1].kind, TokenKind::Ident);
        assert_eq!(tokens[1].literal, "Foo");
        assert!(tokens[2].is_punct(Punct::LBrace));
        assert_eq!(tokens[3].literal, "string");
        assert!(tokens[4].is_name());
        assert!(tokens[5].is_punct(Punct::Equals));
        assert_eq!(tokens[6].kind, TokenKind::Number);
        assert!(tokens[7].is_punct(Punct::Semicolon));
        assert!(tokens[8].is_punct(Punct::RBrace));
        assert_eq!(tokens[9].kind, TokenKind::Eof);
    }

    #[test]
    fn test_dotted_identifiers_are_not_keywords() {
        let tokens = tokenize("message.Foo .pkg.Type (opt).field");

        assert_eq!(tokens[0].kind, TokenKind::Ident);
        assert_eq!(tokens[0].literal, "message.Foo");
        assert_eq!(tokens[1].literal, ".pkg.Type");
        assert!(tokens[2].is_punct(Punct::LParen));
        assert_eq!(tokens[3].literal, "opt");
        assert!(tokens[4].is_punct(Punct::RParen));
        assert_eq!(tokens[5].literal, ".field");
    }

    #[test]
    fn test_comments_keep_delimiters_and_lines() {
        let tokens = tokenize("// one\n/* two\nthree */ x");

        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].literal, "// one");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].literal, "/* two\nthree */");
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].end_line(), 3);
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("42 0x1F 1.5e-3 .25");
        let literals: Vec<_> = tokens.iter().map(|t| t.literal.as_str()).collect();

        assert_eq!(literals, ["42", "0x1F", "1.5e-3", ".25", ""]);
        assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn test_string_literal() {
        let tokens = tokenize(r#""hello \"world\"" 'single'"#);

        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].literal, r#""hello \"world\"""#);
        assert_eq!(tokens[1].literal, "'single'");
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc\nfoo");
        let err = lexer.next().unwrap_err();

        assert_eq!(err.literal, "\"abc");
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_unterminated_block_comment() {
        let mut lexer = Lexer::new("/* never closed");
        let err = lexer.next().unwrap_err();

        assert_eq!(err.message, "comment closing */");
    }

    #[test]
    fn test_unscan_returns_same_token() {
        let mut lexer = Lexer::new("enum E");
        let first = lexer.next().unwrap();
        lexer.unscan();
        let again = lexer.next().unwrap();

        assert_eq!(first, again);
        assert_eq!(lexer.next().unwrap().literal, "E");
    }

    #[test]
    #[should_panic(expected = "unscan called twice")]
    fn test_double_unscan_panics() {
        let mut lexer = Lexer::new("enum E");
        lexer.next().unwrap();
        lexer.unscan();
        lexer.unscan();
    }

    #[test]
    fn test_scan_integer() {
        let mut lexer = Lexer::new("= -12 ; = 0x10 ; = ;");
        lexer.next().unwrap();
        assert_eq!(lexer.scan_integer().unwrap(), -12);
        lexer.next().unwrap();
        lexer.next().unwrap();
        assert_eq!(lexer.scan_integer().unwrap(), 16);
        lexer.next().unwrap();
        lexer.next().unwrap();
        let err = lexer.scan_integer().unwrap_err();
        assert_eq!(err.literal, ";");
        assert_eq!(err.message, "integer literal");
    }

    #[test]
    fn test_line_counter() {
        let mut lexer = Lexer::new("a\n\nb");
        assert_eq!(lexer.next().unwrap().line, 1);
        assert_eq!(lexer.next().unwrap().line, 3);
        assert_eq!(lexer.line(), 3);
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("10"), Some(10));
        assert_eq!(parse_integer("-0x1f"), Some(-31));
        assert_eq!(parse_integer("017"), Some(15));
        assert_eq!(parse_integer("1.5"), None);
        assert_eq!(parse_integer("0x-5"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn test_parse_integer_bounds() {
        assert_eq!(parse_integer("-9223372036854775808"), Some(i64::MIN));
        assert_eq!(parse_integer("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_integer("9223372036854775808"), None);
        assert_eq!(parse_integer("-9223372036854775809"), None);
        assert_eq!(parse_integer("-0x8000000000000000"), Some(i64::MIN));
    }

    #[test]
    fn test_next_comment_leaves_other_tokens() {
        let mut lexer = Lexer::new("= /* a */ // b\n -1;");
        lexer.next().unwrap();
        let block = lexer.next_comment().unwrap().unwrap();
        assert_eq!(block.literal, "/* a */");
        let line = lexer.next_comment().unwrap().unwrap();
        assert_eq!(line.literal, "// b");
        assert!(lexer.next_comment().unwrap().is_none());
        assert_eq!(lexer.scan_integer().unwrap(), -1);
        assert!(lexer.next().unwrap().is_punct(Punct::Semicolon));
    }
}
