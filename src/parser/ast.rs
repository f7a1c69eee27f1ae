//! AST node definitions for `.proto` sources
//!
//! Every construct of the IDL has its own node struct. [`Element`] is the sum
//! type over all of them and is what container nodes hold as children, in
//! source order. [`Proto`] is the root container returned by the parser.
//!
//! Besides construct-specific fields, nodes carry up to three capabilities,
//! each exposed as a trait:
//!
//! - [`Documented`]: an optional leading (doc) comment
//! - [`CommentInliner`]: an optional trailing comment on the statement's line
//! - [`ElementContainer`]: ordered children (messages, enums, services, ...)
//!
//! The fourth capability, canonical column fragments, lives in
//! [`columns`](super::columns).

use std::fmt;

/// A `//` line comment or a `/* */` block comment.
///
/// Consecutive line comments are merged into one node while parsing, so a
/// multi-line doc block is a single `Comment` with several `lines`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comment {
    /// Line on which the comment starts
    pub line: usize,
    /// Text of each line without the comment delimiters
    pub lines: Vec<String>,
    /// Written as `/* ... */`
    pub c_style: bool,
    /// Written as `/// ...`
    pub extra_slash: bool,
}

impl Comment {
    /// Build a comment from its token literal, delimiters included.
    pub fn new(literal: &str, line: usize) -> Self {
        if let Some(body) = literal.strip_prefix("/*") {
            let body = body.strip_suffix("*/").unwrap_or(body);
            return Comment {
                line,
                lines: body
                    .split('\n')
                    .map(|l| l.trim_end_matches('\r').to_string())
                    .collect(),
                c_style: true,
                extra_slash: false,
            };
        }
        let body = literal.strip_prefix("//").unwrap_or(literal);
        let (body, extra_slash) = match body.strip_prefix('/') {
            Some(rest) => (rest, true),
            None => (body, false),
        };
        Comment {
            line,
            lines: vec![body.trim_end_matches('\r').to_string()],
            c_style: false,
            extra_slash,
        }
    }

    /// First line, trimmed.
    pub fn message(&self) -> &str {
        self.lines.first().map(|l| l.trim()).unwrap_or("")
    }

    /// Line on which the comment ends.
    pub fn end_line(&self) -> usize {
        self.line + self.lines.len().saturating_sub(1)
    }

    /// Append the lines of `other` to this comment.
    pub fn merge(&mut self, other: Comment) {
        self.lines.extend(other.lines);
    }
}

/// `syntax = "proto3";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub value: String,
    /// Quote character used in the source
    pub quote: char,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

impl Default for Syntax {
    fn default() -> Self {
        Syntax {
            value: String::new(),
            quote: '"',
            comment: None,
            inline_comment: None,
        }
    }
}

/// `package foo.bar;`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Package {
    pub name: String,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportKind {
    #[default]
    Default,
    Weak,
    Public,
}

/// `import [weak|public] "other.proto";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub filename: String,
    pub kind: ImportKind,
    pub quote: char,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

impl Default for Import {
    fn default() -> Self {
        Import {
            filename: String::new(),
            kind: ImportKind::Default,
            quote: '"',
            comment: None,
            inline_comment: None,
        }
    }
}

/// Constant value of an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Quoted string, escapes kept as written
    Str { value: String, quote: char },
    /// Number, identifier or boolean, as written (sign included)
    Scalar(String),
    /// `[a, b]` inside an aggregate
    List(Vec<Literal>),
    /// Text-format aggregate `{ name: value ... }`
    Message(Vec<NamedLiteral>),
}

impl Default for Literal {
    fn default() -> Self {
        Literal::Scalar(String::new())
    }
}

impl Literal {
    pub fn is_string(&self) -> bool {
        matches!(self, Literal::Str { .. })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str { value, quote } => write!(f, "{quote}{value}{quote}"),
            Literal::Scalar(source) => f.write_str(source),
            Literal::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Literal::Message(entries) if entries.is_empty() => f.write_str("{}"),
            Literal::Message(entries) => {
                f.write_str("{")?;
                for entry in entries {
                    write!(f, " {entry}")?;
                }
                f.write_str(" }")
            }
        }
    }
}

/// One `name: value` entry of an aggregate constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedLiteral {
    pub name: String,
    pub value: Literal,
    /// Whether the source separated name and value with `:`
    pub print_colon: bool,
}

impl fmt::Display for NamedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.print_colon {
            write!(f, "{}: {}", self.name, self.value)
        } else {
            write!(f, "{} {}", self.name, self.value)
        }
    }
}

/// `option (my.opt).field = constant;` or, embedded, `[deprecated = true]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtoOption {
    pub name: String,
    pub constant: Literal,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
    /// Comments written inside `[ ... ]` around this option, or inside its
    /// aggregate constant, in source order
    pub inner_comments: Vec<Comment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLabel {
    Optional,
    Repeated,
    Required,
}

impl FieldLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldLabel::Optional => "optional",
            FieldLabel::Repeated => "repeated",
            FieldLabel::Required => "required",
        }
    }
}

/// Attributes shared by normal, map and oneof fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub sequence: i64,
    pub options: Vec<ProtoOption>,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// `[label] type name = N [options];`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalField {
    pub field: Field,
    pub label: Option<FieldLabel>,
}

/// `map<key, type> name = N [options];`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapField {
    pub key_type: String,
    pub field: Field,
}

/// `type name = N [options];` inside a oneof
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OneOfField {
    pub field: Field,
}

/// `message Name { ... }`, or `extend Name { ... }` when `is_extend` is set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub name: String,
    pub is_extend: bool,
    pub elements: Vec<Element>,
    pub comment: Option<Comment>,
}

/// `oneof name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Oneof {
    pub name: String,
    pub elements: Vec<Element>,
    pub comment: Option<Comment>,
}

/// `enum Name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enum {
    pub name: String,
    pub elements: Vec<Element>,
    pub comment: Option<Comment>,
}

/// `NAME = integer [options];` inside an enum
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumField {
    pub name: String,
    pub integer: i64,
    pub value_options: Vec<ProtoOption>,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

impl EnumField {
    /// First bracketed option of the value, if any.
    pub fn value_option(&self) -> Option<&ProtoOption> {
        self.value_options.first()
    }
}

/// `service Name { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Service {
    pub name: String,
    pub elements: Vec<Element>,
    pub comment: Option<Comment>,
}

/// `rpc Name ([stream] Req) returns ([stream] Resp);` with an optional option body
///
/// A `{ ... }` body holds options and comments as `elements`, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rpc {
    pub name: String,
    pub request_type: String,
    pub streams_request: bool,
    pub returns_type: String,
    pub streams_returns: bool,
    /// Written with `{ ... }` instead of `;`
    pub has_body: bool,
    pub elements: Vec<Element>,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

impl Rpc {
    /// Options of the body, skipping comments.
    pub fn options(&self) -> impl Iterator<Item = &ProtoOption> {
        self.elements.iter().filter_map(|element| match element {
            Element::Option(option) => Some(option),
            _ => None,
        })
    }
}

/// Upper bound of a [`Range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeEnd {
    /// Single number, no `to`
    #[default]
    Single,
    Number(i64),
    /// `to max`
    Max,
}

/// `from`, `from to N` or `from to max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Range {
    pub from: i64,
    pub to: RangeEnd,
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            RangeEnd::Single => write!(f, "{}", self.from),
            RangeEnd::Number(to) => write!(f, "{} to {}", self.from, to),
            RangeEnd::Max => write!(f, "{} to max", self.from),
        }
    }
}

/// `reserved 2, 9 to 11;` or `reserved "foo", "bar";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reserved {
    pub ranges: Vec<Range>,
    pub field_names: Vec<String>,
    /// Quote character of the first field name; names are identifiers, so
    /// one quote fits them all
    pub quote: char,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

impl Default for Reserved {
    fn default() -> Self {
        Reserved {
            ranges: Vec::new(),
            field_names: Vec::new(),
            quote: '"',
            comment: None,
            inline_comment: None,
        }
    }
}

/// `[label] group Name = N { ... }`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group {
    pub name: String,
    pub label: Option<FieldLabel>,
    pub sequence: i64,
    pub elements: Vec<Element>,
    pub comment: Option<Comment>,
}

/// `extensions 100 to 199;`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extensions {
    pub ranges: Vec<Range>,
    pub comment: Option<Comment>,
    pub inline_comment: Option<Comment>,
}

/// Any node that can appear as a child of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Syntax(Syntax),
    Package(Package),
    Import(Import),
    Option(ProtoOption),
    Message(Message),
    NormalField(NormalField),
    MapField(MapField),
    OneOfField(OneOfField),
    Oneof(Oneof),
    Enum(Enum),
    EnumField(EnumField),
    Service(Service),
    Rpc(Rpc),
    Reserved(Reserved),
    Group(Group),
    Extensions(Extensions),
    Comment(Comment),
}

macro_rules! element_from {
    ($($variant:ident($node:ty)),* $(,)?) => {
        $(
            impl From<$node> for Element {
                fn from(node: $node) -> Self {
                    Element::$variant(node)
                }
            }
        )*
    };
}

element_from!(
    Syntax(Syntax),
    Package(Package),
    Import(Import),
    Option(ProtoOption),
    Message(Message),
    NormalField(NormalField),
    MapField(MapField),
    OneOfField(OneOfField),
    Oneof(Oneof),
    Enum(Enum),
    EnumField(EnumField),
    Service(Service),
    Rpc(Rpc),
    Reserved(Reserved),
    Group(Group),
    Extensions(Extensions),
    Comment(Comment),
);

impl Element {
    /// Stable name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Element::Syntax(_) => "Syntax",
            Element::Package(_) => "Package",
            Element::Import(_) => "Import",
            Element::Option(_) => "Option",
            Element::Message(_) => "Message",
            Element::NormalField(_) => "NormalField",
            Element::MapField(_) => "MapField",
            Element::OneOfField(_) => "OneOfField",
            Element::Oneof(_) => "Oneof",
            Element::Enum(_) => "Enum",
            Element::EnumField(_) => "EnumField",
            Element::Service(_) => "Service",
            Element::Rpc(_) => "Rpc",
            Element::Reserved(_) => "Reserved",
            Element::Group(_) => "Group",
            Element::Extensions(_) => "Extensions",
            Element::Comment(_) => "Comment",
        }
    }

    /// Name of the declared construct, for kinds that have one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Package(p) => Some(&p.name),
            Element::Option(o) => Some(&o.name),
            Element::Message(m) => Some(&m.name),
            Element::NormalField(f) => Some(&f.field.name),
            Element::MapField(f) => Some(&f.field.name),
            Element::OneOfField(f) => Some(&f.field.name),
            Element::Oneof(o) => Some(&o.name),
            Element::Enum(e) => Some(&e.name),
            Element::EnumField(f) => Some(&f.name),
            Element::Service(s) => Some(&s.name),
            Element::Rpc(r) => Some(&r.name),
            Element::Group(g) => Some(&g.name),
            Element::Syntax(_)
            | Element::Import(_)
            | Element::Reserved(_)
            | Element::Extensions(_)
            | Element::Comment(_) => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Element::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&dyn ElementContainer> {
        match self {
            Element::Message(m) => Some(m),
            Element::Oneof(o) => Some(o),
            Element::Enum(e) => Some(e),
            Element::Service(s) => Some(s),
            Element::Rpc(r) => Some(r),
            Element::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_inliner(&self) -> Option<&dyn CommentInliner> {
        match self {
            Element::Syntax(n) => Some(n),
            Element::Package(n) => Some(n),
            Element::Import(n) => Some(n),
            Element::Option(n) => Some(n),
            Element::NormalField(n) => Some(n),
            Element::MapField(n) => Some(n),
            Element::OneOfField(n) => Some(n),
            Element::EnumField(n) => Some(n),
            Element::Rpc(n) => Some(n),
            Element::Reserved(n) => Some(n),
            Element::Extensions(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_inliner_mut(&mut self) -> Option<&mut dyn CommentInliner> {
        match self {
            Element::Syntax(n) => Some(n),
            Element::Package(n) => Some(n),
            Element::Import(n) => Some(n),
            Element::Option(n) => Some(n),
            Element::NormalField(n) => Some(n),
            Element::MapField(n) => Some(n),
            Element::OneOfField(n) => Some(n),
            Element::EnumField(n) => Some(n),
            Element::Rpc(n) => Some(n),
            Element::Reserved(n) => Some(n),
            Element::Extensions(n) => Some(n),
            _ => None,
        }
    }
}

/// Root of a parsed file: top-level declarations in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Proto {
    pub elements: Vec<Element>,
}

/// Nodes that may carry a leading doc comment.
pub trait Documented {
    fn doc(&self) -> Option<&Comment>;
}

/// Statements that may carry a comment after their terminating `;`.
pub trait CommentInliner {
    fn inline_comment(&self) -> Option<&Comment>;

    /// Assigned once by the parser, right after the statement's `;`.
    fn set_inline_comment(&mut self, comment: Comment);
}

/// Nodes with ordered children.
pub trait ElementContainer {
    fn elements(&self) -> &[Element];

    fn add_element(&mut self, element: Element);

    /// Remove and return the last child if it is a standalone comment.
    fn take_last_comment(&mut self) -> Option<Comment>;

    /// Attach `comment` as the inline comment of the last child, or hand it
    /// back when there is no child or the last one cannot hold one.
    fn inline_last(&mut self, comment: Comment) -> Result<(), Comment>;
}

fn take_last_comment(elements: &mut Vec<Element>) -> Option<Comment> {
    if !matches!(elements.last(), Some(Element::Comment(_))) {
        return None;
    }
    match elements.pop() {
        Some(Element::Comment(comment)) => Some(comment),
        _ => None,
    }
}

fn inline_last(elements: &mut [Element], comment: Comment) -> Result<(), Comment> {
    match elements.last_mut().and_then(Element::as_inliner_mut) {
        Some(inliner) => {
            inliner.set_inline_comment(comment);
            Ok(())
        }
        None => Err(comment),
    }
}

macro_rules! container {
    ($($node:ty),*) => {
        $(
            impl ElementContainer for $node {
                fn elements(&self) -> &[Element] {
                    &self.elements
                }

                fn add_element(&mut self, element: Element) {
                    self.elements.push(element);
                }

                fn take_last_comment(&mut self) -> Option<Comment> {
                    take_last_comment(&mut self.elements)
                }

                fn inline_last(&mut self, comment: Comment) -> Result<(), Comment> {
                    inline_last(&mut self.elements, comment)
                }
            }
        )*
    };
}

container!(Proto, Message, Oneof, Enum, Service, Rpc, Group);

macro_rules! documented {
    (field: $($node:ty),*) => {
        $(
            impl Documented for $node {
                fn doc(&self) -> Option<&Comment> {
                    self.field.comment.as_ref()
                }
            }
        )*
    };
    ($($node:ty),*) => {
        $(
            impl Documented for $node {
                fn doc(&self) -> Option<&Comment> {
                    self.comment.as_ref()
                }
            }
        )*
    };
}

documented!(
    Syntax, Package, Import, ProtoOption, Message, Oneof, Enum, EnumField, Service, Rpc,
    Reserved, Group, Extensions
);
documented!(field: NormalField, MapField, OneOfField);

macro_rules! inliner {
    (field: $($node:ty),*) => {
        $(
            impl CommentInliner for $node {
                fn inline_comment(&self) -> Option<&Comment> {
                    self.field.inline_comment.as_ref()
                }

                fn set_inline_comment(&mut self, comment: Comment) {
                    self.field.inline_comment = Some(comment);
                }
            }
        )*
    };
    ($($node:ty),*) => {
        $(
            impl CommentInliner for $node {
                fn inline_comment(&self) -> Option<&Comment> {
                    self.inline_comment.as_ref()
                }

                fn set_inline_comment(&mut self, comment: Comment) {
                    self.inline_comment = Some(comment);
                }
            }
        )*
    };
}

inliner!(Syntax, Package, Import, ProtoOption, EnumField, Rpc, Reserved, Extensions);
inliner!(field: NormalField, MapField, OneOfField);

impl Documented for Element {
    fn doc(&self) -> Option<&Comment> {
        match self {
            Element::Syntax(n) => n.doc(),
            Element::Package(n) => n.doc(),
            Element::Import(n) => n.doc(),
            Element::Option(n) => n.doc(),
            Element::Message(n) => n.doc(),
            Element::NormalField(n) => n.doc(),
            Element::MapField(n) => n.doc(),
            Element::OneOfField(n) => n.doc(),
            Element::Oneof(n) => n.doc(),
            Element::Enum(n) => n.doc(),
            Element::EnumField(n) => n.doc(),
            Element::Service(n) => n.doc(),
            Element::Rpc(n) => n.doc(),
            Element::Reserved(n) => n.doc(),
            Element::Group(n) => n.doc(),
            Element::Extensions(n) => n.doc(),
            Element::Comment(_) => None,
        }
    }
}
