//! Alignment fragments for canonical re-serialization
//!
//! Every node can describe its own tokens (not its children) as a sequence of
//! [`Column`]s. A formatter lines up same-indexed columns across sibling nodes
//! of the same kind, e.g. all the `=` of an enum body. No alignment arithmetic
//! happens here; this module only produces the fragments.

use crate::parser::ast::*;

/// Horizontal alignment requested for a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Pad on the right to the widest fragment in the column
    Left,
    /// Pad on the left to the widest fragment in the column
    Right,
    /// Printed as is and never padded (comment text)
    Unaligned,
    /// Fixed punctuation, identical across siblings
    Fixed,
}

/// A piece of printable text and its alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub text: String,
    pub alignment: Alignment,
}

impl Column {
    pub fn left(text: impl Into<String>) -> Self {
        Column {
            text: text.into(),
            alignment: Alignment::Left,
        }
    }

    pub fn right(text: impl Into<String>) -> Self {
        Column {
            text: text.into(),
            alignment: Alignment::Right,
        }
    }

    pub fn unaligned(text: impl Into<String>) -> Self {
        Column {
            text: text.into(),
            alignment: Alignment::Unaligned,
        }
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        Column {
            text: text.into(),
            alignment: Alignment::Fixed,
        }
    }
}

/// Concatenate fragments without any padding.
pub fn to_source(columns: &[Column]) -> String {
    columns.iter().map(|c| c.text.as_str()).collect()
}

/// Nodes that can describe their own tokens as alignment fragments.
pub trait Columns {
    fn columns(&self) -> Vec<Column>;
}

fn push_inline(columns: &mut Vec<Column>, inline: Option<&Comment>) {
    let Some(comment) = inline else {
        return;
    };
    if comment.c_style {
        columns.push(Column::fixed(" /*"));
        columns.push(Column::unaligned(comment.lines.join("\n")));
        columns.push(Column::fixed("*/"));
    } else {
        columns.push(Column::fixed(" //"));
        let text = comment.lines.first().map(String::as_str).unwrap_or("");
        if comment.extra_slash {
            columns.push(Column::unaligned(format!("/{text}")));
        } else {
            columns.push(Column::unaligned(text));
        }
    }
}

/// ` [a = 1, b = "x"]`, or nothing when there are no options
fn push_embedded_options(columns: &mut Vec<Column>, options: &[ProtoOption]) {
    if options.is_empty() {
        return;
    }
    columns.push(Column::fixed(" ["));
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            columns.push(Column::fixed(", "));
        }
        columns.push(Column::left(&option.name));
        columns.push(Column::fixed(" = "));
        columns.push(Column::right(option.constant.to_string()));
    }
    columns.push(Column::fixed("]"));
}

/// ` = N [opts];` plus the inline comment
fn push_field_tail(columns: &mut Vec<Column>, field: &Field) {
    columns.push(Column::fixed(" = "));
    columns.push(Column::right(field.sequence.to_string()));
    push_embedded_options(columns, &field.options);
    columns.push(Column::fixed(";"));
    push_inline(columns, field.inline_comment.as_ref());
}

fn container_header(keyword: &str, name: &str) -> Vec<Column> {
    vec![
        Column::left(keyword),
        Column::fixed(" "),
        Column::left(name),
        Column::fixed(" {"),
    ]
}

fn quoted(text: &str, quote: char) -> String {
    format!("{quote}{text}{quote}")
}

fn ranges_text(ranges: &[Range]) -> String {
    ranges
        .iter()
        .map(Range::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Columns for Comment {
    fn columns(&self) -> Vec<Column> {
        if self.c_style {
            return vec![
                Column::fixed("/*"),
                Column::unaligned(self.lines.join("\n")),
                Column::fixed("*/"),
            ];
        }
        let prefix = if self.extra_slash { "///" } else { "//" };
        let mut columns = Vec::with_capacity(self.lines.len() * 3);
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                columns.push(Column::fixed("\n"));
            }
            columns.push(Column::fixed(prefix));
            columns.push(Column::unaligned(line));
        }
        columns
    }
}

impl Columns for Syntax {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::left("syntax"),
            Column::fixed(" = "),
            Column::fixed(quoted(&self.value, self.quote)),
            Column::fixed(";"),
        ];
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for Package {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::left("package"),
            Column::fixed(" "),
            Column::left(&self.name),
            Column::fixed(";"),
        ];
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for Import {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![Column::left("import"), Column::fixed(" ")];
        match self.kind {
            ImportKind::Default => {}
            ImportKind::Weak => columns.push(Column::left("weak ")),
            ImportKind::Public => columns.push(Column::left("public ")),
        }
        columns.push(Column::left(quoted(&self.filename, self.quote)));
        columns.push(Column::fixed(";"));
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for ProtoOption {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::left("option"),
            Column::fixed(" "),
            Column::left(&self.name),
            Column::fixed(" = "),
            Column::right(self.constant.to_string()),
            Column::fixed(";"),
        ];
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for Message {
    fn columns(&self) -> Vec<Column> {
        let keyword = if self.is_extend { "extend" } else { "message" };
        container_header(keyword, &self.name)
    }
}

impl Columns for NormalField {
    fn columns(&self) -> Vec<Column> {
        let label = match self.label {
            Some(label) => format!("{} ", label.as_str()),
            None => String::new(),
        };
        let mut columns = vec![
            Column::left(label),
            Column::left(&self.field.type_name),
            Column::fixed(" "),
            Column::left(&self.field.name),
        ];
        push_field_tail(&mut columns, &self.field);
        columns
    }
}

impl Columns for MapField {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::fixed("map<"),
            Column::left(&self.key_type),
            Column::fixed(", "),
            Column::left(&self.field.type_name),
            Column::fixed("> "),
            Column::left(&self.field.name),
        ];
        push_field_tail(&mut columns, &self.field);
        columns
    }
}

impl Columns for OneOfField {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::left(&self.field.type_name),
            Column::fixed(" "),
            Column::left(&self.field.name),
        ];
        push_field_tail(&mut columns, &self.field);
        columns
    }
}

impl Columns for Oneof {
    fn columns(&self) -> Vec<Column> {
        container_header("oneof", &self.name)
    }
}

impl Columns for Enum {
    fn columns(&self) -> Vec<Column> {
        container_header("enum", &self.name)
    }
}

impl Columns for EnumField {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::left(&self.name),
            Column::fixed(" = "),
            Column::right(self.integer.to_string()),
        ];
        push_embedded_options(&mut columns, &self.value_options);
        columns.push(Column::fixed(";"));
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for Service {
    fn columns(&self) -> Vec<Column> {
        container_header("service", &self.name)
    }
}

impl Columns for Rpc {
    fn columns(&self) -> Vec<Column> {
        let stream = |on: bool| if on { "stream " } else { "" };
        let mut columns = vec![
            Column::left("rpc"),
            Column::fixed(" "),
            Column::left(&self.name),
            Column::fixed(" ("),
            Column::left(format!("{}{}", stream(self.streams_request), self.request_type)),
            Column::fixed(") returns ("),
            Column::left(format!("{}{}", stream(self.streams_returns), self.returns_type)),
            Column::fixed(")"),
        ];
        if self.has_body {
            columns.push(Column::fixed(" {"));
        } else {
            columns.push(Column::fixed(";"));
            push_inline(&mut columns, self.inline_comment.as_ref());
        }
        columns
    }
}

impl Columns for Reserved {
    fn columns(&self) -> Vec<Column> {
        let text = if self.field_names.is_empty() {
            ranges_text(&self.ranges)
        } else {
            self.field_names
                .iter()
                .map(|name| quoted(name, self.quote))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut columns = vec![
            Column::left("reserved"),
            Column::fixed(" "),
            Column::left(text),
            Column::fixed(";"),
        ];
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for Group {
    fn columns(&self) -> Vec<Column> {
        let label = match self.label {
            Some(label) => format!("{} ", label.as_str()),
            None => String::new(),
        };
        vec![
            Column::left(label),
            Column::left("group"),
            Column::fixed(" "),
            Column::left(&self.name),
            Column::fixed(" = "),
            Column::right(self.sequence.to_string()),
            Column::fixed(" {"),
        ]
    }
}

impl Columns for Extensions {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::left("extensions"),
            Column::fixed(" "),
            Column::left(ranges_text(&self.ranges)),
            Column::fixed(";"),
        ];
        push_inline(&mut columns, self.inline_comment.as_ref());
        columns
    }
}

impl Columns for Element {
    fn columns(&self) -> Vec<Column> {
        match self {
            Element::Syntax(n) => n.columns(),
            Element::Package(n) => n.columns(),
            Element::Import(n) => n.columns(),
            Element::Option(n) => n.columns(),
            Element::Message(n) => n.columns(),
            Element::NormalField(n) => n.columns(),
            Element::MapField(n) => n.columns(),
            Element::OneOfField(n) => n.columns(),
            Element::Oneof(n) => n.columns(),
            Element::Enum(n) => n.columns(),
            Element::EnumField(n) => n.columns(),
            Element::Service(n) => n.columns(),
            Element::Rpc(n) => n.columns(),
            Element::Reserved(n) => n.columns(),
            Element::Group(n) => n.columns(),
            Element::Extensions(n) => n.columns(),
            Element::Comment(n) => n.columns(),
        }
    }
}
