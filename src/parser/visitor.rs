//! Double-dispatch traversal over the AST
//!
//! A node's [`Visitee::accept`] calls the one [`Visitor`] method matching its
//! own kind, so consumers never match on [`Element`] themselves. Visiting is
//! shallow: `accept` does not recurse into children. Use [`walk`] for a
//! depth-first pass over a whole tree.

use crate::parser::ast::*;

/// One callback per node kind.
///
/// There are deliberately no default bodies: adding a node kind breaks every
/// implementor until it handles the new callback. Consumers that only care
/// about a few kinds write empty bodies for the rest.
pub trait Visitor {
    fn visit_syntax(&mut self, syntax: &Syntax);
    fn visit_package(&mut self, package: &Package);
    fn visit_import(&mut self, import: &Import);
    fn visit_option(&mut self, option: &ProtoOption);
    fn visit_message(&mut self, message: &Message);
    fn visit_normal_field(&mut self, field: &NormalField);
    fn visit_map_field(&mut self, field: &MapField);
    fn visit_oneof_field(&mut self, field: &OneOfField);
    fn visit_oneof(&mut self, oneof: &Oneof);
    fn visit_enum(&mut self, e: &Enum);
    fn visit_enum_field(&mut self, field: &EnumField);
    fn visit_service(&mut self, service: &Service);
    fn visit_rpc(&mut self, rpc: &Rpc);
    fn visit_reserved(&mut self, reserved: &Reserved);
    fn visit_group(&mut self, group: &Group);
    fn visit_extensions(&mut self, extensions: &Extensions);
    fn visit_comment(&mut self, comment: &Comment);
}

/// Nodes that dispatch to their [`Visitor`] callback.
pub trait Visitee {
    fn accept(&self, visitor: &mut dyn Visitor);
}

macro_rules! visitee {
    ($($node:ty => $method:ident),* $(,)?) => {
        $(
            impl Visitee for $node {
                fn accept(&self, visitor: &mut dyn Visitor) {
                    visitor.$method(self);
                }
            }
        )*
    };
}

visitee!(
    Syntax => visit_syntax,
    Package => visit_package,
    Import => visit_import,
    ProtoOption => visit_option,
    Message => visit_message,
    NormalField => visit_normal_field,
    MapField => visit_map_field,
    OneOfField => visit_oneof_field,
    Oneof => visit_oneof,
    Enum => visit_enum,
    EnumField => visit_enum_field,
    Service => visit_service,
    Rpc => visit_rpc,
    Reserved => visit_reserved,
    Group => visit_group,
    Extensions => visit_extensions,
    Comment => visit_comment,
);

impl Visitee for Element {
    fn accept(&self, visitor: &mut dyn Visitor) {
        match self {
            Element::Syntax(n) => n.accept(visitor),
            Element::Package(n) => n.accept(visitor),
            Element::Import(n) => n.accept(visitor),
            Element::Option(n) => n.accept(visitor),
            Element::Message(n) => n.accept(visitor),
            Element::NormalField(n) => n.accept(visitor),
            Element::MapField(n) => n.accept(visitor),
            Element::OneOfField(n) => n.accept(visitor),
            Element::Oneof(n) => n.accept(visitor),
            Element::Enum(n) => n.accept(visitor),
            Element::EnumField(n) => n.accept(visitor),
            Element::Service(n) => n.accept(visitor),
            Element::Rpc(n) => n.accept(visitor),
            Element::Reserved(n) => n.accept(visitor),
            Element::Group(n) => n.accept(visitor),
            Element::Extensions(n) => n.accept(visitor),
            Element::Comment(n) => n.accept(visitor),
        }
    }
}

/// Visit `elements` depth-first, each node before its children.
pub fn walk(elements: &[Element], visitor: &mut dyn Visitor) {
    for element in elements {
        element.accept(visitor);
        if let Some(container) = element.as_container() {
            walk(container.elements(), visitor);
        }
    }
}
