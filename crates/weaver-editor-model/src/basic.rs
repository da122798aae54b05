//! A small basic node set and builders.
//!
//! Enough structure for headings, paragraphs, quotes and breaks. Hosts with
//! richer documents build their own `NodeType`s; these are what the tests and
//! the in-memory surface use.

use crate::fragment::Fragment;
use crate::mark::MarkSet;
use crate::node::{Node, NodeType};

pub fn doc_type() -> NodeType {
    NodeType::block("doc")
}

pub fn paragraph_type() -> NodeType {
    NodeType::textblock("paragraph")
}

pub fn heading_type() -> NodeType {
    NodeType::textblock("heading")
}

pub fn blockquote_type() -> NodeType {
    NodeType::block("blockquote")
}

pub fn hard_break_type() -> NodeType {
    NodeType::inline_atom("hard_break")
}

pub fn horizontal_rule_type() -> NodeType {
    NodeType::block_atom("horizontal_rule")
}

pub fn doc(content: impl Into<Fragment>) -> Node {
    Node::element(doc_type(), content)
}

pub fn paragraph(content: impl Into<Fragment>) -> Node {
    Node::element(paragraph_type(), content)
}

/// A paragraph holding a single unmarked text node.
pub fn p(text_content: &str) -> Node {
    paragraph([text(text_content)])
}

pub fn heading(text_content: &str) -> Node {
    Node::element(heading_type(), [text(text_content)])
}

pub fn blockquote(content: impl Into<Fragment>) -> Node {
    Node::element(blockquote_type(), content)
}

/// Unmarked text.
pub fn text(text: &str) -> Node {
    Node::text(text, MarkSet::none())
}

pub fn hard_break() -> Node {
    Node::atom(hard_break_type())
}

pub fn horizontal_rule() -> Node {
    Node::atom(horizontal_rule_type())
}
