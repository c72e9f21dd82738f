//! Parsed view of an SVG badge: its `<text>` nodes and the `<tspan>` runs
//! (slots) inside them.
//!
//! Only slot text is ever rewritten. Serializing splices the modified slots
//! back into the original source, so everything else round-trips untouched,
//! including the default namespace declaration.

use std::ops::Range;

use roxmltree::{Node, ParsingOptions};

use crate::app::error::Result;
use crate::app::services::text_ops::escape_xml;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Where a slot's text lives in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SlotSpan {
    /// Leading text child; replace the raw bytes.
    Text(Range<usize>),
    /// No leading text; insert at this byte offset.
    Insert(usize),
    /// `<tspan .../>`: the `/>` must become `>value</tspan>`.
    SelfClosing { tail: Range<usize>, qname: String },
}

#[derive(Debug, Clone)]
pub struct Slot {
    text: Option<String>,
    span: SlotSpan,
    modified: bool,
}

impl Slot {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        self.text = Some(value.into());
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// One text-bearing node. Slots are in document order.
#[derive(Debug, Clone, Default)]
pub struct TextNode {
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone)]
pub struct TextDocument {
    source: String,
    pub nodes: Vec<TextNode>,
}

fn qualified_name(raw_element: &str) -> String {
    raw_element
        .trim_start_matches('<')
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '/' && *c != '>')
        .collect()
}

/// Byte offset of the element's close tag, or its end when there is none.
fn content_end(node: Node<'_, '_>, source: &str) -> usize {
    let range = node.range();
    let raw = &source[range.clone()];
    raw.rfind("</").map_or(range.end, |i| range.start + i)
}

/// The run of character data before the first child element. Text and
/// CDATA sections may be split across several nodes.
fn leading_text(node: Node<'_, '_>) -> Option<String> {
    let mut text = String::new();
    let mut found = false;
    for child in node.children().take_while(|c| !c.is_element()) {
        if let Some(part) = child.text().filter(|_| child.is_text()) {
            text.push_str(part);
            found = true;
        }
    }
    found.then_some(text)
}

fn locate_slot(node: Node<'_, '_>, source: &str) -> SlotSpan {
    let Some(first) = node.first_child() else {
        let range = node.range();
        let raw = &source[range.clone()];
        return if raw.ends_with("/>") {
            SlotSpan::SelfClosing {
                tail: range.end - 2..range.end,
                qname: qualified_name(raw),
            }
        } else {
            SlotSpan::Insert(content_end(node, source))
        };
    };

    let has_text = node
        .children()
        .take_while(|c| !c.is_element())
        .any(|c| c.is_text());
    if !has_text {
        return SlotSpan::Insert(first.range().start);
    }

    // Ranges of merged text nodes do not cover trailing CDATA, so the end
    // comes from the next element or the close tag instead.
    let end = node
        .children()
        .find(|c| c.is_element())
        .map_or_else(|| content_end(node, source), |c| c.range().start);
    SlotSpan::Text(first.range().start..end)
}

impl TextDocument {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };

        let nodes = {
            let doc = roxmltree::Document::parse_with_options(&source, options)?;
            doc.descendants()
                .filter(|n| n.has_tag_name((SVG_NAMESPACE, "text")))
                .map(|text| TextNode {
                    slots: text
                        .descendants()
                        .filter(|n| n.has_tag_name((SVG_NAMESPACE, "tspan")))
                        .map(|tspan| Slot {
                            text: leading_text(tspan),
                            span: locate_slot(tspan, &source),
                            modified: false,
                        })
                        .collect(),
                })
                .collect()
        };

        Ok(Self { source, nodes })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn modified_slots(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.slots.iter())
            .filter(|s| s.modified)
            .count()
    }

    /// Render the document with every modified slot written back.
    pub fn serialize(&self) -> String {
        let mut edits: Vec<(Range<usize>, String)> = self
            .nodes
            .iter()
            .flat_map(|n| n.slots.iter())
            .filter(|s| s.modified)
            .map(|slot| {
                let value = escape_xml(slot.text.as_deref().unwrap_or_default());
                match &slot.span {
                    SlotSpan::Text(range) => (range.clone(), value),
                    SlotSpan::Insert(at) => (*at..*at, value),
                    SlotSpan::SelfClosing { tail, qname } => {
                        (tail.clone(), format!(">{}</{}>", value, qname))
                    }
                }
            })
            .collect();

        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));

        let mut out = self.source.clone();
        for (range, replacement) in edits {
            out.replace_range(range, &replacement);
        }
        out
    }
}
