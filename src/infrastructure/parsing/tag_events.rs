//! Tag event source over a parsed HTML document.
//!
//! `scraper` (html5ever) tokenizes and tree-builds the document; the events are
//! produced lazily by walking the tree's open/close edges, so a consumer that
//! stops pulling never visits the rest of the document.

use ego_tree::iter::{Edge, Traverse};
use scraper::{Html, Node};

/// One tokenizer event, borrowing from the parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent<'a> {
    Start {
        name: &'a str,
        attrs: Vec<(&'a str, &'a str)>,
    },
    End {
        name: &'a str,
    },
    Text(&'a str),
}

impl<'a> TagEvent<'a> {
    pub fn start(name: &'a str, attrs: &[(&'a str, &'a str)]) -> Self {
        Self::Start {
            name,
            attrs: attrs.to_vec(),
        }
    }

    pub fn end(name: &'a str) -> Self {
        Self::End { name }
    }

    pub fn text(content: &'a str) -> Self {
        Self::Text(content)
    }
}

/// Elements that never have content or an end tag in HTML source
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Document-order events for one parsed document.
///
/// Comments, doctypes and processing instructions are skipped. Tag names are
/// the lowercase names html5ever produces. Void elements yield a start event
/// only, as they appear in the source.
pub struct DocumentEvents<'a> {
    edges: Traverse<'a, Node>,
}

impl<'a> DocumentEvents<'a> {
    pub fn new(document: &'a Html) -> Self {
        Self {
            edges: document.tree.root().traverse(),
        }
    }
}

impl<'a> Iterator for DocumentEvents<'a> {
    type Item = TagEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for edge in self.edges.by_ref() {
            let event = match edge {
                Edge::Open(node) => match node.value() {
                    Node::Element(element) => TagEvent::Start {
                        name: element.name(),
                        attrs: element.attrs().collect(),
                    },
                    Node::Text(text) => TagEvent::Text(&**text),
                    _ => continue,
                },
                Edge::Close(node) => match node.value() {
                    Node::Element(element) if !is_void_element(element.name()) => TagEvent::End {
                        name: element.name(),
                    },
                    _ => continue,
                },
            };
            return Some(event);
        }
        None
    }
}
