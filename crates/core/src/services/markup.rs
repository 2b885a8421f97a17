//! Typed markup tree for compiled article documents.
//!
//! The rendered document ships as XML with `<img alias="...">` placeholder
//! elements. Rendering rewrites those elements' attributes, so this module
//! keeps a mutable tree abstraction over `quick-xml` instead of poking at
//! attribute dictionaries inline: find elements by tag, read and overwrite
//! attributes, and serialize the mutated tree back to text.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use scribe_common::{AppError, AppResult};

/// A node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// Unescaped character data.
    Text(String),
    /// A comment, without the delimiters.
    Comment(String),
    /// Declarations, processing instructions, CDATA; kept verbatim.
    Raw(String),
}

/// A markup element.
///
/// Attribute order is preserved so serialization stays stable across
/// parse/serialize round trips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Tag name of the element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value of an attribute, if present.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set one attribute, replacing an existing value in place.
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.attributes.iter_mut().find(|(key, _)| key == name) {
            entry.1 = value.to_string();
        } else {
            self.attributes.push((name.to_string(), value.to_string()));
        }
    }

    /// Set several attributes at once.
    pub fn set_attributes<'a, I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (name, value) in attributes {
            self.set_attribute(name, value);
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    fn serialize_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.self_closing && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.serialize_into(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    fn serialize_into(&self, out: &mut String) {
        match self {
            Self::Element(element) => element.serialize_into(out),
            Self::Text(text) => out.push_str(&escape(text.as_str())),
            Self::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment);
                out.push_str("-->");
            }
            Self::Raw(raw) => out.push_str(raw),
        }
    }
}

/// A parsed markup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupDocument {
    nodes: Vec<Node>,
}

impl MarkupDocument {
    /// Parse a markup document from text.
    pub fn parse(input: &str) -> AppResult<Self> {
        let mut reader = Reader::from_str(input);
        let mut roots: Vec<Node> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| AppError::Validation(format!("malformed markup: {e}")))?;

            match event {
                Event::Start(start) => {
                    let element = element_from_start(&start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let mut element = element_from_start(&start)?;
                    element.self_closing = true;
                    push_node(&mut roots, &mut stack, Node::Element(element));
                }
                Event::End(_) => {
                    let Some(element) = stack.pop() else {
                        return Err(AppError::Validation(
                            "malformed markup: unbalanced closing tag".to_string(),
                        ));
                    };
                    push_node(&mut roots, &mut stack, Node::Element(element));
                }
                Event::Text(text) => {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| AppError::Validation(format!("malformed markup: {e}")))?;
                    push_node(&mut roots, &mut stack, Node::Text(unescaped.into_owned()));
                }
                Event::Comment(comment) => {
                    let body = String::from_utf8_lossy(&comment).into_owned();
                    push_node(&mut roots, &mut stack, Node::Comment(body));
                }
                Event::CData(data) => {
                    let raw = format!("<![CDATA[{}]]>", String::from_utf8_lossy(&data));
                    push_node(&mut roots, &mut stack, Node::Raw(raw));
                }
                Event::Decl(decl) => {
                    let raw = format!("<?{}?>", String::from_utf8_lossy(&decl));
                    push_node(&mut roots, &mut stack, Node::Raw(raw));
                }
                Event::PI(pi) => {
                    let raw = format!("<?{}?>", String::from_utf8_lossy(&pi));
                    push_node(&mut roots, &mut stack, Node::Raw(raw));
                }
                Event::DocType(doctype) => {
                    let raw = format!("<!DOCTYPE {}>", String::from_utf8_lossy(&doctype));
                    push_node(&mut roots, &mut stack, Node::Raw(raw));
                }
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(AppError::Validation(
                "malformed markup: unclosed element".to_string(),
            ));
        }

        Ok(Self { nodes: roots })
    }

    /// All elements with the given tag name, in document order.
    #[must_use]
    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        for node in &self.nodes {
            collect_by_tag(node, tag, &mut found);
        }
        found
    }

    /// Visit every element with the given tag name mutably.
    pub fn visit_elements_mut<F>(&mut self, tag: &str, mut visit: F)
    where
        F: FnMut(&mut Element),
    {
        for node in &mut self.nodes {
            visit_node_mut(node, tag, &mut visit);
        }
    }

    /// Serialize the tree back to markup text.
    #[must_use]
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.serialize_into(&mut out);
        }
        out
    }
}

fn element_from_start(start: &quick_xml::events::BytesStart<'_>) -> AppResult<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();

    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| AppError::Validation(format!("malformed markup: {e}")))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| AppError::Validation(format!("malformed markup: {e}")))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
        self_closing: false,
    })
}

fn push_node(roots: &mut Vec<Node>, stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else {
        roots.push(node);
    }
}

fn collect_by_tag<'a>(node: &'a Node, tag: &str, found: &mut Vec<&'a Element>) {
    if let Node::Element(element) = node {
        if element.name == tag {
            found.push(element);
        }
        for child in &element.children {
            collect_by_tag(child, tag, found);
        }
    }
}

fn visit_node_mut<F>(node: &mut Node, tag: &str, visit: &mut F)
where
    F: FnMut(&mut Element),
{
    if let Node::Element(element) = node {
        if element.name == tag {
            visit(element);
        }
        for child in &mut element.children {
            visit_node_mut(child, tag, visit);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        r#"<article><p>Intro</p><img alias="cover"/><p>More <img alias="chart"/></p></article>"#;

    #[test]
    fn test_parse_and_find_by_tag() {
        let doc = MarkupDocument::parse(SAMPLE).unwrap();
        let images = doc.find_by_tag("img");

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].get_attribute("alias"), Some("cover"));
        assert_eq!(images[1].get_attribute("alias"), Some("chart"));
    }

    #[test]
    fn test_serialize_round_trip() {
        let doc = MarkupDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.serialize(), SAMPLE);
    }

    #[test]
    fn test_visit_elements_mut_rewrites_attributes() {
        let mut doc = MarkupDocument::parse(SAMPLE).unwrap();

        doc.visit_elements_mut("img", |img| {
            img.set_attributes([("class", "lazyload"), ("src", "")]);
            img.remove_attribute("alias");
        });

        let out = doc.serialize();
        assert!(!out.contains("alias"));
        assert_eq!(out.matches(r#"class="lazyload""#).count(), 2);
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut doc = MarkupDocument::parse(r#"<img src="old" width="10"/>"#).unwrap();
        doc.visit_elements_mut("img", |img| img.set_attribute("src", "new"));

        assert_eq!(doc.serialize(), r#"<img src="new" width="10"/>"#);
    }

    #[test]
    fn test_unbalanced_markup_is_rejected() {
        assert!(MarkupDocument::parse("<p><b>text</p>").is_err());
    }

    #[test]
    fn test_text_is_escaped_on_serialize() {
        let doc = MarkupDocument::parse("<p>a &amp; b</p>").unwrap();
        assert_eq!(doc.serialize(), "<p>a &amp; b</p>");
    }
}
