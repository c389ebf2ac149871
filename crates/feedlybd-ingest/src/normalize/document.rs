//! Minimal XML element tree for feed documents.
//!
//! Feeds are small, and field lookup follows "first matching descendant"
//! rules, so the document is read once into a tree and queried afterwards.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::IngestError;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let attrs = start
            .attributes()
            .flatten()
            .map(|attr| {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value().map_or_else(
                    |_| String::from_utf8_lossy(attr.value.as_ref()).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                (key, value)
            })
            .collect();
        Self {
            name,
            attrs,
            children: Vec::new(),
        }
    }

    /// Name without its namespace prefix.
    pub(crate) fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Whether this element answers to `selector`.
    ///
    /// Prefixed selectors (`dc:date`) match the qualified name exactly.
    /// Unprefixed selectors also match Atom elements written with an explicit
    /// `atom:` prefix.
    pub(crate) fn is(&self, selector: &str) -> bool {
        if self.name == selector {
            return true;
        }
        !selector.contains(':')
            && self.name.starts_with("atom:")
            && self.local_name() == selector
    }

    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-empty, trimmed attribute value.
    pub(crate) fn attr_non_empty(&self, key: &str) -> Option<&str> {
        self.attr(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub(crate) fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    pub(crate) fn child(&self, selector: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.is(selector))
    }

    /// All descendants in document order (pre-order), excluding `self`.
    pub(crate) fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            out.push(child);
            child.collect_descendants(out);
        }
    }

    /// First descendant, in document order, matching `selector`.
    pub(crate) fn find(&self, selector: &str) -> Option<&Element> {
        self.descendants().into_iter().find(|el| el.is(selector))
    }

    /// First descendant matching the earliest selector in `selectors` that
    /// matches anything at all.
    pub(crate) fn find_by_priority(&self, selectors: &[&str]) -> Option<&Element> {
        let descendants = self.descendants();
        selectors
            .iter()
            .find_map(|selector| descendants.iter().copied().find(|el| el.is(selector)))
    }

    /// Concatenated text of all descendant text nodes.
    pub(crate) fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.push_text(out),
            }
        }
    }

    /// Inner content with child markup re-serialized.
    ///
    /// For elements holding only text (including CDATA HTML) this equals
    /// [`Self::text_content`]; inline XHTML children come back as tags.
    pub(crate) fn inner_markup(&self) -> String {
        let mut out = String::new();
        self.push_markup(&mut out);
        out
    }

    fn push_markup(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => {
                    out.push('<');
                    out.push_str(el.local_name());
                    for (key, value) in &el.attrs {
                        if key == "xmlns" || key.starts_with("xmlns:") {
                            continue;
                        }
                        out.push(' ');
                        out.push_str(key);
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                    if el.children.is_empty() {
                        out.push_str("/>");
                    } else {
                        out.push('>');
                        el.push_markup(out);
                        out.push_str("</");
                        out.push_str(el.local_name());
                        out.push('>');
                    }
                }
            }
        }
    }
}

/// Read an XML document into its root [`Element`].
///
/// # Errors
///
/// Returns [`IngestError::Xml`] for reader errors (including mismatched end
/// tags) and [`IngestError::Malformed`] for unclosed elements, text outside
/// the root, multiple roots, or a document with no root element.
pub(crate) fn parse_document(xml: &str) -> Result<Element, IngestError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::from_start(&e)),
            Ok(Event::Empty(e)) => attach(&mut stack, &mut root, Element::from_start(&e))?,
            Ok(Event::End(_)) => {
                let finished = stack
                    .pop()
                    .ok_or_else(|| IngestError::Malformed("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, finished)?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_or_else(
                    |_| String::from_utf8_lossy(&e).into_owned(),
                    std::borrow::Cow::into_owned,
                );
                push_text(&mut stack, text)?;
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                push_text(&mut stack, text)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(IngestError::Xml(e)),
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(IngestError::Malformed(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| IngestError::Malformed("document has no root element".into()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), IngestError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(Node::Element(element));
        return Ok(());
    }
    if root.is_some() {
        return Err(IngestError::Malformed("multiple root elements".into()));
    }
    *root = Some(element);
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) -> Result<(), IngestError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(IngestError::Malformed("text outside the root element".into())),
    }
}
