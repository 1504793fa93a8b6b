//! Loading XML text into a [`Document`].

use std::str::FromStr;

use roxmltree::{Node, ParsingOptions};

use super::document::{Document, ElementId};
use crate::error::{Result, TransformError};

/// Namespace prefix that is always bound and never declared.
const XML_PREFIX: &str = "xml";

impl Document {
    /// Parse XML text into a mutable document.
    ///
    /// Namespace declarations and prefixed names are kept as written.
    /// Comments, processing instructions and whitespace-only text are
    /// dropped; CDATA sections become plain text.
    ///
    /// An element holds at most one text value. In mixed content every text
    /// segment is joined in document order, so `<a>x<b/>y</a>` reads as text
    /// `xy` with one child, and writing it back emits the text before the
    /// children.
    ///
    /// # Errors
    /// Returns `XmlParse` when the text is not well-formed.
    ///
    /// # Examples
    /// ```
    /// use xogmerge::xml::Document;
    ///
    /// let doc = Document::parse(r#"<views><property code="a"/></views>"#).unwrap();
    /// let property = doc.find("/views/property").unwrap().unwrap();
    /// assert_eq!(doc.attr(property, "code"), Some("a"));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let parsed = roxmltree::Document::parse_with_options(text, options)?;
        let source_root = parsed.root_element();

        let mut doc = Document::new(qualified_tag(source_root));
        let root = doc.root();
        fill(&mut doc, root, source_root);
        Ok(doc)
    }
}

impl FromStr for Document {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn fill(doc: &mut Document, target: ElementId, source: Node<'_, '_>) {
    for (name, value) in namespace_declarations(source) {
        doc.set_attr(target, &name, value);
    }
    for attr in source.attributes() {
        let name = qualify(source, attr.namespace(), attr.name());
        doc.set_attr(target, &name, attr.value());
    }

    let mut text = String::new();
    for child in source.children() {
        if child.is_element() {
            let element = doc.create_child(target, qualified_tag(child));
            fill(doc, element, child);
        } else if child.is_text() {
            text.push_str(child.text().unwrap_or_default());
        }
    }
    if !text.trim().is_empty() {
        doc.set_text(target, text);
    }
}

fn qualified_tag(node: Node<'_, '_>) -> String {
    let name = node.tag_name();
    qualify(node, name.namespace(), name.name())
}

fn qualify(node: Node<'_, '_>, namespace: Option<&str>, local: &str) -> String {
    match namespace.and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

/// Namespaces declared on `node` itself, as `xmlns` attributes.
fn namespace_declarations(node: Node<'_, '_>) -> Vec<(String, String)> {
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    node.namespaces()
        .filter(|ns| ns.name() != Some(XML_PREFIX))
        .filter(|ns| !inherited.contains(&(ns.name(), ns.uri())))
        .map(|ns| {
            let name = match ns.name() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            (name, ns.uri().to_string())
        })
        .collect()
}
