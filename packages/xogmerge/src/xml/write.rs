//! Serializing a [`Document`] back to indented XML text.

use std::fmt::{self, Write as _};

use super::document::{Document, ElementId};
use crate::config::DEFAULT_INDENT;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Output formatting options.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// String repeated once per nesting level.
    pub indent: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl Document {
    /// Serialize the reachable tree with an XML declaration.
    ///
    /// # Examples
    /// ```
    /// use xogmerge::xml::{Document, WriteOptions};
    ///
    /// let doc = Document::parse(r#"<views><list code="a"/></views>"#).unwrap();
    /// let xml = doc.to_xml_string(&WriteOptions::default());
    /// assert!(xml.contains("  <list code=\"a\"/>"));
    /// ```
    #[must_use]
    pub fn to_xml_string(&self, options: &WriteOptions) -> String {
        let mut out = String::new();
        out.push_str(DECLARATION);
        out.push('\n');
        self.write_element(&mut out, self.root(), 0, options);
        out
    }

    fn write_element(&self, out: &mut String, id: ElementId, depth: usize, options: &WriteOptions) {
        let pad = options.indent.repeat(depth);
        let tag = self.tag(id);

        out.push_str(&pad);
        out.push('<');
        out.push_str(tag);
        for attr in self.attributes(id) {
            // Writing to a String cannot fail
            let _ = write!(out, " {}=\"{}\"", attr.name, escape_attr(&attr.value));
        }

        let children = self.children(id);
        let text = self.text(id);

        match (text, children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{tag}>", escape_text(text));
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{pad}{}{}", options.indent, escape_text(text.trim()));
                }
                for child in children {
                    self.write_element(out, *child, depth + 1, options);
                }
                let _ = writeln!(out, "{pad}</{tag}>");
            }
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string(&WriteOptions::default()))
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
