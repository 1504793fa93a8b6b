//! Restoring CDATA sections after serialization.
//!
//! The writer escapes all text, so query and script bodies come out with
//! `&lt;` and friends. The platform expects those bodies as CDATA; this
//! module re-wraps them on the serialized text.

use regex::Regex;

use crate::directive::ObjectType;
use crate::error::{Result, TransformError};

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Wrap the body between each opening and closing tag match in CDATA.
///
/// Self-closing opening tags and bodies that already start with a CDATA
/// section are left alone.
///
/// # Errors
/// Returns `InvalidPattern` when either pattern does not compile.
///
/// # Examples
/// ```
/// use xogmerge::cdata::include_cdata;
///
/// let xml = "<query><nsql>SELECT 1 WHERE a &lt; b</nsql></query>";
/// let wrapped = include_cdata(xml, r"<nsql(?:\s[^>]*)?>", r"</nsql>").unwrap();
/// assert_eq!(wrapped, "<query><nsql><![CDATA[SELECT 1 WHERE a < b]]></nsql></query>");
/// ```
pub fn include_cdata(xml: &str, open_pattern: &str, close_pattern: &str) -> Result<String> {
    let open = compile(open_pattern)?;
    let close = compile(close_pattern)?;

    let mut out = String::with_capacity(xml.len());
    let mut cursor = 0;

    while let Some(open_match) = open.find_at(xml, cursor) {
        out.push_str(&xml[cursor..open_match.end()]);
        cursor = open_match.end();

        if open_match.as_str().ends_with("/>") {
            continue;
        }
        let Some(close_match) = close.find_at(xml, cursor) else {
            break;
        };

        let body = &xml[cursor..close_match.start()];
        if body.trim_start().starts_with(CDATA_OPEN) {
            out.push_str(body);
        } else {
            out.push_str(CDATA_OPEN);
            out.push_str(&unescape(body).replace(CDATA_CLOSE, "]]]]><![CDATA[>"));
            out.push_str(CDATA_CLOSE);
        }
        out.push_str(close_match.as_str());
        cursor = close_match.end();
    }

    out.push_str(&xml[cursor..]);
    Ok(out)
}

/// Apply the CDATA tags of an object type, if it has any.
///
/// # Errors
/// Returns `InvalidPattern` when the type's patterns do not compile.
pub fn restore_cdata(xml: &str, object_type: &ObjectType) -> Result<String> {
    match object_type.cdata_tags() {
        Some((open, close)) => include_cdata(xml, open, close),
        None => Ok(xml.to_string()),
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| TransformError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
