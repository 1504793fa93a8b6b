//! Path expressions over the in-memory element tree.
//!
//! A small XPath subset: steps separated by `/`, `//` for the descendant
//! axis, `*` as a wildcard tag, and predicates `[@name='value']`,
//! `[@name]` and `[n]` (1-based position among the step's matches under
//! one parent). Paths starting with `/` are evaluated from the document,
//! others from a context element.

use regex::Regex;
use std::sync::LazyLock;

use super::document::{Document, ElementId};
use crate::error::{Result, TransformError};

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static STEP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\*|[A-Za-z_][\w.\-:]*)((?:\[[^\]]+\])*)$").expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PREDICATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]").expect("valid regex"));

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ATTR_EQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^@([\w.\-:]+)\s*=\s*(?:'([^']*)'|"([^"]*)")$"#).expect("valid regex")
});

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ATTR_EXISTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([\w.\-:]+)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    AttrEquals(String, String),
    HasAttr(String),
    Position(usize),
}

#[derive(Debug, Clone)]
struct Step {
    axis: Axis,
    tag: Option<String>,
    predicates: Vec<Predicate>,
}

/// A parsed path expression.
#[derive(Debug, Clone)]
pub struct Path {
    absolute: bool,
    steps: Vec<Step>,
}

impl Path {
    /// Parse a path expression.
    ///
    /// # Errors
    /// Returns `InvalidPath` for empty paths, trailing slashes, unbalanced
    /// brackets and unsupported predicates.
    pub fn parse(path: &str) -> Result<Self> {
        let invalid = |reason: &str| TransformError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        if path.trim().is_empty() {
            return Err(invalid("empty path"));
        }

        let segments = split_segments(path).ok_or_else(|| invalid("unbalanced brackets"))?;
        let absolute = path.starts_with('/');

        let mut steps = Vec::new();
        let mut descendant = false;
        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                if i == 0 {
                    continue;
                }
                if descendant {
                    return Err(invalid("too many slashes"));
                }
                descendant = true;
                continue;
            }
            let axis = if descendant {
                Axis::Descendant
            } else {
                Axis::Child
            };
            steps.push(parse_step(segment, axis).map_err(|reason| invalid(&reason))?);
            descendant = false;
        }

        if descendant || steps.is_empty() {
            return Err(invalid("path ends with a slash"));
        }

        Ok(Self { absolute, steps })
    }

    /// Evaluate the path.
    ///
    /// `context` is ignored for absolute paths; a relative path without
    /// context is evaluated from the document.
    #[must_use]
    pub fn evaluate(&self, doc: &Document, context: Option<ElementId>) -> Vec<ElementId> {
        // `None` stands for the document node above the root element.
        let start = if self.absolute { None } else { context };
        let mut current: Vec<Option<ElementId>> = vec![start];

        for step in &self.steps {
            let mut next = Vec::new();
            for ctx in &current {
                let candidates = match (step.axis, ctx) {
                    (Axis::Child, Some(id)) => doc.children(*id).to_vec(),
                    (Axis::Child, None) => vec![doc.root()],
                    (Axis::Descendant, Some(id)) => doc.descendants(*id),
                    (Axis::Descendant, None) => {
                        let mut all = vec![doc.root()];
                        all.extend(doc.descendants(doc.root()));
                        all
                    }
                };
                next.extend(step.select(doc, candidates));
            }
            current = Document::dedup(next).into_iter().map(Some).collect();
        }

        current.into_iter().flatten().collect()
    }
}

impl Step {
    fn select(&self, doc: &Document, candidates: Vec<ElementId>) -> Vec<ElementId> {
        let mut matched: Vec<ElementId> = candidates
            .into_iter()
            .filter(|id| self.tag.as_deref().is_none_or(|t| doc.tag(*id) == t))
            .collect();

        for predicate in &self.predicates {
            matched = match predicate {
                Predicate::AttrEquals(name, value) => matched
                    .into_iter()
                    .filter(|id| doc.attr(*id, name) == Some(value.as_str()))
                    .collect(),
                Predicate::HasAttr(name) => matched
                    .into_iter()
                    .filter(|id| doc.attr(*id, name).is_some())
                    .collect(),
                Predicate::Position(n) => matched.get(n - 1).copied().into_iter().collect(),
            };
        }
        matched
    }
}

/// Split on `/` outside of brackets and quotes.
fn split_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in path.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quote.is_some() {
        return None;
    }
    segments.push(&path[start..]);
    Some(segments)
}

fn parse_step(segment: &str, axis: Axis) -> std::result::Result<Step, String> {
    let caps = STEP_RE
        .captures(segment)
        .ok_or_else(|| format!("invalid step '{segment}'"))?;

    let tag = match &caps[1] {
        "*" => None,
        name => Some(name.to_string()),
    };

    let mut predicates = Vec::new();
    if let Some(preds) = caps.get(2) {
        for pred in PREDICATE_RE.captures_iter(preds.as_str()) {
            predicates.push(parse_predicate(pred[1].trim())?);
        }
    }

    Ok(Step {
        axis,
        tag,
        predicates,
    })
}

fn parse_predicate(body: &str) -> std::result::Result<Predicate, String> {
    if let Some(caps) = ATTR_EQ_RE.captures(body) {
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return Ok(Predicate::AttrEquals(caps[1].to_string(), value));
    }
    if let Some(caps) = ATTR_EXISTS_RE.captures(body) {
        return Ok(Predicate::HasAttr(caps[1].to_string()));
    }
    match body.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(Predicate::Position(n)),
        _ => Err(format!("unsupported predicate '[{body}]'")),
    }
}
