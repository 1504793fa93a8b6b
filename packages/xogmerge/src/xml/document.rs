//! Mutable, arena-backed XML element tree.
//!
//! Elements are addressed by [`ElementId`] handles into the owning
//! [`Document`]. Handles stay valid for the lifetime of the document; a
//! removed element keeps its handle but is no longer reachable from the
//! root. Handles are never shared between documents: moving content from
//! one document to another always goes through [`Document::import`], which
//! produces a fresh, independently owned subtree.

use std::collections::HashSet;

use super::path::Path;
use crate::error::Result;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// A single attribute, kept in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified attribute name (e.g. `code`, `xsi:noNamespaceSchemaLocation`).
    pub name: String,
    /// Attribute value, unescaped.
    pub value: String,
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: Vec<Attribute>,
    children: Vec<ElementId>,
    text: Option<String>,
    parent: Option<ElementId>,
}

impl Node {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
            parent: None,
        }
    }
}

/// An ordered tree of elements with a single root.
///
/// Removed and replaced elements stay in the arena, so a document that is
/// edited repeatedly only grows. [`Document::copy`] returns a compacted
/// document holding only the elements reachable from the root.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: ElementId,
}

impl Document {
    /// Create a document holding only an empty root element.
    #[must_use]
    pub fn new(root_tag: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node::new(root_tag)],
            root: ElementId(0),
        }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    fn node(&self, id: ElementId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: ElementId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    // ----- read access -----

    /// Tag name of an element.
    #[must_use]
    pub fn tag(&self, id: ElementId) -> &str {
        &self.node(id).tag
    }

    /// Value of an attribute, if present.
    #[must_use]
    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.node(id)
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// All attributes of an element, in document order.
    #[must_use]
    pub fn attributes(&self, id: ElementId) -> &[Attribute] {
        &self.node(id).attributes
    }

    /// Text content of an element, if any.
    #[must_use]
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Parent of an element; `None` for the root and for detached elements.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.node(id).parent
    }

    /// Child elements in order.
    #[must_use]
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.node(id).children
    }

    /// Child elements with the given tag, in order.
    pub fn children_named<'a>(
        &'a self,
        id: ElementId,
        tag: &'a str,
    ) -> impl Iterator<Item = ElementId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.tag(*child) == tag)
    }

    /// First child element with the given tag.
    #[must_use]
    pub fn first_child_named(&self, id: ElementId, tag: &str) -> Option<ElementId> {
        self.children_named(id, tag).next()
    }

    /// All descendants of an element in document (pre-)order, excluding itself.
    #[must_use]
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First descendant with the given tag whose `attr` equals `value`.
    #[must_use]
    pub fn find_descendant_by_attr(
        &self,
        id: ElementId,
        tag: &str,
        attr: &str,
        value: &str,
    ) -> Option<ElementId> {
        self.descendants(id)
            .into_iter()
            .find(|d| self.tag(*d) == tag && self.attr(*d, attr) == Some(value))
    }

    /// Index of an element among its parent's children.
    #[must_use]
    pub fn position_in_parent(&self, id: ElementId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Whether an element is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: ElementId) -> bool {
        let mut current = id;
        loop {
            if current == self.root {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether `ancestor` is `id` itself or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    // ----- path queries -----

    /// Find the first element matching a path, evaluated from the document.
    ///
    /// # Errors
    /// Returns `InvalidPath` when the path cannot be parsed.
    pub fn find(&self, path: &str) -> Result<Option<ElementId>> {
        Ok(self.find_all(path)?.into_iter().next())
    }

    /// Find all elements matching a path, evaluated from the document.
    ///
    /// # Errors
    /// Returns `InvalidPath` when the path cannot be parsed.
    pub fn find_all(&self, path: &str) -> Result<Vec<ElementId>> {
        let path = Path::parse(path)?;
        Ok(path.evaluate(self, None))
    }

    /// Find the first element matching a path relative to `context`.
    ///
    /// # Errors
    /// Returns `InvalidPath` when the path cannot be parsed.
    pub fn find_from(&self, context: ElementId, path: &str) -> Result<Option<ElementId>> {
        Ok(self.find_all_from(context, path)?.into_iter().next())
    }

    /// Find all elements matching a path relative to `context`.
    ///
    /// # Errors
    /// Returns `InvalidPath` when the path cannot be parsed.
    pub fn find_all_from(&self, context: ElementId, path: &str) -> Result<Vec<ElementId>> {
        let path = Path::parse(path)?;
        Ok(path.evaluate(self, Some(context)))
    }

    // ----- mutation -----

    /// Set an attribute, overwriting an existing value in place.
    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let node = self.node_mut(id);
        match node.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => node.attributes.push(Attribute {
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, id: ElementId, name: &str) -> Option<String> {
        let node = self.node_mut(id);
        let index = node.attributes.iter().position(|a| a.name == name)?;
        Some(node.attributes.remove(index).value)
    }

    /// Replace the text content of an element.
    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        self.node_mut(id).text = Some(text.into());
    }

    /// Remove the text content of an element.
    pub fn clear_text(&mut self, id: ElementId) {
        self.node_mut(id).text = None;
    }

    /// Create a detached element owned by this document.
    pub fn create_element(&mut self, tag: impl Into<String>) -> ElementId {
        self.nodes.push(Node::new(tag));
        ElementId(self.nodes.len() - 1)
    }

    /// Create a new element and append it to `parent`.
    pub fn create_child(&mut self, parent: ElementId, tag: impl Into<String>) -> ElementId {
        let child = self.create_element(tag);
        self.append_child(parent, child);
        child
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Insert `child` at `index` among the children of `parent`.
    ///
    /// The child is detached from its current parent first; `index` is
    /// clamped to the child count.
    pub fn insert_child(&mut self, parent: ElementId, index: usize, child: ElementId) {
        debug_assert!(
            !self.is_ancestor_or_self(child, parent),
            "an element cannot become its own descendant"
        );
        self.remove(child);
        let children = &mut self.node_mut(parent).children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.node_mut(child).parent = Some(parent);
    }

    /// Insert `child` immediately before `anchor`.
    ///
    /// Does nothing when `anchor` has no parent.
    pub fn insert_before(&mut self, anchor: ElementId, child: ElementId) {
        if anchor == child {
            return;
        }
        self.remove(child);
        let (Some(parent), Some(index)) = (self.parent(anchor), self.position_in_parent(anchor))
        else {
            return;
        };
        self.insert_child(parent, index, child);
    }

    /// Put `new` at the position of `old` and detach `old`.
    pub fn replace(&mut self, old: ElementId, new: ElementId) {
        if old == new {
            return;
        }
        self.insert_before(old, new);
        self.remove(old);
    }

    /// Detach an element from its parent.
    ///
    /// The element and its subtree stay in the arena but are no longer
    /// reachable from the root. Removing the root is a no-op.
    pub fn remove(&mut self, id: ElementId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    // ----- cloning -----

    /// Deep-clone an element of this document into a new detached subtree.
    pub fn deep_clone(&mut self, id: ElementId) -> ElementId {
        let snapshot = self.subtree(id);
        self.graft(&snapshot)
    }

    /// Deep-clone an element of `other` into a new detached subtree of this document.
    pub fn import(&mut self, other: &Document, id: ElementId) -> ElementId {
        let snapshot = other.subtree(id);
        self.graft(&snapshot)
    }

    /// Deep copy of the reachable tree.
    ///
    /// Detached elements are not carried over, so handles of the original
    /// are not valid for the copy.
    #[must_use]
    pub fn copy(&self) -> Document {
        let snapshot = self.subtree(self.root);
        let mut doc = Document {
            nodes: Vec::with_capacity(snapshot.len()),
            root: ElementId(0),
        };
        doc.root = doc.graft(&snapshot);
        doc
    }

    /// Pre-order snapshot of a subtree; each entry records its parent's
    /// index within the snapshot.
    fn subtree(&self, id: ElementId) -> Vec<(Option<usize>, Node)> {
        let mut out: Vec<(Option<usize>, Node)> = Vec::new();
        let mut stack = vec![(None, id)];
        while let Some((parent_index, current)) = stack.pop() {
            let mut node = self.node(current).clone();
            node.children.clear();
            node.parent = None;
            out.push((parent_index, node));
            let my_index = out.len() - 1;
            for child in self.children(current).iter().rev() {
                stack.push((Some(my_index), *child));
            }
        }
        out
    }

    fn graft(&mut self, snapshot: &[(Option<usize>, Node)]) -> ElementId {
        let base = self.nodes.len();
        for (_, node) in snapshot {
            self.nodes.push(node.clone());
        }
        for (offset, (parent_index, _)) in snapshot.iter().enumerate() {
            if let Some(p) = parent_index {
                let child = ElementId(base + offset);
                let parent = ElementId(base + p);
                self.node_mut(parent).children.push(child);
                self.node_mut(child).parent = Some(parent);
            }
        }
        ElementId(base)
    }

    /// Structural equality of two subtrees, possibly from different documents.
    ///
    /// Compares tags, attributes (in order), text and children recursively.
    #[must_use]
    pub fn subtree_eq(&self, id: ElementId, other: &Document, other_id: ElementId) -> bool {
        let a = self.node(id);
        let b = other.node(other_id);
        a.tag == b.tag
            && a.attributes == b.attributes
            && a.text == b.text
            && a.children.len() == b.children.len()
            && a
                .children
                .iter()
                .zip(b.children.iter())
                .all(|(x, y)| self.subtree_eq(*x, other, *y))
    }

    /// Count reachable elements, including the root.
    #[must_use]
    pub fn element_count(&self) -> usize {
        1 + self.descendants(self.root).len()
    }

    /// Distinct handles from `ids`, keeping first occurrence order.
    pub(crate) fn dedup(ids: Vec<ElementId>) -> Vec<ElementId> {
        let mut seen = HashSet::new();
        ids.into_iter().filter(|id| seen.insert(*id)).collect()
    }
}
