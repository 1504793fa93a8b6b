//! 1-based ordinal resolution over sibling lists.

use crate::config::SECTION_TAG;
use crate::error::{Result, Scope, TransformError};
use crate::xml::{Document, ElementId};

/// Sections directly under a view, in document order.
#[must_use]
pub fn sections(doc: &Document, view: ElementId) -> Vec<ElementId> {
    doc.children_named(view, SECTION_TAG).collect()
}

/// Resolve a 1-based ordinal against a sibling list.
///
/// # Errors
/// Returns `OutOfBounds` when `ordinal` is 0 or exceeds the sibling count.
///
/// # Examples
/// ```
/// use xogmerge::error::Scope;
/// use xogmerge::position::resolve_ordinal;
///
/// let siblings = ["a", "b", "c"];
/// assert_eq!(resolve_ordinal(&siblings, 2, Scope::Source).unwrap(), "b");
/// assert!(resolve_ordinal(&siblings, 4, Scope::Source).is_err());
/// ```
pub fn resolve_ordinal<T: Copy>(siblings: &[T], ordinal: usize, scope: Scope) -> Result<T> {
    ordinal
        .checked_sub(1)
        .and_then(|index| siblings.get(index))
        .copied()
        .ok_or(TransformError::OutOfBounds {
            scope,
            ordinal,
            count: siblings.len(),
        })
}

/// Resolve the section at `ordinal` under `view`.
///
/// # Errors
/// Returns `OutOfBounds` when no section exists at that ordinal.
pub fn resolve_section(
    doc: &Document,
    view: ElementId,
    ordinal: usize,
    scope: Scope,
) -> Result<ElementId> {
    resolve_ordinal(&sections(doc, view), ordinal, scope)
}

/// Sibling to insert before for an insertion at `ordinal`.
///
/// `None` means append: either no ordinal was given or it lies past the
/// last sibling.
///
/// # Errors
/// Returns `OutOfBounds` (target scope) for ordinal 0.
pub fn insertion_anchor<T: Copy>(siblings: &[T], ordinal: Option<usize>) -> Result<Option<T>> {
    match ordinal {
        None => Ok(None),
        Some(0) => Err(TransformError::OutOfBounds {
            scope: Scope::Target,
            ordinal: 0,
            count: siblings.len(),
        }),
        Some(n) => Ok(siblings.get(n - 1).copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with_sections(count: usize) -> (Document, ElementId) {
        let mut doc = Document::new("property");
        let view = doc.root();
        for i in 1..=count {
            let section = doc.create_child(view, SECTION_TAG);
            doc.set_attr(section, "id", i.to_string());
        }
        doc.create_child(view, "actions");
        (doc, view)
    }

    #[test]
    fn test_resolve_section_first_and_last() {
        let (doc, view) = view_with_sections(10);
        let first = resolve_section(&doc, view, 1, Scope::Source).unwrap();
        let last = resolve_section(&doc, view, 10, Scope::Source).unwrap();
        assert_eq!(doc.attr(first, "id"), Some("1"));
        assert_eq!(doc.attr(last, "id"), Some("10"));
    }

    #[test]
    fn test_resolve_section_out_of_bounds() {
        let (doc, view) = view_with_sections(10);
        let err = resolve_section(&doc, view, 11, Scope::Source).unwrap_err();
        assert!(matches!(
            err,
            TransformError::OutOfBounds {
                scope: Scope::Source,
                ordinal: 11,
                count: 10
            }
        ));
    }

    #[test]
    fn test_resolve_section_zero() {
        let (doc, view) = view_with_sections(3);
        assert!(matches!(
            resolve_section(&doc, view, 0, Scope::Target),
            Err(TransformError::OutOfBounds {
                scope: Scope::Target,
                ..
            })
        ));
    }

    #[test]
    fn test_sections_ignore_other_children() {
        let (doc, view) = view_with_sections(2);
        assert_eq!(sections(&doc, view).len(), 2);
    }

    #[test]
    fn test_insertion_anchor() {
        let siblings = [10, 20, 30];
        assert_eq!(insertion_anchor(&siblings, None).unwrap(), None);
        assert_eq!(insertion_anchor(&siblings, Some(1)).unwrap(), Some(10));
        assert_eq!(insertion_anchor(&siblings, Some(3)).unwrap(), Some(30));
        assert_eq!(insertion_anchor(&siblings, Some(4)).unwrap(), None);
        assert!(insertion_anchor(&siblings, Some(0)).is_err());
    }
}
