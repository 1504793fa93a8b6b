//! Partition-qualified selection and partition rewriting.
//!
//! The same logical view or lookup can exist once per partition; the
//! `partitionCode` attribute tells the variants apart. These helpers select
//! variants by code, object code and partition, and rewrite the attribute
//! when content moves to another partition.

use crate::config::{
    CodePattern, CODE_ATTR, LOOKUPS_TAG, OBJECT_CODE_ATTR, PARTITION_ATTR, VIEWS_TAG,
};
use crate::error::Result;
use crate::xml::{Document, ElementId};


/// Selection criteria for views.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewFilter<'a> {
    pub object_code: Option<&'a str>,
    pub partition: Option<&'a str>,
}

impl ViewFilter<'_> {
    fn accepts(&self, doc: &Document, view: ElementId) -> bool {
        self.object_code
            .is_none_or(|oc| doc.attr(view, OBJECT_CODE_ATTR) == Some(oc))
            && self
                .partition
                .is_none_or(|p| doc.attr(view, PARTITION_ATTR) == Some(p))
    }
}

/// All views of a document.
///
/// # Errors
/// Only fails if the built-in view path cannot be parsed.
pub fn views(doc: &Document) -> Result<Vec<ElementId>> {
    doc.find_all(&format!("//{VIEWS_TAG}/*[@{CODE_ATTR}]"))
}

/// All lookups of a document.
///
/// # Errors
/// Only fails if the built-in lookup path cannot be parsed.
pub fn lookups(doc: &Document) -> Result<Vec<ElementId>> {
    doc.find_all(&format!("//{LOOKUPS_TAG}/*[@{CODE_ATTR}]"))
}

/// Views whose code matches `pattern` and that pass `filter`.
///
/// # Errors
/// Only fails if the built-in view path cannot be parsed.
pub fn matching_views(
    doc: &Document,
    pattern: &CodePattern,
    filter: ViewFilter<'_>,
) -> Result<Vec<ElementId>> {
    Ok(views(doc)?
        .into_iter()
        .filter(|v| doc.attr(*v, CODE_ATTR).is_some_and(|c| pattern.matches(c)))
        .filter(|v| filter.accepts(doc, *v))
        .collect())
}

/// First view with exactly `code` that passes `filter`.
///
/// # Errors
/// Only fails if the built-in view path cannot be parsed.
pub fn find_view(doc: &Document, code: &str, filter: ViewFilter<'_>) -> Result<Option<ElementId>> {
    Ok(views(doc)?
        .into_iter()
        .find(|v| doc.attr(*v, CODE_ATTR) == Some(code) && filter.accepts(doc, *v)))
}

/// Detach every candidate that is not in `keep`.
///
/// Returns the number of detached elements.
pub fn retain(doc: &mut Document, candidates: &[ElementId], keep: &[ElementId]) -> usize {
    let mut removed = 0;
    for candidate in candidates {
        if !keep.contains(candidate) {
            doc.remove(*candidate);
            removed += 1;
        }
    }
    removed
}

/// Set `partitionCode` to `partition` on each element.
pub fn assign_partition(doc: &mut Document, elements: &[ElementId], partition: &str) {
    for element in elements {
        doc.set_attr(*element, PARTITION_ATTR, partition);
    }
}

/// Rewrite `partitionCode` to `to` on an element and its descendants.
///
/// With `from` set only attributes holding that value change; with `None`
/// every `partitionCode` is rewritten whatever it holds.
///
/// Returns the number of rewritten attributes.
pub fn rewrite_partition(
    doc: &mut Document,
    element: ElementId,
    from: Option<&str>,
    to: &str,
) -> usize {
    let mut targets = vec![element];
    targets.extend(doc.descendants(element));

    let mut rewritten = 0;
    for id in targets {
        let matches = doc
            .attr(id, PARTITION_ATTR)
            .is_some_and(|current| from.is_none_or(|f| f == current));
        if matches {
            doc.set_attr(id, PARTITION_ATTR, to);
            rewritten += 1;
        }
    }
    rewritten
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWS: &str = r#"
        <NikuDataBus>
            <contentPack>
                <views>
                    <property code="obj_sistema.auditoria" objectCode="obj_sistema" partitionCode="partition10"/>
                    <property code="obj_sistema.auditoria" objectCode="obj_sistema" partitionCode="partition20"/>
                    <property code="odf.obj_sistemaCreate" objectCode="obj_sistema" partitionCode="partition10"/>
                    <list code="odf.obj_sistemaList" objectCode="obj_sistema"/>
                    <list code="odf.other" objectCode="other"/>
                </views>
            </contentPack>
        </NikuDataBus>"#;

    fn codes(doc: &Document, ids: &[ElementId]) -> Vec<String> {
        ids.iter()
            .map(|id| doc.attr(*id, CODE_ATTR).unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_matching_views_by_object_code() {
        let doc = Document::parse(VIEWS).unwrap();
        let pattern = CodePattern::new("*").unwrap();
        let filter = ViewFilter {
            object_code: Some("obj_sistema"),
            partition: None,
        };
        assert_eq!(matching_views(&doc, &pattern, filter).unwrap().len(), 4);
    }

    #[test]
    fn test_matching_views_by_partition_and_pattern() {
        let doc = Document::parse(VIEWS).unwrap();
        let pattern = CodePattern::new("*obj_sistemaCreate").unwrap();
        let filter = ViewFilter {
            object_code: None,
            partition: Some("partition10"),
        };
        let found = matching_views(&doc, &pattern, filter).unwrap();
        assert_eq!(codes(&doc, &found), vec!["odf.obj_sistemaCreate"]);
    }

    #[test]
    fn test_find_view_by_partition() {
        let doc = Document::parse(VIEWS).unwrap();
        let filter = ViewFilter {
            object_code: None,
            partition: Some("partition20"),
        };
        let view = find_view(&doc, "obj_sistema.auditoria", filter)
            .unwrap()
            .unwrap();
        assert_eq!(doc.attr(view, PARTITION_ATTR), Some("partition20"));

        let missing = ViewFilter {
            object_code: None,
            partition: Some("partition30"),
        };
        assert!(find_view(&doc, "obj_sistema.auditoria", missing)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_retain_and_assign() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let all = views(&doc).unwrap();
        let keep = vec![all[0]];
        assert_eq!(retain(&mut doc, &all, &keep), 4);
        assign_partition(&mut doc, &keep, "partition30");

        let remaining = views(&doc).unwrap();
        assert_eq!(remaining, keep);
        assert_eq!(doc.attr(remaining[0], PARTITION_ATTR), Some("partition30"));
    }

    #[test]
    fn test_rewrite_partition_only_matching_values() {
        let mut doc = Document::parse(
            r#"<lookups>
                <staticLookup code="LOOKUP_CAS_XOG" partitionCode="NIKU.ROOT">
                    <lookupValues>
                        <lookupValue code="A" partitionCode="NIKU.ROOT"/>
                        <lookupValue code="B" partitionCode="partition10"/>
                    </lookupValues>
                </staticLookup>
            </lookups>"#,
        )
        .unwrap();
        let lookup = lookups(&doc).unwrap()[0];
        assert_eq!(rewrite_partition(&mut doc, lookup, Some("NIKU.ROOT"), "partition20"), 2);
        assert!(doc
            .find("//lookupValue[@code='B'][@partitionCode='partition10']")
            .unwrap()
            .is_some());
        assert_eq!(
            doc.find_all("//*[@partitionCode='partition20']").unwrap().len(),
            2
        );
    }

    #[test]
    fn test_rewrite_partition_without_source_rewrites_all() {
        let mut doc = Document::parse(
            r#"<lookups>
                <staticLookup code="LOOKUP_CAS_XOG">
                    <lookupValue code="A" partitionCode="NIKU.ROOT"/>
                    <lookupValue code="B" partitionCode="partition10"/>
                    <lookupValue code="C"/>
                </staticLookup>
            </lookups>"#,
        )
        .unwrap();
        let lookup = lookups(&doc).unwrap()[0];
        assert_eq!(rewrite_partition(&mut doc, lookup, None, "partition20"), 2);
        assert_eq!(
            doc.find_all("//*[@partitionCode='partition20']").unwrap().len(),
            2
        );
        let c = doc.find("//lookupValue[@code='C']").unwrap().unwrap();
        assert_eq!(doc.attr(c, PARTITION_ATTR), None);
    }

    #[test]
    fn test_views_and_lookups_by_container_tag() {
        let doc = Document::parse(
            r#"<NikuDataBus>
                <objects>
                    <views>
                        <property code="nested.view"/>
                        <section/>
                    </views>
                </objects>
                <lookups>
                    <staticLookup code="LOOKUP_A"/>
                    <lookupValues/>
                </lookups>
                <other>
                    <property code="not.a.view"/>
                </other>
            </NikuDataBus>"#,
        )
        .unwrap();
        assert_eq!(codes(&doc, &views(&doc).unwrap()), vec!["nested.view"]);
        assert_eq!(codes(&doc, &lookups(&doc).unwrap()), vec!["LOOKUP_A"]);
    }
}
