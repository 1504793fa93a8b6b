//! Splitting instance documents into fixed-size chunks.

use crate::error::{Result, TransformError};
use crate::xml::{Document, ElementId};

/// Split the instances of a document into chunk documents.
///
/// Every chunk is a copy of the document without any instance, holding up
/// to `per_file` instances in their original order, appended to the parent
/// of the first instance.
///
/// # Errors
/// Returns `Split` when `per_file` is 0 or no instance is found.
pub fn split_instances(doc: &Document, instance_tag: &str, per_file: usize) -> Result<Vec<Document>> {
    if per_file == 0 {
        return Err(TransformError::Split(
            "instancesPerFile must be at least 1".to_string(),
        ));
    }

    let instance_path = format!("//{instance_tag}");
    let instances = doc.find_all(&instance_path)?;
    let Some(parent) = instances.first().and_then(|i| doc.parent(*i)) else {
        return Err(TransformError::Split(format!(
            "no '{instance_tag}' instance found"
        )));
    };
    let parent_route = route(doc, parent);

    let mut template = doc.copy();
    for instance in template.find_all(&instance_path)? {
        template.remove(instance);
    }

    let mut chunks = Vec::new();
    for batch in instances.chunks(per_file) {
        let mut chunk = template.copy();
        let target = follow(&chunk, &parent_route).ok_or_else(|| {
            TransformError::Split(format!("instance parent of '{instance_tag}' not found"))
        })?;
        for instance in batch {
            let clone = chunk.import(doc, *instance);
            chunk.append_child(target, clone);
        }
        chunks.push(chunk);
    }

    tracing::debug!(
        instances = instances.len(),
        chunks = chunks.len(),
        "split instances"
    );
    Ok(chunks)
}

/// File name of the chunk at 0-based `index`, e.g. `resources_001.xml`.
///
/// # Examples
/// ```
/// use xogmerge::split::chunk_file_name;
///
/// assert_eq!(chunk_file_name("res/resources.xml", 0), "res/resources_001.xml");
/// assert_eq!(chunk_file_name("resources", 11), "resources_012.xml");
/// ```
#[must_use]
pub fn chunk_file_name(path: &str, index: usize) -> String {
    let stem = path.strip_suffix(".xml").unwrap_or(path);
    format!("{stem}_{:03}.xml", index + 1)
}

/// Child indexes leading from the root to `id`.
fn route(doc: &Document, id: ElementId) -> Vec<usize> {
    let mut steps = Vec::new();
    let mut current = id;
    while let (Some(parent), Some(index)) = (doc.parent(current), doc.position_in_parent(current)) {
        steps.push(index);
        current = parent;
    }
    steps.reverse();
    steps
}

fn follow(doc: &Document, steps: &[usize]) -> Option<ElementId> {
    steps
        .iter()
        .try_fold(doc.root(), |current, index| doc.children(current).get(*index).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    const INSTANCES: &str = r#"
        <NikuDataBus>
            <Header action="write" objectType="customObjectInstance"/>
            <customObjectInstances objectCode="obj_sistema">
                <instance instanceCode="1"/>
                <instance instanceCode="2"/>
                <instance instanceCode="3"/>
                <instance instanceCode="4"/>
                <instance instanceCode="5"/>
            </customObjectInstances>
        </NikuDataBus>"#;

    fn codes(doc: &Document) -> Vec<String> {
        doc.find_all("//instance")
            .unwrap()
            .into_iter()
            .map(|i| doc.attr(i, "instanceCode").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_split_into_chunks() {
        let doc = Document::parse(INSTANCES).unwrap();
        let chunks = split_instances(&doc, "instance", 2).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(codes(&chunks[0]), vec!["1", "2"]);
        assert_eq!(codes(&chunks[1]), vec!["3", "4"]);
        assert_eq!(codes(&chunks[2]), vec!["5"]);
    }

    #[test]
    fn test_chunks_keep_template() {
        let doc = Document::parse(INSTANCES).unwrap();
        let chunks = split_instances(&doc, "instance", 10).unwrap();
        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert!(chunk.find("/NikuDataBus/Header").unwrap().is_some());
        let parent = chunk.find("//customObjectInstances").unwrap().unwrap();
        assert_eq!(chunk.attr(parent, "objectCode"), Some("obj_sistema"));
        assert_eq!(chunk.children(parent).len(), 5);
    }

    #[test]
    fn test_split_rejects_zero() {
        let doc = Document::parse(INSTANCES).unwrap();
        assert!(matches!(
            split_instances(&doc, "instance", 0),
            Err(TransformError::Split(_))
        ));
    }

    #[test]
    fn test_split_without_instances() {
        let doc = Document::parse(INSTANCES).unwrap();
        assert!(matches!(
            split_instances(&doc, "resource", 2),
            Err(TransformError::Split(_))
        ));
    }
}
