//! View transform: selection, partition moves and directive-driven merges.

use crate::config::{is_bulk_code, CodePattern};
use crate::directive::{DirectiveSet, TransformOptions};
use crate::error::{Result, TransformError};
use crate::partition::{assign_partition, find_view, matching_views, retain, views, ViewFilter};
use crate::registry::ObjectTransform;
use crate::strategy::{ElementStrategy, MergeContext, MergeStrategy, SectionStrategy};
use crate::xml::Document;

/// Transform for `views` items.
///
/// Without section or element directives the primary document is narrowed
/// to the selected views. With directives, the single addressed view of
/// the primary document is merged from the source catalog and kept alone.
#[derive(Debug, Default)]
pub struct ViewTransform;

impl ViewTransform {
    fn check_preconditions(directives: &DirectiveSet) -> Result<()> {
        if let (Some(target), None) = (&directives.target_partition, &directives.source_partition)
        {
            return Err(TransformError::TargetPartitionRequiresSource(target.clone()));
        }
        if is_bulk_code(&directives.code) && directives.has_edits() {
            return Err(TransformError::SectionsRequireSingleTarget(
                directives.code.clone(),
            ));
        }
        for section in &directives.sections {
            section.validate()?;
        }
        Ok(())
    }

    fn select(directives: &DirectiveSet, primary: &mut Document) -> Result<()> {
        let pattern = CodePattern::new(&directives.code)?;
        let filter = ViewFilter {
            object_code: directives.object_code.as_deref(),
            partition: directives.source_partition.as_deref(),
        };

        let all = views(primary)?;
        let selected = matching_views(primary, &pattern, filter)?;
        if selected.is_empty() && !is_bulk_code(&directives.code) {
            return Err(TransformError::ViewNotFoundInSource {
                code: directives.code.clone(),
                partition: directives.source_partition.clone(),
            });
        }

        let removed = retain(primary, &all, &selected);
        if let Some(target) = directives.target_partition.as_deref() {
            assign_partition(primary, &selected, target);
        }

        tracing::debug!(
            code = %pattern.as_str(),
            selected = selected.len(),
            removed,
            "selected views"
        );
        Ok(())
    }

    fn merge(
        directives: &DirectiveSet,
        primary: &mut Document,
        auxiliary: Option<&Document>,
        options: TransformOptions,
    ) -> Result<()> {
        let copy;
        let source = match auxiliary {
            Some(aux) => aux,
            None => {
                copy = primary.copy();
                &copy
            }
        };

        let object_code = directives.object_code.as_deref();
        let source_partition = directives.source_partition.as_deref();
        let target_partition = directives.target_partition.as_deref().or(source_partition);

        let source_view = find_view(
            source,
            &directives.code,
            ViewFilter {
                object_code,
                partition: source_partition,
            },
        )?
        .ok_or_else(|| TransformError::ViewNotFoundInSource {
            code: directives.code.clone(),
            partition: source_partition.map(str::to_string),
        })?;

        let target_view = find_view(
            primary,
            &directives.code,
            ViewFilter {
                object_code,
                partition: target_partition,
            },
        )?
        .ok_or_else(|| TransformError::ViewNotFoundInTarget {
            code: directives.code.clone(),
            partition: target_partition.map(str::to_string),
        })?;

        let all = views(primary)?;
        let mut ctx = MergeContext::new(primary, target_view, source, source_view, options);
        SectionStrategy::default().apply_all(&mut ctx, &directives.sections)?;
        ElementStrategy.apply_all(&mut ctx, &directives.elements)?;

        retain(primary, &all, &[target_view]);
        Ok(())
    }
}

impl ObjectTransform for ViewTransform {
    fn name(&self) -> &'static str {
        "view"
    }

    fn apply(
        &self,
        directives: &DirectiveSet,
        primary: &mut Document,
        auxiliary: Option<&Document>,
        options: TransformOptions,
    ) -> Result<()> {
        Self::check_preconditions(directives)?;

        if directives.has_edits() {
            Self::merge(directives, primary, auxiliary, options)
        } else {
            Self::select(directives, primary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CODE_ATTR, PARTITION_ATTR};
    use crate::directive::{ObjectType, SectionAction, SectionDirective};

    const VIEWS: &str = r#"
        <NikuDataBus>
            <contentPack>
                <views>
                    <property code="obj_sistema.auditoria" objectCode="obj_sistema" partitionCode="partition10">
                        <section code="a1"/>
                        <section code="a2"/>
                    </property>
                    <property code="obj_sistema.auditoria" objectCode="obj_sistema" partitionCode="partition20">
                        <section code="b1"/>
                    </property>
                    <list code="odf.obj_sistemaList" objectCode="obj_sistema" partitionCode="partition10"/>
                </views>
            </contentPack>
        </NikuDataBus>"#;

    fn directives(code: &str) -> DirectiveSet {
        let mut set = DirectiveSet::new(ObjectType::View, code);
        set.object_code = Some("obj_sistema".to_string());
        set
    }

    fn apply(set: &DirectiveSet, primary: &mut Document, aux: Option<&Document>) -> Result<()> {
        ViewTransform.apply(set, primary, aux, TransformOptions::default())
    }

    #[test]
    fn test_target_partition_requires_source() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let mut set = directives("*");
        set.target_partition = Some("partition10".to_string());
        assert!(matches!(
            apply(&set, &mut doc, None),
            Err(TransformError::TargetPartitionRequiresSource(_))
        ));
    }

    #[test]
    fn test_bulk_code_with_sections_is_rejected() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let mut set = directives("*");
        set.sections
            .push(SectionDirective::new(SectionAction::Remove).target(1));
        assert!(matches!(
            apply(&set, &mut doc, None),
            Err(TransformError::SectionsRequireSingleTarget(_))
        ));
    }

    #[test]
    fn test_select_and_move_partition() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let mut set = directives("*");
        set.source_partition = Some("partition10".to_string());
        set.target_partition = Some("partition30".to_string());
        apply(&set, &mut doc, None).unwrap();

        let remaining = views(&doc).unwrap();
        assert_eq!(remaining.len(), 2);
        for view in remaining {
            assert_eq!(doc.attr(view, PARTITION_ATTR), Some("partition30"));
        }
    }

    #[test]
    fn test_select_single_missing_view() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let set = directives("obj_sistema.missing");
        assert!(matches!(
            apply(&set, &mut doc, None),
            Err(TransformError::ViewNotFoundInSource { .. })
        ));
    }

    #[test]
    fn test_merge_between_partitions_of_same_document() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let mut set = directives("obj_sistema.auditoria");
        set.source_partition = Some("partition10".to_string());
        set.target_partition = Some("partition20".to_string());
        set.sections
            .push(SectionDirective::new(SectionAction::Insert).source(2).target(1));
        apply(&set, &mut doc, None).unwrap();

        let remaining = views(&doc).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(doc.attr(remaining[0], PARTITION_ATTR), Some("partition20"));
        let codes: Vec<_> = doc
            .children(remaining[0])
            .iter()
            .map(|s| doc.attr(*s, CODE_ATTR).unwrap_or_default().to_string())
            .collect();
        assert_eq!(codes, vec!["a2", "b1"]);
    }

    #[test]
    fn test_merge_missing_target_partition() {
        let mut doc = Document::parse(VIEWS).unwrap();
        let mut set = directives("obj_sistema.auditoria");
        set.source_partition = Some("partition10".to_string());
        set.target_partition = Some("partition99".to_string());
        set.sections
            .push(SectionDirective::new(SectionAction::Remove).target(1));
        let err = apply(&set, &mut doc, None).unwrap_err();
        assert!(matches!(
            err,
            TransformError::ViewNotFoundInTarget { partition: Some(p), .. } if p == "partition99"
        ));
    }
}
