//! Anchor-relative insertion and removal of actions and action groups.

use super::{MergeContext, MergeStrategy};
use crate::config::{ACTIONS_TAG, CODE_ATTR, GROUP_TAG};
use crate::directive::{ElementAction, ElementDirective, ElementType};
use crate::error::{Result, Scope, TransformError};
use crate::xml::{Document, ElementId};

/// Applies element directives to the action catalog of a view.
///
/// The context scopes are the target and source views.
#[derive(Debug, Default)]
pub struct ElementStrategy;

impl ElementStrategy {
    fn insert(&self, ctx: &mut MergeContext<'_>, directive: &ElementDirective) -> Result<()> {
        let tag = directive.element_type.tag();
        let source = find_in_catalog(ctx.source, ctx.source_scope, tag, &directive.code)
            .ok_or_else(|| TransformError::UnknownFieldCode {
                code: directive.code.clone(),
                scope: Scope::Source,
            })?;

        if find_in_catalog(ctx.target, ctx.target_scope, tag, &directive.code).is_some() {
            tracing::debug!(code = %directive.code, "element already present in target, skipping");
            return Ok(());
        }

        let anchor = match directive.insert_before.as_deref() {
            Some(anchor_code) => Some(
                find_in_catalog(ctx.target, ctx.target_scope, tag, anchor_code)
                    .ok_or_else(|| TransformError::UnknownAnchorCode(anchor_code.to_string()))?,
            ),
            None => None,
        };

        let catalog = ensure_catalog(ctx.target, ctx.target_scope);
        let clone = ctx.target.import(ctx.source, source);

        if let Some(anchor) = anchor {
            ctx.target.insert_before(anchor, clone);
            return Ok(());
        }

        let parent = match directive.element_type {
            ElementType::Action => source_group(ctx.source, source)
                .and_then(|group| find_in_catalog(ctx.target, ctx.target_scope, GROUP_TAG, group))
                .unwrap_or(catalog),
            ElementType::ActionGroup => catalog,
        };
        ctx.target.append_child(parent, clone);
        Ok(())
    }

    fn remove(&self, ctx: &mut MergeContext<'_>, directive: &ElementDirective) -> Result<()> {
        let tag = directive.element_type.tag();
        let target = find_in_catalog(ctx.target, ctx.target_scope, tag, &directive.code)
            .ok_or_else(|| TransformError::UnknownTargetCode(directive.code.clone()))?;
        ctx.target.remove(target);
        Ok(())
    }
}

impl MergeStrategy for ElementStrategy {
    type Directive = ElementDirective;

    fn check_source(
        &self,
        source: &Document,
        source_scope: ElementId,
        directive: &ElementDirective,
    ) -> Result<()> {
        if directive.action == ElementAction::Remove
            || find_in_catalog(source, source_scope, directive.element_type.tag(), &directive.code)
                .is_some()
        {
            return Ok(());
        }
        Err(TransformError::UnknownFieldCode {
            code: directive.code.clone(),
            scope: Scope::Source,
        })
    }

    fn apply(&self, ctx: &mut MergeContext<'_>, directive: &ElementDirective) -> Result<()> {
        match directive.action {
            ElementAction::Insert => self.insert(ctx, directive)?,
            ElementAction::Remove => self.remove(ctx, directive)?,
        }
        tracing::debug!(
            element_type = ?directive.element_type,
            code = %directive.code,
            action = ?directive.action,
            "applied element directive"
        );
        Ok(())
    }
}

/// Element of kind `tag` with `code` anywhere in the view's action catalog.
fn find_in_catalog(doc: &Document, view: ElementId, tag: &str, code: &str) -> Option<ElementId> {
    let catalog = doc.first_child_named(view, ACTIONS_TAG)?;
    doc.find_descendant_by_attr(catalog, tag, CODE_ATTR, code)
}

/// Code of the group directly containing an element, if any.
fn source_group(doc: &Document, element: ElementId) -> Option<&str> {
    let parent = doc.parent(element)?;
    if doc.tag(parent) == GROUP_TAG {
        doc.attr(parent, CODE_ATTR)
    } else {
        None
    }
}

fn ensure_catalog(doc: &mut Document, view: ElementId) -> ElementId {
    match doc.first_child_named(view, ACTIONS_TAG) {
        Some(catalog) => catalog,
        None => doc.create_child(view, ACTIONS_TAG),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::TransformOptions;

    const SOURCE: &str = r#"
        <propertySet code="obj_sistemaProperties">
            <actions>
                <action code="odf_XMLExportobj_sistema"/>
                <action code="odf_view_export"/>
                <group code="general">
                    <action code="rally_full_sync"/>
                </group>
                <group code="reports">
                    <action code="run_report"/>
                </group>
            </actions>
        </propertySet>"#;

    const TARGET: &str = r#"
        <propertySet code="obj_sistemaProperties">
            <actions>
                <action code="odf_view_export"/>
                <group code="general"/>
            </actions>
        </propertySet>"#;

    fn run(target: &mut Document, source: &Document, directives: &[ElementDirective]) -> Result<()> {
        let scope = target.root();
        let mut ctx = MergeContext::new(
            target,
            scope,
            source,
            source.root(),
            TransformOptions::default(),
        );
        ElementStrategy.apply_all(&mut ctx, directives)
    }

    fn catalog_codes(doc: &Document, parent: ElementId) -> Vec<String> {
        doc.children(parent)
            .iter()
            .map(|c| doc.attr(*c, CODE_ATTR).unwrap_or_default().to_string())
            .collect()
    }

    fn catalog(doc: &Document) -> ElementId {
        doc.first_child_named(doc.root(), ACTIONS_TAG).unwrap()
    }

    #[test]
    fn test_insert_before_anchor() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        run(
            &mut target,
            &source,
            &[ElementDirective::new(
                ElementType::Action,
                "odf_XMLExportobj_sistema",
                ElementAction::Insert,
            )
            .before("odf_view_export")],
        )
        .unwrap();
        assert_eq!(
            catalog_codes(&target, catalog(&target)),
            vec!["odf_XMLExportobj_sistema", "odf_view_export", "general"]
        );
    }

    #[test]
    fn test_insert_is_idempotent() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        let directive = ElementDirective::new(
            ElementType::Action,
            "odf_XMLExportobj_sistema",
            ElementAction::Insert,
        );
        run(&mut target, &source, &[directive.clone()]).unwrap();
        let first = target.to_string();
        run(&mut target, &source, &[directive]).unwrap();
        assert_eq!(target.to_string(), first);
    }

    #[test]
    fn test_insert_action_into_matching_group() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        run(
            &mut target,
            &source,
            &[ElementDirective::new(
                ElementType::Action,
                "rally_full_sync",
                ElementAction::Insert,
            )],
        )
        .unwrap();
        let group = target
            .find("//actions/group[@code='general']")
            .unwrap()
            .unwrap();
        assert_eq!(catalog_codes(&target, group), vec!["rally_full_sync"]);
    }

    #[test]
    fn test_insert_action_without_target_group_goes_to_root() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        run(
            &mut target,
            &source,
            &[ElementDirective::new(ElementType::Action, "run_report", ElementAction::Insert)],
        )
        .unwrap();
        assert_eq!(
            catalog_codes(&target, catalog(&target)),
            vec!["odf_view_export", "general", "run_report"]
        );
    }

    #[test]
    fn test_insert_group_with_children() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        run(
            &mut target,
            &source,
            &[ElementDirective::new(
                ElementType::ActionGroup,
                "reports",
                ElementAction::Insert,
            )
            .before("general")],
        )
        .unwrap();
        assert_eq!(
            catalog_codes(&target, catalog(&target)),
            vec!["odf_view_export", "reports", "general"]
        );
        assert!(target
            .find("//group[@code='reports']/action[@code='run_report']")
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_insert_unknown_source_code_checked_first() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        let err = run(
            &mut target,
            &source,
            &[
                ElementDirective::new(ElementType::Action, "missing", ElementAction::Insert)
                    .before("also_missing"),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnknownFieldCode {
                scope: Scope::Source,
                ..
            }
        ));
    }

    #[test]
    fn test_insert_unknown_anchor() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        let err = run(
            &mut target,
            &source,
            &[ElementDirective::new(
                ElementType::Action,
                "odf_XMLExportobj_sistema",
                ElementAction::Insert,
            )
            .before("general")],
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::UnknownAnchorCode(code) if code == "general"));
    }

    #[test]
    fn test_insert_creates_catalog() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(r#"<propertySet code="x"/>"#).unwrap();
        run(
            &mut target,
            &source,
            &[ElementDirective::new(
                ElementType::Action,
                "odf_view_export",
                ElementAction::Insert,
            )],
        )
        .unwrap();
        assert_eq!(
            catalog_codes(&target, catalog(&target)),
            vec!["odf_view_export"]
        );
    }

    #[test]
    fn test_remove() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        run(
            &mut target,
            &source,
            &[ElementDirective::new(
                ElementType::ActionGroup,
                "general",
                ElementAction::Remove,
            )],
        )
        .unwrap();
        assert_eq!(
            catalog_codes(&target, catalog(&target)),
            vec!["odf_view_export"]
        );
    }

    #[test]
    fn test_remove_unknown_code() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        let err = run(
            &mut target,
            &source,
            &[ElementDirective::new(ElementType::Action, "missing", ElementAction::Remove)],
        )
        .unwrap_err();
        assert!(matches!(err, TransformError::UnknownTargetCode(code) if code == "missing"));
    }

    #[test]
    fn test_unknown_source_code_leaves_target_untouched() {
        let source = Document::parse(SOURCE).unwrap();
        let mut target = Document::parse(TARGET).unwrap();
        let before = target.to_string();
        let err = run(
            &mut target,
            &source,
            &[
                ElementDirective::new(ElementType::ActionGroup, "reports", ElementAction::Insert),
                ElementDirective::new(ElementType::Action, "missing", ElementAction::Insert),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TransformError::UnknownFieldCode {
                scope: Scope::Source,
                ..
            }
        ));
        assert_eq!(target.to_string(), before);
    }
}
