//! Field placement inside the two columns of a section.

use super::{MergeContext, MergeStrategy};
use crate::config::{COLUMN_TAG, FIELD_CODE_ATTR, FIELD_TAG, SEQUENCE_ATTR};
use crate::directive::{AnchorMode, Column, FieldDirective};
use crate::error::{Result, Scope, TransformError};
use crate::xml::{Document, ElementId};

/// Places, repositions and removes fields of one section.
///
/// The context scopes are the target section (mutated) and the source
/// section (field catalog). Directives see the effects of the ones applied
/// before them.
#[derive(Debug, Default)]
pub struct FieldStrategy;

impl MergeStrategy for FieldStrategy {
    type Directive = FieldDirective;

    fn validate(&self, directive: &FieldDirective) -> Result<()> {
        if !directive.remove && directive.column.is_none() {
            return Err(TransformError::InvalidColumn(format!(
                "(missing for field '{}')",
                directive.code
            )));
        }
        Ok(())
    }

    fn check_source(
        &self,
        source: &Document,
        source_scope: ElementId,
        directive: &FieldDirective,
    ) -> Result<()> {
        if directive.remove || find_field(source, source_scope, &directive.code).is_some() {
            return Ok(());
        }
        Err(TransformError::UnknownFieldCode {
            code: directive.code.clone(),
            scope: Scope::Source,
        })
    }

    fn apply(&self, ctx: &mut MergeContext<'_>, directive: &FieldDirective) -> Result<()> {
        if directive.remove {
            return remove_field(ctx, &directive.code);
        }
        self.validate(directive)?;
        let column = directive
            .column
            .ok_or_else(|| TransformError::InvalidColumn(String::new()))?;

        let source_field = find_field(ctx.source, ctx.source_scope, &directive.code).ok_or_else(
            || TransformError::UnknownFieldCode {
                code: directive.code.clone(),
                scope: Scope::Source,
            },
        )?;
        let clone = ctx.target.import(ctx.source, source_field);

        // Repositioning: the section ends up with exactly one field per code
        while let Some(existing) = find_field(ctx.target, ctx.target_scope, &directive.code) {
            ctx.target.remove(existing);
        }

        let destination = ensure_column(ctx.target, ctx.target_scope, column);
        let anchor = directive
            .insert_before
            .as_deref()
            .map(|code| (code, find_in_column(ctx.target, destination, code)));

        match anchor {
            Some((_, Some(anchor))) => ctx.target.insert_before(anchor, clone),
            Some((code, None)) => {
                if ctx.options.anchor_mode == AnchorMode::Strict {
                    return Err(TransformError::UnknownAnchorCode(code.to_string()));
                }
                tracing::warn!(
                    field = %directive.code,
                    anchor = %code,
                    "insertBefore anchor not found in destination column, appending"
                );
                ctx.target.append_child(destination, clone);
            }
            None => ctx.target.append_child(destination, clone),
        }

        tracing::debug!(field = %directive.code, column = ?column, "placed field");
        Ok(())
    }
}

fn remove_field(ctx: &mut MergeContext<'_>, code: &str) -> Result<()> {
    let field = find_field(ctx.target, ctx.target_scope, code).ok_or_else(|| {
        TransformError::UnknownFieldCode {
            code: code.to_string(),
            scope: Scope::Target,
        }
    })?;
    ctx.target.remove(field);
    tracing::debug!(field = %code, "removed field");
    Ok(())
}

/// Field with `code` anywhere inside a section.
fn find_field(doc: &Document, section: ElementId, code: &str) -> Option<ElementId> {
    doc.find_descendant_by_attr(section, FIELD_TAG, FIELD_CODE_ATTR, code)
}

fn find_in_column(doc: &Document, column: ElementId, code: &str) -> Option<ElementId> {
    doc.children_named(column, FIELD_TAG)
        .find(|f| doc.attr(*f, FIELD_CODE_ATTR) == Some(code))
}

fn find_column(doc: &Document, section: ElementId, column: Column) -> Option<ElementId> {
    doc.children_named(section, COLUMN_TAG)
        .find(|c| doc.attr(*c, SEQUENCE_ATTR) == Some(column.sequence()))
}

/// Column container of a section, created when missing.
///
/// A new left column goes before an existing right column.
fn ensure_column(doc: &mut Document, section: ElementId, column: Column) -> ElementId {
    if let Some(existing) = find_column(doc, section, column) {
        return existing;
    }

    let created = doc.create_element(COLUMN_TAG);
    doc.set_attr(created, SEQUENCE_ATTR, column.sequence());
    match (column, find_column(doc, section, Column::Right)) {
        (Column::Left, Some(right)) => doc.insert_before(right, created),
        _ => doc.append_child(section, created),
    }
    created
}
