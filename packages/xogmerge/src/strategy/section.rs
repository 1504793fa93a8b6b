//! Section insert, replace, remove and update.

use super::{FieldStrategy, MergeContext, MergeStrategy};
use crate::directive::{SectionAction, SectionDirective};
use crate::error::{Result, Scope, TransformError};
use crate::position::{insertion_anchor, resolve_section, sections};
use crate::xml::{Document, ElementId};

/// Applies section directives between a source and a target view.
#[derive(Debug, Default)]
pub struct SectionStrategy {
    fields: FieldStrategy,
}

impl SectionStrategy {
    fn source_position(directive: &SectionDirective) -> Result<usize> {
        directive
            .source_position
            .ok_or(TransformError::MissingRequiredPosition {
                action: directive.action.as_str(),
                position: "sourcePosition",
            })
    }

    fn target_position(directive: &SectionDirective) -> Result<usize> {
        directive
            .target_position
            .ok_or(TransformError::MissingRequiredPosition {
                action: directive.action.as_str(),
                position: "targetPosition",
            })
    }

    fn insert(&self, ctx: &mut MergeContext<'_>, directive: &SectionDirective) -> Result<()> {
        let source = resolve_section(
            ctx.source,
            ctx.source_scope,
            Self::source_position(directive)?,
            Scope::Source,
        )?;
        let existing = sections(ctx.target, ctx.target_scope);
        let anchor = insertion_anchor(&existing, directive.target_position)?;

        let clone = ctx.target.import(ctx.source, source);
        match (anchor, existing.last()) {
            (Some(anchor), _) => ctx.target.insert_before(anchor, clone),
            // Append right after the last section so sections stay together
            (None, Some(&last)) => {
                let index = ctx.target.position_in_parent(last).map_or(0, |i| i + 1);
                ctx.target.insert_child(ctx.target_scope, index, clone);
            }
            (None, None) => ctx.target.append_child(ctx.target_scope, clone),
        }
        Ok(())
    }

    fn replace(&self, ctx: &mut MergeContext<'_>, directive: &SectionDirective) -> Result<()> {
        let source = resolve_section(
            ctx.source,
            ctx.source_scope,
            Self::source_position(directive)?,
            Scope::Source,
        )?;
        let target = resolve_section(
            ctx.target,
            ctx.target_scope,
            Self::target_position(directive)?,
            Scope::Target,
        )?;
        let clone = ctx.target.import(ctx.source, source);
        ctx.target.replace(target, clone);
        Ok(())
    }

    fn remove(&self, ctx: &mut MergeContext<'_>, directive: &SectionDirective) -> Result<()> {
        let target = resolve_section(
            ctx.target,
            ctx.target_scope,
            Self::target_position(directive)?,
            Scope::Target,
        )?;
        ctx.target.remove(target);
        Ok(())
    }

    fn update(&self, ctx: &mut MergeContext<'_>, directive: &SectionDirective) -> Result<()> {
        let source_position = Self::source_position(directive)?;
        let target_position = Self::target_position(directive)?;
        if directive.fields.is_empty() {
            return Err(TransformError::EmptyUpdateFields {
                source_position,
                target_position,
            });
        }

        let source = resolve_section(ctx.source, ctx.source_scope, source_position, Scope::Source)?;
        let target = resolve_section(ctx.target, ctx.target_scope, target_position, Scope::Target)?;

        let mut section_ctx = ctx.scoped(target, source);
        self.fields.apply_all(&mut section_ctx, &directive.fields)
    }
}

impl MergeStrategy for SectionStrategy {
    type Directive = SectionDirective;

    fn validate(&self, directive: &SectionDirective) -> Result<()> {
        directive.validate()
    }

    fn check_source(
        &self,
        source: &Document,
        source_scope: ElementId,
        directive: &SectionDirective,
    ) -> Result<()> {
        let Some(position) = directive.source_position else {
            return Ok(());
        };
        if directive.action == SectionAction::Remove {
            return Ok(());
        }
        let section = resolve_section(source, source_scope, position, Scope::Source)?;
        if directive.action == SectionAction::Update {
            for field in &directive.fields {
                self.fields.check_source(source, section, field)?;
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut MergeContext<'_>, directive: &SectionDirective) -> Result<()> {
        match directive.action {
            SectionAction::Insert => self.insert(ctx, directive)?,
            SectionAction::Replace => self.replace(ctx, directive)?,
            SectionAction::Remove => self.remove(ctx, directive)?,
            SectionAction::Update => self.update(ctx, directive)?,
        }
        tracing::debug!(
            action = directive.action.as_str(),
            source_position = ?directive.source_position,
            target_position = ?directive.target_position,
            "applied section directive"
        );
        Ok(())
    }
}
