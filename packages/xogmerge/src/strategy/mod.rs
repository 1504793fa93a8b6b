//! Merge strategies for section, field and element directives.
//!
//! Each strategy applies one kind of directive to a live target document,
//! reading content from a source document. Content taken from the source is
//! always imported as a fresh subtree before it is attached to the target.

mod element;
mod field;
mod section;

pub use element::ElementStrategy;
pub use field::FieldStrategy;
pub use section::SectionStrategy;

use crate::directive::TransformOptions;
use crate::error::Result;
use crate::xml::{Document, ElementId};

/// Documents and scope elements a strategy operates on.
///
/// `target_scope` and `source_scope` are the elements directives are
/// resolved against: views for section and element directives, sections
/// for field directives.
pub struct MergeContext<'a> {
    pub target: &'a mut Document,
    pub target_scope: ElementId,
    pub source: &'a Document,
    pub source_scope: ElementId,
    pub options: TransformOptions,
}

impl<'a> MergeContext<'a> {
    #[must_use]
    pub fn new(
        target: &'a mut Document,
        target_scope: ElementId,
        source: &'a Document,
        source_scope: ElementId,
        options: TransformOptions,
    ) -> Self {
        Self {
            target,
            target_scope,
            source,
            source_scope,
            options,
        }
    }

    /// Context over the same documents with narrower scope elements.
    pub fn scoped(&mut self, target_scope: ElementId, source_scope: ElementId) -> MergeContext<'_> {
        MergeContext {
            target: &mut *self.target,
            target_scope,
            source: self.source,
            source_scope,
            options: self.options,
        }
    }
}

/// A strategy applying one kind of directive.
pub trait MergeStrategy {
    /// Directive type handled by this strategy.
    type Directive;

    /// Apply a single directive to the target document.
    ///
    /// # Errors
    /// Returns the directive-specific error; the target may then hold
    /// partial edits and should be discarded.
    fn apply(&self, ctx: &mut MergeContext<'_>, directive: &Self::Directive) -> Result<()>;

    /// Check a directive before any directive of the batch is applied.
    ///
    /// # Errors
    /// Returns the first precondition violation.
    fn validate(&self, _directive: &Self::Directive) -> Result<()> {
        Ok(())
    }

    /// Check a directive against the source side of the context.
    ///
    /// No directive mutates the source, so every source lookup of a batch
    /// can be resolved before the target is touched.
    ///
    /// # Errors
    /// Returns the first source position or code that does not resolve.
    fn check_source(
        &self,
        _source: &Document,
        _source_scope: ElementId,
        _directive: &Self::Directive,
    ) -> Result<()> {
        Ok(())
    }

    /// Validate every directive and check it against the source, then
    /// apply them in order.
    ///
    /// # Errors
    /// Returns the first validation, source or application error.
    fn apply_all(&self, ctx: &mut MergeContext<'_>, directives: &[Self::Directive]) -> Result<()> {
        for directive in directives {
            self.validate(directive)?;
        }
        for directive in directives {
            self.check_source(ctx.source, ctx.source_scope, directive)?;
        }
        for directive in directives {
            self.apply(ctx, directive)?;
        }
        Ok(())
    }
}
