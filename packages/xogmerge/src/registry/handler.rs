//! Object transform trait definition.

use crate::directive::{DirectiveSet, TransformOptions};
use crate::error::Result;
use crate::xml::Document;

/// Trait for object-type transforms.
///
/// A transform mutates the primary document in place according to a
/// directive set. The auxiliary document, when present, is the catalog
/// content is copied from; it is never mutated.
pub trait ObjectTransform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply the directives.
    ///
    /// # Arguments
    /// * `directives` - What to select and which edits to make
    /// * `primary` - Document that is transformed and later written
    /// * `auxiliary` - Optional source catalog
    /// * `options` - Runtime options
    ///
    /// # Errors
    /// Returns the first failing precondition or edit. The primary document
    /// may hold partial edits afterwards and should be discarded.
    fn apply(
        &self,
        directives: &DirectiveSet,
        primary: &mut Document,
        auxiliary: Option<&Document>,
        options: TransformOptions,
    ) -> Result<()>;
}
