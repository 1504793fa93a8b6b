//! Transform engine that dispatches directive sets using the registry.

use super::config::create_transform_registry;
use super::core::TransformRegistry;
use crate::directive::{DirectiveSet, TransformOptions};
use crate::error::Result;
use crate::xml::Document;

/// Engine that dispatches each directive set to the transform registered
/// for its object type.
pub struct TransformEngine {
    registry: TransformRegistry,
    options: TransformOptions,
}

impl TransformEngine {
    /// Create a new engine with the given registry.
    #[must_use]
    pub fn new(registry: TransformRegistry, options: TransformOptions) -> Self {
        Self { registry, options }
    }

    /// Get a reference to the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    /// Transform `primary` in place.
    ///
    /// Object types without a transform succeed without touching the
    /// document.
    ///
    /// # Errors
    /// Returns the error of the selected transform.
    pub fn execute(
        &self,
        primary: &mut Document,
        auxiliary: Option<&Document>,
        directives: &DirectiveSet,
    ) -> Result<()> {
        let Some(transform) = self.registry.get(&directives.object_type) else {
            tracing::debug!(
                object_type = %directives.object_type,
                code = %directives.code,
                "No transform for object type, passing through"
            );
            return Ok(());
        };

        transform.apply(directives, primary, auxiliary, self.options)?;
        tracing::info!(
            transform = transform.name(),
            code = %directives.code,
            "Transform completed"
        );
        Ok(())
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(create_transform_registry(), TransformOptions::default())
    }
}

/// Transform `primary` with the default registry and options.
///
/// # Errors
/// Returns the error of the selected transform.
pub fn execute(
    primary: &mut Document,
    auxiliary: Option<&Document>,
    directives: &DirectiveSet,
) -> Result<()> {
    TransformEngine::default().execute(primary, auxiliary, directives)
}
