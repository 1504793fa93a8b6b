//! Transform registry mapping object types to transforms.

use std::collections::HashMap;

use super::handler::ObjectTransform;
use crate::directive::ObjectType;

/// Registry mapping object types to transforms.
///
/// Object types without a registered transform are passed through
/// unchanged by the engine.
pub struct TransformRegistry {
    transforms: HashMap<ObjectType, Box<dyn ObjectTransform>>,
}

impl TransformRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Register a transform for an object type, replacing any previous one.
    pub fn register(&mut self, object_type: ObjectType, transform: impl ObjectTransform + 'static) {
        self.transforms.insert(object_type, Box::new(transform));
    }

    /// Get the transform registered for an object type.
    #[must_use]
    pub fn get(&self, object_type: &ObjectType) -> Option<&dyn ObjectTransform> {
        self.transforms.get(object_type).map(|t| t.as_ref())
    }

    /// Check if a transform is registered for an object type.
    #[must_use]
    pub fn has_transform(&self, object_type: &ObjectType) -> bool {
        self.transforms.contains_key(object_type)
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{DirectiveSet, TransformOptions};
    use crate::error::Result;
    use crate::xml::Document;

    struct DummyTransform;

    impl ObjectTransform for DummyTransform {
        fn name(&self) -> &'static str {
            "dummy"
        }

        fn apply(
            &self,
            _directives: &DirectiveSet,
            _primary: &mut Document,
            _auxiliary: Option<&Document>,
            _options: TransformOptions,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = TransformRegistry::new();
        registry.register(ObjectType::Portlet, DummyTransform);

        assert!(registry.get(&ObjectType::Portlet).is_some());
        assert_eq!(
            registry.get(&ObjectType::Portlet).map(|t| t.name()),
            Some("dummy")
        );
    }

    #[test]
    fn test_registry_has_transform() {
        let mut registry = TransformRegistry::new();
        registry.register(ObjectType::Menu, DummyTransform);

        assert!(registry.has_transform(&ObjectType::Menu));
        assert!(!registry.has_transform(&ObjectType::Page));
    }
}
