//! Default registry configuration.

use super::core::TransformRegistry;
use super::handlers::{LookupTransform, ViewTransform};
use crate::directive::ObjectType;

/// Create a registry with the transforms for views and lookups.
///
/// Processes, objects, portlets, queries, pages, menus and instances have
/// no transform and are written back as read.
#[must_use]
pub fn create_transform_registry() -> TransformRegistry {
    let mut registry = TransformRegistry::new();
    registry.register(ObjectType::View, ViewTransform);
    registry.register(ObjectType::Lookup, LookupTransform);
    registry
}
