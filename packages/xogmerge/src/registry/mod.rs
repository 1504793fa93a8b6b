//! Transform registry and dispatch by object type.
//!
//! Each object type that carries transformations registers an
//! [`ObjectTransform`]; the [`TransformEngine`] looks the transform up for a
//! directive set and applies it. Unregistered types pass through unchanged.

mod config;
mod core;
mod engine;
mod handler;
pub mod handlers;

pub use config::create_transform_registry;
pub use core::TransformRegistry;
pub use engine::{execute, TransformEngine};
pub use handler::ObjectTransform;
