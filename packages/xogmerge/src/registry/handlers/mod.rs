//! Object transforms grouped by object type.

mod lookup;
mod view;

pub use lookup::LookupTransform;
pub use view::ViewTransform;
