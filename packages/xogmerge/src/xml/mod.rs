//! In-memory XML documents.
//!
//! XOG payloads are loaded into an arena-backed [`Document`] that supports
//! path queries and in-place structural edits, then written back as
//! indented text.

mod document;
mod parse;
mod path;
mod write;

pub use document::{Attribute, Document, ElementId};
pub use path::Path;
pub use write::WriteOptions;
