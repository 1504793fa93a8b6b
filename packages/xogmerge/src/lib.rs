//! xogmerge - Merge XOG view and lookup configuration between deployments.
//!
//! This crate applies declarative directive sets to parsed XOG documents:
//! section and field edits on views, action and action-group edits on view
//! action catalogs, and partition rewrites on views and lookups.
//!
//! # Example
//!
//! ```
//! use xogmerge::directive::{Column, DirectiveSet, FieldDirective, ObjectType, SectionAction, SectionDirective};
//! use xogmerge::xml::Document;
//!
//! let source = Document::parse(r#"
//!     <NikuDataBus><views>
//!       <property code="obj.auditoria"><section>
//!         <column sequence="1"><field attributeCode="status_novo"/></column>
//!       </section></property>
//!     </views></NikuDataBus>"#).unwrap();
//! let mut target = Document::parse(r#"
//!     <NikuDataBus><views>
//!       <property code="obj.auditoria"><section>
//!         <column sequence="1"><field attributeCode="created_by"/></column>
//!       </section></property>
//!     </views></NikuDataBus>"#).unwrap();
//!
//! let mut directives = DirectiveSet::new(ObjectType::View, "obj.auditoria");
//! directives.sections.push(
//!     SectionDirective::new(SectionAction::Update)
//!         .source(1)
//!         .target(1)
//!         .field(FieldDirective::place("status_novo", Column::Left).before("created_by")),
//! );
//!
//! xogmerge::execute(&mut target, Some(&source), &directives).unwrap();
//! let fields = target.find_all("//field").unwrap();
//! assert_eq!(target.attr(fields[0], "attributeCode"), Some("status_novo"));
//! ```
//!
//! # Architecture
//!
//! - [`xml`]: arena document model, path queries, parsing and writing
//! - [`directive`]: object types, directive sets and options
//! - [`position`]: 1-based ordinal resolution
//! - [`strategy`]: section, field and element merge strategies
//! - [`partition`]: view selection and partition rewriting
//! - [`registry`]: per-object-type transforms and the dispatching engine
//! - [`driver`]: driver document parsing
//! - [`validate`]: XOG response checking
//! - [`cdata`]: CDATA restoration after serialization
//! - [`split`]: instance document splitting
//! - [`config`]: constants and validation helpers
//! - [`error`]: error types and Result alias
//! - [`cli`]: command-line interface

pub mod cdata;
pub mod cli;
pub mod config;
pub mod directive;
pub mod driver;
pub mod error;
pub mod partition;
pub mod position;
pub mod registry;
pub mod split;
pub mod strategy;
pub mod validate;
pub mod xml;

// Re-export the engine entry points
pub use registry::{execute, TransformEngine};

// Re-export commonly used items
pub use directive::{DirectiveSet, ObjectType, TransformOptions};
pub use driver::{parse_driver, Driver, DriverEntry};
pub use error::{Result, Scope, TransformError};
pub use xml::{Document, ElementId};
