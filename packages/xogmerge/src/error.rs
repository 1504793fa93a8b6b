//! Error types for the transformation engine.
//!
//! Every failure is a value: a single `TransformError` carries a
//! human-readable message for the item that failed, and the caller decides
//! whether to move on to the next item.

use std::fmt;

use thiserror::Error;

/// Which side of a merge an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The document or section content is copied from.
    Source,
    /// The document or section being mutated.
    Target,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

/// Main error type for the xogmerge library.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Ordinal outside `[1, count]`.
    #[error("{scope} position {ordinal} is out of bounds ({count} available)")]
    OutOfBounds {
        scope: Scope,
        ordinal: usize,
        count: usize,
    },

    /// A section action needs a position that was not given.
    #[error("section action '{action}' requires {position}")]
    MissingRequiredPosition {
        action: &'static str,
        position: &'static str,
    },

    /// Unknown section or element action.
    #[error("invalid action '{0}'")]
    InvalidAction(String),

    /// Unknown or missing field column.
    #[error("invalid column '{0}', expected 'left' or 'right'")]
    InvalidColumn(String),

    /// Position attribute that is not a number.
    #[error("invalid position '{0}', expected a positive number")]
    InvalidPosition(String),

    /// Unknown element directive type.
    #[error("invalid element type '{0}', expected 'action' or 'actionGroup'")]
    InvalidElementType(String),

    /// Section update without any field directive.
    #[error("section update (source {source_position}, target {target_position}) has no fields")]
    EmptyUpdateFields {
        source_position: usize,
        target_position: usize,
    },

    /// Field or element code not present where it is read from.
    #[error("code '{code}' not found in {scope}")]
    UnknownFieldCode { code: String, scope: Scope },

    /// `insertBefore` anchor that does not resolve in the target.
    #[error("insertBefore code '{0}' not found in target")]
    UnknownAnchorCode(String),

    /// Element to remove that is not present in the target.
    #[error("code '{0}' not found in target, nothing to remove")]
    UnknownTargetCode(String),

    /// Section or element directives combined with a bulk code.
    #[error("section and element directives require a single view code, got '{0}'")]
    SectionsRequireSingleTarget(String),

    /// `targetPartition` given without `sourcePartition`.
    #[error("targetPartition '{0}' requires a sourcePartition")]
    TargetPartitionRequiresSource(String),

    /// View code (and partition) not present in the source document.
    #[error("view '{code}'{} not found in source", partition_suffix(.partition))]
    ViewNotFoundInSource {
        code: String,
        partition: Option<String>,
    },

    /// View code (and partition) not present in the target document.
    #[error("view '{code}'{} not found in target", partition_suffix(.partition))]
    ViewNotFoundInTarget {
        code: String,
        partition: Option<String>,
    },

    /// Malformed document path expression.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Tag pattern that is not a valid regular expression.
    #[error("invalid tag pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// Malformed driver document.
    #[error("invalid driver: {0}")]
    InvalidDriver(String),

    /// XOG response that reports a failure.
    #[error("{0}")]
    OutputCheck(String),

    /// Instance splitting could not be performed.
    #[error("cannot split instances: {0}")]
    Split(String),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Run report serialization failed.
    #[error("report serialization failed: {0}")]
    Report(#[from] serde_yaml_ng::Error),
}

fn partition_suffix(partition: &Option<String>) -> String {
    partition
        .as_ref()
        .map(|p| format!(" (partition '{p}')"))
        .unwrap_or_default()
}

/// Result type alias for xogmerge operations.
pub type Result<T> = std::result::Result<T, TransformError>;
