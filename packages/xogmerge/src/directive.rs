//! Directive types describing the structural edits to apply.
//!
//! A [`DirectiveSet`] is the per-item input of the transform dispatcher: the
//! object it addresses (type, code, partitions) plus ordered section and
//! element directives. All string-valued choices are parsed into closed
//! enums up front, so an unknown action or column is rejected before any
//! document is touched.

use std::fmt;
use std::str::FromStr;

use crate::config::{ACTION_TAG, GROUP_TAG};
use crate::error::{Result, TransformError};

/// Kind of configuration object an item refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectType {
    /// Screen layouts (`views`).
    View,
    /// Static and dynamic lookups (`lookups`).
    Lookup,
    /// Process definitions (`processes`).
    Process,
    /// Object definitions (`objects`).
    Object,
    /// Portlets (`portlets`).
    Portlet,
    /// NSQL queries (`queries`).
    Query,
    /// Pages (`pages`).
    Page,
    /// Menus (`menus`).
    Menu,
    /// Instance data, e.g. `Instance("resource")` for `resourceInstances`.
    Instance(String),
}

impl ObjectType {
    /// Opening and closing tag patterns whose bodies must be written as CDATA.
    #[must_use]
    pub fn cdata_tags(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Query => Some((r"<nsql(?:\s[^>]*)?>", r"</nsql>")),
            Self::Process => Some((r"<gel:script(?:\s[^>]*)?>", r"</gel:script>")),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => f.write_str("views"),
            Self::Lookup => f.write_str("lookups"),
            Self::Process => f.write_str("processes"),
            Self::Object => f.write_str("objects"),
            Self::Portlet => f.write_str("portlets"),
            Self::Query => f.write_str("queries"),
            Self::Page => f.write_str("pages"),
            Self::Menu => f.write_str("menus"),
            Self::Instance(kind) => write!(f, "{kind}Instances"),
        }
    }
}

/// Edit applied to a whole section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    Replace,
    Insert,
    Remove,
    Update,
}

impl SectionAction {
    /// Name as written in driver documents.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Insert => "insert",
            Self::Remove => "remove",
            Self::Update => "update",
        }
    }

    fn requires_source(self) -> bool {
        matches!(self, Self::Insert | Self::Replace | Self::Update)
    }

    fn requires_target(self) -> bool {
        matches!(self, Self::Replace | Self::Update | Self::Remove)
    }
}

impl FromStr for SectionAction {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "replace" => Ok(Self::Replace),
            "insert" => Ok(Self::Insert),
            "remove" => Ok(Self::Remove),
            "update" => Ok(Self::Update),
            other => Err(TransformError::InvalidAction(other.to_string())),
        }
    }
}

/// One of the two field columns of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Right,
}

impl Column {
    /// Value of the column container's `sequence` attribute.
    #[must_use]
    pub fn sequence(&self) -> &'static str {
        match self {
            Self::Left => "1",
            Self::Right => "2",
        }
    }
}

impl FromStr for Column {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            other => Err(TransformError::InvalidColumn(other.to_string())),
        }
    }
}

/// Placement or removal of a single field inside an updated section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDirective {
    /// Field identity (`attributeCode`).
    pub code: String,
    /// Destination column; only optional for removals.
    pub column: Option<Column>,
    /// Code of the field to insert before.
    pub insert_before: Option<String>,
    /// Remove the field from the target instead of placing it.
    pub remove: bool,
}

impl FieldDirective {
    /// Place `code` at the end of `column`.
    #[must_use]
    pub fn place(code: impl Into<String>, column: Column) -> Self {
        Self {
            code: code.into(),
            column: Some(column),
            insert_before: None,
            remove: false,
        }
    }

    /// Remove `code` from whichever column holds it.
    #[must_use]
    pub fn removal(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            column: None,
            insert_before: None,
            remove: true,
        }
    }

    /// Set the `insertBefore` anchor.
    #[must_use]
    pub fn before(mut self, anchor: impl Into<String>) -> Self {
        self.insert_before = Some(anchor.into());
        self
    }
}

/// Edit of one section of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDirective {
    pub action: SectionAction,
    /// 1-based ordinal into the source view's sections.
    pub source_position: Option<usize>,
    /// 1-based ordinal into the target view's sections.
    pub target_position: Option<usize>,
    /// Field edits, only used by `update`.
    pub fields: Vec<FieldDirective>,
}

impl SectionDirective {
    #[must_use]
    pub fn new(action: SectionAction) -> Self {
        Self {
            action,
            source_position: None,
            target_position: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn source(mut self, position: usize) -> Self {
        self.source_position = Some(position);
        self
    }

    #[must_use]
    pub fn target(mut self, position: usize) -> Self {
        self.target_position = Some(position);
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDirective) -> Self {
        self.fields.push(field);
        self
    }

    /// Check the preconditions that do not depend on any document.
    ///
    /// # Errors
    /// `MissingRequiredPosition` when the action needs a position that is
    /// absent, `EmptyUpdateFields` for an update without fields and
    /// `InvalidColumn` for a placing field without a column.
    pub fn validate(&self) -> Result<()> {
        if self.action.requires_source() && self.source_position.is_none() {
            return Err(TransformError::MissingRequiredPosition {
                action: self.action.as_str(),
                position: "sourcePosition",
            });
        }
        if self.action.requires_target() && self.target_position.is_none() {
            return Err(TransformError::MissingRequiredPosition {
                action: self.action.as_str(),
                position: "targetPosition",
            });
        }
        if self.action == SectionAction::Update {
            if self.fields.is_empty() {
                return Err(TransformError::EmptyUpdateFields {
                    source_position: self.source_position.unwrap_or_default(),
                    target_position: self.target_position.unwrap_or_default(),
                });
            }
            if let Some(field) = self.fields.iter().find(|f| !f.remove && f.column.is_none()) {
                return Err(TransformError::InvalidColumn(format!(
                    "(missing for field '{}')",
                    field.code
                )));
            }
        }
        Ok(())
    }
}

/// Kind of catalog element addressed by an element directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Action,
    ActionGroup,
}

impl ElementType {
    /// Tag of the element inside the view's action catalog.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Action => ACTION_TAG,
            Self::ActionGroup => GROUP_TAG,
        }
    }
}

impl FromStr for ElementType {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "action" => Ok(Self::Action),
            "actionGroup" => Ok(Self::ActionGroup),
            other => Err(TransformError::InvalidElementType(other.to_string())),
        }
    }
}

/// Edit applied to an action or action group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementAction {
    Insert,
    Remove,
}

impl FromStr for ElementAction {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "insert" => Ok(Self::Insert),
            "remove" => Ok(Self::Remove),
            other => Err(TransformError::InvalidAction(other.to_string())),
        }
    }
}

/// Insertion or removal of a named action or action group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDirective {
    pub element_type: ElementType,
    pub code: String,
    pub action: ElementAction,
    /// Code of a same-kind element to insert before.
    pub insert_before: Option<String>,
}

impl ElementDirective {
    #[must_use]
    pub fn new(element_type: ElementType, code: impl Into<String>, action: ElementAction) -> Self {
        Self {
            element_type,
            code: code.into(),
            action,
            insert_before: None,
        }
    }

    #[must_use]
    pub fn before(mut self, anchor: impl Into<String>) -> Self {
        self.insert_before = Some(anchor.into());
        self
    }
}

/// Everything the dispatcher needs to transform one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveSet {
    pub object_type: ObjectType,
    /// Object code; may be `*` or contain `*` wildcards.
    pub code: String,
    /// Owning object code, narrows view selection.
    pub object_code: Option<String>,
    pub source_partition: Option<String>,
    pub target_partition: Option<String>,
    pub sections: Vec<SectionDirective>,
    pub elements: Vec<ElementDirective>,
}

impl DirectiveSet {
    /// Directive set without partitions or edits.
    #[must_use]
    pub fn new(object_type: ObjectType, code: impl Into<String>) -> Self {
        Self {
            object_type,
            code: code.into(),
            object_code: None,
            source_partition: None,
            target_partition: None,
            sections: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Whether any section or element edit is requested.
    #[must_use]
    pub fn has_edits(&self) -> bool {
        !self.sections.is_empty() || !self.elements.is_empty()
    }
}

/// How an `insertBefore` field anchor that does not resolve is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnchorMode {
    /// Append at the end of the destination column.
    #[default]
    BestEffort,
    /// Fail with `UnknownAnchorCode`.
    Strict,
}

/// Runtime options of a transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformOptions {
    pub anchor_mode: AnchorMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_action_from_str() {
        assert_eq!("update".parse::<SectionAction>().unwrap(), SectionAction::Update);
        let err = "merge".parse::<SectionAction>().unwrap_err();
        assert!(matches!(err, TransformError::InvalidAction(a) if a == "merge"));
    }

    #[test]
    fn test_column_from_str() {
        assert_eq!("right".parse::<Column>().unwrap(), Column::Right);
        assert!(matches!(
            "middle".parse::<Column>(),
            Err(TransformError::InvalidColumn(_))
        ));
    }

    #[test]
    fn test_element_type_from_str() {
        assert_eq!(
            "actionGroup".parse::<ElementType>().unwrap(),
            ElementType::ActionGroup
        );
        assert!(matches!(
            "link".parse::<ElementType>(),
            Err(TransformError::InvalidElementType(_))
        ));
    }

    #[test]
    fn test_replace_requires_target_position() {
        let directive = SectionDirective::new(SectionAction::Replace).source(1);
        let err = directive.validate().unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingRequiredPosition {
                action: "replace",
                position: "targetPosition"
            }
        ));
    }

    #[test]
    fn test_insert_requires_source_position() {
        let directive = SectionDirective::new(SectionAction::Insert).target(1);
        assert!(matches!(
            directive.validate(),
            Err(TransformError::MissingRequiredPosition {
                position: "sourcePosition",
                ..
            })
        ));
    }

    #[test]
    fn test_remove_needs_only_target() {
        let directive = SectionDirective::new(SectionAction::Remove).target(2);
        assert!(directive.validate().is_ok());
    }

    #[test]
    fn test_update_requires_fields() {
        let directive = SectionDirective::new(SectionAction::Update).source(1).target(1);
        assert!(matches!(
            directive.validate(),
            Err(TransformError::EmptyUpdateFields {
                source_position: 1,
                target_position: 1
            })
        ));
    }

    #[test]
    fn test_update_placing_field_requires_column() {
        let mut field = FieldDirective::place("status", Column::Left);
        field.column = None;
        let directive = SectionDirective::new(SectionAction::Update)
            .source(1)
            .target(1)
            .field(FieldDirective::removal("old"))
            .field(field);
        assert!(matches!(
            directive.validate(),
            Err(TransformError::InvalidColumn(_))
        ));
    }

    #[test]
    fn test_object_type_display() {
        assert_eq!(ObjectType::View.to_string(), "views");
        assert_eq!(
            ObjectType::Instance("resource".to_string()).to_string(),
            "resourceInstances"
        );
    }

    #[test]
    fn test_cdata_tags() {
        assert!(ObjectType::Query.cdata_tags().is_some());
        assert!(ObjectType::Process.cdata_tags().is_some());
        assert!(ObjectType::View.cdata_tags().is_none());
    }

    #[test]
    fn test_default_options_are_best_effort() {
        assert_eq!(TransformOptions::default().anchor_mode, AnchorMode::BestEffort);
    }
}
