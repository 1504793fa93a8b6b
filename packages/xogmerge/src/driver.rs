//! Driver document parsing.
//!
//! A driver lists the items to process, in order. Each child of the
//! `xogdriver` root is one item; its tag selects the object type and its
//! attributes and children carry the directive set.
//!
//! ```xml
//! <xogdriver version="2.0">
//!   <views code="obj_sistema.auditoria" objectCode="obj_sistema" path="auditoria.xml"
//!          sourcePartition="partition10" targetPartition="partition20">
//!     <section action="update" sourcePosition="1" targetPosition="1">
//!       <field code="status_novo" column="left" insertBefore="created_by"/>
//!       <field code="analista" remove="true"/>
//!     </section>
//!     <element type="action" code="odf_XMLExport" action="insert"/>
//!   </views>
//!   <lookups code="LOOKUP_CAS_XOG" path="lookup.xml" targetPartition="NIKU.ROOT"/>
//! </xogdriver>
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use roxmltree::{Document, Node};

use crate::config::{validate_partition, DRIVER_ROOT_TAG, MIN_DRIVER_VERSION};
use crate::directive::{
    Column, DirectiveSet, ElementAction, ElementDirective, ElementType, FieldDirective, ObjectType,
    SectionAction, SectionDirective,
};
use crate::error::{Result, TransformError};

const INSTANCES_SUFFIX: &str = "instances";

/// Item tags (lowercase) mapped to object types.
static TYPE_TAGS: LazyLock<HashMap<&'static str, ObjectType>> = LazyLock::new(|| {
    HashMap::from([
        ("views", ObjectType::View),
        ("lookups", ObjectType::Lookup),
        ("processes", ObjectType::Process),
        ("objects", ObjectType::Object),
        ("portlets", ObjectType::Portlet),
        ("queries", ObjectType::Query),
        ("pages", ObjectType::Page),
        ("menus", ObjectType::Menu),
    ])
});

/// One item of a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverEntry {
    /// File path of the item, relative to the type folder.
    pub path: String,
    /// Tag of the instance elements, for instance splitting.
    pub instance_tag: Option<String>,
    /// Instances per output file; splitting only happens when set.
    pub instances_per_file: Option<usize>,
    pub directives: DirectiveSet,
}

impl DriverEntry {
    #[must_use]
    pub fn object_type(&self) -> &ObjectType {
        &self.directives.object_type
    }
}

/// A parsed driver document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Driver {
    pub version: String,
    pub entries: Vec<DriverEntry>,
}

/// Map an item tag to its object type.
///
/// # Examples
/// ```
/// use xogmerge::directive::ObjectType;
/// use xogmerge::driver::object_type_for_tag;
///
/// assert_eq!(object_type_for_tag("views"), Some(ObjectType::View));
/// assert_eq!(
///     object_type_for_tag("resourceInstances"),
///     Some(ObjectType::Instance("resource".to_string()))
/// );
/// assert_eq!(object_type_for_tag("unknown"), None);
/// ```
#[must_use]
pub fn object_type_for_tag(tag: &str) -> Option<ObjectType> {
    let lower = tag.to_ascii_lowercase();
    if let Some(object_type) = TYPE_TAGS.get(lower.as_str()) {
        return Some(object_type.clone());
    }
    let kind_len = lower.strip_suffix(INSTANCES_SUFFIX)?.len();
    (kind_len > 0).then(|| ObjectType::Instance(tag[..kind_len].to_string()))
}

/// Parse driver XML text.
///
/// # Errors
/// Returns `XmlParse` for malformed XML, `InvalidDriver` for a wrong root
/// tag, an unsupported version, an unknown item tag or missing item
/// attributes, and the directive parse errors (`InvalidAction`,
/// `InvalidColumn`, `InvalidPosition`, `InvalidElementType`).
pub fn parse_driver(xml: &str) -> Result<Driver> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();

    if root.tag_name().name() != DRIVER_ROOT_TAG {
        return Err(TransformError::InvalidDriver(format!(
            "root tag <{}> is incorrect, expected <{DRIVER_ROOT_TAG}>",
            root.tag_name().name()
        )));
    }

    let version = root.attribute("version").unwrap_or_default();
    let supported = version
        .trim()
        .parse::<f64>()
        .is_ok_and(|v| v >= MIN_DRIVER_VERSION);
    if !supported {
        return Err(TransformError::InvalidDriver(format!(
            "version '{version}' is not supported, expected {MIN_DRIVER_VERSION:.1} or greater"
        )));
    }

    let entries = root
        .children()
        .filter(Node::is_element)
        .map(parse_entry)
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(version, entries = entries.len(), "parsed driver");
    Ok(Driver {
        version: version.to_string(),
        entries,
    })
}

fn parse_entry(node: Node<'_, '_>) -> Result<DriverEntry> {
    let tag = node.tag_name().name();
    if tag == "file" {
        return Err(TransformError::InvalidDriver(
            "tag <file> is no longer supported".to_string(),
        ));
    }
    let object_type = object_type_for_tag(tag)
        .ok_or_else(|| TransformError::InvalidDriver(format!("unknown item tag <{tag}>")))?;

    let code = required(node, "code")?;
    let path = required(node, "path")?;

    let mut directives = DirectiveSet::new(object_type, code);
    directives.object_code = optional(node, "objectCode");
    directives.source_partition = partition(node, "sourcePartition")?;
    directives.target_partition = partition(node, "targetPartition")?;

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "section" => directives.sections.push(parse_section(child)?),
            "element" => directives.elements.push(parse_element(child)?),
            other => tracing::warn!(item = %path, tag = %other, "Ignoring unknown driver tag"),
        }
    }

    let instances_per_file = optional(node, "instancesPerFile")
        .map(|v| {
            v.trim().parse::<usize>().map_err(|_| {
                TransformError::InvalidDriver(format!(
                    "instancesPerFile '{v}' of item '{path}' is not a number"
                ))
            })
        })
        .transpose()?;

    Ok(DriverEntry {
        path,
        instance_tag: optional(node, "instanceTag"),
        instances_per_file,
        directives,
    })
}

fn parse_section(node: Node<'_, '_>) -> Result<SectionDirective> {
    let action: SectionAction = node.attribute("action").unwrap_or_default().parse()?;
    let mut section = SectionDirective::new(action);
    section.source_position = position(node, "sourcePosition")?;
    section.target_position = position(node, "targetPosition")?;

    for field in node
        .children()
        .filter(|c| c.is_element() && c.tag_name().name() == "field")
    {
        section.fields.push(parse_field(field)?);
    }
    Ok(section)
}

fn parse_field(node: Node<'_, '_>) -> Result<FieldDirective> {
    let column = node.attribute("column").map(str::parse::<Column>).transpose()?;
    Ok(FieldDirective {
        code: required(node, "code")?,
        column,
        insert_before: optional(node, "insertBefore"),
        remove: node.attribute("remove") == Some("true"),
    })
}

fn parse_element(node: Node<'_, '_>) -> Result<ElementDirective> {
    let element_type: ElementType = node.attribute("type").unwrap_or_default().parse()?;
    let action: ElementAction = node.attribute("action").unwrap_or_default().parse()?;
    let mut element = ElementDirective::new(element_type, required(node, "code")?, action);
    element.insert_before = optional(node, "insertBefore");
    Ok(element)
}

fn required(node: Node<'_, '_>, name: &str) -> Result<String> {
    optional(node, name).ok_or_else(|| {
        TransformError::InvalidDriver(format!(
            "tag <{}> is missing attribute '{name}'",
            node.tag_name().name()
        ))
    })
}

/// Attribute value; empty values count as absent.
fn optional(node: Node<'_, '_>, name: &str) -> Option<String> {
    node.attribute(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn position(node: Node<'_, '_>, name: &str) -> Result<Option<usize>> {
    optional(node, name)
        .map(|v| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| TransformError::InvalidPosition(v.clone()))
        })
        .transpose()
}

fn partition(node: Node<'_, '_>, name: &str) -> Result<Option<String>> {
    let value = optional(node, name);
    if let Some(p) = &value {
        validate_partition(p)?;
    }
    Ok(value)
}
