//! Configuration constants and validation helpers.
//!
//! Tag and attribute names of the XOG document shapes live here so the
//! strategies never hard-code them, together with the code-pattern logic
//! used for bulk view selection.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, TransformError};

/// Code selecting every object of a type.
pub const BULK_CODE: &str = "*";

/// Minimum driver document version understood by the parser.
pub const MIN_DRIVER_VERSION: f64 = 2.0;

/// Root tag of driver documents.
pub const DRIVER_ROOT_TAG: &str = "xogdriver";

/// Container tag holding all views of a document.
pub const VIEWS_TAG: &str = "views";

/// Container tag holding all lookups of a document.
pub const LOOKUPS_TAG: &str = "lookups";

/// Section tag inside a view.
pub const SECTION_TAG: &str = "section";

/// Column container tag inside a section.
pub const COLUMN_TAG: &str = "column";

/// Field tag inside a column.
pub const FIELD_TAG: &str = "field";

/// Action catalog container tag inside a view.
pub const ACTIONS_TAG: &str = "actions";

/// Single action tag.
pub const ACTION_TAG: &str = "action";

/// Action group tag.
pub const GROUP_TAG: &str = "group";

/// Identity attribute of views, lookups, actions and groups.
pub const CODE_ATTR: &str = "code";

/// Identity attribute of fields.
pub const FIELD_CODE_ATTR: &str = "attributeCode";

/// Object code attribute of views.
pub const OBJECT_CODE_ATTR: &str = "objectCode";

/// Partition attribute of views and lookup entries.
pub const PARTITION_ATTR: &str = "partitionCode";

/// Column ordering attribute.
pub const SEQUENCE_ATTR: &str = "sequence";

/// Default indentation used when writing documents.
pub const DEFAULT_INDENT: &str = "  ";

/// Partition code pattern: letters, digits, dots, dashes and underscores.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static PARTITION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid regex"));

/// Check whether a view or lookup code selects more than one object.
///
/// # Examples
/// ```
/// use xogmerge::config::is_bulk_code;
///
/// assert!(is_bulk_code("*"));
/// assert!(is_bulk_code("*obj_sistemaCreate"));
/// assert!(!is_bulk_code("obj_sistema.auditoria"));
/// ```
#[must_use]
pub fn is_bulk_code(code: &str) -> bool {
    code.is_empty() || code.contains('*')
}

/// Compiled matcher for a possibly wildcarded code.
///
/// `*` matches any run of characters; everything else matches literally.
#[derive(Debug, Clone)]
pub struct CodePattern {
    regex: Option<Regex>,
    literal: String,
}

impl CodePattern {
    /// Compile a code pattern.
    ///
    /// An empty pattern behaves like [`BULK_CODE`].
    ///
    /// # Errors
    /// Returns `InvalidPath` if the generated expression cannot be compiled.
    pub fn new(code: &str) -> Result<Self> {
        let code = if code.is_empty() { BULK_CODE } else { code };
        if !code.contains('*') {
            return Ok(Self {
                regex: None,
                literal: code.to_string(),
            });
        }

        let body = code
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("^{body}$")).map_err(|e| TransformError::InvalidPath {
            path: code.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            regex: Some(regex),
            literal: code.to_string(),
        })
    }

    /// Check a concrete code against the pattern.
    #[must_use]
    pub fn matches(&self, code: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(code),
            None => self.literal == code,
        }
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

/// Validate a partition code.
///
/// # Errors
/// Returns `InvalidDriver` when the code is empty or contains characters
/// the platform does not accept.
///
/// # Examples
/// ```
/// use xogmerge::config::validate_partition;
///
/// assert!(validate_partition("NIKU.ROOT").is_ok());
/// assert!(validate_partition("partition 10").is_err());
/// ```
pub fn validate_partition(partition: &str) -> Result<()> {
    if PARTITION_PATTERN.is_match(partition) {
        Ok(())
    } else {
        Err(TransformError::InvalidDriver(format!(
            "invalid partition code '{partition}'"
        )))
    }
}
