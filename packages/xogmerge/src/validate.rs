//! XOG response checking.
//!
//! Every XOG call answers with an `XOGOutput` block holding a `Status`, a
//! `Statistics` summary and per-record error information. [`check`] turns
//! that block into a success or warning outcome, or an `OutputCheck` error.

use serde::Serialize;

use crate::error::{Result, TransformError};
use crate::xml::Document;

const SUCCESS_STATE: &str = "SUCCESS";
const WARNING_SEVERITY: &str = "WARNING";

/// Classification of a processed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Success,
    Warning,
    Error,
}

/// Result of checking a XOG response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: OutputStatus,
    /// Human-readable details, e.g. the elapsed time or warning texts.
    pub debug: String,
}

/// Check a XOG response document.
///
/// # Errors
/// Returns `OutputCheck` when the output or status tag is missing, the
/// state is not `SUCCESS`, no record was processed or some records failed.
///
/// # Examples
/// ```
/// use xogmerge::validate::{check, OutputStatus};
/// use xogmerge::xml::Document;
///
/// let xml = r#"<XOGOutput><Status state="SUCCESS" elapsedTime="0.5 seconds"/></XOGOutput>"#;
/// let outcome = check(&Document::parse(xml).unwrap()).unwrap();
/// assert_eq!(outcome.status, OutputStatus::Success);
/// assert_eq!(outcome.debug, "Elapsed time: 0.5 seconds");
/// ```
pub fn check(doc: &Document) -> Result<Outcome> {
    let fail = |message: String| -> Result<Outcome> { Err(TransformError::OutputCheck(message)) };

    let Some(output) = doc.find("//XOGOutput")? else {
        return fail("no output tag defined".to_string());
    };
    let Some(status) = doc.find_from(output, "Status")? else {
        return fail("no status tag defined".to_string());
    };

    let state = doc.attr(status, "state").unwrap_or_default();
    if state != SUCCESS_STATE {
        let description = doc
            .find_from(output, "//ErrorInformation/Description")?
            .and_then(|d| doc.text(d))
            .unwrap_or("no error description");
        return fail(format!("output state {state}: {}", description.trim()));
    }

    if let Some(statistics) = doc.find_from(output, "Statistics")? {
        if doc.attr(statistics, "totalNumberOfRecords") == Some("0") {
            return fail("output statistics totalNumberOfRecords = 0".to_string());
        }
        let failures = doc
            .attr(statistics, "failureRecords")
            .and_then(|f| f.trim().parse::<u64>().ok())
            .unwrap_or(0);
        if failures > 0 {
            return fail(format!("output statistics failure on {failures} records"));
        }
    }

    let mut messages = Vec::new();
    let mut warning = false;
    for info in doc.find_all_from(output, "//ErrorInformation")? {
        let severity = doc
            .find_from(info, "Severity")?
            .and_then(|s| doc.text(s))
            .map(str::trim);
        if severity == Some(WARNING_SEVERITY) {
            warning = true;
            if let Some(description) = doc.find_from(info, "Description")?.and_then(|d| doc.text(d)) {
                messages.push(description.trim().to_string());
            }
        }
    }
    if let Some(elapsed) = doc.attr(status, "elapsedTime") {
        messages.push(format!("Elapsed time: {elapsed}"));
    }

    Ok(Outcome {
        status: if warning {
            OutputStatus::Warning
        } else {
            OutputStatus::Success
        },
        debug: messages.join(" | "),
    })
}
