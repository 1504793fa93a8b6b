//! Lookup transform: code filtering and partition rewriting.

use crate::config::{CodePattern, CODE_ATTR};
use crate::directive::{DirectiveSet, TransformOptions};
use crate::error::Result;
use crate::partition::{lookups, retain, rewrite_partition};
use crate::registry::ObjectTransform;
use crate::xml::Document;

/// Transform for `lookups` items.
///
/// Keeps the lookups matching the item code and, when a target partition
/// is given, moves their entries to it: only the entries of the source
/// partition when one is given, every partitioned entry otherwise. Section
/// and element directives do not apply.
#[derive(Debug, Default)]
pub struct LookupTransform;

impl ObjectTransform for LookupTransform {
    fn name(&self) -> &'static str {
        "lookup"
    }

    fn apply(
        &self,
        directives: &DirectiveSet,
        primary: &mut Document,
        _auxiliary: Option<&Document>,
        _options: TransformOptions,
    ) -> Result<()> {
        if directives.has_edits() {
            tracing::warn!(
                code = %directives.code,
                "section and element directives are ignored for lookups"
            );
        }

        let pattern = CodePattern::new(&directives.code)?;
        let all = lookups(primary)?;
        let selected: Vec<_> = all
            .iter()
            .copied()
            .filter(|l| primary.attr(*l, CODE_ATTR).is_some_and(|c| pattern.matches(c)))
            .collect();
        if selected.is_empty() {
            tracing::warn!(code = %directives.code, "no lookup matches code");
        }
        retain(primary, &all, &selected);

        let Some(target) = directives.target_partition.as_deref() else {
            return Ok(());
        };
        let from = directives.source_partition.as_deref();

        let rewritten: usize = selected
            .iter()
            .map(|lookup| rewrite_partition(primary, *lookup, from, target))
            .sum();
        tracing::debug!(
            from = from.unwrap_or("any"),
            to = target,
            rewritten,
            "rewrote lookup partitions"
        );
        Ok(())
    }
}
