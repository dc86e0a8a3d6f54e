//! Insertion of missing timeout bullets and sections

use crate::lines::DocumentLines;
use crate::templates::{render_timeout_bullet, render_timeouts_section};
use provider_doc_lint_common::{Result, TimeoutOp};
use provider_doc_lint_parser::ResourceDoc;
use std::collections::{BTreeMap, HashMap};
use tera::Tera;
use tracing::debug;

/// Insert a canonical bullet for every missing operation
///
/// Bullets join an existing Timeouts section next to their neighbours in
/// create, read, update, delete order. Without a section, a whole one is
/// rendered before the Import section, or at the end of the document.
/// Line numbers in `doc` and `spans` refer to `lines` before insertion.
///
/// Returns the number of operations inserted.
pub(crate) fn insert_missing(
    tera: &Tera,
    lines: &mut DocumentLines,
    doc: &ResourceDoc,
    spans: &HashMap<usize, usize>,
    missing: &[(TimeoutOp, u64)],
) -> Result<usize> {
    let mut missing = missing.to_vec();
    missing.sort();
    missing.dedup_by_key(|(op, _)| *op);

    // 0-based insertion index -> lines to insert there
    let mut inserts: BTreeMap<usize, Vec<String>> = BTreeMap::new();

    match doc.timeouts_heading {
        Some(heading) => {
            for (op, seconds) in &missing {
                let bullet = render_timeout_bullet(tera, &doc.resource_type, *op, *seconds)?;
                let earlier = doc.timeouts.entries().filter(|(o, _)| o < op).last();
                let later = doc.timeouts.entries().find(|(o, _)| o > op);

                let (index, lead) = match (earlier, later) {
                    (Some((_, entry)), _) => (spans.get(&entry.line).copied().unwrap_or(entry.line), false),
                    (None, Some((_, entry))) => (entry.line - 1, false),
                    (None, None) => (heading, true),
                };

                let group = inserts.entry(index).or_default();
                if lead && group.is_empty() {
                    group.push(String::new());
                }
                group.push(bullet);
            }
        }
        None => {
            let bullets = missing
                .iter()
                .map(|(op, seconds)| render_timeout_bullet(tera, &doc.resource_type, *op, *seconds))
                .collect::<Result<Vec<_>>>()?;
            let mut section = render_timeouts_section(tera, &bullets)?;

            match doc.import_heading {
                Some(import) => {
                    section.push(String::new());
                    inserts.insert(import - 1, section);
                }
                None => {
                    let index = lines.end_index();
                    if index > 0 && !lines.is_blank(index - 1) {
                        section.insert(0, String::new());
                    }
                    inserts.insert(index, section);
                }
            }
        }
    }

    // Back to front, so earlier indexes stay valid
    for (index, group) in inserts.into_iter().rev() {
        debug!(index, lines = group.len(), "Inserting timeout lines");
        lines.insert(index, group);
    }

    Ok(missing.len())
}
