//! Misspelling detection over missing-field pairs

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// Largest edit distance still treated as a misspelling
pub const MAX_MISSPELLING_DISTANCE: usize = 3;

/// Classic edit distance with unit insert, delete and substitute costs
///
/// # Examples
/// ```
/// use provider_doc_lint_checker::levenshtein;
///
/// assert_eq!(levenshtein("discrption", "description"), 1);
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitute = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitute.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Pair documented-but-unknown fields with undocumented schema fields
///
/// Each `MissingInCode` takes the closest unpaired `MissingInDoc` within
/// [`MAX_MISSPELLING_DISTANCE`]; equal names at different paths become
/// `WrongNesting`. The merged diagnostic keeps the position and line of the
/// documented side.
pub fn merge_misspellings(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let missing_in_doc: Vec<usize> = diagnostics
        .iter()
        .enumerate()
        .filter(|(_, d)| d.kind == DiagnosticKind::MissingInDoc)
        .map(|(i, _)| i)
        .collect();
    if missing_in_doc.is_empty() {
        return diagnostics;
    }

    // index of MissingInCode -> index of its MissingInDoc partner
    let mut partners: Vec<(usize, usize)> = Vec::new();
    let mut taken = vec![false; diagnostics.len()];

    for (code_index, code) in diagnostics.iter().enumerate() {
        if code.kind != DiagnosticKind::MissingInCode {
            continue;
        }
        let best = missing_in_doc
            .iter()
            .filter(|doc_index| !taken[**doc_index])
            .map(|doc_index| {
                let doc = &diagnostics[*doc_index];
                let distance = levenshtein(code.field_name(), doc.field_name());
                let other_parent = parent(&code.path) != parent(&doc.path);
                (distance, other_parent, *doc_index)
            })
            .filter(|(distance, _, _)| *distance <= MAX_MISSPELLING_DISTANCE)
            .min();

        if let Some((_, _, doc_index)) = best {
            taken[doc_index] = true;
            partners.push((code_index, doc_index));
        }
    }

    let mut merged: Vec<Option<Diagnostic>> = diagnostics.into_iter().map(Some).collect();
    for (code_index, doc_index) in partners {
        let (Some(code), Some(doc)) = (merged[code_index].take(), merged[doc_index].take()) else {
            continue;
        };
        let kind = if code.field_name() == doc.field_name() {
            DiagnosticKind::WrongNesting {
                correct_path: doc.path.clone(),
            }
        } else {
            DiagnosticKind::Misspelling {
                wrong: code.field_name().to_string(),
                correct: doc.field_name().to_string(),
            }
        };
        merged[code_index] = Some(Diagnostic {
            kind,
            skip: code.skip || doc.skip,
            ..code
        });
    }

    merged.into_iter().flatten().collect()
}

fn parent(path: &str) -> &str {
    path.rsplit_once('.').map_or("", |(parent, _)| parent)
}
