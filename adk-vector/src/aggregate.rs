//! Grouping ranked segments back into per-document text.

use std::collections::{BTreeSet, HashMap};

use crate::document::{Document, Metadata, SearchResult};
use crate::ranking::by_score_then_id;

/// Renders one document's matched content for display or export.
///
/// Implemented for any `Fn(&str, &Metadata, &str) -> String`, so a closure
/// is usually enough.
///
/// # Example
///
/// ```rust,ignore
/// use adk_vector::{aggregate_results, Metadata};
///
/// let report = aggregate_results(&results, &|id: &str, _: &Metadata, content: &str| {
///     format!("{id}: {content}\n")
/// });
/// ```
pub trait Formatter {
    /// Format a document given its ID, metadata and concatenated matched content.
    fn format(&self, document_id: &str, metadata: &Metadata, content: &str) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&str, &Metadata, &str) -> String,
{
    fn format(&self, document_id: &str, metadata: &Metadata, content: &str) -> String {
        self(document_id, metadata, content)
    }
}

struct DocumentGroup<'a> {
    document: &'a Document,
    score: f32,
    matched: BTreeSet<usize>,
}

/// Group results by document and format each document once.
///
/// Documents are emitted best first, ranked by the highest score among their
/// matched segments. Within a document, matched segment texts are joined with
/// `"\n"` in their stored order, whatever order the results arrived in.
pub fn aggregate_results<F>(results: &[SearchResult], formatter: &F) -> String
where
    F: Formatter + ?Sized,
{
    let mut groups: HashMap<&str, DocumentGroup<'_>> = HashMap::new();
    for result in results {
        let document = result.document();
        let group = groups.entry(document.id.as_str()).or_insert_with(|| DocumentGroup {
            document,
            score: result.score(),
            matched: BTreeSet::new(),
        });
        group.score = group.score.max(result.score());
        group.matched.insert(result.segment_index());
    }

    let mut ordered: Vec<DocumentGroup<'_>> = groups.into_values().collect();
    ordered.sort_by(|a, b| by_score_then_id(a.score, &a.document.id, b.score, &b.document.id));

    let mut output = String::new();
    for group in ordered {
        let segments = group.document.segments();
        let content = group
            .matched
            .iter()
            .filter_map(|&i| segments.get(i).map(|s| s.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        output.push_str(&formatter.format(&group.document.id, &group.document.metadata, &content));
    }
    output
}
