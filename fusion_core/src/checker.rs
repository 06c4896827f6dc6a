use crate::document::Document;
use crate::lexer::Marker;
use crate::lexer::count_occurrences;
use crate::lexer::scan_markers;

/// Substring fragments identifying any leftover marker: `£FIN`, `£SI`, `£OK`,
/// `£KO`. Fragment matching catches broken markers (e.g. an unterminated
/// `£SI` run) that no longer lex as a whole marker.
const MARKER_FRAGMENTS: [&str; 4] = ["£F", "£S", "£O", "£K"];

/// Count the unresolved markers remaining in a fully processed document:
/// non-nested `{{…}}` placeholders plus any leftover `£`-marker fragment.
/// A nonzero count means the merge failed for this row; it is reported as a
/// status, never raised as an error.
pub fn count_unresolved(document: &Document) -> usize {
	document
		.tabs
		.iter()
		.map(|tab| count_unresolved_text(&tab.body.text()))
		.sum()
}

/// The completeness count for one flat text.
pub fn count_unresolved_text(text: &str) -> usize {
	let placeholders = scan_markers(text)
		.iter()
		.filter(|spanned| {
			matches!(
				spanned.marker,
				Marker::Placeholder { .. }
					| Marker::PercentPlaceholder { .. }
					| Marker::DatePlaceholder { .. }
			)
		})
		.count();

	let fragments: usize = MARKER_FRAGMENTS
		.iter()
		.map(|fragment| count_occurrences(text, fragment))
		.sum();

	placeholders + fragments
}
