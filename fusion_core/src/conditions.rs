use tracing::debug;

use crate::document::DataRow;
use crate::document::Document;
use crate::document::Value;
use crate::lexer::Comparator;
use crate::lexer::Marker;
use crate::lexer::Sentinel;
use crate::lexer::scan_markers;

/// Rewrite every condition marker using the requested comparator into an
/// `£OK`/`£KO` sentinel, across the whole document tree. Conditions whose
/// field is not present in the row are left unchanged so partially specified
/// templates stay inspectable. Returns the number of rewrites.
///
/// Equality and inequality are evaluated in separate traversals; the
/// orchestrator runs the equality pass first.
pub fn evaluate_conditions(
	document: &mut Document,
	row: &DataRow,
	comparator: Comparator,
) -> usize {
	let mut rewrites = 0;

	for tab in &mut document.tabs {
		tab.body.for_each_text_mut(&mut |text| {
			rewrites += evaluate_text(text, row, comparator);
		});
	}

	rewrites
}

/// Rewrite conditions within a single text. Replacing a marker shifts the
/// byte offsets of everything after it, so the text is re-scanned from the
/// rewrite point after every replacement instead of reusing stale spans.
fn evaluate_text(text: &mut String, row: &DataRow, comparator: Comparator) -> usize {
	let mut rewrites = 0;
	let mut from = 0;

	while from < text.len() {
		let next = scan_markers(&text[from..]).into_iter().find_map(|spanned| {
			match spanned.marker {
				Marker::Condition {
					field,
					comparator: found,
					value,
				} if found == comparator => Some((spanned.span, field, value)),
				_ => None,
			}
		});

		let Some((span, field, value)) = next else {
			break;
		};
		let span = (from + span.start)..(from + span.end);

		if row.is_present(&field) {
			let actual = row.get(&field).map(Value::coerce).unwrap_or_default();
			let holds = match comparator {
				Comparator::Eq => actual == value,
				Comparator::Neq => actual != value,
			};
			let sentinel = if holds { Sentinel::Ok } else { Sentinel::Ko };

			debug!(
				field,
				value,
				actual,
				"condition rewritten to {}",
				sentinel.as_str()
			);
			text.replace_range(span.clone(), sentinel.as_str());
			from = span.start + sentinel.as_str().len();
			rewrites += 1;
		} else {
			debug!(field, "condition field not present, left unchanged");
			from = span.end;
		}
	}

	rewrites
}
