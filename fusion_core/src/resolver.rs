use tracing::warn;

use crate::document::Body;
use crate::document::BodyElement;
use crate::document::Document;
use crate::document::Paragraph;
use crate::lexer::Marker;
use crate::lexer::Sentinel;
use crate::lexer::scan_markers;

/// Whether the resolver is currently keeping or dropping content. Carried
/// across one pass over a scope; nesting is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipMode {
	Keeping,
	Skipping,
}

/// Resolve every conditional span in a document.
pub fn resolve_document(document: &mut Document) {
	for tab in &mut document.tabs {
		resolve_body(&mut tab.body);
	}
}

/// Resolve one body: the table-aware pass runs first (independently per
/// cell), then the linear pass over the body's top-level paragraphs.
pub fn resolve_body(body: &mut Body) {
	for child in &mut body.children {
		if let BodyElement::Table(table) = child {
			for row in &mut table.rows {
				for cell in &mut row.cells {
					resolve_blocks(&mut cell.blocks);
				}
			}
		}
	}

	resolve_top_level(body);
}

/// The linear algorithm over one ordered block sequence (a table cell, or any
/// standalone scope). `£OK … £FIN` flattens to the content between the
/// sentinels; `£KO … £FIN` is deleted entirely, content included. Blocks
/// whose text is reduced to nothing are removed from the sequence.
///
/// Returns `false` when the scope's spans are malformed — unmatched `£OK` or
/// `£KO`, a stray `£FIN`, or nested spans. A malformed scope is left verbatim
/// so the leftover sentinels surface in the completeness count instead of
/// being silently mis-resolved.
pub fn resolve_blocks(blocks: &mut Vec<Paragraph>) -> bool {
	if !spans_well_formed(blocks.iter().map(|block| block.text.as_str())) {
		warn!("unbalanced conditional span, scope left unresolved");
		return false;
	}

	let mut walker = SpanWalker::new();
	let mut kept = Vec::with_capacity(blocks.len());

	for paragraph in blocks.drain(..) {
		if let Some(text) = walker.resolve_paragraph(&paragraph.text) {
			kept.push(Paragraph { text });
		}
	}

	*blocks = kept;
	true
}

/// The linear pass over a body's top-level children. Tables are opaque to
/// skip mode: their content was already resolved cell by cell, and removing a
/// whole table here could orphan sibling content, so tables always survive.
fn resolve_top_level(body: &mut Body) {
	let top_level_texts = body.children.iter().filter_map(|child| {
		match child {
			BodyElement::Paragraph(paragraph) => Some(paragraph.text.as_str()),
			BodyElement::Table(_) => None,
		}
	});

	if !spans_well_formed(top_level_texts) {
		warn!("unbalanced conditional span, body left unresolved");
		return;
	}

	let mut walker = SpanWalker::new();
	let mut kept = Vec::with_capacity(body.children.len());

	for child in body.children.drain(..) {
		match child {
			BodyElement::Table(table) => kept.push(BodyElement::Table(table)),
			BodyElement::Paragraph(paragraph) => {
				if let Some(text) = walker.resolve_paragraph(&paragraph.text) {
					kept.push(BodyElement::Paragraph(Paragraph { text }));
				}
			}
		}
	}

	body.children = kept;
}

/// Single-pass skip-mode state machine over a scope's paragraphs.
struct SpanWalker {
	mode: SkipMode,
}

impl SpanWalker {
	fn new() -> Self {
		Self {
			mode: SkipMode::Keeping,
		}
	}

	/// Resolve one paragraph. Returns the surviving text, or `None` when the
	/// paragraph should be removed from its scope: either it was fully inside
	/// a dropped span, or it carried only sentinel markup.
	fn resolve_paragraph(&mut self, text: &str) -> Option<String> {
		let entered_skipping = self.mode == SkipMode::Skipping;
		let (resolved, saw_sentinel) = self.rewrite(text);

		if saw_sentinel {
			// A pure marker block (e.g. a paragraph holding only `£OK`)
			// vanishes along with its markers.
			if resolved.trim().is_empty() {
				return None;
			}
			return Some(resolved);
		}

		if entered_skipping {
			return None;
		}

		Some(resolved)
	}

	/// Rewrite one paragraph's text: text segments are kept or dropped based
	/// on the mode in force *before* the next sentinel, sentinel markers are
	/// always discarded, and `£FIN` clears skip mode for whatever follows it
	/// within the same paragraph.
	fn rewrite(&mut self, text: &str) -> (String, bool) {
		let mut out = String::with_capacity(text.len());
		let mut cursor = 0;
		let mut saw_sentinel = false;

		for spanned in scan_markers(text) {
			let Marker::Sentinel(sentinel) = spanned.marker else {
				continue;
			};
			saw_sentinel = true;

			if self.mode == SkipMode::Keeping {
				out.push_str(&text[cursor..spanned.span.start]);
			}

			self.mode = match sentinel {
				Sentinel::Ko => SkipMode::Skipping,
				Sentinel::Ok | Sentinel::Fin => SkipMode::Keeping,
			};
			cursor = spanned.span.end;
		}

		if self.mode == SkipMode::Keeping {
			out.push_str(&text[cursor..]);
		}

		(out, saw_sentinel)
	}
}

/// Verify that a scope's sentinel sequence forms non-nested, fully closed
/// spans: every `£OK`/`£KO` is followed by an `£FIN`, no `£FIN` appears with
/// no open span, and no span opens inside another.
fn spans_well_formed<'a>(texts: impl Iterator<Item = &'a str>) -> bool {
	let mut open = false;

	for text in texts {
		for spanned in scan_markers(text) {
			let Marker::Sentinel(sentinel) = spanned.marker else {
				continue;
			};

			match sentinel {
				Sentinel::Ok | Sentinel::Ko => {
					if open {
						return false;
					}
					open = true;
				}
				Sentinel::Fin => {
					if !open {
						return false;
					}
					open = false;
				}
			}
		}
	}

	!open
}
