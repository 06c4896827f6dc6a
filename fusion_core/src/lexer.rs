use std::ops::Range;

use logos::Logos;

/// Comparator carried by a condition marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
	/// `£SI field=value£`
	Eq,
	/// `£SI field<>value£`
	Neq,
}

/// Sentinels produced by condition evaluation and consumed by the block
/// resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
	/// `£OK` — keep content until the next `£FIN`.
	Ok,
	/// `£KO` — drop content until the next `£FIN`.
	Ko,
	/// `£FIN` — close the nearest open span.
	Fin,
}

impl Sentinel {
	pub fn as_str(self) -> &'static str {
		match self {
			Sentinel::Ok => "£OK",
			Sentinel::Ko => "£KO",
			Sentinel::Fin => "£FIN",
		}
	}
}

/// A marker located within a text stream. Markers are substrings found by
/// pattern, not a parsed tree; everything between them is plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
	/// `{{field}}` — literal substitution.
	Placeholder { field: String },
	/// `{{field}}%` — value ×100, rounded, rendered as an integer percentage.
	PercentPlaceholder { field: String },
	/// `{{field}}` where the field name contains `DATE` — day/month/year
	/// formatted substitution.
	DatePlaceholder { field: String },
	/// `£SI field=value£` or `£SI field<>value£`.
	Condition {
		field: String,
		comparator: Comparator,
		value: String,
	},
	/// `£OK`, `£KO`, or `£FIN`.
	Sentinel(Sentinel),
}

/// A marker together with its byte span in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedMarker {
	pub marker: Marker,
	pub span: Range<usize>,
}

/// Raw tokens produced by logos. Anything that is not a marker lexes as an
/// error token and is skipped by the scanner.
#[derive(Logos, Debug, PartialEq)]
enum RawMarker {
	#[regex(r"\{\{[^{}]+\}\}%")]
	PercentPlaceholder,
	#[regex(r"\{\{[^{}]+\}\}")]
	Placeholder,
	#[regex(r"£SI[\t\n\f\r ][^£]*£")]
	Condition,
	#[token("£OK")]
	KeepSpan,
	#[token("£KO")]
	DropSpan,
	#[token("£FIN")]
	CloseSpan,
}

/// Locate every marker in `text`, in order, with byte spans. A `£SI …£` run
/// with no comparator inside is not a marker and is skipped — the completeness
/// checker still surfaces it later as a leftover `£S` fragment.
pub fn scan_markers(text: &str) -> Vec<SpannedMarker> {
	let mut markers = Vec::new();

	for (result, span) in RawMarker::lexer(text).spanned() {
		let Ok(raw) = result else {
			continue;
		};

		let slice = &text[span.clone()];
		let marker = match raw {
			RawMarker::PercentPlaceholder => {
				// `{{` … `}}%`
				let field = slice[2..slice.len() - 3].to_string();
				Marker::PercentPlaceholder { field }
			}
			RawMarker::Placeholder => {
				let field = slice[2..slice.len() - 2].to_string();
				if field.contains("DATE") {
					Marker::DatePlaceholder { field }
				} else {
					Marker::Placeholder { field }
				}
			}
			RawMarker::Condition => {
				match parse_condition(slice) {
					Some((field, comparator, value)) => {
						Marker::Condition {
							field,
							comparator,
							value,
						}
					}
					None => continue,
				}
			}
			RawMarker::KeepSpan => Marker::Sentinel(Sentinel::Ok),
			RawMarker::DropSpan => Marker::Sentinel(Sentinel::Ko),
			RawMarker::CloseSpan => Marker::Sentinel(Sentinel::Fin),
		};

		markers.push(SpannedMarker { marker, span });
	}

	markers
}

/// Split the interior of a `£SI …£` run into field, comparator, and value.
/// The inequality comparator is checked first since `<>` never appears in a
/// field name while `=` may appear in a value.
fn parse_condition(slice: &str) -> Option<(String, Comparator, String)> {
	let body = slice
		.strip_prefix("£SI")?
		.strip_suffix('£')?
		.get(1..)?;

	let (field, comparator, value) = if let Some((field, value)) = body.split_once("<>") {
		(field, Comparator::Neq, value)
	} else if let Some((field, value)) = body.split_once('=') {
		(field, Comparator::Eq, value)
	} else {
		return None;
	};

	let field = field.trim();
	if field.is_empty() {
		return None;
	}

	Some((field.to_string(), comparator, value.trim().to_string()))
}

/// Count non-overlapping occurrences of `needle` within `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
	haystack.match_indices(needle).count()
}
