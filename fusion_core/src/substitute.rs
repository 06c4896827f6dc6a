use chrono::NaiveDate;

use crate::document::DataRow;
use crate::document::Document;
use crate::document::Value;
use crate::lexer::Marker;
use crate::lexer::scan_markers;

/// Replace every placeholder whose field is present in the row, across the
/// whole document tree. Returns the number of replacements.
///
/// The scanner tokenizes `{{field}}%` as a single marker, so percent
/// substitution can never leave a dangling `%` behind a plain replacement.
/// Placeholders for absent fields are left untouched for the completeness
/// checker to count. Once no placeholder for a present field remains, this
/// is a no-op.
pub fn substitute_placeholders(
	document: &mut Document,
	row: &DataRow,
	date_format: &str,
) -> usize {
	let mut replaced = 0;

	for tab in &mut document.tabs {
		tab.body.for_each_text_mut(&mut |text| {
			let (resolved, count) = substitute_text(text, row, date_format);
			if count > 0 {
				*text = resolved;
				replaced += count;
			}
		});
	}

	replaced
}

fn substitute_text(text: &str, row: &DataRow, date_format: &str) -> (String, usize) {
	let mut out = String::with_capacity(text.len());
	let mut cursor = 0;
	let mut replaced = 0;

	for spanned in scan_markers(text) {
		let rendered = match &spanned.marker {
			Marker::PercentPlaceholder { field } => render_percent(row, field),
			Marker::DatePlaceholder { field } => render_date(row, field, date_format),
			Marker::Placeholder { field } => render_plain(row, field),
			Marker::Condition { .. } | Marker::Sentinel(_) => None,
		};

		let Some(rendered) = rendered else {
			continue;
		};

		out.push_str(&text[cursor..spanned.span.start]);
		out.push_str(&rendered);
		cursor = spanned.span.end;
		replaced += 1;
	}

	out.push_str(&text[cursor..]);
	(out, replaced)
}

/// `{{field}}%` — the value as a float, ×100, rounded to the nearest integer,
/// rendered as digits followed by `%`. Values with no numeric form leave the
/// placeholder untouched.
fn render_percent(row: &DataRow, field: &str) -> Option<String> {
	if !row.is_present(field) {
		return None;
	}

	let value = row.get(field)?.as_f64()?;
	Some(format!("{}%", (value * 100.0).round() as i64))
}

/// `{{field}}` where the field name contains `DATE` — formatted with the
/// configured day/month/year format. Text values are reparsed when they look
/// like a date, otherwise substituted verbatim.
fn render_date(row: &DataRow, field: &str, date_format: &str) -> Option<String> {
	if !row.is_present(field) {
		return None;
	}

	match row.get(field)? {
		Value::Date(date) => Some(date.format(date_format).to_string()),
		Value::Text(text) => {
			let parsed = NaiveDate::parse_from_str(text, "%Y-%m-%d")
				.or_else(|_| NaiveDate::parse_from_str(text, date_format));

			Some(match parsed {
				Ok(date) => date.format(date_format).to_string(),
				Err(_) => text.clone(),
			})
		}
		value @ Value::Number(_) => Some(value.coerce()),
	}
}

fn render_plain(row: &DataRow, field: &str) -> Option<String> {
	if !row.is_present(field) {
		return None;
	}

	Some(row.get(field)?.coerce())
}
