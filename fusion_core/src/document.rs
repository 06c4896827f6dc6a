use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

/// An in-memory mail-merge document: an ordered sequence of tabs, each with
/// one body. The host binding decides how documents are persisted; the core
/// only ever mutates this tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
	pub tabs: Vec<Tab>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tab {
	#[serde(default)]
	pub name: String,
	pub body: Body,
}

/// A body mixes top-level paragraphs and embedded tables in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
	#[serde(default)]
	pub children: Vec<BodyElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyElement {
	Paragraph(Paragraph),
	Table(Table),
}

/// One block of text. Markers live inside the text as substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
	pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
	pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
	pub cells: Vec<Cell>,
}

/// A table cell holds its own ordered block sequence. Conditional spans are
/// resolved per cell so removal can never touch sibling cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
	pub blocks: Vec<Paragraph>,
}

impl Paragraph {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into() }
	}
}

impl Document {
	/// Build a single-tab document from plain text, one paragraph per line.
	pub fn from_text(text: &str) -> Self {
		let children = text
			.lines()
			.map(|line| BodyElement::Paragraph(Paragraph::new(line)))
			.collect();

		Self {
			tabs: vec![Tab {
				name: String::new(),
				body: Body { children },
			}],
		}
	}

	/// Render the document back to plain text. Table cells are joined with
	/// ` | ` per row; this rendering is lossy and only meant for export.
	pub fn to_text(&self) -> String {
		let mut lines = Vec::new();

		for tab in &self.tabs {
			for child in &tab.body.children {
				match child {
					BodyElement::Paragraph(paragraph) => lines.push(paragraph.text.clone()),
					BodyElement::Table(table) => {
						for row in &table.rows {
							let cells: Vec<String> = row
								.cells
								.iter()
								.map(|cell| {
									cell
										.blocks
										.iter()
										.map(|block| block.text.as_str())
										.collect::<Vec<_>>()
										.join("\n")
								})
								.collect();
							lines.push(cells.join(" | "));
						}
					}
				}
			}
		}

		lines.join("\n")
	}
}

impl Body {
	/// Visit every paragraph text in document order — top-level paragraphs and
	/// the blocks of every table cell.
	pub fn for_each_text_mut<F>(&mut self, f: &mut F)
	where
		F: FnMut(&mut String),
	{
		for child in &mut self.children {
			match child {
				BodyElement::Paragraph(paragraph) => f(&mut paragraph.text),
				BodyElement::Table(table) => {
					for row in &mut table.rows {
						for cell in &mut row.cells {
							for block in &mut cell.blocks {
								f(&mut block.text);
							}
						}
					}
				}
			}
		}
	}

	/// The full body text — every paragraph, including cell-scoped blocks —
	/// joined with newlines. Used by the completeness checker.
	pub fn text(&self) -> String {
		let mut lines = Vec::new();

		for child in &self.children {
			match child {
				BodyElement::Paragraph(paragraph) => lines.push(paragraph.text.clone()),
				BodyElement::Table(table) => {
					for row in &table.rows {
						for cell in &row.cells {
							for block in &cell.blocks {
								lines.push(block.text.clone());
							}
						}
					}
				}
			}
		}

		lines.join("\n")
	}
}

/// A scalar value supplied by the row source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
	Number(f64),
	Date(NaiveDate),
	Text(String),
}

impl Value {
	/// The string representation used for condition comparison and plain
	/// substitution. Whole numbers render without a decimal part, dates as
	/// day/month/year.
	pub fn coerce(&self) -> String {
		match self {
			Value::Text(text) => text.clone(),
			Value::Number(number) => format_number(*number),
			Value::Date(date) => date.format("%d/%m/%Y").to_string(),
		}
	}

	/// Numeric view of the value, parsing text when possible. Dates have no
	/// numeric form.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Number(number) => Some(*number),
			Value::Text(text) => text.trim().parse::<f64>().ok(),
			Value::Date(_) => None,
		}
	}
}

fn format_number(number: f64) -> String {
	if number.is_finite() && number.fract() == 0.0 && number.abs() < 1e15 {
		format!("{}", number as i64)
	} else {
		format!("{number}")
	}
}

impl From<&str> for Value {
	fn from(text: &str) -> Self {
		Value::Text(text.to_string())
	}
}

impl From<String> for Value {
	fn from(text: String) -> Self {
		Value::Text(text)
	}
}

impl From<f64> for Value {
	fn from(number: f64) -> Self {
		Value::Number(number)
	}
}

impl From<i64> for Value {
	fn from(number: i64) -> Self {
		Value::Number(number as f64)
	}
}

impl From<NaiveDate> for Value {
	fn from(date: NaiveDate) -> Self {
		Value::Date(date)
	}
}

/// One unit of merge input: a mapping from field name (case-sensitive) to a
/// scalar value. Immutable for the duration of one merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRow {
	values: BTreeMap<String, Value>,
}

impl DataRow {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
		self.values.insert(field.into(), value.into());
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.values.get(field)
	}

	/// The single presence predicate shared by condition evaluation and
	/// substitution: the key exists and its value is not the empty string.
	/// Numeric zero counts as present.
	pub fn is_present(&self, field: &str) -> bool {
		match self.values.get(field) {
			Some(Value::Text(text)) => !text.is_empty(),
			Some(_) => true,
			None => false,
		}
	}

	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for DataRow
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut row = Self::new();
		for (field, value) in iter {
			row.insert(field, value);
		}
		row
	}
}
