//! Shared fixtures for the core test suite: sample documents and in-memory
//! collaborator implementations for orchestrator tests.

use std::collections::HashMap;

use crate::Body;
use crate::BodyElement;
use crate::Cell;
use crate::DataRow;
use crate::Document;
use crate::DocumentStore;
use crate::ExportSink;
use crate::FusionError;
use crate::FusionResult;
use crate::Paragraph;
use crate::RowSource;
use crate::StatusSink;
use crate::Tab;
use crate::Table;
use crate::TableRow;

pub fn paragraphs(texts: &[&str]) -> Vec<Paragraph> {
	texts.iter().map(|text| Paragraph::new(*text)).collect()
}

pub fn body_of(texts: &[&str]) -> Body {
	Body {
		children: texts
			.iter()
			.map(|text| BodyElement::Paragraph(Paragraph::new(*text)))
			.collect(),
	}
}

pub fn cell_of(texts: &[&str]) -> Cell {
	Cell {
		blocks: paragraphs(texts),
	}
}

/// The end-to-end scenario template body.
pub fn letter_template() -> Document {
	Document::from_text(
		"Hello {{NAME}}, £SI VIP=YES£you get a discount£FIN, {{DISCOUNT}}%£SI VIP=NO£, sorry£FIN.",
	)
}

/// A document with one two-cell table: the first cell holds a droppable span,
/// the second plain content.
pub fn table_document() -> Document {
	Document {
		tabs: vec![Tab {
			name: String::new(),
			body: Body {
				children: vec![
					BodyElement::Paragraph(Paragraph::new("before")),
					BodyElement::Table(Table {
						rows: vec![TableRow {
							cells: vec![
								cell_of(&["£KO", "dropped", "£FIN", "kept"]),
								cell_of(&["left", "alone"]),
							],
						}],
					}),
					BodyElement::Paragraph(Paragraph::new("after")),
				],
			},
		}],
	}
}

pub fn vip_row() -> DataRow {
	let mut row = DataRow::new();
	row.insert("NAME", "Ana");
	row.insert("VIP", "YES");
	row.insert("DISCOUNT", 0.2);
	row
}

pub struct VecRowSource(pub Vec<DataRow>);

impl RowSource for VecRowSource {
	fn rows(&mut self) -> FusionResult<Vec<DataRow>> {
		Ok(self.0.clone())
	}
}

/// Document store keeping the template and every working copy in memory.
pub struct MemoryStore {
	pub template: Document,
	pub saved: HashMap<String, Document>,
}

impl MemoryStore {
	pub fn new(template: Document) -> Self {
		Self {
			template,
			saved: HashMap::new(),
		}
	}
}

impl DocumentStore for MemoryStore {
	fn copy_template(&mut self, template: &str, name: &str) -> FusionResult<String> {
		if template.is_empty() {
			return Err(FusionError::DocumentStore("unknown template".to_string()));
		}

		let doc_ref = format!("{name}.copy");
		self.saved.insert(doc_ref.clone(), self.template.clone());
		Ok(doc_ref)
	}

	fn open(&mut self, doc_ref: &str) -> FusionResult<Document> {
		self.saved.get(doc_ref).cloned().ok_or_else(|| {
			FusionError::DocumentStore(format!("missing document `{doc_ref}`"))
		})
	}

	fn save(&mut self, doc_ref: &str, document: &Document) -> FusionResult<()> {
		self.saved.insert(doc_ref.to_string(), document.clone());
		Ok(())
	}
}

#[derive(Default)]
pub struct MemoryExport {
	/// `(doc_ref, name)` pairs in export order.
	pub exported: Vec<(String, String)>,
}

impl ExportSink for MemoryExport {
	fn export(&mut self, doc_ref: &str, name: &str) -> FusionResult<()> {
		self.exported.push((doc_ref.to_string(), name.to_string()));
		Ok(())
	}
}

/// Export sink that fails every call, for collaborator-failure tests.
pub struct FailingExport;

impl ExportSink for FailingExport {
	fn export(&mut self, _doc_ref: &str, _name: &str) -> FusionResult<()> {
		Err(FusionError::Export("sink unreachable".to_string()))
	}
}

#[derive(Default)]
pub struct BufferStatus {
	pub lines: Vec<(usize, String)>,
}

impl StatusSink for BufferStatus {
	fn report(&mut self, row_index: usize, message: &str) {
		self.lines.push((row_index, message.to_string()));
	}
}
