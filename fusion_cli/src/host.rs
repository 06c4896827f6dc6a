//! File-backed collaborator implementations: CSV rows in, text artifacts and
//! a status log out.

use std::collections::HashMap;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;
use fusion_core::DataRow;
use fusion_core::Document;
use fusion_core::DocumentStore;
use fusion_core::ExportSink;
use fusion_core::FusionError;
use fusion_core::FusionResult;
use fusion_core::RowSource;
use fusion_core::StatusSink;
use fusion_core::Value;

/// Load a template or working document from disk.
///
/// Files with a `.json` extension use the structured document model; anything
/// else is read as plain text, one paragraph per line.
pub fn load_document(path: &Path) -> FusionResult<Document> {
	let raw = fs::read_to_string(path)?;

	if path.extension().is_some_and(|extension| extension == "json") {
		serde_json::from_str(&raw).map_err(|error| FusionError::DocumentParse {
			path: path.display().to_string(),
			reason: error.to_string(),
		})
	} else {
		Ok(Document::from_text(&raw))
	}
}

/// Infer a typed value from a raw CSV cell: numbers first, then ISO dates,
/// then text. An empty cell stays empty text, which the engine treats as
/// absent.
pub fn parse_value(raw: &str) -> Value {
	let trimmed = raw.trim();

	if let Ok(number) = trimmed.parse::<f64>() {
		return Value::Number(number);
	}

	if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
		return Value::Date(date);
	}

	Value::Text(raw.to_string())
}

/// Row source reading a CSV file whose header row names the fields.
pub struct CsvRowSource {
	path: PathBuf,
}

impl CsvRowSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl RowSource for CsvRowSource {
	fn rows(&mut self) -> FusionResult<Vec<DataRow>> {
		let mut reader = csv::Reader::from_path(&self.path)
			.map_err(|error| FusionError::RowSource(error.to_string()))?;
		let headers = reader
			.headers()
			.map_err(|error| FusionError::RowSource(error.to_string()))?
			.clone();
		let mut rows = Vec::new();

		for record in reader.records() {
			let record = record.map_err(|error| FusionError::RowSource(error.to_string()))?;
			let mut row = DataRow::new();

			for (header, cell) in headers.iter().zip(record.iter()) {
				row.insert(header, parse_value(cell));
			}

			rows.push(row);
		}

		Ok(rows)
	}
}

/// Document store backed by the filesystem.
///
/// Working copies live in memory while a row is being resolved; [`save`]
/// persists them as structured `.json` artifacts in the output directory so
/// that failed rows keep their partial document for inspection.
///
/// [`save`]: DocumentStore::save
pub struct FsDocumentStore {
	root: PathBuf,
	output: PathBuf,
	dry_run: bool,
	documents: HashMap<String, Document>,
}

impl FsDocumentStore {
	pub fn new(root: impl Into<PathBuf>, output: impl Into<PathBuf>, dry_run: bool) -> Self {
		Self {
			root: root.into(),
			output: output.into(),
			dry_run,
			documents: HashMap::new(),
		}
	}
}

impl DocumentStore for FsDocumentStore {
	fn copy_template(&mut self, template: &str, name: &str) -> FusionResult<String> {
		let document = load_document(&self.root.join(template))?;
		let doc_ref = format!("{name}.copy");
		self.documents.insert(doc_ref.clone(), document);

		Ok(doc_ref)
	}

	fn open(&mut self, doc_ref: &str) -> FusionResult<Document> {
		self.documents.get(doc_ref).cloned().ok_or_else(|| {
			FusionError::DocumentStore(format!("no working copy named `{doc_ref}`"))
		})
	}

	fn save(&mut self, doc_ref: &str, document: &Document) -> FusionResult<()> {
		self.documents.insert(doc_ref.to_string(), document.clone());

		if self.dry_run {
			return Ok(());
		}

		let raw = serde_json::to_string_pretty(document)
			.map_err(|error| FusionError::DocumentStore(error.to_string()))?;
		fs::create_dir_all(&self.output)?;
		fs::write(self.output.join(format!("{doc_ref}.json")), raw)?;

		Ok(())
	}
}

/// Export sink rendering a saved working copy as a plain-text artifact named
/// after the row.
pub struct TextExportSink {
	output: PathBuf,
	dry_run: bool,
}

impl TextExportSink {
	pub fn new(output: impl Into<PathBuf>, dry_run: bool) -> Self {
		Self {
			output: output.into(),
			dry_run,
		}
	}
}

impl ExportSink for TextExportSink {
	fn export(&mut self, doc_ref: &str, name: &str) -> FusionResult<()> {
		if self.dry_run {
			return Ok(());
		}

		let source = self.output.join(format!("{doc_ref}.json"));
		let document =
			load_document(&source).map_err(|error| FusionError::Export(error.to_string()))?;
		fs::write(
			self.output.join(format!("{name}.txt")),
			format!("{}\n", document.to_text()),
		)?;

		Ok(())
	}
}

/// Status sink appending one line per row to a log file.
///
/// Reporting never fails the batch: a log that cannot be written is noted on
/// stderr and the run continues.
pub struct FileStatusSink {
	path: PathBuf,
	dry_run: bool,
}

impl FileStatusSink {
	pub fn new(path: impl Into<PathBuf>, dry_run: bool) -> Self {
		Self {
			path: path.into(),
			dry_run,
		}
	}
}

impl StatusSink for FileStatusSink {
	fn report(&mut self, row_index: usize, message: &str) {
		if self.dry_run {
			return;
		}

		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).ok();
		}

		let appended = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)
			.and_then(|mut file| writeln!(file, "row {row_index}: {message}"));

		if let Err(error) = appended {
			eprintln!("warning: could not write {}: {error}", self.path.display());
		}
	}
}
