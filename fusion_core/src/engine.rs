use derive_more::Display;
use tracing::debug;

use crate::FusionResult;
use crate::checker::count_unresolved;
use crate::conditions::evaluate_conditions;
use crate::config::DEFAULT_DATE_FORMAT;
use crate::config::MergeConfig;
use crate::document::DataRow;
use crate::document::Document;
use crate::document::Value;
use crate::lexer::Comparator;
use crate::resolver::resolve_document;
use crate::substitute::substitute_placeholders;

/// Supplies the ordered data rows for one run.
pub trait RowSource {
	fn rows(&mut self) -> FusionResult<Vec<DataRow>>;
}

/// Host document storage. Document references are opaque host-specific
/// identifiers; the core only moves them between calls.
pub trait DocumentStore {
	/// Copy the template into a fresh working document named after the row.
	fn copy_template(&mut self, template: &str, name: &str) -> FusionResult<String>;
	/// Materialize a working document for in-memory resolution.
	fn open(&mut self, doc_ref: &str) -> FusionResult<Document>;
	/// Persist a resolved (or partially resolved) working document.
	fn save(&mut self, doc_ref: &str, document: &Document) -> FusionResult<()>;
}

/// Turns a resolved document into a distributed artifact.
pub trait ExportSink {
	fn export(&mut self, doc_ref: &str, name: &str) -> FusionResult<()>;
}

/// Append-only, human-readable per-row status log.
pub trait StatusSink {
	fn report(&mut self, row_index: usize, message: &str);
}

/// Per-row pipeline states.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
	Pending,
	Evaluating,
	Resolving,
	Substituting,
	Checking,
	Succeeded,
	Failed,
}

/// Knobs for the per-document pipeline.
#[derive(Debug, Clone)]
pub struct MergeOptions {
	/// chrono format for date placeholder rendering.
	pub date_format: String,
}

impl Default for MergeOptions {
	fn default() -> Self {
		Self {
			date_format: DEFAULT_DATE_FORMAT.to_string(),
		}
	}
}

impl From<&MergeConfig> for MergeOptions {
	fn from(config: &MergeConfig) -> Self {
		Self {
			date_format: config.date_format.clone(),
		}
	}
}

/// The verdict for one row's merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
	/// Terminal state: `Succeeded` or `Failed`.
	pub state: RowState,
	/// Unresolved markers counted by the completeness check.
	pub unresolved: usize,
	/// Placeholder replacements performed.
	pub substitutions: usize,
}

impl MergeOutcome {
	pub fn is_success(&self) -> bool {
		self.state == RowState::Succeeded
	}
}

/// Accumulated result of one batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
	pub succeeded: usize,
	pub failed: usize,
	/// One human-readable status line per processed row, in row order.
	pub log: Vec<String>,
}

impl BatchSummary {
	pub fn total(&self) -> usize {
		self.succeeded + self.failed
	}

	pub fn is_ok(&self) -> bool {
		self.failed == 0
	}
}

/// Drive one data row through the full resolution pipeline:
/// condition evaluation (both comparators) → block resolution (table-aware,
/// then linear) → placeholder substitution → completeness check.
///
/// The document is mutated in place; on failure it holds the partially merged
/// state for inspection.
pub fn merge_row(document: &mut Document, row: &DataRow, options: &MergeOptions) -> MergeOutcome {
	let mut state = RowState::Pending;
	debug!(%state, "row dispatched");

	state = RowState::Evaluating;
	debug!(%state, "rewriting condition markers");
	evaluate_conditions(document, row, Comparator::Eq);
	evaluate_conditions(document, row, Comparator::Neq);

	state = RowState::Resolving;
	debug!(%state, "resolving conditional spans");
	resolve_document(document);

	state = RowState::Substituting;
	let substitutions = substitute_placeholders(document, row, &options.date_format);
	debug!(%state, substitutions, "placeholders substituted");

	state = RowState::Checking;
	let unresolved = count_unresolved(document);
	debug!(%state, unresolved, "completeness checked");

	state = if unresolved == 0 {
		RowState::Succeeded
	} else {
		RowState::Failed
	};

	MergeOutcome {
		state,
		unresolved,
		substitutions,
	}
}

/// Merge every configured row, strictly sequentially. A failed row — whether
/// from leftover markers or a collaborator failure — is reported through the
/// status sink and never blocks subsequent rows. Only configuration errors
/// abort the run.
pub fn run_batch(
	config: &MergeConfig,
	rows: &mut impl RowSource,
	store: &mut impl DocumentStore,
	export: &mut impl ExportSink,
	status: &mut impl StatusSink,
) -> FusionResult<BatchSummary> {
	config.validate()?;

	let options = MergeOptions::from(config);
	let all_rows = rows.rows()?;
	let bounds = config.row_bounds(all_rows.len());
	let mut summary = BatchSummary::default();

	for (index, row) in all_rows
		.iter()
		.enumerate()
		.take(bounds.end)
		.skip(bounds.start)
	{
		let row_number = index + 1;
		let name = artifact_name(config, row, row_number);

		let message = match merge_one(&name, row, config, store, export, &options) {
			Ok(outcome) if outcome.is_success() => {
				summary.succeeded += 1;
				format!(
					"{name}: OK: document exported ({} substitutions)",
					outcome.substitutions
				)
			}
			Ok(outcome) => {
				summary.failed += 1;
				format!(
					"{name}: error: {} unresolved markers remain in the document",
					outcome.unresolved
				)
			}
			Err(error) => {
				// Collaborator failures are fatal for this row only.
				summary.failed += 1;
				format!("{name}: error: {error}")
			}
		};

		status.report(row_number, &message);
		summary.log.push(message);
	}

	Ok(summary)
}

fn merge_one(
	name: &str,
	row: &DataRow,
	config: &MergeConfig,
	store: &mut impl DocumentStore,
	export: &mut impl ExportSink,
	options: &MergeOptions,
) -> FusionResult<MergeOutcome> {
	let doc_ref = store.copy_template(&config.template, name)?;
	let mut document = store.open(&doc_ref)?;

	let outcome = merge_row(&mut document, row, options);

	// The document is saved in either case: a failed row keeps its partially
	// merged state as an inspectable error artifact, it is not rolled back.
	store.save(&doc_ref, &document)?;

	if outcome.is_success() {
		export.export(&doc_ref, name)?;
	}

	Ok(outcome)
}

/// Per-row artifact name: the configured name field's value when present,
/// otherwise the 1-based row number.
fn artifact_name(config: &MergeConfig, row: &DataRow, row_number: usize) -> String {
	row.get(&config.name_field)
		.map(Value::coerce)
		.filter(|name| !name.is_empty())
		.unwrap_or_else(|| format!("row-{row_number}"))
}
