use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum FusionError {
	#[error(transparent)]
	#[diagnostic(code(fusion::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(fusion::config_parse),
		help("check that fusion.toml is valid TOML with `template` and `data` entries")
	)]
	ConfigParse(String),

	#[error("no config file found in `{0}`")]
	#[diagnostic(
		code(fusion::missing_config),
		help("create a `fusion.toml` (or `.fusion.toml`) in the run root, or run `fusion init`")
	)]
	MissingConfig(String),

	#[error("no template configured")]
	#[diagnostic(
		code(fusion::missing_template),
		help("set `template = \"...\"` in fusion.toml to the document the merge should copy")
	)]
	MissingTemplate,

	#[error("failed to parse document `{path}`: {reason}")]
	#[diagnostic(code(fusion::document_parse))]
	DocumentParse { path: String, reason: String },

	#[error("row source failure: {0}")]
	#[diagnostic(code(fusion::row_source))]
	RowSource(String),

	#[error("document store failure: {0}")]
	#[diagnostic(code(fusion::document_store))]
	DocumentStore(String),

	#[error("export failure: {0}")]
	#[diagnostic(code(fusion::export))]
	Export(String),
}

pub type FusionResult<T> = Result<T, FusionError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
