pub mod host;

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Mail-merge conditional templates against rows of data.",
	long_about = "fusion resolves a template document against each row of a data source: \
	              condition markers (`£SI field=value£`) decide which blocks survive, \
	              placeholders (`{{field}}`, `{{field}}%`, date fields) are substituted, and \
	              every row gets a per-row success/failure status.\n\nQuick start:\n  fusion \
	              init   Create a sample run (config, template, rows)\n  fusion merge  Resolve \
	              every configured row\n  fusion count  Count unresolved markers in a document"
)]
pub struct FusionCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the run root directory (where fusion.toml lives).
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize a merge run by creating sample files.
	///
	/// Creates `fusion.toml`, a sample template, and a sample rows file in
	/// the run root. Existing files are left untouched, so re-running is
	/// always safe.
	Init,
	/// Merge every configured row through the template and export the
	/// results.
	///
	/// For each row a fresh copy of the template is resolved: conditions are
	/// rewritten, conditional blocks flattened or removed, placeholders
	/// substituted. Rows that resolve completely are exported as `.txt`
	/// artifacts; rows with leftover markers keep their partial document as
	/// a `.json` error artifact. One status line per row is appended to
	/// `status.log` in the output directory.
	///
	/// Exits with a non-zero status code when any row failed.
	Merge {
		/// Resolve and check every row without writing any file.
		#[arg(long, default_value_t = false)]
		dry_run: bool,
	},
	/// Count unresolved placeholders and markers in a document file.
	///
	/// Accepts a structured `.json` document or a plain-text file. Prints
	/// the count and exits with a non-zero status code when any marker
	/// remains, so it can gate a pipeline.
	Count {
		/// Path to the document to inspect.
		document: PathBuf,
	},
}
