use std::path::Path;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use fusion_cli::Commands;
use fusion_cli::FusionCli;
use fusion_cli::host::CsvRowSource;
use fusion_cli::host::FileStatusSink;
use fusion_cli::host::FsDocumentStore;
use fusion_cli::host::TextExportSink;
use fusion_cli::host::load_document;
use fusion_core::BatchSummary;
use fusion_core::MergeConfig;
use fusion_core::count_unresolved;
use fusion_core::run_batch;
use owo_colors::OwoColorize;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = FusionCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose);

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Merge { dry_run }) => run_merge(&args, dry_run),
		Some(Commands::Count { ref document }) => run_count(document),
		None => {
			eprintln!("No subcommand specified. Run `fusion --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<fusion_core::FusionError>() {
			Ok(fusion_err) => {
				let report: miette::Report = (*fusion_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Route `tracing` events to stderr. `--verbose` turns on debug-level engine
/// traces; otherwise `RUST_LOG` decides.
fn init_tracing(verbose: bool) {
	let filter = if verbose {
		tracing_subscriber::EnvFilter::new("debug")
	} else {
		tracing_subscriber::EnvFilter::from_default_env()
	};

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}

fn resolve_root(args: &FusionCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

const SAMPLE_CONFIG: &str = "# fusion configuration\n\n# Template document resolved once per \
                             row.\ntemplate = \"letter.txt\"\n\n# CSV data source; the header row \
                             names the fields.\ndata = \"rows.csv\"\n\n# Output directory for \
                             artifacts and the status log.\noutput = \"out\"\n\n# Field naming \
                             each row's artifact.\nname_field = \"NAME\"\n\n# Limit the run to a \
                             1-based row range.\n# [rows]\n# first = 1\n# last = 10\n";

const SAMPLE_TEMPLATE: &str = "Hello {{NAME}}, £SI VIP=YES£you get a discount, \
                               {{DISCOUNT}}%£FIN£SI VIP=NO£no discount this time£FIN.\n";

const SAMPLE_ROWS: &str = "NAME,VIP,DISCOUNT\nAna,YES,0.2\nBob,NO,\n";

fn run_init(args: &FusionCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);

	write_if_absent(&root.join("fusion.toml"), SAMPLE_CONFIG)?;
	write_if_absent(&root.join("letter.txt"), SAMPLE_TEMPLATE)?;
	write_if_absent(&root.join("rows.csv"), SAMPLE_ROWS)?;

	println!();
	println!("Next steps:");
	println!("  1. Edit letter.txt and rows.csv");
	println!("  2. Run `fusion merge` to resolve every row");

	Ok(())
}

fn write_if_absent(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
	if path.exists() {
		println!("File already exists: {}", path.display());
	} else {
		std::fs::write(path, content)?;
		println!("Created {}", path.display());
	}

	Ok(())
}

fn run_merge(args: &FusionCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = MergeConfig::discover(&root)?;
	let output = root.join(&config.output);

	let mut rows = CsvRowSource::new(root.join(&config.data));
	let mut store = FsDocumentStore::new(&root, &output, dry_run);
	let mut export = TextExportSink::new(&output, dry_run);
	let mut status = FileStatusSink::new(output.join("status.log"), dry_run);

	if dry_run {
		println!("Dry run: no file will be written.");
	}

	let summary = run_batch(&config, &mut rows, &mut store, &mut export, &mut status)?;
	print_summary(&summary);

	if !summary.is_ok() {
		process::exit(1);
	}

	Ok(())
}

fn print_summary(summary: &BatchSummary) {
	for line in &summary.log {
		if line.contains(": OK:") {
			println!("{}", colored!(line, green));
		} else {
			println!("{}", colored!(line, red));
		}
	}

	println!();
	println!(
		"{}",
		colored!(
			format!(
				"{} succeeded, {} failed ({} row(s) total)",
				summary.succeeded,
				summary.failed,
				summary.total()
			),
			bold
		)
	);
}

fn run_count(document: &Path) -> Result<(), Box<dyn std::error::Error>> {
	let document = load_document(document)?;
	let count = count_unresolved(&document);

	println!("{count} unresolved marker(s)");

	if count > 0 {
		process::exit(1);
	}

	Ok(())
}
