mod common;

use std::path::Path;

use fusion_core::AnyEmptyResult;

const CONFIG: &str =
	"template = \"letter.txt\"\ndata = \"rows.csv\"\noutput = \"out\"\nname_field = \"NAME\"\n";

const TEMPLATE: &str = "Hello {{NAME}}, £SI VIP=YES£you get a discount£FIN, {{DISCOUNT}}%£SI \
                        VIP=NO£, sorry£FIN.\n";

fn write_run(root: &Path, rows: &str) -> AnyEmptyResult {
	std::fs::write(root.join("fusion.toml"), CONFIG)?;
	std::fs::write(root.join("letter.txt"), TEMPLATE)?;
	std::fs::write(root.join("rows.csv"), rows)?;

	Ok(())
}

#[test]
fn merge_exports_complete_rows() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_run(tmp.path(), "NAME,VIP,DISCOUNT\nAna,YES,0.2\n")?;

	common::fusion_cmd()
		.arg("merge")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Ana: OK: document exported"))
		.stdout(predicates::str::contains("1 succeeded, 0 failed"));

	let out = tmp.path().join("out");
	let exported = std::fs::read_to_string(out.join("Ana.txt"))?;
	similar_asserts::assert_eq!(exported, "Hello Ana, you get a discount, 20%.\n");

	// The resolved working copy is persisted alongside the export.
	assert!(out.join("Ana.copy.json").is_file());

	let status = std::fs::read_to_string(out.join("status.log"))?;
	assert!(status.contains("row 1: Ana: OK"));

	Ok(())
}

#[test]
fn merge_keeps_going_past_failed_rows() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	// Bob's DISCOUNT is empty, so his placeholder cannot be resolved.
	write_run(tmp.path(), "NAME,VIP,DISCOUNT\nAna,YES,0.2\nBob,NO,\n")?;

	common::fusion_cmd()
		.arg("merge")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Ana: OK"))
		.stdout(predicates::str::contains(
			"Bob: error: 1 unresolved markers",
		))
		.stdout(predicates::str::contains("1 succeeded, 1 failed"));

	let out = tmp.path().join("out");

	// Ana is exported; Bob is not.
	assert!(out.join("Ana.txt").is_file());
	assert!(!out.join("Bob.txt").exists());

	// Bob's partially merged document stays on disk for inspection.
	let artifact = std::fs::read_to_string(out.join("Bob.copy.json"))?;
	assert!(artifact.contains("{{DISCOUNT}}%"));

	let status = std::fs::read_to_string(out.join("status.log"))?;
	assert!(status.contains("row 1: Ana: OK"));
	assert!(status.contains("row 2: Bob: error"));

	Ok(())
}

#[test]
fn merge_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_run(tmp.path(), "NAME,VIP,DISCOUNT\nAna,YES,0.2\nBob,NO,\n")?;

	common::fusion_cmd()
		.arg("merge")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stdout(predicates::str::contains("Dry run"))
		.stdout(predicates::str::contains("1 succeeded, 1 failed"));

	assert!(!tmp.path().join("out").exists());

	Ok(())
}

#[test]
fn merge_honors_the_configured_row_range() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_run(tmp.path(), "NAME,VIP,DISCOUNT\nAna,YES,0.2\nBob,NO,\n")?;
	std::fs::write(
		tmp.path().join("fusion.toml"),
		format!("{CONFIG}\n[rows]\nfirst = 1\nlast = 1\n"),
	)?;

	common::fusion_cmd()
		.arg("merge")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("1 succeeded, 0 failed (1 row(s) total)"));

	assert!(!tmp.path().join("out").join("Bob.copy.json").exists());

	Ok(())
}

#[test]
fn merge_without_config_aborts() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::fusion_cmd()
		.arg("merge")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("no config file found"));

	Ok(())
}

#[test]
fn merge_names_nameless_rows_by_number() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("fusion.toml"),
		"template = \"letter.txt\"\ndata = \"rows.csv\"\noutput = \"out\"\nname_field = \"ID\"\n",
	)?;
	std::fs::write(tmp.path().join("letter.txt"), "Discount: {{DISCOUNT}}%\n")?;
	std::fs::write(tmp.path().join("rows.csv"), "VIP,DISCOUNT\nYES,0.2\n")?;

	common::fusion_cmd()
		.arg("merge")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("row-1: OK"));

	let exported = std::fs::read_to_string(tmp.path().join("out").join("row-1.txt"))?;
	similar_asserts::assert_eq!(exported, "Discount: 20%\n");

	Ok(())
}
