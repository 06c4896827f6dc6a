mod common;

use fusion_core::AnyEmptyResult;
use rstest::rstest;

#[rstest]
#[case::leftover_markers("Hello {{NAME}}, £OK leftover\n", "2 unresolved marker(s)", 1)]
#[case::clean_document("Hello Ana, you get a discount, 20%.\n", "0 unresolved marker(s)", 0)]
fn count_totals_plain_text_markers(
	#[case] content: &str,
	#[case] expected: &str,
	#[case] exit_code: i32,
) -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let document = tmp.path().join("letter.txt");
	std::fs::write(&document, content)?;

	common::fusion_cmd()
		.arg("count")
		.arg(&document)
		.assert()
		.code(exit_code)
		.stdout(predicates::str::contains(expected));

	Ok(())
}

#[test]
fn count_reads_structured_documents() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let document = tmp.path().join("letter.json");
	std::fs::write(
		&document,
		r#"{"tabs":[{"name":"","body":{"children":[{"text":"still has {{NAME}}"}]}}]}"#,
	)?;

	common::fusion_cmd()
		.arg("count")
		.arg(&document)
		.assert()
		.code(1)
		.stdout(predicates::str::contains("1 unresolved marker(s)"));

	Ok(())
}

#[test]
fn count_rejects_a_missing_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::fusion_cmd()
		.arg("count")
		.arg(tmp.path().join("absent.txt"))
		.assert()
		.code(2);

	Ok(())
}
