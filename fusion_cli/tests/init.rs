mod common;

use fusion_core::AnyEmptyResult;

#[test]
fn init_creates_sample_run() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::fusion_cmd();
	let assert = cmd
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	assert
		.stdout(predicates::str::contains("Created"))
		.stdout(predicates::str::contains("Next steps"));

	let config_content = std::fs::read_to_string(tmp.path().join("fusion.toml"))?;
	assert!(config_content.contains("template = \"letter.txt\""));
	assert!(config_content.contains("data = \"rows.csv\""));

	let template_content = std::fs::read_to_string(tmp.path().join("letter.txt"))?;
	assert!(template_content.contains("£SI VIP=YES£"));
	assert!(template_content.contains("£FIN"));
	assert!(template_content.contains("{{NAME}}"));

	let rows_content = std::fs::read_to_string(tmp.path().join("rows.csv"))?;
	assert!(rows_content.starts_with("NAME,VIP,DISCOUNT"));

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config_path = tmp.path().join("fusion.toml");
	std::fs::write(&config_path, "existing config")?;

	let mut cmd = common::fusion_cmd();
	let assert = cmd
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	assert.stdout(predicates::str::contains("already exists"));

	let content = std::fs::read_to_string(&config_path)?;
	assert_eq!(content, "existing config");

	Ok(())
}

#[test]
fn init_produces_a_mergeable_run() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::fusion_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	// The generated sample must resolve cleanly for every sample row.
	common::fusion_cmd()
		.arg("merge")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("2 succeeded, 0 failed"));

	let ana = std::fs::read_to_string(tmp.path().join("out").join("Ana.txt"))?;
	similar_asserts::assert_eq!(ana, "Hello Ana, you get a discount, 20%.\n");

	let bob = std::fs::read_to_string(tmp.path().join("out").join("Bob.txt"))?;
	similar_asserts::assert_eq!(bob, "Hello Bob, no discount this time.\n");

	Ok(())
}
