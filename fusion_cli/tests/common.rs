use assert_cmd::Command;

pub fn fusion_cmd() -> Command {
	let mut cmd = Command::cargo_bin("fusion").expect("`fusion` binary should build");
	cmd.env("NO_COLOR", "1");
	cmd
}
