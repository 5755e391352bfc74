//! CLI integration tests.
//!
//! Uses `assert_cmd` to spawn the `rodzo` binary inside a temporary
//! directory and checks exit codes, stdout, stderr and written files.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const STACK_SPEC: &str = r#"#include <stdlib.h>

describe "stack"
{
  it "pushes"
  {
    ensure(1 i== 1);
  }
  it "pops"
  {
    ensure("a" === "a");
  }
  it "peeks"
}
"#;

/// A temp dir holding one spec file.
fn workspace() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("stack_spec.c"), STACK_SPEC).unwrap();
    dir
}

/// The `rodzo` binary run in `dir`, with no filters leaking in from the
/// caller's environment.
fn rodzo(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("rodzo");
    cmd.current_dir(dir);
    for var in ["E", "L", "I", "F", "RDZ_HEXDUMP", "CC", "CFLAGS", "RODZO_LOG"] {
        cmd.env_remove(var);
    }
    cmd.env("RDZ_NO_DURATION", "1").env("NO_COLOR", "1");
    cmd
}

// ──────────────────────────────────────────────
// 1. Help, version and usage errors
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = workspace();
    rodzo(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("BDD spec compiler for C"))
        .stdout(predicate::str::contains("--valgrind"));
}

#[test]
fn version_exits_0() {
    let dir = workspace();
    rodzo(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rodzo"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let dir = workspace();
    rodzo(dir.path()).arg("--frobnicate").assert().code(2);
}

#[test]
fn json_requires_dry_run() {
    let dir = workspace();
    rodzo(dir.path()).arg("--json").assert().code(2);
}

// ──────────────────────────────────────────────
// 2. Compiling
// ──────────────────────────────────────────────

#[test]
fn compiles_current_directory_to_spec_c() {
    let dir = workspace();
    rodzo(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(". processing stack_spec.c"))
        .stdout(predicate::str::contains(". wrote spec.c"));

    let program = fs::read_to_string(dir.path().join("spec.c")).unwrap();
    assert!(program.contains("static void rdz_example_3(int rdz_nid)"));
    assert!(program.contains("static void rdz_example_4(int rdz_nid)"));
    assert!(!program.contains("rdz_example_5("));
    assert!(program.contains("\"not yet implemented\""));
    assert!(program.contains("int main(int argc, char *argv[])"));
}

#[test]
fn output_flag_and_debug_dumps() {
    let dir = workspace();
    fs::create_dir(dir.path().join("out")).unwrap();
    rodzo(dir.path())
        .args(["-q", "-d", "-o", "out/all.c", "stack_spec.c"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(dir.path().join("out/all.c").exists());
    let json = fs::read_to_string(dir.path().join("out/all.tree.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["files"][0], "stack_spec.c");
    let pseudo = fs::read_to_string(dir.path().join("out/all.pseudo.txt")).unwrap();
    assert!(pseudo.contains("it \"pushes\""));
}

#[test]
fn directories_are_scanned_recursively() {
    let dir = workspace();
    fs::create_dir_all(dir.path().join("spec/deep")).unwrap();
    fs::write(
        dir.path().join("spec/deep/queue_spec.c"),
        "it \"enqueues\" {\n}\n",
    )
    .unwrap();
    fs::write(dir.path().join("spec/helpers.c"), "int helper;\n").unwrap();

    rodzo(dir.path())
        .arg("spec")
        .assert()
        .success()
        .stdout(predicate::str::contains(". processing spec/deep/queue_spec.c"))
        .stdout(predicate::str::contains("helpers.c").not());
}

#[test]
fn no_spec_files_exits_1() {
    let dir = TempDir::new().unwrap();
    rodzo(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no spec files found under ."));
}

#[test]
fn unwritable_output_exits_1_naming_the_path() {
    let dir = workspace();
    rodzo(dir.path())
        .args(["-o", "missing/dir/spec.c"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing/dir/spec.c"));
}

#[test]
fn unterminated_assertion_exits_1() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("bad_spec.c"),
        "it \"x\" {\n  ensure(a ===\n",
    )
    .unwrap();
    rodzo(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bad_spec.c:2: unterminated ensure statement"));
}

// ──────────────────────────────────────────────
// 3. Configuration
// ──────────────────────────────────────────────

#[test]
fn config_file_sets_output_and_suffix() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("list_test.c"), "it \"grows\" {\n}\n").unwrap();
    fs::write(
        dir.path().join("rodzo.toml"),
        "output = \"tests.c\"\nsuffix = \"_test.c\"\n",
    )
    .unwrap();

    rodzo(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(". wrote tests.c"));
    assert!(dir.path().join("tests.c").exists());
}

#[test]
fn malformed_config_exits_1() {
    let dir = workspace();
    fs::write(dir.path().join("rodzo.toml"), "output = [\n").unwrap();
    rodzo(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not parse 'rodzo.toml'"));
}

#[test]
fn run_with_missing_compiler_exits_1() {
    let dir = workspace();
    rodzo(dir.path())
        .arg("-r")
        .env("CC", "/nonexistent/cc")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(". compiling spec.c"))
        .stderr(predicate::str::contains("could not start '/nonexistent/cc'"));
}

// ──────────────────────────────────────────────
// 4. Dry run
// ──────────────────────────────────────────────

#[test]
fn dry_run_reports_every_example() {
    let dir = workspace();
    rodzo(dir.path())
        .arg("-n")
        .assert()
        .success()
        .stdout(predicate::str::contains("stack\n  pushes\n  pops\n  peeks (PENDING: not yet implemented)\n"))
        .stdout(predicate::str::contains(
            "3 examples, 2 tests seen, 0 failures, 1 pending",
        ));
    assert!(!dir.path().join("spec.c").exists());
}

#[test]
fn dry_run_honours_name_filter() {
    let dir = workspace();
    rodzo(dir.path())
        .arg("-n")
        .env("E", "pops")
        .assert()
        .success()
        .stdout(predicate::str::contains("pushes").not())
        .stdout(predicate::str::contains(
            "1 examples, 1 tests seen, 0 failures, 0 pending",
        ));
}

#[test]
fn dry_run_json_lists_invoked_units() {
    let dir = workspace();
    let output = rodzo(dir.path())
        .args(["-n", "--json"])
        .env("L", "9")
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["invoked"], serde_json::json!(["rdz_example_4"]));
    assert_eq!(value["session"]["examples"], 1);
    assert_eq!(value["session"]["results"][0]["outcome"], "pass");
}

#[test]
fn dry_run_reads_a_dumped_table() {
    let dir = workspace();
    rodzo(dir.path()).args(["-q", "-d"]).assert().success();
    fs::remove_file(dir.path().join("stack_spec.c")).unwrap();

    rodzo(dir.path())
        .args(["-n", "--table", "spec.tree.json"])
        .env("I", "3")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 examples, 1 tests seen, 0 failures, 0 pending",
        ));
}
