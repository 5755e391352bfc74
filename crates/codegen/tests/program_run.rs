//! Builds generated programs with the system C compiler and runs them.
//!
//! Skipped when no compiler answers to `$CC` (default `cc`).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rodzo_codegen::write_program;
use rodzo_core::{compile_with, InMemoryProvider};

const MATH_SPEC: &str = r#"#include <stdlib.h>

describe "math" {
  it "adds" {
    expect(1 i== 2);
  }
  it "computes foo" {
    ensure(2 + 2 i== 4);
  }
  context "strings" {
    it "rejects absent results" {
      ensure(NULL === "x");
    }
    it "rejects absent matches" {
      const char *v = NULL;
      ensure(v ~== "x");
    }
    it "is empty" {}
    it "waits" { pending("needs io"); }
  }
}
"#;

fn compiler() -> Option<String> {
    let cc = std::env::var("CC").unwrap_or_else(|_| "cc".to_string());
    let found = Command::new(&cc)
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);
    found.then_some(cc)
}

/// Compile `source` as `t_spec.c` into `<dir>/spec`.
fn build(dir: &Path, cc: &str, source: &str) -> PathBuf {
    fs::write(dir.join("t_spec.c"), source).unwrap();
    let provider = InMemoryProvider::default().with_file("t_spec.c", source);
    let c = compile_with(&[PathBuf::from("t_spec.c")], &provider).expect("compiles");

    let program = dir.join("spec.c");
    write_program(&program, &c.tree, &c.table).unwrap();

    let exe = dir.join("spec");
    let status = Command::new(cc)
        .args(["-std=c99", "-o"])
        .arg(&exe)
        .arg(&program)
        .status()
        .unwrap();
    assert!(status.success(), "cc failed on {}", program.display());
    exe
}

fn run(dir: &Path, exe: &Path, vars: &[(&str, &str)]) -> (String, Option<i32>) {
    let mut cmd = Command::new(exe);
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env("RDZ_NO_DURATION", "1")
        .env_remove("F")
        .env_remove("I")
        .env_remove("L")
        .env_remove("E");
    for (k, v) in vars {
        cmd.env(k, v);
    }
    let out = cmd.output().unwrap();
    (String::from_utf8(out.stdout).unwrap(), out.status.code())
}

#[test]
fn full_run_reports_failures_pending_and_exit_status() {
    let Some(cc) = compiler() else {
        eprintln!("no C compiler, skipped");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let exe = build(dir.path(), &cc, MATH_SPEC);

    let (out, code) = run(dir.path(), &exe, &[]);
    assert_eq!(code, Some(1));

    let (report, reruns) = out.split_once("Failed examples:\n\n").expect("rerun list");
    let expected = "\nmath\n  adds (FAILED)\n  computes foo\n  strings\n\
        \x20   rejects absent results (FAILED)\n    rejects absent matches (FAILED)\n\
        \x20   is empty\n    waits (PENDING: needs io)\n\
        \nPending:\n\n  math strings waits\n    # needs io\n    # t_spec.c:19\n\n\
        Failures:\n\n\
        \x20 1) math adds\n     >expect(1 i== 2);<\n     expected 1\n           to equal 2\n     # t_spec.c:5 (5)\n\n\
        \x20 2) math strings rejects absent results\n     >ensure(NULL === \"x\");<\n     result is NULL\n           to equal \"x\"\n     # t_spec.c:12 (12)\n\n\
        \x20 3) math strings rejects absent matches\n     >ensure(v ~== \"x\");<\n     result is NULL\n           to match \"x\"\n     # t_spec.c:16 (16)\n\n\
        6 examples, 5 tests seen, 3 failures, 1 pending\n\n";
    assert_eq!(report, expected);

    let lines: Vec<&str> = reruns.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("I=3 ") && lines[0].ends_with(" # math adds"));
    assert!(lines[1].starts_with("I=6 "));
    assert!(lines[2].ends_with(" # math strings rejects absent matches"));
}

#[test]
fn line_and_name_filters_select_one_example() {
    let Some(cc) = compiler() else {
        eprintln!("no C compiler, skipped");
        return;
    };
    let dir = tempfile::tempdir().unwrap();
    let exe = build(dir.path(), &cc, MATH_SPEC);

    let expected = "\nmath\n  computes foo\n\n1 examples, 1 tests seen, 0 failures, 0 pending\n\n";
    for filter in [("L", "8"), ("E", "foo")] {
        let (out, code) = run(dir.path(), &exe, &[filter]);
        assert_eq!(out, expected, "{:?}", filter);
        assert_eq!(code, Some(0));
    }
}

#[test]
fn offline_hooks_run_once_around_each_example() {
    let Some(cc) = compiler() else {
        eprintln!("no C compiler, skipped");
        return;
    };
    let source = r#"#include <stdio.h>

describe "outer" {
  before each offline {
    printf("[bo outer]\n");
  }
  after each offline {
    printf("[ao outer]\n");
  }
  context "inner" {
    before each offline {
      printf("[bo inner]\n");
    }
    it "a" {}
  }
  it "b" {}
}
"#;
    let dir = tempfile::tempdir().unwrap();
    let exe = build(dir.path(), &cc, source);
    let (out, code) = run(dir.path(), &exe, &[]);
    assert_eq!(code, Some(0));
    assert!(
        out.starts_with(
            "\n[bo outer]\n[bo inner]\nouter\n  inner\n    a\n[ao outer]\n[bo outer]\n  b\n[ao outer]\n"
        ),
        "{}",
        out
    );
}
