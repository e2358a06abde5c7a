//! Integration tests for the FlowCode CLI.
//!
//! These invoke the `flowcode` binary as a subprocess and check exit codes,
//! stdout, and stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[allow(deprecated)]
fn flowcode() -> Command {
    Command::cargo_bin("flowcode").unwrap()
}

/// Write a source file into `dir` and return its path.
fn source_file(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("program.fc");
    fs::write(&path, content).unwrap();
    path
}

fn input_file(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("input.txt");
    fs::write(&path, content).unwrap();
    path
}

// ---- No-args / help ----

#[test]
fn no_args_prints_usage_and_exits_10() {
    flowcode()
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("Usage: flowcode"));
}

#[test]
fn help_flag_exits_0() {
    flowcode()
        .arg("--help")
        .assert()
        .success()
        .stderr(predicate::str::contains("Commands:"));
}

#[test]
fn unknown_command_exits_10() {
    flowcode()
        .arg("frobnicate")
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("unknown command"));
}

#[test]
fn run_without_source_or_input_exits_10() {
    flowcode()
        .arg("run")
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("--source"));
}

// ---- Run ----

#[test]
fn run_writes_42() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nDEFVAR GF@x\nMOVE GF@x int@42\nWRITE GF@x\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout("42");
}

#[test]
fn run_reads_source_from_stdin_with_input_file() {
    let dir = TempDir::new().unwrap();
    let input = input_file(&dir, "ping\n");

    flowcode()
        .args(["run", "--input", input.to_str().unwrap()])
        .write_stdin(".FLOWCODE\nDEFVAR GF@l\nREAD GF@l string\nWRITE GF@l\n")
        .assert()
        .success()
        .stdout("ping");
}

#[test]
fn run_feeds_input_lines_to_read() {
    let dir = TempDir::new().unwrap();
    let source = source_file(
        &dir,
        ".FLOWCODE\nDEFVAR GF@n\nREAD GF@n int\nDEFVAR GF@m\nADD GF@m GF@n int@1\nWRITE GF@m\n",
    );
    let input = input_file(&dir, "41\n");

    flowcode()
        .args([
            "run",
            "--source",
            source.to_str().unwrap(),
            "--input",
            input.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout("42");
}

#[test]
fn run_exit_instruction_sets_process_status() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nWRITE string@out\nEXIT int@7\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(7)
        .stdout("out");
}

#[test]
fn run_missing_source_file_exits_11() {
    flowcode()
        .args(["run", "--source", "/no/such/file.fc"])
        .assert()
        .failure()
        .code(11)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn run_missing_header_exits_31() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, "WRITE int@1\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(31)
        .stderr(predicate::str::contains("header"));
}

#[test]
fn run_unknown_opcode_exits_32() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nBOGUS GF@x\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(32)
        .stderr(predicate::str::contains("unknown opcode"));
}

#[test]
fn run_undeclared_jump_target_exits_52_without_output() {
    let dir = TempDir::new().unwrap();
    // The WRITE precedes the bad JUMP, but the label pass runs before
    // execution, so nothing may be printed.
    let source = source_file(&dir, ".FLOWCODE\nWRITE string@partial\nJUMP nowhere\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(52)
        .stdout("");
}

#[test]
fn run_runtime_error_keeps_prior_output() {
    let dir = TempDir::new().unwrap();
    let source = source_file(
        &dir,
        ".FLOWCODE\nWRITE string@before\nDEFVAR GF@q\nIDIV GF@q int@1 int@0\n",
    );

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(57)
        .stdout("before")
        .stderr(predicate::str::contains("division by zero"));
}

#[test]
fn run_uninitialized_read_exits_56() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nDEFVAR GF@x\nWRITE GF@x\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(56);
}

#[test]
fn run_dprint_goes_to_stderr_only() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nDPRINT int@5\nWRITE string@clean\n");

    flowcode()
        .args(["run", "--source", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout("clean")
        .stderr(predicate::str::contains("5"));
}

// ---- Check ----

#[test]
fn check_valid_program() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nLABEL a\nJUMP a\n");

    flowcode()
        .args(["check", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK:").and(predicate::str::contains("2 instructions")));
}

#[test]
fn check_duplicate_label_exits_52() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nLABEL a\nLABEL a\n");

    flowcode()
        .args(["check", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(52)
        .stderr(predicate::str::contains("declared more than once"));
}

#[test]
fn check_requires_an_argument() {
    flowcode().arg("check").assert().failure().code(10);
}

// ---- Dump ----

#[test]
fn dump_prints_canonical_listing() {
    let dir = TempDir::new().unwrap();
    let source = source_file(
        &dir,
        "# leading comment\n.flowcode\n  move GF@x string@a\\032b   # tail\n",
    );

    flowcode()
        .args(["dump", source.to_str().unwrap()])
        .assert()
        .success()
        .stdout(".FLOWCODE\nMOVE GF@x string@a\\032b\n");
}

#[test]
fn dump_rejects_invalid_source() {
    let dir = TempDir::new().unwrap();
    let source = source_file(&dir, ".FLOWCODE\nMOVE GF@x\n");

    flowcode()
        .args(["dump", source.to_str().unwrap()])
        .assert()
        .failure()
        .code(32);
}
