//! Unit tests for the CLI runner.

use std::ffi::OsString;
use std::fs;
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use insta::assert_snapshot;
use rstest::{fixture, rstest};
use sempatch_config::Config;
use sempatch_core::{AnchorIndex, diff};
use sempatch_syntax::parse;
use tempfile::TempDir;

use crate::commands::summarise;
use crate::{AppError, ConfigLoader, run_with_loader};

struct StubLoader {
    config: Option<Config>,
}

impl ConfigLoader for StubLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        self.config.clone().ok_or_else(|| {
            AppError::CliUsage(clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                "stub configuration rejected",
            ))
        })
    }
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn file(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(self.dir.path().join(name)).expect("utf8 temp path");
        fs::write(&path, contents).expect("write fixture");
        path
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: TempDir::new().expect("temp dir"),
    }
}

struct Outcome {
    exit_code: ExitCode,
    stdout: String,
    stderr: String,
}

fn run_cli(args: &[&str], config: Option<Config>) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let arguments = std::iter::once("sempatch")
        .chain(args.iter().copied())
        .map(OsString::from);
    let exit_code = run_with_loader(arguments, &mut stdout, &mut stderr, &StubLoader { config });
    Outcome {
        exit_code,
        stdout: String::from_utf8(stdout).expect("stdout utf8"),
        stderr: String::from_utf8(stderr).expect("stderr utf8"),
    }
}

const ORIGINAL: &str = "function add(a, b) {\n    return a + b;\n}\n\nfunction keep() {\n    return 1;\n}\n";
const PROPOSED: &str = "function add(a, b) {\n    return a * b;\n}\n\nfunction keep() {\n    return 1;\n}\n";

#[rstest]
fn apply_prints_the_patched_source(workspace: Workspace) {
    let original = workspace.file("math.ts", ORIGINAL);
    let proposed = workspace.file("proposed.ts", PROPOSED);

    let outcome = run_cli(
        &["apply", original.as_str(), proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert_eq!(outcome.stdout, PROPOSED);
    assert_eq!(fs::read_to_string(&original).expect("read"), ORIGINAL);
}

#[rstest]
fn apply_with_write_updates_the_original(workspace: Workspace) {
    let original = workspace.file("math.ts", ORIGINAL);
    let proposed = workspace.file("proposed.ts", PROPOSED);

    let outcome = run_cli(
        &["apply", "--write", original.as_str(), proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert!(outcome.stdout.is_empty());
    assert_eq!(fs::read_to_string(&original).expect("read"), PROPOSED);
}

#[rstest]
fn apply_with_json_reports_failures_in_band(workspace: Workspace) {
    let original = workspace.file("broken.ts", "function f( {\n");
    let proposed = workspace.file("proposed.ts", "function f() {}\n");

    let outcome = run_cli(
        &["apply", "--json", original.as_str(), proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::FAILURE);
    let value: serde_json::Value = serde_json::from_str(&outcome.stdout).expect("json output");
    assert_eq!(value["success"], serde_json::Value::Bool(false));
    assert!(value.get("content").is_none());
}

#[rstest]
fn allowing_syntax_errors_lets_broken_sources_through(workspace: Workspace) {
    let original = workspace.file("broken.ts", "function f() { return 1; }\n");
    let proposed = workspace.file("proposed.ts", "function f( {\n");
    let config = Config {
        allow_syntax_errors: true,
        ..Config::default()
    };

    let outcome = run_cli(&["apply", original.as_str(), proposed.as_str()], Some(config));
    assert_eq!(outcome.exit_code, ExitCode::SUCCESS, "{}", outcome.stderr);
}

#[rstest]
fn diff_lists_one_line_per_operation(workspace: Workspace) {
    let original = workspace.file("math.ts", ORIGINAL);
    let proposed = workspace.file("proposed.ts", PROPOSED);

    let outcome = run_cli(
        &["diff", original.as_str(), proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::SUCCESS, "{}", outcome.stderr);
    let lines: Vec<&str> = outcome.stdout.lines().collect();
    assert_eq!(lines.len(), 1, "{}", outcome.stdout);
    let line = lines.first().expect("one line");
    assert!(line.starts_with("replace_body "));
    assert!(line.ends_with(" Function:add"));
}

#[rstest]
fn diff_of_identical_files_is_empty(workspace: Workspace) {
    let original = workspace.file("math.ts", ORIGINAL);
    let proposed = workspace.file("copy.ts", ORIGINAL);

    let outcome = run_cli(
        &["diff", "--json", original.as_str(), proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::SUCCESS);
    assert_eq!(outcome.stdout.trim(), "[]");
}

/// Removes one space-separated column from every line of a listing.
fn without_column(listing: &str, column: usize) -> String {
    listing
        .lines()
        .map(|line| {
            line.split(' ')
                .enumerate()
                .filter(|(index, _)| *index != column)
                .map(|(_, field)| field)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_values(listing: &str, column: usize) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| line.split(' ').nth(column))
        .map(str::to_owned)
        .collect()
}

fn assert_short_anchors(anchors: &[String]) {
    assert!(!anchors.is_empty());
    for anchor in anchors {
        assert_eq!(anchor.len(), 12, "{anchor}");
        assert!(anchor.chars().all(|ch| ch.is_ascii_hexdigit()), "{anchor}");
    }
}

#[rstest]
fn anchors_lists_classified_nodes(workspace: Workspace) {
    let file = workspace.file(
        "store.ts",
        "class Store {\n  load(id) {\n    if (id) {\n      return id;\n    }\n  }\n}\n\
         let count = 0;\nwhile (count < 3) {\n  count++;\n}\n",
    );

    let outcome = run_cli(&["anchors", file.as_str()], Some(Config::default()));

    assert_eq!(outcome.exit_code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert_short_anchors(&field_values(&outcome.stdout, 0));
    assert_snapshot!(without_column(&outcome.stdout, 0), @r"
    class_declaration Class:Store
    method_definition Method:load
    if_statement If:id
    variable_declarator Variable:count
    while_statement While:count < 3
    ");
}

#[rstest]
fn diff_listing_follows_source_order(workspace: Workspace) {
    let original = workspace.file(
        "ops.ts",
        "function add(a, b) { return a + b; }\nfunction sub(a, b) { return a - b; }\n",
    );
    let proposed = workspace.file(
        "next.ts",
        "function add(a, b) { return a * b; }\nfunction sub(a, b) { return a / b; }\n",
    );

    let outcome = run_cli(
        &["diff", original.as_str(), proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::SUCCESS, "{}", outcome.stderr);
    assert_short_anchors(&field_values(&outcome.stdout, 1));
    assert_snapshot!(without_column(&outcome.stdout, 1), @r"
    replace_body Function:add
    replace_body Function:sub
    ");
}

#[rstest]
fn missing_files_are_reported_on_stderr(workspace: Workspace) {
    let proposed = workspace.file("proposed.ts", PROPOSED);

    let outcome = run_cli(
        &["apply", "does-not-exist.ts", proposed.as_str()],
        Some(Config::default()),
    );

    assert_eq!(outcome.exit_code, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("failed to read does-not-exist.ts"));
}

#[test]
fn configuration_failures_stop_the_run() {
    let outcome = run_cli(&["anchors", "unused.ts"], None);
    assert_eq!(outcome.exit_code, ExitCode::FAILURE);
    assert!(outcome.stderr.contains("stub configuration rejected"));
}

#[test]
fn unknown_commands_are_usage_errors() {
    let outcome = run_cli(&["merge"], Some(Config::default()));
    assert_eq!(outcome.exit_code, ExitCode::FAILURE);
    assert!(!outcome.stderr.is_empty());
}

#[test]
fn help_is_printed_to_stdout() {
    let outcome = run_cli(&["--help"], Some(Config::default()));
    assert_eq!(outcome.exit_code, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("apply"));
}

#[test]
fn unmatched_operations_have_no_target() {
    let original = parse("function a() { return 1; }", Utf8Path::new("a.ts")).expect("parse");
    let proposed = parse("function a() { return [1]; }", Utf8Path::new("a.ts")).expect("parse");
    let unrelated = parse("const x = 1;", Utf8Path::new("x.ts")).expect("parse");

    let intention = diff(&original, &proposed);
    let operation = intention.operations().first().expect("one operation");

    let matched = summarise(operation, &AnchorIndex::build(&original));
    assert_eq!(matched.operation, "replace_body");
    assert_eq!(matched.target.as_deref(), Some("Function:a"));

    let unmatched = summarise(operation, &AnchorIndex::build(&unrelated));
    assert_eq!(unmatched.target, None);
}
