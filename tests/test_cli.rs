//! Tests for CLI argument parsing and the binary's commands

use assert_cmd::Command;
use clap::Parser;
use clyra::cli::{default_output_path, resolve_outputs, Cli, Commands};
use predicates::prelude::*;
use std::path::{Path, PathBuf};

mod common;
use common::create_temp_file;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["clyra", "run", "-i", "data.csv", "-p", "steps.json"]);

    assert_eq!(cli.verbose, 0);
    assert_eq!(
        cli.infer_schema_length, 10000,
        "Default schema inference should be 10000"
    );
    match cli.command {
        Commands::Run {
            input,
            pipeline,
            output,
        } => {
            assert_eq!(input, vec![PathBuf::from("data.csv")]);
            assert_eq!(pipeline, PathBuf::from("steps.json"));
            assert!(output.is_none());
        }
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn test_cli_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "clyra",
        "preview",
        "-i",
        "data.csv",
        "-s",
        "{}",
        "-vv",
        "--infer-schema-length",
        "0",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.infer_schema_length, 0);
    assert!(matches!(cli.command, Commands::Preview { json: false, .. }));
}

#[test]
fn test_cli_multiple_inputs() {
    let cli = Cli::parse_from([
        "clyra", "run", "-i", "a.csv", "b.parquet", "-p", "steps.json",
    ]);
    match cli.command {
        Commands::Run { input, .. } => assert_eq!(input.len(), 2),
        other => panic!("expected run, got {:?}", other),
    }
}

#[test]
fn test_cli_requires_subcommand() {
    assert!(Cli::try_parse_from(["clyra"]).is_err());
    assert!(Cli::try_parse_from(["clyra", "run", "-p", "steps.json"]).is_err());
}

#[test]
fn test_output_path_derivation() {
    assert_eq!(
        default_output_path(Path::new("/path/to/data.csv")),
        PathBuf::from("/path/to/data_cleaned.csv")
    );
    assert_eq!(
        default_output_path(Path::new("/path/to/data.parquet")),
        PathBuf::from("/path/to/data_cleaned.parquet")
    );
}

#[test]
fn test_explicit_output_requires_single_input() {
    let inputs = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
    let err = resolve_outputs(&inputs, Some(Path::new("out.csv"))).unwrap_err();
    assert!(err.to_string().contains("single input (2 given)"));

    let jobs = resolve_outputs(&inputs, None).unwrap();
    assert_eq!(jobs[1].1, PathBuf::from("b_cleaned.csv"));
}

#[test]
fn test_binary_run_writes_cleaned_file() {
    let (dir, input) = create_temp_file("data.csv", "A,B,C\n1,x,0.5\n2,y,1.5\n3,z,2.5\n");
    let pipeline = dir.path().join("pipeline.json");
    std::fs::write(
        &pipeline,
        r#"[{"op": "drop_column", "column": "B"}, {"op": "rename_column", "from": "A", "to": "X"}]"#,
    )
    .unwrap();

    Command::cargo_bin("clyra")
        .unwrap()
        .args(["run", "-i"])
        .arg(&input)
        .arg("-p")
        .arg(&pipeline)
        .assert()
        .success();

    let output = dir.path().join("data_cleaned.csv");
    let written = std::fs::read_to_string(output).unwrap();
    assert!(written.starts_with("X,C"), "unexpected header: {}", written);
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn test_binary_run_rejects_bad_pipeline() {
    let (dir, input) = create_temp_file("data.csv", "A\n1\n");
    let pipeline = dir.path().join("pipeline.json");
    std::fs::write(&pipeline, r#"{"op": "drop_column"}"#).unwrap();

    Command::cargo_bin("clyra")
        .unwrap()
        .args(["run", "-i"])
        .arg(&input)
        .arg("-p")
        .arg(&pipeline)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load pipeline"));
}

#[test]
fn test_binary_preview_json() {
    let (_dir, input) = create_temp_file("data.csv", "city\nParis\nLyon\nParis\n");

    Command::cargo_bin("clyra")
        .unwrap()
        .args(["preview", "--json", "-i"])
        .arg(&input)
        .args(["-s", r#"{"op": "label_encode", "column": "city"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"city_label\": 1"))
        .stdout(predicate::str::contains("\"op\": \"label_encode\""));
}

#[test]
fn test_binary_normalize_prints_canonical_steps() {
    let (_dir, pipeline) = create_temp_file(
        "pipeline.json",
        r#"[{"op": "one_hot", "column": "c"}, {"op": "rename_column", "from_col": "a", "to_value": "b"}]"#,
    );

    Command::cargo_bin("clyra")
        .unwrap()
        .arg("normalize")
        .arg("-p")
        .arg(&pipeline)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"one_hot_encode\""))
        .stdout(predicate::str::contains("\"from\": \"a\""));
}

#[test]
fn test_binary_suggestions_saves_pipeline() {
    let (dir, file) = create_temp_file(
        "suggestions.txt",
        "```json\n[{\"title\": \"Drop id\", \"operation\": {\"op\": \"drop_column\", \"column\": \"id\"}}]\n```",
    );
    let output = dir.path().join("suggested.json");

    Command::cargo_bin("clyra")
        .unwrap()
        .arg("suggestions")
        .arg("-f")
        .arg(&file)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Drop id"));

    let steps = clyra::pipeline::load_pipeline(&output).unwrap();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].operation.kind(), "drop_column");
}
