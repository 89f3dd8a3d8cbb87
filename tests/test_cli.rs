//! Tests for CLI argument parsing and the binary

use std::path::PathBuf;

use assert_cmd::Command;
use clap::Parser;
use ipklens::cli::{Cli, Commands};
use ipklens::pipeline::AnalysisConfig;
use predicates::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["ipklens", "-i", "data.xlsx"]);

    assert_eq!(cli.seed, 42, "Default seed should be 42");
    assert_eq!(cli.test_fraction, 0.2, "Default test fraction should be 0.2");
    assert!(cli.groups.is_empty());
    assert!(cli.cohort.is_none());
    assert!(cli.trend_cohorts().is_none());
    assert!(!cli.no_confirm, "Default no_confirm should be false");
    assert!(!cli.no_export);
    assert!(cli.command.is_none());
}

#[test]
fn test_cli_output_path_derivation() {
    let cli = Cli::parse_from(["ipklens", "-i", "/path/to/data.xlsx"]);

    let output = cli.output_path().unwrap();
    assert_eq!(output, PathBuf::from("/path/to/data_analysis.json"));
}

#[test]
fn test_cli_explicit_output_path() {
    let cli = Cli::parse_from(["ipklens", "-i", "data.xlsx", "-o", "custom.json"]);

    assert_eq!(cli.output_path().unwrap(), PathBuf::from("custom.json"));
}

#[test]
fn test_cli_no_export_disables_report() {
    let cli = Cli::parse_from(["ipklens", "-i", "data.xlsx", "-o", "custom.json", "--no-export"]);

    assert!(cli.output_path().is_none());
}

#[test]
fn test_cli_regression_options() {
    let cli = Cli::parse_from([
        "ipklens",
        "-i",
        "data.xlsx",
        "--seed",
        "7",
        "--test-fraction",
        "0.3",
    ]);

    let config = cli.regression_config();
    assert_eq!(config.seed, 7);
    assert_eq!(config.test_fraction, 0.3);
}

#[test]
fn test_cli_rejects_test_fraction_out_of_range() {
    for value in ["0", "1", "1.5", "-0.1", "abc"] {
        let result = Cli::try_parse_from(["ipklens", "-i", "data.xlsx", "--test-fraction", value]);
        assert!(result.is_err(), "test fraction {} should be rejected", value);
    }
}

#[test]
fn test_cli_trend_cohorts_are_comma_separated() {
    let cli = Cli::parse_from(["ipklens", "-i", "data.xlsx", "--trend-cohorts", "2020,2021"]);

    assert_eq!(cli.trend_cohorts(), Some(&[2020, 2021][..]));
}

#[test]
fn test_cli_selected_groups() {
    let config = AnalysisConfig::default();

    let all = Cli::parse_from(["ipklens", "-i", "data.xlsx"]);
    assert_eq!(
        all.selected_groups(&config).unwrap().len(),
        config.factor_groups.len()
    );

    let some = Cli::parse_from([
        "ipklens",
        "-i",
        "data.xlsx",
        "-g",
        "Faktor Pilihan Studi",
        "--group",
        "Faktor Keluarga",
        "-g",
        "Faktor Pilihan Studi",
    ]);
    let names: Vec<&str> = some
        .selected_groups(&config)
        .unwrap()
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(names, vec!["Faktor Pilihan Studi", "Faktor Keluarga"]);
}

#[test]
fn test_cli_unknown_group_is_an_error() {
    let config = AnalysisConfig::default();
    let cli = Cli::parse_from(["ipklens", "-i", "data.xlsx", "-g", "Faktor Cuaca"]);

    let err = cli.selected_groups(&config).unwrap_err().to_string();
    assert!(err.contains("Faktor Cuaca"));
    assert!(err.contains("Faktor Keluarga"));
}

#[test]
fn test_cli_groups_subcommand() {
    let cli = Cli::parse_from(["ipklens", "groups"]);

    assert!(matches!(cli.command, Some(Commands::Groups)));
}

#[test]
fn test_binary_lists_groups() {
    Command::cargo_bin("ipklens")
        .unwrap()
        .arg("groups")
        .assert()
        .success()
        .stdout(predicate::str::contains("Faktor Keluarga"))
        .stdout(predicate::str::contains("kepuasan_prodi"));
}

#[test]
fn test_binary_missing_input_fails() {
    Command::cargo_bin("ipklens")
        .unwrap()
        .args(["-i", "/nonexistent/students.xlsx", "--no-confirm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_binary_full_run_writes_report() {
    let (temp_dir, path) = create_temp_xlsx();
    let report = temp_dir.path().join("report.json");
    let tables = temp_dir.path().join("tables");

    Command::cargo_bin("ipklens")
        .unwrap()
        .arg("-i")
        .arg(&path)
        .arg("-o")
        .arg(&report)
        .arg("--export-tables")
        .arg(&tables)
        .args(["--no-confirm", "-g", "Faktor Pilihan Studi"])
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["students"], 3);
    assert_eq!(json["correlation"][0]["group"], "Faktor Pilihan Studi");
    assert!(tables.join("master.csv").exists());
}
