//! CLI integration tests
//!
//! Runs the `planillas` binary against generated roster and template files.

#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn planillas(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("planillas").unwrap();
    cmd.current_dir(dir)
        .env_remove("PLANILLAS_CONFIG")
        .env_remove("PLANILLAS_UNIT")
        .env_remove("PLANILLAS_NUMBER")
        .env_remove("PLANILLAS_YEAR")
        .env_remove("PLANILLAS_TEMPLATE");
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    planillas(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("planillas"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    planillas(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_generate_help() {
    let dir = TempDir::new().unwrap();
    planillas(dir.path())
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--all"))
        .stdout(predicate::str::contains("--pdf"));
}

// ═══════════════════════════════════════════════════════════════════════════
// COMMAND TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_variants_lists_catalog() {
    let dir = TempDir::new().unwrap();
    planillas(dir.path())
        .arg("variants")
        .assert()
        .success()
        .stdout(predicate::str::contains("planilla-adicional"))
        .stdout(predicate::str::contains("LISTADOCAPA"))
        .stdout(predicate::str::contains("simplificada"));
}

#[test]
fn test_communities_lists_names() {
    let dir = TempDir::new().unwrap();
    let roster = common::community_roster(dir.path());
    planillas(dir.path())
        .arg("communities")
        .arg(&roster)
        .assert()
        .success()
        .stdout(predicate::str::contains("Aldea W"))
        .stdout(predicate::str::contains("Aldea X"))
        .stdout(predicate::str::contains("2 communities"));
}

#[test]
fn test_roster_shows_pages() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    let beneficiaries = common::beneficiary_roster(dir.path());
    planillas(dir.path())
        .arg("roster")
        .arg(&communities)
        .arg(&beneficiaries)
        .arg("aldea x")
        .args(["--unit", "DAPA", "--number", "1", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DAPA-001-2025_CD2_P12"))
        .stdout(predicate::str::contains("12 beneficiaries, 2 pages"))
        .stdout(predicate::str::contains("Nombre0 Tum Chávez"));
}

#[test]
fn test_roster_missing_column_fails() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    let beneficiaries = common::beneficiary_roster_missing_column(dir.path());
    planillas(dir.path())
        .arg("roster")
        .arg(&communities)
        .arg(&beneficiaries)
        .arg("Aldea X")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SEGUNDO APELLIDO"));
}

#[test]
fn test_generate_single_community() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    let beneficiaries = common::beneficiary_roster(dir.path());
    let template = common::template(dir.path());
    let out = dir.path().join("salida");

    planillas(dir.path())
        .arg("generate")
        .arg(&communities)
        .arg("-b")
        .arg(&beneficiaries)
        .args(["-c", "Aldea X"])
        .arg("--template")
        .arg(&template)
        .arg("--output-dir")
        .arg(&out)
        .args(["--unit", "DAU", "--number", "7", "--year", "2024"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generation Complete"))
        .stdout(predicate::str::contains("DAU-007-2024_CD2_P12"));

    assert!(out
        .join("Planillas_Quiché_DAU-007-2024")
        .join("2 - Quiché, Chichicastenango, PLANILLA.xlsx")
        .exists());
}

#[test]
fn test_generate_all_communities() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    let beneficiaries = common::beneficiary_roster(dir.path());
    let template = common::template(dir.path());

    planillas(dir.path())
        .arg("generate")
        .arg(&communities)
        .arg("-b")
        .arg(&beneficiaries)
        .arg("--all")
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 generated, 1 without beneficiaries, 0 failed",
        ));

    assert!(dir.path().join("PLANILLAS").exists());
}

#[test]
fn test_generate_all_zip() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    let beneficiaries = common::beneficiary_roster(dir.path());
    let template = common::template(dir.path());

    planillas(dir.path())
        .arg("generate")
        .arg(&communities)
        .arg("-b")
        .arg(&beneficiaries)
        .arg("--all")
        .arg("--zip")
        .arg("--template")
        .arg(&template)
        .assert()
        .success()
        .stdout(predicate::str::contains("planillas_comunidades.zip"));

    assert!(dir
        .path()
        .join("PLANILLAS")
        .join("planillas_comunidades.zip")
        .exists());
}

#[test]
fn test_zip_requires_all() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());

    planillas(dir.path())
        .arg("generate")
        .arg(&communities)
        .arg("-c")
        .arg("Aldea X")
        .arg("--zip")
        .assert()
        .failure();
}

#[test]
fn test_generate_requires_community_or_all() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    planillas(dir.path())
        .arg("generate")
        .arg(&communities)
        .assert()
        .failure();
}

#[test]
fn test_generate_unknown_variant() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    planillas(dir.path())
        .arg("generate")
        .arg(&communities)
        .args(["-c", "Aldea X", "-f", "no-existe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-existe"));
}

#[test]
fn test_config_file_is_used() {
    let dir = TempDir::new().unwrap();
    let communities = common::community_roster(dir.path());
    let beneficiaries = common::beneficiary_roster(dir.path());
    std::fs::write(
        dir.path().join("planillas.yaml"),
        "office:\n  unit: DADA\n  number: '3'\n  year: '2023'\n",
    )
    .unwrap();

    planillas(dir.path())
        .arg("roster")
        .arg(&communities)
        .arg(&beneficiaries)
        .arg("Aldea X")
        .assert()
        .success()
        .stdout(predicate::str::contains("DADA-003-2023_CD2_P12"));
}

#[test]
fn test_convert_workbook() {
    let dir = TempDir::new().unwrap();
    let input = common::community_roster(dir.path());
    let output = dir.path().join("convertido.xlsx");

    planillas(dir.path())
        .arg("convert")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("24 cells written"));
    assert!(output.exists());
}
