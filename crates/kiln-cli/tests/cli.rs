//! End-to-end runs of the `kiln` binary.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn kiln(project: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("kiln").unwrap();
    cmd.arg("--cwd")
        .arg(project)
        .arg("--no-color")
        .env("NODE_ENV", "production")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn check_passes_on_complete_project() {
    let project = common::scaffold_project();
    kiln(project.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("All checks passed"));
}

#[test]
fn check_reports_missing_entries() {
    let project = common::scaffold_project();
    std::fs::remove_file(project.path().join("src/renderer/app/index.tsx")).unwrap();

    kiln(project.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1 entry file(s) missing"));
}

#[test]
fn plan_prints_json_for_requested_mode() {
    let project = common::scaffold_project();
    let output = kiln(project.path())
        .args(["plan", "--mode", "development"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let plan = plan.as_array().unwrap();
    assert_eq!(plan.len(), 7);

    let app = plan.iter().find(|a| a["name"] == "app").unwrap();
    assert_eq!(app["kind"], "app-shell");
    assert_eq!(app["target"], "electron");
    assert_eq!(app["lifecycle"]["type"], "watch-hmr-supervised");
    assert_eq!(app["instruction"], "> [renderer/app/index.tsx]");
    assert_eq!(app["configuration"]["sourceMapsEnabled"], true);
}

#[test]
fn plan_rejects_unknown_mode() {
    let project = common::scaffold_project();
    kiln(project.path())
        .args(["plan", "--mode", "staging"])
        .assert()
        .failure();
}

#[test]
fn invalid_settings_file_fails() {
    let project = common::scaffold_project();
    common::write_file(&project.path().join("kiln.config.json"), "{ not json");

    kiln(project.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("kiln.config.json"));
}

#[cfg(unix)]
#[test]
fn production_build_with_command_engine() {
    let project = common::scaffold_project();
    kiln(project.path())
        .args(["build", "--engine", r#"mkdir -p build && touch "build/$KILN_ARTIFACT.js""#])
        .assert()
        .success();

    for name in ["newtab", "app", "view-preload", "main"] {
        assert!(project.path().join("build").join(format!("{name}.js")).is_file());
        assert!(
            project
                .path()
                .join(".kiln/requests")
                .join(format!("{name}.json"))
                .is_file()
        );
    }
}

#[cfg(unix)]
#[test]
fn production_build_fails_when_engine_fails() {
    let project = common::scaffold_project();
    kiln(project.path())
        .args(["build", "--engine", "echo broken >&2; exit 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("7 artifact build(s) failed"))
        .stderr(predicate::str::contains("broken"));
}
