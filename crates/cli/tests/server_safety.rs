use assert_cmd::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn medchat() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("medchat"));
    cmd.env_remove("MEDCHAT_DATASET")
        .env_remove("MEDCHAT_MODEL")
        .env("MEDCHAT_GENERATION_MODE", "stub");
    cmd
}

fn dataset(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("medquad.csv");
    fs::write(
        &path,
        "question,answer,source\n\
         What is diabetes?,A chronic condition...,NIH\n\
         What is glaucoma?,,NIH\n",
    )
    .unwrap();
    path
}

#[test]
fn serve_refuses_non_loopback_without_public() {
    medchat()
        .args(["serve", "--bind", "0.0.0.0:0"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("Refusing to bind"));
}

#[test]
fn serve_aborts_when_dataset_is_missing() {
    let dir = TempDir::new().unwrap();
    medchat()
        .args(["serve", "--bind", "127.0.0.1:0", "--dataset"])
        .arg(dir.path().join("absent.csv"))
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to load dataset"));
}

#[test]
fn ask_prints_matching_answer() {
    let dir = TempDir::new().unwrap();
    medchat()
        .args(["ask", "DIABETES", "--dataset"])
        .arg(dataset(&dir))
        .assert()
        .success()
        .stdout(predicates::str::contains("A chronic condition..."));
}

#[test]
fn ask_json_reports_generated_fallback() {
    let dir = TempDir::new().unwrap();
    let output = medchat()
        .args(["ask", "glaucoma", "--json", "--model", "tiny", "--dataset"])
        .arg(dataset(&dir))
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["question"], "glaucoma");
    assert_eq!(value["kind"], "generated");
    assert_eq!(value["text"], "[tiny] glaucoma");
}

#[test]
fn doctor_fails_on_unknown_generation_mode() {
    let dir = TempDir::new().unwrap();
    medchat()
        .env("MEDCHAT_GENERATION_MODE", "onnx")
        .args(["doctor", "--dataset"])
        .arg(dataset(&dir))
        .assert()
        .failure()
        .stderr(predicates::str::contains("Unsupported generation mode"));
}

#[test]
fn doctor_reports_healthy_setup() {
    let dir = TempDir::new().unwrap();
    medchat()
        .args(["doctor", "--probe", "--dataset"])
        .arg(dataset(&dir))
        .assert()
        .success()
        .stdout(predicates::str::contains("ok: 1 records (1 rows dropped"));
}
