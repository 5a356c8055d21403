use std::fs;

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("design-brief").unwrap();
    cmd.env_remove("OPENAI_API_KEY")
        .env_remove("DESIGN_BRIEF_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: design-brief <COMMAND>"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("interview"))
        .stdout(predicate::str::contains("autofill"))
        .stdout(predicate::str::contains("templates"))
        .stdout(predicate::str::contains("--version"));
}

#[test]
fn test_cli_serve_help() {
    cmd()
        .arg("serve")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: design-brief serve"))
        .stdout(predicate::str::contains("--port <PORT>"))
        .stdout(predicate::str::contains("--templates <TEMPLATES>"));
}

#[test]
fn test_cli_submit_help() {
    cmd()
        .arg("submit")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--field <KEY=VALUE>"))
        .stdout(predicate::str::contains("--image <PATH>"))
        .stdout(predicate::str::contains("--forward-images"))
        .stdout(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_cli_no_command() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: design-brief <COMMAND>"));
}

#[test]
fn test_autofill_prints_sample_answers() {
    let output = cmd().arg("autofill").assert().success().get_output().stdout.clone();
    let answers: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(answers.as_object().unwrap().len(), 8);
    assert_eq!(
        answers["traffic"],
        "It will have moderate traffic throughout the day."
    );
}

#[test]
fn test_templates_prints_defaults() {
    cmd()
        .arg("templates")
        .assert()
        .success()
        .stdout(predicate::str::contains("== Context =="))
        .stdout(predicate::str::contains("Uploaded Images: {uploaded_images}"));
}

#[test]
fn test_interview_reads_answers_from_stdin() {
    let output = cmd()
        .arg("interview")
        .write_stdin("Cozy loft\nHome office\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("== General Overview =="))
        .get_output()
        .stdout
        .clone();
    let answers: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        answers,
        json!({ "vision_goals": "Cozy loft", "primary_function": "Home office" })
    );
}

#[test]
fn test_submit_without_key_fails_before_sending() {
    cmd()
        .arg("submit")
        .args(["--field", "budget=$8k"])
        .env("DESIGN_BRIEF_API_URL", "http://127.0.0.1:9/v1/chat/completions")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide your API key to proceed."));
}

#[test]
fn test_submit_rejects_unknown_field() {
    cmd()
        .arg("submit")
        .args(["--field", "deadline=June", "--api-key", "sk-test"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field 'deadline'"));
}

#[test]
fn test_submit_rejects_unsupported_image() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("brief.pdf");
    fs::write(&path, b"%PDF").unwrap();
    cmd()
        .arg("submit")
        .args(["--api-key", "sk-test", "--image"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported image 'brief.pdf'"));
}

#[tokio::test]
async fn test_submit_prints_brief() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer sk-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "Timeframe: June\nHuman-Like Summary for Customer:\nLooks great." } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let answers = dir.path().join("answers.json");
    fs::write(&answers, json!({ "budget": "$9k", "traffic": "Low" }).to_string()).unwrap();
    let image = dir.path().join("mood.png");
    fs::write(&image, [1u8, 2, 3]).unwrap();

    let url = format!("{}/v1/chat/completions", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        cmd()
            .arg("submit")
            .arg("--answers")
            .arg(&answers)
            .arg("--image")
            .arg(&image)
            .arg("--forward-images")
            .env("OPENAI_API_KEY", "sk-env")
            .env("DESIGN_BRIEF_API_URL", url)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .success()
        .stdout(predicate::str::contains("Key Elements Summary"))
        .stdout(predicate::str::contains("Budget: $9k"))
        .stdout(predicate::str::contains("Timeframe: June"))
        .stdout(predicate::str::contains("Response\nLooks great."));

    let requests = server.received_requests().await.unwrap();
    let body: Value = requests[0].body_json().unwrap();
    assert_eq!(body["messages"][0]["content"][1]["type"], "image_url");
}

#[tokio::test]
async fn test_submit_reports_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let url = format!("{}/v1/chat/completions", server.uri());
    let output = tokio::task::spawn_blocking(move || {
        cmd()
            .args(["submit", "--api-key", "sk-test"])
            .env("DESIGN_BRIEF_API_URL", url)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    output
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: 429, slow down"));
}
