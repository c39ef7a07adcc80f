//! Runs the `wadas` binary against a wiremock WADAS server.
#![allow(clippy::unwrap_used)]

use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

async fn server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_json(json!({ "username": "admin", "password": "s3cret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "refresh_token": "refresh-1",
            "role": "Admin"
        })))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(server: &MockServer, args: &[&str]) -> Output {
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
    tokio::task::spawn_blocking(move || {
        cargo_bin_cmd!("wadas")
            .env("HOME", "/tmp/wadas-cli-test-nonexistent")
            .env("XDG_CONFIG_HOME", "/tmp/wadas-cli-test-nonexistent")
            .env_remove("WADAS_PROFILE")
            .env_remove("WADAS_OUTPUT")
            .env("WADAS_PASSWORD", "s3cret")
            .args(["--server", uri.as_str(), "--username", "admin"])
            .args(&args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn cameras_list_renders_json() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/cameras"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 2,
                "name": "gate-cam",
                "type": "FTP",
                "enabled": true,
                "actuators": [{ "id": 3, "name": "roadsign-1", "type": "Road Sign" }]
            }]
        })))
        .mount(&server)
        .await;

    let output = run(&server, &["--output", "json", "cameras", "list"]).await;

    assert!(output.status.success(), "{output:?}");
    let cameras = stdout_json(&output);
    assert_eq!(cameras[0]["name"], "gate-cam");
    assert_eq!(cameras[0]["actuators"][0]["name"], "roadsign-1");
}

#[tokio::test(flavor = "multi_thread")]
async fn detections_list_sends_filters_and_page_window() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/detections"))
        .and(query_param("camera_ids", "2"))
        .and(query_param("classified_animals", "bear"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 45,
            "count": 0,
            "data": []
        })))
        .mount(&server)
        .await;

    let output = run(
        &server,
        &[
            "--output", "plain", "detections", "list", "--camera", "2", "--animal", "bear",
            "--page", "3",
        ],
    )
    .await;

    assert!(output.status.success(), "{output:?}");
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert!(
        last.url
            .query_pairs()
            .any(|(k, v)| k == "offset" && v == "40")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn page_past_the_end_is_a_usage_error() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/actuations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 21,
            "count": 0,
            "data": []
        })))
        .mount(&server)
        .await;

    let output = run(&server, &["actuations", "list", "--page", "5"]).await;

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("between 1 and 2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_refresh_exits_with_auth_code() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/actuators"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/token/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["actuators", "list"]).await;

    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Session expired"));
}

#[tokio::test(flavor = "multi_thread")]
async fn reboot_posts_the_command() {
    let server = server().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/actuators/3/commands"))
        .and(body_json(json!({ "command": "reboot" })))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(&server, &["actuators", "reboot", "3"]).await;

    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Sent 'reboot' to actuator 3"));
}

#[tokio::test(flavor = "multi_thread")]
async fn export_writes_csv_to_the_given_file() {
    let server = server().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/actuations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 0,
            "count": 0,
            "data": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/actuations/export"))
        .and(query_param("commands", "display"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"id,command\n1,display\n".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.csv");
    let output = run(
        &server,
        &[
            "--quiet",
            "actuations",
            "export",
            "--command",
            "display",
            "--dest",
            target.to_str().unwrap(),
        ],
    )
    .await;

    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "id,command\n1,display\n"
    );
}
