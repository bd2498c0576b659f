use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn posturator(token_path: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_posturator"))
        .args(args)
        .env("APP_TOKEN_PATH", token_path)
        .env("APP_API_URL", "http://127.0.0.1:9/api")
        .env("APP_LOG_LEVEL", "warn")
        .env_remove("APP_API_TIMEOUT_SECS")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary starts");

    child
        .stdin
        .take()
        .expect("stdin piped")
        .write_all(stdin.as_bytes())
        .expect("stdin written");
    child.wait_with_output().expect("binary exits")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn products_lists_the_catalog() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = posturator(&dir.path().join("token.json"), &["products"], "");

    assert!(output.status.success());
    let listing = stdout(&output);
    assert!(listing.contains("Posturator Sofa"));
    assert!(listing.contains("$130.00"));
}

#[test]
fn questionnaire_runs_over_stdin() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = posturator(&dir.path().join("token.json"), &["questionnaire"], "10\n");

    assert!(output.status.success());
    let transcript = stdout(&output);
    assert!(transcript.contains("Age Verification"));
    assert!(transcript.contains("Age Requirement Not Met"));
}

#[test]
fn signed_out_users_are_sent_to_login() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = posturator(&dir.path().join("token.json"), &[], "");

    assert!(output.status.success());
    assert!(stdout(&output).contains("Not signed in."));
}

#[test]
fn stored_token_identifies_the_user() {
    let dir = tempfile::tempdir().expect("temp dir");
    let token_path = dir.path().join("token.json");
    let token = encode(
        &Header::default(),
        &json!({
            "username": "sam",
            "email": "sam@example.com",
            "role": "USER",
            "_id": "u1",
            "exp": chrono::Utc::now().timestamp() + 3600,
        }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("token encodes");
    std::fs::write(&token_path, json!({ "token": token }).to_string()).expect("token written");

    let output = posturator(&token_path, &["whoami"], "");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "sam <sam@example.com> role=USER\n");

    let output = posturator(&token_path, &["logout"], "");
    assert!(output.status.success());
    assert!(!token_path.exists());
}

#[test]
fn configuration_errors_exit_non_zero() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = Command::new(env!("CARGO_BIN_EXE_posturator"))
        .arg("products")
        .env("APP_TOKEN_PATH", dir.path().join("token.json"))
        .env("APP_API_TIMEOUT_SECS", "0")
        .output()
        .expect("binary runs");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("application error:"));
}

#[test]
fn corrupt_token_file_does_not_lock_out_the_user() {
    let dir = tempfile::tempdir().expect("temp dir");
    let token_path = dir.path().join("token.json");
    std::fs::write(&token_path, "{not json").expect("token written");

    let output = posturator(&token_path, &["whoami"], "");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "Not signed in.\n");
    assert!(!token_path.exists());

    std::fs::write(&token_path, "{not json").expect("token written");
    let output = posturator(&token_path, &["logout"], "");
    assert!(output.status.success());
    assert!(!token_path.exists());
}
