use std::process::Output;

use crate::fake::Sandbox;

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn stdout_and_stderr(output: &Output) -> String {
    format!("{}{}", text(&output.stdout), text(&output.stderr))
}

#[test]
fn no_command_prints_usage() {
    let sandbox = Sandbox::new();

    let assert = sandbox.bluegreen().assert().success();

    assert!(text(&assert.get_output().stdout).contains("deploy-blue"));
}

#[test]
fn unknown_command_prints_usage() {
    let sandbox = Sandbox::new();

    let assert = sandbox.bluegreen().arg("frobnicate").assert().success();

    assert!(text(&assert.get_output().stdout).contains("Workflow:"));
}

#[test]
fn rollback_always_succeeds() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .arg("rollback")
        .env("FAKE_RECORD", sandbox.path("calls"))
        .assert()
        .success();

    assert!(text(&assert.get_output().stderr).contains("bluegreen deploy-blue"));
    // no tool was run
    assert!(!sandbox.path("calls").exists());
}

#[test]
fn rollback_succeeds_with_identical_stacks() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .args(["--staging-stack", "production", "rollback"])
        .env("FAKE_RECORD", sandbox.path("calls"))
        .assert()
        .success();

    assert!(text(&assert.get_output().stderr).contains("bluegreen deploy-blue"));
    assert!(!sandbox.path("calls").exists());
}

#[test]
fn failed_production_apply_exits_non_zero() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .arg("deploy-blue")
        .env("FAKE_FAIL_STACK", "production")
        .assert()
        .failure();

    let stderr = text(&assert.get_output().stderr);
    assert!(stderr.contains("apply failed for stack 'production'"));
}

#[test]
fn production_deploy_prints_the_domain() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .args(["--domain", "example.blog", "deploy-production"])
        .assert()
        .success();

    let stderr = text(&assert.get_output().stderr);
    assert!(stderr.contains("example.blog"));
    assert!(stderr.contains("192.0.2.10"));
}

#[test]
fn status_degrades_a_missing_stack() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .arg("status")
        .env("FAKE_MISSING_STACK", "staging")
        .assert()
        .success();

    let output = stdout_and_stderr(assert.get_output());
    assert!(output.contains("Deployed(192.0.2.10)"));
    assert!(output.contains("Not deployed"));
}

#[test]
fn status_as_json() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .args(["--output", "json", "status"])
        .env("FAKE_MISSING_STACK", "staging")
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["production"]["state"]["address"], "192.0.2.10");
    assert_eq!(report["staging"]["state"]["state"], "not_deployed");
    assert_eq!(report["production_url"], "https://m4nuel.blog");
}

#[test]
fn stack_names_come_from_local_config() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.project().join("Bluegreen.toml"),
        "staging_stack = \"green\"\nproduction_stack = \"blue\"\n",
    )
    .unwrap();

    let assert = sandbox
        .bluegreen()
        .arg("deploy")
        .env("FAKE_FAIL_STACK", "green")
        .assert()
        .failure();

    assert!(text(&assert.get_output().stderr).contains("'green'"));
}

#[test]
fn broken_local_config_stops_before_any_apply() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.project().join("Bluegreen.toml"),
        "production_stack = \"blue\"\ndomain = [unterminated\n",
    )
    .unwrap();

    let assert = sandbox
        .bluegreen()
        .arg("deploy-blue")
        .env("FAKE_RECORD", sandbox.path("calls"))
        .assert()
        .failure();

    assert!(text(&assert.get_output().stderr).contains("Invalid configuration file"));
    assert!(!sandbox.path("calls").exists());
}

#[test]
fn identical_stacks_are_rejected() {
    let sandbox = Sandbox::new();

    sandbox
        .bluegreen()
        .args(["--staging-stack", "production", "status"])
        .assert()
        .failure();
}

#[test]
fn passphrase_reaches_the_tool_but_is_never_printed() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .args(["--debug", "--passphrase", "blog_passphrase", "status"])
        .env("FAKE_RECORD", sandbox.path("calls"))
        .assert()
        .success();

    let seen = std::fs::read_to_string(sandbox.path("calls")).unwrap();
    assert!(seen.lines().all(|line| line == "blog_passphrase"));
    assert!(!stdout_and_stderr(assert.get_output()).contains("blog_passphrase"));
}

#[test]
fn passphrase_from_environment() {
    let sandbox = Sandbox::new();

    sandbox
        .bluegreen()
        .arg("status")
        .env("PULUMI_CONFIG_PASSPHRASE", "from_env")
        .env("FAKE_RECORD", sandbox.path("calls"))
        .assert()
        .success();

    let seen = std::fs::read_to_string(sandbox.path("calls")).unwrap();
    assert!(seen.lines().all(|line| line == "from_env"));
}

#[test]
fn completions_are_generated() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .args(["generate", "shell", "zsh"])
        .assert()
        .success();

    assert!(text(&assert.get_output().stdout).contains("promote"));
}
