use crate::fake::Sandbox;

fn with_build(sandbox: &Sandbox) {
    let build = sandbox.project().join("target/site");
    std::fs::create_dir_all(&build).unwrap();
    std::fs::write(build.join("index.html"), "<h1>blog</h1>").unwrap();
}

fn aws_calls(sandbox: &Sandbox) -> Vec<String> {
    std::fs::read_to_string(sandbox.path("aws.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_owned)
        .collect()
}

#[test]
fn publish_syncs_both_regions_then_invalidates() {
    let sandbox = Sandbox::new();
    with_build(&sandbox);

    let assert = sandbox
        .bluegreen()
        .args(["--output", "json", "publish"])
        .env("FAKE_AWS_LOG", sandbox.path("aws.log"))
        .assert()
        .success();

    let calls = aws_calls(&sandbox);
    let syncs: Vec<_> = calls.iter().filter(|c| c.starts_with("s3 sync")).collect();
    assert_eq!(syncs.len(), 2);
    assert!(syncs[0].ends_with("s3://blog-us-7f3a --delete --region us-west-2"));
    assert!(syncs[1].ends_with("s3://blog-eu-91bc --delete --region eu-west-1"));
    assert_eq!(
        calls.last().map(String::as_str),
        Some("cloudfront create-invalidation --distribution-id E2ABC --paths /*")
    );

    let out: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(out["invalidation"]["invalidation_id"], "I3XYZ");
    assert_eq!(out["summary"]["endpoints"][0]["label"], "US West");
}

#[test]
fn failed_sync_never_invalidates() {
    let sandbox = Sandbox::new();
    with_build(&sandbox);

    let assert = sandbox
        .bluegreen()
        .arg("publish")
        .env("FAKE_AWS_LOG", sandbox.path("aws.log"))
        .env("FAKE_FAIL_BUCKET", "blog-eu-91bc")
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("blog-eu-91bc"));
    assert!(stderr.contains("Deployment failed after"));
    assert!(!aws_calls(&sandbox)
        .iter()
        .any(|c| c.starts_with("cloudfront")));
}

#[test]
fn sync_without_build_fails_early() {
    let sandbox = Sandbox::new();

    let assert = sandbox
        .bluegreen()
        .arg("sync")
        .env("FAKE_AWS_LOG", sandbox.path("aws.log"))
        .assert()
        .failure();

    assert!(String::from_utf8_lossy(&assert.get_output().stderr).contains("Build directory"));
    assert!(aws_calls(&sandbox).is_empty());
}

#[test]
fn invalidate_alone() {
    let sandbox = Sandbox::new();

    sandbox
        .bluegreen()
        .arg("invalidate")
        .env("FAKE_AWS_LOG", sandbox.path("aws.log"))
        .assert()
        .success();

    let calls = aws_calls(&sandbox);
    assert_eq!(calls.len(), 3);
    assert!(calls[2].starts_with("cloudfront create-invalidation"));
}
