use assert_cmd::Command;
use lambda_local::test_utils::TemplateFixture;
use predicates::prelude::*;

use crate::common::TestProject;

#[tokio::test]
async fn test_missing_template_file() {
    let project = TestProject::new().await.unwrap();

    let output = project.run(&["-t", "missing.yaml"]).unwrap();
    assert!(!output.success);
    assert_eq!(output.code, Some(1));
    output.assert_stderr_contains("Failed to read template missing.yaml");
}

#[tokio::test]
async fn test_invalid_yaml() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::invalid_yaml();
    project.write_template("template.yaml", &fixture.content).await.unwrap();

    let output = project.run(&["-t", "template.yaml"]).unwrap();
    assert!(!output.success);
    output.assert_stderr_contains("Failed to decode template");
}

#[tokio::test]
async fn test_strict_rejects_unknown_keys() {
    let project = TestProject::new().await.unwrap();
    let mut content = TemplateFixture::hello_world().content;
    content.push_str("Extras:\n  Anything: true\n");
    project.write_template("template.yaml", &content).await.unwrap();

    project.run(&["-t", "template.yaml"]).unwrap().assert_success();

    let output = project.run(&["-t", "template.yaml", "--strict"]).unwrap();
    assert!(!output.success);
    output.assert_stderr_contains("Unknown field 'Extras'");
}

#[tokio::test]
async fn test_fail_on_error_exit_code() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::with_broken_function();
    project.write_template("template.yaml", &fixture.content).await.unwrap();

    let output = project.run(&["-t", "template.yaml", "--fail-on-error"]).unwrap();
    assert_eq!(output.code, Some(1));
    output
        .assert_stdout_contains("Function Good")
        .assert_stderr_contains("1 function resource(s) could not be built");
}

#[tokio::test]
async fn test_malformed_override() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::hello_world();
    let path = fixture.write_to(project.project_path()).await.unwrap();

    Command::cargo_bin("lambda-local")
        .unwrap()
        .arg("-t")
        .arg(&path)
        .args(["--parameter-overrides", "Env"])
        .env("NO_COLOR", "1")
        .env_remove("LAMBDA_LOCAL_PROFILE")
        .env("LAMBDA_LOCAL_CONFIG", project.project_path().join("none.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid parameter override 'Env'"))
        .stderr(predicate::str::contains("--parameter-overrides Name=Value"));
}

#[test]
fn test_help_lists_flags() {
    Command::cargo_bin("lambda-local")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--template"))
        .stdout(predicate::str::contains("--parameter-overrides"))
        .stdout(predicate::str::contains("--skip-false-conditions"));
}
