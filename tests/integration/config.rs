use crate::common::TestProject;

const TEMPLATE: &str = r"
Transform: AWS::Serverless-2016-10-31
Parameters:
  Env:
    Type: String
    Default: dev
Resources:
  Api:
    Type: AWS::Serverless::Function
    Properties:
      Handler: index.handler
      Runtime: nodejs18.x
      CodeUri: src/
      Environment:
        Variables:
          STAGE: !Ref Env
          REGION: !Ref AWS::Region
          ACCOUNT: !Ref AWS::AccountId
          STACK: !Ref AWS::StackName
          BUCKET: !Sub 'assets-${AWS::AccountId}-${AWS::Region}'
";

const CONFIG: &str = r#"
[defaults]
region = "eu-west-1"

[profiles.staging]
account_id = "111111111111"
stack_name = "orders-staging"

[profiles.staging.parameters]
Env = "staging"
"#;

#[tokio::test]
async fn test_builtin_pseudo_parameters() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();

    let output = project.run(&["-t", "template.yaml"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("env ACCOUNT=123456789012")
        .assert_stdout_contains("env REGION=us-east-1")
        .assert_stdout_contains("env STACK=lambda-local")
        .assert_stdout_contains("env STAGE=dev");
}

#[tokio::test]
async fn test_config_defaults_apply() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();
    project.write_config(CONFIG).await.unwrap();

    let output = project.run(&["-t", "template.yaml"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("env REGION=eu-west-1")
        .assert_stdout_contains("env STAGE=dev");
}

#[tokio::test]
async fn test_profile_layers_over_defaults() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();
    project.write_config(CONFIG).await.unwrap();

    let output = project.run(&["-t", "template.yaml", "--profile", "staging"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("env ACCOUNT=111111111111")
        .assert_stdout_contains("env BUCKET=assets-111111111111-eu-west-1")
        .assert_stdout_contains("env STACK=orders-staging")
        .assert_stdout_contains("env STAGE=staging");
}

#[tokio::test]
async fn test_flags_win_over_profile() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();
    project.write_config(CONFIG).await.unwrap();

    let output = project
        .run(&[
            "-t",
            "template.yaml",
            "--profile",
            "staging",
            "--region",
            "ap-southeast-2",
            "--parameter-overrides",
            "Env=prod",
        ])
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("env REGION=ap-southeast-2")
        .assert_stdout_contains("env STAGE=prod");
}

#[tokio::test]
async fn test_explicit_config_path() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();
    let other = project.project_path().join("other.toml");
    tokio::fs::write(&other, "[defaults]\nregion = \"sa-east-1\"\n").await.unwrap();

    let output = project
        .run(&["-t", "template.yaml", "--config", other.to_str().unwrap()])
        .unwrap();
    output.assert_success().assert_stdout_contains("env REGION=sa-east-1");
}

#[tokio::test]
async fn test_unknown_profile_fails() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();
    project.write_config(CONFIG).await.unwrap();

    let output = project.run(&["-t", "template.yaml", "--profile", "prod"]).unwrap();
    assert!(!output.success);
    output
        .assert_stderr_contains("Profile 'prod' not found")
        .assert_stderr_contains("Available profiles: staging");
}

/// An exported AWS profile belongs to the AWS tooling and is not a
/// lambda-local profile.
#[tokio::test]
async fn test_aws_profile_env_is_ignored() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();

    let output = project.run_with_env(&["-t", "template.yaml"], &[("AWS_PROFILE", "work")]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("Function Api")
        .assert_stdout_contains("env REGION=us-east-1");
}

#[tokio::test]
async fn test_profile_from_environment() {
    let project = TestProject::new().await.unwrap();
    project.write_template("template.yaml", TEMPLATE).await.unwrap();
    project.write_config(CONFIG).await.unwrap();

    let output = project
        .run_with_env(&["-t", "template.yaml"], &[("LAMBDA_LOCAL_PROFILE", "staging")])
        .unwrap();
    output.assert_success().assert_stdout_contains("env STACK=orders-staging");
}
