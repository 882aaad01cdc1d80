use lambda_local::test_utils::TemplateFixture;

use crate::common::TestProject;

/// The hello-world template prints one function with its API route.
#[tokio::test]
async fn test_hello_world_text() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::hello_world();
    project.write_template("template.yaml", &fixture.content).await.unwrap();

    let output = project.run(&["--template", "template.yaml"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("1 function(s), port 3001")
        .assert_stdout_contains("Function HelloWorldFunction: handler=app.lambda_handler")
        .assert_stdout_contains("runtime=python3.12")
        .assert_stdout_contains("memory=128MB, timeout=3s")
        .assert_stdout_contains("trigger HelloWorld: GET /hello (REST API)");
    assert!(output.stdout.contains("hello_world"));
}

#[tokio::test]
async fn test_globals_json() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::with_globals();
    project.write_template("template.yaml", &fixture.content).await.unwrap();

    let output = project.run(&["-t", "template.yaml", "--format", "json", "--port", "8080"]).unwrap();
    output.assert_success();

    let report: serde_json::Value = serde_json::from_str(&output.stdout).unwrap();
    assert_eq!(report["port"], 8080);
    assert!(report["diagnostics"].as_array().unwrap().is_empty());

    let functions = report["functions"].as_array().unwrap();
    let ids: Vec<&str> = functions.iter().map(|f| f["logical_id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["CreateOrder", "ProcessOrder", "Report"]);

    let create = &functions[0];
    assert_eq!(create["runtime"], "nodejs20.x");
    assert_eq!(create["timeout"], 30);
    assert_eq!(create["memory_size"], 256);
    assert_eq!(create["environment"]["STAGE"], "dev");
    assert_eq!(create["environment"]["TABLE"], "orders-dev");
    assert_eq!(create["environment"]["QUEUE_URL"], "OrdersQueue");
    assert_eq!(create["triggers"][0]["method"], "post");
    assert_eq!(create["triggers"][0]["api"], "http");

    let process = &functions[1];
    assert_eq!(process["timeout"], 10);
    assert_eq!(process["triggers"][0]["type"], "queue");
    assert_eq!(process["triggers"][0]["queue"], "OrdersQueue.Arn");
    assert_eq!(process["triggers"][0]["batch_size"], 5);

    assert_eq!(functions[2]["condition"], "IsProd");
}

#[tokio::test]
async fn test_skip_false_conditions() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::with_globals();
    project.write_template("template.yaml", &fixture.content).await.unwrap();

    let output = project.run(&["-t", "template.yaml", "--skip-false-conditions"]).unwrap();
    output.assert_success().assert_stdout_contains("2 function(s)");
    assert!(!output.stdout.contains("Function Report"));

    let output = project
        .run(&[
            "-t",
            "template.yaml",
            "--skip-false-conditions",
            "--parameter-overrides",
            "Env=prod",
        ])
        .unwrap();
    output
        .assert_success()
        .assert_stdout_contains("3 function(s)")
        .assert_stdout_contains("memory=1024MB");
}

#[tokio::test]
async fn test_plain_cloudformation_json_template() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::plain_cloudformation();
    project.write_template("stack.json", &fixture.content).await.unwrap();

    let output = project.run(&["-t", "stack.json"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("Function Inline: handler=index.handler")
        .assert_stdout_contains("code=<inline, ")
        .assert_stdout_contains("memory=512MB")
        .assert_stdout_contains("code=s3://artifacts/packaged.zip");
}

/// A broken function is reported but does not stop the others.
#[tokio::test]
async fn test_broken_function_is_a_diagnostic() {
    let project = TestProject::new().await.unwrap();
    let fixture = TemplateFixture::with_broken_function();
    project.write_template("template.yaml", &fixture.content).await.unwrap();

    let output = project.run(&["-t", "template.yaml"]).unwrap();
    output
        .assert_success()
        .assert_stdout_contains("1 function(s)")
        .assert_stdout_contains("Function Good")
        .assert_stdout_contains("error: Broken: Missing required field 'Handler'");
}
