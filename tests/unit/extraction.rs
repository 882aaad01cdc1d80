//! Template → function catalog, end to end through the public API.

use lambda_local::function::{ApiKind, CodeLocation, FunctionKind, TriggerKind};
use lambda_local::intrinsics::ContextOverrides;
use lambda_local::template::{ExtractionOptions, Severity, Template};
use lambda_local::test_utils::{TemplateFixture, init_test_logging};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_hello_world_function() {
    init_test_logging(None);
    let template = Template::parse(&TemplateFixture::hello_world().content).unwrap();
    assert!(template.is_serverless());
    assert_eq!(template.description(), Some("Hello world"));

    let functions = template.functions();
    assert_eq!(functions.len(), 1);
    let hello = &functions["HelloWorldFunction"];
    assert_eq!(hello.kind, FunctionKind::Serverless);
    assert_eq!(hello.handler, "app.lambda_handler");
    assert_eq!(hello.runtime, "python3.12");
    assert_eq!(
        hello.code,
        CodeLocation::Local {
            path: PathBuf::from("hello_world/")
        }
    );
    assert_eq!(hello.memory_size, 128);
    assert_eq!(hello.timeout, 3);
    assert!(hello.environment.is_empty());
    assert_eq!(hello.invocation_name(), "HelloWorldFunction");
    assert_eq!(hello.http_routes().collect::<Vec<_>>(), [("/hello", "get")]);
    match &hello.triggers[0].kind {
        TriggerKind::HttpApi {
            api,
            api_id,
            ..
        } => {
            assert_eq!(*api, ApiKind::Rest);
            assert!(api_id.is_none());
        }
        other => panic!("unexpected trigger {other:?}"),
    }
}

#[test]
fn test_globals_and_intrinsics() {
    init_test_logging(None);
    let template = Template::parse(&TemplateFixture::with_globals().content).unwrap();

    let extraction = template.extract(&ExtractionOptions::default());
    assert!(extraction.diagnostics.is_empty(), "{:?}", extraction.diagnostics);

    let create = extraction.function("CreateOrder").unwrap();
    assert_eq!(create.runtime, "nodejs20.x");
    assert_eq!(create.timeout, 30);
    assert_eq!(create.memory_size, 256);
    assert_eq!(create.environment["STAGE"], "dev");
    assert_eq!(create.environment["TABLE"], "orders-dev");
    assert_eq!(create.environment["QUEUE_URL"], "OrdersQueue");

    let process = extraction.function("ProcessOrder").unwrap();
    assert_eq!(process.timeout, 10);
    assert_eq!(process.environment["TABLE"], "orders");
    assert_eq!(
        process.triggers[0].kind,
        TriggerKind::Queue {
            queue: "OrdersQueue.Arn".to_string(),
            batch_size: Some(5),
        }
    );

    let report = extraction.function("Report").unwrap();
    assert_eq!(report.condition.as_deref(), Some("IsProd"));
}

#[test]
fn test_overrides_flow_into_every_field() {
    let template = Template::parse(&TemplateFixture::with_globals().content).unwrap();
    let options = ExtractionOptions {
        overrides: ContextOverrides::new().with_parameter("Env", "prod").with_parameter("TableName", "sales"),
        skip_false_conditions: true,
    };

    let extraction = template.extract(&options);
    let ids: Vec<&str> = extraction.functions.iter().map(|f| f.logical_id.as_str()).collect();
    assert_eq!(ids, ["CreateOrder", "ProcessOrder", "Report"]);

    let create = extraction.function("CreateOrder").unwrap();
    assert_eq!(create.memory_size, 1024);
    assert_eq!(create.environment["TABLE"], "sales-prod");
    assert_eq!(create.environment["STAGE"], "prod");
}

#[test]
fn test_disallowed_parameter_value_fails_dependent_fields() {
    let template = Template::parse(&TemplateFixture::with_globals().content).unwrap();
    let extraction = template.extract(&ExtractionOptions::with_overrides(
        ContextOverrides::new().with_parameter("Env", "qa"),
    ));

    // MemorySize depends on Env through FindInMap, so the optional property
    // is dropped with a warning while the function itself survives.
    assert!(!extraction.has_errors());
    let create = extraction.function("CreateOrder").unwrap();
    assert_eq!(create.memory_size, 128);
    assert!(create.environment.get("STAGE").is_none());
    assert!(
        extraction
            .warnings()
            .any(|d| d.logical_id == "CreateOrder" && d.property.as_deref() == Some("MemorySize"))
    );
}

#[test]
fn test_plain_cloudformation_functions() {
    let template = Template::parse(&TemplateFixture::plain_cloudformation().content).unwrap();
    assert!(!template.is_serverless());

    let functions = template.ordered_functions();
    assert_eq!(functions.len(), 2);

    let inline = &functions[0];
    assert_eq!(inline.kind, FunctionKind::Lambda);
    assert_eq!(inline.memory_size, 512);
    assert!(matches!(inline.code, CodeLocation::Inline { .. }));

    assert_eq!(
        functions[1].code,
        CodeLocation::S3 {
            bucket: "artifacts".to_string(),
            key: "packaged.zip".to_string(),
            version: None,
        }
    );
}

#[test]
fn test_broken_function_reported() {
    let template = Template::parse(&TemplateFixture::with_broken_function().content).unwrap();
    let extraction = template.extract(&ExtractionOptions::default());

    assert_eq!(extraction.functions.len(), 1);
    let errors: Vec<_> = extraction.errors().collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].logical_id, "Broken");
    assert_eq!(errors[0].severity, Severity::Error);
    assert_eq!(errors[0].to_string(), "Broken: Missing required field 'Handler'");

    let map = extraction.into_map();
    assert!(map.contains_key("Good"));
    assert!(!map.contains_key("Broken"));
}

#[test]
fn test_invalid_document_is_fatal() {
    assert!(Template::parse(&TemplateFixture::invalid_yaml().content).is_err());
}

#[tokio::test]
async fn test_load_resolves_code_relative_to_template() {
    let temp = TempDir::new().unwrap();
    let path = TemplateFixture::hello_world().write_to(temp.path()).await.unwrap();

    let template = Template::load(&path, &Default::default()).await.unwrap();
    assert_eq!(template.base_dir(), Some(temp.path()));

    let hello = &template.functions()["HelloWorldFunction"];
    assert_eq!(hello.code.local_path(template.base_dir()), Some(temp.path().join("hello_world/")));
}
