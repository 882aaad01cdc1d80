//! Intrinsic resolution through a template's resolution context.

use lambda_local::intrinsics::{ContextOverrides, ResolutionError, Resolved, Resolver};
use lambda_local::template::Template;
use serde_yaml::Value;

const TEMPLATE: &str = r"
Parameters:
  Env:
    Type: String
    Default: dev
  Zones:
    Type: CommaDelimitedList
    Default: a,b,c
Mappings:
  Regions:
    us-east-1:
      Ami: ami-east
    eu-west-1:
      Ami: ami-west
Conditions:
  IsProd: !Equals [!Ref Env, prod]
  NotProd: !Not [!Condition IsProd]
Resources:
  Bucket:
    Type: AWS::S3::Bucket
";

fn eval(overrides: &ContextOverrides, expression: &str) -> Result<Resolved, ResolutionError> {
    let template = Template::parse(TEMPLATE).unwrap();
    let context = template.resolution_context(overrides);
    let expression: Value = serde_yaml::from_str(expression).unwrap();
    Resolver::new(&context).resolve(&expression)
}

fn text(overrides: &ContextOverrides, expression: &str) -> String {
    match eval(overrides, expression).unwrap() {
        Resolved::Value(Value::String(s)) => s,
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn test_sub_with_pseudo_parameters_and_attributes() {
    let overrides = ContextOverrides::new().with_region("eu-west-1");
    assert_eq!(
        text(&overrides, "Fn::Sub: '${Env}-${AWS::Region}-${Bucket.Arn}'"),
        "dev-eu-west-1-Bucket.Arn"
    );
    assert_eq!(text(&overrides, "Fn::Sub: '${!Literal}'"), "${Literal}");
}

#[test]
fn test_find_in_map_follows_region_override() {
    let overrides = ContextOverrides::new().with_region("eu-west-1");
    assert_eq!(text(&overrides, "Fn::FindInMap: [Regions, {Ref: 'AWS::Region'}, Ami]"), "ami-west");
    assert_eq!(
        text(&ContextOverrides::new(), "Fn::FindInMap: [Regions, {Ref: 'AWS::Region'}, Ami]"),
        "ami-east"
    );
}

#[test]
fn test_if_follows_conditions() {
    let expression = "Fn::If: [IsProd, large, small]";
    assert_eq!(text(&ContextOverrides::new(), expression), "small");
    assert_eq!(text(&ContextOverrides::new().with_parameter("Env", "prod"), expression), "large");
    assert_eq!(
        text(&ContextOverrides::new(), "Fn::If: [NotProd, yes, no]"),
        "yes"
    );
}

#[test]
fn test_list_functions() {
    let overrides = ContextOverrides::new();
    assert_eq!(text(&overrides, "Fn::Select: [1, {Ref: Zones}]"), "b");
    assert_eq!(text(&overrides, "Fn::Join: ['-', {Ref: Zones}]"), "a-b-c");
    assert_eq!(
        text(&overrides, "Fn::Join: [',', {'Fn::Split': ['|', 'x|y']}]"),
        "x,y"
    );
}

#[test]
fn test_no_value_is_not_a_string() {
    assert_eq!(eval(&ContextOverrides::new(), "Ref: AWS::NoValue").unwrap(), Resolved::NoValue);
}

#[test]
fn test_unknown_reference_suggests_close_name() {
    let err = eval(&ContextOverrides::new(), "Ref: Evn").unwrap_err();
    assert!(matches!(err, ResolutionError::UnresolvedReference { .. }));
    assert!(err.to_string().contains("Env"));
}

#[test]
fn test_unsupported_intrinsic() {
    let err = eval(&ContextOverrides::new(), "Fn::ImportValue: shared-vpc").unwrap_err();
    assert!(matches!(err, ResolutionError::UnsupportedIntrinsic { .. }));
}
