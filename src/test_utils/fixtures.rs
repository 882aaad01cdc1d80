//! Sample templates used across the test suites.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// A named template document.
#[derive(Clone, Debug)]
pub struct TemplateFixture {
    pub name: String,
    pub content: String,
}

impl TemplateFixture {
    fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.trim_start().to_string(),
        }
    }

    /// One SAM function with an API event and defaults for everything else.
    pub fn hello_world() -> Self {
        Self::new(
            "hello_world",
            r"
AWSTemplateFormatVersion: '2010-09-09'
Transform: AWS::Serverless-2016-10-31
Description: Hello world
Resources:
  HelloWorldFunction:
    Type: AWS::Serverless::Function
    Properties:
      Handler: app.lambda_handler
      Runtime: python3.12
      CodeUri: hello_world/
      Events:
        HelloWorld:
          Type: Api
          Properties:
            Path: /hello
            Method: get
",
        )
    }

    /// Globals, parameters, a mapping and intrinsics in every function field.
    pub fn with_globals() -> Self {
        Self::new(
            "with_globals",
            r"
Transform: AWS::Serverless-2016-10-31
Parameters:
  Env:
    Type: String
    Default: dev
    AllowedValues: [dev, prod]
  TableName:
    Type: String
    Default: orders
Mappings:
  Sizes:
    dev:
      Memory: 256
    prod:
      Memory: 1024
Conditions:
  IsProd: !Equals [!Ref Env, prod]
Globals:
  Function:
    Runtime: nodejs20.x
    Timeout: 10
    MemorySize: !FindInMap [Sizes, !Ref Env, Memory]
    Environment:
      Variables:
        STAGE: !Ref Env
        TABLE: !Ref TableName
Resources:
  OrdersQueue:
    Type: AWS::SQS::Queue
  CreateOrder:
    Type: AWS::Serverless::Function
    Properties:
      Handler: src/create.handler
      CodeUri: ./
      Timeout: 30
      Environment:
        Variables:
          TABLE: !Sub '${TableName}-${Env}'
          QUEUE_URL: !Ref OrdersQueue
      Events:
        Post:
          Type: HttpApi
          Properties:
            Path: /orders
            Method: POST
  ProcessOrder:
    Type: AWS::Serverless::Function
    Properties:
      Handler: src/process.handler
      CodeUri: ./
      Events:
        Queue:
          Type: SQS
          Properties:
            Queue: !GetAtt OrdersQueue.Arn
            BatchSize: 5
  Report:
    Type: AWS::Serverless::Function
    Condition: IsProd
    Properties:
      Handler: src/report.handler
      CodeUri: ./
      Events:
        Nightly:
          Type: Schedule
          Properties:
            Schedule: rate(1 day)
",
        )
    }

    /// A plain CloudFormation `AWS::Lambda::Function` with inline code.
    pub fn plain_cloudformation() -> Self {
        Self::new(
            "plain_cloudformation",
            r#"
{
  "AWSTemplateFormatVersion": "2010-09-09",
  "Resources": {
    "Inline": {
      "Type": "AWS::Lambda::Function",
      "Properties": {
        "Handler": "index.handler",
        "Runtime": "nodejs18.x",
        "Code": {"ZipFile": "exports.handler = async () => 'ok';"},
        "MemorySize": "512"
      }
    },
    "Packaged": {
      "Type": "AWS::Lambda::Function",
      "Properties": {
        "Handler": "main",
        "Runtime": "provided.al2023",
        "Code": {"S3Bucket": "artifacts", "S3Key": "packaged.zip"}
      }
    }
  }
}
"#,
        )
    }

    /// One good function and one missing its handler.
    pub fn with_broken_function() -> Self {
        Self::new(
            "with_broken_function",
            r"
Transform: AWS::Serverless-2016-10-31
Resources:
  Good:
    Type: AWS::Serverless::Function
    Properties:
      Handler: index.handler
      Runtime: nodejs18.x
      CodeUri: good/
  Broken:
    Type: AWS::Serverless::Function
    Properties:
      Runtime: nodejs18.x
      CodeUri: broken/
",
        )
    }

    /// Text that is not a valid template.
    pub fn invalid_yaml() -> Self {
        Self::new("invalid_yaml", "Resources: [unclosed\n")
    }

    /// Write the fixture as `<name>.yaml` under `dir` and return its path.
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.yaml", self.name));
        tokio::fs::write(&path, &self.content)
            .await
            .with_context(|| format!("Failed to write fixture to {}", path.display()))?;
        Ok(path)
    }
}
