//! Rendering of an [`Extraction`] for the terminal or for machines.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

use crate::function::{ApiKind, Function, StreamKind, Trigger, TriggerKind};
use crate::template::{Diagnostic, Extraction, Severity};

/// Output format for the function catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One block per function, then diagnostics, colored when printing to a terminal
    #[default]
    Text,
    /// A single pretty-printed JSON document
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    template: &'a Path,
    port: u16,
    functions: &'a [Function],
    diagnostics: &'a [Diagnostic],
}

/// Render the extraction as a JSON document.
///
/// # Errors
///
/// Fails only if serialization fails.
pub fn render_json(extraction: &Extraction, template: &Path, port: u16) -> Result<String> {
    let report = Report {
        template,
        port,
        functions: &extraction.functions,
        diagnostics: &extraction.diagnostics,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

/// Render the extraction as human-readable text.
#[must_use]
pub fn render_text(
    extraction: &Extraction,
    template: &Path,
    port: u16,
    base_dir: Option<&Path>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({} function(s), port {})",
        "Template".bold(),
        template.display(),
        extraction.functions.len(),
        port
    );

    for function in &extraction.functions {
        write_function(&mut out, function, base_dir);
    }

    for diagnostic in &extraction.diagnostics {
        let label = match diagnostic.severity {
            Severity::Warning => "warning".yellow(),
            Severity::Error => "error".red().bold(),
        };
        let _ = writeln!(out, "{label}: {diagnostic}");
    }
    out
}

fn write_function(out: &mut String, function: &Function, base_dir: Option<&Path>) {
    let code = function
        .code
        .local_path(base_dir)
        .map_or_else(|| function.code.to_string(), |path| path.display().to_string());
    let _ = writeln!(
        out,
        "Function {}: handler={}, runtime={}, code={}, memory={}MB, timeout={}s",
        function.logical_id.green(),
        function.handler,
        function.runtime,
        code,
        function.memory_size,
        function.timeout
    );
    if let Some(condition) = &function.condition {
        let _ = writeln!(out, "  condition {condition}");
    }
    for (name, value) in &function.environment {
        let _ = writeln!(out, "  env {name}={value}");
    }
    for trigger in &function.triggers {
        let _ = writeln!(out, "  trigger {}: {}", trigger.name, describe_trigger(trigger));
    }
}

/// One-line description of a trigger.
#[must_use]
pub fn describe_trigger(trigger: &Trigger) -> String {
    match &trigger.kind {
        TriggerKind::HttpApi {
            path,
            method,
            api,
            ..
        } => {
            let api = match api {
                ApiKind::Rest => "REST",
                ApiKind::Http => "HTTP",
            };
            format!("{} {path} ({api} API)", method.to_ascii_uppercase())
        }
        TriggerKind::Schedule {
            expression,
            enabled,
            ..
        } => {
            if *enabled {
                format!("schedule {expression}")
            } else {
                format!("schedule {expression} (disabled)")
            }
        }
        TriggerKind::Queue {
            queue,
            ..
        } => format!("queue {queue}"),
        TriggerKind::Topic {
            topic,
            ..
        } => format!("topic {topic}"),
        TriggerKind::Storage {
            bucket,
            events,
            ..
        } => format!("bucket {bucket} [{}]", events.join(", ")),
        TriggerKind::Stream {
            stream,
            source,
            ..
        } => {
            let source = match source {
                StreamKind::Kinesis => "kinesis",
                StreamKind::DynamoDb => "dynamodb",
            };
            format!("{source} stream {stream}")
        }
        TriggerKind::Custom {
            event_type,
            ..
        } => format!("{event_type} event"),
    }
}
