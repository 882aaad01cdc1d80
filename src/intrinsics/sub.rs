//! `Fn::Sub` string interpolation.
//!
//! Placeholders are `${Name}`. A name is looked up in the optional variable
//! map first, then treated as `Ref Name`. Dotted names (`${Queue.Arn}`) become
//! the `Fn::GetAtt` placeholder when the prefix is a declared resource. `${!Literal}` is an escape that
//! emits `${Literal}` unchanged.

use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;

use super::{ResolutionError, Resolved, Resolver, Trail, kind_of, scalar_to_string};

fn placeholder_regex() -> Option<&'static Regex> {
    static PLACEHOLDER: OnceLock<Option<Regex>> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").ok()).as_ref()
}

impl Resolver<'_> {
    pub(super) fn eval_sub(&self, arg: &Value, trail: &mut Trail) -> Result<String, ResolutionError> {
        let empty = Mapping::new();
        let (template, variables) = match arg {
            Value::String(template) => (template.as_str(), &empty),
            Value::Sequence(items) if items.len() == 2 => {
                let template = items[0].as_str().ok_or_else(|| {
                    ResolutionError::invalid_arguments(
                        "Fn::Sub",
                        format!("template must be a string, found {}", kind_of(&items[0])),
                    )
                })?;
                let variables = items[1].as_mapping().ok_or_else(|| {
                    ResolutionError::invalid_arguments(
                        "Fn::Sub",
                        format!("variables must be a mapping, found {}", kind_of(&items[1])),
                    )
                })?;
                (template, variables)
            }
            other => {
                return Err(ResolutionError::invalid_arguments(
                    "Fn::Sub",
                    format!("expected a string or [String, Mapping], found {}", kind_of(other)),
                ));
            }
        };

        let placeholders = placeholder_regex().ok_or_else(|| {
            ResolutionError::invalid_arguments("Fn::Sub", "placeholder pattern failed to compile")
        })?;
        let mut output = String::with_capacity(template.len());
        let mut last = 0;
        for captures in placeholders.captures_iter(template) {
            let (Some(whole), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            output.push_str(&template[last..whole.start()]);
            last = whole.end();

            let inner = inner.as_str();
            if let Some(literal) = inner.strip_prefix('!') {
                output.push_str("${");
                output.push_str(literal);
                output.push('}');
                continue;
            }
            output.push_str(&self.substitute(inner.trim(), variables, trail)?);
        }
        output.push_str(&template[last..]);
        Ok(output)
    }

    fn substitute(
        &self,
        name: &str,
        variables: &Mapping,
        trail: &mut Trail,
    ) -> Result<String, ResolutionError> {
        let resolved = if let Some(value) = variables.get(name) {
            self.eval(value, trail)?
        } else if let Some((logical_id, attribute)) = name.split_once('.') {
            if !self.context.has_resource(logical_id) {
                return Err(ResolutionError::unresolved(logical_id, self.suggest(logical_id)));
            }
            Resolved::Value(Value::String(format!("{logical_id}.{attribute}")))
        } else {
            self.resolve_ref(name, trail)?
        };

        match resolved {
            Resolved::NoValue => Err(ResolutionError::invalid_arguments(
                "Fn::Sub",
                format!("'${{{name}}}' resolved to AWS::NoValue"),
            )),
            Resolved::Value(value) => scalar_to_string(&value).ok_or_else(|| {
                ResolutionError::invalid_arguments(
                    "Fn::Sub",
                    format!("'${{{name}}}' resolved to a {}, expected a scalar", kind_of(&value)),
                )
            }),
        }
    }
}
