//! Intrinsic function evaluation for CloudFormation/SAM templates.
//!
//! Template property values are loosely typed: any value may be a literal, a
//! sequence or mapping of further values, or a single-key mapping naming an
//! intrinsic function (`Ref`, `Fn::Sub`, `Fn::Join`, ...). The [`Resolver`]
//! walks such a tree and produces a plain value, evaluating intrinsics at any
//! depth against a [`ResolutionContext`].
//!
//! # Supported intrinsics
//!
//! | Intrinsic        | Result                                                     |
//! |------------------|------------------------------------------------------------|
//! | `Ref`            | parameter override/default, pseudo-parameter, logical ID   |
//! | `Fn::Sub`        | string with `${Name}` / `${Res.Attr}` placeholders filled  |
//! | `Fn::Join`       | scalars joined with a delimiter                            |
//! | `Fn::FindInMap`  | leaf of a two-level mapping                                |
//! | `Fn::GetAtt`     | deterministic placeholder `"LogicalId.Attribute"`          |
//! | `Fn::If`         | the branch selected by a named condition                   |
//! | `Fn::Select`     | one element of a list                                      |
//! | `Fn::Split`      | a string split into a list                                 |
//! | `Fn::Equals`, `Fn::And`, `Fn::Or`, `Fn::Not` | booleans                       |
//!
//! Any other `Fn::*` key fails with [`ResolutionError::UnsupportedIntrinsic`].
//!
//! # Absent values
//!
//! `Ref: AWS::NoValue` evaluates to [`Resolved::NoValue`]. Inside mappings and
//! sequences such entries are dropped; at the top level callers must treat it
//! as "property not set", never as an empty string.
//!
//! # Termination
//!
//! Parameter defaults and mapping leaves may themselves contain intrinsics.
//! The resolver tracks the chain of parameters, mapping entries and conditions
//! it is currently inside and fails with [`ResolutionError::Cycle`] instead of
//! recursing forever.
//!
//! # Example
//!
//! ```rust,no_run
//! use lambda_local::intrinsics::{ContextOverrides, Resolved, Resolver};
//! use lambda_local::template::Template;
//!
//! let template = Template::parse(r#"
//! Parameters:
//!   Env:
//!     Type: String
//!     Default: dev
//! Resources:
//!   Queue:
//!     Type: AWS::SQS::Queue
//! "#)?;
//! let overrides = ContextOverrides::new();
//! let context = template.resolution_context(&overrides);
//! let resolver = Resolver::new(&context);
//!
//! let expr: serde_yaml::Value = serde_yaml::from_str("Fn::Sub: ${Env}-handler")?;
//! assert_eq!(
//!     resolver.resolve(&expr)?,
//!     Resolved::Value(serde_yaml::Value::String("dev-handler".into()))
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod conditions;
pub mod context;
pub mod error;
mod sub;


pub use context::{ContextOverrides, PseudoParameters, ResolutionContext};
pub use error::ResolutionError;

use serde_yaml::{Mapping, Value};
use strsim::levenshtein;

/// Outcome of resolving a value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A concrete value with no intrinsics left in it
    Value(Value),
    /// `AWS::NoValue`: the property should be treated as absent
    NoValue,
}

impl Resolved {
    /// The concrete value, or `None` for [`Resolved::NoValue`].
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::NoValue => None,
        }
    }

    /// Borrow the concrete value, or `None` for [`Resolved::NoValue`].
    #[must_use]
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::NoValue => None,
        }
    }

    /// Whether this is the `AWS::NoValue` sentinel.
    #[must_use]
    pub const fn is_no_value(&self) -> bool {
        matches!(self, Self::NoValue)
    }
}

/// An intrinsic call recognized in a single-key mapping.
///
/// Each variant borrows the raw (unresolved) argument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Intrinsic<'v> {
    Ref(&'v Value),
    GetAtt(&'v Value),
    Sub(&'v Value),
    Join(&'v Value),
    FindInMap(&'v Value),
    If(&'v Value),
    Select(&'v Value),
    Split(&'v Value),
    Equals(&'v Value),
    And(&'v Value),
    Or(&'v Value),
    Not(&'v Value),
    Condition(&'v Value),
    Unsupported(&'v str),
}

impl<'v> Intrinsic<'v> {
    /// Recognize `value` as an intrinsic call.
    ///
    /// Only single-key mappings whose key is `Ref`, `Condition`, or starts
    /// with `Fn::` qualify. Everything else is ordinary data.
    pub(crate) fn parse(value: &'v Value) -> Option<Self> {
        let map = value.as_mapping()?;
        if map.len() != 1 {
            return None;
        }
        let (key, arg) = map.iter().next()?;
        let key = key.as_str()?;
        let intrinsic = match key {
            "Ref" => Self::Ref(arg),
            "Condition" => Self::Condition(arg),
            "Fn::GetAtt" => Self::GetAtt(arg),
            "Fn::Sub" => Self::Sub(arg),
            "Fn::Join" => Self::Join(arg),
            "Fn::FindInMap" => Self::FindInMap(arg),
            "Fn::If" => Self::If(arg),
            "Fn::Select" => Self::Select(arg),
            "Fn::Split" => Self::Split(arg),
            "Fn::Equals" => Self::Equals(arg),
            "Fn::And" => Self::And(arg),
            "Fn::Or" => Self::Or(arg),
            "Fn::Not" => Self::Not(arg),
            other if other.starts_with("Fn::") => Self::Unsupported(other),
            _ => return None,
        };
        Some(intrinsic)
    }
}

/// Whether `value` is an intrinsic call (used to keep calls opaque when merging).
#[must_use]
pub fn is_intrinsic(value: &Value) -> bool {
    Intrinsic::parse(value).is_some()
}

/// Render a scalar as the string CloudFormation would substitute for it.
///
/// Returns `None` for null, sequences, mappings and tagged values.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Short human description of a value's kind for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Chain of named entities currently being resolved.
#[derive(Debug, Default)]
pub(crate) struct Trail {
    frames: Vec<String>,
}

impl Trail {
    fn enter(&mut self, frame: String) -> Result<(), ResolutionError> {
        if let Some(start) = self.frames.iter().position(|f| *f == frame) {
            let mut chain: Vec<&str> = self.frames[start..].iter().map(String::as_str).collect();
            chain.push(&frame);
            return Err(ResolutionError::Cycle {
                chain: chain.join(" -> "),
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    fn leave(&mut self) {
        self.frames.pop();
    }
}

/// Evaluates intrinsic expressions against a [`ResolutionContext`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    context: &'a ResolutionContext<'a>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over `context`.
    #[must_use]
    pub const fn new(context: &'a ResolutionContext<'a>) -> Self {
        Self {
            context,
        }
    }

    /// The context this resolver reads from.
    #[must_use]
    pub const fn context(&self) -> &'a ResolutionContext<'a> {
        self.context
    }

    /// Resolve every intrinsic in `value`, at any depth.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolutionError`] encountered.
    pub fn resolve(&self, value: &Value) -> Result<Resolved, ResolutionError> {
        self.eval(value, &mut Trail::default())
    }

    /// Resolve `value` and render it as a string.
    ///
    /// Returns `Ok(None)` for null and `AWS::NoValue`.
    ///
    /// # Errors
    ///
    /// Fails if resolution fails or the result is a list or mapping.
    pub fn resolve_string(&self, value: &Value) -> Result<Option<String>, ResolutionError> {
        self.string_of(value, "property", &mut Trail::default())
    }

    pub(crate) fn eval(&self, value: &Value, trail: &mut Trail) -> Result<Resolved, ResolutionError> {
        match value {
            Value::Mapping(map) => match Intrinsic::parse(value) {
                Some(Intrinsic::Condition(_)) | None => self.eval_mapping(map, trail),
                Some(intrinsic) => self.eval_intrinsic(intrinsic, trail),
            },
            Value::Sequence(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Resolved::Value(v) = self.eval(item, trail)? {
                        out.push(v);
                    }
                }
                Ok(Resolved::Value(Value::Sequence(out)))
            }
            Value::Tagged(tagged) => self.eval(&tagged.value, trail),
            scalar => Ok(Resolved::Value(scalar.clone())),
        }
    }

    fn eval_mapping(&self, map: &Mapping, trail: &mut Trail) -> Result<Resolved, ResolutionError> {
        let mut out = Mapping::with_capacity(map.len());
        for (key, value) in map {
            if let Resolved::Value(v) = self.eval(value, trail)? {
                out.insert(key.clone(), v);
            }
        }
        Ok(Resolved::Value(Value::Mapping(out)))
    }

    fn eval_intrinsic(
        &self,
        intrinsic: Intrinsic<'_>,
        trail: &mut Trail,
    ) -> Result<Resolved, ResolutionError> {
        match intrinsic {
            Intrinsic::Ref(arg) => {
                let name = arg
                    .as_str()
                    .ok_or_else(|| {
                        ResolutionError::invalid_arguments(
                            "Ref",
                            format!("expected a name, found {}", kind_of(arg)),
                        )
                    })?;
                self.resolve_ref(name, trail)
            }
            Intrinsic::GetAtt(arg) => self.eval_get_att(arg, trail).map(Resolved::Value),
            Intrinsic::Sub(arg) => self.eval_sub(arg, trail).map(|s| Resolved::Value(Value::String(s))),
            Intrinsic::Join(arg) => self.eval_join(arg, trail).map(|s| Resolved::Value(Value::String(s))),
            Intrinsic::FindInMap(arg) => self.eval_find_in_map(arg, trail),
            Intrinsic::If(arg) => self.eval_if(arg, trail),
            Intrinsic::Select(arg) => self.eval_select(arg, trail),
            Intrinsic::Split(arg) => self.eval_split(arg, trail).map(Resolved::Value),
            Intrinsic::Equals(_) | Intrinsic::And(_) | Intrinsic::Or(_) | Intrinsic::Not(_) => {
                // Only valid in Conditions, but a boolean is the sensible reading elsewhere.
                let value = self.eval_condition_expr(intrinsic, trail)?;
                Ok(Resolved::Value(Value::Bool(value)))
            }
            Intrinsic::Condition(name) => {
                let name = name.as_str().ok_or_else(|| {
                    ResolutionError::invalid_arguments("Condition", "expected a condition name")
                })?;
                self.condition_named(name, trail).map(|b| Resolved::Value(Value::Bool(b)))
            }
            Intrinsic::Unsupported(name) => Err(ResolutionError::UnsupportedIntrinsic {
                name: name.to_string(),
            }),
        }
    }

    /// `Ref` semantics shared by `Ref` and `Fn::Sub` placeholders.
    pub(crate) fn resolve_ref(&self, name: &str, trail: &mut Trail) -> Result<Resolved, ResolutionError> {
        if name == "AWS::NoValue" {
            return Ok(Resolved::NoValue);
        }
        if let Some(value) = self.context.pseudo().lookup(name) {
            return Ok(Resolved::Value(value));
        }

        if let Some(parameter) = self.context.parameters.get(name) {
            if let Some(supplied) = self.context.overrides.parameters.get(name) {
                return parameter.accept(name, supplied).map(Resolved::Value);
            }
            let Some(default) = &parameter.default else {
                return Err(ResolutionError::unresolved(
                    name,
                    Some("parameter has no default value and no override".to_string()),
                ));
            };
            trail.enter(format!("Ref:{name}"))?;
            let resolved = self.eval(default, trail);
            trail.leave();
            return match resolved? {
                Resolved::NoValue => Ok(Resolved::NoValue),
                Resolved::Value(Value::Sequence(items)) => Ok(Resolved::Value(Value::Sequence(items))),
                Resolved::Value(value) => {
                    let text = scalar_to_string(&value).ok_or_else(|| {
                        ResolutionError::InvalidParameterValue {
                            name: name.to_string(),
                            value: kind_of(&value).to_string(),
                            reason: "default must be a scalar or list".to_string(),
                        }
                    })?;
                    parameter.accept(name, &text).map(Resolved::Value)
                }
            };
        }

        // Undeclared overrides are still honored so callers can inject ad-hoc names.
        if let Some(supplied) = self.context.overrides.parameters.get(name) {
            return Ok(Resolved::Value(Value::String(supplied.clone())));
        }

        // Physical resource IDs only exist after deployment; the logical ID stands in.
        if self.context.has_resource(name) {
            return Ok(Resolved::Value(Value::String(name.to_string())));
        }

        Err(ResolutionError::unresolved(name, self.suggest(name)))
    }

    pub(super) fn suggest(&self, name: &str) -> Option<String> {
        let threshold = (name.len() / 3).max(2);
        self.context
            .known_names()
            .into_iter()
            .map(|candidate| (levenshtein(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= threshold)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| format!("did you mean '{candidate}'?"))
    }

    fn eval_get_att(&self, arg: &Value, trail: &mut Trail) -> Result<Value, ResolutionError> {
        let (logical_id, attribute) = match arg {
            Value::String(dotted) => dotted
                .split_once('.')
                .map(|(id, attr)| (id.to_string(), attr.to_string()))
                .ok_or_else(|| {
                    ResolutionError::invalid_arguments(
                        "Fn::GetAtt",
                        format!("'{dotted}' is not of the form LogicalId.Attribute"),
                    )
                })?,
            Value::Sequence(items) if items.len() == 2 => {
                let id = self.required_string(&items[0], "Fn::GetAtt", trail)?;
                let attr = self.required_string(&items[1], "Fn::GetAtt", trail)?;
                (id, attr)
            }
            other => {
                return Err(ResolutionError::invalid_arguments(
                    "Fn::GetAtt",
                    format!("expected [LogicalId, Attribute], found {}", kind_of(other)),
                ));
            }
        };
        Ok(Value::String(format!("{logical_id}.{attribute}")))
    }

    fn eval_join(&self, arg: &Value, trail: &mut Trail) -> Result<String, ResolutionError> {
        let [delimiter, list] = fixed_args::<2>(arg, "Fn::Join")?;
        let delimiter = self.required_string(delimiter, "Fn::Join", trail)?;
        let items = self.list_of(list, "Fn::Join", trail)?;
        let parts = items
            .iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| {
                    ResolutionError::invalid_arguments(
                        "Fn::Join",
                        format!("list elements must be scalars, found {}", kind_of(item)),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(&delimiter))
    }

    fn eval_find_in_map(&self, arg: &Value, trail: &mut Trail) -> Result<Resolved, ResolutionError> {
        let args = arg.as_sequence().ok_or_else(|| {
            ResolutionError::invalid_arguments("Fn::FindInMap", "expected [MapName, TopKey, SecondKey]")
        })?;
        if args.len() != 3 && args.len() != 4 {
            return Err(ResolutionError::invalid_arguments(
                "Fn::FindInMap",
                format!("expected 3 arguments, found {}", args.len()),
            ));
        }
        let map_name = self.required_string(&args[0], "Fn::FindInMap", trail)?;
        let top_key = self.required_string(&args[1], "Fn::FindInMap", trail)?;
        let second_key = self.required_string(&args[2], "Fn::FindInMap", trail)?;
        let fallback = args.get(3).and_then(|options| options.get("DefaultValue"));

        let leaf = self
            .context
            .mappings
            .get(&map_name)
            .ok_or_else(|| ResolutionError::MappingLookup {
                path: "Mappings".to_string(),
                key: map_name.clone(),
            })
            .and_then(|map| {
                lookup_key(map, &top_key).ok_or_else(|| ResolutionError::MappingLookup {
                    path: map_name.clone(),
                    key: top_key.clone(),
                })
            })
            .and_then(|entry| {
                lookup_key(entry, &second_key).ok_or_else(|| ResolutionError::MappingLookup {
                    path: format!("{map_name}.{top_key}"),
                    key: second_key.clone(),
                })
            });

        let leaf = match (leaf, fallback) {
            (Ok(leaf), _) => leaf,
            (Err(_), Some(fallback)) => return self.eval(fallback, trail),
            (Err(err), None) => return Err(err),
        };

        trail.enter(format!("Fn::FindInMap:{map_name}.{top_key}.{second_key}"))?;
        let resolved = self.eval(leaf, trail);
        trail.leave();
        resolved
    }

    fn eval_if(&self, arg: &Value, trail: &mut Trail) -> Result<Resolved, ResolutionError> {
        let [condition, when_true, when_false] = fixed_args::<3>(arg, "Fn::If")?;
        let condition = condition.as_str().ok_or_else(|| {
            ResolutionError::invalid_arguments("Fn::If", "first argument must be a condition name")
        })?;
        if self.condition_named(condition, trail)? {
            self.eval(when_true, trail)
        } else {
            self.eval(when_false, trail)
        }
    }

    fn eval_select(&self, arg: &Value, trail: &mut Trail) -> Result<Resolved, ResolutionError> {
        let [index, list] = fixed_args::<2>(arg, "Fn::Select")?;
        let index = self.required_string(index, "Fn::Select", trail)?;
        let index: usize = index.trim().parse().map_err(|_| {
            ResolutionError::invalid_arguments("Fn::Select", format!("'{index}' is not a valid index"))
        })?;
        let items = self.list_of(list, "Fn::Select", trail)?;
        let len = items.len();
        items.into_iter().nth(index).map(Resolved::Value).ok_or_else(|| {
            ResolutionError::invalid_arguments(
                "Fn::Select",
                format!("index {index} out of range for list of {len}"),
            )
        })
    }

    fn eval_split(&self, arg: &Value, trail: &mut Trail) -> Result<Value, ResolutionError> {
        let [delimiter, source] = fixed_args::<2>(arg, "Fn::Split")?;
        let delimiter = self.required_string(delimiter, "Fn::Split", trail)?;
        if delimiter.is_empty() {
            return Err(ResolutionError::invalid_arguments("Fn::Split", "delimiter must not be empty"));
        }
        let source = self.required_string(source, "Fn::Split", trail)?;
        Ok(Value::Sequence(
            source.split(delimiter.as_str()).map(|part| Value::String(part.to_string())).collect(),
        ))
    }

    /// Resolve to a string; null and `AWS::NoValue` become `None`.
    pub(crate) fn string_of(
        &self,
        value: &Value,
        intrinsic: &str,
        trail: &mut Trail,
    ) -> Result<Option<String>, ResolutionError> {
        match self.eval(value, trail)? {
            Resolved::NoValue | Resolved::Value(Value::Null) => Ok(None),
            Resolved::Value(v) => scalar_to_string(&v).map(Some).ok_or_else(|| {
                ResolutionError::invalid_arguments(
                    intrinsic,
                    format!("expected a scalar, found {}", kind_of(&v)),
                )
            }),
        }
    }

    fn required_string(
        &self,
        value: &Value,
        intrinsic: &str,
        trail: &mut Trail,
    ) -> Result<String, ResolutionError> {
        self.string_of(value, intrinsic, trail)?.ok_or_else(|| {
            ResolutionError::invalid_arguments(intrinsic, "argument resolved to no value")
        })
    }

    fn list_of(
        &self,
        value: &Value,
        intrinsic: &str,
        trail: &mut Trail,
    ) -> Result<Vec<Value>, ResolutionError> {
        match self.eval(value, trail)? {
            Resolved::Value(Value::Sequence(items)) => Ok(items),
            Resolved::NoValue => Ok(Vec::new()),
            Resolved::Value(other) => Err(ResolutionError::invalid_arguments(
                intrinsic,
                format!("expected a list, found {}", kind_of(&other)),
            )),
        }
    }
}

/// Split an intrinsic argument into exactly `N` positional arguments.
fn fixed_args<'v, const N: usize>(
    arg: &'v Value,
    intrinsic: &str,
) -> Result<[&'v Value; N], ResolutionError> {
    let items = arg.as_sequence().ok_or_else(|| {
        ResolutionError::invalid_arguments(
            intrinsic,
            format!("expected a list of {N} arguments, found {}", kind_of(arg)),
        )
    })?;
    let refs: Vec<&Value> = items.iter().collect();
    refs.try_into().map_err(|refs: Vec<&Value>| {
        ResolutionError::invalid_arguments(
            intrinsic,
            format!("expected {N} arguments, found {}", refs.len()),
        )
    })
}

/// Look up a mapping entry by its string rendering (mapping keys may be numbers).
fn lookup_key<'v>(map: &'v Value, key: &str) -> Option<&'v Value> {
    map.as_mapping()?
        .iter()
        .find(|(k, _)| scalar_to_string(k).as_deref() == Some(key))
        .map(|(_, v)| v)
}
