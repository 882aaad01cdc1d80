//! Evaluation of the template's `Conditions` section.
//!
//! Condition expressions are built from `Fn::Equals`, `Fn::And`, `Fn::Or`,
//! `Fn::Not` and `Condition` references to other named conditions. Operands
//! of `Fn::Equals` may use any value intrinsic (`Ref`, `Fn::FindInMap`, ...).

use serde_yaml::Value;

use super::{Intrinsic, ResolutionError, Resolved, Resolver, Trail, kind_of, scalar_to_string};

impl Resolver<'_> {
    /// Evaluate the named condition from the `Conditions` section.
    ///
    /// # Errors
    ///
    /// Fails if the condition does not exist, refers to itself, or one of its
    /// operands cannot be resolved.
    pub fn evaluate_condition(&self, name: &str) -> Result<bool, ResolutionError> {
        self.condition_named(name, &mut Trail::default())
    }

    pub(super) fn condition_named(&self, name: &str, trail: &mut Trail) -> Result<bool, ResolutionError> {
        let expr = self.context.conditions.get(name).ok_or_else(|| {
            ResolutionError::unresolved(name, Some("no condition with this name".to_string()))
        })?;
        trail.enter(format!("Condition:{name}"))?;
        let result = self.eval_condition(expr, trail);
        trail.leave();
        result
    }

    fn eval_condition(&self, expr: &Value, trail: &mut Trail) -> Result<bool, ResolutionError> {
        match Intrinsic::parse(expr) {
            Some(
                intrinsic @ (Intrinsic::Equals(_)
                | Intrinsic::And(_)
                | Intrinsic::Or(_)
                | Intrinsic::Not(_)),
            ) => self.eval_condition_expr(intrinsic, trail),
            Some(Intrinsic::Condition(name)) => {
                let name = name.as_str().ok_or_else(|| {
                    ResolutionError::invalid_arguments("Condition", "expected a condition name")
                })?;
                self.condition_named(name, trail)
            }
            _ => match self.eval(expr, trail)? {
                Resolved::Value(value) => truthiness(&value),
                Resolved::NoValue => Err(ResolutionError::invalid_arguments(
                    "Conditions",
                    "condition resolved to AWS::NoValue",
                )),
            },
        }
    }

    /// Evaluate one of the boolean condition functions.
    pub(super) fn eval_condition_expr(
        &self,
        intrinsic: Intrinsic<'_>,
        trail: &mut Trail,
    ) -> Result<bool, ResolutionError> {
        match intrinsic {
            Intrinsic::Equals(arg) => {
                let operands = operands(arg, "Fn::Equals")?;
                if operands.len() != 2 {
                    return Err(ResolutionError::invalid_arguments(
                        "Fn::Equals",
                        format!("expected 2 arguments, found {}", operands.len()),
                    ));
                }
                let left = self.eval(&operands[0], trail)?;
                let right = self.eval(&operands[1], trail)?;
                Ok(comparable(&left) == comparable(&right))
            }
            Intrinsic::And(arg) => {
                let operands = operands(arg, "Fn::And")?;
                // Evaluate every operand so reference errors surface regardless of order.
                let mut all = true;
                for operand in operands {
                    all &= self.eval_condition(operand, trail)?;
                }
                Ok(all)
            }
            Intrinsic::Or(arg) => {
                let operands = operands(arg, "Fn::Or")?;
                let mut any = false;
                for operand in operands {
                    any |= self.eval_condition(operand, trail)?;
                }
                Ok(any)
            }
            Intrinsic::Not(arg) => {
                let operands = operands(arg, "Fn::Not")?;
                match operands.as_slice() {
                    [single] => Ok(!self.eval_condition(single, trail)?),
                    _ => Err(ResolutionError::invalid_arguments(
                        "Fn::Not",
                        format!("expected 1 argument, found {}", operands.len()),
                    )),
                }
            }
            other => Err(ResolutionError::invalid_arguments(
                "Conditions",
                format!("{other:?} is not a condition function"),
            )),
        }
    }
}

fn operands<'v>(arg: &'v Value, intrinsic: &str) -> Result<&'v Vec<Value>, ResolutionError> {
    arg.as_sequence().ok_or_else(|| {
        ResolutionError::invalid_arguments(
            intrinsic,
            format!("expected a list, found {}", kind_of(arg)),
        )
    })
}

/// Equality in `Fn::Equals` compares string renderings, so `1 == "1"`.
fn comparable(resolved: &Resolved) -> Option<Value> {
    let value = resolved.as_value()?;
    Some(scalar_to_string(value).map_or_else(|| value.clone(), Value::String))
}

fn truthiness(value: &Value) -> Result<bool, ResolutionError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(ResolutionError::invalid_arguments(
            "Conditions",
            format!("expected a boolean, found {}", kind_of(other)),
        )),
    }
}
