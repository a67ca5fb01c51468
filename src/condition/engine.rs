use crate::ast::{EvaluationTrace, Expression, Value, literal_source};
use crate::error::ConditionError;
use ahash::AHashMap;
use std::cmp::Ordering;

// This macro generates a match arm for an ordering comparison.
macro_rules! eval_order {
    ($self:ident, $l:ident, $r:ident, $op_str:expr, $accept:expr) => {
        $self.eval_comparison($l, $r, $op_str, |ordering: Option<Ordering>| {
            ordering.is_some_and($accept)
        })
    };
}

/// The recursive engine evaluating one parsed condition against resolved variables.
pub(super) struct ConditionEngine<'a> {
    expression: &'a Expression,
    variables: &'a AHashMap<String, Value>,
}

impl<'a> ConditionEngine<'a> {
    pub(super) fn new(expression: &'a Expression, variables: &'a AHashMap<String, Value>) -> Self {
        Self {
            expression,
            variables,
        }
    }

    /// Evaluates the expression and returns a trace of the execution.
    pub(super) fn evaluate(&self) -> Result<EvaluationTrace, ConditionError> {
        self.evaluate_recursive(self.expression)
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Result<EvaluationTrace, ConditionError> {
        match expr {
            // --- Ordering ---
            Expression::GreaterThan(l, r) => eval_order!(self, l, r, ">", Ordering::is_gt),
            Expression::SmallerThan(l, r) => eval_order!(self, l, r, "<", Ordering::is_lt),
            Expression::GreaterThanOrEqual(l, r) => {
                eval_order!(self, l, r, ">=", Ordering::is_ge)
            }
            Expression::SmallerThanOrEqual(l, r) => {
                eval_order!(self, l, r, "<=", Ordering::is_le)
            }

            // --- Equality ---
            Expression::Equal(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(
                    left_trace
                        .get_outcome()
                        .loosely_equals(&right_trace.get_outcome()),
                );
                Ok(binary("==", left_trace, right_trace, outcome))
            }
            Expression::NotEqual(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(
                    !left_trace
                        .get_outcome()
                        .loosely_equals(&right_trace.get_outcome()),
                );
                Ok(binary("!=", left_trace, right_trace, outcome))
            }

            // --- Membership ---
            Expression::Contains(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                let right_trace = self.evaluate_recursive(r)?;
                let haystack = left_trace.get_outcome();
                let found = haystack.contains(&right_trace.get_outcome()).ok_or_else(|| {
                    ConditionError::TypeMismatch {
                        operation: "contains".to_string(),
                        expected: "list or string".to_string(),
                        found: haystack.clone(),
                    }
                })?;
                Ok(binary("contains", left_trace, right_trace, Value::Bool(found)))
            }

            // --- Logical Operations ---
            Expression::And(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                if !left_trace.get_outcome().is_truthy() {
                    return Ok(binary(
                        "&&",
                        left_trace,
                        EvaluationTrace::NotEvaluated,
                        Value::Bool(false),
                    ));
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(right_trace.get_outcome().is_truthy());
                Ok(binary("&&", left_trace, right_trace, outcome))
            }
            Expression::Or(l, r) => {
                let left_trace = self.evaluate_recursive(l)?;
                if left_trace.get_outcome().is_truthy() {
                    return Ok(binary(
                        "||",
                        left_trace,
                        EvaluationTrace::NotEvaluated,
                        Value::Bool(true),
                    ));
                }
                let right_trace = self.evaluate_recursive(r)?;
                let outcome = Value::Bool(right_trace.get_outcome().is_truthy());
                Ok(binary("||", left_trace, right_trace, outcome))
            }
            Expression::Not(v) => {
                let child_trace = self.evaluate_recursive(v)?;
                let outcome = Value::Bool(!child_trace.get_outcome().is_truthy());
                Ok(EvaluationTrace::UnaryOp {
                    op_symbol: "!",
                    child: Box::new(child_trace),
                    outcome,
                })
            }

            // --- Leaves ---
            Expression::Literal(val) => Ok(EvaluationTrace::Leaf {
                source: literal_source(val),
                value: val.clone(),
                from_store: false,
            }),
            Expression::Variable(path) => Ok(EvaluationTrace::Leaf {
                source: path.clone(),
                value: self.variables.get(path).cloned().unwrap_or(Value::Null),
                from_store: true,
            }),
        }
    }

    fn eval_comparison<F>(
        &self,
        l: &Expression,
        r: &Expression,
        op: &'static str,
        accept: F,
    ) -> Result<EvaluationTrace, ConditionError>
    where
        F: Fn(Option<Ordering>) -> bool,
    {
        let left_trace = self.evaluate_recursive(l)?;
        let right_trace = self.evaluate_recursive(r)?;
        // Non-comparable operands yield `None`, which no ordering operator accepts.
        let ordering = left_trace.get_outcome().compare(&right_trace.get_outcome());
        Ok(binary(op, left_trace, right_trace, Value::Bool(accept(ordering))))
    }
}

fn binary(
    op_symbol: &'static str,
    left: EvaluationTrace,
    right: EvaluationTrace,
    outcome: Value,
) -> EvaluationTrace {
    EvaluationTrace::BinaryOp {
        op_symbol,
        left: Box::new(left),
        right: Box::new(right),
        outcome,
    }
}
