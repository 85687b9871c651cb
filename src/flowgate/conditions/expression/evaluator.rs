//! Expression evaluation against run-context variables

use serde_json::{Number, Value};
use std::cmp::Ordering;

use super::ast::{CompareOp, Expression, Literal};
use crate::engine::RunContext;

/// Evaluate a parsed expression. Missing variables behave like `null`.
pub fn evaluate(expr: &Expression, context: &RunContext) -> bool {
    match expr {
        Expression::True => true,
        Expression::False => false,
        Expression::Compare { path, op, value } => {
            evaluate_compare(context.get_path(path), *op, value)
        }
        Expression::And(left, right) => evaluate(left, context) && evaluate(right, context),
        Expression::Or(left, right) => evaluate(left, context) || evaluate(right, context),
        Expression::Not(inner) => !evaluate(inner, context),
        Expression::Truthy(path) => is_truthy(context.get_path(path)),
    }
}

fn evaluate_compare(left: Option<&Value>, op: CompareOp, right: &Literal) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::NotEq => !values_equal(left, right),
        CompareOp::Gt => compare_numbers(left, right, Ordering::is_gt),
        CompareOp::Gte => compare_numbers(left, right, Ordering::is_ge),
        CompareOp::Lt => compare_numbers(left, right, Ordering::is_lt),
        CompareOp::Lte => compare_numbers(left, right, Ordering::is_le),
        CompareOp::Contains => contains(left, right),
    }
}

fn values_equal(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (None, Literal::Null) | (Some(Value::Null), Literal::Null) => true,
        (Some(value), literal) => literal_matches(value, literal),
        (None, _) => false,
    }
}

fn literal_matches(value: &Value, literal: &Literal) -> bool {
    match (value, literal) {
        (Value::String(s), Literal::String(rs)) => s == rs,
        (Value::Number(n), Literal::Number(rn)) => {
            number_ordering(n, rn) == Some(Ordering::Equal)
        }
        (Value::Bool(b), Literal::Boolean(rb)) => b == rb,
        (Value::Null, Literal::Null) => true,
        _ => false,
    }
}

fn compare_numbers<F>(left: Option<&Value>, right: &Literal, accept: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    match (left, right) {
        (Some(Value::Number(l)), Literal::Number(r)) => {
            number_ordering(l, r).map(accept).unwrap_or(false)
        }
        _ => false,
    }
}

/// Integers compare exactly; anything else compares as `f64`, with values
/// within a relative epsilon of each other treated as equal.
fn number_ordering(left: &Number, right: &Number) -> Option<Ordering> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return Some(l.cmp(&r));
    }
    if let (Some(l), Some(r)) = (left.as_u64(), right.as_u64()) {
        return Some(l.cmp(&r));
    }

    let (l, r) = (left.as_f64()?, right.as_f64()?);
    if (l - r).abs() <= f64::EPSILON * l.abs().max(r.abs()) {
        return Some(Ordering::Equal);
    }
    l.partial_cmp(&r)
}

fn contains(left: Option<&Value>, right: &Literal) -> bool {
    match (left, right) {
        (Some(Value::String(s)), Literal::String(sub)) => s.contains(sub.as_str()),
        (Some(Value::Array(items)), literal) => {
            items.iter().any(|item| literal_matches(item, literal))
        }
        (Some(Value::Object(map)), Literal::String(key)) => map.contains_key(key),
        _ => false,
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}
