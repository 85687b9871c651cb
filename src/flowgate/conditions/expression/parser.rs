//! Expression parser
//!
//! Parses expressions like:
//! - `execution.state == 'FAILED'`
//! - `inputs.retries > 2`
//! - `vars.env == 'prod' and not vars.dry_run`
//!
//! `or` binds looser than `and`, which binds looser than `not`.
//! Parentheses group.

use super::ast::{CompareOp, Expression, Literal};
use crate::engine::ConditionError;

/// Parse an expression string into an AST
pub fn parse(input: &str) -> Result<Expression, ConditionError> {
    parse_expr(input).map_err(|message| ConditionError::invalid_expression(input, message))
}

fn parse_expr(input: &str) -> Result<Expression, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty expression".to_string());
    }

    if let Some(pos) = find_top_level(input, " or ") {
        let left = parse_expr(&input[..pos])?;
        let right = parse_expr(&input[pos + 4..])?;
        return Ok(Expression::Or(Box::new(left), Box::new(right)));
    }

    if let Some(pos) = find_top_level(input, " and ") {
        let left = parse_expr(&input[..pos])?;
        let right = parse_expr(&input[pos + 5..])?;
        return Ok(Expression::And(Box::new(left), Box::new(right)));
    }

    if let Some(rest) = input.strip_prefix("not ") {
        return Ok(Expression::Not(Box::new(parse_expr(rest)?)));
    }

    if is_wrapped_in_parens(input) {
        return parse_expr(&input[1..input.len() - 1]);
    }

    match input {
        "true" => return Ok(Expression::True),
        "false" => return Ok(Expression::False),
        _ => {}
    }

    if let Some(expr) = parse_comparison(input)? {
        return Ok(expr);
    }

    if is_path(input) {
        return Ok(Expression::Truthy(input.to_string()));
    }

    Err(format!("Could not parse condition: {}", input))
}

fn parse_comparison(input: &str) -> Result<Option<Expression>, String> {
    // Longest operators first so `>=` is not read as `>`
    let operators = [
        ("!=", CompareOp::NotEq),
        (">=", CompareOp::Gte),
        ("<=", CompareOp::Lte),
        ("==", CompareOp::Eq),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
        (" contains ", CompareOp::Contains),
    ];

    for (symbol, op) in operators {
        if let Some(pos) = find_top_level(input, symbol) {
            let path = input[..pos].trim();
            if !is_path(path) {
                return Err(format!("Invalid variable path: '{}'", path));
            }
            let value = parse_literal(&input[pos + symbol.len()..])?;
            return Ok(Some(Expression::Compare {
                path: path.to_string(),
                op,
                value,
            }));
        }
    }

    Ok(None)
}

/// Byte offset of the first `needle` outside quotes and parentheses
fn find_top_level(input: &str, needle: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth -= 1,
                _ if depth == 0 && input[i..].starts_with(needle) => return Some(i),
                _ => {}
            },
        }
    }
    None
}

/// True when the opening parenthesis closes on the last character
fn is_wrapped_in_parens(input: &str) -> bool {
    if !input.starts_with('(') || !input.ends_with(')') {
        return false;
    }

    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return i == input.len() - 1;
                    }
                }
                _ => {}
            },
        }
    }
    false
}

fn is_path(input: &str) -> bool {
    !input.is_empty()
        && !input.starts_with('.')
        && !input.ends_with('.')
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

fn parse_literal(input: &str) -> Result<Literal, String> {
    let input = input.trim();

    match input {
        "null" => return Ok(Literal::Null),
        "true" => return Ok(Literal::Boolean(true)),
        "false" => return Ok(Literal::Boolean(false)),
        _ => {}
    }

    if input.len() >= 2
        && ((input.starts_with('\'') && input.ends_with('\''))
            || (input.starts_with('"') && input.ends_with('"')))
    {
        return Ok(Literal::String(input[1..input.len() - 1].to_string()));
    }

    input
        .parse::<serde_json::Number>()
        .map(Literal::Number)
        .map_err(|_| format!("Could not parse literal: {}", input))
}
