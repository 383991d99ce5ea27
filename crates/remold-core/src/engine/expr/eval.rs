//! Tree-walking evaluator for transform expressions
//!
//! Evaluation is a pure function of the AST and the single bound input
//! value; there is no access to external state. Numeric results that land
//! on a whole number normalize to JSON integers.
//!
//! Copyright (c) 2025 Remold Team
//! Licensed under the Apache-2.0 license

use super::ast::{BinaryOp, Builtin, Expr, Literal, UnaryOp};
use super::ExprError;
use serde_json::{Number, Value};

/// Evaluate a compiled expression with `value` bound to the given input
pub fn evaluate(expr: &Expr, value: &Value) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(lit) => literal_value(lit),
        Expr::Value => Ok(value.clone()),
        Expr::Unary { op, operand } => {
            let operand = evaluate(operand, value)?;
            apply_unary(*op, &operand)
        }
        Expr::Binary { left, op, right } => match op {
            // Short-circuit forms evaluate their own operands
            BinaryOp::And => {
                let lhs = evaluate(left, value)?;
                if !is_truthy(&lhs) {
                    return Ok(Value::Bool(false));
                }
                let rhs = evaluate(right, value)?;
                Ok(Value::Bool(is_truthy(&rhs)))
            }
            BinaryOp::Or => {
                let lhs = evaluate(left, value)?;
                if is_truthy(&lhs) {
                    return Ok(Value::Bool(true));
                }
                let rhs = evaluate(right, value)?;
                Ok(Value::Bool(is_truthy(&rhs)))
            }
            _ => {
                let lhs = evaluate(left, value)?;
                let rhs = evaluate(right, value)?;
                apply_binary(*op, &lhs, &rhs)
            }
        },
        Expr::Ternary {
            condition,
            if_true,
            if_false,
        } => {
            let cond = evaluate(condition, value)?;
            if is_truthy(&cond) {
                evaluate(if_true, value)
            } else {
                evaluate(if_false, value)
            }
        }
        Expr::Call { func, arg } => {
            let arg = evaluate(arg, value)?;
            apply_builtin(*func, &arg)
        }
    }
}

fn literal_value(lit: &Literal) -> Result<Value, ExprError> {
    Ok(match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Number(Number::from(*i)),
        Literal::Float(f) => number_from_f64(*f)?,
        Literal::Str(s) => Value::String(s.clone()),
    })
}

fn apply_unary(op: UnaryOp, operand: &Value) -> Result<Value, ExprError> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!is_truthy(operand))),
        UnaryOp::Neg => match operand {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Number(Number::from(-i)))
                } else {
                    number_from_f64(-n.as_f64().unwrap_or(0.0))
                }
            }
            other => Err(ExprError::TypeMismatch {
                message: format!("cannot negate {}", type_name(other)),
            }),
        },
    }
}

fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, ExprError> {
    match op {
        BinaryOp::Add => {
            if lhs.is_string() || rhs.is_string() {
                return Ok(Value::String(format!("{}{}", render(lhs), render(rhs))));
            }
            numeric_binary(op, lhs, rhs)
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
            numeric_binary(op, lhs, rhs)
        }
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(lhs, rhs))),
        BinaryOp::Ne => Ok(Value::Bool(!loose_eq(lhs, rhs))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = compare(lhs, rhs)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::And | BinaryOp::Or => unreachable!("short-circuit forms handled by evaluate"),
    }
}

fn numeric_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, ExprError> {
    // Integer arithmetic stays integral when both sides are integers and
    // the operation is exact; everything else goes through f64.
    if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
        let exact = match op {
            BinaryOp::Add => a.checked_add(b),
            BinaryOp::Sub => a.checked_sub(b),
            BinaryOp::Mul => a.checked_mul(b),
            BinaryOp::Rem => {
                if b == 0 {
                    return Err(ExprError::DivisionByZero);
                }
                a.checked_rem(b)
            }
            _ => None,
        };
        if let Some(result) = exact {
            return Ok(Value::Number(Number::from(result)));
        }
    }

    let a = as_number(lhs)?;
    let b = as_number(rhs)?;
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Rem => {
            if b == 0.0 {
                return Err(ExprError::DivisionByZero);
            }
            a % b
        }
        _ => unreachable!("numeric_binary only receives arithmetic operators"),
    };
    number_from_f64(result)
}

fn apply_builtin(func: Builtin, arg: &Value) -> Result<Value, ExprError> {
    match func {
        Builtin::Upper => Ok(Value::String(as_str(func, arg)?.to_uppercase())),
        Builtin::Lower => Ok(Value::String(as_str(func, arg)?.to_lowercase())),
        Builtin::Trim => Ok(Value::String(as_str(func, arg)?.trim().to_string())),
        Builtin::Len => {
            let len = match arg {
                Value::String(s) => s.chars().count(),
                Value::Array(a) => a.len(),
                Value::Object(o) => o.len(),
                other => {
                    return Err(ExprError::TypeMismatch {
                        message: format!("len() is not defined for {}", type_name(other)),
                    })
                }
            };
            Ok(Value::Number(Number::from(len as i64)))
        }
        Builtin::Str => Ok(Value::String(render(arg))),
        Builtin::Num => match arg {
            Value::Number(_) => Ok(arg.clone()),
            Value::String(s) => {
                let parsed = s.trim().parse::<f64>().map_err(|_| ExprError::TypeMismatch {
                    message: format!("num() cannot parse '{}'", s),
                })?;
                number_from_f64(parsed)
            }
            Value::Bool(b) => Ok(Value::Number(Number::from(if *b { 1 } else { 0 }))),
            other => Err(ExprError::TypeMismatch {
                message: format!("num() is not defined for {}", type_name(other)),
            }),
        },
        Builtin::Abs => match arg.as_i64() {
            Some(i) => Ok(Value::Number(Number::from(i.abs()))),
            None => number_from_f64(as_number(arg)?.abs()),
        },
        Builtin::Round => number_from_f64(as_number(arg)?.round()),
    }
}

/// Truthiness: null and empty containers are false, numbers compare to zero
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Equality with cross-representation numeric comparison
fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => lhs == rhs,
    }
}

fn compare(lhs: &Value, rhs: &Value) -> Result<std::cmp::Ordering, ExprError> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
            a.partial_cmp(&b).ok_or(ExprError::TypeMismatch {
                message: "numbers are not comparable".to_string(),
            })
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(ExprError::TypeMismatch {
            message: format!(
                "cannot compare {} with {}",
                type_name(lhs),
                type_name(rhs)
            ),
        }),
    }
}

/// Textual rendering used by string concatenation and `str()`
fn render(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(value: &Value) -> Result<f64, ExprError> {
    match value {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        other => Err(ExprError::TypeMismatch {
            message: format!("expected a number, found {}", type_name(other)),
        }),
    }
}

fn as_str<'a>(func: Builtin, value: &'a Value) -> Result<&'a str, ExprError> {
    value.as_str().ok_or_else(|| ExprError::TypeMismatch {
        message: format!("{}() expects a string, found {}", func.name(), type_name(value)),
    })
}

/// Whole-valued floats normalize to integers, NaN and infinity are rejected
fn number_from_f64(f: f64) -> Result<Value, ExprError> {
    if !f.is_finite() {
        return Err(ExprError::NotRepresentable { value: f });
    }
    const EXACT_INT_BOUND: f64 = 9_007_199_254_740_992.0; // 2^53
    if f.fract() == 0.0 && f.abs() < EXACT_INT_BOUND {
        return Ok(Value::Number(Number::from(f as i64)));
    }
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or(ExprError::NotRepresentable { value: f })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::super::parser::Parser;
    use super::*;
    use serde_json::json;

    fn eval(expr: &str, value: Value) -> Result<Value, ExprError> {
        let compiled = Parser::new(expr).unwrap().parse().unwrap();
        evaluate(&compiled, &value)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("value + 1", json!(2)).unwrap(), json!(3));
        assert_eq!(eval("value * 1000", json!(5)).unwrap(), json!(5000));
        assert_eq!(eval("7 / 2", json!(null)).unwrap(), json!(3.5));
        assert_eq!(eval("6 / 2", json!(null)).unwrap(), json!(3));
        assert_eq!(eval("7 % 3", json!(null)).unwrap(), json!(1));
        assert_eq!(eval("-value", json!(4)).unwrap(), json!(-4));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(
            eval("'id-' + value", json!(17)).unwrap(),
            json!("id-17")
        );
        assert_eq!(
            eval("value + '!'", json!("hello")).unwrap(),
            json!("hello!")
        );
        assert_eq!(eval("'x' + value", json!(null)).unwrap(), json!("xnull"));
    }

    #[test]
    fn test_comparison_and_logic() {
        assert_eq!(eval("value > 5", json!(6)).unwrap(), json!(true));
        assert_eq!(eval("value <= 5", json!(6)).unwrap(), json!(false));
        assert_eq!(eval("value == 'a' || value == 'b'", json!("b")).unwrap(), json!(true));
        assert_eq!(eval("value > 0 && value < 10", json!(11)).unwrap(), json!(false));
        assert_eq!(eval("!value", json!(false)).unwrap(), json!(true));
    }

    #[test]
    fn test_numeric_equality_across_representations() {
        assert_eq!(eval("value == 2", json!(2.0)).unwrap(), json!(true));
    }

    #[test]
    fn test_ternary() {
        assert_eq!(
            eval("value > 100 ? 'high' : 'low'", json!(150)).unwrap(),
            json!("high")
        );
        assert_eq!(
            eval("value == null ? 'missing' : value", json!(null)).unwrap(),
            json!("missing")
        );
    }

    #[test]
    fn test_builtins() {
        assert_eq!(eval("upper(value)", json!("abc")).unwrap(), json!("ABC"));
        assert_eq!(eval("trim(value)", json!("  x ")).unwrap(), json!("x"));
        assert_eq!(eval("len(value)", json!("abcd")).unwrap(), json!(4));
        assert_eq!(eval("len(value)", json!([1, 2, 3])).unwrap(), json!(3));
        assert_eq!(eval("str(value)", json!(42)).unwrap(), json!("42"));
        assert_eq!(eval("num(value)", json!("3.5")).unwrap(), json!(3.5));
        assert_eq!(eval("abs(value)", json!(-9)).unwrap(), json!(9));
        assert_eq!(eval("round(value)", json!(2.6)).unwrap(), json!(3));
    }

    #[test]
    fn test_division_by_zero_is_an_error() {
        assert!(matches!(
            eval("value / 0", json!(1)),
            Err(ExprError::DivisionByZero)
        ));
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        assert!(eval("value - 1", json!("abc")).is_err());
        assert!(eval("upper(value)", json!(5)).is_err());
        assert!(eval("value > 1", json!({"a": 1})).is_err());
    }
}
